//! Error types for the gstmate domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error variant.

use thiserror::Error;

/// The top-level error type for all gstmate operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Input validation errors ---
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    // --- History store errors ---
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    // --- Summarization errors ---
    #[error("Summary error: {0}")]
    Summary(#[from] SummaryError),

    // --- Configuration errors ---
    #[error("Configuration error: {message}")]
    Config { message: String },

    // --- Serialization ---
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // --- Generic ---
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

// --- Bounded context errors ---

/// Rejections of untrusted input, surfaced immediately and never retried.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("amount must be a positive number, got {0}")]
    NonPositiveAmount(f64),

    #[error("GST rate must not be negative, got {0}")]
    NegativeRate(f64),

    #[error("{field} must be a finite number")]
    NotFinite { field: &'static str },

    #[error("user not authenticated")]
    MissingUser,
}

/// Failures of the history storage backend.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Write rejected by backend: {0}")]
    Rejected(String),

    #[error("Malformed backend response: {0}")]
    MalformedResponse(String),

    #[error("Backend error: {message} (status: {status_code})")]
    Backend { status_code: u16, message: String },

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Store not configured: {0}")]
    NotConfigured(String),

    #[error("Migration failed: {0}")]
    Migration(String),
}

/// Failures of the summarization backend, plus the empty-input rejection.
#[derive(Debug, Error)]
pub enum SummaryError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("API request failed: {message} (status: {status_code})")]
    Api { status_code: u16, message: String },

    #[error("Malformed model output: {0}")]
    MalformedResponse(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("no history available to summarize")]
    EmptyHistory,

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Summarizer not configured: {0}")]
    NotConfigured(String),
}
