//! Summarizer trait — the abstraction over text-generation backends.
//!
//! A Summarizer turns an ordered sequence of history rows into a
//! natural-language summary of GST trends and spending habits. Each call is
//! stateless and independent; the summary is never persisted, and no retry
//! happens inside an implementation (retry policy, if any, belongs to the
//! caller).
//!
//! Implementations: Google Generative Language (native), OpenAI-compatible.

use async_trait::async_trait;

use crate::calculation::HistoryRow;
use crate::error::SummaryError;

/// The core Summarizer trait.
///
/// Callers must reject empty input before calling `summarize`; the
/// orchestration layer maps an empty history to
/// [`SummaryError::EmptyHistory`] without reaching an implementation.
#[async_trait]
pub trait Summarizer: Send + Sync {
    /// A human-readable name for this backend (e.g., "googleai", "openai").
    fn name(&self) -> &str;

    /// Summarize the given rows. The returned string is the backend's
    /// `summary` field, unmodified.
    async fn summarize(
        &self,
        history: &[HistoryRow],
    ) -> std::result::Result<String, SummaryError>;
}
