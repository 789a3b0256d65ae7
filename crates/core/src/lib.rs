//! # Gstmate Core
//!
//! Domain types, traits, and error definitions for the gstmate GST
//! calculation service. This crate has **zero framework dependencies** — it
//! defines the domain model that all other crates implement against.
//!
//! ## Design Philosophy
//!
//! Every subsystem boundary is defined as a trait here. Implementations live
//! in their respective crates. This enables:
//! - Swapping storage and summarization backends via configuration
//! - Easy testing with mock/stub implementations
//! - Clean dependency graph (all crates depend inward on core)

pub mod calculation;
pub mod engine;
pub mod error;
pub mod store;
pub mod summary;

// Re-export key types at crate root for ergonomics
pub use calculation::{Calculation, CalculationResult, HistoryRow, NewCalculation};
pub use error::{Error, Result, StoreError, SummaryError, ValidationError};
pub use store::{DEFAULT_HISTORY_LIMIT, HistoryStore};
pub use summary::Summarizer;
