//! HistoryStore trait — durable append and bounded read of calculation
//! records, scoped by user.
//!
//! The store owns identity and timestamp assignment: callers never supply
//! either, which keeps per-user ordering immune to client clock skew.
//! There are no update or delete operations.

use async_trait::async_trait;

use crate::calculation::{Calculation, NewCalculation};
use crate::error::StoreError;

/// How many records a history read returns by default.
pub const DEFAULT_HISTORY_LIMIT: usize = 5;

/// The core HistoryStore trait.
///
/// Implementations: Firestore (remote), SQLite, in-memory (for testing),
/// none (no-op). Concurrent appends for one user are independent; their
/// relative order is whatever timestamps the backend assigns. A read
/// reflects a backend-consistent snapshot — a just-appended record may not
/// be visible yet, and callers must tolerate that.
#[async_trait]
pub trait HistoryStore: Send + Sync {
    /// The backend name (e.g., "firestore", "sqlite", "memory", "none").
    fn name(&self) -> &str;

    /// Append a record for the given user. The backend assigns the
    /// identifier and the timestamp; the generated identifier is returned.
    async fn append(
        &self,
        user_id: &str,
        record: NewCalculation,
    ) -> std::result::Result<String, StoreError>;

    /// Return up to `limit` records for the given user, strictly ordered by
    /// timestamp descending (most recent first). A user with no records
    /// gets an empty `Vec`, never an error.
    async fn list_recent(
        &self,
        user_id: &str,
        limit: usize,
    ) -> std::result::Result<Vec<Calculation>, StoreError>;
}
