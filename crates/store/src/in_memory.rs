//! In-memory backend — useful for testing and ephemeral sessions.

use async_trait::async_trait;
use chrono::Utc;
use gstmate_core::error::StoreError;
use gstmate_core::{Calculation, HistoryStore, NewCalculation};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::RwLock;
use uuid::Uuid;

/// An in-memory backend that stores records in a Vec.
///
/// A monotonic sequence number breaks timestamp ties so that two appends in
/// the same instant still list newest-first deterministically.
pub struct InMemoryStore {
    entries: Arc<RwLock<Vec<(u64, Calculation)>>>,
    seq: AtomicU64,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            entries: Arc::new(RwLock::new(Vec::new())),
            seq: AtomicU64::new(0),
        }
    }

    /// Total records across all users (test helper).
    pub async fn count(&self) -> usize {
        self.entries.read().await.len()
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HistoryStore for InMemoryStore {
    fn name(&self) -> &str {
        "memory"
    }

    async fn append(&self, user_id: &str, record: NewCalculation) -> Result<String, StoreError> {
        let id = Uuid::new_v4().to_string();
        let calc = Calculation {
            id: id.clone(),
            user_id: user_id.to_string(),
            amount: record.amount,
            gst_rate: record.gst_rate,
            gst_amount: record.gst_amount,
            total_amount: record.total_amount,
            timestamp: Utc::now(),
        };
        let seq = self.seq.fetch_add(1, Ordering::SeqCst);
        self.entries.write().await.push((seq, calc));
        Ok(id)
    }

    async fn list_recent(
        &self,
        user_id: &str,
        limit: usize,
    ) -> Result<Vec<Calculation>, StoreError> {
        let entries = self.entries.read().await;
        let mut matches: Vec<&(u64, Calculation)> = entries
            .iter()
            .filter(|(_, c)| c.user_id == user_id)
            .collect();
        matches.sort_by(|(sa, a), (sb, b)| {
            b.timestamp
                .cmp(&a.timestamp)
                .then_with(|| sb.cmp(sa))
        });
        Ok(matches
            .into_iter()
            .take(limit)
            .map(|(_, c)| c.clone())
            .collect())
    }
}
