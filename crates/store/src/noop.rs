//! No-op backend — persistence disabled by configuration.
//!
//! Appends are accepted and discarded; every history read is empty.

use async_trait::async_trait;
use gstmate_core::error::StoreError;
use gstmate_core::{Calculation, HistoryStore, NewCalculation};
use uuid::Uuid;

pub struct NoopStore;

#[async_trait]
impl HistoryStore for NoopStore {
    fn name(&self) -> &str {
        "none"
    }

    async fn append(&self, _user_id: &str, _record: NewCalculation) -> Result<String, StoreError> {
        Ok(Uuid::new_v4().to_string())
    }

    async fn list_recent(
        &self,
        _user_id: &str,
        _limit: usize,
    ) -> Result<Vec<Calculation>, StoreError> {
        Ok(Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn accepts_and_discards() {
        let store = NoopStore;
        let record = NewCalculation {
            amount: 100.0,
            gst_rate: 5.0,
            gst_amount: 5.0,
            total_amount: 105.0,
        };
        let id = store.append("user_a", record).await.unwrap();
        assert!(!id.is_empty());
        assert!(store.list_recent("user_a", 5).await.unwrap().is_empty());
    }
}
