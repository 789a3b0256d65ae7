//! The orchestration layer: validates untrusted input, invokes the tax
//! engine, fires best-effort persistence, and mediates history reads and
//! summarization requests.
//!
//! `CalcService` carries no state across invocations; each operation is a
//! single request/response round-trip with at most one downstream
//! dependency chain. Collaborators are injected as trait objects so
//! backends can be swapped via configuration and mocked in tests.

use std::sync::Arc;

use gstmate_core::engine;
use gstmate_core::error::{SummaryError, ValidationError};
use gstmate_core::{
    Calculation, CalculationResult, DEFAULT_HISTORY_LIMIT, HistoryRow, HistoryStore,
    NewCalculation, Result, Summarizer,
};
use tracing::{debug, warn};

/// The orchestration service behind every gateway operation.
pub struct CalcService {
    store: Arc<dyn HistoryStore>,
    summarizer: Arc<dyn Summarizer>,
    history_limit: usize,
}

impl CalcService {
    /// Create a new service over the given collaborators.
    pub fn new(store: Arc<dyn HistoryStore>, summarizer: Arc<dyn Summarizer>) -> Self {
        Self {
            store,
            summarizer,
            history_limit: DEFAULT_HISTORY_LIMIT,
        }
    }

    /// Override how many records a history read returns.
    pub fn with_history_limit(mut self, limit: usize) -> Self {
        self.history_limit = limit;
        self
    }

    pub fn history_limit(&self) -> usize {
        self.history_limit
    }

    /// Validate the inputs, compute the result, and persist the record
    /// best-effort when a user is present.
    ///
    /// The append runs on a detached task: its failure is logged at WARN
    /// and never blocks or fails the computation. The caller always gets
    /// the transient result, never the stored record.
    pub async fn compute_and_record(
        &self,
        amount: f64,
        gst_rate: f64,
        user_id: Option<&str>,
    ) -> Result<CalculationResult> {
        validate(amount, gst_rate)?;

        let result = engine::compute(amount, gst_rate);

        if let Some(user_id) = user_id.filter(|u| !u.is_empty()) {
            let store = self.store.clone();
            let user_id = user_id.to_string();
            let record = NewCalculation::from_result(amount, gst_rate, &result);
            tokio::spawn(async move {
                match store.append(&user_id, record).await {
                    Ok(id) => debug!(user = %user_id, id = %id, "Calculation recorded"),
                    Err(e) => {
                        warn!(user = %user_id, error = %e, "History write failed; result already returned")
                    }
                }
            });
        }

        Ok(result)
    }

    /// Fetch the user's most recent records, newest first.
    pub async fn fetch_history(&self, user_id: &str) -> Result<Vec<Calculation>> {
        if user_id.is_empty() {
            return Err(ValidationError::MissingUser.into());
        }
        Ok(self.store.list_recent(user_id, self.history_limit).await?)
    }

    /// Summarize an ordered history. Empty input is rejected before any
    /// external call is made.
    pub async fn summarize_history(&self, history: &[Calculation]) -> Result<String> {
        if history.is_empty() {
            return Err(SummaryError::EmptyHistory.into());
        }
        let rows: Vec<HistoryRow> = history.iter().map(HistoryRow::from).collect();
        Ok(self.summarizer.summarize(&rows).await?)
    }
}

/// Reject malformed or out-of-range input before the engine runs.
fn validate(amount: f64, gst_rate: f64) -> std::result::Result<(), ValidationError> {
    if !amount.is_finite() {
        return Err(ValidationError::NotFinite { field: "amount" });
    }
    if !gst_rate.is_finite() {
        return Err(ValidationError::NotFinite { field: "gst_rate" });
    }
    if amount <= 0.0 {
        return Err(ValidationError::NonPositiveAmount(amount));
    }
    if gst_rate < 0.0 {
        return Err(ValidationError::NegativeRate(gst_rate));
    }
    Ok(())
}
