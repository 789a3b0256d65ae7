//! Calculation records — the one persisted entity in the system.
//!
//! A `Calculation` is immutable once created: the orchestration layer writes
//! it after a successful computation and the only read is "last N for one
//! user, newest first". Derived values are always stored pre-rounded.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One historical calculation, as returned by a history read.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Calculation {
    /// Opaque identifier assigned by the storage backend.
    pub id: String,

    /// The owning user. Every query is scoped by this field.
    pub user_id: String,

    /// Original amount, before tax.
    pub amount: f64,

    /// GST rate in percent units.
    pub gst_rate: f64,

    /// Derived GST amount, rounded to 2 decimals.
    pub gst_amount: f64,

    /// Derived total, rounded to 2 decimals.
    pub total_amount: f64,

    /// Creation time, assigned by the storage backend — never the client
    /// clock, so per-user ordering survives clock skew.
    pub timestamp: DateTime<Utc>,
}

/// A record about to be appended. Identity and timestamp are left to the
/// storage backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewCalculation {
    pub amount: f64,
    pub gst_rate: f64,
    pub gst_amount: f64,
    pub total_amount: f64,
}

impl NewCalculation {
    /// Assemble a record from validated inputs and the engine's result.
    pub fn from_result(amount: f64, gst_rate: f64, result: &CalculationResult) -> Self {
        Self {
            amount,
            gst_rate,
            gst_amount: result.gst_amount,
            total_amount: result.total_amount,
        }
    }
}

/// The transient result of one computation. Returned synchronously to the
/// caller; never persisted in this form.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CalculationResult {
    pub gst_amount: f64,
    pub total_amount: f64,
}

/// Projection of a [`Calculation`] used to build the summarization prompt.
///
/// Stripped of identity and user fields; the timestamp is ISO-8601 text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryRow {
    pub amount: f64,
    pub gst_rate: f64,
    pub gst_amount: f64,
    pub total_amount: f64,
    pub timestamp: String,
}

impl From<&Calculation> for HistoryRow {
    fn from(calc: &Calculation) -> Self {
        Self {
            amount: calc.amount,
            gst_rate: calc.gst_rate,
            gst_amount: calc.gst_amount,
            total_amount: calc.total_amount,
            timestamp: calc.timestamp.to_rfc3339(),
        }
    }
}
