//! The tax engine — a pure function from (amount, rate) to derived values.
//!
//! Preconditions (`amount > 0`, `rate >= 0`, both finite) are enforced by
//! the orchestration layer, not here; behavior on violated preconditions is
//! undefined. No side effects, no shared state, safe to call concurrently.

use crate::calculation::CalculationResult;

/// Round to 2 decimal places, half away from zero.
fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Compute the GST amount and tax-inclusive total for an amount and a rate
/// in percent units. Both outputs are rounded to exactly 2 decimals.
pub fn compute(amount: f64, rate: f64) -> CalculationResult {
    let gst_amount = round2(amount * rate / 100.0);
    let total_amount = round2(amount + gst_amount);
    CalculationResult {
        gst_amount,
        total_amount,
    }
}
