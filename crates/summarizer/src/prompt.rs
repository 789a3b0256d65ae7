//! Deterministic prompt rendering for history summarization.
//!
//! Every row contributes one bullet with its four numeric fields and
//! timestamp; identical input always renders identical text, so the only
//! nondeterminism in a summarization request is the model itself.

use gstmate_core::HistoryRow;

/// Render the summarization prompt for an ordered history.
pub fn render(history: &[HistoryRow]) -> String {
    let mut out = String::from(
        "You are an expert financial analyst.\n\n\
         You will receive a calculation history containing the original amount, \
         GST rate, GST amount, total amount, and timestamp for each calculation.\n\n\
         Your task is to analyze this history and provide a summary of the user's \
         GST trends and spending habits.\n\n\
         Respond with a JSON object of the form {\"summary\": \"...\"}.\n\n\
         Calculation History:\n",
    );

    for row in history {
        out.push_str(&format!(
            "- Amount: {}, GST Rate: {}, GST Amount: {}, Total Amount: {}, Timestamp: {}\n",
            row.amount, row.gst_rate, row.gst_amount, row.total_amount, row.timestamp
        ));
    }

    out
}
