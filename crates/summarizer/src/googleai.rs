//! Google Generative Language summarizer (native API).
//!
//! Uses the `models/{model}:generateContent` endpoint with
//! `responseMimeType: application/json` so the model replies with the fixed
//! `{"summary": string}` contract. Authentication is the `x-goog-api-key`
//! header. No retries: a failed call surfaces to the caller.

use async_trait::async_trait;
use gstmate_core::error::SummaryError;
use gstmate_core::{HistoryRow, Summarizer};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::{parse_summary, prompt};

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
const DEFAULT_TIMEOUT_SECS: u64 = 60;

pub struct GoogleAiSummarizer {
    base_url: String,
    api_key: String,
    model: String,
    client: reqwest::Client,
}

impl GoogleAiSummarizer {
    /// Create a new Google Generative Language summarizer.
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.into(),
            api_key: api_key.into(),
            model: model.into(),
            client: build_client(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Use a custom base URL (proxy or test server).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Override the request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.client = build_client(secs);
        self
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        )
    }

    fn request_body(history: &[HistoryRow]) -> serde_json::Value {
        serde_json::json!({
            "contents": [{
                "role": "user",
                "parts": [{ "text": prompt::render(history) }]
            }],
            "generationConfig": {
                "responseMimeType": "application/json"
            }
        })
    }

    fn extract_text(response: ApiResponse) -> Result<String, SummaryError> {
        response
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content.parts.into_iter().next())
            .map(|p| p.text)
            .ok_or_else(|| SummaryError::MalformedResponse("no candidates in response".into()))
    }
}

fn build_client(timeout_secs: u64) -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(timeout_secs))
        .build()
        .expect("Failed to create HTTP client")
}

#[async_trait]
impl Summarizer for GoogleAiSummarizer {
    fn name(&self) -> &str {
        "googleai"
    }

    async fn summarize(&self, history: &[HistoryRow]) -> Result<String, SummaryError> {
        debug!(model = %self.model, rows = history.len(), "Sending summarization request");

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .header("Content-Type", "application/json")
            .json(&Self::request_body(history))
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    SummaryError::Timeout(e.to_string())
                } else {
                    SummaryError::Network(e.to_string())
                }
            })?;

        let status = response.status().as_u16();

        if status == 401 || status == 403 {
            return Err(SummaryError::AuthenticationFailed(
                "Invalid API key or insufficient permissions".into(),
            ));
        }

        if status != 200 {
            let error_body = response.text().await.unwrap_or_default();
            warn!(status, body = %error_body, "Summarizer returned error");
            return Err(SummaryError::Api {
                status_code: status,
                message: error_body,
            });
        }

        let api_response: ApiResponse = response.json().await.map_err(|e| {
            SummaryError::MalformedResponse(format!("Failed to parse response: {e}"))
        })?;

        parse_summary(&Self::extract_text(api_response)?)
    }
}

// --- Generative Language API types (internal) ---

#[derive(Debug, Deserialize)]
struct ApiResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Content,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows() -> Vec<HistoryRow> {
        vec![HistoryRow {
            amount: 1000.0,
            gst_rate: 5.0,
            gst_amount: 50.0,
            total_amount: 1050.0,
            timestamp: "2024-03-01T12:00:00+00:00".into(),
        }]
    }

    #[test]
    fn endpoint_includes_model() {
        let s = GoogleAiSummarizer::new("key", "gemini-2.0-flash");
        assert_eq!(
            s.endpoint(),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.0-flash:generateContent"
        );
    }

    #[test]
    fn request_body_asks_for_json() {
        let body = GoogleAiSummarizer::request_body(&rows());
        assert_eq!(
            body["generationConfig"]["responseMimeType"],
            "application/json"
        );
        let text = body["contents"][0]["parts"][0]["text"].as_str().unwrap();
        assert!(text.contains("Amount: 1000,"));
    }

    #[test]
    fn extract_text_from_candidates() {
        let data = r#"{
            "candidates": [{
                "content": {
                    "parts": [{ "text": "{\"summary\": \"Steady 5% rate.\"}" }],
                    "role": "model"
                },
                "finishReason": "STOP"
            }]
        }"#;
        let parsed: ApiResponse = serde_json::from_str(data).unwrap();
        let text = GoogleAiSummarizer::extract_text(parsed).unwrap();
        assert_eq!(parse_summary(&text).unwrap(), "Steady 5% rate.");
    }

    #[test]
    fn empty_candidates_are_malformed() {
        let parsed: ApiResponse = serde_json::from_str(r#"{"candidates": []}"#).unwrap();
        let err = GoogleAiSummarizer::extract_text(parsed).err().unwrap();
        assert!(matches!(err, SummaryError::MalformedResponse(_)));
    }
}
