//! Summarizer implementations for gstmate.
//!
//! All backends implement the `gstmate_core::Summarizer` trait and share
//! the fixed output contract: the model must reply with a JSON object
//! carrying a string `summary` field. `build_from_config` selects the
//! backend named in configuration.

pub mod googleai;
pub mod openai_compat;
pub mod prompt;

pub use googleai::GoogleAiSummarizer;
pub use openai_compat::OpenAiCompatSummarizer;

use std::sync::Arc;

use gstmate_config::AppConfig;
use gstmate_core::{SummaryError, Summarizer};

/// Parse the model's reply against the `{"summary": string}` contract.
///
/// Anything else — invalid JSON, a missing field, a non-string value — is a
/// malformed response, never silently degraded.
pub fn parse_summary(content: &str) -> Result<String, SummaryError> {
    let value: serde_json::Value = serde_json::from_str(content)
        .map_err(|e| SummaryError::MalformedResponse(format!("not a JSON object: {e}")))?;
    value["summary"]
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| SummaryError::MalformedResponse("missing summary field".into()))
}

/// Build the configured summarizer.
pub fn build_from_config(config: &AppConfig) -> Result<Arc<dyn Summarizer>, SummaryError> {
    let cfg = &config.summarizer;

    // Ollama runs locally and needs no key; everything else does.
    let require_key = || {
        cfg.api_key.clone().ok_or_else(|| {
            SummaryError::NotConfigured(
                "no API key — set summarizer.api_key or GSTMATE_API_KEY".into(),
            )
        })
    };

    match cfg.provider.as_str() {
        "googleai" => {
            let mut summarizer = GoogleAiSummarizer::new(require_key()?, &cfg.model);
            if let Some(url) = &cfg.api_url {
                summarizer = summarizer.with_base_url(url);
            }
            Ok(Arc::new(summarizer.with_timeout(cfg.timeout_secs)))
        }
        "openai" | "openrouter" => {
            let key = require_key()?;
            let summarizer = match &cfg.api_url {
                Some(url) => OpenAiCompatSummarizer::new(&cfg.provider, url, key, &cfg.model),
                None if cfg.provider == "openrouter" => {
                    OpenAiCompatSummarizer::openrouter(key, &cfg.model)
                }
                None => OpenAiCompatSummarizer::openai(key, &cfg.model),
            };
            Ok(Arc::new(summarizer.with_timeout(cfg.timeout_secs)))
        }
        "ollama" => Ok(Arc::new(
            OpenAiCompatSummarizer::ollama(cfg.api_url.as_deref(), &cfg.model)
                .with_timeout(cfg.timeout_secs),
        )),
        other => Err(SummaryError::NotConfigured(format!(
            "unknown summarizer provider '{other}'"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_summary_happy_path() {
        let content = r#"{"summary": "Spending trends look stable."}"#;
        assert_eq!(
            parse_summary(content).unwrap(),
            "Spending trends look stable."
        );
    }

    #[test]
    fn parse_summary_rejects_plain_text() {
        let err = parse_summary("Spending trends look stable.").err().unwrap();
        assert!(matches!(err, SummaryError::MalformedResponse(_)));
    }

    #[test]
    fn parse_summary_rejects_missing_field() {
        let err = parse_summary(r#"{"insight": "nope"}"#).err().unwrap();
        assert!(matches!(err, SummaryError::MalformedResponse(_)));
    }

    #[test]
    fn parse_summary_rejects_non_string_field() {
        let err = parse_summary(r#"{"summary": 42}"#).err().unwrap();
        assert!(matches!(err, SummaryError::MalformedResponse(_)));
    }

    #[test]
    fn build_requires_api_key() {
        let config = AppConfig::default();
        let err = build_from_config(&config).err().unwrap();
        assert!(matches!(err, SummaryError::NotConfigured(_)));
    }

    #[test]
    fn build_googleai() {
        let mut config = AppConfig::default();
        config.summarizer.api_key = Some("test-key".into());
        let summarizer = build_from_config(&config).unwrap();
        assert_eq!(summarizer.name(), "googleai");
    }

    #[test]
    fn build_openai() {
        let mut config = AppConfig::default();
        config.summarizer.provider = "openai".into();
        config.summarizer.api_key = Some("sk-test".into());
        config.summarizer.model = "gpt-4o-mini".into();
        let summarizer = build_from_config(&config).unwrap();
        assert_eq!(summarizer.name(), "openai");
    }

    #[test]
    fn build_ollama_needs_no_key() {
        let mut config = AppConfig::default();
        config.summarizer.provider = "ollama".into();
        let summarizer = build_from_config(&config).unwrap();
        assert_eq!(summarizer.name(), "ollama");
    }

    #[test]
    fn build_unknown_provider_fails() {
        let mut config = AppConfig::default();
        config.summarizer.provider = "bard".into();
        config.summarizer.api_key = Some("k".into());
        assert!(build_from_config(&config).is_err());
    }
}
