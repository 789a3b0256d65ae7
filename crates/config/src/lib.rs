//! Configuration loading, validation, and management for gstmate.
//!
//! Loads configuration from `~/.gstmate/config.toml` with environment
//! variable overrides. Validates all settings at startup.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use gstmate_core::DEFAULT_HISTORY_LIMIT;

/// The root configuration structure.
///
/// Maps directly to `~/.gstmate/config.toml`.
#[derive(Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// History store configuration
    #[serde(default)]
    pub store: StoreConfig,

    /// Summarizer configuration
    #[serde(default)]
    pub summarizer: SummarizerConfig,

    /// Gateway configuration
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// Orchestration settings
    #[serde(default)]
    pub service: ServiceConfig,
}

/// Redact a secret string for Debug output.
fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("store", &self.store)
            .field("summarizer", &self.summarizer)
            .field("gateway", &self.gateway)
            .field("service", &self.service)
            .finish()
    }
}

/// Which history backend to use and how to reach it.
#[derive(Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Backend: "firestore", "sqlite", "memory", or "none".
    #[serde(default = "default_store_backend")]
    pub backend: String,

    /// SQLite database path (sqlite backend only).
    #[serde(default = "default_sqlite_path")]
    pub sqlite_path: String,

    /// Firestore project identifier (firestore backend only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,

    /// Firestore base URL override (testing / emulators).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    /// Document collection holding calculation records.
    #[serde(default = "default_collection")]
    pub collection: String,

    /// Bearer token for the Firestore REST API.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_token: Option<String>,
}

fn default_store_backend() -> String {
    "sqlite".into()
}
fn default_sqlite_path() -> String {
    "gstmate.db".into()
}
fn default_collection() -> String {
    "calculations".into()
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: default_store_backend(),
            sqlite_path: default_sqlite_path(),
            project_id: None,
            base_url: None,
            collection: default_collection(),
            api_token: None,
        }
    }
}

impl std::fmt::Debug for StoreConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreConfig")
            .field("backend", &self.backend)
            .field("sqlite_path", &self.sqlite_path)
            .field("project_id", &self.project_id)
            .field("base_url", &self.base_url)
            .field("collection", &self.collection)
            .field("api_token", &redact(&self.api_token))
            .finish()
    }
}

/// Which text-generation backend produces history summaries.
#[derive(Clone, Serialize, Deserialize)]
pub struct SummarizerConfig {
    /// Provider: "googleai", "openai", "openrouter", or "ollama".
    #[serde(default = "default_summarizer_provider")]
    pub provider: String,

    /// API key for the provider.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Base URL override (proxies, self-hosted endpoints).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,

    /// Model to request.
    #[serde(default = "default_summarizer_model")]
    pub model: String,

    /// Request timeout in seconds.
    #[serde(default = "default_summarizer_timeout")]
    pub timeout_secs: u64,
}

fn default_summarizer_provider() -> String {
    "googleai".into()
}
fn default_summarizer_model() -> String {
    "gemini-2.0-flash".into()
}
fn default_summarizer_timeout() -> u64 {
    60
}

impl Default for SummarizerConfig {
    fn default() -> Self {
        Self {
            provider: default_summarizer_provider(),
            api_key: None,
            api_url: None,
            model: default_summarizer_model(),
            timeout_secs: default_summarizer_timeout(),
        }
    }
}

impl std::fmt::Debug for SummarizerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SummarizerConfig")
            .field("provider", &self.provider)
            .field("api_key", &redact(&self.api_key))
            .field("api_url", &self.api_url)
            .field("model", &self.model)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_host")]
    pub host: String,

    /// Bearer tokens accepted on /v1 routes. Empty = no service auth
    /// (local development).
    #[serde(default)]
    pub bearer_tokens: Vec<String>,

    /// Origins allowed by CORS.
    #[serde(default = "default_allowed_origins")]
    pub allowed_origins: Vec<String>,
}

fn default_port() -> u16 {
    9402
}
fn default_host() -> String {
    "127.0.0.1".into()
}
fn default_allowed_origins() -> Vec<String> {
    vec!["http://localhost:3000".into()]
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            host: default_host(),
            bearer_tokens: vec![],
            allowed_origins: default_allowed_origins(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// How many records a history read returns.
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,
}

fn default_history_limit() -> usize {
    DEFAULT_HISTORY_LIMIT
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            history_limit: default_history_limit(),
        }
    }
}

impl AppConfig {
    /// Load configuration from the default path (~/.gstmate/config.toml).
    ///
    /// Also checks environment variables:
    /// - `GSTMATE_API_KEY` (highest priority), `GOOGLE_API_KEY`,
    ///   `OPENAI_API_KEY` for the summarizer key
    /// - `GSTMATE_SUMMARIZER` / `GSTMATE_STORE` for backend selection
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_dir().join("config.toml");
        let mut config = Self::load_from(&config_path)?;

        if config.summarizer.api_key.is_none() {
            config.summarizer.api_key = std::env::var("GSTMATE_API_KEY")
                .ok()
                .or_else(|| std::env::var("GOOGLE_API_KEY").ok())
                .or_else(|| std::env::var("OPENAI_API_KEY").ok());
        }

        if let Ok(provider) = std::env::var("GSTMATE_SUMMARIZER") {
            config.summarizer.provider = provider;
        }

        if let Ok(backend) = std::env::var("GSTMATE_STORE") {
            config.store.backend = backend;
        }

        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".gstmate")
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=100).contains(&self.service.history_limit) {
            return Err(ConfigError::ValidationError(
                "service.history_limit must be between 1 and 100".into(),
            ));
        }

        if self.summarizer.timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "summarizer.timeout_secs must be greater than 0".into(),
            ));
        }

        match self.store.backend.as_str() {
            "firestore" | "sqlite" | "memory" | "none" => {}
            other => {
                return Err(ConfigError::ValidationError(format!(
                    "unknown store backend '{other}' — use firestore, sqlite, memory, or none"
                )));
            }
        }

        if self.store.backend == "firestore" && self.store.project_id.is_none() {
            return Err(ConfigError::ValidationError(
                "store.project_id is required for the firestore backend".into(),
            ));
        }

        Ok(())
    }

    /// Check if a summarizer API key is available (from config or environment).
    pub fn has_summarizer_key(&self) -> bool {
        self.summarizer.api_key.is_some()
    }

    /// Generate a default config TOML string (for `onboard`).
    pub fn default_toml() -> String {
        toml::to_string_pretty(&Self::default()).unwrap_or_default()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            store: StoreConfig::default(),
            summarizer: SummarizerConfig::default(),
            gateway: GatewayConfig::default(),
            service: ServiceConfig::default(),
        }
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}
