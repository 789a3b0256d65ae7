//! History store implementations for gstmate.
//!
//! All backends implement the `gstmate_core::HistoryStore` trait.
//! `build_from_config` selects the backend named in configuration.

pub mod firestore;
pub mod in_memory;
pub mod noop;

#[cfg(feature = "sqlite")]
pub mod sqlite;

pub use firestore::FirestoreStore;
pub use in_memory::InMemoryStore;
pub use noop::NoopStore;

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteStore;

use std::sync::Arc;

use gstmate_config::AppConfig;
use gstmate_core::{HistoryStore, StoreError};

/// Build the configured history store.
pub async fn build_from_config(config: &AppConfig) -> Result<Arc<dyn HistoryStore>, StoreError> {
    match config.store.backend.as_str() {
        "firestore" => {
            let project_id = config.store.project_id.clone().ok_or_else(|| {
                StoreError::NotConfigured("firestore backend needs store.project_id".into())
            })?;
            let mut store = FirestoreStore::new(project_id, &config.store.collection);
            if let Some(url) = &config.store.base_url {
                store = store.with_base_url(url);
            }
            if let Some(token) = &config.store.api_token {
                store = store.with_auth_token(token);
            }
            Ok(Arc::new(store))
        }
        #[cfg(feature = "sqlite")]
        "sqlite" => Ok(Arc::new(SqliteStore::new(&config.store.sqlite_path).await?)),
        #[cfg(not(feature = "sqlite"))]
        "sqlite" => Err(StoreError::NotConfigured(
            "built without the sqlite feature".into(),
        )),
        "memory" => Ok(Arc::new(InMemoryStore::new())),
        "none" => Ok(Arc::new(NoopStore)),
        other => Err(StoreError::NotConfigured(format!(
            "unknown store backend '{other}'"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn builds_memory_backend() {
        let mut config = AppConfig::default();
        config.store.backend = "memory".into();
        let store = build_from_config(&config).await.unwrap();
        assert_eq!(store.name(), "memory");
    }

    #[tokio::test]
    async fn builds_noop_backend() {
        let mut config = AppConfig::default();
        config.store.backend = "none".into();
        let store = build_from_config(&config).await.unwrap();
        assert_eq!(store.name(), "none");
    }

    #[tokio::test]
    async fn firestore_without_project_is_not_configured() {
        let mut config = AppConfig::default();
        config.store.backend = "firestore".into();
        let err = build_from_config(&config).await.err().unwrap();
        assert!(matches!(err, StoreError::NotConfigured(_)));
    }

    #[tokio::test]
    async fn unknown_backend_is_rejected() {
        let mut config = AppConfig::default();
        config.store.backend = "dynamo".into();
        let err = build_from_config(&config).await.err().unwrap();
        assert!(matches!(err, StoreError::NotConfigured(_)));
    }
}
