//! SQLite backend for local deployments.
//!
//! A single database file with one `calculations` table. The store assigns
//! identifiers and timestamps at append time; callers never supply either,
//! which keeps the ordering contract identical to the remote backend. The
//! autoincrement rowid breaks ties between appends in the same instant.

use async_trait::async_trait;
use chrono::Utc;
use gstmate_core::error::StoreError;
use gstmate_core::{Calculation, HistoryStore, NewCalculation};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::{Row, SqlitePool};
use std::str::FromStr;
use tracing::{debug, info};
use uuid::Uuid;

pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Create a new SQLite store from a file path.
    ///
    /// The database and table/index are created automatically.
    /// Pass `":memory:"` for an in-process ephemeral database (useful for tests).
    pub async fn new(path: &str) -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str(path)
            .map_err(|e| StoreError::NotConfigured(format!("Invalid SQLite path: {e}")))?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .pragma("foreign_keys", "ON");

        let pool = SqlitePoolOptions::new()
            .max_connections(4)
            .connect_with(options)
            .await
            .map_err(|e| StoreError::Network(format!("Failed to open SQLite: {e}")))?;

        let store = Self { pool };
        store.run_migrations().await?;
        info!("SQLite history store initialized at {path}");
        Ok(store)
    }

    async fn run_migrations(&self) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS calculations (
                iid          INTEGER PRIMARY KEY AUTOINCREMENT,
                id           TEXT UNIQUE NOT NULL,
                user_id      TEXT NOT NULL,
                amount       REAL NOT NULL,
                gst_rate     REAL NOT NULL,
                gst_amount   REAL NOT NULL,
                total_amount REAL NOT NULL,
                created_at   TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::Migration(format!("calculations table: {e}")))?;

        // Covering index for the only query shape: one user, newest first
        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_calculations_user_recency \
             ON calculations(user_id, created_at DESC)",
        )
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::Migration(format!("recency index: {e}")))?;

        debug!("SQLite migrations complete");
        Ok(())
    }

    fn row_to_calculation(row: &sqlx::sqlite::SqliteRow) -> Result<Calculation, StoreError> {
        let id: String = row
            .try_get("id")
            .map_err(|e| StoreError::MalformedResponse(format!("id column: {e}")))?;
        let user_id: String = row
            .try_get("user_id")
            .map_err(|e| StoreError::MalformedResponse(format!("user_id column: {e}")))?;
        let amount: f64 = row
            .try_get("amount")
            .map_err(|e| StoreError::MalformedResponse(format!("amount column: {e}")))?;
        let gst_rate: f64 = row
            .try_get("gst_rate")
            .map_err(|e| StoreError::MalformedResponse(format!("gst_rate column: {e}")))?;
        let gst_amount: f64 = row
            .try_get("gst_amount")
            .map_err(|e| StoreError::MalformedResponse(format!("gst_amount column: {e}")))?;
        let total_amount: f64 = row
            .try_get("total_amount")
            .map_err(|e| StoreError::MalformedResponse(format!("total_amount column: {e}")))?;
        let created_at_str: String = row
            .try_get("created_at")
            .map_err(|e| StoreError::MalformedResponse(format!("created_at column: {e}")))?;

        let timestamp = chrono::DateTime::parse_from_rfc3339(&created_at_str)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| StoreError::MalformedResponse(format!("created_at value: {e}")))?;

        Ok(Calculation {
            id,
            user_id,
            amount,
            gst_rate,
            gst_amount,
            total_amount,
            timestamp,
        })
    }
}

#[async_trait]
impl HistoryStore for SqliteStore {
    fn name(&self) -> &str {
        "sqlite"
    }

    async fn append(&self, user_id: &str, record: NewCalculation) -> Result<String, StoreError> {
        let id = Uuid::new_v4().to_string();
        let created_at = Utc::now().to_rfc3339();

        sqlx::query(
            r#"
            INSERT INTO calculations (id, user_id, amount, gst_rate, gst_amount, total_amount, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(&id)
        .bind(user_id)
        .bind(record.amount)
        .bind(record.gst_rate)
        .bind(record.gst_amount)
        .bind(record.total_amount)
        .bind(&created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::Rejected(format!("INSERT failed: {e}")))?;

        debug!(user = %user_id, "Stored calculation {id}");
        Ok(id)
    }

    async fn list_recent(
        &self,
        user_id: &str,
        limit: usize,
    ) -> Result<Vec<Calculation>, StoreError> {
        let rows = sqlx::query(
            "SELECT * FROM calculations WHERE user_id = ?1 \
             ORDER BY created_at DESC, iid DESC LIMIT ?2",
        )
        .bind(user_id)
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StoreError::Backend {
            status_code: 0,
            message: format!("history query: {e}"),
        })?;

        rows.iter().map(Self::row_to_calculation).collect()
    }
}
