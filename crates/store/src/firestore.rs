//! Firestore REST backend — the remote document database.
//!
//! Talks to the Firestore v1 REST API directly:
//! - `append` issues a `documents:commit` with a `setToServerTimestamp`
//!   transform on the `timestamp` field, so ordering is by the backend's
//!   clock and survives client clock skew. The document id is generated
//!   client-side, the way the Firestore SDK's `addDoc` does.
//! - `list_recent` issues a `:runQuery` structured query scoped to one
//!   `userId`, ordered by `timestamp` descending, limited.
//!
//! Wire field names are camelCase to match the original collection schema.

use async_trait::async_trait;
use chrono::Utc;
use gstmate_core::error::StoreError;
use gstmate_core::{Calculation, HistoryStore, NewCalculation};
use serde_json::{Value, json};
use tracing::{debug, warn};
use uuid::Uuid;

const DEFAULT_BASE_URL: &str = "https://firestore.googleapis.com";

pub struct FirestoreStore {
    project_id: String,
    base_url: String,
    collection: String,
    auth_token: Option<String>,
    client: reqwest::Client,
}

impl FirestoreStore {
    /// Create a new Firestore store for a project and collection.
    pub fn new(project_id: impl Into<String>, collection: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            project_id: project_id.into(),
            base_url: DEFAULT_BASE_URL.into(),
            collection: collection.into(),
            auth_token: None,
            client,
        }
    }

    /// Use a custom base URL (emulator or proxy).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Authenticate with a bearer token.
    pub fn with_auth_token(mut self, token: impl Into<String>) -> Self {
        self.auth_token = Some(token.into());
        self
    }

    fn database_path(&self) -> String {
        format!("projects/{}/databases/(default)", self.project_id)
    }

    fn document_name(&self, doc_id: &str) -> String {
        format!(
            "{}/documents/{}/{}",
            self.database_path(),
            self.collection,
            doc_id
        )
    }

    fn request(&self, url: &str, body: &Value) -> reqwest::RequestBuilder {
        let mut req = self.client.post(url).json(body);
        if let Some(token) = &self.auth_token {
            req = req.bearer_auth(token);
        }
        req
    }

    /// Build the `documents:commit` body: one write carrying the record
    /// fields plus a server-timestamp transform. The `timestamp` field is
    /// deliberately absent from `fields` — the backend fills it in.
    fn commit_body(&self, doc_id: &str, user_id: &str, record: &NewCalculation) -> Value {
        json!({
            "writes": [{
                "update": {
                    "name": self.document_name(doc_id),
                    "fields": {
                        "userId": { "stringValue": user_id },
                        "amount": { "doubleValue": record.amount },
                        "gstRate": { "doubleValue": record.gst_rate },
                        "gstAmount": { "doubleValue": record.gst_amount },
                        "totalAmount": { "doubleValue": record.total_amount },
                    }
                },
                "updateTransforms": [{
                    "fieldPath": "timestamp",
                    "setToServerTimestamp": true
                }]
            }]
        })
    }

    /// Build the `:runQuery` body: one user's records, newest first.
    fn query_body(&self, user_id: &str, limit: usize) -> Value {
        json!({
            "structuredQuery": {
                "from": [{ "collectionId": self.collection }],
                "where": {
                    "fieldFilter": {
                        "field": { "fieldPath": "userId" },
                        "op": "EQUAL",
                        "value": { "stringValue": user_id }
                    }
                },
                "orderBy": [{
                    "field": { "fieldPath": "timestamp" },
                    "direction": "DESCENDING"
                }],
                "limit": limit
            }
        })
    }

    /// Parse one Firestore document resource into a Calculation.
    fn parse_document(document: &Value) -> Result<Calculation, StoreError> {
        let name = document["name"]
            .as_str()
            .ok_or_else(|| StoreError::MalformedResponse("document without name".into()))?;
        let id = name
            .rsplit('/')
            .next()
            .unwrap_or(name)
            .to_string();

        let fields = &document["fields"];
        let user_id = fields["userId"]["stringValue"]
            .as_str()
            .ok_or_else(|| StoreError::MalformedResponse("missing userId field".into()))?
            .to_string();

        let timestamp_str = fields["timestamp"]["timestampValue"]
            .as_str()
            .ok_or_else(|| StoreError::MalformedResponse("missing timestamp field".into()))?;
        let timestamp = chrono::DateTime::parse_from_rfc3339(timestamp_str)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| StoreError::MalformedResponse(format!("bad timestamp: {e}")))?;

        Ok(Calculation {
            id,
            user_id,
            amount: Self::number_field(fields, "amount")?,
            gst_rate: Self::number_field(fields, "gstRate")?,
            gst_amount: Self::number_field(fields, "gstAmount")?,
            total_amount: Self::number_field(fields, "totalAmount")?,
            timestamp,
        })
    }

    /// Firestore encodes numbers as `doubleValue` (JSON number) or
    /// `integerValue` (JSON string). Accept both.
    fn number_field(fields: &Value, key: &str) -> Result<f64, StoreError> {
        let value = &fields[key];
        if let Some(n) = value["doubleValue"].as_f64() {
            return Ok(n);
        }
        if let Some(s) = value["integerValue"].as_str() {
            return s
                .parse::<f64>()
                .map_err(|e| StoreError::MalformedResponse(format!("{key}: {e}")));
        }
        Err(StoreError::MalformedResponse(format!(
            "missing numeric field {key}"
        )))
    }

    fn map_send_error(e: reqwest::Error) -> StoreError {
        if e.is_timeout() {
            StoreError::Timeout(e.to_string())
        } else {
            StoreError::Network(e.to_string())
        }
    }

    async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, StoreError> {
        let status = response.status().as_u16();
        if status == 401 || status == 403 {
            return Err(StoreError::Rejected(
                "missing or insufficient permissions".into(),
            ));
        }
        if status != 200 {
            let body = response.text().await.unwrap_or_default();
            warn!(status, body = %body, "Firestore returned error");
            return Err(StoreError::Backend {
                status_code: status,
                message: body,
            });
        }
        Ok(response)
    }
}

#[async_trait]
impl HistoryStore for FirestoreStore {
    fn name(&self) -> &str {
        "firestore"
    }

    async fn append(&self, user_id: &str, record: NewCalculation) -> Result<String, StoreError> {
        let doc_id = Uuid::new_v4().simple().to_string();
        let url = format!(
            "{}/v1/{}/documents:commit",
            self.base_url,
            self.database_path()
        );
        let body = self.commit_body(&doc_id, user_id, &record);

        debug!(collection = %self.collection, "Committing calculation document");
        let response = self
            .request(&url, &body)
            .send()
            .await
            .map_err(Self::map_send_error)?;
        Self::check_status(response).await?;

        Ok(doc_id)
    }

    async fn list_recent(
        &self,
        user_id: &str,
        limit: usize,
    ) -> Result<Vec<Calculation>, StoreError> {
        let url = format!(
            "{}/v1/{}/documents:runQuery",
            self.base_url,
            self.database_path()
        );
        let body = self.query_body(user_id, limit);

        let response = self
            .request(&url, &body)
            .send()
            .await
            .map_err(Self::map_send_error)?;
        let response = Self::check_status(response).await?;

        // runQuery streams one JSON object per result; a user with no
        // records gets a single entry carrying only a readTime.
        let results: Vec<Value> = response
            .json()
            .await
            .map_err(|e| StoreError::MalformedResponse(e.to_string()))?;

        results
            .iter()
            .filter_map(|entry| entry.get("document"))
            .map(Self::parse_document)
            .collect()
    }
}
