//! HTTP API v1 — the three core operations over JSON.
//!
//! Endpoints:
//!
//! - `POST /v1/calculations`    — Validate, compute, persist best-effort
//! - `GET  /v1/history`         — The caller's most recent records
//! - `POST /v1/history/summary` — Read recent history, summarize it
//!
//! Identity: the fronting auth collaborator forwards the opaque user id in
//! `X-User-Id` (display headers like `X-User-Name` are presentation-only
//! and ignored here). Calculations work without one; history routes don't.

use axum::{
    Router,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::Json,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use gstmate_core::error::{SummaryError, ValidationError};
use gstmate_core::{Calculation, Error};

use crate::SharedState;

// ── Router ────────────────────────────────────────────────────────────────

/// Build the v1 API router. Nest this under "/v1" in the main router.
pub fn v1_router(state: SharedState) -> Router {
    Router::new()
        .route("/calculations", post(calculate_handler))
        .route("/history", get(history_handler))
        .route("/history/summary", post(summary_handler))
        .with_state(state)
}

// ── Request / Response types ──────────────────────────────────────────────

#[derive(Deserialize)]
struct CalculateRequest {
    amount: f64,
    gst_rate: f64,
}

#[derive(Serialize)]
struct CalculateResponse {
    gst_amount: f64,
    total_amount: f64,
}

#[derive(Serialize)]
struct HistoryResponse {
    history: Vec<CalculationDto>,
}

#[derive(Serialize)]
struct CalculationDto {
    id: String,
    user_id: String,
    amount: f64,
    gst_rate: f64,
    gst_amount: f64,
    total_amount: f64,
    timestamp: String,
}

impl From<&Calculation> for CalculationDto {
    fn from(calc: &Calculation) -> Self {
        Self {
            id: calc.id.clone(),
            user_id: calc.user_id.clone(),
            amount: calc.amount,
            gst_rate: calc.gst_rate,
            gst_amount: calc.gst_amount,
            total_amount: calc.total_amount,
            timestamp: calc.timestamp.to_rfc3339(),
        }
    }
}

#[derive(Serialize)]
struct SummaryResponse {
    summary: String,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

// ── Identity ──────────────────────────────────────────────────────────────

/// Extract the opaque user id forwarded by the auth collaborator.
fn user_id(headers: &HeaderMap) -> Option<String> {
    let id = headers.get("x-user-id")?.to_str().ok()?.trim();
    if id.is_empty() {
        return None;
    }
    Some(id.to_string())
}

// ── Error mapping ─────────────────────────────────────────────────────────

/// Map a domain error to an HTTP status and user-facing message.
fn error_response(err: Error) -> (StatusCode, Json<ErrorResponse>) {
    let (status, message) = match &err {
        Error::Validation(ValidationError::MissingUser) => {
            (StatusCode::UNAUTHORIZED, "User not authenticated.")
        }
        Error::Validation(_) => (StatusCode::BAD_REQUEST, "Invalid input data."),
        Error::Store(_) => (
            StatusCode::BAD_GATEWAY,
            "Failed to fetch calculation history.",
        ),
        Error::Summary(SummaryError::EmptyHistory) => {
            (StatusCode::BAD_REQUEST, "No history available to summarize.")
        }
        Error::Summary(_) => (StatusCode::BAD_GATEWAY, "Failed to generate AI summary."),
        _ => (StatusCode::INTERNAL_SERVER_ERROR, "Internal error."),
    };

    if status.is_server_error() {
        warn!(error = %err, "Request failed");
    }

    (
        status,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
}

// ── Handlers ──────────────────────────────────────────────────────────────

async fn calculate_handler(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Json(payload): Json<CalculateRequest>,
) -> Result<Json<CalculateResponse>, (StatusCode, Json<ErrorResponse>)> {
    let user = user_id(&headers);
    info!(authenticated = user.is_some(), "v1/calculations request");

    let result = state
        .service
        .compute_and_record(payload.amount, payload.gst_rate, user.as_deref())
        .await
        .map_err(error_response)?;

    Ok(Json(CalculateResponse {
        gst_amount: result.gst_amount,
        total_amount: result.total_amount,
    }))
}

async fn history_handler(
    State(state): State<SharedState>,
    headers: HeaderMap,
) -> Result<Json<HistoryResponse>, (StatusCode, Json<ErrorResponse>)> {
    let user = user_id(&headers).unwrap_or_default();

    let history = state
        .service
        .fetch_history(&user)
        .await
        .map_err(error_response)?;

    Ok(Json(HistoryResponse {
        history: history.iter().map(CalculationDto::from).collect(),
    }))
}

async fn summary_handler(
    State(state): State<SharedState>,
    headers: HeaderMap,
) -> Result<Json<SummaryResponse>, (StatusCode, Json<ErrorResponse>)> {
    let user = user_id(&headers).unwrap_or_default();

    // Summaries always cover the user's own stored history, never
    // client-supplied rows.
    let history = state
        .service
        .fetch_history(&user)
        .await
        .map_err(error_response)?;

    let summary = state
        .service
        .summarize_history(&history)
        .await
        .map_err(error_response)?;

    Ok(Json(SummaryResponse { summary }))
}

// ── Tests ─────────────────────────────────────────────────────────────────

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::{GatewayState, build_router};
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::Request;
    use gstmate_core::{HistoryRow, HistoryStore, NewCalculation, Summarizer};
    use gstmate_service::CalcService;
    use gstmate_store::InMemoryStore;
    use http_body_util::BodyExt;
    use std::sync::Arc;
    use tower::ServiceExt;

    struct FailingStore;

    #[async_trait]
    impl HistoryStore for FailingStore {
        fn name(&self) -> &str {
            "failing"
        }

        async fn append(
            &self,
            _user_id: &str,
            _record: NewCalculation,
        ) -> std::result::Result<String, gstmate_core::StoreError> {
            Err(gstmate_core::StoreError::Network("backend down".into()))
        }

        async fn list_recent(
            &self,
            _user_id: &str,
            _limit: usize,
        ) -> std::result::Result<Vec<Calculation>, gstmate_core::StoreError> {
            Err(gstmate_core::StoreError::Network("backend down".into()))
        }
    }

    struct StubSummarizer;

    #[async_trait]
    impl Summarizer for StubSummarizer {
        fn name(&self) -> &str {
            "stub"
        }

        async fn summarize(
            &self,
            history: &[HistoryRow],
        ) -> std::result::Result<String, SummaryError> {
            Ok(format!("Summary of {} calculations.", history.len()))
        }
    }

    pub(crate) fn test_state() -> SharedState {
        test_state_with_tokens(vec![])
    }

    pub(crate) fn test_state_with_tokens(bearer_tokens: Vec<String>) -> SharedState {
        let store = Arc::new(InMemoryStore::new());
        let service = Arc::new(CalcService::new(store, Arc::new(StubSummarizer)));
        Arc::new(GatewayState {
            service,
            bearer_tokens,
        })
    }

    fn state_with_store(store: Arc<InMemoryStore>) -> SharedState {
        let service = Arc::new(CalcService::new(store, Arc::new(StubSummarizer)));
        Arc::new(GatewayState {
            service,
            bearer_tokens: vec![],
        })
    }

    fn json_request(uri: &str, method: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_vec(&body).unwrap()))
            .unwrap()
    }

    async fn json_body(response: axum::response::Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    async fn seed(store: &InMemoryStore, user: &str, amount: f64) {
        store
            .append(
                user,
                NewCalculation {
                    amount,
                    gst_rate: 18.0,
                    gst_amount: amount * 0.18,
                    total_amount: amount * 1.18,
                },
            )
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn calculate_anonymous() {
        let app = build_router(test_state(), &[]);

        let req = json_request(
            "/v1/calculations",
            "POST",
            serde_json::json!({ "amount": 1000.0, "gst_rate": 5.0 }),
        );
        let response = app.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = json_body(response).await;
        assert_eq!(body["gst_amount"], 50.0);
        assert_eq!(body["total_amount"], 1050.0);
    }

    #[tokio::test]
    async fn calculate_records_for_user() {
        let store = Arc::new(InMemoryStore::new());
        let app = build_router(state_with_store(store.clone()), &[]);

        let mut req = json_request(
            "/v1/calculations",
            "POST",
            serde_json::json!({ "amount": 999.99, "gst_rate": 18.0 }),
        );
        req.headers_mut()
            .insert("x-user-id", "user_a".parse().unwrap());

        let response = app.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["gst_amount"], 180.0);
        assert_eq!(body["total_amount"], 1179.99);

        // The append is detached; give it a moment to land.
        for _ in 0..100 {
            if store.count().await == 1 {
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        }
        assert_eq!(store.count().await, 1);
    }

    #[tokio::test]
    async fn calculate_rejects_invalid_input() {
        let app = build_router(test_state(), &[]);

        let req = json_request(
            "/v1/calculations",
            "POST",
            serde_json::json!({ "amount": 0.0, "gst_rate": 5.0 }),
        );
        let response = app.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = json_body(response).await;
        assert_eq!(body["error"], "Invalid input data.");
    }

    #[tokio::test]
    async fn calculate_rejects_malformed_body() {
        let app = build_router(test_state(), &[]);

        let req = json_request(
            "/v1/calculations",
            "POST",
            serde_json::json!({ "amount": 100.0 }),
        );
        let response = app.oneshot(req).await.unwrap();
        assert!(response.status().is_client_error());
    }

    #[tokio::test]
    async fn history_requires_identity() {
        let app = build_router(test_state(), &[]);

        let req = Request::builder()
            .uri("/v1/history")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let body = json_body(response).await;
        assert_eq!(body["error"], "User not authenticated.");
    }

    #[tokio::test]
    async fn history_returns_newest_first() {
        let store = Arc::new(InMemoryStore::new());
        seed(&store, "user_a", 1.0).await;
        seed(&store, "user_a", 2.0).await;
        seed(&store, "user_b", 99.0).await;
        let app = build_router(state_with_store(store), &[]);

        let req = Request::builder()
            .uri("/v1/history")
            .header("X-User-Id", "user_a")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = json_body(response).await;
        let history = body["history"].as_array().unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0]["amount"], 2.0);
        assert_eq!(history[1]["amount"], 1.0);
        assert!(history.iter().all(|h| h["user_id"] == "user_a"));
    }

    #[tokio::test]
    async fn history_empty_is_ok() {
        let app = build_router(test_state(), &[]);

        let req = Request::builder()
            .uri("/v1/history")
            .header("X-User-Id", "user_new")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = json_body(response).await;
        assert_eq!(body["history"].as_array().unwrap().len(), 0);
    }

    #[tokio::test]
    async fn summary_of_empty_history_is_client_error() {
        let app = build_router(test_state(), &[]);

        let req = Request::builder()
            .method("POST")
            .uri("/v1/history/summary")
            .header("X-User-Id", "user_new")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = json_body(response).await;
        assert_eq!(body["error"], "No history available to summarize.");
    }

    #[tokio::test]
    async fn summary_covers_stored_history() {
        let store = Arc::new(InMemoryStore::new());
        seed(&store, "user_a", 100.0).await;
        seed(&store, "user_a", 200.0).await;
        let app = build_router(state_with_store(store), &[]);

        let req = Request::builder()
            .method("POST")
            .uri("/v1/history/summary")
            .header("X-User-Id", "user_a")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = json_body(response).await;
        assert_eq!(body["summary"], "Summary of 2 calculations.");
    }

    #[tokio::test]
    async fn history_backend_failure_is_a_bad_gateway() {
        let service = Arc::new(CalcService::new(
            Arc::new(FailingStore),
            Arc::new(StubSummarizer),
        ));
        let state = Arc::new(GatewayState {
            service,
            bearer_tokens: vec![],
        });
        let app = build_router(state, &[]);

        let req = Request::builder()
            .uri("/v1/history")
            .header("X-User-Id", "user_a")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);

        let body = json_body(response).await;
        assert_eq!(body["error"], "Failed to fetch calculation history.");
    }

    #[tokio::test]
    async fn blank_user_header_is_anonymous() {
        let app = build_router(test_state(), &[]);

        let req = Request::builder()
            .uri("/v1/history")
            .header("X-User-Id", "  ")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
