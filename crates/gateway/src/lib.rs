//! HTTP API gateway for gstmate.
//!
//! Exposes a health check and the v1 API (calculations, history,
//! summaries) behind bearer-token auth middleware. User identity arrives
//! from the fronting authentication collaborator as an `X-User-Id` header;
//! the gateway never authenticates end users itself.
//!
//! Built on Axum for high performance async HTTP.

pub mod api;

use axum::extract::DefaultBodyLimit;
use axum::{
    Router,
    extract::State,
    http::StatusCode,
    middleware::{self, Next},
    response::Json,
    routing::get,
};
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing::{info, warn};

use gstmate_service::CalcService;

/// Shared application state for the gateway.
pub struct GatewayState {
    pub service: Arc<CalcService>,
    /// Bearer tokens accepted on /v1 routes. Empty = no service auth.
    pub bearer_tokens: Vec<String>,
}

pub type SharedState = Arc<GatewayState>;

/// Build the Axum router with all gateway routes.
///
/// Layers applied:
/// - Bearer token authentication on all /v1 routes
/// - CORS restricted to the configured origins
/// - Request body size limit (64 KB — payloads are tiny JSON)
/// - HTTP trace logging
pub fn build_router(state: SharedState, allowed_origins: &[String]) -> Router {
    let v1 = api::v1_router(state.clone())
        .layer(middleware::from_fn_with_state(state, auth_middleware));

    let origins: Vec<_> = allowed_origins
        .iter()
        .filter_map(|o| o.parse().ok())
        .collect();
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([axum::http::Method::GET, axum::http::Method::POST])
        .allow_headers([
            axum::http::header::CONTENT_TYPE,
            axum::http::header::AUTHORIZATION,
            axum::http::HeaderName::from_static("x-user-id"),
        ])
        .max_age(std::time::Duration::from_secs(3600));

    Router::new()
        .route("/health", get(health_handler))
        .nest("/v1", v1)
        .layer(DefaultBodyLimit::max(64 * 1024))
        .layer(cors)
        .layer(tower_http::trace::TraceLayer::new_for_http())
}

/// Start the gateway HTTP server.
///
/// Builds the store and summarizer ONCE from configuration and injects
/// them into the service — no ambient singletons.
pub async fn start(config: gstmate_config::AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let addr = format!("{}:{}", config.gateway.host, config.gateway.port);

    let store = gstmate_store::build_from_config(&config).await?;
    let summarizer = gstmate_summarizer::build_from_config(&config)?;

    let service = Arc::new(
        CalcService::new(store.clone(), summarizer.clone())
            .with_history_limit(config.service.history_limit),
    );

    let state = Arc::new(GatewayState {
        service,
        bearer_tokens: config.gateway.bearer_tokens.clone(),
    });

    let app = build_router(state, &config.gateway.allowed_origins);

    info!(
        addr = %addr,
        store = %store.name(),
        summarizer = %summarizer.name(),
        "Gateway starting"
    );
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// --- Handlers ---

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Authentication middleware for the /v1 API.
///
/// Requires a valid `Authorization: Bearer <token>` header when tokens are
/// configured; with no tokens configured (local development) all requests
/// pass through.
async fn auth_middleware(
    State(state): State<SharedState>,
    req: axum::extract::Request,
    next: Next,
) -> Result<axum::response::Response, StatusCode> {
    if state.bearer_tokens.is_empty() {
        return Ok(next.run(req).await);
    }

    let auth_header = req
        .headers()
        .get("Authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));

    match auth_header {
        Some(token) if state.bearer_tokens.iter().any(|t| t == token) => {
            Ok(next.run(req).await)
        }
        _ => {
            warn!("Unauthorized request to /v1 API — missing or invalid bearer token");
            Err(StatusCode::UNAUTHORIZED)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    #[tokio::test]
    async fn health_endpoint() {
        let app = build_router(api::tests::test_state(), &[]);

        let req = Request::builder()
            .uri("/health")
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn v1_requires_bearer_token_when_configured() {
        let state = api::tests::test_state_with_tokens(vec!["secret-token".into()]);
        let app = build_router(state, &[]);

        let req = Request::builder()
            .uri("/v1/history")
            .header("X-User-Id", "user_a")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn v1_accepts_a_configured_bearer_token() {
        let state = api::tests::test_state_with_tokens(vec!["secret-token".into()]);
        let app = build_router(state, &[]);

        let req = Request::builder()
            .uri("/v1/history")
            .header("Authorization", "Bearer secret-token")
            .header("X-User-Id", "user_a")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn health_is_exempt_from_auth() {
        let state = api::tests::test_state_with_tokens(vec!["secret-token".into()]);
        let app = build_router(state, &[]);

        let req = Request::builder()
            .uri("/health")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
