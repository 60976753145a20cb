use super::handlers;
use super::middleware::track_request;
use super::proxy::{self, ProxyState};
use axum::extract::{DefaultBodyLimit, State};
use axum::response::Json;
use axum::routing::{get, post};
use axum::Router;
use serde_json::{json, Value};
use tower_http::cors::CorsLayer;

pub const SERVICE_NAME: &str = "lepen-ai-backend";

pub fn create_router(state: ProxyState) -> Router {
    let body_limit = state.config.max_body_bytes;

    Router::new()
        .route("/health", get(health_check))
        .route("/ping", get(ping))
        .route("/api/keepalive", get(keepalive))
        // Streaming chat
        .route("/api/chat", post(proxy::proxy_chat))
        // Single-shot operations
        .route("/api/generate-image", post(handlers::generate_image))
        .route("/api/web-search", post(handlers::web_search))
        .route("/api/map-search", post(handlers::map_search))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            track_request,
        ))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn health_check(State(state): State<ProxyState>) -> Json<Value> {
    let metrics = state.metrics.snapshot();
    Json(json!({
        "status": "ok",
        "service": SERVICE_NAME,
        "version": env!("CARGO_PKG_VERSION"),
        "models": {
            "chat": state.config.chat.model,
            "build": state.config.build.model,
            "image": state.config.image.model,
        },
        "ready": state.config.is_ready(),
        "uptime_seconds": metrics.uptime_seconds,
        "idle_seconds": metrics.idle_seconds,
        "requests_total": metrics.requests_total,
        "active_streams": metrics.active_streams,
    }))
}

async fn ping() -> &'static str {
    "pong"
}

async fn keepalive() -> Json<Value> {
    Json(json!({
        "alive": true,
        "timestamp": chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true),
    }))
}
