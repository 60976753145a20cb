use super::proxy::ProxyState;
use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;
use std::time::Instant;

/// Health checks are counted but do not reset the idle clock.
const HEALTH_CHECK_PATHS: &[&str] = &["/health", "/ping"];

/// Count every request for `/health` and log a one-line summary.
///
/// For `/api/chat` the latency covers time to response headers, not the
/// whole stream.
pub async fn track_request(
    State(state): State<ProxyState>,
    req: Request,
    next: Next,
) -> Response {
    state.metrics.record_request();

    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let start = Instant::now();

    let resp = next.run(req).await;

    if !HEALTH_CHECK_PATHS.contains(&path.as_str()) {
        state.metrics.record_activity();
    }

    log::debug!(
        "{} {} -> {} in {}ms",
        method,
        path,
        resp.status().as_u16(),
        start.elapsed().as_millis()
    );
    resp
}
