use crate::config::AppConfig;
use crate::error::AppError;
use crate::metrics::ServiceMetrics;
use crate::modality::chat::client;
use crate::modality::chat::sse::{data_payload, LineBuffer};
use crate::modality::gemini;
use crate::routing::mode;
use crate::upstream::GeminiClient;
use axum::body::Body;
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::Response;
use bytes::Bytes;
use futures_core::Stream;
use std::convert::Infallible;
use std::sync::Arc;
use std::time::Instant;
use tokio_stream::StreamExt;

#[derive(Clone)]
pub struct ProxyState {
    pub config: Arc<AppConfig>,
    pub upstream: GeminiClient,
    pub metrics: Arc<ServiceMetrics>,
}

impl ProxyState {
    pub fn new(config: AppConfig) -> Self {
        let upstream = GeminiClient::new(
            reqwest::Client::new(),
            config.upstream_base_url.clone(),
            config.upstream_timeout,
        );
        Self {
            config: Arc::new(config),
            upstream,
            metrics: Arc::new(ServiceMetrics::new()),
        }
    }
}

/// Lifecycle of one relayed chat stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayState {
    Streaming,
    Done,
    Failed,
}

/// Owned by the outbound body. Dropping it while still `Streaming` means the
/// client went away; the upstream response is dropped alongside it, which
/// closes that connection.
pub struct StreamGuard {
    request_id: String,
    metrics: Arc<ServiceMetrics>,
    started: Instant,
    state: RelayState,
    relayed: usize,
}

impl StreamGuard {
    pub fn new(request_id: impl Into<String>, metrics: Arc<ServiceMetrics>) -> Self {
        metrics.stream_opened();
        Self {
            request_id: request_id.into(),
            metrics,
            started: Instant::now(),
            state: RelayState::Streaming,
            relayed: 0,
        }
    }

    fn finish(&mut self, state: RelayState) {
        self.state = state;
        log::info!(
            "[{}] stream {:?} after {} frames in {}ms",
            self.request_id,
            state,
            self.relayed,
            self.started.elapsed().as_millis()
        );
    }
}

impl Drop for StreamGuard {
    fn drop(&mut self) {
        if self.state == RelayState::Streaming {
            log::info!(
                "[{}] client disconnected after {} frames, aborting upstream",
                self.request_id,
                self.relayed
            );
        }
        self.metrics.stream_closed();
    }
}

/// Convert one upstream line into an outbound frame, if it carries text.
fn relay_line(line: &str) -> Option<String> {
    let data = data_payload(line)?;
    match gemini::decode_stream_chunk(data) {
        Ok(Some(text)) => match client::encode_stream_chunk(&text) {
            Ok(frame) => Some(frame),
            Err(e) => {
                log::error!("Encode stream chunk error: {}", e);
                None
            }
        },
        Ok(None) => None,
        Err(e) => {
            log::debug!("Skipping malformed upstream frame: {}", e);
            None
        }
    }
}

/// Re-frame an upstream SSE byte stream as client delta events.
///
/// Emits one frame per upstream text delta in receipt order, then either
/// `[DONE]` when the upstream ends or a single error frame on failure.
/// A partial line growing past `max_line` bytes counts as a failure.
pub fn relay_stream<S, E>(
    upstream: S,
    guard: StreamGuard,
    max_line: usize,
) -> impl Stream<Item = String> + Send + 'static
where
    S: Stream<Item = Result<Bytes, E>> + Send + 'static,
    E: std::fmt::Display + Send + 'static,
{
    async_stream::stream! {
        let mut guard = guard;
        let mut lines = LineBuffer::new(max_line);
        let mut upstream = Box::pin(upstream);

        let outcome = loop {
            match upstream.next().await {
                Some(Ok(chunk)) => match lines.push(&chunk) {
                    Ok(complete) => {
                        for line in complete {
                            if let Some(frame) = relay_line(&line) {
                                guard.relayed += 1;
                                yield frame;
                            }
                        }
                    }
                    Err(e) => {
                        log::error!("[{}] {}", guard.request_id, e);
                        yield client::encode_stream_error(&e.to_string(), None, None);
                        break RelayState::Failed;
                    }
                },
                Some(Err(e)) => {
                    log::error!("[{}] Upstream stream error: {}", guard.request_id, e);
                    yield client::encode_stream_error(&e.to_string(), None, None);
                    break RelayState::Failed;
                }
                None => match lines.finish() {
                    Ok(last) => {
                        if let Some(frame) = last.as_deref().and_then(relay_line) {
                            guard.relayed += 1;
                            yield frame;
                        }
                        yield client::encode_stream_done();
                        break RelayState::Done;
                    }
                    Err(e) => {
                        log::error!("[{}] {}", guard.request_id, e);
                        yield client::encode_stream_error(&e.to_string(), None, None);
                        break RelayState::Failed;
                    }
                },
            }
        };

        guard.finish(outcome);
    }
}

fn sse_response(body: Body) -> Result<Response, AppError> {
    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "text/event-stream")
        .header(header::CACHE_CONTROL, "no-cache")
        .header(header::CONNECTION, "keep-alive")
        .body(body)
        .map_err(|e| AppError::Internal(e.to_string()))
}

/// `POST /api/chat`: stream a chat turn back as SSE delta events.
pub async fn proxy_chat(
    State(state): State<ProxyState>,
    body: Bytes,
) -> Result<Response, AppError> {
    let ir = client::decode_request(&body)?;
    let mode_config = mode::resolve_chat(&state.config, ir.mode)?;
    let upstream_body = gemini::encode_chat_request(&ir);

    let request_id = uuid::Uuid::new_v4().to_string();
    log::info!(
        "[{}] chat turn mode={} model={} messages={}",
        request_id,
        ir.mode.as_str(),
        mode_config.model,
        ir.messages.len()
    );

    let body = match state.upstream.stream_chat(&mode_config, &upstream_body).await {
        Ok(resp) => {
            let guard = StreamGuard::new(request_id, state.metrics.clone());
            let frames =
                relay_stream(resp.bytes_stream(), guard, state.config.max_body_bytes);
            Body::from_stream(frames.map(Ok::<_, Infallible>))
        }
        Err(AppError::Upstream { status, body: detail }) => {
            log::error!("[{}] upstream rejected chat turn with {}", request_id, status);
            Body::from(client::encode_stream_error(
                "AI API error",
                Some(status),
                Some(detail.as_str()),
            ))
        }
        Err(e) => {
            log::error!("[{}] chat turn failed before streaming: {}", request_id, e);
            Body::from(client::encode_stream_error(&e.to_string(), None, None))
        }
    };

    sse_response(body)
}
