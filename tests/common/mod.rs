#![allow(dead_code)]

use axum::body::Body;
use axum::http::{HeaderMap, Request, StatusCode};
use axum::Router;
use lepen_gateway::config::ModelSettings;
use lepen_gateway::{create_router, AppConfig, ProxyState};
use serde_json::Value;
use tower::ServiceExt;
use wiremock::MockServer;

pub const CHAT_MODEL: &str = "chat-model";
pub const BUILD_MODEL: &str = "build-model";
pub const IMAGE_MODEL: &str = "image-model";

pub fn stream_path(model: &str) -> String {
    format!("/v1beta/models/{}:streamGenerateContent", model)
}

pub fn generate_path(model: &str) -> String {
    format!("/v1beta/models/{}:generateContent", model)
}

pub fn test_config(server: &MockServer) -> AppConfig {
    AppConfig {
        upstream_base_url: server.uri(),
        chat: ModelSettings {
            model: CHAT_MODEL.into(),
            api_key: Some("chat-key".into()),
            key_var: "GEMINI_CHAT_API_KEY",
        },
        build: ModelSettings {
            model: BUILD_MODEL.into(),
            api_key: Some("build-key".into()),
            key_var: "GEMINI_BUILD_API_KEY",
        },
        image: ModelSettings {
            model: IMAGE_MODEL.into(),
            api_key: Some("image-key".into()),
            key_var: "GEMINI_IMAGE_API_KEY",
        },
        ..AppConfig::default()
    }
}

pub fn app(config: AppConfig) -> Router {
    create_router(ProxyState::new(config))
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
}

impl TestResponse {
    pub fn json(&self) -> Value {
        serde_json::from_str(&self.body).unwrap()
    }

    /// Payloads of every `data:` event in an SSE body.
    pub fn events(&self) -> Vec<String> {
        self.body
            .split("\n\n")
            .filter_map(|e| e.strip_prefix("data: "))
            .map(str::to_string)
            .collect()
    }
}

pub async fn send(app: Router, req: Request<Body>) -> TestResponse {
    let resp = app.oneshot(req).await.unwrap();
    let status = resp.status();
    let headers = resp.headers().clone();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap();
    TestResponse {
        status,
        headers,
        body: String::from_utf8(bytes.to_vec()).unwrap(),
    }
}

pub async fn post_json(app: Router, path: &str, body: Value) -> TestResponse {
    let req = Request::builder()
        .method("POST")
        .uri(path)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, req).await
}

pub async fn get(app: Router, path: &str) -> TestResponse {
    let req = Request::builder()
        .method("GET")
        .uri(path)
        .body(Body::empty())
        .unwrap();
    send(app, req).await
}

/// An upstream SSE body with one text frame per entry.
pub fn sse_body(texts: &[&str]) -> String {
    texts
        .iter()
        .map(|t| {
            format!(
                "data: {}\r\n\r\n",
                serde_json::json!({"candidates": [{"content": {"role": "model", "parts": [{"text": t}]}}]})
            )
        })
        .collect()
}

pub fn text_response(text: &str) -> Value {
    serde_json::json!({
        "candidates": [{"content": {"role": "model", "parts": [{"text": text}]}}]
    })
}
