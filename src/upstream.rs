use crate::error::AppError;
use crate::modality::gemini::{GeminiRequest, GeminiResponse};
use crate::modality::helpers::from_json;
use crate::routing::mode::ModeConfig;
use std::time::Duration;

/// Client for the generative-language REST API. Cheap to clone.
#[derive(Clone)]
pub struct GeminiClient {
    http: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

fn build_upstream_url(base_url: &str, model: &str, stream: bool) -> String {
    let base = base_url.trim_end_matches('/');
    if stream {
        format!("{}/v1beta/models/{}:streamGenerateContent?alt=sse", base, model)
    } else {
        format!("{}/v1beta/models/{}:generateContent", base, model)
    }
}

fn apply_auth(builder: reqwest::RequestBuilder, api_key: &str) -> reqwest::RequestBuilder {
    builder.header("x-goog-api-key", api_key)
}

impl GeminiClient {
    pub fn new(http: reqwest::Client, base_url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            http,
            base_url: base_url.into(),
            timeout,
        }
    }

    /// Turn a non-2xx response into `AppError::Upstream`, keeping the body for logs.
    async fn check_status(resp: reqwest::Response) -> Result<reqwest::Response, AppError> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        let body = resp.text().await.unwrap_or_default();
        log::error!("Upstream returned {}: {}", status, body);
        Err(AppError::Upstream {
            status: status.as_u16(),
            body,
        })
    }

    /// Open a streaming chat turn. The returned response has a 2xx status and
    /// its body has not been read yet.
    pub async fn stream_chat(
        &self,
        mode: &ModeConfig,
        request: &GeminiRequest,
    ) -> Result<reqwest::Response, AppError> {
        let url = build_upstream_url(&self.base_url, &mode.model, true);
        let resp = apply_auth(self.http.post(&url), &mode.api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                log::error!("Failed to reach upstream for {}: {}", mode.model, e);
                e
            })?;
        Self::check_status(resp).await
    }

    /// Single `generateContent` round trip.
    pub async fn generate_content(
        &self,
        mode: &ModeConfig,
        request: &GeminiRequest,
    ) -> Result<GeminiResponse, AppError> {
        let url = build_upstream_url(&self.base_url, &mode.model, false);
        let resp = apply_auth(self.http.post(&url), &mode.api_key)
            .timeout(self.timeout)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                log::error!("Failed to reach upstream for {}: {}", mode.model, e);
                e
            })?;
        let resp = Self::check_status(resp).await?;
        let body = resp.bytes().await?;
        from_json(&body)
    }

    pub async fn generate_image(
        &self,
        mode: &ModeConfig,
        request: &GeminiRequest,
    ) -> Result<GeminiResponse, AppError> {
        log::debug!("Requesting image from {}", mode.model);
        self.generate_content(mode, request).await
    }

    pub async fn web_search(
        &self,
        mode: &ModeConfig,
        query: &str,
    ) -> Result<GeminiResponse, AppError> {
        log::debug!("Web search via {}: {}", mode.model, query);
        self.generate_content(mode, &crate::modality::search::web_search_request(query))
            .await
    }

    pub async fn map_search(
        &self,
        mode: &ModeConfig,
        query: &str,
    ) -> Result<GeminiResponse, AppError> {
        log::debug!("Map search via {}: {}", mode.model, query);
        self.generate_content(mode, &crate::modality::search::map_search_request(query))
            .await
    }
}
