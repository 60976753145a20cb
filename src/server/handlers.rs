use super::proxy::ProxyState;
use crate::error::AppError;
use crate::modality::helpers::{from_json, required_field};
use crate::modality::image::{ImageEditRequest, ImageEditResponse, ImageJob};
use crate::modality::search::{self, MapSearchResponse, SearchRequest, WebSearchResponse};
use crate::routing::mode;
use axum::extract::State;
use axum::response::Json;
use bytes::Bytes;

/// `POST /api/generate-image`: generate a new image, or edit `imageData`.
pub async fn generate_image(
    State(state): State<ProxyState>,
    body: Bytes,
) -> Result<Json<ImageEditResponse>, AppError> {
    let mode_config = mode::resolve_image(&state.config)?;
    let req: ImageEditRequest = from_json(&body)?;
    let job = ImageJob::from_request(&req)?;

    log::info!(
        "Image {} via {}",
        if job.is_edit() { "edit" } else { "generation" },
        mode_config.model
    );

    let resp = state
        .upstream
        .generate_image(&mode_config, &job.to_gemini_request())
        .await
        .map_err(|e| e.generic("Image generation failed"))?;

    Ok(Json(job.reshape(&resp)?))
}

/// `POST /api/web-search`: answer a query with search grounding enabled.
pub async fn web_search(
    State(state): State<ProxyState>,
    body: Bytes,
) -> Result<Json<WebSearchResponse>, AppError> {
    let mode_config = mode::resolve_search(&state.config)?;
    let req: SearchRequest = from_json(&body)?;
    let query = required_field(req.query.as_deref(), "Query is required")?;

    let resp = state
        .upstream
        .web_search(&mode_config, query)
        .await
        .map_err(|e| e.generic("Search failed"))?;

    let text = search::answer_text(&resp, "No search results")?;
    Ok(Json(search::reshape_web(text)))
}

/// `POST /api/map-search`: locate places, returning structured map data when
/// the model answers with valid JSON.
pub async fn map_search(
    State(state): State<ProxyState>,
    body: Bytes,
) -> Result<Json<MapSearchResponse>, AppError> {
    let mode_config = mode::resolve_search(&state.config)?;
    let req: SearchRequest = from_json(&body)?;
    let query = required_field(req.query.as_deref(), "Query is required")?;

    let resp = state
        .upstream
        .map_search(&mode_config, query)
        .await
        .map_err(|e| e.generic("Location search failed"))?;

    let text = search::answer_text(&resp, "No location results")?;
    Ok(Json(search::reshape_map(&text)))
}
