use super::gemini::{
    GeminiContent, GeminiGenerationConfig, GeminiPart, GeminiRequest, GeminiResponse,
    GeminiSystemInstruction, GeminiTool,
};
use crate::error::AppError;
use serde::{Deserialize, Serialize};

const MAP_SYSTEM_PROMPT: &str = r#"You are a location assistant. When given a location query:
1. Identify the locations mentioned
2. Provide coordinates (latitude/longitude)
3. Return a JSON response with this format:
{
  "locations": [
    {"name": "Place Name", "lat": 0.0, "lng": 0.0, "description": "Brief description"}
  ],
  "center": {"lat": 0.0, "lng": 0.0},
  "zoom": 12,
  "message": "Description of the locations"
}
Only return valid JSON."#;

#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    #[serde(default)]
    pub query: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct WebSearchResponse {
    pub content: String,
    pub results: String,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MapSearchResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub map_data: Option<serde_json::Value>,
    pub content: String,
}

fn single_turn(text: String) -> Vec<GeminiContent> {
    vec![GeminiContent {
        role: None,
        parts: vec![GeminiPart::text(text)],
    }]
}

/// Grounded search request: the upstream runs the search itself.
pub fn web_search_request(query: &str) -> GeminiRequest {
    GeminiRequest {
        contents: single_turn(format!(
            "Search and provide detailed information about: {}",
            query
        )),
        system_instruction: None,
        generation_config: Some(GeminiGenerationConfig {
            temperature: Some(0.3),
            max_output_tokens: Some(4096),
            response_modalities: None,
        }),
        tools: Some(vec![GeminiTool::google_search()]),
    }
}

pub fn map_search_request(query: &str) -> GeminiRequest {
    GeminiRequest {
        contents: single_turn(format!("Find location information for: {}", query)),
        system_instruction: Some(GeminiSystemInstruction::text(MAP_SYSTEM_PROMPT)),
        generation_config: Some(GeminiGenerationConfig {
            temperature: Some(0.2),
            max_output_tokens: Some(2048),
            response_modalities: None,
        }),
        tools: None,
    }
}

/// Generated text of the first candidate, or `missing` as an error.
pub fn answer_text(resp: &GeminiResponse, missing: &str) -> Result<String, AppError> {
    resp.first_text()
        .map(str::to_string)
        .ok_or_else(|| AppError::Internal(missing.to_string()))
}

pub fn reshape_web(text: String) -> WebSearchResponse {
    WebSearchResponse {
        content: text.clone(),
        results: text,
    }
}

/// Strip a surrounding markdown code fence, preferring a ```json fence.
fn strip_code_fence(text: &str) -> &str {
    let inner = match text.split_once("```json") {
        Some((_, rest)) => rest,
        None => match text.split_once("```") {
            Some((_, rest)) => rest,
            None => return text.trim(),
        },
    };
    inner
        .split_once("```")
        .map(|(body, _)| body)
        .unwrap_or(inner)
        .trim()
}

/// Parse the model's location answer. Anything that is not a JSON object is
/// returned verbatim as `content` with no `mapData`.
pub fn reshape_map(text: &str) -> MapSearchResponse {
    match serde_json::from_str::<serde_json::Value>(strip_code_fence(text)) {
        Ok(map_data) if map_data.is_object() => {
            let content = map_data
                .get("message")
                .and_then(|m| m.as_str())
                .unwrap_or_default()
                .to_string();
            MapSearchResponse {
                map_data: Some(map_data),
                content,
            }
        }
        Ok(_) | Err(_) => {
            log::debug!("Map answer was not a JSON object, returning raw text");
            MapSearchResponse {
                map_data: None,
                content: text.to_string(),
            }
        }
    }
}
