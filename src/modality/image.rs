use super::gemini::{GeminiContent, GeminiGenerationConfig, GeminiPart, GeminiRequest, GeminiResponse};
use super::helpers::{parse_data_uri, required_field, to_data_uri};
use crate::error::AppError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageEditRequest {
    #[serde(default)]
    pub prompt: Option<String>,
    /// Source image for edits, as a `data:` URI.
    #[serde(default)]
    pub image_data: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ImageEditResponse {
    pub image_url: Option<String>,
    pub text: String,
}

/// A validated generate-or-edit request.
#[derive(Debug)]
pub struct ImageJob<'a> {
    prompt: &'a str,
    source: Option<(&'a str, &'a str)>,
}

impl<'a> ImageJob<'a> {
    pub fn from_request(req: &'a ImageEditRequest) -> Result<Self, AppError> {
        let prompt = required_field(req.prompt.as_deref(), "Prompt is required")?;
        let source = req.image_data.as_deref().and_then(parse_data_uri);
        Ok(Self { prompt, source })
    }

    pub fn is_edit(&self) -> bool {
        self.source.is_some()
    }

    pub fn to_gemini_request(&self) -> GeminiRequest {
        let parts = match self.source {
            Some((mime_type, data)) => vec![
                GeminiPart::inline(mime_type, data),
                GeminiPart::text(format!("Edit this image: {}", self.prompt)),
            ],
            None => vec![GeminiPart::text(format!("Generate an image: {}", self.prompt))],
        };

        GeminiRequest {
            contents: vec![GeminiContent { role: None, parts }],
            system_instruction: None,
            generation_config: Some(GeminiGenerationConfig {
                response_modalities: Some(vec!["TEXT".to_string(), "IMAGE".to_string()]),
                ..Default::default()
            }),
            tools: None,
        }
    }

    /// Collect the returned image and caption into the client response.
    pub fn reshape(&self, resp: &GeminiResponse) -> Result<ImageEditResponse, AppError> {
        let parts = resp
            .first_candidate_parts()
            .ok_or_else(|| AppError::Internal("No image generated".into()))?;

        let mut image_url = None;
        let mut text = if self.is_edit() {
            "Here's your edited image!".to_string()
        } else {
            "Here's your generated image!".to_string()
        };

        for part in parts {
            if let Some(inline) = &part.inline_data {
                image_url = Some(to_data_uri(&inline.mime_type, &inline.data));
            } else if let Some(t) = part.text.as_deref().filter(|t| !t.is_empty()) {
                text = t.to_string();
            }
        }

        if image_url.is_none() {
            log::warn!("Image model returned no inline image for prompt");
        }

        Ok(ImageEditResponse { image_url, text })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(prompt: Option<&str>, image: Option<&str>) -> ImageEditRequest {
        ImageEditRequest {
            prompt: prompt.map(String::from),
            image_data: image.map(String::from),
        }
    }

    fn response(value: serde_json::Value) -> GeminiResponse {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn missing_prompt_is_rejected() {
        let req = request(None, None);
        assert!(matches!(ImageJob::from_request(&req), Err(AppError::BadRequest(_))));
        let req = request(Some("  "), None);
        assert!(ImageJob::from_request(&req).is_err());
    }

    #[test]
    fn edit_request_sends_image_before_instruction() {
        let req = request(Some("add a hat"), Some("data:image/png;base64,AAAA"));
        let job = ImageJob::from_request(&req).unwrap();
        assert!(job.is_edit());

        let body = serde_json::to_value(job.to_gemini_request()).unwrap();
        let parts = &body["contents"][0]["parts"];
        assert_eq!(parts[0]["inlineData"]["data"], "AAAA");
        assert_eq!(parts[1]["text"], "Edit this image: add a hat");
        assert_eq!(
            body["generationConfig"]["responseModalities"],
            serde_json::json!(["TEXT", "IMAGE"])
        );
        assert!(body["generationConfig"].get("temperature").is_none());
    }

    #[test]
    fn unparseable_source_falls_back_to_generation() {
        let req = request(Some("a cat"), Some("https://example.com/cat.png"));
        let job = ImageJob::from_request(&req).unwrap();
        assert!(!job.is_edit());
        let body = serde_json::to_value(job.to_gemini_request()).unwrap();
        assert_eq!(body["contents"][0]["parts"][0]["text"], "Generate an image: a cat");
    }

    #[test]
    fn reshape_builds_data_uri_and_keeps_caption() {
        let req = request(Some("a cat"), None);
        let job = ImageJob::from_request(&req).unwrap();
        let out = job
            .reshape(&response(serde_json::json!({
                "candidates": [{"content": {"parts": [
                    {"text": "A cat in a hat"},
                    {"inlineData": {"mimeType": "image/png", "data": "iVBO"}}
                ]}}]
            })))
            .unwrap();

        assert_eq!(out.image_url.as_deref(), Some("data:image/png;base64,iVBO"));
        assert_eq!(out.text, "A cat in a hat");
    }

    #[test]
    fn reshape_uses_default_caption_without_text() {
        let req = request(Some("a hat"), Some("data:image/png;base64,AAAA"));
        let job = ImageJob::from_request(&req).unwrap();
        let out = job
            .reshape(&response(serde_json::json!({
                "candidates": [{"content": {"parts": [
                    {"inlineData": {"mimeType": "image/jpeg", "data": "/9j/"}}
                ]}}]
            })))
            .unwrap();
        assert_eq!(out.text, "Here's your edited image!");
    }

    #[test]
    fn reshape_without_candidates_fails() {
        let req = request(Some("a cat"), None);
        let job = ImageJob::from_request(&req).unwrap();
        let err = job.reshape(&response(serde_json::json!({"candidates": []}))).unwrap_err();
        assert!(matches!(err, AppError::Internal(m) if m == "No image generated"));
    }
}
