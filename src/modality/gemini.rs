use super::chat::ir::{ChatMessage, ChatPart, ChatRole, IrChatRequest};
use super::helpers::from_json_str;
use crate::error::AppError;
use serde::{Deserialize, Serialize};

// --- Gemini Wire Types (Request) ---

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiRequest {
    pub contents: Vec<GeminiContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_instruction: Option<GeminiSystemInstruction>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generation_config: Option<GeminiGenerationConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<GeminiTool>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GeminiContent {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GeminiSystemInstruction {
    pub parts: Vec<GeminiPart>,
}

impl GeminiSystemInstruction {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            parts: vec![GeminiPart::text(text)],
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiPart {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inline_data: Option<GeminiInlineData>,
}

impl GeminiPart {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            inline_data: None,
        }
    }

    pub fn inline(mime_type: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            text: None,
            inline_data: Some(GeminiInlineData {
                mime_type: mime_type.into(),
                data: data.into(),
            }),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiInlineData {
    pub mime_type: String,
    pub data: String,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiGenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_output_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_modalities: Option<Vec<String>>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiTool {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub google_search: Option<serde_json::Value>,
}

impl GeminiTool {
    pub fn google_search() -> Self {
        Self {
            google_search: Some(serde_json::json!({})),
        }
    }
}

// --- Gemini Wire Types (Response) ---

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiResponse {
    #[serde(default)]
    pub candidates: Vec<GeminiCandidate>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiCandidate {
    #[serde(default)]
    pub content: Option<GeminiContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finish_reason: Option<String>,
}

impl GeminiResponse {
    /// Parts of the first candidate, or `None` when the response has no candidates.
    pub fn first_candidate_parts(&self) -> Option<&[GeminiPart]> {
        let candidate = self.candidates.first()?;
        Some(
            candidate
                .content
                .as_ref()
                .map(|c| c.parts.as_slice())
                .unwrap_or(&[]),
        )
    }

    /// `candidates[0].content.parts[0].text`, if every segment is present and non-empty.
    pub fn first_text(&self) -> Option<&str> {
        self.first_candidate_parts()?
            .first()?
            .text
            .as_deref()
            .filter(|t| !t.is_empty())
    }
}

// --- Conversion ---

const CHAT_TEMPERATURE: f64 = 0.7;
const CHAT_MAX_OUTPUT_TOKENS: u32 = 8192;

fn ir_role_to_gemini(role: ChatRole) -> &'static str {
    match role {
        ChatRole::User => "user",
        ChatRole::Model => "model",
    }
}

fn ir_message_to_gemini(message: &ChatMessage) -> GeminiContent {
    let parts = message
        .parts
        .iter()
        .map(|part| match part {
            ChatPart::Text(text) => GeminiPart::text(text.clone()),
            ChatPart::InlineData { mime_type, data } => {
                GeminiPart::inline(mime_type.clone(), data.clone())
            }
        })
        .collect();

    GeminiContent {
        role: Some(ir_role_to_gemini(message.role).to_string()),
        parts,
    }
}

/// Build the `streamGenerateContent` body for a chat turn.
pub fn encode_chat_request(ir: &IrChatRequest) -> GeminiRequest {
    GeminiRequest {
        contents: ir.messages.iter().map(ir_message_to_gemini).collect(),
        system_instruction: Some(GeminiSystemInstruction::text(ir.system.clone())),
        generation_config: Some(GeminiGenerationConfig {
            temperature: Some(CHAT_TEMPERATURE),
            max_output_tokens: Some(CHAT_MAX_OUTPUT_TOKENS),
            response_modalities: None,
        }),
        tools: None,
    }
}

/// Decode the payload of one upstream `data:` line into its text delta.
///
/// Returns `Ok(None)` for frames that carry no text (usage-only, safety
/// blocks, empty parts). Returns an error only when the payload is not JSON.
pub fn decode_stream_chunk(data: &str) -> Result<Option<String>, AppError> {
    if data.trim().is_empty() {
        return Ok(None);
    }

    let chunk: GeminiResponse = from_json_str(data)?;
    Ok(chunk.first_text().map(str::to_string))
}
