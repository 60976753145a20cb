use super::ir::{ChatMessage, ChatPart, ChatRole, IrChatRequest};
use super::system_prompt;
use crate::error::AppError;
use crate::modality::helpers::{from_json, parse_data_uri, to_json_str};
use crate::routing::mode::ChatMode;
use serde::{Deserialize, Serialize};

// --- Client Wire Types ---

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientChatRequest {
    #[serde(default)]
    pub messages: Vec<ClientMessage>,
    #[serde(default)]
    pub mode: Option<String>,
    /// Attached to the last message when it has no image of its own.
    #[serde(default)]
    pub image_data: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientMessage {
    pub role: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub image_data: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct DeltaFrame<'a> {
    pub choices: [DeltaChoice<'a>; 1],
}

#[derive(Debug, Serialize)]
pub struct DeltaChoice<'a> {
    pub delta: Delta<'a>,
}

#[derive(Debug, Serialize)]
pub struct Delta<'a> {
    pub content: &'a str,
}

#[derive(Debug, Serialize)]
pub struct ErrorFrame<'a> {
    pub error: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<&'a str>,
}

pub const STREAM_DONE_SIGNAL: &str = "[DONE]";

/// Decode an `/api/chat` body into IR.
pub fn decode_request(body: &[u8]) -> Result<IrChatRequest, AppError> {
    let req: ClientChatRequest = from_json(body)?;
    if req.messages.is_empty() {
        return Err(AppError::BadRequest("Messages are required".into()));
    }
    let mode = ChatMode::from_str_loose(req.mode.as_deref());
    let last = req.messages.len().saturating_sub(1);

    let messages = req
        .messages
        .iter()
        .enumerate()
        .map(|(i, msg)| {
            let image = msg
                .image_data
                .as_deref()
                .or(if i == last { req.image_data.as_deref() } else { None });

            let mut parts = Vec::with_capacity(2);
            if let Some((mime_type, data)) = image.and_then(parse_data_uri) {
                parts.push(ChatPart::InlineData {
                    mime_type: mime_type.to_string(),
                    data: data.to_string(),
                });
            }
            parts.push(ChatPart::Text(msg.content.clone()));

            ChatMessage {
                role: ChatRole::from_client(&msg.role),
                parts,
            }
        })
        .collect();

    Ok(IrChatRequest {
        mode,
        system: system_prompt(mode),
        messages,
    })
}

/// Encode one text delta as a complete SSE event.
pub fn encode_stream_chunk(text: &str) -> Result<String, AppError> {
    let frame = DeltaFrame {
        choices: [DeltaChoice {
            delta: Delta { content: text },
        }],
    };
    Ok(sse_event(&to_json_str(&frame)?))
}

pub fn encode_stream_done() -> String {
    sse_event(STREAM_DONE_SIGNAL)
}

/// Encode an in-band error event. Falls back to a fixed payload if
/// serialization fails so the client always sees a terminal frame.
pub fn encode_stream_error(message: &str, status: Option<u16>, details: Option<&str>) -> String {
    let frame = ErrorFrame {
        error: message,
        status,
        details,
    };
    match to_json_str(&frame) {
        Ok(json) => sse_event(&json),
        Err(_) => sse_event(r#"{"error":"stream failed"}"#),
    }
}

fn sse_event(data: &str) -> String {
    format!("data: {}\n\n", data)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode(value: serde_json::Value) -> IrChatRequest {
        decode_request(serde_json::to_vec(&value).unwrap().as_slice()).unwrap()
    }

    #[test]
    fn decode_request_maps_roles_and_mode() {
        let ir = decode(serde_json::json!({
            "messages": [
                {"role": "user", "content": "hi"},
                {"role": "assistant", "content": "hello"},
                {"role": "user", "content": "write code"}
            ],
            "mode": "code"
        }));

        assert_eq!(ir.mode, ChatMode::Code);
        assert_eq!(ir.messages.len(), 3);
        assert_eq!(ir.messages[0].role, ChatRole::User);
        assert_eq!(ir.messages[1].role, ChatRole::Model);
        assert_eq!(ir.messages[2].parts, vec![ChatPart::Text("write code".into())]);
        assert!(ir.system.contains("Build mode"));
    }

    #[test]
    fn top_level_image_goes_to_last_message_only() {
        let ir = decode(serde_json::json!({
            "messages": [
                {"role": "user", "content": "first"},
                {"role": "user", "content": "what is this?"}
            ],
            "imageData": "data:image/jpeg;base64,/9j/4AAQ"
        }));

        assert_eq!(ir.mode, ChatMode::Chat);
        assert_eq!(ir.messages[0].parts.len(), 1);
        assert_eq!(
            ir.messages[1].parts,
            vec![
                ChatPart::InlineData {
                    mime_type: "image/jpeg".into(),
                    data: "/9j/4AAQ".into()
                },
                ChatPart::Text("what is this?".into()),
            ]
        );
    }

    #[test]
    fn per_message_image_and_bad_uri() {
        let ir = decode(serde_json::json!({
            "messages": [
                {"role": "user", "content": "a", "imageData": "data:image/png;base64,AAAA"},
                {"role": "user", "content": "b", "imageData": "not-a-data-uri"}
            ]
        }));

        assert_eq!(ir.messages[0].parts.len(), 2);
        assert_eq!(ir.messages[1].parts, vec![ChatPart::Text("b".into())]);
    }

    #[test]
    fn decode_request_rejects_invalid_json() {
        assert!(matches!(
            decode_request(b"{\"messages\": ["),
            Err(AppError::Codec(_))
        ));
    }

    #[test]
    fn stream_frames_use_sse_framing() {
        assert_eq!(
            encode_stream_chunk("Hel\"lo").unwrap(),
            "data: {\"choices\":[{\"delta\":{\"content\":\"Hel\\\"lo\"}}]}\n\n"
        );
        assert_eq!(encode_stream_done(), "data: [DONE]\n\n");
        assert_eq!(
            encode_stream_error("AI API error", Some(429), Some("quota")),
            "data: {\"error\":\"AI API error\",\"status\":429,\"details\":\"quota\"}\n\n"
        );
        assert_eq!(
            encode_stream_error("reset", None, None),
            "data: {\"error\":\"reset\"}\n\n"
        );
    }
}
