use crate::routing::mode::ChatMode;

/// Chat turn as sent upstream, independent of the client wire shape.
#[derive(Debug, Clone, PartialEq)]
pub struct IrChatRequest {
    pub mode: ChatMode,
    pub system: String,
    pub messages: Vec<ChatMessage>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub parts: Vec<ChatPart>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatRole {
    User,
    Model,
}

impl ChatRole {
    /// Client history uses `user` for the human and anything else for the assistant.
    pub fn from_client(role: &str) -> Self {
        if role == "user" {
            Self::User
        } else {
            Self::Model
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ChatPart {
    Text(String),
    InlineData { mime_type: String, data: String },
}
