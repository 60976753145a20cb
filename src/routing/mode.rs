use crate::config::{AppConfig, ModelSettings};
use crate::error::AppError;

/// Client-selected chat mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChatMode {
    #[default]
    Chat,
    /// "Build" mode, focused on code.
    Code,
}

impl ChatMode {
    /// Only the exact value `"code"` selects build mode.
    pub fn from_str_loose(mode: Option<&str>) -> Self {
        match mode {
            Some("code") => Self::Code,
            _ => Self::Chat,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Chat => "chat",
            Self::Code => "code",
        }
    }
}

/// Model and credential resolved for a single request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModeConfig {
    pub model: String,
    pub api_key: String,
}

fn select(settings: &ModelSettings) -> Result<ModeConfig, AppError> {
    let api_key = settings
        .api_key
        .as_deref()
        .filter(|k| !k.is_empty())
        .ok_or_else(|| AppError::Configuration(settings.key_var.to_string()))?;

    Ok(ModeConfig {
        model: settings.model.clone(),
        api_key: api_key.to_string(),
    })
}

/// Pick the chat or build profile for a chat request.
pub fn resolve_chat(config: &AppConfig, mode: ChatMode) -> Result<ModeConfig, AppError> {
    match mode {
        ChatMode::Chat => select(&config.chat),
        ChatMode::Code => select(&config.build),
    }
}

/// Profile used by image generation and editing.
pub fn resolve_image(config: &AppConfig) -> Result<ModeConfig, AppError> {
    select(&config.image)
}

/// Profile used by web and map search.
pub fn resolve_search(config: &AppConfig) -> Result<ModeConfig, AppError> {
    select(&config.chat)
}
