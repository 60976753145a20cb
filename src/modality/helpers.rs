use crate::error::AppError;
use regex::Regex;
use serde::{de::DeserializeOwned, Serialize};
use std::sync::LazyLock;

static DATA_URI: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^data:([^;,]+);base64,(.+)$").expect("data URI pattern is valid")
});

/// Deserialize JSON bytes, wrapping errors as AppError::Codec.
pub fn from_json<T: DeserializeOwned>(data: &[u8]) -> Result<T, AppError> {
    serde_json::from_slice(data).map_err(|e| AppError::Codec(e.to_string()))
}

/// Deserialize JSON string, wrapping errors as AppError::Codec.
pub fn from_json_str<T: DeserializeOwned>(data: &str) -> Result<T, AppError> {
    serde_json::from_str(data).map_err(|e| AppError::Codec(e.to_string()))
}

/// Serialize value to JSON string, wrapping errors as AppError::Codec.
pub fn to_json_str<T: Serialize>(value: &T) -> Result<String, AppError> {
    serde_json::to_string(value).map_err(|e| AppError::Codec(e.to_string()))
}

/// Split a `data:<mime>;base64,<payload>` URI into `(mime, payload)`.
pub fn parse_data_uri(uri: &str) -> Option<(&str, &str)> {
    let caps = DATA_URI.captures(uri)?;
    Some((caps.get(1)?.as_str(), caps.get(2)?.as_str()))
}

pub fn to_data_uri(mime_type: &str, data: &str) -> String {
    format!("data:{};base64,{}", mime_type, data)
}

/// Trim an optional request field, treating blank as missing.
pub fn required_field<'a>(value: Option<&'a str>, message: &str) -> Result<&'a str, AppError> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| AppError::BadRequest(message.to_string()))
}
