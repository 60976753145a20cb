use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0} not configured")]
    Configuration(String),

    #[error("Upstream error: {status} {body}")]
    Upstream { status: u16, body: String },

    #[error("Codec error: {0}")]
    Codec(String),

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("{0}")]
    Internal(String),
}

impl AppError {
    /// Replace an upstream-side failure with a generic message for the client.
    /// The detailed error is logged first. Client-side errors pass through.
    pub fn generic(self, message: &str) -> AppError {
        match self {
            AppError::Upstream { .. }
            | AppError::HttpClient(_)
            | AppError::Codec(_) => {
                log::error!("{}: {}", message, self);
                AppError::Internal(message.to_string())
            }
            other => other,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Configuration(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Upstream { .. } => StatusCode::BAD_GATEWAY,
            AppError::Codec(_) => StatusCode::BAD_REQUEST,
            AppError::HttpClient(_) => StatusCode::BAD_GATEWAY,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status.is_server_error() {
            log::error!("Request failed with {}: {}", status, self);
        }

        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generic_hides_upstream_detail() {
        let err = AppError::Upstream {
            status: 429,
            body: "quota exceeded".into(),
        }
        .generic("Search failed");
        assert!(matches!(&err, AppError::Internal(m) if m == "Search failed"));
    }

    #[test]
    fn generic_keeps_client_errors() {
        let err = AppError::BadRequest("Query is required".into()).generic("Search failed");
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[test]
    fn status_codes() {
        assert_eq!(
            AppError::BadRequest("x".into()).into_response().status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::Configuration("GEMINI_CHAT_API_KEY".into())
                .into_response()
                .status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            AppError::Upstream {
                status: 503,
                body: String::new()
            }
            .into_response()
            .status(),
            StatusCode::BAD_GATEWAY
        );
    }
}
