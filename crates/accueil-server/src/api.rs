//! Error responses for the non-webhook endpoints.

use accueil_voice::VoiceError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

/// API error type mapping to HTTP status codes.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid input: {0}")]
    BadRequest(String),
    #[error("upstream failure: {0}")]
    BadGateway(String),
    #[error("internal server error: {0}")]
    InternalServerError(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::BadGateway(_) => StatusCode::BAD_GATEWAY,
            ApiError::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<VoiceError> for ApiError {
    fn from(err: VoiceError) -> Self {
        match err {
            VoiceError::EmptyText | VoiceError::TextTooLong { .. } => {
                ApiError::BadRequest(err.to_string())
            }
            _ if err.is_upstream() => ApiError::BadGateway(err.to_string()),
            _ => ApiError::InternalServerError(err.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match self {
            ApiError::BadRequest(msg)
            | ApiError::BadGateway(msg)
            | ApiError::InternalServerError(msg) => msg,
        };

        let body = Json(serde_json::json!({
            "error": message
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn synthesis_failures_map_to_statuses() {
        let cases = [
            (VoiceError::EmptyText, StatusCode::BAD_REQUEST),
            (
                VoiceError::TextTooLong {
                    len: 5000,
                    limit: 4096,
                },
                StatusCode::BAD_REQUEST,
            ),
            (VoiceError::MissingCredential, StatusCode::INTERNAL_SERVER_ERROR),
            (
                VoiceError::Upstream {
                    status: 401,
                    body: "unauthorized".to_string(),
                },
                StatusCode::BAD_GATEWAY,
            ),
            (VoiceError::MissingAudio, StatusCode::BAD_GATEWAY),
            (VoiceError::Timeout(10_000), StatusCode::BAD_GATEWAY),
        ];
        for (err, expected) in cases {
            let label = err.to_string();
            assert_eq!(ApiError::from(err).status(), expected, "{}", label);
        }
    }
}
