use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Error surfaced to HTTP clients as `{"error", "message"}`.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }
}

impl From<cn_core::Error> for ApiError {
    fn from(error: cn_core::Error) -> Self {
        match error {
            cn_core::Error::InvalidInput(message) => Self::bad_request(message),
            other => Self {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                message: other.to_string(),
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let label = if self.status == StatusCode::BAD_REQUEST {
            "bad_request"
        } else {
            "internal_error"
        };
        (
            self.status,
            Json(json!({ "error": label, "message": self.message })),
        )
            .into_response()
    }
}
