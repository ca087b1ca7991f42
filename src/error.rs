use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    InvalidInput(String),

    #[error("payment processor rejected the request: {0}")]
    ProcessorRejected(Value),

    #[error("{0}")]
    Unauthorized(&'static str),

    #[error("{0}")]
    PayloadTooLarge(&'static str),

    #[error("unexpected error while {context}: {message}")]
    Unexpected {
        context: &'static str,
        message: String,
    },
}

impl ApiError {
    pub fn invalid_input(message: impl Into<String>) -> Self {
        ApiError::InvalidInput(message.into())
    }

    /// Wraps any failure the caller should only see as a generic 500.
    pub fn unexpected<E: std::fmt::Display>(context: &'static str) -> impl FnOnce(E) -> Self {
        move |err| ApiError::Unexpected {
            context,
            message: err.to_string(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidInput(_) | ApiError::ProcessorRejected(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::Unexpected { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let detail = match self {
            ApiError::InvalidInput(message) => Value::String(message),
            ApiError::ProcessorRejected(body) => body,
            ApiError::Unauthorized(message) | ApiError::PayloadTooLarge(message) => {
                Value::String(message.to_string())
            }
            ApiError::Unexpected { context, message } => {
                tracing::error!(%message, "unexpected error while {context}");
                Value::String(format!("unexpected error while {context}"))
            }
        };
        (status, Json(json!({ "detail": detail }))).into_response()
    }
}
