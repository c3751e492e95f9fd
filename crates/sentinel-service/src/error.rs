//! Error types for sentineld

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use sentinel_core::SentinelError;
use serde::Serialize;
use thiserror::Error;

/// Service bootstrap and lifecycle errors
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("provider setup failed: {0}")]
    Provider(#[from] SentinelError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("server error: {0}")]
    Server(String),
}

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Errors returned by HTTP handlers
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Provider(String),

    #[error("{0}")]
    Deployment(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Provider(_) => StatusCode::BAD_GATEWAY,
            ApiError::Deployment(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<SentinelError> for ApiError {
    fn from(err: SentinelError) -> Self {
        match err {
            SentinelError::Validation(message) => ApiError::Validation(message),
            provider @ SentinelError::Provider { .. } => ApiError::Provider(provider.to_string()),
            SentinelError::Deployment(message) => {
                ApiError::Deployment(format!("Failed to deploy contract: {}", message))
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Validation(rejection.body_text())
    }
}

/// Failure body shared by every endpoint
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub success: bool,
    pub message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), error = %self, "Request failed");
        }

        let body = ErrorBody {
            success: false,
            message: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            ApiError::from(SentinelError::validation("Contract code is required")).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::from(SentinelError::provider("openai", "timeout")).status(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            ApiError::from(SentinelError::deployment("rejected")).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
