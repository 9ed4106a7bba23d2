use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

/// Errors surfaced at the HTTP boundary.
///
/// Response bodies carry a human message and a stable code only. Source
/// errors are logged when the response is built and never serialized.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Bad request: {0}")]
    BadRequest(anyhow::Error),

    #[error("Database not initialized")]
    DatabaseNotInitialized,

    #[error("Database unreachable: {0}")]
    DatabaseUnreachable(anyhow::Error),

    #[error("Database error: {0}")]
    DatabaseError(anyhow::Error),

    #[error("Internal server error: {0}")]
    InternalError(#[from] anyhow::Error),

    #[error("Configuration error: {0}")]
    ConfigError(anyhow::Error),
}

impl AppError {
    pub fn config(msg: impl std::fmt::Display) -> Self {
        AppError::ConfigError(anyhow::anyhow!("{}", msg))
    }

    /// Stable machine-readable code written to the `error` field.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::BadRequest(_) => "bad_request",
            AppError::DatabaseNotInitialized => "database_not_initialized",
            AppError::DatabaseUnreachable(_) => "database_unreachable",
            AppError::DatabaseError(_) => "database_error",
            AppError::InternalError(_) => "internal_error",
            AppError::ConfigError(_) => "configuration_error",
        }
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::ConfigError(anyhow::Error::new(err))
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::InternalError(anyhow::Error::new(err))
    }
}

impl From<mongodb::error::Error> for AppError {
    fn from(err: mongodb::error::Error) -> Self {
        AppError::DatabaseError(anyhow::Error::new(err))
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub message: String,
    pub error: &'static str,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let code = self.code();

        let (status, message) = match &self {
            AppError::BadRequest(err) => (StatusCode::BAD_REQUEST, err.to_string()),
            AppError::DatabaseNotInitialized => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Database not initialized yet".to_string(),
            ),
            AppError::DatabaseUnreachable(err) => {
                tracing::error!(error = %err, "Database unreachable");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "MongoDB connection failed".to_string(),
                )
            }
            AppError::DatabaseError(err) | AppError::InternalError(err) => {
                tracing::error!(error = %err, code, "Request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Server internal error".to_string(),
                )
            }
            AppError::ConfigError(err) => {
                tracing::error!(error = %err, "Configuration error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Configuration error".to_string(),
                )
            }
        };

        (
            status,
            Json(ErrorResponse {
                message,
                error: code,
            }),
        )
            .into_response()
    }
}
