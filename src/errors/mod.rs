use std::io::Error as IoError;

use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde_json::json;
use thiserror::Error;

pub mod config;
pub mod shortener;
pub mod storage;

pub use config::ConfigError;
pub use shortener::ShortenerError;
pub use storage::StorageError;

#[derive(Debug, Error)]
pub enum AppError {
    // Service-level domain errors
    #[error(transparent)]
    Shortener(#[from] ShortenerError),
    // Infrastructure/system errors
    #[error("Server error: {0}")]
    Server(#[from] IoError),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Logger error: {0}")]
    Logger(String),
}

impl From<ConfigError> for AppError {
    fn from(e: ConfigError) -> Self {
        AppError::Config(e.to_string())
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Shortener(e) => match e {
                ShortenerError::InvalidUrl(_)
                | ShortenerError::HttpsRequired
                | ShortenerError::InvalidAlias(_) => StatusCode::UNPROCESSABLE_ENTITY,
                ShortenerError::AliasTaken => StatusCode::CONFLICT,
                ShortenerError::GenerationExhausted | ShortenerError::StorageUnavailable => {
                    StatusCode::SERVICE_UNAVAILABLE
                }
                ShortenerError::NotFound => StatusCode::NOT_FOUND,
            },
            AppError::Server(_) | AppError::Config(_) | AppError::Logger(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        // Internal detail stays in the logs; the client gets a generic message.
        let message = match self {
            AppError::Shortener(e) => e.to_string(),
            _ => "An internal error occurred".to_string(),
        };

        HttpResponse::build(self.status_code()).json(json!({
            "success": false,
            "error": message,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_errors_map_to_unprocessable_entity() {
        let err = AppError::from(ShortenerError::InvalidUrl("not absolute".into()));
        assert_eq!(err.status_code(), StatusCode::UNPROCESSABLE_ENTITY);

        let err = AppError::from(ShortenerError::HttpsRequired);
        assert_eq!(err.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn alias_conflict_maps_to_conflict() {
        let err = AppError::from(ShortenerError::AliasTaken);
        assert_eq!(err.status_code(), StatusCode::CONFLICT);
    }

    #[test]
    fn transient_failures_map_to_service_unavailable() {
        let err = AppError::from(ShortenerError::GenerationExhausted);
        assert_eq!(err.status_code(), StatusCode::SERVICE_UNAVAILABLE);

        let err = AppError::from(ShortenerError::StorageUnavailable);
        assert_eq!(err.status_code(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
