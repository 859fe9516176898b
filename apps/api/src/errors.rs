#![allow(dead_code)]

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::extraction::ExtractionError;
use crate::screening::lexicon::LexiconError;
use crate::screening::ScreeningError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error(transparent)]
    Extraction(#[from] ExtractionError),

    #[error(transparent)]
    Lexicon(#[from] LexiconError),

    #[error(transparent)]
    Screening(#[from] ScreeningError),

    #[error("Screening did not finish within {0} ms")]
    ScreeningTimeout(u128),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            AppError::Validation(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            AppError::Extraction(ExtractionError::UnsupportedFormat { .. }) => {
                (StatusCode::UNSUPPORTED_MEDIA_TYPE, "UNSUPPORTED_FORMAT")
            }
            AppError::Extraction(_) => (StatusCode::UNPROCESSABLE_ENTITY, "EXTRACTION_FAILED"),
            AppError::Lexicon(_) => (StatusCode::BAD_REQUEST, "INVALID_LEXICON"),
            AppError::Screening(ScreeningError::EmptyJob) => (StatusCode::BAD_REQUEST, "EMPTY_JOB"),
            AppError::Screening(ScreeningError::BlankDescription) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR")
            }
            AppError::Screening(ScreeningError::Worker(_)) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR")
            }
            AppError::ScreeningTimeout(_) => (StatusCode::GATEWAY_TIMEOUT, "SCREENING_TIMEOUT"),
            AppError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        let message = if status.is_server_error() && status != StatusCode::GATEWAY_TIMEOUT {
            tracing::error!("Internal error: {self:?}");
            "An internal server error occurred".to_string()
        } else {
            self.to_string()
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}
