//! Error handling

use axum::{
    extract::multipart::MultipartError,
    response::{IntoResponse, Response},
    http::StatusCode,
    Json,
};
use serde_json::json;

use crate::analysis::AnalysisError;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug)]
pub enum AppError {
    // Request errors
    ValidationError(String),
    PayloadTooLarge(String),

    // Analysis errors
    Unprocessable(String),

    // Generic errors
    InternalError(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AppError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::Unprocessable(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let detail = match &self {
            AppError::ValidationError(msg) => msg.as_str(),
            AppError::PayloadTooLarge(msg) => msg.as_str(),
            AppError::Unprocessable(msg) => {
                tracing::warn!("Unprocessable image: {}", msg);
                msg.as_str()
            }
            AppError::InternalError(msg) => {
                tracing::error!("Internal error: {}", msg);
                "An error occurred while processing the images"
            }
        };

        let body = Json(json!({
            "detail": detail,
            "status": status.as_u16()
        }));

        (status, body).into_response()
    }
}

impl From<AnalysisError> for AppError {
    fn from(err: AnalysisError) -> Self {
        match err {
            AnalysisError::Decode(_) | AnalysisError::NoUsablePixels => {
                AppError::Unprocessable(err.to_string())
            }
            AnalysisError::InvalidPaletteSize(_) => AppError::InternalError(err.to_string()),
        }
    }
}

impl From<MultipartError> for AppError {
    fn from(err: MultipartError) -> Self {
        let status = err.status();
        if status == StatusCode::PAYLOAD_TOO_LARGE {
            AppError::PayloadTooLarge("Upload exceeds the request size limit".to_string())
        } else {
            AppError::ValidationError(format!("Malformed multipart body: {}", err.body_text()))
        }
    }
}

impl From<tokio::task::JoinError> for AppError {
    fn from(err: tokio::task::JoinError) -> Self {
        AppError::InternalError(format!("Analysis task failed: {}", err))
    }
}
