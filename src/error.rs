//! HTTP error type and its mapping from service errors.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use tracing::error;

use crate::application::services::ShortenerError;

#[derive(Serialize)]
struct ErrorBody {
    detail: String,
}

#[derive(Debug)]
pub enum AppError {
    Validation { message: String },
    NotFound { message: String },
    Internal { message: String },
    Unavailable { message: String },
}

impl AppError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation { .. } => StatusCode::BAD_REQUEST,
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,
            AppError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Unavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match self {
            AppError::Validation { message }
            | AppError::NotFound { message }
            | AppError::Internal { message }
            | AppError::Unavailable { message } => message,
        };

        (status, Json(ErrorBody { detail: message })).into_response()
    }
}

impl From<ShortenerError> for AppError {
    fn from(e: ShortenerError) -> Self {
        match e {
            ShortenerError::InvalidUrl(_) => AppError::bad_request("Invalid URL"),
            ShortenerError::NotFound => AppError::not_found("URL not found"),
            ShortenerError::Expired => AppError::not_found("URL expired"),
            ShortenerError::KeyspaceExhausted { attempts } => {
                error!("Key generation gave up after {} attempts", attempts);
                AppError::internal("Could not allocate a short key")
            }
            ShortenerError::StorageUnavailable(e) => {
                error!("Storage error: {}", e);
                AppError::unavailable("Storage temporarily unavailable")
            }
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(e: validator::ValidationErrors) -> Self {
        let message = e
            .field_errors()
            .into_values()
            .flat_map(|errors| errors.iter())
            .filter_map(|error| error.message.as_ref())
            .map(|message| message.to_string())
            .next()
            .unwrap_or_else(|| "Invalid request".to_string());

        AppError::bad_request(message)
    }
}
