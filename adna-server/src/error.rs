//! HTTP error mapping for core and request errors.

use adna_core::{AdnaError, ExtractionError};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Errors returned by handlers, rendered as `{error, code}` JSON
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    Adna(#[from] AdnaError),
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    /// Registry failures map to 503, all other core errors to 400
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Adna(e) if e.is_validation() => StatusCode::BAD_REQUEST,
            Self::Adna(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    /// Stable machine-readable code
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::BadRequest(_) => "INVALID_INPUT",
            Self::NotFound(_) => "NOT_FOUND",
            Self::Adna(e) => match e {
                AdnaError::InvalidInput(_) => "INVALID_INPUT",
                AdnaError::UnsupportedMimeType(_) => "UNSUPPORTED_MIME_TYPE",
                AdnaError::InvalidDna(_) => "INVALID_DNA",
                AdnaError::Extraction(ExtractionError::Timeout(_)) => "EXTRACTION_TIMEOUT",
                AdnaError::Extraction(_) => "EXTRACTION_FAILED",
                AdnaError::Registry(_) => "REGISTRY_UNAVAILABLE",
            },
        }
    }

    /// Message safe to return to clients
    fn client_message(&self) -> String {
        match self {
            Self::Adna(AdnaError::Registry(_)) => "Registry temporarily unavailable".to_string(),
            Self::Adna(AdnaError::Extraction(ExtractionError::Worker(_))) => {
                "Feature extraction failed".to_string()
            }
            _ => self.to_string(),
        }
    }

    fn error_category(&self) -> &'static str {
        match self {
            Self::BadRequest(_) => "bad_request",
            Self::NotFound(_) => "not_found",
            Self::Adna(e) if e.is_validation() => "validation",
            Self::Adna(_) => "registry",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let code = self.error_code();

        // Internal details go to the log only; the body carries the sanitized message
        if status.is_server_error() {
            tracing::error!(
                %status,
                category = self.error_category(),
                code,
                error = %self,
                "Request failed"
            );
        } else {
            tracing::warn!(
                %status,
                category = self.error_category(),
                code,
                error = %self,
                "Request rejected"
            );
        }

        let body = ErrorBody {
            error: self.client_message(),
            code,
        };
        (status, Json(body)).into_response()
    }
}

/// JSON body of every error response.
#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
    code: &'static str,
}
