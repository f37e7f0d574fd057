use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::features::images::repositories::RepositoryError;
use crate::modules::storage::StorageError;
use crate::shared::types::ErrorResponse;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("No file uploaded")]
    NoFileProvided,

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),

    /// An object store or metadata store call failed
    #[error("{context}: {source}")]
    Upstream {
        context: &'static str,
        #[source]
        source: UpstreamError,
    },

    #[error("Internal server error: {0}")]
    Internal(String),
}

/// Failure reported by one of the external services
#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl AppError {
    pub fn upstream(context: &'static str, source: impl Into<UpstreamError>) -> Self {
        AppError::Upstream {
            context,
            source: source.into(),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::NoFileProvided | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::Upstream { .. } | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let (message, error) = match self {
            AppError::NoFileProvided => ("No file uploaded".to_string(), None),
            AppError::BadRequest(msg) => (msg, None),
            AppError::NotFound(msg) => (msg, None),
            AppError::PayloadTooLarge(msg) => ("File too large".to_string(), Some(msg)),
            AppError::Upstream { context, source } => {
                tracing::error!("{}: {}", context, source);
                (context.to_string(), Some(source.to_string()))
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                ("Internal server error".to_string(), Some(msg))
            }
        };

        (status, Json(ErrorResponse { message, error })).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            AppError::NoFileProvided.status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::NotFound("File not found".to_string()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::PayloadTooLarge("length limit exceeded".to_string()).status_code(),
            StatusCode::PAYLOAD_TOO_LARGE
        );
        assert_eq!(
            AppError::upstream(
                "Error retrieving file",
                StorageError::PresignFailed("boom".to_string())
            )
            .status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_upstream_display_includes_source() {
        let err = AppError::upstream(
            "Error uploading file",
            StorageError::UploadFailed("connection reset".to_string()),
        );
        assert_eq!(
            err.to_string(),
            "Error uploading file: Upload failed: connection reset"
        );
    }
}
