use axum::{
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

use crate::{dao::storage::StorageError, dto::scoreboard::ScoreboardResponse};

/// Errors that can occur in service layer operations.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Storage backend failed to read or write the match state.
    #[error(transparent)]
    Unavailable(StorageError),
    /// Operation exceeded its timeout limit.
    #[error("operation timed out")]
    Timeout,
}

impl From<StorageError> for ServiceError {
    fn from(err: StorageError) -> Self {
        ServiceError::Unavailable(err)
    }
}

/// Application-level errors that are converted to HTTP responses.
#[derive(Debug, Error)]
pub enum AppError {
    /// The request could not be completed. The body still carries a default board so displays
    /// keep rendering something.
    #[error("internal error: {source}")]
    Internal {
        /// Underlying service failure.
        source: ServiceError,
        /// Default snapshot returned alongside the error.
        fallback: Box<ScoreboardResponse>,
    },
}

impl AppError {
    /// Wrap a service failure together with the snapshot to fall back to.
    pub fn internal(source: ServiceError, fallback: ScoreboardResponse) -> Self {
        AppError::Internal {
            source,
            fallback: Box::new(fallback),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct FallbackBody<'a> {
    #[serde(flatten)]
    board: &'a ScoreboardResponse,
    error: &'static str,
    details: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let AppError::Internal { source, fallback } = self;
        let details = error_chain(&source);
        error!(error = %details, "scoreboard request failed");

        let body = FallbackBody {
            board: &fallback,
            error: "failed to process request",
            details,
        };

        match serde_json::to_vec(&body) {
            Ok(bytes) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                [(header::CONTENT_TYPE, "application/json")],
                bytes,
            )
                .into_response(),
            Err(_) => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
        }
    }
}

/// Render an error with its sources, outermost first.
fn error_chain(err: &dyn std::error::Error) -> String {
    let mut message = err.to_string();
    let mut current = err.source();
    while let Some(source) = current {
        message.push_str(": ");
        message.push_str(&source.to_string());
        current = source.source();
    }
    message
}
