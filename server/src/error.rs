//! Mapping of handler failures to HTTP responses.
//!
//! Missing lists and todos (including ids that are not numbers at all) answer
//! 404 with a plain `Not found.` body. Everything else is a server fault,
//! logged in full and answered with a generic 500.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use todos_core::DomainError;

use crate::session::SessionError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found.")]
    NotFound,

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error("template rendering failed: {0}")]
    Template(#[from] minijinja::Error),

    #[error("{0}")]
    Internal(String),
}

impl From<DomainError> for AppError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::ListNotFound(_) | DomainError::TodoNotFound { .. } => AppError::NotFound,
            other => AppError::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::NotFound => {
                tracing::info!("request for a missing list or todo");
                (StatusCode::NOT_FOUND, "Not found.").into_response()
            }
            other => {
                tracing::error!(error = %other, "request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
            }
        }
    }
}
