//! HTTP error handling and response types.

use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::db::repository::RepositoryError;
use crate::services::{FieldErrors, ServiceError};

/// API error response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    /// Error code for programmatic handling
    pub code: String,
    /// Human-readable error message
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    /// Per-field validation messages
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<BTreeMap<String, Vec<String>>>,
}

impl ApiError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
            errors: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn with_errors(mut self, errors: &FieldErrors) -> Self {
        self.errors = Some(
            errors
                .fields()
                .map(|field| {
                    (
                        field.to_string(),
                        errors.get(field).unwrap_or_default().to_vec(),
                    )
                })
                .collect(),
        );
        self
    }
}

/// Application error type for HTTP handlers.
#[derive(Debug)]
pub enum AppError {
    NotFound(String),
    /// Malformed request body, path or query string
    BadRequest(String),
    Validation(FieldErrors),
    /// The reservation's status does not allow the operation
    InvalidState(String),
    /// The requested dates are taken
    NotAvailable(String),
    Internal(String),
    Repository(RepositoryError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error) = match self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, ApiError::new("NOT_FOUND", msg)),
            AppError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, ApiError::new("BAD_REQUEST", msg))
            }
            AppError::Validation(errors) => (
                StatusCode::BAD_REQUEST,
                ApiError::new("VALIDATION_ERROR", "Invalid input.").with_errors(&errors),
            ),
            AppError::InvalidState(msg) => {
                (StatusCode::BAD_REQUEST, ApiError::new("INVALID_STATE", msg))
            }
            AppError::NotAvailable(details) => (
                StatusCode::CONFLICT,
                ApiError::new("NOT_AVAILABLE", "The listing is not available for these dates.")
                    .with_details(details),
            ),
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ApiError::new("INTERNAL_ERROR", msg),
                )
            }
            AppError::Repository(e) => {
                let msg = e.to_string();
                if e.is_not_found() {
                    (StatusCode::NOT_FOUND, ApiError::new("NOT_FOUND", msg))
                } else if e.is_validation() {
                    (StatusCode::BAD_REQUEST, ApiError::new("BAD_REQUEST", msg))
                } else if e.is_unavailable() {
                    tracing::warn!("Database unavailable: {}", msg);
                    (
                        StatusCode::SERVICE_UNAVAILABLE,
                        ApiError::new("DATABASE_UNAVAILABLE", msg),
                    )
                } else {
                    tracing::error!("Repository error: {}", msg);
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        ApiError::new("REPOSITORY_ERROR", msg),
                    )
                }
            }
        };

        (status, Json(error)).into_response()
    }
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Validation(errors) => AppError::Validation(errors),
            ServiceError::NotFound { .. } => AppError::NotFound(err.to_string()),
            ServiceError::Unavailable { .. } => AppError::NotAvailable(err.to_string()),
            ServiceError::InvalidTransition { .. }
            | ServiceError::NotModifiable(_)
            | ServiceError::NotCancellable(_) => AppError::InvalidState(err.to_string()),
            ServiceError::Repository(e) => AppError::Repository(e),
        }
    }
}

impl From<RepositoryError> for AppError {
    fn from(err: RepositoryError) -> Self {
        AppError::Repository(err)
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}
