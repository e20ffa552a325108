use actix_web::http::StatusCode;
use actix_web::HttpResponse;
use serde_json::json;
use thiserror::Error;

use crate::domain::errors::{DomainError, Resource};

/// Message returned for failures that must not leak internals.
pub const NOT_COMPLETED: &str = "Unknown error, the operation was not completed";

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0} not found.")]
    NotFound(Resource),

    #[error("{message}")]
    BadRequest {
        field: Option<&'static str>,
        message: String,
    },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        AppError::BadRequest {
            field: None,
            message: message.into(),
        }
    }
}

impl From<DomainError> for AppError {
    fn from(e: DomainError) -> Self {
        match e {
            DomainError::NotFound(resource) => AppError::NotFound(resource),
            DomainError::Validation { field, message } => AppError::BadRequest { field, message },
            DomainError::Internal(msg) => AppError::Internal(msg),
            e @ (DomainError::OutOfStock { .. }
            | DomainError::ProductInactive(_)
            | DomainError::DuplicateLineItem(_)
            | DomainError::ProductInUse(_)
            | DomainError::Conflict(_)) => AppError::bad_request(e.to_string()),
        }
    }
}

impl actix_web::ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let errors = match self {
            AppError::NotFound(resource) => json!({ resource.key(): self.to_string() }),
            AppError::BadRequest {
                field: Some(field),
                message,
            } => json!({ *field: [message] }),
            AppError::BadRequest { field: None, message } => json!({ "detail": message }),
            AppError::Internal(_) => json!({ "detail": NOT_COMPLETED }),
        };
        HttpResponse::build(self.status_code()).json(json!({ "errors": errors }))
    }
}
