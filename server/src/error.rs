//! Service error taxonomy and its HTTP mapping.
//!
//! Every failure a handler can hit is folded into one of three kinds before
//! a response is written: validation, not-found, or an internal store error.
//! Store detail is logged and never sent to the caller.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::error;

use crate::model::FieldError;
use crate::store::StoreError;

pub const INTERNAL_MESSAGE: &str = "internal server error";

#[derive(Debug, Error)]
pub enum ServiceError {
    /// Rejected request body.
    #[error("invalid `{field}`: {message}")]
    Validation { field: String, message: String },

    /// Rejected path parameter.
    #[error("invalid path parameter `{field}`: {message}")]
    InvalidPath { field: String, message: String },

    #[error("item {id} not found")]
    NotFound { id: i64 },

    #[error("store failure: {0}")]
    Store(#[from] StoreError),
}

impl ServiceError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            Self::InvalidPath { .. } => StatusCode::BAD_REQUEST,
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<FieldError> for ServiceError {
    fn from(err: FieldError) -> Self {
        Self::validation(err.field, err.message)
    }
}

/// JSON body of every error response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match self {
            Self::Validation { field, message } | Self::InvalidPath { field, message } => {
                ErrorBody {
                    error: "validation".to_string(),
                    message,
                    field: Some(field),
                }
            }
            Self::NotFound { id } => ErrorBody {
                error: "not_found".to_string(),
                message: format!("item {id} not found"),
                field: None,
            },
            Self::Store(err) => {
                error!(error = %err, "store operation failed");
                ErrorBody {
                    error: "internal".to_string(),
                    message: INTERNAL_MESSAGE.to_string(),
                    field: None,
                }
            }
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_error_becomes_validation() {
        let err: ServiceError = FieldError {
            field: "name",
            message: "is required".to_string(),
        }
        .into();
        assert_eq!(err.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert!(matches!(err, ServiceError::Validation { ref field, .. } if field == "name"));
    }

    #[test]
    fn store_errors_map_to_500() {
        let err = ServiceError::from(StoreError::MissingId);
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn not_found_maps_to_404() {
        assert_eq!(ServiceError::NotFound { id: 9 }.status(), StatusCode::NOT_FOUND);
    }
}
