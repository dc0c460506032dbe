//! Error types shared by the stores and the REST API

use crate::models::validation::FormField;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use std::collections::BTreeMap;
use thiserror::Error;

/// Errors surfaced by registry operations and API handlers
#[derive(Debug, Error)]
pub enum ManagerError {
    #[error("Model '{id}' not found")]
    ModelNotFound { id: String },

    #[error("Scheme '{id}' not found")]
    SchemeNotFound { id: String },

    #[error("Model '{model_id}' is not associated with scheme '{scheme_id}'")]
    AssociationNotFound { scheme_id: String, model_id: String },

    /// Form validation failed; carries one message per failing field
    #[error("Validation failed for {} field(s)", .errors.len())]
    Validation { errors: BTreeMap<FormField, String> },

    #[error("Priority must be between 1 and 10 (got {priority})")]
    InvalidPriority { priority: i64 },

    #[error("Unknown base model '{name}'")]
    InvalidBaseModel { name: String },

    #[error("Model registry is full (max {max} models)")]
    CapacityExceeded { max: usize },

    #[error("{message}")]
    BadRequest { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

pub type ManagerResult<T> = Result<T, ManagerError>;

impl ManagerError {
    fn status(&self) -> StatusCode {
        match self {
            Self::ModelNotFound { .. }
            | Self::SchemeNotFound { .. }
            | Self::AssociationNotFound { .. } => StatusCode::NOT_FOUND,
            Self::Validation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            Self::InvalidPriority { .. } | Self::InvalidBaseModel { .. } | Self::BadRequest { .. } => {
                StatusCode::BAD_REQUEST
            }
            Self::CapacityExceeded { .. } => StatusCode::CONFLICT,
            Self::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ManagerError {
    fn into_response(self) -> Response {
        let status = self.status();

        let (message, details) = match self {
            Self::Internal { message } => {
                tracing::error!(error = %message, "Internal error");
                ("Internal server error".to_string(), None)
            }
            Self::Validation { errors } => ("Validation failed".to_string(), Some(errors)),
            other => (other.to_string(), None),
        };

        let body = Json(ErrorResponse {
            error: message,
            details,
            timestamp: chrono::Utc::now(),
        });

        (status, body).into_response()
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<BTreeMap<FormField, String>>,
    timestamp: chrono::DateTime<chrono::Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            ManagerError::ModelNotFound { id: "m".into() }.status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ManagerError::Validation {
                errors: BTreeMap::new()
            }
            .status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            ManagerError::InvalidPriority { priority: 11 }.status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ManagerError::CapacityExceeded { max: 1 }.status(),
            StatusCode::CONFLICT
        );
    }

    #[test]
    fn test_error_messages() {
        let err = ManagerError::AssociationNotFound {
            scheme_id: "scheme-1".into(),
            model_id: "model-9".into(),
        };
        assert_eq!(
            err.to_string(),
            "Model 'model-9' is not associated with scheme 'scheme-1'"
        );
        assert_eq!(
            ManagerError::InvalidPriority { priority: 0 }.to_string(),
            "Priority must be between 1 and 10 (got 0)"
        );
    }
}
