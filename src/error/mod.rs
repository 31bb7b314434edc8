//! Centralized error handling for the loan portal
//!
//! One error type for every page and action, mapped onto HTTP status codes
//! and a JSON error envelope. Nothing here is fatal to the process: each
//! failure is scoped to the request that triggered it.

use std::collections::BTreeMap;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::validation::field_messages;

/// Portal error type with HTTP status code mapping
#[derive(Error, Debug)]
pub enum PortalError {
    /// Input rejected locally or by the backend (`422`)
    #[error("{message}")]
    Validation {
        message: String,
        fields: BTreeMap<String, String>,
    },

    #[error("{0}")]
    Forbidden(String),

    /// Any other backend refusal; the message is the backend's own
    #[error("{0}")]
    Rejected(String),

    #[error("{0}")]
    NotFound(String),

    /// Timeout or connection failure. Nothing was changed; retry by hand.
    #[error("Lending service unreachable: {0}")]
    Transient(String),

    #[error("Lending service error: {0}")]
    Upstream(String),

    #[error("Session expired, please sign in again")]
    SessionExpired,

    #[error("Internal error: {0}")]
    Internal(String),
}

/// JSON error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetails,
}

/// Error details in the response
#[derive(Debug, Serialize)]
pub struct ErrorDetails {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<BTreeMap<String, String>>,
}

impl PortalError {
    /// Single-field validation failure
    pub fn invalid_field(field: &str, message: impl Into<String>) -> Self {
        let message = message.into();
        let mut fields = BTreeMap::new();
        fields.insert(field.to_string(), message.clone());
        PortalError::Validation { message, fields }
    }

    /// Get the error code string
    pub fn error_code(&self) -> &'static str {
        match self {
            PortalError::Validation { .. } => "VALIDATION_ERROR",
            PortalError::Forbidden(_) => "FORBIDDEN",
            PortalError::Rejected(_) => "REJECTED",
            PortalError::NotFound(_) => "NOT_FOUND",
            PortalError::Transient(_) => "SERVICE_UNAVAILABLE",
            PortalError::Upstream(_) => "UPSTREAM_ERROR",
            PortalError::SessionExpired => "SESSION_EXPIRED",
            PortalError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Get the HTTP status code
    pub fn status_code(&self) -> StatusCode {
        match self {
            PortalError::Validation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            PortalError::Forbidden(_) => StatusCode::FORBIDDEN,
            PortalError::Rejected(_) => StatusCode::BAD_REQUEST,
            PortalError::NotFound(_) => StatusCode::NOT_FOUND,
            PortalError::Transient(_) => StatusCode::SERVICE_UNAVAILABLE,
            PortalError::Upstream(_) => StatusCode::BAD_GATEWAY,
            PortalError::SessionExpired => StatusCode::SEE_OTHER,
            PortalError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for PortalError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error_code = self.error_code();
        let message = self.to_string();

        match &self {
            PortalError::Internal(_) | PortalError::Upstream(_) => {
                tracing::error!(error = %message, code = %error_code, "Server error occurred");
            }
            PortalError::Transient(_) => {
                tracing::warn!(error = %message, code = %error_code, "Lending service unavailable");
            }
            _ => {
                tracing::debug!(error = %message, code = %error_code, "Client error occurred");
            }
        }

        if let PortalError::SessionExpired = self {
            return Redirect::to("/login").into_response();
        }

        let fields = match self {
            PortalError::Validation { fields, .. } if !fields.is_empty() => Some(fields),
            _ => None,
        };

        let body = ErrorResponse {
            error: ErrorDetails {
                code: error_code.to_string(),
                message,
                fields,
            },
        };

        (status, Json(body)).into_response()
    }
}

// Convenience conversions from common error types

impl From<validator::ValidationErrors> for PortalError {
    fn from(err: validator::ValidationErrors) -> Self {
        PortalError::Validation {
            message: "Please correct the highlighted fields".to_string(),
            fields: field_messages(&err),
        }
    }
}

impl From<reqwest::Error> for PortalError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() || err.is_connect() {
            PortalError::Transient(err.to_string())
        } else if err.is_decode() {
            PortalError::Upstream(format!("Unexpected response: {}", err))
        } else {
            PortalError::Upstream(err.to_string())
        }
    }
}

impl From<serde_json::Error> for PortalError {
    fn from(err: serde_json::Error) -> Self {
        PortalError::Upstream(format!("Invalid JSON: {}", err))
    }
}

/// Result type alias using PortalError
pub type PortalResult<T> = Result<T, PortalError>;
