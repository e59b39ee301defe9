//! Error types for the cache server
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::models::ApiResponse;

// == Cache Error Enum ==
/// Unified error type for the cache server.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Key or value exceeds its maximum length
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Malformed request (bad JSON, missing key parameter)
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Key not found in cache
    #[error("Key not found: {0}")]
    NotFound(String),

    /// HTTP method not supported on this path
    #[error("Method not allowed")]
    MethodNotAllowed,

    /// Broken engine invariant; fails the request, not the process
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CacheError {
    /// HTTP status this error maps to.
    pub fn status_code(&self) -> StatusCode {
        match self {
            CacheError::Validation(_) | CacheError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            CacheError::NotFound(_) => StatusCode::NOT_FOUND,
            CacheError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            CacheError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message exposed to API clients.
    pub fn client_message(&self) -> String {
        match self {
            CacheError::Validation(msg) | CacheError::InvalidRequest(msg) => msg.clone(),
            CacheError::NotFound(_) => "Key not found.".to_string(),
            CacheError::MethodNotAllowed => "Method not allowed".to_string(),
            CacheError::Internal(_) => "Internal server error".to_string(),
        }
    }
}

// == IntoResponse Implementation ==
impl IntoResponse for CacheError {
    fn into_response(self) -> Response {
        if let CacheError::Internal(detail) = &self {
            tracing::error!("Internal error while serving request: {}", detail);
        }

        let status = self.status_code();
        let body = Json(ApiResponse::error(self.client_message()));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the cache server.
pub type Result<T> = std::result::Result<T, CacheError>;
