//! Typed error handling for the sales API
//!
//! Store failures arrive as `anyhow::Error` from [`TransactionStore`]
//! implementations and are wrapped exactly once, at the service boundary,
//! into [`SalesError::Store`]. Cache misses are not errors.
//!
//! Every variant maps to an HTTP status and renders the envelope the UI
//! expects:
//!
//! ```json
//! { "success": false, "message": "Error fetching sales transactions: ..." }
//! ```
//!
//! [`TransactionStore`]: crate::core::store::TransactionStore

use axum::Json;
use axum::extract::rejection::QueryRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

/// Operation whose store access failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreOperation {
    Transactions,
    FilterOptions,
}

impl std::fmt::Display for StoreOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreOperation::Transactions => write!(f, "sales transactions"),
            StoreOperation::FilterOptions => write!(f, "filter options"),
        }
    }
}

/// The main error type for the sales API
#[derive(Debug, thiserror::Error)]
pub enum SalesError {
    /// Underlying data fetch failed; no partial result is produced
    #[error("Error fetching {operation}: {source}")]
    Store {
        operation: StoreOperation,
        #[source]
        source: anyhow::Error,
    },

    /// Request parameters could not be serialized into a cache key
    #[error("Failed to serialize request parameters: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration could not be loaded or is invalid
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Query string could not be decoded
    #[error("Invalid query string: {0}")]
    Query(#[from] QueryRejection),

    /// Strictly rejected input
    #[error("Invalid value for '{field}': {message}")]
    Validation { field: String, message: String },
}

/// Error envelope returned to HTTP clients
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub message: String,
}

impl SalesError {
    pub fn store(operation: StoreOperation, source: anyhow::Error) -> Self {
        SalesError::Store { operation, source }
    }

    pub fn config(message: impl Into<String>) -> Self {
        SalesError::Config {
            message: message.into(),
        }
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            SalesError::Store { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            SalesError::Serialization(_) => StatusCode::INTERNAL_SERVER_ERROR,
            SalesError::Config { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            SalesError::Query(rejection) => rejection.status(),
            SalesError::Validation { .. } => StatusCode::BAD_REQUEST,
        }
    }

    /// Get the error code for programmatic handling
    pub fn error_code(&self) -> &'static str {
        match self {
            SalesError::Store { .. } => "STORE_ERROR",
            SalesError::Serialization(_) => "SERIALIZATION_ERROR",
            SalesError::Config { .. } => "CONFIG_ERROR",
            SalesError::Query(_) => "INVALID_QUERY",
            SalesError::Validation { .. } => "VALIDATION_ERROR",
        }
    }

    pub fn to_response(&self) -> ErrorResponse {
        ErrorResponse {
            success: false,
            message: self.to_string(),
        }
    }
}

impl IntoResponse for SalesError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(code = self.error_code(), error = %self, "Request failed");
        }
        (status, Json(self.to_response())).into_response()
    }
}

impl From<serde_yaml::Error> for SalesError {
    fn from(err: serde_yaml::Error) -> Self {
        SalesError::config(format!("YAML parsing error: {}", err))
    }
}

impl From<std::io::Error> for SalesError {
    fn from(err: std::io::Error) -> Self {
        SalesError::config(format!("I/O error: {}", err))
    }
}
