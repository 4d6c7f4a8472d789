//! Error taxonomy for the query gateway.
//!
//! Every failure in the request pipeline is mapped onto one of these
//! variants and handled at the HTTP boundary by the `IntoResponse`
//! implementation. Clients receive a terse code and message; the full
//! error detail is only written to the server log.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

use crate::response::ErrorResponse;

/// Convenience alias used throughout the workspace.
pub type AppResult<T> = Result<T, AppError>;

/// All failure modes of the request pipeline.
#[derive(Debug, Error)]
pub enum AppError {
    /// Malformed request body or empty query string.
    #[error("validation error: {0}")]
    Validation(String),

    /// No database registered under the requested source index.
    #[error("no database configured for source index {0}")]
    SourceNotFound(u32),

    /// Connection establishment or liveness check failed.
    #[error("database connection error: {0}")]
    Connection(String),

    /// Query execution or row scanning failed.
    #[error("query execution error: {0}")]
    Execution(String),

    /// Invalid or incomplete startup configuration.
    #[error("configuration error: {0}")]
    Config(String),
}

impl AppError {
    /// HTTP status the variant maps to.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::SourceNotFound(_)
            | AppError::Connection(_)
            | AppError::Execution(_)
            | AppError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Stable machine-readable error code.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::SourceNotFound(_) => "SOURCE_NOT_FOUND",
            AppError::Connection(_) => "CONNECTION_ERROR",
            AppError::Execution(_) => "EXECUTION_ERROR",
            AppError::Config(_) => "CONFIG_ERROR",
        }
    }

    /// Message exposed to the client. Validation problems echo their
    /// detail since they describe the caller's own input; everything
    /// else stays coarse-grained.
    fn client_message(&self) -> String {
        match self {
            AppError::Validation(msg) => msg.clone(),
            AppError::SourceNotFound(source) => {
                format!("unknown query source {source}")
            }
            AppError::Connection(_) => "database connection error".to_string(),
            AppError::Execution(_) => "query execution failed".to_string(),
            AppError::Config(_) => "service misconfigured".to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if status.is_server_error() {
            tracing::error!(code = self.code(), error = %self, "request failed");
        } else {
            tracing::warn!(code = self.code(), error = %self, "request rejected");
        }

        let body = ErrorResponse::new(self.code(), self.client_message());
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_maps_to_400() {
        assert_eq!(
            AppError::Validation("query must not be empty".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn pipeline_failures_map_to_500() {
        for err in [
            AppError::SourceNotFound(7),
            AppError::Connection("refused".into()),
            AppError::Execution("syntax".into()),
        ] {
            assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        }
    }

    #[test]
    fn connection_detail_is_not_exposed_to_clients() {
        let err = AppError::Connection("password authentication failed for svc".into());
        assert_eq!(err.client_message(), "database connection error");
    }
}
