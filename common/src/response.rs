//! Wire format for error responses.
//!
//! Successful query responses serialize the result set directly; only
//! failures are wrapped, with a stable code and a short human-readable
//! message.

use serde::Serialize;
use utoipa::ToSchema;

/// JSON body returned for every failed request.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Error details.
    pub error: ErrorDetail,
}

/// Error details.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorDetail {
    /// Error code for client handling (e.g., "SOURCE_NOT_FOUND").
    pub code: String,

    /// Short human-readable error message.
    pub message: String,
}

impl ErrorResponse {
    /// Creates an error response from a code and message.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: ErrorDetail {
                code: code.into(),
                message: message.into(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_with_nested_error_object() {
        let body = ErrorResponse::new("CONNECTION_ERROR", "database connection error");
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["error"]["code"], "CONNECTION_ERROR");
        assert_eq!(json["error"]["message"], "database connection error");
    }
}
