// src/api/error.rs
// Centralized error handling for HTTP API responses

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::fmt;

/// Standard API error response format
#[derive(Debug)]
pub struct ApiError {
    pub message: String,
    pub status_code: StatusCode,
}

impl ApiError {
    /// Create a new bad request error
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            status_code: StatusCode::BAD_REQUEST,
        }
    }

    /// Create a new method not allowed error
    pub fn method_not_allowed() -> Self {
        Self {
            message: "Method not allowed".to_string(),
            status_code: StatusCode::METHOD_NOT_ALLOWED,
        }
    }

    /// Create a new internal server error. Callers log the real cause and
    /// pass user-safe text here; the body never carries internals.
    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            status_code: StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

// Display + std::error::Error so anyhow can convert from it
impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status_code, Json(json!({ "error": self.message }))).into_response()
    }
}

/// Result type alias for API operations
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_creation() {
        let error = ApiError::bad_request("User ID required");
        assert_eq!(error.status_code, StatusCode::BAD_REQUEST);
        assert_eq!(error.message, "User ID required");
    }

    #[test]
    fn test_method_not_allowed_message() {
        let error = ApiError::method_not_allowed();
        assert_eq!(error.status_code, StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(error.message, "Method not allowed");
        assert_eq!(error.to_string(), "Method not allowed");
    }
}
