//! Error types for the Jobwatch client

use thiserror::Error;

/// Result of a jobs API call
pub type Result<T> = std::result::Result<T, ClientError>;

/// Errors that can occur when calling the jobs API
#[derive(Debug, Error)]
pub enum ClientError {
    /// The request never produced a response: connection refused, TLS or a timeout
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    /// Non-2xx response
    #[error("API error (status {status}): {message}")]
    ApiError {
        /// Response status
        status: u16,
        /// Response body, or a placeholder when it could not be read
        message: String,
    },

    /// The body was not the expected JSON
    #[error("Failed to parse response: {0}")]
    ParseError(String),

    /// The requested job does not exist
    #[error("Resource not found: {0}")]
    NotFound(String),
}

impl ClientError {
    /// Builds an `ApiError`
    pub fn api_error(status: u16, message: impl Into<String>) -> Self {
        Self::ApiError {
            status,
            message: message.into(),
        }
    }

    /// True for a missing job, whether reported as `NotFound` or a bare 404
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_)) || matches!(self, Self::ApiError { status: 404, .. })
    }

    /// True when the session token was rejected (401/403)
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::ApiError { status: 401 | 403, .. })
    }

    /// True for 5xx responses
    pub fn is_server_error(&self) -> bool {
        matches!(self, Self::ApiError { status, .. } if *status >= 500)
    }

    /// True when the request timed out before a response arrived
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::RequestFailed(e) if e.is_timeout())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_detection() {
        assert!(ClientError::NotFound("job".to_string()).is_not_found());
        assert!(ClientError::api_error(404, "missing").is_not_found());
        assert!(!ClientError::api_error(500, "boom").is_not_found());
    }

    #[test]
    fn test_status_classes() {
        assert!(ClientError::api_error(401, "expired").is_unauthorized());
        assert!(ClientError::api_error(503, "down").is_server_error());
        assert!(!ClientError::ParseError("bad json".to_string()).is_server_error());
    }

    #[test]
    fn test_display_includes_status() {
        let err = ClientError::api_error(502, "bad gateway");
        assert_eq!(err.to_string(), "API error (status 502): bad gateway");
    }
}
