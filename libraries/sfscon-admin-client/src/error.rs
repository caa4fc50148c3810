//! Error types for the SFSCON admin client.

use thiserror::Error;

/// Errors that can occur when talking to the SFSCON admin API.
#[derive(Error, Debug)]
pub enum AdminClientError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Server returned an error response
    #[error("Server error ({status}): {message}")]
    ServerError { status: u16, message: String },

    /// Authentication required but no token available, or the token was rejected
    #[error("Authentication required")]
    AuthRequired,

    /// Login was rejected
    #[error("Authentication failed: {0}")]
    AuthFailed(String),

    /// Invalid API base URL
    #[error("Invalid server URL: {0}")]
    InvalidUrl(String),

    /// Failed to parse server response
    #[error("Failed to parse response: {0}")]
    ParseError(String),

    /// IO error while saving an export
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Server is offline or unreachable
    #[error("Server unreachable: {0}")]
    ServerUnreachable(String),

    /// Token storage could not be read or written
    #[error("Token storage error: {0}")]
    Storage(String),
}

impl AdminClientError {
    /// Whether this error means the caller has to log in (again).
    pub fn is_auth(&self) -> bool {
        matches!(self, Self::AuthRequired | Self::AuthFailed(_))
    }

    /// Classify a transport error the way every request in this crate does.
    pub(crate) fn from_send(e: reqwest::Error) -> Self {
        if e.is_connect() || e.is_timeout() {
            Self::ServerUnreachable(e.to_string())
        } else {
            Self::Request(e)
        }
    }
}

/// Result type for admin client operations.
pub type Result<T> = std::result::Result<T, AdminClientError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_classification() {
        assert!(AdminClientError::AuthRequired.is_auth());
        assert!(AdminClientError::AuthFailed("nope".into()).is_auth());
        assert!(!AdminClientError::ParseError("bad json".into()).is_auth());
        assert!(!AdminClientError::ServerError {
            status: 500,
            message: String::new()
        }
        .is_auth());
    }

    #[test]
    fn test_display_includes_status() {
        let err = AdminClientError::ServerError {
            status: 503,
            message: "maintenance".into(),
        };
        assert_eq!(err.to_string(), "Server error (503): maintenance");
    }
}
