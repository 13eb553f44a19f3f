use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const MISSING_FIELDS_MESSAGE: &str = "Image and question are required";
pub const PROCESSING_FAILED_MESSAGE: &str = "Failed to process the question. Please try again.";

/// The only error shape the proxy puts on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

impl ErrorBody {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

/// A non-success response, with the server's message when it sent one.
#[derive(Debug, Clone, Error)]
#[error("server responded with status {status}: {}", .message.as_deref().unwrap_or("<no error body>"))]
pub struct ServiceError {
    pub status: u16,
    pub message: Option<String>,
}

impl ServiceError {
    /// Builds the error from a raw response body, keeping the message only if
    /// the body is an [`ErrorBody`].
    pub fn from_body(status: u16, body: &[u8]) -> Self {
        let message = serde_json::from_slice::<ErrorBody>(body)
            .ok()
            .map(|body| body.error);
        Self { status, message }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn service_error_keeps_error_body_message() {
        let err = ServiceError::from_body(400, br#"{"error":"Image and question are required"}"#);
        assert_eq!(err.status, 400);
        assert_eq!(err.message.as_deref(), Some(MISSING_FIELDS_MESSAGE));
    }

    #[test]
    fn service_error_tolerates_non_json_body() {
        let err = ServiceError::from_body(502, b"<html>bad gateway</html>");
        assert!(err.message.is_none());
        assert!(err.to_string().contains("502"));
    }
}
