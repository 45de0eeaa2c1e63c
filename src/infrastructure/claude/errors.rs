use reqwest::StatusCode;
use thiserror::Error;

use super::types::ApiErrorBody;
use crate::domain::errors::EcoError;

/// Fallback text when the error body carries no message.
const GENERIC_FAILURE: &str = "API request failed";

/// Errors that can occur when talking to the Messages API
#[derive(Error, Debug)]
pub enum ClaudeApiError {
    /// 401/403: the credential was rejected
    #[error("{0}")]
    Unauthorized(String),

    /// Any other non-2xx status
    #[error("HTTP {status}: {message}")]
    Http { status: StatusCode, message: String },

    /// Request did not complete within the configured timeout
    #[error("request timed out after {0}s")]
    Timeout(u64),

    /// Connection, TLS or body transfer failure
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// 2xx response whose envelope could not be read
    #[error("unexpected response envelope: {0}")]
    Envelope(String),
}

impl ClaudeApiError {
    /// Classify a non-success status and its body.
    ///
    /// The human-readable message comes from `error.message` in the body
    /// when present.
    pub fn from_status(status: StatusCode, body: &str) -> Self {
        let message = serde_json::from_str::<ApiErrorBody>(body)
            .ok()
            .and_then(|b| b.error.message)
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| GENERIC_FAILURE.to_string());

        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Self::Unauthorized(message),
            _ => Self::Http { status, message },
        }
    }
}

impl From<ClaudeApiError> for EcoError {
    fn from(err: ClaudeApiError) -> Self {
        match err {
            ClaudeApiError::Unauthorized(message) => Self::AuthError(message),
            ClaudeApiError::Envelope(message) => Self::MalformedResponse(message),
            ClaudeApiError::Http { status, .. }
                if status.is_client_error()
                    && status != StatusCode::TOO_MANY_REQUESTS
                    && status != StatusCode::REQUEST_TIMEOUT =>
            {
                Self::RequestRejected(err.to_string())
            }
            other => Self::TransportError(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::errors::ErrorKind;

    #[test]
    fn test_401_and_403_are_auth_errors() {
        for status in [StatusCode::UNAUTHORIZED, StatusCode::FORBIDDEN] {
            let err: EcoError = ClaudeApiError::from_status(
                status,
                r#"{"error":{"type":"authentication_error","message":"invalid x-api-key"}}"#,
            )
            .into();
            assert_eq!(err, EcoError::AuthError("invalid x-api-key".to_string()));
        }
    }

    #[test]
    fn test_other_statuses_are_transport_errors() {
        for status in [
            StatusCode::BAD_REQUEST,
            StatusCode::NOT_FOUND,
            StatusCode::TOO_MANY_REQUESTS,
            StatusCode::INTERNAL_SERVER_ERROR,
        ] {
            let err: EcoError = ClaudeApiError::from_status(status, "").into();
            assert_eq!(err.kind(), ErrorKind::TransportError);
        }
    }

    #[test]
    fn test_client_errors_are_not_retried() {
        for status in [StatusCode::BAD_REQUEST, StatusCode::NOT_FOUND] {
            let err: EcoError = ClaudeApiError::from_status(status, "").into();
            assert!(!err.is_transient(), "status {status}");
        }
        for status in [
            StatusCode::TOO_MANY_REQUESTS,
            StatusCode::REQUEST_TIMEOUT,
            StatusCode::SERVICE_UNAVAILABLE,
        ] {
            let err: EcoError = ClaudeApiError::from_status(status, "").into();
            assert!(err.is_transient(), "status {status}");
        }
    }

    #[test]
    fn test_missing_message_falls_back() {
        let err = ClaudeApiError::from_status(StatusCode::BAD_GATEWAY, "<html>bad gateway</html>");
        assert_eq!(err.to_string(), "HTTP 502 Bad Gateway: API request failed");
    }

    #[test]
    fn test_timeout_is_transport() {
        let err: EcoError = ClaudeApiError::Timeout(30).into();
        assert_eq!(
            err,
            EcoError::TransportError("request timed out after 30s".to_string())
        );
    }
}
