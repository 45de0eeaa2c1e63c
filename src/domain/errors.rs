//! Domain errors for the ecoscan analysis pipeline.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Errors surfaced by the analysis pipeline and the state managers.
///
/// Every variant carries a message fit for direct display; none of them are
/// swallowed on the way to the renderer.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum EcoError {
    #[error("Please set your Claude API key first (ecoscan credential set <key>)")]
    MissingCredential,

    #[error(
        "Could not detect product information on this page. Try a product page on Amazon, eBay, or another shopping site."
    )]
    ExtractionFailed,

    #[error("Authentication failed: {0}")]
    AuthError(String),

    #[error("Analysis request failed: {0}")]
    TransportError(String),

    /// A 4xx the service will keep refusing; reported as a transport error
    /// but never retried.
    #[error("Analysis request failed: {0}")]
    RequestRejected(String),

    #[error("Analysis response could not be parsed: {0}")]
    MalformedResponse(String),

    #[error("Analysis response is missing required data: {0}")]
    SchemaViolation(String),

    #[error("This item is already in your cart: {0}")]
    AlreadyInCart(String),

    #[error("No product analyzed yet!")]
    EmptyHistory,

    #[error("Cart index {index} is out of range (cart has {len} item(s))")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("Please analyze a product first before adding to cart!")]
    NotDisplayed,

    #[error("Please enter a valid API key")]
    InvalidCredential,

    #[error("State store error: {0}")]
    Storage(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type EcoResult<T> = Result<T, EcoError>;

/// Stable, payload-free identifier for an [`EcoError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    MissingCredential,
    ExtractionFailed,
    AuthError,
    TransportError,
    MalformedResponse,
    SchemaViolation,
    AlreadyInCart,
    EmptyHistory,
    IndexOutOfRange,
    NotDisplayed,
    InvalidCredential,
    Storage,
    Config,
}

impl EcoError {
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::MissingCredential => ErrorKind::MissingCredential,
            Self::ExtractionFailed => ErrorKind::ExtractionFailed,
            Self::AuthError(_) => ErrorKind::AuthError,
            Self::TransportError(_) | Self::RequestRejected(_) => ErrorKind::TransportError,
            Self::MalformedResponse(_) => ErrorKind::MalformedResponse,
            Self::SchemaViolation(_) => ErrorKind::SchemaViolation,
            Self::AlreadyInCart(_) => ErrorKind::AlreadyInCart,
            Self::EmptyHistory => ErrorKind::EmptyHistory,
            Self::IndexOutOfRange { .. } => ErrorKind::IndexOutOfRange,
            Self::NotDisplayed => ErrorKind::NotDisplayed,
            Self::InvalidCredential => ErrorKind::InvalidCredential,
            Self::Storage(_) => ErrorKind::Storage,
            Self::Config(_) => ErrorKind::Config,
        }
    }

    /// Only transport failures may be retried; schema, auth and rejected
    /// requests never are.
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::TransportError(_))
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::MissingCredential => "missing_credential",
            Self::ExtractionFailed => "extraction_failed",
            Self::AuthError => "auth_error",
            Self::TransportError => "transport_error",
            Self::MalformedResponse => "malformed_response",
            Self::SchemaViolation => "schema_violation",
            Self::AlreadyInCart => "already_in_cart",
            Self::EmptyHistory => "empty_history",
            Self::IndexOutOfRange => "index_out_of_range",
            Self::NotDisplayed => "not_displayed",
            Self::InvalidCredential => "invalid_credential",
            Self::Storage => "storage",
            Self::Config => "config",
        };
        f.write_str(s)
    }
}

impl From<serde_json::Error> for EcoError {
    fn from(err: serde_json::Error) -> Self {
        Self::Storage(format!("corrupt stored value: {err}"))
    }
}

impl From<sqlx::Error> for EcoError {
    fn from(err: sqlx::Error) -> Self {
        Self::Storage(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_transport_errors_are_transient() {
        assert!(EcoError::TransportError("timeout".to_string()).is_transient());
        assert!(!EcoError::AuthError("bad key".to_string()).is_transient());
        assert!(!EcoError::MalformedResponse("x".to_string()).is_transient());
        assert!(!EcoError::SchemaViolation("x".to_string()).is_transient());

        let rejected = EcoError::RequestRejected("HTTP 400".to_string());
        assert!(!rejected.is_transient());
        assert_eq!(rejected.kind(), ErrorKind::TransportError);
    }

    #[test]
    fn test_kind_display_is_snake_case() {
        let err = EcoError::IndexOutOfRange { index: 4, len: 2 };
        assert_eq!(err.kind(), ErrorKind::IndexOutOfRange);
        assert_eq!(err.kind().to_string(), "index_out_of_range");
        assert_eq!(
            err.to_string(),
            "Cart index 4 is out of range (cart has 2 item(s))"
        );
    }

    #[test]
    fn test_kind_serializes_like_display() {
        let json = serde_json::to_string(&ErrorKind::AlreadyInCart).unwrap();
        assert_eq!(json, "\"already_in_cart\"");
    }
}
