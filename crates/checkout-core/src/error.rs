//! Error Types

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for checkout operations
pub type Result<T> = std::result::Result<T, CheckoutError>;

/// Message shown when the hosted form cannot be set up
pub const SETUP_FAILED: &str = "Element Setup failed";

/// Error object reported by the payment SDK (card declined, missing fields, ...)
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SdkError {
    /// Human readable message, shown verbatim to the user
    pub message: String,

    /// Machine code such as `card_declined`
    #[serde(default)]
    pub code: Option<String>,

    /// Error category such as `card_error` or `validation_error`
    #[serde(default, rename = "type")]
    pub error_type: Option<String>,
}

impl SdkError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: None,
            error_type: None,
        }
    }
}

impl std::fmt::Display for SdkError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

/// Checkout error types
///
/// Every variant renders as a plain text banner; none are distinguished
/// further in the UI.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CheckoutError {
    /// Payment library could not be loaded or initialized
    #[error("Payment form could not be loaded: {0}")]
    Initialization(String),

    /// Secret, client handle or mount target missing while building the form
    #[error("{0}")]
    Setup(String),

    /// Error reported by the collaborator while confirming
    #[error("{0}")]
    Collaborator(SdkError),

    /// Submit pressed before the client and form handles exist
    #[error("Instance or Element not ready")]
    NotReady,

    /// Intent request failed or returned a non-success status
    #[error("{0}")]
    Network(String),
}

impl CheckoutError {
    /// Setup failure with the generic message
    pub fn setup() -> Self {
        Self::Setup(SETUP_FAILED.into())
    }

    /// Short machine-readable tag for logs
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Initialization(_) => "initialization",
            Self::Setup(_) => "setup",
            Self::Collaborator(_) => "collaborator",
            Self::NotReady => "not_ready",
            Self::Network(_) => "network",
        }
    }
}

impl From<SdkError> for CheckoutError {
    fn from(err: SdkError) -> Self {
        Self::Collaborator(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collaborator_error_shows_message_verbatim() {
        let err = CheckoutError::from(SdkError::new("Your card was declined."));
        assert_eq!(err.to_string(), "Your card was declined.");
        assert_eq!(err.kind(), "collaborator");
    }

    #[test]
    fn test_sdk_error_from_stripe_js_shape() {
        let json = r#"{"type":"card_error","code":"card_declined","message":"card_declined","decline_code":"generic_decline"}"#;
        let err: SdkError = serde_json::from_str(json).unwrap();
        assert_eq!(err.code.as_deref(), Some("card_declined"));
        assert_eq!(err.error_type.as_deref(), Some("card_error"));
        assert_eq!(err.message, "card_declined");
    }
}
