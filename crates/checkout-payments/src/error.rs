//! Payment Error Types

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, PaymentError>;

/// Payment-related errors
#[derive(Error, Debug)]
pub enum PaymentError {
    /// Stripe API error (network, invalid key, invalid amount, ...)
    #[error("Stripe error: {0}")]
    Stripe(String),

    /// Collaborator response could not be read
    #[error("Invalid intent record: {0}")]
    InvalidRecord(#[from] serde_json::Error),

    /// Checkout token unknown, expired or already used
    #[error("Checkout token rejected: {0}")]
    TokenRejected(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Token store holds its maximum number of live grants
    #[error("Checkout token store full ({0} live tokens)")]
    StoreFull(usize),

    /// Storage error
    #[error("Storage error: {0}")]
    Storage(String),
}

impl PaymentError {
    /// Get user-friendly message
    pub fn user_message(&self) -> &str {
        match self {
            PaymentError::Stripe(_) | PaymentError::InvalidRecord(_) => {
                "Payment processing failed. Please try again."
            }
            PaymentError::TokenRejected(_) => "Your checkout session is no longer valid.",
            PaymentError::StoreFull(_) => "Checkout is busy. Please try again shortly.",
            PaymentError::Config(_) => "Service configuration error.",
            PaymentError::Storage(_) => "An error occurred processing your request.",
        }
    }
}
