//! Commerce error types.

use thiserror::Error;
use turbo_core::ErrorInfo;

/// Errors raised by the canonical domain types themselves.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommerceError {
    /// Quantity is zero or negative.
    #[error("Invalid quantity: {0}")]
    InvalidQuantity(i64),

    /// Quantity exceeds maximum allowed.
    #[error("Quantity {0} exceeds maximum allowed ({1})")]
    QuantityExceedsLimit(i64, i64),

    /// Currency mismatch.
    #[error("Currency mismatch: expected {expected}, got {got}")]
    CurrencyMismatch { expected: String, got: String },

    /// Arithmetic overflow.
    #[error("Arithmetic overflow in money calculation")]
    Overflow,
}

impl From<CommerceError> for ErrorInfo {
    fn from(e: CommerceError) -> Self {
        ErrorInfo::generic(e.to_string())
    }
}
