//! Per-call error taxonomy shared by every procedure.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::schema::ValidationFailure;

/// Outcome of a fetch, a transform, or a full procedure execution.
///
/// `Ok` is the success variant and `Err` carries an [`ErrorInfo`]. Failures
/// are always returned, never raised across the procedure boundary.
pub type ProcedureResult<T> = Result<T, ErrorInfo>;

/// Errors a procedure call can end in.
///
/// The set is closed: providers map their backend-specific failures onto
/// `Generic` or `NotFound`, while the two validation kinds are produced by the
/// execution pipeline itself.
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ErrorInfo {
    /// Catch-all for provider failures.
    #[error("{message}")]
    Generic { message: String },

    /// The caller's input did not satisfy the procedure's input schema.
    #[error("Invalid input: {detail}")]
    InvalidInput { detail: ValidationFailure },

    /// The provider's transform produced a value violating the output schema.
    #[error("Invalid output: {detail}")]
    InvalidOutput { detail: ValidationFailure },

    /// The referenced entity does not exist upstream.
    #[error("Not found: {identifier}")]
    NotFound { identifier: serde_json::Value },
}

impl ErrorInfo {
    /// Create a generic error.
    pub fn generic(message: impl Into<String>) -> Self {
        Self::Generic {
            message: message.into(),
        }
    }

    /// Create a not-found error for any serializable identifier.
    pub fn not_found(identifier: impl Serialize) -> Self {
        Self::NotFound {
            identifier: serde_json::to_value(identifier).unwrap_or(serde_json::Value::Null),
        }
    }

    /// Short name of the error kind, used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Generic { .. } => "generic",
            Self::InvalidInput { .. } => "invalid_input",
            Self::InvalidOutput { .. } => "invalid_output",
            Self::NotFound { .. } => "not_found",
        }
    }

    /// Whether this error is the caller's fault rather than the provider's.
    pub fn is_caller_error(&self) -> bool {
        matches!(self, Self::InvalidInput { .. } | Self::NotFound { .. })
    }
}

impl From<serde_json::Error> for ErrorInfo {
    fn from(e: serde_json::Error) -> Self {
        ErrorInfo::generic(format!("Serialization error: {}", e))
    }
}
