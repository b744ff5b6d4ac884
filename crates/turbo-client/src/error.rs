//! Construction-time errors.

use std::fmt;

use thiserror::Error;
use turbo_core::{SchemaError, ValidationFailure};

/// Two providers contributing the same `group.operation`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conflict {
    pub group: String,
    pub operation: String,
    /// Provider whose contribution was registered first.
    pub first: String,
    /// Provider whose contribution collided.
    pub second: String,
}

impl fmt::Display for Conflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{} is provided by both '{}' and '{}'",
            self.group, self.operation, self.first, self.second
        )
    }
}

/// Errors raised while assembling a client. None of these surface per call.
#[derive(Error, Debug)]
pub enum BuildError {
    /// One or more capability paths were contributed twice.
    #[error("Capability conflict: {}", join_conflicts(.0))]
    CapabilityConflict(Vec<Conflict>),

    /// A capability group was enabled but nothing implements it.
    #[error("Capability '{0}' is enabled but no provider implements it")]
    UnknownCapability(String),

    /// Provider configuration failed its schema.
    #[error("Invalid configuration for provider '{provider}': {detail}")]
    InvalidConfig {
        provider: String,
        detail: ValidationFailure,
    },

    /// A procedure or provider config schema could not be built.
    #[error("Schema for '{target}' could not be built: {source}")]
    Schema {
        target: String,
        #[source]
        source: SchemaError,
    },

    /// Two providers registered under the same name.
    #[error("Provider name '{0}' is registered more than once")]
    DuplicateProvider(String),

    /// A provider contributed procedures labelled with another name.
    #[error("Provider '{provider}' contributed {path} labelled as '{label}'")]
    ProviderMismatch {
        provider: String,
        path: String,
        label: String,
    },

    /// A typed view asked for types the bound procedure does not have.
    #[error("{path} is {found}, not {expected}")]
    SignatureMismatch {
        path: String,
        expected: String,
        found: String,
    },

    /// Configuration file could not be read or parsed.
    #[error("Failed to load configuration {path}: {message}")]
    Config { path: String, message: String },
}

fn join_conflicts(conflicts: &[Conflict]) -> String {
    conflicts
        .iter()
        .map(|c| c.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}
