//! Schema contract used at procedure input and output boundaries.
//!
//! A [`Schema`] turns an untyped JSON value into a typed value or a
//! [`ValidationFailure`]. Two implementations ship here:
//! - [`SerdeSchema`] - the shape is the Rust type itself, plus optional refinements
//! - [`JsonSchema`] - a compiled JSON Schema document checked before decoding

use std::fmt;
use std::marker::PhantomData;

use jsonschema::JSONSchema;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A single validation problem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationIssue {
    /// JSON pointer to the offending value (empty for the root).
    pub path: String,
    /// Human-readable description.
    pub message: String,
}

/// Structured validation failure: one or more issues.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ValidationFailure {
    pub issues: Vec<ValidationIssue>,
}

impl ValidationFailure {
    /// Failure with a single issue.
    pub fn single(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            issues: vec![ValidationIssue {
                path: path.into(),
                message: message.into(),
            }],
        }
    }

    /// Add an issue.
    pub fn push(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.issues.push(ValidationIssue {
            path: path.into(),
            message: message.into(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }
}

impl fmt::Display for ValidationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .issues
            .iter()
            .map(|issue| {
                if issue.path.is_empty() {
                    issue.message.clone()
                } else {
                    format!("{}: {}", issue.path, issue.message)
                }
            })
            .collect();
        write!(f, "{}", parts.join("; "))
    }
}

/// Errors raised while constructing a schema.
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    #[error("Invalid JSON schema: {0}")]
    Compile(String),
}

/// A boxed schema, or the reason it could not be built.
pub type SchemaResult<T> = Result<Box<dyn Schema<T>>, SchemaError>;

/// Validate an untyped value against a declared shape.
pub trait Schema<T>: Send + Sync {
    /// Parse `value` into `T`, or explain why it does not fit.
    fn parse(&self, value: &Value) -> Result<T, ValidationFailure>;
}

type Check<T> = Box<dyn Fn(&T) -> bool + Send + Sync>;

struct Refinement<T> {
    path: String,
    message: String,
    check: Check<T>,
}

/// Schema whose shape is the target type's `Deserialize` impl.
///
/// Refinements add value-level rules that the type system cannot express.
///
/// ```ignore
/// let schema = SerdeSchema::<Product>::new()
///     .refine("/name", "must not be empty", |p| !p.name.is_empty());
/// ```
pub struct SerdeSchema<T> {
    refinements: Vec<Refinement<T>>,
    _marker: PhantomData<fn() -> T>,
}

impl<T> SerdeSchema<T> {
    pub fn new() -> Self {
        Self {
            refinements: Vec::new(),
            _marker: PhantomData,
        }
    }

    /// Add a rule that must hold for every parsed value.
    pub fn refine<F>(mut self, path: impl Into<String>, message: impl Into<String>, check: F) -> Self
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        self.refinements.push(Refinement {
            path: path.into(),
            message: message.into(),
            check: Box::new(check),
        });
        self
    }
}

impl<T> Default for SerdeSchema<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: DeserializeOwned> Schema<T> for SerdeSchema<T> {
    fn parse(&self, value: &Value) -> Result<T, ValidationFailure> {
        let parsed = T::deserialize(value).map_err(|e| ValidationFailure::single("", e.to_string()))?;

        let mut failure = ValidationFailure::default();
        for rule in &self.refinements {
            if !(rule.check)(&parsed) {
                failure.push(rule.path.clone(), rule.message.clone());
            }
        }

        if failure.is_empty() {
            Ok(parsed)
        } else {
            Err(failure)
        }
    }
}

/// Schema backed by a compiled JSON Schema document.
///
/// The document is checked first so every structural issue is reported with
/// its instance path; the value is then decoded into `T`.
pub struct JsonSchema<T> {
    compiled: JSONSchema,
    decode: SerdeSchema<T>,
}

impl<T> JsonSchema<T> {
    /// Compile a JSON Schema document.
    pub fn compile(document: &Value) -> Result<Self, SchemaError> {
        let compiled =
            JSONSchema::compile(document).map_err(|e| SchemaError::Compile(e.to_string()))?;
        Ok(Self {
            compiled,
            decode: SerdeSchema::new(),
        })
    }

    /// Add a value-level rule checked after decoding.
    pub fn refine<F>(mut self, path: impl Into<String>, message: impl Into<String>, check: F) -> Self
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        self.decode = self.decode.refine(path, message, check);
        self
    }
}

impl<T: DeserializeOwned> Schema<T> for JsonSchema<T> {
    fn parse(&self, value: &Value) -> Result<T, ValidationFailure> {
        if let Err(errors) = self.compiled.validate(value) {
            let mut failure = ValidationFailure::default();
            for error in errors {
                failure.push(error.instance_path.to_string(), error.to_string());
            }
            return Err(failure);
        }
        self.decode.parse(value)
    }
}
