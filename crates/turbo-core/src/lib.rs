//! Core contracts shared by TurboCommerce capability providers.
//!
//! This crate provides:
//! - `ProcedureResult` / `ErrorInfo` - Uniform success/failure outcome of every call
//! - `Schema` - Validation of untyped values at procedure boundaries
//! - `RequestContext` - Locale, tax, store and session state for one request chain

mod context;
mod error;
mod schema;

pub mod prelude;

pub use context::*;
pub use error::*;
pub use schema::*;
