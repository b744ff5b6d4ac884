//! Prelude for convenient imports.
//!
//! ```rust,ignore
//! use turbo_core::prelude::*;
//! ```

pub use crate::{
    CorrelationId, ErrorInfo, JsonSchema, ProcedureResult, RequestContext, Schema, SerdeSchema,
    Session, TaxJurisdiction, ValidationFailure,
};
