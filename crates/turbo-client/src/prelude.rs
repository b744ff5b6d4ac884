//! Prelude for convenient imports.
//!
//! ```rust,ignore
//! use turbo_client::prelude::*;
//! ```

pub use crate::{
    BuildError, CapabilityDefinition, CapabilitySelection, Client, ClientBuilder, ClientConfig,
    Procedure, Provider, ProviderConfig, Response, TypedOperation,
};
pub use turbo_cache::{CacheConfig, CachePolicy, CacheStatus, VaryRule};
pub use turbo_core::{ErrorInfo, ProcedureResult, RequestContext, Schema, SchemaResult, SerdeSchema};
