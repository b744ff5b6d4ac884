//! Capability composition for TurboCommerce.
//!
//! This crate provides:
//! - `Procedure` - The fetch/transform contract a provider operation implements
//! - `CapabilityDefinition` / `merge` - Provider capability trees and their union
//! - `CapabilitySelection` / `select` - Masks restricting which groups a client exposes
//! - `ClientBuilder` / `Client` - Assembly and invocation through the execution pipeline
//! - `ClientConfig` - TOML/JSON configuration for cache, selection and providers
//!
//! # Example
//!
//! ```ignore
//! use turbo_client::prelude::*;
//!
//! let client = ClientBuilder::new()
//!     .with_provider(FakeProvider::default())
//!     .with_capabilities(CapabilitySelection::new().enable("product"))
//!     .build()?;
//!
//! let mut ctx = RequestContext::new().with_locale("de-DE");
//! let product = client
//!     .operation("product", "byId")
//!     .expect("product.byId is exposed")
//!     .call(&json!({ "id": "p-1" }), &mut ctx)
//!     .await?;
//! ```

mod capability;
mod client;
mod config;
mod error;
mod pipeline;
mod procedure;
mod provider;
mod selection;

pub mod prelude;

pub use capability::{merge, CapabilityDefinition, DefinitionBuilder, Operations};
pub use client::{CapabilityGroup, Client, ClientBuilder, Operation, TypedOperation};
pub use config::ClientConfig;
pub use error::{BuildError, Conflict};
pub use pipeline::{BoundProcedure, ErasedProcedure, Response, ResponseMeta, Signature};
pub use procedure::{Procedure, ProcedurePath};
pub use provider::{Provider, ProviderConfig};
pub use selection::{select, CapabilitySelection};
