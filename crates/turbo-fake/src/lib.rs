//! Deterministic in-memory TurboCommerce provider.
//!
//! Generates a catalog from its configuration and serves every canonical
//! capability group from it. Carts live in memory for the provider's
//! lifetime. Useful for tests, demos and local development.
//!
//! # Example
//!
//! ```ignore
//! use turbo_client::ClientBuilder;
//! use turbo_fake::{FakeConfig, FakeProvider};
//!
//! let client = ClientBuilder::new()
//!     .with_provider(FakeProvider::new(FakeConfig::default().with_catalog_size(100)))
//!     .build()?;
//! ```

mod catalog;
mod config;
mod procedures;
mod provider;
mod store;

pub use catalog::{Catalog, ProductRecord, SkuRecord};
pub use config::{FakeConfig, MAX_CATALOG_SIZE};
pub use procedures::FakeSession;
pub use provider::FakeProvider;
pub use store::CartStore;
