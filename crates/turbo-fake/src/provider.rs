//! The fake provider.

use std::collections::BTreeSet;
use std::sync::Arc;

use serde_json::Value;
use turbo_client::{BuildError, CapabilityDefinition, Provider, ProviderConfig};
use turbo_commerce::{capability, op};

use crate::catalog::Catalog;
use crate::config::FakeConfig;
use crate::procedures::{
    Backend, CartAdd, CartGetById, IdentityGetSelf, PriceBySku, ProductById, ProductBySlug, SearchByTerm,
};
use crate::store::CartStore;

/// Deterministic in-memory provider for every canonical capability group.
pub struct FakeProvider {
    name: String,
    backend: Arc<Backend>,
    groups: Option<BTreeSet<String>>,
}

impl FakeProvider {
    pub const DEFAULT_NAME: &'static str = "fake";

    pub fn new(config: FakeConfig) -> Self {
        let catalog = Catalog::generate(&config);
        tracing::debug!(
            products = catalog.len(),
            prefix = %config.seed_prefix,
            "generated fake catalog"
        );

        Self {
            name: Self::DEFAULT_NAME.to_string(),
            backend: Arc::new(Backend {
                catalog,
                carts: CartStore::new(),
                currency: config.currency,
            }),
            groups: None,
        }
    }

    /// Build from a raw configuration section.
    pub fn from_config(raw: &Value) -> Result<Self, BuildError> {
        FakeConfig::parse(Self::DEFAULT_NAME, raw).map(Self::new)
    }

    /// Register under a different provider name. Also the session namespace.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Contribute only the given capability groups.
    pub fn only(mut self, groups: &[&str]) -> Self {
        self.groups = Some(groups.iter().map(|g| g.to_string()).collect());
        self
    }

    pub fn catalog(&self) -> &Catalog {
        &self.backend.catalog
    }

    fn includes(&self, group: &str) -> bool {
        self.groups.as_ref().map_or(true, |groups| groups.contains(group))
    }
}

impl Default for FakeProvider {
    fn default() -> Self {
        Self::new(FakeConfig::default())
    }
}

impl Provider for FakeProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn capabilities(&self) -> Result<CapabilityDefinition, BuildError> {
        let backend = &self.backend;
        let mut builder = CapabilityDefinition::builder(&self.name);

        if self.includes(capability::PRODUCT) {
            builder = builder
                .procedure(capability::PRODUCT, op::BY_ID, ProductById { backend: backend.clone() })
                .procedure(capability::PRODUCT, op::BY_SLUG, ProductBySlug { backend: backend.clone() });
        }
        if self.includes(capability::SEARCH) {
            builder = builder.procedure(capability::SEARCH, op::BY_TERM, SearchByTerm { backend: backend.clone() });
        }
        if self.includes(capability::CART) {
            builder = builder
                .procedure(capability::CART, op::GET_BY_ID, CartGetById { backend: backend.clone() })
                .procedure(
                    capability::CART,
                    op::ADD,
                    CartAdd {
                        backend: backend.clone(),
                        namespace: self.name.clone(),
                    },
                );
        }
        if self.includes(capability::IDENTITY) {
            builder = builder.procedure(
                capability::IDENTITY,
                op::GET_SELF,
                IdentityGetSelf {
                    namespace: self.name.clone(),
                },
            );
        }
        if self.includes(capability::PRICE) {
            builder = builder.procedure(capability::PRICE, op::GET_BY_SKU, PriceBySku { backend: backend.clone() });
        }

        builder.build()
    }
}
