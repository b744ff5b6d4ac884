//! Fake provider configuration.

use serde::{Deserialize, Serialize};
use serde_json::json;
use turbo_client::ProviderConfig;
use turbo_commerce::Currency;
use turbo_core::{JsonSchema, SchemaResult};

/// Largest catalog the fake provider will generate.
pub const MAX_CATALOG_SIZE: usize = 10_000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FakeConfig {
    /// Number of generated products.
    #[serde(default = "default_catalog_size")]
    pub catalog_size: usize,
    /// Currency used when the request's currency is not supported.
    #[serde(default)]
    pub currency: Currency,
    /// Prefix for generated ids and SKUs.
    #[serde(default = "default_seed_prefix")]
    pub seed_prefix: String,
}

fn default_catalog_size() -> usize {
    20
}

fn default_seed_prefix() -> String {
    "fake".to_string()
}

impl Default for FakeConfig {
    fn default() -> Self {
        Self {
            catalog_size: default_catalog_size(),
            currency: Currency::default(),
            seed_prefix: default_seed_prefix(),
        }
    }
}

impl FakeConfig {
    pub fn with_catalog_size(mut self, catalog_size: usize) -> Self {
        self.catalog_size = catalog_size;
        self
    }

    pub fn with_currency(mut self, currency: Currency) -> Self {
        self.currency = currency;
        self
    }

    pub fn with_seed_prefix(mut self, seed_prefix: impl Into<String>) -> Self {
        self.seed_prefix = seed_prefix.into();
        self
    }
}

impl ProviderConfig for FakeConfig {
    fn schema() -> SchemaResult<Self> {
        let codes: Vec<&str> = Currency::ALL.iter().map(|c| c.code()).collect();
        let document = json!({
            "type": "object",
            "properties": {
                "catalog_size": { "type": "integer", "minimum": 1, "maximum": MAX_CATALOG_SIZE },
                "currency": { "enum": codes },
                "seed_prefix": { "type": "string", "pattern": "^[a-z][a-z0-9]*$" }
            }
        });
        Ok(Box::new(JsonSchema::<Self>::compile(&document)?))
    }
}
