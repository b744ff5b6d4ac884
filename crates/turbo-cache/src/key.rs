//! Cache key composition.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};
use turbo_core::RequestContext;

use crate::policy::VaryRule;

/// A cache key uniquely identifying a fetch result.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CacheKey {
    /// The computed key string.
    key: String,
    /// Components that make up the key (for debugging).
    #[serde(skip_serializing_if = "Vec::is_empty")]
    components: Vec<String>,
}

impl CacheKey {
    /// Create a cache key from a string.
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            components: Vec::new(),
        }
    }

    /// Get the key string.
    pub fn as_str(&self) -> &str {
        &self.key
    }

    /// Get the key components (for debugging).
    pub fn components(&self) -> &[String] {
        &self.components
    }
}

impl std::fmt::Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.key)
    }
}

/// Component of a cache key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum KeyComponent {
    /// The validated procedure input.
    Input,
    Locale,
    Currency,
    Store,
    Country,
    State,
    /// Session identity (anonymous callers share a slot).
    Identity,
    /// Custom static value.
    Custom(String),
}

/// Builder for composing cache keys.
#[derive(Debug, Clone, Default)]
pub struct CacheKeyBuilder {
    components: Vec<KeyComponent>,
}

impl CacheKeyBuilder {
    /// Create an empty builder; the procedure identity is always included.
    pub fn new() -> Self {
        Self::default()
    }

    /// Include the procedure input.
    pub fn input(mut self) -> Self {
        self.components.push(KeyComponent::Input);
        self
    }

    pub fn locale(mut self) -> Self {
        self.components.push(KeyComponent::Locale);
        self
    }

    pub fn currency(mut self) -> Self {
        self.components.push(KeyComponent::Currency);
        self
    }

    pub fn store(mut self) -> Self {
        self.components.push(KeyComponent::Store);
        self
    }

    pub fn country(mut self) -> Self {
        self.components.push(KeyComponent::Country);
        self
    }

    pub fn state(mut self) -> Self {
        self.components.push(KeyComponent::State);
        self
    }

    pub fn identity(mut self) -> Self {
        self.components.push(KeyComponent::Identity);
        self
    }

    /// Include a custom static value.
    pub fn custom(mut self, value: impl Into<String>) -> Self {
        self.components.push(KeyComponent::Custom(value.into()));
        self
    }

    /// Build from vary rules. The input is always part of the key.
    pub fn from_vary_rules(rules: &[VaryRule]) -> Self {
        let mut builder = Self::new().input();

        for rule in rules {
            builder = match rule {
                VaryRule::Locale => builder.locale(),
                VaryRule::Currency => builder.currency(),
                VaryRule::Store => builder.store(),
                VaryRule::Country => builder.country(),
                VaryRule::State => builder.state(),
                VaryRule::Identity => builder.identity(),
                VaryRule::Custom(c) => builder.custom(c),
            };
        }

        builder
    }

    /// Build the cache key for one call.
    ///
    /// `procedure` identifies the provider and operation; `input` is the
    /// validated input.
    pub fn build(&self, procedure: &str, input: &Value, ctx: &RequestContext) -> CacheKey {
        let mut parts = Vec::new();
        let mut component_descs = vec![format!("procedure:{}", procedure)];

        for component in &self.components {
            match component {
                KeyComponent::Input => {
                    parts.push(format!("i:{}", canonical_json(input)));
                    component_descs.push("input".to_string());
                }
                KeyComponent::Locale => {
                    let locale = &ctx.language_context.locale;
                    parts.push(format!("l:{}", locale));
                    component_descs.push(format!("locale:{}", locale));
                }
                KeyComponent::Currency => {
                    let currency = &ctx.language_context.currency_code;
                    parts.push(format!("cur:{}", currency));
                    component_descs.push(format!("currency:{}", currency));
                }
                KeyComponent::Store => {
                    let store = &ctx.store_identifier.key;
                    parts.push(format!("s:{}", store));
                    component_descs.push(format!("store:{}", store));
                }
                KeyComponent::Country => {
                    let country = &ctx.tax_jurisdiction.country_code;
                    parts.push(format!("geo:c:{}", country));
                    component_descs.push(format!("country:{}", country));
                }
                KeyComponent::State => {
                    if let Some(state) = &ctx.tax_jurisdiction.state_code {
                        parts.push(format!("geo:s:{}", state));
                        component_descs.push(format!("state:{}", state));
                    }
                }
                KeyComponent::Identity => {
                    let identity = ctx
                        .session
                        .identity_context
                        .identifier
                        .as_deref()
                        .unwrap_or("anonymous");
                    parts.push(format!("u:{}", identity));
                    component_descs.push("identity".to_string());
                }
                KeyComponent::Custom(value) => {
                    parts.push(format!("c:{}", value));
                    component_descs.push(format!("custom:{}", value));
                }
            }
        }

        // Length-prefixed so no part can absorb its neighbour.
        let mut hasher = Sha256::new();
        for part in &parts {
            hasher.update((part.len() as u64).to_le_bytes());
            hasher.update(part.as_bytes());
        }
        let digest: String = hasher
            .finalize()
            .iter()
            .map(|b| format!("{:02x}", b))
            .collect();

        CacheKey {
            key: format!("{}:{}", procedure, digest),
            components: component_descs,
        }
    }
}

/// Serialize with object keys sorted so equal values always hash equally.
fn canonical_json(value: &Value) -> String {
    match value {
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            let fields: Vec<String> = keys
                .into_iter()
                .map(|k| format!("{}:{}", Value::String(k.clone()), canonical_json(&map[k])))
                .collect();
            format!("{{{}}}", fields.join(","))
        }
        Value::Array(items) => {
            let items: Vec<String> = items.iter().map(canonical_json).collect();
            format!("[{}]", items.join(","))
        }
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_same_input_same_key() {
        let builder = CacheKeyBuilder::new().input().locale();
        let ctx = RequestContext::new();

        let a = builder.build("fake:product.byId", &json!({ "id": "1", "v": 2 }), &ctx);
        let b = builder.build("fake:product.byId", &json!({ "v": 2, "id": "1" }), &RequestContext::new());
        assert_eq!(a, b);
        assert!(a.as_str().starts_with("fake:product.byId:"));
    }

    #[test]
    fn test_key_varies_on_selected_fields_only() {
        let builder = CacheKeyBuilder::from_vary_rules(&[VaryRule::Locale]);
        let input = json!({ "id": "1" });

        let en = builder.build("p", &input, &RequestContext::new());
        let de = builder.build("p", &input, &RequestContext::new().with_locale("de-DE"));
        let eur = builder.build("p", &input, &RequestContext::new().with_currency("EUR"));

        assert_ne!(en, de);
        assert_eq!(en.as_str(), eur.as_str());
    }

    #[test]
    fn test_key_varies_on_procedure_and_input() {
        let builder = CacheKeyBuilder::new().input();
        let ctx = RequestContext::new();
        let a = builder.build("p1", &json!({ "id": "1" }), &ctx);
        let b = builder.build("p2", &json!({ "id": "1" }), &ctx);
        let c = builder.build("p1", &json!({ "id": "2" }), &ctx);
        assert_ne!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_identity_component() {
        let builder = CacheKeyBuilder::new().identity();
        let anonymous = RequestContext::new();
        let mut known = RequestContext::new();
        known.session.identity_context.identifier = Some("user-1".into());

        let a = builder.build("p", &json!(null), &anonymous);
        let b = builder.build("p", &json!(null), &known);
        assert_ne!(a, b);
        assert_eq!(b.components(), &["procedure:p".to_string(), "identity".to_string()]);
    }

    #[test]
    fn test_custom_parts_do_not_collide() {
        let ctx = RequestContext::new();
        let input = json!(null);

        let joined = CacheKeyBuilder::new().custom("a|b").build("p", &input, &ctx);
        let split = CacheKeyBuilder::new().custom("a").custom("b").build("p", &input, &ctx);
        assert_ne!(joined.as_str(), split.as_str());

        let locale = CacheKeyBuilder::new().locale().build("p", &input, &ctx);
        let spoofed = CacheKeyBuilder::new()
            .custom(format!("l:{}", ctx.language_context.locale))
            .build("p", &input, &ctx);
        assert_ne!(locale.as_str(), spoofed.as_str());
    }
}
