//! Client configuration files.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use turbo_cache::CacheConfig;

use crate::error::BuildError;
use crate::selection::CapabilitySelection;

/// Everything needed to assemble a client, minus the provider instances.
///
/// ```toml
/// [cache]
/// enabled = true
/// capacity = 500
/// eviction_secs = 30
///
/// [capabilities]
/// product = true
/// search = true
///
/// [providers.fake]
/// catalog_size = 50
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Cache settings.
    #[serde(default)]
    pub cache: CacheConfig,

    /// Capability selection mask. Omitted means every merged group; an
    /// empty table means none.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capabilities: Option<CapabilitySelection>,

    /// Raw per-provider sections, validated by each provider.
    #[serde(default)]
    pub providers: BTreeMap<String, Value>,
}

impl ClientConfig {
    /// Load config from a file. `.json` files are JSON, everything else TOML.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, BuildError> {
        let path = path.as_ref();
        let display = path.display().to_string();
        let content = std::fs::read_to_string(path).map_err(|e| BuildError::Config {
            path: display.clone(),
            message: e.to_string(),
        })?;

        let is_json = path.extension().map_or(false, |ext| ext == "json");
        let parsed = if is_json {
            Self::from_json_str(&content)
        } else {
            Self::from_toml_str(&content)
        };

        parsed.map_err(|e| match e {
            BuildError::Config { message, .. } => BuildError::Config {
                path: display,
                message,
            },
            other => other,
        })
    }

    pub fn from_toml_str(content: &str) -> Result<Self, BuildError> {
        toml::from_str(content).map_err(|e| BuildError::Config {
            path: "<toml>".to_string(),
            message: e.to_string(),
        })
    }

    pub fn from_json_str(content: &str) -> Result<Self, BuildError> {
        serde_json::from_str(content).map_err(|e| BuildError::Config {
            path: "<json>".to_string(),
            message: e.to_string(),
        })
    }

    /// Raw section for a provider, or an empty object.
    pub fn provider(&self, name: &str) -> Value {
        self.providers
            .get(name)
            .cloned()
            .unwrap_or_else(|| Value::Object(Default::default()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const SAMPLE: &str = r#"
        [cache]
        enabled = true
        capacity = 500

        [capabilities]
        product = true
        search = false

        [providers.fake]
        catalog_size = 50
        currency = "EUR"
    "#;

    #[test]
    fn test_parse_toml() {
        let config = ClientConfig::from_toml_str(SAMPLE).unwrap();

        assert!(config.cache.enabled);
        assert_eq!(config.cache.capacity, 500);
        assert_eq!(config.cache.eviction_secs, 60);
        let capabilities = config.capabilities.as_ref().unwrap();
        assert!(capabilities.is_enabled("product"));
        assert!(!capabilities.is_enabled("search"));
        assert_eq!(config.provider("fake"), json!({ "catalog_size": 50, "currency": "EUR" }));
    }

    #[test]
    fn test_missing_sections_default() {
        let config = ClientConfig::from_toml_str("").unwrap();
        assert_eq!(config, ClientConfig::default());
        assert!(config.capabilities.is_none());
        assert_eq!(config.provider("fake"), json!({}));
    }

    #[test]
    fn test_parse_json() {
        let config =
            ClientConfig::from_json_str(r#"{ "capabilities": { "cart": true }, "providers": { "fake": {} } }"#)
                .unwrap();
        assert!(config.capabilities.unwrap().is_enabled("cart"));
        assert!(!config.cache.enabled);
    }

    #[test]
    fn test_load_reports_path() {
        let err = ClientConfig::load("/nonexistent/turbo.toml").unwrap_err();
        assert!(matches!(err, BuildError::Config { path, .. } if path == "/nonexistent/turbo.toml"));
    }

    #[test]
    fn test_load_from_file() {
        let dir = std::env::temp_dir().join(format!("turbo-config-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let toml_path = dir.join("client.toml");
        let json_path = dir.join("client.json");
        std::fs::write(&toml_path, SAMPLE).unwrap();
        std::fs::write(&json_path, r#"{ "cache": { "enabled": true } }"#).unwrap();

        assert_eq!(ClientConfig::load(&toml_path).unwrap().cache.capacity, 500);
        assert!(ClientConfig::load(&json_path).unwrap().cache.enabled);

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_empty_capabilities_table_is_an_empty_mask() {
        let config = ClientConfig::from_toml_str("[capabilities]\n").unwrap();
        let capabilities = config.capabilities.unwrap();
        assert!(capabilities.is_empty());
        assert!(!capabilities.is_enabled("product"));
    }

    #[test]
    fn test_bad_toml_is_config_error() {
        let err = ClientConfig::from_toml_str("[cache\nenabled = 1").unwrap_err();
        assert!(matches!(err, BuildError::Config { .. }));
    }
}
