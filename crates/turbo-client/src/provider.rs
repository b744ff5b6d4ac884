//! Provider contract.

use serde::de::DeserializeOwned;
use serde_json::Value;
use turbo_core::{SchemaResult, SerdeSchema};

use crate::capability::CapabilityDefinition;
use crate::error::BuildError;

/// A backend that contributes capabilities to a client.
pub trait Provider: Send + Sync {
    /// Unique provider name, recorded on every procedure it contributes.
    fn name(&self) -> &str;

    /// The provider's capability tree.
    fn capabilities(&self) -> Result<CapabilityDefinition, BuildError>;
}

/// Typed provider configuration parsed from a raw config section.
pub trait ProviderConfig: DeserializeOwned + Sized + 'static {
    /// Schema the raw section must satisfy. Defaults to the type's shape.
    fn schema() -> SchemaResult<Self> {
        Ok(Box::new(SerdeSchema::new()))
    }

    /// Validate and decode a raw section for `provider`.
    fn parse(provider: &str, raw: &Value) -> Result<Self, BuildError> {
        let schema = Self::schema().map_err(|source| BuildError::Schema {
            target: format!("{} config", provider),
            source,
        })?;
        schema
            .parse(raw)
            .map_err(|detail| BuildError::InvalidConfig {
                provider: provider.to_string(),
                detail,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;
    use turbo_core::JsonSchema;

    #[derive(Debug, Deserialize, PartialEq)]
    struct EndpointConfig {
        endpoint: String,
        #[serde(default)]
        timeout_ms: u64,
    }

    impl ProviderConfig for EndpointConfig {
        fn schema() -> SchemaResult<Self> {
            Ok(Box::new(SerdeSchema::new().refine("/endpoint", "must be an http(s) URL", |c: &Self| {
                c.endpoint.starts_with("http")
            })))
        }
    }

    #[derive(Debug, Deserialize)]
    struct BrokenConfig {}

    impl ProviderConfig for BrokenConfig {
        fn schema() -> SchemaResult<Self> {
            Ok(Box::new(JsonSchema::<Self>::compile(&json!({ "type": 12 }))?))
        }
    }

    #[derive(Debug, Deserialize, PartialEq)]
    struct PlainConfig {
        #[serde(default)]
        region: String,
    }

    impl ProviderConfig for PlainConfig {}

    #[test]
    fn test_parse_valid_config() {
        let config = EndpointConfig::parse("remote", &json!({ "endpoint": "https://api" })).unwrap();
        assert_eq!(config.endpoint, "https://api");
        assert_eq!(config.timeout_ms, 0);
    }

    #[test]
    fn test_parse_invalid_config() {
        let err = EndpointConfig::parse("remote", &json!({ "endpoint": "ftp://api" })).unwrap_err();
        match err {
            BuildError::InvalidConfig { provider, detail } => {
                assert_eq!(provider, "remote");
                assert_eq!(detail.issues[0].path, "/endpoint");
            }
            other => panic!("expected InvalidConfig, got {:?}", other),
        }
    }

    #[test]
    fn test_default_schema_is_type_shape() {
        let config = PlainConfig::parse("plain", &json!({ "region": "eu" })).unwrap();
        assert_eq!(config.region, "eu");
        assert!(PlainConfig::parse("plain", &json!({ "region": 3 })).is_err());
    }

    #[test]
    fn test_uncompilable_schema_fails_parse() {
        let err = BrokenConfig::parse("broken", &json!({})).unwrap_err();
        assert!(matches!(err, BuildError::Schema { target, .. } if target == "broken config"));
    }
}
