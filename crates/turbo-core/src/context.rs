//! Per-request context threaded through every procedure call.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ProcedureResult;

/// Opaque trace token identifying one logical request chain.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CorrelationId(String);

impl CorrelationId {
    /// Generate a new random correlation ID.
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().simple().to_string())
    }

    /// Create from an existing ID string (e.g. an inbound trace header).
    pub fn from_string(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CorrelationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Language and currency the caller wants results in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguageContext {
    /// BCP 47 locale (e.g., "en-US").
    pub locale: String,
    /// ISO 4217 currency code (e.g., "USD").
    pub currency_code: String,
}

impl Default for LanguageContext {
    fn default() -> Self {
        Self {
            locale: "en-US".to_string(),
            currency_code: "USD".to_string(),
        }
    }
}

/// Tax jurisdiction used for pricing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxJurisdiction {
    /// ISO country code (e.g., "US").
    pub country_code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub county_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city_code: Option<String>,
}

impl Default for TaxJurisdiction {
    fn default() -> Self {
        Self {
            country_code: "US".to_string(),
            state_code: None,
            county_code: None,
            city_code: None,
        }
    }
}

impl TaxJurisdiction {
    pub fn new(country_code: impl Into<String>) -> Self {
        Self {
            country_code: country_code.into(),
            ..Default::default()
        }
    }

    pub fn with_state(mut self, state_code: impl Into<String>) -> Self {
        self.state_code = Some(state_code.into());
        self
    }

    pub fn with_county(mut self, county_code: impl Into<String>) -> Self {
        self.county_code = Some(county_code.into());
        self
    }

    pub fn with_city(mut self, city_code: impl Into<String>) -> Self {
        self.city_code = Some(city_code.into());
        self
    }
}

/// Which storefront the request belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreIdentifier {
    pub key: String,
}

impl Default for StoreIdentifier {
    fn default() -> Self {
        Self {
            key: "default".to_string(),
        }
    }
}

/// Who the caller is, as far as the providers have established.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityContext {
    /// Provider-issued identity, `None` while anonymous.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identifier: Option<String>,
    pub last_updated: DateTime<Utc>,
    /// Stable key for personalization, issued even to anonymous visitors.
    pub personalization_key: String,
}

impl Default for IdentityContext {
    fn default() -> Self {
        Self {
            identifier: None,
            last_updated: Utc::now(),
            personalization_key: uuid::Uuid::new_v4().simple().to_string(),
        }
    }
}

/// Session state carried across calls.
///
/// Providers persist their own state (tokens, cart ids) as extensions keyed
/// by provider name, so two providers never write to the same slot. They
/// serialize under their own `extensions` key, so no provider name can
/// shadow `identity_context`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Session {
    #[serde(default)]
    pub identity_context: IdentityContext,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    extensions: BTreeMap<String, Value>,
}

impl Session {
    /// Decode the extension stored under `provider`.
    pub fn extension<T: DeserializeOwned>(&self, provider: &str) -> ProcedureResult<Option<T>> {
        match self.extensions.get(provider) {
            Some(value) => Ok(Some(T::deserialize(value)?)),
            None => Ok(None),
        }
    }

    /// Raw extension value stored under `provider`.
    pub fn extension_value(&self, provider: &str) -> Option<&Value> {
        self.extensions.get(provider)
    }

    /// Replace the extension stored under `provider`.
    pub fn set_extension<T: Serialize>(&mut self, provider: &str, value: &T) -> ProcedureResult<()> {
        let value = serde_json::to_value(value)?;
        self.extensions.insert(provider.to_string(), value);
        Ok(())
    }

    /// Remove the extension stored under `provider`.
    pub fn remove_extension(&mut self, provider: &str) -> Option<Value> {
        self.extensions.remove(provider)
    }

    /// Names of providers holding session state.
    pub fn extension_names(&self) -> impl Iterator<Item = &str> {
        self.extensions.keys().map(|k| k.as_str())
    }
}

/// Typed request context passed to every procedure.
///
/// Created once by the host at request entry. Fetch steps see it read-only;
/// transform steps may update `session`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestContext {
    pub correlation_id: CorrelationId,
    #[serde(default)]
    pub language_context: LanguageContext,
    #[serde(default)]
    pub tax_jurisdiction: TaxJurisdiction,
    #[serde(default)]
    pub store_identifier: StoreIdentifier,
    #[serde(default)]
    pub session: Session,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_ip: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub referrer: Option<String>,
    #[serde(default)]
    pub is_bot: bool,
}

impl RequestContext {
    /// Create a context with a fresh correlation ID and default locale.
    pub fn new() -> Self {
        Self::with_correlation_id(CorrelationId::generate())
    }

    /// Create a context continuing an existing trace.
    pub fn with_correlation_id(correlation_id: CorrelationId) -> Self {
        Self {
            correlation_id,
            language_context: LanguageContext::default(),
            tax_jurisdiction: TaxJurisdiction::default(),
            store_identifier: StoreIdentifier::default(),
            session: Session::default(),
            client_ip: None,
            user_agent: None,
            referrer: None,
            is_bot: false,
        }
    }

    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        self.language_context.locale = locale.into();
        self
    }

    pub fn with_currency(mut self, currency_code: impl Into<String>) -> Self {
        self.language_context.currency_code = currency_code.into();
        self
    }

    pub fn with_store(mut self, key: impl Into<String>) -> Self {
        self.store_identifier.key = key.into();
        self
    }

    pub fn with_tax_jurisdiction(mut self, jurisdiction: TaxJurisdiction) -> Self {
        self.tax_jurisdiction = jurisdiction;
        self
    }

    pub fn with_client_ip(mut self, ip: impl Into<String>) -> Self {
        self.client_ip = Some(ip.into());
        self
    }

    pub fn with_referrer(mut self, referrer: impl Into<String>) -> Self {
        self.referrer = Some(referrer.into());
        self
    }

    /// Set the user agent and flag well-known crawlers as bots.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        let user_agent = user_agent.into();
        self.is_bot = looks_like_bot(&user_agent);
        self.user_agent = Some(user_agent);
        self
    }

    pub fn locale(&self) -> &str {
        &self.language_context.locale
    }

    pub fn currency_code(&self) -> &str {
        &self.language_context.currency_code
    }
}

impl Default for RequestContext {
    fn default() -> Self {
        Self::new()
    }
}

fn looks_like_bot(user_agent: &str) -> bool {
    let ua = user_agent.to_lowercase();
    ua.contains("bot") || ua.contains("crawler") || ua.contains("spider")
}
