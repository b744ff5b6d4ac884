//! Procedure execution pipeline.
//!
//! validate input → cache lookup → fetch → cache store → transform →
//! validate output. Every step can short-circuit with an [`ErrorInfo`].

use std::any::{type_name, TypeId};
use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::Instrument;
use turbo_cache::{Cache, CacheKey, CacheKeyBuilder, CachePolicy, CacheStatus};
use turbo_core::{
    ErrorInfo, ProcedureResult, RequestContext, Schema, SchemaError, ValidationFailure,
};

use crate::error::BuildError;
use crate::procedure::{Procedure, ProcedurePath};

/// Metadata describing how a call was served.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseMeta {
    /// Provider that served the call.
    pub provider: String,
    /// Procedure path (e.g., "product.byId").
    pub procedure: String,
    /// Cache outcome.
    pub cache: CacheStatus,
    /// Cache key used, when the procedure is cacheable.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_key: Option<String>,
}

/// Successful procedure outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response<T> {
    pub value: T,
    pub meta: ResponseMeta,
}

impl<T> Response<T> {
    /// Whether the value came from the cache.
    pub fn is_cache_hit(&self) -> bool {
        self.meta.cache == CacheStatus::Hit
    }

    /// Convert the value, keeping the metadata.
    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> Response<U> {
        Response {
            value: f(self.value),
            meta: self.meta,
        }
    }

    pub fn into_value(self) -> T {
        self.value
    }
}

/// A procedure bound to its place in the tree and its provider.
///
/// Schemas and the cache policy are captured once at bind time.
pub struct BoundProcedure<P: Procedure> {
    procedure: P,
    path: ProcedurePath,
    provider: String,
    input_schema: Box<dyn Schema<P::Input>>,
    output_schema: Box<dyn Schema<P::Output>>,
    cache_policy: CachePolicy,
    key_builder: CacheKeyBuilder,
}

impl<P: Procedure> BoundProcedure<P> {
    pub fn new(provider: impl Into<String>, path: ProcedurePath, procedure: P) -> Result<Self, BuildError> {
        let provider = provider.into();
        let schema_error = |source: SchemaError| BuildError::Schema {
            target: format!("{}:{}", provider, path),
            source,
        };
        let input_schema = procedure.input_schema().map_err(schema_error)?;
        let output_schema = procedure.output_schema().map_err(schema_error)?;
        let cache_policy = procedure.cache_policy();

        Ok(Self {
            input_schema,
            output_schema,
            key_builder: cache_policy.key_builder(),
            cache_policy,
            procedure,
            path,
            provider,
        })
    }

    pub fn path(&self) -> &ProcedurePath {
        &self.path
    }

    pub fn provider(&self) -> &str {
        &self.provider
    }

    /// Run the full pipeline for one call.
    pub async fn execute(
        &self,
        raw_input: &Value,
        ctx: &mut RequestContext,
        cache: &dyn Cache,
    ) -> ProcedureResult<Response<P::Output>> {
        let span = tracing::debug_span!(
            "procedure",
            path = %self.path,
            provider = %self.provider,
            correlation_id = %ctx.correlation_id,
        );
        self.run(raw_input, ctx, cache).instrument(span).await
    }

    async fn run(
        &self,
        raw_input: &Value,
        ctx: &mut RequestContext,
        cache: &dyn Cache,
    ) -> ProcedureResult<Response<P::Output>> {
        let input = self.input_schema.parse(raw_input).map_err(|detail| {
            tracing::debug!(%detail, "input rejected");
            ErrorInfo::InvalidInput { detail }
        })?;

        let key = self.cache_key(&input, ctx)?;

        let (data, status) = match &key {
            Some(key) => match self.lookup(key, cache).await {
                Some(data) => (data, CacheStatus::Hit),
                None => (self.fetch_and_store(&input, ctx, key, cache).await?, CacheStatus::Miss),
            },
            None => (self.fetch(&input, ctx).await?, CacheStatus::Bypass),
        };
        tracing::debug!(cache = %status, "data ready");

        let output = self.procedure.transform(&input, ctx, data).await?;

        let value = self.validate_output(&output)?;

        Ok(Response {
            value,
            meta: ResponseMeta {
                provider: self.provider.clone(),
                procedure: self.path.to_string(),
                cache: status,
                cache_key: key.map(|k| k.as_str().to_string()),
            },
        })
    }

    fn cache_key(&self, input: &P::Input, ctx: &RequestContext) -> ProcedureResult<Option<CacheKey>> {
        if !self.cache_policy.enabled {
            return Ok(None);
        }
        let input = serde_json::to_value(input)?;
        let identity = format!("{}:{}", self.provider, self.path);
        Ok(Some(self.key_builder.build(&identity, &input, ctx)))
    }

    async fn lookup(&self, key: &CacheKey, cache: &dyn Cache) -> Option<P::Data> {
        match cache.get(key.as_str()).await {
            Ok(Some(cached)) => match serde_json::from_value(cached) {
                Ok(data) => Some(data),
                Err(e) => {
                    tracing::warn!(key = %key, error = %e, "discarding undecodable cache entry");
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "cache lookup failed, fetching");
                None
            }
        }
    }

    async fn fetch(&self, input: &P::Input, ctx: &RequestContext) -> ProcedureResult<P::Data> {
        self.procedure.fetch(input, ctx).await.map_err(|e| {
            tracing::warn!(error = %e, kind = e.kind(), "fetch failed");
            e
        })
    }

    async fn fetch_and_store(
        &self,
        input: &P::Input,
        ctx: &RequestContext,
        key: &CacheKey,
        cache: &dyn Cache,
    ) -> ProcedureResult<P::Data> {
        let data = self.fetch(input, ctx).await?;

        match serde_json::to_value(&data) {
            Ok(raw) => {
                if let Err(e) = cache.put(key.as_str(), raw).await {
                    tracing::warn!(key = %key, error = %e, "cache store failed");
                }
            }
            Err(e) => tracing::warn!(key = %key, error = %e, "fetch result not cacheable"),
        }

        Ok(data)
    }

    fn validate_output(&self, output: &P::Output) -> ProcedureResult<P::Output> {
        let raw = serde_json::to_value(output).map_err(|e| ErrorInfo::InvalidOutput {
            detail: ValidationFailure::single("", e.to_string()),
        })?;

        self.output_schema.parse(&raw).map_err(|detail| {
            tracing::error!(
                path = %self.path,
                provider = %self.provider,
                %detail,
                "provider produced output violating its schema"
            );
            ErrorInfo::InvalidOutput { detail }
        })
    }
}

/// Concrete input and output types behind an erased procedure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Signature {
    pub input: TypeId,
    pub output: TypeId,
    pub input_name: &'static str,
    pub output_name: &'static str,
}

impl Signature {
    pub fn of<I: 'static, O: 'static>() -> Self {
        Self {
            input: TypeId::of::<I>(),
            output: TypeId::of::<O>(),
            input_name: type_name::<I>(),
            output_name: type_name::<O>(),
        }
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.input_name, self.output_name)
    }
}

/// Type-erased procedure, as stored in capability trees.
///
/// Input and output cross this boundary as JSON values; [`Signature`] keeps
/// the concrete types so typed views can be checked when they are built.
#[async_trait]
pub trait ErasedProcedure: Send + Sync {
    fn path(&self) -> &ProcedurePath;

    fn provider(&self) -> &str;

    fn signature(&self) -> Signature;

    async fn execute_value(
        &self,
        raw_input: &Value,
        ctx: &mut RequestContext,
        cache: &dyn Cache,
    ) -> ProcedureResult<Response<Value>>;
}

#[async_trait]
impl<P: Procedure> ErasedProcedure for BoundProcedure<P> {
    fn path(&self) -> &ProcedurePath {
        &self.path
    }

    fn provider(&self) -> &str {
        &self.provider
    }

    fn signature(&self) -> Signature {
        Signature::of::<P::Input, P::Output>()
    }

    async fn execute_value(
        &self,
        raw_input: &Value,
        ctx: &mut RequestContext,
        cache: &dyn Cache,
    ) -> ProcedureResult<Response<Value>> {
        let response = self.execute(raw_input, ctx, cache).await?;
        let value = serde_json::to_value(&response.value)?;
        Ok(Response {
            value,
            meta: response.meta,
        })
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    use serde_json::json;
    use turbo_cache::{ManualClock, MemoryCache, NoopCache, VaryRule};
    use turbo_core::{JsonSchema, SchemaResult, SerdeSchema};

    #[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
    pub struct ById {
        pub id: String,
    }

    #[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
    pub struct Item {
        pub id: String,
        pub name: String,
    }

    #[derive(Debug, Default)]
    pub struct Calls {
        pub fetch: AtomicUsize,
        pub transform: AtomicUsize,
    }

    impl Calls {
        pub fn fetches(&self) -> usize {
            self.fetch.load(Ordering::SeqCst)
        }

        pub fn transforms(&self) -> usize {
            self.transform.load(Ordering::SeqCst)
        }
    }

    /// Procedure that counts its calls and can be told to misbehave.
    pub struct SpyProcedure {
        pub calls: Arc<Calls>,
        pub cached: bool,
        pub fail_fetch: bool,
        pub blank_name: bool,
        pub broken_output: bool,
    }

    impl SpyProcedure {
        pub fn new() -> (Self, Arc<Calls>) {
            let calls = Arc::new(Calls::default());
            (
                Self {
                    calls: calls.clone(),
                    cached: false,
                    fail_fetch: false,
                    blank_name: false,
                    broken_output: false,
                },
                calls,
            )
        }
    }

    #[async_trait]
    impl Procedure for SpyProcedure {
        type Input = ById;
        type Output = Item;
        type Data = Value;

        fn input_schema(&self) -> SchemaResult<ById> {
            Ok(Box::new(SerdeSchema::new().refine("/id", "must not be empty", |q: &ById| !q.id.is_empty())))
        }

        fn output_schema(&self) -> SchemaResult<Item> {
            if self.broken_output {
                return Ok(Box::new(JsonSchema::<Item>::compile(&json!({ "type": 12 }))?));
            }
            Ok(Box::new(SerdeSchema::new().refine("/name", "must not be empty", |i: &Item| !i.name.is_empty())))
        }

        fn cache_policy(&self) -> CachePolicy {
            if self.cached {
                CachePolicy::cached().vary_on(VaryRule::Locale)
            } else {
                CachePolicy::none()
            }
        }

        async fn fetch(&self, input: &ById, ctx: &RequestContext) -> ProcedureResult<Value> {
            self.calls.fetch.fetch_add(1, Ordering::SeqCst);
            if self.fail_fetch {
                return Err(ErrorInfo::not_found(&input.id));
            }
            Ok(json!({ "sku": input.id, "title": format!("Item {} ({})", input.id, ctx.locale()) }))
        }

        async fn transform(&self, _input: &ById, ctx: &mut RequestContext, data: Value) -> ProcedureResult<Item> {
            self.calls.transform.fetch_add(1, Ordering::SeqCst);
            ctx.session.set_extension("spy", &json!({ "seen": data["sku"] }))?;
            Ok(Item {
                id: data["sku"].as_str().unwrap_or_default().to_string(),
                name: if self.blank_name {
                    String::new()
                } else {
                    data["title"].as_str().unwrap_or_default().to_string()
                },
            })
        }
    }

    fn bind(procedure: SpyProcedure) -> BoundProcedure<SpyProcedure> {
        BoundProcedure::new("spy", ProcedurePath::new("product", "byId"), procedure).unwrap()
    }

    #[test]
    fn test_uncompilable_output_schema_fails_bind() {
        let (mut procedure, _) = SpyProcedure::new();
        procedure.broken_output = true;

        let err = BoundProcedure::new("spy", ProcedurePath::new("product", "byId"), procedure)
            .err()
            .unwrap();

        assert!(matches!(err, BuildError::Schema { target, .. } if target == "spy:product.byId"));
    }

    #[tokio::test]
    async fn test_valid_call_succeeds() {
        let (procedure, calls) = SpyProcedure::new();
        let bound = bind(procedure);
        let mut ctx = RequestContext::new();

        let response = bound.execute(&json!({ "id": "p-1" }), &mut ctx, &NoopCache).await.unwrap();

        assert_eq!(response.value.id, "p-1");
        assert_eq!(response.value.name, "Item p-1 (en-US)");
        assert_eq!(response.meta.cache, CacheStatus::Bypass);
        assert_eq!(response.meta.procedure, "product.byId");
        assert_eq!(response.meta.provider, "spy");
        assert_eq!(calls.fetches(), 1);
        assert_eq!(calls.transforms(), 1);
    }

    #[tokio::test]
    async fn test_transform_may_update_session() {
        let (procedure, _) = SpyProcedure::new();
        let bound = bind(procedure);
        let mut ctx = RequestContext::new();

        bound.execute(&json!({ "id": "p-9" }), &mut ctx, &NoopCache).await.unwrap();

        assert_eq!(ctx.session.extension_value("spy"), Some(&json!({ "seen": "p-9" })));
    }

    #[tokio::test]
    async fn test_invalid_input_never_fetches() {
        let (procedure, calls) = SpyProcedure::new();
        let bound = bind(procedure);
        let mut ctx = RequestContext::new();

        for input in [json!({ "id": 5 }), json!({}), json!("p-1"), json!({ "id": "" })] {
            let err = bound.execute(&input, &mut ctx, &NoopCache).await.unwrap_err();
            assert!(matches!(err, ErrorInfo::InvalidInput { .. }), "{:?}", err);
        }
        assert_eq!(calls.fetches(), 0);
        assert_eq!(calls.transforms(), 0);
    }

    #[tokio::test]
    async fn test_fetch_failure_skips_transform_and_cache() {
        let (mut procedure, calls) = SpyProcedure::new();
        procedure.fail_fetch = true;
        procedure.cached = true;
        let bound = bind(procedure);
        let cache = MemoryCache::default();
        let mut ctx = RequestContext::new();

        let err = bound.execute(&json!({ "id": "missing" }), &mut ctx, &cache).await.unwrap_err();

        assert_eq!(err, ErrorInfo::not_found("missing"));
        assert_eq!(calls.transforms(), 0);
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn test_invalid_output_is_reported() {
        let (mut procedure, calls) = SpyProcedure::new();
        procedure.blank_name = true;
        let bound = bind(procedure);
        let mut ctx = RequestContext::new();

        let err = bound.execute(&json!({ "id": "p-1" }), &mut ctx, &NoopCache).await.unwrap_err();

        match err {
            ErrorInfo::InvalidOutput { detail } => assert_eq!(detail.issues[0].path, "/name"),
            other => panic!("expected InvalidOutput, got {:?}", other),
        }
        assert_eq!(calls.transforms(), 1);
    }

    #[tokio::test]
    async fn test_cache_round_trip_and_expiry() {
        let (mut procedure, calls) = SpyProcedure::new();
        procedure.cached = true;
        let bound = bind(procedure);
        let clock = Arc::new(ManualClock::new());
        let cache = MemoryCache::new(100, Duration::from_secs(30)).with_clock(clock.clone());
        let mut ctx = RequestContext::new();
        let input = json!({ "id": "p-1" });

        let first = bound.execute(&input, &mut ctx, &cache).await.unwrap();
        assert_eq!(first.meta.cache, CacheStatus::Miss);
        assert!(first.meta.cache_key.is_some());

        let second = bound.execute(&input, &mut ctx, &cache).await.unwrap();
        assert!(second.is_cache_hit());
        assert_eq!(second.value, first.value);
        assert_eq!(second.meta.cache_key, first.meta.cache_key);
        assert_eq!(calls.fetches(), 1);
        // Transform still runs on cached data.
        assert_eq!(calls.transforms(), 2);

        clock.advance(Duration::from_secs(30));
        let third = bound.execute(&input, &mut ctx, &cache).await.unwrap();
        assert_eq!(third.meta.cache, CacheStatus::Miss);
        assert_eq!(calls.fetches(), 2);
    }

    #[tokio::test]
    async fn test_cache_key_varies_on_locale() {
        let (mut procedure, calls) = SpyProcedure::new();
        procedure.cached = true;
        let bound = bind(procedure);
        let cache = MemoryCache::default();
        let input = json!({ "id": "p-1" });

        let mut en = RequestContext::new();
        let mut de = RequestContext::new().with_locale("de-DE");

        bound.execute(&input, &mut en, &cache).await.unwrap();
        let german = bound.execute(&input, &mut de, &cache).await.unwrap();

        assert_eq!(german.meta.cache, CacheStatus::Miss);
        assert_eq!(german.value.name, "Item p-1 (de-DE)");
        assert_eq!(calls.fetches(), 2);
    }

    #[tokio::test]
    async fn test_erased_execution_returns_json() {
        let (procedure, _) = SpyProcedure::new();
        let erased: Box<dyn ErasedProcedure> = Box::new(bind(procedure));
        let mut ctx = RequestContext::new();

        let response = erased.execute_value(&json!({ "id": "p-2" }), &mut ctx, &NoopCache).await.unwrap();

        assert_eq!(erased.path().to_string(), "product.byId");
        assert_eq!(erased.signature(), Signature::of::<ById, Item>());
        assert_ne!(erased.signature(), Signature::of::<ById, Value>());
        assert_eq!(response.value["id"], json!("p-2"));
    }

    #[tokio::test]
    async fn test_concurrent_calls_share_cache() {
        let (mut procedure, calls) = SpyProcedure::new();
        procedure.cached = true;
        let bound = Arc::new(bind(procedure));
        let cache = Arc::new(MemoryCache::default());

        // Warm the entry so the fan-out below is all hits.
        bound
            .execute(&json!({ "id": "p-1" }), &mut RequestContext::new(), cache.as_ref())
            .await
            .unwrap();

        let tasks = (0..16).map(|_| {
            let bound = bound.clone();
            let cache = cache.clone();
            async move {
                let mut ctx = RequestContext::new();
                bound.execute(&json!({ "id": "p-1" }), &mut ctx, cache.as_ref()).await
            }
        });
        let results = futures::future::join_all(tasks).await;

        assert!(results.iter().all(|r| r.as_ref().map(|r| r.is_cache_hit()).unwrap_or(false)));
        assert_eq!(calls.fetches(), 1);
    }
}
