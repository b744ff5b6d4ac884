//! Client assembly and invocation.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::info;
use turbo_cache::{Cache, CacheConfig, NoopCache};
use turbo_core::{ErrorInfo, ProcedureResult, RequestContext, ValidationFailure};

use crate::capability::{merge, CapabilityDefinition};
use crate::config::ClientConfig;
use crate::error::BuildError;
use crate::pipeline::{ErasedProcedure, Response, Signature};
use crate::procedure::ProcedurePath;
use crate::provider::Provider;
use crate::selection::{select, CapabilitySelection};

/// Collects providers and options, then assembles a [`Client`].
///
/// ```ignore
/// let client = ClientBuilder::new()
///     .with_provider(FakeProvider::new(FakeConfig::default()))
///     .with_capabilities(CapabilitySelection::new().enable("product"))
///     .with_cache_config(&CacheConfig::memory(500, Duration::from_secs(60)))
///     .build()?;
/// ```
#[derive(Default)]
pub struct ClientBuilder {
    providers: Vec<Box<dyn Provider>>,
    definitions: Vec<CapabilityDefinition>,
    selection: Option<CapabilitySelection>,
    cache: Option<Arc<dyn Cache>>,
}

impl ClientBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply the cache and selection sections of a loaded config.
    pub fn from_config(config: &ClientConfig) -> Self {
        let builder = Self::new().with_cache_config(&config.cache);
        match &config.capabilities {
            Some(selection) => builder.with_capabilities(selection.clone()),
            None => builder,
        }
    }

    /// Contribute a provider's capabilities.
    pub fn with_provider<P: Provider + 'static>(mut self, provider: P) -> Self {
        self.providers.push(Box::new(provider));
        self
    }

    /// Contribute a ready-made capability tree.
    pub fn with_definition(mut self, definition: CapabilityDefinition) -> Self {
        self.definitions.push(definition);
        self
    }

    /// Restrict the exposed capability groups. Without a selection every
    /// merged group is exposed.
    pub fn with_capabilities(mut self, selection: CapabilitySelection) -> Self {
        self.selection = Some(selection);
        self
    }

    /// Use a specific cache. Defaults to the no-op cache.
    pub fn with_cache(mut self, cache: Arc<dyn Cache>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn with_cache_config(self, config: &CacheConfig) -> Self {
        self.with_cache(config.build())
    }

    /// Merge, select and bind everything.
    ///
    /// Provider names must be unique, and every procedure a provider
    /// contributes must carry that provider's name, since the name is also
    /// its session namespace.
    pub fn build(self) -> Result<Client, BuildError> {
        let mut names = BTreeSet::new();
        let mut definitions = Vec::with_capacity(self.providers.len() + self.definitions.len());
        for provider in &self.providers {
            let name = provider.name();
            if !names.insert(name.to_string()) {
                return Err(BuildError::DuplicateProvider(name.to_string()));
            }

            let definition = provider.capabilities()?;
            if let Some(stray) = definition.procedures().find(|p| p.provider() != name) {
                return Err(BuildError::ProviderMismatch {
                    provider: name.to_string(),
                    path: stray.path().to_string(),
                    label: stray.provider().to_string(),
                });
            }
            definitions.push(definition);
        }

        for definition in &self.definitions {
            if let Some(taken) = definition.procedures().find(|p| names.contains(p.provider())) {
                return Err(BuildError::DuplicateProvider(taken.provider().to_string()));
            }
        }
        definitions.extend(self.definitions);

        let merged = merge(definitions)?;
        let tree = match &self.selection {
            Some(selection) => select(merged, selection)?,
            None => merged,
        };
        let cache = self.cache.unwrap_or_else(|| Arc::new(NoopCache));

        let groups: BTreeMap<String, CapabilityGroup> = tree
            .into_groups()
            .into_iter()
            .map(|(name, procedures)| {
                let operations = procedures
                    .into_iter()
                    .map(|(op, procedure)| {
                        let operation = Operation {
                            procedure,
                            cache: cache.clone(),
                        };
                        (op, operation)
                    })
                    .collect();
                (name.clone(), CapabilityGroup { name, operations })
            })
            .collect();

        info!(
            providers = self.providers.len(),
            groups = ?groups.keys().collect::<Vec<_>>(),
            operations = groups.values().map(|g| g.operations.len()).sum::<usize>(),
            "client built"
        );

        Ok(Client {
            groups: Arc::new(groups),
            cache,
        })
    }
}

/// An assembled client. Cheap to clone; clones share procedures and cache.
#[derive(Clone)]
pub struct Client {
    groups: Arc<BTreeMap<String, CapabilityGroup>>,
    cache: Arc<dyn Cache>,
}

impl Client {
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// A capability group, if it was merged and selected.
    pub fn capability(&self, group: &str) -> Option<&CapabilityGroup> {
        self.groups.get(group)
    }

    /// Exposed group names, sorted.
    pub fn capabilities(&self) -> impl Iterator<Item = &str> {
        self.groups.keys().map(|g| g.as_str())
    }

    /// Every exposed `group.operation`, sorted.
    pub fn paths(&self) -> Vec<ProcedurePath> {
        self.groups
            .values()
            .flat_map(|g| g.operations.values().map(|op| op.path().clone()))
            .collect()
    }

    /// A single operation.
    pub fn operation(&self, group: &str, operation: &str) -> Option<&Operation> {
        self.capability(group)?.operation(operation)
    }

    /// Invoke `group.operation` with a raw input. `None` if it is not exposed.
    pub async fn call(
        &self,
        group: &str,
        operation: &str,
        input: &Value,
        ctx: &mut RequestContext,
    ) -> Option<ProcedureResult<Response<Value>>> {
        let operation = self.operation(group, operation)?;
        Some(operation.call_raw(input, ctx).await)
    }

    pub fn cache(&self) -> &Arc<dyn Cache> {
        &self.cache
    }
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("capabilities", &self.groups.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Operations exposed under one capability group.
pub struct CapabilityGroup {
    name: String,
    operations: BTreeMap<String, Operation>,
}

impl CapabilityGroup {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn operation(&self, name: &str) -> Option<&Operation> {
        self.operations.get(name)
    }

    pub fn operations(&self) -> impl Iterator<Item = &str> {
        self.operations.keys().map(|o| o.as_str())
    }
}

/// A bound, invocable procedure.
#[derive(Clone)]
pub struct Operation {
    procedure: Arc<dyn ErasedProcedure>,
    cache: Arc<dyn Cache>,
}

impl Operation {
    pub fn path(&self) -> &ProcedurePath {
        self.procedure.path()
    }

    /// Provider serving this operation.
    pub fn provider(&self) -> &str {
        self.procedure.provider()
    }

    /// Concrete input and output types of the bound procedure.
    pub fn signature(&self) -> Signature {
        self.procedure.signature()
    }

    /// A view with fixed input and output types.
    ///
    /// Fails unless `I` and `O` are exactly the procedure's own types.
    pub fn typed<I: 'static, O: 'static>(&self) -> Result<TypedOperation<I, O>, BuildError> {
        let expected = Signature::of::<I, O>();
        let found = self.signature();
        if found != expected {
            return Err(BuildError::SignatureMismatch {
                path: self.path().to_string(),
                expected: expected.to_string(),
                found: found.to_string(),
            });
        }
        Ok(TypedOperation {
            operation: self.clone(),
            _types: PhantomData,
        })
    }

    /// Invoke with a typed input, returning the output as JSON.
    pub async fn call<I: Serialize + ?Sized>(
        &self,
        input: &I,
        ctx: &mut RequestContext,
    ) -> ProcedureResult<Response<Value>> {
        let raw = serde_json::to_value(input).map_err(|e| ErrorInfo::InvalidInput {
            detail: ValidationFailure::single("", e.to_string()),
        })?;
        self.call_raw(&raw, ctx).await
    }

    /// Invoke with an untyped input.
    pub async fn call_raw(&self, input: &Value, ctx: &mut RequestContext) -> ProcedureResult<Response<Value>> {
        self.procedure
            .execute_value(input, ctx, self.cache.as_ref())
            .await
    }

    /// Invoke and decode the output into `T`.
    pub async fn call_as<T, I>(&self, input: &I, ctx: &mut RequestContext) -> ProcedureResult<Response<T>>
    where
        T: DeserializeOwned,
        I: Serialize + ?Sized,
    {
        let response = self.call(input, ctx).await?;
        let meta = response.meta;
        let value = serde_json::from_value(response.value).map_err(|e| {
            ErrorInfo::generic(format!("failed to decode {} output: {}", meta.procedure, e))
        })?;
        Ok(Response { value, meta })
    }
}

/// An [`Operation`] whose input and output types were checked against the
/// bound procedure.
pub struct TypedOperation<I, O> {
    operation: Operation,
    _types: PhantomData<fn(&I) -> O>,
}

impl<I, O> Clone for TypedOperation<I, O> {
    fn clone(&self) -> Self {
        Self {
            operation: self.operation.clone(),
            _types: PhantomData,
        }
    }
}

impl<I, O> fmt::Debug for TypedOperation<I, O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypedOperation")
            .field("path", self.operation.path())
            .field("provider", &self.operation.provider())
            .finish()
    }
}

impl<I: Serialize, O: DeserializeOwned> TypedOperation<I, O> {
    pub fn path(&self) -> &ProcedurePath {
        self.operation.path()
    }

    pub fn provider(&self) -> &str {
        self.operation.provider()
    }

    pub async fn call(&self, input: &I, ctx: &mut RequestContext) -> ProcedureResult<Response<O>> {
        self.operation.call_as::<O, I>(input, ctx).await
    }
}
