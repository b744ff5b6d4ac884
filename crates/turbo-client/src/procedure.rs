//! The procedure contract every provider operation implements.

use std::fmt;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use turbo_cache::CachePolicy;
use turbo_core::{ProcedureResult, RequestContext, SchemaResult, SerdeSchema};

/// Where a procedure sits in the capability tree.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ProcedurePath {
    /// Capability group (e.g., "product").
    pub group: String,
    /// Operation within the group (e.g., "byId").
    pub operation: String,
}

impl ProcedurePath {
    pub fn new(group: impl Into<String>, operation: impl Into<String>) -> Self {
        Self {
            group: group.into(),
            operation: operation.into(),
        }
    }
}

impl fmt::Display for ProcedurePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.group, self.operation)
    }
}

/// One operation's full contract.
///
/// `fetch` obtains the provider's native `Data`; `transform` turns it into the
/// canonical `Output`. Only `transform` receives the context mutably, so it is
/// the one place a provider may persist session state.
///
/// Schemas and the cache policy are read once when the procedure is bound
/// into a client; a schema error surfaces as [`BuildError::Schema`].
///
/// [`BuildError::Schema`]: crate::BuildError::Schema
///
/// ```ignore
/// struct ProductById;
///
/// #[async_trait]
/// impl Procedure for ProductById {
///     type Input = ProductQueryById;
///     type Output = Product;
///     type Data = NativeProduct;
///
///     fn cache_policy(&self) -> CachePolicy {
///         CachePolicy::cached().vary_on(VaryRule::Locale)
///     }
///
///     async fn fetch(&self, input: &Self::Input, ctx: &RequestContext) -> ProcedureResult<NativeProduct> {
///         backend.product(&input.id, ctx.locale()).await
///     }
///
///     async fn transform(&self, _: &Self::Input, _: &mut RequestContext, data: NativeProduct) -> ProcedureResult<Product> {
///         Ok(data.into())
///     }
/// }
/// ```
#[async_trait]
pub trait Procedure: Send + Sync + 'static {
    /// Validated input shape.
    type Input: Serialize + DeserializeOwned + Send + Sync + 'static;
    /// Canonical output shape exposed to callers.
    type Output: Serialize + DeserializeOwned + Send + 'static;
    /// Provider-native shape produced by `fetch` and cached.
    type Data: Serialize + DeserializeOwned + Send + 'static;

    /// Schema raw input must satisfy. Defaults to the `Input` type's shape.
    fn input_schema(&self) -> SchemaResult<Self::Input> {
        Ok(Box::new(SerdeSchema::new()))
    }

    /// Schema the transformed output must satisfy. A schema that fails to
    /// build fails the client build.
    fn output_schema(&self) -> SchemaResult<Self::Output> {
        Ok(Box::new(SerdeSchema::new()))
    }

    /// Whether fetch results may be cached. Defaults to never.
    fn cache_policy(&self) -> CachePolicy {
        CachePolicy::none()
    }

    /// Obtain native data. Must not have side effects on the context.
    async fn fetch(&self, input: &Self::Input, ctx: &RequestContext) -> ProcedureResult<Self::Data>;

    /// Convert native data into the canonical output.
    async fn transform(
        &self,
        input: &Self::Input,
        ctx: &mut RequestContext,
        data: Self::Data,
    ) -> ProcedureResult<Self::Output>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_display_and_order() {
        let a = ProcedurePath::new("cart", "add");
        let b = ProcedurePath::new("product", "byId");
        assert_eq!(a.to_string(), "cart.add");
        assert!(a < b);
    }
}
