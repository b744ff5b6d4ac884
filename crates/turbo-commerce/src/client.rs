//! Typed access to the canonical capability groups.
//!
//! [`CommerceClient`] wraps an assembled [`Client`]. A group field is `Some`
//! exactly when the client exposes that group, and each operation inside it
//! is checked against the canonical input and output types when the facade
//! is built.

use turbo_client::{BuildError, CapabilityGroup, Client, Response, TypedOperation};
use turbo_core::{ProcedureResult, RequestContext};

use crate::cart::{Cart, CartMutationItemAdd, CartQueryById};
use crate::identity::{Identity, IdentityQuerySelf};
use crate::names::{capability, op};
use crate::price::{Price, PriceQueryBySku};
use crate::product::{Product, ProductQueryById, ProductQueryBySlug};
use crate::search::{SearchQueryByTerm, SearchResult};

/// The result of calling an operation the group may not carry.
pub type Call<O> = Option<ProcedureResult<Response<O>>>;

#[derive(Debug, Clone)]
pub struct ProductOps {
    pub by_id: Option<TypedOperation<ProductQueryById, Product>>,
    pub by_slug: Option<TypedOperation<ProductQueryBySlug, Product>>,
}

impl ProductOps {
    pub async fn by_id(&self, query: &ProductQueryById, ctx: &mut RequestContext) -> Call<Product> {
        invoke(&self.by_id, query, ctx).await
    }

    pub async fn by_slug(&self, query: &ProductQueryBySlug, ctx: &mut RequestContext) -> Call<Product> {
        invoke(&self.by_slug, query, ctx).await
    }
}

#[derive(Debug, Clone)]
pub struct SearchOps {
    pub by_term: Option<TypedOperation<SearchQueryByTerm, SearchResult>>,
}

impl SearchOps {
    pub async fn by_term(&self, query: &SearchQueryByTerm, ctx: &mut RequestContext) -> Call<SearchResult> {
        invoke(&self.by_term, query, ctx).await
    }
}

#[derive(Debug, Clone)]
pub struct CartOps {
    pub get_by_id: Option<TypedOperation<CartQueryById, Cart>>,
    pub add: Option<TypedOperation<CartMutationItemAdd, Cart>>,
}

impl CartOps {
    pub async fn get_by_id(&self, query: &CartQueryById, ctx: &mut RequestContext) -> Call<Cart> {
        invoke(&self.get_by_id, query, ctx).await
    }

    pub async fn add(&self, mutation: &CartMutationItemAdd, ctx: &mut RequestContext) -> Call<Cart> {
        invoke(&self.add, mutation, ctx).await
    }
}

#[derive(Debug, Clone)]
pub struct IdentityOps {
    pub get_self: Option<TypedOperation<IdentityQuerySelf, Identity>>,
}

impl IdentityOps {
    pub async fn get_self(&self, ctx: &mut RequestContext) -> Call<Identity> {
        invoke(&self.get_self, &IdentityQuerySelf::default(), ctx).await
    }
}

#[derive(Debug, Clone)]
pub struct PriceOps {
    pub get_by_sku: Option<TypedOperation<PriceQueryBySku, Price>>,
}

impl PriceOps {
    pub async fn get_by_sku(&self, query: &PriceQueryBySku, ctx: &mut RequestContext) -> Call<Price> {
        invoke(&self.get_by_sku, query, ctx).await
    }
}

/// Typed view over a [`Client`] speaking the canonical commerce shapes.
///
/// ```ignore
/// let commerce = CommerceClient::new(client)?;
/// if let Some(product) = &commerce.product {
///     let found = product.by_id(&ProductQueryById { id: "p-1".into() }, &mut ctx).await;
/// }
/// ```
#[derive(Debug, Clone)]
pub struct CommerceClient {
    pub product: Option<ProductOps>,
    pub search: Option<SearchOps>,
    pub cart: Option<CartOps>,
    pub identity: Option<IdentityOps>,
    pub price: Option<PriceOps>,
    client: Client,
}

impl CommerceClient {
    /// Fails with [`BuildError::SignatureMismatch`] when a provider registered
    /// a canonical operation with other input or output types.
    pub fn new(client: Client) -> Result<Self, BuildError> {
        let product = group(&client, capability::PRODUCT, |g| {
            Ok(ProductOps {
                by_id: typed(g, op::BY_ID)?,
                by_slug: typed(g, op::BY_SLUG)?,
            })
        })?;
        let search = group(&client, capability::SEARCH, |g| {
            Ok(SearchOps {
                by_term: typed(g, op::BY_TERM)?,
            })
        })?;
        let cart = group(&client, capability::CART, |g| {
            Ok(CartOps {
                get_by_id: typed(g, op::GET_BY_ID)?,
                add: typed(g, op::ADD)?,
            })
        })?;
        let identity = group(&client, capability::IDENTITY, |g| {
            Ok(IdentityOps {
                get_self: typed(g, op::GET_SELF)?,
            })
        })?;
        let price = group(&client, capability::PRICE, |g| {
            Ok(PriceOps {
                get_by_sku: typed(g, op::GET_BY_SKU)?,
            })
        })?;

        tracing::debug!(
            groups = ?client.capabilities().collect::<Vec<_>>(),
            "commerce client ready"
        );

        Ok(Self {
            product,
            search,
            cart,
            identity,
            price,
            client,
        })
    }

    /// The untyped client underneath.
    pub fn client(&self) -> &Client {
        &self.client
    }
}

fn group<T>(
    client: &Client,
    name: &str,
    build: impl FnOnce(&CapabilityGroup) -> Result<T, BuildError>,
) -> Result<Option<T>, BuildError> {
    client.capability(name).map(build).transpose()
}

fn typed<I: 'static, O: 'static>(
    group: &CapabilityGroup,
    name: &str,
) -> Result<Option<TypedOperation<I, O>>, BuildError> {
    group.operation(name).map(|operation| operation.typed()).transpose()
}

async fn invoke<I, O>(operation: &Option<TypedOperation<I, O>>, input: &I, ctx: &mut RequestContext) -> Call<O>
where
    I: serde::Serialize,
    O: serde::de::DeserializeOwned,
{
    match operation {
        Some(operation) => Some(operation.call(input, ctx).await),
        None => None,
    }
}
