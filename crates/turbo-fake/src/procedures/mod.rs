//! Procedures backing each capability group.

mod cart;
mod identity;
mod price;
mod product;
mod search;

pub use cart::{CartAdd, CartGetById};
pub use identity::IdentityGetSelf;
pub use price::PriceBySku;
pub use product::{ProductById, ProductBySlug};
pub use search::SearchByTerm;

use serde::{Deserialize, Serialize};
use turbo_commerce::{CartId, Currency, IdentityId};
use turbo_core::{ProcedureResult, RequestContext};

use crate::catalog::Catalog;
use crate::store::CartStore;

/// State shared by every procedure of one provider instance.
#[derive(Debug)]
pub struct Backend {
    pub catalog: Catalog,
    pub carts: CartStore,
    /// Fallback when the request asks for an unsupported currency.
    pub currency: Currency,
}

impl Backend {
    pub fn currency_for(&self, ctx: &RequestContext) -> Currency {
        Currency::from_code(ctx.currency_code()).unwrap_or(self.currency)
    }
}

/// What the provider keeps in the caller's session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FakeSession {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cart: Option<CartId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guest: Option<IdentityId>,
}

impl FakeSession {
    pub fn load(ctx: &RequestContext, namespace: &str) -> ProcedureResult<Self> {
        Ok(ctx.session.extension(namespace)?.unwrap_or_default())
    }

    pub fn save(&self, ctx: &mut RequestContext, namespace: &str) -> ProcedureResult<()> {
        ctx.session.set_extension(namespace, self)
    }
}
