use std::sync::Arc;

use async_trait::async_trait;
use turbo_client::Procedure;
use turbo_commerce::cart::{Cart, CartMutationItemAdd, CartQueryById};
use turbo_commerce::{schemas, CartId};
use turbo_core::{ErrorInfo, ProcedureResult, RequestContext, SchemaResult};

use super::{Backend, FakeSession};
use crate::catalog::convert;

/// `cart.getById`
pub struct CartGetById {
    pub(crate) backend: Arc<Backend>,
}

#[async_trait]
impl Procedure for CartGetById {
    type Input = CartQueryById;
    type Output = Cart;
    type Data = Cart;

    fn input_schema(&self) -> SchemaResult<CartQueryById> {
        Ok(schemas::cart_query_by_id())
    }

    fn output_schema(&self) -> SchemaResult<Cart> {
        schemas::cart()
    }

    async fn fetch(&self, input: &CartQueryById, _ctx: &RequestContext) -> ProcedureResult<Cart> {
        self.backend
            .carts
            .get(&input.cart)
            .ok_or_else(|| ErrorInfo::not_found(&input.cart))
    }

    async fn transform(&self, _input: &CartQueryById, _ctx: &mut RequestContext, data: Cart) -> ProcedureResult<Cart> {
        Ok(data)
    }
}

/// `cart.add`
///
/// Without an explicit cart the session's cart is used, or a new one is
/// opened. The cart id is remembered in the session.
pub struct CartAdd {
    pub(crate) backend: Arc<Backend>,
    pub(crate) namespace: String,
}

impl CartAdd {
    fn resolve_cart(&self, input: &CartMutationItemAdd, ctx: &RequestContext) -> ProcedureResult<CartId> {
        if let Some(id) = &input.cart {
            return match self.backend.carts.get(id) {
                Some(_) => Ok(id.clone()),
                None => Err(ErrorInfo::not_found(id)),
            };
        }
        let session = FakeSession::load(ctx, &self.namespace)?;
        Ok(session.cart.unwrap_or_else(CartId::generate))
    }
}

#[async_trait]
impl Procedure for CartAdd {
    type Input = CartMutationItemAdd;
    type Output = Cart;
    type Data = Cart;

    fn input_schema(&self) -> SchemaResult<CartMutationItemAdd> {
        Ok(schemas::cart_mutation_item_add())
    }

    fn output_schema(&self) -> SchemaResult<Cart> {
        schemas::cart()
    }

    async fn fetch(&self, input: &CartMutationItemAdd, ctx: &RequestContext) -> ProcedureResult<Cart> {
        let (product, sku) = self
            .backend
            .catalog
            .by_sku(&input.sku)
            .ok_or_else(|| ErrorInfo::not_found(&input.sku))?;
        let cart_id = self.resolve_cart(input, ctx)?;
        let currency = self.backend.currency_for(ctx);
        let unit_price = convert(product.usd_cents, currency);

        let cart = self.backend.carts.upsert(
            &cart_id,
            || Cart::new(cart_id.clone(), currency),
            |cart| {
                cart.add_item(&sku.code, product.pid.as_str().into(), &product.title, input.quantity, unit_price)
                    .map(|_| ())
            },
        )?;

        tracing::debug!(cart = %cart.id, sku = %sku.code, quantity = input.quantity, "item added");
        Ok(cart)
    }

    async fn transform(
        &self,
        _input: &CartMutationItemAdd,
        ctx: &mut RequestContext,
        data: Cart,
    ) -> ProcedureResult<Cart> {
        let mut session = FakeSession::load(ctx, &self.namespace)?;
        session.cart = Some(data.id.clone());
        session.save(ctx, &self.namespace)?;
        Ok(data)
    }
}
