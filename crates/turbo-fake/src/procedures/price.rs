use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use turbo_cache::{CachePolicy, VaryRule};
use turbo_client::Procedure;
use turbo_commerce::price::{Price, PriceQueryBySku};
use turbo_commerce::{schemas, Currency, Money};
use turbo_core::{ErrorInfo, ProcedureResult, RequestContext, SchemaResult};

use super::Backend;
use crate::catalog::convert;

/// Backend price quote, already in the requested currency.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceRecord {
    pub code: String,
    pub currency_code: String,
    pub amount_minor: i64,
    #[serde(default)]
    pub list_minor: Option<i64>,
}

/// `price.getBySku`
pub struct PriceBySku {
    pub(crate) backend: Arc<Backend>,
}

#[async_trait]
impl Procedure for PriceBySku {
    type Input = PriceQueryBySku;
    type Output = Price;
    type Data = PriceRecord;

    fn input_schema(&self) -> SchemaResult<PriceQueryBySku> {
        Ok(schemas::price_query_by_sku())
    }

    fn output_schema(&self) -> SchemaResult<Price> {
        schemas::price()
    }

    fn cache_policy(&self) -> CachePolicy {
        CachePolicy::cached().vary_on(VaryRule::Currency)
    }

    async fn fetch(&self, input: &PriceQueryBySku, ctx: &RequestContext) -> ProcedureResult<PriceRecord> {
        let (product, sku) = self
            .backend
            .catalog
            .by_sku(&input.sku)
            .ok_or_else(|| ErrorInfo::not_found(&input.sku))?;
        let currency = self.backend.currency_for(ctx);

        Ok(PriceRecord {
            code: sku.code.clone(),
            currency_code: currency.code().to_string(),
            amount_minor: convert(product.usd_cents, currency).amount_cents,
            list_minor: product
                .list_usd_cents
                .map(|cents| convert(cents, currency).amount_cents),
        })
    }

    async fn transform(
        &self,
        _input: &PriceQueryBySku,
        _ctx: &mut RequestContext,
        data: PriceRecord,
    ) -> ProcedureResult<Price> {
        let currency = Currency::from_code(&data.currency_code)
            .ok_or_else(|| ErrorInfo::generic(format!("unsupported currency {}", data.currency_code)))?;

        Ok(Price {
            sku: data.code,
            unit_price: Money::new(data.amount_minor, currency),
            list_price: data.list_minor.map(|amount| Money::new(amount, currency)),
        })
    }
}
