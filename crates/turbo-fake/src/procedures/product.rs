use std::sync::Arc;

use async_trait::async_trait;
use turbo_cache::{CachePolicy, VaryRule};
use turbo_client::Procedure;
use turbo_commerce::product::{Product, ProductQueryById, ProductQueryBySlug, ProductVariant};
use turbo_commerce::schemas;
use turbo_core::{ErrorInfo, ProcedureResult, RequestContext, SchemaResult};

use super::Backend;
use crate::catalog::ProductRecord;

fn to_product(record: ProductRecord) -> Product {
    let variants = record
        .skus
        .into_iter()
        .map(|sku| ProductVariant {
            id: format!("{}-{}", record.pid, sku.label.to_lowercase()).into(),
            sku: sku.code,
            name: sku.label,
        })
        .collect();

    Product {
        id: record.pid.into(),
        slug: record.handle,
        name: record.title,
        description: record.blurb,
        image: Some(record.image_url),
        variants,
    }
}

/// `product.byId`
pub struct ProductById {
    pub(crate) backend: Arc<Backend>,
}

#[async_trait]
impl Procedure for ProductById {
    type Input = ProductQueryById;
    type Output = Product;
    type Data = ProductRecord;

    fn input_schema(&self) -> SchemaResult<ProductQueryById> {
        Ok(schemas::product_query_by_id())
    }

    fn output_schema(&self) -> SchemaResult<Product> {
        schemas::product()
    }

    fn cache_policy(&self) -> CachePolicy {
        CachePolicy::cached().vary_on(VaryRule::Locale)
    }

    async fn fetch(&self, input: &ProductQueryById, ctx: &RequestContext) -> ProcedureResult<ProductRecord> {
        self.backend
            .catalog
            .by_id(input.id.as_str())
            .map(|record| record.localized(ctx.locale()))
            .ok_or_else(|| ErrorInfo::not_found(&input.id))
    }

    async fn transform(
        &self,
        _input: &ProductQueryById,
        _ctx: &mut RequestContext,
        data: ProductRecord,
    ) -> ProcedureResult<Product> {
        Ok(to_product(data))
    }
}

/// `product.bySlug`
pub struct ProductBySlug {
    pub(crate) backend: Arc<Backend>,
}

#[async_trait]
impl Procedure for ProductBySlug {
    type Input = ProductQueryBySlug;
    type Output = Product;
    type Data = ProductRecord;

    fn input_schema(&self) -> SchemaResult<ProductQueryBySlug> {
        Ok(schemas::product_query_by_slug())
    }

    fn output_schema(&self) -> SchemaResult<Product> {
        schemas::product()
    }

    fn cache_policy(&self) -> CachePolicy {
        CachePolicy::cached().vary_on(VaryRule::Locale)
    }

    async fn fetch(&self, input: &ProductQueryBySlug, ctx: &RequestContext) -> ProcedureResult<ProductRecord> {
        self.backend
            .catalog
            .by_handle(&input.slug)
            .map(|record| record.localized(ctx.locale()))
            .ok_or_else(|| ErrorInfo::not_found(&input.slug))
    }

    async fn transform(
        &self,
        _input: &ProductQueryBySlug,
        _ctx: &mut RequestContext,
        data: ProductRecord,
    ) -> ProcedureResult<Product> {
        Ok(to_product(data))
    }
}
