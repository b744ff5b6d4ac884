//! Schemas for the canonical shapes.
//!
//! Output schemas are JSON Schema documents, so any provider's output is
//! checked against the same contract. Input schemas are the types' own shapes
//! plus value-level rules.

use serde_json::{json, Value};
use turbo_core::{JsonSchema, Schema, SchemaResult, SerdeSchema};

use crate::cart::{Cart, CartMutationItemAdd, CartQueryById, MAX_QUANTITY_PER_ITEM};
use crate::identity::{Identity, IdentityQuerySelf};
use crate::money::{Currency, Money};
use crate::price::{Price, PriceQueryBySku};
use crate::product::{is_valid_slug, Product, ProductQueryById, ProductQueryBySlug};
use crate::search::{SearchQueryByTerm, SearchResult, MAX_PAGE_SIZE};

// JSON Schema documents

pub fn money_document() -> Value {
    let codes: Vec<&str> = Currency::ALL.iter().map(|c| c.code()).collect();
    json!({
        "type": "object",
        "required": ["amount_cents", "currency"],
        "properties": {
            "amount_cents": { "type": "integer" },
            "currency": { "enum": codes }
        }
    })
}

pub fn product_document() -> Value {
    json!({
        "type": "object",
        "required": ["id", "slug", "name", "variants"],
        "properties": {
            "id": { "type": "string", "minLength": 1 },
            "slug": { "type": "string", "pattern": "^[a-z0-9]+(-[a-z0-9]+)*$" },
            "name": { "type": "string", "minLength": 1 },
            "description": { "type": "string" },
            "image": { "type": "string" },
            "variants": {
                "type": "array",
                "minItems": 1,
                "items": {
                    "type": "object",
                    "required": ["id", "sku", "name"],
                    "properties": {
                        "id": { "type": "string", "minLength": 1 },
                        "sku": { "type": "string", "minLength": 1 },
                        "name": { "type": "string" }
                    }
                }
            }
        }
    })
}

pub fn search_result_document() -> Value {
    json!({
        "type": "object",
        "required": ["items", "total", "page", "page_size", "total_pages"],
        "properties": {
            "items": {
                "type": "array",
                "items": {
                    "type": "object",
                    "required": ["product", "slug", "name"],
                    "properties": {
                        "product": { "type": "string", "minLength": 1 },
                        "slug": { "type": "string" },
                        "name": { "type": "string" }
                    }
                }
            },
            "total": { "type": "integer", "minimum": 0 },
            "page": { "type": "integer", "minimum": 1 },
            "page_size": { "type": "integer", "minimum": 1, "maximum": MAX_PAGE_SIZE },
            "total_pages": { "type": "integer", "minimum": 1 }
        }
    })
}

pub fn cart_document() -> Value {
    json!({
        "type": "object",
        "required": ["id", "items", "currency", "total"],
        "properties": {
            "id": { "type": "string", "minLength": 1 },
            "currency": money_document()["properties"]["currency"].clone(),
            "total": money_document(),
            "items": {
                "type": "array",
                "items": {
                    "type": "object",
                    "required": ["id", "sku", "product", "name", "quantity", "unit_price", "total"],
                    "properties": {
                        "sku": { "type": "string", "minLength": 1 },
                        "quantity": { "type": "integer", "minimum": 1, "maximum": MAX_QUANTITY_PER_ITEM },
                        "unit_price": money_document(),
                        "total": money_document()
                    }
                }
            }
        }
    })
}

pub fn identity_document() -> Value {
    json!({
        "type": "object",
        "required": ["type"],
        "properties": {
            "type": { "enum": ["anonymous", "guest", "registered"] }
        },
        "if": { "properties": { "type": { "const": "registered" } } },
        "then": { "required": ["id", "email"] },
        "else": {
            "if": { "properties": { "type": { "const": "guest" } } },
            "then": { "required": ["id"] }
        }
    })
}

pub fn price_document() -> Value {
    json!({
        "type": "object",
        "required": ["sku", "unit_price"],
        "properties": {
            "sku": { "type": "string", "minLength": 1 },
            "unit_price": money_document(),
            "list_price": money_document()
        }
    })
}

// Output schemas

pub fn product() -> SchemaResult<Product> {
    Ok(Box::new(JsonSchema::<Product>::compile(&product_document())?))
}

pub fn search_result() -> SchemaResult<SearchResult> {
    Ok(Box::new(JsonSchema::<SearchResult>::compile(&search_result_document())?))
}

pub fn cart() -> SchemaResult<Cart> {
    let schema = JsonSchema::<Cart>::compile(&cart_document())?;
    Ok(Box::new(schema.refine("/total", "must equal the sum of line totals", |cart: &Cart| {
        Money::sum(cart.items.iter().map(|i| &i.total), cart.currency).map_or(false, |sum| sum == cart.total)
    })))
}

pub fn identity() -> SchemaResult<Identity> {
    Ok(Box::new(JsonSchema::<Identity>::compile(&identity_document())?))
}

pub fn price() -> SchemaResult<Price> {
    Ok(Box::new(JsonSchema::<Price>::compile(&price_document())?))
}

// Input schemas

pub fn product_query_by_id() -> Box<dyn Schema<ProductQueryById>> {
    Box::new(SerdeSchema::new().refine("/id", "must not be empty", |q: &ProductQueryById| !q.id.is_empty()))
}

pub fn product_query_by_slug() -> Box<dyn Schema<ProductQueryBySlug>> {
    Box::new(SerdeSchema::new().refine(
        "/slug",
        "must be lowercase words separated by hyphens",
        |q: &ProductQueryBySlug| is_valid_slug(&q.slug),
    ))
}

pub fn search_query_by_term() -> Box<dyn Schema<SearchQueryByTerm>> {
    Box::new(
        SerdeSchema::new()
            .refine("/term", "must not be blank", |q: &SearchQueryByTerm| !q.term.trim().is_empty())
            .refine("/page", "must be at least 1", |q: &SearchQueryByTerm| q.page >= 1)
            .refine("/page_size", "must be between 1 and 100", |q: &SearchQueryByTerm| {
                (1..=MAX_PAGE_SIZE).contains(&q.page_size)
            }),
    )
}

pub fn cart_query_by_id() -> Box<dyn Schema<CartQueryById>> {
    Box::new(SerdeSchema::new().refine("/cart", "must not be empty", |q: &CartQueryById| !q.cart.is_empty()))
}

pub fn cart_mutation_item_add() -> Box<dyn Schema<CartMutationItemAdd>> {
    Box::new(
        SerdeSchema::new()
            .refine("/sku", "must not be empty", |m: &CartMutationItemAdd| !m.sku.is_empty())
            .refine("/quantity", "must be between 1 and 999", |m: &CartMutationItemAdd| {
                (1..=MAX_QUANTITY_PER_ITEM).contains(&m.quantity)
            }),
    )
}

pub fn identity_query_self() -> Box<dyn Schema<IdentityQuerySelf>> {
    Box::new(SerdeSchema::new())
}

pub fn price_query_by_sku() -> Box<dyn Schema<PriceQueryBySku>> {
    Box::new(SerdeSchema::new().refine("/sku", "must not be empty", |q: &PriceQueryBySku| !q.sku.is_empty()))
}
