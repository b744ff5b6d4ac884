//! Price shapes.

use serde::{Deserialize, Serialize};

use crate::money::Money;

/// `price.getBySku` input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceQueryBySku {
    pub sku: String,
}

/// Unit price of one SKU in the request's currency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Price {
    pub sku: String,
    pub unit_price: Money,
    /// Price before a markdown, when one applies.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub list_price: Option<Money>,
}

impl Price {
    pub fn is_on_sale(&self) -> bool {
        self.list_price
            .map_or(false, |list| list.amount_cents > self.unit_price.amount_cents)
    }
}
