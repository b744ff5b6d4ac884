//! Cart shapes and line-item arithmetic.

use serde::{Deserialize, Serialize};

use crate::error::CommerceError;
use crate::ids::{CartId, CartItemId, ProductId};
use crate::money::{Currency, Money};

/// Maximum quantity of a single SKU in one cart.
pub const MAX_QUANTITY_PER_ITEM: i64 = 999;

fn default_quantity() -> i64 {
    1
}

/// `cart.getById` input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartQueryById {
    pub cart: CartId,
}

/// `cart.add` input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartMutationItemAdd {
    /// Cart to add to. Without one the session's cart is used, or a new one
    /// is created.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cart: Option<CartId>,
    pub sku: String,
    #[serde(default = "default_quantity")]
    pub quantity: i64,
}

/// A line in a cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    pub id: CartItemId,
    pub sku: String,
    pub product: ProductId,
    /// Product name (denormalized for display).
    pub name: String,
    pub quantity: i64,
    pub unit_price: Money,
    /// unit_price * quantity.
    pub total: Money,
}

/// Canonical cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    pub id: CartId,
    pub items: Vec<CartItem>,
    pub currency: Currency,
    /// Sum of line totals.
    pub total: Money,
}

impl Cart {
    /// An empty cart.
    pub fn new(id: CartId, currency: Currency) -> Self {
        Self {
            id,
            items: Vec::new(),
            currency,
            total: Money::zero(currency),
        }
    }

    /// Add `quantity` of `sku`, merging with an existing line for the same SKU.
    pub fn add_item(
        &mut self,
        sku: impl Into<String>,
        product: ProductId,
        name: impl Into<String>,
        quantity: i64,
        unit_price: Money,
    ) -> Result<CartItemId, CommerceError> {
        if quantity <= 0 {
            return Err(CommerceError::InvalidQuantity(quantity));
        }
        if unit_price.currency != self.currency {
            return Err(CommerceError::CurrencyMismatch {
                expected: self.currency.code().to_string(),
                got: unit_price.currency.code().to_string(),
            });
        }

        let sku = sku.into();
        let id = match self.items.iter().position(|i| i.sku == sku) {
            Some(index) => {
                let existing = &mut self.items[index];
                let merged = existing
                    .quantity
                    .checked_add(quantity)
                    .ok_or(CommerceError::Overflow)?;
                if merged > MAX_QUANTITY_PER_ITEM {
                    return Err(CommerceError::QuantityExceedsLimit(merged, MAX_QUANTITY_PER_ITEM));
                }
                existing.quantity = merged;
                existing.total = existing.unit_price.checked_mul(merged)?;
                existing.id.clone()
            }
            None => {
                if quantity > MAX_QUANTITY_PER_ITEM {
                    return Err(CommerceError::QuantityExceedsLimit(quantity, MAX_QUANTITY_PER_ITEM));
                }
                let item = CartItem {
                    id: CartItemId::generate(),
                    sku,
                    product,
                    name: name.into(),
                    quantity,
                    unit_price,
                    total: unit_price.checked_mul(quantity)?,
                };
                let id = item.id.clone();
                self.items.push(item);
                id
            }
        };

        self.recalculate()?;
        Ok(id)
    }

    /// Recompute the cart total from its lines.
    pub fn recalculate(&mut self) -> Result<(), CommerceError> {
        self.total = Money::sum(self.items.iter().map(|i| &i.total), self.currency)?;
        Ok(())
    }

    /// Total number of units.
    pub fn item_count(&self) -> i64 {
        self.items.iter().map(|i| i.quantity).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn item_by_sku(&self, sku: &str) -> Option<&CartItem> {
        self.items.iter().find(|i| i.sku == sku)
    }
}
