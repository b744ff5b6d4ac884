//! Canonical commerce shapes shared by TurboCommerce capability providers.
//!
//! Every provider speaks this vocabulary, so a client can mix groups from
//! different backends:
//!
//! - **Product**: lookups by id and slug
//! - **Search**: term search with pagination
//! - **Cart**: cart lookup and item add
//! - **Identity**: who the caller is
//! - **Price**: unit prices by SKU
//!
//! [`schemas`] holds the input and output contracts for each shape, and
//! [`capability`] / [`op`] the names they are registered under.
//! [`CommerceClient`] gives typed access to whichever groups a client exposes.
//!
//! # Example
//!
//! ```rust,ignore
//! use turbo_commerce::prelude::*;
//!
//! let mut cart = Cart::new(CartId::generate(), Currency::USD);
//! cart.add_item("TEE-M", ProductId::new("p-1"), "Tee", 2, Money::new(1500, Currency::USD))?;
//! println!("Total: {}", cart.total);
//! ```

pub mod cart;
mod client;
pub mod error;
pub mod identity;
pub mod ids;
pub mod money;
mod names;
pub mod price;
pub mod product;
pub mod schemas;
pub mod search;

pub use cart::{Cart, CartItem};
pub use client::{Call, CartOps, CommerceClient, IdentityOps, PriceOps, ProductOps, SearchOps};
pub use error::CommerceError;
pub use ids::*;
pub use money::{Currency, Money};
pub use names::{capability, op};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::client::CommerceClient;
    pub use crate::error::CommerceError;
    pub use crate::ids::*;
    pub use crate::money::{Currency, Money};
    pub use crate::names::{capability, op};

    pub use crate::cart::{Cart, CartItem, CartMutationItemAdd, CartQueryById};
    pub use crate::identity::{Identity, IdentityQuerySelf};
    pub use crate::price::{Price, PriceQueryBySku};
    pub use crate::product::{Product, ProductQueryById, ProductQueryBySlug, ProductVariant};
    pub use crate::search::{SearchHit, SearchQueryByTerm, SearchResult};
}
