//! Capability group and operation names.

/// Capability group names.
pub mod capability {
    pub const PRODUCT: &str = "product";
    pub const SEARCH: &str = "search";
    pub const CART: &str = "cart";
    pub const IDENTITY: &str = "identity";
    pub const PRICE: &str = "price";

    pub const ALL: [&str; 5] = [PRODUCT, SEARCH, CART, IDENTITY, PRICE];
}

/// Operation names within a group.
pub mod op {
    pub const BY_ID: &str = "byId";
    pub const BY_SLUG: &str = "bySlug";
    pub const BY_TERM: &str = "byTerm";
    pub const GET_BY_ID: &str = "getById";
    pub const ADD: &str = "add";
    pub const GET_SELF: &str = "getSelf";
    pub const GET_BY_SKU: &str = "getBySku";
}
