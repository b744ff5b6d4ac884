//! Product shapes.

use serde::{Deserialize, Serialize};

use crate::ids::{ProductId, VariantId};

/// `product.byId` input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductQueryById {
    pub id: ProductId,
}

/// `product.bySlug` input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductQueryBySlug {
    pub slug: String,
}

/// A purchasable variant of a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductVariant {
    pub id: VariantId,
    /// Stock keeping unit, the key for pricing and cart lines.
    pub sku: String,
    /// Variant label (e.g., "Large / Blue").
    pub name: String,
}

/// Canonical product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    /// URL-friendly handle, unique within a catalog.
    pub slug: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// At least one variant; the first is the default.
    pub variants: Vec<ProductVariant>,
}

impl Product {
    pub fn default_variant(&self) -> Option<&ProductVariant> {
        self.variants.first()
    }

    pub fn variant_by_sku(&self, sku: &str) -> Option<&ProductVariant> {
        self.variants.iter().find(|v| v.sku == sku)
    }
}

/// Whether `slug` is lowercase ASCII words joined by single hyphens.
pub fn is_valid_slug(slug: &str) -> bool {
    !slug.is_empty()
        && !slug.starts_with('-')
        && !slug.ends_with('-')
        && !slug.contains("--")
        && slug
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slug_rules() {
        assert!(is_valid_slug("rust-book-2"));
        assert!(!is_valid_slug(""));
        assert!(!is_valid_slug("Rust-Book"));
        assert!(!is_valid_slug("-book"));
        assert!(!is_valid_slug("rust--book"));
    }

    #[test]
    fn test_variant_lookup() {
        let product = Product {
            id: "p-1".into(),
            slug: "tee".into(),
            name: "Tee".into(),
            description: String::new(),
            image: None,
            variants: vec![
                ProductVariant { id: "v-1".into(), sku: "TEE-S".into(), name: "S".into() },
                ProductVariant { id: "v-2".into(), sku: "TEE-M".into(), name: "M".into() },
            ],
        };
        assert_eq!(product.default_variant().unwrap().sku, "TEE-S");
        assert_eq!(product.variant_by_sku("TEE-M").unwrap().id.as_str(), "v-2");
        assert!(product.variant_by_sku("TEE-XL").is_none());
    }
}
