//! Deterministic generated catalog.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use turbo_commerce::{Currency, Money};

use crate::config::FakeConfig;

const ADJECTIVES: [&str; 10] = [
    "Classic", "Organic", "Vintage", "Urban", "Nordic", "Alpine", "Coastal", "Midnight", "Golden", "Rustic",
];

const NOUNS: [&str; 10] = [
    "Tee", "Hoodie", "Sneaker", "Backpack", "Mug", "Lamp", "Notebook", "Scarf", "Jacket", "Watch",
];

const SIZES: [&str; 3] = ["S", "M", "L"];

/// Backend product record, before mapping to the canonical shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductRecord {
    pub pid: String,
    pub handle: String,
    pub title: String,
    pub blurb: String,
    pub image_url: String,
    pub skus: Vec<SkuRecord>,
    pub usd_cents: i64,
    #[serde(default)]
    pub list_usd_cents: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkuRecord {
    pub code: String,
    pub label: String,
}

impl ProductRecord {
    /// Copy with the blurb written for `locale`.
    pub fn localized(&self, locale: &str) -> Self {
        let blurb = match locale.split(['-', '_']).next().unwrap_or_default() {
            "de" => format!("Ein hochwertiges Produkt: {}.", self.title),
            "fr" => format!("Un produit de qualité : {}.", self.title),
            _ => format!("A quality product: {}.", self.title),
        };
        Self {
            blurb,
            ..self.clone()
        }
    }
}

/// Minor units of `currency` per thousand US cents.
fn rate_per_mille(currency: Currency) -> i64 {
    match currency {
        Currency::USD => 1000,
        Currency::EUR => 920,
        Currency::GBP => 790,
        Currency::JPY => 1500,
        Currency::CAD => 1360,
        Currency::AUD => 1520,
        Currency::CHF => 880,
        Currency::SEK => 10500,
    }
}

/// Convert a US cent amount into `currency`.
pub fn convert(usd_cents: i64, currency: Currency) -> Money {
    Money::new(usd_cents * rate_per_mille(currency) / 1000, currency)
}

/// Every generated product, indexed by id, handle and SKU.
#[derive(Debug, Clone)]
pub struct Catalog {
    products: Vec<ProductRecord>,
    by_id: HashMap<String, usize>,
    by_handle: HashMap<String, usize>,
    by_sku: HashMap<String, (usize, usize)>,
}

impl Catalog {
    /// Generate `config.catalog_size` products. Same config, same catalog.
    pub fn generate(config: &FakeConfig) -> Self {
        let prefix = &config.seed_prefix;
        let products: Vec<ProductRecord> = (1..=config.catalog_size)
            .map(|n| {
                let adjective = ADJECTIVES[n % ADJECTIVES.len()];
                let noun = NOUNS[(n / ADJECTIVES.len()) % NOUNS.len()];
                let title = format!("{} {}", adjective, noun);
                let base = 500 + (n as i64 * 7919) % 20_000;
                let usd_cents = base - base % 100 + 99;

                ProductRecord {
                    pid: format!("{}-{}", prefix, n),
                    handle: format!("{}-{}-{}", adjective.to_lowercase(), noun.to_lowercase(), n),
                    blurb: String::new(),
                    image_url: format!("https://images.example.com/{}/{}.jpg", prefix, n),
                    skus: SIZES
                        .iter()
                        .map(|size| SkuRecord {
                            code: format!("{}-{}-{}", prefix.to_uppercase(), n, size),
                            label: (*size).to_string(),
                        })
                        .collect(),
                    usd_cents,
                    list_usd_cents: (n % 5 == 0).then(|| usd_cents + usd_cents / 4),
                    title,
                }
            })
            .collect();

        let mut by_id = HashMap::with_capacity(products.len());
        let mut by_handle = HashMap::with_capacity(products.len());
        let mut by_sku = HashMap::with_capacity(products.len() * SIZES.len());
        for (index, product) in products.iter().enumerate() {
            by_id.insert(product.pid.clone(), index);
            by_handle.insert(product.handle.clone(), index);
            for (sku_index, sku) in product.skus.iter().enumerate() {
                by_sku.insert(sku.code.clone(), (index, sku_index));
            }
        }

        Self {
            products,
            by_id,
            by_handle,
            by_sku,
        }
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    pub fn by_id(&self, id: &str) -> Option<&ProductRecord> {
        self.by_id.get(id).map(|&i| &self.products[i])
    }

    pub fn by_handle(&self, handle: &str) -> Option<&ProductRecord> {
        self.by_handle.get(handle).map(|&i| &self.products[i])
    }

    /// The product and SKU record for a SKU code.
    pub fn by_sku(&self, code: &str) -> Option<(&ProductRecord, &SkuRecord)> {
        self.by_sku.get(code).map(|&(p, s)| {
            let product = &self.products[p];
            (product, &product.skus[s])
        })
    }

    /// Products whose title or handle contains every word of `term`.
    pub fn search(&self, term: &str) -> Vec<&ProductRecord> {
        let words: Vec<String> = term.split_whitespace().map(|w| w.to_lowercase()).collect();
        self.products
            .iter()
            .filter(|p| {
                let title = p.title.to_lowercase();
                words.iter().all(|w| title.contains(w.as_str()) || p.handle.contains(w.as_str()))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generation_is_deterministic() {
        let config = FakeConfig::default().with_catalog_size(50);
        let a = Catalog::generate(&config);
        let b = Catalog::generate(&config);

        assert_eq!(a.len(), 50);
        assert_eq!(a.by_id("fake-7"), b.by_id("fake-7"));
        assert!(a.by_id("fake-51").is_none());
    }

    #[test]
    fn test_indexes_agree() {
        let catalog = Catalog::generate(&FakeConfig::default());
        let product = catalog.by_id("fake-3").unwrap();

        assert_eq!(catalog.by_handle(&product.handle).unwrap().pid, "fake-3");
        let (owner, sku) = catalog.by_sku("FAKE-3-M").unwrap();
        assert_eq!(owner.pid, "fake-3");
        assert_eq!(sku.label, "M");
        assert!(product.usd_cents % 100 == 99);
    }

    #[test]
    fn test_search_matches_all_words() {
        let catalog = Catalog::generate(&FakeConfig::default().with_catalog_size(100));
        let hits = catalog.search("Classic tee");
        assert!(!hits.is_empty());
        assert!(hits.iter().all(|p| p.title == "Classic Tee"));
        assert!(catalog.search("nonexistent").is_empty());
    }

    #[test]
    fn test_localized_blurb() {
        let catalog = Catalog::generate(&FakeConfig::default());
        let product = catalog.by_id("fake-1").unwrap();
        assert!(product.localized("de-DE").blurb.starts_with("Ein"));
        assert!(product.localized("en-US").blurb.starts_with("A quality"));
    }

    #[test]
    fn test_convert() {
        assert_eq!(convert(1000, Currency::USD), Money::new(1000, Currency::USD));
        assert_eq!(convert(1000, Currency::EUR), Money::new(920, Currency::EUR));
        assert_eq!(convert(1000, Currency::JPY), Money::new(1500, Currency::JPY));
    }
}
