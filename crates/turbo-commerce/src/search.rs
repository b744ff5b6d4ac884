//! Search queries and paginated results.

use serde::{Deserialize, Serialize};

use crate::ids::ProductId;

/// Largest page a search may request.
pub const MAX_PAGE_SIZE: u32 = 100;

fn default_page() -> u32 {
    1
}

fn default_page_size() -> u32 {
    20
}

/// `search.byTerm` input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchQueryByTerm {
    pub term: String,
    /// Current page (1-indexed).
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_page_size")]
    pub page_size: u32,
}

impl SearchQueryByTerm {
    pub fn new(term: impl Into<String>) -> Self {
        Self {
            term: term.into(),
            page: default_page(),
            page_size: default_page_size(),
        }
    }

    pub fn with_page(mut self, page: u32, page_size: u32) -> Self {
        self.page = page;
        self.page_size = page_size;
        self
    }

    /// Index of the first hit on the requested page.
    pub fn offset(&self) -> usize {
        (self.page.saturating_sub(1) as usize) * self.page_size as usize
    }
}

/// One search hit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchHit {
    pub product: ProductId,
    pub slug: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

/// One page of search hits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    pub items: Vec<SearchHit>,
    /// Total number of hits across all pages.
    pub total: u64,
    pub page: u32,
    pub page_size: u32,
    pub total_pages: u32,
}

impl SearchResult {
    /// Cut the page `query` asks for out of the full hit list.
    pub fn paginate(hits: Vec<SearchHit>, query: &SearchQueryByTerm) -> Self {
        let total = hits.len() as u64;
        let page_size = query.page_size.max(1);
        let total_pages = if total == 0 {
            1
        } else {
            ((total + page_size as u64 - 1) / page_size as u64) as u32
        };

        let items = hits
            .into_iter()
            .skip(query.offset())
            .take(page_size as usize)
            .collect();

        Self {
            items,
            total,
            page: query.page,
            page_size,
            total_pages,
        }
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hits(n: usize) -> Vec<SearchHit> {
        (0..n)
            .map(|i| SearchHit {
                product: ProductId::new(format!("p-{}", i)),
                slug: format!("item-{}", i),
                name: format!("Item {}", i),
                image: None,
            })
            .collect()
    }

    #[test]
    fn test_query_defaults() {
        let query: SearchQueryByTerm = serde_json::from_str(r#"{ "term": "shoe" }"#).unwrap();
        assert_eq!(query, SearchQueryByTerm::new("shoe"));
        assert_eq!(query.offset(), 0);
    }

    #[test]
    fn test_paginate_middle_and_last_page() {
        let second = SearchResult::paginate(hits(25), &SearchQueryByTerm::new("x").with_page(2, 10));
        assert_eq!(second.items.len(), 10);
        assert_eq!(second.items[0].slug, "item-10");
        assert_eq!(second.total, 25);
        assert_eq!(second.total_pages, 3);
        assert!(second.has_next());

        let last = SearchResult::paginate(hits(25), &SearchQueryByTerm::new("x").with_page(3, 10));
        assert_eq!(last.items.len(), 5);
        assert!(!last.has_next());
    }

    #[test]
    fn test_paginate_beyond_end_is_empty() {
        let result = SearchResult::paginate(hits(3), &SearchQueryByTerm::new("x").with_page(9, 10));
        assert!(result.is_empty());
        assert_eq!(result.total, 3);
    }

    #[test]
    fn test_paginate_no_hits() {
        let result = SearchResult::paginate(Vec::new(), &SearchQueryByTerm::new("x"));
        assert_eq!(result.total_pages, 1);
        assert!(result.is_empty());
    }
}
