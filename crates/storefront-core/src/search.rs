//! # Search Model
//!
//! Pure parts of the search pipeline: filters, sort options, the request a
//! filter set turns into, and the recent-query history.
//!
//! ## From Input to Request
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  query "  shoes " ──► normalize_query ──► Some("shoes")                │
//! │                                                │                        │
//! │  SearchFilters { category, price, size, sort } │                        │
//! │        │                                       │                        │
//! │        ├── has_active_filters? ────────────────┤                        │
//! │        │                                       ▼                        │
//! │        │                        both empty? ──► Success([]) no request │
//! │        │                                       │                        │
//! │        │                                       ▼                        │
//! │        │                        SearchQuery { q, gender: category }    │
//! │        │                                       │                        │
//! │        │                                       ▼  GET api/search        │
//! │        └──── price bounds + sort ──► refine(results)                   │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The search endpoint only understands the query and the category, so price
//! bounds and ordering are applied to the returned page on the client.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::VecDeque;
use std::fmt;
use std::str::FromStr;

use crate::error::ValidationError;
use crate::money::Money;
use crate::types::Product;
use crate::SEARCH_HISTORY_LIMIT;

/// Message keys for the suggestion chips shown before anything is typed.
pub const POPULAR_QUERY_KEYS: [&str; 5] = [
    "search_popular_query_tshirts",
    "search_popular_query_dresses",
    "search_popular_query_outerwear",
    "search_popular_query_sneakers",
    "search_popular_query_accessories",
];

// =============================================================================
// Sort Option
// =============================================================================

/// Result ordering offered by the search screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOption {
    /// Server order.
    #[default]
    Relevance,
    PriceLowToHigh,
    PriceHighToLow,
    Newest,
    Name,
}

impl SortOption {
    pub const ALL: [SortOption; 5] = [
        SortOption::Relevance,
        SortOption::PriceLowToHigh,
        SortOption::PriceHighToLow,
        SortOption::Newest,
        SortOption::Name,
    ];

    /// Backend `sortBy` value.
    pub fn sort_by(&self) -> Option<&'static str> {
        match self {
            SortOption::Relevance => None,
            SortOption::PriceLowToHigh | SortOption::PriceHighToLow => Some("price"),
            SortOption::Newest => Some("created_at"),
            SortOption::Name => Some("name"),
        }
    }

    /// Backend `sortOrder` value.
    pub fn sort_order(&self) -> Option<&'static str> {
        match self {
            SortOption::Relevance => None,
            SortOption::PriceLowToHigh | SortOption::Name => Some("asc"),
            SortOption::PriceHighToLow | SortOption::Newest => Some("desc"),
        }
    }

    /// Orders a result page in place. `Relevance` and `Newest` keep server
    /// order (products carry no creation timestamp).
    pub fn apply(&self, products: &mut [Product]) {
        match self {
            SortOption::Relevance | SortOption::Newest => {}
            SortOption::PriceLowToHigh => products.sort_by_key(|p| p.price),
            SortOption::PriceHighToLow => products.sort_by_key(|p| std::cmp::Reverse(p.price)),
            SortOption::Name => products.sort_by(|a, b| compare_names(&a.name, &b.name)),
        }
    }
}

fn compare_names(a: &str, b: &str) -> Ordering {
    a.to_lowercase().cmp(&b.to_lowercase())
}

impl fmt::Display for SortOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortOption::Relevance => write!(f, "relevance"),
            SortOption::PriceLowToHigh => write!(f, "price_asc"),
            SortOption::PriceHighToLow => write!(f, "price_desc"),
            SortOption::Newest => write!(f, "newest"),
            SortOption::Name => write!(f, "name"),
        }
    }
}

impl FromStr for SortOption {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "relevance" | "default" => Ok(SortOption::Relevance),
            "price_asc" | "price-low-high" | "cheap" => Ok(SortOption::PriceLowToHigh),
            "price_desc" | "price-high-low" | "expensive" => Ok(SortOption::PriceHighToLow),
            "newest" | "new" => Ok(SortOption::Newest),
            "name" => Ok(SortOption::Name),
            _ => Err(ValidationError::NotAllowed {
                field: "sort".to_string(),
                allowed: SortOption::ALL.iter().map(|o| o.to_string()).collect(),
            }),
        }
    }
}

// =============================================================================
// Search Filters
// =============================================================================

/// Filter set applied to a search. Replaced as a whole on every change.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchFilters {
    pub category_id: Option<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub size: Option<String>,
    pub sort_option: SortOption,
}

impl SearchFilters {
    /// True when any narrowing filter is set. Sort order does not count.
    pub fn has_active_filters(&self) -> bool {
        self.category_id.is_some()
            || self.min_price.is_some()
            || self.max_price.is_some()
            || self.size.is_some()
    }

    pub fn with_category(&self, category_id: Option<String>) -> Self {
        SearchFilters {
            category_id,
            ..self.clone()
        }
    }

    pub fn with_price_range(&self, min_price: Option<f64>, max_price: Option<f64>) -> Self {
        SearchFilters {
            min_price,
            max_price,
            ..self.clone()
        }
    }

    pub fn with_size(&self, size: Option<String>) -> Self {
        SearchFilters {
            size,
            ..self.clone()
        }
    }

    pub fn with_sort(&self, sort_option: SortOption) -> Self {
        SearchFilters {
            sort_option,
            ..self.clone()
        }
    }

    /// Keeps the products inside the price bounds, then orders them.
    pub fn refine(&self, mut products: Vec<Product>) -> Vec<Product> {
        let min = self.min_price.map(Money::from_major);
        let max = self.max_price.map(Money::from_major);
        products.retain(|p| {
            min.map_or(true, |lo| p.price >= lo) && max.map_or(true, |hi| p.price <= hi)
        });
        self.sort_option.apply(&mut products);
        products
    }
}

/// Trims a typed query. Blank input means "no query".
pub fn normalize_query(query: &str) -> Option<String> {
    let trimmed = query.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

// =============================================================================
// Search Request
// =============================================================================

/// Query parameters of `GET api/search`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchQuery {
    pub q: Option<String>,
    pub gender: Option<String>,
    pub category_id: Option<String>,
}

impl SearchQuery {
    /// Builds the request for the given input, or `None` when there is
    /// nothing to search for.
    pub fn from_input(query: &str, filters: &SearchFilters) -> Option<Self> {
        let q = normalize_query(query);
        if q.is_none() && !filters.has_active_filters() {
            return None;
        }
        Some(SearchQuery {
            q,
            gender: filters.category_id.clone(),
            category_id: None,
        })
    }

    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(v) = &self.q {
            pairs.push(("q", v.clone()));
        }
        if let Some(v) = &self.gender {
            pairs.push(("gender", v.clone()));
        }
        if let Some(v) = &self.category_id {
            pairs.push(("categoryId", v.clone()));
        }
        pairs
    }
}

// =============================================================================
// Search History
// =============================================================================

/// Recently searched queries, most recent first.
///
/// Holds at most [`SEARCH_HISTORY_LIMIT`] entries. Entries differing only in
/// case count as the same query; the latest spelling wins.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchHistory {
    entries: VecDeque<String>,
}

impl SearchHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a successful query.
    pub fn record(&mut self, query: &str) {
        let query = query.trim();
        if query.is_empty() {
            return;
        }
        let lowered = query.to_lowercase();
        self.entries.retain(|e| e.to_lowercase() != lowered);
        self.entries.push_front(query.to_string());
        self.entries.truncate(SEARCH_HISTORY_LIMIT);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn entries(&self) -> Vec<String> {
        self.entries.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
