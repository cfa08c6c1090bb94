//! # Catalog Service
//!
//! Read-only catalog screens: categories, a category's product list, the
//! home feed and "you may also like".
//!
//! ## Home Feed
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  new arrivals      sortBy=newest, limit 12      error ──► whole Error  │
//! │  recommendations   POST recs/personal           only with onboarding  │
//! │                                                 error ──► empty       │
//! │  popular           sortBy=bestseller, limit 12  only if recs empty    │
//! │                                                 error ──► empty       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;

use tracing::{debug, warn};

use crate::api::StorefrontApi;
use storefront_core::{
    Category, LoadState, OnboardingPreferences, Product, ProductQuery, HOME_SECTION_LIMIT,
};

/// Products of one category plus the chips to switch between siblings.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductListView {
    /// The parent category followed by its children.
    pub chips: Vec<Category>,
    pub products: LoadState<Vec<Product>>,
}

/// The sections of the home screen.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HomeSections {
    pub new_arrivals: Vec<Product>,
    pub recommended: Vec<Product>,
    pub popular: Vec<Product>,
}

pub struct CatalogService {
    api: Arc<dyn StorefrontApi>,
}

impl CatalogService {
    pub fn new(api: Arc<dyn StorefrontApi>) -> Self {
        CatalogService { api }
    }

    pub async fn categories(&self) -> LoadState<Vec<Category>> {
        self.api
            .categories()
            .await
            .map_err(|e| {
                warn!(error = %e, "Category fetch failed");
                e
            })
            .into()
    }

    /// Loads a category screen.
    ///
    /// Chips fall back to an empty list when categories cannot be loaded;
    /// only the product fetch decides the screen state.
    pub async fn product_list(&self, category_id: &str) -> ProductListView {
        let chips = match self.api.categories().await {
            Ok(categories) => filter_chips(&categories, category_id),
            Err(e) => {
                warn!(error = %e, "Filter chips unavailable");
                Vec::new()
            }
        };

        let products = self
            .api
            .products(&ProductQuery::in_category(category_id))
            .await
            .map_err(|e| {
                warn!(category_id, error = %e, "Product list fetch failed");
                e
            })
            .into();

        ProductListView { chips, products }
    }

    /// Loads the home feed. `onboarding` is the completed questionnaire, if
    /// any.
    pub async fn home_sections(
        &self,
        onboarding: Option<&OnboardingPreferences>,
    ) -> LoadState<HomeSections> {
        let new_arrivals = match self
            .api
            .products(&ProductQuery::top("newest", HOME_SECTION_LIMIT))
            .await
        {
            Ok(products) => products,
            Err(e) => {
                warn!(error = %e, "New arrivals fetch failed");
                return LoadState::Error(e.to_string());
            }
        };

        let recommended = match onboarding {
            Some(prefs) => match self
                .api
                .personal_recommendations(&prefs.recommendations_request(), Some(HOME_SECTION_LIMIT))
                .await
            {
                Ok(items) => items.into_iter().map(|i| i.product).collect(),
                Err(e) => {
                    warn!(error = %e, "Personal recommendations unavailable");
                    Vec::new()
                }
            },
            None => Vec::new(),
        };

        let popular = if recommended.is_empty() {
            self.api
                .products(&ProductQuery::top("bestseller", HOME_SECTION_LIMIT))
                .await
                .unwrap_or_else(|e| {
                    warn!(error = %e, "Popular products unavailable");
                    Vec::new()
                })
        } else {
            Vec::new()
        };

        debug!(
            new_arrivals = new_arrivals.len(),
            recommended = recommended.len(),
            popular = popular.len(),
            "Home feed loaded"
        );

        LoadState::Success(HomeSections {
            new_arrivals,
            recommended,
            popular,
        })
    }

    /// Products similar to `product_id`. A blank id yields nothing without
    /// a request.
    pub async fn similar_products(&self, product_id: &str) -> LoadState<Vec<Product>> {
        if product_id.trim().is_empty() {
            return LoadState::Success(Vec::new());
        }

        match self
            .api
            .similar_products(product_id, Some(HOME_SECTION_LIMIT))
            .await
        {
            Ok(items) => LoadState::Success(items.into_iter().map(|i| i.product).collect()),
            Err(e) => {
                warn!(product_id, error = %e, "Similar products fetch failed");
                LoadState::Error(e.to_string())
            }
        }
    }
}

/// The selected category's parent (or the category itself when top-level),
/// followed by that parent's children.
pub fn filter_chips(categories: &[Category], category_id: &str) -> Vec<Category> {
    let parent_id = categories
        .iter()
        .find(|c| c.id == category_id)
        .and_then(|c| c.parent_id.as_deref())
        .unwrap_or(category_id);

    categories
        .iter()
        .find(|c| c.id == parent_id)
        .into_iter()
        .chain(
            categories
                .iter()
                .filter(|c| c.parent_id.as_deref() == Some(parent_id)),
        )
        .cloned()
        .collect()
}
