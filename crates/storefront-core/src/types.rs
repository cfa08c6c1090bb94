//! # Domain Types
//!
//! Types exchanged with the shop REST API.
//!
//! ## Field Naming
//! The backend is not consistent: product fields are snake_case
//! (`category_id`, `image_path`) while request bodies use camelCase
//! (`productId`). Every rename is spelled out per field so the structs
//! read the same as the JSON they map to.
//!
//! ## Type Relationships
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   Category ◄──── parent_id ──── Category                               │
//! │      ▲                                                                  │
//! │      │ category_id                                                      │
//! │   Product ──────────────► CartLine (product snapshot + quantity)       │
//! │      │                        │                                         │
//! │      │                        ▼                                         │
//! │      │                  PlaceOrderRequest ──► OrderResponse             │
//! │      ▼                                                                  │
//! │   RecommendationItem { product, score }                                 │
//! │                                                                         │
//! │   Credentials ──► AuthResponse { token } ──► AuthToken ──► Profile      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::money::{self, Money};

// =============================================================================
// Catalog
// =============================================================================

/// A product as listed by the catalog, search and recommendation endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: String,

    #[serde(default)]
    pub article: String,

    #[serde(default)]
    pub category_id: String,

    pub name: String,

    #[serde(default)]
    pub description: String,

    /// Path relative to the images base URL.
    #[serde(default)]
    pub image_path: String,

    /// Unit price in the shop's base currency.
    #[serde(with = "money::major_units")]
    pub price: Money,

    /// Server-formatted price, shown when no local conversion applies.
    #[serde(default)]
    pub price_string: String,

    #[serde(default)]
    pub is_bestseller: bool,
}

/// A catalog category. Top-level categories have no parent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: String,

    pub name: String,

    #[serde(default)]
    pub image_path: String,

    #[serde(default)]
    pub parent_id: Option<String>,
}

impl Category {
    pub fn is_top_level(&self) -> bool {
        self.parent_id.is_none()
    }
}

/// One entry returned by the recommendation endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationItem {
    pub product: Product,

    #[serde(default)]
    pub score: Option<f64>,
}

/// Body of `POST recs/personal`, built from onboarding choices.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PersonalRecommendationsRequest {
    #[serde(default)]
    pub categories: Vec<String>,

    #[serde(default)]
    pub brands: Vec<String>,

    /// `[min, max]` in major units.
    #[serde(rename = "priceRange", default, skip_serializing_if = "Option::is_none")]
    pub price_range: Option<[f64; 2]>,
}

/// Query parameters of `GET api/products`. Unset fields are omitted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductQuery {
    pub gender: Option<String>,
    pub category_id: Option<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
    pub limit: Option<u32>,
    pub page: Option<u32>,
}

impl ProductQuery {
    /// Products filed under a category (sent as `gender`, which is how the
    /// backend keys its top-level departments).
    pub fn in_category(category_id: impl Into<String>) -> Self {
        ProductQuery {
            gender: Some(category_id.into()),
            ..Default::default()
        }
    }

    /// The first `limit` products ordered by `sort_by`.
    pub fn top(sort_by: impl Into<String>, limit: u32) -> Self {
        ProductQuery {
            sort_by: Some(sort_by.into()),
            limit: Some(limit),
            ..Default::default()
        }
    }

    /// Flattens the set fields into `(name, value)` query pairs.
    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(v) = &self.gender {
            pairs.push(("gender", v.clone()));
        }
        if let Some(v) = &self.category_id {
            pairs.push(("categoryId", v.clone()));
        }
        if let Some(v) = self.min_price {
            pairs.push(("minPrice", v.to_string()));
        }
        if let Some(v) = self.max_price {
            pairs.push(("maxPrice", v.to_string()));
        }
        if let Some(v) = &self.sort_by {
            pairs.push(("sortBy", v.clone()));
        }
        if let Some(v) = &self.sort_order {
            pairs.push(("sortOrder", v.clone()));
        }
        if let Some(v) = self.limit {
            pairs.push(("limit", v.to_string()));
        }
        if let Some(v) = self.page {
            pairs.push(("page", v.to_string()));
        }
        pairs
    }
}

// =============================================================================
// Authentication
// =============================================================================

/// Session token issued by `api/login`.
///
/// Wrapped in a secret so it never shows up in `Debug` output or logs.
#[derive(Clone)]
pub struct AuthToken(SecretString);

impl AuthToken {
    pub fn new(token: impl Into<String>) -> Self {
        AuthToken(SecretString::from(token.into()))
    }

    /// Raw token value, for the `x-auth-token` header and the store.
    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }
}

impl fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AuthToken([REDACTED])")
    }
}

/// Login and registration form input.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub email: String,
    pub password: SecretString,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Credentials {
            email: email.into(),
            password: SecretString::from(password.into()),
        }
    }
}

/// Body returned by `api/login`.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthResponse {
    pub token: String,
}

impl AuthResponse {
    pub fn into_token(self) -> AuthToken {
        AuthToken::new(self.token)
    }
}

impl fmt::Debug for AuthResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthResponse")
            .field("token", &"[REDACTED]")
            .finish()
    }
}

/// The logged-in user's profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub id: i64,

    pub email: String,

    #[serde(default)]
    pub created_at: String,
}

/// Body of `PUT api/profile`. Unset fields are left unchanged.
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub email: Option<String>,
    pub password: Option<SecretString>,
}

impl ProfileUpdate {
    pub fn is_empty(&self) -> bool {
        self.email.is_none() && self.password.is_none()
    }
}

// =============================================================================
// Cart & Orders (wire)
// =============================================================================

/// One line of `GET api/cart`: the product fields flattened next to the
/// quantity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteCartLine {
    #[serde(flatten)]
    pub product: Product,

    pub quantity: u32,
}

/// Body of `POST api/cart`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddToCartRequest {
    #[serde(rename = "productId")]
    pub product_id: String,

    pub quantity: u32,
}

/// Body of `PUT api/cart/item/{id}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateCartRequest {
    pub quantity: u32,
}

/// One product line of an order request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItemRequest {
    #[serde(rename = "productId")]
    pub product_id: String,

    pub quantity: u32,
}

/// Body of `POST api/orders`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaceOrderRequest {
    pub items: Vec<OrderItemRequest>,
}

/// One line of a placed order, priced by the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItemResponse {
    pub product_id: String,

    pub quantity: u32,

    #[serde(with = "money::major_units")]
    pub unit_price: Money,

    #[serde(with = "money::major_units")]
    pub line_total: Money,
}

/// Order confirmation returned by `POST api/orders`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderResponse {
    pub id: i64,

    #[serde(with = "money::major_units")]
    pub total_amount: Money,

    #[serde(default)]
    pub created_at: String,

    #[serde(default)]
    pub items: Vec<OrderItemResponse>,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_product_from_api_json() {
        let json = r#"{
            "id": "p-1",
            "article": "A-100",
            "category_id": "women",
            "name": "Linen dress",
            "description": "Summer dress",
            "image_path": "images/dress.jpg",
            "price": 1299.5,
            "price_string": "1 299,50 ₴",
            "is_bestseller": true
        }"#;

        let product: Product = serde_json::from_str(json).unwrap();
        assert_eq!(product.price.cents(), 129950);
        assert_eq!(product.category_id, "women");
        assert!(product.is_bestseller);
    }

    #[test]
    fn test_cart_line_is_flattened_product() {
        let json = r#"{"id": "p-2", "name": "Socks", "price": 50, "quantity": 3}"#;
        let line: RemoteCartLine = serde_json::from_str(json).unwrap();
        assert_eq!(line.product.id, "p-2");
        assert_eq!(line.product.price.cents(), 5000);
        assert_eq!(line.quantity, 3);
    }

    #[test]
    fn test_request_bodies_use_camel_case_ids() {
        let body = serde_json::to_value(AddToCartRequest {
            product_id: "p-1".into(),
            quantity: 2,
        })
        .unwrap();
        assert_eq!(body, serde_json::json!({"productId": "p-1", "quantity": 2}));

        let recs = serde_json::to_value(PersonalRecommendationsRequest {
            categories: vec!["women".into()],
            brands: vec![],
            price_range: Some([0.0, 500.0]),
        })
        .unwrap();
        assert_eq!(recs["priceRange"], serde_json::json!([0.0, 500.0]));
    }

    #[test]
    fn test_product_query_omits_unset_params() {
        let pairs = ProductQuery::top("newest", 12).to_pairs();
        assert_eq!(
            pairs,
            vec![("sortBy", "newest".to_string()), ("limit", "12".to_string())]
        );
        assert_eq!(
            ProductQuery::in_category("men").to_pairs(),
            vec![("gender", "men".to_string())]
        );
    }

    #[test]
    fn test_token_is_redacted_in_debug() {
        let token = AuthToken::new("secret-token");
        assert_eq!(token.expose(), "secret-token");
        assert!(!format!("{:?}", token).contains("secret-token"));

        let response = AuthResponse {
            token: "secret-token".into(),
        };
        assert!(!format!("{:?}", response).contains("secret-token"));
    }
}
