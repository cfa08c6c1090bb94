//! # Storefront API Seam
//!
//! Every remote call the client makes goes through [`StorefrontApi`]. The
//! services hold an `Arc<dyn StorefrontApi>`, so tests swap in a fake and
//! the shell uses [`HttpApi`](crate::http::HttpApi).
//!
//! ## Endpoints
//! ```text
//! ┌────────────────────────┬──────────────────────────────┬───────────────┐
//! │ method                 │ route                        │ token         │
//! ├────────────────────────┼──────────────────────────────┼───────────────┤
//! │ products               │ GET    api/products          │               │
//! │ categories             │ GET    api/categories        │               │
//! │ search                 │ GET    api/search            │               │
//! │ similar_products       │ GET    recs/similar          │               │
//! │ personal_recommend...  │ POST   recs/personal         │               │
//! │ register / login       │ POST   api/register|login    │               │
//! │ profile                │ GET    api/profile           │ x-auth-token  │
//! │ update_profile         │ PUT    api/profile           │ x-auth-token  │
//! │ cart                   │ GET    api/cart              │ x-auth-token  │
//! │ add_to_cart            │ POST   api/cart              │ x-auth-token  │
//! │ update_cart_item       │ PUT    api/cart/item/{id}    │ x-auth-token  │
//! │ remove_cart_item       │ DELETE api/cart/item/{id}    │ x-auth-token  │
//! │ place_order            │ POST   api/orders            │ x-auth-token  │
//! └────────────────────────┴──────────────────────────────┴───────────────┘
//! ```

use async_trait::async_trait;

use crate::error::ClientResult;
use storefront_core::{
    AddToCartRequest, AuthResponse, AuthToken, Category, Credentials, OrderResponse,
    PersonalRecommendationsRequest, PlaceOrderRequest, Product, ProductQuery, Profile,
    ProfileUpdate, RecommendationItem, RemoteCartLine,
};
use storefront_core::search::SearchQuery;

/// Remote operations of the shop backend.
#[async_trait]
pub trait StorefrontApi: Send + Sync {
    // =========================================================================
    // Catalog
    // =========================================================================

    async fn products(&self, query: &ProductQuery) -> ClientResult<Vec<Product>>;

    async fn categories(&self) -> ClientResult<Vec<Category>>;

    async fn search(&self, query: &SearchQuery) -> ClientResult<Vec<Product>>;

    async fn similar_products(
        &self,
        product_id: &str,
        limit: Option<u32>,
    ) -> ClientResult<Vec<RecommendationItem>>;

    async fn personal_recommendations(
        &self,
        request: &PersonalRecommendationsRequest,
        limit: Option<u32>,
    ) -> ClientResult<Vec<RecommendationItem>>;

    // =========================================================================
    // Account
    // =========================================================================

    async fn register(&self, credentials: &Credentials) -> ClientResult<()>;

    async fn login(&self, credentials: &Credentials) -> ClientResult<AuthResponse>;

    async fn profile(&self, token: &AuthToken) -> ClientResult<Profile>;

    async fn update_profile(&self, token: &AuthToken, update: &ProfileUpdate)
        -> ClientResult<Profile>;

    // =========================================================================
    // Cart & Orders
    // =========================================================================

    async fn cart(&self, token: &AuthToken) -> ClientResult<Vec<RemoteCartLine>>;

    async fn add_to_cart(&self, token: &AuthToken, request: &AddToCartRequest) -> ClientResult<()>;

    /// Sets the absolute quantity of a line.
    async fn update_cart_item(
        &self,
        token: &AuthToken,
        product_id: &str,
        quantity: u32,
    ) -> ClientResult<()>;

    async fn remove_cart_item(&self, token: &AuthToken, product_id: &str) -> ClientResult<()>;

    async fn place_order(
        &self,
        token: &AuthToken,
        request: &PlaceOrderRequest,
    ) -> ClientResult<OrderResponse>;
}
