//! Shared fixtures for the client integration tests.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use storefront_client::{ClientError, ClientResult, StorefrontApi};
use storefront_core::search::SearchQuery;
use storefront_core::{
    AddToCartRequest, AuthResponse, AuthToken, Category, Credentials, Money, OrderItemResponse,
    OrderResponse, PersonalRecommendationsRequest, PlaceOrderRequest, Product, ProductQuery,
    Profile, ProfileUpdate, RecommendationItem, RemoteCartLine,
};
use storefront_db::{Database, DbConfig};

pub const TOKEN: &str = "token-123";

pub fn product(id: &str, price: f64) -> Product {
    Product {
        id: id.to_string(),
        article: format!("ART-{}", id),
        category_id: "women".to_string(),
        name: format!("Product {}", id),
        description: String::new(),
        image_path: format!("images/{}.jpg", id),
        price: Money::from_major(price),
        price_string: format!("{}", price),
        is_bestseller: false,
    }
}

pub async fn memory_db() -> Database {
    Database::new(DbConfig::in_memory()).await.unwrap()
}

/// In-process backend that records every call.
///
/// The remote cart behaves like the real one so refetches see mutations.
#[derive(Default)]
pub struct FakeApi {
    pub catalog: Mutex<Vec<Product>>,
    pub categories: Mutex<Vec<Category>>,
    pub recommendations: Mutex<Vec<RecommendationItem>>,
    pub remote_cart: Mutex<Vec<RemoteCartLine>>,
    pub calls: Mutex<Vec<String>>,
    pub searches: Mutex<Vec<SearchQuery>>,
    pub product_queries: Mutex<Vec<ProductQuery>>,
    search_delays: Mutex<HashMap<String, Duration>>,
    failing: Mutex<HashSet<&'static str>>,
}

impl FakeApi {
    pub fn new() -> Arc<Self> {
        Arc::new(FakeApi::default())
    }

    pub fn with_catalog(products: Vec<Product>) -> Arc<Self> {
        let api = FakeApi::default();
        *api.catalog.lock().unwrap() = products;
        Arc::new(api)
    }

    pub fn fail(&self, call: &'static str) {
        self.failing.lock().unwrap().insert(call);
    }

    pub fn recover(&self, call: &'static str) {
        self.failing.lock().unwrap().remove(call);
    }

    /// Makes searches for `query` answer only after `delay`.
    pub fn delay_search(&self, query: &str, delay: Duration) {
        self.search_delays
            .lock()
            .unwrap()
            .insert(query.to_lowercase(), delay);
    }

    pub fn count(&self, call: &str) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| *c == call).count()
    }

    pub fn set_remote_cart(&self, lines: Vec<(Product, u32)>) {
        *self.remote_cart.lock().unwrap() = lines
            .into_iter()
            .map(|(product, quantity)| RemoteCartLine { product, quantity })
            .collect();
    }

    fn record(&self, call: &'static str) -> ClientResult<()> {
        self.calls.lock().unwrap().push(call.to_string());
        if self.failing.lock().unwrap().contains(call) {
            return Err(ClientError::Api {
                status: 500,
                message: format!("{} failed", call),
            });
        }
        Ok(())
    }

    fn authorize(&self, token: &AuthToken) -> ClientResult<()> {
        if token.expose() == TOKEN {
            Ok(())
        } else {
            Err(ClientError::Api {
                status: 401,
                message: "invalid token".into(),
            })
        }
    }

    fn find(&self, product_id: &str) -> ClientResult<Product> {
        self.catalog
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.id == product_id)
            .cloned()
            .ok_or_else(|| ClientError::Api {
                status: 404,
                message: "no such product".into(),
            })
    }
}

#[async_trait]
impl StorefrontApi for FakeApi {
    async fn products(&self, query: &ProductQuery) -> ClientResult<Vec<Product>> {
        self.record("products")?;
        self.product_queries.lock().unwrap().push(query.clone());
        Ok(self.catalog.lock().unwrap().clone())
    }

    async fn categories(&self) -> ClientResult<Vec<Category>> {
        self.record("categories")?;
        Ok(self.categories.lock().unwrap().clone())
    }

    async fn search(&self, query: &SearchQuery) -> ClientResult<Vec<Product>> {
        self.record("search")?;
        self.searches.lock().unwrap().push(query.clone());
        let needle = query.q.clone().unwrap_or_default().to_lowercase();
        let delay = self.search_delays.lock().unwrap().get(&needle).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        Ok(self
            .catalog
            .lock()
            .unwrap()
            .iter()
            .filter(|p| p.name.to_lowercase().contains(&needle))
            .cloned()
            .collect())
    }

    async fn similar_products(
        &self,
        _product_id: &str,
        _limit: Option<u32>,
    ) -> ClientResult<Vec<RecommendationItem>> {
        self.record("similar")?;
        Ok(self.recommendations.lock().unwrap().clone())
    }

    async fn personal_recommendations(
        &self,
        _request: &PersonalRecommendationsRequest,
        _limit: Option<u32>,
    ) -> ClientResult<Vec<RecommendationItem>> {
        self.record("personal")?;
        Ok(self.recommendations.lock().unwrap().clone())
    }

    async fn register(&self, _credentials: &Credentials) -> ClientResult<()> {
        self.record("register")
    }

    async fn login(&self, _credentials: &Credentials) -> ClientResult<AuthResponse> {
        self.record("login")?;
        Ok(AuthResponse {
            token: TOKEN.to_string(),
        })
    }

    async fn profile(&self, token: &AuthToken) -> ClientResult<Profile> {
        self.record("profile")?;
        self.authorize(token)?;
        Ok(Profile {
            id: 7,
            email: "shopper@example.com".into(),
            created_at: "2024-01-01T00:00:00Z".into(),
        })
    }

    async fn update_profile(
        &self,
        token: &AuthToken,
        update: &ProfileUpdate,
    ) -> ClientResult<Profile> {
        self.record("update_profile")?;
        self.authorize(token)?;
        Ok(Profile {
            id: 7,
            email: update
                .email
                .clone()
                .unwrap_or_else(|| "shopper@example.com".into()),
            created_at: "2024-01-01T00:00:00Z".into(),
        })
    }

    async fn cart(&self, token: &AuthToken) -> ClientResult<Vec<RemoteCartLine>> {
        self.record("cart")?;
        self.authorize(token)?;
        Ok(self.remote_cart.lock().unwrap().clone())
    }

    async fn add_to_cart(&self, token: &AuthToken, request: &AddToCartRequest) -> ClientResult<()> {
        self.record("add_to_cart")?;
        self.authorize(token)?;
        let product = self.find(&request.product_id)?;
        let mut cart = self.remote_cart.lock().unwrap();
        match cart.iter_mut().find(|l| l.product.id == request.product_id) {
            Some(line) => line.quantity += request.quantity,
            None => cart.push(RemoteCartLine {
                product,
                quantity: request.quantity,
            }),
        }
        Ok(())
    }

    async fn update_cart_item(
        &self,
        token: &AuthToken,
        product_id: &str,
        quantity: u32,
    ) -> ClientResult<()> {
        self.record("update_cart_item")?;
        self.authorize(token)?;
        if let Some(line) = self
            .remote_cart
            .lock()
            .unwrap()
            .iter_mut()
            .find(|l| l.product.id == product_id)
        {
            line.quantity = quantity;
        }
        Ok(())
    }

    async fn remove_cart_item(&self, token: &AuthToken, product_id: &str) -> ClientResult<()> {
        self.record("remove_cart_item")?;
        self.authorize(token)?;
        self.remote_cart
            .lock()
            .unwrap()
            .retain(|l| l.product.id != product_id);
        Ok(())
    }

    async fn place_order(
        &self,
        token: &AuthToken,
        request: &PlaceOrderRequest,
    ) -> ClientResult<OrderResponse> {
        self.record("place_order")?;
        self.authorize(token)?;
        let mut items = Vec::new();
        for item in &request.items {
            let product = self.find(&item.product_id)?;
            items.push(OrderItemResponse {
                product_id: item.product_id.clone(),
                quantity: item.quantity,
                unit_price: product.price,
                line_total: product.price * item.quantity,
            });
        }
        self.remote_cart.lock().unwrap().clear();
        Ok(OrderResponse {
            id: 1,
            total_amount: items.iter().map(|i| i.line_total).sum(),
            created_at: "2024-01-01T00:00:00Z".into(),
            items,
        })
    }
}
