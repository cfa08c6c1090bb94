//! # HTTP Transport
//!
//! [`HttpApi`] implements [`StorefrontApi`] over `reqwest`.
//!
//! ## Request Shape
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  base_url.join("api/cart")  ──► ?query pairs (unset ones omitted)       │
//! │                                                                         │
//! │  Accept-Language: <tag>      when a language is selected               │
//! │  x-auth-token:    <token>    on authenticated calls                    │
//! │                                                                         │
//! │  2xx      ──► JSON body decoded (or ignored for unit responses)        │
//! │  non-2xx  ──► ClientError::Api { status, message: body text }          │
//! │  no reply ──► ClientError::Http                                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! No timeout or retry is configured; requests behave as reqwest defaults.

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response};
use secrecy::ExposeSecret;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::watch;
use tracing::{debug, warn};
use url::Url;

use crate::api::StorefrontApi;
use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};
use storefront_core::search::SearchQuery;
use storefront_core::{
    AddToCartRequest, AuthResponse, AuthToken, Category, Credentials, LanguageTag, OrderResponse,
    PersonalRecommendationsRequest, PlaceOrderRequest, Product, ProductQuery, Profile,
    ProfileUpdate, RecommendationItem, RemoteCartLine, UpdateCartRequest,
};

const AUTH_HEADER: &str = "x-auth-token";

// =============================================================================
// Wire bodies that carry secrets
// =============================================================================

#[derive(Serialize)]
struct AuthBody<'a> {
    email: &'a str,
    password: &'a str,
}

impl<'a> AuthBody<'a> {
    fn from_credentials(credentials: &'a Credentials) -> Self {
        AuthBody {
            email: &credentials.email,
            password: credentials.password.expose_secret(),
        }
    }
}

#[derive(Serialize)]
struct ProfileUpdateBody<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    email: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    password: Option<&'a str>,
}

impl<'a> ProfileUpdateBody<'a> {
    fn from_update(update: &'a ProfileUpdate) -> Self {
        ProfileUpdateBody {
            email: update.email.as_deref(),
            password: update.password.as_ref().map(|p| p.expose_secret()),
        }
    }
}

// =============================================================================
// HttpApi
// =============================================================================

/// REST client for the shop backend.
#[derive(Clone)]
pub struct HttpApi {
    client: Client,
    base_url: Url,
    language: watch::Receiver<Option<LanguageTag>>,
}

impl HttpApi {
    /// Creates a client rooted at `base_url`.
    ///
    /// `language` is read on every request, so a settings change applies
    /// to the next call without rebuilding the client.
    pub fn new(base_url: Url, language: watch::Receiver<Option<LanguageTag>>) -> ClientResult<Self> {
        let client = Client::builder().build()?;
        Ok(HttpApi {
            client,
            base_url,
            language,
        })
    }

    pub fn from_config(
        config: &ClientConfig,
        language: watch::Receiver<Option<LanguageTag>>,
    ) -> ClientResult<Self> {
        Self::new(config.api_base_url()?, language)
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn url(&self, path: &str, pairs: &[(&str, String)]) -> ClientResult<Url> {
        let mut url = self.base_url.join(path)?;
        if !pairs.is_empty() {
            let mut query = url.query_pairs_mut();
            for (name, value) in pairs {
                query.append_pair(name, value);
            }
        }
        Ok(url)
    }

    fn request(&self, method: Method, url: Url, token: Option<&AuthToken>) -> RequestBuilder {
        let mut builder = self.client.request(method, url);

        if let Some(tag) = *self.language.borrow() {
            builder = builder.header(reqwest::header::ACCEPT_LANGUAGE, tag.as_str());
        }
        if let Some(token) = token {
            builder = builder.header(AUTH_HEADER, token.expose());
        }

        builder
    }

    async fn send(&self, builder: RequestBuilder) -> ClientResult<Response> {
        let response = builder.send().await?;
        let status = response.status();

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), "API request rejected");
            return Err(ClientError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        pairs: &[(&str, String)],
        token: Option<&AuthToken>,
    ) -> ClientResult<T> {
        let url = self.url(path, pairs)?;
        debug!(%url, "GET");
        let response = self.send(self.request(Method::GET, url, token)).await?;
        decode(response).await
    }

    async fn send_json<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        pairs: &[(&str, String)],
        body: Option<&B>,
        token: Option<&AuthToken>,
    ) -> ClientResult<Response> {
        let url = self.url(path, pairs)?;
        debug!(%method, %url, "Sending request");
        let mut builder = self.request(method, url, token);
        if let Some(body) = body {
            builder = builder.json(body);
        }
        self.send(builder).await
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> ClientResult<T> {
    response
        .json()
        .await
        .map_err(|e| ClientError::Deserialization(e.to_string()))
}

fn limit_pairs(limit: Option<u32>) -> Vec<(&'static str, String)> {
    limit.map(|l| vec![("limit", l.to_string())]).unwrap_or_default()
}

#[async_trait]
impl StorefrontApi for HttpApi {
    async fn products(&self, query: &ProductQuery) -> ClientResult<Vec<Product>> {
        self.get_json("api/products", &query.to_pairs(), None).await
    }

    async fn categories(&self) -> ClientResult<Vec<Category>> {
        self.get_json("api/categories", &[], None).await
    }

    async fn search(&self, query: &SearchQuery) -> ClientResult<Vec<Product>> {
        self.get_json("api/search", &query.to_pairs(), None).await
    }

    async fn similar_products(
        &self,
        product_id: &str,
        limit: Option<u32>,
    ) -> ClientResult<Vec<RecommendationItem>> {
        let mut pairs = vec![("product_id", product_id.to_string())];
        pairs.extend(limit_pairs(limit));
        self.get_json("recs/similar", &pairs, None).await
    }

    async fn personal_recommendations(
        &self,
        request: &PersonalRecommendationsRequest,
        limit: Option<u32>,
    ) -> ClientResult<Vec<RecommendationItem>> {
        let response = self
            .send_json(Method::POST, "recs/personal", &limit_pairs(limit), Some(request), None)
            .await?;
        decode(response).await
    }

    async fn register(&self, credentials: &Credentials) -> ClientResult<()> {
        let body = AuthBody::from_credentials(credentials);
        self.send_json(Method::POST, "api/register", &[], Some(&body), None)
            .await?;
        Ok(())
    }

    async fn login(&self, credentials: &Credentials) -> ClientResult<AuthResponse> {
        let body = AuthBody::from_credentials(credentials);
        let response = self
            .send_json(Method::POST, "api/login", &[], Some(&body), None)
            .await?;
        decode(response).await
    }

    async fn profile(&self, token: &AuthToken) -> ClientResult<Profile> {
        self.get_json("api/profile", &[], Some(token)).await
    }

    async fn update_profile(
        &self,
        token: &AuthToken,
        update: &ProfileUpdate,
    ) -> ClientResult<Profile> {
        let body = ProfileUpdateBody::from_update(update);
        let response = self
            .send_json(Method::PUT, "api/profile", &[], Some(&body), Some(token))
            .await?;
        decode(response).await
    }

    async fn cart(&self, token: &AuthToken) -> ClientResult<Vec<RemoteCartLine>> {
        self.get_json("api/cart", &[], Some(token)).await
    }

    async fn add_to_cart(&self, token: &AuthToken, request: &AddToCartRequest) -> ClientResult<()> {
        self.send_json(Method::POST, "api/cart", &[], Some(request), Some(token))
            .await?;
        Ok(())
    }

    async fn update_cart_item(
        &self,
        token: &AuthToken,
        product_id: &str,
        quantity: u32,
    ) -> ClientResult<()> {
        let path = cart_item_path(product_id);
        let body = UpdateCartRequest { quantity };
        self.send_json(Method::PUT, &path, &[], Some(&body), Some(token))
            .await?;
        Ok(())
    }

    async fn remove_cart_item(&self, token: &AuthToken, product_id: &str) -> ClientResult<()> {
        let path = cart_item_path(product_id);
        self.send_json::<()>(Method::DELETE, &path, &[], None, Some(token))
            .await?;
        Ok(())
    }

    async fn place_order(
        &self,
        token: &AuthToken,
        request: &PlaceOrderRequest,
    ) -> ClientResult<OrderResponse> {
        let response = self
            .send_json(Method::POST, "api/orders", &[], Some(request), Some(token))
            .await?;
        decode(response).await
    }
}

/// Product ids are opaque; percent-encode them as a single path segment.
fn cart_item_path(product_id: &str) -> String {
    let encoded: String = url::form_urlencoded::byte_serialize(product_id.as_bytes()).collect();
    format!("api/cart/item/{}", encoded.replace('+', "%20"))
}
