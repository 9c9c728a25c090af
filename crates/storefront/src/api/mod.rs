//! REST client for the remote product/user service.
//!
//! The service is a flat JSON REST API: products, users, per-user rating
//! records, and saved carts. Single-entity lookups answer with an array,
//! so every "fetch one" call goes through [`expect_one`], which turns an
//! empty array into a distinct `NotFound` error instead of a decode panic.
//!
//! The product list is cached with `moka` (TTL from configuration,
//! 5 minutes by default); rating submissions invalidate it.

pub mod types;

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, instrument};

use kade_core::{CartId, ProductId, UserId};

use crate::config::StorefrontConfig;
use types::{Cart, Product, User, UserRating};

/// Cache key for the product list.
const PRODUCTS_CACHE_KEY: &str = "products";

/// Errors that can occur when talking to the remote service.
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP request failed (network or protocol level).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The service answered with a non-success status.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// A query that expected exactly one record got an empty array.
    #[error("{entity} not found")]
    NotFound { entity: &'static str },

    /// Failed to parse a response body.
    #[error("Parse error: {0}")]
    Parse(String),

    /// A remote mutation was attempted on a record the server has no id for.
    #[error("{0} has no server id")]
    Unsynced(&'static str),
}

/// Decode a single-entity lookup that the service answers with an array.
///
/// # Errors
///
/// Returns `ApiError::NotFound` when the array is empty.
pub fn expect_one<T>(items: Vec<T>, entity: &'static str) -> Result<T, ApiError> {
    items
        .into_iter()
        .next()
        .ok_or(ApiError::NotFound { entity })
}

/// Login credentials.
///
/// The password is wrapped in `SecretString` so it never lands in logs.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub username: String,
    pub password: SecretString,
}

impl Credentials {
    /// Create credentials from plain strings.
    #[must_use]
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: SecretString::from(password.into()),
        }
    }
}

// =============================================================================
// ApiClient
// =============================================================================

/// Client for the remote product/user service.
///
/// Cheaply cloneable via `Arc`. No request timeout is configured; calls
/// rely on the transport's default behavior.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    client: reqwest::Client,
    base_url: String,
    products_cache: Cache<String, Vec<Product>>,
}

impl ApiClient {
    /// Create a new API client.
    #[must_use]
    pub fn new(config: &StorefrontConfig) -> Self {
        let products_cache = Cache::builder()
            .max_capacity(1)
            .time_to_live(Duration::from_secs(config.cache_ttl_secs))
            .build();

        let base_url = config.api_url.as_str().trim_end_matches('/').to_string();

        Self {
            inner: Arc::new(ApiClientInner {
                client: reqwest::Client::new(),
                base_url,
                products_cache,
            }),
        }
    }

    /// Build a full URL for an endpoint path.
    fn url(&self, path: &str) -> String {
        format!("{}/{path}", self.inner.base_url)
    }

    /// Decode a JSON response, mapping non-success statuses to `ApiError::Api`.
    async fn parse_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ApiError> {
        let status = response.status();

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ApiError::Api {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json()
            .await
            .map_err(|e| ApiError::Parse(e.to_string()))
    }

    /// Check a response status for calls whose body we don't need.
    async fn check_status(response: reqwest::Response) -> Result<(), ApiError> {
        let status = response.status();

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ApiError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(())
    }

    // =========================================================================
    // Products
    // =========================================================================

    /// Fetch the full product list, served from cache when fresh.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the body doesn't decode.
    #[instrument(skip(self))]
    pub async fn get_products(&self) -> Result<Vec<Product>, ApiError> {
        if let Some(cached) = self.inner.products_cache.get(PRODUCTS_CACHE_KEY).await {
            debug!("product list served from cache");
            return Ok(cached);
        }

        let response = self.inner.client.get(self.url("products")).send().await?;
        let products: Vec<Product> = Self::parse_json(response).await?;

        self.inner
            .products_cache
            .insert(PRODUCTS_CACHE_KEY.to_string(), products.clone())
            .await;

        Ok(products)
    }

    /// Fetch a single product by id.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::NotFound` when the id matches nothing.
    #[instrument(skip(self))]
    pub async fn get_product(&self, id: &ProductId) -> Result<Product, ApiError> {
        let response = self
            .inner
            .client
            .get(self.url("products"))
            .query(&[("id", id.as_str())])
            .send()
            .await?;

        let products: Vec<Product> = Self::parse_json(response).await?;
        expect_one(products, "product")
    }

    /// Update a product's rating aggregates.
    ///
    /// Invalidates the product list cache so the next listing reflects
    /// the new aggregates.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, product), fields(product_id = %product.id))]
    pub async fn update_product_rating(&self, product: &Product) -> Result<Product, ApiError> {
        let response = self
            .inner
            .client
            .put(self.url(&format!("products/{}", product.id)))
            .json(product)
            .send()
            .await?;

        let updated = Self::parse_json(response).await?;
        self.inner.products_cache.invalidate(PRODUCTS_CACHE_KEY).await;
        Ok(updated)
    }

    // =========================================================================
    // Users
    // =========================================================================

    /// Look up a user by credentials.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::NotFound` when no user matches, which callers
    /// surface as invalid credentials.
    #[instrument(skip(self, credentials), fields(username = %credentials.username))]
    pub async fn get_user(&self, credentials: &Credentials) -> Result<User, ApiError> {
        let response = self
            .inner
            .client
            .get(self.url("users"))
            .query(&[
                ("username", credentials.username.as_str()),
                ("password", credentials.password.expose_secret()),
            ])
            .send()
            .await?;

        let users: Vec<User> = Self::parse_json(response).await?;
        expect_one(users, "user")
    }

    /// Register a new user.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, user), fields(username = %user.username))]
    pub async fn create_user(&self, user: &User) -> Result<User, ApiError> {
        let response = self
            .inner
            .client
            .post(self.url("users"))
            .json(user)
            .send()
            .await?;

        Self::parse_json(response).await
    }

    // =========================================================================
    // Ratings
    // =========================================================================

    /// Fetch a user's rating record.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::NotFound` when the user has never rated anything.
    #[instrument(skip(self))]
    pub async fn get_user_rating(&self, user_id: &UserId) -> Result<UserRating, ApiError> {
        let response = self
            .inner
            .client
            .get(self.url(&format!("users/rating/{user_id}")))
            .send()
            .await?;

        let ratings: Vec<UserRating> = Self::parse_json(response).await?;
        expect_one(ratings, "user rating")
    }

    /// Create a user's rating record.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, rating), fields(user_id = %rating.user_id))]
    pub async fn create_user_rating(&self, rating: &UserRating) -> Result<UserRating, ApiError> {
        let response = self
            .inner
            .client
            .post(self.url("users/rating"))
            .json(rating)
            .send()
            .await?;

        Self::parse_json(response).await
    }

    /// Update an existing user rating record in place.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Unsynced` when the record has no server id.
    #[instrument(skip(self, rating), fields(user_id = %rating.user_id))]
    pub async fn update_user_rating(&self, rating: &UserRating) -> Result<UserRating, ApiError> {
        let id = rating
            .id
            .as_ref()
            .ok_or(ApiError::Unsynced("user rating"))?;

        let response = self
            .inner
            .client
            .put(self.url(&format!("users/rating/update/{id}")))
            .json(rating)
            .send()
            .await?;

        Self::parse_json(response).await
    }

    // =========================================================================
    // Carts
    // =========================================================================

    /// Fetch a user's saved carts.
    ///
    /// The service can hold several saved carts per user; the client only
    /// ever operates on the first.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn get_saved_carts(&self, user_id: &UserId) -> Result<Vec<Cart>, ApiError> {
        let response = self
            .inner
            .client
            .get(self.url(&format!("users/cart/{user_id}")))
            .send()
            .await?;

        Self::parse_json(response).await
    }

    /// Persist a new cart container.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, cart))]
    pub async fn create_cart(&self, cart: &Cart) -> Result<Cart, ApiError> {
        let response = self
            .inner
            .client
            .post(self.url("users/cart"))
            .json(cart)
            .send()
            .await?;

        Self::parse_json(response).await
    }

    /// Replace a persisted cart container.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Unsynced` when the cart has no server id.
    #[instrument(skip(self, cart))]
    pub async fn update_cart(&self, cart: &Cart) -> Result<Cart, ApiError> {
        let id = cart.id.as_ref().ok_or(ApiError::Unsynced("cart"))?;

        let response = self
            .inner
            .client
            .put(self.url(&format!("users/cart/update/{id}")))
            .json(cart)
            .send()
            .await?;

        Self::parse_json(response).await
    }

    /// Delete a persisted cart container.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn delete_cart(&self, id: &CartId) -> Result<(), ApiError> {
        let response = self
            .inner
            .client
            .delete(self.url(&format!("users/cart/update/{id}")))
            .send()
            .await?;

        Self::check_status(response).await
    }
}
