//! Integration test harness for Kade.
//!
//! Spins up an in-process mock of the remote product/user service (the
//! flat JSON REST API the storefront client consumes) on an ephemeral
//! port, with an inspectable in-memory database. Tests drive a real
//! `Controller` against it and assert on both client state and what the
//! service ended up storing.
//!
//! # Example
//!
//! ```rust,ignore
//! let service = MockService::spawn(MockDb::with_catalog()).await;
//! let mut controller = service.controller();
//! controller.load_products().await;
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard};

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use rust_decimal::Decimal;
use url::Url;

use kade_core::ProductId;
use kade_storefront::api::types::{Cart, Product, User, UserRating};
use kade_storefront::api::ApiClient;
use kade_storefront::config::StorefrontConfig;
use kade_storefront::controller::Controller;

/// In-memory database backing the mock service.
#[derive(Debug, Default)]
pub struct MockDb {
    pub products: Vec<Product>,
    pub users: Vec<User>,
    pub carts: Vec<Cart>,
    pub ratings: Vec<UserRating>,
    /// When set, cart list requests answer 500.
    pub fail_cart_fetch: bool,
    /// When set, product update requests answer 500.
    pub fail_product_update: bool,
    next_id: u64,
}

impl MockDb {
    /// An empty database with a small seeded catalog.
    #[must_use]
    pub fn with_catalog() -> Self {
        Self {
            products: vec![
                seed_product("p-1", "red rice", 100),
                seed_product("p-2", "coconut", 80),
                seed_product("p-3", "rice flour", 150),
            ],
            ..Self::default()
        }
    }

    /// Generate a fresh record id.
    pub fn next_id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{prefix}-{}", self.next_id)
    }
}

/// Build a catalog product with empty rating aggregates.
#[must_use]
pub fn seed_product(id: &str, name: &str, price: i64) -> Product {
    Product {
        id: ProductId::new(id),
        name: name.to_string(),
        price: Decimal::new(price, 0),
        total_rating_score: 0.0,
        total_ratings: 0,
        quantity: 10,
    }
}

type SharedDb = Arc<Mutex<MockDb>>;

/// A running mock service.
pub struct MockService {
    addr: SocketAddr,
    db: SharedDb,
}

impl MockService {
    /// Bind the mock service on an ephemeral port and start serving.
    ///
    /// # Panics
    ///
    /// Panics if the listener cannot bind; tests cannot proceed without it.
    pub async fn spawn(db: MockDb) -> Self {
        let db = Arc::new(Mutex::new(db));
        let router = router(Arc::clone(&db));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind mock service");
        let addr = listener.local_addr().expect("Failed to read local addr");

        tokio::spawn(async move {
            axum::serve(listener, router)
                .await
                .expect("Mock service crashed");
        });

        Self { addr, db }
    }

    /// Base URL of the running service.
    #[must_use]
    pub fn base_url(&self) -> Url {
        Url::parse(&format!("http://{}", self.addr)).expect("Failed to build base url")
    }

    /// A controller wired to this service.
    #[must_use]
    pub fn controller(&self) -> Controller {
        Controller::new(ApiClient::new(&StorefrontConfig::new(self.base_url())))
    }

    /// Lock the backing database for inspection or seeding.
    ///
    /// # Panics
    ///
    /// Panics if the lock is poisoned.
    pub fn db(&self) -> MutexGuard<'_, MockDb> {
        self.db.lock().expect("Mock db lock poisoned")
    }
}

/// Shorthand error response.
fn server_error() -> Response {
    (StatusCode::INTERNAL_SERVER_ERROR, "simulated failure").into_response()
}

fn router(db: SharedDb) -> Router {
    Router::new()
        .route("/products", get(list_products))
        .route("/products/{id}", put(update_product))
        .route("/users", get(find_users).post(create_user))
        .route("/users/rating", post(create_rating))
        .route("/users/rating/{user_id}", get(list_ratings))
        .route("/users/rating/update/{id}", put(update_rating))
        .route("/users/cart", post(create_cart))
        .route("/users/cart/{user_id}", get(list_carts))
        .route(
            "/users/cart/update/{id}",
            put(update_cart).delete(delete_cart),
        )
        .with_state(db)
}

async fn list_products(
    State(db): State<SharedDb>,
    Query(params): Query<HashMap<String, String>>,
) -> Json<Vec<Product>> {
    let db = db.lock().expect("lock");
    let products = match params.get("id") {
        Some(id) => db
            .products
            .iter()
            .filter(|p| p.id.as_str() == id)
            .cloned()
            .collect(),
        None => db.products.clone(),
    };
    Json(products)
}

async fn update_product(
    State(db): State<SharedDb>,
    Path(id): Path<String>,
    Json(update): Json<Product>,
) -> Response {
    let mut db = db.lock().expect("lock");
    if db.fail_product_update {
        return server_error();
    }
    match db.products.iter_mut().find(|p| p.id.as_str() == id) {
        Some(existing) => {
            *existing = update.clone();
            Json(update).into_response()
        }
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn find_users(
    State(db): State<SharedDb>,
    Query(params): Query<HashMap<String, String>>,
) -> Json<Vec<User>> {
    let db = db.lock().expect("lock");
    let users = db
        .users
        .iter()
        .filter(|u| {
            params.get("username").is_none_or(|v| &u.username == v)
                && params.get("password").is_none_or(|v| &u.password == v)
        })
        .cloned()
        .collect();
    Json(users)
}

async fn create_user(State(db): State<SharedDb>, Json(user): Json<User>) -> Json<User> {
    let mut db = db.lock().expect("lock");
    db.users.push(user.clone());
    Json(user)
}

async fn list_ratings(
    State(db): State<SharedDb>,
    Path(user_id): Path<String>,
) -> Json<Vec<UserRating>> {
    let db = db.lock().expect("lock");
    let ratings = db
        .ratings
        .iter()
        .filter(|r| r.user_id.as_str() == user_id)
        .cloned()
        .collect();
    Json(ratings)
}

async fn create_rating(
    State(db): State<SharedDb>,
    Json(mut rating): Json<UserRating>,
) -> Json<UserRating> {
    let mut db = db.lock().expect("lock");
    rating.id = Some(db.next_id("r").into());
    db.ratings.push(rating.clone());
    Json(rating)
}

async fn update_rating(
    State(db): State<SharedDb>,
    Path(id): Path<String>,
    Json(rating): Json<UserRating>,
) -> Response {
    let mut db = db.lock().expect("lock");
    match db
        .ratings
        .iter_mut()
        .find(|r| r.id.as_ref().is_some_and(|r| r.as_str() == id))
    {
        Some(existing) => {
            *existing = rating.clone();
            Json(rating).into_response()
        }
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn list_carts(State(db): State<SharedDb>, Path(user_id): Path<String>) -> Response {
    let db = db.lock().expect("lock");
    if db.fail_cart_fetch {
        return server_error();
    }
    let carts: Vec<Cart> = db
        .carts
        .iter()
        .filter(|c| c.user_id.as_ref().is_some_and(|u| u.as_str() == user_id))
        .cloned()
        .collect();
    Json(carts).into_response()
}

async fn create_cart(State(db): State<SharedDb>, Json(mut cart): Json<Cart>) -> Json<Cart> {
    let mut db = db.lock().expect("lock");
    cart.id = Some(db.next_id("c").into());
    db.carts.push(cart.clone());
    Json(cart)
}

async fn update_cart(
    State(db): State<SharedDb>,
    Path(id): Path<String>,
    Json(mut cart): Json<Cart>,
) -> Response {
    let mut db = db.lock().expect("lock");
    match db
        .carts
        .iter_mut()
        .find(|c| c.id.as_ref().is_some_and(|c| c.as_str() == id))
    {
        Some(existing) => {
            cart.id = existing.id.clone();
            *existing = cart.clone();
            Json(cart).into_response()
        }
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn delete_cart(State(db): State<SharedDb>, Path(id): Path<String>) -> StatusCode {
    let mut db = db.lock().expect("lock");
    let before = db.carts.len();
    db.carts
        .retain(|c| c.id.as_ref().is_none_or(|c| c.as_str() != id));
    if db.carts.len() == before {
        StatusCode::NOT_FOUND
    } else {
        StatusCode::OK
    }
}
