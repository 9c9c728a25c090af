//! Server-synced cart mutations against the mock service.
//!
//! Authenticated mutations compute the new container locally and mirror
//! it to the service; these tests assert on what the service ends up
//! storing as well as on client state.

use kade_core::{ProductId, UserId};
use kade_integration_tests::{seed_product, MockDb, MockService};
use kade_storefront::api::types::{Cart, LineItem, User};
use kade_storefront::api::Credentials;
use kade_storefront::controller::Controller;
use rust_decimal::Decimal;

fn seed_user(id: &str, username: &str, password: &str) -> User {
    User {
        id: Some(UserId::new(id)),
        username: username.to_string(),
        email: None,
        mobile: None,
        password: password.to_string(),
    }
}

fn line_item(product_id: &str, price: i64, quantity: u32) -> LineItem {
    LineItem {
        product_id: ProductId::new(product_id),
        price_at_time_of_purchase: Decimal::new(price, 0),
        quantity,
    }
}

/// Service with one registered user and one saved cart: p-2 x1 at Rs. 80.
async fn service_with_saved_cart() -> MockService {
    let mut db = MockDb::with_catalog();
    db.users.push(seed_user("u-1", "nimal", "pw"));
    db.carts.push(Cart {
        id: Some("c-1".into()),
        user_id: Some(UserId::new("u-1")),
        cart_items: vec![line_item("p-2", 80, 1)],
        total_discount: Some(Decimal::new(5, 0)),
    });
    MockService::spawn(db).await
}

async fn logged_in_controller(service: &MockService) -> Controller {
    let mut controller = service.controller();
    controller.load_products().await;
    controller
        .login(Credentials::new("nimal", "pw"))
        .await
        .expect("login succeeds");
    controller
}

#[tokio::test]
async fn increment_sends_updated_container_unchanged_otherwise() {
    let service = service_with_saved_cart().await;
    let mut controller = logged_in_controller(&service).await;

    controller.increment_item(&ProductId::new("p-2")).await;

    // Everything but the quantity survives the round trip
    let db = service.db();
    let stored = db.carts.first().expect("cart still stored");
    assert_eq!(stored.id.as_ref().map(kade_core::CartId::as_str), Some("c-1"));
    assert_eq!(stored.user_id, Some(UserId::new("u-1")));
    assert_eq!(stored.total_discount, Some(Decimal::new(5, 0)));
    let item = stored.find_item(&ProductId::new("p-2")).expect("line item");
    assert_eq!(item.quantity, 2);
    assert_eq!(item.price_at_time_of_purchase, Decimal::new(80, 0));
    drop(db);

    // Local state reflects the same container
    let cart = controller.store().state().cart.active_cart().expect("cart");
    assert_eq!(cart.unit_count(), 2);
}

#[tokio::test]
async fn first_add_creates_bound_container() {
    let mut db = MockDb::with_catalog();
    db.users.push(seed_user("u-1", "nimal", "pw"));
    let service = MockService::spawn(db).await;
    let mut controller = logged_in_controller(&service).await;

    let product = seed_product("p-1", "red rice", 100);
    controller.add_to_cart(&product).await;

    let db = service.db();
    assert_eq!(db.carts.len(), 1);
    let stored = db.carts.first().expect("cart created");
    assert_eq!(stored.user_id, Some(UserId::new("u-1")));
    assert!(stored.id.is_some());
    drop(db);

    // The create response's server id is folded back into local state
    let cart = controller.store().state().cart.active_cart().expect("cart");
    assert!(cart.id.is_some());
}

#[tokio::test]
async fn second_add_updates_instead_of_creating() {
    let mut db = MockDb::with_catalog();
    db.users.push(seed_user("u-1", "nimal", "pw"));
    let service = MockService::spawn(db).await;
    let mut controller = logged_in_controller(&service).await;

    let rice = seed_product("p-1", "red rice", 100);
    let coconut = seed_product("p-2", "coconut", 80);
    controller.add_to_cart(&rice).await;
    controller.add_to_cart(&coconut).await;

    let db = service.db();
    assert_eq!(db.carts.len(), 1);
    assert_eq!(db.carts.first().expect("cart").cart_items.len(), 2);
}

#[tokio::test]
async fn decrement_to_zero_deletes_container() {
    let service = service_with_saved_cart().await;
    let mut controller = logged_in_controller(&service).await;

    controller.decrement_item(&ProductId::new("p-2")).await;

    assert!(controller.store().state().cart.active_cart().is_none());
    assert!(service.db().carts.is_empty());
}

#[tokio::test]
async fn remove_item_sends_filtered_container() {
    let mut db = MockDb::with_catalog();
    db.users.push(seed_user("u-1", "nimal", "pw"));
    db.carts.push(Cart {
        id: Some("c-1".into()),
        user_id: Some(UserId::new("u-1")),
        cart_items: vec![line_item("p-1", 100, 2), line_item("p-2", 80, 1)],
        total_discount: None,
    });
    let service = MockService::spawn(db).await;
    let mut controller = logged_in_controller(&service).await;

    controller.remove_item(&ProductId::new("p-1")).await;

    let db = service.db();
    let stored = db.carts.first().expect("cart still stored");
    assert_eq!(stored.cart_items.len(), 1);
    assert!(stored.find_item(&ProductId::new("p-1")).is_none());
}

#[tokio::test]
async fn checkout_deletes_server_cart() {
    let service = service_with_saved_cart().await;
    let mut controller = logged_in_controller(&service).await;

    controller.checkout().await;

    assert!(controller.store().state().cart.active_cart().is_none());
    assert!(service.db().carts.is_empty());
}

#[tokio::test]
async fn increment_unknown_product_changes_nothing() {
    let service = service_with_saved_cart().await;
    let mut controller = logged_in_controller(&service).await;

    controller.increment_item(&ProductId::new("p-9")).await;

    let db = service.db();
    let stored = db.carts.first().expect("cart untouched");
    assert_eq!(stored.find_item(&ProductId::new("p-2")).map(|i| i.quantity), Some(1));
}
