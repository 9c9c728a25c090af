//! Kade - interactive storefront client.
//!
//! A line-based front end over the storefront library: browse the catalog,
//! manage a cart as a guest or logged-in user, register, rate products,
//! and check out. Point `KADE_API_URL` at the remote product/user service.
//!
//! # Usage
//!
//! ```bash
//! KADE_API_URL=http://localhost:3500 kade
//! ```
//!
//! # Commands
//!
//! - `products` / `search <keyword>` - browse the catalog
//! - `add <product-id>` / `inc <id>` / `dec <id>` / `rm <id>` - cart mutations
//! - `cart` - show the active cart
//! - `login <username> <password>` / `register <username> <email> <password>`
//! - `rate <product-id> <0-5>` - submit a rating
//! - `checkout` / `logout` / `quit`

#![cfg_attr(not(test), forbid(unsafe_code))]
// An interactive terminal front end talks through stdout
#![allow(clippy::print_stdout)]

use std::io::{BufRead, Write as _};

use tracing_subscriber::EnvFilter;

use kade_core::Price;
use kade_storefront::api::{ApiClient, Credentials};
use kade_storefront::config::StorefrontConfig;
use kade_storefront::controller::Controller;
use kade_storefront::error::StoreError;
use kade_storefront::state::AppState;

#[tokio::main]
async fn main() -> Result<(), StoreError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = StorefrontConfig::from_env()?;
    let mut controller = Controller::new(ApiClient::new(&config));

    controller.load_products().await;
    println!("kade storefront - type 'help' for commands");

    let stdin = std::io::stdin();
    loop {
        print!("> ");
        std::io::stdout().flush().ok();

        let mut line = String::new();
        if stdin.lock().read_line(&mut line).unwrap_or(0) == 0 {
            break;
        }
        let mut parts = line.split_whitespace();
        let Some(command) = parts.next() else {
            continue;
        };
        let args: Vec<&str> = parts.collect();

        match (command, args.as_slice()) {
            ("products", _) => render_products(controller.store().state()),
            ("search", [keyword]) => {
                controller.set_search_keyword(*keyword);
                render_products(controller.store().state());
            }
            ("add", [id]) => {
                let product = controller.store().state().products.product(&(*id).into()).cloned();
                match product {
                    Some(product) => controller.add_to_cart(&product).await,
                    None => println!("unknown product: {id}"),
                }
            }
            ("inc", [id]) => controller.increment_item(&(*id).into()).await,
            ("dec", [id]) => controller.decrement_item(&(*id).into()).await,
            ("rm", [id]) => controller.remove_item(&(*id).into()).await,
            ("cart", _) => render_cart(controller.store().state()),
            ("checkout", _) => {
                controller.checkout().await;
                println!("Your order has been successfully placed");
            }
            ("login", [username, password]) => {
                match controller.login(Credentials::new(*username, *password)).await {
                    Ok(()) => println!("logged in as {username}"),
                    Err(e) => println!("{e}"),
                }
                controller.load_user_rating().await;
            }
            ("register", [username, email, password]) => {
                let user = kade_storefront::api::types::User {
                    id: None,
                    username: (*username).to_string(),
                    email: Some((*email).to_string()),
                    mobile: None,
                    password: (*password).to_string(),
                };
                match controller.register(user).await {
                    Ok(()) => println!("registered and logged in as {username}"),
                    Err(e) => println!("{e}"),
                }
            }
            ("rate", [id, value]) => match value.parse::<f64>() {
                Ok(rating) => controller.rate_product(&(*id).into(), rating).await,
                Err(_) => println!("rating must be a number in [0, 5]"),
            },
            ("logout", _) => {
                controller.logout();
                println!("logged out");
            }
            ("help", _) => println!(
                "commands: products, search <kw>, add/inc/dec/rm <id>, cart, \
                 checkout, login, register, rate <id> <0-5>, logout, quit"
            ),
            ("quit" | "exit", _) => break,
            _ => println!("unrecognized command; type 'help'"),
        }
    }

    Ok(())
}

/// Print the (filtered) catalog.
fn render_products(state: &AppState) {
    let products = state.products.filtered();
    if products.is_empty() {
        println!("no products");
        return;
    }
    for product in products {
        let rating = product
            .average_rating()
            .map_or_else(|| "no ratings yet".to_string(), |avg| format!("{avg:.1}/5"));
        println!(
            "{}  {}  {}  [{rating}]",
            product.id,
            product.name,
            Price::lkr(product.price).display()
        );
    }
}

/// Print the active cart.
fn render_cart(state: &AppState) {
    let Some(cart) = state.cart.active_cart() else {
        println!("No products in cart");
        return;
    };
    for item in &cart.cart_items {
        let name = state
            .products
            .product(&item.product_id)
            .map_or_else(|| item.product_id.to_string(), |p| p.name.clone());
        println!(
            "{name}  x{}  {}",
            item.quantity,
            Price::lkr(item.price_at_time_of_purchase).display()
        );
    }
    println!("Subtotal: {}", Price::lkr(cart.subtotal()).display());
}
