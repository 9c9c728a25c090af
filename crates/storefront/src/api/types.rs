//! Wire types for the remote product/user service.
//!
//! The service speaks camelCase JSON; every record is identified by an
//! opaque string id. Ids and `userId` fields are optional on cart and
//! rating records because both exist locally before the server has ever
//! seen them.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use kade_core::{CartId, ProductId, RatingId, UserId};

// =============================================================================
// Products
// =============================================================================

/// A catalog product.
///
/// Read-only from the client's perspective except for the rating
/// aggregates, which are updated through the service on rating submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub price: Decimal,
    pub total_rating_score: f64,
    pub total_ratings: u32,
    pub quantity: u32,
}

impl Product {
    /// Average rating, or `None` for a product nobody has rated yet.
    ///
    /// Callers must render a fallback for `None`; dividing by a zero
    /// rating count would otherwise surface as NaN in the UI.
    #[must_use]
    pub fn average_rating(&self) -> Option<f64> {
        if self.total_ratings == 0 {
            None
        } else {
            Some(self.total_rating_score / f64::from(self.total_ratings))
        }
    }

    /// Copy of this product with one more rating folded into the aggregates.
    #[must_use]
    pub fn with_added_rating(&self, rating: f64) -> Self {
        Self {
            total_rating_score: self.total_rating_score + rating,
            total_ratings: self.total_ratings + 1,
            ..self.clone()
        }
    }
}

// =============================================================================
// Carts
// =============================================================================

/// A single product-quantity-price entry within a cart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    pub product_id: ProductId,
    pub price_at_time_of_purchase: Decimal,
    pub quantity: u32,
}

/// A cart container.
///
/// A container with `user_id` unset is guest-owned and lives only in local
/// memory; once `user_id` is set it is mirrored to the remote service on
/// every mutation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<CartId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<UserId>,
    #[serde(default)]
    pub cart_items: Vec<LineItem>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_discount: Option<Decimal>,
}

impl Cart {
    /// Find a line item by product.
    #[must_use]
    pub fn find_item(&self, product_id: &ProductId) -> Option<&LineItem> {
        self.cart_items.iter().find(|i| &i.product_id == product_id)
    }

    /// Find a line item by product, mutably.
    pub fn find_item_mut(&mut self, product_id: &ProductId) -> Option<&mut LineItem> {
        self.cart_items
            .iter_mut()
            .find(|i| &i.product_id == product_id)
    }

    /// Add one unit of a product, appending a new line item if needed.
    ///
    /// An existing line item also has its captured price refreshed to the
    /// product's current price.
    pub fn add_or_increment(&mut self, product: &Product) {
        if let Some(item) = self.find_item_mut(&product.id) {
            item.quantity += 1;
            item.price_at_time_of_purchase = product.price;
        } else {
            self.cart_items.push(LineItem {
                product_id: product.id.clone(),
                price_at_time_of_purchase: product.price,
                quantity: 1,
            });
        }
    }

    /// Add one unit to an existing line item. Returns `false` when the
    /// product has no line item.
    pub fn increment_item(&mut self, product_id: &ProductId) -> bool {
        match self.find_item_mut(product_id) {
            Some(item) => {
                item.quantity += 1;
                true
            }
            None => false,
        }
    }

    /// Remove one unit from an existing line item, returning the new
    /// quantity. The caller decides what a zero means for the container.
    pub fn decrement_item(&mut self, product_id: &ProductId) -> Option<u32> {
        let item = self.find_item_mut(product_id)?;
        item.quantity = item.quantity.saturating_sub(1);
        Some(item.quantity)
    }

    /// Subtotal over all line items at their captured prices.
    #[must_use]
    pub fn subtotal(&self) -> Decimal {
        self.cart_items
            .iter()
            .map(|i| i.price_at_time_of_purchase * Decimal::from(i.quantity))
            .sum()
    }

    /// Total number of units across all line items.
    #[must_use]
    pub fn unit_count(&self) -> u32 {
        self.cart_items.iter().map(|i| i.quantity).sum()
    }
}

// =============================================================================
// Orders
// =============================================================================

/// A placed order, created from a cart at checkout confirmation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<CartId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<UserId>,
    #[serde(default)]
    pub order_items: Vec<LineItem>,
}

// =============================================================================
// Users
// =============================================================================

/// A user record as stored by the remote service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<UserId>,
    pub username: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mobile: Option<String>,
    pub password: String,
}

// =============================================================================
// Ratings
// =============================================================================

/// One product's rating within a user's rating record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RatedProduct {
    pub product_id: ProductId,
    /// Rating value in `[0, 5]`, half-star precision.
    pub rating: f64,
}

/// Per-user rating record, created lazily on first rating submission.
///
/// `rated_products` is NOT deduplicated by product id; repeated
/// submissions for the same product append duplicate entries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRating {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<RatingId>,
    pub user_id: UserId,
    #[serde(default)]
    pub rated_products: Vec<RatedProduct>,
}

impl UserRating {
    /// Whether this record already holds a rating for the given product.
    #[must_use]
    pub fn has_rated(&self, product_id: &ProductId) -> bool {
        self.rated_products
            .iter()
            .any(|r| &r.product_id == product_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn product(score: f64, count: u32) -> Product {
        Product {
            id: ProductId::new("p-1"),
            name: "rice".into(),
            price: Decimal::new(10000, 2),
            total_rating_score: score,
            total_ratings: count,
            quantity: 10,
        }
    }

    #[test]
    fn test_average_rating_guards_zero_count() {
        assert_eq!(product(0.0, 0).average_rating(), None);
        assert_eq!(product(9.0, 2).average_rating(), Some(4.5));
    }

    #[test]
    fn test_with_added_rating_folds_aggregates() {
        let updated = product(9.0, 2).with_added_rating(4.0);
        assert_eq!(updated.total_ratings, 3);
        assert!((updated.total_rating_score - 13.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_cart_subtotal() {
        let cart = Cart {
            cart_items: vec![
                LineItem {
                    product_id: ProductId::new("p-1"),
                    price_at_time_of_purchase: Decimal::new(10000, 2),
                    quantity: 2,
                },
                LineItem {
                    product_id: ProductId::new("p-2"),
                    price_at_time_of_purchase: Decimal::new(5000, 2),
                    quantity: 1,
                },
            ],
            ..Cart::default()
        };
        assert_eq!(cart.subtotal(), Decimal::new(25000, 2));
        assert_eq!(cart.unit_count(), 3);
    }

    #[test]
    fn test_guest_cart_serializes_without_ids() {
        let cart = Cart {
            cart_items: vec![LineItem {
                product_id: ProductId::new("p-1"),
                price_at_time_of_purchase: Decimal::new(100, 0),
                quantity: 1,
            }],
            ..Cart::default()
        };
        let json = serde_json::to_value(&cart).expect("serialize");
        assert!(json.get("id").is_none());
        assert!(json.get("userId").is_none());
        assert_eq!(json["cartItems"][0]["productId"], "p-1");
    }

    #[test]
    fn test_user_rating_has_rated() {
        let record = UserRating {
            id: None,
            user_id: UserId::new("u-1"),
            rated_products: vec![RatedProduct {
                product_id: ProductId::new("p-1"),
                rating: 4.0,
            }],
        };
        assert!(record.has_rated(&ProductId::new("p-1")));
        assert!(!record.has_rated(&ProductId::new("p-2")));
    }
}
