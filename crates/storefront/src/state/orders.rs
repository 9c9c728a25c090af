//! Placed-order state.
//!
//! Checkout is a confirmation dialog, not a payment flow: confirming moves
//! the cart's line items into an order record and empties the cart.

use crate::api::types::Order;

/// Orders placed during this session.
#[derive(Debug, Default)]
pub struct OrderState {
    orders: Option<Vec<Order>>,
}

impl OrderState {
    /// All placed orders.
    #[must_use]
    pub fn orders(&self) -> &[Order] {
        self.orders.as_deref().unwrap_or_default()
    }

    /// Record a placed order.
    pub fn place(&mut self, order: Order) {
        self.orders.get_or_insert_with(Vec::new).push(order);
    }

    /// Forget all placed orders.
    pub fn clear(&mut self) {
        self.orders = None;
    }
}
