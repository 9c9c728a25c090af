//! Client-local application state.
//!
//! All state lives in one explicit [`Store`] owned by the caller and passed
//! by reference into handlers - no hidden singleton. UI layers register
//! observers that run after every mutation; handlers run to completion on
//! the caller's single task queue, so mutations form a total order matching
//! event order and no locking is needed.

pub mod cart;
pub mod orders;
pub mod products;
pub mod ratings;
pub mod session;

use cart::CartState;
use orders::OrderState;
use products::ProductsState;
use ratings::RatingsState;
use session::{Identity, SessionState};

/// The full client-side application state.
#[derive(Debug, Default)]
pub struct AppState {
    pub session: SessionState,
    pub cart: CartState,
    pub orders: OrderState,
    pub products: ProductsState,
    pub ratings: RatingsState,
}

/// Observer callback invoked after every state mutation.
pub type Observer = Box<dyn Fn(&AppState)>;

/// Handle for removing a registered observer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubscriptionId(u64);

/// Owner of the application state plus its observers.
pub struct Store {
    state: AppState,
    observers: Vec<(SubscriptionId, Observer)>,
    next_subscription: u64,
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}

impl Store {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: AppState::default(),
            observers: Vec::new(),
            next_subscription: 0,
        }
    }

    /// Read-only view of the current state.
    #[must_use]
    pub const fn state(&self) -> &AppState {
        &self.state
    }

    /// Register an observer that runs after every mutation.
    pub fn subscribe(&mut self, observer: impl Fn(&AppState) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.observers.push((id, Box::new(observer)));
        id
    }

    /// Remove a previously registered observer.
    pub fn unsubscribe(&mut self, id: SubscriptionId) {
        self.observers.retain(|(existing, _)| *existing != id);
    }

    /// Apply a mutation and notify observers.
    pub fn update<R>(&mut self, mutate: impl FnOnce(&mut AppState) -> R) -> R {
        let result = mutate(&mut self.state);
        self.notify();
        result
    }

    /// Replace the identity and discard guest cart/order state.
    ///
    /// Any merge of guest state into server state must happen before this
    /// call; whatever guest cart is still held locally is gone afterwards.
    pub fn login(&mut self, identity: Identity) {
        self.update(|state| {
            state.session.login(identity);
            state.cart.reset();
            state.ratings.clear();
        });
    }

    /// Clear the identity and discard cart/order state.
    ///
    /// Resetting the cart here keeps a previous session's guest cart from
    /// leaking into a fresh anonymous session.
    pub fn logout(&mut self) {
        self.update(|state| {
            state.session.logout();
            state.cart.reset();
            state.ratings.clear();
        });
    }

    fn notify(&self) {
        for (_, observer) in &self.observers {
            observer(&self.state);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    use kade_core::UserId;

    fn identity() -> Identity {
        Identity {
            id: UserId::new("u-1"),
            username: "nimal".into(),
            email: Some("nimal@example.com".into()),
        }
    }

    #[test]
    fn test_observers_run_on_update() {
        let mut store = Store::new();
        let seen = Rc::new(Cell::new(0));

        let counter = Rc::clone(&seen);
        store.subscribe(move |_| counter.set(counter.get() + 1));

        store.update(|state| state.products.set_search_keyword("rice"));
        store.update(|state| state.products.set_search_keyword(""));
        assert_eq!(seen.get(), 2);
    }

    #[test]
    fn test_unsubscribe_stops_notifications() {
        let mut store = Store::new();
        let seen = Rc::new(Cell::new(0));

        let counter = Rc::clone(&seen);
        let id = store.subscribe(move |_| counter.set(counter.get() + 1));
        store.unsubscribe(id);

        store.update(|state| state.products.set_search_keyword("rice"));
        assert_eq!(seen.get(), 0);
    }

    #[test]
    fn test_login_discards_guest_cart() {
        let mut store = Store::new();
        store.update(|state| {
            state.cart.add_or_increment(&crate::api::types::Product {
                id: "p-1".into(),
                name: "rice".into(),
                price: rust_decimal::Decimal::new(100, 0),
                total_rating_score: 0.0,
                total_ratings: 0,
                quantity: 5,
            });
        });
        assert!(store.state().cart.active_cart().is_some());

        store.login(identity());
        assert!(store.state().cart.active_cart().is_none());
        assert!(store.state().session.is_authenticated());
        assert!(store.state().session.last_login().is_some());
    }

    #[test]
    fn test_logout_clears_identity_and_cart() {
        let mut store = Store::new();
        store.login(identity());
        store.logout();
        assert!(!store.state().session.is_authenticated());
        assert!(store.state().session.identity().is_none());
        assert!(store.state().cart.active_cart().is_none());
    }
}
