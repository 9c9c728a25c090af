//! Cart state and guest cart mutations.
//!
//! Holds the saved carts mirrored from the server for an authenticated
//! user, or a single local container for a guest. The service can store
//! several saved carts per user but the client only ever operates on the
//! first.
//!
//! All mutations here are synchronous and in-memory. For an authenticated
//! session the controller computes the same new container value and sends
//! it to the remote service instead.

use kade_core::{ProductId, SyncStatus};

use crate::api::types::{Cart, Product};

/// Result of an in-place cart mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationOutcome {
    /// The line item was adjusted.
    Applied,
    /// The mutation emptied the cart; the whole container was reset.
    ContainerCleared,
    /// The product has no line item in the active container.
    NotInCart,
}

/// Cart fetch/mutation state.
#[derive(Debug, Default)]
pub struct CartState {
    saved_carts: Option<Vec<Cart>>,
    status: SyncStatus,
    error: Option<String>,
}

impl CartState {
    /// The active container (always the first saved cart).
    #[must_use]
    pub fn active_cart(&self) -> Option<&Cart> {
        self.saved_carts.as_ref().and_then(|carts| carts.first())
    }

    /// Fetch status of the server mirror.
    #[must_use]
    pub const fn status(&self) -> SyncStatus {
        self.status
    }

    /// Error message from the last failed fetch.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// All saved carts, for persistence snapshots.
    #[must_use]
    pub fn saved_carts(&self) -> Option<&[Cart]> {
        self.saved_carts.as_deref()
    }

    /// Replace the saved carts with a server response.
    pub fn set_carts(&mut self, carts: Vec<Cart>) {
        self.saved_carts = if carts.is_empty() { None } else { Some(carts) };
    }

    /// Replace the active container, keeping any further saved carts.
    ///
    /// Used for optimistic updates: the intended end state lands locally
    /// before (or independent of) the server confirming it.
    pub fn replace_active(&mut self, cart: Cart) {
        match &mut self.saved_carts {
            Some(carts) => match carts.first_mut() {
                Some(first) => *first = cart,
                None => carts.push(cart),
            },
            None => self.saved_carts = Some(vec![cart]),
        }
    }

    /// Mark a fetch as in flight.
    pub const fn mark_loading(&mut self) {
        self.status = SyncStatus::Loading;
    }

    /// Mark the last fetch as succeeded.
    pub fn mark_succeeded(&mut self) {
        self.status = SyncStatus::Succeeded;
        self.error = None;
    }

    /// Mark the last fetch as failed.
    ///
    /// A failed fetch is not retried automatically; the next login event
    /// re-triggers it.
    pub fn mark_failed(&mut self, error: impl Into<String>) {
        self.status = SyncStatus::Failed;
        self.error = Some(error.into());
    }

    /// Clear the container entirely and return to idle.
    ///
    /// Called on logout, on checkout confirmation, and whenever guest
    /// state has been handed over to the server.
    pub fn reset(&mut self) {
        self.saved_carts = None;
        self.status = SyncStatus::Idle;
        self.error = None;
    }

    /// Add one unit of a product to the active container.
    ///
    /// An existing line item gains one unit and has its captured price
    /// refreshed to the product's current price; otherwise a new line item
    /// with quantity 1 is appended. Creates the container if absent.
    pub fn add_or_increment(&mut self, product: &Product) {
        self.active_cart_or_default().add_or_increment(product);
    }

    /// Add one unit to an existing line item.
    pub fn increment(&mut self, product_id: &ProductId) -> MutationOutcome {
        match self.active_cart_mut().map(|c| c.increment_item(product_id)) {
            Some(true) => MutationOutcome::Applied,
            Some(false) | None => MutationOutcome::NotInCart,
        }
    }

    /// Remove one unit from an existing line item.
    ///
    /// Removing the last unit resets the whole container to empty rather
    /// than leaving a zero-quantity entry: the cart becomes empty, not the
    /// single item.
    pub fn decrement(&mut self, product_id: &ProductId) -> MutationOutcome {
        match self.active_cart_mut().and_then(|c| c.decrement_item(product_id)) {
            Some(0) => {
                self.reset();
                MutationOutcome::ContainerCleared
            }
            Some(_) => MutationOutcome::Applied,
            None => MutationOutcome::NotInCart,
        }
    }

    /// Drop a line item regardless of its quantity.
    ///
    /// Resets the container when the last line item goes.
    pub fn remove_item(&mut self, product_id: &ProductId) -> MutationOutcome {
        let Some(cart) = self.active_cart_mut() else {
            return MutationOutcome::NotInCart;
        };

        if cart.find_item(product_id).is_none() {
            return MutationOutcome::NotInCart;
        }

        cart.cart_items.retain(|i| &i.product_id != product_id);
        if cart.cart_items.is_empty() {
            self.reset();
            MutationOutcome::ContainerCleared
        } else {
            MutationOutcome::Applied
        }
    }

    fn active_cart_mut(&mut self) -> Option<&mut Cart> {
        self.saved_carts.as_mut().and_then(|carts| carts.first_mut())
    }

    fn active_cart_or_default(&mut self) -> &mut Cart {
        let carts = self.saved_carts.get_or_insert_with(|| vec![Cart::default()]);
        if carts.is_empty() {
            carts.push(Cart::default());
        }
        // Non-empty by construction
        #[allow(clippy::unwrap_used)]
        carts.first_mut().unwrap()
    }
}
