//! Reconciliation controller.
//!
//! Every cart mutation lands here first. The controller inspects session
//! state to pick a target: unauthenticated mutations change guest state in
//! local memory only; authenticated mutations compute the new container
//! value, apply it locally, and mirror it to the remote service.
//!
//! The login transition is the one real state machine in the client:
//! Anonymous → Authenticating → Authenticated-Unmerged → Authenticated-Synced.
//! Ordinary login never merges guest items into a server cart - the guest
//! container is discarded. The single narrow path that preserves guest
//! progress is registration: a guest container that was never bound to a
//! user gets the new user's id attached and is persisted as that user's
//! first cart.
//!
//! Remote mutation failures are logged and dropped: the accepted model is
//! last-writer-wins against the server state re-fetched at the next login
//! event, not a compensating rollback.

use tracing::{info, instrument, warn};
use uuid::Uuid;

use kade_core::{ProductId, UserId};

use crate::api::types::{Cart, Order, Product, RatedProduct, User, UserRating};
use crate::api::{ApiClient, ApiError, Credentials};
use crate::error::{Result, StoreError};
use crate::state::cart::MutationOutcome;
use crate::state::session::Identity;
use crate::state::Store;

/// Orchestrates mutations against guest state and the remote service.
pub struct Controller {
    api: ApiClient,
    store: Store,
}

impl Controller {
    /// Create a controller with an empty store.
    #[must_use]
    pub fn new(api: ApiClient) -> Self {
        Self::with_store(api, Store::new())
    }

    /// Create a controller around an existing (e.g., restored) store.
    #[must_use]
    pub const fn with_store(api: ApiClient, store: Store) -> Self {
        Self { api, store }
    }

    /// Read-only view of the store.
    #[must_use]
    pub const fn store(&self) -> &Store {
        &self.store
    }

    /// Mutable access to the store, for subscriptions and restores.
    pub const fn store_mut(&mut self) -> &mut Store {
        &mut self.store
    }

    // =========================================================================
    // Catalog
    // =========================================================================

    /// Fetch the catalog into state.
    ///
    /// A failed fetch is recorded in state rather than returned; the
    /// status field gates rendering.
    #[instrument(skip(self))]
    pub async fn load_products(&mut self) {
        match self.api.get_products().await {
            Ok(products) => self.store.update(|s| s.products.set_products(products)),
            Err(e) => {
                warn!(error = %e, "catalog fetch failed");
                self.store.update(|s| s.products.mark_failed(e.to_string()));
            }
        }
    }

    /// Set the catalog search keyword.
    pub fn set_search_keyword(&mut self, keyword: impl Into<String>) {
        let keyword = keyword.into();
        self.store.update(|s| s.products.set_search_keyword(keyword));
    }

    // =========================================================================
    // Session
    // =========================================================================

    /// Log in with username and password.
    ///
    /// On success the identity replaces any current one, the guest cart is
    /// discarded (no item merge - see module docs), and the user's saved
    /// carts are fetched.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::InvalidCredentials` when no user matches, or
    /// an `Api` error for transport failures.
    #[instrument(skip(self, credentials), fields(username = %credentials.username))]
    pub async fn login(&mut self, credentials: Credentials) -> Result<()> {
        let user = self.api.get_user(&credentials).await.map_err(|e| match e {
            ApiError::NotFound { .. } => StoreError::InvalidCredentials,
            other => StoreError::Api(other),
        })?;

        let identity = identity_from(user)?;
        info!(user_id = %identity.id, "login succeeded");

        self.store.login(identity);
        self.sync_cart().await;
        Ok(())
    }

    /// Register a new user and log them in.
    ///
    /// A client-generated id is assigned before the POST, matching how
    /// the service expects user records. If the visitor had a guest cart
    /// that was never bound to a user, it is attached to the new identity
    /// and persisted - the one path that carries guest progress across
    /// the login boundary.
    ///
    /// # Errors
    ///
    /// Returns an `Api` error if registration fails; the guest cart is
    /// left untouched in that case.
    #[instrument(skip(self, user), fields(username = %user.username))]
    pub async fn register(&mut self, user: User) -> Result<()> {
        let id = UserId::new(Uuid::new_v4().to_string());
        let record = User {
            id: Some(id.clone()),
            ..user
        };

        self.api.create_user(&record).await?;

        // Capture the guest cart before login discards it
        let guest_cart = self.store.state().cart.active_cart().cloned();

        let identity = identity_from(record)?;
        info!(user_id = %identity.id, "registration succeeded");
        self.store.login(identity);

        if let Some(cart) = guest_cart {
            if cart.user_id.is_none() {
                let attached = Cart {
                    user_id: Some(id),
                    ..cart
                };
                if let Err(e) = self.api.create_cart(&attached).await {
                    warn!(error = %e, "failed to attach guest cart at registration");
                }
            }
        }

        self.sync_cart().await;
        Ok(())
    }

    /// Log out, clearing identity and all cart/order state.
    pub fn logout(&mut self) {
        self.store.logout();
        self.store.update(|s| s.orders.clear());
    }

    /// Fetch the authenticated user's saved carts into state.
    ///
    /// No fetch is attempted without an identity id, and a fetch that
    /// already succeeded is not repeated - only a new login event (which
    /// resets cart state) re-triggers it. A failed fetch stays failed.
    #[instrument(skip(self))]
    pub async fn sync_cart(&mut self) {
        let Some(user_id) = self.store.state().session.user_id().cloned() else {
            return;
        };
        if self.store.state().cart.status().is_succeeded() {
            return;
        }

        self.store.update(|s| s.cart.mark_loading());

        match self.api.get_saved_carts(&user_id).await {
            Ok(carts) => self.store.update(|s| {
                s.cart.set_carts(carts);
                s.cart.mark_succeeded();
            }),
            Err(e) => {
                warn!(error = %e, %user_id, "saved cart fetch failed");
                self.store.update(|s| s.cart.mark_failed(e.to_string()));
            }
        }
    }

    // =========================================================================
    // Cart mutations
    // =========================================================================

    /// Add one unit of a product to the cart.
    ///
    /// Guest: local mutation only. Authenticated: the new container value
    /// is applied locally, then persisted - an update when the container
    /// is already bound to a user, a create for the first-ever mutation.
    #[instrument(skip(self, product), fields(product_id = %product.id))]
    pub async fn add_to_cart(&mut self, product: &Product) {
        let Some(user_id) = self.store.state().session.user_id().cloned() else {
            self.store.update(|s| s.cart.add_or_increment(product));
            return;
        };

        let previous = self.store.state().cart.active_cart().cloned();
        let previously_bound = previous
            .as_ref()
            .is_some_and(|c| c.user_id.is_some());

        let mut updated = previous.unwrap_or_default();
        updated.add_or_increment(product);
        updated.user_id = Some(user_id);

        // Optimistic: local state reflects the intended end state first
        self.store.update(|s| s.cart.replace_active(updated.clone()));

        let result = if previously_bound {
            self.api.update_cart(&updated).await
        } else {
            self.api.create_cart(&updated).await
        };

        match result {
            // The create response carries the server-assigned container id
            Ok(saved) => self.store.update(|s| s.cart.replace_active(saved)),
            Err(e) => warn!(error = %e, "cart persist failed; keeping local state"),
        }
    }

    /// Add one unit to an existing line item.
    #[instrument(skip(self))]
    pub async fn increment_item(&mut self, product_id: &ProductId) {
        if !self.store.state().session.is_authenticated() {
            let outcome = self.store.update(|s| s.cart.increment(product_id));
            if outcome == MutationOutcome::NotInCart {
                warn!(%product_id, "product not found in cart");
            }
            return;
        }

        let Some(mut updated) = self.store.state().cart.active_cart().cloned() else {
            warn!(%product_id, "increment on empty cart ignored");
            return;
        };
        if !updated.increment_item(product_id) {
            warn!(%product_id, "product not found in cart");
            return;
        }

        self.store.update(|s| s.cart.replace_active(updated.clone()));
        if let Err(e) = self.api.update_cart(&updated).await {
            warn!(error = %e, "cart update failed; keeping local state");
        }
    }

    /// Remove one unit from an existing line item.
    ///
    /// Removing the last unit empties the cart: locally the container
    /// resets, and for an authenticated user the persisted container is
    /// deleted outright rather than updated to an empty item list.
    #[instrument(skip(self))]
    pub async fn decrement_item(&mut self, product_id: &ProductId) {
        if !self.store.state().session.is_authenticated() {
            let outcome = self.store.update(|s| s.cart.decrement(product_id));
            if outcome == MutationOutcome::NotInCart {
                warn!(%product_id, "product not found in cart");
            }
            return;
        }

        let Some(cart) = self.store.state().cart.active_cart().cloned() else {
            warn!(%product_id, "decrement on empty cart ignored");
            return;
        };
        let Some(item) = cart.find_item(product_id) else {
            warn!(%product_id, "product not found in cart");
            return;
        };

        if item.quantity <= 1 {
            self.store.update(|s| s.cart.reset());
            if let Some(id) = cart.id {
                if let Err(e) = self.api.delete_cart(&id).await {
                    warn!(error = %e, "cart delete failed; keeping local state");
                }
            }
            return;
        }

        let mut updated = cart;
        updated.decrement_item(product_id);

        self.store.update(|s| s.cart.replace_active(updated.clone()));
        if let Err(e) = self.api.update_cart(&updated).await {
            warn!(error = %e, "cart update failed; keeping local state");
        }
    }

    /// Drop a line item regardless of quantity.
    #[instrument(skip(self))]
    pub async fn remove_item(&mut self, product_id: &ProductId) {
        if !self.store.state().session.is_authenticated() {
            self.store.update(|s| s.cart.remove_item(product_id));
            return;
        }

        let Some(cart) = self.store.state().cart.active_cart().cloned() else {
            return;
        };
        if cart.find_item(product_id).is_none() {
            warn!(%product_id, "product not found in cart");
            return;
        }

        let mut updated = cart;
        updated
            .cart_items
            .retain(|i| &i.product_id != product_id);

        self.store.update(|s| s.cart.replace_active(updated.clone()));
        if let Err(e) = self.api.update_cart(&updated).await {
            warn!(error = %e, "cart update failed; keeping local state");
        }
    }

    /// Confirm checkout.
    ///
    /// No payment is processed. A guest's cart becomes a local order
    /// record; an authenticated user's persisted cart is deleted. Either
    /// way the cart resets to empty.
    #[instrument(skip(self))]
    pub async fn checkout(&mut self) {
        let Some(cart) = self.store.state().cart.active_cart().cloned() else {
            return;
        };

        if self.store.state().session.is_authenticated() {
            self.store.update(|s| s.cart.reset());
            if let Some(id) = cart.id {
                if let Err(e) = self.api.delete_cart(&id).await {
                    warn!(error = %e, "cart delete at checkout failed");
                }
            }
        } else {
            let order = Order {
                id: None,
                user_id: self.store.state().session.user_id().cloned(),
                order_items: cart.cart_items,
            };
            self.store.update(|s| {
                s.orders.place(order);
                s.cart.reset();
            });
        }
    }

    // =========================================================================
    // Ratings
    // =========================================================================

    /// Fetch the current user's rating record into state.
    ///
    /// A user who has never rated anything has no record; that absence is
    /// what tells `rate_product` to create one lazily.
    #[instrument(skip(self))]
    pub async fn load_user_rating(&mut self) {
        let Some(user_id) = self.store.state().session.user_id().cloned() else {
            return;
        };

        match self.api.get_user_rating(&user_id).await {
            Ok(record) => self.store.update(|s| s.ratings.set_record(record)),
            Err(ApiError::NotFound { .. }) => {
                self.store.update(|s| s.ratings.clear());
            }
            Err(e) => warn!(error = %e, "user rating fetch failed"),
        }
    }

    /// Submit a rating for a product.
    ///
    /// Two remote steps: the product's aggregates are updated first, and
    /// only on success is the per-user record touched (updated in place,
    /// or created and re-fetched for its generated id). A failure in the
    /// second step leaves the aggregates already bumped - there is no
    /// compensating rollback.
    ///
    /// The per-user record is appended without deduplication by product;
    /// repeated submissions inflate the aggregates.
    #[instrument(skip(self))]
    pub async fn rate_product(&mut self, product_id: &ProductId, rating: f64) {
        let Some(user_id) = self.store.state().session.user_id().cloned() else {
            warn!("rating submission requires a logged-in user");
            return;
        };
        if !(0.0..=5.0).contains(&rating) {
            warn!(rating, "rating outside [0, 5] ignored");
            return;
        }
        let Some(product) = self.store.state().products.product(product_id).cloned() else {
            warn!(%product_id, "rating for unknown product ignored");
            return;
        };

        let updated = product.with_added_rating(rating);
        let saved = match self.api.update_product_rating(&updated).await {
            Ok(saved) => saved,
            Err(e) => {
                warn!(error = %e, "product rating update failed; skipping user record");
                return;
            }
        };
        self.store.update(|s| s.products.update_product(saved));

        let entry = RatedProduct {
            product_id: product_id.clone(),
            rating,
        };

        if let Some(mut record) = self.store.state().ratings.record().cloned() {
            record.rated_products.push(entry);
            match self.api.update_user_rating(&record).await {
                Ok(saved) => self.store.update(|s| s.ratings.set_record(saved)),
                Err(e) => warn!(error = %e, "user rating update failed"),
            }
        } else {
            let record = UserRating {
                id: None,
                user_id: user_id.clone(),
                rated_products: vec![entry],
            };
            if let Err(e) = self.api.create_user_rating(&record).await {
                warn!(error = %e, "user rating create failed");
                return;
            }
            // Re-fetch for the server-generated record id
            match self.api.get_user_rating(&user_id).await {
                Ok(saved) => self.store.update(|s| s.ratings.set_record(saved)),
                Err(e) => warn!(error = %e, "user rating re-fetch failed"),
            }
        }
    }
}

/// Build an identity from a user record.
fn identity_from(user: User) -> Result<Identity> {
    let id = user.id.ok_or(StoreError::MalformedRecord("user id"))?;
    Ok(Identity {
        id,
        username: user.username,
        email: user.email,
    })
}
