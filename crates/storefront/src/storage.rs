//! Session-scoped persistence.
//!
//! Identity, last-login timestamp, catalog state, and the guest cart are
//! snapshotted as JSON into a [`SessionStorage`], so a session reload
//! resumes where the visitor left off. The search keyword is transient
//! and never persisted (see `ProductsState`); cart fetch status resets to
//! idle so a restored session re-fetches from the server on login.

use std::collections::HashMap;

use thiserror::Error;

use crate::api::types::Cart;
use crate::state::products::ProductsState;
use crate::state::session::SessionState;
use crate::state::Store;

/// Storage keys.
pub mod keys {
    /// Key for the session (identity + last login) snapshot.
    pub const SESSION: &str = "kade.session";

    /// Key for the catalog snapshot.
    pub const PRODUCTS: &str = "kade.products";

    /// Key for the guest cart snapshot.
    pub const CARTS: &str = "kade.carts";
}

/// Errors that can occur during persistence.
#[derive(Debug, Error)]
pub enum StorageError {
    /// A snapshot failed to serialize or deserialize.
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

/// A session-scoped string key/value store.
///
/// Mirrors the storage area a browser session offers: values survive a
/// reload within the session but are gone when the session ends.
pub trait SessionStorage {
    /// Read a stored value.
    fn load(&self, key: &str) -> Option<String>;

    /// Write a value, replacing any previous one.
    fn save(&mut self, key: &str, value: String);

    /// Remove a stored value.
    fn remove(&mut self, key: &str);
}

/// In-memory session storage.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: HashMap<String, String>,
}

impl MemoryStorage {
    /// Create an empty storage.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStorage for MemoryStorage {
    fn load(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn save(&mut self, key: &str, value: String) {
        self.entries.insert(key.to_string(), value);
    }

    fn remove(&mut self, key: &str) {
        self.entries.remove(key);
    }
}

/// Snapshot the store into session storage.
///
/// # Errors
///
/// Returns `StorageError::Serde` if a snapshot fails to serialize.
pub fn persist(store: &Store, storage: &mut dyn SessionStorage) -> Result<(), StorageError> {
    let state = store.state();

    storage.save(keys::SESSION, serde_json::to_string(&state.session)?);
    storage.save(keys::PRODUCTS, serde_json::to_string(&state.products)?);

    match state.cart.saved_carts() {
        Some(carts) => storage.save(keys::CARTS, serde_json::to_string(carts)?),
        None => storage.remove(keys::CARTS),
    }

    Ok(())
}

/// Restore a store from session storage.
///
/// Missing keys leave the corresponding state at its default; corrupt
/// snapshots fail rather than half-restoring.
///
/// # Errors
///
/// Returns `StorageError::Serde` if a stored snapshot fails to parse.
pub fn restore(store: &mut Store, storage: &dyn SessionStorage) -> Result<(), StorageError> {
    let session: Option<SessionState> = storage
        .load(keys::SESSION)
        .map(|raw| serde_json::from_str(&raw))
        .transpose()?;
    let products: Option<ProductsState> = storage
        .load(keys::PRODUCTS)
        .map(|raw| serde_json::from_str(&raw))
        .transpose()?;
    let carts: Option<Vec<Cart>> = storage
        .load(keys::CARTS)
        .map(|raw| serde_json::from_str(&raw))
        .transpose()?;

    store.update(|state| {
        if let Some(session) = session {
            state.session = session;
        }
        if let Some(products) = products {
            state.products = products;
        }
        if let Some(carts) = carts {
            state.cart.set_carts(carts);
        }
    });

    Ok(())
}
