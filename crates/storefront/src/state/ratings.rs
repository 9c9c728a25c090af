//! Per-user rating record cache.
//!
//! The record is fetched lazily once an identity exists; the UI uses it to
//! hide the rate control for products the user has already rated.

use kade_core::ProductId;

use crate::api::types::UserRating;

/// Cached per-user rating record.
#[derive(Debug, Default)]
pub struct RatingsState {
    record: Option<UserRating>,
}

impl RatingsState {
    /// The cached record, if any.
    #[must_use]
    pub const fn record(&self) -> Option<&UserRating> {
        self.record.as_ref()
    }

    /// Replace the cached record.
    pub fn set_record(&mut self, record: UserRating) {
        self.record = Some(record);
    }

    /// Drop the cached record (on login/logout).
    pub fn clear(&mut self) {
        self.record = None;
    }

    /// Whether the current user has already rated the given product.
    #[must_use]
    pub fn has_rated(&self, product_id: &ProductId) -> bool {
        self.record
            .as_ref()
            .is_some_and(|r| r.has_rated(product_id))
    }
}
