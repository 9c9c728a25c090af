//! Product browsing state.
//!
//! Holds the fetched catalog and the search keyword. The keyword is
//! transient: it is skipped during persistence so a session reload starts
//! with an unfiltered catalog.

use serde::{Deserialize, Serialize};

use kade_core::{ProductId, SyncStatus};

use crate::api::types::Product;

/// Catalog state.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ProductsState {
    products: Vec<Product>,
    #[serde(skip)]
    search_keyword: String,
    status: SyncStatus,
    error: Option<String>,
}

impl ProductsState {
    /// All fetched products.
    #[must_use]
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    /// Look up a fetched product by id.
    #[must_use]
    pub fn product(&self, id: &ProductId) -> Option<&Product> {
        self.products.iter().find(|p| &p.id == id)
    }

    /// Replace the catalog with a fetch result.
    pub fn set_products(&mut self, products: Vec<Product>) {
        self.products = products;
        self.status = SyncStatus::Succeeded;
        self.error = None;
    }

    /// Replace a single catalog entry (e.g., after a rating update).
    ///
    /// Unknown products are ignored; the next full fetch picks them up.
    pub fn update_product(&mut self, product: Product) {
        if let Some(existing) = self.products.iter_mut().find(|p| p.id == product.id) {
            *existing = product;
        }
    }

    /// Record a failed catalog fetch.
    pub fn mark_failed(&mut self, error: impl Into<String>) {
        self.status = SyncStatus::Failed;
        self.error = Some(error.into());
    }

    /// Current search keyword.
    #[must_use]
    pub fn search_keyword(&self) -> &str {
        &self.search_keyword
    }

    /// Set the search keyword.
    pub fn set_search_keyword(&mut self, keyword: impl Into<String>) {
        self.search_keyword = keyword.into();
    }

    /// Products whose name contains the search keyword, case-insensitive.
    ///
    /// An empty keyword filters nothing.
    #[must_use]
    pub fn filtered(&self) -> Vec<&Product> {
        if self.search_keyword.is_empty() {
            return self.products.iter().collect();
        }
        let needle = self.search_keyword.to_lowercase();
        self.products
            .iter()
            .filter(|p| p.name.to_lowercase().contains(&needle))
            .collect()
    }

    /// Fetch status of the catalog.
    #[must_use]
    pub const fn status(&self) -> SyncStatus {
        self.status
    }

    /// Error message from the last failed fetch.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn product(id: &str, name: &str) -> Product {
        Product {
            id: ProductId::new(id),
            name: name.to_string(),
            price: Decimal::new(100, 0),
            total_rating_score: 0.0,
            total_ratings: 0,
            quantity: 5,
        }
    }

    #[test]
    fn test_filter_is_case_insensitive() {
        let mut state = ProductsState::default();
        state.set_products(vec![
            product("p-1", "red rice"),
            product("p-2", "Coconut"),
            product("p-3", "rice flour"),
        ]);

        state.set_search_keyword("RICE");
        let names: Vec<&str> = state.filtered().iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["red rice", "rice flour"]);

        state.set_search_keyword("");
        assert_eq!(state.filtered().len(), 3);
    }

    #[test]
    fn test_search_keyword_excluded_from_persistence() {
        let mut state = ProductsState::default();
        state.set_products(vec![product("p-1", "red rice")]);
        state.set_search_keyword("rice");

        let json = serde_json::to_string(&state).expect("serialize");
        let reloaded: ProductsState = serde_json::from_str(&json).expect("deserialize");

        assert_eq!(reloaded.products().len(), 1);
        assert_eq!(reloaded.search_keyword(), "");
        assert_eq!(reloaded.status(), SyncStatus::Succeeded);
    }
}
