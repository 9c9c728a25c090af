//! Unified error handling for the storefront.
//!
//! Fetch failures for the cart mirror and the catalog are recorded in
//! state (they gate rendering); this type covers the operations that must
//! surface an error directly to the caller, such as login.

use thiserror::Error;

use crate::api::ApiError;
use crate::config::ConfigError;
use crate::storage::StorageError;

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Remote service call failed.
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    /// Configuration loading failed.
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// Session persistence failed.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// No user matched the supplied credentials.
    #[error("Invalid username or password")]
    InvalidCredentials,

    /// The remote service returned a record missing a required field.
    #[error("Malformed record from service: {0}")]
    MalformedRecord(&'static str),
}

/// Result type alias for `StoreError`.
pub type Result<T> = std::result::Result<T, StoreError>;
