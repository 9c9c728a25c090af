//! Kade Core - Shared types library.
//!
//! This crate provides common types used across all Kade components:
//! - `storefront` - Client-side storefront library and demo binary
//! - `integration-tests` - End-to-end tests against a mock remote service
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no HTTP clients. This keeps
//! it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, prices, and sync statuses

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
