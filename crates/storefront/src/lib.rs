//! Kade Storefront library.
//!
//! A client-side storefront: product browsing, cart management, user
//! login/registration, and product rating, all backed by a remote REST
//! service and held in client-local state.
//!
//! The interesting part is cart reconciliation: an anonymous visitor's cart
//! lives only in local memory; once an identity exists the cart is mirrored
//! to the remote service on every mutation. [`controller::Controller`]
//! decides which side a mutation targets and folds guest state into server
//! state at registration time.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod config;
pub mod controller;
pub mod error;
pub mod state;
pub mod storage;
