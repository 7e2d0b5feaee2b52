//! Food Delivery API Library
//!
//! Exposes the router, auth pipeline and store for the binary and integration tests.

pub mod api;
pub mod auth;
pub mod config;
pub mod middleware;
pub mod models;
pub mod store;
