//! API Module
//!
//! HTTP handlers and routing for the storefront API.
//!
//! Reads go through the cache; admin mutations run validate, persist, then
//! invalidate, in that order. A mutation that fails before persisting
//! leaves the cache untouched.

pub mod handlers;
pub mod routes;
mod state;

pub use routes::create_router;
pub use state::{select_store, AppState, CacheTtls};
