//! Storefront Cache - caching and validation layer of a storefront admin API
//!
//! Read-through JSON caching with tag-based invalidation and search result
//! caching over a TTL key-value store, plus a validation pipeline with a
//! hand-written fallback for admin payloads.

pub mod api;
pub mod cache;
pub mod config;
pub mod domain;
pub mod error;
pub mod kv;
pub mod models;
pub mod persistence;
pub mod tasks;
pub mod validation;

pub use api::{create_router, AppState};
pub use config::Config;
pub use tasks::spawn_cleanup_task;
