//! API Handlers
//!
//! One module per resource. The helpers here hold the parts every mutation
//! shares: reading the raw body, running a validation pipeline, and
//! invalidating after a successful write.

pub mod categories;
pub mod posts;
pub mod products;
pub mod search;
pub mod system;

use axum::{extract::rejection::JsonRejection, Json};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::info;

use super::AppState;
use crate::cache::keys::{tags, PRODUCT_SEARCH_PREFIX};
use crate::error::{ApiError, Result};
use crate::validation::ValidationPipeline;

pub use categories::{
    create_category, delete_category, get_category, list_categories, update_category,
};
pub use posts::{create_post, delete_post, get_post, list_posts, update_post};
pub use products::{
    create_product, delete_product, get_product, list_products, search_products, update_product,
};
pub use search::search_handler;
pub use system::{health_handler, purge_handler, stats_handler};

/// Body of a mutation request as raw JSON.
pub type RawBody = std::result::Result<Json<Value>, JsonRejection>;

/// Unwraps the body, turning malformed JSON into a 400.
pub(crate) fn read_body<T>(body: std::result::Result<Json<T>, JsonRejection>) -> Result<T> {
    body.map(|Json(value)| value)
        .map_err(|rejection| ApiError::BadRequest(rejection.body_text()))
}

/// Runs `pipeline` over the request body.
pub(crate) fn validate_body<T: DeserializeOwned>(
    pipeline: &ValidationPipeline<T>,
    body: RawBody,
) -> Result<T> {
    let payload = read_body(body)?;
    pipeline
        .validate(payload)?
        .into_result()
        .map_err(ApiError::Validation)
}

/// Drops everything tagged with any of `affected`. Product search entries
/// are untagged and go by prefix whenever `products` is among them.
pub(crate) async fn drop_tagged(state: &AppState, affected: &[String]) -> usize {
    let mut removed = state.tags.invalidate_by_tags(affected).await;
    if affected.iter().any(|tag| tag == tags::PRODUCTS) {
        removed += state.cache.delete_by_prefix(PRODUCT_SEARCH_PREFIX).await;
    }
    removed
}

/// `drop_tagged`, plus every cached search when `flush_search` is set.
pub(crate) async fn invalidate(state: &AppState, affected: &[String], flush_search: bool) {
    let removed = drop_tagged(state, affected).await;
    let searches = if flush_search {
        state.search.invalidate(None).await
    } else {
        0
    };
    info!(tags = ?affected, removed, searches, "cache invalidated after write");
}
