//! Cross-entity search, cached by `SearchCache`.

use axum::{
    extract::{Query, State},
    Json,
};
use tracing::debug;

use crate::api::AppState;
use crate::cache::SearchFilters;
use crate::error::{ApiError, Result};
use crate::models::{ApiResponse, SearchQuery, SearchResults};

const PRODUCTS: &str = "products";
const POSTS: &str = "posts";

fn wants(filters: &SearchFilters, kind: &str) -> bool {
    filters
        .types
        .as_ref()
        .map_or(true, |types| types.iter().any(|t| t == kind))
}

/// Handler for GET /api/search?q=&types=&category=&limit=&includeContent=
pub async fn search_handler(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<ApiResponse<SearchResults>>> {
    let filters = query.to_filters();
    if filters.query.is_empty() {
        return Err(ApiError::BadRequest("Search query is required".to_string()));
    }

    if let Some(cached) = state.search.get::<SearchResults>(&filters).await {
        return Ok(Json(ApiResponse::ok(cached)));
    }

    let results = run_search(&state, &filters).await?;
    debug!(query = %filters.query, total = results.total, "search computed");
    state.search.set(&filters, &results).await;

    Ok(Json(ApiResponse::ok(results)))
}

async fn run_search(state: &AppState, filters: &SearchFilters) -> Result<SearchResults> {
    let limit = filters.limit.map_or(usize::MAX, |l| l as usize);

    let mut products = Vec::new();
    if wants(filters, PRODUCTS) {
        products = state.repos.products.search(&filters.query).await?;
        if let Some(category) = &filters.category {
            products.retain(|p| p.category_slug.as_deref() == Some(category.as_str()));
        }
        products.truncate(limit);
    }

    let mut posts = Vec::new();
    // posts have no category, so a category filter excludes them
    if wants(filters, POSTS) && filters.category.is_none() {
        posts = state.repos.posts.search(&filters.query).await?;
        posts.retain(|p| p.published);
        posts.truncate(limit);
        if filters.include_content != Some(true) {
            for post in &mut posts {
                post.content.clear();
            }
        }
    }

    Ok(SearchResults::new(filters.query.clone(), products, posts))
}
