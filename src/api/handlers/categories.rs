//! Category endpoints.
//!
//! Category entries carry the `products` tag as well: their stats count
//! products, so any catalog write must refresh them.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use tracing::info;

use super::{invalidate, validate_body, RawBody};
use crate::api::AppState;
use crate::cache::keys::{self, tags};
use crate::domain::CategoryRecord;
use crate::error::{ApiError, Result};
use crate::models::{ApiResponse, DeletedResponse};

/// Handler for GET /api/products/categories
///
/// Active categories only.
pub async fn list_categories(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<CategoryRecord>>>> {
    let repos = state.repos.clone();
    let categories = state
        .tags
        .get_or_set_with_tags(
            &keys::categories_list(),
            &[tags::CATEGORIES, tags::PRODUCTS],
            || async move {
                let all = repos.categories.list().await.map_err(ApiError::from)?;
                Ok::<_, ApiError>(all.into_iter().filter(|c| c.is_active).collect::<Vec<_>>())
            },
            state.ttl.category,
        )
        .await?;

    Ok(Json(ApiResponse::ok(categories)))
}

/// Handler for GET /api/products/categories/:slug
pub async fn get_category(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<ApiResponse<CategoryRecord>>> {
    let repos = state.repos.clone();
    let lookup = slug.clone();
    let category = state
        .tags
        .get_or_set_with_tags(
            &keys::category_detail(&slug),
            &[
                tags::CATEGORIES.to_string(),
                tags::PRODUCTS.to_string(),
                tags::category(&slug),
            ],
            || async move { repos.categories.get(&lookup).await.map_err(ApiError::from) },
            state.ttl.category,
        )
        .await?;

    Ok(Json(ApiResponse::ok(category)))
}

/// Handler for POST /api/admin/products/categories
pub async fn create_category(
    State(state): State<AppState>,
    body: RawBody,
) -> Result<(StatusCode, Json<ApiResponse<CategoryRecord>>)> {
    let input = validate_body(&state.validators.category, body)?;
    let category = state.repos.categories.create(input).await?;
    info!(slug = %category.slug, "category created");

    invalidate(&state, &[tags::CATEGORIES.to_string()], false).await;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(category))))
}

/// Handler for PUT /api/admin/products/categories/:slug
pub async fn update_category(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    body: RawBody,
) -> Result<Json<ApiResponse<CategoryRecord>>> {
    let input = validate_body(&state.validators.category, body)?;
    let updated = state.repos.categories.update(&slug, input).await?;
    info!(slug = %slug, new_slug = %updated.after.slug, "category updated");

    let mut affected = vec![tags::CATEGORIES.to_string(), tags::category(&slug)];
    if updated.after.slug != slug {
        affected.push(tags::category(&updated.after.slug));
    }
    invalidate(&state, &affected, false).await;

    Ok(Json(ApiResponse::ok(updated.after)))
}

/// Handler for DELETE /api/admin/products/categories/:slug
pub async fn delete_category(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<ApiResponse<DeletedResponse>>> {
    state.repos.categories.delete(&slug).await?;
    info!(slug = %slug, "category deleted");

    invalidate(
        &state,
        &[tags::CATEGORIES.to_string(), tags::category(&slug)],
        false,
    )
    .await;
    Ok(Json(ApiResponse::ok(DeletedResponse::new("Category", slug))))
}
