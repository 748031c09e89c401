//! Product endpoints.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use tracing::info;

use super::{invalidate, validate_body, RawBody};
use crate::api::AppState;
use crate::cache::keys::{self, tags};
use crate::domain::Product;
use crate::error::{ApiError, Result};
use crate::models::{ApiResponse, DeletedResponse, ListProductsQuery, ProductSearchQuery};
use crate::persistence::ProductFilter;

/// Tags to drop when `product` changes: the catalog, the product itself
/// and its category.
fn product_tags(product: &Product) -> Vec<String> {
    let mut affected = vec![tags::PRODUCTS.to_string(), tags::product(&product.id)];
    if let Some(slug) = &product.category_slug {
        affected.push(tags::category(slug));
    }
    affected
}

/// Handler for GET /api/products
pub async fn list_products(
    State(state): State<AppState>,
    Query(query): Query<ListProductsQuery>,
) -> Result<Json<ApiResponse<Vec<Product>>>> {
    let category = query.category();
    let featured_only = query.featured_only();
    let key = keys::products_list(category, featured_only);

    let mut entry_tags = vec![tags::PRODUCTS.to_string()];
    if let Some(slug) = category {
        entry_tags.push(tags::category(slug));
    }

    let filter = ProductFilter {
        category: category.map(str::to_string),
        featured_only,
    };
    let repos = state.repos.clone();
    let products = state
        .tags
        .get_or_set_with_tags(
            &key,
            &entry_tags,
            || async move { repos.products.list(&filter).await.map_err(ApiError::from) },
            state.ttl.default,
        )
        .await?;

    Ok(Json(ApiResponse::ok(products)))
}

/// Handler for GET /api/products/search?q=
pub async fn search_products(
    State(state): State<AppState>,
    Query(query): Query<ProductSearchQuery>,
) -> Result<Json<ApiResponse<Vec<Product>>>> {
    let term = query.term();
    if term.is_empty() {
        return Err(ApiError::BadRequest("Search query is required".to_string()));
    }

    // one entry per query, so these stay off the shared `products` tag
    let repos = state.repos.clone();
    let lookup = term.clone();
    let products = state
        .cache
        .get_or_set(
            &keys::product_search(&term),
            || async move { repos.products.search(&lookup).await.map_err(ApiError::from) },
            state.ttl.search,
        )
        .await?;

    Ok(Json(ApiResponse::ok(products)))
}

/// Handler for GET /api/products/:id
pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Product>>> {
    let repos = state.repos.clone();
    let lookup = id.clone();
    let product = state
        .tags
        .get_or_set_with_tags(
            &keys::product_detail(&id),
            &[tags::PRODUCTS.to_string(), tags::product(&id)],
            || async move { repos.products.get(&lookup).await.map_err(ApiError::from) },
            state.ttl.default,
        )
        .await?;

    Ok(Json(ApiResponse::ok(product)))
}

/// Handler for POST /api/admin/products
pub async fn create_product(
    State(state): State<AppState>,
    body: RawBody,
) -> Result<(StatusCode, Json<ApiResponse<Product>>)> {
    let input = validate_body(&state.validators.product, body)?;
    let product = state.repos.products.create(input).await?;
    info!(id = %product.id, slug = %product.slug, "product created");

    invalidate(&state, &product_tags(&product), true).await;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(product))))
}

/// Handler for PUT /api/admin/products/:id
///
/// Invalidates both the old and the new category when a product moves.
pub async fn update_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: RawBody,
) -> Result<Json<ApiResponse<Product>>> {
    let input = validate_body(&state.validators.product, body)?;
    let updated = state.repos.products.update(&id, input).await?;
    info!(id = %id, "product updated");

    let mut affected = product_tags(&updated.after);
    for tag in product_tags(&updated.before) {
        if !affected.contains(&tag) {
            affected.push(tag);
        }
    }
    invalidate(&state, &affected, true).await;

    Ok(Json(ApiResponse::ok(updated.after)))
}

/// Handler for DELETE /api/admin/products/:id
pub async fn delete_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<DeletedResponse>>> {
    let product = state.repos.products.delete(&id).await?;
    info!(id = %id, "product deleted");

    invalidate(&state, &product_tags(&product), true).await;
    Ok(Json(ApiResponse::ok(DeletedResponse::new("Product", id))))
}
