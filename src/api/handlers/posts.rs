//! Blog post endpoints.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use tracing::info;

use super::{invalidate, validate_body, RawBody};
use crate::api::AppState;
use crate::cache::keys::{self, tags};
use crate::domain::Post;
use crate::error::{ApiError, Result};
use crate::models::{ApiResponse, DeletedResponse};

fn post_tags(id: &str) -> Vec<String> {
    vec![tags::POSTS.to_string(), tags::post(id)]
}

/// Handler for GET /api/posts
pub async fn list_posts(State(state): State<AppState>) -> Result<Json<ApiResponse<Vec<Post>>>> {
    let repos = state.repos.clone();
    let posts = state
        .tags
        .get_or_set_with_tags(
            &keys::posts_list(),
            &[tags::POSTS],
            || async move { repos.posts.list().await.map_err(ApiError::from) },
            state.ttl.default,
        )
        .await?;

    Ok(Json(ApiResponse::ok(posts)))
}

/// Handler for GET /api/posts/:id
pub async fn get_post(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Post>>> {
    let repos = state.repos.clone();
    let lookup = id.clone();
    let post = state
        .tags
        .get_or_set_with_tags(
            &keys::post_detail(&id),
            &post_tags(&id),
            || async move { repos.posts.get(&lookup).await.map_err(ApiError::from) },
            state.ttl.default,
        )
        .await?;

    Ok(Json(ApiResponse::ok(post)))
}

/// Handler for POST /api/posts
pub async fn create_post(
    State(state): State<AppState>,
    body: RawBody,
) -> Result<(StatusCode, Json<ApiResponse<Post>>)> {
    let input = validate_body(&state.validators.post, body)?;
    let post = state.repos.posts.create(input).await?;
    info!(id = %post.id, slug = %post.slug, "post created");

    invalidate(&state, &post_tags(&post.id), true).await;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(post))))
}

/// Handler for PUT /api/posts/:id
pub async fn update_post(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: RawBody,
) -> Result<Json<ApiResponse<Post>>> {
    let input = validate_body(&state.validators.post, body)?;
    let updated = state.repos.posts.update(&id, input).await?;
    info!(id = %id, "post updated");

    invalidate(&state, &post_tags(&id), true).await;
    Ok(Json(ApiResponse::ok(updated.after)))
}

/// Handler for DELETE /api/posts/:id
pub async fn delete_post(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<DeletedResponse>>> {
    state.repos.posts.delete(&id).await?;
    info!(id = %id, "post deleted");

    invalidate(&state, &post_tags(&id), true).await;
    Ok(Json(ApiResponse::ok(DeletedResponse::new("Post", id))))
}
