//! API Routes
//!
//! Configures the Axum router with every storefront endpoint.

use axum::{
    routing::{get, post, put},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    create_category, create_post, create_product, delete_category, delete_post, delete_product,
    get_category, get_post, get_product, health_handler, list_categories, list_posts,
    list_products, purge_handler, search_handler, search_products, stats_handler,
    update_category, update_post, update_product,
};
use super::AppState;

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `GET /health` - Health check
/// - `GET /api/search` - Cross-entity search (SearchCache)
/// - `GET /api/products`, `/api/products/search`, `/api/products/:id`
/// - `GET /api/products/categories`, `/api/products/categories/:slug`
/// - `GET|POST /api/posts`, `GET|PUT|DELETE /api/posts/:id`
/// - `POST /api/admin/products`, `PUT|DELETE /api/admin/products/:id`
/// - `POST /api/admin/products/categories`,
///   `PUT|DELETE /api/admin/products/categories/:slug`
/// - `GET /api/admin/cache/stats`, `POST /api/admin/cache/invalidate`
///
/// # Middleware
/// - CORS: Allows any origin
/// - Tracing: Logs all requests
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let public = Router::new()
        .route("/search", get(search_handler))
        .route("/products", get(list_products))
        .route("/products/search", get(search_products))
        .route("/products/categories", get(list_categories))
        .route("/products/categories/:slug", get(get_category))
        .route("/products/:id", get(get_product))
        .route("/posts", get(list_posts).post(create_post))
        .route(
            "/posts/:id",
            get(get_post).put(update_post).delete(delete_post),
        );

    let admin = Router::new()
        .route("/products", post(create_product))
        .route("/products/:id", put(update_product).delete(delete_product))
        .route("/products/categories", post(create_category))
        .route(
            "/products/categories/:slug",
            put(update_category).delete(delete_category),
        )
        .route("/cache/stats", get(stats_handler))
        .route("/cache/invalidate", post(purge_handler));

    Router::new()
        .route("/health", get(health_handler))
        .nest("/api", public.nest("/admin", admin))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
