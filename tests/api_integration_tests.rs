//! Integration Tests for API Endpoints
//!
//! Drives the full router with `oneshot` requests and checks both the HTTP
//! responses and what the cache holds afterwards.

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use storefront_cache::{
    api::{create_router, AppState},
    cache::{keys, SearchFilters},
    domain::{Product, ProductInput},
    kv::MemoryKv,
    models::SearchResults,
    persistence::{
        MemoryCatalog, ProductFilter, ProductRepository, RepoError, RepoResult, Repositories,
        Updated,
    },
    Config,
};
use tower::ServiceExt;

// == Helper Functions ==

fn test_state() -> AppState {
    AppState::from_config(&Config::default())
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json");
    let request = match body {
        Some(body) => builder.body(Body::from(body.to_string())).unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

fn product_payload(name: &str, slug: &str, category: &str) -> Value {
    json!({
        "name": name,
        "slug": slug,
        "description": "Pressure-relieving foam layers.",
        "price": "499",
        "category": category,
        "images": ["front.jpg"],
        "variants": [{"name": "Queen", "sku": "Q-1", "price": 499, "stock": 4}]
    })
}

/// Reads delegate to memory; every write fails as if the database were down.
struct ReadOnlyProducts {
    inner: MemoryCatalog,
}

#[async_trait]
impl ProductRepository for ReadOnlyProducts {
    async fn list(&self, filter: &ProductFilter) -> RepoResult<Vec<Product>> {
        ProductRepository::list(&self.inner, filter).await
    }

    async fn get(&self, id: &str) -> RepoResult<Product> {
        ProductRepository::get(&self.inner, id).await
    }

    async fn search(&self, query: &str) -> RepoResult<Vec<Product>> {
        ProductRepository::search(&self.inner, query).await
    }

    async fn create(&self, _input: ProductInput) -> RepoResult<Product> {
        Err(RepoError::Backend("connection reset by peer".to_string()))
    }

    async fn update(&self, _id: &str, _input: ProductInput) -> RepoResult<Updated<Product>> {
        Err(RepoError::Backend("connection reset by peer".to_string()))
    }

    async fn delete(&self, _id: &str) -> RepoResult<Product> {
        Err(RepoError::Backend("connection reset by peer".to_string()))
    }
}

// == Mutation and Invalidation ==

#[tokio::test]
async fn test_product_update_invalidates_cached_reads() {
    let state = test_state();
    let app = create_router(state.clone());

    let (status, created) = send(
        &app,
        "POST",
        "/api/admin/products",
        Some(product_payload("Cloud", "cloud", "Mattresses")),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["success"], true);
    let id = created["data"]["id"].as_str().unwrap().to_string();
    assert_eq!(created["data"]["categorySlug"], "mattresses");

    // warm list and detail entries
    let (status, list) = send(&app, "GET", "/api/products", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list["data"][0]["name"], "Cloud");
    send(&app, "GET", &format!("/api/products/{}", id), None).await;

    let list_key = keys::products_list(None, false);
    let detail_key = keys::product_detail(&id);
    assert!(state.cache.get_raw(&list_key).await.is_some());
    assert!(state.cache.get_raw(&detail_key).await.is_some());

    let (status, updated) = send(
        &app,
        "PUT",
        &format!("/api/admin/products/{}", id),
        Some(product_payload("Cloud Plus", "cloud", "Mattresses")),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["data"]["name"], "Cloud Plus");

    assert!(state.cache.get_raw(&list_key).await.is_none());
    assert!(state.cache.get_raw(&detail_key).await.is_none());

    let (_, detail) = send(&app, "GET", &format!("/api/products/{}", id), None).await;
    assert_eq!(detail["data"]["name"], "Cloud Plus");
}

#[tokio::test]
async fn test_moving_category_invalidates_both_listings() {
    let state = test_state();
    let app = create_router(state.clone());

    let (_, created) = send(
        &app,
        "POST",
        "/api/admin/products",
        Some(product_payload("Cloud", "cloud", "Mattresses")),
    )
    .await;
    let id = created["data"]["id"].as_str().unwrap().to_string();

    send(&app, "GET", "/api/products?category=mattresses", None).await;
    send(&app, "GET", "/api/products?category=pillows", None).await;

    send(
        &app,
        "PUT",
        &format!("/api/admin/products/{}", id),
        Some(product_payload("Cloud", "cloud", "Pillows")),
    )
    .await;

    for slug in ["mattresses", "pillows"] {
        let key = keys::products_list(Some(slug), false);
        assert!(state.cache.get_raw(&key).await.is_none(), "{} still cached", slug);
    }

    let (_, pillows) = send(&app, "GET", "/api/products?category=pillows", None).await;
    assert_eq!(pillows["data"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_delete_product() {
    let app = create_router(test_state());

    let (_, created) = send(
        &app,
        "POST",
        "/api/admin/products",
        Some(product_payload("Cloud", "cloud", "Mattresses")),
    )
    .await;
    let uri = format!("/api/admin/products/{}", created["data"]["id"].as_str().unwrap());

    let (status, _) = send(&app, "DELETE", &uri, None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(&app, "DELETE", &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
}

// == Validation ==

#[tokio::test]
async fn test_invalid_product_returns_field_errors() {
    let state = test_state();
    let app = create_router(state.clone());
    send(&app, "GET", "/api/products", None).await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/admin/products",
        Some(json!({"name": "", "slug": "BAD SLUG", "images": [], "variants": []})),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    for field in ["name", "slug", "images", "variants"] {
        assert!(body["errors"].get(field).is_some(), "missing error for {}", field);
    }
    assert!(body.get("data").is_none());

    // nothing was written, so nothing was invalidated
    assert!(state
        .cache
        .get_raw(&keys::products_list(None, false))
        .await
        .is_some());
}

#[tokio::test]
async fn test_malformed_json_is_bad_request() {
    let app = create_router(test_state());

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/admin/products")
                .header("content-type", "application/json")
                .body(Body::from(r#"{"invalid json"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_duplicate_slug_is_conflict() {
    let app = create_router(test_state());
    let payload = product_payload("Cloud", "cloud", "Mattresses");

    send(&app, "POST", "/api/admin/products", Some(payload.clone())).await;
    let (status, body) = send(&app, "POST", "/api/admin/products", Some(payload)).await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["error"].as_str().unwrap().contains("cloud"));
}

// == Persistence Failure ==

#[tokio::test]
async fn test_persistence_failure_is_500_and_skips_invalidation() {
    let repos = Repositories {
        products: Arc::new(ReadOnlyProducts {
            inner: MemoryCatalog::new(),
        }),
        ..Repositories::in_memory()
    };
    let state = AppState::new(
        Arc::new(MemoryKv::new(100)),
        repos,
        &Config::default(),
    );
    let app = create_router(state.clone());

    let (status, _) = send(&app, "GET", "/api/products", None).await;
    assert_eq!(status, StatusCode::OK);
    let list_key = keys::products_list(None, false);
    assert_eq!(state.tags.keys_for_tag("products").await, vec![list_key.clone()]);

    let (status, body) = send(
        &app,
        "POST",
        "/api/admin/products",
        Some(product_payload("Cloud", "cloud", "Mattresses")),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Internal server error");
    assert!(state.cache.get_raw(&list_key).await.is_some());
    assert_eq!(state.tags.keys_for_tag("products").await, vec![list_key]);
}

// == Categories ==

#[tokio::test]
async fn test_category_create_and_stats_refresh() {
    let app = create_router(test_state());

    let (status, created) = send(
        &app,
        "POST",
        "/api/admin/products/categories",
        Some(json!({
            "title": "Mattresses",
            "slug": "mattresses",
            "features": "Free delivery\n100-night trial"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["data"]["urlPath"], "/products/category/mattresses");
    assert_eq!(
        created["data"]["features"],
        json!(["Free delivery", "100-night trial"])
    );

    let (_, before) = send(&app, "GET", "/api/products/categories", None).await;
    assert_eq!(before["data"][0]["stats"]["productCount"], 0);

    send(
        &app,
        "POST",
        "/api/admin/products",
        Some(product_payload("Cloud", "cloud", "Mattresses")),
    )
    .await;

    let (_, after) = send(&app, "GET", "/api/products/categories", None).await;
    assert_eq!(after["data"][0]["stats"]["productCount"], 1);
    assert_eq!(after["data"][0]["stats"]["inStockCount"], 1);

    let (status, detail) = send(&app, "GET", "/api/products/categories/mattresses", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(detail["data"]["title"], "Mattresses");
}

#[tokio::test]
async fn test_invalid_category_payload() {
    let app = create_router(test_state());

    let (status, body) = send(
        &app,
        "POST",
        "/api/admin/products/categories",
        Some(json!({"title": "", "slug": "Bad Slug", "sortOrder": -2})),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["errors"]["title"].is_string());
    assert!(body["errors"]["slug"].is_string());
    assert!(body["errors"]["sortOrder"].is_string());
}

// == Posts ==

#[tokio::test]
async fn test_post_lifecycle() {
    let state = test_state();
    let app = create_router(state.clone());

    let (status, created) = send(
        &app,
        "POST",
        "/api/posts",
        Some(json!({
            "title": "Choosing a Pillow",
            "slug": "choosing-a-pillow",
            "content": "Side sleepers need more loft than back sleepers.",
            "tags": "sleep, pillows",
            "published": true
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = created["data"]["id"].as_str().unwrap().to_string();

    let (_, list) = send(&app, "GET", "/api/posts", None).await;
    assert_eq!(list["data"].as_array().unwrap().len(), 1);
    assert!(state.cache.get_raw(&keys::posts_list()).await.is_some());

    let (status, _) = send(&app, "DELETE", &format!("/api/posts/{}", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(state.cache.get_raw(&keys::posts_list()).await.is_none());

    let (status, _) = send(&app, "GET", &format!("/api/posts/{}", id), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// == Search ==

#[tokio::test]
async fn test_search_results_are_cached_and_flushed_by_writes() {
    let state = test_state();
    let app = create_router(state.clone());

    send(
        &app,
        "POST",
        "/api/admin/products",
        Some(product_payload("Foam Classic", "foam-classic", "Mattresses")),
    )
    .await;

    let filters = SearchFilters::query("foam");
    assert!(state.search.get::<SearchResults>(&filters).await.is_none());

    let (status, body) = send(&app, "GET", "/api/search?q=Foam", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["total"], 1);

    let cached = state.search.get::<SearchResults>(&filters).await.unwrap();
    assert_eq!(cached.products[0].slug, "foam-classic");

    send(
        &app,
        "POST",
        "/api/admin/products",
        Some(product_payload("Foam Deluxe", "foam-deluxe", "Mattresses")),
    )
    .await;
    assert!(state.search.get::<SearchResults>(&filters).await.is_none());

    let (_, body) = send(&app, "GET", "/api/search?q=foam", None).await;
    assert_eq!(body["data"]["total"], 2);
}

#[tokio::test]
async fn test_short_lived_searches_do_not_strand_product_lists() {
    let config = Config {
        search_ttl: 1,
        ..Config::default()
    };
    let app = create_router(AppState::from_config(&config));

    send(
        &app,
        "POST",
        "/api/admin/products",
        Some(product_payload("Cloud", "cloud", "Mattresses")),
    )
    .await;
    let (_, list) = send(&app, "GET", "/api/products", None).await;
    assert_eq!(list["data"].as_array().unwrap().len(), 1);

    let (status, _) = send(&app, "GET", "/api/products/search?q=foam", None).await;
    assert_eq!(status, StatusCode::OK);
    tokio::time::sleep(std::time::Duration::from_secs(2)).await;

    let (status, _) = send(
        &app,
        "POST",
        "/api/admin/products",
        Some(product_payload("Nimbus", "nimbus", "Mattresses")),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (_, list) = send(&app, "GET", "/api/products", None).await;
    assert_eq!(list["data"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_product_searches_are_flushed_by_prefix() {
    let state = test_state();
    let app = create_router(state.clone());

    send(&app, "GET", "/api/products", None).await;
    for i in 0..50 {
        let uri = format!("/api/products/search?q=term{}", i);
        let (status, _) = send(&app, "GET", &uri, None).await;
        assert_eq!(status, StatusCode::OK);
    }

    assert_eq!(
        state.tags.keys_for_tag("products").await,
        vec![keys::products_list(None, false)]
    );
    assert!(state.cache.get_raw(&keys::product_search("term7")).await.is_some());

    send(
        &app,
        "POST",
        "/api/admin/products",
        Some(product_payload("Cloud", "cloud", "Mattresses")),
    )
    .await;

    assert!(state.cache.get_raw(&keys::product_search("term7")).await.is_none());
    assert!(state.cache.get_raw(&keys::product_search("term49")).await.is_none());
    assert!(state.cache.get_raw(&keys::products_list(None, false)).await.is_none());
}

#[tokio::test]
async fn test_search_requires_query() {
    let app = create_router(test_state());

    let (status, body) = send(&app, "GET", "/api/search?q=%20", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
}

// == Admin ==

#[tokio::test]
async fn test_manual_purge() {
    let state = test_state();
    let app = create_router(state.clone());

    send(&app, "GET", "/api/products", None).await;
    send(&app, "GET", "/api/search?q=foam", None).await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/admin/cache/invalidate",
        Some(json!({"tags": ["products", "search"]})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["keysRemoved"], 1);
    assert_eq!(body["data"]["searchRemoved"], 1);
    assert!(state
        .search
        .get::<SearchResults>(&SearchFilters::query("foam"))
        .await
        .is_none());

    let (status, _) = send(
        &app,
        "POST",
        "/api/admin/cache/invalidate",
        Some(json!({"tags": []})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_stats_and_health() {
    let app = create_router(test_state());

    send(&app, "GET", "/api/products", None).await;
    send(&app, "GET", "/api/products", None).await;

    let (status, body) = send(&app, "GET", "/api/admin/cache/stats", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["backend"], "memory");
    assert!(body["data"]["stats"]["hits"].as_u64().unwrap() >= 1);
    assert!(body["data"].get("hitRate").is_some());

    let (status, body) = send(&app, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_disabled_cache_still_serves_reads() {
    let config = Config {
        cache_enabled: false,
        ..Config::default()
    };
    let state = AppState::from_config(&config);
    let app = create_router(state.clone());

    send(
        &app,
        "POST",
        "/api/admin/products",
        Some(product_payload("Cloud", "cloud", "Mattresses")),
    )
    .await;

    let (status, body) = send(&app, "GET", "/api/products", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
    assert!(state
        .cache
        .get_raw(&keys::products_list(None, false))
        .await
        .is_none());

    let (_, stats) = send(&app, "GET", "/api/admin/cache/stats", None).await;
    assert_eq!(stats["data"]["backend"], "disabled");
    assert_eq!(stats["data"]["enabled"], false);
}
