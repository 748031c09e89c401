//! Response DTOs for the storefront API
//!
//! Successful responses share the `{ "success": true, "data": ... }`
//! envelope; errors are rendered by `ApiError`.

use serde::{Deserialize, Serialize};

use crate::domain::{Post, Product};
use crate::kv::{StoreReport, StoreStats};

/// Success envelope around every payload.
#[derive(Debug, Clone, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: T,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Body returned after a delete.
#[derive(Debug, Clone, Serialize)]
pub struct DeletedResponse {
    pub id: String,
    pub message: String,
}

impl DeletedResponse {
    pub fn new(kind: &str, id: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            message: format!("{} '{}' deleted successfully", kind, id),
            id,
        }
    }
}

/// Outcome of a manual purge.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PurgeResponse {
    pub tags: Vec<String>,
    /// Payload keys deleted through tag mappings
    pub keys_removed: usize,
    /// Search entries deleted, when `search` was among the tags
    pub search_removed: usize,
}

/// Response body for the stats endpoint (GET /api/admin/cache/stats)
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsResponse {
    pub backend: &'static str,
    pub enabled: bool,
    pub stats: Option<StoreStats>,
    /// Hit rate (hits / (hits + misses))
    pub hit_rate: f64,
}

impl From<StoreReport> for StatsResponse {
    fn from(report: StoreReport) -> Self {
        Self {
            backend: report.backend,
            enabled: report.stats.is_some(),
            hit_rate: report.stats.as_ref().map_or(0.0, StoreStats::hit_rate),
            stats: report.stats,
        }
    }
}

/// Result set of `GET /api/search`, cached whole by `SearchCache`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchResults {
    pub query: String,
    pub products: Vec<Product>,
    pub posts: Vec<Post>,
    pub total: usize,
}

impl SearchResults {
    pub fn new(query: impl Into<String>, products: Vec<Product>, posts: Vec<Post>) -> Self {
        Self {
            query: query.into(),
            total: products.len() + posts.len(),
            products,
            posts,
        }
    }
}
