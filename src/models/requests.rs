//! Request DTOs for the storefront API
//!
//! Query strings and the few bodies that skip the validation pipeline.
//! Entity payloads arrive as raw JSON and go through `validation`.

use serde::Deserialize;

use crate::cache::SearchFilters;

/// Largest `limit` accepted by the search endpoints.
pub const MAX_SEARCH_LIMIT: u32 = 100;

fn flag(value: Option<&str>) -> bool {
    matches!(value.map(str::trim), Some("true") | Some("1") | Some("yes"))
}

/// Query string of `GET /api/products`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListProductsQuery {
    pub category: Option<String>,
    pub featured: Option<String>,
}

impl ListProductsQuery {
    /// Category slug filter; blank or `all` means no filter.
    pub fn category(&self) -> Option<&str> {
        self.category
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty() && *c != "all")
    }

    pub fn featured_only(&self) -> bool {
        flag(self.featured.as_deref())
    }
}

/// Query string of `GET /api/products/search`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductSearchQuery {
    #[serde(default)]
    pub q: String,
}

impl ProductSearchQuery {
    /// Trimmed, lowercased search term; the cache key uses this form.
    pub fn term(&self) -> String {
        self.q.trim().to_lowercase()
    }
}

/// Query string of `GET /api/search`
///
/// `types` is a comma separated list (`products,posts`).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
    pub types: Option<String>,
    pub category: Option<String>,
    pub limit: Option<u32>,
    pub include_content: Option<String>,
}

impl SearchQuery {
    pub fn to_filters(&self) -> SearchFilters {
        let types: Option<Vec<String>> = self.types.as_deref().map(|types| {
            types
                .split(',')
                .map(|t| t.trim().to_lowercase())
                .filter(|t| !t.is_empty())
                .collect()
        });

        SearchFilters {
            query: self.q.trim().to_lowercase(),
            types: types.filter(|t| !t.is_empty()),
            category: self
                .category
                .as_deref()
                .map(str::trim)
                .filter(|c| !c.is_empty())
                .map(str::to_string),
            limit: self.limit.map(|l| l.clamp(1, MAX_SEARCH_LIMIT)),
            include_content: self
                .include_content
                .as_deref()
                .map(|v| flag(Some(v))),
        }
    }
}

/// Request body for `POST /api/admin/cache/invalidate`
#[derive(Debug, Clone, Deserialize)]
pub struct PurgeRequest {
    pub tags: Vec<String>,
}

impl PurgeRequest {
    /// Returns an error message if the request is unusable, None if valid.
    pub fn validate(&self) -> Option<String> {
        if self.tags.iter().all(|t| t.trim().is_empty()) {
            return Some("At least one tag is required".to_string());
        }
        None
    }

    /// Non-blank tags, trimmed.
    pub fn tags(&self) -> Vec<String> {
        self.tags
            .iter()
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .collect()
    }
}
