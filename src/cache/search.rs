//! Search result cache.
//!
//! Results are keyed by the filters that produced them:
//! `search:` + base64url(canonical JSON of the filters). Object keys are
//! sorted recursively before encoding, so filters built in any field order
//! share one entry.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{Map, Value};

use super::keys::SEARCH_PREFIX;
use super::CacheManager;

/// Default lifetime of a search result, in seconds.
pub const DEFAULT_SEARCH_TTL: u64 = 300;

// == Search Filters ==
/// Filters of a catalog/blog search.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchFilters {
    pub query: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub types: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub include_content: Option<bool>,
}

impl SearchFilters {
    pub fn query(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Self::default()
        }
    }

    /// Form used for key derivation: `types` is treated as a set.
    fn canonical(&self) -> Self {
        let mut filters = self.clone();
        if let Some(types) = filters.types.as_mut() {
            types.sort();
            types.dedup();
        }
        filters
    }
}

// == Key Derivation ==
/// Cache key for a set of filters.
pub fn search_key(filters: &SearchFilters) -> String {
    let value = serde_json::to_value(filters.canonical()).unwrap_or(Value::Null);
    search_key_for_value(&value)
}

/// Cache key for an arbitrary JSON filter object.
pub fn search_key_for_value(filters: &Value) -> String {
    let canonical = canonicalize(filters).to_string();
    format!("{}{}", SEARCH_PREFIX, URL_SAFE_NO_PAD.encode(canonical))
}

/// Rebuilds `value` with every object's keys in sorted order.
pub fn canonicalize(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(&String, &Value)> = map.iter().collect();
            entries.sort_by(|a, b| a.0.cmp(b.0));
            let mut sorted = Map::new();
            for (key, inner) in entries {
                sorted.insert(key.clone(), canonicalize(inner));
            }
            Value::Object(sorted)
        }
        Value::Array(items) => Value::Array(items.iter().map(canonicalize).collect()),
        other => other.clone(),
    }
}

// == Search Cache ==
/// Short-lived cache of search results keyed by filters.
#[derive(Clone)]
pub struct SearchCache {
    cache: CacheManager,
    ttl_seconds: u64,
}

impl SearchCache {
    pub fn new(cache: CacheManager, ttl_seconds: u64) -> Self {
        Self { cache, ttl_seconds }
    }

    pub async fn get<T: DeserializeOwned>(&self, filters: &SearchFilters) -> Option<T> {
        self.cache.get(&search_key(filters)).await
    }

    /// Stores `data` for the default search TTL.
    pub async fn set<T: Serialize + ?Sized>(&self, filters: &SearchFilters, data: &T) {
        self.set_with_ttl(filters, data, self.ttl_seconds).await
    }

    pub async fn set_with_ttl<T: Serialize + ?Sized>(
        &self,
        filters: &SearchFilters,
        data: &T,
        ttl_seconds: u64,
    ) {
        self.cache.set(&search_key(filters), data, ttl_seconds).await;
    }

    // == Invalidate ==
    /// Drops one result set, or every cached search when `filters` is `None`.
    ///
    /// Returns how many cached result sets were removed.
    pub async fn invalidate(&self, filters: Option<&SearchFilters>) -> usize {
        match filters {
            Some(filters) => usize::from(self.cache.delete(&search_key(filters)).await),
            None => self.cache.delete_by_prefix(SEARCH_PREFIX).await,
        }
    }

    pub fn ttl_seconds(&self) -> u64 {
        self.ttl_seconds
    }
}
