//! Key-Value Store Binding
//!
//! The TTL-capable key-value contract the cache layer sits on, plus the
//! in-memory implementation served by default and a disabled store that
//! always misses.

mod entry;
mod lru;
mod memory;
mod null;
mod stats;


use async_trait::async_trait;
use serde::Serialize;

use crate::error::StoreResult;

pub use entry::{current_timestamp_ms, CacheEntry};
pub use lru::LruTracker;
pub use memory::{MemoryKv, MemoryStore};
pub use null::NullKv;
pub use stats::StoreStats;

// == Public Constants ==
/// Maximum allowed key length in bytes
pub const MAX_KEY_LENGTH: usize = 512;

/// Maximum allowed value size in bytes
pub const MAX_VALUE_SIZE: usize = 1024 * 1024; // 1 MB

/// Page size used when a list call does not ask for one
pub const DEFAULT_LIST_LIMIT: usize = 1000;

// == List Types ==
/// Parameters of a prefix listing.
#[derive(Debug, Clone, Default)]
pub struct ListOptions {
    /// Only keys starting with this prefix are returned
    pub prefix: String,
    /// Opaque cursor from a previous truncated page
    pub cursor: Option<String>,
    /// Page size, clamped to `1..=DEFAULT_LIST_LIMIT`
    pub limit: Option<usize>,
}

impl ListOptions {
    pub fn prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            ..Self::default()
        }
    }

    pub fn effective_limit(&self) -> usize {
        self.limit
            .unwrap_or(DEFAULT_LIST_LIMIT)
            .clamp(1, DEFAULT_LIST_LIMIT)
    }
}

/// One page of a prefix listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListResult {
    pub keys: Vec<String>,
    /// More keys remain after this page
    pub truncated: bool,
    /// Pass back in `ListOptions::cursor` to fetch the next page
    pub cursor: Option<String>,
}

// == Store Trait ==
/// Any TTL-capable key-value service the cache can run on.
///
/// Every call is an I/O suspension point; implementations report failures
/// as `StoreError` and leave degradation policy to the caller.
#[async_trait]
pub trait KvStore: Send + Sync {
    /// Short backend name for logs.
    fn name(&self) -> &'static str;

    /// Returns the stored string, or `None` when absent or expired.
    async fn get(&self, key: &str) -> StoreResult<Option<String>>;

    /// Stores `value`; `ttl_seconds` of `None` means no expiry.
    async fn put(&self, key: &str, value: String, ttl_seconds: Option<u64>) -> StoreResult<()>;

    /// Removes `key` and reports whether it was there. Deleting an absent
    /// key succeeds with `false`.
    async fn delete(&self, key: &str) -> StoreResult<bool>;

    /// Lists live keys under a prefix in lexical order, one page at a time.
    async fn list(&self, options: ListOptions) -> StoreResult<ListResult>;

    /// Seconds left before `key` expires. `None` when the key is absent,
    /// has no expiry, or the backend cannot tell.
    async fn ttl_remaining(&self, _key: &str) -> StoreResult<Option<u64>> {
        Ok(None)
    }

    /// Backend statistics when the store keeps any.
    async fn stats(&self) -> Option<StoreStats> {
        None
    }
}

/// Snapshot of store health exposed over the admin API.
#[derive(Debug, Clone, Serialize)]
pub struct StoreReport {
    pub backend: &'static str,
    pub stats: Option<StoreStats>,
}
