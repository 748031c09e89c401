//! Memory Store Module
//!
//! HashMap-backed key-value store with TTL expiry, LRU eviction at capacity
//! and prefix listing. `MemoryKv` shares one store across request handlers.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{
    current_timestamp_ms, CacheEntry, KvStore, ListOptions, ListResult, LruTracker, StoreStats,
    MAX_KEY_LENGTH, MAX_VALUE_SIZE,
};
use crate::error::{StoreError, StoreResult};

// == Memory Store ==
/// Synchronous store engine. Wrap it in `MemoryKv` to share it.
#[derive(Debug)]
pub struct MemoryStore {
    /// Key-value storage
    entries: HashMap<String, CacheEntry>,
    /// Access order for eviction
    lru: LruTracker,
    /// Operation counters
    stats: StoreStats,
    /// Maximum number of entries allowed
    max_entries: usize,
}

impl MemoryStore {
    // == Constructor ==
    /// Creates an empty store holding at most `max_entries` entries.
    pub fn new(max_entries: usize) -> Self {
        Self {
            entries: HashMap::new(),
            lru: LruTracker::new(),
            stats: StoreStats::new(),
            max_entries: max_entries.max(1),
        }
    }

    // == Put ==
    /// Stores a value, replacing any previous entry and its TTL.
    ///
    /// When the store is full and `key` is new, the least recently used
    /// entry is evicted first.
    pub fn put(&mut self, key: &str, value: String, ttl: Option<u64>) -> StoreResult<()> {
        if key.is_empty() {
            return Err(StoreError::InvalidKey("key cannot be empty".to_string()));
        }
        if key.len() > MAX_KEY_LENGTH {
            return Err(StoreError::InvalidKey(format!(
                "key exceeds maximum length of {} bytes",
                MAX_KEY_LENGTH
            )));
        }
        if value.len() > MAX_VALUE_SIZE {
            return Err(StoreError::ValueTooLarge {
                size: value.len(),
                max: MAX_VALUE_SIZE,
            });
        }

        if !self.entries.contains_key(key) && self.entries.len() >= self.max_entries {
            if let Some(evicted) = self.lru.evict_oldest() {
                self.entries.remove(&evicted);
                self.stats.record_eviction();
            }
        }

        self.entries
            .insert(key.to_string(), CacheEntry::new(key, value, ttl));
        self.lru.touch(key);
        self.stats.record_write();
        self.stats.set_total_entries(self.entries.len());

        Ok(())
    }

    // == Get ==
    /// Returns the live value for `key`. Expired entries are dropped on read.
    pub fn get(&mut self, key: &str) -> Option<String> {
        let now = current_timestamp_ms();

        let value = match self.entries.get(key) {
            Some(entry) if !entry.is_expired_at(now) => Some(entry.value.clone()),
            Some(_) => {
                self.remove_entry(key);
                self.stats.record_expirations(1);
                None
            }
            None => None,
        };

        match value {
            Some(value) => {
                self.lru.touch(key);
                self.stats.record_hit();
                Some(value)
            }
            None => {
                self.stats.record_miss();
                None
            }
        }
    }

    // == Delete ==
    /// Removes `key`; returns whether anything was there.
    pub fn delete(&mut self, key: &str) -> bool {
        let removed = self.remove_entry(key);
        if removed {
            self.stats.record_delete();
        }
        removed
    }

    // == List ==
    /// Lists live keys under `options.prefix` in lexical order.
    ///
    /// The cursor is the last key of the previous page; keys written between
    /// pages show up if they sort after it.
    pub fn list(&self, options: &ListOptions) -> ListResult {
        let now = current_timestamp_ms();
        let limit = options.effective_limit();

        let mut keys: Vec<&String> = self
            .entries
            .iter()
            .filter(|(key, entry)| key.starts_with(&options.prefix) && !entry.is_expired_at(now))
            .filter(|(key, _)| match &options.cursor {
                Some(cursor) => key.as_str() > cursor.as_str(),
                None => true,
            })
            .map(|(key, _)| key)
            .collect();
        keys.sort();

        let truncated = keys.len() > limit;
        let page: Vec<String> = keys.into_iter().take(limit).cloned().collect();
        let cursor = if truncated { page.last().cloned() } else { None };

        ListResult {
            keys: page,
            truncated,
            cursor,
        }
    }

    // == Cleanup Expired ==
    /// Drops every expired entry and returns how many went.
    pub fn cleanup_expired(&mut self) -> usize {
        let now = current_timestamp_ms();
        let expired: Vec<String> = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.is_expired_at(now))
            .map(|(key, _)| key.clone())
            .collect();

        for key in &expired {
            self.remove_entry(key);
        }

        self.stats.record_expirations(expired.len());
        expired.len()
    }

    /// Remaining TTL in seconds of a live entry.
    pub fn ttl_remaining(&self, key: &str) -> Option<u64> {
        self.entries.get(key).and_then(CacheEntry::ttl_remaining)
    }

    pub fn stats(&self) -> StoreStats {
        let mut stats = self.stats.clone();
        stats.set_total_entries(self.entries.len());
        stats
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn remove_entry(&mut self, key: &str) -> bool {
        let removed = self.entries.remove(key).is_some();
        if removed {
            self.lru.remove(key);
            self.stats.set_total_entries(self.entries.len());
        }
        removed
    }
}

// == Shared Handle ==
/// Cloneable handle to a `MemoryStore` implementing `KvStore`.
#[derive(Debug, Clone)]
pub struct MemoryKv {
    inner: Arc<RwLock<MemoryStore>>,
}

impl MemoryKv {
    pub fn new(max_entries: usize) -> Self {
        Self {
            inner: Arc::new(RwLock::new(MemoryStore::new(max_entries))),
        }
    }

    /// The shared store, for the expiry sweep task.
    pub fn handle(&self) -> Arc<RwLock<MemoryStore>> {
        self.inner.clone()
    }
}

#[async_trait]
impl KvStore for MemoryKv {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn get(&self, key: &str) -> StoreResult<Option<String>> {
        // write lock: reads update recency and may drop an expired entry
        Ok(self.inner.write().await.get(key))
    }

    async fn put(&self, key: &str, value: String, ttl_seconds: Option<u64>) -> StoreResult<()> {
        self.inner.write().await.put(key, value, ttl_seconds)
    }

    async fn delete(&self, key: &str) -> StoreResult<bool> {
        Ok(self.inner.write().await.delete(key))
    }

    async fn list(&self, options: ListOptions) -> StoreResult<ListResult> {
        Ok(self.inner.read().await.list(&options))
    }

    async fn ttl_remaining(&self, key: &str) -> StoreResult<Option<u64>> {
        Ok(self.inner.read().await.ttl_remaining(key))
    }

    async fn stats(&self) -> Option<StoreStats> {
        Some(self.inner.read().await.stats())
    }
}
