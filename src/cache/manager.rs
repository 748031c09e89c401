//! Cache Manager
//!
//! JSON-aware read/write helpers over a `KvStore`. Every store failure is
//! logged and absorbed: an unreachable store behaves like an empty one.

use std::future::Future;
use std::sync::Arc;

use futures::future::join_all;
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, warn};

use crate::kv::{KvStore, ListOptions, StoreReport};

// == Cache Manager ==
/// Cloneable front door to the shared key-value store.
#[derive(Clone)]
pub struct CacheManager {
    store: Arc<dyn KvStore>,
}

impl CacheManager {
    pub fn new(store: Arc<dyn KvStore>) -> Self {
        Self { store }
    }

    // == Get ==
    /// Reads and JSON-decodes `key`.
    ///
    /// Returns `None` on a miss, a store failure, or a payload that does not
    /// decode as `T`.
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = self.get_raw(key).await?;
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(err) => {
                warn!(key, error = %err, "cached payload failed to decode, treating as miss");
                None
            }
        }
    }

    /// Reads `key` without JSON decoding.
    pub async fn get_raw(&self, key: &str) -> Option<String> {
        match self.store.get(key).await {
            Ok(Some(value)) => {
                debug!(key, "cache hit");
                Some(value)
            }
            Ok(None) => {
                debug!(key, "cache miss");
                None
            }
            Err(err) => {
                warn!(key, backend = self.store.name(), error = %err, "cache read failed");
                None
            }
        }
    }

    // == Set ==
    /// JSON-encodes `value` and stores it for `ttl_seconds`.
    ///
    /// Returns whether the store accepted the write.
    pub async fn set<T: Serialize + ?Sized>(&self, key: &str, value: &T, ttl_seconds: u64) -> bool {
        match serde_json::to_string(value) {
            Ok(json) => self.set_raw(key, json, ttl_seconds).await,
            Err(err) => {
                warn!(key, error = %err, "cache value failed to encode, skipping write");
                false
            }
        }
    }

    /// Stores a string verbatim for `ttl_seconds`.
    pub async fn set_raw(&self, key: &str, value: String, ttl_seconds: u64) -> bool {
        match self.store.put(key, value, Some(ttl_seconds)).await {
            Ok(()) => true,
            Err(err) => {
                warn!(key, backend = self.store.name(), error = %err, "cache write failed");
                false
            }
        }
    }

    /// Seconds left on `key`, if the store knows.
    pub async fn ttl_remaining(&self, key: &str) -> Option<u64> {
        match self.store.ttl_remaining(key).await {
            Ok(left) => left,
            Err(err) => {
                warn!(key, backend = self.store.name(), error = %err, "cache ttl lookup failed");
                None
            }
        }
    }

    // == Delete ==
    /// Removes `key` and returns whether it was there. Store failures count
    /// as nothing deleted.
    pub async fn delete(&self, key: &str) -> bool {
        match self.store.delete(key).await {
            Ok(existed) => existed,
            Err(err) => {
                warn!(key, backend = self.store.name(), error = %err, "cache delete failed");
                false
            }
        }
    }

    /// Deletes every key under `prefix` and returns how many were listed.
    ///
    /// Lists page by page, then deletes concurrently. Keys written after the
    /// listing may survive.
    pub async fn delete_by_prefix(&self, prefix: &str) -> usize {
        let mut keys = Vec::new();
        let mut cursor = None;

        loop {
            let options = ListOptions {
                prefix: prefix.to_string(),
                cursor: cursor.take(),
                limit: None,
            };
            match self.store.list(options).await {
                Ok(page) => {
                    keys.extend(page.keys);
                    if !page.truncated || page.cursor.is_none() {
                        break;
                    }
                    cursor = page.cursor;
                }
                Err(err) => {
                    warn!(prefix, error = %err, "cache list failed, prefix delete is partial");
                    break;
                }
            }
        }

        join_all(keys.iter().map(|key| self.delete(key))).await;
        debug!(prefix, count = keys.len(), "deleted keys by prefix");
        keys.len()
    }

    // == Get Or Set ==
    /// Read-through helper: returns the cached value or computes, stores and
    /// returns a fresh one.
    ///
    /// `compute` runs at most once per call. Concurrent callers missing on the
    /// same key each run their own `compute`; there is no single-flight.
    /// Errors from `compute` propagate and nothing is stored.
    pub async fn get_or_set<T, E, F, Fut>(
        &self,
        key: &str,
        compute: F,
        ttl_seconds: u64,
    ) -> Result<T, E>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        if let Some(cached) = self.get::<T>(key).await {
            return Ok(cached);
        }

        let fresh = compute().await?;
        self.set(key, &fresh, ttl_seconds).await;
        Ok(fresh)
    }

    /// Backend name and counters for diagnostics.
    pub async fn report(&self) -> StoreReport {
        StoreReport {
            backend: self.store.name(),
            stats: self.store.stats().await,
        }
    }
}
