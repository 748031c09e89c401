//! Tag Index
//!
//! Reverse mapping from an invalidation tag to the cache keys carrying it,
//! stored in the cache itself under `tag:<tag>` as a JSON array of keys.
//!
//! Updates are read-modify-write without locking. Two writers appending to
//! the same tag at once can lose one key; that key then lives until its TTL.
//! A mapping's lifetime never shrinks: each rewrite keeps the longer of the
//! new payload's TTL and what the mapping had left, so it outlives every
//! payload it lists.
//!
//! A mapping is one JSON array rewritten per append. Tag only keys drawn
//! from a bounded set; per-query entries belong under a prefix instead.

use std::future::Future;

use futures::future::join_all;
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, warn};

use super::keys::tag_mapping;
use super::CacheManager;

/// Tag bookkeeping on top of a `CacheManager`.
#[derive(Clone)]
pub struct TagIndex {
    cache: CacheManager,
}

impl TagIndex {
    pub fn new(cache: CacheManager) -> Self {
        Self { cache }
    }

    // == Set With Tags ==
    /// Stores `value` under `key`, then records `key` under each tag.
    ///
    /// When a tag mapping cannot be written the payload is deleted again, so
    /// no cached value escapes invalidation.
    pub async fn set_with_tags<T, S>(&self, key: &str, value: &T, tags: &[S], ttl_seconds: u64)
    where
        T: Serialize + ?Sized,
        S: AsRef<str>,
    {
        if !self.cache.set(key, value, ttl_seconds).await {
            return;
        }

        for tag in tags {
            let tag = tag.as_ref();
            let mapping_key = tag_mapping(tag);
            let mut keys = self.keys_for_tag(tag).await;
            if !keys.iter().any(|k| k == key) {
                keys.push(key.to_string());
            }

            // remaining lifetime is whole seconds, rounded down
            let mapping_ttl = match self.cache.ttl_remaining(&mapping_key).await {
                Some(left) => ttl_seconds.max(left.saturating_add(1)),
                None => ttl_seconds,
            };
            if !self.cache.set(&mapping_key, &keys, mapping_ttl).await {
                warn!(key, tag, "tag mapping write failed, dropping untracked payload");
                self.cache.delete(key).await;
                return;
            }
        }
    }

    /// `CacheManager::get_or_set` that tags whatever it stores.
    ///
    /// Hits leave the tag mappings alone.
    pub async fn get_or_set_with_tags<T, S, E, F, Fut>(
        &self,
        key: &str,
        tags: &[S],
        compute: F,
        ttl_seconds: u64,
    ) -> Result<T, E>
    where
        T: Serialize + DeserializeOwned,
        S: AsRef<str>,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        if let Some(cached) = self.cache.get::<T>(key).await {
            return Ok(cached);
        }

        let fresh = compute().await?;
        self.set_with_tags(key, &fresh, tags, ttl_seconds).await;
        Ok(fresh)
    }

    // == Invalidate ==
    /// Deletes every key recorded under each tag, then the tag mappings.
    ///
    /// Returns how many payload keys were deleted. Missing or expired
    /// mappings contribute nothing.
    pub async fn invalidate_by_tags<S: AsRef<str>>(&self, tags: &[S]) -> usize {
        let mut removed = 0;

        for tag in tags {
            let tag = tag.as_ref();
            let keys = self.keys_for_tag(tag).await;

            join_all(keys.iter().map(|key| self.cache.delete(key))).await;
            self.cache.delete(&tag_mapping(tag)).await;

            debug!(tag, count = keys.len(), "invalidated tag");
            removed += keys.len();
        }

        removed
    }

    /// Keys currently recorded under `tag`; empty when unknown.
    pub async fn keys_for_tag(&self, tag: &str) -> Vec<String> {
        self.cache
            .get::<Vec<String>>(&tag_mapping(tag))
            .await
            .unwrap_or_default()
    }

    /// The underlying cache, for plain reads of tagged entries.
    pub fn cache(&self) -> &CacheManager {
        &self.cache
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::test_support::FailingKv;
    use crate::kv::{MemoryKv, MAX_VALUE_SIZE};
    use serde_json::{json, Value};
    use std::sync::Arc;

    fn index() -> TagIndex {
        TagIndex::new(CacheManager::new(Arc::new(MemoryKv::new(100))))
    }

    #[tokio::test]
    async fn test_invalidate_removes_all_tagged_keys() {
        let index = index();
        index
            .set_with_tags("prod:1", &json!({"id": 1}), &["products"], 60)
            .await;
        index
            .set_with_tags("prod:2", &json!({"id": 2}), &["products"], 60)
            .await;

        let removed = index.invalidate_by_tags(&["products"]).await;

        assert_eq!(removed, 2);
        assert_eq!(index.cache().get::<Value>("prod:1").await, None);
        assert_eq!(index.cache().get::<Value>("prod:2").await, None);
        assert!(index.keys_for_tag("products").await.is_empty());
    }

    #[tokio::test]
    async fn test_any_one_tag_is_enough() {
        let index = index();
        index
            .set_with_tags("k", &json!({"a": 1}), &["t1", "t2"], 60)
            .await;

        index.invalidate_by_tags(&["t1"]).await;

        assert_eq!(index.cache().get::<Value>("k").await, None);
        // t2 still lists the key; deleting it again is harmless
        assert_eq!(index.keys_for_tag("t2").await, vec!["k".to_string()]);
        assert_eq!(index.invalidate_by_tags(&["t2"]).await, 1);
    }

    #[tokio::test]
    async fn test_rewriting_key_does_not_duplicate_mapping() {
        let index = index();
        index.set_with_tags("k", &1, &["products"], 60).await;
        index.set_with_tags("k", &2, &["products"], 60).await;

        assert_eq!(index.keys_for_tag("products").await, vec!["k".to_string()]);
        assert_eq!(index.cache().get::<i32>("k").await, Some(2));
    }

    #[tokio::test]
    async fn test_unknown_tag_invalidates_nothing() {
        let index = index();
        index.set_with_tags("k", &1, &["products"], 60).await;

        assert_eq!(index.invalidate_by_tags(&["posts"]).await, 0);
        assert_eq!(index.cache().get::<i32>("k").await, Some(1));
    }

    #[tokio::test]
    async fn test_untagged_keys_survive() {
        let index = index();
        index.cache().set("plain", &1, 60).await;
        index.set_with_tags("tagged", &2, &["products"], 60).await;

        index.invalidate_by_tags(&["products"]).await;

        assert_eq!(index.cache().get::<i32>("plain").await, Some(1));
    }

    #[tokio::test]
    async fn test_read_through_tags_fresh_values_only() {
        let index = index();

        let first: Result<i32, ()> = index
            .get_or_set_with_tags("k", &["products"], || async { Ok(1) }, 60)
            .await;
        assert_eq!(first, Ok(1));
        assert_eq!(index.keys_for_tag("products").await, vec!["k".to_string()]);

        let second: Result<i32, ()> = index
            .get_or_set_with_tags("k", &["products"], || async { Ok(2) }, 60)
            .await;
        assert_eq!(second, Ok(1));

        let failed: Result<i32, &str> = index
            .get_or_set_with_tags("other", &["posts"], || async { Err("db down") }, 60)
            .await;
        assert_eq!(failed, Err("db down"));
        assert!(index.keys_for_tag("posts").await.is_empty());
    }

    #[tokio::test]
    async fn test_short_ttl_does_not_shorten_mapping() {
        let index = index();
        index.set_with_tags("list", &1, &["products"], 120).await;
        index.set_with_tags("search", &2, &["products"], 1).await;

        tokio::time::sleep(std::time::Duration::from_secs(2)).await;

        assert_eq!(index.cache().get::<i32>("list").await, Some(1));
        assert!(index
            .cache()
            .ttl_remaining("tag:products")
            .await
            .is_some_and(|left| left > 60));

        assert_eq!(index.invalidate_by_tags(&["products"]).await, 2);
        assert_eq!(index.cache().get::<i32>("list").await, None);
    }

    #[tokio::test]
    async fn test_payload_dropped_when_mapping_cannot_grow() {
        let index = index();
        let entry = 503; // 500 chars, two quotes, one comma
        let filler: Vec<String> = (0..(MAX_VALUE_SIZE - 2) / entry)
            .map(|i| format!("{:0>500}", i))
            .collect();
        index.cache().set("tag:products", &filler, 60).await;
        assert_eq!(index.keys_for_tag("products").await.len(), filler.len());

        let key = format!("{:x>500}", "overflow");
        index.set_with_tags(&key, &1, &["products"], 60).await;

        assert_eq!(index.cache().get::<i32>(&key).await, None);
        assert_eq!(index.keys_for_tag("products").await.len(), filler.len());
    }

    #[tokio::test]
    async fn test_unavailable_store_is_silent() {
        let index = TagIndex::new(CacheManager::new(Arc::new(FailingKv)));

        index.set_with_tags("k", &1, &["products"], 60).await;
        assert_eq!(index.invalidate_by_tags(&["products"]).await, 0);
    }
}
