//! Stored Entry Module
//!
//! A single value held by the in-memory key-value store, with its expiry.

use std::time::{SystemTime, UNIX_EPOCH};

// == Stored Entry ==
/// A value owned by the store together with its lifetime metadata.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// Key the entry lives under
    pub key: String,
    /// Serialized payload (JSON text or a raw string)
    pub value: String,
    /// Creation timestamp (Unix milliseconds)
    pub created_at: u64,
    /// Expiration timestamp (Unix milliseconds), None = no expiration
    pub expires_at: Option<u64>,
}

impl CacheEntry {
    // == Constructor ==
    /// Creates an entry that expires `ttl_seconds` from now.
    ///
    /// A TTL of `None` keeps the entry until it is deleted or evicted.
    pub fn new(key: impl Into<String>, value: String, ttl_seconds: Option<u64>) -> Self {
        let now = current_timestamp_ms();

        Self {
            key: key.into(),
            value,
            created_at: now,
            expires_at: ttl_seconds.map(|ttl| now.saturating_add(ttl.saturating_mul(1000))),
        }
    }

    // == Is Expired ==
    /// An entry is expired once the current time reaches `expires_at`.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(current_timestamp_ms())
    }

    /// Expiry check against a caller-supplied clock reading.
    pub fn is_expired_at(&self, now_ms: u64) -> bool {
        matches!(self.expires_at, Some(expires) if now_ms >= expires)
    }

    /// Remaining lifetime in seconds, `Some(0)` once expired.
    pub fn ttl_remaining(&self) -> Option<u64> {
        let now = current_timestamp_ms();
        self.expires_at
            .map(|expires| expires.saturating_sub(now) / 1000)
    }
}

// == Utility Functions ==
/// Returns current Unix timestamp in milliseconds.
pub fn current_timestamp_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default()
}
