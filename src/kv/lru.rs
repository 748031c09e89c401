//! Recency Tracker
//!
//! Orders store keys by last access so the memory store can evict when full.

use std::collections::VecDeque;

/// Keys ordered by access time; front is most recent, back is the next victim.
#[derive(Debug, Default)]
pub struct LruTracker {
    order: VecDeque<String>,
}

impl LruTracker {
    pub fn new() -> Self {
        Self::default()
    }

    // == Touch ==
    /// Moves `key` to the most recently used position, inserting it if new.
    pub fn touch(&mut self, key: &str) {
        self.remove(key);
        self.order.push_front(key.to_string());
    }

    pub fn remove(&mut self, key: &str) {
        if let Some(pos) = self.order.iter().position(|k| k == key) {
            self.order.remove(pos);
        }
    }

    // == Evict ==
    /// Pops the least recently used key.
    pub fn evict_oldest(&mut self) -> Option<String> {
        self.order.pop_back()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    #[allow(dead_code)]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_eviction_follows_insertion_order() {
        let mut lru = LruTracker::new();
        lru.touch("products:detail:1");
        lru.touch("products:detail:2");

        assert_eq!(lru.evict_oldest().as_deref(), Some("products:detail:1"));
        assert_eq!(lru.evict_oldest().as_deref(), Some("products:detail:2"));
        assert!(lru.evict_oldest().is_none());
    }

    #[test]
    fn test_touch_refreshes_position() {
        let mut lru = LruTracker::new();
        lru.touch("a");
        lru.touch("b");
        lru.touch("a");

        assert_eq!(lru.len(), 2);
        assert_eq!(lru.evict_oldest().as_deref(), Some("b"));
    }

    #[test]
    fn test_remove_unknown_key_is_noop() {
        let mut lru = LruTracker::new();
        lru.touch("a");
        lru.remove("missing");
        assert_eq!(lru.len(), 1);
        lru.remove("a");
        assert!(lru.is_empty());
    }
}
