//! Cache Module
//!
//! JSON read-through caching, tag-based invalidation and search result
//! caching over a shared `KvStore`. Nothing here ever fails a request: a
//! broken store reads as empty and swallows writes.

pub mod keys;
mod manager;
mod search;
mod tags;


pub use manager::CacheManager;
pub use search::{
    canonicalize, search_key, search_key_for_value, SearchCache, SearchFilters,
    DEFAULT_SEARCH_TTL,
};
pub use tags::TagIndex;
