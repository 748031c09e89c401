//! Shared application state.

use std::sync::Arc;

use crate::cache::{CacheManager, SearchCache, TagIndex};
use crate::config::Config;
use crate::kv::{KvStore, MemoryKv, NullKv};
use crate::persistence::Repositories;
use crate::validation::rules::Validators;

/// Payload lifetimes, in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheTtls {
    /// Products and posts
    pub default: u64,
    pub category: u64,
    pub search: u64,
}

impl CacheTtls {
    pub fn from_config(config: &Config) -> Self {
        Self {
            default: config.default_ttl,
            category: config.category_ttl,
            search: config.search_ttl,
        }
    }
}

/// Application state shared across all handlers.
///
/// Everything is a cheap clone over shared handles.
#[derive(Clone)]
pub struct AppState {
    pub cache: CacheManager,
    pub tags: TagIndex,
    pub search: SearchCache,
    pub repos: Repositories,
    pub validators: Arc<Validators>,
    pub ttl: CacheTtls,
}

impl AppState {
    /// Wires the cache layers over `store` and the given repositories.
    pub fn new(store: Arc<dyn KvStore>, repos: Repositories, config: &Config) -> Self {
        let ttl = CacheTtls::from_config(config);
        let cache = CacheManager::new(store);

        Self {
            tags: TagIndex::new(cache.clone()),
            search: SearchCache::new(cache.clone(), ttl.search),
            cache,
            repos,
            validators: Arc::new(Validators::new()),
            ttl,
        }
    }

    /// State with the configured store and in-memory repositories.
    pub fn from_config(config: &Config) -> Self {
        let (store, _) = select_store(config);
        Self::new(store, Repositories::in_memory(), config)
    }
}

/// The store `config` asks for, plus the memory store handle when there is
/// one, for the expiry sweep.
pub fn select_store(config: &Config) -> (Arc<dyn KvStore>, Option<MemoryKv>) {
    if config.cache_enabled {
        let memory = MemoryKv::new(config.max_entries);
        (Arc::new(memory.clone()), Some(memory))
    } else {
        (Arc::new(NullKv), None)
    }
}
