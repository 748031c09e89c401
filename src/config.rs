//! Configuration Module
//!
//! Loads service configuration from environment variables. The resulting
//! `Config` is handed to `AppState::from_config`; nothing reads the
//! environment after startup.

use std::env;
use std::str::FromStr;

/// Service configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Maximum number of entries the in-memory store can hold
    pub max_entries: usize,
    /// TTL in seconds for product and post payloads
    pub default_ttl: u64,
    /// TTL in seconds for category payloads
    pub category_ttl: u64,
    /// TTL in seconds for search results
    pub search_ttl: u64,
    /// HTTP server port
    pub server_port: u16,
    /// Background expiry sweep interval in seconds
    pub cleanup_interval: u64,
    /// When false, every read misses and writes are dropped
    pub cache_enabled: bool,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `MAX_ENTRIES` - Maximum store entries (default: 10000)
    /// - `DEFAULT_TTL` - Product/post TTL in seconds (default: 3600)
    /// - `CATEGORY_TTL` - Category TTL in seconds (default: 86400)
    /// - `SEARCH_TTL` - Search result TTL in seconds (default: 300)
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `CLEANUP_INTERVAL` - Expiry sweep frequency in seconds (default: 30)
    /// - `CACHE_ENABLED` - `false`/`0`/`off` disables caching (default: true)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            max_entries: env_or("MAX_ENTRIES", defaults.max_entries),
            default_ttl: env_or("DEFAULT_TTL", defaults.default_ttl),
            category_ttl: env_or("CATEGORY_TTL", defaults.category_ttl),
            search_ttl: env_or("SEARCH_TTL", defaults.search_ttl),
            server_port: env_or("SERVER_PORT", defaults.server_port),
            cleanup_interval: env_or("CLEANUP_INTERVAL", defaults.cleanup_interval),
            cache_enabled: env::var("CACHE_ENABLED")
                .ok()
                .and_then(|v| parse_flag(&v))
                .unwrap_or(defaults.cache_enabled),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_entries: 10_000,
            default_ttl: 3600,
            category_ttl: 86_400,
            search_ttl: 300,
            server_port: 3000,
            cleanup_interval: 30,
            cache_enabled: true,
        }
    }
}

fn env_or<T: FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
