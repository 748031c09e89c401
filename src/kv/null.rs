//! Disabled store: accepts every write and never returns anything.

use async_trait::async_trait;

use super::{KvStore, ListOptions, ListResult};
use crate::error::StoreResult;

/// Store used when caching is switched off. Every read is a miss.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullKv;

#[async_trait]
impl KvStore for NullKv {
    fn name(&self) -> &'static str {
        "disabled"
    }

    async fn get(&self, _key: &str) -> StoreResult<Option<String>> {
        Ok(None)
    }

    async fn put(&self, _key: &str, _value: String, _ttl_seconds: Option<u64>) -> StoreResult<()> {
        Ok(())
    }

    async fn delete(&self, _key: &str) -> StoreResult<bool> {
        Ok(false)
    }

    async fn list(&self, _options: ListOptions) -> StoreResult<ListResult> {
        Ok(ListResult::default())
    }
}
