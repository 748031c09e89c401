//! Persistence Module
//!
//! Repository traits for the system of record behind the cache. Handlers
//! talk to `Arc<dyn ...Repository>` so the backing store can change without
//! touching the HTTP layer; `MemoryCatalog` is the bundled implementation.

mod memory;

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::{CategoryInput, CategoryRecord, Post, PostInput, Product, ProductInput};

pub use memory::MemoryCatalog;

// == Repo Error ==
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RepoError {
    /// No record with the given id or slug
    #[error("{0} not found")]
    NotFound(String),

    /// Another record already uses this slug
    #[error("duplicate slug: {0}")]
    Duplicate(String),

    /// The backing store failed; the write may not have happened
    #[error("backend failure: {0}")]
    Backend(String),
}

pub type RepoResult<T> = std::result::Result<T, RepoError>;

/// Previous and current state of a record after an update.
#[derive(Debug, Clone, PartialEq)]
pub struct Updated<T> {
    pub before: T,
    pub after: T,
}

/// Product listing filter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductFilter {
    pub category: Option<String>,
    pub featured_only: bool,
}

// == Repository traits ==
#[async_trait]
pub trait ProductRepository: Send + Sync {
    async fn list(&self, filter: &ProductFilter) -> RepoResult<Vec<Product>>;
    async fn get(&self, id: &str) -> RepoResult<Product>;
    async fn search(&self, query: &str) -> RepoResult<Vec<Product>>;
    async fn create(&self, input: ProductInput) -> RepoResult<Product>;
    async fn update(&self, id: &str, input: ProductInput) -> RepoResult<Updated<Product>>;
    async fn delete(&self, id: &str) -> RepoResult<Product>;
}

/// Categories are addressed by slug.
#[async_trait]
pub trait CategoryRepository: Send + Sync {
    /// Every category, ordered by `sort_order` then title, with live stats.
    async fn list(&self) -> RepoResult<Vec<CategoryRecord>>;
    async fn get(&self, slug: &str) -> RepoResult<CategoryRecord>;
    async fn create(&self, input: CategoryInput) -> RepoResult<CategoryRecord>;
    async fn update(&self, slug: &str, input: CategoryInput) -> RepoResult<Updated<CategoryRecord>>;
    async fn delete(&self, slug: &str) -> RepoResult<CategoryRecord>;
}

#[async_trait]
pub trait PostRepository: Send + Sync {
    /// Newest first.
    async fn list(&self) -> RepoResult<Vec<Post>>;
    async fn get(&self, id: &str) -> RepoResult<Post>;
    async fn search(&self, query: &str) -> RepoResult<Vec<Post>>;
    async fn create(&self, input: PostInput) -> RepoResult<Post>;
    async fn update(&self, id: &str, input: PostInput) -> RepoResult<Updated<Post>>;
    async fn delete(&self, id: &str) -> RepoResult<Post>;
}

// == Repositories ==
/// The repositories a running service uses.
#[derive(Clone)]
pub struct Repositories {
    pub products: Arc<dyn ProductRepository>,
    pub categories: Arc<dyn CategoryRepository>,
    pub posts: Arc<dyn PostRepository>,
}

impl Repositories {
    /// All three backed by one shared `MemoryCatalog`.
    pub fn in_memory() -> Self {
        let catalog = Arc::new(MemoryCatalog::new());
        Self {
            products: catalog.clone(),
            categories: catalog.clone(),
            posts: catalog,
        }
    }
}
