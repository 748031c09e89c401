//! In-memory catalog.
//!
//! One lock over all three collections so category stats can be computed
//! from the products they count.

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use super::{
    CategoryRepository, PostRepository, ProductFilter, ProductRepository, RepoError, RepoResult,
    Updated,
};
use crate::domain::{
    CategoryInput, CategoryRecord, CategoryStats, Post, PostInput, Product, ProductInput,
};

#[derive(Default)]
struct Collections {
    products: Vec<Product>,
    categories: Vec<CategoryRecord>,
    posts: Vec<Post>,
}

impl Collections {
    fn stats_for(&self, slug: &str) -> CategoryStats {
        let in_category = self
            .products
            .iter()
            .filter(|p| p.category_slug.as_deref() == Some(slug));

        let mut stats = CategoryStats::default();
        for product in in_category {
            stats.product_count += 1;
            if product.in_stock() {
                stats.in_stock_count += 1;
            }
        }
        stats
    }

    fn with_stats(&self, mut category: CategoryRecord) -> CategoryRecord {
        category.stats = self.stats_for(&category.slug);
        category
    }
}

/// `Vec`-backed store for products, categories and posts.
#[derive(Default)]
pub struct MemoryCatalog {
    inner: RwLock<Collections>,
}

impl MemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }
}

fn new_id() -> String {
    Uuid::new_v4().to_string()
}

fn not_found(kind: &str, id: &str) -> RepoError {
    RepoError::NotFound(format!("{} '{}'", kind, id))
}

// == Products ==
#[async_trait]
impl ProductRepository for MemoryCatalog {
    async fn list(&self, filter: &ProductFilter) -> RepoResult<Vec<Product>> {
        let data = self.inner.read().await;
        Ok(data
            .products
            .iter()
            .filter(|p| !filter.featured_only || p.featured)
            .filter(|p| match &filter.category {
                Some(slug) => p.category_slug.as_deref() == Some(slug.as_str()),
                None => true,
            })
            .cloned()
            .collect())
    }

    async fn get(&self, id: &str) -> RepoResult<Product> {
        let data = self.inner.read().await;
        data.products
            .iter()
            .find(|p| p.id == id)
            .cloned()
            .ok_or_else(|| not_found("product", id))
    }

    async fn search(&self, query: &str) -> RepoResult<Vec<Product>> {
        let data = self.inner.read().await;
        Ok(data
            .products
            .iter()
            .filter(|p| p.matches(query))
            .cloned()
            .collect())
    }

    async fn create(&self, input: ProductInput) -> RepoResult<Product> {
        let mut data = self.inner.write().await;
        if data.products.iter().any(|p| p.slug == input.slug) {
            return Err(RepoError::Duplicate(input.slug));
        }

        let product = Product::from_input(new_id(), input, Utc::now());
        debug!(id = %product.id, slug = %product.slug, "product created");
        data.products.push(product.clone());
        Ok(product)
    }

    async fn update(&self, id: &str, input: ProductInput) -> RepoResult<Updated<Product>> {
        let mut data = self.inner.write().await;
        if data
            .products
            .iter()
            .any(|p| p.slug == input.slug && p.id != id)
        {
            return Err(RepoError::Duplicate(input.slug));
        }

        let slot = data
            .products
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| not_found("product", id))?;
        let after = slot.replaced_with(input, Utc::now());
        let before = std::mem::replace(slot, after.clone());
        Ok(Updated { before, after })
    }

    async fn delete(&self, id: &str) -> RepoResult<Product> {
        let mut data = self.inner.write().await;
        let idx = data
            .products
            .iter()
            .position(|p| p.id == id)
            .ok_or_else(|| not_found("product", id))?;
        Ok(data.products.remove(idx))
    }
}

// == Categories ==
#[async_trait]
impl CategoryRepository for MemoryCatalog {
    async fn list(&self) -> RepoResult<Vec<CategoryRecord>> {
        let data = self.inner.read().await;
        let mut categories: Vec<_> = data
            .categories
            .iter()
            .cloned()
            .map(|c| data.with_stats(c))
            .collect();
        categories.sort_by(|a, b| {
            a.sort_order
                .cmp(&b.sort_order)
                .then_with(|| a.title.cmp(&b.title))
        });
        Ok(categories)
    }

    async fn get(&self, slug: &str) -> RepoResult<CategoryRecord> {
        let data = self.inner.read().await;
        data.categories
            .iter()
            .find(|c| c.slug == slug)
            .cloned()
            .map(|c| data.with_stats(c))
            .ok_or_else(|| not_found("category", slug))
    }

    async fn create(&self, input: CategoryInput) -> RepoResult<CategoryRecord> {
        let mut data = self.inner.write().await;
        if data.categories.iter().any(|c| c.slug == input.slug) {
            return Err(RepoError::Duplicate(input.slug));
        }

        let category = data.with_stats(CategoryRecord::from_input(new_id(), input));
        data.categories.push(category.clone());
        Ok(category)
    }

    async fn update(
        &self,
        slug: &str,
        input: CategoryInput,
    ) -> RepoResult<Updated<CategoryRecord>> {
        let mut data = self.inner.write().await;
        if input.slug != slug && data.categories.iter().any(|c| c.slug == input.slug) {
            return Err(RepoError::Duplicate(input.slug));
        }

        let idx = data
            .categories
            .iter()
            .position(|c| c.slug == slug)
            .ok_or_else(|| not_found("category", slug))?;
        let id = data.categories[idx].id.clone();
        let after = data.with_stats(CategoryRecord::from_input(id, input));
        let replaced = std::mem::replace(&mut data.categories[idx], after.clone());
        let before = data.with_stats(replaced);
        Ok(Updated { before, after })
    }

    async fn delete(&self, slug: &str) -> RepoResult<CategoryRecord> {
        let mut data = self.inner.write().await;
        let idx = data
            .categories
            .iter()
            .position(|c| c.slug == slug)
            .ok_or_else(|| not_found("category", slug))?;
        Ok(data.categories.remove(idx))
    }
}

// == Posts ==
#[async_trait]
impl PostRepository for MemoryCatalog {
    async fn list(&self) -> RepoResult<Vec<Post>> {
        let data = self.inner.read().await;
        let mut posts = data.posts.clone();
        posts.reverse();
        Ok(posts)
    }

    async fn get(&self, id: &str) -> RepoResult<Post> {
        let data = self.inner.read().await;
        data.posts
            .iter()
            .find(|p| p.id == id)
            .cloned()
            .ok_or_else(|| not_found("post", id))
    }

    async fn search(&self, query: &str) -> RepoResult<Vec<Post>> {
        let data = self.inner.read().await;
        Ok(data
            .posts
            .iter()
            .rev()
            .filter(|p| p.matches(query))
            .cloned()
            .collect())
    }

    async fn create(&self, input: PostInput) -> RepoResult<Post> {
        let mut data = self.inner.write().await;
        if data.posts.iter().any(|p| p.slug == input.slug) {
            return Err(RepoError::Duplicate(input.slug));
        }

        let post = Post::from_input(new_id(), input, Utc::now());
        data.posts.push(post.clone());
        Ok(post)
    }

    async fn update(&self, id: &str, input: PostInput) -> RepoResult<Updated<Post>> {
        let mut data = self.inner.write().await;
        if data.posts.iter().any(|p| p.slug == input.slug && p.id != id) {
            return Err(RepoError::Duplicate(input.slug));
        }

        let slot = data
            .posts
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| not_found("post", id))?;
        let after = slot.replaced_with(input, Utc::now());
        let before = std::mem::replace(slot, after.clone());
        Ok(Updated { before, after })
    }

    async fn delete(&self, id: &str) -> RepoResult<Post> {
        let mut data = self.inner.write().await;
        let idx = data
            .posts
            .iter()
            .position(|p| p.id == id)
            .ok_or_else(|| not_found("post", id))?;
        Ok(data.posts.remove(idx))
    }
}
