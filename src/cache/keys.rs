//! Cache key and tag naming.
//!
//! Namespaces share one store and are separated by prefix only. The product
//! and search layouts are relied on by other consumers of the store.

/// Prefix of every tag mapping entry.
pub const TAG_PREFIX: &str = "tag:";

/// Prefix of every search result entry.
pub const SEARCH_PREFIX: &str = "search:";

/// Prefix of the per-query product search entries. These are flushed by
/// prefix rather than tracked under a tag, since the query is client input.
pub const PRODUCT_SEARCH_PREFIX: &str = "products:search:";

const ALL: &str = "all";

// == Product keys ==

/// `products:list:<category|all>:<featured|all>`
pub fn products_list(category: Option<&str>, featured_only: bool) -> String {
    let featured = if featured_only { "featured" } else { ALL };
    format!("products:list:{}:{}", category.unwrap_or(ALL), featured)
}

/// `products:detail:<id>`
pub fn product_detail(id: &str) -> String {
    format!("products:detail:{}", id)
}

/// `products:search:<query>`
pub fn product_search(query: &str) -> String {
    format!("{}{}", PRODUCT_SEARCH_PREFIX, query)
}

// == Category keys ==

pub fn categories_list() -> String {
    "categories:list".to_string()
}

pub fn category_detail(slug: &str) -> String {
    format!("categories:detail:{}", slug)
}

// == Post keys ==

pub fn posts_list() -> String {
    "posts:list".to_string()
}

pub fn post_detail(id: &str) -> String {
    format!("posts:detail:{}", id)
}

/// `tag:<tag>`, the entry holding the JSON array of keys carrying that tag.
pub fn tag_mapping(tag: &str) -> String {
    format!("{}{}", TAG_PREFIX, tag)
}

// == Tags ==
/// Invalidation tags attached to cached payloads.
pub mod tags {
    pub const PRODUCTS: &str = "products";
    pub const CATEGORIES: &str = "categories";
    pub const POSTS: &str = "posts";
    /// Pseudo-tag accepted by the purge endpoint to flush search results.
    pub const SEARCH: &str = "search";

    pub fn product(id: &str) -> String {
        format!("product:{}", id)
    }

    pub fn category(slug: &str) -> String {
        format!("category:{}", slug)
    }

    pub fn post(id: &str) -> String {
        format!("post:{}", id)
    }
}
