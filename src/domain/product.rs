//! Catalog products.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::CategoryRef;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Variant {
    pub name: String,
    pub sku: String,
    pub price: f64,
    pub stock: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Specification {
    pub key: String,
    #[serde(default)]
    pub value: String,
}

// == Product Input ==
/// Validated admin payload for creating or replacing a product.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductInput {
    pub name: String,
    pub slug: String,
    #[serde(default)]
    pub description: String,
    pub price: f64,
    #[serde(default)]
    pub compare_at_price: Option<f64>,
    #[serde(default)]
    pub category: CategoryRef,
    #[serde(default)]
    pub featured: bool,
    pub images: Vec<String>,
    pub variants: Vec<Variant>,
    #[serde(default)]
    pub specifications: Vec<Specification>,
}

// == Product ==
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: String,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub price: f64,
    pub compare_at_price: Option<f64>,
    pub category: CategoryRef,
    /// Resolved once from `category` so readers never re-inspect its shape
    pub category_slug: Option<String>,
    pub featured: bool,
    pub images: Vec<String>,
    pub variants: Vec<Variant>,
    pub specifications: Vec<Specification>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    pub fn from_input(id: impl Into<String>, input: ProductInput, now: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            category_slug: input.category.slug(),
            name: input.name,
            slug: input.slug,
            description: input.description,
            price: input.price,
            compare_at_price: input.compare_at_price,
            category: input.category,
            featured: input.featured,
            images: input.images,
            variants: input.variants,
            specifications: input.specifications,
            created_at: now,
            updated_at: now,
        }
    }

    /// Replaces every editable field, keeping identity and creation time.
    pub fn replaced_with(&self, input: ProductInput, now: DateTime<Utc>) -> Self {
        Self {
            created_at: self.created_at,
            ..Self::from_input(self.id.clone(), input, now)
        }
    }

    pub fn total_stock(&self) -> u64 {
        self.variants.iter().map(|v| u64::from(v.stock)).sum()
    }

    pub fn in_stock(&self) -> bool {
        self.total_stock() > 0
    }

    /// Case-insensitive match on name, slug, description and SKUs.
    pub fn matches(&self, query: &str) -> bool {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return true;
        }
        self.name.to_lowercase().contains(&query)
            || self.slug.contains(&query)
            || self.description.to_lowercase().contains(&query)
            || self
                .variants
                .iter()
                .any(|v| v.sku.to_lowercase().contains(&query))
    }
}
