//! Product categories.

use serde::{Deserialize, Serialize};

// == Category Reference ==
/// How a product points at its category.
///
/// Payloads carry a category as `null`, a bare name, or an object; the
/// shape is settled here, at deserialization, and nowhere downstream.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CategoryRef {
    Object {
        #[serde(default)]
        id: String,
        name: String,
        #[serde(default)]
        slug: String,
    },
    Name(String),
    #[default]
    None,
}

impl CategoryRef {
    /// The category slug, derived from the name when none is given.
    pub fn slug(&self) -> Option<String> {
        match self {
            CategoryRef::Object { slug, name, .. } => {
                let slug = if slug.trim().is_empty() {
                    slug::slugify(name)
                } else {
                    slug.trim().to_string()
                };
                (!slug.is_empty()).then_some(slug)
            }
            CategoryRef::Name(name) => {
                let slug = slug::slugify(name);
                (!slug.is_empty()).then_some(slug)
            }
            CategoryRef::None => None,
        }
    }

    pub fn name(&self) -> Option<&str> {
        match self {
            CategoryRef::Object { name, .. } | CategoryRef::Name(name) => Some(name.as_str()),
            CategoryRef::None => None,
        }
    }
}

// == Category Input ==
/// Validated admin payload for creating or replacing a category.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryInput {
    pub title: String,
    pub slug: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub features: Vec<String>,
    #[serde(default)]
    pub url_path: Option<String>,
    #[serde(default = "default_active")]
    pub is_active: bool,
    #[serde(default)]
    pub sort_order: u32,
}

fn default_active() -> bool {
    true
}

/// Listing path used when a category does not set its own.
pub fn default_url_path(slug: &str) -> String {
    format!("/products/category/{}", slug)
}

// == Category Record ==
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryStats {
    pub product_count: u32,
    pub in_stock_count: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryRecord {
    pub id: String,
    pub slug: String,
    pub title: String,
    pub description: String,
    pub features: Vec<String>,
    pub url_path: String,
    pub is_active: bool,
    pub sort_order: u32,
    #[serde(default)]
    pub stats: CategoryStats,
}

impl CategoryRecord {
    pub fn from_input(id: impl Into<String>, input: CategoryInput) -> Self {
        let url_path = input
            .url_path
            .filter(|path| !path.trim().is_empty())
            .unwrap_or_else(|| default_url_path(&input.slug));

        Self {
            id: id.into(),
            slug: input.slug,
            title: input.title,
            description: input.description,
            features: input.features,
            url_path,
            is_active: input.is_active,
            sort_order: input.sort_order,
            stats: CategoryStats::default(),
        }
    }
}
