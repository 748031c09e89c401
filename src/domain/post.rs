//! Blog posts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostInput {
    pub title: String,
    pub slug: String,
    #[serde(default)]
    pub excerpt: String,
    pub content: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub published: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: String,
    pub title: String,
    pub slug: String,
    pub excerpt: String,
    pub content: String,
    pub tags: Vec<String>,
    pub published: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Post {
    pub fn from_input(id: impl Into<String>, input: PostInput, now: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            title: input.title,
            slug: input.slug,
            excerpt: input.excerpt,
            content: input.content,
            tags: input.tags,
            published: input.published,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn replaced_with(&self, input: PostInput, now: DateTime<Utc>) -> Self {
        Self {
            created_at: self.created_at,
            ..Self::from_input(self.id.clone(), input, now)
        }
    }

    pub fn matches(&self, query: &str) -> bool {
        let query = query.trim().to_lowercase();
        query.is_empty()
            || self.title.to_lowercase().contains(&query)
            || self.excerpt.to_lowercase().contains(&query)
            || self.content.to_lowercase().contains(&query)
            || self.tags.iter().any(|t| t.to_lowercase() == query)
    }
}
