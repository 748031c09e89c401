//! Entity rule sets.
//!
//! Each entity module defines its normalization, its declarative schema and
//! a hand-written fallback validator. Both validators take their messages
//! from the same constants; the rules themselves are kept in step by hand
//! and by the equivalence tests in each module.

pub mod category;
pub mod post;
pub mod product;

use serde_json::{Map, Value};

use super::{FieldErrors, ValidationPipeline};
use crate::domain::{CategoryInput, PostInput, ProductInput};

pub const SLUG_PATTERN: &str = r"^[a-z0-9]+(?:-[a-z0-9]+)*$";
pub const SLUG_REQUIRED: &str = "Slug is required";
pub const SLUG_FORMAT: &str = "Slug must contain only lowercase letters, numbers and hyphens";

pub(crate) use super::schema::{EXPECTED_ARRAY, EXPECTED_OBJECT, EXPECTED_STRING};

// == Validators ==
/// The pipelines used by the admin mutation endpoints.
pub struct Validators {
    pub product: ValidationPipeline<ProductInput>,
    pub category: ValidationPipeline<CategoryInput>,
    pub post: ValidationPipeline<PostInput>,
}

impl Validators {
    pub fn new() -> Self {
        Self {
            product: product::pipeline(),
            category: category::pipeline(),
            post: post::pipeline(),
        }
    }
}

impl Default for Validators {
    fn default() -> Self {
        Self::new()
    }
}

// == Fallback helpers ==
// Hand-written counterparts of the schema primitives. They must not touch
// the schema engine.

/// The value of `name` unless it is missing, null, or (when `required`) a
/// blank string.
pub(crate) fn present<'a>(
    object: &'a Map<String, Value>,
    name: &str,
    required: bool,
) -> Option<&'a Value> {
    match object.get(name) {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) if required && s.trim().is_empty() => None,
        Some(value) => Some(value),
    }
}

pub(crate) fn path(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{}.{}", prefix, name)
    }
}

/// Lowercase alphanumeric runs joined by single hyphens.
pub(crate) fn is_slug(s: &str) -> bool {
    !s.is_empty()
        && s.split('-').all(|part| {
            !part.is_empty()
                && part
                    .chars()
                    .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
        })
}

/// Required slug field, checked by hand rather than by pattern.
pub(crate) fn check_slug(object: &Map<String, Value>, prefix: &str, errors: &mut FieldErrors) {
    let field = path(prefix, "slug");
    match present(object, "slug", true) {
        None => errors.insert(field, SLUG_REQUIRED),
        Some(value) => match value.as_str() {
            None => errors.insert(field, EXPECTED_STRING),
            Some(s) if !is_slug(s) => errors.insert(field, SLUG_FORMAT),
            Some(_) => {}
        },
    }
}

/// Optional or required string with an upper length bound.
pub(crate) fn check_max_len(
    object: &Map<String, Value>,
    name: &str,
    required: Option<&str>,
    max: usize,
    too_long: &str,
    errors: &mut FieldErrors,
) {
    match present(object, name, required.is_some()) {
        None => {
            if let Some(message) = required {
                errors.insert(name, message);
            }
        }
        Some(value) => match value.as_str() {
            None => errors.insert(name, EXPECTED_STRING),
            Some(s) if s.chars().count() > max => errors.insert(name, too_long),
            Some(_) => {}
        },
    }
}
