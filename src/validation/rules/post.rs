//! Blog post payload rules.

use serde_json::{json, Value};

use super::{
    check_max_len, check_slug, present, EXPECTED_OBJECT, EXPECTED_STRING, SLUG_FORMAT,
    SLUG_PATTERN, SLUG_REQUIRED,
};
use crate::domain::PostInput;
use crate::validation::normalize::{coerce_bools, drop_nulls, split_list, trim_fields};
use crate::validation::{FieldErrors, Keyword, Schema, ValidationPipeline, FORM_KEY};

pub const TITLE_REQUIRED: &str = "Post title is required";
pub const TITLE_TOO_LONG: &str = "Post title must be at most 200 characters";
pub const CONTENT_REQUIRED: &str = "Content is required";
pub const CONTENT_TOO_SHORT: &str = "Content must be at least 10 characters";
pub const EXCERPT_TOO_LONG: &str = "Excerpt must be at most 300 characters";

const TITLE_MAX: usize = 200;
const CONTENT_MIN: usize = 10;
const EXCERPT_MAX: usize = 300;

pub fn pipeline() -> ValidationPipeline<PostInput> {
    ValidationPipeline::new("post", schema(), normalize, fallback)
}

// == Normalization ==
pub fn normalize(value: Value) -> Value {
    let mut object = match value {
        Value::Object(object) => object,
        other => return other,
    };

    drop_nulls(&mut object);
    trim_fields(&mut object, &["title", "slug", "excerpt", "content"]);
    coerce_bools(&mut object, &["published"]);

    if let Some(tags) = object.get("tags") {
        let tags = split_list(tags);
        object.insert(
            "tags".to_string(),
            Value::Array(tags.into_iter().map(Value::String).collect()),
        );
    }

    Value::Object(object)
}

// == Schema ==
pub fn schema() -> Schema {
    Schema::new(json!({
        "type": "object",
        "required": ["title", "slug", "content"],
        "properties": {
            "title": {"type": "string", "minLength": 1, "maxLength": TITLE_MAX},
            "slug": {"type": "string", "minLength": 1, "pattern": SLUG_PATTERN},
            "content": {"type": "string", "minLength": CONTENT_MIN},
            "excerpt": {"type": "string", "maxLength": EXCERPT_MAX}
        }
    }))
    .message("title", Keyword::Required, TITLE_REQUIRED)
    .message("title", Keyword::MaxLength, TITLE_TOO_LONG)
    .message("slug", Keyword::Required, SLUG_REQUIRED)
    .message("slug", Keyword::Pattern, SLUG_FORMAT)
    .message("content", Keyword::Required, CONTENT_REQUIRED)
    .message("content", Keyword::MinLength, CONTENT_TOO_SHORT)
    .message("excerpt", Keyword::MaxLength, EXCERPT_TOO_LONG)
}

// == Fallback ==
pub fn fallback(value: &Value) -> FieldErrors {
    let mut errors = FieldErrors::new();
    let Some(object) = value.as_object() else {
        errors.insert(FORM_KEY, EXPECTED_OBJECT);
        return errors;
    };

    check_max_len(object, "title", Some(TITLE_REQUIRED), TITLE_MAX, TITLE_TOO_LONG, &mut errors);
    check_slug(object, "", &mut errors);

    match present(object, "content", true).map(Value::as_str) {
        None => errors.insert("content", CONTENT_REQUIRED),
        Some(None) => errors.insert("content", EXPECTED_STRING),
        Some(Some(content)) if content.chars().count() < CONTENT_MIN => {
            errors.insert("content", CONTENT_TOO_SHORT)
        }
        Some(Some(_)) => {}
    }

    check_max_len(object, "excerpt", None, EXCERPT_MAX, EXCERPT_TOO_LONG, &mut errors);

    errors
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_valid_post_with_delimited_tags() {
        let input = pipeline()
            .validate(json!({
                "title": " Choosing a Pillow ",
                "slug": "choosing-a-pillow",
                "content": "Side sleepers need more loft than back sleepers.",
                "tags": "sleep, pillows | guides",
                "published": "on",
                "excerpt": null
            }))
            .unwrap()
            .into_result()
            .unwrap();

        assert_eq!(input.title, "Choosing a Pillow");
        assert_eq!(input.tags, vec!["sleep", "pillows", "guides"]);
        assert!(input.published);
        assert_eq!(input.excerpt, "");
    }

    #[test]
    fn test_short_content_rejected() {
        let result = pipeline()
            .validate(json!({"title": "Hi", "slug": "hi", "content": "  too short "}))
            .unwrap();

        assert_eq!(result.errors().unwrap().get("content"), Some(CONTENT_TOO_SHORT));
    }

    #[test]
    fn test_fallback_matches_schema() {
        let pipeline = pipeline();
        let payloads = vec![
            json!({}),
            json!([]),
            json!({"title": "   ", "slug": "Nope", "content": ""}),
            json!({"title": "x".repeat(201), "slug": "ok", "content": 12}),
            json!({"title": "Ok", "slug": "ok", "content": "long enough content",
                   "excerpt": "e".repeat(301)}),
            json!({"title": true, "slug": "ok-", "content": "short", "excerpt": 4}),
        ];

        for raw in payloads {
            let normalized = pipeline.normalize(raw.clone());
            let primary = pipeline.schema_errors(&normalized).unwrap();
            assert!(!primary.is_empty(), "payload should be invalid: {}", raw);
            assert_eq!(primary, pipeline.fallback_errors(&normalized), "on {}", raw);
        }
    }
}
