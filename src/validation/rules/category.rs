//! Category payload rules.

use serde_json::{json, Map, Value};

use super::{
    check_max_len, check_slug, present, EXPECTED_OBJECT, EXPECTED_STRING, SLUG_FORMAT,
    SLUG_PATTERN, SLUG_REQUIRED,
};
use crate::domain::CategoryInput;
use crate::validation::normalize::{
    coerce_bools, coerce_numbers, drop_nulls, split_list, trim_fields,
};
use crate::validation::{FieldErrors, Keyword, Schema, ValidationPipeline, FORM_KEY};

pub const TITLE_REQUIRED: &str = "Category title is required";
pub const TITLE_TOO_LONG: &str = "Category title must be at most 100 characters";
pub const DESCRIPTION_TOO_LONG: &str = "Description must be at most 1000 characters";
pub const URL_PATH_PATTERN: &str = r"^/[a-z0-9/-]*$";
pub const URL_PATH_FORMAT: &str =
    "URL path must start with / and use only lowercase letters, numbers, hyphens and slashes";
pub const SORT_ORDER_INTEGER: &str = "Sort order must be a whole number";
pub const SORT_ORDER_MIN: &str = "Sort order cannot be negative";

const TITLE_MAX: usize = 100;
const DESCRIPTION_MAX: usize = 1000;

pub fn pipeline() -> ValidationPipeline<CategoryInput> {
    ValidationPipeline::new("category", schema(), normalize, fallback)
}

// == Normalization ==
/// Trims text, parses `features` from a list or delimited string, drops a
/// blank `urlPath` so the default applies, and reads form-style booleans.
pub fn normalize(value: Value) -> Value {
    let mut object = match value {
        Value::Object(object) => object,
        other => return other,
    };

    drop_nulls(&mut object);
    trim_fields(&mut object, &["title", "slug", "description", "urlPath"]);
    coerce_numbers(&mut object, &["sortOrder"]);

    if let Some(features) = object.get("features") {
        let parsed = split_list(features);
        object.insert(
            "features".to_string(),
            Value::Array(parsed.into_iter().map(Value::String).collect()),
        );
    }

    if object.get("urlPath").and_then(Value::as_str) == Some("") {
        object.remove("urlPath");
    }

    coerce_bools(&mut object, &["isActive"]);

    Value::Object(object)
}

// == Schema ==
pub fn schema() -> Schema {
    Schema::new(json!({
        "type": "object",
        "required": ["title", "slug"],
        "properties": {
            "title": {"type": "string", "minLength": 1, "maxLength": TITLE_MAX},
            "slug": {"type": "string", "minLength": 1, "pattern": SLUG_PATTERN},
            "description": {"type": "string", "maxLength": DESCRIPTION_MAX},
            "urlPath": {"type": "string", "pattern": URL_PATH_PATTERN},
            "sortOrder": {"type": "integer", "minimum": 0}
        }
    }))
    .message("title", Keyword::Required, TITLE_REQUIRED)
    .message("title", Keyword::MaxLength, TITLE_TOO_LONG)
    .message("slug", Keyword::Required, SLUG_REQUIRED)
    .message("slug", Keyword::Pattern, SLUG_FORMAT)
    .message("description", Keyword::MaxLength, DESCRIPTION_TOO_LONG)
    .message("urlPath", Keyword::Pattern, URL_PATH_FORMAT)
    .message("sortOrder", Keyword::Type, SORT_ORDER_INTEGER)
    .message("sortOrder", Keyword::Minimum, SORT_ORDER_MIN)
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
    check_max_len(object, "description", None, DESCRIPTION_MAX, DESCRIPTION_TOO_LONG, &mut errors);
    check_url_path(object, &mut errors);

    match present(object, "sortOrder", false).map(Value::as_f64) {
        None => {}
        Some(None) => errors.insert("sortOrder", SORT_ORDER_INTEGER),
        Some(Some(n)) if n.fract() != 0.0 => errors.insert("sortOrder", SORT_ORDER_INTEGER),
        Some(Some(n)) if n < 0.0 => errors.insert("sortOrder", SORT_ORDER_MIN),
        Some(Some(_)) => {}
    }

    errors
}

fn check_url_path(object: &Map<String, Value>, errors: &mut FieldErrors) {
    match present(object, "urlPath", false).map(Value::as_str) {
        None => {}
        Some(None) => errors.insert("urlPath", EXPECTED_STRING),
        Some(Some(path)) => {
            let valid = path.starts_with('/')
                && path[1..]
                    .chars()
                    .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '/');
            if !valid {
                errors.insert("urlPath", URL_PATH_FORMAT);
            }
        }
    }
}
