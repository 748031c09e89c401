//! Product payload rules.

use serde_json::{json, Map, Value};

use super::{
    check_max_len, check_slug, path, present, EXPECTED_ARRAY, EXPECTED_OBJECT, EXPECTED_STRING,
    SLUG_FORMAT, SLUG_PATTERN, SLUG_REQUIRED,
};
use crate::domain::ProductInput;
use crate::validation::normalize::{
    coerce_numbers, compact_string_array, drop_nulls, each_object, trim_fields,
};
use crate::validation::{FieldErrors, Keyword, Schema, ValidationPipeline, FORM_KEY};

pub const NAME_REQUIRED: &str = "Product name is required";
pub const NAME_TOO_LONG: &str = "Product name must be at most 200 characters";
pub const DESCRIPTION_TOO_LONG: &str = "Description must be at most 5000 characters";
pub const PRICE_REQUIRED: &str = "Price is required";
pub const PRICE_NUMBER: &str = "Price must be a number";
pub const PRICE_MIN: &str = "Price must be zero or greater";
pub const COMPARE_NUMBER: &str = "Compare-at price must be a number";
pub const COMPARE_MIN: &str = "Compare-at price must be zero or greater";
pub const COMPARE_ABOVE_PRICE: &str = "Compare-at price must be greater than the price";
pub const IMAGES_REQUIRED: &str = "At least one image is required";
pub const VARIANTS_REQUIRED: &str = "At least one variant is required";
pub const VARIANT_NAME_REQUIRED: &str = "Variant name is required";
pub const SKU_PATTERN: &str = r"^[A-Z0-9-]+$";
pub const SKU_REQUIRED: &str = "SKU is required";
pub const SKU_FORMAT: &str = "SKU may only contain uppercase letters, numbers and hyphens";
pub const VARIANT_PRICE_REQUIRED: &str = "Variant price is required";
pub const VARIANT_PRICE_NUMBER: &str = "Variant price must be a number";
pub const VARIANT_PRICE_MIN: &str = "Variant price must be zero or greater";
pub const STOCK_REQUIRED: &str = "Stock is required";
pub const STOCK_INTEGER: &str = "Stock must be a whole number";
pub const STOCK_MIN: &str = "Stock cannot be negative";
pub const SPEC_KEY_REQUIRED: &str = "Specification name is required";

const NAME_MAX: usize = 200;
const DESCRIPTION_MAX: usize = 5000;

pub fn pipeline() -> ValidationPipeline<ProductInput> {
    ValidationPipeline::new("product", schema(), normalize, fallback)
}

// == Normalization ==
pub fn normalize(value: Value) -> Value {
    let mut object = match value {
        Value::Object(object) => object,
        other => return other,
    };

    drop_nulls(&mut object);
    trim_fields(&mut object, &["name", "slug", "description"]);
    coerce_numbers(&mut object, &["price", "compareAtPrice"]);
    compact_string_array(&mut object, "images");
    each_object(&mut object, "variants", |variant| {
        trim_fields(variant, &["name", "sku"]);
        coerce_numbers(variant, &["price", "stock"]);
    });

    if let Some(Value::Array(specs)) = object.get_mut("specifications") {
        specs.retain_mut(|spec| {
            let Value::Object(spec) = spec else {
                return true;
            };
            trim_fields(spec, &["key", "value"]);
            let blank = |field: &str| {
                spec.get(field)
                    .map_or(true, |v| v.is_null() || v.as_str() == Some(""))
            };
            if blank("key") && blank("value") {
                return false;
            }
            if spec.get("value").map_or(true, Value::is_null) {
                spec.insert("value".to_string(), Value::String(String::new()));
            }
            true
        });
    }

    let category = object
        .get("category")
        .and_then(Value::as_str)
        .map(|name| name.trim().to_string());
    if let Some(name) = category {
        let value = if name.is_empty() {
            Value::Null
        } else {
            Value::String(name)
        };
        object.insert("category".to_string(), value);
    }

    Value::Object(object)
}

// == Schema ==
pub fn schema() -> Schema {
    let price = json!({"type": "number", "minimum": 0});

    Schema::new(json!({
        "type": "object",
        "required": ["name", "slug", "price", "images", "variants"],
        "properties": {
            "name": {"type": "string", "minLength": 1, "maxLength": NAME_MAX},
            "slug": {"type": "string", "minLength": 1, "pattern": SLUG_PATTERN},
            "description": {"type": "string", "maxLength": DESCRIPTION_MAX},
            "price": price,
            "compareAtPrice": price,
            "images": {"type": "array", "minItems": 1},
            "variants": {
                "type": "array",
                "minItems": 1,
                "items": {
                    "type": "object",
                    "required": ["name", "sku", "price", "stock"],
                    "properties": {
                        "name": {"minLength": 1},
                        "sku": {"type": "string", "minLength": 1, "pattern": SKU_PATTERN},
                        "price": price,
                        "stock": {"type": "integer", "minimum": 0}
                    }
                }
            },
            "specifications": {
                "type": "array",
                "items": {
                    "type": "object",
                    "required": ["key"],
                    "properties": {"key": {"minLength": 1}}
                }
            }
        }
    }))
    .message("name", Keyword::Required, NAME_REQUIRED)
    .message("name", Keyword::MaxLength, NAME_TOO_LONG)
    .message("slug", Keyword::Required, SLUG_REQUIRED)
    .message("slug", Keyword::Pattern, SLUG_FORMAT)
    .message("description", Keyword::MaxLength, DESCRIPTION_TOO_LONG)
    .message("price", Keyword::Required, PRICE_REQUIRED)
    .message("price", Keyword::Type, PRICE_NUMBER)
    .message("price", Keyword::Minimum, PRICE_MIN)
    .message("compareAtPrice", Keyword::Type, COMPARE_NUMBER)
    .message("compareAtPrice", Keyword::Minimum, COMPARE_MIN)
    .message("images", Keyword::Required, IMAGES_REQUIRED)
    .message("images", Keyword::MinItems, IMAGES_REQUIRED)
    .message("variants", Keyword::Required, VARIANTS_REQUIRED)
    .message("variants", Keyword::MinItems, VARIANTS_REQUIRED)
    .message("variants.*.name", Keyword::Required, VARIANT_NAME_REQUIRED)
    .message("variants.*.sku", Keyword::Required, SKU_REQUIRED)
    .message("variants.*.sku", Keyword::Pattern, SKU_FORMAT)
    .message("variants.*.price", Keyword::Required, VARIANT_PRICE_REQUIRED)
    .message("variants.*.price", Keyword::Type, VARIANT_PRICE_NUMBER)
    .message("variants.*.price", Keyword::Minimum, VARIANT_PRICE_MIN)
    .message("variants.*.stock", Keyword::Required, STOCK_REQUIRED)
    .message("variants.*.stock", Keyword::Type, STOCK_INTEGER)
    .message("variants.*.stock", Keyword::Minimum, STOCK_MIN)
    .message("specifications.*.key", Keyword::Required, SPEC_KEY_REQUIRED)
    .refine("compare_at_above_price", compare_at_above_price)
}

fn compare_at_above_price(object: &Map<String, Value>) -> Result<Option<String>, String> {
    let Some(compare_at) = object.get("compareAtPrice").and_then(Value::as_f64) else {
        return Ok(None);
    };
    let price = object
        .get("price")
        .and_then(Value::as_f64)
        .ok_or_else(|| "price missing after field checks".to_string())?;

    Ok((compare_at <= price).then(|| COMPARE_ABOVE_PRICE.to_string()))
}

// == Fallback ==
/// Field-by-field equivalent of `schema()`.
pub fn fallback(value: &Value) -> FieldErrors {
    let mut errors = FieldErrors::new();
    let Some(object) = value.as_object() else {
        errors.insert(FORM_KEY, EXPECTED_OBJECT);
        return errors;
    };

    check_max_len(object, "name", Some(NAME_REQUIRED), NAME_MAX, NAME_TOO_LONG, &mut errors);
    check_slug(object, "", &mut errors);
    check_max_len(object, "description", None, DESCRIPTION_MAX, DESCRIPTION_TOO_LONG, &mut errors);
    check_price(object, "", "price", Some(PRICE_REQUIRED), PRICE_NUMBER, PRICE_MIN, &mut errors);
    check_price(object, "", "compareAtPrice", None, COMPARE_NUMBER, COMPARE_MIN, &mut errors);

    match present(object, "images", true) {
        None => errors.insert("images", IMAGES_REQUIRED),
        Some(Value::Array(images)) if images.is_empty() => errors.insert("images", IMAGES_REQUIRED),
        Some(Value::Array(_)) => {}
        Some(_) => errors.insert("images", EXPECTED_ARRAY),
    }

    match present(object, "variants", true) {
        None => errors.insert("variants", VARIANTS_REQUIRED),
        Some(Value::Array(variants)) if variants.is_empty() => {
            errors.insert("variants", VARIANTS_REQUIRED)
        }
        Some(Value::Array(variants)) => {
            for (idx, variant) in variants.iter().enumerate() {
                let prefix = format!("variants.{}", idx);
                match variant.as_object() {
                    Some(variant) => check_variant(variant, &prefix, &mut errors),
                    None => errors.insert(prefix, EXPECTED_OBJECT),
                }
            }
        }
        Some(_) => errors.insert("variants", EXPECTED_ARRAY),
    }

    match present(object, "specifications", false) {
        None => {}
        Some(Value::Array(specs)) => {
            for (idx, spec) in specs.iter().enumerate() {
                let prefix = format!("specifications.{}", idx);
                match spec.as_object() {
                    Some(spec) => {
                        if present(spec, "key", true).is_none() {
                            errors.insert(path(&prefix, "key"), SPEC_KEY_REQUIRED);
                        }
                    }
                    None => errors.insert(prefix, EXPECTED_OBJECT),
                }
            }
        }
        Some(_) => errors.insert("specifications", EXPECTED_ARRAY),
    }

    if errors.is_empty() {
        let price = object.get("price").and_then(Value::as_f64);
        let compare_at = object.get("compareAtPrice").and_then(Value::as_f64);
        if let (Some(price), Some(compare_at)) = (price, compare_at) {
            if compare_at <= price {
                errors.insert(FORM_KEY, COMPARE_ABOVE_PRICE);
            }
        }
    }

    errors
}

fn check_variant(variant: &Map<String, Value>, prefix: &str, errors: &mut FieldErrors) {
    if present(variant, "name", true).is_none() {
        errors.insert(path(prefix, "name"), VARIANT_NAME_REQUIRED);
    }

    let sku_path = path(prefix, "sku");
    match present(variant, "sku", true).map(Value::as_str) {
        None => errors.insert(sku_path, SKU_REQUIRED),
        Some(None) => errors.insert(sku_path, EXPECTED_STRING),
        Some(Some(sku)) => {
            let valid = sku
                .chars()
                .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '-');
            if !valid {
                errors.insert(sku_path, SKU_FORMAT);
            }
        }
    }

    check_price(
        variant,
        prefix,
        "price",
        Some(VARIANT_PRICE_REQUIRED),
        VARIANT_PRICE_NUMBER,
        VARIANT_PRICE_MIN,
        errors,
    );

    let stock_path = path(prefix, "stock");
    match present(variant, "stock", true).map(Value::as_f64) {
        None => errors.insert(stock_path, STOCK_REQUIRED),
        Some(None) => errors.insert(stock_path, STOCK_INTEGER),
        Some(Some(stock)) if stock.fract() != 0.0 => errors.insert(stock_path, STOCK_INTEGER),
        Some(Some(stock)) if stock < 0.0 => errors.insert(stock_path, STOCK_MIN),
        Some(Some(_)) => {}
    }
}

fn check_price(
    object: &Map<String, Value>,
    prefix: &str,
    name: &str,
    required: Option<&str>,
    not_number: &str,
    below_zero: &str,
    errors: &mut FieldErrors,
) {
    let field = path(prefix, name);
    match present(object, name, required.is_some()) {
        None => {
            if let Some(message) = required {
                errors.insert(field, message);
            }
        }
        Some(value) => match value.as_f64() {
            Some(n) if n < 0.0 => errors.insert(field, below_zero),
            Some(_) => {}
            None => errors.insert(field, not_number),
        },
    }
}
