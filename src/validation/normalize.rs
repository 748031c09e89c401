//! Payload normalization shared by the entity rule sets.
//!
//! Runs before either validation path so both see the same cleaned data.

use serde_json::{Map, Number, Value};

/// Removes top-level `null` entries so they read as absent.
pub fn drop_nulls(object: &mut Map<String, Value>) {
    object.retain(|_, value| !value.is_null());
}

/// Trims the named string fields in place.
pub fn trim_fields(object: &mut Map<String, Value>, fields: &[&str]) {
    for field in fields {
        if let Some(Value::String(s)) = object.get_mut(*field) {
            let trimmed = s.trim();
            if trimmed.len() != s.len() {
                *s = trimmed.to_string();
            }
        }
    }
}

/// Turns numeric strings into numbers; blank strings become absent.
///
/// Integral values are stored as integers so they deserialize into integer
/// types. Strings that do not parse are left for the validator to reject.
pub fn coerce_numbers(object: &mut Map<String, Value>, fields: &[&str]) {
    for field in fields {
        // Some(None) = drop the field, Some(Some(n)) = replace it
        let replacement = match object.get(*field) {
            Some(Value::String(s)) if s.trim().is_empty() => Some(None),
            Some(Value::String(s)) => s
                .trim()
                .parse::<f64>()
                .ok()
                .and_then(to_json_number)
                .map(Some),
            Some(Value::Number(n)) => n.as_f64().and_then(to_json_number).map(Some),
            _ => None,
        };

        match replacement {
            Some(Some(number)) => {
                object.insert(field.to_string(), Value::Number(number));
            }
            Some(None) => {
                object.remove(*field);
            }
            None => {}
        }
    }
}

fn to_json_number(n: f64) -> Option<Number> {
    if !n.is_finite() {
        return None;
    }
    if n.fract() == 0.0 && n.abs() < i64::MAX as f64 {
        Some(Number::from(n as i64))
    } else {
        Number::from_f64(n)
    }
}

/// Reads form-style booleans ("on", "1", "false", ...) into JSON booleans.
pub fn coerce_bools(object: &mut Map<String, Value>, fields: &[&str]) {
    for field in fields {
        let parsed = match object.get(*field).and_then(Value::as_str).map(str::trim) {
            Some("true") | Some("on") | Some("1") => Some(true),
            Some("false") | Some("off") | Some("0") | Some("") => Some(false),
            _ => None,
        };
        if let Some(flag) = parsed {
            object.insert(field.to_string(), Value::Bool(flag));
        }
    }
}

/// Trims each string of an array field and drops the blank ones.
pub fn compact_string_array(object: &mut Map<String, Value>, field: &str) {
    if let Some(Value::Array(items)) = object.get_mut(field) {
        items.retain_mut(|item| match item {
            Value::String(s) => {
                *s = s.trim().to_string();
                !s.is_empty()
            }
            _ => true,
        });
    }
}

/// Applies `normalize` to every object element of an array field.
pub fn each_object(
    object: &mut Map<String, Value>,
    field: &str,
    normalize: impl Fn(&mut Map<String, Value>),
) {
    if let Some(Value::Array(items)) = object.get_mut(field) {
        for item in items.iter_mut() {
            if let Value::Object(inner) = item {
                normalize(inner);
            }
        }
    }
}

/// Splits a delimited string (newlines, commas or pipes) into trimmed,
/// non-empty entries. Arrays pass through with the same cleanup.
pub fn split_list(value: &Value) -> Vec<String> {
    match value {
        Value::String(s) => s
            .split(['\n', ',', '|'])
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(str::to_string)
            .collect(),
        Value::Array(items) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    }
}
