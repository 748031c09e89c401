//! Declarative schema validation.
//!
//! A `Schema` is a JSON Schema (draft 2020-12) document compiled once with
//! `jsonschema`, a table of user-facing messages keyed by field and keyword,
//! and object-level refinements run after the document passes. `parse`
//! reports rule violations as `Issue`s. It returns `Err` only when the
//! validator cannot evaluate the payload at all (`SchemaFault`).

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use jsonschema::error::ValidationErrorKind;
use jsonschema::{ValidationError, Validator};
use serde_json::{Map, Value};
use thiserror::Error;

use super::{Issue, PathSegment};

/// Deepest nesting of `items` schemas a document may declare.
pub const MAX_SCHEMA_DEPTH: usize = 8;

pub(crate) const EXPECTED_STRING: &str = "Expected a string";
pub(crate) const EXPECTED_NUMBER: &str = "Expected a number";
pub(crate) const EXPECTED_INTEGER: &str = "Expected a whole number";
pub(crate) const EXPECTED_ARRAY: &str = "Expected an array";
pub(crate) const EXPECTED_OBJECT: &str = "Expected an object";

/// Object-level check run once the document validates.
///
/// `Ok(Some(message))` reports an issue at the payload root; `Err` means
/// the check could not be evaluated.
pub type Refinement = fn(&Map<String, Value>) -> Result<Option<String>, String>;

// == Schema Fault ==
/// The validator failed, as opposed to the payload failing a rule.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaFault {
    /// The document did not compile, a pattern blew up mid-match, or a
    /// refinement errored. This is the signature that routes validation to
    /// the fallback path.
    #[error("schema engine fault in rule `{rule}`: {detail}")]
    Internal { rule: String, detail: String },

    /// The document nests `items` deeper than `MAX_SCHEMA_DEPTH`.
    #[error("schema nesting exceeds {max} levels at `{path}`")]
    DepthExceeded { path: String, max: usize },
}

impl SchemaFault {
    pub fn triggers_fallback(&self) -> bool {
        matches!(self, SchemaFault::Internal { .. })
    }
}

// == Keyword ==
/// The JSON Schema keywords messages are attached to, in reporting
/// priority: when one field fails several, the earliest wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Keyword {
    Required,
    Type,
    MinLength,
    MaxLength,
    Pattern,
    Minimum,
    MinItems,
    Other,
}

impl Keyword {
    /// Keyword named by the last segment of an error's schema path.
    fn from_schema_path(schema_path: &str) -> Self {
        match schema_path.rsplit('/').next().unwrap_or("") {
            "required" => Keyword::Required,
            "type" => Keyword::Type,
            "minLength" => Keyword::MinLength,
            "maxLength" => Keyword::MaxLength,
            "pattern" => Keyword::Pattern,
            "minimum" => Keyword::Minimum,
            "minItems" => Keyword::MinItems,
            _ => Keyword::Other,
        }
    }
}

// == Schema ==
#[derive(Clone)]
pub struct Schema {
    document: Value,
    compiled: Result<Arc<Validator>, SchemaFault>,
    messages: HashMap<(String, Keyword), String>,
    refinements: Vec<(String, Refinement)>,
}

impl fmt::Debug for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Schema")
            .field("document", &self.document)
            .field("compiled", &self.compiled.is_ok())
            .field("messages", &self.messages.len())
            .field("refinements", &self.refinements.len())
            .finish()
    }
}

impl Schema {
    /// Compiles `document`. A document that fails to compile still builds a
    /// `Schema`; every `parse` then reports the fault.
    pub fn new(document: Value) -> Self {
        let compiled = match too_deep(&document, String::new(), 0) {
            Some(path) => Err(SchemaFault::DepthExceeded {
                path,
                max: MAX_SCHEMA_DEPTH,
            }),
            None => jsonschema::draft202012::new(&document)
                .map(Arc::new)
                .map_err(|err| SchemaFault::Internal {
                    rule: err.instance_path().to_string(),
                    detail: err.to_string(),
                }),
        };

        Self {
            document,
            compiled,
            messages: HashMap::new(),
            refinements: Vec::new(),
        }
    }

    /// Message for `keyword` failing on `field`, a dot path with `*` for
    /// array indices (`variants.*.sku`).
    ///
    /// A `Required` message also covers an empty string failing `minLength`.
    pub fn message(
        mut self,
        field: impl Into<String>,
        keyword: Keyword,
        message: impl Into<String>,
    ) -> Self {
        self.messages.insert((field.into(), keyword), message.into());
        self
    }

    pub fn refine(mut self, name: impl Into<String>, refinement: Refinement) -> Self {
        self.refinements.push((name.into(), refinement));
        self
    }

    // == Parse ==
    /// Checks `value` and returns every issue found; empty means valid.
    ///
    /// Each field reports one issue, for its highest-priority keyword.
    pub fn parse(&self, value: &Value) -> Result<Vec<Issue>, SchemaFault> {
        let validator = self.compiled.as_ref().map_err(Clone::clone)?;

        let mut found = Vec::new();
        for error in validator.iter_errors(value) {
            if matches!(error.kind(), ValidationErrorKind::BacktrackLimitExceeded { .. }) {
                return Err(SchemaFault::Internal {
                    rule: error.schema_path().to_string(),
                    detail: error.to_string(),
                });
            }
            found.push(self.issue_for(&error, value));
        }
        found.sort_by_key(|(keyword, _)| *keyword);

        let mut issues: Vec<Issue> = Vec::new();
        for (_, issue) in found {
            if !issues.iter().any(|seen| seen.path == issue.path) {
                issues.push(issue);
            }
        }

        // refinements only see payloads whose fields are already valid
        let Some(object) = value.as_object().filter(|_| issues.is_empty()) else {
            return Ok(issues);
        };
        for (name, refinement) in &self.refinements {
            match refinement(object) {
                Ok(Some(message)) => issues.push(Issue::new(Vec::new(), message)),
                Ok(None) => {}
                Err(detail) => {
                    return Err(SchemaFault::Internal {
                        rule: name.clone(),
                        detail,
                    })
                }
            }
        }

        Ok(issues)
    }

    fn issue_for(&self, error: &ValidationError<'_>, payload: &Value) -> (Keyword, Issue) {
        let schema_path = error.schema_path().to_string();
        let instance_path = error.instance_path().to_string();
        let keyword = Keyword::from_schema_path(&schema_path);

        let mut path = pointer_segments(&instance_path);
        if let ValidationErrorKind::Required { property } = error.kind() {
            if let Some(name) = property.as_str() {
                path.push(PathSegment::Key(name.to_string()));
            }
        }

        let field = field_template(&path);
        let lookup = |keyword| self.messages.get(&(field.clone(), keyword)).cloned();
        let blank = payload.pointer(&instance_path).and_then(Value::as_str) == Some("");

        let message = match keyword {
            Keyword::MinLength if blank => lookup(Keyword::Required).or_else(|| lookup(keyword)),
            _ => lookup(keyword),
        }
        .or_else(|| (keyword == Keyword::Type).then(|| self.expected_type(&schema_path)))
        .unwrap_or_else(|| error.to_string());

        (keyword, Issue::new(path, message))
    }

    /// Generic message for a `type` failure, read from the document.
    fn expected_type(&self, schema_path: &str) -> String {
        let expected = match self.document.pointer(schema_path).and_then(Value::as_str) {
            Some("string") => EXPECTED_STRING,
            Some("number") => EXPECTED_NUMBER,
            Some("integer") => EXPECTED_INTEGER,
            Some("array") => EXPECTED_ARRAY,
            Some("object") => EXPECTED_OBJECT,
            _ => "Invalid value",
        };
        expected.to_string()
    }
}

/// `/variants/0/sku` as path segments.
fn pointer_segments(pointer: &str) -> Vec<PathSegment> {
    pointer
        .split('/')
        .skip(1)
        .map(|raw| {
            let key = raw.replace("~1", "/").replace("~0", "~");
            match key.parse::<usize>() {
                Ok(idx) => PathSegment::Index(idx),
                Err(_) => PathSegment::Key(key),
            }
        })
        .collect()
}

/// Dot path with indices replaced by `*`, as messages are registered.
fn field_template(path: &[PathSegment]) -> String {
    path.iter()
        .map(|segment| match segment {
            PathSegment::Key(key) => key.as_str(),
            PathSegment::Index(_) => "*",
        })
        .collect::<Vec<_>>()
        .join(".")
}

/// Schema pointer of the first `items` nested past `MAX_SCHEMA_DEPTH`.
fn too_deep(node: &Value, pointer: String, depth: usize) -> Option<String> {
    if depth > MAX_SCHEMA_DEPTH {
        return Some(pointer);
    }
    match node {
        Value::Object(map) => map.iter().find_map(|(key, child)| {
            let next = if key == "items" { depth + 1 } else { depth };
            too_deep(child, format!("{}/{}", pointer, key), next)
        }),
        Value::Array(items) => items
            .iter()
            .enumerate()
            .find_map(|(idx, child)| too_deep(child, format!("{}/{}", pointer, idx), depth)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn paths(issues: &[Issue]) -> Vec<String> {
        issues.iter().map(Issue::field_path).collect()
    }

    fn named() -> Schema {
        Schema::new(json!({
            "type": "object",
            "required": ["name"],
            "properties": {
                "name": {"type": "string", "minLength": 1},
                "note": {"type": "string", "maxLength": 3}
            }
        }))
        .message("name", Keyword::Required, "Name is required")
        .message("note", Keyword::MaxLength, "too long")
    }

    #[test]
    fn test_required_covers_missing_and_empty() {
        let schema = named();

        for input in [json!({}), json!({"name": ""})] {
            let issues = schema.parse(&input).unwrap();
            assert_eq!(paths(&issues), vec!["name"]);
            assert_eq!(issues[0].message, "Name is required");
        }
        assert!(schema.parse(&json!({"name": "Sofa"})).unwrap().is_empty());
    }

    #[test]
    fn test_optional_field_checked_only_when_present() {
        let schema = named();

        assert!(schema.parse(&json!({"name": "x"})).unwrap().is_empty());
        let issues = schema.parse(&json!({"name": "x", "note": "abcd"})).unwrap();
        assert_eq!(paths(&issues), vec!["note"]);
        assert_eq!(issues[0].message, "too long");
    }

    #[test]
    fn test_unmapped_type_failure_names_expected_type() {
        let issues = named().parse(&json!({"name": 7})).unwrap();
        assert_eq!(issues[0].message, EXPECTED_STRING);
    }

    #[test]
    fn test_highest_priority_keyword_wins() {
        let schema = Schema::new(json!({
            "type": "object",
            "properties": {"stock": {"type": "integer", "minimum": 0}}
        }))
        .message("stock", Keyword::Type, "Stock must be a whole number")
        .message("stock", Keyword::Minimum, "Stock cannot be negative");

        let issues = schema.parse(&json!({"stock": -1.5})).unwrap();
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].message, "Stock must be a whole number");

        let issues = schema.parse(&json!({"stock": -1})).unwrap();
        assert_eq!(issues[0].message, "Stock cannot be negative");
    }

    #[test]
    fn test_items_report_indexed_paths() {
        let schema = Schema::new(json!({
            "type": "object",
            "properties": {
                "variants": {
                    "type": "array",
                    "items": {
                        "type": "object",
                        "required": ["sku"],
                        "properties": {"sku": {"type": "string", "pattern": "^[A-Z]+$"}}
                    }
                }
            }
        }))
        .message("variants.*.sku", Keyword::Required, "SKU is required")
        .message("variants.*.sku", Keyword::Pattern, "SKU format");

        let issues = schema
            .parse(&json!({"variants": [{"sku": "A"}, {}, "oops", {"sku": "a"}]}))
            .unwrap();
        let mut found: Vec<(String, String)> = issues
            .iter()
            .map(|issue| (issue.field_path(), issue.message.clone()))
            .collect();
        found.sort();

        assert_eq!(
            found,
            vec![
                ("variants.1.sku".to_string(), "SKU is required".to_string()),
                ("variants.2".to_string(), EXPECTED_OBJECT.to_string()),
                ("variants.3.sku".to_string(), "SKU format".to_string()),
            ]
        );
    }

    #[test]
    fn test_non_object_payload_reports_form() {
        let issues = named().parse(&json!([1, 2])).unwrap();
        assert_eq!(paths(&issues), vec!["form"]);
        assert_eq!(issues[0].message, EXPECTED_OBJECT);
    }

    #[test]
    fn test_refinement_runs_after_fields_pass() {
        fn never_ok(_: &Map<String, Value>) -> Result<Option<String>, String> {
            Ok(Some("Object is invalid".to_string()))
        }
        let schema = named().refine("never_ok", never_ok);

        assert_eq!(paths(&schema.parse(&json!({})).unwrap()), vec!["name"]);
        assert_eq!(
            paths(&schema.parse(&json!({"name": "x"})).unwrap()),
            vec!["form"]
        );
    }

    #[test]
    fn test_uncompilable_pattern_is_internal_fault() {
        let schema = Schema::new(json!({
            "type": "object",
            "properties": {"slug": {"type": "string", "pattern": "([a-z"}}
        }));

        let fault = schema.parse(&json!({"slug": "abc"})).unwrap_err();
        assert!(fault.triggers_fallback());
        assert!(matches!(fault, SchemaFault::Internal { .. }));
    }

    #[test]
    fn test_erroring_refinement_is_internal_fault() {
        fn broken(_: &Map<String, Value>) -> Result<Option<String>, String> {
            Err("cannot read property of undefined".to_string())
        }
        let schema = Schema::new(json!({"type": "object"})).refine("broken", broken);

        let fault = schema.parse(&json!({})).unwrap_err();
        assert!(fault.triggers_fallback());
        assert!(matches!(fault, SchemaFault::Internal { ref rule, .. } if rule == "broken"));
    }

    #[test]
    fn test_depth_exceeded_does_not_trigger_fallback() {
        let mut document = json!({"type": "object"});
        for _ in 0..=MAX_SCHEMA_DEPTH {
            document = json!({"type": "array", "items": document});
        }

        let fault = Schema::new(document).parse(&json!([])).unwrap_err();
        assert!(matches!(fault, SchemaFault::DepthExceeded { .. }));
        assert!(!fault.triggers_fallback());
    }

    #[test]
    fn test_pointer_segments() {
        assert_eq!(pointer_segments(""), Vec::<PathSegment>::new());
        assert_eq!(
            pointer_segments("/variants/0/a~1b"),
            vec![
                PathSegment::Key("variants".into()),
                PathSegment::Index(0),
                PathSegment::Key("a/b".into()),
            ]
        );
        assert_eq!(field_template(&pointer_segments("/variants/12/sku")), "variants.*.sku");
    }
}
