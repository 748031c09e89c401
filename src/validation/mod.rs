//! Validation Module
//!
//! Mutation payloads go through three steps: entity-specific normalization,
//! the declarative `Schema`, and, only when the schema engine itself faults,
//! a hand-written fallback validator with the same rules and error shape.

mod normalize;
mod pipeline;
pub mod rules;
mod schema;

use std::collections::BTreeMap;

use serde::{ser::SerializeStruct, Deserialize, Serialize, Serializer};

pub use pipeline::{PipelineError, ValidationPipeline};
pub use schema::{Keyword, Refinement, Schema, SchemaFault, MAX_SCHEMA_DEPTH};

/// Key used for issues that belong to the whole payload rather than a field.
pub const FORM_KEY: &str = "form";

// == Issue ==
/// One segment of a path into a JSON payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    Key(String),
    Index(usize),
}

impl std::fmt::Display for PathSegment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PathSegment::Key(key) => f.write_str(key),
            PathSegment::Index(idx) => write!(f, "{}", idx),
        }
    }
}

/// A single rule violation reported by the schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Issue {
    pub path: Vec<PathSegment>,
    pub message: String,
}

impl Issue {
    pub fn new(path: Vec<PathSegment>, message: impl Into<String>) -> Self {
        Self {
            path,
            message: message.into(),
        }
    }

    /// Dot-joined path, or `"form"` for the payload root.
    pub fn field_path(&self) -> String {
        join_path(&self.path)
    }
}

pub(crate) fn join_path(path: &[PathSegment]) -> String {
    if path.is_empty() {
        return FORM_KEY.to_string();
    }
    path.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(".")
}

// == Field Errors ==
/// Field path → message. The first message recorded for a path wins.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, String>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.0.entry(path.into()).or_insert_with(|| message.into());
    }

    pub fn from_issues(issues: &[Issue]) -> Self {
        let mut errors = Self::new();
        for issue in issues {
            errors.insert(issue.field_path(), issue.message.clone());
        }
        errors
    }

    pub fn get(&self, path: &str) -> Option<&str> {
        self.0.get(path).map(String::as_str)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.0.contains_key(path)
    }

    /// Paths in sorted order.
    pub fn paths(&self) -> Vec<&str> {
        self.0.keys().map(String::as_str).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

// == Validation Result ==
/// Outcome of validating a payload. Data and errors never coexist.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationResult<T> {
    Valid(T),
    Invalid(FieldErrors),
}

impl<T> ValidationResult<T> {
    pub fn is_valid(&self) -> bool {
        matches!(self, ValidationResult::Valid(_))
    }

    pub fn errors(&self) -> Option<&FieldErrors> {
        match self {
            ValidationResult::Valid(_) => None,
            ValidationResult::Invalid(errors) => Some(errors),
        }
    }

    pub fn into_result(self) -> Result<T, FieldErrors> {
        match self {
            ValidationResult::Valid(data) => Ok(data),
            ValidationResult::Invalid(errors) => Err(errors),
        }
    }
}

impl<T: Serialize> Serialize for ValidationResult<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("ValidationResult", 2)?;
        match self {
            ValidationResult::Valid(data) => {
                state.serialize_field("success", &true)?;
                state.serialize_field("data", data)?;
            }
            ValidationResult::Invalid(errors) => {
                state.serialize_field("success", &false)?;
                state.serialize_field("errors", errors)?;
            }
        }
        state.end()
    }
}
