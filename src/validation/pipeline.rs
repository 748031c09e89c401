//! Validation pipeline: normalize, validate with the schema, fall back to the
//! hand-written validator when the schema engine faults.

use std::marker::PhantomData;

use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;
use tracing::warn;

use super::{FieldErrors, Schema, SchemaFault, ValidationResult, FORM_KEY};

/// A schema fault that is not the fallback signature.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{entity} validation failed: {source}")]
pub struct PipelineError {
    pub entity: &'static str,
    #[source]
    pub source: SchemaFault,
}

/// Validates raw JSON payloads into `T`.
///
/// Pure: no I/O, no shared state. Callers persist and invalidate afterwards.
pub struct ValidationPipeline<T> {
    entity: &'static str,
    schema: Schema,
    normalize: fn(Value) -> Value,
    fallback: fn(&Value) -> FieldErrors,
    _output: PhantomData<fn() -> T>,
}

impl<T: DeserializeOwned> ValidationPipeline<T> {
    pub fn new(
        entity: &'static str,
        schema: Schema,
        normalize: fn(Value) -> Value,
        fallback: fn(&Value) -> FieldErrors,
    ) -> Self {
        Self {
            entity,
            schema,
            normalize,
            fallback,
            _output: PhantomData,
        }
    }

    /// Same pipeline with a different schema.
    pub fn with_schema(self, schema: Schema) -> Self {
        Self { schema, ..self }
    }

    // == Validate ==
    pub fn validate(&self, input: Value) -> Result<ValidationResult<T>, PipelineError> {
        let normalized = self.normalize(input);

        let errors = match self.schema_errors(&normalized) {
            Ok(errors) => errors,
            Err(fault) if fault.triggers_fallback() => {
                warn!(
                    entity = self.entity,
                    fault = %fault,
                    "schema engine faulted, using fallback validator"
                );
                self.fallback_errors(&normalized)
            }
            Err(fault) => {
                return Err(PipelineError {
                    entity: self.entity,
                    source: fault,
                })
            }
        };

        if !errors.is_empty() {
            return Ok(ValidationResult::Invalid(errors));
        }

        match serde_json::from_value(normalized) {
            Ok(data) => Ok(ValidationResult::Valid(data)),
            Err(err) => {
                let mut errors = FieldErrors::new();
                errors.insert(FORM_KEY, format!("Invalid {} payload: {}", self.entity, err));
                Ok(ValidationResult::Invalid(errors))
            }
        }
    }

    pub fn normalize(&self, input: Value) -> Value {
        (self.normalize)(input)
    }

    /// Primary path only, on already-normalized data.
    pub fn schema_errors(&self, normalized: &Value) -> Result<FieldErrors, SchemaFault> {
        self.schema
            .parse(normalized)
            .map(|issues| FieldErrors::from_issues(&issues))
    }

    /// Fallback path only, on already-normalized data.
    pub fn fallback_errors(&self, normalized: &Value) -> FieldErrors {
        (self.fallback)(normalized)
    }

    pub fn entity(&self) -> &'static str {
        self.entity
    }
}
