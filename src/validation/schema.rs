use anyhow::{Context, Result};
use jsonschema::{Validator, error::ValidationErrorKind, validator_for};
use schemars::JsonSchema;
use serde_json::Value;

use crate::domain::{FieldPath, Record};

use super::{Validate, ValidationResult};

/// Validates a form against a JSON Schema, mapping each violation onto the
/// field it concerns.
pub struct SchemaValidator {
    validator: Validator,
}

impl std::fmt::Debug for SchemaValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SchemaValidator").finish_non_exhaustive()
    }
}

impl SchemaValidator {
    pub fn new(schema: &Value) -> Result<Self> {
        let validator = validator_for(schema).context("failed to compile JSON schema")?;
        Ok(Self { validator })
    }

    /// Builds the validator from the schema derived for a typed entity.
    pub fn for_type<T: JsonSchema>() -> Result<Self> {
        let schema = schemars::schema_for!(T);
        let schema = serde_json::to_value(schema).context("failed to serialize derived schema")?;
        Self::new(&schema)
    }
}

impl Validate for SchemaValidator {
    fn validate(&self, record: &Record) -> ValidationResult {
        let value = record.to_json();
        let mut result = ValidationResult::valid();
        if self.validator.is_valid(&value) {
            return result;
        }
        for error in self.validator.iter_errors(&value) {
            let pointer = error.instance_path.to_string();
            let message = error.to_string();
            let mut path = FieldPath::from_pointer(&pointer);
            // Missing properties are reported against their parent object.
            if let ValidationErrorKind::Required { property } = &error.kind
                && let Some(name) = property.as_str()
            {
                path = if path.is_empty() {
                    FieldPath::field(name)
                } else {
                    path.key(name)
                };
            }
            if path.is_empty() {
                result.add_global(format!("<root>: {message}"));
            } else {
                result.add(&path, message);
            }
        }
        result
    }
}
