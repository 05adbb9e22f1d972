mod rating;
mod rules;
mod schema;

use indexmap::IndexMap;

use crate::domain::Record;

pub use rating::{MAX_COMMENT_CHARS, RatingRules, is_special_rating};
pub use rules::Rules;
pub use schema::SchemaValidator;

/// Per-field verdict of a validation pass. Derived from the form on demand,
/// never stored as independent state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationResult {
    field_errors: IndexMap<String, String>,
    global_errors: Vec<String>,
}

impl ValidationResult {
    pub fn valid() -> Self {
        Self::default()
    }

    pub fn is_valid(&self) -> bool {
        self.field_errors.is_empty() && self.global_errors.is_empty()
    }

    /// Records an error for `field`; the first message per field wins.
    pub fn add(&mut self, field: impl ToString, message: impl Into<String>) {
        self.field_errors
            .entry(field.to_string())
            .or_insert_with(|| message.into());
    }

    pub fn add_global(&mut self, message: impl Into<String>) {
        self.global_errors.push(message.into());
    }

    pub fn with_error(mut self, field: impl ToString, message: impl Into<String>) -> Self {
        self.add(field, message);
        self
    }

    pub fn is_field_valid(&self, field: &str) -> bool {
        !self.field_errors.contains_key(field)
    }

    pub fn error_for(&self, field: &str) -> Option<&str> {
        self.field_errors.get(field).map(String::as_str)
    }

    pub fn field_errors(&self) -> impl Iterator<Item = (&str, &str)> {
        self.field_errors
            .iter()
            .map(|(field, message)| (field.as_str(), message.as_str()))
    }

    pub fn global_errors(&self) -> &[String] {
        &self.global_errors
    }

    pub fn issue_count(&self) -> usize {
        self.field_errors.len() + self.global_errors.len()
    }

    pub fn merge(mut self, other: ValidationResult) -> Self {
        for (field, message) in other.field_errors {
            self.add(field, message);
        }
        self.global_errors.extend(other.global_errors);
        self
    }
}

/// Checks a form before anything is sent to the server.
pub trait Validate {
    fn validate(&self, record: &Record) -> ValidationResult;

    /// Shapes the outgoing payload once validation has passed.
    fn prepare(&self, record: &Record) -> Record {
        record.clone()
    }
}

impl<F> Validate for F
where
    F: Fn(&Record) -> ValidationResult,
{
    fn validate(&self, record: &Record) -> ValidationResult {
        self(record)
    }
}

/// Accepts everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoValidation;

impl Validate for NoValidation {
    fn validate(&self, _record: &Record) -> ValidationResult {
        ValidationResult::valid()
    }
}

/// Both validators must pass; payload shaping runs left then right.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllOf<A, B>(pub A, pub B);

impl<A: Validate, B: Validate> Validate for AllOf<A, B> {
    fn validate(&self, record: &Record) -> ValidationResult {
        self.0.validate(record).merge(self.1.validate(record))
    }

    fn prepare(&self, record: &Record) -> Record {
        self.1.prepare(&self.0.prepare(record))
    }
}
