use std::sync::Arc;

use regex::Regex;

use crate::domain::{FieldPath, FieldValue, Record};

use super::{Validate, ValidationResult};

type Condition = Arc<dyn Fn(&Record) -> bool + Send + Sync>;

#[derive(Clone)]
enum Check {
    Required {
        path: FieldPath,
        message: String,
    },
    RequiredWhen {
        path: FieldPath,
        condition: Condition,
        message: String,
    },
    MaxChars {
        path: FieldPath,
        max: usize,
        message: String,
    },
    Pattern {
        path: FieldPath,
        pattern: Regex,
        message: String,
    },
}

/// Declarative field checks, evaluated in the order they were added.
#[derive(Clone, Default)]
pub struct Rules {
    checks: Vec<Check>,
}

impl std::fmt::Debug for Rules {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rules")
            .field("checks", &self.checks.len())
            .finish()
    }
}

impl Rules {
    pub fn new() -> Self {
        Self::default()
    }

    /// Blank text, null, a missing key and an empty list all fail.
    pub fn required(mut self, path: impl Into<FieldPath>) -> Self {
        let path = path.into();
        let message = format!("{path} is required");
        self.checks.push(Check::Required { path, message });
        self
    }

    pub fn required_when<F>(mut self, path: impl Into<FieldPath>, condition: F, message: impl Into<String>) -> Self
    where
        F: Fn(&Record) -> bool + Send + Sync + 'static,
    {
        self.checks.push(Check::RequiredWhen {
            path: path.into(),
            condition: Arc::new(condition),
            message: message.into(),
        });
        self
    }

    pub fn max_chars(mut self, path: impl Into<FieldPath>, max: usize) -> Self {
        let path = path.into();
        let message = format!("{path} must be at most {max} characters");
        self.checks.push(Check::MaxChars { path, max, message });
        self
    }

    /// Non-blank text at `path` must match `pattern`.
    pub fn pattern(mut self, path: impl Into<FieldPath>, pattern: Regex, message: impl Into<String>) -> Self {
        self.checks.push(Check::Pattern {
            path: path.into(),
            pattern,
            message: message.into(),
        });
        self
    }
}

impl Validate for Rules {
    fn validate(&self, record: &Record) -> ValidationResult {
        let mut result = ValidationResult::valid();
        for check in &self.checks {
            match check {
                Check::Required { path, message } => {
                    if is_missing(record.get_path(path)) {
                        result.add(path, message.clone());
                    }
                }
                Check::RequiredWhen {
                    path,
                    condition,
                    message,
                } => {
                    if condition(record) && is_missing(record.get_path(path)) {
                        result.add(path, message.clone());
                    }
                }
                Check::MaxChars { path, max, message } => {
                    if let Some(text) = record.get_path(path).and_then(FieldValue::as_str)
                        && text.chars().count() > *max
                    {
                        result.add(path, message.clone());
                    }
                }
                Check::Pattern {
                    path,
                    pattern,
                    message,
                } => {
                    if let Some(text) = record.get_path(path).and_then(FieldValue::as_str)
                        && !text.trim().is_empty()
                        && !pattern.is_match(text.trim())
                    {
                        result.add(path, message.clone());
                    }
                }
            }
        }
        result
    }
}

fn is_missing(value: Option<&FieldValue>) -> bool {
    match value {
        None => true,
        Some(FieldValue::List(items)) => items.is_empty(),
        Some(other) => other.is_blank(),
    }
}
