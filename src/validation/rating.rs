use std::sync::LazyLock;

use regex::Regex;

use crate::domain::{FieldValue, Record};

use super::{Validate, ValidationResult};

pub const MAX_COMMENT_CHARS: usize = 1000;

/// A two-part rating such as `U5~U7`, `12-13` or `G1 -2`.
static RANGE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([^-~\s]+)([-~\s])(.+)$").expect("rating range pattern"));

/// Whether a rating carries the special `-2` value, alone or as one side of
/// a range. Other negative values (`-21`) do not count.
pub fn is_special_rating(rating: &str) -> bool {
    let rating = rating.trim();
    if rating == "-2" {
        return true;
    }
    RANGE
        .captures(rating)
        .map(|caps| [&caps[1], &caps[3]].iter().any(|part| part.trim() == "-2"))
        .unwrap_or(false)
}

/// Rules for a rater's own rating detail: a comment is mandatory for special
/// ratings, comments have a length cap, and clearing the rating clears the
/// comment that goes with it.
#[derive(Debug, Clone)]
pub struct RatingRules {
    pub rating_field: String,
    pub comment_field: String,
    pub max_comment_chars: usize,
}

impl Default for RatingRules {
    fn default() -> Self {
        Self {
            rating_field: "rating".to_string(),
            comment_field: "comment".to_string(),
            max_comment_chars: MAX_COMMENT_CHARS,
        }
    }
}

impl RatingRules {
    fn rating<'a>(&self, record: &'a Record) -> &'a str {
        record
            .get(&self.rating_field)
            .and_then(FieldValue::as_str)
            .unwrap_or_default()
    }

    fn comment<'a>(&self, record: &'a Record) -> &'a str {
        record
            .get(&self.comment_field)
            .and_then(FieldValue::as_str)
            .unwrap_or_default()
    }

    pub fn comment_required(&self, record: &Record) -> bool {
        is_special_rating(self.rating(record))
    }
}

impl Validate for RatingRules {
    fn validate(&self, record: &Record) -> ValidationResult {
        let mut result = ValidationResult::valid();
        let comment = self.comment(record);
        if comment.chars().count() > self.max_comment_chars {
            result.add(
                &self.comment_field,
                format!("Comment must be at most {} characters", self.max_comment_chars),
            );
        }
        if self.comment_required(record) && comment.trim().is_empty() {
            result.add(&self.comment_field, "A comment is required for this rating");
        }
        result
    }

    fn prepare(&self, record: &Record) -> Record {
        let mut payload = record.clone();
        if self.rating(record).trim().is_empty() {
            payload.insert(self.rating_field.clone(), "");
            payload.insert(self.comment_field.clone(), "");
        }
        payload
    }
}
