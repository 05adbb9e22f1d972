use serde::{Deserialize, Serialize};

use crate::{form::DEFAULT_SORT_ORDER_FIELD, form::DirtyRules, upload::FileConstraints};

/// Behaviour switches for an [`crate::session::EditorSession`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EditorOptions {
    /// Trim text before comparing it against the baseline.
    pub normalize_whitespace: bool,
    pub ignored_fields: Vec<String>,
    /// Closing a dirty editor takes a second request.
    pub confirm_close: bool,
    pub close_on_success: bool,
    pub file_constraints: FileConstraints,
    pub sort_order_field: String,
    pub success_message: Option<String>,
    pub failure_message: Option<String>,
}

impl Default for EditorOptions {
    fn default() -> Self {
        Self {
            normalize_whitespace: true,
            ignored_fields: Vec::new(),
            confirm_close: true,
            close_on_success: false,
            file_constraints: FileConstraints::default(),
            sort_order_field: DEFAULT_SORT_ORDER_FIELD.to_string(),
            success_message: None,
            failure_message: None,
        }
    }
}

impl EditorOptions {
    pub fn with_normalize_whitespace(mut self, enabled: bool) -> Self {
        self.normalize_whitespace = enabled;
        self
    }

    pub fn with_ignored_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ignored_fields = fields.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_confirm_close(mut self, confirm: bool) -> Self {
        self.confirm_close = confirm;
        self
    }

    pub fn with_close_on_success(mut self, close: bool) -> Self {
        self.close_on_success = close;
        self
    }

    pub fn with_file_constraints(mut self, constraints: FileConstraints) -> Self {
        self.file_constraints = constraints;
        self
    }

    pub fn with_sort_order_field(mut self, field: impl Into<String>) -> Self {
        self.sort_order_field = field.into();
        self
    }

    pub fn with_messages(mut self, success: impl Into<String>, failure: impl Into<String>) -> Self {
        self.success_message = Some(success.into());
        self.failure_message = Some(failure.into());
        self
    }

    pub fn dirty_rules(&self) -> DirtyRules {
        DirtyRules {
            normalize_whitespace: self.normalize_whitespace,
            ignored_fields: self.ignored_fields.clone(),
        }
    }
}
