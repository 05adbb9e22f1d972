use serde::{Deserialize, Serialize};

use crate::domain::{FieldPath, FieldValue};

/// One user edit, expressed as data so it can be logged, replayed, or
/// produced by a picker without going through a UI callback.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum FormCommand {
    /// Replace a top-level field.
    Set { field: String, value: FieldValue },
    /// Replace the value at a nested path.
    SetNested { path: FieldPath, value: FieldValue },
    /// Set the addressed value to null (removing an icon, unlinking a role).
    Clear { path: FieldPath },
    /// Append to a list.
    Push { path: FieldPath, value: FieldValue },
    Insert {
        path: FieldPath,
        index: usize,
        value: FieldValue,
    },
    Remove { path: FieldPath, index: usize },
    /// Drag-reorder: take the item at `from` and drop it at `to`.
    Move {
        path: FieldPath,
        from: usize,
        to: usize,
    },
    /// Append trimmed text to a list unless it is blank or already present.
    AddText { path: FieldPath, value: String },
}

impl FormCommand {
    pub fn set(field: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        FormCommand::Set {
            field: field.into(),
            value: value.into(),
        }
    }

    pub fn set_nested(path: FieldPath, value: impl Into<FieldValue>) -> Self {
        FormCommand::SetNested {
            path,
            value: value.into(),
        }
    }

    /// Top-level field the command edits, used for access checks.
    pub fn target_field(&self) -> Option<&str> {
        match self {
            FormCommand::Set { field, .. } => Some(field),
            FormCommand::SetNested { path, .. }
            | FormCommand::Clear { path }
            | FormCommand::Push { path, .. }
            | FormCommand::Insert { path, .. }
            | FormCommand::Remove { path, .. }
            | FormCommand::Move { path, .. }
            | FormCommand::AddText { path, .. } => path.root_field(),
        }
    }

    /// Whether the command rearranges a list, so positional sort orders need
    /// renumbering afterwards.
    pub(crate) fn reshapes_list(&self) -> Option<&FieldPath> {
        match self {
            FormCommand::Push { path, .. }
            | FormCommand::Insert { path, .. }
            | FormCommand::Remove { path, .. }
            | FormCommand::Move { path, .. } => Some(path),
            _ => None,
        }
    }
}
