use serde::{Deserialize, Serialize};

/// Which top-level fields the current actor may edit.
///
/// Only gates the form; the server still enforces its own rules.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FieldAccess {
    #[default]
    All,
    Only(Vec<String>),
}

impl FieldAccess {
    pub fn all() -> Self {
        FieldAccess::All
    }

    pub fn only<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        FieldAccess::Only(fields.into_iter().map(Into::into).collect())
    }

    pub fn allows(&self, field: &str) -> bool {
        match self {
            FieldAccess::All => true,
            FieldAccess::Only(fields) => fields.iter().any(|allowed| allowed == field),
        }
    }
}
