use std::fmt;

use serde::{Deserialize, Serialize};

/// One step of a [`FieldPath`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PathSegment {
    Index(usize),
    Key(String),
}

/// Typed address of a value inside a record.
///
/// Paths are built with [`FieldPath::field`], [`FieldPath::key`] and
/// [`FieldPath::index`] rather than parsed from dotted strings, so
/// `FieldPath::field("actions").index(2).key("pingType")` addresses the ping
/// type of the third action. Serialized as a JSON array such as
/// `["actions", 2, "pingType"]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldPath(Vec<PathSegment>);

impl FieldPath {
    pub fn field(name: impl Into<String>) -> Self {
        FieldPath(vec![PathSegment::Key(name.into())])
    }

    pub fn key(mut self, name: impl Into<String>) -> Self {
        self.0.push(PathSegment::Key(name.into()));
        self
    }

    pub fn index(mut self, index: usize) -> Self {
        self.0.push(PathSegment::Index(index));
        self
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Top-level field this path starts at, if it starts at a key.
    pub fn root_field(&self) -> Option<&str> {
        match self.0.first() {
            Some(PathSegment::Key(name)) => Some(name),
            _ => None,
        }
    }

    /// Maps a validator instance location (`/actions/0/channelId`) onto a path.
    /// Numeric tokens become indices.
    pub fn from_pointer(pointer: &str) -> Self {
        let segments = pointer
            .split('/')
            .skip(1)
            .map(|token| token.replace("~1", "/").replace("~0", "~"))
            .map(|token| match token.parse::<usize>() {
                Ok(index) => PathSegment::Index(index),
                Err(_) => PathSegment::Key(token),
            })
            .collect();
        FieldPath(segments)
    }
}

impl From<&str> for FieldPath {
    fn from(name: &str) -> Self {
        FieldPath::field(name)
    }
}

impl From<String> for FieldPath {
    fn from(name: String) -> Self {
        FieldPath::field(name)
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return write!(f, "<root>");
        }
        for (idx, segment) in self.0.iter().enumerate() {
            match segment {
                PathSegment::Key(name) if idx == 0 => write!(f, "{name}")?,
                PathSegment::Key(name) => write!(f, ".{name}")?,
                PathSegment::Index(index) => write!(f, "[{index}]")?,
            }
        }
        Ok(())
    }
}
