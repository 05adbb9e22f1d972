use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::Value;

use crate::error::UpdateError;

use super::{
    path::{FieldPath, PathSegment},
    value::FieldValue,
};

/// Named fields of an entity, in the order the server sent them.
///
/// Equality is structural and ignores key order.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(IndexMap<String, FieldValue>);

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.0.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<FieldValue>) -> Option<FieldValue> {
        self.0.insert(key.into(), value.into())
    }

    pub fn remove(&mut self, key: &str) -> Option<FieldValue> {
        self.0.shift_remove(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.0.iter().map(|(key, value)| (key.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get_path(&self, path: &FieldPath) -> Option<&FieldValue> {
        let mut segments = path.segments().iter();
        let Some(PathSegment::Key(first)) = segments.next() else {
            return None;
        };
        let mut current = self.0.get(first)?;
        for segment in segments {
            current = match (segment, current) {
                (PathSegment::Key(key), FieldValue::Record(record)) => record.get(key)?,
                (PathSegment::Index(index), FieldValue::List(items)) => items.get(*index)?,
                _ => return None,
            };
        }
        Some(current)
    }

    /// Replaces the value at `path`, creating the final key when missing.
    ///
    /// A null intermediate value addressed by a key is promoted to an empty
    /// record first, so `condition.type` can be set on a directive whose
    /// condition has never been filled in.
    pub fn set_path(&mut self, path: &FieldPath, value: FieldValue) -> Result<(), UpdateError> {
        let slot = self.value_mut(path, true)?;
        *slot = value;
        Ok(())
    }

    pub(crate) fn list_mut(&mut self, path: &FieldPath) -> Result<&mut Vec<FieldValue>, UpdateError> {
        let slot = self.value_mut(path, false)?;
        if slot.is_null() {
            *slot = FieldValue::List(Vec::new());
        }
        slot.as_list_mut()
            .ok_or_else(|| UpdateError::NotAList(path.to_string()))
    }

    pub(crate) fn value_mut(
        &mut self,
        path: &FieldPath,
        create_leaf: bool,
    ) -> Result<&mut FieldValue, UpdateError> {
        let Some((first, rest)) = path.segments().split_first() else {
            return Err(UpdateError::EmptyPath);
        };
        let PathSegment::Key(first) = first else {
            return Err(UpdateError::UnknownField(path.to_string()));
        };
        let mut current = if create_leaf && rest.is_empty() {
            self.0.entry(first.clone()).or_insert(FieldValue::Null)
        } else {
            self.0
                .get_mut(first)
                .ok_or_else(|| UpdateError::UnknownField(path.to_string()))?
        };
        for (pos, segment) in rest.iter().enumerate() {
            let is_leaf = pos + 1 == rest.len();
            let node = current;
            current = match segment {
                PathSegment::Key(key) => {
                    if node.is_null() {
                        *node = FieldValue::Record(Record::new());
                    }
                    let record = node
                        .as_record_mut()
                        .ok_or_else(|| UpdateError::NotARecord(path.to_string()))?;
                    if create_leaf && is_leaf {
                        record.0.entry(key.clone()).or_insert(FieldValue::Null)
                    } else {
                        record
                            .0
                            .get_mut(key)
                            .ok_or_else(|| UpdateError::UnknownField(path.to_string()))?
                    }
                }
                PathSegment::Index(index) => {
                    let items = node
                        .as_list_mut()
                        .ok_or_else(|| UpdateError::NotAList(path.to_string()))?;
                    let len = items.len();
                    items
                        .get_mut(*index)
                        .ok_or_else(|| UpdateError::IndexOutOfBounds {
                            path: path.to_string(),
                            index: *index,
                            len,
                        })?
                }
            };
        }
        Ok(current)
    }

    pub fn from_json(value: Value) -> Option<Self> {
        match FieldValue::from(value) {
            FieldValue::Record(record) => Some(record),
            _ => None,
        }
    }

    pub fn to_json(&self) -> Value {
        FieldValue::Record(self.clone()).to_json()
    }
}

impl FromIterator<(String, FieldValue)> for Record {
    fn from_iter<I: IntoIterator<Item = (String, FieldValue)>>(iter: I) -> Self {
        Record(iter.into_iter().collect())
    }
}

/// Opaque server identifier of an entity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(String);

impl EntityId {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Reads an id out of a field value; numbers and non-blank text qualify.
    pub fn from_value(value: &FieldValue) -> Option<Self> {
        match value {
            FieldValue::Integer(id) => Some(EntityId(id.to_string())),
            FieldValue::Text(id) if !id.trim().is_empty() => Some(EntityId(id.trim().to_string())),
            _ => None,
        }
    }

    /// The id in the shape the API expects back: numeric ids stay numeric.
    pub fn to_value(&self) -> FieldValue {
        match self.0.parse::<i64>() {
            Ok(id) => FieldValue::Integer(id),
            Err(_) => FieldValue::Text(self.0.clone()),
        }
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EntityId {
    fn from(id: &str) -> Self {
        EntityId(id.to_string())
    }
}

impl From<String> for EntityId {
    fn from(id: String) -> Self {
        EntityId(id)
    }
}

impl From<i64> for EntityId {
    fn from(id: i64) -> Self {
        EntityId(id.to_string())
    }
}

/// A domain object as the server returned it.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Entity {
    record: Record,
}

impl Entity {
    pub fn new(record: Record) -> Self {
        Self { record }
    }

    pub fn id(&self) -> Option<EntityId> {
        self.record.get("id").and_then(EntityId::from_value)
    }

    pub fn record(&self) -> &Record {
        &self.record
    }

    pub fn into_record(self) -> Record {
        self.record
    }

    pub fn from_json(value: Value) -> Option<Self> {
        Record::from_json(value).map(Self::new)
    }

    pub fn to_json(&self) -> Value {
        self.record.to_json()
    }

    pub fn from_typed<T: Serialize>(value: &T) -> Result<Self, serde_json::Error> {
        let json = serde_json::to_value(value)?;
        Self::from_json(json)
            .ok_or_else(|| serde::ser::Error::custom("entity must serialize to an object"))
    }

    pub fn into_typed<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_value(self.to_json())
    }
}

impl From<Record> for Entity {
    fn from(record: Record) -> Self {
        Entity::new(record)
    }
}
