use crate::{
    domain::{Entity, EntityId, FieldPath, FieldValue, Record},
    error::UpdateError,
};

use super::dirty::{self, DirtyRules};

/// Edited values of one entity next to the values the server last confirmed.
///
/// A `FormState` is a value: every update returns a new state and leaves the
/// receiver untouched, so callers can keep the previous state for undo or
/// diffing. The baseline is only ever replaced through [`FormState::reset_to`]
/// with an entity that came back from the server.
#[derive(Debug, Clone, PartialEq)]
pub struct FormState {
    current: Record,
    baseline: Record,
}

impl FormState {
    /// Edit mode: seeded from a loaded entity.
    pub fn from_entity(entity: Entity) -> Self {
        let record = entity.into_record();
        Self {
            current: record.clone(),
            baseline: record,
        }
    }

    /// Create mode: seeded from defaults, with nothing persisted yet.
    pub fn from_defaults(defaults: Record) -> Self {
        Self {
            current: defaults.clone(),
            baseline: defaults,
        }
    }

    pub fn current(&self) -> &Record {
        &self.current
    }

    pub fn baseline(&self) -> &Record {
        &self.baseline
    }

    /// Id of the persisted entity; `None` while creating.
    pub fn id(&self) -> Option<EntityId> {
        self.baseline.get("id").and_then(EntityId::from_value)
    }

    pub fn is_creating(&self) -> bool {
        self.id().is_none()
    }

    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.current.get(field)
    }

    pub fn get_path(&self, path: &FieldPath) -> Option<&FieldValue> {
        self.current.get_path(path)
    }

    /// Replaces one top-level field. Every other field carries over as is.
    pub fn set_field(&self, field: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        let mut next = self.clone();
        next.current.insert(field, value);
        next
    }

    /// Replaces the value addressed by `path`, keeping sibling list entries
    /// and their order.
    pub fn set_nested_field(&self, path: &FieldPath, value: FieldValue) -> Result<Self, UpdateError> {
        self.edit(|record| record.set_path(path, value))
    }

    /// Adopts a server-confirmed entity as both the form and the baseline.
    pub fn reset_to(&self, entity: Entity) -> Self {
        Self::from_entity(entity)
    }

    /// Adopts a server-confirmed entity as the baseline while keeping the
    /// fields the user has edited but not saved.
    pub fn rebase(&self, entity: Entity, rules: &DirtyRules) -> Self {
        let edited = self.changed_fields(rules);
        let mut next = Self::from_entity(entity);
        for field in edited {
            match self.current.get(&field) {
                Some(value) => {
                    next.current.insert(field, value.clone());
                }
                None => {
                    next.current.remove(&field);
                }
            }
        }
        next
    }

    /// Throws away local edits.
    pub fn revert(&self) -> Self {
        Self {
            current: self.baseline.clone(),
            baseline: self.baseline.clone(),
        }
    }

    pub fn is_dirty(&self, rules: &DirtyRules) -> bool {
        dirty::is_dirty(&self.current, &self.baseline, rules)
    }

    pub fn changed_fields(&self, rules: &DirtyRules) -> Vec<String> {
        dirty::changed_fields(&self.current, &self.baseline, rules)
    }

    /// Runs `change` against a copy of the edited record; the copy only
    /// becomes a new state when the change succeeds.
    pub(crate) fn edit<F>(&self, change: F) -> Result<Self, UpdateError>
    where
        F: FnOnce(&mut Record) -> Result<(), UpdateError>,
    {
        let mut current = self.current.clone();
        change(&mut current)?;
        Ok(Self {
            current,
            baseline: self.baseline.clone(),
        })
    }
}
