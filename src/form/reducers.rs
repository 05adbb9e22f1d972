use crate::{
    domain::{FieldPath, FieldValue, Record},
    error::UpdateError,
};

use super::{access::FieldAccess, actions::FormCommand, state::FormState};

pub const DEFAULT_SORT_ORDER_FIELD: &str = "sortOrder";

/// Applies a command with no access restrictions and the default sort-order
/// field.
pub fn apply_command(state: &FormState, command: FormCommand) -> Result<FormState, UpdateError> {
    FormEngine::new(&FieldAccess::All, DEFAULT_SORT_ORDER_FIELD).dispatch(state, command)
}

/// Applies [`FormCommand`]s to a [`FormState`] under an access policy.
pub struct FormEngine<'a> {
    access: &'a FieldAccess,
    sort_order_field: &'a str,
}

impl<'a> FormEngine<'a> {
    pub fn new(access: &'a FieldAccess, sort_order_field: &'a str) -> Self {
        Self {
            access,
            sort_order_field,
        }
    }

    /// Returns the next state, or an error with `state` left as it was.
    pub fn dispatch(&self, state: &FormState, command: FormCommand) -> Result<FormState, UpdateError> {
        if let Some(field) = command.target_field()
            && !self.access.allows(field)
        {
            return Err(UpdateError::FieldLocked(field.to_string()));
        }
        let renumber = command.reshapes_list().cloned();
        let next = match command {
            FormCommand::Set { field, value } => Ok(state.set_field(field, value)),
            FormCommand::SetNested { path, value } => state.set_nested_field(&path, value),
            FormCommand::Clear { path } => state.set_nested_field(&path, FieldValue::Null),
            FormCommand::Push { path, value } => state.edit(|record| {
                record.list_mut(&path)?.push(value);
                Ok(())
            }),
            FormCommand::Insert { path, index, value } => state.edit(|record| {
                let items = record.list_mut(&path)?;
                check_index(&path, index, items.len() + 1)?;
                items.insert(index, value);
                Ok(())
            }),
            FormCommand::Remove { path, index } => state.edit(|record| {
                let items = record.list_mut(&path)?;
                check_index(&path, index, items.len())?;
                items.remove(index);
                Ok(())
            }),
            FormCommand::Move { path, from, to } => state.edit(|record| {
                let items = record.list_mut(&path)?;
                check_index(&path, from, items.len())?;
                check_index(&path, to, items.len())?;
                let item = items.remove(from);
                items.insert(to, item);
                Ok(())
            }),
            FormCommand::AddText { path, value } => {
                let trimmed = value.trim();
                if trimmed.is_empty() {
                    return Ok(state.clone());
                }
                state.edit(|record| {
                    let items = record.list_mut(&path)?;
                    if !items.iter().any(|item| item.as_str() == Some(trimmed)) {
                        items.push(FieldValue::text(trimmed));
                    }
                    Ok(())
                })
            }
        }?;
        match renumber {
            Some(path) => next.edit(|record| renumber_sort_order(record, &path, self.sort_order_field)),
            None => Ok(next),
        }
    }
}

fn check_index(path: &FieldPath, index: usize, len: usize) -> Result<(), UpdateError> {
    if index < len {
        Ok(())
    } else {
        Err(UpdateError::IndexOutOfBounds {
            path: path.to_string(),
            index,
            len,
        })
    }
}

/// Rewrites the sort-order field of every record in the list to its 0-based
/// position. Items without the field are left alone.
fn renumber_sort_order(record: &mut Record, path: &FieldPath, field: &str) -> Result<(), UpdateError> {
    let items = record.list_mut(path)?;
    for (position, item) in items.iter_mut().enumerate() {
        if let Some(entry) = item.as_record_mut()
            && entry.contains_key(field)
        {
            entry.insert(field, FieldValue::Integer(position as i64));
        }
    }
    Ok(())
}
