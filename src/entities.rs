//! Typed shapes of the entities edited by the curation client.
//!
//! Forms operate on the generic [`Record`]; these structs are for callers
//! that want typed access and for deriving JSON Schemas to validate against.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use thiserror::Error;

use crate::{
    domain::{FieldPath, FieldValue, Record},
    error::UpdateError,
    form::FormState,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Difficulty {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub emoji: String,
    pub color: String,
    pub base_score: f64,
    #[serde(default)]
    pub legacy: String,
    #[serde(default)]
    pub legacy_emoji: String,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub legacy_icon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort_order: Option<i64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DirectiveMode {
    #[default]
    Static,
    Conditional,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TriggerType {
    #[default]
    Pass,
    Level,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PingType {
    #[default]
    None,
    Role,
    Everyone,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct DirectiveAction {
    pub channel_id: Option<i64>,
    #[serde(default)]
    pub ping_type: PingType,
    #[serde(default)]
    pub role_id: Option<i64>,
}

/// Announcement rule attached to a difficulty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Directive {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub mode: DirectiveMode,
    #[serde(default)]
    pub trigger_type: TriggerType,
    #[serde(default)]
    pub condition: Option<Value>,
    #[serde(default)]
    pub actions: Vec<DirectiveAction>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub first_of_kind: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort_order: Option<i64>,
}

fn default_true() -> bool {
    true
}

/// A rater's own rating of a level.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct RatingDetail {
    #[serde(default)]
    pub rating: String,
    #[serde(default)]
    pub comment: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Pack {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub name: String,
    #[serde(default)]
    pub icon_url: Option<String>,
    #[serde(default)]
    pub view_mode: Option<String>,
    #[serde(default)]
    pub is_pinned: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Creator {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub name: String,
    #[serde(default)]
    pub aliases: Vec<String>,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub is_verified: bool,
}

/// Fields a creator may edit on their own profile; everything else is
/// reserved for curators.
pub const CREATOR_EDITABLE_FIELDS: &[&str] = &["name", "aliases"];

/// Moderation flags on a player, each changed through a confirmed action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct PlayerFlags {
    #[serde(default)]
    pub is_banned: bool,
    #[serde(default)]
    pub is_submissions_paused: bool,
    #[serde(default)]
    pub is_rating_banned: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PasteError {
    #[error("clipboard text is not JSON: {0}")]
    InvalidJson(String),
    #[error("pasted directive is missing '{0}'")]
    MissingField(&'static str),
    #[error(transparent)]
    Update(#[from] UpdateError),
}

/// Serializes the portable part of a directive for the clipboard.
pub fn copy_directive(directive: &Record) -> String {
    let actions: Vec<Value> = directive
        .get("actions")
        .and_then(FieldValue::as_list)
        .unwrap_or_default()
        .iter()
        .map(|action| {
            let action = action.as_record();
            let field = |key: &str| {
                action
                    .and_then(|record| record.get(key))
                    .map(FieldValue::to_json)
                    .unwrap_or(Value::Null)
            };
            json!({
                "channelId": field("channelId"),
                "pingType": field("pingType"),
                "roleId": field("roleId"),
            })
        })
        .collect();
    let field = |key: &str| directive.get(key).map(FieldValue::to_json).unwrap_or(Value::Null);
    let first_of_kind = match directive.get("firstOfKind") {
        Some(FieldValue::Bool(flag)) => *flag,
        _ => false,
    };
    json!({
        "name": field("name"),
        "description": field("description"),
        "mode": field("mode"),
        "triggerType": field("triggerType"),
        "condition": field("condition"),
        "actions": actions,
        "isActive": field("isActive"),
        "firstOfKind": first_of_kind,
    })
    .to_string()
}

/// Parses clipboard text into the portable directive fields, applying
/// defaults for anything optional.
pub fn parse_clipboard_directive(text: &str) -> Result<Record, PasteError> {
    let pasted: Value =
        serde_json::from_str(text).map_err(|err| PasteError::InvalidJson(err.to_string()))?;
    let pasted = pasted.as_object().ok_or(PasteError::MissingField("name"))?;
    let name = truthy(pasted, "name").ok_or(PasteError::MissingField("name"))?;
    let mode = truthy(pasted, "mode").ok_or(PasteError::MissingField("mode"))?;
    let actions = truthy(pasted, "actions").ok_or(PasteError::MissingField("actions"))?;

    let actions: Vec<FieldValue> = actions
        .as_array()
        .map(Vec::as_slice)
        .unwrap_or_default()
        .iter()
        .map(|action| {
            let ping_type = action.get("pingType").cloned().unwrap_or(Value::Null);
            let role_id = if ping_type.as_str() == Some("ROLE") {
                numeric(action.get("roleId"))
            } else {
                FieldValue::Null
            };
            FieldValue::Record(
                Record::new()
                    .with("channelId", numeric(action.get("channelId")))
                    .with("pingType", FieldValue::from(ping_type))
                    .with("roleId", role_id),
            )
        })
        .collect();

    Ok(Record::new()
        .with("name", FieldValue::from(name.clone()))
        .with(
            "description",
            truthy(pasted, "description").cloned().map(FieldValue::from).unwrap_or_else(|| FieldValue::text("")),
        )
        .with("mode", FieldValue::from(mode.clone()))
        .with(
            "triggerType",
            truthy(pasted, "triggerType").cloned().map(FieldValue::from).unwrap_or_else(|| FieldValue::text("PASS")),
        )
        .with(
            "condition",
            pasted.get("condition").cloned().map(FieldValue::from).unwrap_or_default(),
        )
        .with("actions", FieldValue::List(actions))
        .with("isActive", present_bool(pasted, "isActive").unwrap_or(true))
        .with("firstOfKind", present_bool(pasted, "firstOfKind").unwrap_or(false)))
}

/// Pastes a directive over the list entry at `index`. The entry keeps its
/// own id and sort order; the form is untouched when the paste is rejected.
pub fn paste_directive(
    state: &FormState,
    list: &FieldPath,
    index: usize,
    text: &str,
) -> Result<FormState, PasteError> {
    let pasted = parse_clipboard_directive(text)?;
    let target = list.clone().index(index);
    let mut merged = match state.get_path(&target) {
        Some(FieldValue::Record(existing)) => existing.clone(),
        Some(_) => return Err(UpdateError::NotARecord(target.to_string()).into()),
        None => {
            let len = state
                .get_path(list)
                .and_then(FieldValue::as_list)
                .map(<[FieldValue]>::len)
                .unwrap_or_default();
            return Err(UpdateError::IndexOutOfBounds {
                path: list.to_string(),
                index,
                len,
            }
            .into());
        }
    };
    for (key, value) in pasted.iter() {
        merged.insert(key, value.clone());
    }
    Ok(state.set_nested_field(&target, FieldValue::Record(merged))?)
}

/// JS-style truthiness: present, not null, not false, not empty text.
fn truthy<'a>(object: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    match object.get(key)? {
        Value::Null | Value::Bool(false) => None,
        Value::String(text) if text.is_empty() => None,
        Value::Number(number) if number.as_f64() == Some(0.0) => None,
        value => Some(value),
    }
}

fn present_bool(object: &Map<String, Value>, key: &str) -> Option<bool> {
    match object.get(key)? {
        Value::Null => None,
        Value::Bool(flag) => Some(*flag),
        other => Some(!matches!(other, Value::String(text) if text.is_empty())),
    }
}

fn numeric(value: Option<&Value>) -> FieldValue {
    match value {
        Some(Value::Number(number)) => number
            .as_i64()
            .map(FieldValue::Integer)
            .unwrap_or_else(|| FieldValue::Null),
        Some(Value::String(text)) => text.trim().parse::<i64>().map(FieldValue::Integer).unwrap_or_default(),
        _ => FieldValue::Null,
    }
}
