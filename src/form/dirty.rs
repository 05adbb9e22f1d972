//! Unsaved-change detection.
//!
//! Everything here is a pure function of the edited record and the
//! server-confirmed baseline, cheap enough to run on every keystroke.

use serde::{Deserialize, Serialize};

use crate::domain::{FieldValue, Record};

/// How two records are compared for dirtiness.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DirtyRules {
    /// Compare text trimmed, and treat null and blank text as the same value.
    pub normalize_whitespace: bool,
    /// Top-level fields that never make a form dirty (staged, UI-only input).
    pub ignored_fields: Vec<String>,
}

impl Default for DirtyRules {
    fn default() -> Self {
        Self {
            normalize_whitespace: true,
            ignored_fields: Vec::new(),
        }
    }
}

impl DirtyRules {
    /// Raw comparison: every character counts and nothing is ignored.
    pub fn exact() -> Self {
        Self {
            normalize_whitespace: false,
            ignored_fields: Vec::new(),
        }
    }

    pub fn ignoring(mut self, field: impl Into<String>) -> Self {
        self.ignored_fields.push(field.into());
        self
    }

    fn is_ignored(&self, field: &str) -> bool {
        self.ignored_fields.iter().any(|ignored| ignored == field)
    }
}

pub fn is_dirty(current: &Record, baseline: &Record, rules: &DirtyRules) -> bool {
    union_keys(current, baseline)
        .filter(|key| !rules.is_ignored(key))
        .any(|key| !field_equal(current, baseline, key, rules.normalize_whitespace))
}

/// Top-level fields whose values differ, in form order followed by fields
/// only the baseline has.
pub fn changed_fields(current: &Record, baseline: &Record, rules: &DirtyRules) -> Vec<String> {
    union_keys(current, baseline)
        .filter(|key| !rules.is_ignored(key))
        .filter(|key| !field_equal(current, baseline, key, rules.normalize_whitespace))
        .map(str::to_string)
        .collect()
}

/// Structural equality under the whitespace rule.
///
/// Lists compare by length first and then element by element at the same
/// index, so a reordered list is never equal to the original. Records treat
/// a missing key as null.
pub fn values_equal(left: &FieldValue, right: &FieldValue, normalize: bool) -> bool {
    match (left, right) {
        (FieldValue::Text(a), FieldValue::Text(b)) => {
            if normalize {
                a.trim() == b.trim()
            } else {
                a == b
            }
        }
        (FieldValue::Integer(a), FieldValue::Number(b))
        | (FieldValue::Number(b), FieldValue::Integer(a)) => (*a as f64) == *b,
        (FieldValue::List(a), FieldValue::List(b)) => {
            a.len() == b.len()
                && a.iter()
                    .zip(b.iter())
                    .all(|(x, y)| values_equal(x, y, normalize))
        }
        (FieldValue::Record(a), FieldValue::Record(b)) => union_keys(a, b)
            .all(|key| field_equal(a, b, key, normalize)),
        _ if normalize && left.is_blank() && right.is_blank() => true,
        _ => left == right,
    }
}

fn field_equal(current: &Record, baseline: &Record, key: &str, normalize: bool) -> bool {
    let left = current.get(key).unwrap_or(&FieldValue::Null);
    let right = baseline.get(key).unwrap_or(&FieldValue::Null);
    values_equal(left, right, normalize)
}

fn union_keys<'a>(first: &'a Record, second: &'a Record) -> impl Iterator<Item = &'a str> {
    first
        .keys()
        .chain(second.keys().filter(move |key| !first.contains_key(key)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    fn record(value: serde_json::Value) -> Record {
        Record::from_json(value).unwrap()
    }

    #[test]
    fn trailing_space_is_not_a_change() {
        let baseline = record(json!({"name": "Alpha", "isVerified": false}));
        let current = record(json!({"name": "Alpha ", "isVerified": false}));
        assert!(!is_dirty(&current, &baseline, &DirtyRules::default()));
        assert!(is_dirty(&current, &baseline, &DirtyRules::exact()));
    }

    #[test]
    fn clearing_a_value_is_a_change() {
        let baseline = record(json!({"icon": "icons/ex.png"}));
        let current = record(json!({"icon": null}));
        assert!(is_dirty(&current, &baseline, &DirtyRules::default()));
        assert_eq!(
            changed_fields(&current, &baseline, &DirtyRules::default()),
            vec!["icon".to_string()]
        );
    }

    #[test]
    fn blank_text_matches_null_only_when_normalizing() {
        let baseline = record(json!({"suffix": null}));
        let current = record(json!({"suffix": "  "}));
        assert!(!is_dirty(&current, &baseline, &DirtyRules::default()));
        assert!(is_dirty(&current, &baseline, &DirtyRules::exact()));
    }

    #[test]
    fn reordered_directives_are_dirty() {
        let baseline = record(json!({"directives": [{"name": "A"}, {"name": "B"}, {"name": "C"}]}));
        let current = record(json!({"directives": [{"name": "B"}, {"name": "A"}, {"name": "C"}]}));
        assert!(is_dirty(&current, &baseline, &DirtyRules::default()));
    }

    #[test]
    fn nested_action_change_is_dirty() {
        let baseline = record(json!({"actions": [{"channelId": 1, "pingType": "NONE"}]}));
        let current = record(json!({"actions": [{"channelId": 1, "pingType": "ROLE"}]}));
        assert!(is_dirty(&current, &baseline, &DirtyRules::default()));
        let longer = record(json!({"actions": [
            {"channelId": 1, "pingType": "NONE"},
            {"channelId": 2, "pingType": "NONE"}
        ]}));
        assert!(is_dirty(&longer, &baseline, &DirtyRules::default()));
    }

    #[test]
    fn ignored_fields_never_dirty_the_form() {
        let baseline = record(json!({"name": "Pack", "aliasDraft": ""}));
        let current = record(json!({"name": "Pack", "aliasDraft": "half typed"}));
        let rules = DirtyRules::default().ignoring("aliasDraft");
        assert!(!is_dirty(&current, &baseline, &rules));
    }

    #[test]
    fn key_order_does_not_matter() {
        let baseline = record(json!({"a": 1, "b": {"x": 1, "y": 2}}));
        let current = record(json!({"b": {"y": 2, "x": 1}, "a": 1.0}));
        assert!(!is_dirty(&current, &baseline, &DirtyRules::exact()));
    }

    fn arb_record() -> impl Strategy<Value = Record> {
        prop::collection::vec(("[a-z]{1,8}", "[a-zA-Z0-9 ]{0,12}"), 0..8).prop_map(|pairs| {
            pairs
                .into_iter()
                .map(|(key, value)| (key, FieldValue::Text(value)))
                .collect()
        })
    }

    proptest! {
        #[test]
        fn equal_records_are_clean(record in arb_record()) {
            prop_assert!(!is_dirty(&record, &record.clone(), &DirtyRules::default()));
            prop_assert!(!is_dirty(&record, &record.clone(), &DirtyRules::exact()));
        }

        #[test]
        fn any_differing_field_is_dirty(record in arb_record(), value in "[a-z]{1,6}") {
            let mut edited = record.clone();
            let key = "__edited".to_string();
            edited.insert(key.clone(), FieldValue::Text(value));
            prop_assert!(is_dirty(&edited, &record, &DirtyRules::default()));
            prop_assert_eq!(changed_fields(&edited, &record, &DirtyRules::default()), vec![key]);
        }

        #[test]
        fn reordering_distinct_items_is_dirty(items in prop::collection::hash_set("[a-z]{1,5}", 2..6)) {
            let items: Vec<FieldValue> = items.into_iter().map(FieldValue::Text).collect();
            let mut reordered = items.clone();
            reordered.rotate_left(1);
            let baseline = Record::new().with("aliases", FieldValue::List(items));
            let current = Record::new().with("aliases", FieldValue::List(reordered));
            prop_assert!(is_dirty(&current, &baseline, &DirtyRules::default()));
        }
    }
}
