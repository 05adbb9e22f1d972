use curation_forms::confirm::GateState;
use curation_forms::entities::{CREATOR_EDITABLE_FIELDS, Creator, Difficulty};
use curation_forms::form::apply_command;
use curation_forms::validation::{Rules, SchemaValidator};
use curation_forms::{
    ConfirmationGate, DirtyRules, EditorOptions, EditorSession, Entity, FieldAccess, FieldPath,
    FieldValue, FormCommand, FormState, PendingAction, PendingActionKind, SubmitStart, UpdateError,
    Validate,
};
use proptest::prelude::*;
use serde_json::json;

#[test]
fn trailing_space_is_clean() {
    let state = FormState::from_entity(
        Entity::from_json(json!({"name": "Alpha", "isVerified": false})).unwrap(),
    )
    .set_field("name", "Alpha ");
    assert!(!state.is_dirty(&DirtyRules::default()));
}

#[test]
fn reordered_directives_are_dirty_and_renumbered() {
    let state = FormState::from_entity(
        Entity::from_json(json!({
            "id": 1,
            "directives": [
                {"name": "A", "sortOrder": 0},
                {"name": "B", "sortOrder": 1},
                {"name": "C", "sortOrder": 2}
            ]
        }))
        .unwrap(),
    );
    let moved = apply_command(
        &state,
        FormCommand::Move {
            path: FieldPath::field("directives"),
            from: 1,
            to: 0,
        },
    )
    .unwrap();
    assert!(moved.is_dirty(&DirtyRules::default()));
    let payload = moved.current().to_json();
    let order: Vec<(String, i64)> = payload["directives"]
        .as_array()
        .unwrap()
        .iter()
        .map(|d| (d["name"].as_str().unwrap().to_string(), d["sortOrder"].as_i64().unwrap()))
        .collect();
    assert_eq!(
        order,
        vec![("B".into(), 0), ("A".into(), 1), ("C".into(), 2)]
    );
}

#[test]
fn cancelled_ban_reverts_without_a_call() {
    let mut gate = ConfirmationGate::new();
    let committed = FieldValue::Bool(false);
    gate.stage(PendingAction::toggle(PendingActionKind::Ban, "isBanned", false))
        .unwrap();
    assert!(matches!(gate.state(), GateState::PendingConfirmation(action) if action.target() == &FieldValue::Bool(true)));
    gate.cancel();
    assert_eq!(gate.state(), &GateState::Idle);
    assert_eq!(gate.displayed("isBanned", &committed), &FieldValue::Bool(false));
}

#[test]
fn required_field_blocks_submission() {
    let mut session = EditorSession::open(
        Entity::from_json(json!({"id": 2, "name": "Pack", "description": ""})).unwrap(),
        Rules::new().required("name"),
        EditorOptions::default(),
    );
    session.set_field("name", "").unwrap();
    assert!(matches!(session.begin_save(), SubmitStart::Invalid(_)));
    assert!(!session.field_errors().is_field_valid("name"));
    assert!(!session.is_submitting());
}

#[test]
fn creators_only_edit_their_own_fields() {
    let creator = Creator {
        id: Some(5),
        name: "Camellia".into(),
        aliases: vec!["kamome sano".into()],
        user_id: None,
        is_verified: false,
    };
    let mut session = EditorSession::open(
        Entity::from_typed(&creator).unwrap(),
        Rules::new(),
        EditorOptions::default(),
    )
    .with_access(FieldAccess::only(CREATOR_EDITABLE_FIELDS.iter().copied()));
    session
        .apply(FormCommand::AddText {
            path: FieldPath::field("aliases"),
            value: "  かめりあ ".into(),
        })
        .unwrap();
    assert_eq!(
        session.set_field("isVerified", true),
        Err(UpdateError::FieldLocked("isVerified".into()))
    );
    assert_eq!(session.changed_fields(), vec!["aliases".to_string()]);
}

#[test]
fn derived_schema_flags_bad_difficulties() {
    let validator = SchemaValidator::for_type::<Difficulty>().unwrap();
    let state = FormState::from_entity(
        Entity::from_json(json!({
            "id": 1,
            "name": "U1",
            "type": "PGU",
            "color": "#fff",
            "baseScore": "high"
        }))
        .unwrap(),
    );
    let result = validator.validate(state.current());
    assert!(!result.is_field_valid("baseScore"));
    assert!(result.is_field_valid("name"));
}

fn scalar() -> impl Strategy<Value = FieldValue> {
    prop_oneof![
        Just(FieldValue::Null),
        any::<bool>().prop_map(FieldValue::Bool),
        any::<i64>().prop_map(FieldValue::Integer),
        "[a-z ]{0,8}".prop_map(FieldValue::text),
    ]
}

proptest! {
    #[test]
    fn equal_records_are_clean(values in proptest::collection::vec(scalar(), 1..6)) {
        let record = values
            .iter()
            .enumerate()
            .map(|(i, v)| (format!("f{i}"), v.clone()))
            .collect();
        let state = FormState::from_entity(Entity::new(record));
        prop_assert!(!state.is_dirty(&DirtyRules::exact()));
        prop_assert!(!state.is_dirty(&DirtyRules::default()));
    }

    #[test]
    fn any_changed_field_is_dirty(values in proptest::collection::vec(any::<i64>(), 1..6), pick in any::<prop::sample::Index>()) {
        let record = values
            .iter()
            .enumerate()
            .map(|(i, v)| (format!("f{i}"), FieldValue::Integer(*v)))
            .collect();
        let state = FormState::from_entity(Entity::new(record));
        let index = pick.index(values.len());
        let changed = state.set_field(format!("f{index}"), values[index].wrapping_add(1));
        prop_assert!(changed.is_dirty(&DirtyRules::default()));
    }

    #[test]
    fn swapping_distinct_items_is_dirty(a in "[a-z]{1,6}", b in "[A-Z]{1,6}") {
        let state = FormState::from_entity(
            Entity::from_json(json!({"aliases": [a.clone(), b.clone()]})).unwrap(),
        );
        let swapped = apply_command(&state, FormCommand::Move {
            path: FieldPath::field("aliases"),
            from: 0,
            to: 1,
        }).unwrap();
        prop_assert!(swapped.is_dirty(&DirtyRules::default()));
    }
}
