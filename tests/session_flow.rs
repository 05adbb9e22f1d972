mod common;

use std::time::Duration;

use common::{MockActions, MockEntities, MockSearch};
use curation_forms::confirm::{GateError, PASSWORD_FIELD, PendingActionKind};
use curation_forms::client::SearchClient;
use curation_forms::session::search_with;
use curation_forms::validation::{NoValidation, RatingRules, Rules};
use curation_forms::{
    ApiError, Candidate, EditorOptions, EditorSession, Entity, FieldValue, FormEvent, PendingAction,
    Record, SearchSelect, SubmitStart,
};
use serde_json::json;

fn pack() -> Entity {
    Entity::from_json(json!({"id": 4, "name": "Weekly", "isPinned": false})).unwrap()
}

#[tokio::test]
async fn successful_save_adopts_server_truth() {
    let client = MockEntities::echo(0);
    let mut session = EditorSession::open(pack(), Rules::new().required("name"), EditorOptions::default());
    session.set_field("name", "Weekly Picks").unwrap();
    let events = session.save_with(&client).await;

    assert_eq!(client.call_count(), 1);
    assert!(!session.is_dirty());
    assert!(!session.is_submitting());
    assert!(events.iter().any(|event| matches!(event, FormEvent::Saved(_))));
    assert_eq!(session.state().baseline().get("name"), Some(&FieldValue::text("Weekly Picks")));
    assert_eq!(session.status().message(), "Changes saved");
}

#[tokio::test]
async fn failed_save_keeps_every_typed_character() {
    let client = MockEntities::failing(ApiError::from_response(
        400,
        Some(&json!({"error": "Level already in pack"})),
    ));
    let mut session = EditorSession::open(pack(), NoValidation, EditorOptions::default());
    session.set_field("name", "Half typed ").unwrap();
    let before = session.state().clone();
    let events = session.save_with(&client).await;

    assert_eq!(session.state(), &before);
    assert_eq!(events, vec![FormEvent::error("Level already in pack")]);
    assert!(!session.is_submitting());
}

#[tokio::test]
async fn invalid_forms_never_reach_the_network() {
    let client = MockEntities::echo(0);
    let mut session = EditorSession::open(pack(), Rules::new().required("name"), EditorOptions::default());
    session.set_field("name", "   ").unwrap();
    let events = session.save_with(&client).await;

    assert_eq!(client.call_count(), 0);
    assert!(!session.is_submitting());
    match &events[..] {
        [FormEvent::FieldErrors(result)] => assert!(!result.is_field_valid("name")),
        other => panic!("unexpected events {other:?}"),
    }
}

#[tokio::test]
async fn created_entities_get_their_server_id() {
    let client = MockEntities::echo(77);
    let mut session = EditorSession::create(
        Record::new().with("name", "New Pack").with("isPinned", false),
        NoValidation,
        EditorOptions::default().with_close_on_success(true),
    );
    assert!(session.can_save());
    let events = session.save_with(&client).await;

    assert_eq!(session.state().id(), Some(77i64.into()));
    assert!(!session.state().is_creating());
    assert!(events.contains(&FormEvent::Close));
    assert!(session.is_closed());
}

#[tokio::test]
async fn rating_payload_clears_comment_with_rating() {
    let client = MockEntities::echo(0);
    let detail = Entity::from_json(json!({"id": 9, "rating": "U5", "comment": "fine"})).unwrap();
    let mut session = EditorSession::open(detail, RatingRules::default(), EditorOptions::default());
    session.set_field("rating", "").unwrap();
    assert!(session.is_dirty());
    session.save_with(&client).await;

    let payload = client.last_payload().unwrap();
    assert_eq!(payload.get("comment"), Some(&FieldValue::text("")));
}

#[tokio::test]
async fn later_search_wins_under_jitter() {
    let client = MockSearch::new(vec![
        Candidate::new(1i64, "Camellia"),
        Candidate::new(2i64, "Cameron"),
    ])
    .with_delay("cam", Duration::from_millis(40));
    let mut picker = SearchSelect::new("creatorId");

    let cam = picker.set_query("cam").unwrap();
    let camellia = picker.set_query("camellia").unwrap();
    let (cam_result, camellia_result) =
        tokio::join!(client.search(&cam.query), client.search(&camellia.query));

    assert!(picker.receive(camellia.seq, camellia_result));
    assert!(!picker.receive(cam.seq, cam_result));
    assert_eq!(picker.results(), &[Candidate::new(1i64, "Camellia")][..]);
}

#[tokio::test]
async fn blank_search_makes_no_call() {
    let client = MockSearch::new(vec![Candidate::new(1i64, "Camellia")]);
    let mut picker = SearchSelect::new("creatorId");
    assert!(!search_with(&mut picker, &client, "  ").await);
    assert_eq!(client.call_count(), 0);
    assert!(search_with(&mut picker, &client, "cam").await);
    assert_eq!(client.call_count(), 1);
    assert_eq!(picker.results().len(), 1);
}

#[tokio::test]
async fn confirmed_ban_runs_exactly_once() {
    let player = Record::new().with("id", 3i64).with("isBanned", false);
    let client = MockActions::new(player.clone());
    let mut session = EditorSession::open(Entity::new(player), NoValidation, EditorOptions::default());
    session
        .stage_action(PendingAction::toggle(PendingActionKind::Ban, "isBanned", false))
        .unwrap();

    session.execute_action(&client, None).await.unwrap();
    assert_eq!(
        session.execute_action(&client, None).await,
        Err(GateError::NothingPending)
    );
    assert_eq!(client.call_count(), 1);
    assert_eq!(session.displayed("isBanned"), FieldValue::Bool(true));
    assert!(!session.is_dirty());
}

#[tokio::test]
async fn rejected_password_is_a_field_error() {
    let player = Record::new().with("id", 3i64).with("isRatingBanned", false);
    let client = MockActions::new(player.clone()).with_password("s3cret");
    let mut session = EditorSession::open(Entity::new(player), NoValidation, EditorOptions::default());
    session
        .stage_action(
            PendingAction::toggle(PendingActionKind::RatingBan, "isRatingBanned", false).requiring_password(),
        )
        .unwrap();

    assert_eq!(
        session.execute_action(&client, None).await,
        Err(GateError::PasswordRequired)
    );
    assert_eq!(client.call_count(), 0);
    let events = session.execute_action(&client, Some("wrong")).await.unwrap();
    match &events[..] {
        [FormEvent::FieldErrors(result)] => {
            assert_eq!(result.error_for(PASSWORD_FIELD), Some("Invalid password"))
        }
        other => panic!("unexpected events {other:?}"),
    }
    assert!(session.gate().is_idle());
    assert_eq!(session.displayed("isRatingBanned"), FieldValue::Bool(false));
}

#[test]
fn reentrant_save_is_a_no_op() {
    let mut session = EditorSession::open(pack(), NoValidation, EditorOptions::default());
    session.set_field("name", "Other").unwrap();
    let SubmitStart::Started(ticket) = session.begin_save() else {
        panic!("first save should start");
    };
    assert_eq!(session.begin_save(), SubmitStart::Busy);
    assert!(!session.can_save());
    let events = session.finish_save(ticket, Ok(Entity::from_json(json!({"id": 4, "name": "Other"})).unwrap()));
    assert!(!events.is_empty());
    assert!(!session.is_submitting());
}

#[test]
fn save_in_flight_holds_back_confirmed_actions() {
    let mut session = EditorSession::open(
        Entity::from_json(json!({"id": 3, "name": "Player", "isBanned": false})).unwrap(),
        NoValidation,
        EditorOptions::default(),
    );
    session.set_field("name", "Renamed").unwrap();
    let SubmitStart::Started(save) = session.begin_save() else {
        panic!("save should start");
    };
    session
        .stage_action(PendingAction::toggle(PendingActionKind::Ban, "isBanned", false))
        .unwrap();
    assert_eq!(session.confirm_action(None).unwrap_err(), GateError::Busy);
    assert!(!session.gate().is_executing());

    session.finish_save(
        save,
        Ok(Entity::from_json(json!({"id": 3, "name": "Renamed", "isBanned": false})).unwrap()),
    );
    assert!(session.confirm_action(None).is_ok());
}

#[test]
fn executing_action_holds_back_saves() {
    let mut session = EditorSession::open(
        Entity::from_json(json!({"id": 3, "name": "Player", "isBanned": false})).unwrap(),
        NoValidation,
        EditorOptions::default(),
    );
    session.set_field("name", "Renamed").unwrap();
    session
        .stage_action(PendingAction::toggle(PendingActionKind::Ban, "isBanned", false))
        .unwrap();
    let action = session.confirm_action(None).unwrap();
    assert_eq!(session.begin_save(), SubmitStart::Busy);
    assert!(!session.can_save());
    assert!(!session.is_submitting());

    session.finish_action(
        action,
        Ok(Entity::from_json(json!({"id": 3, "name": "Player", "isBanned": true})).unwrap()),
    );
    assert!(matches!(session.begin_save(), SubmitStart::Started(_)));
}

#[tokio::test]
async fn passwords_are_sent_as_typed() {
    let player = Record::new().with("id", 3i64).with("isRatingBanned", false);
    let client = MockActions::new(player.clone()).with_password(" pass phrase ");
    let mut session = EditorSession::open(Entity::new(player), NoValidation, EditorOptions::default());
    session
        .stage_action(
            PendingAction::toggle(PendingActionKind::RatingBan, "isRatingBanned", false).requiring_password(),
        )
        .unwrap();

    let events = session.execute_action(&client, Some(" pass phrase ")).await.unwrap();
    assert!(events.iter().any(|event| matches!(event, FormEvent::Saved(_))));
    assert_eq!(session.displayed("isRatingBanned"), FieldValue::Bool(true));
}
