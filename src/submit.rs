use crate::{
    client::Translate,
    domain::{Entity, EntityId, Record},
    error::ApiError,
    form::FormState,
    validation::{Validate, ValidationResult},
};

pub const DEFAULT_SUCCESS_MESSAGE: &str = "Changes saved";
pub const DEFAULT_FAILURE_MESSAGE: &str = "Failed to save changes";
pub const SUCCESS_MESSAGE_KEY: &str = "form.saveSuccess";
pub const FAILURE_MESSAGE_KEY: &str = "form.saveError";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotifyKind {
    Success,
    Error,
}

/// Something the surrounding UI should react to. Returned from operations
/// instead of being pushed through callbacks.
#[derive(Debug, Clone, PartialEq)]
pub enum FormEvent {
    /// A toast for the notification surface.
    Notify { kind: NotifyKind, message: String },
    /// Per-field errors to flag next to the inputs.
    FieldErrors(ValidationResult),
    /// The server confirmed this entity; parents holding a copy should
    /// replace theirs.
    Saved(Entity),
    /// The editor asked to be closed.
    Close,
}

impl FormEvent {
    pub fn success(message: impl Into<String>) -> Self {
        FormEvent::Notify {
            kind: NotifyKind::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        FormEvent::Notify {
            kind: NotifyKind::Error,
            message: message.into(),
        }
    }
}

/// Proof that a submission was started. Carries the validated payload and is
/// consumed by [`SubmissionController::finish`].
#[derive(Debug, PartialEq)]
pub struct SubmitTicket {
    seq: u64,
    id: Option<EntityId>,
    payload: Record,
}

impl SubmitTicket {
    pub fn seq(&self) -> u64 {
        self.seq
    }

    /// Id of the entity being saved; `None` when creating.
    pub fn entity_id(&self) -> Option<&EntityId> {
        self.id.as_ref()
    }

    pub fn payload(&self) -> &Record {
        &self.payload
    }
}

#[derive(Debug, PartialEq)]
pub enum SubmitStart {
    Started(SubmitTicket),
    /// Validation failed; nothing may be sent.
    Invalid(ValidationResult),
    /// Another submission is still in flight.
    Busy,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SubmitOutcome {
    pub state: FormState,
    pub events: Vec<FormEvent>,
}

/// Serializes saves for one editor: validate, hand out a ticket, then fold
/// the server's answer back into the form.
#[derive(Debug, Clone)]
pub struct SubmissionController {
    in_flight: Option<u64>,
    next_seq: u64,
    close_on_success: bool,
    success_message: String,
    failure_message: String,
}

impl Default for SubmissionController {
    fn default() -> Self {
        Self {
            in_flight: None,
            next_seq: 0,
            close_on_success: false,
            success_message: DEFAULT_SUCCESS_MESSAGE.to_string(),
            failure_message: DEFAULT_FAILURE_MESSAGE.to_string(),
        }
    }
}

impl SubmissionController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_close_on_success(mut self, close: bool) -> Self {
        self.close_on_success = close;
        self
    }

    pub fn with_messages(mut self, success: impl Into<String>, failure: impl Into<String>) -> Self {
        self.success_message = success.into();
        self.failure_message = failure.into();
        self
    }

    /// Takes both toast messages from a translation catalog.
    pub fn localized<T>(self, translator: &T) -> Self
    where
        T: Translate + ?Sized,
    {
        self.with_messages(
            translator.translate(SUCCESS_MESSAGE_KEY, &[]),
            translator.translate(FAILURE_MESSAGE_KEY, &[]),
        )
    }

    pub fn is_submitting(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Validates `state` and, when it passes and nothing else is in flight,
    /// marks a submission as started.
    pub fn begin<V>(&mut self, state: &FormState, validator: &V) -> SubmitStart
    where
        V: Validate + ?Sized,
    {
        if self.in_flight.is_some() {
            tracing::debug!("submission already in flight; ignoring");
            return SubmitStart::Busy;
        }
        let result = validator.validate(state.current());
        if !result.is_valid() {
            tracing::debug!(issues = result.issue_count(), "submission blocked by validation");
            return SubmitStart::Invalid(result);
        }
        self.next_seq += 1;
        self.in_flight = Some(self.next_seq);
        let ticket = SubmitTicket {
            seq: self.next_seq,
            id: state.id(),
            payload: validator.prepare(state.current()),
        };
        tracing::debug!(seq = ticket.seq, id = ?ticket.id, "submission started");
        SubmitStart::Started(ticket)
    }

    /// Folds the server's answer into `state`.
    ///
    /// On success the returned state is rebuilt from the server entity. On
    /// failure it is `state` unchanged. A ticket that does not belong to the
    /// in-flight submission changes nothing.
    pub fn finish(
        &mut self,
        ticket: SubmitTicket,
        state: &FormState,
        result: Result<Entity, ApiError>,
    ) -> SubmitOutcome {
        if self.in_flight != Some(ticket.seq) {
            tracing::debug!(seq = ticket.seq, "ignoring answer for a stale submission");
            return SubmitOutcome {
                state: state.clone(),
                events: Vec::new(),
            };
        }
        self.in_flight = None;
        match result {
            Ok(entity) => {
                tracing::debug!(seq = ticket.seq, id = ?entity.id(), "submission succeeded");
                let mut events = vec![
                    FormEvent::success(self.success_message.clone()),
                    FormEvent::Saved(entity.clone()),
                ];
                if self.close_on_success {
                    events.push(FormEvent::Close);
                }
                SubmitOutcome {
                    state: state.reset_to(entity),
                    events,
                }
            }
            Err(err) => {
                let events = if err.is_cancelled() {
                    Vec::new()
                } else {
                    tracing::warn!(seq = ticket.seq, error = %err, "submission failed");
                    vec![FormEvent::error(err.user_message(&self.failure_message))]
                };
                SubmitOutcome {
                    state: state.clone(),
                    events,
                }
            }
        }
    }
}
