use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    domain::{Entity, FieldValue},
    error::ApiError,
    submit::FormEvent,
    validation::ValidationResult,
};

pub const PASSWORD_FIELD: &str = "password";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PendingActionKind {
    Ban,
    RatingBan,
    Pause,
    Delete,
    Merge,
    TransferOwnership,
    Unlink,
}

impl PendingActionKind {
    pub fn label(self) -> &'static str {
        match self {
            PendingActionKind::Ban => "ban",
            PendingActionKind::RatingBan => "rating ban",
            PendingActionKind::Pause => "pause",
            PendingActionKind::Delete => "delete",
            PendingActionKind::Merge => "merge",
            PendingActionKind::TransferOwnership => "ownership transfer",
            PendingActionKind::Unlink => "unlink",
        }
    }
}

impl fmt::Display for PendingActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A destructive change staged behind an explicit confirm step. Immutable
/// once built.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingAction {
    kind: PendingActionKind,
    field: String,
    previous: FieldValue,
    target: FieldValue,
    requires_password: bool,
}

impl PendingAction {
    pub fn new(
        kind: PendingActionKind,
        field: impl Into<String>,
        previous: impl Into<FieldValue>,
        target: impl Into<FieldValue>,
    ) -> Self {
        Self {
            kind,
            field: field.into(),
            previous: previous.into(),
            target: target.into(),
            requires_password: false,
        }
    }

    /// A checkbox flip: the target is the negation of what is shown now.
    pub fn toggle(kind: PendingActionKind, field: impl Into<String>, shown: bool) -> Self {
        Self::new(kind, field, shown, !shown)
    }

    pub fn requiring_password(mut self) -> Self {
        self.requires_password = true;
        self
    }

    pub fn kind(&self) -> PendingActionKind {
        self.kind
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn previous(&self) -> &FieldValue {
        &self.previous
    }

    pub fn target(&self) -> &FieldValue {
        &self.target
    }

    pub fn requires_password(&self) -> bool {
        self.requires_password
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum GateState {
    Idle,
    PendingConfirmation(PendingAction),
    Executing(PendingAction),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GateError {
    #[error("an action is already executing")]
    Busy,
    #[error("no action is waiting for confirmation")]
    NothingPending,
    #[error("a password is required to confirm this action")]
    PasswordRequired,
}

/// Handed out exactly once per confirmed action.
#[derive(Debug, PartialEq)]
pub struct ActionTicket {
    seq: u64,
    action: PendingAction,
    password: Option<String>,
}

impl ActionTicket {
    pub fn action(&self) -> &PendingAction {
        &self.action
    }

    pub fn password(&self) -> Option<&str> {
        self.password.as_deref()
    }
}

/// Idle, then pending, then executing, then idle again.
#[derive(Debug, Clone)]
pub struct ConfirmationGate {
    state: GateState,
    next_seq: u64,
    failure_message: String,
}

impl Default for ConfirmationGate {
    fn default() -> Self {
        Self {
            state: GateState::Idle,
            next_seq: 0,
            failure_message: "Action failed".to_string(),
        }
    }
}

impl ConfirmationGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_failure_message(mut self, message: impl Into<String>) -> Self {
        self.failure_message = message.into();
        self
    }

    pub fn state(&self) -> &GateState {
        &self.state
    }

    pub fn is_idle(&self) -> bool {
        matches!(self.state, GateState::Idle)
    }

    pub fn is_executing(&self) -> bool {
        matches!(self.state, GateState::Executing(_))
    }

    pub fn pending(&self) -> Option<&PendingAction> {
        match &self.state {
            GateState::PendingConfirmation(action) | GateState::Executing(action) => Some(action),
            GateState::Idle => None,
        }
    }

    /// Stages `action`. A second stage while pending replaces the first.
    pub fn stage(&mut self, action: PendingAction) -> Result<&PendingAction, GateError> {
        if self.is_executing() {
            return Err(GateError::Busy);
        }
        tracing::debug!(kind = %action.kind, field = %action.field, "staged action");
        self.state = GateState::PendingConfirmation(action);
        match &self.state {
            GateState::PendingConfirmation(action) => Ok(action),
            _ => Err(GateError::NothingPending),
        }
    }

    /// Value a control bound to `field` should show: the staged target while
    /// an action on it is pending or executing, otherwise `committed`.
    pub fn displayed<'a>(&'a self, field: &str, committed: &'a FieldValue) -> &'a FieldValue {
        match self.pending() {
            Some(action) if action.field == field => &action.target,
            _ => committed,
        }
    }

    /// Drops the staged action; controls fall back to their pre-staged value.
    pub fn cancel(&mut self) -> Option<PendingAction> {
        match std::mem::replace(&mut self.state, GateState::Idle) {
            GateState::PendingConfirmation(action) => {
                tracing::debug!(kind = %action.kind, "cancelled staged action");
                Some(action)
            }
            other => {
                self.state = other;
                None
            }
        }
    }

    /// Moves to executing and hands out the only ticket for this action.
    ///
    /// A missing password leaves the action pending.
    pub fn confirm(&mut self, password: Option<&str>) -> Result<ActionTicket, GateError> {
        let action = match &self.state {
            GateState::Idle => return Err(GateError::NothingPending),
            GateState::Executing(_) => return Err(GateError::Busy),
            GateState::PendingConfirmation(action) => action.clone(),
        };
        // Blank input counts as missing; anything else is sent exactly as typed.
        let password = password.filter(|p| !p.trim().is_empty());
        if action.requires_password && password.is_none() {
            return Err(GateError::PasswordRequired);
        }
        self.next_seq += 1;
        tracing::debug!(kind = %action.kind, seq = self.next_seq, "confirmed action");
        self.state = GateState::Executing(action.clone());
        Ok(ActionTicket {
            seq: self.next_seq,
            action,
            password: password.map(str::to_string),
        })
    }

    /// Returns to idle whatever the outcome. A rejected password is reported
    /// against the password input.
    pub fn finish(&mut self, ticket: ActionTicket, result: Result<Entity, ApiError>) -> Vec<FormEvent> {
        if !self.is_executing() || ticket.seq != self.next_seq {
            tracing::debug!(seq = ticket.seq, "ignoring answer for a stale action");
            return Vec::new();
        }
        self.state = GateState::Idle;
        match result {
            Ok(entity) => vec![FormEvent::Saved(entity)],
            Err(ApiError::Cancelled) => Vec::new(),
            Err(err) if err.is_authorization() && ticket.action.requires_password => {
                tracing::warn!(kind = %ticket.action.kind, "action password rejected");
                let message = err.user_message("Invalid password");
                vec![FormEvent::FieldErrors(
                    ValidationResult::valid().with_error(PASSWORD_FIELD, message),
                )]
            }
            Err(err) => {
                tracing::warn!(kind = %ticket.action.kind, error = %err, "action failed");
                vec![FormEvent::error(err.user_message(&self.failure_message))]
            }
        }
    }
}
