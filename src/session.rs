use crate::{
    client::{ActionClient, EntityClient, SearchClient},
    confirm::{ActionTicket, ConfirmationGate, GateError, PendingAction},
    domain::{Entity, FieldValue, Record},
    error::{ApiError, FileRejected, UpdateError},
    form::{FieldAccess, FormCommand, FormEngine, FormState},
    options::EditorOptions,
    search::SearchSelect,
    status::StatusLine,
    submit::{FormEvent, SubmissionController, SubmitStart, SubmitTicket},
    upload::StagedFile,
    validation::{NoValidation, Validate, ValidationResult},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseDecision {
    Closed,
    /// Unsaved changes; a second request discards them.
    ConfirmDiscard,
    /// A save or confirmed action is in flight.
    Blocked,
}

/// One open editor: the form, its validator, the save pipeline, destructive
/// action confirmation and the close guard.
#[derive(Debug)]
pub struct EditorSession<V = NoValidation> {
    state: FormState,
    validator: V,
    options: EditorOptions,
    access: FieldAccess,
    submission: SubmissionController,
    gate: ConfirmationGate,
    status: StatusLine,
    errors: ValidationResult,
    discard_armed: bool,
    closed: bool,
}

impl<V: Validate> EditorSession<V> {
    /// Edit mode.
    pub fn open(entity: Entity, validator: V, options: EditorOptions) -> Self {
        Self::with_state(FormState::from_entity(entity), validator, options)
    }

    /// Create mode: nothing persisted yet, no id.
    pub fn create(defaults: Record, validator: V, options: EditorOptions) -> Self {
        Self::with_state(FormState::from_defaults(defaults), validator, options)
    }

    fn with_state(state: FormState, validator: V, options: EditorOptions) -> Self {
        let mut submission =
            SubmissionController::new().with_close_on_success(options.close_on_success);
        if let (Some(success), Some(failure)) = (&options.success_message, &options.failure_message) {
            submission = submission.with_messages(success.clone(), failure.clone());
        }
        Self {
            state,
            validator,
            options,
            access: FieldAccess::All,
            submission,
            gate: ConfirmationGate::new(),
            status: StatusLine::new(),
            errors: ValidationResult::valid(),
            discard_armed: false,
            closed: false,
        }
    }

    pub fn with_access(mut self, access: FieldAccess) -> Self {
        self.access = access;
        self
    }

    pub fn state(&self) -> &FormState {
        &self.state
    }

    pub fn options(&self) -> &EditorOptions {
        &self.options
    }

    pub fn status(&self) -> &StatusLine {
        &self.status
    }

    pub fn gate(&self) -> &ConfirmationGate {
        &self.gate
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Errors from the last blocked save attempt.
    pub fn field_errors(&self) -> &ValidationResult {
        &self.errors
    }

    /// Applies one edit. A rejected edit leaves the form as it was.
    pub fn apply(&mut self, command: FormCommand) -> Result<(), UpdateError> {
        let engine = FormEngine::new(&self.access, &self.options.sort_order_field);
        let next = engine.dispatch(&self.state, command)?;
        self.state = next;
        self.discard_armed = false;
        self.refresh_status();
        Ok(())
    }

    pub fn set_field(&mut self, field: impl Into<String>, value: impl Into<FieldValue>) -> Result<(), UpdateError> {
        self.apply(FormCommand::set(field, value))
    }

    pub fn is_dirty(&self) -> bool {
        self.state.is_dirty(&self.options.dirty_rules())
    }

    pub fn changed_fields(&self) -> Vec<String> {
        self.state.changed_fields(&self.options.dirty_rules())
    }

    pub fn validate(&self) -> ValidationResult {
        self.validator.validate(self.state.current())
    }

    pub fn is_submitting(&self) -> bool {
        self.submission.is_submitting()
    }

    /// Whether the save control should be enabled. New entities may be
    /// saved straight from their defaults.
    pub fn can_save(&self) -> bool {
        !self.is_submitting()
            && !self.gate.is_executing()
            && (self.state.is_creating() || self.is_dirty())
            && self.validate().is_valid()
    }

    /// Starts a save. A confirmed action that is still executing counts as
    /// a submission in flight.
    pub fn begin_save(&mut self) -> SubmitStart {
        if self.gate.is_executing() {
            tracing::debug!("confirmed action in flight; save refused");
            return SubmitStart::Busy;
        }
        let start = self.submission.begin(&self.state, &self.validator);
        match &start {
            SubmitStart::Started(_) => {
                self.errors = ValidationResult::valid();
                self.status.saving();
            }
            SubmitStart::Invalid(result) => {
                self.errors = result.clone();
                self.status.issues_remaining(result.issue_count());
            }
            SubmitStart::Busy => {}
        }
        start
    }

    pub fn finish_save(&mut self, ticket: SubmitTicket, result: Result<Entity, ApiError>) -> Vec<FormEvent> {
        let succeeded = result.is_ok();
        let outcome = self.submission.finish(ticket, &self.state, result);
        self.state = outcome.state;
        if succeeded && !self.is_submitting() {
            self.status.saved();
            self.discard_armed = false;
        } else if !self.is_submitting() {
            self.status.unsaved();
        }
        if outcome.events.contains(&FormEvent::Close) {
            self.closed = true;
        }
        outcome.events
    }

    /// Validates, sends, and folds the answer back in.
    pub async fn save_with<C>(&mut self, client: &C) -> Vec<FormEvent>
    where
        C: EntityClient + ?Sized,
    {
        let ticket = match self.begin_save() {
            SubmitStart::Started(ticket) => ticket,
            SubmitStart::Invalid(result) => return vec![FormEvent::FieldErrors(result)],
            SubmitStart::Busy => return Vec::new(),
        };
        let result = client.save(ticket.entity_id(), ticket.payload()).await;
        self.finish_save(ticket, result)
    }

    pub fn stage_action(&mut self, action: PendingAction) -> Result<(), GateError> {
        let label = action.kind().label();
        self.gate.stage(action)?;
        self.status.awaiting_confirmation(label);
        Ok(())
    }

    pub fn cancel_action(&mut self) -> Option<PendingAction> {
        let cancelled = self.gate.cancel();
        if cancelled.is_some() {
            self.refresh_status();
        }
        cancelled
    }

    /// Value to show for `field`, accounting for a staged action.
    pub fn displayed(&self, field: &str) -> FieldValue {
        let committed = self.state.get(field).cloned().unwrap_or_default();
        self.gate.displayed(field, &committed).clone()
    }

    /// Confirms the staged action. Refused while a save is in flight so only
    /// one mutating request runs against the entity at a time.
    pub fn confirm_action(&mut self, password: Option<&str>) -> Result<ActionTicket, GateError> {
        if self.is_submitting() {
            tracing::debug!("save in flight; confirmation refused");
            return Err(GateError::Busy);
        }
        self.gate.confirm(password)
    }

    /// Folds a confirmed action's answer in. Unsaved edits to other fields
    /// survive.
    pub fn finish_action(&mut self, ticket: ActionTicket, result: Result<Entity, ApiError>) -> Vec<FormEvent> {
        let was_executing = self.gate.is_executing();
        let events = self.gate.finish(ticket, result);
        for event in &events {
            if let FormEvent::Saved(entity) = event {
                self.state = self.state.rebase(entity.clone(), &self.options.dirty_rules());
            }
        }
        if was_executing && self.gate.is_idle() {
            self.refresh_status();
        }
        events
    }

    pub async fn execute_action<C>(&mut self, client: &C, password: Option<&str>) -> Result<Vec<FormEvent>, GateError>
    where
        C: ActionClient + ?Sized,
    {
        let ticket = self.confirm_action(password)?;
        let result = client.execute(ticket.action(), ticket.password()).await;
        Ok(self.finish_action(ticket, result))
    }

    /// Checks a picked file against the configured constraints.
    pub fn stage_file(&self, name: impl Into<String>, mime: &str, bytes: Vec<u8>) -> Result<StagedFile, FileRejected> {
        self.options.file_constraints.stage(name, mime, bytes)
    }

    pub fn request_close(&mut self) -> CloseDecision {
        if self.is_submitting() || self.gate.is_executing() {
            self.status.close_blocked();
            return CloseDecision::Blocked;
        }
        if self.is_dirty() && self.options.confirm_close && !self.discard_armed {
            self.discard_armed = true;
            self.status.pending_close();
            return CloseDecision::ConfirmDiscard;
        }
        self.gate.cancel();
        self.closed = true;
        CloseDecision::Closed
    }

    fn refresh_status(&mut self) {
        if self.is_dirty() {
            self.status.unsaved();
        } else {
            self.status.ready();
        }
    }
}

/// Runs one picker query end to end. Returns whether the answer was shown.
pub async fn search_with<C>(picker: &mut SearchSelect, client: &C, query: &str) -> bool
where
    C: SearchClient + ?Sized,
{
    let Some(request) = picker.set_query(query) else {
        return false;
    };
    let result = client.search(&request.query).await;
    picker.receive(request.seq, result)
}
