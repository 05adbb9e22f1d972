use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::{
    domain::{Entity, EntityId, FieldValue},
    error::ApiError,
    form::FormCommand,
};

/// One search hit eligible for selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub id: EntityId,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl Candidate {
    pub fn new(id: impl Into<EntityId>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            detail: None,
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    /// Builds a candidate from a created entity, labelled by its `name`.
    pub fn from_entity(entity: &Entity) -> Option<Self> {
        let id = entity.id()?;
        let label = entity
            .record()
            .get("name")
            .map(FieldValue::display)
            .unwrap_or_else(|| id.to_string());
        Some(Self {
            id,
            label,
            detail: None,
        })
    }
}

/// A query the caller should run. Hand its `seq` back with the answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    pub seq: u64,
    pub query: String,
}

/// Picker state for choosing a related entity (creator, team, role, channel)
/// by free-text search.
///
/// Every query gets a fresh sequence number and only the answer carrying the
/// latest one is shown, so a slow early answer never replaces a newer one.
#[derive(Debug, Clone)]
pub struct SearchSelect {
    field: String,
    query: String,
    results: Vec<Candidate>,
    excluded: HashSet<EntityId>,
    latest: u64,
    awaiting: bool,
    error: Option<String>,
    closed: bool,
}

impl SearchSelect {
    /// `field` is the top-level form field a selection is written to.
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            query: String::new(),
            results: Vec::new(),
            excluded: HashSet::new(),
            latest: 0,
            awaiting: false,
            error: None,
            closed: false,
        }
    }

    pub fn with_excluded<I>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = EntityId>,
    {
        self.excluded.extend(ids);
        self
    }

    pub fn exclude(&mut self, id: EntityId) {
        self.results.retain(|candidate| candidate.id != id);
        self.excluded.insert(id);
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn results(&self) -> &[Candidate] {
        &self.results
    }

    pub fn is_loading(&self) -> bool {
        self.awaiting
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Records the typed query. Blank queries clear the results and need no
    /// request; anything else supersedes whatever is in flight.
    pub fn set_query(&mut self, query: impl Into<String>) -> Option<SearchRequest> {
        self.query = query.into();
        self.latest += 1;
        self.error = None;
        let trimmed = self.query.trim();
        if trimmed.is_empty() || self.closed {
            self.results.clear();
            self.awaiting = false;
            return None;
        }
        self.awaiting = true;
        Some(SearchRequest {
            seq: self.latest,
            query: trimmed.to_string(),
        })
    }

    /// Applies an answer. Returns whether it was shown; answers for older
    /// queries, cancelled requests and anything arriving after close are
    /// dropped.
    pub fn receive(&mut self, seq: u64, result: Result<Vec<Candidate>, ApiError>) -> bool {
        if self.closed || seq != self.latest {
            tracing::debug!(seq, latest = self.latest, "dropping stale search answer");
            return false;
        }
        match result {
            Err(ApiError::Cancelled) => {
                self.awaiting = false;
                false
            }
            Err(err) => {
                self.awaiting = false;
                self.results.clear();
                self.error = Some(err.user_message("Search failed"));
                true
            }
            Ok(candidates) => {
                self.awaiting = false;
                self.results = candidates
                    .into_iter()
                    .filter(|candidate| !self.excluded.contains(&candidate.id))
                    .collect();
                true
            }
        }
    }

    /// Picks a shown candidate, clears the picker, and returns the command
    /// that writes its id into the form.
    pub fn select(&mut self, id: &EntityId) -> Option<FormCommand> {
        let candidate = self.results.iter().find(|candidate| &candidate.id == id)?.clone();
        Some(self.choose(candidate))
    }

    /// Whether the "create new" option should be offered.
    pub fn can_create(&self) -> bool {
        !self.query.trim().is_empty() && !self.awaiting && self.results.is_empty()
    }

    /// Name to prefill in a nested create form.
    pub fn create_prefill(&self) -> String {
        self.query.trim().to_string()
    }

    /// Treats a freshly created entity exactly like a picked result.
    pub fn select_created(&mut self, entity: &Entity) -> Option<FormCommand> {
        let candidate = Candidate::from_entity(entity)?;
        Some(self.choose(candidate))
    }

    /// Stops listening; later answers are ignored.
    pub fn close(&mut self) {
        self.closed = true;
        self.latest += 1;
        self.awaiting = false;
        self.query.clear();
        self.results.clear();
    }

    fn choose(&mut self, candidate: Candidate) -> FormCommand {
        self.latest += 1;
        self.awaiting = false;
        self.query.clear();
        self.results.clear();
        FormCommand::set(self.field.clone(), candidate.id.to_value())
    }
}
