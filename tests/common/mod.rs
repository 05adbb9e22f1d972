//! Hand-rolled collaborators for exercising the async drivers.

#![allow(dead_code)]

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use curation_forms::client::{ActionClient, BoxFuture, EntityClient, SearchClient};
use curation_forms::confirm::PendingAction;
use curation_forms::{ApiError, Candidate, Entity, EntityId, Record};

/// Answers saves by echoing the payload back with an id, or with a fixed
/// error.
pub struct MockEntities {
    failure: Option<ApiError>,
    next_id: i64,
    calls: AtomicUsize,
    last_payload: Mutex<Option<Record>>,
}

impl MockEntities {
    pub fn echo(next_id: i64) -> Self {
        Self {
            failure: None,
            next_id,
            calls: AtomicUsize::new(0),
            last_payload: Mutex::new(None),
        }
    }

    pub fn failing(error: ApiError) -> Self {
        Self {
            failure: Some(error),
            ..Self::echo(0)
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_payload(&self) -> Option<Record> {
        self.last_payload.lock().unwrap().clone()
    }
}

impl EntityClient for MockEntities {
    fn save<'a>(
        &'a self,
        id: Option<&'a EntityId>,
        payload: &'a Record,
    ) -> BoxFuture<'a, Result<Entity, ApiError>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_payload.lock().unwrap() = Some(payload.clone());
        Box::pin(async move {
            tokio::time::sleep(Duration::from_millis(5)).await;
            if let Some(error) = &self.failure {
                return Err(error.clone());
            }
            let id = id.map(EntityId::to_value).unwrap_or(self.next_id.into());
            let mut saved = payload.clone();
            saved.insert("id", id);
            Ok(Entity::new(saved))
        })
    }
}

/// Search backend whose latency depends on the query.
pub struct MockSearch {
    entries: Vec<Candidate>,
    slow_queries: Vec<(String, Duration)>,
    calls: AtomicUsize,
}

impl MockSearch {
    pub fn new(entries: Vec<Candidate>) -> Self {
        Self {
            entries,
            slow_queries: Vec::new(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn with_delay(mut self, query: &str, delay: Duration) -> Self {
        self.slow_queries.push((query.to_string(), delay));
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl SearchClient for MockSearch {
    fn search<'a>(&'a self, query: &'a str) -> BoxFuture<'a, Result<Vec<Candidate>, ApiError>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let delay = self
            .slow_queries
            .iter()
            .find(|(slow, _)| slow == query)
            .map(|(_, delay)| *delay)
            .unwrap_or(Duration::from_millis(1));
        Box::pin(async move {
            tokio::time::sleep(delay).await;
            let needle = query.to_lowercase();
            Ok(self
                .entries
                .iter()
                .filter(|candidate| candidate.label.to_lowercase().contains(&needle))
                .cloned()
                .collect())
        })
    }
}

/// Applies a confirmed action's target to a stored entity.
pub struct MockActions {
    entity: Mutex<Record>,
    password: Option<String>,
    calls: AtomicUsize,
}

impl MockActions {
    pub fn new(entity: Record) -> Self {
        Self {
            entity: Mutex::new(entity),
            password: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn with_password(mut self, password: &str) -> Self {
        self.password = Some(password.to_string());
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl ActionClient for MockActions {
    fn execute<'a>(
        &'a self,
        action: &'a PendingAction,
        password: Option<&'a str>,
    ) -> BoxFuture<'a, Result<Entity, ApiError>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Box::pin(async move {
            if let Some(expected) = &self.password
                && password != Some(expected.as_str())
            {
                return Err(ApiError::from_response(
                    403,
                    Some(&serde_json::json!({"error": "Invalid password"})),
                ));
            }
            let mut entity = self.entity.lock().unwrap();
            entity.insert(action.field(), action.target().clone());
            Ok(Entity::new(entity.clone()))
        })
    }
}
