//! Contracts for the collaborators the controllers talk to. Implementations
//! (HTTP, toasts, translations) belong to the surrounding application.

use std::{collections::HashMap, future::Future, pin::Pin};

use crate::{
    confirm::PendingAction,
    domain::{Entity, EntityId, Record},
    error::ApiError,
    search::Candidate,
    submit::{FormEvent, NotifyKind},
};

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Persists an edited entity and answers with the server's copy.
pub trait EntityClient: Send + Sync {
    /// `id` is `None` when creating.
    fn save<'a>(
        &'a self,
        id: Option<&'a EntityId>,
        payload: &'a Record,
    ) -> BoxFuture<'a, Result<Entity, ApiError>>;
}

/// Looks up candidates for a picker.
pub trait SearchClient: Send + Sync {
    fn search<'a>(&'a self, query: &'a str) -> BoxFuture<'a, Result<Vec<Candidate>, ApiError>>;
}

/// Runs a confirmed destructive action.
pub trait ActionClient: Send + Sync {
    fn execute<'a>(
        &'a self,
        action: &'a PendingAction,
        password: Option<&'a str>,
    ) -> BoxFuture<'a, Result<Entity, ApiError>>;
}

/// Fire-and-forget notification surface.
pub trait Notify {
    fn notify(&self, kind: NotifyKind, message: &str);
}

/// Forwards every notification among `events` and returns the rest.
pub fn dispatch_notifications<N>(events: Vec<FormEvent>, notifier: &N) -> Vec<FormEvent>
where
    N: Notify + ?Sized,
{
    events
        .into_iter()
        .filter(|event| match event {
            FormEvent::Notify { kind, message } => {
                notifier.notify(*kind, message);
                false
            }
            _ => true,
        })
        .collect()
}

/// String lookup with `{name}` placeholders.
pub trait Translate {
    fn translate(&self, key: &str, params: &[(&str, &str)]) -> String;
}

/// In-memory [`Translate`] implementation; unknown keys translate to
/// themselves.
#[derive(Debug, Clone, Default)]
pub struct MessageCatalog {
    messages: HashMap<String, String>,
}

impl MessageCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, message: impl Into<String>) -> Self {
        self.messages.insert(key.into(), message.into());
        self
    }
}

impl FromIterator<(String, String)> for MessageCatalog {
    fn from_iter<T: IntoIterator<Item = (String, String)>>(iter: T) -> Self {
        Self {
            messages: iter.into_iter().collect(),
        }
    }
}

impl Translate for MessageCatalog {
    fn translate(&self, key: &str, params: &[(&str, &str)]) -> String {
        let template = self.messages.get(key).map(String::as_str).unwrap_or(key);
        params
            .iter()
            .fold(template.to_string(), |text, (name, value)| {
                text.replace(&format!("{{{name}}}"), value)
            })
    }
}
