use serde_json::Value;
use thiserror::Error;

/// Failure reported by the API collaborator for a submission, search or
/// confirmed action.
///
/// Local validation never produces one of these; it is reported through
/// [`crate::validation::ValidationResult`] before any request is sent.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ApiError {
    /// Credentials or the confirmation password were rejected.
    #[error("not authorized: {}", display_message(.message))]
    Authorization { message: Option<String> },
    /// The request clashed with server state ("already in pack", "pack full").
    #[error("request conflicts with current state: {}", display_message(.message))]
    Conflict { message: Option<String> },
    /// Timeout or connectivity failure; the request may not have arrived.
    #[error("network failure: {message}")]
    Network { message: String },
    /// The entity changed or disappeared since it was loaded.
    #[error("entity is stale: {}", display_message(.message))]
    Stale { message: Option<String> },
    #[error("server error {status}: {}", display_message(.message))]
    Server { status: u16, message: Option<String> },
    /// The request was superseded or aborted; never shown to the user.
    #[error("request cancelled")]
    Cancelled,
}

fn display_message(message: &Option<String>) -> &str {
    message.as_deref().unwrap_or("<no message>")
}

impl ApiError {
    pub fn network(message: impl Into<String>) -> Self {
        ApiError::Network {
            message: message.into(),
        }
    }

    /// Classifies an HTTP failure and pulls the server's message out of its body.
    pub fn from_response(status: u16, body: Option<&Value>) -> Self {
        let message = body.and_then(server_message);
        match status {
            401 | 403 => ApiError::Authorization { message },
            400 | 409 | 422 => ApiError::Conflict { message },
            404 | 410 => ApiError::Stale { message },
            _ => ApiError::Server { status, message },
        }
    }

    /// Message supplied by the server, if any.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            ApiError::Authorization { message }
            | ApiError::Conflict { message }
            | ApiError::Stale { message }
            | ApiError::Server { message, .. } => message.as_deref(),
            ApiError::Network { .. } | ApiError::Cancelled => None,
        }
    }

    /// Text to show the user: the server's own message when it sent one,
    /// otherwise `fallback`.
    pub fn user_message(&self, fallback: &str) -> String {
        self.server_message()
            .map(str::trim)
            .filter(|message| !message.is_empty())
            .unwrap_or(fallback)
            .to_string()
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, ApiError::Cancelled)
    }

    pub fn is_authorization(&self) -> bool {
        matches!(self, ApiError::Authorization { .. })
    }
}

/// Extracts a human readable message from an error body, preferring the
/// `error`, then `message`, then `details` keys.
fn server_message(body: &Value) -> Option<String> {
    if let Value::String(text) = body {
        return Some(text.clone()).filter(|text| !text.trim().is_empty());
    }
    ["error", "message", "details"].iter().find_map(|key| {
        match body.get(key)? {
            Value::String(text) if !text.trim().is_empty() => Some(text.clone()),
            Value::Object(inner) => inner
                .get("message")
                .and_then(Value::as_str)
                .map(str::to_string),
            _ => None,
        }
    })
}

/// A typed update addressed nothing it could change.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UpdateError {
    #[error("path is empty")]
    EmptyPath,
    #[error("unknown field '{0}'")]
    UnknownField(String),
    #[error("'{0}' is not a list")]
    NotAList(String),
    #[error("'{0}' is not a record")]
    NotARecord(String),
    #[error("index {index} is out of bounds for '{path}' (length {len})")]
    IndexOutOfBounds {
        path: String,
        index: usize,
        len: usize,
    },
    #[error("field '{0}' is not editable")]
    FieldLocked(String),
}

/// A staged file failed the upload allow-list.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FileRejected {
    #[error("file type '{mime}' is not allowed")]
    UnsupportedType { mime: String },
    #[error("file is {size} bytes; the limit is {max} bytes")]
    TooLarge { size: u64, max: u64 },
    #[error("file is empty")]
    Empty,
}
