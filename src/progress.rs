use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const PROGRESS_EVENT_TYPE: &str = "levelUploadProgress";
pub const DEFAULT_FAILURE_MESSAGE: &str = "Upload failed";

/// Everything except the characters a URI component may carry unescaped.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Path of the server-push channel reporting progress for `job_id`.
pub fn event_source_path(job_id: &str) -> String {
    let source = format!("levelUpload:{job_id}");
    format!("/events?source={}", utf8_percent_encode(&source, COMPONENT))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Uploading,
    Processing,
    Caching,
    Completed,
    Failed,
}

impl JobStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressUpdate {
    pub status: JobStatus,
    #[serde(default)]
    pub progress_percent: Option<f64>,
    #[serde(default)]
    pub current_step: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Deserialize)]
struct Envelope {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    data: Value,
}

/// Parses one stream message. Keepalives, other event types and malformed
/// payloads yield `None`.
pub fn parse_message(raw: &str) -> Option<ProgressUpdate> {
    let envelope: Envelope = match serde_json::from_str(raw) {
        Ok(envelope) => envelope,
        Err(err) => {
            tracing::debug!(%err, "ignoring non-JSON progress message");
            return None;
        }
    };
    if envelope.kind != PROGRESS_EVENT_TYPE {
        return None;
    }
    match serde_json::from_value(envelope.data) {
        Ok(update) => Some(update),
        Err(err) => {
            tracing::debug!(%err, "ignoring malformed progress payload");
            None
        }
    }
}

/// Folds a progress stream into its latest state.
///
/// Once a terminal status arrives it sticks: anything delivered afterwards
/// is ignored. The percentage never moves backwards.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProgressTracker {
    status: Option<JobStatus>,
    percent: f64,
    current_step: Option<String>,
    error: Option<String>,
}

impl ProgressTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns whether the update changed anything.
    pub fn apply(&mut self, update: ProgressUpdate) -> bool {
        if self.is_finished() {
            tracing::debug!(status = ?update.status, "ignoring update after terminal status");
            return false;
        }
        let before = self.clone();
        self.status = Some(update.status);
        if let Some(percent) = update.progress_percent
            && percent.is_finite()
        {
            self.percent = self.percent.max(percent.clamp(0.0, 100.0));
        }
        if update.status == JobStatus::Completed {
            self.percent = 100.0;
        }
        if update.current_step.is_some() {
            self.current_step = update.current_step;
        }
        if update.status == JobStatus::Failed {
            self.error = update.error.filter(|message| !message.trim().is_empty());
        }
        *self != before
    }

    /// Parses and applies a raw stream message.
    pub fn feed(&mut self, raw: &str) -> bool {
        parse_message(raw).is_some_and(|update| self.apply(update))
    }

    pub fn status(&self) -> Option<JobStatus> {
        self.status
    }

    pub fn percent(&self) -> f64 {
        self.percent
    }

    pub fn current_step(&self) -> Option<&str> {
        self.current_step.as_deref()
    }

    pub fn is_finished(&self) -> bool {
        self.status.is_some_and(JobStatus::is_terminal)
    }

    /// Failure text for a failed job.
    pub fn error_message(&self) -> Option<&str> {
        match self.status {
            Some(JobStatus::Failed) => Some(self.error.as_deref().unwrap_or(DEFAULT_FAILURE_MESSAGE)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(status: &str, percent: f64) -> String {
        format!(
            r#"{{"type":"levelUploadProgress","data":{{"status":"{status}","progressPercent":{percent}}}}}"#
        )
    }

    #[test]
    fn encodes_event_source() {
        assert_eq!(event_source_path("abc-123"), "/events?source=levelUpload%3Aabc-123");
        assert_eq!(event_source_path("a b/c"), "/events?source=levelUpload%3Aa%20b%2Fc");
    }

    #[test]
    fn ignores_keepalives_and_foreign_events() {
        assert_eq!(parse_message(": keepalive"), None);
        assert_eq!(parse_message(r#"{"type":"packUpdate","data":{}}"#), None);
        assert_eq!(parse_message(r#"{"type":"levelUploadProgress","data":{"status":"exploded"}}"#), None);
        let mut tracker = ProgressTracker::new();
        assert!(!tracker.feed("not json"));
        assert_eq!(tracker.status(), None);
    }

    #[test]
    fn terminal_status_sticks() {
        let mut tracker = ProgressTracker::new();
        assert!(tracker.feed(&message("uploading", 40.0)));
        assert!(tracker.feed(&message("completed", 100.0)));
        assert!(!tracker.feed(&message("processing", 60.0)));
        assert_eq!(tracker.status(), Some(JobStatus::Completed));
        assert_eq!(tracker.percent(), 100.0);
    }

    #[test]
    fn percent_never_goes_back() {
        let mut tracker = ProgressTracker::new();
        tracker.feed(&message("processing", 70.0));
        tracker.feed(&message("uploading", 30.0));
        assert_eq!(tracker.percent(), 70.0);
        assert!(!tracker.feed(&message("uploading", 30.0)));
    }

    #[test]
    fn failure_without_message_uses_fallback() {
        let mut tracker = ProgressTracker::new();
        tracker.feed(r#"{"type":"levelUploadProgress","data":{"status":"failed"}}"#);
        assert_eq!(tracker.error_message(), Some(DEFAULT_FAILURE_MESSAGE));

        let mut tracker = ProgressTracker::new();
        tracker.feed(r#"{"type":"levelUploadProgress","data":{"status":"failed","error":"Bad zip"}}"#);
        assert_eq!(tracker.error_message(), Some("Bad zip"));
        assert!(tracker.is_finished());
    }
}
