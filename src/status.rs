#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusLine {
    message: String,
}

pub const READY_STATUS: &str = "No unsaved changes.";
pub const UNSAVED_STATUS: &str = "Unsaved changes";

impl Default for StatusLine {
    fn default() -> Self {
        Self {
            message: READY_STATUS.to_string(),
        }
    }
}

impl StatusLine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ready(&mut self) {
        self.message = READY_STATUS.to_string();
    }

    pub fn unsaved(&mut self) {
        self.message = UNSAVED_STATUS.to_string();
    }

    pub fn saving(&mut self) {
        self.message = "Saving...".to_string();
    }

    pub fn saved(&mut self) {
        self.message = "Changes saved".to_string();
    }

    pub fn issues_remaining(&mut self, count: usize) {
        self.message = format!("{count} issue(s) remaining");
    }

    pub fn awaiting_confirmation(&mut self, action: &str) {
        self.message = format!("Confirm {action} to continue, or cancel.");
    }

    pub fn pending_close(&mut self) {
        self.message = "Unsaved changes. Close again to discard them.".to_string();
    }

    pub fn close_blocked(&mut self) {
        self.message = "Wait for the save to finish before closing.".to_string();
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}
