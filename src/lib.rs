#![deny(rust_2018_idioms)]

pub mod cache;
pub mod client;
pub mod confirm;
pub mod domain;
pub mod entities;
pub mod error;
pub mod form;
pub mod io;
pub mod options;
pub mod progress;
pub mod search;
pub mod session;
pub mod status;
pub mod submit;
pub mod upload;
pub mod validation;

pub use cache::MemoCache;
pub use confirm::{ConfirmationGate, PendingAction, PendingActionKind};
pub use domain::{Entity, EntityId, FieldPath, FieldValue, Record};
pub use error::{ApiError, FileRejected, UpdateError};
pub use form::{DirtyRules, FieldAccess, FormCommand, FormState};
pub use io::{DocumentFormat, load_document, parse_document_str};
pub use options::EditorOptions;
pub use progress::{JobStatus, ProgressTracker};
pub use search::{Candidate, SearchSelect};
pub use session::{CloseDecision, EditorSession};
pub use submit::{FormEvent, SubmissionController, SubmitStart};
pub use upload::{FileConstraints, StagedFile};
pub use validation::{Validate, ValidationResult};

pub mod prelude {
    pub use super::{
        ApiError, CloseDecision, EditorOptions, EditorSession, Entity, FieldPath, FieldValue,
        FormCommand, FormEvent, FormState, Record, Validate, ValidationResult,
    };
}
