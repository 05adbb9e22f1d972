mod access;
mod actions;
pub mod dirty;
mod reducers;
mod state;

pub use access::FieldAccess;
pub use actions::FormCommand;
pub use dirty::DirtyRules;
pub use reducers::{DEFAULT_SORT_ORDER_FIELD, FormEngine, apply_command};
pub use state::FormState;
