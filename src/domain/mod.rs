mod convert;
mod path;
mod record;
mod value;

pub use path::{FieldPath, PathSegment};
pub use record::{Entity, EntityId, Record};
pub use value::FieldValue;
