//! Reading entity, schema and option documents from disk, stdin or inline
//! text.

mod format;
mod input;

pub use format::{DocumentFormat, ExtensionFormat};
pub use input::{DocumentSource, load_document, parse_document_str, parse_with_fallback};
