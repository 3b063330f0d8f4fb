//! CCDA document discovery and loading.

pub mod discovery;
pub mod document;
pub mod error;

pub use discovery::{DOCUMENT_EXTENSIONS, discover_documents, is_document_path};
pub use document::{RawDocument, SourceEncoding, display_name};
pub use error::{IngestError, Result};
