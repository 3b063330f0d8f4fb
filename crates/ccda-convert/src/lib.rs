//! CCDA to FHIR-style record conversion.
//!
//! A [`DocumentConverter`] turns one raw document plus a template name into a
//! schemaless record tree. [`CcdaConverter`] is the bundled implementation: it
//! parses the XML with `quick-xml` and emits a `Bundle` whose entries wrap
//! `Patient` and `Observation` resources. Section templates decide which
//! CCDA sections produce observations and how they are categorised.

pub mod ccda;
pub mod codes;
pub mod error;
pub mod template;
pub mod xml;

use ccda_ingest::RawDocument;
use serde_json::Value;

pub use ccda::CcdaConverter;
pub use error::{ConversionError, Result};
pub use template::{
    BUILTIN_TEMPLATES, ConversionTemplate, OBSERVATION_CATEGORY_SYSTEM, SectionRule,
    TEMPLATES_PATH_ENV_VAR, TemplateLoader,
};

/// Converts raw clinical documents into record trees.
///
/// Implementations must not share mutable state between documents so a
/// single converter can serve a whole batch.
pub trait DocumentConverter: Send + Sync {
    /// Convert `document` using the template registered as `template_name`.
    ///
    /// A document that converts to a record without matching entries is a
    /// success; errors are reserved for documents that cannot be converted.
    fn convert(&self, template_name: &str, document: &RawDocument) -> Result<Value>;
}
