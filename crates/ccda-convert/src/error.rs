//! Error types for document conversion.

use std::path::PathBuf;

use ccda_ingest::IngestError;
use thiserror::Error;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConversionError {
    /// No template with this name in the search path or built-ins.
    #[error("template '{name}' not found (searched {})", display_paths(.searched))]
    TemplateNotFound { name: String, searched: Vec<PathBuf> },

    #[error("failed to read template {path}")]
    TemplateRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid template {origin}")]
    TemplateParse {
        origin: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid template {origin}: {reason}")]
    TemplateRule { origin: String, reason: String },

    #[error(transparent)]
    Decode(#[from] IngestError),

    #[error("malformed XML in {document}: {message}")]
    Xml { document: String, message: String },

    #[error("{document} is not a ClinicalDocument (root element is '{found}')")]
    NotClinicalDocument { document: String, found: String },
}

fn display_paths(paths: &[PathBuf]) -> String {
    if paths.is_empty() {
        return "built-in templates only".to_string();
    }
    paths
        .iter()
        .map(|path| path.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

pub type Result<T> = std::result::Result<T, ConversionError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_lists_search_path() {
        let err = ConversionError::TemplateNotFound {
            name: "Referral".to_string(),
            searched: vec![PathBuf::from("/a"), PathBuf::from("/b")],
        };
        assert_eq!(err.to_string(), "template 'Referral' not found (searched /a, /b)");
    }
}
