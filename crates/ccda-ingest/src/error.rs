//! Error types for CCDA document ingestion.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while locating or reading documents.
#[derive(Debug, Error)]
pub enum IngestError {
    /// Input directory not found or not a directory.
    #[error("directory not found: {path}")]
    DirectoryNotFound { path: PathBuf },

    /// Failed to read a document from disk.
    #[error("failed to read file {path}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Document bytes are not valid in the detected encoding.
    #[error("failed to decode {path} as {encoding}: {reason}")]
    Decode {
        path: PathBuf,
        encoding: &'static str,
        reason: String,
    },
}

/// Result type for ingestion operations.
pub type Result<T> = std::result::Result<T, IngestError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = IngestError::DirectoryNotFound {
            path: PathBuf::from("/data/ccda"),
        };
        assert_eq!(err.to_string(), "directory not found: /data/ccda");
    }

    #[test]
    fn test_read_error_keeps_cause_in_source() {
        use std::error::Error as _;

        let err = IngestError::FileRead {
            path: PathBuf::from("/data/ccda/a.xml"),
            source: std::io::Error::other("disk on fire"),
        };
        assert_eq!(err.to_string(), "failed to read file /data/ccda/a.xml");
        assert_eq!(err.source().map(ToString::to_string).as_deref(), Some("disk on fire"));
    }
}
