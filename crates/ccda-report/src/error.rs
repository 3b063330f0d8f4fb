//! Error types for report writing.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("failed to create report {path}")]
    Create {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("failed to write report row for {filename}")]
    Write {
        filename: String,
        #[source]
        source: csv::Error,
    },

    #[error("failed to flush report")]
    Flush(#[from] std::io::Error),

    #[error(transparent)]
    Model(#[from] ccda_model::ModelError),
}

pub type Result<T> = std::result::Result<T, ReportError>;
