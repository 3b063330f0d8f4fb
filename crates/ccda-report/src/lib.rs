//! Streaming CSV report of per-file observation counts.
//!
//! The header is written as soon as the report is created, every row is
//! flushed as it is written, and [`ReportWriter::finish`] appends the single
//! `Total` row.

pub mod error;
pub mod writer;

pub use error::{ReportError, Result};
pub use writer::{REPORT_FILE_NAME, ReportWriter};
