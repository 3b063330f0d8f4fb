//! Counting and reporting types shared by the CCDA inspector crates.

pub mod counts;
pub mod error;
pub mod report;

pub use counts::{CategoryCount, FileCounts, FileOutcome, Totals};
pub use error::{ModelError, Result};
pub use report::{FAILED_SENTINEL, REPORT_HEADER, ReportRow, TOTAL_LABEL};
