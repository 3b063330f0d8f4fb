//! Batch inspection of CCDA documents.
//!
//! [`batch::run_batch`] converts every document under an input directory,
//! counts laboratory and vital-sign observations, and streams one CSV row per
//! document plus a `Total` row.

pub mod batch;
pub mod logging;
pub mod types;
