//! Observation counting over a converted record.

use serde_json::Value;

use ccda_model::{CategoryCount, FileCounts};

use crate::definitions::{CategoryQuery, codified_filter};
use crate::error::Result;
use crate::path::Query;

/// Count the resources selected by `query` and how many of them are codified.
///
/// The codified filter only ever sees the category matches, so
/// `codified <= total` always holds.
///
/// # Errors
///
/// Propagates query evaluation failures rather than reporting zero.
pub fn count(query: &Query, record: &Value) -> Result<CategoryCount> {
    let matches = query.select(record)?;
    let codified = codified_filter().select(&matches);
    let count = CategoryCount::new(matches.len(), codified.len());
    debug_assert!(count.is_consistent());
    Ok(count)
}

/// Laboratory and vital-sign counts for one record.
pub fn count_document(record: &Value) -> Result<FileCounts> {
    let labs = count(CategoryQuery::Laboratory.query(), record)?;
    let vitals = count(CategoryQuery::VitalSigns.query(), record)?;
    Ok(FileCounts::new(labs, vitals))
}
