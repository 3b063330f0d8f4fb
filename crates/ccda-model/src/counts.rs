//! Per-file observation counts and the running batch totals.

use serde::{Deserialize, Serialize};

/// Matches for one category query and the codified subset of those matches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryCount {
    pub total: usize,
    pub codified: usize,
}

impl CategoryCount {
    pub fn new(total: usize, codified: usize) -> Self {
        Self { total, codified }
    }

    /// The codified count is taken over the category matches, so it can
    /// never exceed the total.
    pub fn is_consistent(&self) -> bool {
        self.codified <= self.total
    }
}

/// Laboratory and vital-sign counts for one successfully processed document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileCounts {
    pub labs: CategoryCount,
    pub vitals: CategoryCount,
}

impl FileCounts {
    pub fn new(labs: CategoryCount, vitals: CategoryCount) -> Self {
        Self { labs, vitals }
    }
}

/// Result of processing one document.
///
/// Failures carry no counts; the report layer renders them as `-1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileOutcome {
    Counted(FileCounts),
    Failed,
}

impl FileOutcome {
    pub fn counts(&self) -> Option<&FileCounts> {
        match self {
            Self::Counted(counts) => Some(counts),
            Self::Failed => None,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed)
    }
}

/// Aggregate over every document in a batch.
///
/// Only counted documents contribute to the four sums; failed documents
/// are tallied separately.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Totals {
    pub labs: usize,
    pub vitals: usize,
    pub labs_w_loinc: usize,
    pub vitals_w_loinc: usize,
    pub files_succeeded: usize,
    pub files_failed: usize,
}

impl Totals {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, counts: &FileCounts) {
        self.labs += counts.labs.total;
        self.vitals += counts.vitals.total;
        self.labs_w_loinc += counts.labs.codified;
        self.vitals_w_loinc += counts.vitals.codified;
        self.files_succeeded += 1;
    }

    pub fn record(&mut self, outcome: &FileOutcome) {
        match outcome {
            FileOutcome::Counted(counts) => self.add(counts),
            FileOutcome::Failed => self.files_failed += 1,
        }
    }

    pub fn files_seen(&self) -> usize {
        self.files_succeeded + self.files_failed
    }
}
