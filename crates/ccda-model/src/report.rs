//! Report rows as written to `results.csv`.

use serde::Serialize;

use crate::counts::{CategoryCount, FileOutcome, Totals};
use crate::error::{ModelError, Result};

/// Column order of the report.
pub const REPORT_HEADER: [&str; 5] = [
    "Filename",
    "labs",
    "vitals",
    "labs_w_loinc",
    "vitals_w_loinc",
];

/// Value written in every numeric column of a failed document.
pub const FAILED_SENTINEL: i64 = -1;

/// Filename of the trailing aggregate row.
pub const TOTAL_LABEL: &str = "Total";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportRow {
    #[serde(rename = "Filename")]
    pub filename: String,
    pub labs: i64,
    pub vitals: i64,
    pub labs_w_loinc: i64,
    pub vitals_w_loinc: i64,
}

impl ReportRow {
    pub fn failed(filename: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            labs: FAILED_SENTINEL,
            vitals: FAILED_SENTINEL,
            labs_w_loinc: FAILED_SENTINEL,
            vitals_w_loinc: FAILED_SENTINEL,
        }
    }

    pub fn from_outcome(filename: impl Into<String>, outcome: &FileOutcome) -> Result<Self> {
        let Some(counts) = outcome.counts() else {
            return Ok(Self::failed(filename));
        };
        let (labs, labs_w_loinc) = category_columns("labs", counts.labs)?;
        let (vitals, vitals_w_loinc) = category_columns("vitals", counts.vitals)?;
        Ok(Self {
            filename: filename.into(),
            labs,
            vitals,
            labs_w_loinc,
            vitals_w_loinc,
        })
    }

    pub fn total(totals: &Totals) -> Result<Self> {
        Ok(Self {
            filename: TOTAL_LABEL.to_string(),
            labs: column("labs", totals.labs)?,
            vitals: column("vitals", totals.vitals)?,
            labs_w_loinc: column("labs_w_loinc", totals.labs_w_loinc)?,
            vitals_w_loinc: column("vitals_w_loinc", totals.vitals_w_loinc)?,
        })
    }

    pub fn is_failed(&self) -> bool {
        [self.labs, self.vitals, self.labs_w_loinc, self.vitals_w_loinc]
            .iter()
            .all(|value| *value == FAILED_SENTINEL)
    }
}

fn category_columns(field: &'static str, count: CategoryCount) -> Result<(i64, i64)> {
    Ok((column(field, count.total)?, column(field, count.codified)?))
}

fn column(field: &'static str, value: usize) -> Result<i64> {
    i64::try_from(value).map_err(|_| ModelError::CountOverflow { field, value })
}
