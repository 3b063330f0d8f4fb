//! The batch driver: discover, convert, count, report.

use std::error::Error as StdError;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use thiserror::Error;
use tracing::{debug, error, info, info_span};

use ccda_convert::{ConversionError, DocumentConverter};
use ccda_ingest::{IngestError, RawDocument, discover_documents, display_name};
use ccda_model::{FileCounts, FileOutcome, ReportRow, Totals};
use ccda_query::{QueryError, count_document};
use ccda_report::{ReportError, ReportWriter};

use crate::types::{BatchConfig, BatchResult, FileSummary};

/// Why a single document could not be counted.
///
/// These never abort a batch; the document's row carries `-1` sentinels.
#[derive(Debug, Error)]
pub enum FileError {
    #[error("failed to load document")]
    Read(#[from] IngestError),

    #[error("failed to convert document")]
    Convert(#[from] ConversionError),

    #[error("failed to query converted record")]
    Query(#[from] QueryError),
}

/// Rows and totals produced by [`inspect_documents`].
#[derive(Debug)]
pub struct InspectedBatch<W> {
    pub inner: W,
    pub files: Vec<FileSummary>,
    pub totals: Totals,
}

/// Runs a whole batch: discovers documents, creates the output directory and
/// report, then inspects every document.
///
/// # Errors
///
/// Only setup failures are returned: a missing input directory, an output
/// directory or report that cannot be created, or a report write failure.
/// Per-document failures are logged and reported as `-1` rows.
pub fn run_batch(config: &BatchConfig, converter: &dyn DocumentConverter) -> Result<BatchResult> {
    let span = info_span!(
        "batch",
        template = %config.template_name,
        input_dir = %config.input_dir.display()
    );
    let _guard = span.enter();
    let start = Instant::now();

    let files = discover_documents(&config.input_dir).context("discover input documents")?;
    info!(file_count = files.len(), "discovered documents");

    fs::create_dir_all(&config.output_dir).with_context(|| {
        format!("create output directory {}", config.output_dir.display())
    })?;
    let report_path = config.report_path();
    let report = ReportWriter::create(&report_path).context("create report")?;

    let inspected = inspect_documents(&files, &config.template_name, converter, report)
        .with_context(|| format!("write report {}", report_path.display()))?;
    let totals = inspected.totals;
    info!(
        files_seen = totals.files_seen(),
        files_succeeded = totals.files_succeeded,
        files_failed = totals.files_failed,
        labs = totals.labs,
        vitals = totals.vitals,
        labs_w_loinc = totals.labs_w_loinc,
        vitals_w_loinc = totals.vitals_w_loinc,
        report = %report_path.display(),
        duration_ms = start.elapsed().as_millis(),
        "batch complete"
    );

    Ok(BatchResult {
        report_path,
        files: inspected.files,
        totals,
    })
}

/// Inspects `files` in order, writing each row as soon as it is known and
/// the `Total` row after the last one.
///
/// # Errors
///
/// Returns an error only when the report itself cannot be written.
pub fn inspect_documents<W: Write>(
    files: &[PathBuf],
    template_name: &str,
    converter: &dyn DocumentConverter,
    mut report: ReportWriter<W>,
) -> std::result::Result<InspectedBatch<W>, ReportError> {
    let mut totals = Totals::new();
    let mut summaries = Vec::with_capacity(files.len());

    for path in files {
        let name = display_name(path);
        let (outcome, failure) = match process_document(converter, template_name, path) {
            Ok(counts) => {
                debug!(
                    file = %name,
                    labs = counts.labs.total,
                    vitals = counts.vitals.total,
                    labs_w_loinc = counts.labs.codified,
                    vitals_w_loinc = counts.vitals.codified,
                    "inspected document"
                );
                (FileOutcome::Counted(counts), None)
            }
            Err(err) => {
                let chain = error_chain(&err);
                error!(file = %name, path = %path.display(), error = %chain, "failed to inspect document");
                debug!(file = %name, error = ?err, "document failure detail");
                (FileOutcome::Failed, Some(chain))
            }
        };

        totals.record(&outcome);
        report.write_row(&ReportRow::from_outcome(name.as_str(), &outcome)?)?;
        summaries.push(FileSummary {
            name,
            path: path.clone(),
            outcome,
            error: failure,
        });
    }

    let inner = report.finish(&totals)?;
    Ok(InspectedBatch {
        inner,
        files: summaries,
        totals,
    })
}

/// Reads, converts and counts one document.
///
/// The file is closed once read; the converted record is dropped after
/// counting.
///
/// # Errors
///
/// Any read, conversion or query failure for this document.
pub fn process_document(
    converter: &dyn DocumentConverter,
    template_name: &str,
    path: &Path,
) -> std::result::Result<FileCounts, FileError> {
    let document = RawDocument::read(path)?;
    let record = converter.convert(template_name, &document)?;
    drop(document);
    Ok(count_document(&record)?)
}

/// Formats an error and all of its sources as `outer: inner: root`.
pub fn error_chain(err: &dyn StdError) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
