use std::ffi::OsString;
use std::path::{Path, PathBuf};

use ccda_model::{FileOutcome, Totals};
use ccda_report::REPORT_FILE_NAME;

/// Everything a batch run needs, resolved from the command line.
#[derive(Debug, Clone)]
pub struct BatchConfig {
    pub template_name: String,
    /// Template directories, in platform path-list syntax.
    pub templates_path: OsString,
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
}

impl BatchConfig {
    pub fn report_path(&self) -> PathBuf {
        self.output_dir.join(REPORT_FILE_NAME)
    }
}

/// Outcome of one document, as reported in the summary.
#[derive(Debug, Clone)]
pub struct FileSummary {
    pub name: String,
    pub path: PathBuf,
    pub outcome: FileOutcome,
    /// Error chain for failed documents.
    pub error: Option<String>,
}

#[derive(Debug)]
pub struct BatchResult {
    pub report_path: PathBuf,
    pub files: Vec<FileSummary>,
    pub totals: Totals,
}

impl BatchResult {
    pub fn failed_files(&self) -> impl Iterator<Item = &FileSummary> {
        self.files.iter().filter(|file| file.outcome.is_failed())
    }

    pub fn report_path(&self) -> &Path {
        &self.report_path
    }
}
