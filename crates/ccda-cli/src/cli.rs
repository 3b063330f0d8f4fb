//! CLI argument definitions for the CCDA inspector.

use std::ffi::OsString;
use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

/// One-line usage printed when the positional count is wrong.
pub const USAGE: &str =
    "ccda-inspector <TEMPLATE_NAME> <TEMPLATES_DIR> <CCDA_DIR> <DATA_OUT_DIR>";

#[derive(Parser)]
#[command(
    name = "ccda-inspector",
    version,
    about = "Count lab and vital-sign observations in a batch of CCDA documents",
    long_about = "Convert every .ccda/.xml document under CCDA_DIR with the named \
                  template and write per-file observation counts, with a Total row, \
                  to DATA_OUT_DIR/results.csv."
)]
pub struct Cli {
    /// Name of the conversion template (e.g. CCD).
    #[arg(value_name = "TEMPLATE_NAME")]
    pub template_name: String,

    /// Directories holding conversion templates, in path-list syntax.
    #[arg(value_name = "TEMPLATES_DIR")]
    pub templates_dir: OsString,

    /// Directory searched recursively for .ccda and .xml documents.
    #[arg(value_name = "CCDA_DIR")]
    pub ccda_dir: PathBuf,

    /// Directory that receives results.csv (created if missing).
    #[arg(value_name = "DATA_OUT_DIR")]
    pub data_out_dir: PathBuf,

    /// Print a summary table after the report is written.
    #[arg(long = "summary")]
    pub summary: bool,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format.
    #[arg(long = "log-format", value_enum, default_value = "pretty")]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
