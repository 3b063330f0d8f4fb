//! CCDA batch inspector CLI.

use std::io::{self, IsTerminal};

use clap::error::ErrorKind;
use clap::{ColorChoice, Parser};
use tracing::level_filters::LevelFilter;

use ccda_cli::batch::run_batch;
use ccda_cli::logging::{LogConfig, LogFormat, init_logging};
use ccda_cli::types::BatchConfig;
use ccda_convert::CcdaConverter;

mod cli;
mod summary;

use crate::cli::{Cli, LogFormatArg, LogLevelArg, USAGE};
use crate::summary::print_summary;

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(error)
            if matches!(
                error.kind(),
                ErrorKind::MissingRequiredArgument | ErrorKind::UnknownArgument
            ) =>
        {
            println!("{USAGE}");
            std::process::exit(0);
        }
        Err(error) => error.exit(),
    };
    cli.color.write_global();
    let log_config = log_config_from_cli(&cli);
    if let Err(error) = init_logging(&log_config) {
        eprintln!("error: failed to initialize logging: {error}");
        std::process::exit(1);
    }

    let config = BatchConfig {
        template_name: cli.template_name.clone(),
        templates_path: cli.templates_dir.clone(),
        input_dir: cli.ccda_dir.clone(),
        output_dir: cli.data_out_dir.clone(),
    };
    let converter = CcdaConverter::from_search_path(&config.templates_path);
    let exit_code = match run_batch(&config, &converter) {
        Ok(result) => {
            if cli.summary {
                print_summary(&result);
            }
            0
        }
        Err(error) => {
            tracing::error!(error = %format!("{error:#}"), "batch aborted");
            eprintln!("error: {error:#}");
            1
        }
    };
    std::process::exit(exit_code);
}

/// Build logging configuration from CLI flags with consistent precedence.
fn log_config_from_cli(cli: &Cli) -> LogConfig {
    let mut config = LogConfig {
        level_filter: cli.verbosity.tracing_level_filter(),
        ..LogConfig::default()
    };
    config.use_env_filter = !(cli.verbosity.is_present() || cli.log_level.is_some());
    if let Some(level) = cli.log_level {
        config.level_filter = match level {
            LogLevelArg::Error => LevelFilter::ERROR,
            LogLevelArg::Warn => LevelFilter::WARN,
            LogLevelArg::Info => LevelFilter::INFO,
            LogLevelArg::Debug => LevelFilter::DEBUG,
            LogLevelArg::Trace => LevelFilter::TRACE,
        };
    }
    config.format = match cli.log_format {
        LogFormatArg::Pretty => LogFormat::Pretty,
        LogFormatArg::Compact => LogFormat::Compact,
        LogFormatArg::Json => LogFormat::Json,
    };
    config.with_target = config.level_filter >= LevelFilter::DEBUG;
    config.with_timestamps = cli.log_file.is_some();
    config.log_file = cli.log_file.clone();
    config.with_ansi = match cli.color.color {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => cli.log_file.is_none() && io::stderr().is_terminal(),
    };
    config
}
