//! CCC command-line client.

use std::io::{self, IsTerminal};

use clap::{ColorChoice, Parser};
use tracing::level_filters::LevelFilter;

use ccc_cli::logging::{LogConfig, LogFormat, init_logging};
use ccc_cli::summary::{import_table, records_json};
use ccc_transform::ImportMode;

mod cli;
mod commands;

use crate::cli::{Cli, Command, LogFormatArg, LogLevelArg};
use crate::commands::{
    PublishOutcome, run_domains, run_infer_ccc_id, run_publish_batch, run_publish_resource,
};

fn main() {
    let cli = Cli::parse();
    cli.color.write_global();
    let log_config = log_config_from_cli(&cli);
    if let Err(error) = init_logging(&log_config) {
        eprintln!("error: failed to initialize logging: {error}");
        std::process::exit(1);
    }
    let result = match &cli.command {
        Command::PublishBatch(args) => {
            run_publish_batch(args).and_then(|outcome| print_outcome(&outcome))
        }
        Command::PublishResource(args) => {
            run_publish_resource(args).and_then(|outcome| print_outcome(&outcome))
        }
        Command::InferCccId(args) => run_infer_ccc_id(args),
        Command::Domains(args) => run_domains(args),
    };
    let exit_code = match result {
        Ok(()) => 0,
        Err(error) => {
            eprintln!("error: {error:#}");
            1
        }
    };
    std::process::exit(exit_code);
}

/// Dry runs print the normalized records; writes print the store's verdicts.
fn print_outcome(outcome: &PublishOutcome) -> anyhow::Result<()> {
    match outcome.mode {
        ImportMode::DryRun => println!("{}", records_json(&outcome.records)?),
        ImportMode::Write => println!("{}", import_table(&outcome.records)),
    }
    Ok(())
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
    config.log_file = cli.log_file.clone();
    config.log_data = cli.log_data;
    config.with_ansi = match cli.color.color {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => cli.log_file.is_none() && io::stderr().is_terminal(),
    };
    config
}
