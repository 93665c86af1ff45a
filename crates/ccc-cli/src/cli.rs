//! CLI argument definitions.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

use ccc_client::UuidStrategy;

#[derive(Parser)]
#[command(
    name = "ccc",
    version,
    about = "Publish clinical and genomic records to the CCC backend",
    long_about = "Normalize tab-separated records against the domain schema, \
                  register file identities and publish the results to the \
                  CCC search or submission backend."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format.
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,

    /// Allow record values in trace logs.
    #[arg(long = "log-data", global = true)]
    pub log_data: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Import every row of a TSV file into one domain.
    PublishBatch(PublishBatchArgs),

    /// Publish a single resource record for a file.
    PublishResource(PublishResourceArgs),

    /// Print the content identifier of local files.
    InferCccId(InferCccIdArgs),

    /// List the domains of the schema.
    Domains(DomainsArgs),
}

#[derive(Parser)]
pub struct PublishBatchArgs {
    /// Tab-separated file with a header row.
    #[arg(long = "tsv", value_name = "PATH")]
    pub tsv: PathBuf,

    /// Domain the rows belong to.
    #[arg(long = "domain")]
    pub domain: String,

    #[command(flatten)]
    pub target: TargetArgs,
}

#[derive(Parser)]
pub struct PublishResourceArgs {
    /// Path of the file the resource describes.
    #[arg(long = "filepath", value_name = "PATH")]
    pub filepath: String,

    /// Workflow that produced the file.
    #[arg(long = "workflow-id")]
    pub workflow_id: Option<String>,

    /// MIME type of the file.
    #[arg(long = "mimetype")]
    pub mimetype: Option<String>,

    /// Copy the fields of the stored resource with this CCC_ID first.
    #[arg(long = "inherit-from", value_name = "CCC_ID")]
    pub inherit_from: Option<String>,

    /// Extra `Field:Value` pair; may be repeated.
    #[arg(long = "property", value_name = "FIELD:VALUE")]
    pub properties: Vec<String>,

    /// Domain of the resource record.
    #[arg(long = "domain", default_value = "resource")]
    pub domain: String,

    #[command(flatten)]
    pub target: TargetArgs,
}

#[derive(Parser)]
pub struct InferCccIdArgs {
    /// Files to identify.
    #[arg(value_name = "PATH", required = true)]
    pub paths: Vec<PathBuf>,

    /// UUID derivation (sha-1, md5, random).
    #[arg(long = "strategy", default_value_t = UuidStrategy::Sha1)]
    pub strategy: UuidStrategy,
}

#[derive(Parser)]
pub struct DomainsArgs {
    /// Schema document to list instead of the default one.
    #[arg(long = "domain-json", value_name = "PATH")]
    pub domain_json: Option<PathBuf>,
}

/// Where records go and who publishes them.
#[derive(Args)]
pub struct TargetArgs {
    /// Site the data comes from (central, ohsu, dfci, oicr).
    #[arg(long = "site")]
    pub site: String,

    /// Submitting user (default: $USER).
    #[arg(long = "user")]
    pub user: Option<String>,

    /// Project code used in index names and storage keys.
    #[arg(long = "project")]
    pub project: String,

    /// Program the project belongs to (eve-mongo backend).
    #[arg(long = "program", default_value = "")]
    pub program: String,

    /// Schema document to use instead of the default one.
    #[arg(long = "domain-json", value_name = "PATH")]
    pub domain_json: Option<PathBuf>,

    /// Print normalized records without registering or writing anything.
    #[arg(long = "mock")]
    pub mock: bool,

    /// Use placeholder identities instead of calling the file service.
    #[arg(long = "skip-dts-registration")]
    pub skip_dts_registration: bool,

    /// Fail rows without a CCC_ID instead of registering them.
    #[arg(long = "validate-only", conflicts_with = "skip_dts_registration")]
    pub validate_only: bool,

    /// Document store to write to.
    #[arg(long = "backend", value_enum, default_value = "elasticsearch")]
    pub backend: BackendArg,

    /// Document store host.
    #[arg(long = "host")]
    pub host: Option<String>,

    /// Document store port.
    #[arg(long = "port")]
    pub port: Option<u16>,

    /// Token, or path to a token file (default: $CCC_AUTH_TOKEN).
    #[arg(long = "auth-token", value_name = "TOKEN")]
    pub auth_token: Option<String>,

    /// File service host.
    #[arg(long = "dts-host")]
    pub dts_host: Option<String>,

    /// File service port.
    #[arg(long = "dts-port")]
    pub dts_port: Option<u16>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum BackendArg {
    Elasticsearch,
    EveMongo,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).expect("arguments parse")
    }

    #[test]
    fn publish_batch_defaults() {
        let cli = parse(&[
            "ccc",
            "publish-batch",
            "--tsv",
            "rows.tsv",
            "--domain",
            "sample",
            "--site",
            "ohsu",
            "--project",
            "proj",
        ]);
        let Command::PublishBatch(args) = cli.command else {
            panic!("expected publish-batch");
        };
        assert_eq!(args.tsv, PathBuf::from("rows.tsv"));
        assert_eq!(args.target.backend, BackendArg::Elasticsearch);
        assert!(!args.target.mock);
        assert!(args.target.user.is_none());
    }

    #[test]
    fn properties_repeat() {
        let cli = parse(&[
            "ccc",
            "publish-resource",
            "--filepath",
            "/data/a.bam",
            "--property",
            "extension:bam",
            "--property",
            "sample_id:S1",
            "--site",
            "ohsu",
            "--project",
            "proj",
            "--backend",
            "eve-mongo",
        ]);
        let Command::PublishResource(args) = cli.command else {
            panic!("expected publish-resource");
        };
        assert_eq!(args.properties, vec!["extension:bam", "sample_id:S1"]);
        assert_eq!(args.domain, "resource");
        assert_eq!(args.target.backend, BackendArg::EveMongo);
    }

    #[test]
    fn strategy_is_parsed() {
        let cli = parse(&["ccc", "infer-ccc-id", "a.txt", "--strategy", "md5"]);
        let Command::InferCccId(args) = cli.command else {
            panic!("expected infer-ccc-id");
        };
        assert_eq!(args.strategy, UuidStrategy::Md5);
    }

    #[test]
    fn validate_only_conflicts_with_skipping_registration() {
        let result = Cli::try_parse_from([
            "ccc",
            "publish-batch",
            "--tsv",
            "rows.tsv",
            "--domain",
            "resource",
            "--site",
            "ohsu",
            "--project",
            "proj",
            "--validate-only",
            "--skip-dts-registration",
        ]);
        assert!(result.is_err());
    }
}
