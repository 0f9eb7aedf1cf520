use clap::{Args, Parser, Subcommand, ValueEnum};
use crate::service::gbif::DEFAULT_SEARCH_LIMIT;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "mids",
    version,
    about = "MIDS digitisation level scoring for GBIF specimen datasets"
)]
pub struct Cli {
    /// Increase verbosity (-v for info, -vv for debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Directory holding mids.toml and .mids/local.toml
    #[arg(long, global = true, default_value = ".")]
    pub config_root: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Score a dataset against every MIDS level
    Score(ScoreCommand),
    /// Print the MIDS element to GBIF field mapping
    Schema(SchemaCommand),
    /// Search occurrence datasets by text
    Search(SearchCommand),
    /// Show metadata for one dataset
    Dataset(DatasetCommand),
}

#[derive(Args)]
pub struct ScoreCommand {
    pub dataset_key: String,
    #[arg(short, long, value_enum, default_value = "md")]
    pub format: ReportFormat,
    /// Count records from a local JSON export instead of the GBIF API
    #[arg(long)]
    pub records: Option<PathBuf>,
}

#[derive(Args)]
pub struct SchemaCommand {
    #[arg(short, long, value_enum, default_value = "md")]
    pub format: ReportFormat,
}

#[derive(Args)]
pub struct SearchCommand {
    pub text: String,
    #[arg(
        long,
        default_value_t = DEFAULT_SEARCH_LIMIT,
        value_parser = clap::value_parser!(u32).range(1..)
    )]
    pub limit: u32,
}

#[derive(Args)]
pub struct DatasetCommand {
    pub dataset_key: String,
}

#[derive(Clone, ValueEnum)]
pub enum ReportFormat {
    Json,
    Md,
}
