mod cli;
mod config;
mod error;
mod maturity;
mod report;
mod service;
mod types;

use crate::error::MidsError;
use crate::maturity::{schema, ComplianceCalculator};
use crate::service::gbif::GbifClient;
use crate::service::memory::InMemoryRecordService;
use crate::service::RecordCountService;
use crate::types::config::MidsConfig;
use crate::types::report::MidsReport;
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub mod exit_code {
    pub const SUCCESS: i32 = 0;
    pub const WARNINGS: i32 = 1;
    pub const RUNTIME_FAILURE: i32 = 3;
}

fn init_tracing(verbose: u8, quiet: bool) {
    let default_level = if quiet {
        "error"
    } else {
        match verbose {
            0 => "warn",
            1 => "info",
            _ => "debug",
        }
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .init();
}

fn output_format(format: &cli::ReportFormat) -> report::OutputFormat {
    match format {
        cli::ReportFormat::Json => report::OutputFormat::Json,
        cli::ReportFormat::Md => report::OutputFormat::Md,
    }
}

fn gbif_client(config: &MidsConfig) -> Result<GbifClient, MidsError> {
    GbifClient::new(config.base_url(), config.timeout())
}

async fn score<S: RecordCountService + ?Sized>(
    service: &S,
    config: &MidsConfig,
    dataset_key: &str,
    title: Option<String>,
) -> Result<MidsReport, MidsError> {
    ComplianceCalculator::new(schema::mids(), service)
        .with_max_concurrent_requests(config.max_concurrent_requests())
        .report(dataset_key, title)
        .await
}

async fn run(cli: cli::Cli, config: MidsConfig) -> Result<i32, MidsError> {
    match cli.command {
        cli::Commands::Score(cmd) => {
            let report = match &cmd.records {
                Some(path) => {
                    let service = InMemoryRecordService::from_file(path)?;
                    if service.is_empty() {
                        warn!("records file {} is empty", path.display());
                    }
                    info!(records = service.len(), "scoring local records");
                    score(&service, &config, &cmd.dataset_key, None).await?
                }
                None => {
                    let client = gbif_client(&config)?;
                    let title = match client.get_dataset(&cmd.dataset_key).await {
                        Ok(metadata) => Some(metadata.title),
                        Err(e) => {
                            warn!("dataset metadata unavailable for {}: {}", cmd.dataset_key, e);
                            None
                        }
                    };
                    score(&client, &config, &cmd.dataset_key, title).await?
                }
            };

            let rendered = report::render(&report, output_format(&cmd.format))?;
            println!("{rendered}");

            if report.total == 0 {
                eprintln!("warning: dataset {} has no records", cmd.dataset_key);
                Ok(exit_code::WARNINGS)
            } else {
                Ok(exit_code::SUCCESS)
            }
        }
        cli::Commands::Schema(cmd) => {
            let rendered = report::render_schema(schema::mids(), output_format(&cmd.format))?;
            println!("{rendered}");
            Ok(exit_code::SUCCESS)
        }
        cli::Commands::Search(cmd) => {
            let client = gbif_client(&config)?;
            let datasets = client.search_datasets(&cmd.text, cmd.limit).await?;
            if datasets.is_empty() {
                println!("search: no datasets");
                return Ok(exit_code::WARNINGS);
            }
            for dataset in &datasets {
                println!("{}  {}", dataset.key, dataset.title);
            }
            Ok(exit_code::SUCCESS)
        }
        cli::Commands::Dataset(cmd) => {
            let client = gbif_client(&config)?;
            let metadata = client.get_dataset(&cmd.dataset_key).await?;
            println!("{}", serde_json::to_string_pretty(&metadata)?);
            Ok(exit_code::SUCCESS)
        }
    }
}

fn start() -> Result<i32, MidsError> {
    let cli = cli::Cli::parse();
    init_tracing(cli.verbose, cli.quiet);
    info!("mids v{}", env!("CARGO_PKG_VERSION"));

    let config = config::load_config(&cli.config_root)?.unwrap_or_default();

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    runtime.block_on(run(cli, config))
}

fn main() {
    match start() {
        Ok(code) => {
            if code != 0 {
                std::process::exit(code);
            }
        }
        Err(e) => {
            eprintln!("error: {}", e);
            std::process::exit(exit_code::RUNTIME_FAILURE);
        }
    }
}
