//! PDF compliance checker
//!
//! Prints a compliance report for one PDF to stdout. Logs go to stderr.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use compliance_cli::{exit_code, render, OutputFormat};
use compliance_engine::{AnalyzerConfig, ComplianceEngine};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Analysis errors (timeout, bad config) exit with this status
const ERROR_EXIT: u8 = 2;

#[derive(Parser, Debug)]
#[command(name = "pdf-compliance")]
#[command(version, about = "Check a PDF against the document formatting and section rubric")]
struct Args {
    /// PDF file to analyze
    file: PathBuf,

    /// TOML file with analyzer limits
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Analysis timeout in milliseconds (0 disables), overrides the config file
    #[arg(long)]
    timeout_ms: Option<u64>,

    /// Classify at most this many pages (0 for all), overrides the config file
    #[arg(long)]
    max_pages: Option<u32>,

    /// Exit with status 1 when any rule fails
    #[arg(long)]
    strict: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    let level = if args.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(level.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match run(args).await {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            eprintln!("error: {:#}", e);
            ExitCode::from(ERROR_EXIT)
        }
    }
}

async fn run(args: Args) -> anyhow::Result<u8> {
    let mut config = match &args.config {
        Some(path) => AnalyzerConfig::from_file(path)?,
        None => AnalyzerConfig::default(),
    };
    if let Some(timeout_ms) = args.timeout_ms {
        config.timeout_ms = timeout_ms;
    }
    if let Some(max_pages) = args.max_pages {
        config.max_pages = max_pages;
    }

    let engine = ComplianceEngine::with_config(config);
    tracing::debug!(config = ?engine.config(), "Using analyzer config");
    let report = engine
        .check_file_with_timeout(args.file.clone())
        .await
        .with_context(|| format!("Failed to analyze {}", args.file.display()))?;

    let output = render(&report, args.format, &args.file.display().to_string())?;
    println!("{}", output);

    Ok(exit_code(&report, args.strict))
}
