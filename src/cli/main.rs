//! Fundus preprocessing CLI
//!
//! Command-line interface for the batch driver: enhance, remove background,
//! write transparent PNGs and a CSV report for a whole dataset tree.

use super::progress::IndicatifProgressReporter;
use crate::{
    batch::BatchDriver,
    config::PipelineConfig,
    services::{ConsoleProgressReporter, ProgressReporter},
    types::BatchSummary,
};
use anyhow::{Context, Result};
use clap::Parser;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Batch contrast enhancement and background removal for fundus photographs
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(name = "fundus-prep")]
pub struct Cli {
    /// Dataset root containing SUBSET/CLASS directories
    #[arg(value_name = "SOURCE", required_unless_present = "print_config")]
    pub source: Option<PathBuf>,

    /// Output root; the SUBSET/CLASS tree and the report are created here
    #[arg(value_name = "OUTPUT", required_unless_present = "print_config")]
    pub output: Option<PathBuf>,

    /// JSON file overriding pipeline defaults (partial files are fine)
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging (-v: DEBUG, -vv: TRACE)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Disable progress bars (log one line per directory instead)
    #[arg(long)]
    pub no_progress: bool,

    /// Print the effective configuration as JSON and exit
    #[arg(long)]
    pub print_config: bool,
}

pub fn main() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.verbose).context("Failed to initialize tracing")?;

    let config = load_config(cli.config.as_deref())?;
    if cli.print_config {
        println!("{}", serde_json::to_string_pretty(&config)?);
        return Ok(());
    }

    let (Some(source), Some(output)) = (cli.source.as_ref(), cli.output.as_ref()) else {
        anyhow::bail!("Both SOURCE and OUTPUT are required");
    };

    let progress: Box<dyn ProgressReporter> = if cli.no_progress {
        Box::new(ConsoleProgressReporter::new(cli.verbose > 0))
    } else {
        Box::new(IndicatifProgressReporter::new())
    };

    info!("Source: {}", source.display());
    info!("Output: {}", output.display());

    let driver = BatchDriver::new(config)
        .context("Invalid pipeline configuration")?
        .with_progress(progress);
    let summary = driver
        .run(source, output)
        .with_context(|| format!("Batch run into {} failed", output.display()))?;

    print_summary(&summary, output);
    Ok(())
}

fn init_tracing(verbose_count: u8) -> Result<()> {
    use crate::tracing_config::TracingConfig;

    let mut config = TracingConfig::new()
        .with_verbosity(verbose_count)
        .with_format(tracing_format(std::io::stderr().is_terminal()));
    if let Ok(filter) = std::env::var("RUST_LOG") {
        config = config.with_env_filter(filter);
    }
    config.init().context("Failed to initialize tracing subscriber")?;

    debug!(verbosity = verbose_count, "Tracing initialized");
    Ok(())
}

/// Colored output on a terminal, plain lines when stderr is redirected
fn tracing_format(is_terminal: bool) -> crate::tracing_config::TracingFormat {
    use crate::tracing_config::TracingFormat;

    if is_terminal {
        TracingFormat::Console
    } else {
        TracingFormat::Compact
    }
}

fn load_config(path: Option<&Path>) -> Result<PipelineConfig> {
    let Some(path) = path else {
        return Ok(PipelineConfig::default());
    };
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read configuration {}", path.display()))?;
    PipelineConfig::from_json(&json)
        .with_context(|| format!("Invalid configuration {}", path.display()))
}

fn print_summary(summary: &BatchSummary, output: &Path) {
    println!("Processing finished. Results saved in {}", output.display());
    println!("Total images processed: {}", summary.total);
    println!("Successful: {}", summary.succeeded);
    println!("With errors: {}", summary.failed);
    if summary.corrected > 0 {
        println!("Corner artifacts corrected: {}", summary.corrected);
    }
    println!("Report: {}", summary.report_path.display());
}
