//! Server Analyzer - batch analysis of server telemetry
//!
//! Loads a CSV export of CPU, memory, network and temperature readings,
//! prints statistics, thresholds, anomalies and recommendations, and
//! writes PNG charts.

use std::path::PathBuf;

use analysis_lib::{
    load_csv, Analyzer, ChartInput, ChartRenderer, PngChartRenderer, StructuredLogger,
    ThresholdMethod,
};
use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod config;
mod output;
mod report;

use output::{print_info, print_success, OutputFormat};

const ANALYZER_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Analyze server performance data
#[derive(Parser)]
#[command(name = "server-analyzer")]
#[command(author, version, about = "Analyze server performance data", long_about = None)]
pub struct Cli {
    /// Path to CSV file
    #[arg(long, env = "ANALYZER_CSV", default_value = "data/server_usage_data.csv")]
    pub csv: PathBuf,

    /// Threshold method: percentile, std or iqr (overrides ANALYZER_THRESHOLD_METHOD)
    #[arg(long, short)]
    pub method: Option<ThresholdMethod>,

    /// Directory for chart images (overrides ANALYZER_OUTPUT_DIR)
    #[arg(long)]
    pub output_dir: Option<PathBuf>,

    /// Report format
    #[arg(long, short, default_value = "table")]
    pub format: OutputFormat,

    /// Skip chart rendering
    #[arg(long)]
    pub no_plots: bool,
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry.with(fmt::layer().with_writer(std::io::stderr)).init();
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = config::AnalyzerConfig::load()?;
    init_tracing(config.log_json);

    let method = cli.method.unwrap_or(config.threshold_method);
    let output_dir = cli.output_dir.unwrap_or(config.output_dir);
    let table_format = matches!(cli.format, OutputFormat::Table);

    let logger = StructuredLogger::new(cli.csv.display().to_string());
    logger.log_startup(ANALYZER_VERSION, method.label());

    if table_format {
        print_info("Starting comprehensive server performance analysis...");
    }

    let table = load_csv(&cli.csv)
        .inspect_err(|e| logger.log_failure(&e.to_string()))
        .with_context(|| format!("Failed to load {}", cli.csv.display()))?;
    if table_format {
        print_success(&format!(
            "Loaded {} records from {}",
            table.len(),
            cli.csv.display()
        ));
    }

    let report = Analyzer::new(method)
        .with_logger(logger.clone())
        .run(&table)
        .context("Analysis failed")?;

    match cli.format {
        OutputFormat::Table => report::print_report(&report),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
    }

    if cli.no_plots {
        info!("Chart rendering disabled");
        return Ok(());
    }

    let renderer = PngChartRenderer::new(&output_dir);
    let written = renderer
        .render(&ChartInput {
            table: &table,
            patterns: &report.time_patterns,
            thresholds: &report.thresholds,
            anomalies: &report.anomalies,
        })
        .with_context(|| format!("Failed to write charts to {}", output_dir.display()))?;
    logger.log_charts(&output_dir.display().to_string(), written.len());

    if table_format {
        print_success(&format!(
            "Analysis complete! {} charts written to {}",
            written.len(),
            output_dir.display()
        ));
    }

    Ok(())
}
