//! CLI entry point for the weight report tool.
//!
//! Fetches the weighing spreadsheet export, normalizes it and produces the
//! dashboard bundle, the data table or a one-line metrics summary.

use anyhow::Result;
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use std::ffi::OsStr;
use std::path::Path;
use tracing::{info, warn};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};
use weight_report::{
    config::{DEFAULT_SOURCE_URL, DashboardConfig},
    error::ReportError,
    fetch::load_source,
    model::DateSelection,
    output::{metrics_row, print_pretty, write_json, write_table_file},
    report::Dashboard,
};

#[derive(Parser)]
#[command(name = "weight_report")]
#[command(about = "Daily weight dashboard built from a spreadsheet export", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct SourceArgs {
    /// Path to file or URL to fetch (defaults to the configured sheet)
    #[arg(short, long, value_name = "FILE_OR_URL")]
    source: Option<String>,

    /// First day to include (YYYY-MM-DD); defaults to the earliest weighing
    #[arg(long, value_name = "DATE")]
    from: Option<NaiveDate>,

    /// Last day to include (YYYY-MM-DD); defaults to the latest weighing
    #[arg(long, value_name = "DATE")]
    to: Option<NaiveDate>,

    /// JSON config file with tuning constants
    #[arg(short, long)]
    config: Option<String>,

    /// Rolling average window, in rows
    #[arg(long)]
    window: Option<usize>,

    /// Lower bound of the chart's weight axis
    #[arg(long)]
    y_min: Option<f64>,

    /// Upper bound of the chart's weight axis
    #[arg(long)]
    y_max: Option<f64>,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the full dashboard bundle
    Report {
        #[command(flatten)]
        source: SourceArgs,

        /// Write the dashboard as JSON to this file
        #[arg(long)]
        json: Option<String>,

        /// Write the data table as CSV to this file
        #[arg(long)]
        table: Option<String>,
    },
    /// Print the headline metrics
    Summary {
        #[command(flatten)]
        source: SourceArgs,
    },
    /// Export the normalized data table as CSV
    Table {
        #[command(flatten)]
        source: SourceArgs,

        /// CSV file to write
        #[arg(short, long, default_value = "weights.csv")]
        output: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/weight_report.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("weight_report.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Report {
            source,
            json,
            table,
        } => {
            let dashboard = render(&source).await?;
            print_pretty(&dashboard);
            info!(metrics = %metrics_row(&dashboard.summary), "Summary");

            if let Some(path) = json {
                write_json(&path, &dashboard)?;
            }
            if let Some(path) = table {
                write_table_file(&path, &dashboard.records)?;
                info!(path = %path, rows = dashboard.records.len(), "Table written");
            }
        }
        Commands::Summary { source } => {
            let dashboard = render(&source).await?;
            match dashboard.require_data() {
                Ok(dashboard) => println!("{}", metrics_row(&dashboard.summary)),
                Err(e @ ReportError::EmptyDataset) => {
                    warn!(error = %e, "Nothing to summarize");
                    println!("No data in the selected range.");
                }
                Err(e) => return Err(e.into()),
            }
        }
        Commands::Table { source, output } => {
            let dashboard = render(&source).await?;
            write_table_file(&output, &dashboard.records)?;
            info!(path = %output, rows = dashboard.records.len(), "Table written");
        }
    }

    Ok(())
}

/// Merges the config file (if any) with command-line overrides.
fn resolve_config(args: &SourceArgs) -> Result<DashboardConfig> {
    let path = args
        .config
        .clone()
        .or_else(|| std::env::var("WEIGHT_REPORT_CONFIG").ok());

    let mut config = match path {
        Some(path) => DashboardConfig::load(&path)?,
        None => DashboardConfig::default(),
    };

    if let Some(window) = args.window {
        config.rolling_window = window;
    }
    if let Some(min) = args.y_min {
        config.y_axis.min = min;
    }
    if let Some(max) = args.y_max {
        config.y_axis.max = max;
    }
    config.validate()?;
    Ok(config)
}

/// Command line first, then the config file, then `WEIGHT_SHEET_URL`.
fn resolve_source(args: &SourceArgs, config: &DashboardConfig) -> String {
    args.source
        .clone()
        .or_else(|| config.source_url.clone())
        .or_else(|| std::env::var("WEIGHT_SHEET_URL").ok())
        .unwrap_or_else(|| DEFAULT_SOURCE_URL.to_string())
}

/// One fetch-and-transform pass; nothing is cached between calls.
#[tracing::instrument(skip(args))]
async fn render(args: &SourceArgs) -> Result<Dashboard> {
    let config = resolve_config(args)?;
    let source = resolve_source(args, &config);

    let bytes = load_source(&source, &config).await?;
    let selection = DateSelection {
        from: args.from,
        to: args.to,
    };

    Ok(Dashboard::from_export(&bytes, &selection, &config)?)
}
