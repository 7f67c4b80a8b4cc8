//! CLI entry point for the feature engagement report.
//!
//! Loads a usage dataset, ranks features by a weighted engagement score,
//! prints the ranking and renders it as a bar chart.

use anyhow::{Context, Result, anyhow};
use clap::{Parser, Subcommand, ValueEnum};
use feature_engagement::analyzers::analyzer::analyze;
use feature_engagement::analyzers::types::ScoredFeature;
use feature_engagement::{
    chart::{BarChart, PngFile, RenderTarget, SvgFile, TerminalChart},
    loader::{load_usage, profile},
    output::{write_json, write_tables},
};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use tracing_subscriber::{
    EnvFilter, Layer,
    filter::Directive,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "feature_engagement")]
#[command(about = "Rank product features by a weighted engagement score", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Rank features by engagement and print the report and chart
    Report {
        /// Usage dataset (.csv, .xlsx, .xlsm, .xlsb, .xls or .ods)
        #[arg(value_name = "INPUT", env = "ENGAGEMENT_DATA_PATH")]
        input: PathBuf,

        /// Worksheet to read from a spreadsheet (defaults to the first one)
        #[arg(long)]
        sheet: Option<String>,

        /// Number of features in the top table
        #[arg(short, long, default_value_t = 3)]
        top: usize,

        /// Output format for the tables
        #[arg(short, long, value_enum, default_value_t = ReportFormat::Table)]
        format: ReportFormat,

        /// Where to render the bar chart
        #[arg(long, value_enum, default_value_t = ChartTarget::Terminal)]
        chart: ChartTarget,

        /// Image path for svg/png charts (defaults to feature_engagement.<ext>)
        #[arg(long, value_name = "PATH")]
        chart_path: Option<PathBuf>,

        /// Image size in pixels for svg/png charts
        #[arg(long, value_name = "WxH", value_parser = parse_size, default_value = "900x500")]
        chart_size: (u32, u32),
    },
    /// Load a usage dataset and log its shape without scoring it
    Inspect {
        /// Usage dataset (.csv, .xlsx, .xlsm, .xlsb, .xls or .ods)
        #[arg(value_name = "INPUT", env = "ENGAGEMENT_DATA_PATH")]
        input: PathBuf,

        /// Worksheet to read from a spreadsheet (defaults to the first one)
        #[arg(long)]
        sheet: Option<String>,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ReportFormat {
    Table,
    Json,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ChartTarget {
    /// Text bars on stdout
    Terminal,
    /// SVG image file
    Svg,
    /// PNG image file
    Png,
    /// No chart
    None,
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path = std::env::var("LOG_FILE_PATH")
        .unwrap_or_else(|_| "logs/feature_engagement.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("feature_engagement.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(
            EnvFilter::from_env("RUST_LOG").add_directive("info".parse::<Directive>()?),
        );

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(
            EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse::<Directive>()?),
        );

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Report {
            input,
            sheet,
            top,
            format,
            chart,
            chart_path,
            chart_size,
        } => {
            let ranked = analyze(&input, sheet.as_deref())?;
            if ranked.is_empty() {
                warn!(input = %input.display(), "No features found in input");
            }

            {
                let mut out = std::io::stdout().lock();
                match format {
                    ReportFormat::Table => write_tables(&mut out, &ranked, top)?,
                    ReportFormat::Json => write_json(&mut out, &ranked, top)?,
                }
            }

            if matches!(format, ReportFormat::Json) && matches!(chart, ChartTarget::Terminal) {
                debug!("Terminal chart skipped to keep stdout valid JSON");
            } else {
                render_chart(chart, chart_path, chart_size, &ranked)?;
            }
        }
        Commands::Inspect { input, sheet } => {
            let table = load_usage(&input, sheet.as_deref())?;
            if table.is_empty() {
                warn!(source = %table.source, "No rows found in input");
                return Ok(());
            }
            let shape = profile(&table);

            info!(
                source = %table.source,
                rows = shape.rows,
                features = shape.features,
                unnamed_rows = shape.unnamed_rows,
                "Usage data summary"
            );
            for (column, blanks) in &shape.blank_cells {
                info!(column = %column, blanks, "Blank metric cells");
            }
        }
    }

    Ok(())
}

/// Draws the ranked scores on the chosen target.
/// Image targets write to disk; the terminal target does not.
#[tracing::instrument(skip(path, ranked), fields(features = ranked.len()))]
fn render_chart(
    chart: ChartTarget,
    path: Option<PathBuf>,
    size: (u32, u32),
    ranked: &[ScoredFeature],
) -> Result<()> {
    if ranked.is_empty() {
        warn!("Nothing to chart");
        return Ok(());
    }

    let image_path = |ext: &str| {
        path.clone()
            .unwrap_or_else(|| PathBuf::from(format!("feature_engagement.{ext}")))
    };

    let mut target: Box<dyn RenderTarget> = match chart {
        ChartTarget::Terminal => Box::new(TerminalChart::stdout()),
        ChartTarget::Svg => Box::new(SvgFile {
            path: image_path("svg"),
            size,
        }),
        ChartTarget::Png => Box::new(PngFile {
            path: image_path("png"),
            size,
        }),
        ChartTarget::None => return Ok(()),
    };

    target
        .render(&BarChart::from_ranked(ranked))
        .context("failed to render chart")
}

/// Parses `WIDTHxHEIGHT`, e.g. `900x500`.
fn parse_size(s: &str) -> Result<(u32, u32)> {
    let (w, h) = s
        .split_once(['x', 'X'])
        .ok_or_else(|| anyhow!("expected WIDTHxHEIGHT, got {s:?}"))?;
    let size: (u32, u32) = (w.trim().parse()?, h.trim().parse()?);
    if size.0 == 0 || size.1 == 0 {
        return Err(anyhow!("chart size must be non-zero, got {s:?}"));
    }
    Ok(size)
}
