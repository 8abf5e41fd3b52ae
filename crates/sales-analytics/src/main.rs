//! CLI entry point for the sales analysis pipeline.

use anyhow::{Context, Result, anyhow};
use clap::{Parser, ValueEnum};
use polars::io::csv::read::CsvReadOptions;
use polars::prelude::*;
use sales_analytics::{
    Analysis, AnalysisConfig, AnalysisReport, Pipeline, RawTable, ReportGenerator, YearRange,
    YearWindow, cleaner::DEFAULT_REFERENCE_YEAR, reporting::render_text,
};
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};

/// Files tried, in order, when no input is given.
const DEFAULT_INPUTS: &[&str] = &[
    "vgchartz-2024.csv",
    "vgsales.csv",
    "data/vgchartz-2024.csv",
    "data/vgsales.csv",
];

/// CLI-compatible analysis selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum CliAnalysis {
    /// Sales by genre
    Genre,
    /// Platform performance
    Platform,
    /// Publisher rankings
    Publisher,
    /// Regional sales breakdown
    Region,
    /// Yearly trend and forecast
    Trend,
    /// Distribution of per-title sales
    Summary,
    /// Every analysis
    All,
}

impl CliAnalysis {
    fn analyses(self) -> Vec<Analysis> {
        match self {
            CliAnalysis::Genre => vec![Analysis::Genre],
            CliAnalysis::Platform => vec![Analysis::Platform],
            CliAnalysis::Publisher => vec![Analysis::Publisher],
            CliAnalysis::Region => vec![Analysis::Region],
            CliAnalysis::Trend => vec![Analysis::Trend],
            CliAnalysis::Summary => vec![Analysis::Summary],
            CliAnalysis::All => Analysis::all(),
        }
    }
}

/// CLI-compatible year range
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum CliYearRange {
    #[value(name = "5")]
    Past5,
    #[value(name = "8")]
    Past8,
    #[value(name = "22")]
    Past22,
    #[value(name = "25")]
    Past25,
    #[value(name = "44")]
    Past44,
    /// No year filter
    All,
}

impl From<CliYearRange> for YearRange {
    fn from(cli: CliYearRange) -> Self {
        match cli {
            CliYearRange::Past5 => YearRange::Past5,
            CliYearRange::Past8 => YearRange::Past8,
            CliYearRange::Past22 => YearRange::Past22,
            CliYearRange::Past25 => YearRange::Past25,
            CliYearRange::Past44 => YearRange::Past44,
            CliYearRange::All => YearRange::All,
        }
    }
}

#[derive(Parser, Debug)]
#[command(
    version,
    about = "Video game sales aggregation and trend forecasting",
    long_about = "Analyzes video game sales tables (vgsales or vgchartz layouts) by genre,\n\
                  platform, publisher and region, and forecasts yearly totals with a\n\
                  linear trend.\n\n\
                  EXAMPLES:\n  \
                  # All analyses over the default 25-year window\n  \
                  sales-analytics -i vgsales.csv\n\n  \
                  # Platform performance for the past 5 years\n  \
                  sales-analytics platform -i vgchartz-2024.csv --range 5\n\n  \
                  # Trend over explicit years, JSON on stdout\n  \
                  sales-analytics trend --from 1970 --to 2020 --json"
)]
struct Args {
    /// Analysis to run
    #[arg(value_enum, default_value = "all")]
    analysis: CliAnalysis,

    /// Path to the CSV file to analyze
    ///
    /// If not specified, looks for vgchartz-2024.csv or vgsales.csv in the
    /// current directory and in data/
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// JSON configuration file; command-line flags override its values
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Trailing year range ending at the reference year
    #[arg(long, value_enum)]
    range: Option<CliYearRange>,

    /// First year to include (overrides --range)
    #[arg(long)]
    from: Option<i32>,

    /// Last year to include (overrides --range)
    #[arg(long)]
    to: Option<i32>,

    /// Reference year for --range
    #[arg(long, default_value_t = DEFAULT_REFERENCE_YEAR)]
    reference_year: i32,

    /// Number of years to forecast
    #[arg(long)]
    horizon: Option<usize>,

    /// Number of groups in ranked listings
    #[arg(short = 'k', long)]
    top_k: Option<usize>,

    /// Minimum titles per group for average rankings
    #[arg(long)]
    min_support: Option<usize>,

    /// Treat a zero slope as a decreasing trend
    #[arg(long)]
    legacy_trend: bool,

    /// Output directory for written reports
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Custom report file name (without extension)
    #[arg(long)]
    output_name: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Suppress progress output (only show warnings and the final result)
    #[arg(short, long)]
    quiet: bool,

    /// Output JSON to stdout instead of the text summary
    ///
    /// Disables all logs; only outputs the report.
    #[arg(long)]
    json: bool,

    /// Write a JSON report to the output directory
    ///
    /// The report will be saved as <input_name>_report.json
    #[arg(short = 'r', long)]
    emit_report: bool,
}

/// Initialize the tracing subscriber for logging.
///
/// When `json_output` is true, logging is completely disabled to ensure
/// only JSON is written to stdout.
fn init_logging(level: &str, quiet: bool, json_output: bool) {
    if json_output {
        return;
    }

    use tracing_subscriber::EnvFilter;

    let effective_level = if quiet { "warn" } else { level };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(effective_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(&args.log_level, args.quiet, args.json);

    let input = resolve_input(args.input.as_deref())?;
    let config = build_config(&args)?;

    info!("Loading dataset from: {}", input.display());
    let data = load_csv_with_fallbacks(&input)?;
    info!("Dataset loaded successfully: {:?}", data.shape());

    let table = RawTable::from_dataframe(&data)?;
    let pipeline = Pipeline::builder()
        .config(config)
        .on_progress(|update| {
            debug!("[{:>3.0}%] {}", update.progress * 100.0, update.message);
        })
        .build()?;

    let report = match pipeline.run(&table) {
        Ok(report) => report,
        Err(e) => {
            error!("Analysis failed: {}", e);
            return Err(anyhow!("Analysis failed: {}", e));
        }
    };

    handle_output(&report, pipeline.config(), &input, &args)
}

/// Pick the input file: the explicit path, else the first default that exists.
fn resolve_input(explicit: Option<&Path>) -> Result<PathBuf> {
    if let Some(path) = explicit {
        if !path.exists() {
            return Err(anyhow!("Input file not found: {}", path.display()));
        }
        return Ok(path.to_path_buf());
    }

    DEFAULT_INPUTS
        .iter()
        .map(PathBuf::from)
        .find(|p| p.exists())
        .ok_or_else(|| {
            anyhow!(
                "No input file given and none of {} found",
                DEFAULT_INPUTS.join(", ")
            )
        })
}

/// Merge the optional config file with command-line overrides.
fn build_config(args: &Args) -> Result<AnalysisConfig> {
    let mut config = match &args.config {
        Some(path) => {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config {}", path.display()))?;
            serde_json::from_str::<AnalysisConfig>(&content)
                .with_context(|| format!("Invalid config file {}", path.display()))?
        }
        None => AnalysisConfig::default(),
    };

    if let Some(range) = args.range {
        config.year_window = YearRange::from(range).window(args.reference_year);
    }
    if args.from.is_some() || args.to.is_some() {
        config.year_window = YearWindow {
            start: args.from,
            end: args.to,
        };
    }
    if args.analysis != CliAnalysis::All || args.config.is_none() {
        config.analyses = args.analysis.analyses();
    }
    if let Some(horizon) = args.horizon {
        config.forecast_horizon = horizon;
    }
    if let Some(k) = args.top_k {
        config.top_k_listing = k;
        config.market_share_top_k = k;
    }
    if let Some(min_support) = args.min_support {
        config.min_support = min_support;
    }
    if args.legacy_trend {
        config.legacy_trend_direction = true;
    }
    if let Some(output) = &args.output {
        config.output_dir = output.clone();
    }
    if let Some(name) = &args.output_name {
        config.output_name = Some(name.clone());
    }

    config.validate()?;
    Ok(config)
}

/// Handle pipeline output based on CLI flags.
///
/// Output behavior:
/// - Default: Print the text summary to stdout
/// - `--json`: Print JSON to stdout only (no logs)
/// - `--emit-report`: Write JSON report to file
fn handle_output(
    report: &AnalysisReport,
    config: &AnalysisConfig,
    input: &Path,
    args: &Args,
) -> Result<()> {
    if args.json {
        println!("{}", serde_json::to_string_pretty(report)?);
    } else {
        print!("{}", render_text(report));
    }

    if args.emit_report {
        let generator = ReportGenerator::new(config.output_dir.clone(), config.output_name.clone());
        let base_name = generator.report_base_name(Some(input));
        let path = generator.write_report_to_file(report, &base_name)?;
        if !args.json {
            info!("Report written to {}", path.display());
        }
    }

    for (name, reason) in report.unavailable() {
        debug!("{} unavailable: {}", name, reason);
    }
    if report.records_in_window == 0 {
        warn!("No records in {}; try a wider --range", report.year_window);
    }

    Ok(())
}

/// Load a CSV file, retrying with every column read as text when the
/// typed read fails.
fn load_csv_with_fallbacks(path: &Path) -> Result<DataFrame> {
    // Strategy 1: Standard loading with quote handling
    match CsvReadOptions::default()
        .with_infer_schema_length(Some(1000))
        .with_has_header(true)
        .with_parse_options(CsvParseOptions::default().with_quote_char(Some(b'"')))
        .try_into_reader_with_file_path(Some(path.to_path_buf()))?
        .finish()
    {
        Ok(df) => return Ok(df),
        Err(e) => {
            debug!("Standard loading failed: {}", e);
        }
    }

    // Strategy 2: Every column as text; the normalizer coerces values itself
    CsvReadOptions::default()
        .with_infer_schema_length(Some(0))
        .with_has_header(true)
        .try_into_reader_with_file_path(Some(path.to_path_buf()))?
        .finish()
        .with_context(|| format!("Failed to parse {}", path.display()))
}
