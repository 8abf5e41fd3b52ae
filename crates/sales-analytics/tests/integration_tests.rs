//! Integration tests for the sales analysis pipeline.
//!
//! These tests verify end-to-end behavior on both supported table layouts.

use polars::io::csv::read::CsvReadOptions;
use polars::prelude::*;
use pretty_assertions::assert_eq;
use sales_analytics::{
    Analysis, AnalysisConfig, AnalysisReport, AnalysisStage, Pipeline, RawTable, RegionTag,
    ReportGenerator, TrendDirection, YearRange, YearWindow, reporting::render_text,
};
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

// ============================================================================
// Helper Functions
// ============================================================================

fn fixtures_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn load_csv(filename: &str) -> DataFrame {
    let path = fixtures_path().join(filename);
    CsvReadOptions::default()
        .with_has_header(true)
        .try_into_reader_with_file_path(Some(path))
        .expect("Failed to create CSV reader")
        .finish()
        .expect("Failed to read CSV file")
}

fn run(filename: &str, config: AnalysisConfig) -> AnalysisReport {
    Pipeline::builder()
        .config(config)
        .build()
        .unwrap()
        .run_dataframe(&load_csv(filename))
        .expect("Pipeline should complete")
}

fn keys(groups: &[sales_analytics::AggregateGroup]) -> Vec<&str> {
    groups.iter().map(|g| g.key.as_str()).collect()
}

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

// ============================================================================
// vgsales layout
// ============================================================================

#[test]
fn test_vgsales_all_analyses_available() {
    let report = run("vgsales_sample.csv", AnalysisConfig::default());

    assert_eq!(report.rows, 10);
    // The "N/A" year row falls outside the default 2000-2024 window
    assert_eq!(report.records_in_window, 9);
    assert!(report.parse_failures.is_empty());
    assert!(report.unavailable().is_empty());
}

#[test]
fn test_vgsales_genre_ranking_breaks_ties_by_first_appearance() {
    let report = run("vgsales_sample.csv", AnalysisConfig::default());
    let genre = report.genre.as_ref().and_then(|o| o.available()).unwrap();

    // Platform and Shooter both sum to 7; Platform appears first
    assert_eq!(
        keys(&genre.top_by_sales),
        vec!["Sports", "Action", "Platform", "Shooter", "Strategy"]
    );
    assert!(approx(genre.totals.total, 39.0));
    assert_eq!(genre.totals.groups, 5);
}

#[test]
fn test_vgsales_platform_rankings() {
    let config = AnalysisConfig::builder()
        .analyses([Analysis::Platform])
        .min_support(2)
        .market_share_top_k(2)
        .build()
        .unwrap();
    let report = run("vgsales_sample.csv", config);
    let platform = report.platform.as_ref().and_then(|o| o.available()).unwrap();

    assert_eq!(keys(&platform.top_by_sales), vec!["Wii", "PS4", "X360", "PC"]);
    assert_eq!(platform.top_by_count[0].key, "PS4");
    assert_eq!(platform.top_by_count[0].count, 4);
    // PC has a single title and is below the support threshold
    assert_eq!(keys(&platform.top_by_mean), vec!["Wii", "PS4", "X360"]);

    assert_eq!(keys(&platform.market_share), vec!["Wii", "PS4", "Others"]);
    let others = &platform.market_share[2];
    assert!(approx(others.sum, 8.0));
    assert_eq!(others.count, 3);
}

#[test]
fn test_vgsales_region_breakdown() {
    let config = AnalysisConfig::builder()
        .analyses([Analysis::Region])
        .build()
        .unwrap();
    let report = run("vgsales_sample.csv", config);
    let region = report.region.as_ref().and_then(|o| o.available()).unwrap();

    let breakdown = &region.breakdown;
    assert_eq!(breakdown.len(), 4);
    assert!(approx(breakdown.get(RegionTag::NA).unwrap().sum, 17.5));
    assert!(approx(breakdown.get(RegionTag::EU).unwrap().sum, 14.0));
    assert!(approx(breakdown.get(RegionTag::JP).unwrap().sum, 3.5));
    assert!(approx(breakdown.get(RegionTag::Other).unwrap().sum, 4.0));
    assert!(approx(breakdown.total(), 39.0));

    let shares: f64 = [RegionTag::NA, RegionTag::EU, RegionTag::JP, RegionTag::Other]
        .iter()
        .filter_map(|tag| breakdown.share(*tag))
        .sum();
    assert!((shares - 100.0).abs() < 1e-6);
}

#[test]
fn test_vgsales_trend_forecast() {
    let config = AnalysisConfig::builder()
        .analyses([Analysis::Trend])
        .forecast_horizon(5)
        .build()
        .unwrap();
    let report = run("vgsales_sample.csv", config);
    let trend = report.trend.as_ref().and_then(|o| o.available()).unwrap();
    let forecast = &trend.forecast;

    // Yearly totals 14, 11, 10, 3, 1 over 2016-2020
    assert_eq!(
        forecast.historical.years().collect::<Vec<_>>(),
        vec![2016, 2017, 2018, 2019, 2020]
    );
    assert!((forecast.model.slope + 3.4).abs() < 1e-9);
    assert_eq!(forecast.direction, TrendDirection::Decreasing);

    let years: Vec<i32> = forecast.forecast.iter().map(|p| p.year).collect();
    assert_eq!(years, vec![2021, 2022, 2023, 2024, 2025]);
    assert!((forecast.forecast[0].value + 2.4).abs() < 1e-9);
    assert!(approx(forecast.historical_mean, 7.8));
}

#[test]
fn test_vgsales_summary_distribution() {
    let config = AnalysisConfig::builder()
        .analyses([Analysis::Summary])
        .histogram_bins(4)
        .build()
        .unwrap();
    let report = run("vgsales_sample.csv", config);
    let summary = report.summary.as_ref().and_then(|o| o.available()).unwrap();
    let d = &summary.distribution;

    assert_eq!(d.records, 9);
    assert!(approx(d.total, 39.0));
    assert!(approx(d.median, 5.0));
    assert!(approx(d.min, 1.0));
    assert!(approx(d.max, 9.0));
    assert_eq!(d.bins.len(), 4);
    assert_eq!(d.bins.iter().map(|b| b.count).sum::<usize>(), 9);
}

#[test]
fn test_vgsales_unbounded_window_keeps_yearless_rows() {
    let config = AnalysisConfig::builder()
        .year_range(YearRange::All)
        .analyses([Analysis::Genre, Analysis::Trend])
        .build()
        .unwrap();
    let report = run("vgsales_sample.csv", config);

    assert_eq!(report.records_in_window, 10);
    let genre = report.genre.as_ref().and_then(|o| o.available()).unwrap();
    assert!(genre.top_by_sales.iter().any(|g| g.key == "Puzzle"));

    // The trend still needs a year on every record it uses
    let trend = report.trend.as_ref().and_then(|o| o.available()).unwrap();
    assert_eq!(trend.cleaning.rows_before, 10);
    assert_eq!(trend.cleaning.rows_after, 9);
}

#[test]
fn test_vgsales_trailing_window() {
    let config = AnalysisConfig::builder()
        .year_range(YearRange::Past5)
        .analyses([Analysis::Trend])
        .build()
        .unwrap();
    let report = run("vgsales_sample.csv", config);

    assert_eq!(report.year_window, YearWindow::between(2019, 2024));
    assert_eq!(report.records_in_window, 3);
    let trend = report.trend.as_ref().and_then(|o| o.available()).unwrap();
    assert!((trend.forecast.model.slope + 2.0).abs() < 1e-9);
}

#[test]
fn test_year_range_presets_start_at_labelled_years() {
    let config = AnalysisConfig::builder()
        .year_range(YearRange::Past8)
        .analyses([Analysis::Genre])
        .build()
        .unwrap();
    let report = run("vgsales_sample.csv", config);

    assert_eq!(report.year_window, YearWindow::between(2017, 2024));
    // 2016 titles fall outside the eight-year range
    assert_eq!(report.records_in_window, 7);
    assert_eq!(
        AnalysisConfig::default().year_window,
        YearWindow::between(2000, 2024)
    );
}

#[test]
fn test_table_without_year_column_keeps_every_row() {
    let report = run("yearless_sample.csv", AnalysisConfig::default());

    assert_eq!(report.rows, 4);
    assert_eq!(report.records_in_window, 4);
    assert_eq!(report.year_window, YearWindow::unbounded());

    let genre = report.genre.as_ref().and_then(|o| o.available()).unwrap();
    assert_eq!(keys(&genre.top_by_sales), vec!["Sports", "Action", "Platform"]);
    assert!(approx(genre.totals.total, 25.0));
    let summary = report.summary.as_ref().and_then(|o| o.available()).unwrap();
    assert_eq!(summary.cleaning.rows_after, 4);

    // Only the year-dependent analysis and the missing regions are unavailable
    let names: Vec<&str> = report.unavailable().iter().map(|(n, _)| *n).collect();
    assert_eq!(names, vec!["region", "trend"]);
}

#[test]
fn test_window_without_records_reports_insufficient_data() {
    let config = AnalysisConfig::builder()
        .year_window(YearWindow::between(1980, 1985))
        .build()
        .unwrap();
    let report = run("vgsales_sample.csv", config);

    assert_eq!(report.records_in_window, 0);
    let unavailable = report.unavailable();
    assert_eq!(unavailable.len(), Analysis::ALL.len());
    assert!(
        report
            .genre
            .as_ref()
            .and_then(|o| o.unavailable_reason())
            .is_some_and(|r| r.contains("Insufficient data"))
    );
}

// ============================================================================
// vgchartz layout
// ============================================================================

#[test]
fn test_vgchartz_resolves_aliases_and_release_dates() {
    let report = run("vgchartz_sample.csv", AnalysisConfig::default());

    assert_eq!(report.resolution.total_sales.as_deref(), Some("total_sales"));
    assert_eq!(report.resolution.platform.as_deref(), Some("console"));
    // The row without a release date has no year
    assert_eq!(report.records_in_window, 7);
    assert_eq!(report.parse_failures.get("total_sales"), Some(&1));

    let genre = report.genre.as_ref().and_then(|o| o.available()).unwrap();
    assert_eq!(genre.cleaning.rows_before, 7);
    assert_eq!(genre.cleaning.rows_after, 5);
    assert_eq!(keys(&genre.top_by_sales), vec!["Action", "Shooter", "Action-Adventure"]);
    assert!((genre.top_by_sales[0].sum - 39.71).abs() < 1e-9);
}

#[test]
fn test_vgchartz_lowercase_regions_are_unresolved() {
    let report = run("vgchartz_sample.csv", AnalysisConfig::default());

    match report.region.as_ref().unwrap() {
        sales_analytics::AnalysisOutcome::Unavailable { code, .. } => {
            assert_eq!(code, "SCHEMA_UNRESOLVED");
        }
        other => panic!("Expected region to be unavailable, got {:?}", other),
    }
    // Everything else still runs
    let names: Vec<&str> = report.unavailable().iter().map(|(n, _)| *n).collect();
    assert_eq!(names, vec!["region"]);
}

#[test]
fn test_vgchartz_trend_uses_release_years() {
    let config = AnalysisConfig::builder()
        .analyses([Analysis::Trend])
        .forecast_horizon(3)
        .build()
        .unwrap();
    let report = run("vgchartz_sample.csv", config);
    let trend = report.trend.as_ref().and_then(|o| o.available()).unwrap();

    assert_eq!(
        trend.forecast.historical.years().collect::<Vec<_>>(),
        vec![2010, 2013, 2014, 2015, 2018]
    );
    let years: Vec<i32> = trend.forecast.forecast.iter().map(|p| p.year).collect();
    assert_eq!(years, vec![2019, 2020, 2021]);
    assert!(trend.forecast.model.r_squared >= 0.0 && trend.forecast.model.r_squared <= 1.0);
}

// ============================================================================
// Progress and Output Tests
// ============================================================================

#[test]
fn test_pipeline_progress_reporting_invoked() {
    let call_count = Arc::new(AtomicUsize::new(0));
    let call_count_clone = call_count.clone();

    Pipeline::builder()
        .on_progress(move |_update| {
            call_count_clone.fetch_add(1, Ordering::SeqCst);
        })
        .build()
        .unwrap()
        .run_dataframe(&load_csv("vgsales_sample.csv"))
        .unwrap();

    assert!(call_count.load(Ordering::SeqCst) > 0);
}

#[test]
fn test_pipeline_progress_monotonic() {
    let progress = Arc::new(Mutex::new(Vec::new()));
    let sink = progress.clone();

    Pipeline::builder()
        .on_progress(move |update| sink.lock().unwrap().push((update.stage, update.progress)))
        .build()
        .unwrap()
        .run_dataframe(&load_csv("vgsales_sample.csv"))
        .unwrap();

    let progress = progress.lock().unwrap();
    assert_eq!(progress.last().map(|(s, _)| *s), Some(AnalysisStage::Complete));
    assert!(progress.windows(2).all(|w| w[0].1 <= w[1].1));
}

#[test]
fn test_text_and_json_outputs() {
    let report = run("vgsales_sample.csv", AnalysisConfig::default());

    let text = render_text(&report);
    assert!(text.contains("VIDEO GAME SALES ANALYSIS (2000-2024)"));
    assert!(text.contains("PLATFORM PERFORMANCE"));
    assert!(text.contains("Average historical sales per year: 7.80 million"));

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["records_in_window"], 9);
    assert_eq!(json["genre"]["status"], "available");
    assert_eq!(json["trend"]["direction"], "decreasing");
}

#[test]
fn test_report_written_next_to_input_name() {
    let report = run("vgsales_sample.csv", AnalysisConfig::default());
    let dir = std::env::temp_dir().join(format!("sales_analytics_it_{}", std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);

    let generator = ReportGenerator::new(dir.clone(), None);
    let base = generator.report_base_name(Some(&fixtures_path().join("vgsales_sample.csv")));
    let path = generator.write_report_to_file(&report, &base).unwrap();

    assert!(path.ends_with("vgsales_sample_report.json"));
    std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn test_raw_table_round_trip_from_dataframe() {
    let df = load_csv("vgchartz_sample.csv");
    let table = RawTable::from_dataframe(&df).unwrap();

    assert_eq!(table.height(), df.height());
    assert_eq!(table.width(), df.width());
    assert_eq!(table.column_names()[0], "title");
}
