//! Video Game Sales Analytics Library
//!
//! Normalizes heterogeneous sales tables onto one canonical schema,
//! aggregates them along year, genre, platform, publisher and region, and
//! fits a linear trend over yearly totals to forecast future years.
//!
//! # Overview
//!
//! - **Schema normalization**: first-match column alias resolution
//!   (`Global_Sales`, `total_sales`, `global_sales`, ...), year derivation
//!   from release dates, per-value coercion with parse-failure accounting
//! - **Record cleaning**: per-analysis filtered views with exact row counts
//! - **Aggregation**: deterministic group-by with sum/count/mean, top-K with
//!   an "Others" bucket, minimum-support average rankings, region breakdowns
//! - **Forecasting**: ordinary least squares over yearly totals, contiguous
//!   forecasts and trend classification
//! - **Progress reporting**: stage updates through [`ProgressReporter`]
//!
//! Each analysis either produces its data or an explicit
//! [`AnalysisOutcome::Unavailable`] when its columns are missing or it has
//! too little data; one failing analysis never aborts the run.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use sales_analytics::{AnalysisConfig, Pipeline, RawTable, YearRange};
//! use polars::prelude::*;
//!
//! let df = CsvReadOptions::default()
//!     .with_has_header(true)
//!     .try_into_reader_with_file_path(Some("vgsales.csv".into()))?
//!     .finish()?;
//!
//! let config = AnalysisConfig::builder()
//!     .year_range(YearRange::Past44)
//!     .forecast_horizon(5)
//!     .build()?;
//!
//! let report = Pipeline::builder()
//!     .config(config)
//!     .build()?
//!     .run(&RawTable::from_dataframe(&df)?)?;
//!
//! println!("{}", sales_analytics::reporting::render_text(&report));
//! ```
//!
//! # Building blocks
//!
//! The stages can also be used directly:
//!
//! ```rust,ignore
//! use sales_analytics::aggregation::{aggregate, top_k_with_others};
//! use sales_analytics::forecast::fit;
//! use sales_analytics::{Dimension, Measure, Normalizer, RecordCleaner, SemanticField};
//!
//! let normalized = Normalizer::normalize(&table);
//! let cleaned = RecordCleaner::clean(
//!     &normalized.records,
//!     &[SemanticField::Platform, SemanticField::TotalSales],
//! );
//! let groups = aggregate(cleaned.iter(), Dimension::Platform, Measure::TotalSales);
//! let share = top_k_with_others(&groups, 10);
//! ```

pub mod aggregation;
pub mod cleaner;
pub mod config;
pub mod error;
pub mod forecast;
pub mod pipeline;
pub mod reporting;
pub mod schema;
pub mod types;
pub mod utils;

// Re-exports for convenient access
pub use cleaner::{CleanedRecords, RecordCleaner, YearWindow};
pub use config::{
    Analysis, AnalysisConfig, AnalysisConfigBuilder, ConfigValidationError, YearRange,
};
pub use error::{AnalyticsError, Result as AnalyticsResult, ResultExt};
pub use forecast::{TrendDirection, TrendForecast, TrendModel};
pub use pipeline::{
    AnalysisOutcome, AnalysisReport, AnalysisStage, ClosureProgressReporter, Pipeline,
    PipelineBuilder, ProgressReporter, ProgressUpdate,
};
pub use reporting::ReportGenerator;
pub use schema::{Capabilities, ColumnResolution, NormalizedTable, Normalizer, RawTable, RawValue};
pub use types::{
    AggregateGroup, CanonicalRecord, Dimension, Measure, RegionTag, SemanticField, YearValue,
    YearlySeries,
};
