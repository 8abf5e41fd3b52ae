//! Configuration types for the analysis pipeline.
//!
//! This module provides configuration options using the builder pattern
//! for flexible and ergonomic pipeline setup. Configurations can also be
//! loaded from JSON; omitted fields take their defaults.

use crate::cleaner::{DEFAULT_REFERENCE_YEAR, YearWindow};
use crate::types::Measure;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Largest accepted forecast horizon, in years.
pub const MAX_FORECAST_HORIZON: usize = 100;

/// One analysis the pipeline can run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Analysis {
    /// Sales by genre
    Genre,
    /// Platform performance: sales, title counts, averages, market share
    Platform,
    /// Publisher rankings: sales, title counts, averages, market share
    Publisher,
    /// Regional sales breakdown
    Region,
    /// Yearly trend and forecast
    Trend,
    /// Distribution of per-title sales
    Summary,
}

impl Analysis {
    pub const ALL: [Analysis; 6] = [
        Analysis::Genre,
        Analysis::Platform,
        Analysis::Publisher,
        Analysis::Region,
        Analysis::Trend,
        Analysis::Summary,
    ];

    pub fn all() -> Vec<Analysis> {
        Self::ALL.to_vec()
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Genre => "genre",
            Self::Platform => "platform",
            Self::Publisher => "publisher",
            Self::Region => "region",
            Self::Trend => "trend",
            Self::Summary => "summary",
        }
    }
}

impl fmt::Display for Analysis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Preset year ranges ending at the reference year.
///
/// Each preset keeps the first year its label has always named: from 2024,
/// `Past5` is 2019-2024, `Past8` 2017-2024, `Past22` 2002-2024, `Past25`
/// 2000-2024 and `Past44` 1980-2024.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum YearRange {
    Past5,
    Past8,
    Past22,
    #[default]
    Past25,
    Past44,
    /// No year filter at all
    All,
}

impl YearRange {
    pub fn years(&self) -> Option<u32> {
        match self {
            Self::Past5 => Some(5),
            Self::Past8 => Some(8),
            Self::Past22 => Some(22),
            Self::Past25 => Some(25),
            Self::Past44 => Some(44),
            Self::All => None,
        }
    }

    /// Years between the first year of the range and the reference year.
    pub fn start_offset(&self) -> Option<u32> {
        match self {
            Self::Past5 => Some(5),
            Self::Past8 => Some(7),
            Self::Past22 => Some(22),
            Self::Past25 => Some(24),
            Self::Past44 => Some(44),
            Self::All => None,
        }
    }

    pub fn window(&self, reference_year: i32) -> YearWindow {
        match self.start_offset() {
            Some(offset) => YearWindow::trailing(offset, reference_year),
            None => YearWindow::unbounded(),
        }
    }
}

/// Configuration for the analysis pipeline.
///
/// Use [`AnalysisConfig::builder()`] to create a new configuration
/// with fluent API.
///
/// # Example
///
/// ```rust,ignore
/// use sales_analytics::config::{AnalysisConfig, YearRange};
///
/// let config = AnalysisConfig::builder()
///     .year_range(YearRange::Past5)
///     .forecast_horizon(3)
///     .build()?;
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Records outside this window are excluded before any analysis.
    /// Default: 2000-2024 (past 25 years)
    pub year_window: YearWindow,

    /// Number of groups shown in ranked listings.
    /// Default: 10
    pub top_k_listing: usize,

    /// Groups kept verbatim in market-share views; the rest become "Others".
    /// Default: 10
    pub market_share_top_k: usize,

    /// Minimum group size for average-per-title rankings.
    /// Default: 5
    pub min_support: usize,

    /// Number of years to forecast, at most [`MAX_FORECAST_HORIZON`].
    /// Default: 5
    pub forecast_horizon: usize,

    /// Measure the trend is fitted on.
    /// Default: TotalSales
    pub trend_measure: Measure,

    /// Histogram bins in the summary analysis.
    /// Default: 50
    pub histogram_bins: usize,

    /// Analyses to run, in order.
    /// Default: all
    pub analyses: Vec<Analysis>,

    /// Classify a zero slope as decreasing instead of flat.
    /// Default: false
    pub legacy_trend_direction: bool,

    /// Output directory for written reports.
    /// Default: "output"
    pub output_dir: PathBuf,

    /// Report file name (without extension).
    /// If None, uses "sales_report".
    /// Default: None
    pub output_name: Option<String>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            year_window: YearRange::default().window(DEFAULT_REFERENCE_YEAR),
            top_k_listing: 10,
            market_share_top_k: 10,
            min_support: 5,
            forecast_horizon: 5,
            trend_measure: Measure::TotalSales,
            histogram_bins: 50,
            analyses: Analysis::all(),
            legacy_trend_direction: false,
            output_dir: PathBuf::from("output"),
            output_name: None,
        }
    }
}

impl AnalysisConfig {
    /// Create a new configuration builder.
    pub fn builder() -> AnalysisConfigBuilder {
        AnalysisConfigBuilder::default()
    }

    /// Validate the configuration and return errors if invalid.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.forecast_horizon == 0 {
            return Err(ConfigValidationError::AtLeastOne {
                field: "forecast_horizon",
                value: self.forecast_horizon,
            });
        }

        if self.forecast_horizon > MAX_FORECAST_HORIZON {
            return Err(ConfigValidationError::AtMost {
                field: "forecast_horizon",
                value: self.forecast_horizon,
                max: MAX_FORECAST_HORIZON,
            });
        }

        if self.histogram_bins == 0 {
            return Err(ConfigValidationError::AtLeastOne {
                field: "histogram_bins",
                value: self.histogram_bins,
            });
        }

        if self.min_support == 0 {
            return Err(ConfigValidationError::AtLeastOne {
                field: "min_support",
                value: self.min_support,
            });
        }

        if let (Some(start), Some(end)) = (self.year_window.start, self.year_window.end)
            && start > end
        {
            return Err(ConfigValidationError::InvalidYearWindow { start, end });
        }

        if self.analyses.is_empty() {
            return Err(ConfigValidationError::NoAnalyses);
        }

        Ok(())
    }

    pub fn runs(&self, analysis: Analysis) -> bool {
        self.analyses.contains(&analysis)
    }
}

/// Errors that can occur during configuration validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Invalid value for '{field}': {value} (must be at least 1)")]
    AtLeastOne { field: &'static str, value: usize },

    #[error("Invalid value for '{field}': {value} (must be at most {max})")]
    AtMost {
        field: &'static str,
        value: usize,
        max: usize,
    },

    #[error("Invalid year window: start {start} is after end {end}")]
    InvalidYearWindow { start: i32, end: i32 },

    #[error("No analyses selected")]
    NoAnalyses,
}

/// Builder for [`AnalysisConfig`] with fluent API.
#[derive(Debug, Default)]
pub struct AnalysisConfigBuilder {
    year_window: Option<YearWindow>,
    top_k_listing: Option<usize>,
    market_share_top_k: Option<usize>,
    min_support: Option<usize>,
    forecast_horizon: Option<usize>,
    trend_measure: Option<Measure>,
    histogram_bins: Option<usize>,
    analyses: Option<Vec<Analysis>>,
    legacy_trend_direction: Option<bool>,
    output_dir: Option<PathBuf>,
    output_name: Option<String>,
}

impl AnalysisConfigBuilder {
    /// Set an explicit year window.
    pub fn year_window(mut self, window: YearWindow) -> Self {
        self.year_window = Some(window);
        self
    }

    /// Set the year window from a preset, relative to 2024.
    pub fn year_range(mut self, range: YearRange) -> Self {
        self.year_window = Some(range.window(DEFAULT_REFERENCE_YEAR));
        self
    }

    pub fn top_k_listing(mut self, k: usize) -> Self {
        self.top_k_listing = Some(k);
        self
    }

    /// Set how many groups market-share views keep before "Others".
    pub fn market_share_top_k(mut self, k: usize) -> Self {
        self.market_share_top_k = Some(k);
        self
    }

    /// Set the minimum group size for average rankings.
    pub fn min_support(mut self, count: usize) -> Self {
        self.min_support = Some(count);
        self
    }

    pub fn forecast_horizon(mut self, years: usize) -> Self {
        self.forecast_horizon = Some(years);
        self
    }

    pub fn trend_measure(mut self, measure: Measure) -> Self {
        self.trend_measure = Some(measure);
        self
    }

    pub fn histogram_bins(mut self, bins: usize) -> Self {
        self.histogram_bins = Some(bins);
        self
    }

    /// Restrict the run to the given analyses.
    pub fn analyses(mut self, analyses: impl IntoIterator<Item = Analysis>) -> Self {
        self.analyses = Some(analyses.into_iter().collect());
        self
    }

    /// Classify a zero slope as decreasing.
    pub fn legacy_trend_direction(mut self, legacy: bool) -> Self {
        self.legacy_trend_direction = Some(legacy);
        self
    }

    pub fn output_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(path.into());
        self
    }

    pub fn output_name(mut self, name: impl Into<String>) -> Self {
        self.output_name = Some(name.into());
        self
    }

    /// Build the configuration.
    ///
    /// Returns a validated `AnalysisConfig` or an error if validation fails.
    pub fn build(self) -> Result<AnalysisConfig, ConfigValidationError> {
        let defaults = AnalysisConfig::default();
        let config = AnalysisConfig {
            year_window: self.year_window.unwrap_or(defaults.year_window),
            top_k_listing: self.top_k_listing.unwrap_or(defaults.top_k_listing),
            market_share_top_k: self.market_share_top_k.unwrap_or(defaults.market_share_top_k),
            min_support: self.min_support.unwrap_or(defaults.min_support),
            forecast_horizon: self.forecast_horizon.unwrap_or(defaults.forecast_horizon),
            trend_measure: self.trend_measure.unwrap_or(defaults.trend_measure),
            histogram_bins: self.histogram_bins.unwrap_or(defaults.histogram_bins),
            analyses: self.analyses.unwrap_or(defaults.analyses),
            legacy_trend_direction: self
                .legacy_trend_direction
                .unwrap_or(defaults.legacy_trend_direction),
            output_dir: self.output_dir.unwrap_or(defaults.output_dir),
            output_name: self.output_name,
        };

        config.validate()?;
        Ok(config)
    }
}
