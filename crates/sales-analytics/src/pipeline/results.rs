//! Structured results produced by a pipeline run.
//!
//! The report carries every aggregate the console and JSON outputs show;
//! renderers only format these values.

use crate::aggregation::{GroupTotals, RegionBreakdown, SalesDistribution};
use crate::cleaner::{CleanedRecords, YearWindow};
use crate::error::Result;
use crate::forecast::TrendForecast;
use crate::schema::{Capabilities, ColumnResolution};
use crate::types::{AggregateGroup, Dimension, Measure};
use serde::Serialize;
use std::collections::BTreeMap;

/// Result of one analysis: either its data or an explicit reason it could
/// not be produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AnalysisOutcome<T> {
    Available(T),
    Unavailable { code: String, reason: String },
}

impl<T> AnalysisOutcome<T> {
    /// Turn analysis-scoped errors into `Unavailable`; anything else is
    /// returned as an error.
    pub fn from_result(result: Result<T>) -> Result<Self> {
        match result {
            Ok(value) => Ok(Self::Available(value)),
            Err(e) if e.is_analysis_scoped() => Ok(Self::Unavailable {
                code: e.error_code().to_string(),
                reason: e.to_string(),
            }),
            Err(e) => Err(e),
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, Self::Available(_))
    }

    pub fn available(&self) -> Option<&T> {
        match self {
            Self::Available(value) => Some(value),
            Self::Unavailable { .. } => None,
        }
    }

    pub fn unavailable_reason(&self) -> Option<&str> {
        match self {
            Self::Available(_) => None,
            Self::Unavailable { reason, .. } => Some(reason),
        }
    }
}

/// Row accounting for the cleaning step of one analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CleaningCounts {
    pub rows_before: usize,
    pub rows_after: usize,
    pub rows_dropped: usize,
}

impl From<&CleanedRecords<'_>> for CleaningCounts {
    fn from(cleaned: &CleanedRecords<'_>) -> Self {
        Self {
            rows_before: cleaned.rows_before(),
            rows_after: cleaned.rows_after(),
            rows_dropped: cleaned.rows_dropped(),
        }
    }
}

/// Genre, platform or publisher analysis.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DimensionAnalysis {
    pub dimension: Dimension,
    pub cleaning: CleaningCounts,
    /// Leading groups by total sales.
    pub top_by_sales: Vec<AggregateGroup>,
    /// Leading groups by number of titles.
    pub top_by_count: Vec<AggregateGroup>,
    /// Leading groups by average sales per title, small groups excluded.
    pub top_by_mean: Vec<AggregateGroup>,
    pub min_support: usize,
    /// Market-share view with the remainder merged into "Others".
    pub market_share: Vec<AggregateGroup>,
    pub totals: GroupTotals,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegionAnalysis {
    pub cleaning: CleaningCounts,
    pub breakdown: RegionBreakdown,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendAnalysis {
    pub measure: Measure,
    pub cleaning: CleaningCounts,
    #[serde(flatten)]
    pub forecast: TrendForecast,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryAnalysis {
    pub cleaning: CleaningCounts,
    pub distribution: SalesDistribution,
}

/// Everything one pipeline run produced.
///
/// Analyses that were not selected are `None`.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub generated_at: String,
    pub rows: usize,
    pub columns: Vec<String>,
    pub resolution: ColumnResolution,
    pub capabilities: Capabilities,
    /// Coercion failures per canonical field name.
    pub parse_failures: BTreeMap<String, usize>,
    pub year_window: YearWindow,
    pub records_in_window: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub genre: Option<AnalysisOutcome<DimensionAnalysis>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub platform: Option<AnalysisOutcome<DimensionAnalysis>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub publisher: Option<AnalysisOutcome<DimensionAnalysis>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<AnalysisOutcome<RegionAnalysis>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trend: Option<AnalysisOutcome<TrendAnalysis>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<AnalysisOutcome<SummaryAnalysis>>,
    pub duration_ms: u64,
}

impl AnalysisReport {
    /// Names and reasons of the analyses that ran but produced nothing.
    pub fn unavailable(&self) -> Vec<(&'static str, &str)> {
        let reasons = [
            ("genre", self.genre.as_ref().and_then(|o| o.unavailable_reason())),
            ("platform", self.platform.as_ref().and_then(|o| o.unavailable_reason())),
            ("publisher", self.publisher.as_ref().and_then(|o| o.unavailable_reason())),
            ("region", self.region.as_ref().and_then(|o| o.unavailable_reason())),
            ("trend", self.trend.as_ref().and_then(|o| o.unavailable_reason())),
            ("summary", self.summary.as_ref().and_then(|o| o.unavailable_reason())),
        ];
        reasons
            .into_iter()
            .filter_map(|(name, reason)| reason.map(|r| (name, r)))
            .collect()
    }
}
