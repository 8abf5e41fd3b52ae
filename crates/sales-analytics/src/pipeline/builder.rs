//! Main analysis pipeline module.
//!
//! This module provides the core `Pipeline` struct and builder for
//! orchestrating normalization, windowing and the individual analyses.

use super::analyses::{dimension_analysis, region_analysis, summary_analysis, trend_analysis};
use super::results::{AnalysisOutcome, AnalysisReport};
use crate::cleaner::YearWindow;
use crate::config::{Analysis, AnalysisConfig, ConfigValidationError};
use crate::error::Result;
use crate::pipeline::progress::{
    AnalysisStage, ClosureProgressReporter, ProgressReporter, ProgressUpdate,
};
use crate::schema::{Normalizer, RawTable};
use crate::types::{CanonicalRecord, Dimension, SemanticField};
use polars::prelude::DataFrame;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};

/// The analysis pipeline.
///
/// Use [`Pipeline::builder()`] to create a new pipeline with custom configuration.
///
/// # Example
///
/// ```rust,ignore
/// use sales_analytics::{AnalysisConfig, Pipeline, YearRange};
///
/// let report = Pipeline::builder()
///     .config(AnalysisConfig::builder().year_range(YearRange::Past5).build()?)
///     .on_progress(|update| {
///         println!("[{:.0}%] {}", update.progress * 100.0, update.message);
///     })
///     .build()?
///     .run(&table)?;
/// ```
pub struct Pipeline {
    config: AnalysisConfig,
    progress_reporter: Option<Arc<dyn ProgressReporter>>,
}

static_assertions::assert_impl_all!(Pipeline: Send, Sync);

impl Pipeline {
    /// Create a new pipeline builder.
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::default()
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Run every configured analysis over a raw table.
    ///
    /// Missing columns and empty analyses are reported per analysis in the
    /// returned report. An `Err` means the run itself could not complete.
    pub fn run(&self, table: &RawTable) -> Result<AnalysisReport> {
        match self.run_internal(table) {
            Ok(report) => {
                self.report_progress(ProgressUpdate::complete("Analysis completed successfully"));
                Ok(report)
            }
            Err(e) => {
                self.report_progress(ProgressUpdate::failed(e.to_string()));
                error!("Pipeline error: {}", e);
                Err(e)
            }
        }
    }

    /// Convert a polars `DataFrame` and run the pipeline on it.
    pub fn run_dataframe(&self, df: &DataFrame) -> Result<AnalysisReport> {
        let table = RawTable::from_dataframe(df)?;
        self.run(&table)
    }

    /// Report progress if a reporter is configured.
    fn report_progress(&self, update: ProgressUpdate) {
        if let Some(reporter) = &self.progress_reporter {
            reporter.report(update);
        }
    }

    fn run_internal(&self, table: &RawTable) -> Result<AnalysisReport> {
        let start_time = Instant::now();

        info!(
            "Starting analysis of {} rows x {} columns",
            table.height(),
            table.width()
        );
        self.report_progress(ProgressUpdate::new(
            AnalysisStage::Initializing,
            0.0,
            "Starting analysis pipeline...",
        ));

        // Step 1: Normalize
        self.report_progress(ProgressUpdate::new(
            AnalysisStage::Normalizing,
            0.0,
            "Resolving columns...",
        ));
        let normalized = Normalizer::normalize(table);
        self.report_progress(ProgressUpdate::new(
            AnalysisStage::Normalizing,
            1.0,
            format!(
                "Normalized {} records ({} values unparseable)",
                normalized.records.len(),
                normalized.total_parse_failures()
            ),
        ));

        // Step 2: Year window
        let window = if normalized.capabilities.contains(SemanticField::Year) {
            self.config.year_window
        } else {
            if self.config.year_window.is_bounded() {
                warn!(
                    "No year column resolved; ignoring year window {}",
                    self.config.year_window
                );
            }
            YearWindow::unbounded()
        };
        let windowed: Vec<&CanonicalRecord> = window.apply(&normalized.records);
        info!(
            "Year window {}: {} of {} records",
            window,
            windowed.len(),
            normalized.records.len()
        );
        if windowed.is_empty() && !normalized.records.is_empty() {
            warn!("No records fall inside the year window {}", window);
        }
        self.report_progress(ProgressUpdate::new(
            AnalysisStage::Windowing,
            1.0,
            format!("{} records in {}", windowed.len(), window),
        ));

        // Step 3: Analyses
        let mut report = AnalysisReport {
            generated_at: chrono::Local::now().to_rfc3339(),
            rows: table.height(),
            columns: table.column_names().to_vec(),
            resolution: normalized.resolution.clone(),
            capabilities: normalized.capabilities.clone(),
            parse_failures: normalized
                .parse_failures
                .iter()
                .map(|(field, count)| (field.name(), *count))
                .collect(),
            year_window: window,
            records_in_window: windowed.len(),
            genre: None,
            platform: None,
            publisher: None,
            region: None,
            trend: None,
            summary: None,
            duration_ms: 0,
        };

        let caps = &normalized.capabilities;
        let total = self.config.analyses.len();
        for (idx, analysis) in self.config.analyses.iter().copied().enumerate() {
            self.report_progress(ProgressUpdate::with_items(
                AnalysisStage::Analyzing,
                format!("Analysis: {}", analysis),
                idx,
                total,
                format!("Running {} analysis", analysis),
            ));
            debug!("Running {} analysis", analysis);

            match analysis {
                Analysis::Genre => {
                    report.genre = Some(AnalysisOutcome::from_result(dimension_analysis(
                        &windowed,
                        caps,
                        analysis,
                        Dimension::Genre,
                        &self.config,
                    ))?);
                }
                Analysis::Platform => {
                    report.platform = Some(AnalysisOutcome::from_result(dimension_analysis(
                        &windowed,
                        caps,
                        analysis,
                        Dimension::Platform,
                        &self.config,
                    ))?);
                }
                Analysis::Publisher => {
                    report.publisher = Some(AnalysisOutcome::from_result(dimension_analysis(
                        &windowed,
                        caps,
                        analysis,
                        Dimension::Publisher,
                        &self.config,
                    ))?);
                }
                Analysis::Region => {
                    report.region =
                        Some(AnalysisOutcome::from_result(region_analysis(&windowed, caps))?);
                }
                Analysis::Trend => {
                    report.trend = Some(AnalysisOutcome::from_result(trend_analysis(
                        &windowed,
                        caps,
                        &self.config,
                    ))?);
                }
                Analysis::Summary => {
                    report.summary = Some(AnalysisOutcome::from_result(summary_analysis(
                        &windowed,
                        caps,
                        &self.config,
                    ))?);
                }
            }
        }

        for (name, reason) in report.unavailable() {
            warn!("{} analysis not available: {}", name, reason);
        }

        report.duration_ms = start_time.elapsed().as_millis() as u64;
        info!("Analysis finished in {} ms", report.duration_ms);
        Ok(report)
    }
}

/// Builder for creating a [`Pipeline`] instance.
#[derive(Default)]
pub struct PipelineBuilder {
    config: Option<AnalysisConfig>,
    progress_reporter: Option<Arc<dyn ProgressReporter>>,
}

static_assertions::assert_impl_all!(PipelineBuilder: Send);

impl PipelineBuilder {
    /// Set the pipeline configuration.
    pub fn config(mut self, config: AnalysisConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set a progress reporter for receiving updates during processing.
    pub fn progress_reporter(mut self, reporter: Arc<dyn ProgressReporter>) -> Self {
        self.progress_reporter = Some(reporter);
        self
    }

    /// Set a progress callback closure.
    ///
    /// This is a convenience method for simple progress handling.
    /// For more complex scenarios, use [`progress_reporter`](Self::progress_reporter).
    pub fn on_progress<F>(mut self, callback: F) -> Self
    where
        F: Fn(ProgressUpdate) + Send + Sync + 'static,
    {
        self.progress_reporter = Some(Arc::new(ClosureProgressReporter::new(callback)));
        self
    }

    /// Build the pipeline.
    ///
    /// Returns an error if the configuration is invalid.
    pub fn build(self) -> std::result::Result<Pipeline, ConfigValidationError> {
        let config = self.config.unwrap_or_default();
        config.validate()?;

        Ok(Pipeline {
            config,
            progress_reporter: self.progress_reporter,
        })
    }
}
