//! Pipeline module.
//!
//! This module provides the analysis pipeline, its progress reporting and
//! the structured report it produces.

mod analyses;
mod builder;
pub mod progress;
mod results;

pub use builder::{Pipeline, PipelineBuilder};
pub use progress::{AnalysisStage, ClosureProgressReporter, ProgressReporter, ProgressUpdate};
pub use results::{
    AnalysisOutcome, AnalysisReport, CleaningCounts, DimensionAnalysis, RegionAnalysis,
    SummaryAnalysis, TrendAnalysis,
};
