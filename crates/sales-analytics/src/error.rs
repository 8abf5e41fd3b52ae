//! Custom error types for the sales analytics pipeline.
//!
//! This module provides the error hierarchy using `thiserror`. Errors are
//! scoped to the smallest unit of work: a [`AnalyticsError::ParseFailure`]
//! drops one value of one row, while [`AnalyticsError::SchemaUnresolved`] and
//! [`AnalyticsError::InsufficientData`] make a single analysis unavailable
//! without aborting the rest of the run.
//!
//! Errors are serializable so they can be embedded in JSON reports.

use serde::Serialize;
use serde::ser::SerializeStruct;
use thiserror::Error;

/// The main error type for the analytics pipeline.
#[derive(Error, Debug)]
pub enum AnalyticsError {
    /// A semantic field required by an analysis has no matching column.
    #[error("No column found for '{field}' (required by {analysis} analysis)")]
    SchemaUnresolved { field: String, analysis: String },

    /// Not enough usable data to run an analysis.
    #[error("Insufficient data for {analysis} analysis: {reason}")]
    InsufficientData { analysis: String, reason: String },

    /// A single value failed numeric or date coercion.
    #[error("Failed to parse '{value}' in column '{column}' as {expected}")]
    ParseFailure {
        column: String,
        value: String,
        expected: String,
    },

    /// A raw table whose rows do not match its columns.
    #[error("Malformed table: {0}")]
    MalformedTable(String),

    /// A yearly series violated its ordering invariant.
    #[error("Invalid yearly series: {0}")]
    InvalidSeries(String),

    /// Invalid configuration provided.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Polars error wrapper.
    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error with context.
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<AnalyticsError>,
    },
}

impl AnalyticsError {
    /// Shorthand for [`AnalyticsError::SchemaUnresolved`].
    pub fn schema_unresolved(field: impl Into<String>, analysis: impl Into<String>) -> Self {
        Self::SchemaUnresolved {
            field: field.into(),
            analysis: analysis.into(),
        }
    }

    /// Shorthand for [`AnalyticsError::InsufficientData`].
    pub fn insufficient_data(analysis: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InsufficientData {
            analysis: analysis.into(),
            reason: reason.into(),
        }
    }

    /// Add context to an error.
    pub fn with_context(self, context: impl Into<String>) -> Self {
        AnalyticsError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Get a stable error code.
    ///
    /// Reports carry this code next to an unavailable analysis so consumers
    /// can tell a missing column apart from a too-small data set.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::SchemaUnresolved { .. } => "SCHEMA_UNRESOLVED",
            Self::InsufficientData { .. } => "INSUFFICIENT_DATA",
            Self::ParseFailure { .. } => "PARSE_FAILURE",
            Self::MalformedTable(_) => "MALFORMED_TABLE",
            Self::InvalidSeries(_) => "INVALID_SERIES",
            Self::InvalidConfig(_) => "INVALID_CONFIG",
            Self::Io(_) => "IO_ERROR",
            Self::Polars(_) => "POLARS_ERROR",
            Self::Json(_) => "JSON_ERROR",
            Self::WithContext { source, .. } => source.error_code(),
        }
    }

    /// Check if this error only affects a single analysis.
    ///
    /// Scoped errors become an "unavailable" outcome in the report; every
    /// other error is a failure of the run itself.
    pub fn is_analysis_scoped(&self) -> bool {
        match self {
            Self::SchemaUnresolved { .. } | Self::InsufficientData { .. } => true,
            Self::WithContext { source, .. } => source.is_analysis_scoped(),
            _ => false,
        }
    }
}

/// Errors are serialized as a struct with `code` and `message` fields.
impl Serialize for AnalyticsError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut state = serializer.serialize_struct("AnalyticsError", 2)?;
        state.serialize_field("code", &self.error_code())?;
        state.serialize_field("message", &self.to_string())?;
        state.end()
    }
}

/// Result type alias for analytics operations.
pub type Result<T> = std::result::Result<T, AnalyticsError>;

/// Extension trait for adding context to Results.
pub trait ResultExt<T> {
    /// Add context to an error result.
    fn context(self, context: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, polars::error::PolarsError> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| AnalyticsError::Polars(e).with_context(context))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, std::io::Error> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| AnalyticsError::Io(e).with_context(context))
    }
}
