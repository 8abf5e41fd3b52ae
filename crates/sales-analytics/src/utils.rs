//! Shared utilities for the analytics pipeline.
//!
//! This module contains the value-level coercion helpers used by the
//! normalizer: dtype checks, missing-value markers, strict numeric parsing
//! and calendar-date parsing.

use chrono::{Datelike, NaiveDate};
use once_cell::sync::Lazy;
use polars::prelude::*;
use regex::Regex;

// =============================================================================
// Data Type Utilities
// =============================================================================

/// Check if a DataType is numeric (integer or float).
#[inline]
pub fn is_numeric_dtype(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Float32
            | DataType::Float64
    )
}

// =============================================================================
// String Parsing Utilities
// =============================================================================

/// Common missing value markers in sales data.
pub const MISSING_MARKERS: [&str; 8] = [
    "n/a", "na", "nan", "null", "none", "missing", "#n/a", "-",
];

/// Check if a string is empty or a missing-value marker.
///
/// # Example
///
/// ```rust,ignore
/// use sales_analytics::utils::is_missing_marker;
///
/// assert!(is_missing_marker("N/A"));
/// assert!(is_missing_marker("   "));
/// assert!(!is_missing_marker("Nintendo"));
/// ```
pub fn is_missing_marker(s: &str) -> bool {
    let lower = s.trim().to_ascii_lowercase();
    lower.is_empty() || MISSING_MARKERS.iter().any(|&marker| lower == marker)
}

/// Parse a string as a finite number.
///
/// Only surrounding whitespace is tolerated; currency symbols, separators and
/// the literals `inf`/`NaN` are rejected.
pub fn parse_numeric_string(s: &str) -> Option<f64> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Interpret a number as a four-digit calendar year.
pub fn year_from_number(value: f64) -> Option<i32> {
    if !value.is_finite() || value.fract() != 0.0 {
        return None;
    }
    let year = value as i64;
    (1000..=9999).contains(&year).then_some(year as i32)
}

// =============================================================================
// Date Parsing Utilities
// =============================================================================

// Date patterns and the chrono formats tried for each, in order.
// Day-first and month-first exports share separators.
static DATE_PATTERNS: Lazy<Vec<(Regex, &'static [&'static str])>> = Lazy::new(|| {
    vec![
        (
            Regex::new(r"^\d{4}-\d{1,2}-\d{1,2}$").expect("Invalid regex: YYYY-MM-DD"),
            &["%Y-%m-%d"] as &[_],
        ),
        (
            Regex::new(r"^\d{4}/\d{1,2}/\d{1,2}$").expect("Invalid regex: YYYY/MM/DD"),
            &["%Y/%m/%d"] as &[_],
        ),
        (
            Regex::new(r"^\d{1,2}/\d{1,2}/\d{4}$").expect("Invalid regex: MM/DD/YYYY"),
            &["%m/%d/%Y", "%d/%m/%Y"] as &[_],
        ),
        (
            Regex::new(r"^\d{1,2}-\d{1,2}-\d{4}$").expect("Invalid regex: DD-MM-YYYY"),
            &["%d-%m-%Y", "%m-%d-%Y"] as &[_],
        ),
    ]
});

// Date-times: only the date part matters
static DATETIME_PREFIX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d{4}-\d{2}-\d{2})[T ]\d{2}:\d{2}(:\d{2})?").expect("Invalid regex: datetime")
});

/// Parse a calendar date from the formats seen in sales exports.
pub fn parse_calendar_date(s: &str) -> Option<NaiveDate> {
    let trimmed = s.trim();

    if let Some(caps) = DATETIME_PREFIX.captures(trimmed) {
        return NaiveDate::parse_from_str(&caps[1], "%Y-%m-%d").ok();
    }

    DATE_PATTERNS
        .iter()
        .find(|(pattern, _)| pattern.is_match(trimmed))
        .and_then(|(_, formats)| {
            formats
                .iter()
                .find_map(|format| NaiveDate::parse_from_str(trimmed, format).ok())
        })
}

/// Parse a date and return its calendar year.
pub fn year_from_date_string(s: &str) -> Option<i32> {
    parse_calendar_date(s).map(|date| date.year())
}

// =============================================================================
// Tests
// =============================================================================
