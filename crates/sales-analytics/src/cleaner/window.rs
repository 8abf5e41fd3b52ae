//! Year-range window applied before analyses run.

use crate::types::CanonicalRecord;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

/// Reference year for trailing windows.
pub const DEFAULT_REFERENCE_YEAR: i32 = 2024;

/// Inclusive year range. `None` bounds are open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct YearWindow {
    pub start: Option<i32>,
    pub end: Option<i32>,
}

impl YearWindow {
    /// Keep every record, with or without a year.
    pub fn unbounded() -> Self {
        Self::default()
    }

    /// `[reference_year - years, reference_year]`, so "past 5 years" from
    /// 2024 is 2019-2024.
    pub fn trailing(years: u32, reference_year: i32) -> Self {
        Self {
            start: Some(reference_year - years as i32),
            end: Some(reference_year),
        }
    }

    pub fn since(start: i32) -> Self {
        Self {
            start: Some(start),
            end: None,
        }
    }

    pub fn between(start: i32, end: i32) -> Self {
        Self {
            start: Some(start),
            end: Some(end),
        }
    }

    pub fn is_bounded(&self) -> bool {
        self.start.is_some() || self.end.is_some()
    }

    pub fn contains(&self, year: i32) -> bool {
        self.start.is_none_or(|s| year >= s) && self.end.is_none_or(|e| year <= e)
    }

    /// Filter records into the window.
    ///
    /// A bounded window cannot place records without a year, so they are
    /// excluded; an unbounded window keeps all records.
    pub fn apply<'a>(&self, records: &'a [CanonicalRecord]) -> Vec<&'a CanonicalRecord> {
        if !self.is_bounded() {
            return records.iter().collect();
        }

        let kept: Vec<&CanonicalRecord> = records
            .iter()
            .filter(|r| r.year.is_some_and(|y| self.contains(y)))
            .collect();
        debug!(
            "Year window {}: kept {} of {} records",
            self,
            kept.len(),
            records.len()
        );
        kept
    }
}

impl fmt::Display for YearWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.start, self.end) {
            (Some(s), Some(e)) => write!(f, "{}-{}", s, e),
            (Some(s), None) => write!(f, "{} onwards", s),
            (None, Some(e)) => write!(f, "up to {}", e),
            (None, None) => f.write_str("all years"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(row: usize, year: Option<i32>) -> CanonicalRecord {
        let mut r = CanonicalRecord::new(row);
        r.year = year;
        r
    }

    #[test]
    fn test_trailing_window() {
        let window = YearWindow::trailing(5, 2024);
        assert_eq!(window, YearWindow::between(2019, 2024));
        assert!(window.contains(2019));
        assert!(window.contains(2024));
        assert!(!window.contains(2018));
        assert_eq!(window.to_string(), "2019-2024");
        assert_eq!(YearWindow::trailing(44, 2024).start, Some(1980));
    }

    #[test]
    fn test_bounded_window_drops_yearless_records() {
        let records = vec![record(0, Some(2019)), record(1, None), record(2, Some(2022))];
        let kept = YearWindow::since(2020).apply(&records);
        let rows: Vec<usize> = kept.iter().map(|r| r.row).collect();
        assert_eq!(rows, vec![2]);
    }

    #[test]
    fn test_unbounded_window_keeps_everything() {
        let records = vec![record(0, Some(1985)), record(1, None)];
        assert_eq!(YearWindow::unbounded().apply(&records).len(), 2);
        assert_eq!(YearWindow::unbounded().to_string(), "all years");
    }
}
