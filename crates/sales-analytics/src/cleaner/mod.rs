//! Record cleaning for individual analyses.
//!
//! This module provides:
//! - Filtering a canonical record stream down to rows that carry every
//!   field an analysis needs
//! - Exact before/after row accounting
//! - Year-range windowing ([`YearWindow`])
//!
//! Cleaning never mutates the normalized records. It returns a borrowed
//! view, so each analysis can clean the same stream with its own
//! requirements.

mod window;

pub use window::{DEFAULT_REFERENCE_YEAR, YearWindow};

use crate::error::{AnalyticsError, Result};
use crate::types::{CanonicalRecord, SemanticField};
use tracing::debug;

/// Filtered view over canonical records.
#[derive(Debug, Clone)]
pub struct CleanedRecords<'a> {
    records: Vec<&'a CanonicalRecord>,
    rows_before: usize,
}

impl<'a> CleanedRecords<'a> {
    pub fn records(&self) -> &[&'a CanonicalRecord] {
        &self.records
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a CanonicalRecord> + '_ {
        self.records.iter().copied()
    }

    pub fn rows_before(&self) -> usize {
        self.rows_before
    }

    pub fn rows_after(&self) -> usize {
        self.records.len()
    }

    pub fn rows_dropped(&self) -> usize {
        self.rows_before - self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Fail with `InsufficientData` when no record survived cleaning.
    pub fn require_non_empty(&self, analysis: &str) -> Result<()> {
        if self.records.is_empty() {
            return Err(AnalyticsError::insufficient_data(
                analysis,
                format!("0 of {} records have all required fields", self.rows_before),
            ));
        }
        Ok(())
    }
}

/// Record cleaner.
pub struct RecordCleaner;

impl RecordCleaner {
    /// Keep only records where every `required` field is present.
    pub fn clean<'a, I>(records: I, required: &[SemanticField]) -> CleanedRecords<'a>
    where
        I: IntoIterator<Item = &'a CanonicalRecord>,
    {
        let mut rows_before = 0;
        let kept: Vec<&CanonicalRecord> = records
            .into_iter()
            .inspect(|_| rows_before += 1)
            .filter(|r| required.iter().all(|f| r.has(*f)))
            .collect();

        debug!(
            "Cleaning for {:?}: {} -> {} records",
            required,
            rows_before,
            kept.len()
        );

        CleanedRecords {
            records: kept,
            rows_before,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RegionTag;

    fn records() -> Vec<CanonicalRecord> {
        let mut a = CanonicalRecord::new(0);
        a.genre = Some("Action".to_string());
        a.total_sales = Some(1.0);

        let mut b = CanonicalRecord::new(1);
        b.genre = Some("Puzzle".to_string());

        let mut c = CanonicalRecord::new(2);
        c.total_sales = Some(3.0);
        c.region_sales.insert(RegionTag::JP, 1.0);

        vec![a, b, c]
    }

    #[test]
    fn test_clean_counts_are_exact() {
        let records = records();
        let cleaned =
            RecordCleaner::clean(&records, &[SemanticField::Genre, SemanticField::TotalSales]);
        assert_eq!(cleaned.rows_before(), 3);
        assert_eq!(cleaned.rows_after(), 1);
        assert_eq!(cleaned.rows_dropped(), 2);
        assert_eq!(cleaned.records()[0].row, 0);
    }

    #[test]
    fn test_independent_views_over_same_stream() {
        let records = records();
        let by_sales = RecordCleaner::clean(&records, &[SemanticField::TotalSales]);
        let by_region =
            RecordCleaner::clean(&records, &[SemanticField::RegionSales(RegionTag::JP)]);
        assert_eq!(by_sales.rows_after(), 2);
        assert_eq!(by_region.rows_after(), 1);
        // Upstream records untouched
        assert_eq!(records.len(), 3);
        assert_eq!(records[1].total_sales, None);
    }

    #[test]
    fn test_no_requirements_keeps_everything() {
        let records = records();
        let cleaned = RecordCleaner::clean(&records, &[]);
        assert_eq!(cleaned.rows_after(), cleaned.rows_before());
    }

    #[test]
    fn test_require_non_empty() {
        let records = records();
        let cleaned = RecordCleaner::clean(&records, &[SemanticField::Publisher]);
        let err = cleaned.require_non_empty("publisher").unwrap_err();
        assert_eq!(err.error_code(), "INSUFFICIENT_DATA");
        assert!(RecordCleaner::clean(&records, &[]).require_non_empty("any").is_ok());
    }
}
