//! Maps raw rows onto [`CanonicalRecord`]s.

use super::aliases::{Capabilities, ColumnResolution, YearSource};
use super::raw_table::{RawTable, RawValue};
use crate::error::{AnalyticsError, Result};
use crate::types::{CanonicalRecord, RegionTag, SemanticField};
use crate::utils::{is_missing_marker, parse_numeric_string, year_from_date_string, year_from_number};
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

/// Output of normalization: one record per input row, in input order.
#[derive(Debug, Clone)]
pub struct NormalizedTable {
    pub records: Vec<CanonicalRecord>,
    pub resolution: ColumnResolution,
    pub capabilities: Capabilities,
    /// Values dropped because they failed coercion, per field.
    pub parse_failures: BTreeMap<SemanticField, usize>,
}

impl NormalizedTable {
    pub fn total_parse_failures(&self) -> usize {
        self.parse_failures.values().sum()
    }

    /// Number of records carrying a valid year.
    pub fn year_bearing(&self) -> usize {
        self.records.iter().filter(|r| r.year.is_some()).count()
    }
}

/// Resolved column positions for one table.
struct ColumnPlan {
    /// Year column index and whether it holds release dates.
    year: Option<(usize, bool)>,
    genre: Option<usize>,
    platform: Option<usize>,
    publisher: Option<usize>,
    total_sales: Option<usize>,
    regions: Vec<(RegionTag, usize)>,
}

/// Schema normalizer.
pub struct Normalizer;

impl Normalizer {
    /// Normalize a raw table.
    ///
    /// Never fails on bad values: a value that cannot be coerced is counted
    /// as a parse failure and left absent on that record only.
    pub fn normalize(table: &RawTable) -> NormalizedTable {
        let resolution = ColumnResolution::resolve(table.column_names());
        let capabilities = resolution.capabilities();

        info!(
            "Resolved {} semantic fields from {} columns",
            capabilities.fields().count(),
            table.width()
        );
        debug!("Column resolution: {:?}", resolution);

        let plan = Self::plan(table, &resolution);
        let mut parse_failures: BTreeMap<SemanticField, usize> = BTreeMap::new();
        let mut records = Vec::with_capacity(table.height());

        for (row_idx, row) in table.rows().enumerate() {
            let mut record = CanonicalRecord::new(row_idx);
            let mut note = |field: SemanticField, result: Result<()>| {
                if let Err(e) = result {
                    debug!("Row {}: {}", row_idx, e);
                    *parse_failures.entry(field).or_insert(0) += 1;
                }
            };

            if let Some((idx, from_date)) = plan.year {
                let column = table.column_names()[idx].as_str();
                let coerced = if from_date {
                    coerce_release_year(&row[idx], column)
                } else {
                    coerce_year(&row[idx], column)
                };
                note(SemanticField::Year, coerced.map(|y| record.year = y));
            }

            record.genre = plan.genre.and_then(|idx| coerce_category(&row[idx]));
            record.platform = plan.platform.and_then(|idx| coerce_category(&row[idx]));
            record.publisher = plan.publisher.and_then(|idx| coerce_category(&row[idx]));

            if let Some(idx) = plan.total_sales {
                let column = table.column_names()[idx].as_str();
                note(
                    SemanticField::TotalSales,
                    coerce_sales(&row[idx], column).map(|v| record.total_sales = v),
                );
            }

            for &(tag, idx) in &plan.regions {
                let column = table.column_names()[idx].as_str();
                note(
                    SemanticField::RegionSales(tag),
                    coerce_sales(&row[idx], column).map(|v| {
                        if let Some(v) = v {
                            record.region_sales.insert(tag, v);
                        }
                    }),
                );
            }

            records.push(record);
        }

        let total_failures: usize = parse_failures.values().sum();
        if total_failures > 0 {
            warn!(
                "Dropped {} unparseable values across {} fields",
                total_failures,
                parse_failures.len()
            );
        }

        NormalizedTable {
            records,
            resolution,
            capabilities,
            parse_failures,
        }
    }

    fn plan(table: &RawTable, resolution: &ColumnResolution) -> ColumnPlan {
        let index = |name: &Option<String>| name.as_deref().and_then(|n| table.column_index(n));

        let year = resolution.year.as_ref().and_then(|source| {
            let idx = table.column_index(source.column())?;
            Some((idx, matches!(source, YearSource::ReleaseDate(_))))
        });

        ColumnPlan {
            year,
            genre: index(&resolution.genre),
            platform: index(&resolution.platform),
            publisher: index(&resolution.publisher),
            total_sales: index(&resolution.total_sales),
            regions: resolution
                .regions
                .iter()
                .filter_map(|(tag, name)| table.column_index(name).map(|idx| (*tag, idx)))
                .collect(),
        }
    }
}

fn parse_failure(column: &str, value: &RawValue, expected: &str) -> AnalyticsError {
    AnalyticsError::ParseFailure {
        column: column.to_string(),
        value: value.as_text().map(|s| s.into_owned()).unwrap_or_default(),
        expected: expected.to_string(),
    }
}

/// Coerce a sales value: finite and non-negative, missing markers are `None`.
pub(crate) fn coerce_sales(value: &RawValue, column: &str) -> Result<Option<f64>> {
    let number = match value {
        RawValue::Missing => return Ok(None),
        RawValue::Text(s) if is_missing_marker(s) => return Ok(None),
        RawValue::Text(s) => parse_numeric_string(s),
        RawValue::Number(v) => Some(*v).filter(|v| v.is_finite()),
    };

    match number {
        Some(v) if v >= 0.0 => Ok(Some(v)),
        _ => Err(parse_failure(column, value, "a non-negative number")),
    }
}

/// Coerce a direct year value.
pub(crate) fn coerce_year(value: &RawValue, column: &str) -> Result<Option<i32>> {
    let year = match value {
        RawValue::Missing => return Ok(None),
        RawValue::Text(s) if is_missing_marker(s) => return Ok(None),
        RawValue::Text(s) => parse_numeric_string(s).and_then(year_from_number),
        RawValue::Number(v) => year_from_number(*v),
    };
    year.map(Some)
        .ok_or_else(|| parse_failure(column, value, "a four-digit year"))
}

/// Derive the year from a release date.
pub(crate) fn coerce_release_year(value: &RawValue, column: &str) -> Result<Option<i32>> {
    match value {
        RawValue::Missing => Ok(None),
        RawValue::Text(s) if is_missing_marker(s) => Ok(None),
        RawValue::Text(s) => year_from_date_string(s)
            .map(Some)
            .ok_or_else(|| parse_failure(column, value, "a calendar date")),
        RawValue::Number(_) => Err(parse_failure(column, value, "a calendar date")),
    }
}

/// Categorical values are kept verbatim; blanks and missing markers are absent.
pub(crate) fn coerce_category(value: &RawValue) -> Option<String> {
    let text = value.as_text()?;
    if is_missing_marker(&text) {
        None
    } else {
        Some(text.into_owned())
    }
}
