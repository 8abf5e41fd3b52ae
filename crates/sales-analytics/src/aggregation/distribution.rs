//! Per-record sales distribution.

use crate::error::{AnalyticsError, Result};
use crate::types::CanonicalRecord;
use serde::Serialize;

/// Half-open bin `[lower, upper)`; the last bin also includes `upper`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistogramBin {
    pub lower: f64,
    pub upper: f64,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SalesDistribution {
    pub records: usize,
    pub total: f64,
    pub mean: f64,
    pub median: f64,
    pub min: f64,
    pub max: f64,
    pub bins: Vec<HistogramBin>,
}

/// Equal-width histogram of per-record total sales.
///
/// When every value is identical a single bin holds all records.
pub fn sales_distribution<'a, I>(records: I, bins: usize) -> Result<SalesDistribution>
where
    I: IntoIterator<Item = &'a CanonicalRecord>,
{
    let mut values: Vec<f64> = records.into_iter().filter_map(|r| r.total_sales).collect();
    if values.is_empty() {
        return Err(AnalyticsError::insufficient_data(
            "summary",
            "no records carry a sales value",
        ));
    }
    if bins == 0 {
        return Err(AnalyticsError::InvalidConfig(
            "histogram needs at least one bin".to_string(),
        ));
    }

    values.sort_by(f64::total_cmp);
    let n = values.len();
    let min = values[0];
    let max = values[n - 1];
    let total: f64 = values.iter().sum();
    let median = if n % 2 == 0 {
        (values[n / 2 - 1] + values[n / 2]) / 2.0
    } else {
        values[n / 2]
    };

    let width = (max - min) / bins as f64;
    let bins = if width > 0.0 {
        let mut histogram: Vec<HistogramBin> = (0..bins)
            .map(|i| HistogramBin {
                lower: min + width * i as f64,
                upper: if i + 1 == bins {
                    max
                } else {
                    min + width * (i + 1) as f64
                },
                count: 0,
            })
            .collect();
        for value in &values {
            let idx = (((value - min) / width) as usize).min(bins - 1);
            histogram[idx].count += 1;
        }
        histogram
    } else {
        vec![HistogramBin {
            lower: min,
            upper: max,
            count: n,
        }]
    };

    Ok(SalesDistribution {
        records: n,
        total,
        mean: total / n as f64,
        median,
        min,
        max,
        bins,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn records(values: &[f64]) -> Vec<CanonicalRecord> {
        values
            .iter()
            .enumerate()
            .map(|(row, v)| {
                let mut r = CanonicalRecord::new(row);
                r.total_sales = Some(*v);
                r
            })
            .collect()
    }

    #[test]
    fn test_histogram_counts_every_record() {
        let records = records(&[0.0, 1.0, 2.0, 3.0, 4.0, 10.0]);
        let dist = sales_distribution(&records, 5).unwrap();

        assert_eq!(dist.records, 6);
        assert_eq!(dist.total, 20.0);
        assert_eq!(dist.median, 2.5);
        assert_eq!(dist.bins.len(), 5);
        assert_eq!(dist.bins.iter().map(|b| b.count).sum::<usize>(), 6);
        assert_eq!(dist.bins[0].count, 2);
        // Max lands in the last bin
        assert_eq!(dist.bins[4].count, 1);
        assert_eq!(dist.bins[4].upper, 10.0);
    }

    #[test]
    fn test_constant_values_single_bin() {
        let records = records(&[1.5, 1.5, 1.5]);
        let dist = sales_distribution(&records, 50).unwrap();
        assert_eq!(dist.bins.len(), 1);
        assert_eq!(dist.bins[0].count, 3);
        assert_eq!(dist.mean, 1.5);
    }

    #[test]
    fn test_empty_is_insufficient() {
        let err = sales_distribution(&records(&[]), 10).unwrap_err();
        assert_eq!(err.error_code(), "INSUFFICIENT_DATA");
    }
}
