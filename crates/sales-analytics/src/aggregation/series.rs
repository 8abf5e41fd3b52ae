use crate::error::Result;
use crate::types::{CanonicalRecord, Measure, YearValue, YearlySeries};
use std::collections::BTreeMap;

/// Sum `measure` per year, ascending by year.
///
/// Years with no records are absent; nothing is filled in.
pub fn yearly_series<'a, I>(records: I, measure: Measure) -> Result<YearlySeries>
where
    I: IntoIterator<Item = &'a CanonicalRecord>,
{
    let mut by_year: BTreeMap<i32, f64> = BTreeMap::new();
    for record in records {
        if let (Some(year), Some(value)) = (record.year, record.measure(measure)) {
            *by_year.entry(year).or_insert(0.0) += value;
        }
    }

    YearlySeries::new(
        by_year
            .into_iter()
            .map(|(year, value)| YearValue::new(year, value))
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RegionTag;

    fn record(row: usize, year: Option<i32>, sales: f64) -> CanonicalRecord {
        let mut r = CanonicalRecord::new(row);
        r.year = year;
        r.total_sales = Some(sales);
        r.region_sales.insert(RegionTag::EU, sales / 2.0);
        r
    }

    #[test]
    fn test_yearly_series_sums_and_sorts() {
        let records = vec![
            record(0, Some(2010), 1.0),
            record(1, Some(2008), 2.0),
            record(2, None, 9.0),
            record(3, Some(2010), 0.5),
        ];

        let series = yearly_series(&records, Measure::TotalSales).unwrap();
        assert_eq!(
            series.points(),
            &[YearValue::new(2008, 2.0), YearValue::new(2010, 1.5)]
        );

        let eu = yearly_series(&records, Measure::RegionSales(RegionTag::EU)).unwrap();
        assert_eq!(eu.points()[1].value, 0.75);
    }

    #[test]
    fn test_gaps_are_not_filled() {
        let records = vec![record(0, Some(2000), 1.0), record(1, Some(2005), 1.0)];
        let series = yearly_series(&records, Measure::TotalSales).unwrap();
        assert_eq!(series.years().collect::<Vec<_>>(), vec![2000, 2005]);
    }
}
