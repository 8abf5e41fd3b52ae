//! Individual analyses over the windowed record stream.
//!
//! Each function checks capabilities, cleans with its own required fields
//! and then aggregates or fits. Errors returned here are scoped to the
//! analysis that raised them.

use super::results::{
    CleaningCounts, DimensionAnalysis, RegionAnalysis, SummaryAnalysis, TrendAnalysis,
};
use crate::aggregation::{
    GroupTotals, aggregate, aggregate_regions, rank_by_count, rank_by_mean, sales_distribution,
    top_k_with_others, yearly_series,
};
use crate::cleaner::RecordCleaner;
use crate::config::{Analysis, AnalysisConfig};
use crate::error::{AnalyticsError, Result};
use crate::forecast::TrendForecast;
use crate::schema::Capabilities;
use crate::types::{AggregateGroup, CanonicalRecord, Dimension, Measure, SemanticField};

fn top(groups: &[AggregateGroup], k: usize) -> Vec<AggregateGroup> {
    groups.iter().take(k).cloned().collect()
}

pub(crate) fn dimension_analysis(
    records: &[&CanonicalRecord],
    capabilities: &Capabilities,
    analysis: Analysis,
    dimension: Dimension,
    config: &AnalysisConfig,
) -> Result<DimensionAnalysis> {
    let required = [dimension.field(), SemanticField::TotalSales];
    capabilities.require_all(&required, analysis.name())?;

    let cleaned = RecordCleaner::clean(records.iter().copied(), &required);
    cleaned.require_non_empty(analysis.name())?;

    let groups = aggregate(cleaned.iter(), dimension, Measure::TotalSales);
    let by_count = rank_by_count(&groups);
    let by_mean = rank_by_mean(&groups, config.min_support);

    Ok(DimensionAnalysis {
        dimension,
        cleaning: CleaningCounts::from(&cleaned),
        top_by_sales: top(&groups, config.top_k_listing),
        top_by_count: top(&by_count, config.top_k_listing),
        top_by_mean: top(&by_mean, config.top_k_listing),
        min_support: config.min_support,
        market_share: top_k_with_others(&groups, config.market_share_top_k),
        totals: GroupTotals::from_groups(&groups),
    })
}

pub(crate) fn region_analysis(
    records: &[&CanonicalRecord],
    capabilities: &Capabilities,
) -> Result<RegionAnalysis> {
    let analysis = Analysis::Region.name();
    let regions = capabilities.regions();
    if regions.is_empty() {
        return Err(AnalyticsError::schema_unresolved("region_sales", analysis));
    }

    // Each region sums its own column; no row needs every region.
    let cleaned = RecordCleaner::clean(records.iter().copied(), &[]);
    let breakdown = aggregate_regions(cleaned.iter(), &regions);
    if breakdown.is_empty() {
        return Err(AnalyticsError::insufficient_data(
            analysis,
            "no record carries a regional sales value",
        ));
    }

    Ok(RegionAnalysis {
        cleaning: CleaningCounts::from(&cleaned),
        breakdown,
    })
}

pub(crate) fn trend_analysis(
    records: &[&CanonicalRecord],
    capabilities: &Capabilities,
    config: &AnalysisConfig,
) -> Result<TrendAnalysis> {
    let analysis = Analysis::Trend.name();
    let measure = config.trend_measure;
    let required = [SemanticField::Year, measure.field()];
    capabilities.require_all(&required, analysis)?;

    let cleaned = RecordCleaner::clean(records.iter().copied(), &required);
    cleaned.require_non_empty(analysis)?;

    let series = yearly_series(cleaned.iter(), measure)?;
    let forecast = TrendForecast::build(
        series,
        config.forecast_horizon,
        config.legacy_trend_direction,
    )?;

    Ok(TrendAnalysis {
        measure,
        cleaning: CleaningCounts::from(&cleaned),
        forecast,
    })
}

pub(crate) fn summary_analysis(
    records: &[&CanonicalRecord],
    capabilities: &Capabilities,
    config: &AnalysisConfig,
) -> Result<SummaryAnalysis> {
    let analysis = Analysis::Summary.name();
    let required = [SemanticField::TotalSales];
    capabilities.require_all(&required, analysis)?;

    let cleaned = RecordCleaner::clean(records.iter().copied(), &required);
    cleaned.require_non_empty(analysis)?;

    Ok(SummaryAnalysis {
        cleaning: CleaningCounts::from(&cleaned),
        distribution: sales_distribution(cleaned.iter(), config.histogram_bins)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::ColumnResolution;
    use crate::types::RegionTag;

    fn caps(columns: &[&str]) -> Capabilities {
        let columns: Vec<String> = columns.iter().map(|c| c.to_string()).collect();
        ColumnResolution::resolve(&columns).capabilities()
    }

    fn record(row: usize, year: i32, platform: &str, sales: f64) -> CanonicalRecord {
        let mut r = CanonicalRecord::new(row);
        r.year = Some(year);
        r.platform = Some(platform.to_string());
        r.total_sales = Some(sales);
        r
    }

    #[test]
    fn test_dimension_analysis_views() {
        let mut records = vec![
            record(0, 2010, "Wii", 10.0),
            record(1, 2010, "PS3", 4.0),
            record(2, 2011, "PS3", 4.0),
            record(3, 2011, "X360", 1.0),
        ];
        records[3].total_sales = None;
        let refs: Vec<&CanonicalRecord> = records.iter().collect();
        let config = AnalysisConfig::builder()
            .market_share_top_k(1)
            .min_support(2)
            .build()
            .unwrap();

        let result = dimension_analysis(
            &refs,
            &caps(&["Platform", "Global_Sales"]),
            Analysis::Platform,
            Dimension::Platform,
            &config,
        )
        .unwrap();

        assert_eq!(result.cleaning.rows_dropped, 1);
        assert_eq!(result.top_by_sales[0].key, "Wii");
        assert_eq!(result.top_by_count[0].key, "PS3");
        assert_eq!(result.top_by_mean.len(), 1);
        assert_eq!(result.market_share.len(), 2);
        assert_eq!(result.market_share[1].key, "Others");
        assert_eq!(result.totals.total, 18.0);
    }

    #[test]
    fn test_missing_publisher_column_is_schema_unresolved() {
        let records = vec![record(0, 2010, "Wii", 1.0)];
        let refs: Vec<&CanonicalRecord> = records.iter().collect();
        let err = dimension_analysis(
            &refs,
            &caps(&["Platform", "Global_Sales"]),
            Analysis::Publisher,
            Dimension::Publisher,
            &AnalysisConfig::default(),
        )
        .unwrap_err();
        assert_eq!(err.error_code(), "SCHEMA_UNRESOLVED");
    }

    #[test]
    fn test_trend_needs_two_years() {
        let records = vec![record(0, 2010, "Wii", 1.0), record(1, 2010, "PS3", 2.0)];
        let refs: Vec<&CanonicalRecord> = records.iter().collect();
        let err = trend_analysis(
            &refs,
            &caps(&["Year", "Global_Sales"]),
            &AnalysisConfig::default(),
        )
        .unwrap_err();
        assert_eq!(err.error_code(), "INSUFFICIENT_DATA");
    }

    #[test]
    fn test_region_requires_region_columns() {
        let mut records = vec![record(0, 2010, "Wii", 1.0)];
        records[0].region_sales.insert(RegionTag::NA, 1.0);
        let refs: Vec<&CanonicalRecord> = records.iter().collect();

        let err = region_analysis(&refs, &caps(&["Global_Sales"])).unwrap_err();
        assert_eq!(err.error_code(), "SCHEMA_UNRESOLVED");

        let ok = region_analysis(&refs, &caps(&["NA_Sales"])).unwrap();
        assert_eq!(ok.breakdown.total(), 1.0);
    }
}
