//! Aggregation over canonical records.
//!
//! - [`aggregate`]: group by a dimension, reduce a measure into sum/count
//! - [`top_k_with_others`]: market-share view with an `"Others"` bucket
//! - [`rank_by_mean`] / [`rank_by_count`]: alternative rankings
//! - [`aggregate_regions`]: independent per-region column totals
//! - [`yearly_series`]: per-year totals feeding the forecaster
//! - [`sales_distribution`]: histogram of per-record sales
//!
//! All functions take records in source order and produce the same output
//! for the same input.

mod distribution;
mod groups;
mod regions;
mod series;

pub use distribution::{HistogramBin, SalesDistribution, sales_distribution};
pub use groups::{GroupTotals, OTHERS_KEY, aggregate, rank_by_count, rank_by_mean, top_k_with_others};
pub use regions::{RegionBreakdown, aggregate_regions};
pub use series::yearly_series;
