//! Linear trend fitting and forecasting over yearly aggregates.

mod model;

pub use model::{TrendModel, fit, forecast};

use crate::error::Result;
use crate::types::{YearValue, YearlySeries};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::info;

/// Direction of a fitted trend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendDirection {
    Increasing,
    Decreasing,
    Flat,
}

impl TrendDirection {
    pub fn classify(slope: f64) -> Self {
        if slope > 0.0 {
            Self::Increasing
        } else if slope < 0.0 {
            Self::Decreasing
        } else {
            Self::Flat
        }
    }

    /// Two-way classification where a zero slope counts as decreasing.
    pub fn classify_legacy(slope: f64) -> Self {
        if slope > 0.0 {
            Self::Increasing
        } else {
            Self::Decreasing
        }
    }
}

impl fmt::Display for TrendDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Increasing => write!(f, "increasing"),
            Self::Decreasing => write!(f, "decreasing"),
            Self::Flat => write!(f, "flat"),
        }
    }
}

/// Everything derived from one fit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendForecast {
    pub model: TrendModel,
    pub historical: YearlySeries,
    pub forecast: Vec<YearValue>,
    pub trend_line: Vec<YearValue>,
    pub direction: TrendDirection,
    pub historical_mean: f64,
    pub forecast_mean: Option<f64>,
}

impl TrendForecast {
    /// Fit `historical` and forecast `horizon` years past its last year.
    pub fn build(historical: YearlySeries, horizon: usize, legacy_direction: bool) -> Result<Self> {
        let model = fit(&historical)?;
        let forecast = model.forecast(model.last_year, horizon)?;
        let trend_line = model.trend_line(historical.years(), &forecast);

        let direction = if legacy_direction {
            TrendDirection::classify_legacy(model.slope)
        } else {
            TrendDirection::classify(model.slope)
        };

        let historical_mean = historical.mean_value().unwrap_or_default();
        let forecast_mean = if forecast.is_empty() {
            None
        } else {
            Some(forecast.iter().map(|p| p.value).sum::<f64>() / forecast.len() as f64)
        };

        info!(
            "Trend over {}-{}: slope {:.4}, r² {:.4} ({})",
            model.first_year, model.last_year, model.slope, model.r_squared, direction
        );

        Ok(Self {
            model,
            historical,
            forecast,
            trend_line,
            direction,
            historical_mean,
            forecast_mean,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify() {
        assert_eq!(TrendDirection::classify(0.5), TrendDirection::Increasing);
        assert_eq!(TrendDirection::classify(-0.5), TrendDirection::Decreasing);
        assert_eq!(TrendDirection::classify(0.0), TrendDirection::Flat);
    }

    #[test]
    fn test_classify_legacy_zero_is_decreasing() {
        assert_eq!(TrendDirection::classify_legacy(0.0), TrendDirection::Decreasing);
        assert_eq!(TrendDirection::classify_legacy(1.0), TrendDirection::Increasing);
    }

    #[test]
    fn test_build_forecast_bundle() {
        let historical = YearlySeries::new(vec![
            YearValue::new(2020, 10.0),
            YearValue::new(2021, 20.0),
        ])
        .unwrap();

        let bundle = TrendForecast::build(historical, 5, false).unwrap();
        assert_eq!(bundle.direction, TrendDirection::Increasing);
        assert_eq!(bundle.forecast.len(), 5);
        assert_eq!(bundle.forecast[0].year, 2022);
        assert_eq!(bundle.trend_line.len(), 7);
        assert_eq!(bundle.historical_mean, 15.0);
        assert!((bundle.forecast_mean.unwrap() - 50.0).abs() < 1e-6);
    }

    #[test]
    fn test_build_propagates_insufficient_data() {
        let historical = YearlySeries::new(vec![YearValue::new(2020, 1.0)]).unwrap();
        let err = TrendForecast::build(historical, 5, false).unwrap_err();
        assert!(err.is_analysis_scoped());
    }
}
