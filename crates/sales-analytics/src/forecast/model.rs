//! Ordinary least squares of value on year.

use crate::error::{AnalyticsError, Result};
use crate::types::{YearValue, YearlySeries};
use serde::{Deserialize, Serialize};

/// Fitted `value = slope * year + intercept`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrendModel {
    pub slope: f64,
    pub intercept: f64,
    /// Coefficient of determination on the training series, in `[0, 1]`.
    pub r_squared: f64,
    pub first_year: i32,
    pub last_year: i32,
}

impl TrendModel {
    pub fn predict(&self, year: i32) -> f64 {
        self.slope * year as f64 + self.intercept
    }

    /// Exactly `horizon` consecutive years after `from_year`.
    ///
    /// Fails with `InvalidConfig` when the last forecast year does not fit
    /// in an `i32`.
    pub fn forecast(&self, from_year: i32, horizon: usize) -> Result<Vec<YearValue>> {
        let last_year = i32::try_from(horizon)
            .ok()
            .and_then(|h| from_year.checked_add(h))
            .ok_or_else(|| {
                AnalyticsError::InvalidConfig(format!(
                    "forecast horizon {} past {} overflows the year range",
                    horizon, from_year
                ))
            })?;

        Ok(((from_year + 1)..=last_year)
            .map(|year| YearValue::new(year, self.predict(year)))
            .collect())
    }

    /// The fitted line over historical years followed by forecast years.
    ///
    /// Years already covered are not repeated. The model is not refit.
    pub fn trend_line(
        &self,
        historical_years: impl IntoIterator<Item = i32>,
        forecast: &[YearValue],
    ) -> Vec<YearValue> {
        let mut years: Vec<i32> = historical_years.into_iter().collect();
        years.extend(forecast.iter().map(|p| p.year));
        years.sort_unstable();
        years.dedup();
        years
            .into_iter()
            .map(|year| YearValue::new(year, self.predict(year)))
            .collect()
    }
}

/// Fit a linear trend to a yearly series.
///
/// Sums are centered on the means of year and value. Fewer than two
/// distinct years is `InsufficientData`.
pub fn fit(series: &YearlySeries) -> Result<TrendModel> {
    let points = series.points();
    let (Some(first), Some(last)) = (points.first(), points.last()) else {
        return Err(AnalyticsError::insufficient_data(
            "trend",
            "series is empty",
        ));
    };
    if points.len() < 2 {
        return Err(AnalyticsError::insufficient_data(
            "trend",
            format!("need at least 2 distinct years, got {}", points.len()),
        ));
    }

    let n = points.len() as f64;
    let mean_x = points.iter().map(|p| p.year as f64).sum::<f64>() / n;
    let mean_y = points.iter().map(|p| p.value).sum::<f64>() / n;

    let (mut sxx, mut sxy, mut ss_tot) = (0.0, 0.0, 0.0);
    for p in points {
        let dx = p.year as f64 - mean_x;
        let dy = p.value - mean_y;
        sxx += dx * dx;
        sxy += dx * dy;
        ss_tot += dy * dy;
    }

    let slope = sxy / sxx;
    let intercept = mean_y - slope * mean_x;

    let ss_res: f64 = points
        .iter()
        .map(|p| {
            let residual = p.value - (slope * p.year as f64 + intercept);
            residual * residual
        })
        .sum();

    // Rounding noise on a constant series is on the order of eps * n * mean²
    let tolerance = f64::EPSILON * n * mean_y.abs().max(1.0).powi(2);
    let r_squared = if ss_tot <= tolerance {
        if ss_res <= tolerance { 1.0 } else { 0.0 }
    } else {
        (1.0 - ss_res / ss_tot).clamp(0.0, 1.0)
    };

    Ok(TrendModel {
        slope,
        intercept,
        r_squared,
        first_year: first.year,
        last_year: last.year,
    })
}

/// Free-function form of [`TrendModel::forecast`].
pub fn forecast(model: &TrendModel, from_year: i32, horizon: usize) -> Result<Vec<YearValue>> {
    model.forecast(from_year, horizon)
}
