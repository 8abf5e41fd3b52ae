//! In-memory raw table: rows of untyped scalars keyed by column name.

use crate::error::{AnalyticsError, Result, ResultExt};
use crate::utils::is_numeric_dtype;
use polars::prelude::*;
use std::borrow::Cow;

/// A scalar of unknown type as read from the source.
#[derive(Debug, Clone, PartialEq)]
pub enum RawValue {
    Missing,
    Number(f64),
    Text(String),
}

impl RawValue {
    /// Render the value as text. Integral numbers render without a
    /// fractional part (`2600.0` becomes `"2600"`).
    pub fn as_text(&self) -> Option<Cow<'_, str>> {
        match self {
            Self::Missing => None,
            Self::Text(s) => Some(Cow::Borrowed(s.as_str())),
            Self::Number(v) if v.fract() == 0.0 && v.abs() < 1e15 => {
                Some(Cow::Owned(format!("{}", *v as i64)))
            }
            Self::Number(v) => Some(Cow::Owned(v.to_string())),
        }
    }
}

impl From<f64> for RawValue {
    fn from(v: f64) -> Self {
        Self::Number(v)
    }
}

impl From<&str> for RawValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl<T: Into<RawValue>> From<Option<T>> for RawValue {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Self::Missing)
    }
}

/// Ordered rows, each holding one [`RawValue`] per column.
///
/// Column names are kept exactly as they appear in the source, in source
/// order; nothing about their meaning is assumed here.
#[derive(Debug, Clone, PartialEq)]
pub struct RawTable {
    columns: Vec<String>,
    rows: Vec<Vec<RawValue>>,
}

impl RawTable {
    /// Build a table from column names and row-major values.
    pub fn new(columns: Vec<String>, rows: Vec<Vec<RawValue>>) -> Result<Self> {
        if let Some((idx, row)) = rows
            .iter()
            .enumerate()
            .find(|(_, row)| row.len() != columns.len())
        {
            return Err(AnalyticsError::MalformedTable(format!(
                "row {} has {} values but the table has {} columns",
                idx,
                row.len(),
                columns.len()
            )));
        }
        Ok(Self { columns, rows })
    }

    /// Convert a polars DataFrame into a raw table.
    ///
    /// Numeric columns become [`RawValue::Number`] (NaN counts as missing),
    /// every other dtype is rendered as text.
    pub fn from_dataframe(df: &DataFrame) -> Result<Self> {
        let height = df.height();
        let mut columns = Vec::with_capacity(df.width());
        let mut values_by_column: Vec<Vec<RawValue>> = Vec::with_capacity(df.width());

        for column in df.get_columns() {
            let series = column.as_materialized_series();
            let name = series.name().to_string();
            let values = series_to_raw_values(series)
                .context(format!("Failed to read column '{}'", name))?;
            columns.push(name);
            values_by_column.push(values);
        }

        let mut rows: Vec<Vec<RawValue>> = (0..height)
            .map(|_| Vec::with_capacity(columns.len()))
            .collect();
        for values in values_by_column {
            for (row, value) in rows.iter_mut().zip(values) {
                row.push(value);
            }
        }

        Ok(Self { columns, rows })
    }

    pub fn column_names(&self) -> &[String] {
        &self.columns
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }

    pub fn width(&self) -> usize {
        self.columns.len()
    }

    pub fn rows(&self) -> impl Iterator<Item = &[RawValue]> {
        self.rows.iter().map(Vec::as_slice)
    }
}

fn series_to_raw_values(series: &Series) -> PolarsResult<Vec<RawValue>> {
    if is_numeric_dtype(series.dtype()) {
        let floats = series.cast(&DataType::Float64)?;
        return Ok(floats
            .f64()?
            .into_iter()
            .map(|v| match v {
                Some(v) if !v.is_nan() => RawValue::Number(v),
                _ => RawValue::Missing,
            })
            .collect());
    }

    let strings = series.cast(&DataType::String)?;
    Ok(strings
        .str()?
        .into_iter()
        .map(|v| match v {
            Some(s) => RawValue::Text(s.to_string()),
            None => RawValue::Missing,
        })
        .collect())
}
