use crate::error::{AnalyticsError, Result};
use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

// ============================================================================
// Semantic fields
// ============================================================================

/// Regional sales buckets recognised in source tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RegionTag {
    NA,
    EU,
    JP,
    Other,
}

impl RegionTag {
    /// All region tags in canonical order.
    pub const ALL: [RegionTag; 4] = [RegionTag::NA, RegionTag::EU, RegionTag::JP, RegionTag::Other];

    /// Column prefix used by source tables (`NA_Sales`, `EU_Sales`, ...).
    pub fn prefix(&self) -> &'static str {
        match self {
            Self::NA => "NA",
            Self::EU => "EU",
            Self::JP => "JP",
            Self::Other => "Other",
        }
    }

    pub fn from_prefix(prefix: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|tag| tag.prefix() == prefix)
    }
}

impl fmt::Display for RegionTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.prefix())
    }
}

/// A field of the canonical record that may or may not be resolvable
/// from a given input table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SemanticField {
    Year,
    Genre,
    Platform,
    Publisher,
    TotalSales,
    RegionSales(RegionTag),
}

impl SemanticField {
    /// Canonical name of the field.
    pub fn name(&self) -> String {
        match self {
            Self::Year => "year".to_string(),
            Self::Genre => "genre".to_string(),
            Self::Platform => "platform".to_string(),
            Self::Publisher => "publisher".to_string(),
            Self::TotalSales => "total_sales".to_string(),
            Self::RegionSales(tag) => format!("{}_sales", tag.prefix().to_ascii_lowercase()),
        }
    }
}

impl fmt::Display for SemanticField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

/// Categorical dimension records can be grouped by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    Year,
    Genre,
    Platform,
    Publisher,
}

impl Dimension {
    pub fn field(&self) -> SemanticField {
        match self {
            Self::Year => SemanticField::Year,
            Self::Genre => SemanticField::Genre,
            Self::Platform => SemanticField::Platform,
            Self::Publisher => SemanticField::Publisher,
        }
    }
}

/// Numeric value being aggregated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Measure {
    TotalSales,
    RegionSales(RegionTag),
}

impl Measure {
    pub fn field(&self) -> SemanticField {
        match self {
            Self::TotalSales => SemanticField::TotalSales,
            Self::RegionSales(tag) => SemanticField::RegionSales(*tag),
        }
    }
}

// ============================================================================
// Canonical record
// ============================================================================

/// One input row mapped onto the canonical schema.
///
/// Every numeric field that is present holds a finite, non-negative value;
/// values that failed coercion are `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalRecord {
    /// Index of the source row in the raw table.
    pub row: usize,
    pub year: Option<i32>,
    pub genre: Option<String>,
    pub platform: Option<String>,
    pub publisher: Option<String>,
    pub region_sales: BTreeMap<RegionTag, f64>,
    pub total_sales: Option<f64>,
}

impl CanonicalRecord {
    /// Create an empty record for the given source row.
    pub fn new(row: usize) -> Self {
        Self {
            row,
            year: None,
            genre: None,
            platform: None,
            publisher: None,
            region_sales: BTreeMap::new(),
            total_sales: None,
        }
    }

    /// Whether the record carries a valid value for `field`.
    pub fn has(&self, field: SemanticField) -> bool {
        match field {
            SemanticField::Year => self.year.is_some(),
            SemanticField::Genre => self.genre.is_some(),
            SemanticField::Platform => self.platform.is_some(),
            SemanticField::Publisher => self.publisher.is_some(),
            SemanticField::TotalSales => self.total_sales.is_some(),
            SemanticField::RegionSales(tag) => self.region_sales.contains_key(&tag),
        }
    }

    /// Grouping key for a dimension.
    pub fn key(&self, dimension: Dimension) -> Option<String> {
        match dimension {
            Dimension::Year => self.year.map(|y| y.to_string()),
            Dimension::Genre => self.genre.clone(),
            Dimension::Platform => self.platform.clone(),
            Dimension::Publisher => self.publisher.clone(),
        }
    }

    /// Value of a measure.
    pub fn measure(&self, measure: Measure) -> Option<f64> {
        match measure {
            Measure::TotalSales => self.total_sales,
            Measure::RegionSales(tag) => self.region_sales.get(&tag).copied(),
        }
    }
}

// ============================================================================
// Aggregate group
// ============================================================================

/// Reduced bucket for one distinct value of a grouping dimension.
///
/// `mean` is never stored; it is derived from `sum` and `count` each time
/// it is read.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregateGroup {
    pub key: String,
    pub sum: f64,
    pub count: usize,
    /// Source row where the key first appeared. Used to break ties.
    pub first_row: usize,
}

impl AggregateGroup {
    pub fn new(key: impl Into<String>, first_row: usize) -> Self {
        Self {
            key: key.into(),
            sum: 0.0,
            count: 0,
            first_row,
        }
    }

    /// Add one value to the bucket.
    pub fn push(&mut self, value: f64) {
        self.sum += value;
        self.count += 1;
    }

    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.sum / self.count as f64
        }
    }
}

impl Serialize for AggregateGroup {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut state = serializer.serialize_struct("AggregateGroup", 4)?;
        state.serialize_field("key", &self.key)?;
        state.serialize_field("sum", &self.sum)?;
        state.serialize_field("count", &self.count)?;
        state.serialize_field("mean", &self.mean())?;
        state.end()
    }
}

// ============================================================================
// Yearly series
// ============================================================================

/// A `(year, value)` pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct YearValue {
    pub year: i32,
    pub value: f64,
}

impl YearValue {
    pub fn new(year: i32, value: f64) -> Self {
        Self { year, value }
    }
}

/// Points ordered by strictly increasing year, at most one per year.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct YearlySeries {
    points: Vec<YearValue>,
}

impl YearlySeries {
    /// Build a series, rejecting unsorted or duplicate years and
    /// non-finite values.
    pub fn new(points: Vec<YearValue>) -> Result<Self> {
        for pair in points.windows(2) {
            if pair[1].year <= pair[0].year {
                return Err(AnalyticsError::InvalidSeries(format!(
                    "year {} follows {}; years must be strictly increasing",
                    pair[1].year, pair[0].year
                )));
            }
        }
        if let Some(bad) = points.iter().find(|p| !p.value.is_finite()) {
            return Err(AnalyticsError::InvalidSeries(format!(
                "non-finite value for year {}",
                bad.year
            )));
        }
        Ok(Self { points })
    }

    pub fn points(&self) -> &[YearValue] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn years(&self) -> impl Iterator<Item = i32> + '_ {
        self.points.iter().map(|p| p.year)
    }

    pub fn first_year(&self) -> Option<i32> {
        self.points.first().map(|p| p.year)
    }

    pub fn last_year(&self) -> Option<i32> {
        self.points.last().map(|p| p.year)
    }

    /// Mean of the values, `None` for an empty series.
    pub fn mean_value(&self) -> Option<f64> {
        if self.points.is_empty() {
            return None;
        }
        Some(self.points.iter().map(|p| p.value).sum::<f64>() / self.points.len() as f64)
    }
}
