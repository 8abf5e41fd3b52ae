//! Column alias tables and the first-match resolver.
//!
//! Source files name the same concept differently (`Global_Sales`,
//! `total_sales`, `global_sales`, ...). Each semantic field has a fixed
//! priority list; the first alias present in the table wins. Matching is
//! exact and case-sensitive.

use crate::error::{AnalyticsError, Result};
use crate::types::{RegionTag, SemanticField};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

pub const YEAR_ALIASES: &[&str] = &["Year"];
pub const RELEASE_DATE_ALIASES: &[&str] = &["release_date"];
pub const TOTAL_SALES_ALIASES: &[&str] = &["Global_Sales", "total_sales", "global_sales"];
pub const GENRE_ALIASES: &[&str] = &["Genre", "genre"];
pub const PLATFORM_ALIASES: &[&str] = &["Platform", "platform", "console"];
pub const PUBLISHER_ALIASES: &[&str] = &["Publisher", "publisher"];

// Region sales columns: NA_Sales, EU_Sales, JP_Sales, Other_Sales, ...
static REGION_COLUMN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(NA|EU|JP|Other)_.*Sales$").expect("Invalid regex: region sales"));

/// Where the year of a record comes from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "column", rename_all = "snake_case")]
pub enum YearSource {
    /// A direct year column.
    Column(String),
    /// A release-date column the year is derived from.
    ReleaseDate(String),
}

impl YearSource {
    pub fn column(&self) -> &str {
        match self {
            Self::Column(c) | Self::ReleaseDate(c) => c,
        }
    }
}

/// Source column chosen for each semantic field, if any.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ColumnResolution {
    pub year: Option<YearSource>,
    pub genre: Option<String>,
    pub platform: Option<String>,
    pub publisher: Option<String>,
    pub total_sales: Option<String>,
    pub regions: BTreeMap<RegionTag, String>,
}

impl ColumnResolution {
    /// Resolve every semantic field against the table's column set.
    pub fn resolve(columns: &[String]) -> Self {
        let year = first_match(YEAR_ALIASES, columns)
            .map(YearSource::Column)
            .or_else(|| first_match(RELEASE_DATE_ALIASES, columns).map(YearSource::ReleaseDate));

        let mut regions = BTreeMap::new();
        for column in columns {
            if let Some(caps) = REGION_COLUMN.captures(column)
                && let Some(tag) = RegionTag::from_prefix(&caps[1])
            {
                regions.entry(tag).or_insert_with(|| column.clone());
            }
        }

        Self {
            year,
            genre: first_match(GENRE_ALIASES, columns),
            platform: first_match(PLATFORM_ALIASES, columns),
            publisher: first_match(PUBLISHER_ALIASES, columns),
            total_sales: first_match(TOTAL_SALES_ALIASES, columns),
            regions,
        }
    }

    /// The set of fields that were resolved.
    pub fn capabilities(&self) -> Capabilities {
        let mut fields = BTreeSet::new();
        if self.year.is_some() {
            fields.insert(SemanticField::Year);
        }
        if self.genre.is_some() {
            fields.insert(SemanticField::Genre);
        }
        if self.platform.is_some() {
            fields.insert(SemanticField::Platform);
        }
        if self.publisher.is_some() {
            fields.insert(SemanticField::Publisher);
        }
        if self.total_sales.is_some() {
            fields.insert(SemanticField::TotalSales);
        }
        for tag in self.regions.keys() {
            fields.insert(SemanticField::RegionSales(*tag));
        }
        Capabilities { fields }
    }
}

/// Resolve every semantic field against a table's column names.
pub fn resolve_columns(columns: &[String]) -> ColumnResolution {
    ColumnResolution::resolve(columns)
}

fn first_match(aliases: &[&str], columns: &[String]) -> Option<String> {
    aliases
        .iter()
        .find(|alias| columns.iter().any(|c| c == *alias))
        .map(|alias| alias.to_string())
}

/// Semantic fields resolvable for a whole table.
///
/// Gates which analyses can run: a missing field is reported as
/// [`AnalyticsError::SchemaUnresolved`] rather than an empty result.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Capabilities {
    fields: BTreeSet<SemanticField>,
}

impl Capabilities {
    pub fn contains(&self, field: SemanticField) -> bool {
        self.fields.contains(&field)
    }

    pub fn fields(&self) -> impl Iterator<Item = SemanticField> + '_ {
        self.fields.iter().copied()
    }

    /// Region tags with a resolved sales column, in canonical order.
    pub fn regions(&self) -> Vec<RegionTag> {
        self.fields
            .iter()
            .filter_map(|f| match f {
                SemanticField::RegionSales(tag) => Some(*tag),
                _ => None,
            })
            .collect()
    }

    /// Fail with `SchemaUnresolved` if `field` is absent.
    pub fn require(&self, field: SemanticField, analysis: &str) -> Result<()> {
        if self.contains(field) {
            Ok(())
        } else {
            Err(AnalyticsError::schema_unresolved(field.name(), analysis))
        }
    }

    /// Fail on the first absent field of `fields`.
    pub fn require_all(&self, fields: &[SemanticField], analysis: &str) -> Result<()> {
        fields.iter().try_for_each(|f| self.require(*f, analysis))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cols(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_sales_alias_fallback_order() {
        let resolution = resolve_columns(&cols(&["title", "total_sales", "genre"]));
        assert_eq!(resolution.total_sales.as_deref(), Some("total_sales"));

        let resolution =
            ColumnResolution::resolve(&cols(&["global_sales", "total_sales", "Global_Sales"]));
        assert_eq!(resolution.total_sales.as_deref(), Some("Global_Sales"));
    }

    #[test]
    fn test_aliases_are_case_sensitive() {
        let resolution = ColumnResolution::resolve(&cols(&["GLOBAL_SALES", "GENRE"]));
        assert_eq!(resolution.total_sales, None);
        assert_eq!(resolution.genre, None);
        assert!(!resolution.capabilities().contains(SemanticField::TotalSales));
    }

    #[test]
    fn test_year_prefers_direct_column() {
        let resolution = ColumnResolution::resolve(&cols(&["release_date", "Year"]));
        assert_eq!(resolution.year, Some(YearSource::Column("Year".to_string())));

        let resolution = ColumnResolution::resolve(&cols(&["release_date"]));
        assert_eq!(
            resolution.year,
            Some(YearSource::ReleaseDate("release_date".to_string()))
        );
    }

    #[test]
    fn test_platform_console_alias() {
        let resolution = ColumnResolution::resolve(&cols(&["console", "publisher"]));
        assert_eq!(resolution.platform.as_deref(), Some("console"));
        assert_eq!(resolution.publisher.as_deref(), Some("publisher"));
    }

    #[test]
    fn test_region_columns() {
        let resolution = ColumnResolution::resolve(&cols(&[
            "NA_Sales",
            "EU_Sales",
            "JP_Sales",
            "Other_Sales",
            "na_sales",
            "PAL_Sales",
        ]));
        assert_eq!(resolution.regions.len(), 4);
        assert_eq!(resolution.regions[&RegionTag::NA], "NA_Sales");
        assert_eq!(
            resolution.capabilities().regions(),
            vec![RegionTag::NA, RegionTag::EU, RegionTag::JP, RegionTag::Other]
        );
    }

    #[test]
    fn test_require_reports_missing_field() {
        let caps = ColumnResolution::resolve(&cols(&["Genre"])).capabilities();
        assert!(caps.require(SemanticField::Genre, "genre").is_ok());

        let err = caps
            .require_all(&[SemanticField::Genre, SemanticField::TotalSales], "genre")
            .unwrap_err();
        assert_eq!(err.error_code(), "SCHEMA_UNRESOLVED");
        assert!(err.to_string().contains("total_sales"));
    }
}
