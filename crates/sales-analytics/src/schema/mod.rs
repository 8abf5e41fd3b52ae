//! Schema normalization.
//!
//! This module turns a source table with arbitrary column naming into a
//! stream of [`CanonicalRecord`](crate::types::CanonicalRecord)s:
//! - [`RawTable`]: rows of untyped scalars, built from a polars `DataFrame`
//! - [`ColumnResolution`]: first-match alias resolution, computed once per run
//! - [`Capabilities`]: which semantic fields the table can provide
//! - [`Normalizer`]: per-row coercion with parse-failure accounting

mod aliases;
mod normalizer;
mod raw_table;

pub use aliases::{
    Capabilities, ColumnResolution, GENRE_ALIASES, PLATFORM_ALIASES, PUBLISHER_ALIASES,
    RELEASE_DATE_ALIASES, TOTAL_SALES_ALIASES, YEAR_ALIASES, YearSource, resolve_columns,
};
pub use normalizer::{NormalizedTable, Normalizer};
pub use raw_table::{RawTable, RawValue};
