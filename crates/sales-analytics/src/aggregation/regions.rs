//! Per-region totals.
//!
//! Regions are not a categorical column: each region has its own sales
//! column, so the breakdown sums each column independently instead of
//! grouping rows.

use super::groups::by_sum_desc;
use crate::types::{AggregateGroup, CanonicalRecord, RegionTag};
use serde::ser::{SerializeSeq, SerializeStruct};
use serde::{Serialize, Serializer};

/// One aggregate per resolved region.
#[derive(Debug, Clone, PartialEq)]
pub struct RegionBreakdown {
    regions: Vec<(RegionTag, AggregateGroup)>,
}

impl RegionBreakdown {
    /// Groups in descending order of sales.
    pub fn groups(&self) -> impl Iterator<Item = (RegionTag, &AggregateGroup)> {
        self.regions.iter().map(|(tag, group)| (*tag, group))
    }

    pub fn get(&self, tag: RegionTag) -> Option<&AggregateGroup> {
        self.regions
            .iter()
            .find(|(t, _)| *t == tag)
            .map(|(_, group)| group)
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    pub fn total(&self) -> f64 {
        self.regions.iter().map(|(_, g)| g.sum).sum()
    }

    /// Share of the total in percent. `None` for an unknown region or a
    /// zero total.
    pub fn share(&self, tag: RegionTag) -> Option<f64> {
        let total = self.total();
        if total <= 0.0 {
            return None;
        }
        self.get(tag).map(|g| g.sum / total * 100.0)
    }
}

/// Sum each region's sales column across all records carrying it.
///
/// Regions in `regions` with no values at all produce no group.
pub fn aggregate_regions<'a, I>(records: I, regions: &[RegionTag]) -> RegionBreakdown
where
    I: IntoIterator<Item = &'a CanonicalRecord>,
{
    let mut slots: Vec<(RegionTag, Option<AggregateGroup>)> =
        regions.iter().map(|tag| (*tag, None)).collect();

    for record in records {
        for (tag, slot) in &mut slots {
            let tag = *tag;
            if let Some(&value) = record.region_sales.get(&tag) {
                slot.get_or_insert_with(|| AggregateGroup::new(tag.prefix(), record.row))
                    .push(value);
            }
        }
    }

    let mut regions: Vec<(RegionTag, AggregateGroup)> = slots
        .into_iter()
        .filter_map(|(tag, group)| group.map(|g| (tag, g)))
        .collect();
    regions.sort_by(|(_, a), (_, b)| by_sum_desc(a, b));

    RegionBreakdown { regions }
}

struct RegionEntry<'a> {
    breakdown: &'a RegionBreakdown,
    tag: RegionTag,
    group: &'a AggregateGroup,
}

impl Serialize for RegionEntry<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("RegionEntry", 5)?;
        state.serialize_field("region", &self.tag)?;
        state.serialize_field("sum", &self.group.sum)?;
        state.serialize_field("count", &self.group.count)?;
        state.serialize_field("mean", &self.group.mean())?;
        state.serialize_field("share", &self.breakdown.share(self.tag))?;
        state.end()
    }
}

struct RegionEntries<'a>(&'a RegionBreakdown);

impl Serialize for RegionEntries<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.0.len()))?;
        for (tag, group) in self.0.groups() {
            seq.serialize_element(&RegionEntry {
                breakdown: self.0,
                tag,
                group,
            })?;
        }
        seq.end()
    }
}

impl Serialize for RegionBreakdown {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("RegionBreakdown", 2)?;
        state.serialize_field("total", &self.total())?;
        state.serialize_field("regions", &RegionEntries(self))?;
        state.end()
    }
}
