//! Group-by reduction and rankings over aggregate groups.

use crate::types::{AggregateGroup, CanonicalRecord, Dimension, Measure};
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::HashMap;
use tracing::debug;

/// Label of the synthetic group produced by [`top_k_with_others`].
pub const OTHERS_KEY: &str = "Others";

/// Descending by sum, ties by first appearance.
pub(crate) fn by_sum_desc(a: &AggregateGroup, b: &AggregateGroup) -> Ordering {
    b.sum
        .total_cmp(&a.sum)
        .then_with(|| a.first_row.cmp(&b.first_row))
}

/// Group records by `dimension` and reduce `measure`.
///
/// Records missing the key or the measure are skipped. Keys compare
/// exactly. The result is ordered descending by sum with ties broken by
/// the row where each key first appeared, so the order is reproducible
/// for a given input.
pub fn aggregate<'a, I>(records: I, dimension: Dimension, measure: Measure) -> Vec<AggregateGroup>
where
    I: IntoIterator<Item = &'a CanonicalRecord>,
{
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut groups: Vec<AggregateGroup> = Vec::new();
    let mut skipped = 0usize;

    for record in records {
        let (Some(key), Some(value)) = (record.key(dimension), record.measure(measure)) else {
            skipped += 1;
            continue;
        };

        let slot = match index.get(&key) {
            Some(&slot) => slot,
            None => {
                groups.push(AggregateGroup::new(key.clone(), record.row));
                index.insert(key, groups.len() - 1);
                groups.len() - 1
            }
        };
        groups[slot].push(value);
    }

    groups.sort_by(by_sum_desc);

    debug!(
        "Aggregated {:?}/{:?}: {} groups, {} records skipped",
        dimension,
        measure,
        groups.len(),
        skipped
    );

    groups
}

/// Keep the first `k` groups and merge the rest into an `"Others"` group.
///
/// No `"Others"` group is emitted when nothing is left over.
pub fn top_k_with_others(groups: &[AggregateGroup], k: usize) -> Vec<AggregateGroup> {
    let split = k.min(groups.len());
    let (head, tail) = groups.split_at(split);
    let mut result = head.to_vec();

    if let Some(first) = tail.first() {
        let mut others = AggregateGroup::new(OTHERS_KEY, first.first_row);
        for group in tail {
            others.sum += group.sum;
            others.count += group.count;
            others.first_row = others.first_row.min(group.first_row);
        }
        result.push(others);
    }

    result
}

/// Rank groups by mean, excluding groups with fewer than `min_count`
/// members from this ranking only.
pub fn rank_by_mean(groups: &[AggregateGroup], min_count: usize) -> Vec<AggregateGroup> {
    let mut ranked: Vec<AggregateGroup> = groups
        .iter()
        .filter(|g| g.count >= min_count)
        .cloned()
        .collect();
    ranked.sort_by(|a, b| b.mean().total_cmp(&a.mean()));
    ranked
}

/// Rank groups by member count, stable.
pub fn rank_by_count(groups: &[AggregateGroup]) -> Vec<AggregateGroup> {
    let mut ranked = groups.to_vec();
    ranked.sort_by(|a, b| b.count.cmp(&a.count));
    ranked
}

/// Summary over a set of groups.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupTotals {
    pub groups: usize,
    pub records: usize,
    pub total: f64,
    /// Average sum per group.
    pub mean_per_group: f64,
}

impl GroupTotals {
    pub fn from_groups(groups: &[AggregateGroup]) -> Self {
        let total: f64 = groups.iter().map(|g| g.sum).sum();
        let mean_per_group = if groups.is_empty() {
            0.0
        } else {
            total / groups.len() as f64
        };
        Self {
            groups: groups.len(),
            records: groups.iter().map(|g| g.count).sum(),
            total,
            mean_per_group,
        }
    }
}
