//! Partial and final group totals plus the reduce stage.
//!
//! Ownership model:
//! - A `GroupTotals` built by a map task is private to that task and is never
//!   mutated after it is handed to reduce.
//! - `reduce` merges any number of partials by key-wise addition; addition is
//!   commutative and associative, so merge order never changes the result.
//! - `reduce_tagged` groups partials by dimension tag first and reduces each
//!   group independently, preserving first-appearance tag order.

use std::collections::HashMap;
use std::collections::hash_map;

use indexmap::IndexMap;

use crate::types::{DimensionName, GroupKey};

/// Key → accumulated sum mapping, used for per-task partials and reduced
/// finals alike.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GroupTotals {
    totals: HashMap<GroupKey, f64>,
}

impl GroupTotals {
    /// Create an empty totals map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `value` into `key`'s running sum.
    pub fn add(&mut self, key: GroupKey, value: f64) {
        *self.totals.entry(key).or_insert(0.0) += value;
    }

    /// Fold another partial into this one, summing shared keys.
    pub fn merge(&mut self, other: GroupTotals) {
        for (key, value) in other.totals {
            *self.totals.entry(key).or_insert(0.0) += value;
        }
    }

    /// Accumulated sum for `key`, if any record mapped to it.
    pub fn get(&self, key: &str) -> Option<f64> {
        self.totals.get(key).copied()
    }

    /// Number of distinct group keys.
    pub fn len(&self) -> usize {
        self.totals.len()
    }

    /// Returns `true` when no record contributed.
    pub fn is_empty(&self) -> bool {
        self.totals.is_empty()
    }

    /// Sum of all group totals.
    pub fn grand_total(&self) -> f64 {
        self.totals.values().sum()
    }

    /// Iterate over (key, sum) entries in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = (&GroupKey, f64)> {
        self.totals.iter().map(|(key, value)| (key, *value))
    }

    /// Consume into the underlying map.
    pub fn into_inner(self) -> HashMap<GroupKey, f64> {
        self.totals
    }
}

impl FromIterator<(GroupKey, f64)> for GroupTotals {
    fn from_iter<I: IntoIterator<Item = (GroupKey, f64)>>(iter: I) -> Self {
        let mut totals = GroupTotals::new();
        for (key, value) in iter {
            totals.add(key, value);
        }
        totals
    }
}

impl IntoIterator for GroupTotals {
    type Item = (GroupKey, f64);
    type IntoIter = hash_map::IntoIter<GroupKey, f64>;

    fn into_iter(self) -> Self::IntoIter {
        self.totals.into_iter()
    }
}

/// A partial tagged with the dimension that produced it.
///
/// Tags make the reduce grouping explicit: partials from different dimensions
/// can be interleaved arbitrarily without ambiguity.
#[derive(Clone, Debug)]
pub struct TaggedTotals {
    /// Dimension tag used for grouping during reduce.
    pub dimension: DimensionName,
    /// Key → sum partial owned by one finished task.
    pub totals: GroupTotals,
    /// Records the producing task skipped under the mapper policy.
    pub skipped: usize,
}

impl TaggedTotals {
    /// Create an empty tagged partial for `dimension`.
    pub fn new(dimension: impl Into<DimensionName>) -> Self {
        Self {
            dimension: dimension.into(),
            totals: GroupTotals::new(),
            skipped: 0,
        }
    }
}

/// Merge partials into one final mapping.
///
/// Zero partials produce an empty result, not an error.
pub fn reduce<I>(partials: I) -> GroupTotals
where
    I: IntoIterator<Item = GroupTotals>,
{
    let mut merged = GroupTotals::new();
    for partial in partials {
        merged.merge(partial);
    }
    merged
}

/// Group tagged partials by dimension and reduce each group independently.
///
/// Returns one merged `TaggedTotals` per distinct tag, in first-appearance
/// order; per-tag skip counts are summed alongside the totals.
pub fn reduce_tagged<I>(partials: I) -> Vec<TaggedTotals>
where
    I: IntoIterator<Item = TaggedTotals>,
{
    let mut merged: IndexMap<DimensionName, TaggedTotals> = IndexMap::new();
    for partial in partials {
        match merged.entry(partial.dimension.clone()) {
            indexmap::map::Entry::Occupied(mut entry) => {
                let slot = entry.get_mut();
                slot.totals.merge(partial.totals);
                slot.skipped += partial.skipped;
            }
            indexmap::map::Entry::Vacant(entry) => {
                entry.insert(partial);
            }
        }
    }
    merged.into_values().collect()
}
