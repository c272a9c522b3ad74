//! Aggregation orchestration: validate dimension specs, run the map stage,
//! wait at the join barrier, and reduce partials by dimension tag.
//!
//! Partials are never partitioned by position; every partial carries its
//! dimension tag and reduce groups by that tag, so interleaved results from
//! chunked strategies cannot be misassigned.

use std::collections::{HashMap, HashSet};
use std::time::Instant;

use tracing::debug;

use crate::config::AggregationConfig;
use crate::data::UsageRecord;
use crate::dimension::{DimensionSpec, Measure};
use crate::errors::RollupError;
use crate::executor::run_map_stage;
use crate::totals::{GroupTotals, TaggedTotals, reduce_tagged};
use crate::types::DimensionName;

/// One dimension's outcome: final totals plus skip accounting.
#[derive(Clone, Debug)]
pub struct DimensionRollup {
    /// Dimension name, copied from the producing spec.
    pub name: DimensionName,
    /// Measure the dimension summed.
    pub measure: Measure,
    /// Fully reduced key → sum mapping.
    pub totals: GroupTotals,
    /// Records dropped by the mapper skip-and-count policy.
    pub skipped_records: usize,
}

/// Run a full map/reduce aggregation over `records`.
///
/// Returns one rollup per spec, preserving spec order. Configuration errors
/// surface before any task is spawned; a panicking worker surfaces as
/// `WorkerPanicked` after the join barrier resolves. No partial result is
/// ever returned alongside an error.
pub fn aggregate(
    records: &[UsageRecord],
    specs: &[DimensionSpec],
    config: &AggregationConfig,
) -> Result<Vec<DimensionRollup>, RollupError> {
    validate_specs(specs)?;

    let started = Instant::now();
    let partials = run_map_stage(records, specs, config)?;
    let task_count = partials.len();
    let merged = reduce_tagged(partials);

    let mut by_name: HashMap<DimensionName, TaggedTotals> = merged
        .into_iter()
        .map(|tagged| (tagged.dimension.clone(), tagged))
        .collect();
    let rollups = specs
        .iter()
        .map(|spec| {
            let tagged = by_name
                .remove(spec.name.as_ref())
                .unwrap_or_else(|| TaggedTotals::new(spec.name.as_ref()));
            DimensionRollup {
                name: tagged.dimension,
                measure: spec.measure,
                totals: tagged.totals,
                skipped_records: tagged.skipped,
            }
        })
        .collect::<Vec<_>>();

    debug!(
        record_count = records.len(),
        dimensions = specs.len(),
        task_count,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "aggregation run completed"
    );
    Ok(rollups)
}

fn validate_specs(specs: &[DimensionSpec]) -> Result<(), RollupError> {
    let mut seen = HashSet::with_capacity(specs.len());
    for spec in specs {
        spec.validate()?;
        if !seen.insert(spec.name.as_ref()) {
            return Err(RollupError::Configuration(format!(
                "duplicate dimension name '{}'",
                spec.name
            )));
        }
    }
    Ok(())
}
