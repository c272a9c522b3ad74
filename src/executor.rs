//! Parallel map stage: fan mapping work out across bounded tasks and collect
//! one tagged partial per finished task.
//!
//! Contract notes:
//! - Every record is processed by exactly one task per active dimension; no
//!   contribution is lost or duplicated.
//! - The stage blocks its caller until all tasks finish (fork-join barrier).
//!   A panicking worker is converted into `RollupError::WorkerPanicked` at
//!   the join; the barrier always resolves.
//! - Partials returned here are per-task; the reduce stage merges them. The
//!   shared-map strategy is the exception: its tasks fold into one
//!   mutex-guarded accumulator, so it yields one partial per dimension.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;

use rayon::prelude::*;
use tracing::debug;

use crate::config::{AggregationConfig, PartitionStrategy};
use crate::constants::executor::FALLBACK_WORKERS;
use crate::data::UsageRecord;
use crate::dimension::DimensionSpec;
use crate::errors::RollupError;
use crate::totals::{GroupTotals, TaggedTotals};

/// Run the map stage over `records` under the configured strategy.
///
/// Returns the raw per-task partials (multiple per dimension for chunked
/// strategies); callers reduce them by tag.
pub fn run_map_stage(
    records: &[UsageRecord],
    specs: &[DimensionSpec],
    config: &AggregationConfig,
) -> Result<Vec<TaggedTotals>, RollupError> {
    match config.strategy {
        PartitionStrategy::PerDimension => map_per_dimension(records, specs),
        PartitionStrategy::Chunked => map_chunked(records, specs, config),
        PartitionStrategy::SharedMap => map_shared(records, specs, config),
    }
}

/// One scoped task per dimension over the entire record set.
fn map_per_dimension(
    records: &[UsageRecord],
    specs: &[DimensionSpec],
) -> Result<Vec<TaggedTotals>, RollupError> {
    thread::scope(|scope| {
        let mut handles = Vec::with_capacity(specs.len());
        for spec in specs {
            handles.push((spec, scope.spawn(move || map_slice(spec, records))));
        }
        // Join every handle before reporting, so no panic escapes the scope.
        let mut partials = Vec::with_capacity(handles.len());
        let mut panicked = None;
        for (spec, handle) in handles {
            match handle.join() {
                Ok(partial) => partials.push(partial),
                Err(_) => panicked = panicked.or_else(|| Some(spec.name.to_string())),
            }
        }
        match panicked {
            Some(dimension) => Err(RollupError::WorkerPanicked { dimension }),
            None => Ok(partials),
        }
    })
}

/// Bounded pool over contiguous chunks; private accumulator per chunk.
fn map_chunked(
    records: &[UsageRecord],
    specs: &[DimensionSpec],
    config: &AggregationConfig,
) -> Result<Vec<TaggedTotals>, RollupError> {
    if records.is_empty() || specs.is_empty() {
        return Ok(Vec::new());
    }
    let workers = bounded_worker_count(
        config.max_workers,
        available_workers(),
        records.len(),
        config.min_chunk_len,
    );
    let chunk_len = records.len().div_ceil(workers);
    debug!(
        workers,
        chunk_len,
        record_count = records.len(),
        "chunked map stage starting"
    );
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(workers)
        .build()
        .map_err(|err| RollupError::Configuration(format!("worker pool: {err}")))?;

    let mut partials = Vec::with_capacity(specs.len() * workers);
    for spec in specs {
        let chunked = panic::catch_unwind(AssertUnwindSafe(|| {
            pool.install(|| {
                records
                    .par_chunks(chunk_len)
                    .map(|slice| map_slice(spec, slice))
                    .collect::<Vec<_>>()
            })
        }))
        .map_err(|_| RollupError::WorkerPanicked {
            dimension: spec.name.to_string(),
        })?;
        partials.extend(chunked);
    }
    Ok(partials)
}

/// Bounded scoped workers folding into one mutex-guarded accumulator.
///
/// Every read-modify-write happens under the lock; the guard is released on
/// unwind, and a poisoned accumulator surfaces as `WorkerPanicked` instead of
/// leaving the join barrier unsatisfied.
fn map_shared(
    records: &[UsageRecord],
    specs: &[DimensionSpec],
    config: &AggregationConfig,
) -> Result<Vec<TaggedTotals>, RollupError> {
    let workers = bounded_worker_count(
        config.max_workers,
        available_workers(),
        records.len(),
        config.min_chunk_len,
    );
    let chunk_len = records.len().div_ceil(workers).max(1);

    let mut partials = Vec::with_capacity(specs.len());
    for spec in specs {
        let shared = Mutex::new(GroupTotals::new());
        let skipped = AtomicUsize::new(0);

        let panicked = thread::scope(|scope| {
            let mut handles = Vec::with_capacity(workers);
            for slice in records.chunks(chunk_len) {
                let shared = &shared;
                let skipped = &skipped;
                handles.push(scope.spawn(move || {
                    for record in slice {
                        match spec.map_record(record) {
                            Ok((key, value)) => {
                                let mut guard =
                                    shared.lock().expect("shared accumulator poisoned");
                                guard.add(key, value);
                            }
                            Err(_) => {
                                skipped.fetch_add(1, Ordering::Relaxed);
                            }
                        }
                    }
                }));
            }
            handles
                .into_iter()
                .fold(false, |panicked, handle| handle.join().is_err() || panicked)
        });
        if panicked {
            return Err(RollupError::WorkerPanicked {
                dimension: spec.name.to_string(),
            });
        }

        let totals = shared
            .into_inner()
            .map_err(|_| RollupError::WorkerPanicked {
                dimension: spec.name.to_string(),
            })?;
        partials.push(TaggedTotals {
            dimension: spec.name.to_string(),
            totals,
            skipped: skipped.into_inner(),
        });
    }
    Ok(partials)
}

/// Map a record slice into a private tagged partial.
///
/// Mapper errors follow the skip-and-count policy; they never abort the task.
fn map_slice(spec: &DimensionSpec, records: &[UsageRecord]) -> TaggedTotals {
    let mut partial = TaggedTotals::new(spec.name.as_ref());
    for record in records {
        match spec.map_record(record) {
            Ok((key, value)) => partial.totals.add(key, value),
            Err(_) => partial.skipped += 1,
        }
    }
    partial
}

/// Effective worker count for a chunked run.
///
/// Bounded by available parallelism, by `cap` when non-zero, and by
/// `ceil(record_count / min_chunk_len)` so small inputs never fan out one
/// task per record. Always at least 1.
pub fn bounded_worker_count(
    cap: usize,
    available: usize,
    record_count: usize,
    min_chunk_len: usize,
) -> usize {
    let by_records = record_count.div_ceil(min_chunk_len.max(1)).max(1);
    let mut workers = available.max(1).min(by_records);
    if cap > 0 {
        workers = workers.min(cap);
    }
    workers.max(1)
}

fn available_workers() -> usize {
    thread::available_parallelism()
        .map(std::num::NonZeroUsize::get)
        .unwrap_or(FALLBACK_WORKERS)
}
