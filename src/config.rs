use crate::constants::executor::MIN_CHUNK_LEN;

/// How the map stage partitions work across concurrent tasks.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PartitionStrategy {
    /// One task per dimension over the entire record set; each task owns a
    /// private accumulator merged at the join barrier.
    #[default]
    PerDimension,
    /// Bounded worker pool over contiguous record chunks, one private
    /// accumulator per chunk, merged at the join barrier.
    Chunked,
    /// Bounded worker pool over contiguous record chunks folding into one
    /// mutex-guarded shared accumulator.
    ///
    /// Kept for workloads that want a single live accumulator; `Chunked`
    /// avoids lock contention on the hot path and is the better default.
    SharedMap,
}

/// Top-level aggregation configuration.
#[derive(Clone, Debug)]
pub struct AggregationConfig {
    /// Partitioning strategy for the map stage.
    pub strategy: PartitionStrategy,
    /// Worker cap for chunked strategies; `0` means available parallelism.
    ///
    /// The effective worker count is additionally bounded by the record
    /// count, so small inputs never fan out one task per record.
    pub max_workers: usize,
    /// Smallest record chunk worth its own worker.
    pub min_chunk_len: usize,
}

impl Default for AggregationConfig {
    fn default() -> Self {
        Self {
            strategy: PartitionStrategy::PerDimension,
            max_workers: 0,
            min_chunk_len: MIN_CHUNK_LEN,
        }
    }
}

impl AggregationConfig {
    /// Config using the given strategy with default worker sizing.
    pub fn with_strategy(strategy: PartitionStrategy) -> Self {
        Self {
            strategy,
            ..Self::default()
        }
    }

    /// Override the worker cap (`0` restores available-parallelism sizing).
    pub fn with_max_workers(mut self, max_workers: usize) -> Self {
        self.max_workers = max_workers;
        self
    }
}
