#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

/// Aggregation configuration types.
pub mod config;
/// Centralized constants used across dimensions, executor, sources, and reports.
pub mod constants;
/// Usage record payload types.
pub mod data;
/// Aggregation dimension specs (measures + groupings).
pub mod dimension;
/// Reusable demo runners shared by downstream binaries.
pub mod example_apps;
/// Parallel map-stage execution strategies.
pub mod executor;
/// Aggregate share metrics helpers.
pub mod metrics;
/// Period (YYYYMM) encoding helpers.
pub mod period;
/// Report sorting and rendering.
pub mod report;
/// Aggregation orchestration (map, join barrier, reduce).
pub mod rollup;
/// Record source traits and built-in sources.
pub mod source;
/// Partial and final group totals plus the reduce stage.
pub mod totals;
/// Shared type aliases.
pub mod types;

mod errors;

pub use config::{AggregationConfig, PartitionStrategy};
pub use data::UsageRecord;
pub use dimension::{DimensionSpec, Grouping, Measure, RegionLevel};
pub use errors::RollupError;
pub use report::{ReportFormat, SortOrder};
pub use rollup::{DimensionRollup, aggregate};
pub use source::{
    CsvDirSource, CsvSource, CsvSourceConfig, InMemorySource, LoadSnapshot, MalformedRowPolicy,
    RecordSource, SyntheticSource,
};
pub use totals::{GroupTotals, TaggedTotals, reduce, reduce_tagged};
pub use types::{DimensionName, GroupKey, Period, RowIndex, SourceId};
