//! Aggregation dimension specs: the mapping side of a rollup run.
//!
//! A `DimensionSpec` is a pure description of one logical aggregation: which
//! numeric field to read and how to derive a group key from a record. Mapping
//! never touches shared state or I/O; the executor applies specs to records
//! from concurrent tasks.

use std::borrow::Cow;

use crate::constants::dimension::{
    DEFAULT_BILLING_BUCKET, DEFAULT_CONSUMPTION_BUCKET, DIM_BILLING_RANGES, DIM_CONSUMPTION_RANGES,
};
use crate::constants::report::{UNIT_CURRENCY, UNIT_KWH};
use crate::data::UsageRecord;
use crate::errors::RollupError;
use crate::types::GroupKey;

/// Numeric record field summed by a dimension.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Measure {
    /// Metered consumption (`consumption_kwh`).
    Consumption,
    /// Billed amount (`billing`).
    Billing,
}

impl Measure {
    /// Raw field value for `record`.
    pub fn value_of(&self, record: &UsageRecord) -> f64 {
        match self {
            Measure::Consumption => record.consumption_kwh,
            Measure::Billing => record.billing,
        }
    }

    /// Field name used in errors and logs.
    pub const fn field_name(&self) -> &'static str {
        match self {
            Measure::Consumption => "consumption_kwh",
            Measure::Billing => "billing",
        }
    }

    /// Short measure label used in derived dimension names.
    pub const fn label(&self) -> &'static str {
        match self {
            Measure::Consumption => "consumption",
            Measure::Billing => "billing",
        }
    }

    /// Unit label used by stock report formats.
    pub const fn unit_label(&self) -> &'static str {
        match self {
            Measure::Consumption => UNIT_KWH,
            Measure::Billing => UNIT_CURRENCY,
        }
    }
}

/// Region hierarchy level used by category groupings.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RegionLevel {
    Department,
    Province,
    District,
}

impl RegionLevel {
    /// Region label of `record` at this level.
    pub fn label_of<'a>(&self, record: &'a UsageRecord) -> &'a str {
        match self {
            RegionLevel::Department => &record.department,
            RegionLevel::Province => &record.province,
            RegionLevel::District => &record.district,
        }
    }

    /// Lowercase level name used in dimension names.
    pub const fn name(&self) -> &'static str {
        match self {
            RegionLevel::Department => "department",
            RegionLevel::Province => "province",
            RegionLevel::District => "district",
        }
    }
}

/// How a dimension derives a group key from a record.
#[derive(Clone, Debug)]
pub enum Grouping {
    /// Half-open numeric ranges of `bucket_size` width, labeled
    /// `{start}-{start + bucket_size}` with the start inclusive.
    ///
    /// Zero lands in the `0-{bucket_size}` bucket. Negative values keep a
    /// negative bucket label (`-100-0` for `-30` at width 100); they are not
    /// clamped to the zero bucket.
    Range {
        /// Bucket width; must be finite and positive.
        bucket_size: f64,
    },
    /// The record's region label at the given level, unchanged.
    Region(RegionLevel),
    /// The record's supply status label, unchanged.
    Status,
}

/// Defines one logical aggregation dimension (name + measure + grouping).
///
/// The name tags every partial the executor produces, so reduce can group
/// partials explicitly instead of relying on result positions.
#[derive(Clone, Debug)]
pub struct DimensionSpec {
    /// Stable dimension name; tags partials and labels reports.
    pub name: Cow<'static, str>,
    /// Numeric field summed into group totals.
    pub measure: Measure,
    /// Key derivation rule.
    pub grouping: Grouping,
}

impl DimensionSpec {
    /// Create a spec with an explicit name.
    pub fn new(name: impl Into<Cow<'static, str>>, measure: Measure, grouping: Grouping) -> Self {
        Self {
            name: name.into(),
            measure,
            grouping,
        }
    }

    /// Stock consumption histogram (100 kWh buckets).
    pub fn consumption_ranges() -> Self {
        Self::new(
            DIM_CONSUMPTION_RANGES,
            Measure::Consumption,
            Grouping::Range {
                bucket_size: DEFAULT_CONSUMPTION_BUCKET,
            },
        )
    }

    /// Stock billing histogram (50-unit buckets).
    pub fn billing_ranges() -> Self {
        Self::new(
            DIM_BILLING_RANGES,
            Measure::Billing,
            Grouping::Range {
                bucket_size: DEFAULT_BILLING_BUCKET,
            },
        )
    }

    /// Per-province total of `measure`, named `{field}_by_province`.
    pub fn by_province(measure: Measure) -> Self {
        Self::by_region(measure, RegionLevel::Province)
    }

    /// Per-region total of `measure` at `level`, named `{measure}_by_{level}`.
    pub fn by_region(measure: Measure, level: RegionLevel) -> Self {
        Self::new(
            format!("{}_by_{}", measure.label(), level.name()),
            measure,
            Grouping::Region(level),
        )
    }

    /// Check name and grouping parameters before any task is spawned.
    pub fn validate(&self) -> Result<(), RollupError> {
        if self.name.trim().is_empty() {
            return Err(RollupError::Configuration(
                "dimension name must not be empty".to_string(),
            ));
        }
        if let Grouping::Range { bucket_size } = self.grouping
            && !(bucket_size.is_finite() && bucket_size > 0.0)
        {
            return Err(RollupError::Configuration(format!(
                "dimension '{}' bucket size must be finite and positive, got {bucket_size}",
                self.name
            )));
        }
        Ok(())
    }

    /// Map one record to its (group key, contribution) pair.
    ///
    /// Non-finite measure values are an error, never bucketed or summed; the
    /// executor counts them against the run's skip total.
    pub fn map_record(&self, record: &UsageRecord) -> Result<(GroupKey, f64), RollupError> {
        let value = self.measure.value_of(record);
        if !value.is_finite() {
            return Err(RollupError::NonFiniteMeasure {
                dimension: self.name.to_string(),
                field: self.measure.field_name(),
            });
        }
        let key = match &self.grouping {
            Grouping::Range { bucket_size } => range_label(value, *bucket_size),
            Grouping::Region(level) => level.label_of(record).to_string(),
            Grouping::Status => record.status.clone(),
        };
        Ok((key, value))
    }
}

/// Bucket label for `value` at `bucket_size` width: `{start}-{end}`.
fn range_label(value: f64, bucket_size: f64) -> GroupKey {
    let start = (value / bucket_size).floor() * bucket_size;
    format!("{:.0}-{:.0}", start, start + bucket_size)
}
