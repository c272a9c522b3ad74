use serde::{Deserialize, Serialize};

pub use crate::types::Period;

/// Canonical usage observation produced by a `RecordSource`.
///
/// Field names double as the expected CSV header row. Records are immutable
/// once produced; an aggregation run only ever reads them.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct UsageRecord {
    /// Top-level administrative region.
    pub department: String,
    /// Mid-level administrative region (the stock category dimension).
    pub province: String,
    /// Lowest administrative region.
    pub district: String,
    /// Billing period encoded as YYYYMM.
    pub period: Period,
    /// Metered energy consumption for the period, in kWh.
    pub consumption_kwh: f64,
    /// Amount billed for the period, in the provider's currency.
    pub billing: f64,
    /// Supply status label (e.g. `Active`).
    pub status: String,
}
