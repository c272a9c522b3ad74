/// Aggregation key produced by a dimension's grouping rule.
/// Examples: `100-200`, `North`, `Active`
pub type GroupKey = String;
/// Identifier for the source that produced a batch of records.
/// Examples: `usage_csv`, `memory`, `synthetic`
pub type SourceId = String;
/// Stable name of a logical aggregation dimension.
/// Examples: `consumption_ranges`, `consumption_by_province`
pub type DimensionName = String;
/// One-based line index inside a delimited input file.
pub type RowIndex = u64;
/// Year-month billing period encoded as YYYYMM.
/// Examples: `202311`, `202401`
pub type Period = u32;
