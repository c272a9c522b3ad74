/// Constants used by dimension specs and bucket labeling.
pub mod dimension {
    /// Default bucket width (kWh) for consumption range histograms.
    pub const DEFAULT_CONSUMPTION_BUCKET: f64 = 100.0;
    /// Default bucket width (currency units) for billing range histograms.
    pub const DEFAULT_BILLING_BUCKET: f64 = 50.0;
    /// Name of the stock consumption histogram dimension.
    pub const DIM_CONSUMPTION_RANGES: &str = "consumption_ranges";
    /// Name of the stock billing histogram dimension.
    pub const DIM_BILLING_RANGES: &str = "billing_ranges";
}

/// Constants used by map-stage partitioning and worker sizing.
pub mod executor {
    /// Worker count used when available parallelism cannot be queried.
    pub const FALLBACK_WORKERS: usize = 4;
    /// Smallest record chunk worth its own worker.
    ///
    /// Prevents per-record fan-out on small inputs: a chunked run never uses
    /// more workers than `ceil(records / MIN_CHUNK_LEN)`.
    pub const MIN_CHUNK_LEN: usize = 64;
}

/// Constants used by report rendering.
pub mod report {
    /// Unit label for consumption totals.
    pub const UNIT_KWH: &str = "KW";
    /// Unit label for billing totals.
    pub const UNIT_CURRENCY: &str = "$";
}

/// Constants used by delimited-file sources.
pub mod csv_source {
    /// Default field delimiter for CSV inputs.
    pub const DEFAULT_DELIMITER: u8 = b',';
    /// Extension matched by the directory source when collecting files.
    pub const CSV_EXTENSION: &str = "csv";
    /// Log message used when malformed rows are skipped.
    pub const SKIP_MALFORMED_MSG: &str = "skipping malformed row";
}

/// Constants used by the synthetic record generator.
pub mod synthetic {
    /// Number of distinct department labels generated.
    pub const DEPARTMENT_VARIANTS: u32 = 5;
    /// Number of distinct province labels generated.
    pub const PROVINCE_VARIANTS: u32 = 3;
    /// Number of distinct district labels generated.
    pub const DISTRICT_VARIANTS: u32 = 10;
    /// Upper bound (exclusive) for generated consumption values, in kWh.
    pub const MAX_CONSUMPTION_KWH: f64 = 1000.0;
    /// Upper bound (exclusive) for generated billing amounts.
    pub const MAX_BILLING: f64 = 200.0;
    /// Status label applied to all generated records.
    pub const STATUS_ACTIVE: &str = "Active";
}
