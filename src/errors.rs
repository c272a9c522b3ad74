use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::types::{DimensionName, RowIndex, SourceId};

/// Error type for source loading, configuration, and aggregation failures.
#[derive(Debug, Error)]
pub enum RollupError {
    #[error("record source '{source_id}' not found at {}", .path.display())]
    SourceNotFound { source_id: SourceId, path: PathBuf },
    #[error("record source '{source_id}' row {row} is malformed: {reason}")]
    MalformedRow {
        source_id: SourceId,
        row: RowIndex,
        reason: String,
    },
    #[error("record source '{source_id}' row {row} is not valid UTF-8")]
    Encoding { source_id: SourceId, row: RowIndex },
    #[error("dimension '{dimension}' read a non-finite {field} value")]
    NonFiniteMeasure {
        dimension: DimensionName,
        field: &'static str,
    },
    #[error("worker task for dimension '{dimension}' panicked")]
    WorkerPanicked { dimension: DimensionName },
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error("configuration error: {0}")]
    Configuration(String),
}
