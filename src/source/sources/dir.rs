use std::path::PathBuf;

use tracing::debug;
use walkdir::WalkDir;

use crate::constants::csv_source::CSV_EXTENSION;
use crate::errors::RollupError;
use crate::source::sources::csv::{CsvSourceConfig, MalformedRowPolicy, load_file};
use crate::source::{LoadSnapshot, RecordSource};
use crate::types::{Period, SourceId};

/// Record source that merges every `.csv` file under a root directory into
/// one batch.
///
/// Files are visited in sorted path order so the merged batch is
/// deterministic regardless of directory iteration order. All files share
/// one delimiter/header/policy template.
pub struct CsvDirSource {
    template: CsvSourceConfig,
    root: PathBuf,
}

impl CsvDirSource {
    /// Create a source merging CSV files under `root`.
    pub fn new(source_id: impl Into<SourceId>, root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Self {
            template: CsvSourceConfig::new(source_id, &root),
            root,
        }
    }

    /// Override the field delimiter for every merged file.
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.template = self.template.with_delimiter(delimiter);
        self
    }

    /// Override whether merged files carry a header row.
    pub fn with_headers(mut self, has_headers: bool) -> Self {
        self.template = self.template.with_headers(has_headers);
        self
    }

    /// Override the malformed-row policy for every merged file.
    pub fn with_malformed_rows(mut self, policy: MalformedRowPolicy) -> Self {
        self.template = self.template.with_malformed_rows(policy);
        self
    }

    /// Keep only records whose period falls in `start..=end`.
    pub fn with_period_range(mut self, start: Period, end: Period) -> Self {
        self.template = self.template.with_period_range(start, end);
        self
    }

    fn candidate_files(&self) -> Result<Vec<PathBuf>, RollupError> {
        if !self.root.is_dir() {
            return Err(RollupError::SourceNotFound {
                source_id: self.template.source_id.clone(),
                path: self.root.clone(),
            });
        }
        let mut files: Vec<PathBuf> = WalkDir::new(&self.root)
            .into_iter()
            .filter_map(Result::ok)
            .filter(|entry| entry.file_type().is_file())
            .map(|entry| entry.path().to_path_buf())
            .filter(|path| {
                path.extension()
                    .is_some_and(|ext| ext.eq_ignore_ascii_case(CSV_EXTENSION))
            })
            .collect();
        files.sort();
        Ok(files)
    }
}

impl RecordSource for CsvDirSource {
    fn id(&self) -> &str {
        &self.template.source_id
    }

    fn load(&self) -> Result<LoadSnapshot, RollupError> {
        let files = self.candidate_files()?;
        let mut merged = LoadSnapshot {
            records: Vec::new(),
            skipped_rows: 0,
        };
        for path in &files {
            let snapshot = load_file(&self.template, path)?;
            merged.records.extend(snapshot.records);
            merged.skipped_rows += snapshot.skipped_rows;
        }
        debug!(
            source_id = %self.template.source_id,
            files = files.len(),
            record_count = merged.records.len(),
            skipped_rows = merged.skipped_rows,
            "csv directory merge completed"
        );
        Ok(merged)
    }
}
