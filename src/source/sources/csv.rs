use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::constants::csv_source::{DEFAULT_DELIMITER, SKIP_MALFORMED_MSG};
use crate::data::UsageRecord;
use crate::errors::RollupError;
use crate::source::{LoadSnapshot, RecordSource};
use crate::types::{Period, SourceId};

/// Policy applied to rows that fail type coercion.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MalformedRowPolicy {
    /// Drop the row and count it in the load snapshot.
    #[default]
    Skip,
    /// Abort the load with `RollupError::MalformedRow`.
    Fail,
}

/// Configuration for a delimited-file record source.
#[derive(Clone, Debug)]
pub struct CsvSourceConfig {
    /// Stable source identifier used in errors and logs.
    pub source_id: SourceId,
    /// Path of the delimited file.
    pub path: PathBuf,
    /// Field delimiter byte.
    pub delimiter: u8,
    /// Whether the first row is a header row.
    pub has_headers: bool,
    /// Policy for rows that fail type coercion.
    pub malformed_rows: MalformedRowPolicy,
    /// Optional inclusive period filter applied after coercion.
    pub period_range: Option<(Period, Period)>,
}

impl CsvSourceConfig {
    /// Create a config for a comma-delimited file with a header row.
    pub fn new(source_id: impl Into<SourceId>, path: impl Into<PathBuf>) -> Self {
        Self {
            source_id: source_id.into(),
            path: path.into(),
            delimiter: DEFAULT_DELIMITER,
            has_headers: true,
            malformed_rows: MalformedRowPolicy::default(),
            period_range: None,
        }
    }

    /// Override the field delimiter.
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Override whether the first row is treated as headers.
    pub fn with_headers(mut self, has_headers: bool) -> Self {
        self.has_headers = has_headers;
        self
    }

    /// Override the malformed-row policy.
    pub fn with_malformed_rows(mut self, policy: MalformedRowPolicy) -> Self {
        self.malformed_rows = policy;
        self
    }

    /// Keep only records whose period falls in `start..=end`.
    pub fn with_period_range(mut self, start: Period, end: Period) -> Self {
        self.period_range = Some((start, end));
        self
    }

    fn accepts(&self, record: &UsageRecord) -> bool {
        match self.period_range {
            Some((start, end)) => (start..=end).contains(&record.period),
            None => true,
        }
    }
}

/// Delimited-file record source with configurable coercion policy.
pub struct CsvSource {
    config: CsvSourceConfig,
}

impl CsvSource {
    /// Create a source from configuration.
    pub fn new(config: CsvSourceConfig) -> Self {
        Self { config }
    }

    fn open(&self) -> Result<File, RollupError> {
        File::open(&self.config.path).map_err(|err| match err.kind() {
            io::ErrorKind::NotFound => RollupError::SourceNotFound {
                source_id: self.config.source_id.clone(),
                path: self.config.path.clone(),
            },
            _ => RollupError::Io(err),
        })
    }

    fn snapshot_from_reader<R: Read>(&self, input: R) -> Result<LoadSnapshot, RollupError> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(self.config.delimiter)
            .has_headers(self.config.has_headers)
            .from_reader(input);

        let mut records = Vec::new();
        let mut skipped_rows = 0usize;
        for result in reader.deserialize::<UsageRecord>() {
            match result {
                Ok(record) => {
                    if self.config.accepts(&record) {
                        records.push(record);
                    }
                }
                Err(err) => self.handle_row_error(err, &mut skipped_rows)?,
            }
        }
        Ok(LoadSnapshot {
            records,
            skipped_rows,
        })
    }

    fn handle_row_error(&self, err: csv::Error, skipped: &mut usize) -> Result<(), RollupError> {
        let row = err.position().map(|pos| pos.line()).unwrap_or_default();
        let reason = err.to_string();
        match err.into_kind() {
            csv::ErrorKind::Io(io_err) => Err(RollupError::Io(io_err)),
            csv::ErrorKind::Utf8 { .. } => Err(RollupError::Encoding {
                source_id: self.config.source_id.clone(),
                row,
            }),
            _ => match self.config.malformed_rows {
                MalformedRowPolicy::Skip => {
                    *skipped += 1;
                    debug!(
                        source_id = %self.config.source_id,
                        row,
                        SKIP_MALFORMED_MSG
                    );
                    Ok(())
                }
                MalformedRowPolicy::Fail => Err(RollupError::MalformedRow {
                    source_id: self.config.source_id.clone(),
                    row,
                    reason,
                }),
            },
        }
    }
}

/// Load one delimited file at `path` using `template` settings.
///
/// Shared by `CsvSource` and the directory source, which reuses one template
/// across every file it merges.
pub(crate) fn load_file(template: &CsvSourceConfig, path: &Path) -> Result<LoadSnapshot, RollupError> {
    let mut config = template.clone();
    config.path = path.to_path_buf();
    CsvSource::new(config).load()
}

impl RecordSource for CsvSource {
    fn id(&self) -> &str {
        &self.config.source_id
    }

    fn load(&self) -> Result<LoadSnapshot, RollupError> {
        let file = self.open()?;
        let snapshot = self.snapshot_from_reader(file)?;
        debug!(
            source_id = %self.config.source_id,
            path = %self.config.path.display(),
            record_count = snapshot.records.len(),
            skipped_rows = snapshot.skipped_rows,
            "csv load completed"
        );
        Ok(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;
    use tempfile::tempdir;

    const HEADER: &str = "department,province,district,period,consumption_kwh,billing,status";

    fn write_csv(dir: &Path, name: &str, rows: &[&str]) -> PathBuf {
        let path = dir.join(name);
        let mut file = File::create(&path).unwrap();
        writeln!(file, "{HEADER}").unwrap();
        for row in rows {
            writeln!(file, "{row}").unwrap();
        }
        path
    }

    #[test]
    fn loads_typed_rows() {
        let temp = tempdir().unwrap();
        let path = write_csv(
            temp.path(),
            "usage.csv",
            &[
                "Central,North,D1,202311,150.5,42.0,Active",
                "Central,South,D2,202311,30.0,8.5,Active",
            ],
        );
        let source = CsvSource::new(CsvSourceConfig::new("usage_csv", path));
        let snapshot = source.load().unwrap();
        assert_eq!(snapshot.records.len(), 2);
        assert_eq!(snapshot.skipped_rows, 0);
        assert_eq!(snapshot.records[0].province, "North");
        assert_eq!(snapshot.records[0].consumption_kwh, 150.5);
        assert_eq!(snapshot.records[1].period, 202311);
    }

    #[test]
    fn skip_policy_counts_malformed_rows() {
        let temp = tempdir().unwrap();
        let path = write_csv(
            temp.path(),
            "usage.csv",
            &[
                "Central,North,D1,202311,150.5,42.0,Active",
                "Central,North,D1,202311,not_a_number,42.0,Active",
                "Central,South,D2,202311,30.0,8.5,Active",
            ],
        );
        let source = CsvSource::new(CsvSourceConfig::new("usage_csv", path));
        let snapshot = source.load().unwrap();
        assert_eq!(snapshot.records.len(), 2);
        assert_eq!(snapshot.skipped_rows, 1);
    }

    #[test]
    fn fail_policy_reports_row_index() {
        let temp = tempdir().unwrap();
        let path = write_csv(
            temp.path(),
            "usage.csv",
            &[
                "Central,North,D1,202311,150.5,42.0,Active",
                "Central,North,D1,202311,not_a_number,42.0,Active",
            ],
        );
        let source = CsvSource::new(
            CsvSourceConfig::new("usage_csv", path).with_malformed_rows(MalformedRowPolicy::Fail),
        );
        let err = source.load().unwrap_err();
        match err {
            RollupError::MalformedRow { row, .. } => assert_eq!(row, 3),
            other => panic!("expected MalformedRow, got {other:?}"),
        }
    }

    #[test]
    fn missing_file_is_source_not_found() {
        let temp = tempdir().unwrap();
        let source = CsvSource::new(CsvSourceConfig::new(
            "usage_csv",
            temp.path().join("absent.csv"),
        ));
        assert!(matches!(
            source.load(),
            Err(RollupError::SourceNotFound { .. })
        ));
    }

    #[test]
    fn custom_delimiter_and_headerless_input() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("usage.psv");
        let mut file = File::create(&path).unwrap();
        writeln!(file, "Central|North|D1|202311|150.5|42.0|Active").unwrap();

        let source = CsvSource::new(
            CsvSourceConfig::new("usage_psv", path)
                .with_delimiter(b'|')
                .with_headers(false),
        );
        let snapshot = source.load().unwrap();
        assert_eq!(snapshot.records.len(), 1);
        assert_eq!(snapshot.records[0].district, "D1");
    }

    #[test]
    fn period_filter_is_inclusive() {
        let temp = tempdir().unwrap();
        let path = write_csv(
            temp.path(),
            "usage.csv",
            &[
                "Central,North,D1,202310,1.0,1.0,Active",
                "Central,North,D1,202311,2.0,1.0,Active",
                "Central,North,D1,202401,4.0,1.0,Active",
            ],
        );
        let source = CsvSource::new(
            CsvSourceConfig::new("usage_csv", path).with_period_range(202311, 202312),
        );
        let snapshot = source.load().unwrap();
        assert_eq!(snapshot.records.len(), 1);
        assert_eq!(snapshot.records[0].period, 202311);
    }
}
