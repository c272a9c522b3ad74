use std::fs::{self, File};
use std::io::Write as _;
use std::path::{Path, PathBuf};

use tempfile::tempdir;

use tally::report::{ReportFormat, SortOrder, render_json, render_text};
use tally::{
    AggregationConfig, CsvDirSource, CsvSource, CsvSourceConfig, DimensionSpec, MalformedRowPolicy,
    Measure, RecordSource, RollupError, aggregate,
};

const HEADER: &str = "department,province,district,period,consumption_kwh,billing,status";

fn write_csv(path: &PathBuf, rows: &[&str]) {
    let mut file = File::create(path).unwrap();
    writeln!(file, "{HEADER}").unwrap();
    for row in rows {
        writeln!(file, "{row}").unwrap();
    }
}

fn sample_file(dir: &Path) -> PathBuf {
    let path = dir.join("usage.csv");
    write_csv(
        &path,
        &[
            "Central,North,D1,202311,150.0,42.0,Active",
            "Central,North,D2,202311,30.0,8.0,Active",
            "Central,South,D3,202311,220.0,55.0,Active",
            "Central,South,D3,202312,oops,55.0,Active",
        ],
    );
    path
}

#[test]
fn csv_load_feeds_aggregation_with_skip_accounting() {
    let temp = tempdir().unwrap();
    let source = CsvSource::new(CsvSourceConfig::new("usage_csv", sample_file(temp.path())));
    let snapshot = source.load().unwrap();
    assert_eq!(snapshot.skipped_rows, 1);

    let specs = vec![
        DimensionSpec::consumption_ranges(),
        DimensionSpec::by_province(Measure::Consumption),
    ];
    let rollups = aggregate(&snapshot.records, &specs, &AggregationConfig::default()).unwrap();

    assert_eq!(rollups[0].totals.get("100-200"), Some(150.0));
    assert_eq!(rollups[0].totals.get("0-100"), Some(30.0));
    assert_eq!(rollups[0].totals.get("200-300"), Some(220.0));
    assert_eq!(rollups[1].totals.get("North"), Some(180.0));
    assert_eq!(rollups[1].totals.get("South"), Some(220.0));
}

#[test]
fn fail_policy_aborts_the_whole_load() {
    let temp = tempdir().unwrap();
    let source = CsvSource::new(
        CsvSourceConfig::new("usage_csv", sample_file(temp.path()))
            .with_malformed_rows(MalformedRowPolicy::Fail),
    );
    match source.load() {
        Err(RollupError::MalformedRow { row, .. }) => assert_eq!(row, 5),
        other => panic!("expected MalformedRow, got {other:?}"),
    }
}

#[test]
fn directory_merge_with_period_filter() {
    let temp = tempdir().unwrap();
    write_csv(
        &temp.path().join("october.csv"),
        &["Central,North,D1,202310,100.0,10.0,Active"],
    );
    write_csv(
        &temp.path().join("november.csv"),
        &[
            "Central,North,D1,202311,200.0,20.0,Active",
            "Central,South,D2,202311,50.0,5.0,Active",
        ],
    );
    fs::create_dir_all(temp.path().join("ignored")).unwrap();

    let source = CsvDirSource::new("usage_dir", temp.path()).with_period_range(202311, 202311);
    let snapshot = source.load().unwrap();
    assert_eq!(snapshot.records.len(), 2);

    let specs = vec![DimensionSpec::by_province(Measure::Billing)];
    let rollups = aggregate(&snapshot.records, &specs, &AggregationConfig::default()).unwrap();
    assert_eq!(rollups[0].totals.get("North"), Some(20.0));
    assert_eq!(rollups[0].totals.get("South"), Some(5.0));
}

#[test]
fn rendered_reports_reflect_final_totals() {
    let temp = tempdir().unwrap();
    let source = CsvSource::new(CsvSourceConfig::new("usage_csv", sample_file(temp.path())));
    let snapshot = source.load().unwrap();

    let specs = vec![DimensionSpec::consumption_ranges()];
    let rollups = aggregate(&snapshot.records, &specs, &AggregationConfig::default()).unwrap();

    let text = render_text(
        &rollups[0],
        &ReportFormat::for_measure(Measure::Consumption).with_sort(SortOrder::KeyAscending),
    );
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines[0], "=== consumption_ranges ===");
    assert_eq!(lines[1], "0-100: 30.00 KW");
    assert_eq!(lines[2], "100-200: 150.00 KW");
    assert_eq!(lines[3], "200-300: 220.00 KW");

    let value = render_json(
        &rollups[0],
        &ReportFormat::for_measure(Measure::Consumption),
    );
    assert_eq!(value["dimension"], "consumption_ranges");
    assert_eq!(value["rows"][0]["group"], "200-300");
    assert_eq!(value["unit"], "KW");
}
