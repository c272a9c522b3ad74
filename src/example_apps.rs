//! Reusable demo runners shared by downstream binaries.

use std::error::Error;
use std::path::PathBuf;

use clap::{Parser, ValueEnum, error::ErrorKind};

use crate::config::{AggregationConfig, PartitionStrategy};
use crate::constants::dimension::{DIM_BILLING_RANGES, DIM_CONSUMPTION_RANGES};
use crate::dimension::{DimensionSpec, Grouping, Measure, RegionLevel};
use crate::metrics::group_skew;
use crate::period::format_period;
use crate::report::{ReportFormat, SortOrder, render_json, render_text};
use crate::rollup::aggregate;
use crate::source::{CsvSource, CsvSourceConfig, MalformedRowPolicy, RecordSource};
use crate::types::Period;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum SortArg {
    Value,
    Key,
}

impl From<SortArg> for SortOrder {
    fn from(value: SortArg) -> Self {
        match value {
            SortArg::Value => SortOrder::ValueDescending,
            SortArg::Key => SortOrder::KeyAscending,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum StrategyArg {
    PerDimension,
    Chunked,
    SharedMap,
}

impl From<StrategyArg> for PartitionStrategy {
    fn from(value: StrategyArg) -> Self {
        match value {
            StrategyArg::PerDimension => PartitionStrategy::PerDimension,
            StrategyArg::Chunked => PartitionStrategy::Chunked,
            StrategyArg::SharedMap => PartitionStrategy::SharedMap,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum RegionArg {
    Department,
    Province,
    District,
}

impl From<RegionArg> for RegionLevel {
    fn from(value: RegionArg) -> Self {
        match value {
            RegionArg::Department => RegionLevel::Department,
            RegionArg::Province => RegionLevel::Province,
            RegionArg::District => RegionLevel::District,
        }
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "usage_report",
    disable_help_subcommand = true,
    about = "Aggregate usage records from a delimited file",
    long_about = "Load usage records from a delimited file, run the configured map/reduce \
                  aggregation dimensions concurrently, and print one report per dimension.",
    after_help = "Reports default to consumption and billing range histograms; add \
                  --by-region for per-region consumption totals."
)]
struct UsageReportCli {
    #[arg(value_name = "CSV_PATH", help = "Path to the delimited usage file")]
    data_path: PathBuf,
    #[arg(
        long,
        value_parser = parse_delimiter_arg,
        default_value = ",",
        help = "Field delimiter (single ASCII character)"
    )]
    delimiter: u8,
    #[arg(long = "no-headers", help = "Treat the first row as data, not headers")]
    no_headers: bool,
    #[arg(
        long = "fail-on-malformed",
        help = "Abort on the first malformed row instead of skip-and-count"
    )]
    fail_on_malformed: bool,
    #[arg(
        long = "consumption-bucket",
        value_name = "KWH",
        help = "Bucket width for the consumption histogram"
    )]
    consumption_bucket: Option<f64>,
    #[arg(
        long = "billing-bucket",
        value_name = "AMOUNT",
        help = "Bucket width for the billing histogram"
    )]
    billing_bucket: Option<f64>,
    #[arg(
        long = "by-region",
        value_enum,
        help = "Add a per-region consumption dimension at this level"
    )]
    by_region: Option<RegionArg>,
    #[arg(
        long = "period-start",
        value_name = "YYYYMM",
        help = "Keep only periods at or after this bound (requires --period-end)"
    )]
    period_start: Option<Period>,
    #[arg(
        long = "period-end",
        value_name = "YYYYMM",
        help = "Keep only periods at or before this bound (requires --period-start)"
    )]
    period_end: Option<Period>,
    #[arg(long, value_enum, default_value = "value", help = "Report row ordering")]
    sort: SortArg,
    #[arg(
        long,
        value_enum,
        default_value = "per-dimension",
        help = "Map-stage partitioning strategy"
    )]
    strategy: StrategyArg,
    #[arg(
        long = "max-workers",
        default_value_t = 0,
        help = "Worker cap for chunked strategies (0 = available parallelism)"
    )]
    max_workers: usize,
    #[arg(long, help = "Emit JSON instead of text reports")]
    json: bool,
}

/// Run the `usage_report` demo with the given command-line arguments
/// (binary name excluded).
pub fn run_usage_report<I>(args_iter: I) -> Result<(), Box<dyn Error>>
where
    I: Iterator<Item = String>,
{
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();

    let Some(cli) = parse_cli::<UsageReportCli, _>(
        std::iter::once("usage_report".to_string()).chain(args_iter),
    )?
    else {
        return Ok(());
    };

    let mut source_config = CsvSourceConfig::new("usage_csv", &cli.data_path)
        .with_delimiter(cli.delimiter)
        .with_headers(!cli.no_headers);
    if cli.fail_on_malformed {
        source_config = source_config.with_malformed_rows(MalformedRowPolicy::Fail);
    }
    match (cli.period_start, cli.period_end) {
        (Some(start), Some(end)) => {
            println!(
                "filtering periods {} through {}",
                format_period(start),
                format_period(end)
            );
            source_config = source_config.with_period_range(start, end);
        }
        (None, None) => {}
        _ => return Err("--period-start and --period-end must be given together".into()),
    }

    let snapshot = CsvSource::new(source_config).load()?;

    let mut specs = vec![
        bucket_spec(
            DIM_CONSUMPTION_RANGES,
            Measure::Consumption,
            cli.consumption_bucket,
        ),
        bucket_spec(DIM_BILLING_RANGES, Measure::Billing, cli.billing_bucket),
    ];
    if let Some(level) = cli.by_region {
        specs.push(DimensionSpec::by_region(Measure::Consumption, level.into()));
    }

    let config = AggregationConfig::with_strategy(cli.strategy.into()).with_max_workers(cli.max_workers);
    let rollups = aggregate(&snapshot.records, &specs, &config)?;

    if cli.json {
        let reports: Vec<_> = rollups
            .iter()
            .map(|rollup| {
                let format = ReportFormat::for_measure(rollup.measure).with_sort(cli.sort.into());
                render_json(rollup, &format)
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&reports)?);
    } else {
        for rollup in &rollups {
            let format = ReportFormat::for_measure(rollup.measure).with_sort(cli.sort.into());
            print!("{}", render_text(rollup, &format));
            if let Some(skew) = group_skew(&rollup.totals) {
                println!(
                    "skew: groups={} total={:.2} max_share={:.2} min_share={:.2}",
                    skew.groups, skew.grand_total, skew.max_share, skew.min_share
                );
            }
            println!();
        }
    }
    if snapshot.skipped_rows > 0 {
        println!(
            "skipped {} malformed row(s) while loading {}",
            snapshot.skipped_rows,
            cli.data_path.display()
        );
    }
    Ok(())
}

fn bucket_spec(name: &'static str, measure: Measure, bucket_size: Option<f64>) -> DimensionSpec {
    match bucket_size {
        Some(bucket_size) => DimensionSpec::new(name, measure, Grouping::Range { bucket_size }),
        None => match measure {
            Measure::Consumption => DimensionSpec::consumption_ranges(),
            Measure::Billing => DimensionSpec::billing_ranges(),
        },
    }
}

fn parse_cli<T, I>(args: I) -> Result<Option<T>, Box<dyn Error>>
where
    T: Parser,
    I: IntoIterator,
    I::Item: Into<std::ffi::OsString> + Clone,
{
    match T::try_parse_from(args) {
        Ok(cli) => Ok(Some(cli)),
        Err(err) => match err.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
                err.print()?;
                Ok(None)
            }
            _ => Err(err.into()),
        },
    }
}

fn parse_delimiter_arg(raw: &str) -> Result<u8, String> {
    let mut bytes = raw.bytes();
    match (bytes.next(), bytes.next()) {
        (Some(byte), None) if byte.is_ascii() => Ok(byte),
        _ => Err("--delimiter expects exactly one ASCII character".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delimiter_arg_accepts_single_ascii_byte() {
        assert_eq!(parse_delimiter_arg(";"), Ok(b';'));
        assert_eq!(parse_delimiter_arg("|"), Ok(b'|'));
        assert!(parse_delimiter_arg("").is_err());
        assert!(parse_delimiter_arg(";;").is_err());
    }
}
