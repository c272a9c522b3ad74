//! Sorting and rendering of finished rollups.
//!
//! Presentation is a collaborator of the aggregation core: it consumes a
//! `DimensionRollup` read-only and renders text lines or JSON. Key-ascending
//! order is numeric-aware so bucket labels sort by bucket start
//! (`0-100`, `100-200`, `1000-1100`) instead of lexicographically.

use std::borrow::Cow;
use std::cmp::Ordering;
use std::fmt::Write as _;

use serde_json::{Value, json};

use crate::dimension::Measure;
use crate::rollup::DimensionRollup;
use crate::totals::GroupTotals;
use crate::types::GroupKey;

/// Sort order applied to report rows.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SortOrder {
    /// Largest totals first; ties break on key.
    #[default]
    ValueDescending,
    /// Keys ascending, bucket labels ordered by bucket start.
    KeyAscending,
}

/// Format specification for rendering one dimension's totals.
#[derive(Clone, Debug)]
pub struct ReportFormat {
    /// Row ordering.
    pub sort: SortOrder,
    /// Unit label appended to rendered values.
    pub unit: Cow<'static, str>,
}

impl ReportFormat {
    /// Create a format with an explicit unit label.
    pub fn new(sort: SortOrder, unit: impl Into<Cow<'static, str>>) -> Self {
        Self {
            sort,
            unit: unit.into(),
        }
    }

    /// Stock format for `measure` (its unit label, values descending).
    pub fn for_measure(measure: Measure) -> Self {
        Self::new(SortOrder::default(), measure.unit_label())
    }

    /// Override the sort order.
    pub fn with_sort(mut self, sort: SortOrder) -> Self {
        self.sort = sort;
        self
    }
}

/// Sorted (key, total) rows for a final aggregate.
pub fn sorted_rows(totals: &GroupTotals, sort: SortOrder) -> Vec<(GroupKey, f64)> {
    let mut rows: Vec<(GroupKey, f64)> = totals.iter().map(|(key, value)| (key.clone(), value)).collect();
    match sort {
        SortOrder::ValueDescending => rows.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.0.cmp(&b.0))
        }),
        SortOrder::KeyAscending => rows.sort_by(|a, b| compare_keys(&a.0, &b.0)),
    }
    rows
}

/// Render a rollup as header plus `key: value unit` lines.
pub fn render_text(rollup: &DimensionRollup, format: &ReportFormat) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "=== {} ===", rollup.name);
    for (key, value) in sorted_rows(&rollup.totals, format.sort) {
        let _ = writeln!(out, "{key}: {value:.2} {}", format.unit);
    }
    if rollup.skipped_records > 0 {
        let _ = writeln!(out, "skipped records: {}", rollup.skipped_records);
    }
    out
}

/// Render a rollup as a JSON object with ordered rows.
pub fn render_json(rollup: &DimensionRollup, format: &ReportFormat) -> Value {
    let rows: Vec<Value> = sorted_rows(&rollup.totals, format.sort)
        .into_iter()
        .map(|(group, total)| json!({ "group": group, "total": total }))
        .collect();
    json!({
        "dimension": rollup.name,
        "unit": format.unit,
        "rows": rows,
        "skipped_records": rollup.skipped_records,
    })
}

/// Order keys by bucket start when both parse as bucket labels, falling back
/// to plain string order otherwise.
fn compare_keys(a: &str, b: &str) -> Ordering {
    match (bucket_start(a), bucket_start(b)) {
        (Some(left), Some(right)) => left
            .partial_cmp(&right)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.cmp(b)),
        _ => a.cmp(b),
    }
}

/// Leading bucket-start number of a `{start}-{end}` label.
///
/// Handles negative starts (`-100-0`): the separator is the first `-` after
/// the leading sign.
fn bucket_start(key: &str) -> Option<f64> {
    let separator = if let Some(rest) = key.strip_prefix('-') {
        rest.find('-').map(|idx| idx + 1)?
    } else {
        key.find('-')?
    };
    key[..separator].parse::<f64>().ok().filter(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DimensionName;

    fn rollup(name: &str, entries: &[(&str, f64)], skipped: usize) -> DimensionRollup {
        DimensionRollup {
            name: DimensionName::from(name),
            measure: Measure::Consumption,
            totals: entries
                .iter()
                .map(|(key, value)| (key.to_string(), *value))
                .collect(),
            skipped_records: skipped,
        }
    }

    #[test]
    fn value_descending_breaks_ties_on_key() {
        let rollup = rollup("dim", &[("B", 10.0), ("A", 10.0), ("C", 30.0)], 0);
        let rows = sorted_rows(&rollup.totals, SortOrder::ValueDescending);
        let keys: Vec<_> = rows.iter().map(|(key, _)| key.as_str()).collect();
        assert_eq!(keys, ["C", "A", "B"]);
    }

    #[test]
    fn key_ascending_orders_buckets_numerically() {
        let rollup = rollup(
            "dim",
            &[
                ("1000-1100", 1.0),
                ("0-100", 2.0),
                ("-100-0", 3.0),
                ("200-300", 4.0),
            ],
            0,
        );
        let rows = sorted_rows(&rollup.totals, SortOrder::KeyAscending);
        let keys: Vec<_> = rows.iter().map(|(key, _)| key.as_str()).collect();
        assert_eq!(keys, ["-100-0", "0-100", "200-300", "1000-1100"]);
    }

    #[test]
    fn key_ascending_falls_back_to_string_order() {
        let rollup = rollup("dim", &[("North", 1.0), ("Center", 2.0)], 0);
        let rows = sorted_rows(&rollup.totals, SortOrder::KeyAscending);
        assert_eq!(rows[0].0, "Center");
    }

    #[test]
    fn text_report_includes_unit_and_skips() {
        let rollup = rollup("consumption_ranges", &[("0-100", 42.0)], 2);
        let text = render_text(&rollup, &ReportFormat::for_measure(Measure::Consumption));
        assert!(text.contains("=== consumption_ranges ==="));
        assert!(text.contains("0-100: 42.00 KW"));
        assert!(text.contains("skipped records: 2"));
    }

    #[test]
    fn json_report_has_ordered_rows() {
        let rollup = rollup("dim", &[("A", 1.0), ("B", 5.0)], 0);
        let value = render_json(
            &rollup,
            &ReportFormat::new(SortOrder::ValueDescending, "KW"),
        );
        assert_eq!(value["dimension"], "dim");
        assert_eq!(value["rows"][0]["group"], "B");
        assert_eq!(value["rows"][0]["total"], 5.0);
        assert_eq!(value["skipped_records"], 0);
    }

    #[test]
    fn bucket_start_parses_signed_labels() {
        assert_eq!(bucket_start("100-200"), Some(100.0));
        assert_eq!(bucket_start("-100-0"), Some(-100.0));
        assert_eq!(bucket_start("North"), None);
    }
}
