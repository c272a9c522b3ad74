//! Helpers for the YYYYMM period encoding used by usage records.

use chrono::{Datelike, NaiveDate};

use crate::types::Period;

/// Split a period into (year, month), or `None` when the month part is not
/// in `1..=12`.
pub fn split_period(period: Period) -> Option<(i32, u32)> {
    let year = (period / 100) as i32;
    let month = period % 100;
    (1..=12).contains(&month).then_some((year, month))
}

/// Build a period from a calendar year and month.
pub fn period_of(year: i32, month: u32) -> Option<Period> {
    if !(1..=12).contains(&month) || !(0..=9999).contains(&year) {
        return None;
    }
    Some(year as Period * 100 + month)
}

/// First day of the period's month.
pub fn period_start_date(period: Period) -> Option<NaiveDate> {
    let (year, month) = split_period(period)?;
    NaiveDate::from_ymd_opt(year, month, 1)
}

/// Period for a calendar date.
pub fn period_for_date(date: NaiveDate) -> Period {
    date.year() as Period * 100 + date.month()
}

/// Format `202311` as `2023-11`; invalid periods are shown raw.
pub fn format_period(period: Period) -> String {
    match split_period(period) {
        Some((year, month)) => format!("{year:04}-{month:02}"),
        None => period.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_rejects_invalid_months() {
        assert_eq!(split_period(202311), Some((2023, 11)));
        assert_eq!(split_period(202300), None);
        assert_eq!(split_period(202313), None);
    }

    #[test]
    fn period_round_trips_through_dates() {
        let period = period_of(2023, 11).unwrap();
        assert_eq!(period, 202311);
        let date = period_start_date(period).unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2023, 11, 1).unwrap());
        assert_eq!(period_for_date(date), period);
    }

    #[test]
    fn format_is_iso_like_for_valid_periods() {
        assert_eq!(format_period(202401), "2024-01");
        assert_eq!(format_period(999999), "999999");
    }
}
