//! Filter Selection Module
//! User-chosen nationality/state sets and the month-year range resolver.

use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeSet;
use thiserror::Error;

use super::loader::ArrivalData;

/// Calendar month names, in order, used to map dropdown labels to 1-based
/// month numbers.
pub const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

const MONTH_ABBR: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Map a full month name to its 1-based number.
pub fn month_number(name: &str) -> Option<u32> {
    MONTH_NAMES
        .iter()
        .position(|m| *m == name)
        .map(|i| i as u32 + 1)
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RangeError {
    #[error("Unrecognized month name: {0}")]
    UnknownMonth(String),
    #[error("Start {0} is after end {1}")]
    StartAfterEnd(String, String),
    #[error("Date out of supported range: {0}-{1:02}")]
    OutOfBounds(i32, u32),
}

/// A calendar-month time bucket, ordered chronologically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct MonthBucket {
    pub year: i32,
    pub month: u32,
}

impl MonthBucket {
    pub fn new(year: i32, month: u32) -> Self {
        Self { year, month }
    }

    /// Display label, e.g. "Jan 2023". Matches the derived `Month-Year`
    /// column produced by the loader.
    pub fn label(&self) -> String {
        let abbr = MONTH_ABBR
            .get(self.month as usize - 1)
            .copied()
            .unwrap_or("?");
        format!("{} {}", abbr, self.year)
    }

    /// Full month name, e.g. "January", for the dropdowns.
    pub fn month_name(&self) -> &'static str {
        MONTH_NAMES
            .get(self.month as usize - 1)
            .copied()
            .unwrap_or("January")
    }
}

fn month_start(year: i32, month: u32) -> Result<NaiveDate, RangeError> {
    NaiveDate::from_ymd_opt(year, month, 1).ok_or(RangeError::OutOfBounds(year, month))
}

/// Last day of the given month: first day of the next month, minus one day.
fn month_end(year: i32, month: u32) -> Result<NaiveDate, RangeError> {
    let (ny, nm) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    month_start(ny, nm)?
        .pred_opt()
        .ok_or(RangeError::OutOfBounds(year, month))
}

/// Everything the user has currently selected. Empty sets mean "no filter".
/// Rebuilt on every interaction; holds no other state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FilterSelection {
    pub nationalities: BTreeSet<String>,
    pub entry_states: BTreeSet<String>,
    pub start_year: i32,
    pub start_month: String,
    pub end_year: i32,
    pub end_month: String,
}

impl FilterSelection {
    /// Default selection: no nationality/state filter, full span of the data.
    pub fn default_for(data: &ArrivalData) -> Self {
        let first = data.first_bucket();
        let last = data.last_bucket();
        Self {
            nationalities: BTreeSet::new(),
            entry_states: BTreeSet::new(),
            start_year: first.year,
            start_month: first.month_name().to_string(),
            end_year: last.year,
            end_month: last.month_name().to_string(),
        }
    }

    pub fn has_nationality_filter(&self) -> bool {
        !self.nationalities.is_empty()
    }

    pub fn has_state_filter(&self) -> bool {
        !self.entry_states.is_empty()
    }

    /// Resolve the selected month/year bounds to an inclusive date range:
    /// first day of the start month through the last day of the end month.
    pub fn resolve_range(&self) -> Result<(NaiveDate, NaiveDate), RangeError> {
        let sm = month_number(&self.start_month)
            .ok_or_else(|| RangeError::UnknownMonth(self.start_month.clone()))?;
        let em = month_number(&self.end_month)
            .ok_or_else(|| RangeError::UnknownMonth(self.end_month.clone()))?;

        let start = month_start(self.start_year, sm)?;
        let end = month_end(self.end_year, em)?;

        if start > end {
            return Err(RangeError::StartAfterEnd(
                MonthBucket::new(self.start_year, sm).label(),
                MonthBucket::new(self.end_year, em).label(),
            ));
        }

        Ok((start, end))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn selection(sy: i32, sm: &str, ey: i32, em: &str) -> FilterSelection {
        FilterSelection {
            start_year: sy,
            start_month: sm.to_string(),
            end_year: ey,
            end_month: em.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn month_numbers_are_one_based() {
        assert_eq!(month_number("January"), Some(1));
        assert_eq!(month_number("December"), Some(12));
        assert_eq!(month_number("march"), None);
        assert_eq!(month_number("Smarch"), None);
    }

    #[test]
    fn single_month_range_spans_whole_month() {
        let (start, end) = selection(2023, "March", 2023, "March")
            .resolve_range()
            .unwrap();
        assert_eq!(start, NaiveDate::from_ymd_opt(2023, 3, 1).unwrap());
        assert_eq!(end, NaiveDate::from_ymd_opt(2023, 3, 31).unwrap());
    }

    #[test]
    fn end_of_month_handles_february_and_leap_years() {
        let (_, end) = selection(2023, "January", 2023, "February")
            .resolve_range()
            .unwrap();
        assert_eq!(end, NaiveDate::from_ymd_opt(2023, 2, 28).unwrap());

        let (_, end) = selection(2024, "January", 2024, "February")
            .resolve_range()
            .unwrap();
        assert_eq!(end, NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());
    }

    #[test]
    fn december_end_rolls_into_next_year() {
        let (start, end) = selection(2022, "November", 2022, "December")
            .resolve_range()
            .unwrap();
        assert_eq!(start, NaiveDate::from_ymd_opt(2022, 11, 1).unwrap());
        assert_eq!(end, NaiveDate::from_ymd_opt(2022, 12, 31).unwrap());
    }

    #[test]
    fn unknown_month_is_rejected() {
        let err = selection(2023, "Marchuary", 2023, "March")
            .resolve_range()
            .unwrap_err();
        assert_eq!(err, RangeError::UnknownMonth("Marchuary".to_string()));
    }

    #[test]
    fn reversed_range_is_rejected() {
        let err = selection(2023, "May", 2023, "March")
            .resolve_range()
            .unwrap_err();
        assert!(matches!(err, RangeError::StartAfterEnd(_, _)));

        let err = selection(2024, "January", 2023, "December")
            .resolve_range()
            .unwrap_err();
        assert!(matches!(err, RangeError::StartAfterEnd(_, _)));
    }

    #[test]
    fn bucket_labels_match_month_year_column_format() {
        assert_eq!(MonthBucket::new(2023, 1).label(), "Jan 2023");
        assert_eq!(MonthBucket::new(2022, 12).label(), "Dec 2022");
    }

    #[test]
    fn buckets_order_chronologically() {
        let mut buckets = vec![
            MonthBucket::new(2023, 1),
            MonthBucket::new(2022, 12),
            MonthBucket::new(2023, 2),
        ];
        buckets.sort();
        let labels: Vec<String> = buckets.iter().map(|b| b.label()).collect();
        assert_eq!(labels, ["Dec 2022", "Jan 2023", "Feb 2023"]);
    }
}
