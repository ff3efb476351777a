//! Filter Pipeline Module
//! Pure row predicates over the prepared arrivals frame. Applied in a fixed
//! order (state, nationality, date range); every step returns a new frame
//! and never mutates its input, so the steps commute.

use chrono::NaiveDate;
use polars::prelude::*;
use std::collections::BTreeSet;

use super::EngineError;
use crate::data::loader::{COL_DATE, COL_NATIONALITY, COL_STATE};
use crate::data::FilterSelection;

/// Keep rows whose value in `column` is a member of `values`. An empty set
/// means no filter: the frame passes through unchanged.
fn by_membership(
    df: &DataFrame,
    column: &str,
    values: &BTreeSet<String>,
) -> PolarsResult<DataFrame> {
    if values.is_empty() {
        return Ok(df.clone());
    }

    let wanted = Series::new(
        column.into(),
        values.iter().cloned().collect::<Vec<String>>(),
    );
    df.clone()
        .lazy()
        .filter(col(column).is_in(lit(wanted)))
        .collect()
}

pub fn by_state(df: &DataFrame, states: &BTreeSet<String>) -> PolarsResult<DataFrame> {
    by_membership(df, COL_STATE, states)
}

pub fn by_nationality(df: &DataFrame, nationalities: &BTreeSet<String>) -> PolarsResult<DataFrame> {
    by_membership(df, COL_NATIONALITY, nationalities)
}

/// Keep rows with `start <= Date <= end`, inclusive on both ends.
pub fn by_date_range(df: &DataFrame, start: NaiveDate, end: NaiveDate) -> PolarsResult<DataFrame> {
    df.clone()
        .lazy()
        .filter(
            col(COL_DATE)
                .gt_eq(lit(start))
                .and(col(COL_DATE).lt_eq(lit(end))),
        )
        .collect()
}

/// Run the whole pipeline for a selection: state, then nationality, then
/// date range.
pub fn apply(df: &DataFrame, selection: &FilterSelection) -> Result<DataFrame, EngineError> {
    let (start, end) = selection.resolve_range()?;
    let df = by_state(df, &selection.entry_states)?;
    let df = by_nationality(&df, &selection.nationalities)?;
    Ok(by_date_range(&df, start, end)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::loader::{
        prepare, COL_FEMALE, COL_MALE, COL_TOTAL,
    };

    fn arrivals() -> DataFrame {
        prepare(
            df!(
                COL_DATE => [
                    "2023-02-28", "2023-03-01", "2023-03-15", "2023-03-31", "2023-04-01",
                ],
                COL_NATIONALITY => [
                    "Singapore", "Singapore", "Thailand", "Indonesia", "Singapore",
                ],
                COL_STATE => ["Johor", "Johor", "Kedah", "Johor", "Sarawak"],
                COL_TOTAL => [10i64, 20, 30, 40, 50],
                COL_MALE => [6i64, 12, 14, 25, 30],
                COL_FEMALE => [4i64, 8, 16, 15, 20],
            )
            .unwrap(),
        )
        .unwrap()
    }

    fn set(values: &[&str]) -> BTreeSet<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    fn march_range() -> (NaiveDate, NaiveDate) {
        (
            NaiveDate::from_ymd_opt(2023, 3, 1).unwrap(),
            NaiveDate::from_ymd_opt(2023, 3, 31).unwrap(),
        )
    }

    #[test]
    fn empty_set_is_identity() {
        let df = arrivals();
        assert_eq!(by_state(&df, &BTreeSet::new()).unwrap(), df);
        assert_eq!(by_nationality(&df, &BTreeSet::new()).unwrap(), df);
    }

    #[test]
    fn membership_keeps_only_selected_rows() {
        let df = arrivals();
        let johor = by_state(&df, &set(&["Johor"])).unwrap();
        assert_eq!(johor.height(), 3);

        let two = by_nationality(&df, &set(&["Thailand", "Indonesia"])).unwrap();
        assert_eq!(two.height(), 2);
    }

    #[test]
    fn date_range_is_inclusive_on_both_ends() {
        let df = arrivals();
        let (start, end) = march_range();
        let filtered = by_date_range(&df, start, end).unwrap();

        // 2023-03-01 and 2023-03-31 stay; 2023-02-28 and 2023-04-01 drop.
        assert_eq!(filtered.height(), 3);
        let totals: Vec<i64> = filtered
            .column(COL_TOTAL)
            .unwrap()
            .i64()
            .unwrap()
            .into_iter()
            .flatten()
            .collect();
        assert_eq!(totals, [20, 30, 40]);
    }

    #[test]
    fn state_and_nationality_filters_commute() {
        let df = arrivals();
        let states = set(&["Johor", "Kedah"]);
        let nats = set(&["Singapore", "Thailand"]);

        let a = by_nationality(&by_state(&df, &states).unwrap(), &nats).unwrap();
        let b = by_state(&by_nationality(&df, &nats).unwrap(), &states).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn pipeline_is_idempotent() {
        let df = arrivals();
        let selection = FilterSelection {
            nationalities: set(&["Singapore"]),
            entry_states: set(&["Johor"]),
            start_year: 2023,
            start_month: "March".to_string(),
            end_year: 2023,
            end_month: "March".to_string(),
        };

        let once = apply(&df, &selection).unwrap();
        let twice = apply(&once, &selection).unwrap();
        assert_eq!(once, twice);
        assert_eq!(once.height(), 1);
    }

    #[test]
    fn reversed_range_surfaces_as_range_error() {
        let df = arrivals();
        let selection = FilterSelection {
            start_year: 2023,
            start_month: "April".to_string(),
            end_year: 2023,
            end_month: "March".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            apply(&df, &selection),
            Err(EngineError::InvalidRange(_))
        ));
    }
}
