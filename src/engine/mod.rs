//! Engine module - filter pipeline and aggregation
//!
//! The full pipeline re-runs on every interaction: prepared frame -> state
//! filter -> nationality filter -> date range -> (summary, time series,
//! gender splits, table projection). The cached frame is never mutated.

pub mod aggregate;
pub mod filter;

use polars::prelude::*;
use rayon::prelude::*;
use std::collections::BTreeSet;
use thiserror::Error;

use crate::data::{FilterSelection, RangeError};
pub use aggregate::{
    format_count, DashboardModel, GenderSplit, GroupTotal, SeriesLine, Summary, TableRow,
    TimeSeriesChart,
};

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Dataframe operation failed: {0}")]
    Polars(#[from] PolarsError),
    #[error(transparent)]
    InvalidRange(#[from] RangeError),
}

/// Build the dashboard model for the current selection.
///
/// The grand total deliberately bypasses the state/nationality stages (it is
/// only shown when neither is active, and covers all states and
/// nationalities for the chosen period). Per-state charts are built in
/// parallel when several entry states are selected.
pub fn build(df: &DataFrame, selection: &FilterSelection) -> Result<DashboardModel, EngineError> {
    let (start, end) = selection.resolve_range()?;
    let filtered = filter::apply(df, selection)?;

    let summary = if !selection.has_state_filter() && !selection.has_nationality_filter() {
        let period = filter::by_date_range(df, start, end)?;
        Summary::GrandTotal(aggregate::grand_total(&period)?)
    } else {
        Summary::PerGroup(aggregate::grouped_totals(
            &filtered,
            selection.has_nationality_filter(),
            selection.has_state_filter(),
        )?)
    };

    let (time_series, gender) = if selection.has_state_filter() {
        let states: Vec<String> = selection.entry_states.iter().cloned().collect();
        let per_state = states
            .par_iter()
            .map(|state| -> Result<_, EngineError> {
                let scope = BTreeSet::from([state.clone()]);
                let scope_df = filter::by_state(&filtered, &scope)?;
                Ok((
                    aggregate::time_series(&scope_df, Some(state.clone()))?,
                    aggregate::gender_split(&scope_df, Some(state.clone()))?,
                ))
            })
            .collect::<Result<Vec<_>, EngineError>>()?;

        let mut charts = Vec::new();
        let mut splits = Vec::new();
        for (chart, split) in per_state {
            charts.extend(chart);
            splits.extend(split);
        }
        (charts, splits)
    } else {
        (
            aggregate::time_series(&filtered, None)?.into_iter().collect(),
            aggregate::gender_split(&filtered, None)?.into_iter().collect(),
        )
    };

    let rows = aggregate::table_rows(&filtered)?;

    Ok(DashboardModel {
        summary,
        time_series,
        gender,
        rows,
    })
}
