//! Aggregator Module
//! Turns a filtered arrivals frame into the dashboard outputs: summary
//! totals, chronological time series, gender splits and the raw-data
//! table projection.

use polars::prelude::*;
use serde::Serialize;
use std::collections::BTreeMap;

use crate::data::loader::{
    COL_FEMALE, COL_MALE, COL_MONTH, COL_MONTH_YEAR, COL_NATIONALITY, COL_STATE, COL_TOTAL,
    COL_YEAR,
};
use crate::data::MonthBucket;

/// Total arrivals for one group of the active filter keys.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupTotal {
    pub nationality: Option<String>,
    pub state: Option<String>,
    pub total: i64,
}

impl GroupTotal {
    /// Summary wording, matching the dashboard's original phrasing.
    pub fn headline(&self) -> String {
        let total = format_count(self.total);
        match (&self.nationality, &self.state) {
            (Some(nat), Some(state)) => {
                format!("Total {} Citizens Entrance from {}: {}", nat, state, total)
            }
            (Some(nat), None) => format!("Total {} Citizens Entrance to Malaysia: {}", nat, total),
            (None, Some(state)) => format!("Total Entrance from {}: {}", state, total),
            (None, None) => format!("Total Arrivals to Malaysia: {}", total),
        }
    }
}

/// Summary block: one grand total when no state/nationality filter is
/// active, otherwise one line per group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Summary {
    GrandTotal(i64),
    PerGroup(Vec<GroupTotal>),
}

impl Summary {
    pub fn lines(&self) -> Vec<String> {
        match self {
            Summary::GrandTotal(total) => {
                vec![format!("Total Arrivals to Malaysia: {}", format_count(*total))]
            }
            Summary::PerGroup(groups) => groups.iter().map(GroupTotal::headline).collect(),
        }
    }
}

/// One line of a time-series chart; x is the bucket index into
/// [`TimeSeriesChart::buckets`], y the summed arrivals.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesLine {
    pub nationality: String,
    pub points: Vec<[f64; 2]>,
}

/// Line-chart data for one scope: all states, or a single selected state.
/// Buckets are chronological by (year, month), never by label text.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimeSeriesChart {
    pub scope: Option<String>,
    pub buckets: Vec<MonthBucket>,
    pub series: Vec<SeriesLine>,
}

impl TimeSeriesChart {
    pub fn title(&self) -> String {
        match &self.scope {
            Some(state) => format!("Total Arrivals Over Time for {}", state),
            None => "Total Arrivals Over Time for All States".to_string(),
        }
    }

    pub fn bucket_labels(&self) -> Vec<String> {
        self.buckets.iter().map(MonthBucket::label).collect()
    }
}

/// Male/female grand totals for one scope over the filtered period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GenderSplit {
    pub scope: Option<String>,
    pub male: i64,
    pub female: i64,
}

impl GenderSplit {
    pub fn title(&self) -> String {
        match &self.scope {
            Some(state) => format!("Male and Female Arrivals for {}", state),
            None => "Total Male and Female Arrivals to Malaysia".to_string(),
        }
    }

    pub fn total(&self) -> i64 {
        self.male + self.female
    }
}

/// One row of the Raw Data table (fixed column subset of the filtered set).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableRow {
    pub state: String,
    pub nationality: String,
    pub total: i64,
    pub male: i64,
    pub female: i64,
    pub month_year: String,
}

/// Everything a single interaction renders.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardModel {
    pub summary: Summary,
    pub time_series: Vec<TimeSeriesChart>,
    pub gender: Vec<GenderSplit>,
    pub rows: Vec<TableRow>,
}

impl DashboardModel {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

fn sum_column(df: &DataFrame, column: &str) -> PolarsResult<i64> {
    let cast = df.column(column)?.cast(&DataType::Int64)?;
    Ok(cast.i64()?.sum().unwrap_or(0))
}

/// Sum of `Total Arrivals` over the whole frame.
pub fn grand_total(df: &DataFrame) -> PolarsResult<i64> {
    sum_column(df, COL_TOTAL)
}

/// Group the filtered frame by the active key(s) and sum total arrivals.
/// Output is in sorted-key order.
pub fn grouped_totals(
    df: &DataFrame,
    by_nationality: bool,
    by_state: bool,
) -> PolarsResult<Vec<GroupTotal>> {
    let mut keys: Vec<Expr> = Vec::new();
    let mut sort_by: Vec<&str> = Vec::new();
    if by_nationality {
        keys.push(col(COL_NATIONALITY));
        sort_by.push(COL_NATIONALITY);
    }
    if by_state {
        keys.push(col(COL_STATE));
        sort_by.push(COL_STATE);
    }
    if keys.is_empty() || df.height() == 0 {
        return Ok(Vec::new());
    }

    let grouped = df
        .clone()
        .lazy()
        .group_by(keys)
        .agg([col(COL_TOTAL).sum().alias(COL_TOTAL)])
        .sort(sort_by, SortMultipleOptions::default())
        .collect()?;

    let totals = grouped.column(COL_TOTAL)?.cast(&DataType::Int64)?;
    let totals = totals.i64()?;

    let mut out = Vec::with_capacity(grouped.height());
    for i in 0..grouped.height() {
        let nationality = if by_nationality {
            grouped
                .column(COL_NATIONALITY)?
                .str()?
                .get(i)
                .map(str::to_string)
        } else {
            None
        };
        let state = if by_state {
            grouped.column(COL_STATE)?.str()?.get(i).map(str::to_string)
        } else {
            None
        };
        out.push(GroupTotal {
            nationality,
            state,
            total: totals.get(i).unwrap_or(0),
        });
    }
    Ok(out)
}

/// Build the time-series chart for one scope frame: group by (year, month,
/// nationality), sum totals, order buckets chronologically. Returns `None`
/// for an empty scope so the view simply draws nothing for it.
pub fn time_series(df: &DataFrame, scope: Option<String>) -> PolarsResult<Option<TimeSeriesChart>> {
    if df.height() == 0 {
        return Ok(None);
    }

    let grouped = df
        .clone()
        .lazy()
        .group_by([col(COL_YEAR), col(COL_MONTH), col(COL_NATIONALITY)])
        .agg([col(COL_TOTAL).sum().alias(COL_TOTAL)])
        .sort(
            [COL_YEAR, COL_MONTH, COL_NATIONALITY],
            SortMultipleOptions::default(),
        )
        .collect()?;

    let years = grouped.column(COL_YEAR)?.cast(&DataType::Int32)?;
    let years = years.i32()?;
    let months = grouped.column(COL_MONTH)?.cast(&DataType::UInt32)?;
    let months = months.u32()?;
    let totals = grouped.column(COL_TOTAL)?.cast(&DataType::Int64)?;
    let totals = totals.i64()?;
    let nationalities = grouped.column(COL_NATIONALITY)?.str()?;

    // Buckets arrive pre-sorted; dedup while assigning indices.
    let mut buckets: Vec<MonthBucket> = Vec::new();
    let mut bucket_index: BTreeMap<MonthBucket, usize> = BTreeMap::new();
    let mut per_nationality: BTreeMap<String, Vec<[f64; 2]>> = BTreeMap::new();

    for i in 0..grouped.height() {
        let (Some(year), Some(month), Some(nat)) = (years.get(i), months.get(i), nationalities.get(i))
        else {
            continue;
        };
        let bucket = MonthBucket::new(year, month);
        let idx = *bucket_index.entry(bucket).or_insert_with(|| {
            buckets.push(bucket);
            buckets.len() - 1
        });
        per_nationality
            .entry(nat.to_string())
            .or_default()
            .push([idx as f64, totals.get(i).unwrap_or(0) as f64]);
    }

    let series = per_nationality
        .into_iter()
        .map(|(nationality, points)| SeriesLine {
            nationality,
            points,
        })
        .collect();

    Ok(Some(TimeSeriesChart {
        scope,
        buckets,
        series,
    }))
}

/// Male/female grand totals for one scope frame; `None` when the scope is
/// empty.
pub fn gender_split(df: &DataFrame, scope: Option<String>) -> PolarsResult<Option<GenderSplit>> {
    if df.height() == 0 {
        return Ok(None);
    }
    Ok(Some(GenderSplit {
        scope,
        male: sum_column(df, COL_MALE)?,
        female: sum_column(df, COL_FEMALE)?,
    }))
}

/// Project the filtered frame onto the Raw Data column subset.
pub fn table_rows(df: &DataFrame) -> PolarsResult<Vec<TableRow>> {
    let states = df.column(COL_STATE)?.str()?;
    let nationalities = df.column(COL_NATIONALITY)?.str()?;
    let month_years = df.column(COL_MONTH_YEAR)?.str()?;
    let totals = df.column(COL_TOTAL)?.cast(&DataType::Int64)?;
    let totals = totals.i64()?;
    let males = df.column(COL_MALE)?.cast(&DataType::Int64)?;
    let males = males.i64()?;
    let females = df.column(COL_FEMALE)?.cast(&DataType::Int64)?;
    let females = females.i64()?;

    let mut rows = Vec::with_capacity(df.height());
    for i in 0..df.height() {
        rows.push(TableRow {
            state: states.get(i).unwrap_or("").to_string(),
            nationality: nationalities.get(i).unwrap_or("").to_string(),
            total: totals.get(i).unwrap_or(0),
            male: males.get(i).unwrap_or(0),
            female: females.get(i).unwrap_or(0),
            month_year: month_years.get(i).unwrap_or("").to_string(),
        });
    }
    Ok(rows)
}

/// Thousands-separated count, e.g. 1234567 -> "1,234,567".
pub fn format_count(n: i64) -> String {
    let digits = n.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    if n < 0 {
        format!("-{}", out)
    } else {
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::loader::{prepare, COL_DATE};

    fn arrivals() -> DataFrame {
        prepare(
            df!(
                COL_DATE => [
                    "2023-01-10", "2022-12-05", "2023-02-14", "2023-01-25", "2022-12-20",
                ],
                COL_NATIONALITY => [
                    "Singapore", "Thailand", "Singapore", "Thailand", "Singapore",
                ],
                COL_STATE => ["Johor", "Kedah", "Johor", "Johor", "Kedah"],
                COL_TOTAL => [100i64, 50, 70, 40, 90],
                COL_MALE => [60i64, 20, 30, 25, 50],
                COL_FEMALE => [40i64, 30, 40, 15, 40],
            )
            .unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn grand_total_sums_all_rows() {
        assert_eq!(grand_total(&arrivals()).unwrap(), 350);
    }

    #[test]
    fn grouped_totals_are_keyed_and_sorted() {
        let by_nat = grouped_totals(&arrivals(), true, false).unwrap();
        assert_eq!(by_nat.len(), 2);
        assert_eq!(by_nat[0].nationality.as_deref(), Some("Singapore"));
        assert_eq!(by_nat[0].total, 260);
        assert_eq!(by_nat[1].nationality.as_deref(), Some("Thailand"));
        assert_eq!(by_nat[1].total, 90);

        let compound = grouped_totals(&arrivals(), true, true).unwrap();
        assert_eq!(compound.len(), 4);
        assert_eq!(compound[0].nationality.as_deref(), Some("Singapore"));
        assert_eq!(compound[0].state.as_deref(), Some("Johor"));
        assert_eq!(compound[0].total, 170);
    }

    #[test]
    fn grand_total_equals_sum_of_per_nationality_totals() {
        let df = arrivals();
        let by_nat = grouped_totals(&df, true, false).unwrap();
        let sum: i64 = by_nat.iter().map(|g| g.total).sum();
        assert_eq!(grand_total(&df).unwrap(), sum);
    }

    #[test]
    fn time_series_buckets_are_chronological_not_lexical() {
        let chart = time_series(&arrivals(), None).unwrap().unwrap();
        assert_eq!(
            chart.bucket_labels(),
            ["Dec 2022", "Jan 2023", "Feb 2023"]
        );
    }

    #[test]
    fn time_series_sums_per_bucket_and_nationality() {
        let chart = time_series(&arrivals(), None).unwrap().unwrap();
        assert_eq!(chart.series.len(), 2);

        let singapore = &chart.series[0];
        assert_eq!(singapore.nationality, "Singapore");
        // Dec 2022: 90, Jan 2023: 100, Feb 2023: 70.
        assert_eq!(
            singapore.points,
            vec![[0.0, 90.0], [1.0, 100.0], [2.0, 70.0]]
        );

        let thailand = &chart.series[1];
        assert_eq!(thailand.nationality, "Thailand");
        assert_eq!(thailand.points, vec![[0.0, 50.0], [1.0, 40.0]]);
    }

    #[test]
    fn empty_frame_yields_no_chart_or_split() {
        let empty = arrivals().head(Some(0));
        assert_eq!(time_series(&empty, None).unwrap(), None);
        assert_eq!(gender_split(&empty, None).unwrap(), None);
        assert!(grouped_totals(&empty, true, false).unwrap().is_empty());
    }

    #[test]
    fn gender_split_conserves_total_sum() {
        let df = arrivals();
        let split = gender_split(&df, None).unwrap().unwrap();
        assert_eq!(split.male, 185);
        assert_eq!(split.female, 165);
        assert_eq!(split.total(), grand_total(&df).unwrap());
    }

    #[test]
    fn table_rows_project_fixed_columns() {
        let rows = table_rows(&arrivals()).unwrap();
        assert_eq!(rows.len(), 5);
        assert_eq!(
            rows[0],
            TableRow {
                state: "Johor".to_string(),
                nationality: "Singapore".to_string(),
                total: 100,
                male: 60,
                female: 40,
                month_year: "Jan 2023".to_string(),
            }
        );
    }

    #[test]
    fn headlines_match_dashboard_wording() {
        let both = GroupTotal {
            nationality: Some("Singapore".to_string()),
            state: Some("Johor".to_string()),
            total: 1234,
        };
        assert_eq!(
            both.headline(),
            "Total Singapore Citizens Entrance from Johor: 1,234"
        );

        let nat_only = GroupTotal {
            nationality: Some("Thailand".to_string()),
            state: None,
            total: 90,
        };
        assert_eq!(
            nat_only.headline(),
            "Total Thailand Citizens Entrance to Malaysia: 90"
        );

        let state_only = GroupTotal {
            nationality: None,
            state: Some("Kedah".to_string()),
            total: 140,
        };
        assert_eq!(state_only.headline(), "Total Entrance from Kedah: 140");

        assert_eq!(
            Summary::GrandTotal(2500000).lines(),
            ["Total Arrivals to Malaysia: 2,500,000"]
        );
    }

    #[test]
    fn count_formatting_inserts_separators() {
        assert_eq!(format_count(0), "0");
        assert_eq!(format_count(999), "999");
        assert_eq!(format_count(1000), "1,000");
        assert_eq!(format_count(1234567), "1,234,567");
        assert_eq!(format_count(-45678), "-45,678");
    }
}
