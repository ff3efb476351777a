//! CSV Data Loader Module
//! Loads the arrivals CSV with Polars, validates the schema and derives the
//! Year / Month / Month-Year columns used by the filter pipeline.

use log::info;
use polars::prelude::*;
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use thiserror::Error;

use super::selection::MonthBucket;

pub const COL_DATE: &str = "Date";
pub const COL_NATIONALITY: &str = "Nationality";
pub const COL_STATE: &str = "State of Entry";
pub const COL_TOTAL: &str = "Total Arrivals";
pub const COL_MALE: &str = "Male Arrivals";
pub const COL_FEMALE: &str = "Female Arrivals";

// Derived at load time, not present in the source file.
pub const COL_YEAR: &str = "Year";
pub const COL_MONTH: &str = "Month";
pub const COL_MONTH_YEAR: &str = "Month-Year";

/// Columns the source file must provide (case-sensitive).
pub const REQUIRED_COLUMNS: [&str; 6] = [
    COL_DATE,
    COL_NATIONALITY,
    COL_STATE,
    COL_TOTAL,
    COL_MALE,
    COL_FEMALE,
];

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("Failed to load CSV: {0}")]
    Csv(#[from] PolarsError),
    #[error("Missing required columns: {0}")]
    MissingColumns(String),
    #[error("Date column has unsupported type: {0}")]
    BadDateColumn(String),
    #[error("No data rows in file")]
    NoData,
}

/// The arrivals table plus everything the controls need from it: unique
/// nationality/state labels, the years and months present, and the
/// earliest/latest month bucket. Built once per load, immutable thereafter.
pub struct ArrivalData {
    df: DataFrame,
    path: PathBuf,
    nationalities: Vec<String>,
    states: Vec<String>,
    years: Vec<i32>,
    months_by_year: BTreeMap<i32, Vec<u32>>,
    first: MonthBucket,
    last: MonthBucket,
}

impl ArrivalData {
    /// Load a CSV file from disk. The file is read at most once per
    /// [`ArrivalData`]; the result is held by the app for the process
    /// lifetime.
    pub fn load(path: &Path) -> Result<Self, LoaderError> {
        let df = LazyCsvReader::new(path)
            .with_infer_schema_length(Some(10000))
            .finish()?
            .collect()?;

        let data = Self::from_frame(df, path.to_path_buf())?;
        info!(
            "loaded {} arrival rows from {} ({} nationalities, {} states, {} - {})",
            data.df.height(),
            path.display(),
            data.nationalities.len(),
            data.states.len(),
            data.first.label(),
            data.last.label(),
        );
        Ok(data)
    }

    pub(crate) fn from_frame(df: DataFrame, path: PathBuf) -> Result<Self, LoaderError> {
        let df = prepare(df)?;
        if df.height() == 0 {
            return Err(LoaderError::NoData);
        }

        let mut nationalities = unique_strings(&df, COL_NATIONALITY)?;
        nationalities.sort();
        let mut states = unique_strings(&df, COL_STATE)?;
        states.sort();

        let months_by_year = months_by_year(&df)?;
        let years: Vec<i32> = months_by_year.keys().copied().collect();

        let first = months_by_year
            .iter()
            .next()
            .and_then(|(y, ms)| ms.first().map(|m| MonthBucket::new(*y, *m)))
            .ok_or(LoaderError::NoData)?;
        let last = months_by_year
            .iter()
            .next_back()
            .and_then(|(y, ms)| ms.last().map(|m| MonthBucket::new(*y, *m)))
            .ok_or(LoaderError::NoData)?;

        Ok(Self {
            df,
            path,
            nationalities,
            states,
            years,
            months_by_year,
            first,
            last,
        })
    }

    pub fn df(&self) -> &DataFrame {
        &self.df
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn row_count(&self) -> usize {
        self.df.height()
    }

    pub fn nationalities(&self) -> &[String] {
        &self.nationalities
    }

    pub fn states(&self) -> &[String] {
        &self.states
    }

    pub fn years(&self) -> &[i32] {
        &self.years
    }

    /// Months (1-12) with data in the given year, ascending. The month
    /// dropdowns only offer these.
    pub fn months_in_year(&self, year: i32) -> &[u32] {
        self.months_by_year
            .get(&year)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn first_bucket(&self) -> MonthBucket {
        self.first
    }

    pub fn last_bucket(&self) -> MonthBucket {
        self.last
    }
}

/// Normalize a raw frame into the working table: drop the spurious unnamed
/// index column pandas exports tend to carry, validate the schema, parse
/// `Date`, cast the count columns to Int64 and derive Year / Month /
/// Month-Year.
pub fn prepare(df: DataFrame) -> Result<DataFrame, LoaderError> {
    // Drop "Unnamed: 0"-style index columns.
    let keep: Vec<String> = df
        .get_column_names()
        .iter()
        .filter(|name| !name.starts_with("Unnamed"))
        .map(|name| name.to_string())
        .collect();
    let df = df.select(keep)?;

    let missing: Vec<&str> = REQUIRED_COLUMNS
        .iter()
        .copied()
        .filter(|name| df.column(name).is_err())
        .collect();
    if !missing.is_empty() {
        return Err(LoaderError::MissingColumns(missing.join(", ")));
    }

    let lf = match df.column(COL_DATE)?.dtype() {
        DataType::String => df.clone().lazy().with_column(
            col(COL_DATE)
                .str()
                .to_date(StrptimeOptions {
                    format: None,
                    ..Default::default()
                })
                .alias(COL_DATE),
        ),
        DataType::Date => df.clone().lazy(),
        other => return Err(LoaderError::BadDateColumn(other.to_string())),
    };

    let df = lf
        .with_columns([
            col(COL_TOTAL).cast(DataType::Int64),
            col(COL_MALE).cast(DataType::Int64),
            col(COL_FEMALE).cast(DataType::Int64),
        ])
        .with_columns([
            col(COL_DATE).dt().year().alias(COL_YEAR),
            col(COL_DATE).dt().month().alias(COL_MONTH),
            col(COL_DATE).dt().to_string("%b %Y").alias(COL_MONTH_YEAR),
        ])
        .collect()?;

    Ok(df)
}

/// Unique non-null values of a string column, in no particular order.
fn unique_strings(df: &DataFrame, column: &str) -> Result<Vec<String>, LoaderError> {
    let unique = df.column(column)?.unique()?;
    let series = unique.as_materialized_series();
    Ok((0..series.len())
        .filter_map(|i| {
            let val = series.get(i).ok()?;
            if val.is_null() {
                None
            } else {
                Some(val.to_string().trim_matches('"').to_string())
            }
        })
        .collect())
}

fn months_by_year(df: &DataFrame) -> Result<BTreeMap<i32, Vec<u32>>, LoaderError> {
    let years = df.column(COL_YEAR)?.cast(&DataType::Int32)?;
    let years = years.i32()?;
    let months = df.column(COL_MONTH)?.cast(&DataType::UInt32)?;
    let months = months.u32()?;

    let mut map: BTreeMap<i32, BTreeSet<u32>> = BTreeMap::new();
    for (year, month) in years.into_iter().zip(months) {
        if let (Some(y), Some(m)) = (year, month) {
            map.entry(y).or_default().insert(m);
        }
    }

    Ok(map
        .into_iter()
        .map(|(y, ms)| (y, ms.into_iter().collect()))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw_frame() -> DataFrame {
        df!(
            "Unnamed: 0" => [0i64, 1, 2, 3],
            COL_DATE => ["2023-01-15", "2022-12-01", "2023-02-28", "2023-01-20"],
            COL_NATIONALITY => ["Singapore", "Thailand", "Singapore", "Indonesia"],
            COL_STATE => ["Johor", "Kedah", "Johor", "Sarawak"],
            COL_TOTAL => [100i64, 50, 70, 30],
            COL_MALE => [60i64, 20, 30, 10],
            COL_FEMALE => [40i64, 30, 40, 20],
        )
        .unwrap()
    }

    #[test]
    fn prepare_drops_unnamed_index_and_derives_columns() {
        let df = prepare(raw_frame()).unwrap();
        let names: Vec<String> = df
            .get_column_names()
            .iter()
            .map(|n| n.to_string())
            .collect();

        assert!(!names.iter().any(|n| n.starts_with("Unnamed")));
        assert!(names.contains(&COL_YEAR.to_string()));
        assert!(names.contains(&COL_MONTH.to_string()));
        assert!(names.contains(&COL_MONTH_YEAR.to_string()));
        assert_eq!(df.column(COL_DATE).unwrap().dtype(), &DataType::Date);

        let labels = unique_strings(&df, COL_MONTH_YEAR).unwrap();
        assert!(labels.contains(&"Dec 2022".to_string()));
        assert!(labels.contains(&"Jan 2023".to_string()));
    }

    #[test]
    fn prepare_reports_missing_columns() {
        let df = df!(
            COL_DATE => ["2023-01-15"],
            COL_NATIONALITY => ["Singapore"],
        )
        .unwrap();

        match prepare(df) {
            Err(LoaderError::MissingColumns(missing)) => {
                assert!(missing.contains(COL_STATE));
                assert!(missing.contains(COL_TOTAL));
                assert!(!missing.contains(COL_DATE));
            }
            other => panic!("expected MissingColumns, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn metadata_covers_span_and_uniques() {
        let data = ArrivalData::from_frame(raw_frame(), PathBuf::from("test.csv")).unwrap();

        assert_eq!(data.nationalities(), ["Indonesia", "Singapore", "Thailand"]);
        assert_eq!(data.states(), ["Johor", "Kedah", "Sarawak"]);
        assert_eq!(data.years(), [2022, 2023]);
        assert_eq!(data.months_in_year(2022), [12]);
        assert_eq!(data.months_in_year(2023), [1, 2]);
        assert_eq!(data.first_bucket(), MonthBucket::new(2022, 12));
        assert_eq!(data.last_bucket(), MonthBucket::new(2023, 2));
    }

    #[test]
    fn load_reads_csv_from_disk() {
        let path = std::env::temp_dir().join("my_entrance_loader_test.csv");
        std::fs::write(
            &path,
            "Date,Nationality,State of Entry,Total Arrivals,Male Arrivals,Female Arrivals\n\
             2023-03-05,Singapore,Johor,120,70,50\n\
             2023-03-12,Thailand,Kedah,80,30,50\n",
        )
        .unwrap();

        let data = ArrivalData::load(&path).unwrap();
        assert_eq!(data.row_count(), 2);
        assert_eq!(data.first_bucket(), MonthBucket::new(2023, 3));

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn load_fails_for_missing_file() {
        let path = std::env::temp_dir().join("my_entrance_no_such_file.csv");
        assert!(ArrivalData::load(&path).is_err());
    }
}
