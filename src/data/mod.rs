//! Data module - CSV loading and filter selection

pub mod loader;
pub mod selection;

pub use loader::{ArrivalData, LoaderError};
pub use selection::{FilterSelection, MonthBucket, RangeError, MONTH_NAMES};
