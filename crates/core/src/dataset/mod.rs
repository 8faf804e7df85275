//! Tabular dataset access (the response sheet).

mod csv_store;
mod store;
mod types;

pub use csv_store::CsvDataset;
pub use store::{Dataset, DatasetError};
pub use types::{CellValue, HeaderMap, Row};
