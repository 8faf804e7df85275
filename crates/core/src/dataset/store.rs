//! Dataset trait and error type.

use thiserror::Error;

use super::types::{CellValue, Row};

/// Error type for dataset operations.
#[derive(Debug, Error)]
pub enum DatasetError {
    /// Row or column outside the sheet (coordinates are 1-based).
    #[error("Cell out of range: row {row}, column {column}")]
    OutOfRange { row: usize, column: usize },

    /// Backing file could not be read or written.
    #[error("Dataset I/O error: {0}")]
    Io(String),

    /// Backing file is not valid tabular data.
    #[error("Malformed dataset: {0}")]
    Malformed(String),
}

/// Tabular store the ticket and card stages operate on.
///
/// Rows and columns are 1-based; row 1 is the header.
pub trait Dataset: Send + Sync {
    /// Read every row, header included.
    fn read_all(&self) -> Result<Vec<Row>, DatasetError>;

    /// Read a single cell. Cells past the end of a ragged row read as `Empty`.
    fn read_cell(&self, row: usize, column: usize) -> Result<CellValue, DatasetError>;

    /// Write a single cell. The write is durable when this returns.
    fn write_cell(&self, row: usize, column: usize, value: CellValue) -> Result<(), DatasetError>;

    /// Last populated column across the sheet (0 for an empty sheet).
    fn last_column(&self) -> Result<usize, DatasetError>;

    /// Number of rows, header included.
    fn row_count(&self) -> Result<usize, DatasetError>;

    /// Read a full row, columns 1..=last_column.
    fn read_row(&self, row: usize) -> Result<Row, DatasetError> {
        let last = self.last_column()?;
        if row == 0 || row > self.row_count()? {
            return Err(DatasetError::OutOfRange { row, column: 1 });
        }
        let cells = (1..=last)
            .map(|column| self.read_cell(row, column))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Row::new(cells))
    }
}
