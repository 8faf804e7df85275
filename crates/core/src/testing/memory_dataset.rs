//! In-memory dataset for testing.

use std::sync::Mutex;

use crate::dataset::{CellValue, Dataset, DatasetError, Row};

#[derive(Debug, Default)]
struct Inner {
    rows: Vec<Vec<CellValue>>,
    writes: usize,
    /// Writes at or beyond this count fail.
    fail_from: Option<usize>,
}

/// In-memory implementation of the Dataset trait.
///
/// Provides controllable behavior for testing:
/// - Inspect the sheet after a scan
/// - Count cell writes
/// - Make writes fail after a number of successful ones
///
/// # Example
///
/// ```rust,ignore
/// use ticketcard_core::testing::{fixtures, MemoryDataset};
///
/// let dataset = MemoryDataset::from_rows(vec![
///     fixtures::header_row(),
///     fixtures::response_row("", "2024-03-07"),
/// ]);
/// dataset.fail_writes_after(0);
/// ```
#[derive(Debug, Default)]
pub struct MemoryDataset {
    inner: Mutex<Inner>,
}

impl MemoryDataset {
    /// Create a dataset from raw rows, header first.
    pub fn from_rows(rows: Vec<Vec<CellValue>>) -> Self {
        Self {
            inner: Mutex::new(Inner {
                rows,
                ..Inner::default()
            }),
        }
    }

    /// Copy of the current cells.
    pub fn snapshot(&self) -> Vec<Vec<CellValue>> {
        self.inner.lock().unwrap().rows.clone()
    }

    /// Append a row, e.g. a new form submission between scans.
    pub fn push_row(&self, row: Vec<CellValue>) {
        self.inner.lock().unwrap().rows.push(row);
    }

    /// Number of successful cell writes so far.
    pub fn write_count(&self) -> usize {
        self.inner.lock().unwrap().writes
    }

    /// Let `n` more writes succeed, then fail every write after that.
    pub fn fail_writes_after(&self, n: usize) {
        let mut inner = self.inner.lock().unwrap();
        inner.fail_from = Some(inner.writes + n);
    }

    /// Stop failing writes.
    pub fn clear_write_failure(&self) {
        self.inner.lock().unwrap().fail_from = None;
    }
}

impl Dataset for MemoryDataset {
    fn read_all(&self) -> Result<Vec<Row>, DatasetError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.rows.iter().cloned().map(Row::new).collect())
    }

    fn read_cell(&self, row: usize, column: usize) -> Result<CellValue, DatasetError> {
        let inner = self.inner.lock().unwrap();
        if row == 0 || column == 0 || row > inner.rows.len() {
            return Err(DatasetError::OutOfRange { row, column });
        }
        Ok(inner.rows[row - 1]
            .get(column - 1)
            .cloned()
            .unwrap_or_default())
    }

    fn write_cell(&self, row: usize, column: usize, value: CellValue) -> Result<(), DatasetError> {
        let mut inner = self.inner.lock().unwrap();
        if row == 0 || column == 0 || row > inner.rows.len() {
            return Err(DatasetError::OutOfRange { row, column });
        }
        if inner.fail_from.is_some_and(|limit| inner.writes >= limit) {
            return Err(DatasetError::Io(format!(
                "simulated write failure at row {}, column {}",
                row, column
            )));
        }

        let cells = &mut inner.rows[row - 1];
        if cells.len() < column {
            cells.resize(column, CellValue::Empty);
        }
        cells[column - 1] = value;
        inner.writes += 1;
        Ok(())
    }

    fn last_column(&self) -> Result<usize, DatasetError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .rows
            .iter()
            .map(|cells| {
                cells
                    .iter()
                    .rposition(|c| *c != CellValue::Empty)
                    .map_or(0, |idx| idx + 1)
            })
            .max()
            .unwrap_or(0))
    }

    fn row_count(&self) -> Result<usize, DatasetError> {
        Ok(self.inner.lock().unwrap().rows.len())
    }
}
