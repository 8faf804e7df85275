//! CSV-file backed dataset.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use super::{CellValue, Dataset, DatasetError, Row};

/// Dataset backed by a CSV file, header in the first record.
///
/// The file is loaded once; every `write_cell` rewrites it through a sibling
/// temporary file and a rename so a completed write survives an interruption.
pub struct CsvDataset {
    path: PathBuf,
    records: Mutex<Vec<Vec<String>>>,
}

impl CsvDataset {
    /// Open and load a CSV file.
    pub fn open(path: &Path) -> Result<Self, DatasetError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_path(path)
            .map_err(|e| DatasetError::Io(format!("{}: {}", path.display(), e)))?;

        let mut records = Vec::new();
        for result in reader.records() {
            let record = result.map_err(|e| DatasetError::Malformed(e.to_string()))?;
            records.push(record.iter().map(str::to_string).collect::<Vec<_>>());
        }

        Ok(Self {
            path: path.to_path_buf(),
            records: Mutex::new(records),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, records: &[Vec<String>]) -> Result<(), DatasetError> {
        let tmp_path = self.path.with_extension("csv.tmp");

        let mut writer = csv::WriterBuilder::new()
            .flexible(true)
            .from_path(&tmp_path)
            .map_err(|e| DatasetError::Io(format!("{}: {}", tmp_path.display(), e)))?;
        for record in records {
            writer
                .write_record(record)
                .map_err(|e| DatasetError::Io(e.to_string()))?;
        }
        writer
            .flush()
            .map_err(|e| DatasetError::Io(e.to_string()))?;
        drop(writer);

        fs::rename(&tmp_path, &self.path)
            .map_err(|e| DatasetError::Io(format!("{}: {}", self.path.display(), e)))
    }
}

impl Dataset for CsvDataset {
    fn read_all(&self) -> Result<Vec<Row>, DatasetError> {
        let records = self.records.lock().unwrap();
        Ok(records
            .iter()
            .map(|record| Row::new(record.iter().map(|raw| CellValue::from_raw(raw)).collect()))
            .collect())
    }

    fn read_cell(&self, row: usize, column: usize) -> Result<CellValue, DatasetError> {
        let records = self.records.lock().unwrap();
        if row == 0 || column == 0 || row > records.len() {
            return Err(DatasetError::OutOfRange { row, column });
        }
        Ok(records[row - 1]
            .get(column - 1)
            .map(|raw| CellValue::from_raw(raw))
            .unwrap_or_default())
    }

    fn write_cell(&self, row: usize, column: usize, value: CellValue) -> Result<(), DatasetError> {
        let mut records = self.records.lock().unwrap();
        if row == 0 || column == 0 || row > records.len() {
            return Err(DatasetError::OutOfRange { row, column });
        }

        let record = &mut records[row - 1];
        if record.len() < column {
            record.resize(column, String::new());
        }
        let previous = std::mem::replace(&mut record[column - 1], value.to_string());

        if let Err(e) = self.persist(&records) {
            // keep memory in step with the file
            records[row - 1][column - 1] = previous;
            return Err(e);
        }
        Ok(())
    }

    fn last_column(&self) -> Result<usize, DatasetError> {
        let records = self.records.lock().unwrap();
        Ok(records
            .iter()
            .map(|record| {
                record
                    .iter()
                    .rposition(|raw| !raw.is_empty())
                    .map_or(0, |idx| idx + 1)
            })
            .max()
            .unwrap_or(0))
    }

    fn row_count(&self) -> Result<usize, DatasetError> {
        Ok(self.records.lock().unwrap().len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_sheet(dir: &TempDir, contents: &str) -> PathBuf {
        let path = dir.path().join("responses.csv");
        fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_open_and_read() {
        let dir = TempDir::new().unwrap();
        let path = write_sheet(
            &dir,
            "Ticket,Timestamp,Last Name\n,2024-03-07 10:00:00,Reyes\n00002-0101,,\n",
        );
        let dataset = CsvDataset::open(&path).unwrap();

        assert_eq!(dataset.row_count().unwrap(), 3);
        assert_eq!(dataset.last_column().unwrap(), 3);

        let rows = dataset.read_all().unwrap();
        assert_eq!(rows[1].cell(1), &CellValue::Empty);
        assert_eq!(rows[1].cell(3), &CellValue::Text("Reyes".to_string()));
        assert_eq!(
            dataset.read_cell(3, 1).unwrap(),
            CellValue::Text("00002-0101".to_string())
        );
    }

    #[test]
    fn test_ragged_rows_read_as_empty() {
        let dir = TempDir::new().unwrap();
        let path = write_sheet(&dir, "A,B,C\nx\n");
        let dataset = CsvDataset::open(&path).unwrap();

        assert_eq!(dataset.read_cell(2, 3).unwrap(), CellValue::Empty);
        let row = dataset.read_row(2).unwrap();
        assert_eq!(row.len(), 3);
        assert_eq!(row.cell(1), &CellValue::Text("x".to_string()));
    }

    #[test]
    fn test_write_cell_persists_to_file() {
        let dir = TempDir::new().unwrap();
        let path = write_sheet(&dir, "Ticket,Timestamp\n,2024-03-07\n");
        let dataset = CsvDataset::open(&path).unwrap();

        dataset
            .write_cell(2, 1, CellValue::Text("00001-0307".to_string()))
            .unwrap();

        let reopened = CsvDataset::open(&path).unwrap();
        assert_eq!(
            reopened.read_cell(2, 1).unwrap(),
            CellValue::Text("00001-0307".to_string())
        );
        assert_eq!(
            reopened.read_cell(2, 2).unwrap(),
            CellValue::Text("2024-03-07".to_string())
        );
        assert!(!dir.path().join("responses.csv.tmp").exists());
    }

    #[test]
    fn test_write_extends_short_row() {
        let dir = TempDir::new().unwrap();
        let path = write_sheet(&dir, "A,B,C\nx\n");
        let dataset = CsvDataset::open(&path).unwrap();

        dataset
            .write_cell(2, 3, CellValue::Text("z".to_string()))
            .unwrap();
        assert_eq!(
            dataset.read_cell(2, 3).unwrap(),
            CellValue::Text("z".to_string())
        );
        assert_eq!(dataset.read_cell(2, 2).unwrap(), CellValue::Empty);
    }

    #[test]
    fn test_out_of_range() {
        let dir = TempDir::new().unwrap();
        let path = write_sheet(&dir, "A\n1\n");
        let dataset = CsvDataset::open(&path).unwrap();

        assert!(matches!(
            dataset.read_cell(5, 1),
            Err(DatasetError::OutOfRange { row: 5, column: 1 })
        ));
        assert!(matches!(
            dataset.write_cell(0, 1, CellValue::Empty),
            Err(DatasetError::OutOfRange { .. })
        ));
        assert!(dataset.read_row(3).is_err());
    }

    #[test]
    fn test_quoted_values_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = write_sheet(
            &dir,
            "Ticket,Chosen Package\n,\"Package C (A+B)\"\n,\"Reyes, Jr.\"\n",
        );
        let dataset = CsvDataset::open(&path).unwrap();
        dataset
            .write_cell(2, 1, CellValue::Text("00001-0101".to_string()))
            .unwrap();

        let reopened = CsvDataset::open(&path).unwrap();
        assert_eq!(
            reopened.read_cell(3, 2).unwrap(),
            CellValue::Text("Reyes, Jr.".to_string())
        );
    }

    #[test]
    fn test_open_missing_file() {
        let result = CsvDataset::open(Path::new("/nonexistent/responses.csv"));
        assert!(matches!(result, Err(DatasetError::Io(_))));
    }
}
