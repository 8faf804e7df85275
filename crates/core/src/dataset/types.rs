//! Cell, row and header types.

use std::collections::HashMap;
use std::fmt;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Value held by a single sheet cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum CellValue {
    #[default]
    Empty,
    Text(String),
    Number(f64),
    Boolean(bool),
    DateTime(NaiveDateTime),
}

impl CellValue {
    /// Build a cell from raw text; blank text becomes `Empty`.
    pub fn from_raw(raw: &str) -> Self {
        if raw.is_empty() {
            CellValue::Empty
        } else {
            CellValue::Text(raw.to_string())
        }
    }

    /// Whether the cell carries a value. Whitespace-only text counts as absent.
    pub fn is_present(&self) -> bool {
        match self {
            CellValue::Empty => false,
            CellValue::Text(s) => !s.trim().is_empty(),
            _ => true,
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Empty => Ok(()),
            CellValue::Text(s) => f.write_str(s),
            CellValue::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => {
                write!(f, "{}", *n as i64)
            }
            CellValue::Number(n) => write!(f, "{}", n),
            CellValue::Boolean(b) => write!(f, "{}", b),
            CellValue::DateTime(dt) => write!(f, "{}", dt.format("%Y-%m-%d %H:%M:%S")),
        }
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::from_raw(value)
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        if value.is_empty() {
            CellValue::Empty
        } else {
            CellValue::Text(value)
        }
    }
}

/// One sheet row. Columns are 1-based.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Row {
    cells: Vec<CellValue>,
}

impl Row {
    pub fn new(cells: Vec<CellValue>) -> Self {
        Self { cells }
    }

    /// Cell at a 1-based column; past the end (or column 0) reads as `Empty`.
    pub fn cell(&self, column: usize) -> &CellValue {
        static EMPTY: CellValue = CellValue::Empty;
        column
            .checked_sub(1)
            .and_then(|idx| self.cells.get(idx))
            .unwrap_or(&EMPTY)
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn cells(&self) -> &[CellValue] {
        &self.cells
    }
}

impl From<Vec<CellValue>> for Row {
    fn from(cells: Vec<CellValue>) -> Self {
        Self::new(cells)
    }
}

/// Header name to 1-based column lookup, built from the header row.
#[derive(Debug, Clone, Default)]
pub struct HeaderMap {
    columns: HashMap<String, usize>,
}

impl HeaderMap {
    /// Build from the header row. Names are trimmed, blank headers ignored,
    /// and a repeated name resolves to its last column.
    pub fn from_row(header: &Row) -> Self {
        let mut columns = HashMap::new();
        for (idx, cell) in header.cells().iter().enumerate() {
            let name = cell.to_string();
            let name = name.trim();
            if name.is_empty() {
                continue;
            }
            columns.insert(name.to_string(), idx + 1);
        }
        Self { columns }
    }

    /// 1-based column for a header name.
    pub fn column(&self, name: &str) -> Option<usize> {
        self.columns.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.columns.contains_key(name)
    }

    /// Value of the named column in `row`, or `None` when the header is absent.
    pub fn lookup<'r>(&self, row: &'r Row, name: &str) -> Option<&'r CellValue> {
        self.column(name).map(|column| row.cell(column))
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}
