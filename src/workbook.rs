//! Workbook collaborator interface and the bundled JSON-grid loader.
//!
//! The parser consumes a [`Workbook`]: named sheets, each an ordered list
//! of rows, each row an ordered list of cells. Real spreadsheet decoding
//! lives behind this boundary; the loader shipped here reads a JSON grid
//! of the form:
//!
//! ```json
//! {
//!   "sheets": {
//!     "Request": [
//!       ["Seg lvl", "Field Name", "Description"],
//!       [1, "CUST_ID", "Customer id"]
//!     ]
//!   }
//! }
//! ```
//!
//! Cells may be strings, numbers, booleans, or `null` (empty).

use std::fs;
use std::path::Path;

use indexmap::IndexMap;
use serde_json::Value;

use crate::error::{MsggenError, Result};

/// A single spreadsheet cell, already coerced to the shapes the parser
/// cares about.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Text(String),
    Number(f64),
}

impl Cell {
    /// Render the cell as trimmed text. Integral numbers print without a
    /// decimal point, fractional numbers in plain decimal form with a `.`
    /// separator regardless of locale.
    pub fn as_text(&self) -> String {
        match self {
            Cell::Empty => String::new(),
            Cell::Text(s) => s.trim().to_string(),
            Cell::Number(n) => {
                if n.fract() == 0.0 && n.abs() < 1e15 {
                    format!("{}", *n as i64)
                } else {
                    format!("{}", n)
                }
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Text(s) => s.trim().is_empty(),
            Cell::Number(_) => false,
        }
    }
}

/// One sheet: a rectangular-ish grid of cells in source order.
#[derive(Debug, Clone)]
pub struct Sheet {
    pub name: String,
    rows: Vec<Vec<Cell>>,
}

impl Sheet {
    pub fn new(name: impl Into<String>, rows: Vec<Vec<Cell>>) -> Self {
        Self {
            name: name.into(),
            rows,
        }
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Cell at 0-based (row, col); `Cell::Empty` beyond the grid.
    pub fn cell(&self, row: usize, col: usize) -> Cell {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .cloned()
            .unwrap_or(Cell::Empty)
    }

    /// Cell text at 0-based (row, col), trimmed; empty beyond the grid.
    pub fn cell_text(&self, row: usize, col: usize) -> String {
        self.cell(row, col).as_text()
    }

    pub fn row(&self, row: usize) -> &[Cell] {
        self.rows.get(row).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn row_is_empty(&self, row: usize) -> bool {
        self.row(row).iter().all(Cell::is_empty)
    }
}

/// A loaded workbook: sheets in file order.
#[derive(Debug, Clone)]
pub struct Workbook {
    sheets: IndexMap<String, Sheet>,
}

impl Workbook {
    pub fn new(sheets: Vec<Sheet>) -> Self {
        let sheets = sheets.into_iter().map(|s| (s.name.clone(), s)).collect();
        Self { sheets }
    }

    pub fn sheet(&self, name: &str) -> Option<&Sheet> {
        self.sheets.get(name)
    }

    pub fn sheet_names(&self) -> Vec<&str> {
        self.sheets.keys().map(String::as_str).collect()
    }

    /// Load a workbook from a JSON grid file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| MsggenError::ParseInput {
            message: format!("cannot read workbook ({})", e),
            path: path.to_path_buf(),
        })?;
        let value: Value =
            serde_json::from_str(&content).map_err(|e| MsggenError::ParseInput {
                message: format!("not a workbook ({})", e),
                path: path.to_path_buf(),
            })?;

        let sheets_value = value
            .get("sheets")
            .and_then(Value::as_object)
            .ok_or_else(|| MsggenError::ParseInput {
                message: "not a workbook (missing top-level \"sheets\" object)".to_string(),
                path: path.to_path_buf(),
            })?;

        let mut sheets = Vec::with_capacity(sheets_value.len());
        for (name, rows_value) in sheets_value {
            let rows_value = rows_value.as_array().ok_or_else(|| MsggenError::ParseInput {
                message: format!("not a workbook (sheet \"{}\" is not an array of rows)", name),
                path: path.to_path_buf(),
            })?;
            let mut rows = Vec::with_capacity(rows_value.len());
            for row_value in rows_value {
                let cells_value =
                    row_value.as_array().ok_or_else(|| MsggenError::ParseInput {
                        message: format!("not a workbook (sheet \"{}\" has a non-array row)", name),
                        path: path.to_path_buf(),
                    })?;
                rows.push(cells_value.iter().map(cell_from_json).collect());
            }
            sheets.push(Sheet::new(name.clone(), rows));
        }

        Ok(Self::new(sheets))
    }
}

fn cell_from_json(value: &Value) -> Cell {
    match value {
        Value::Null => Cell::Empty,
        Value::String(s) => {
            if s.trim().is_empty() {
                Cell::Empty
            } else {
                Cell::Text(s.clone())
            }
        }
        Value::Number(n) => Cell::Number(n.as_f64().unwrap_or(0.0)),
        Value::Bool(b) => Cell::Text(b.to_string()),
        other => Cell::Text(other.to_string()),
    }
}
