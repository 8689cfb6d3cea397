//! Header-row column discovery.
//!
//! Column names are matched after whitespace normalization (newlines to
//! spaces, trimmed, runs collapsed). The mapping preserves first-occurrence
//! order; a duplicate header keeps the leftmost column.

use indexmap::IndexMap;

use crate::error::{CellRef, MsggenError, Result};
use crate::utils::collapse_whitespace;
use crate::workbook::Sheet;

/// 0-based index of the fixed header row (workbook row 8).
pub const HEADER_ROW: usize = 7;

/// 0-based index of the first data row (workbook row 9).
pub const FIRST_DATA_ROW: usize = 8;

pub const COL_SEG_LEVEL: &str = "Seg lvl";
pub const COL_FIELD_NAME: &str = "Field Name";
pub const COL_DESCRIPTION: &str = "Description";
pub const COL_LENGTH: &str = "Length";
pub const COL_DATA_TYPE: &str = "Messaging Datatype";

pub const COL_OPTIONALITY: &str = "Opt(O/M)";
pub const COL_PHYSICAL_NAME: &str = "GMR Physical Name";
pub const COL_DEFAULT_VALUE: &str = "Default Value";
pub const COL_HARD_CODE_VALUE: &str = "Hard Code Value";
pub const COL_ENUM_VALUES: &str = "Enum Values";

const REQUIRED_COLUMNS: &[&str] = &[
    COL_SEG_LEVEL,
    COL_FIELD_NAME,
    COL_DESCRIPTION,
    COL_LENGTH,
    COL_DATA_TYPE,
];

/// Normalized-name → 0-based column index, in first-occurrence order.
#[derive(Debug, Clone)]
pub struct ColumnMap {
    columns: IndexMap<String, usize>,
}

impl ColumnMap {
    /// Read the header row of `sheet` and verify the required columns.
    pub fn discover(sheet: &Sheet) -> Result<Self> {
        let mut columns = IndexMap::new();
        for (idx, cell) in sheet.row(HEADER_ROW).iter().enumerate() {
            let name = collapse_whitespace(&cell.as_text());
            if name.is_empty() {
                continue;
            }
            columns.entry(name).or_insert(idx);
        }

        for required in REQUIRED_COLUMNS {
            if !columns.contains_key(*required) {
                return Err(MsggenError::parse(
                    format!("missing required column '{}'", required),
                    CellRef::new(sheet.name.clone(), HEADER_ROW as u32 + 1),
                ));
            }
        }

        Ok(Self { columns })
    }

    /// 0-based index of a column by normalized name.
    pub fn index(&self, name: &str) -> Option<usize> {
        self.columns.get(name).copied()
    }

    /// Trimmed cell text for `column` in the given 0-based data row, or an
    /// empty string when the column is absent.
    pub fn text(&self, sheet: &Sheet, row: usize, column: &str) -> String {
        match self.index(column) {
            Some(idx) => sheet.cell_text(row, idx),
            None => String::new(),
        }
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.columns.keys().map(String::as_str)
    }
}
