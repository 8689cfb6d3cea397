//! Metadata extraction from fixed workbook cells.
//!
//! Operation name, operation id and interface version live at absolute
//! positions on the Request sheet (row 2 col C, row 3 col C, row 3 col E).
//! Empty cells become `None`; whether that is fatal is decided by the
//! emitter that needs the value, not here.

use std::path::Path;

use crate::model::Metadata;
use crate::utils::now_iso8601;
use crate::workbook::Sheet;

const OPERATION_NAME_CELL: (usize, usize) = (1, 2); // row 2, col C
const OPERATION_ID_CELL: (usize, usize) = (2, 2); // row 3, col C
const VERSION_CELL: (usize, usize) = (2, 4); // row 3, col E

/// Capture run metadata. The parse timestamp is taken exactly once here,
/// and the recorded file paths are absolute regardless of how the caller
/// named them.
pub fn extract(
    request_sheet: &Sheet,
    source_file: &Path,
    shared_header_file: Option<&Path>,
) -> Metadata {
    let cell = |pos: (usize, usize)| {
        let text = request_sheet.cell_text(pos.0, pos.1);
        if text.is_empty() { None } else { Some(text) }
    };

    Metadata {
        source_file: absolute_path(source_file),
        shared_header_file: shared_header_file.map(absolute_path),
        parse_timestamp: now_iso8601(),
        parser_version: env!("CARGO_PKG_VERSION").to_string(),
        operation_name: cell(OPERATION_NAME_CELL),
        operation_id: cell(OPERATION_ID_CELL),
        version: cell(VERSION_CELL),
    }
}

// The workbook was already loaded from this path, so resolution only
// fails in pathological races; the raw path is kept in that case.
fn absolute_path(path: &Path) -> String {
    path.canonicalize()
        .unwrap_or_else(|_| path.to_path_buf())
        .display()
        .to_string()
}
