//! Level-stack tree construction.
//!
//! Walks the data rows of one sheet and hangs each row off the innermost
//! candidate parent whose level is exactly one less. Only rows that declare
//! an inline class (`fieldName:ClassName`) can become parents; everything
//! else is a leaf at its level.

use tracing::warn;

use super::columns::{
    COL_DATA_TYPE, COL_DEFAULT_VALUE, COL_DESCRIPTION, COL_ENUM_VALUES, COL_FIELD_NAME,
    COL_HARD_CODE_VALUE, COL_LENGTH, COL_OPTIONALITY, COL_PHYSICAL_NAME, COL_SEG_LEVEL, ColumnMap,
    FIRST_DATA_ROW,
};
use crate::error::{CellRef, MsggenError, Result};
use crate::model::{Optionality, SourceRef};
use crate::workbook::Sheet;

/// Parser-internal node: a workbook row plus everything the detector and
/// the finalization pass need. Converted to the public `FieldNode` once
/// detection and normalization are done.
#[derive(Debug, Clone)]
pub struct RawNode {
    /// `Field Name` cell, trimmed.
    pub raw_name: String,
    /// `GMR Physical Name` cell, trimmed; overrides `raw_name` for
    /// identifier normalization when non-empty.
    pub physical_name: String,
    pub description: String,
    pub seg_level: u32,
    pub length: Option<u32>,
    pub data_type: Option<String>,
    pub optionality: Option<Optionality>,
    pub default_value: Option<String>,
    pub hard_code_value: Option<String>,
    pub enum_constraint: Option<String>,
    pub source: SourceRef,
    pub children: Vec<RawNode>,

    // Filled by the detector pass.
    pub field_name_part: Option<String>,
    pub class_name: Option<String>,
    pub group_id: Option<String>,
    pub occurrence_count: Option<String>,
    pub is_object: bool,
    pub is_array: bool,
    pub is_transitory: bool,
}

/// Build the raw tree for one sheet.
pub fn build_tree(sheet: &Sheet, columns: &ColumnMap, max_depth: u32) -> Result<Vec<RawNode>> {
    let mut roots: Vec<RawNode> = Vec::new();
    // Index paths into `roots` for the open container chain.
    let mut stack: Vec<Vec<usize>> = Vec::new();
    let mut previous_level: u32 = 0;
    let mut depth_warned = false;

    for row in FIRST_DATA_ROW..sheet.row_count() {
        let name = columns.text(sheet, row, COL_FIELD_NAME);
        let level_text = columns.text(sheet, row, COL_SEG_LEVEL);
        if name.is_empty() && level_text.is_empty() {
            continue;
        }

        let location = CellRef::new(sheet.name.clone(), row as u32 + 1).with_field(name.clone());
        let seg_level = parse_level(&level_text, &location)?;

        let node = raw_node(sheet, columns, row, seg_level, &name, &location)?;

        while let Some(top) = stack.last() {
            if node_at(&roots, top).seg_level >= seg_level {
                stack.pop();
            } else {
                break;
            }
        }

        if seg_level > previous_level + 1 && previous_level > 0 {
            return Err(MsggenError::parse(
                format!(
                    "segment level jumps from {} to {}",
                    previous_level, seg_level
                ),
                location,
            ));
        }

        if seg_level > max_depth && !depth_warned {
            warn!(
                sheet = %sheet.name,
                row = row + 1,
                level = seg_level,
                max_depth,
                "nesting depth exceeds the configured limit"
            );
            depth_warned = true;
        }

        let is_candidate = node.raw_name.contains(':');
        let path = match stack.last() {
            Some(parent_path) => {
                let parent = node_at_mut(&mut roots, parent_path);
                parent.children.push(node);
                let child_index = parent.children.len() - 1;
                let mut path = parent_path.clone();
                path.push(child_index);
                path
            }
            None => {
                roots.push(node);
                vec![roots.len() - 1]
            }
        };

        if is_candidate {
            stack.push(path);
        }
        previous_level = seg_level;
    }

    Ok(roots)
}

fn node_at<'a>(roots: &'a [RawNode], path: &[usize]) -> &'a RawNode {
    let mut node = &roots[path[0]];
    for idx in &path[1..] {
        node = &node.children[*idx];
    }
    node
}

fn node_at_mut<'a>(roots: &'a mut [RawNode], path: &[usize]) -> &'a mut RawNode {
    let mut node = &mut roots[path[0]];
    for idx in &path[1..] {
        node = &mut node.children[*idx];
    }
    node
}

fn parse_level(text: &str, location: &CellRef) -> Result<u32> {
    let level: i64 = text.parse().map_err(|_| {
        MsggenError::parse(
            format!("segment level '{}' is not an integer", text),
            location.clone(),
        )
    })?;
    if level <= 0 {
        return Err(MsggenError::parse(
            format!("segment level {} is not positive", level),
            location.clone(),
        ));
    }
    Ok(level as u32)
}

fn raw_node(
    sheet: &Sheet,
    columns: &ColumnMap,
    row: usize,
    seg_level: u32,
    name: &str,
    location: &CellRef,
) -> Result<RawNode> {
    let length_text = columns.text(sheet, row, COL_LENGTH);
    let length = if length_text.is_empty() {
        None
    } else {
        let value: u32 = length_text.parse().map_err(|_| {
            MsggenError::parse(
                format!("length '{}' is not a positive integer", length_text),
                location.clone(),
            )
        })?;
        if value == 0 {
            return Err(MsggenError::parse(
                "length must be positive".to_string(),
                location.clone(),
            ));
        }
        Some(value)
    };

    let non_empty = |s: String| if s.is_empty() { None } else { Some(s) };

    Ok(RawNode {
        raw_name: name.to_string(),
        physical_name: columns.text(sheet, row, COL_PHYSICAL_NAME),
        description: columns.text(sheet, row, COL_DESCRIPTION),
        seg_level,
        length,
        data_type: non_empty(columns.text(sheet, row, COL_DATA_TYPE)),
        optionality: Optionality::parse(&columns.text(sheet, row, COL_OPTIONALITY)),
        default_value: non_empty(columns.text(sheet, row, COL_DEFAULT_VALUE)),
        hard_code_value: non_empty(columns.text(sheet, row, COL_HARD_CODE_VALUE)),
        enum_constraint: non_empty(columns.text(sheet, row, COL_ENUM_VALUES)),
        source: SourceRef {
            sheet_name: sheet.name.clone(),
            row_index: row as u32 + 1,
        },
        children: Vec::new(),
        field_name_part: None,
        class_name: None,
        group_id: None,
        occurrence_count: None,
        is_object: false,
        is_array: false,
        is_transitory: false,
    })
}
