//! Workbook parsing: sheet discovery, tree construction, detection and
//! identifier normalization.
//!
//! The pipeline is three passes over each sheet:
//!
//! 1. `level_stack` builds the raw row tree by segment level.
//! 2. `detector` classifies containers, arrays and transitory markers.
//! 3. finalization normalizes identifiers, checks duplicates and produces
//!    the immutable [`MessageModel`].

mod columns;
mod detector;
mod level_stack;
mod metadata;
mod normalize;
mod translit;

pub use columns::ColumnMap;
pub use normalize::{DEFAULT_MAX_IDENT, camel_case};

use std::collections::HashSet;
use std::path::Path;

use tracing::debug;

use crate::error::{CellRef, MsggenError, Result};
use crate::model::{FieldGroup, FieldNode, MessageModel};
use crate::workbook::{Sheet, Workbook};
use level_stack::RawNode;

pub const SHEET_REQUEST: &str = "Request";
pub const SHEET_RESPONSE: &str = "Response";
pub const SHEET_SHARED_HEADER: &str = "Shared Header";

/// Knobs the parser honors; both come from the configuration surface.
#[derive(Debug, Clone, Copy)]
pub struct ParseOptions {
    pub max_nesting_depth: u32,
    pub max_identifier_length: usize,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            max_nesting_depth: 50,
            max_identifier_length: DEFAULT_MAX_IDENT,
        }
    }
}

/// Parse a specification workbook (and optional separate shared-header
/// workbook) into the intermediate tree.
pub fn parse(
    spec_path: &Path,
    shared_header_path: Option<&Path>,
    options: ParseOptions,
) -> Result<MessageModel> {
    let workbook = Workbook::load(spec_path)?;

    let request_sheet = required_sheet(&workbook, SHEET_REQUEST)?;
    let response_sheet = required_sheet(&workbook, SHEET_RESPONSE)?;

    let metadata = metadata::extract(request_sheet, spec_path, shared_header_path);
    debug!(
        operation_id = metadata.operation_id.as_deref().unwrap_or("<none>"),
        "parsing specification workbook"
    );

    let shared_workbook = match shared_header_path {
        Some(path) => Some(Workbook::load(path)?),
        None => None,
    };
    let shared_sheet = match &shared_workbook {
        Some(wb) => Some(required_sheet(wb, SHEET_SHARED_HEADER)?),
        None => workbook.sheet(SHEET_SHARED_HEADER),
    };

    let shared_header = shared_sheet
        .map(|sheet| parse_sheet(sheet, options))
        .transpose()?;
    let request = parse_sheet(request_sheet, options)?;
    let response = parse_sheet(response_sheet, options)?;

    Ok(MessageModel {
        metadata,
        shared_header,
        request,
        response,
    })
}

fn required_sheet<'a>(workbook: &'a Workbook, name: &str) -> Result<&'a Sheet> {
    workbook.sheet(name).ok_or_else(|| MsggenError::parse(
        format!("missing required sheet '{}'", name),
        CellRef::new(name, 1),
    ))
}

fn parse_sheet(sheet: &Sheet, options: ParseOptions) -> Result<FieldGroup> {
    let columns = ColumnMap::discover(sheet)?;
    let mut roots = level_stack::build_tree(sheet, &columns, options.max_nesting_depth)?;
    detector::enhance(&mut roots)?;

    let fields = finalize_list(roots, options.max_identifier_length)?;
    Ok(FieldGroup { fields })
}

/// Convert a sibling list, normalizing identifiers and rejecting duplicate
/// names within the scope.
fn finalize_list(raw_nodes: Vec<RawNode>, max_ident: usize) -> Result<Vec<FieldNode>> {
    let mut fields = Vec::with_capacity(raw_nodes.len());
    let mut seen: HashSet<String> = HashSet::new();

    for raw in raw_nodes {
        let node = finalize_node(raw, max_ident)?;
        if !node.is_transitory {
            let name = node
                .camel_case_name
                .clone()
                .expect("non-transitory nodes are normalized");
            if !seen.insert(name.clone()) {
                return Err(MsggenError::parse(
                    format!("duplicate field name '{}'", name),
                    CellRef::new(node.source.sheet_name.clone(), node.source.row_index)
                        .with_field(node.original_name.clone()),
                ));
            }
        }
        fields.push(node);
    }

    Ok(fields)
}

fn finalize_node(raw: RawNode, max_ident: usize) -> Result<FieldNode> {
    let is_container = raw.is_object || raw.is_array;

    if is_container && !raw.children.iter().any(|c| !c.is_transitory) {
        return Err(MsggenError::parse(
            format!("container '{}' has no fields", raw.raw_name),
            CellRef::new(raw.source.sheet_name.clone(), raw.source.row_index)
                .with_field(raw.raw_name.clone()),
        ));
    }

    let camel_case_name = if raw.is_transitory {
        None
    } else {
        let basis = if !raw.physical_name.is_empty() {
            raw.physical_name.clone()
        } else if let Some(part) = &raw.field_name_part {
            part.clone()
        } else {
            raw.raw_name.clone()
        };
        Some(camel_case(&basis, max_ident))
    };

    let children = finalize_list(raw.children, max_ident)?;

    Ok(FieldNode {
        original_name: raw.raw_name,
        camel_case_name,
        class_name: raw.class_name,
        seg_level: raw.seg_level,
        length: if is_container { None } else { raw.length },
        data_type: if is_container { None } else { raw.data_type },
        optionality: raw.optionality,
        default_value: raw.default_value,
        hard_code_value: raw.hard_code_value,
        enum_constraint: raw.enum_constraint,
        group_id: raw.group_id,
        occurrence_count: raw.occurrence_count,
        is_array: raw.is_array,
        is_object: raw.is_object,
        is_transitory: raw.is_transitory,
        children,
        source: raw.source,
    })
}
