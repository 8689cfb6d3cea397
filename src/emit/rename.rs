//! Field-rename mapping document.
//!
//! A Markdown table per message section tracing every workbook row
//! (containers and transitory markers included) to its normalized
//! identifier and source position.

use super::{Artifact, paths};
use crate::model::{FieldGroup, MessageModel, walk_group};

/// Emit `diff.md`.
pub fn emit_rename_doc(model: &MessageModel) -> Artifact {
    let mut out = String::new();
    out.push_str("# Field Rename Mapping\n\n");
    out.push_str(&format!("- Parsed: {}\n", model.metadata.parse_timestamp));
    out.push_str(&format!("- Source: {}\n", escape_cell(&model.metadata.source_file)));
    out.push_str(&format!("- Parser version: {}\n", model.metadata.parser_version));

    let mut total = 0usize;

    let mut sections: Vec<(&str, &FieldGroup)> = Vec::new();
    if let Some(shared) = &model.shared_header {
        sections.push(("Shared Header", shared));
    }
    sections.push(("Request", &model.request));
    sections.push(("Response", &model.response));

    for (title, group) in sections {
        if group.is_empty() {
            continue;
        }
        out.push_str(&format!("\n## {}\n\n", title));
        out.push_str("| originalName | camelCaseName | sheetName | rowIndex |\n");
        out.push_str("|---|---|---|---|\n");
        walk_group(group, &mut |node, _ancestors| {
            out.push_str(&format!(
                "| {} | {} | {} | {} |\n",
                escape_cell(&node.original_name),
                escape_cell(node.camel_case_name.as_deref().unwrap_or("")),
                escape_cell(&node.source.sheet_name),
                node.source.row_index
            ));
            total += 1;
        });
    }

    out.push_str(&format!("\nTotal fields: {}\n", total));
    Artifact::new(paths::RENAME_DOC, out)
}

fn escape_cell(text: &str) -> String {
    text.replace('\\', "\\\\").replace('|', "\\|")
}
