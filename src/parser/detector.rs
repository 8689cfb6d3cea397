//! Object/array detection pass.
//!
//! Runs after the tree is built. Classifies inline class definitions
//! (`fieldName:ClassName`), marks groupId/occurrenceCount marker rows as
//! transitory, and re-classifies containers as arrays when their
//! occurrence range allows more than one instance.

use once_cell::sync::Lazy;
use regex::Regex;

use super::level_stack::RawNode;
use crate::error::{CellRef, MsggenError, Result};
use crate::model::Occurrence;

static OCCURRENCE_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^occurr?encecount$").expect("valid regex"));

/// Classify every node in the forest. Top-level occurrence markers have no
/// container to describe and are rejected.
pub fn enhance(roots: &mut [RawNode]) -> Result<()> {
    for node in roots.iter_mut() {
        classify(node)?;
        if node.occurrence_count.is_some() && node.is_transitory {
            return Err(MsggenError::parse(
                "occurrenceCount marker must be nested inside a container",
                location(node),
            ));
        }
        enhance_children(node)?;
    }
    Ok(())
}

fn enhance_children(parent: &mut RawNode) -> Result<()> {
    for child in parent.children.iter_mut() {
        classify(child)?;
        enhance_children(child)?;
    }

    // A marker child declares its parent's multiplicity.
    let marker_occurrence = parent
        .children
        .iter()
        .find_map(|c| c.occurrence_count.clone().filter(|_| c.is_transitory));
    if let Some(text) = marker_occurrence {
        let occurrence = Occurrence::parse(&text).ok_or_else(|| {
            MsggenError::parse(
                format!("malformed occurrence range '{}'", text),
                location(parent),
            )
        })?;
        if occurrence.is_repeating() {
            parent.is_array = true;
            parent.is_object = false;
            parent.occurrence_count = Some(text);
        }
    }

    Ok(())
}

fn classify(node: &mut RawNode) -> Result<()> {
    if node.raw_name.contains(':') {
        let (field_name, class_name) = node
            .raw_name
            .split_once(':')
            .expect("raw name contains ':'");
        let field_name = field_name.trim();
        let class_name = class_name.trim();
        if field_name.is_empty() || class_name.is_empty() {
            return Err(MsggenError::parse(
                format!("malformed container definition '{}'", node.raw_name),
                location(node),
            ));
        }
        if node.length.is_some() || node.data_type.is_some() {
            return Err(MsggenError::parse(
                format!(
                    "container definition '{}' must leave Length and Messaging Datatype blank",
                    node.raw_name
                ),
                location(node),
            ));
        }
        node.field_name_part = Some(field_name.to_string());
        node.class_name = Some(class_name.to_string());
        node.is_object = true;
        return Ok(());
    }

    if node.raw_name.eq_ignore_ascii_case("groupid") {
        node.is_transitory = true;
        node.group_id = Some(node.description.trim().to_string());
        return Ok(());
    }

    if OCCURRENCE_MARKER.is_match(&node.raw_name) {
        node.is_transitory = true;
        let text = node.description.trim().to_string();
        // Validate here so the error points at the marker row.
        Occurrence::parse(&text).ok_or_else(|| {
            MsggenError::parse(
                format!("malformed occurrence range '{}'", text),
                location(node),
            )
        })?;
        node.occurrence_count = Some(text);
    }

    Ok(())
}

fn location(node: &RawNode) -> CellRef {
    CellRef::new(node.source.sheet_name.clone(), node.source.row_index)
        .with_field(node.raw_name.clone())
}
