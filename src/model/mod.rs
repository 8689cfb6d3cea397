//! The canonical intermediate tree shared by every emitter.
//!
//! Built once by the parser and treated as read-only afterwards; emitters
//! and the consistency validator take it by shared reference. Field order
//! inside every group and children list is the source row order and is
//! semantically significant.

mod canonical;
mod visit;

pub use canonical::to_canonical_json;
pub use visit::{walk_group, walk_node};

use once_cell::sync::Lazy;
use regex::Regex;

/// Mandatory / optional marker from the `Opt(O/M)` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Optionality {
    Mandatory,
    Optional,
}

impl Optionality {
    pub fn as_str(&self) -> &'static str {
        match self {
            Optionality::Mandatory => "M",
            Optionality::Optional => "O",
        }
    }

    pub fn parse(text: &str) -> Option<Self> {
        match text.trim() {
            "M" | "m" => Some(Optionality::Mandatory),
            "O" | "o" => Some(Optionality::Optional),
            _ => None,
        }
    }
}

/// Where a node came from in the workbook. Row index is 1-based.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceRef {
    pub sheet_name: String,
    pub row_index: u32,
}

/// Parsed `min..max` multiplicity from an occurrenceCount marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Occurrence {
    pub min: u32,
    pub max: OccurrenceMax,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OccurrenceMax {
    Count(u32),
    Unbounded,
}

impl Occurrence {
    /// Parse the textual `min..max` range. `max` may be a positive integer,
    /// `N`, `n`, or `*` (unbounded).
    pub fn parse(text: &str) -> Option<Self> {
        static RANGE: Lazy<Regex> =
            Lazy::new(|| Regex::new(r"^(\d+)\.\.(\d+|[Nn*])$").expect("valid regex"));
        let caps = RANGE.captures(text.trim())?;
        let min: u32 = caps[1].parse().ok()?;
        let max = match &caps[2] {
            "N" | "n" | "*" => OccurrenceMax::Unbounded,
            digits => OccurrenceMax::Count(digits.parse().ok()?),
        };
        if let OccurrenceMax::Count(c) = max {
            if c == 0 {
                return None;
            }
        }
        Some(Self { min, max })
    }

    /// True when this multiplicity makes its container an array.
    pub fn is_repeating(&self) -> bool {
        match self.max {
            OccurrenceMax::Count(c) => c > 1,
            OccurrenceMax::Unbounded => true,
        }
    }

    /// The finite upper bound, when there is one.
    pub fn finite_max(&self) -> Option<u32> {
        match self.max {
            OccurrenceMax::Count(c) => Some(c),
            OccurrenceMax::Unbounded => None,
        }
    }
}

/// One row of the workbook, resolved into the tree.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldNode {
    /// Raw cell text, exactly as it appeared (after trim).
    pub original_name: String,
    /// Normalized lower-camel identifier; `None` for transitory rows.
    pub camel_case_name: Option<String>,
    /// Upper-camel type name for containers; `None` for primitives.
    pub class_name: Option<String>,
    /// 1-based nesting level from the workbook column.
    pub seg_level: u32,
    /// Byte width for primitives; `None` for containers.
    pub length: Option<u32>,
    /// Raw spec type token (`String`, `AN`, `Amount`, ...).
    pub data_type: Option<String>,
    pub optionality: Option<Optionality>,
    pub default_value: Option<String>,
    pub hard_code_value: Option<String>,
    /// `|`-separated alternatives; non-empty marks the field an enum.
    pub enum_constraint: Option<String>,
    /// Fixed tag value; set only on the transitory groupId marker row.
    pub group_id: Option<String>,
    /// Textual `min..max`; set on the transitory marker row and copied to
    /// the owning container when it is repeating.
    pub occurrence_count: Option<String>,
    pub is_array: bool,
    pub is_object: bool,
    pub is_transitory: bool,
    pub children: Vec<FieldNode>,
    pub source: SourceRef,
}

impl FieldNode {
    pub fn is_container(&self) -> bool {
        self.is_array || self.is_object
    }

    /// Parsed multiplicity, when an occurrence string is attached.
    pub fn occurrence(&self) -> Option<Occurrence> {
        self.occurrence_count.as_deref().and_then(Occurrence::parse)
    }
}

/// Ordered top-level fields of one message section.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldGroup {
    pub fields: Vec<FieldNode>,
}

impl FieldGroup {
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// True when the group has no non-transitory content at any level.
    pub fn has_content(&self) -> bool {
        fn any_content(nodes: &[FieldNode]) -> bool {
            nodes
                .iter()
                .any(|n| !n.is_transitory || any_content(&n.children))
        }
        any_content(&self.fields)
    }
}

/// Provenance captured once at parse start.
#[derive(Debug, Clone, PartialEq)]
pub struct Metadata {
    pub source_file: String,
    pub shared_header_file: Option<String>,
    pub parse_timestamp: String,
    pub parser_version: String,
    pub operation_name: Option<String>,
    pub operation_id: Option<String>,
    pub version: Option<String>,
}

/// Root of the intermediate tree.
#[derive(Debug, Clone, PartialEq)]
pub struct MessageModel {
    pub metadata: Metadata,
    pub shared_header: Option<FieldGroup>,
    pub request: FieldGroup,
    pub response: FieldGroup,
}

impl MessageModel {
    /// The operationId, or a GenerationError naming the caller's artifact.
    pub fn require_operation_id(&self, artifact: &str) -> crate::error::Result<&str> {
        match self.metadata.operation_id.as_deref() {
            Some(id) if !id.is_empty() => Ok(id),
            _ => Err(crate::error::MsggenError::generation(format!(
                "operationId is required to generate {} (row 3 col C of the Request sheet is empty)",
                artifact
            ))),
        }
    }
}
