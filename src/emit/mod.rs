//! Artifact emitters.
//!
//! Every emitter consumes the intermediate tree by shared reference and
//! returns in-memory artifacts; the pipeline stages them into the output
//! transaction in the fixed order. Nothing here touches the target
//! directory directly.

pub mod classes;
pub mod openapi;
pub mod rename;
pub mod xml;
pub mod yaml;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::model::FieldNode;
use crate::utils::capitalize;

/// One staged output file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub rel_path: String,
    pub bytes: Vec<u8>,
}

impl Artifact {
    pub fn new(rel_path: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            rel_path: rel_path.into(),
            bytes: bytes.into(),
        }
    }

    pub fn text(&self) -> &str {
        std::str::from_utf8(&self.bytes).expect("artifacts are UTF-8")
    }
}

/// Relative paths of the fixed output tree.
pub mod paths {
    pub const SPEC_TREE: &str = "json/spec-tree.json";
    pub const OUTBOUND_XML: &str = "xml/outbound-converter.xml";
    pub const INBOUND_XML: &str = "xml/inbound-converter.xml";
    pub const JAVA_ROOT: &str = "java";
    pub const OPENAPI_MAIN: &str = "openapi/api.yaml";
    pub const OPENAPI_SCHEMAS_DIR: &str = "openapi/schemas";
    pub const RENAME_DOC: &str = "diff.md";
    pub const AUDIT_JSON: &str = "audit/audit-log.json";
    pub const AUDIT_TEXT: &str = "audit/audit-log.txt";
    pub const CONSISTENCY_REPORT: &str = "consistency-report.json";
    pub const CONSISTENCY_SUMMARY: &str = "consistency-summary.md";
    pub const MANIFEST: &str = "manifest.json";
}

/// Spec type tokens folded into the categories the emitters care about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpecType {
    Text,
    Numeric,
    Date,
    Decimal,
    Unknown,
}

impl SpecType {
    pub fn of(data_type: Option<&str>) -> Self {
        match data_type.map(|t| t.trim().to_ascii_lowercase()).as_deref() {
            Some("string") | Some("an") => SpecType::Text,
            Some("number") | Some("n") | Some("unsigned integer") => SpecType::Numeric,
            Some("date") => SpecType::Date,
            Some("amount") | Some("currency") => SpecType::Decimal,
            _ => SpecType::Unknown,
        }
    }

    /// Wire converter for the fixed-length field.
    pub fn converter(&self) -> &'static str {
        match self {
            SpecType::Decimal => "OHcurrencyamountFieldConverter",
            _ => "stringFieldConverter",
        }
    }

    /// Numeric fields are zero-padded and right-aligned; everything else is
    /// space-padded.
    pub fn numeric_padding(&self) -> bool {
        matches!(self, SpecType::Numeric)
    }

    /// Host language type for the data classes.
    pub fn java_type(&self) -> &'static str {
        match self {
            SpecType::Decimal => "BigDecimal",
            _ => "String",
        }
    }

    /// OpenAPI string format, when one applies.
    pub fn openapi_format(&self) -> Option<&'static str> {
        match self {
            SpecType::Decimal => Some("decimal"),
            SpecType::Date => Some("date"),
            _ => None,
        }
    }
}

static ARRAY_SUFFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(arr|array|list)$").expect("valid regex"));

/// The emitted type name for a container node, shared by the XML, class
/// and OpenAPI emitters so `forType`, file names and `$ref`s agree.
pub fn container_class_name(node: &FieldNode) -> String {
    if let Some(class_name) = node.class_name.as_deref() {
        return class_name.to_string();
    }
    let camel = node.camel_case_name.as_deref().unwrap_or_default();
    if node.is_array {
        let stem = ARRAY_SUFFIX.replace(camel, "");
        format!("{}Array", capitalize(&stem))
    } else {
        capitalize(camel)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::SourceRef;

    fn container(camel: &str, class_name: Option<&str>, is_array: bool) -> FieldNode {
        FieldNode {
            original_name: camel.to_string(),
            camel_case_name: Some(camel.to_string()),
            class_name: class_name.map(str::to_string),
            seg_level: 1,
            length: None,
            data_type: None,
            optionality: None,
            default_value: None,
            hard_code_value: None,
            enum_constraint: None,
            group_id: None,
            occurrence_count: None,
            is_array,
            is_object: !is_array,
            is_transitory: false,
            children: Vec::new(),
            source: SourceRef {
                sheet_name: "Request".into(),
                row_index: 9,
            },
        }
    }

    #[test]
    fn test_spec_type_classification() {
        assert_eq!(SpecType::of(Some("String")), SpecType::Text);
        assert_eq!(SpecType::of(Some("AN")), SpecType::Text);
        assert_eq!(SpecType::of(Some("Number")), SpecType::Numeric);
        assert_eq!(SpecType::of(Some("Unsigned Integer")), SpecType::Numeric);
        assert_eq!(SpecType::of(Some("Date")), SpecType::Date);
        assert_eq!(SpecType::of(Some("Amount")), SpecType::Decimal);
        assert_eq!(SpecType::of(Some("currency")), SpecType::Decimal);
        assert_eq!(SpecType::of(Some("Blob")), SpecType::Unknown);
        assert_eq!(SpecType::of(None), SpecType::Unknown);
    }

    #[test]
    fn test_converters() {
        assert_eq!(SpecType::Text.converter(), "stringFieldConverter");
        assert_eq!(SpecType::Unknown.converter(), "stringFieldConverter");
        assert_eq!(SpecType::Decimal.converter(), "OHcurrencyamountFieldConverter");
        assert!(SpecType::Numeric.numeric_padding());
        assert!(!SpecType::Decimal.numeric_padding());
    }

    #[test]
    fn test_container_class_name_verbatim() {
        let node = container("cbaCardArr", Some("CBACardArray"), true);
        assert_eq!(container_class_name(&node), "CBACardArray");
    }

    #[test]
    fn test_container_class_name_derived_array() {
        let node = container("cbaCardArr", None, true);
        assert_eq!(container_class_name(&node), "CbaCardArray");
        let node = container("itemList", None, true);
        assert_eq!(container_class_name(&node), "ItemArray");
        let node = container("rows", None, true);
        assert_eq!(container_class_name(&node), "RowsArray");
    }

    #[test]
    fn test_container_class_name_derived_object() {
        let node = container("createApp", None, false);
        assert_eq!(container_class_name(&node), "CreateApp");
    }
}
