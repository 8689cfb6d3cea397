//! Cross-artifact consistency validation.
//!
//! Runs against the staged output tree before commit. Each artifact family
//! is normalized into `(fieldPath, typeKey, shape, required)` tuples and
//! the union of paths is checked for presence, type and structure
//! agreement. The report decides whether the transaction may commit.

mod issue;
mod java_shape;
mod openapi_shape;
mod xml_shape;

pub use issue::{ConsistencyIssue, ConsistencyReport, IssueCategory, IssueSeverity};

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fs;
use std::path::Path;

use glob::Pattern;
use tracing::debug;

use crate::config::ConsistencyConfig;
use crate::error::{MsggenError, Result};

/// Structural shape of one field in one artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Shape {
    Primitive,
    Object,
    Array,
}

impl Shape {
    fn as_str(&self) -> &'static str {
        match self {
            Shape::Primitive => "primitive",
            Shape::Object => "object",
            Shape::Array => "array",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Required {
    True,
    False,
    Unknown,
}

/// One field as a single artifact sees it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldRecord {
    pub raw_type: String,
    pub shape: Shape,
    pub required: Required,
}

const ARTIFACTS: [&str; 3] = ["xml", "java", "openapi"];

/// Canonical type-key mapping: artifact-native token to validator token,
/// extendable through `consistency.typeMappingRules`.
struct TypeMapper {
    rules: HashMap<String, String>,
}

impl TypeMapper {
    fn new(overrides: &indexmap::IndexMap<String, String>) -> Self {
        let mut rules: HashMap<String, String> = [
            ("stringFieldConverter", "string"),
            ("OHcurrencyamountFieldConverter", "decimal"),
            ("String", "string"),
            ("BigDecimal", "decimal"),
            ("string", "string"),
            ("decimal", "decimal"),
            ("date", "string"),
            ("object", "object"),
            ("array", "array"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
        for (key, value) in overrides {
            rules.insert(key.clone(), value.clone());
        }
        Self { rules }
    }

    fn canonical(&self, raw: &str) -> Option<&str> {
        self.rules.get(raw).map(String::as_str)
    }
}

/// Validate the staged output tree.
pub fn validate_staged(
    staged_root: &Path,
    operation_id: &str,
    package: &str,
    config: &ConsistencyConfig,
) -> Result<ConsistencyReport> {
    let xml_records = collect_xml(staged_root)?;
    let java_records = collect_java(staged_root, operation_id, package)?;
    let openapi_records = collect_openapi(staged_root, operation_id)?;

    debug!(
        xml = xml_records.len(),
        java = java_records.len(),
        openapi = openapi_records.len(),
        "normalized artifact field paths"
    );

    let ignore: Vec<Pattern> = config
        .ignore_fields
        .iter()
        .filter_map(|p| Pattern::new(p).ok())
        .collect();
    let mapper = TypeMapper::new(&config.type_mapping_rules);

    let mut union: BTreeSet<&String> = BTreeSet::new();
    union.extend(xml_records.keys());
    union.extend(java_records.keys());
    union.extend(openapi_records.keys());

    let mut issues = Vec::new();
    let mut checked = 0usize;

    for path in union {
        if ignore.iter().any(|p| p.matches(path)) {
            continue;
        }
        checked += 1;

        let views: [(&str, Option<&FieldRecord>); 3] = [
            ("xml", xml_records.get(path)),
            ("java", java_records.get(path)),
            ("openapi", openapi_records.get(path)),
        ];

        for (artifact, record) in &views {
            if record.is_none() {
                issues.push(ConsistencyIssue {
                    category: IssueCategory::MissingField,
                    severity: IssueSeverity::Error,
                    field_path: path.clone(),
                    detail: format!("absent in {}", artifact),
                });
            }
        }

        let present: Vec<(&str, &FieldRecord)> = views
            .iter()
            .filter_map(|(artifact, record)| record.map(|r| (*artifact, r)))
            .collect();

        let shapes: BTreeSet<Shape> = present.iter().map(|(_, r)| r.shape).collect();
        if shapes.len() > 1 {
            issues.push(ConsistencyIssue {
                category: IssueCategory::StructureMismatch,
                severity: IssueSeverity::Error,
                field_path: path.clone(),
                detail: present
                    .iter()
                    .map(|(artifact, r)| format!("{}={}", artifact, r.shape.as_str()))
                    .collect::<Vec<_>>()
                    .join(", "),
            });
        } else if shapes.iter().next() == Some(&Shape::Primitive) {
            check_types(&present, &mapper, config.strict_mode, path, &mut issues);
        }

        if present
            .iter()
            .any(|(_, record)| record.required == Required::Unknown)
        {
            let lacking: Vec<&str> = present
                .iter()
                .filter(|(_, record)| record.required == Required::Unknown)
                .map(|(artifact, _)| *artifact)
                .collect();
            issues.push(ConsistencyIssue {
                category: IssueCategory::RequiredUnknown,
                severity: if config.strict_mode {
                    IssueSeverity::Error
                } else {
                    IssueSeverity::Warning
                },
                field_path: path.clone(),
                detail: format!("no required metadata in {}", lacking.join(", ")),
            });
        }
    }

    issues.sort_by(|a, b| {
        a.category
            .cmp(&b.category)
            .then_with(|| a.field_path.cmp(&b.field_path))
            .then_with(|| a.detail.cmp(&b.detail))
    });

    Ok(ConsistencyReport {
        strict_mode: config.strict_mode,
        checked_paths: checked,
        issues,
    })
}

fn check_types(
    present: &[(&str, &FieldRecord)],
    mapper: &TypeMapper,
    strict: bool,
    path: &str,
    issues: &mut Vec<ConsistencyIssue>,
) {
    let mut canonical: BTreeSet<&str> = BTreeSet::new();
    for (artifact, record) in present {
        match mapper.canonical(&record.raw_type) {
            Some(key) => {
                canonical.insert(key);
            }
            None => issues.push(ConsistencyIssue {
                category: IssueCategory::TypeMismatch,
                severity: if strict {
                    IssueSeverity::Error
                } else {
                    IssueSeverity::Warning
                },
                field_path: path.to_string(),
                detail: format!("unknown type token '{}' in {}", record.raw_type, artifact),
            }),
        }
    }
    if canonical.len() > 1 {
        issues.push(ConsistencyIssue {
            category: IssueCategory::TypeMismatch,
            severity: IssueSeverity::Error,
            field_path: path.to_string(),
            detail: present
                .iter()
                .filter_map(|(artifact, record)| {
                    mapper
                        .canonical(&record.raw_type)
                        .map(|key| format!("{}={}", artifact, key))
                })
                .collect::<Vec<_>>()
                .join(", "),
        });
    }
}

fn collect_xml(staged_root: &Path) -> Result<BTreeMap<String, FieldRecord>> {
    let mut records = BTreeMap::new();
    for (file, root) in [
        ("xml/outbound-converter.xml", "Request"),
        ("xml/inbound-converter.xml", "Response"),
    ] {
        let path = staged_root.join(file);
        if !path.exists() {
            continue;
        }
        let text = fs::read_to_string(&path).map_err(|e| {
            MsggenError::output(format!("cannot read staged artifact {}: {}", file, e))
        })?;
        records.extend(xml_shape::extract(&text, root)?);
    }
    Ok(records)
}

fn collect_java(
    staged_root: &Path,
    operation_id: &str,
    package: &str,
) -> Result<BTreeMap<String, FieldRecord>> {
    let package_dir = staged_root.join("java").join(package.replace('.', "/"));
    let mut records =
        java_shape::extract(&package_dir, &format!("{}Request", operation_id), "Request")?;
    records.extend(java_shape::extract(
        &package_dir,
        &format!("{}Response", operation_id),
        "Response",
    )?);
    Ok(records)
}

fn collect_openapi(
    staged_root: &Path,
    operation_id: &str,
) -> Result<BTreeMap<String, FieldRecord>> {
    let openapi_dir = staged_root.join("openapi");
    if !openapi_dir.join("api.yaml").exists() {
        return Ok(BTreeMap::new());
    }
    let source = openapi_shape::SchemaSource::open(&openapi_dir)?;
    let mut records =
        openapi_shape::extract(&source, &format!("{}Request", operation_id), "Request")?;
    records.extend(openapi_shape::extract(
        &source,
        &format!("{}Response", operation_id),
        "Response",
    )?);
    Ok(records)
}
