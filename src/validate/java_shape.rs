//! Data-class artifact normalization for the consistency checks.
//!
//! Walks the emitted class files starting at a message root, following
//! object and `List<>` field types into their class files. A lightweight
//! line scan is enough here: the emitter writes one field declaration per
//! line at a fixed indent.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;
use regex::Regex;

use super::{FieldRecord, Required, Shape};
use crate::error::{MsggenError, Result};

static FIELD_DECL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^    private\s+([A-Za-z0-9_.<>]+)\s+([A-Za-z0-9_]+)\s*(?:=[^;]*)?;")
        .expect("valid regex")
});

/// Extract field records starting from `root_class`, rooted at `root`
/// (`Request` or `Response`). A missing root class yields no records.
pub fn extract(
    java_package_dir: &Path,
    root_class: &str,
    root: &str,
) -> Result<BTreeMap<String, FieldRecord>> {
    let mut records = BTreeMap::new();
    let root_file = class_file(java_package_dir, root_class);
    if !root_file.exists() {
        return Ok(records);
    }
    let mut visiting = Vec::new();
    walk_class(
        java_package_dir,
        root_class,
        root,
        &mut records,
        &mut visiting,
    )?;
    Ok(records)
}

fn class_file(java_package_dir: &Path, class_name: &str) -> PathBuf {
    java_package_dir.join(format!("{}.java", class_name))
}

fn walk_class(
    java_package_dir: &Path,
    class_name: &str,
    path: &str,
    records: &mut BTreeMap<String, FieldRecord>,
    visiting: &mut Vec<String>,
) -> Result<()> {
    if visiting.iter().any(|c| c == class_name) {
        return Ok(());
    }
    visiting.push(class_name.to_string());

    let file = class_file(java_package_dir, class_name);
    let source = fs::read_to_string(&file).map_err(|e| {
        MsggenError::output(format!("cannot read emitted class {}: {}", file.display(), e))
    })?;

    for caps in FIELD_DECL.captures_iter(&source) {
        let type_decl = &caps[1];
        let field_name = &caps[2];
        let field_path = format!("{}/{}", path, field_name);

        if let Some(element) = type_decl
            .strip_prefix("List<")
            .and_then(|rest| rest.strip_suffix('>'))
        {
            records.insert(
                field_path.clone(),
                FieldRecord {
                    raw_type: "array".to_string(),
                    shape: Shape::Array,
                    required: Required::Unknown,
                },
            );
            if class_file(java_package_dir, element).exists() {
                walk_class(java_package_dir, element, &field_path, records, visiting)?;
            }
        } else if type_decl == "String" || type_decl == "BigDecimal" {
            records.insert(
                field_path,
                FieldRecord {
                    raw_type: type_decl.to_string(),
                    shape: Shape::Primitive,
                    required: Required::Unknown,
                },
            );
        } else if class_file(java_package_dir, type_decl).exists() {
            records.insert(
                field_path.clone(),
                FieldRecord {
                    raw_type: "object".to_string(),
                    shape: Shape::Object,
                    required: Required::Unknown,
                },
            );
            walk_class(java_package_dir, type_decl, &field_path, records, visiting)?;
        } else {
            // Unknown simple type: record it and let the type mapping decide.
            records.insert(
                field_path,
                FieldRecord {
                    raw_type: type_decl.to_string(),
                    shape: Shape::Primitive,
                    required: Required::Unknown,
                },
            );
        }
    }

    visiting.pop();
    Ok(())
}
