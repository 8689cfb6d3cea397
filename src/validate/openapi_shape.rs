//! OpenAPI artifact normalization for the consistency checks.
//!
//! Resolves schemas from the main document (inline form) or from the split
//! `schemas/` directory, then walks properties into `(fieldPath, record)`
//! tuples. Requiredness comes from each object's `required` list.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde_yaml::Value;

use super::{FieldRecord, Required, Shape};
use crate::error::{MsggenError, Result};

/// Schema resolver over an emitted `openapi/` directory.
pub struct SchemaSource {
    main: Value,
    schemas_dir: std::path::PathBuf,
}

impl SchemaSource {
    pub fn open(openapi_dir: &Path) -> Result<Self> {
        let main_path = openapi_dir.join("api.yaml");
        let text = fs::read_to_string(&main_path).map_err(|e| {
            MsggenError::output(format!(
                "cannot read emitted OpenAPI document {}: {}",
                main_path.display(),
                e
            ))
        })?;
        let main: Value = serde_yaml::from_str(&text).map_err(|e| {
            MsggenError::output(format!("cannot parse emitted OpenAPI document: {}", e))
        })?;
        Ok(Self {
            main,
            schemas_dir: openapi_dir.join("schemas"),
        })
    }

    /// Look a schema up inline first, then in the split directory.
    fn resolve(&self, name: &str) -> Result<Option<Value>> {
        if let Some(schema) = self.main["components"]["schemas"].get(name) {
            return Ok(Some(schema.clone()));
        }
        let split_path = self.schemas_dir.join(format!("{}.yaml", name));
        if !split_path.exists() {
            return Ok(None);
        }
        let text = fs::read_to_string(&split_path).map_err(|e| {
            MsggenError::output(format!(
                "cannot read split schema {}: {}",
                split_path.display(),
                e
            ))
        })?;
        let doc: Value = serde_yaml::from_str(&text).map_err(|e| {
            MsggenError::output(format!("cannot parse split schema {}: {}", name, e))
        })?;
        Ok(doc.get(name).cloned())
    }
}

/// Extract field records for `root_schema`, rooted at `root`. Returns an
/// empty map when the schema does not exist (e.g. an empty response).
pub fn extract(
    source: &SchemaSource,
    root_schema: &str,
    root: &str,
) -> Result<BTreeMap<String, FieldRecord>> {
    let mut records = BTreeMap::new();
    let Some(schema) = source.resolve(root_schema)? else {
        return Ok(records);
    };
    let mut visiting = Vec::new();
    walk_schema(source, &schema, root, &mut records, &mut visiting)?;
    Ok(records)
}

fn walk_schema(
    source: &SchemaSource,
    schema: &Value,
    path: &str,
    records: &mut BTreeMap<String, FieldRecord>,
    visiting: &mut Vec<String>,
) -> Result<()> {
    let required_names: Vec<String> = schema["required"]
        .as_sequence()
        .map(|seq| {
            seq.iter()
                .filter_map(|v| v.as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default();

    let Some(properties) = schema["properties"].as_mapping() else {
        return Ok(());
    };

    for (key, value) in properties {
        let Some(name) = key.as_str() else { continue };
        let field_path = format!("{}/{}", path, name);
        let required = if required_names.iter().any(|r| r == name) {
            Required::True
        } else {
            Required::False
        };

        if let Some(target) = ref_target(value) {
            records.insert(
                field_path.clone(),
                FieldRecord {
                    raw_type: "object".to_string(),
                    shape: Shape::Object,
                    required,
                },
            );
            descend(source, &target, &field_path, records, visiting)?;
        } else if value["type"].as_str() == Some("array") {
            records.insert(
                field_path.clone(),
                FieldRecord {
                    raw_type: "array".to_string(),
                    shape: Shape::Array,
                    required,
                },
            );
            if let Some(target) = ref_target(&value["items"]) {
                descend(source, &target, &field_path, records, visiting)?;
            }
        } else {
            let raw_type = value["format"]
                .as_str()
                .or_else(|| value["type"].as_str())
                .unwrap_or_default()
                .to_string();
            records.insert(
                field_path,
                FieldRecord {
                    raw_type,
                    shape: Shape::Primitive,
                    required,
                },
            );
        }
    }

    Ok(())
}

fn descend(
    source: &SchemaSource,
    target: &str,
    path: &str,
    records: &mut BTreeMap<String, FieldRecord>,
    visiting: &mut Vec<String>,
) -> Result<()> {
    if visiting.iter().any(|t| t == target) {
        return Ok(());
    }
    visiting.push(target.to_string());
    if let Some(schema) = source.resolve(target)? {
        walk_schema(source, &schema, path, records, visiting)?;
    }
    visiting.pop();
    Ok(())
}

/// Schema name referenced by a `$ref`, whatever its form:
/// `#/components/schemas/X`, `./X.yaml#/X` or `./schemas/X.yaml#/X`.
fn ref_target(value: &Value) -> Option<String> {
    let reference = value.get("$ref")?.as_str()?;
    reference.rsplit('/').next().map(str::to_string)
}
