//! Canonical JSON serialization of the intermediate tree.
//!
//! Key order is fixed per record type, nulls are explicit, collections
//! keep insertion order, two-space indentation with `\n` line endings.
//! Identical trees must serialize to identical bytes.

use serde_json::{Map, Value, json};

use super::{FieldGroup, FieldNode, MessageModel};

/// Serialize the model to its canonical on-disk form.
pub fn to_canonical_json(model: &MessageModel) -> String {
    let mut root = Map::new();
    root.insert("metadata".to_string(), metadata_value(model));
    root.insert(
        "sharedHeader".to_string(),
        match &model.shared_header {
            Some(group) => group_value(group),
            None => Value::Null,
        },
    );
    root.insert("request".to_string(), group_value(&model.request));
    root.insert("response".to_string(), group_value(&model.response));

    let mut out = serde_json::to_string_pretty(&Value::Object(root))
        .expect("canonical tree serialization cannot fail");
    out.push('\n');
    out
}

fn metadata_value(model: &MessageModel) -> Value {
    let m = &model.metadata;
    let mut map = Map::new();
    map.insert("sourceFile".to_string(), json!(m.source_file));
    map.insert("sharedHeaderFile".to_string(), opt_str(&m.shared_header_file));
    map.insert("parseTimestamp".to_string(), json!(m.parse_timestamp));
    map.insert("parserVersion".to_string(), json!(m.parser_version));
    map.insert("operationName".to_string(), opt_str(&m.operation_name));
    map.insert("operationId".to_string(), opt_str(&m.operation_id));
    map.insert("version".to_string(), opt_str(&m.version));
    Value::Object(map)
}

fn group_value(group: &FieldGroup) -> Value {
    Value::Array(group.fields.iter().map(node_value).collect())
}

fn node_value(node: &FieldNode) -> Value {
    let mut map = Map::new();
    map.insert("originalName".to_string(), json!(node.original_name));
    map.insert("camelCaseName".to_string(), opt_str(&node.camel_case_name));
    map.insert("className".to_string(), opt_str(&node.class_name));
    map.insert("segLevel".to_string(), json!(node.seg_level));
    map.insert(
        "length".to_string(),
        node.length.map(|l| json!(l)).unwrap_or(Value::Null),
    );
    map.insert("dataType".to_string(), opt_str(&node.data_type));
    map.insert(
        "optionality".to_string(),
        node.optionality
            .map(|o| json!(o.as_str()))
            .unwrap_or(Value::Null),
    );
    map.insert("defaultValue".to_string(), opt_str(&node.default_value));
    map.insert("hardCodeValue".to_string(), opt_str(&node.hard_code_value));
    map.insert("enumConstraint".to_string(), opt_str(&node.enum_constraint));
    map.insert("groupId".to_string(), opt_str(&node.group_id));
    map.insert("occurrenceCount".to_string(), opt_str(&node.occurrence_count));
    map.insert("isArray".to_string(), json!(node.is_array));
    map.insert("isObject".to_string(), json!(node.is_object));
    map.insert("isTransitory".to_string(), json!(node.is_transitory));
    map.insert(
        "children".to_string(),
        Value::Array(node.children.iter().map(node_value).collect()),
    );
    map.insert(
        "source".to_string(),
        json!({
            "sheetName": node.source.sheet_name,
            "rowIndex": node.source.row_index,
        }),
    );
    Value::Object(map)
}

fn opt_str(value: &Option<String>) -> Value {
    match value {
        Some(s) => json!(s),
        None => Value::Null,
    }
}
