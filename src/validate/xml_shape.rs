//! XML artifact normalization for the consistency checks.
//!
//! Reads an emitted converter document back into `(fieldPath, record)`
//! tuples. Transitory fields carry no name and are skipped.

use std::collections::BTreeMap;

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use super::{FieldRecord, Required, Shape};
use crate::error::{MsggenError, Result};

/// Extract field records from converter XML, rooted at `root`
/// (`Request` or `Response`).
pub fn extract(xml_text: &str, root: &str) -> Result<BTreeMap<String, FieldRecord>> {
    let mut reader = Reader::from_str(xml_text);
    let mut records = BTreeMap::new();
    let mut path: Vec<String> = vec![root.to_string()];
    // One entry per open <field> element: whether it pushed a path segment.
    let mut open_fields: Vec<bool> = Vec::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) if e.name().as_ref() == b"field" => {
                let pushed = handle_field(&e, &mut path, &mut records, false)?;
                open_fields.push(pushed);
            }
            Ok(Event::Empty(e)) if e.name().as_ref() == b"field" => {
                handle_field(&e, &mut path, &mut records, true)?;
            }
            Ok(Event::End(e)) if e.name().as_ref() == b"field" => {
                if open_fields.pop().unwrap_or(false) {
                    path.pop();
                }
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => {
                return Err(MsggenError::output(format!(
                    "cannot read emitted converter XML: {}",
                    e
                )));
            }
        }
    }

    Ok(records)
}

fn handle_field(
    element: &BytesStart<'_>,
    path: &mut Vec<String>,
    records: &mut BTreeMap<String, FieldRecord>,
    self_closing: bool,
) -> Result<bool> {
    let mut name = None;
    let mut field_type = None;
    let mut converter = None;
    let mut transitory = false;

    for attr in element.attributes() {
        let attr = attr.map_err(|e| {
            MsggenError::output(format!("cannot read emitted converter XML: {}", e))
        })?;
        let value = attr
            .unescape_value()
            .map_err(|e| {
                MsggenError::output(format!("cannot read emitted converter XML: {}", e))
            })?
            .into_owned();
        match attr.key.as_ref() {
            b"name" => name = Some(value),
            b"type" => field_type = Some(value),
            b"converter" => converter = Some(value),
            b"transitory" => transitory = value == "true",
            _ => {}
        }
    }

    if transitory {
        return Ok(false);
    }
    let Some(name) = name else {
        return Ok(false);
    };

    let field_path = format!("{}/{}", path.join("/"), name);
    match field_type.as_deref() {
        Some("CompositeField") => {
            records.insert(
                field_path,
                FieldRecord {
                    raw_type: "object".to_string(),
                    shape: Shape::Object,
                    required: Required::Unknown,
                },
            );
            if !self_closing {
                path.push(name);
                return Ok(true);
            }
        }
        Some("RepeatingField") => {
            records.insert(
                field_path,
                FieldRecord {
                    raw_type: "array".to_string(),
                    shape: Shape::Array,
                    required: Required::Unknown,
                },
            );
            if !self_closing {
                path.push(name);
                return Ok(true);
            }
        }
        _ => {
            records.insert(
                field_path,
                FieldRecord {
                    raw_type: converter.unwrap_or_default(),
                    shape: Shape::Primitive,
                    required: Required::Unknown,
                },
            );
        }
    }
    Ok(false)
}
