//! Deterministic block-style YAML writer.
//!
//! The OpenAPI emitter builds an insertion-ordered document tree and this
//! module turns it into bytes: two-space indent, block collections only,
//! quoting only where YAML would otherwise reinterpret the scalar.
//! Identical trees serialize to identical bytes.

use indexmap::IndexMap;

/// An ordered YAML value. Maps keep insertion order.
#[derive(Debug, Clone, PartialEq)]
pub enum Yaml {
    Null,
    Bool(bool),
    Int(i64),
    Str(String),
    Seq(Vec<Yaml>),
    Map(IndexMap<String, Yaml>),
}

impl Yaml {
    pub fn string(value: impl Into<String>) -> Self {
        Yaml::Str(value.into())
    }

    pub fn map() -> IndexMap<String, Yaml> {
        IndexMap::new()
    }

    pub fn as_map(&self) -> Option<&IndexMap<String, Yaml>> {
        match self {
            Yaml::Map(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_map_mut(&mut self) -> Option<&mut IndexMap<String, Yaml>> {
        match self {
            Yaml::Map(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Yaml::Str(s) => Some(s),
            _ => None,
        }
    }
}

/// Serialize a document with a trailing newline.
pub fn to_string(doc: &Yaml) -> String {
    let mut out = String::new();
    write_value(&mut out, doc, 0, false);
    if !out.ends_with('\n') {
        out.push('\n');
    }
    out
}

fn write_value(out: &mut String, value: &Yaml, indent: usize, inline_position: bool) {
    match value {
        Yaml::Map(map) if !map.is_empty() => {
            if inline_position {
                out.push('\n');
            }
            for (key, entry) in map {
                push_indent(out, indent);
                out.push_str(&quote_if_needed(key));
                out.push(':');
                match entry {
                    Yaml::Map(m) if !m.is_empty() => {
                        write_value(out, entry, indent + 1, true);
                    }
                    Yaml::Seq(s) if !s.is_empty() => {
                        write_value(out, entry, indent + 1, true);
                    }
                    _ => {
                        out.push(' ');
                        write_scalar(out, entry);
                        out.push('\n');
                    }
                }
            }
        }
        Yaml::Seq(seq) if !seq.is_empty() => {
            if inline_position {
                out.push('\n');
            }
            for entry in seq {
                push_indent(out, indent);
                out.push('-');
                match entry {
                    Yaml::Map(m) if !m.is_empty() => {
                        out.push(' ');
                        write_map_after_dash(out, m, indent + 1);
                    }
                    Yaml::Seq(s) if !s.is_empty() => {
                        write_value(out, entry, indent + 1, true);
                    }
                    _ => {
                        out.push(' ');
                        write_scalar(out, entry);
                        out.push('\n');
                    }
                }
            }
        }
        scalar => {
            if inline_position {
                out.push(' ');
            }
            write_scalar(out, scalar);
            out.push('\n');
        }
    }
}

// `- key: value` with the remaining entries aligned under the first.
fn write_map_after_dash(out: &mut String, map: &IndexMap<String, Yaml>, indent: usize) {
    for (i, (key, entry)) in map.iter().enumerate() {
        if i > 0 {
            push_indent(out, indent);
        }
        out.push_str(&quote_if_needed(key));
        out.push(':');
        match entry {
            Yaml::Map(m) if !m.is_empty() => {
                out.push('\n');
                let mut nested = String::new();
                write_value(&mut nested, entry, indent + 1, false);
                out.push_str(&nested);
            }
            Yaml::Seq(s) if !s.is_empty() => {
                write_value(out, entry, indent + 1, true);
            }
            _ => {
                out.push(' ');
                write_scalar(out, entry);
                out.push('\n');
            }
        }
    }
}

fn write_scalar(out: &mut String, value: &Yaml) {
    match value {
        Yaml::Null => out.push_str("null"),
        Yaml::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
        Yaml::Int(i) => out.push_str(&i.to_string()),
        Yaml::Str(s) => out.push_str(&quote_if_needed(s)),
        Yaml::Map(_) => out.push_str("{}"),
        Yaml::Seq(_) => out.push_str("[]"),
    }
}

fn push_indent(out: &mut String, indent: usize) {
    for _ in 0..indent {
        out.push_str("  ");
    }
}

/// Quote a scalar when YAML would otherwise reinterpret it: structural
/// characters, surrounding whitespace, emptiness, or ambiguity with
/// literals and numbers.
fn quote_if_needed(text: &str) -> String {
    if needs_quoting(text) {
        if text.contains('\'') {
            // Fall back to double quotes with escapes.
            let escaped = text.replace('\\', "\\\\").replace('"', "\\\"");
            format!("\"{}\"", escaped)
        } else {
            format!("'{}'", text)
        }
    } else {
        text.to_string()
    }
}

fn needs_quoting(text: &str) -> bool {
    if text.is_empty() {
        return true;
    }
    if text.starts_with(' ') || text.ends_with(' ') {
        return true;
    }
    if text.contains(':') || text.contains('#') {
        return true;
    }
    if text.starts_with(['-', '?', '&', '*', '!', '|', '>', '%', '@', '`', '"', '\'', '[', ']', '{', '}', ','])
    {
        return true;
    }
    let lowered = text.to_ascii_lowercase();
    if matches!(
        lowered.as_str(),
        "true" | "false" | "null" | "~" | "yes" | "no" | "on" | "off"
    ) {
        return true;
    }
    // Numeric-looking scalars keep their string type only when quoted.
    if text.parse::<f64>().is_ok() {
        return true;
    }
    false
}
