//! Output manifest generation.

use serde_json::{Map, Value, json};
use uuid::Uuid;

use crate::utils::now_iso8601;

/// One staged file, recorded at `add` time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedFile {
    pub rel_path: String,
    pub size: u64,
    pub sha256: String,
    pub kind: &'static str,
}

/// Logical type tag for a staged file, by extension.
pub fn kind_for(rel_path: &str) -> &'static str {
    match rel_path.rsplit('.').next().unwrap_or_default() {
        "xml" => "XML",
        "java" => "JAVA",
        "yaml" | "yml" => "YAML",
        "json" => "JSON",
        "md" => "MD",
        "txt" => "TXT",
        _ => "OTHER",
    }
}

/// Render `manifest.json`. The manifest never lists itself.
pub fn manifest_json(transaction_id: Uuid, files: &[StagedFile]) -> String {
    let mut root = Map::new();
    root.insert("transactionId".to_string(), json!(transaction_id.to_string()));
    root.insert("toolVersion".to_string(), json!(env!("CARGO_PKG_VERSION")));
    root.insert("parserVersion".to_string(), json!(env!("CARGO_PKG_VERSION")));
    root.insert("generatedAt".to_string(), json!(now_iso8601()));
    root.insert("fileCount".to_string(), json!(files.len()));
    root.insert(
        "totalBytes".to_string(),
        json!(files.iter().map(|f| f.size).sum::<u64>()),
    );
    root.insert(
        "files".to_string(),
        Value::Array(
            files
                .iter()
                .map(|file| {
                    let mut map = Map::new();
                    map.insert("path".to_string(), json!(file.rel_path));
                    map.insert("size".to_string(), json!(file.size));
                    map.insert("sha256".to_string(), json!(file.sha256));
                    map.insert("type".to_string(), json!(file.kind));
                    Value::Object(map)
                })
                .collect(),
        ),
    );

    let mut out = serde_json::to_string_pretty(&Value::Object(root))
        .expect("manifest serialization cannot fail");
    out.push('\n');
    out
}
