//! Audit logging.
//!
//! A deterministic record stream for one run: every record carries a
//! monotonic sequence number and the run's correlation id. Timestamps are
//! the only non-deterministic field and are excluded from determinism
//! checks. The log is passed explicitly to every component; there is no
//! global.

use serde_json::{Map, Value, json};
use uuid::Uuid;

use crate::utils::now_iso8601;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditEventKind {
    ToolStarted,
    InputLoaded,
    ParseStarted,
    ParseCompleted,
    GenerationStarted,
    GenerationCompleted,
    ValidationResult,
    TransactionStarted,
    TransactionCommitted,
    TransactionRolledBack,
    ManifestGenerated,
    ToolCompleted,
    ToolFailed,
}

impl AuditEventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditEventKind::ToolStarted => "tool_started",
            AuditEventKind::InputLoaded => "input_loaded",
            AuditEventKind::ParseStarted => "parse_started",
            AuditEventKind::ParseCompleted => "parse_completed",
            AuditEventKind::GenerationStarted => "generation_started",
            AuditEventKind::GenerationCompleted => "generation_completed",
            AuditEventKind::ValidationResult => "validation_result",
            AuditEventKind::TransactionStarted => "transaction_started",
            AuditEventKind::TransactionCommitted => "transaction_committed",
            AuditEventKind::TransactionRolledBack => "transaction_rolled_back",
            AuditEventKind::ManifestGenerated => "manifest_generated",
            AuditEventKind::ToolCompleted => "tool_completed",
            AuditEventKind::ToolFailed => "tool_failed",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditSeverity {
    Info,
    Warning,
    Error,
}

impl AuditSeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditSeverity::Info => "info",
            AuditSeverity::Warning => "warning",
            AuditSeverity::Error => "error",
        }
    }
}

#[derive(Debug, Clone)]
pub struct AuditRecord {
    pub id: Uuid,
    pub seq: u64,
    pub timestamp: String,
    pub kind: AuditEventKind,
    pub severity: AuditSeverity,
    pub message: String,
    pub data: Map<String, Value>,
}

/// The run-scoped audit log. Owned by the orchestrator and passed by
/// mutable reference; appends are strictly sequential.
#[derive(Debug)]
pub struct AuditLog {
    enabled: bool,
    correlation_id: Uuid,
    records: Vec<AuditRecord>,
}

impl AuditLog {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            correlation_id: Uuid::new_v4(),
            records: Vec::new(),
        }
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }

    pub fn records(&self) -> &[AuditRecord] {
        &self.records
    }

    pub fn append(
        &mut self,
        kind: AuditEventKind,
        severity: AuditSeverity,
        message: impl Into<String>,
        data: Map<String, Value>,
    ) {
        if !self.enabled {
            return;
        }
        let seq = self.records.len() as u64 + 1;
        self.records.push(AuditRecord {
            id: Uuid::new_v4(),
            seq,
            timestamp: now_iso8601(),
            kind,
            severity,
            message: message.into(),
            data,
        });
    }

    /// Convenience for the common info-with-no-data append.
    pub fn info(&mut self, kind: AuditEventKind, message: impl Into<String>) {
        self.append(kind, AuditSeverity::Info, message, Map::new());
    }

    /// Machine-readable rendering, records in sequence order.
    pub fn to_json(&self) -> String {
        let mut root = Map::new();
        root.insert(
            "correlationId".to_string(),
            json!(self.correlation_id.to_string()),
        );
        root.insert(
            "records".to_string(),
            Value::Array(
                self.records
                    .iter()
                    .map(|record| {
                        let mut map = Map::new();
                        map.insert("id".to_string(), json!(record.id.to_string()));
                        map.insert("seq".to_string(), json!(record.seq));
                        map.insert("timestamp".to_string(), json!(record.timestamp));
                        map.insert("kind".to_string(), json!(record.kind.as_str()));
                        map.insert("severity".to_string(), json!(record.severity.as_str()));
                        map.insert(
                            "correlationId".to_string(),
                            json!(self.correlation_id.to_string()),
                        );
                        map.insert("message".to_string(), json!(record.message));
                        map.insert("data".to_string(), Value::Object(record.data.clone()));
                        Value::Object(map)
                    })
                    .collect(),
            ),
        );
        let mut out = serde_json::to_string_pretty(&Value::Object(root))
            .expect("audit serialization cannot fail");
        out.push('\n');
        out
    }

    /// One line per record, fixed column layout.
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        for record in &self.records {
            out.push_str(&format!(
                "{:>4}  {}  {:<7}  {:<24}  {}\n",
                record.seq,
                record.timestamp,
                record.severity.as_str(),
                record.kind.as_str(),
                record.message
            ));
        }
        out
    }
}
