//! Consistency issue types and the structured report.

use serde_json::{Map, Value, json};

/// Check category, in report order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum IssueCategory {
    MissingField,
    RequiredUnknown,
    StructureMismatch,
    TypeMismatch,
}

impl IssueCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            IssueCategory::MissingField => "MISSING_FIELD",
            IssueCategory::RequiredUnknown => "REQUIRED_UNKNOWN",
            IssueCategory::StructureMismatch => "STRUCTURE_MISMATCH",
            IssueCategory::TypeMismatch => "TYPE_MISMATCH",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IssueSeverity {
    Error,
    Warning,
}

impl IssueSeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            IssueSeverity::Error => "error",
            IssueSeverity::Warning => "warning",
        }
    }
}

/// One cross-artifact finding at field-path granularity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsistencyIssue {
    pub category: IssueCategory,
    pub severity: IssueSeverity,
    pub field_path: String,
    pub detail: String,
}

/// The full validation result for one staged tree.
#[derive(Debug, Clone)]
pub struct ConsistencyReport {
    pub strict_mode: bool,
    pub checked_paths: usize,
    pub issues: Vec<ConsistencyIssue>,
}

impl ConsistencyReport {
    pub fn error_count(&self) -> usize {
        self.issues
            .iter()
            .filter(|i| i.severity == IssueSeverity::Error)
            .count()
    }

    pub fn warning_count(&self) -> usize {
        self.issues
            .iter()
            .filter(|i| i.severity == IssueSeverity::Warning)
            .count()
    }

    /// Pass iff no error-severity issue survived.
    pub fn passed(&self) -> bool {
        self.error_count() == 0
    }

    /// Deterministic JSON rendering; issues are already sorted by
    /// `(category, fieldPath)`.
    pub fn to_json(&self) -> String {
        let mut root = Map::new();
        root.insert(
            "status".to_string(),
            json!(if self.passed() { "pass" } else { "fail" }),
        );
        root.insert("strictMode".to_string(), json!(self.strict_mode));
        root.insert(
            "artifacts".to_string(),
            json!(["xml", "java", "openapi"]),
        );
        root.insert("checkedPaths".to_string(), json!(self.checked_paths));
        root.insert("errorCount".to_string(), json!(self.error_count()));
        root.insert("warningCount".to_string(), json!(self.warning_count()));
        root.insert(
            "issues".to_string(),
            Value::Array(
                self.issues
                    .iter()
                    .map(|issue| {
                        let mut map = Map::new();
                        map.insert("category".to_string(), json!(issue.category.as_str()));
                        map.insert("severity".to_string(), json!(issue.severity.as_str()));
                        map.insert("fieldPath".to_string(), json!(issue.field_path));
                        map.insert("detail".to_string(), json!(issue.detail));
                        Value::Object(map)
                    })
                    .collect(),
            ),
        );

        let mut out = serde_json::to_string_pretty(&Value::Object(root))
            .expect("report serialization cannot fail");
        out.push('\n');
        out
    }

    /// Minimal Markdown summary.
    pub fn to_markdown(&self) -> String {
        let mut out = String::new();
        out.push_str("# Consistency Report\n\n");
        out.push_str(&format!(
            "Status: **{}** ({} error(s), {} warning(s), {} field path(s) checked)\n",
            if self.passed() { "pass" } else { "fail" },
            self.error_count(),
            self.warning_count(),
            self.checked_paths
        ));
        if !self.issues.is_empty() {
            out.push_str("\n| category | severity | fieldPath | detail |\n");
            out.push_str("|---|---|---|---|\n");
            for issue in &self.issues {
                out.push_str(&format!(
                    "| {} | {} | {} | {} |\n",
                    issue.category.as_str(),
                    issue.severity.as_str(),
                    issue.field_path.replace('|', "\\|"),
                    issue.detail.replace('|', "\\|")
                ));
            }
        }
        out
    }
}
