//! Run orchestration.
//!
//! Owns the fixed execution order: parse, stage every artifact into the
//! transaction, validate the staged tree, then commit. Emitters never see
//! the target directory and the audit log records each stage boundary.

use std::path::{Path, PathBuf};

use serde_json::{Map, json};
use tracing::info;

use crate::audit::{AuditEventKind, AuditLog, AuditSeverity};
use crate::config::Config;
use crate::emit::{self, paths};
use crate::error::{MsggenError, Result};
use crate::model::{MessageModel, to_canonical_json};
use crate::output::{CommitPreconditions, OutputTransaction, UnknownSpaceProbe, cleanup_orphans};
use crate::parser::{self, ParseOptions};
use crate::validate::{ConsistencyReport, validate_staged};

/// What a successful generate run produced.
#[derive(Debug)]
pub struct GenerateOutcome {
    pub target_dir: PathBuf,
    pub file_count: usize,
    pub report: ConsistencyReport,
}

/// Parse only; returns the model for `inspect`.
pub fn run_parse(
    config: &Config,
    spec_path: &Path,
    shared_header: Option<&Path>,
) -> Result<MessageModel> {
    parser::parse(
        spec_path,
        shared_header,
        ParseOptions {
            max_nesting_depth: config.parser.max_nesting_depth,
            max_identifier_length: parser::DEFAULT_MAX_IDENT,
        },
    )
}

/// The full pipeline: workbook to committed output tree.
pub fn run_generate(
    config: &Config,
    spec_path: &Path,
    shared_header: Option<&Path>,
    audit: &mut AuditLog,
) -> Result<GenerateOutcome> {
    let xml_settings = config.require_xml()?;
    let package = config.java_package()?;
    let target_dir = PathBuf::from(&config.output.root);

    let reaped = cleanup_orphans(&target_dir)?;
    if reaped > 0 {
        info!(reaped, "removed stale staging directories");
    }

    audit.info(
        AuditEventKind::InputLoaded,
        format!("loading specification {}", spec_path.display()),
    );
    audit.info(AuditEventKind::ParseStarted, "parsing workbook");
    let model = run_parse(config, spec_path, shared_header)?;
    let mut parse_data = Map::new();
    parse_data.insert("operationId".to_string(), json!(model.metadata.operation_id));
    parse_data.insert("requestFields".to_string(), json!(model.request.fields.len()));
    parse_data.insert("responseFields".to_string(), json!(model.response.fields.len()));
    audit.append(
        AuditEventKind::ParseCompleted,
        AuditSeverity::Info,
        "workbook parsed",
        parse_data,
    );

    let mut tx = OutputTransaction::begin(&target_dir)?;
    audit.info(
        AuditEventKind::TransactionStarted,
        format!("staging into {}", tx.staged_root().display()),
    );

    let report = match stage_and_validate(config, &model, &xml_settings, &package, &mut tx, audit) {
        Ok(report) => report,
        Err(err) => return rolled_back(tx, audit, err),
    };

    if !report.passed() {
        let issues = report
            .issues
            .iter()
            .map(|issue| {
                format!(
                    "{} {} {}: {}",
                    issue.severity.as_str(),
                    issue.category.as_str(),
                    issue.field_path,
                    issue.detail
                )
            })
            .collect();
        return rolled_back(
            tx,
            audit,
            MsggenError::Validation {
                error_count: report.error_count(),
                issues,
            },
        );
    }

    // The audit files are part of the committed tree and must be staged
    // before the swap; records appended after this point surface through
    // tracing only.
    audit.info(
        AuditEventKind::ManifestGenerated,
        format!("manifest will list {} files", tx.files().len() + 2),
    );
    let audit_json = audit.to_json();
    let audit_text = audit.to_text();
    if let Err(err) = tx.add(paths::AUDIT_JSON, audit_json.as_bytes()) {
        return rolled_back(tx, audit, err);
    }
    if let Err(err) = tx.add(paths::AUDIT_TEXT, audit_text.as_bytes()) {
        return rolled_back(tx, audit, err);
    }

    let file_count = tx.files().len() + 1; // plus the manifest

    let probe = UnknownSpaceProbe;
    let preconditions = CommitPreconditions {
        consistency_passed: report.passed(),
        message_validation_passed: None,
        min_free_bytes: config.output.min_free_bytes,
        keep_backup: config.output.keep_backup,
        probe: &probe,
    };

    // `commit` rolls the staged tree back itself on failure.
    match tx.commit(&preconditions) {
        Ok(()) => {}
        Err(err) => {
            audit.append(
                AuditEventKind::TransactionRolledBack,
                AuditSeverity::Error,
                err.to_string(),
                Map::new(),
            );
            return Err(err);
        }
    }

    audit.info(
        AuditEventKind::TransactionCommitted,
        format!("output committed to {}", target_dir.display()),
    );
    info!(target = %target_dir.display(), files = file_count, "generation committed");

    Ok(GenerateOutcome {
        target_dir,
        file_count,
        report,
    })
}

fn rolled_back<T>(
    tx: OutputTransaction,
    audit: &mut AuditLog,
    err: MsggenError,
) -> Result<T> {
    tx.rollback()?;
    audit.append(
        AuditEventKind::TransactionRolledBack,
        AuditSeverity::Error,
        err.to_string(),
        Map::new(),
    );
    Err(err)
}

/// Emit every artifact into the transaction in the fixed order, then run
/// the consistency validator over the staged tree.
fn stage_and_validate(
    config: &Config,
    model: &MessageModel,
    xml_settings: &crate::config::ResolvedXml,
    package: &str,
    tx: &mut OutputTransaction,
    audit: &mut AuditLog,
) -> Result<ConsistencyReport> {
    audit.info(AuditEventKind::GenerationStarted, "emitting artifacts");

    tx.add(paths::SPEC_TREE, to_canonical_json(model).as_bytes())?;

    let rename_doc = emit::rename::emit_rename_doc(model);
    tx.add(&rename_doc.rel_path, &rename_doc.bytes)?;

    let outbound = emit::xml::emit_outbound(model, xml_settings, package)?;
    tx.add(&outbound.rel_path, &outbound.bytes)?;
    let inbound = emit::xml::emit_inbound(model, xml_settings, package)?;
    tx.add(&inbound.rel_path, &inbound.bytes)?;

    let class_artifacts = emit::classes::emit_classes(
        model,
        emit::classes::ClassGenOptions {
            package,
            use_annotations: config.class_gen.use_annotations,
        },
    )?;
    for artifact in &class_artifacts {
        tx.add(&artifact.rel_path, &artifact.bytes)?;
    }

    let openapi_artifacts = emit::openapi::emit_openapi(model, &config.openapi)?;
    for artifact in &openapi_artifacts {
        tx.add(&artifact.rel_path, &artifact.bytes)?;
    }

    let mut generation_data = Map::new();
    generation_data.insert("stagedFiles".to_string(), json!(tx.files().len()));
    audit.append(
        AuditEventKind::GenerationCompleted,
        AuditSeverity::Info,
        "artifacts emitted",
        generation_data,
    );

    let operation_id = model.require_operation_id("the consistency validator")?;
    let report = validate_staged(tx.staged_root(), operation_id, package, &config.consistency)?;

    let mut validation_data = Map::new();
    validation_data.insert("errorCount".to_string(), json!(report.error_count()));
    validation_data.insert("warningCount".to_string(), json!(report.warning_count()));
    audit.append(
        AuditEventKind::ValidationResult,
        if report.passed() {
            AuditSeverity::Info
        } else {
            AuditSeverity::Error
        },
        if report.passed() {
            "consistency validation passed"
        } else {
            "consistency validation failed"
        },
        validation_data,
    );

    tx.add(paths::CONSISTENCY_REPORT, report.to_json().as_bytes())?;
    tx.add(paths::CONSISTENCY_SUMMARY, report.to_markdown().as_bytes())?;

    Ok(report)
}

/// Validate an already-committed output tree (the `validate` command).
/// The operation id is read back from the committed IR document.
pub fn run_validate(config: &Config, output_dir: &Path) -> Result<ConsistencyReport> {
    let tree_path = output_dir.join(paths::SPEC_TREE);
    let tree_text = std::fs::read_to_string(&tree_path).map_err(|e| {
        MsggenError::output(format!(
            "cannot read {} (is this a generated output tree?): {}",
            tree_path.display(),
            e
        ))
    })?;
    let tree: serde_json::Value = serde_json::from_str(&tree_text)
        .map_err(|e| MsggenError::output(format!("cannot parse committed IR document: {}", e)))?;
    let operation_id = tree["metadata"]["operationId"]
        .as_str()
        .ok_or_else(|| MsggenError::output("committed IR document has no operationId"))?
        .to_string();

    let package = config.java_package()?;
    validate_staged(output_dir, &operation_id, &package, &config.consistency)
}
