//! Generate command - the full pipeline from workbook to committed tree.

use anyhow::Result;
use serde_json::Map;

use super::super::args::GenerateCommand;
use super::super::exit_status::ExitStatus;
use super::load_or_report;
use crate::audit::{AuditEventKind, AuditLog, AuditSeverity};
use crate::config::Config;
use crate::pipeline;
use crate::report;

pub fn generate(cmd: GenerateCommand) -> Result<ExitStatus> {
    let Some(mut config) = load_or_report(cmd.common.config.as_deref())? else {
        return Ok(ExitStatus::ConfigError);
    };
    apply_overrides(&mut config, &cmd);

    let mut audit = AuditLog::new(config.audit.enabled);
    audit.info(
        AuditEventKind::ToolStarted,
        format!("msggen {} generate", env!("CARGO_PKG_VERSION")),
    );

    match pipeline::run_generate(
        &config,
        &cmd.spec,
        cmd.shared_header.as_deref(),
        &mut audit,
    ) {
        Ok(outcome) => {
            audit.info(AuditEventKind::ToolCompleted, "run completed");
            report::print_generate_success(&outcome);
            Ok(ExitStatus::Success)
        }
        Err(err) => {
            audit.append(
                AuditEventKind::ToolFailed,
                AuditSeverity::Error,
                err.to_string(),
                Map::new(),
            );
            report::print_error(&err, cmd.common.verbose);
            Ok(ExitStatus::for_error(&err))
        }
    }
}

fn apply_overrides(config: &mut Config, cmd: &GenerateCommand) {
    if let Some(output) = &cmd.output {
        config.output.root = output.display().to_string();
    }
    if let Some(package) = &cmd.package {
        config.class_gen.package = Some(package.clone());
    }
    if cmd.use_annotations {
        config.class_gen.use_annotations = true;
    }
    if let Some(strategy) = cmd.split_strategy {
        config.openapi.split_strategy = strategy.into();
    }
    if cmd.strict {
        config.consistency.strict_mode = true;
    }
    if cmd.keep_backup {
        config.output.keep_backup = true;
    }
    if let Some(depth) = cmd.max_nesting_depth {
        config.parser.max_nesting_depth = depth;
    }
}
