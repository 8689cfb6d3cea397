//! Report formatting and printing utilities.
//!
//! Cargo-style console output for run results and consistency issues.
//! Separate from core logic so msggen can be used as a library.

use std::io::{self, Write};

use colored::Colorize;

use crate::error::MsggenError;
use crate::pipeline::GenerateOutcome;
use crate::validate::{ConsistencyReport, IssueSeverity};

/// Success mark for consistent output formatting.
pub const SUCCESS_MARK: &str = "\u{2713}"; // ✓

/// Failure mark for consistent output formatting.
pub const FAILURE_MARK: &str = "\u{2718}"; // ✘

/// Print the outcome of a committed generate run.
pub fn print_generate_success(outcome: &GenerateOutcome) {
    print_generate_success_to(outcome, &mut io::stdout().lock());
}

pub fn print_generate_success_to<W: Write>(outcome: &GenerateOutcome, writer: &mut W) {
    let _ = writeln!(
        writer,
        "{} {}",
        SUCCESS_MARK.green(),
        format!(
            "Generated {} files to {}",
            outcome.file_count,
            outcome.target_dir.display()
        )
        .green()
    );
    let warnings = outcome.report.warning_count();
    if warnings > 0 {
        let _ = writeln!(
            writer,
            "{} {} consistency warning(s); see consistency-report.json",
            "warning:".bold().yellow(),
            warnings
        );
    }
}

/// Print a failure as a single line, plus structured context in verbose
/// mode.
pub fn print_error(err: &MsggenError, verbose: bool) {
    print_error_to(err, verbose, &mut io::stderr().lock());
}

pub fn print_error_to<W: Write>(err: &MsggenError, verbose: bool, writer: &mut W) {
    let _ = writeln!(writer, "{} {}", FAILURE_MARK.red(), err.to_string().red());
    if let MsggenError::Validation { issues, .. } = err {
        let limit = if verbose { issues.len() } else { 10 };
        for issue in issues.iter().take(limit) {
            let _ = writeln!(writer, "  {} {}", "-->".blue(), issue);
        }
        if issues.len() > limit {
            let _ = writeln!(
                writer,
                "  ... and {} more (use {} for all)",
                issues.len() - limit,
                "-v".cyan()
            );
        }
    }
}

/// Print a consistency report in cargo-style format.
pub fn print_report(report: &ConsistencyReport) {
    print_report_to(report, &mut io::stdout().lock());
}

pub fn print_report_to<W: Write>(report: &ConsistencyReport, writer: &mut W) {
    for issue in &report.issues {
        let severity_str = match issue.severity {
            IssueSeverity::Error => "error".bold().red(),
            IssueSeverity::Warning => "warning".bold().yellow(),
        };
        let _ = writeln!(
            writer,
            "{}: \"{}\"  {}",
            severity_str,
            issue.field_path,
            issue.category.as_str().to_ascii_lowercase().replace('_', "-").dimmed().cyan()
        );
        let _ = writeln!(writer, "  {} {}", "=".blue(), issue.detail);
    }

    if report.passed() {
        let _ = writeln!(
            writer,
            "{} {}",
            SUCCESS_MARK.green(),
            format!(
                "Checked {} field path(s) - no errors",
                report.checked_paths
            )
            .green()
        );
    } else {
        let _ = writeln!(
            writer,
            "\n{} {} problems ({} {}, {} {})",
            FAILURE_MARK.red(),
            report.issues.len(),
            report.error_count(),
            if report.error_count() == 1 { "error" } else { "errors" }.red(),
            report.warning_count(),
            if report.warning_count() == 1 {
                "warning"
            } else {
                "warnings"
            }
            .yellow()
        );
    }
}
