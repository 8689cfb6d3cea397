//! Validate command - consistency checks against a generated tree.

use anyhow::Result;

use super::super::args::ValidateCommand;
use super::super::exit_status::ExitStatus;
use super::load_or_report;
use crate::pipeline;
use crate::report;

pub fn validate(cmd: ValidateCommand) -> Result<ExitStatus> {
    let Some(mut config) = load_or_report(cmd.common.config.as_deref())? else {
        return Ok(ExitStatus::ConfigError);
    };
    if cmd.strict {
        config.consistency.strict_mode = true;
    }

    match pipeline::run_validate(&config, &cmd.dir) {
        Ok(report) => {
            report::print_report(&report);
            if report.passed() {
                Ok(ExitStatus::Success)
            } else {
                Ok(ExitStatus::ValidationError)
            }
        }
        Err(err) => {
            report::print_error(&err, cmd.common.verbose);
            Ok(ExitStatus::for_error(&err))
        }
    }
}
