//! Inspect command - parse only, print the canonical tree.

use anyhow::Result;

use super::super::args::InspectCommand;
use super::super::exit_status::ExitStatus;
use super::load_or_report;
use crate::model::to_canonical_json;
use crate::pipeline;
use crate::report;

pub fn inspect(cmd: InspectCommand) -> Result<ExitStatus> {
    let Some(config) = load_or_report(cmd.common.config.as_deref())? else {
        return Ok(ExitStatus::ConfigError);
    };

    match pipeline::run_parse(&config, &cmd.spec, cmd.shared_header.as_deref()) {
        Ok(model) => {
            print!("{}", to_canonical_json(&model));
            Ok(ExitStatus::Success)
        }
        Err(err) => {
            report::print_error(&err, cmd.common.verbose);
            Ok(ExitStatus::for_error(&err))
        }
    }
}
