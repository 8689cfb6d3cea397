//! Command dispatch.

use std::fs;
use std::path::Path;

use anyhow::Result;

use super::{
    args::Command,
    commands::{generate::generate, inspect::inspect, validate::validate},
    exit_status::ExitStatus,
};
use crate::config::{CONFIG_FILE_NAME, starter_config_json};

pub fn run(command: Command) -> Result<ExitStatus> {
    match command {
        Command::Generate(cmd) => generate(cmd),
        Command::Inspect(cmd) => inspect(cmd),
        Command::Validate(cmd) => validate(cmd),
        Command::Init => init(),
    }
}

/// Write a starter rc file into the working directory. The generated file
/// carries placeholder XML coordinates the user must replace; an existing
/// rc file is never clobbered.
fn init() -> Result<ExitStatus> {
    let target = Path::new(CONFIG_FILE_NAME);
    if target.exists() {
        anyhow::bail!(
            "{} already exists; delete it first to re-initialize",
            CONFIG_FILE_NAME
        );
    }

    fs::write(target, starter_config_json()?)?;
    println!(
        "Created {} - fill in the xml namespace and project coordinates",
        CONFIG_FILE_NAME
    );
    Ok(ExitStatus::Success)
}
