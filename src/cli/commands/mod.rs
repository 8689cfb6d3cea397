//! Command handlers.

pub mod generate;
pub mod inspect;
pub mod validate;

use std::path::Path;

use anyhow::Result;

use crate::config::{Config, load_config};
use crate::report;

/// Load layered configuration, printing a failure and returning `None`
/// when it cannot be loaded (the caller maps that to the config exit
/// status).
pub(crate) fn load_or_report(explicit: Option<&Path>) -> Result<Option<Config>> {
    let cwd = std::env::current_dir()?;
    match load_config(&cwd, explicit) {
        Ok(loaded) => Ok(Some(loaded.config)),
        Err(err) => {
            report::print_error(
                &crate::error::MsggenError::config(format!("{:#}", err)),
                false,
            );
            Ok(None)
        }
    }
}
