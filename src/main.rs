//! msggen CLI application entry point.
//!
//! This binary handles command dispatch for the msggen artifact
//! generator.

use std::io;
use std::process::ExitCode;

use clap::{CommandFactory, Parser};
use msggen::cli::{Arguments, ExitStatus};
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    let args = Arguments::parse();
    init_tracing(args.verbose());

    let Some(command) = args.command else {
        Arguments::command().print_help().ok();
        return ExitStatus::InvalidArgument.into();
    };

    match msggen::cli::run_cli(command) {
        Ok(status) => status.into(),
        Err(err) => {
            eprintln!("Error: {}", err);
            ExitStatus::Error.into()
        }
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}
