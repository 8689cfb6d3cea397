//! CLI argument definitions using clap.
//!
//! ## Commands
//!
//! - `generate`: run the full pipeline (parse, emit, validate, commit)
//! - `inspect`: parse a workbook and print the canonical tree JSON
//! - `validate`: re-run the consistency checks on a generated tree
//! - `init`: write a starter configuration file

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::config::SplitStrategy;

#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Arguments {
    #[command(subcommand)]
    pub command: Option<Command>,
}

impl Arguments {
    /// Get the verbose flag from the command's common args.
    pub fn verbose(&self) -> bool {
        match &self.command {
            Some(Command::Generate(cmd)) => cmd.common.verbose,
            Some(Command::Inspect(cmd)) => cmd.common.verbose,
            Some(Command::Validate(cmd)) => cmd.common.verbose,
            Some(Command::Init) | None => false,
        }
    }
}

/// Common arguments shared by all commands.
#[derive(Debug, Clone, Args)]
pub struct CommonArgs {
    /// Configuration file path (overrides upward discovery)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SplitStrategyArg {
    None,
    ByObject,
}

impl From<SplitStrategyArg> for SplitStrategy {
    fn from(value: SplitStrategyArg) -> Self {
        match value {
            SplitStrategyArg::None => SplitStrategy::None,
            SplitStrategyArg::ByObject => SplitStrategy::ByObject,
        }
    }
}

#[derive(Debug, Args)]
pub struct GenerateCommand {
    /// Specification workbook (JSON grid)
    pub spec: PathBuf,

    /// Separate shared-header workbook
    #[arg(long)]
    pub shared_header: Option<PathBuf>,

    /// Target output directory (overrides config file)
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Destination package for the data classes (overrides config file)
    #[arg(long)]
    pub package: Option<String>,

    /// Emit annotation-driven classes instead of explicit accessors
    #[arg(long)]
    pub use_annotations: bool,

    /// Schema layout for the OpenAPI components (overrides config file)
    #[arg(long, value_enum)]
    pub split_strategy: Option<SplitStrategyArg>,

    /// Treat consistency warnings as errors
    #[arg(long)]
    pub strict: bool,

    /// Keep the previous output as a backup directory
    #[arg(long)]
    pub keep_backup: bool,

    /// Maximum nesting depth before the parser warns (overrides config file)
    #[arg(long)]
    pub max_nesting_depth: Option<u32>,

    #[command(flatten)]
    pub common: CommonArgs,
}

#[derive(Debug, Args)]
pub struct InspectCommand {
    /// Specification workbook (JSON grid)
    pub spec: PathBuf,

    /// Separate shared-header workbook
    #[arg(long)]
    pub shared_header: Option<PathBuf>,

    #[command(flatten)]
    pub common: CommonArgs,
}

#[derive(Debug, Args)]
pub struct ValidateCommand {
    /// A previously generated output directory
    pub dir: PathBuf,

    /// Treat consistency warnings as errors
    #[arg(long)]
    pub strict: bool,

    #[command(flatten)]
    pub common: CommonArgs,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Generate all artifacts from a specification workbook
    Generate(GenerateCommand),
    /// Parse a workbook and print the canonical tree JSON
    Inspect(InspectCommand),
    /// Run the consistency checks against a generated output tree
    Validate(ValidateCommand),
    /// Initialize a new .msggenrc.json configuration file
    Init,
}
