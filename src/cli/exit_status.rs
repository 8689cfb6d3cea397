use std::process::ExitCode;

use crate::error::MsggenError;

/// Exit status for CLI commands. Each failure kind keeps a stable code so
/// callers can partition failures without parsing stderr.
///
/// - `Success` (0): a commit occurred (or a read-only command passed)
/// - `Error` (1): internal error outside the known kinds
/// - `InvalidArgument` (2): bad command line (clap's own code)
/// - `ConfigError` (3): required configuration missing or malformed
/// - `ParseError` (4): the workbook violated the layout conventions
/// - `GenerationError` (5): an emitter lacked required metadata
/// - `ValidationError` (6): cross-artifact consistency failure
/// - `OutputError` (7): filesystem precondition or commit failure
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ExitStatus {
    Success,
    Error,
    InvalidArgument,
    ConfigError,
    ParseError,
    GenerationError,
    ValidationError,
    OutputError,
}

impl ExitStatus {
    pub fn code(&self) -> u8 {
        match self {
            ExitStatus::Success => 0,
            ExitStatus::Error => 1,
            ExitStatus::InvalidArgument => 2,
            ExitStatus::ConfigError => 3,
            ExitStatus::ParseError => 4,
            ExitStatus::GenerationError => 5,
            ExitStatus::ValidationError => 6,
            ExitStatus::OutputError => 7,
        }
    }

    /// The stable mapping from error kind to exit status.
    pub fn for_error(err: &MsggenError) -> Self {
        match err {
            MsggenError::Parse { .. } | MsggenError::ParseInput { .. } => ExitStatus::ParseError,
            MsggenError::Validation { .. } => ExitStatus::ValidationError,
            MsggenError::Generation { .. } => ExitStatus::GenerationError,
            MsggenError::Output { .. } => ExitStatus::OutputError,
            MsggenError::Config { .. } => ExitStatus::ConfigError,
        }
    }
}

impl From<ExitStatus> for ExitCode {
    fn from(status: ExitStatus) -> Self {
        ExitCode::from(status.code())
    }
}
