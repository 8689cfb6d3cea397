//! Error types for the generation pipeline.
//!
//! One variant per failure kind, each carrying the structured context a
//! caller needs to point the user at the offending cell or file. Components
//! surface their own kind to the orchestrator; nothing retries locally.

use std::path::PathBuf;

use thiserror::Error;

/// Where in a workbook an error was detected. Row indices are 1-based.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellRef {
    pub sheet: String,
    pub row: u32,
    pub field: Option<String>,
}

impl CellRef {
    pub fn new(sheet: impl Into<String>, row: u32) -> Self {
        Self {
            sheet: sheet.into(),
            row,
            field: None,
        }
    }

    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }
}

impl std::fmt::Display for CellRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.field {
            Some(field) => write!(f, "sheet {}, row {}, field '{}'", self.sheet, self.row, field),
            None => write!(f, "sheet {}, row {}", self.sheet, self.row),
        }
    }
}

#[derive(Debug, Error)]
pub enum MsggenError {
    /// Structural or lexical violation of the specification workbook.
    #[error("parse error: {message} ({location})")]
    Parse { message: String, location: CellRef },

    /// The workbook itself could not be loaded.
    #[error("parse error: {message}: {path}")]
    ParseInput { message: String, path: PathBuf },

    /// Cross-artifact consistency failure. Each entry is one categorized
    /// issue line, pre-sorted by the validator.
    #[error("validation error: {error_count} error(s) across generated artifacts")]
    Validation {
        error_count: usize,
        issues: Vec<String>,
    },

    /// An emitter lacked required metadata or was handed an impossible node.
    #[error("generation error: {message}")]
    Generation { message: String },

    /// Filesystem precondition or commit failure.
    #[error("output error: {message}")]
    Output {
        message: String,
        #[source]
        source: Option<std::io::Error>,
    },

    /// Required configuration key missing or malformed.
    #[error("config error: {message}")]
    Config { message: String },
}

impl MsggenError {
    pub fn parse(message: impl Into<String>, location: CellRef) -> Self {
        Self::Parse {
            message: message.into(),
            location,
        }
    }

    pub fn generation(message: impl Into<String>) -> Self {
        Self::Generation {
            message: message.into(),
        }
    }

    pub fn output(message: impl Into<String>) -> Self {
        Self::Output {
            message: message.into(),
            source: None,
        }
    }

    pub fn output_io(message: impl Into<String>, source: std::io::Error) -> Self {
        Self::Output {
            message: message.into(),
            source: Some(source),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, MsggenError>;
