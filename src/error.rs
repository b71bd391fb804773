use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Everything that can go wrong while managing the fleet.
#[derive(Debug, Error)]
pub enum FleetError {
    #[error("invalid {field}: {reason}")]
    Validation { field: &'static str, reason: String },

    #[error("parse error: {0}")]
    Parse(String),

    #[error("vehicle with id {0} not found")]
    NotFound(i64),

    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("unknown command '{0}', type 'help' for the list of commands")]
    UnknownCommand(String),

    #[error("{command}: {reason}")]
    Usage { command: &'static str, reason: String },

    #[error("script {} is already running", .0.display())]
    ScriptCycle(PathBuf),

    #[error("scripts nested deeper than {0} levels")]
    ScriptDepth(usize),

    #[error("input ended before the vehicle was complete")]
    InputExhausted,
}

impl FleetError {
    pub fn validation(field: &'static str, reason: impl Into<String>) -> Self {
        FleetError::Validation { field, reason: reason.into() }
    }

    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        FleetError::Io { path: path.into(), source }
    }

    /// Fatal errors stop the interpreter; all others are reported and the
    /// loop keeps reading.
    pub fn is_fatal(&self) -> bool {
        matches!(self, FleetError::Io { .. })
    }
}

pub type Result<T> = std::result::Result<T, FleetError>;
