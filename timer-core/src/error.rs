//! Measurement errors and reserved exit codes

use std::io;
use thiserror::Error;

/// Exit codes reserved for failures of the measuring process itself.
///
/// On success the measuring process exits with the child's own code, so
/// these overlap with ordinary child codes; stderr tells them apart.
pub mod exit_codes {
    /// Bad command line, unknown preset or invalid format template
    pub const ARGUMENT_PARSING: u8 = 1;
    /// The command does not exist
    pub const COMMAND_NOT_FOUND: u8 = 2;
    /// The command exists but could not be started
    pub const SPAWN: u8 = 3;
    /// Waiting for the child failed
    pub const WAIT: u8 = 4;
    /// `getrusage` failed
    pub const RUSAGE: u8 = 5;
    /// The monotonic clock could not be read
    pub const TIME: u8 = 6;
}

/// Fatal failures of the measurement protocol
#[derive(Debug, Error)]
pub enum MeasureError {
    /// The program does not exist
    #[error("Cannot find command '{command}': {source}")]
    CommandNotFound {
        /// Program as given
        command: String,
        /// Underlying spawn error
        source: io::Error,
    },

    /// The program exists but could not be started
    #[error("Cannot spawn child '{command}': {source}")]
    Spawn {
        /// Program as given
        command: String,
        /// Underlying spawn error
        source: io::Error,
    },

    /// Waiting for the child failed
    #[error("Cannot wait for child: {0}")]
    Wait(io::Error),

    /// `getrusage` failed
    #[error("Cannot get resource usage: {0}")]
    Usage(io::Error),

    /// The monotonic clock could not be read
    #[error("Cannot get time: {0}")]
    Clock(io::Error),
}

impl MeasureError {
    /// Classify a spawn failure
    pub(crate) fn spawn(command: String, source: io::Error) -> Self {
        match source.kind() {
            io::ErrorKind::NotFound => MeasureError::CommandNotFound { command, source },
            _ => MeasureError::Spawn { command, source },
        }
    }

    /// Reserved exit code for this failure
    pub fn exit_code(&self) -> u8 {
        match self {
            MeasureError::CommandNotFound { .. } => exit_codes::COMMAND_NOT_FOUND,
            MeasureError::Spawn { .. } => exit_codes::SPAWN,
            MeasureError::Wait(_) => exit_codes::WAIT,
            MeasureError::Usage(_) => exit_codes::RUSAGE,
            MeasureError::Clock(_) => exit_codes::TIME,
        }
    }
}
