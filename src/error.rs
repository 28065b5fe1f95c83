//! Error types and Result aliases for remoterun

use std::fmt;
use std::time::Duration;

/// Result type alias for remoterun operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for remoterun
#[derive(Debug)]
pub enum Error {
    // === Connection / transport errors ===
    /// Failed to open a session to the remote host
    ConnectionFailed {
        host: String,
        reason: String,
    },

    /// Session was closed while a command was still in flight
    SessionClosed {
        reason: String,
    },

    /// Failed to start a command on the session
    ExecFailed {
        command: String,
        reason: String,
    },

    /// Failed to write to a command channel (stdin side)
    ChannelWriteFailed {
        reason: String,
    },

    // === Orchestration errors ===
    /// Secondary session for a parallel handoff could not be opened
    HandoffFailed {
        host: String,
        reason: String,
    },

    /// A command exceeded its allotted time
    CommandTimeout {
        command: String,
        duration: Duration,
    },

    /// Command queue was empty at run start
    EmptyQueue,

    /// Status board and command queue went out of step
    StateMismatch {
        statuses: usize,
        commands: usize,
    },

    // === Persistence errors ===
    /// Failed to load the saved-process store
    StoreLoadFailed {
        reason: String,
    },

    /// Failed to save the saved-process store
    StoreSaveFailed {
        reason: String,
    },

    // === Debug session errors ===
    /// Failed to acquire or restore raw terminal mode
    RawModeFailed {
        reason: String,
    },

    // === I/O and library errors ===
    /// I/O errors
    Io(std::io::Error),

    /// Serialization errors
    Serde(serde_json::Error),

    /// Regex compilation errors
    Regex(regex::Error),

    // === Generic fallback (use sparingly) ===
    /// Generic errors (for cases not yet categorized)
    Other(String),
}

impl Error {
    /// True for transport-level errors that end the current session
    /// (the run ends unless the user restarts with a fresh session).
    pub fn is_connection_error(&self) -> bool {
        matches!(
            self,
            Error::ConnectionFailed { .. } | Error::SessionClosed { .. }
        )
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::ConnectionFailed { host, reason } => {
                write!(f, "Failed to connect to '{}': {}", host, reason)
            }
            Error::SessionClosed { reason } => {
                write!(f, "Session closed unexpectedly: {}", reason)
            }
            Error::ExecFailed { command, reason } => {
                write!(f, "Failed to execute '{}': {}", command, reason)
            }
            Error::ChannelWriteFailed { reason } => {
                write!(f, "Failed to write to command channel: {}", reason)
            }
            Error::HandoffFailed { host, reason } => {
                write!(f, "Could not open parallel session to '{}': {}", host, reason)
            }
            Error::CommandTimeout { command, duration } => {
                write!(f, "Command '{}' timed out after {:?}", command, duration)
            }
            Error::EmptyQueue => {
                write!(f, "Command queue is empty")
            }
            Error::StateMismatch { statuses, commands } => {
                write!(
                    f,
                    "Status board has {} entries for {} commands",
                    statuses, commands
                )
            }
            Error::StoreLoadFailed { reason } => {
                write!(f, "Failed to load saved processes: {}", reason)
            }
            Error::StoreSaveFailed { reason } => {
                write!(f, "Failed to save processes: {}", reason)
            }
            Error::RawModeFailed { reason } => {
                write!(f, "Raw terminal mode error: {}", reason)
            }
            Error::Io(err) => write!(f, "I/O error: {}", err),
            Error::Serde(err) => write!(f, "Serialization error: {}", err),
            Error::Regex(err) => write!(f, "Regex compilation error: {}", err),
            Error::Other(msg) => write!(f, "Error: {}", msg),
        }
    }
}

impl std::error::Error for Error {}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serde(err)
    }
}

impl From<regex::Error> for Error {
    fn from(err: regex::Error) -> Self {
        Error::Regex(err)
    }
}

impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Error::Other(err.to_string())
    }
}

impl From<String> for Error {
    fn from(err: String) -> Self {
        Error::Other(err)
    }
}

impl From<&str> for Error {
    fn from(err: &str) -> Self {
        Error::Other(err.to_string())
    }
}
