//! Data Models
//!
//! Core domain entities: connection settings, the command queue, per-command
//! execution state, and the saved-process records this tool runs from.

pub mod command_queue;
pub mod connection;
pub mod execution;
pub mod saved_process;

pub use command_queue::CommandQueue;
pub use connection::ConnectionConfig;
pub use execution::{CommandStatus, ExecutionLogEntry, RunState};
pub use saved_process::{RedactedConfig, SavedProcess, REDACTED_PASSWORD};
