//! Execution State Model
//!
//! Per-command and per-run status enums plus the append-only log entry
//! written to the external log sink after every command.

use serde::{Deserialize, Serialize};

use crate::logsink::markers;

/// Status of one command in the queue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum CommandStatus {
    /// Not yet reached
    #[default]
    Pending,
    /// Currently executing on some session
    Running,
    /// Completed with exit code 0
    Success,
    /// Non-zero exit or critical error pattern in output
    Failed,
    /// Skipped by user choice
    Skipped,
    /// Executed on (or detached onto) a parallel session
    Parallel,
    /// Detached via the legacy background path
    Backgrounded,
    /// Resolved inside a debug session
    Debugged,
}

impl CommandStatus {
    /// Lowercase label used in log lines
    pub fn as_str(&self) -> &'static str {
        match self {
            CommandStatus::Pending => "pending",
            CommandStatus::Running => "running",
            CommandStatus::Success => "success",
            CommandStatus::Failed => "failed",
            CommandStatus::Skipped => "skipped",
            CommandStatus::Parallel => "parallel",
            CommandStatus::Backgrounded => "backgrounded",
            CommandStatus::Debugged => "debugged",
        }
    }

    /// True once the command will not run again in this branch
    pub fn is_terminal(&self) -> bool {
        !matches!(self, CommandStatus::Pending | CommandStatus::Running)
    }
}

/// Overall state of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunState {
    /// The orchestrator is advancing the queue
    #[default]
    Running,
    /// Ended by explicit terminate choice or a connection error
    Terminated,
    /// Queue exhausted
    Completed,
}

/// One append-only record written to the log sink after a command settles
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionLogEntry {
    /// The raw (unqualified) command
    pub command: String,
    /// Final status of the command
    pub status: CommandStatus,
    /// Captured output (stdout and stderr interleaved)
    pub output: String,
    /// Exit code if the channel reported one
    pub exit_code: Option<i32>,
    /// Free-form flags ("prematureExit", "timeoutFlag", "parallel", ...)
    pub flags: Vec<String>,
}

impl ExecutionLogEntry {
    pub fn new(command: impl Into<String>, status: CommandStatus) -> Self {
        Self {
            command: command.into(),
            status,
            output: String::new(),
            exit_code: None,
            flags: Vec::new(),
        }
    }

    pub fn with_output(mut self, output: impl Into<String>) -> Self {
        self.output = output.into();
        self
    }

    pub fn with_exit_code(mut self, exit_code: Option<i32>) -> Self {
        self.exit_code = exit_code;
        self
    }

    pub fn with_flag(mut self, flag: impl Into<String>) -> Self {
        self.flags.push(flag.into());
        self
    }

    /// Render the entry as the line-oriented block the log sink expects.
    /// Marker lines, not a strict schema; the viewer splits on them.
    pub fn render(&self) -> String {
        let mut text = String::new();
        text.push_str(&format!("{} {}\n", markers::COMMAND, self.command));
        if !self.output.is_empty() {
            text.push_str(&self.output);
            if !self.output.ends_with('\n') {
                text.push('\n');
            }
        }
        let exit = match self.exit_code {
            Some(code) => code.to_string(),
            None => "?".to_string(),
        };
        if self.flags.is_empty() {
            text.push_str(&format!(
                "{} [status={} exit={}]\n",
                markers::COMMAND_END,
                self.status.as_str(),
                exit
            ));
        } else {
            text.push_str(&format!(
                "{} [status={} exit={} flags={}]\n",
                markers::COMMAND_END,
                self.status.as_str(),
                exit,
                self.flags.join(",")
            ));
        }
        text
    }
}
