//! Command Queue Model
//!
//! Ordered list of shell commands belonging to one run. The queue itself is
//! immutable once a run starts; progress is tracked by index in the
//! orchestrator's status board, never by mutating the queue.

use serde::{Deserialize, Serialize};

/// Ordered sequence of commands for a single run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandQueue {
    commands: Vec<String>,
}

impl CommandQueue {
    /// Create a queue from raw command strings, dropping blank entries
    pub fn new(commands: Vec<String>) -> Self {
        Self {
            commands: commands
                .into_iter()
                .map(|c| c.trim().to_string())
                .filter(|c| !c.is_empty())
                .collect(),
        }
    }

    /// Number of commands in the queue
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// True if the queue has no commands
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Command at `index`, if any
    pub fn get(&self, index: usize) -> Option<&str> {
        self.commands.get(index).map(String::as_str)
    }

    /// All commands, in order
    pub fn commands(&self) -> &[String] {
        &self.commands
    }

    /// Iterate over the commands
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.commands.iter().map(String::as_str)
    }
}

impl From<Vec<String>> for CommandQueue {
    fn from(commands: Vec<String>) -> Self {
        Self::new(commands)
    }
}

impl From<Vec<&str>> for CommandQueue {
    fn from(commands: Vec<&str>) -> Self {
        Self::new(commands.into_iter().map(str::to_string).collect())
    }
}
