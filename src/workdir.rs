//! Directory Context Tracker
//!
//! The remote session has no persistent shell, so the working directory is
//! tracked locally as a logical cursor and every command is rewritten into a
//! directory-qualified form (`cd <cursor> && <command>`). Only `cd` commands
//! move the cursor; `cd` itself is verified remotely with `&& pwd`.

/// Logical remote working directory for one execution branch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryCursor {
    cursor: String,
}

/// A command rewritten against the current cursor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QualifiedCommand {
    /// The command line actually sent to the remote side
    pub remote: String,
    /// Whether the original command was a `cd`
    pub is_cd: bool,
}

impl DirectoryCursor {
    /// Start at the login directory
    pub fn home() -> Self {
        Self {
            cursor: "~".to_string(),
        }
    }

    /// Start at an explicit path
    pub fn at(path: impl Into<String>) -> Self {
        let path = path.into();
        if path.trim().is_empty() {
            return Self::home();
        }
        Self { cursor: path }
    }

    /// Current logical directory
    pub fn path(&self) -> &str {
        &self.cursor
    }

    /// Copy the cursor for a parallel branch. Branches never share a cursor
    /// again after the fork.
    pub fn fork(&self) -> Self {
        self.clone()
    }

    /// Rewrite `command` into its directory-qualified form, updating the
    /// cursor if the command is a `cd`.
    pub fn qualify(&mut self, command: &str) -> QualifiedCommand {
        let trimmed = command.trim();

        if let Some(operand) = cd_operand(trimmed) {
            self.apply_cd(operand);
            return QualifiedCommand {
                remote: format!("cd {} && pwd", self.cursor),
                is_cd: true,
            };
        }

        QualifiedCommand {
            remote: format!("cd {} && {}", self.cursor, trimmed),
            is_cd: false,
        }
    }

    /// Move the cursor for a `cd` operand:
    /// absolute paths replace, `~`/empty reset, anything else appends.
    fn apply_cd(&mut self, operand: &str) {
        let operand = operand.trim();
        if operand.is_empty() || operand == "~" {
            self.cursor = "~".to_string();
        } else if operand.starts_with('/') {
            self.cursor = operand.to_string();
        } else if let Some(rest) = operand.strip_prefix("~/") {
            self.cursor = format!("~/{}", rest);
        } else if self.cursor == "~" {
            self.cursor = format!("~/{}", operand);
        } else {
            self.cursor = format!("{}/{}", self.cursor, operand);
        }
    }
}

impl Default for DirectoryCursor {
    fn default() -> Self {
        Self::home()
    }
}

/// Extract the operand of a `cd` command, or None if it is not one
fn cd_operand(command: &str) -> Option<&str> {
    if command == "cd" {
        return Some("");
    }
    command.strip_prefix("cd ")
}
