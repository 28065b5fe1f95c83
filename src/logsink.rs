//! Log Sink
//!
//! Append-only, line-oriented text sink for run output. The orchestrator
//! writes marker lines (`COMMAND:`, `FIN COMANDO`, `AUTO-RESPONSE`,
//! `BACKGROUND COMMAND`) between command output so a viewer can split the
//! log later; this is display framing, not a schema.
//!
//! Writes are best-effort on the hot path: a sink that fails to write must
//! never take the run down with it.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::warn;

use crate::error::Result;

/// Marker lines recognized by the log viewer
pub mod markers {
    /// Starts a command block
    pub const COMMAND: &str = "COMMAND:";
    /// Ends a command block
    pub const COMMAND_END: &str = "FIN COMANDO";
    /// A credential was auto-sent (always redacted)
    pub const AUTO_RESPONSE: &str = "AUTO-RESPONSE";
    /// A command was detached via the legacy background path
    pub const BACKGROUND: &str = "BACKGROUND COMMAND";
}

/// Append-only text sink for run logs
pub trait LogSink: Send {
    /// Append text. Implementations swallow their own errors; the hot path
    /// never propagates a write failure.
    fn write(&mut self, text: &str);

    /// Flush and close the sink. Called exactly once by the run context.
    fn end(&mut self);
}

/// File-backed log sink
pub struct FileLogSink {
    path: PathBuf,
    file: Option<File>,
}

impl FileLogSink {
    /// Open (or create) the log file in append mode. On Unix the file is
    /// created owner read/write only, matching the run output's sensitivity.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        let mut options = OpenOptions::new();
        options.create(true).append(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }
        let file = options.open(&path)?;

        Ok(Self {
            path,
            file: Some(file),
        })
    }

    /// Path the sink writes to
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl LogSink for FileLogSink {
    fn write(&mut self, text: &str) {
        if let Some(file) = self.file.as_mut() {
            if let Err(e) = file.write_all(text.as_bytes()) {
                warn!("log sink write failed for {}: {}", self.path.display(), e);
            }
        }
    }

    fn end(&mut self) {
        if let Some(mut file) = self.file.take() {
            if let Err(e) = file.flush() {
                warn!("log sink flush failed for {}: {}", self.path.display(), e);
            }
        }
    }
}

/// In-memory log sink, for embedders and tests
#[derive(Debug, Default)]
pub struct MemoryLogSink {
    contents: String,
    closed: bool,
}

impl MemoryLogSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything written so far
    pub fn contents(&self) -> &str {
        &self.contents
    }

    /// Whether `end()` has been called
    pub fn is_closed(&self) -> bool {
        self.closed
    }
}

impl LogSink for MemoryLogSink {
    fn write(&mut self, text: &str) {
        if !self.closed {
            self.contents.push_str(text);
        }
    }

    fn end(&mut self) {
        self.closed = true;
    }
}
