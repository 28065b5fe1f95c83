//! SSH Transport Seam
//!
//! The core never touches protocol or wire details. A transport
//! implementation (russh-backed, test mock, ...) supplies sessions; a
//! session runs one command at a time and exposes it as an [`ExecChannel`]:
//! an event stream (data / stderr / close) plus a clonable stdin writer.
//!
//! Channel I/O is bridged through tokio mpsc channels so a blocking
//! transport thread and the async orchestrator stay decoupled.

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::error::{Error, Result};
use crate::models::ConnectionConfig;

/// One event emitted by a running remote command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelEvent {
    /// Stdout bytes
    Data(Vec<u8>),
    /// Stderr bytes
    Stderr(Vec<u8>),
    /// The channel closed; exit code if the remote side reported one
    Close { exit_code: Option<i32> },
}

/// Clonable stdin writer for a running command.
///
/// Cloned into the password responder's timer task; sends are best-effort
/// and fail only if the channel is already gone.
#[derive(Debug, Clone)]
pub struct ChannelWriter {
    input_tx: mpsc::UnboundedSender<Vec<u8>>,
}

impl ChannelWriter {
    pub fn send(&self, data: &[u8]) -> Result<()> {
        self.input_tx
            .send(data.to_vec())
            .map_err(|e| Error::ChannelWriteFailed {
                reason: e.to_string(),
            })
    }
}

/// Live command channel: event receiver plus stdin writer
pub struct ExecChannel {
    events_rx: mpsc::UnboundedReceiver<ChannelEvent>,
    writer: ChannelWriter,
}

impl ExecChannel {
    /// Build a channel from its transport-side halves
    pub fn from_channels(
        events_rx: mpsc::UnboundedReceiver<ChannelEvent>,
        input_tx: mpsc::UnboundedSender<Vec<u8>>,
    ) -> Self {
        Self {
            events_rx,
            writer: ChannelWriter { input_tx },
        }
    }

    /// Next event, or None if the transport side dropped without closing
    pub async fn next_event(&mut self) -> Option<ChannelEvent> {
        self.events_rx.recv().await
    }

    /// Clone the stdin writer
    pub fn writer(&self) -> ChannelWriter {
        self.writer.clone()
    }
}

/// An open remote command-execution session.
///
/// Exclusively owned by whichever component created it; `end()` is called
/// exactly once. Dropping a session with a command still attached leaves
/// that remote process running, which is exactly what a parallel handoff
/// relies on.
#[async_trait]
pub trait Session: Send {
    /// Start a command line on the remote side
    async fn exec(&mut self, command_line: &str) -> Result<ExecChannel>;

    /// Close the session. Idempotent at the trait level; callers still
    /// arrange to call it once.
    async fn end(&mut self);

    /// Short label for log lines ("primary", "parallel-1", ...)
    fn label(&self) -> &str;
}

/// Connection factory for sessions.
///
/// Implementations answer keyboard-interactive auth challenges with
/// `config.password()`; the credential never leaves the transport layer in
/// any other form.
#[async_trait]
pub trait SshTransport: Send + Sync {
    async fn connect(&self, config: &ConnectionConfig) -> Result<Box<dyn Session>>;
}
