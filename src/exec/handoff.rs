//! Parallel handoff
//!
//! When a server command keeps the current session busy, the remaining queue
//! moves to a fresh session on the same host. Each handoff pushes a frame on
//! the orchestrator's work stack; a failed handoff falls back to sequential
//! execution on the original session once the server is backgrounded.

use tracing::{info, warn};

use crate::audit::{log_security_event, SecurityEvent};
use crate::error::{Error, Result};
use crate::models::ConnectionConfig;
use crate::transport::{Session, SshTransport};
use crate::workdir::DirectoryCursor;

/// One unit of pending work on the orchestrator's stack
pub struct HandoffFrame {
    pub session: Box<dyn Session>,
    /// Index into the queue of the next command to run
    pub next_index: usize,
    pub cursor: DirectoryCursor,
    /// Whether this frame runs on a continuation session
    pub parallel: bool,
}

impl HandoffFrame {
    pub fn initial(session: Box<dyn Session>) -> Self {
        Self {
            session,
            next_index: 0,
            cursor: DirectoryCursor::home(),
            parallel: false,
        }
    }
}

/// Opens continuation sessions for parallel handoff
pub struct HandoffManager;

impl HandoffManager {
    /// Open a second session to the same host for the rest of the queue.
    pub async fn open_continuation(
        transport: &dyn SshTransport,
        config: &ConnectionConfig,
    ) -> Result<Box<dyn Session>> {
        info!("opening continuation session to {}", config.endpoint());
        match transport.connect(config).await {
            Ok(session) => {
                log_security_event(
                    SecurityEvent::HandoffOpened,
                    Some(&format!("host={}", config.host)),
                );
                Ok(session)
            }
            Err(e) => {
                warn!("continuation session to {} failed: {}", config.host, e);
                log_security_event(
                    SecurityEvent::HandoffFailed,
                    Some(&format!("host={} reason={}", config.host, e)),
                );
                Err(Error::HandoffFailed {
                    host: config.host.clone(),
                    reason: e.to_string(),
                })
            }
        }
    }
}
