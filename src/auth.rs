//! Password Timeout Handler
//!
//! Per-command actor that decides when to transmit the stored credential to
//! a running command. Either the classifier spots an auth prompt and
//! triggers it directly, or an armed 3-second timer fires because the
//! command went quiet right after starting (a prompt we failed to
//! recognize). Delivery is at-most-once across both paths.
//!
//! Everything here is hot-path and best-effort: no operation returns an
//! error, and channel write failures are swallowed.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::debug;
use zeroize::Zeroizing;

use crate::audit::{log_security_event, SecurityEvent};
use crate::classifier;
use crate::logsink::markers;
use crate::state::RunContext;
use crate::transport::ChannelWriter;

/// Delay before an unanswered command gets the credential anyway
pub const PASSWORD_TIMEOUT: Duration = Duration::from_secs(3);

struct ResponderInner {
    writer: ChannelWriter,
    credential: Zeroizing<String>,
    command: String,
    responded: AtomicBool,
    ctx: Arc<RunContext>,
}

impl ResponderInner {
    fn trigger(&self, reason: &str) {
        // swap gives at-most-once across timer and direct triggers
        if self.responded.swap(true, Ordering::SeqCst) {
            return;
        }

        let payload = format!("{}\n", self.credential.as_str());
        if let Err(e) = self.writer.send(payload.as_bytes()) {
            debug!("credential send failed (channel gone): {}", e);
        }

        // The audit line carries the reason and command, never the credential
        self.ctx.append_log(&format!(
            "{} [{}] credential sent for '{}'\n",
            markers::AUTO_RESPONSE,
            reason,
            self.command
        ));
        log_security_event(SecurityEvent::CredentialAutoResponse, Some(reason));
    }
}

/// At-most-once credential responder for one command
pub struct PasswordResponder {
    inner: Arc<ResponderInner>,
    timer: Option<JoinHandle<()>>,
}

impl PasswordResponder {
    pub fn new(
        writer: ChannelWriter,
        credential: &str,
        command: &str,
        ctx: Arc<RunContext>,
    ) -> Self {
        Self {
            inner: Arc::new(ResponderInner {
                writer,
                credential: Zeroizing::new(credential.to_string()),
                command: command.to_string(),
                responded: AtomicBool::new(false),
                ctx,
            }),
            timer: None,
        }
    }

    /// Arm the 3-second fallback timer. Long-running commands never get a
    /// timer: sending a credential into a foreground server process is
    /// unsafe, so those only respond to recognized prompts.
    pub fn arm(&mut self) {
        if classifier::is_long_running(&self.inner.command) {
            debug!(
                "password timer not armed for long-running command '{}'",
                self.inner.command
            );
            return;
        }
        if self.timer.is_some() || self.inner.responded.load(Ordering::SeqCst) {
            return;
        }

        let inner = Arc::clone(&self.inner);
        self.timer = Some(tokio::spawn(async move {
            sleep(PASSWORD_TIMEOUT).await;
            inner.trigger("timeout");
        }));
    }

    /// Send the credential now (classifier saw a prompt). Idempotent.
    pub fn trigger(&self, reason: &str) {
        self.inner.trigger(reason);
    }

    /// Settle without sending; used when the channel closes first.
    pub fn cancel(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
        self.inner.responded.store(true, Ordering::SeqCst);
    }

    /// Whether the credential was sent (or the responder was cancelled)
    pub fn has_responded(&self) -> bool {
        self.inner.responded.load(Ordering::SeqCst)
    }
}

impl Drop for PasswordResponder {
    fn drop(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
    }
}
