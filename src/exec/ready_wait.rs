//! Server readiness wait
//!
//! A launched server command never exits on its own, so "done" means one of
//! three things: a ready signature showed up in its output, a full minute
//! passed without one (optimistic success; quiet servers exist), or the
//! channel closed early (the server crashed on startup).

use std::time::Duration;

use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::auth::PasswordResponder;
use crate::classifier;
use crate::state::RunContext;
use crate::transport::{ChannelEvent, ExecChannel};

use super::MAX_CAPTURED_OUTPUT;

/// How long to wait for a ready signature before assuming the server is up
pub const READY_TIMEOUT: Duration = Duration::from_secs(60);

/// Result of waiting for a launched server to come up
#[derive(Debug, Clone)]
pub struct ReadyWaitOutcome {
    /// The server is considered up (ready pattern or optimistic timeout)
    pub success: bool,
    /// A ready pattern actually matched
    pub ready: bool,
    /// No pattern matched within [`READY_TIMEOUT`]
    pub timed_out: bool,
    /// The channel closed before readiness
    pub premature_exit: bool,
    pub exit_code: Option<i32>,
    pub output: String,
    /// The pattern text that matched, for the log
    pub matched_pattern: Option<String>,
}

impl ReadyWaitOutcome {
    fn up(ready: bool, output: String, matched_pattern: Option<String>) -> Self {
        Self {
            success: true,
            ready,
            timed_out: !ready,
            premature_exit: false,
            exit_code: None,
            output,
            matched_pattern,
        }
    }

    fn crashed(exit_code: Option<i32>, output: String) -> Self {
        Self {
            success: false,
            ready: false,
            timed_out: false,
            premature_exit: true,
            exit_code,
            output,
            matched_pattern: None,
        }
    }
}

/// Wait until `command`'s server looks ready, still answering auth prompts.
///
/// The channel is left open on success so the server keeps running; the
/// caller owns keeping it (and its session) alive.
pub async fn wait_until_ready(
    channel: &mut ExecChannel,
    command: &str,
    responder: &PasswordResponder,
    ctx: &RunContext,
) -> ReadyWaitOutcome {
    let mut output = String::new();
    let deadline = sleep(READY_TIMEOUT);
    tokio::pin!(deadline);

    loop {
        tokio::select! {
            () = &mut deadline => {
                info!(
                    "no ready signature from '{}' in {:?}; assuming up",
                    command, READY_TIMEOUT
                );
                return ReadyWaitOutcome::up(false, output, None);
            }
            event = channel.next_event() => {
                let (bytes, close) = match event {
                    Some(ChannelEvent::Data(bytes)) | Some(ChannelEvent::Stderr(bytes)) => {
                        (bytes, None)
                    }
                    Some(ChannelEvent::Close { exit_code }) => (Vec::new(), Some(exit_code)),
                    None => (Vec::new(), Some(None)),
                };
                if let Some(exit_code) = close {
                    warn!("'{}' exited before readiness (code {:?})", command, exit_code);
                    return ReadyWaitOutcome::crashed(exit_code, output);
                }

                let chunk = String::from_utf8_lossy(&bytes).to_string();
                let classification = classifier::classify(&chunk, command);
                if classification.should_auto_respond() {
                    responder.trigger("prompt");
                }
                ctx.append_log(&chunk);
                if output.len() < MAX_CAPTURED_OUTPUT {
                    output.push_str(&chunk);
                }
                if let Some(pattern) = classifier::ready_match(&chunk, command) {
                    debug!("ready signature '{}' for '{}'", pattern, command);
                    return ReadyWaitOutcome::up(true, output, Some(pattern));
                }
            }
        }
    }
}
