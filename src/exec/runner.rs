//! Single-command driver
//!
//! Reads a command channel to completion, classifying every chunk for auth
//! prompts and firing the password responder when confidence clears the
//! auto-response threshold. Failure is judged on exit code first; only
//! when the remote gives no code do we fall back to scanning the output
//! for critical error signatures.

use tracing::{debug, warn};

use crate::auth::PasswordResponder;
use crate::classifier;
use crate::state::RunContext;
use crate::transport::{ChannelEvent, ExecChannel};

use super::MAX_CAPTURED_OUTPUT;

/// Terminal result of one driven command
#[derive(Debug, Clone)]
pub struct CommandOutcome {
    pub exit_code: Option<i32>,
    pub output: String,
    pub failed: bool,
    /// A critical error signature matched in the output
    pub critical: bool,
}

impl CommandOutcome {
    fn classify(exit_code: Option<i32>, output: String) -> Self {
        let critical = classifier::critical_error_match(&output).is_some();
        let failed = match exit_code {
            Some(0) => false,
            Some(_) => true,
            // Channel closed without a code; trust the output scan
            None => critical,
        };
        Self {
            exit_code,
            output,
            failed,
            critical,
        }
    }
}

/// Drive `channel` until it closes, answering auth prompts for `command`.
///
/// The responder is settled before returning, so a late timer can never
/// write into a dead channel.
pub async fn drive_command(
    channel: &mut ExecChannel,
    command: &str,
    mut responder: PasswordResponder,
    ctx: &RunContext,
) -> CommandOutcome {
    responder.arm();

    let mut output = String::new();
    let mut exit_code = None;
    let mut truncated = false;

    while let Some(event) = channel.next_event().await {
        match event {
            ChannelEvent::Data(bytes) | ChannelEvent::Stderr(bytes) => {
                let chunk = String::from_utf8_lossy(&bytes).to_string();
                let classification = classifier::classify(&chunk, command);
                if classification.should_auto_respond() {
                    debug!(
                        confidence = classification.confidence,
                        "auth prompt detected for '{}'", command
                    );
                    responder.trigger("prompt");
                }
                ctx.append_log(&chunk);
                if output.len() < MAX_CAPTURED_OUTPUT {
                    output.push_str(&chunk);
                } else if !truncated {
                    truncated = true;
                    warn!("output capture cap reached for '{}'", command);
                }
            }
            ChannelEvent::Close { exit_code: code } => {
                exit_code = code;
                break;
            }
        }
    }
    responder.cancel();

    CommandOutcome::classify(exit_code, output)
}
