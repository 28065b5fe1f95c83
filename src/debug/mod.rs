//! Debug Session
//!
//! Raw-keystroke sub-REPL on the active session for ad hoc diagnostics when
//! a command fails or a server refuses to start. Submitted commands go
//! through the same classifier + password-responder pipeline as the main
//! queue, so sudo prompts are still answered automatically, and output
//! streams live to the user's terminal.
//!
//! Exiting always restores the prior terminal mode exactly once (see
//! [`raw::RawModeGuard`]) and hands one of two outcomes back to the
//! orchestrator.

pub mod raw;

pub use raw::{ControlKey, CrosstermDebugTerminal, DebugTerminal, KeyEvent, RawModeGuard};

use std::collections::VecDeque;
use std::sync::Arc;

use tracing::debug;
use zeroize::Zeroizing;

use crate::audit::{log_security_event, SecurityEvent};
use crate::auth::PasswordResponder;
use crate::classifier;
use crate::error::Result;
use crate::models::{CommandStatus, ExecutionLogEntry};
use crate::state::RunContext;
use crate::transport::{ChannelEvent, Session};
use crate::workdir::DirectoryCursor;

/// Bounded command history for arrow-key navigation
pub const MAX_HISTORY: usize = 50;

const HELP_TEXT: &str = "\r\n[debug] Enter: run | Up/Down: history | \
Ctrl+L: log tail | Ctrl+O: help | Esc/Ctrl+D: resume | Ctrl+T: terminate\r\n";

/// What the debug session hands back to the orchestrator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DebugOutcome {
    /// Resume the suspended command queue
    ContinueProcess,
    /// Tear the whole connection down
    TerminateConnection,
}

/// One debug REPL run over a live session
pub struct DebugSession<'a> {
    session: &'a mut dyn Session,
    terminal: &'a mut dyn DebugTerminal,
    cursor: &'a mut DirectoryCursor,
    credential: Zeroizing<String>,
    ctx: Arc<RunContext>,
    buffer: String,
    history: VecDeque<String>,
    history_index: Option<usize>,
}

impl<'a> DebugSession<'a> {
    pub fn new(
        session: &'a mut dyn Session,
        terminal: &'a mut dyn DebugTerminal,
        cursor: &'a mut DirectoryCursor,
        credential: &str,
        ctx: Arc<RunContext>,
    ) -> Self {
        Self {
            session,
            terminal,
            cursor,
            credential: Zeroizing::new(credential.to_string()),
            ctx,
            buffer: String::new(),
            history: VecDeque::with_capacity(MAX_HISTORY),
            history_index: None,
        }
    }

    /// Run the REPL until the user leaves or terminates.
    pub async fn run(mut self) -> Result<DebugOutcome> {
        let mut guard = self.terminal.acquire_raw()?;
        log_security_event(SecurityEvent::DebugSessionStart, None);
        self.terminal.write(HELP_TEXT);

        let outcome = self.event_loop().await;

        guard.restore();
        log_security_event(SecurityEvent::DebugSessionEnd, None);
        outcome
    }

    async fn event_loop(&mut self) -> Result<DebugOutcome> {
        loop {
            match self.terminal.next_key().await? {
                KeyEvent::Char(c) => {
                    self.buffer.push(c);
                    let mut echo = [0u8; 4];
                    self.terminal.write(c.encode_utf8(&mut echo));
                }
                KeyEvent::Backspace => {
                    if self.buffer.pop().is_some() {
                        self.terminal.write("\u{8} \u{8}");
                    }
                }
                KeyEvent::Enter => {
                    self.terminal.write("\r\n");
                    let command = std::mem::take(&mut self.buffer);
                    self.history_index = None;
                    if !command.trim().is_empty() {
                        self.remember(command.trim().to_string());
                        self.submit(command.trim()).await;
                    }
                }
                KeyEvent::Up => self.navigate_history(true),
                KeyEvent::Down => self.navigate_history(false),
                KeyEvent::Control(ControlKey::ExitDebug) => {
                    return Ok(DebugOutcome::ContinueProcess);
                }
                KeyEvent::Control(ControlKey::TerminateConnection) => {
                    return Ok(DebugOutcome::TerminateConnection);
                }
                KeyEvent::Control(ControlKey::RefreshLog) => {
                    self.terminal.write("\r\n--- log tail ---\r\n");
                    for line in self.ctx.recent_log(20) {
                        self.terminal.write(&line);
                        self.terminal.write("\r\n");
                    }
                    self.redraw_buffer();
                }
                KeyEvent::Control(ControlKey::Help) => {
                    self.terminal.write(HELP_TEXT);
                    self.redraw_buffer();
                }
                KeyEvent::Other => {}
            }
        }
    }

    /// Execute one ad hoc command on the shared session, streaming output
    /// and auto-answering auth prompts.
    async fn submit(&mut self, command: &str) {
        let qualified = self.cursor.qualify(command);
        let mut channel = match self.session.exec(&qualified.remote).await {
            Ok(channel) => channel,
            Err(e) => {
                self.terminal.write(&format!("[debug] exec failed: {}\r\n", e));
                return;
            }
        };

        let mut responder = PasswordResponder::new(
            channel.writer(),
            &self.credential,
            command,
            Arc::clone(&self.ctx),
        );
        responder.arm();

        let mut output = String::new();
        let mut exit_code = None;
        while let Some(event) = channel.next_event().await {
            match event {
                ChannelEvent::Data(bytes) | ChannelEvent::Stderr(bytes) => {
                    let chunk = String::from_utf8_lossy(&bytes).to_string();
                    let classification = classifier::classify(&chunk, command);
                    if classification.should_auto_respond() {
                        responder.trigger("prompt");
                    }
                    self.terminal.write(&chunk.replace('\n', "\r\n"));
                    output.push_str(&chunk);
                }
                ChannelEvent::Close { exit_code: code } => {
                    exit_code = code;
                    break;
                }
            }
        }
        responder.cancel();

        debug!("debug command '{}' exited with {:?}", command, exit_code);
        self.ctx.log_entry(
            &ExecutionLogEntry::new(command, CommandStatus::Debugged)
                .with_output(output)
                .with_exit_code(exit_code)
                .with_flag("debug"),
        );
    }

    fn remember(&mut self, command: String) {
        if self.history.back() == Some(&command) {
            return;
        }
        if self.history.len() == MAX_HISTORY {
            self.history.pop_front();
        }
        self.history.push_back(command);
    }

    /// Up/Down history navigation over the bounded buffer
    fn navigate_history(&mut self, older: bool) {
        if self.history.is_empty() {
            return;
        }
        let next = match (self.history_index, older) {
            (None, true) => Some(self.history.len() - 1),
            (None, false) => None,
            (Some(0), true) => Some(0),
            (Some(i), true) => Some(i - 1),
            (Some(i), false) if i + 1 < self.history.len() => Some(i + 1),
            (Some(_), false) => None,
        };

        self.history_index = next;
        self.buffer = match next {
            Some(i) => self.history[i].clone(),
            None => String::new(),
        };
        self.redraw_buffer();
    }

    fn redraw_buffer(&mut self) {
        self.terminal.write("\r\u{1b}[K> ");
        let buffer = self.buffer.clone();
        self.terminal.write(&buffer);
    }

    #[cfg(test)]
    fn history_snapshot(&self) -> Vec<String> {
        self.history.iter().cloned().collect()
    }
}
