//! Raw Terminal Abstraction
//!
//! The debug session reads single keystrokes, which needs the controlling
//! terminal in raw mode. Raw-mode acquisition is scoped behind
//! [`RawModeGuard`] so the previous mode is restored exactly once on every
//! exit path, and the whole terminal is behind a trait so the debug session
//! is testable without one.

use async_trait::async_trait;
use crossterm::event::{Event, KeyCode, KeyEventKind, KeyModifiers};
use crossterm::event::EventStream;
use futures::StreamExt;

use crate::error::{Error, Result};

/// A single decoded keystroke
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyEvent {
    /// Printable character, appended to the line buffer
    Char(char),
    Enter,
    Backspace,
    Up,
    Down,
    /// Reserved control key, never enters the line buffer
    Control(ControlKey),
    /// Anything else; ignored
    Other,
}

/// Reserved debug-session control keys
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlKey {
    /// Leave the debug session, resume the run (Esc / Ctrl+D)
    ExitDebug,
    /// Terminate the whole connection (Ctrl+T)
    TerminateConnection,
    /// Show the tail of the run log (Ctrl+L)
    RefreshLog,
    /// Show key bindings (Ctrl+O)
    Help,
}

/// Scoped raw-mode acquisition. Restores the previous terminal mode exactly
/// once: either through `restore()` or, failing that, on drop.
pub struct RawModeGuard {
    restore: Option<Box<dyn FnOnce() + Send>>,
}

impl RawModeGuard {
    pub fn new(restore: impl FnOnce() + Send + 'static) -> Self {
        Self {
            restore: Some(Box::new(restore)),
        }
    }

    /// Restore the previous mode now. Idempotent.
    pub fn restore(&mut self) {
        if let Some(restore) = self.restore.take() {
            restore();
        }
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        self.restore();
    }
}

/// Keystroke source and output sink for the debug session
#[async_trait]
pub trait DebugTerminal: Send {
    /// Put the terminal into raw mode, returning the restore guard
    fn acquire_raw(&mut self) -> Result<RawModeGuard>;

    /// Next decoded keystroke
    async fn next_key(&mut self) -> Result<KeyEvent>;

    /// Write text to the user's screen (best-effort)
    fn write(&mut self, text: &str);
}

/// Crossterm-backed terminal for real interactive use
pub struct CrosstermDebugTerminal {
    events: EventStream,
}

impl CrosstermDebugTerminal {
    pub fn new() -> Self {
        Self {
            events: EventStream::new(),
        }
    }
}

impl Default for CrosstermDebugTerminal {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DebugTerminal for CrosstermDebugTerminal {
    fn acquire_raw(&mut self) -> Result<RawModeGuard> {
        crossterm::terminal::enable_raw_mode().map_err(|e| Error::RawModeFailed {
            reason: e.to_string(),
        })?;
        Ok(RawModeGuard::new(|| {
            let _ = crossterm::terminal::disable_raw_mode();
        }))
    }

    async fn next_key(&mut self) -> Result<KeyEvent> {
        loop {
            match self.events.next().await {
                Some(Ok(Event::Key(key))) if key.kind != KeyEventKind::Release => {
                    return Ok(map_key(key.code, key.modifiers));
                }
                Some(Ok(_)) => continue,
                Some(Err(e)) => {
                    return Err(Error::RawModeFailed {
                        reason: e.to_string(),
                    })
                }
                // Input stream ended; treat as leaving the debug session.
                None => return Ok(KeyEvent::Control(ControlKey::ExitDebug)),
            }
        }
    }

    fn write(&mut self, text: &str) {
        use std::io::Write;
        let mut stdout = std::io::stdout();
        let _ = stdout.write_all(text.as_bytes());
        let _ = stdout.flush();
    }
}

fn map_key(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
    if modifiers.contains(KeyModifiers::CONTROL) {
        return match code {
            KeyCode::Char('d') | KeyCode::Char('c') => KeyEvent::Control(ControlKey::ExitDebug),
            KeyCode::Char('t') => KeyEvent::Control(ControlKey::TerminateConnection),
            KeyCode::Char('l') => KeyEvent::Control(ControlKey::RefreshLog),
            KeyCode::Char('o') => KeyEvent::Control(ControlKey::Help),
            _ => KeyEvent::Other,
        };
    }
    match code {
        KeyCode::Esc => KeyEvent::Control(ControlKey::ExitDebug),
        KeyCode::Enter => KeyEvent::Enter,
        KeyCode::Backspace => KeyEvent::Backspace,
        KeyCode::Up => KeyEvent::Up,
        KeyCode::Down => KeyEvent::Down,
        KeyCode::Char(c) => KeyEvent::Char(c),
        _ => KeyEvent::Other,
    }
}
