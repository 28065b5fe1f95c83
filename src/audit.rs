//! Security Audit Logging
//!
//! Security-relevant events logged through tracing, separate from the run
//! log sink.
//!
//! ## Security Policy
//!
//! - **NEVER** log passwords, passphrases, or credentials
//! - Only log event types and non-sensitive metadata (hosts, counts, labels)
//! - INFO for normal events, WARN for suspicious activity

use tracing::{info, warn};

/// Security audit event types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecurityEvent {
    /// Connection to a remote host initiated
    ConnectionAttempt,
    /// Session established
    SessionStart,
    /// Session closed
    SessionEnd,
    /// A credential was auto-sent in response to a prompt (redacted)
    CredentialAutoResponse,
    /// A secondary session was opened for a parallel handoff
    HandoffOpened,
    /// A secondary session could not be opened
    HandoffFailed,
    /// Debug session entered on a live session
    DebugSessionStart,
    /// Debug session left
    DebugSessionEnd,
    /// Suspicious activity detected
    SuspiciousActivity,
}

impl SecurityEvent {
    /// Human-readable description of the event
    pub fn description(&self) -> &'static str {
        match self {
            SecurityEvent::ConnectionAttempt => "Remote connection initiated",
            SecurityEvent::SessionStart => "Session established",
            SecurityEvent::SessionEnd => "Session closed",
            SecurityEvent::CredentialAutoResponse => "Credential auto-response sent (redacted)",
            SecurityEvent::HandoffOpened => "Parallel session opened",
            SecurityEvent::HandoffFailed => "Parallel session open failed",
            SecurityEvent::DebugSessionStart => "Debug session entered",
            SecurityEvent::DebugSessionEnd => "Debug session left",
            SecurityEvent::SuspiciousActivity => "Suspicious activity detected",
        }
    }

    /// Whether this event should be logged at WARN
    pub fn is_suspicious(&self) -> bool {
        matches!(
            self,
            SecurityEvent::SuspiciousActivity | SecurityEvent::HandoffFailed
        )
    }
}

/// Log a security audit event.
///
/// Never pass sensitive data as metadata; hostnames, reasons and counts
/// only.
pub fn log_security_event(event: SecurityEvent, metadata: Option<&str>) {
    match (event.is_suspicious(), metadata) {
        (true, Some(meta)) => warn!("AUDIT: {} [{}]", event.description(), meta),
        (true, None) => warn!("AUDIT: {}", event.description()),
        (false, Some(meta)) => info!("AUDIT: {} [{}]", event.description(), meta),
        (false, None) => info!("AUDIT: {}", event.description()),
    }
}
