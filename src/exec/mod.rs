//! Command Execution
//!
//! Everything between a parsed queue and a finished run: driving single
//! commands over a session channel ([`runner`]), waiting for servers to come
//! up ([`ready_wait`]), opening continuation sessions for parallel handoff
//! ([`handoff`]), and the queue-walking state machine that ties them together
//! ([`orchestrator`]).

pub mod handoff;
pub mod orchestrator;
pub mod ready_wait;
pub mod runner;

pub use handoff::{HandoffFrame, HandoffManager};
pub use orchestrator::Orchestrator;
pub use ready_wait::{wait_until_ready, ReadyWaitOutcome, READY_TIMEOUT};
pub use runner::{drive_command, CommandOutcome};

use std::time::Duration;

use async_trait::async_trait;

/// How long interactive choice prompts wait before assuming the default
pub const AUTO_CHOICE_TIMEOUT: Duration = Duration::from_secs(45);

/// Cap on captured output per command, to bound memory on chatty servers
pub const MAX_CAPTURED_OUTPUT: usize = 256 * 1024;

/// User choice when a long-running command is detected before launch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LongRunningChoice {
    /// Launch it, wait for readiness, hand the rest of the queue to a
    /// second session. The default.
    Parallel,
    /// Launch detached with nohup and move on in the same session
    Background,
    /// Launch it and block until it exits
    Wait,
    /// Drop into the debug REPL instead of launching
    Debug,
    /// Skip the command entirely
    Skip,
}

/// User choice when a command fails
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureChoice {
    /// Open the debug REPL on the live session
    Debug,
    /// Skip the failed command and keep going
    Skip,
    /// Abort the whole run
    Terminate,
}

/// User choice when leaving the debug REPL after a failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DebugReturnChoice {
    /// Re-run the queue from index zero on a fresh session
    RestartFromBeginning,
    /// Retry the command that failed
    ContinueFromError,
    /// Mark the failed command skipped and continue with the next
    SkipAndContinue,
    /// Abort the whole run
    Terminate,
}

/// Interactive decision seam. The orchestrator never reads stdin itself;
/// a terminal frontend implements this, and tests script it.
#[async_trait]
pub trait ChoicePrompt: Send {
    /// Called before launching a detected server command. Implementations
    /// should answer promptly; the orchestrator falls back to
    /// [`LongRunningChoice::Parallel`] after [`AUTO_CHOICE_TIMEOUT`].
    async fn on_long_running(&mut self, command: &str) -> LongRunningChoice;

    /// Called when a command fails
    async fn on_failure(&mut self, command: &str, outcome: &CommandOutcome) -> FailureChoice;

    /// Called when the user leaves the debug REPL via ContinueProcess
    async fn after_debug(&mut self, command: &str) -> DebugReturnChoice;
}
