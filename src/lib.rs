//! RemoteRun - saved command sequences over managed SSH sessions
//!
//! This library runs named, reusable sequences of shell commands against a
//! remote host, answering authentication prompts automatically and continuing
//! execution in a parallel session when a command turns out to start a
//! long-lived server.
//!
//! ## Features
//!
//! - **Prompt Classification:** Live output chunks scored against
//!   command-family pattern tables for password/sudo/generic prompts
//! - **Auto-Response:** Credentials delivered at most once per command,
//!   via recognized prompt or a 3-second fallback timer
//! - **Directory Cursor:** A logical cwd tracked locally; every command is
//!   rewritten as `cd <cursor> && <command>` before sending
//! - **Server Detection:** Long-running commands recognized up front, waited
//!   on for readiness, then left running while the queue continues
//! - **Parallel Handoff:** The remaining queue moves to a fresh session,
//!   nesting for further server commands, with a sequential fallback
//! - **Debug REPL:** A raw-keystroke sub-shell on the live session with
//!   bounded history and restart/continue/skip recovery choices
//!
//! ## Module Organization
//!
//! - [`exec`] - Orchestrator, single-command runner, ready-wait, handoff
//! - [`classifier`] - Prompt/readiness/long-running pattern tables
//! - [`auth`] - Password timeout handler (at-most-once responder)
//! - [`workdir`] - Directory context tracker
//! - [`debug`] - Raw-mode debug session
//! - [`transport`] - Session and channel seams over the SSH client
//! - [`state`] - Shared run context, status board, log tail
//! - [`logsink`] - Append-only run log with marker framing
//! - [`persist`] - Saved-process JSON store (credentials always redacted)
//! - [`audit`] - Security event logging
//! - [`models`] - Core data types
//! - [`mod@error`] - Error types and Result alias
//!
//! ## Quick Start
//!
//! ```no_run
//! use remoterun::exec::{Orchestrator};
//! use remoterun::logsink::FileLogSink;
//! use remoterun::models::{CommandQueue, ConnectionConfig};
//! use remoterun::state::RunContext;
//!
//! # async fn run(transport: Box<dyn remoterun::transport::SshTransport>,
//! #              prompt: Box<dyn remoterun::exec::ChoicePrompt>)
//! #              -> remoterun::Result<()> {
//! let config = ConnectionConfig::new("web-01.example.com", 22, "deploy", "secret", "web-01");
//! let queue = CommandQueue::new(vec![
//!     "cd app".to_string(),
//!     "git pull".to_string(),
//!     "npm run dev".to_string(),
//! ]);
//! let sink = FileLogSink::open("run.log")?;
//! let ctx = RunContext::new(queue.len(), Box::new(sink));
//!
//! let summary = Orchestrator::new(transport, config, queue, prompt, None, ctx)?
//!     .run()
//!     .await?;
//! println!("{} succeeded, {} failed", summary.succeeded, summary.failed);
//! # Ok(())
//! # }
//! ```
//!
//! ## Safety and Reliability
//!
//! - **No Panics:** All fallible operations return `Result`
//! - **Credential Hygiene:** Passwords live in zeroized memory, never hit
//!   the log or the saved-process store (a redacted placeholder does)
//! - **Bounded Capture:** Per-command output capture is size-limited
//! - **Exactly-Once Teardown:** Sessions and the log sink close once, on
//!   every exit path, including termination from the debug REPL

#[macro_use]
extern crate tracing;

pub mod audit;
pub mod auth;
pub mod classifier;
pub mod debug;
pub mod error;
pub mod exec;
pub mod logsink;
pub mod models;
pub mod persist;
pub mod state;
pub mod transport;
pub mod workdir;

pub use error::{Error, Result};
pub use exec::{ChoicePrompt, Orchestrator};
pub use models::{CommandQueue, ConnectionConfig, SavedProcess};
pub use state::{RunContext, RunSummary};
pub use transport::{Session, SshTransport};

// Version information
/// The current version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// The crate name from Cargo.toml
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// The crate description from Cargo.toml
pub const DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");

/// Initialize tracing for binaries and examples.
///
/// `RUST_LOG` wins when set; otherwise `debug` selects between `debug` and
/// `info`. Safe to call once per process.
pub fn init_logging(debug: bool) {
    let default_level = if debug { "debug" } else { "info" };
    let env_filter =
        std::env::var("RUST_LOG").unwrap_or_else(|_| default_level.to_string());
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from(env_filter))
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .init();
    info!("{} v{} logging initialized", NAME, VERSION);
}
