//! Run State Management
//!
//! Single source of truth for one run: the per-command status board
//! (index-aligned with the command queue), the overall run state, and the
//! log sink. Primary and parallel execution paths both write here, so every
//! field sits behind a mutex; critical sections are short and never await.
//!
//! The status board length is fixed at construction to the queue length and
//! never changes, which keeps the `len(statuses) == len(queue)` invariant
//! trivially true across every mutation.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use tracing::warn;

use crate::logsink::LogSink;
use crate::models::{CommandStatus, ExecutionLogEntry, RunState};

/// Lines retained in memory for the debug session's log view
const RECENT_LOG_LINES: usize = 100;

/// Shared state for one run
pub struct RunContext {
    statuses: Mutex<Vec<CommandStatus>>,
    run_state: Mutex<RunState>,
    sink: Mutex<Option<Box<dyn LogSink>>>,
    sink_closed: AtomicBool,
    recent: Mutex<VecDeque<String>>,
}

/// Per-status counts reported when a run ends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RunSummary {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub skipped: usize,
    pub parallel: usize,
    pub backgrounded: usize,
    pub debugged: usize,
    pub pending: usize,
    pub run_state: RunState,
}

impl RunContext {
    /// Create the context for a queue of `queue_len` commands
    pub fn new(queue_len: usize, sink: Box<dyn LogSink>) -> Arc<Self> {
        Arc::new(Self {
            statuses: Mutex::new(vec![CommandStatus::Pending; queue_len]),
            run_state: Mutex::new(RunState::Running),
            sink: Mutex::new(Some(sink)),
            sink_closed: AtomicBool::new(false),
            recent: Mutex::new(VecDeque::with_capacity(RECENT_LOG_LINES)),
        })
    }

    /// Set the status of the command at `index`
    pub fn set_status(&self, index: usize, status: CommandStatus) {
        let mut statuses = self.statuses.lock().unwrap();
        match statuses.get_mut(index) {
            Some(slot) => *slot = status,
            None => warn!(
                "status index {} out of range for {} commands",
                index,
                statuses.len()
            ),
        }
    }

    /// Status of the command at `index`
    pub fn status(&self, index: usize) -> Option<CommandStatus> {
        self.statuses.lock().unwrap().get(index).copied()
    }

    /// Snapshot of the whole status board
    pub fn statuses(&self) -> Vec<CommandStatus> {
        self.statuses.lock().unwrap().clone()
    }

    /// Reset every status to pending (restart-from-beginning)
    pub fn reset_statuses(&self) {
        let mut statuses = self.statuses.lock().unwrap();
        statuses.fill(CommandStatus::Pending);
    }

    /// Number of commands currently marked running
    pub fn running_count(&self) -> usize {
        self.statuses
            .lock()
            .unwrap()
            .iter()
            .filter(|s| **s == CommandStatus::Running)
            .count()
    }

    /// Append raw text to the log sink and the in-memory tail
    pub fn append_log(&self, text: &str) {
        {
            let mut recent = self.recent.lock().unwrap();
            for line in text.lines() {
                if recent.len() == RECENT_LOG_LINES {
                    recent.pop_front();
                }
                recent.push_back(line.to_string());
            }
        }
        if let Some(sink) = self.sink.lock().unwrap().as_mut() {
            sink.write(text);
        }
    }

    /// Render and append a settled command's log entry
    pub fn log_entry(&self, entry: &ExecutionLogEntry) {
        self.append_log(&entry.render());
    }

    /// Last `n` log lines for the debug session's log view
    pub fn recent_log(&self, n: usize) -> Vec<String> {
        let recent = self.recent.lock().unwrap();
        recent
            .iter()
            .skip(recent.len().saturating_sub(n))
            .cloned()
            .collect()
    }

    /// Current overall run state
    pub fn run_state(&self) -> RunState {
        *self.run_state.lock().unwrap()
    }

    /// Mark the run finished and close the log sink. The sink is closed
    /// exactly once; later calls only update the run state.
    pub fn finish(&self, state: RunState) {
        *self.run_state.lock().unwrap() = state;
        if !self.sink_closed.swap(true, Ordering::SeqCst) {
            if let Some(mut sink) = self.sink.lock().unwrap().take() {
                sink.end();
            }
        }
    }

    /// Per-status counts plus the run state
    pub fn summary(&self) -> RunSummary {
        let statuses = self.statuses.lock().unwrap();
        let mut summary = RunSummary {
            total: statuses.len(),
            run_state: self.run_state(),
            ..RunSummary::default()
        };
        for status in statuses.iter() {
            match status {
                CommandStatus::Success => summary.succeeded += 1,
                CommandStatus::Failed => summary.failed += 1,
                CommandStatus::Skipped => summary.skipped += 1,
                CommandStatus::Parallel => summary.parallel += 1,
                CommandStatus::Backgrounded => summary.backgrounded += 1,
                CommandStatus::Debugged => summary.debugged += 1,
                CommandStatus::Pending | CommandStatus::Running => summary.pending += 1,
            }
        }
        summary
    }
}
