//! Unit tests for the run context: the status board, the log tail, the
//! rendered log entries, and exactly-once sink closing.

use std::sync::{Arc, Mutex};

use remoterun::logsink::{LogSink, MemoryLogSink};
use remoterun::models::{CommandStatus, ExecutionLogEntry, RunState};
use remoterun::state::RunContext;

/// Memory sink observable from outside the run context
#[derive(Clone, Default)]
struct SharedSink {
    inner: Arc<Mutex<MemoryLogSink>>,
}

impl SharedSink {
    fn new() -> Self {
        Self::default()
    }

    fn contents(&self) -> String {
        self.inner.lock().unwrap().contents().to_string()
    }

    fn is_closed(&self) -> bool {
        self.inner.lock().unwrap().is_closed()
    }
}

impl LogSink for SharedSink {
    fn write(&mut self, text: &str) {
        self.inner.lock().unwrap().write(text);
    }

    fn end(&mut self) {
        self.inner.lock().unwrap().end();
    }
}

#[test]
fn test_status_board_starts_pending() {
    let ctx = RunContext::new(3, Box::new(MemoryLogSink::new()));
    assert_eq!(ctx.statuses(), vec![CommandStatus::Pending; 3]);
}

#[test]
fn test_status_board_length_is_fixed() {
    let ctx = RunContext::new(2, Box::new(MemoryLogSink::new()));
    ctx.set_status(0, CommandStatus::Success);
    // Out-of-range writes are dropped, never grow the board
    ctx.set_status(7, CommandStatus::Failed);

    let statuses = ctx.statuses();
    assert_eq!(statuses.len(), 2);
    assert_eq!(statuses[0], CommandStatus::Success);
    assert_eq!(statuses[1], CommandStatus::Pending);
}

#[test]
fn test_reset_statuses_for_restart() {
    let ctx = RunContext::new(2, Box::new(MemoryLogSink::new()));
    ctx.set_status(0, CommandStatus::Success);
    ctx.set_status(1, CommandStatus::Failed);

    ctx.reset_statuses();
    assert_eq!(ctx.statuses(), vec![CommandStatus::Pending; 2]);
}

#[test]
fn test_log_entries_reach_the_sink() {
    let sink = SharedSink::new();
    let ctx = RunContext::new(1, Box::new(sink.clone()));

    ctx.log_entry(
        &ExecutionLogEntry::new("pwd", CommandStatus::Success)
            .with_output("/home/deploy\n")
            .with_exit_code(Some(0)),
    );

    let contents = sink.contents();
    assert!(contents.contains("COMMAND: pwd"));
    assert!(contents.contains("/home/deploy"));
    assert!(contents.contains("FIN COMANDO [status=success exit=0]"));
}

#[test]
fn test_recent_log_is_bounded() {
    let ctx = RunContext::new(1, Box::new(MemoryLogSink::new()));
    for i in 0..250 {
        ctx.append_log(&format!("line {}\n", i));
    }

    let tail = ctx.recent_log(1000);
    assert_eq!(tail.len(), 100);
    assert_eq!(tail.first().unwrap(), "line 150");
    assert_eq!(tail.last().unwrap(), "line 249");

    let short = ctx.recent_log(5);
    assert_eq!(short.len(), 5);
    assert_eq!(short.last().unwrap(), "line 249");
}

#[test]
fn test_finish_closes_sink_exactly_once() {
    let sink = SharedSink::new();
    let ctx = RunContext::new(1, Box::new(sink.clone()));

    assert!(!sink.is_closed());
    ctx.finish(RunState::Completed);
    assert!(sink.is_closed());
    assert_eq!(ctx.run_state(), RunState::Completed);

    // A second finish only updates the state
    ctx.finish(RunState::Terminated);
    assert_eq!(ctx.run_state(), RunState::Terminated);
    assert!(sink.is_closed());
}

#[test]
fn test_writes_after_finish_are_dropped() {
    let sink = SharedSink::new();
    let ctx = RunContext::new(1, Box::new(sink.clone()));

    ctx.append_log("before\n");
    ctx.finish(RunState::Completed);
    ctx.append_log("after\n");

    assert_eq!(sink.contents(), "before\n");
}

#[test]
fn test_summary_counts() {
    let ctx = RunContext::new(6, Box::new(MemoryLogSink::new()));
    ctx.set_status(0, CommandStatus::Success);
    ctx.set_status(1, CommandStatus::Failed);
    ctx.set_status(2, CommandStatus::Skipped);
    ctx.set_status(3, CommandStatus::Parallel);
    ctx.set_status(4, CommandStatus::Backgrounded);
    // index 5 stays pending
    ctx.finish(RunState::Completed);

    let summary = ctx.summary();
    assert_eq!(summary.total, 6);
    assert_eq!(summary.succeeded, 1);
    assert_eq!(summary.failed, 1);
    assert_eq!(summary.skipped, 1);
    assert_eq!(summary.parallel, 1);
    assert_eq!(summary.backgrounded, 1);
    assert_eq!(summary.pending, 1);
    assert_eq!(summary.run_state, RunState::Completed);
}
