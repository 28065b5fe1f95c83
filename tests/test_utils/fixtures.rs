//! Shared test fixtures: canned configs, queues, and a scripted choice
//! prompt for driving the orchestrator's menus without a terminal.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use remoterun::exec::runner::CommandOutcome;
use remoterun::exec::{ChoicePrompt, DebugReturnChoice, FailureChoice, LongRunningChoice};
use remoterun::logsink::{LogSink, MemoryLogSink};
use remoterun::models::{CommandQueue, ConnectionConfig};

/// Memory sink observable after the run context consumed it
#[derive(Clone, Default)]
pub struct SharedSink {
    inner: Arc<Mutex<MemoryLogSink>>,
}

impl SharedSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contents(&self) -> String {
        self.inner.lock().unwrap().contents().to_string()
    }

    pub fn is_closed(&self) -> bool {
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

pub fn test_config() -> ConnectionConfig {
    ConnectionConfig::new("web-01.example.com", 22, "deploy", "hunter2", "web-01")
}

pub fn simple_queue() -> CommandQueue {
    CommandQueue::new(vec![
        "cd app".to_string(),
        "git pull".to_string(),
        "ls -la".to_string(),
    ])
}

/// Choice prompt that plays back queued answers, falling back to the
/// orchestrator defaults when a queue runs dry.
pub struct ScriptedPrompt {
    long_running: Mutex<VecDeque<LongRunningChoice>>,
    failures: Mutex<VecDeque<FailureChoice>>,
    after_debug: Mutex<VecDeque<DebugReturnChoice>>,
    asked: Arc<Mutex<Vec<String>>>,
}

impl ScriptedPrompt {
    pub fn new() -> Self {
        Self {
            long_running: Mutex::new(VecDeque::new()),
            failures: Mutex::new(VecDeque::new()),
            after_debug: Mutex::new(VecDeque::new()),
            asked: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn answer_long_running(self, choice: LongRunningChoice) -> Self {
        self.long_running.lock().unwrap().push_back(choice);
        self
    }

    pub fn answer_failure(self, choice: FailureChoice) -> Self {
        self.failures.lock().unwrap().push_back(choice);
        self
    }

    pub fn answer_after_debug(self, choice: DebugReturnChoice) -> Self {
        self.after_debug.lock().unwrap().push_back(choice);
        self
    }

    /// Shared handle to the questions asked, for assertions after the
    /// orchestrator consumed the prompt
    pub fn asked_handle(&self) -> Arc<Mutex<Vec<String>>> {
        Arc::clone(&self.asked)
    }
}

impl Default for ScriptedPrompt {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ChoicePrompt for ScriptedPrompt {
    async fn on_long_running(&mut self, command: &str) -> LongRunningChoice {
        self.asked
            .lock()
            .unwrap()
            .push(format!("long_running:{}", command));
        self.long_running
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(LongRunningChoice::Parallel)
    }

    async fn on_failure(&mut self, command: &str, _outcome: &CommandOutcome) -> FailureChoice {
        self.asked
            .lock()
            .unwrap()
            .push(format!("failure:{}", command));
        self.failures
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(FailureChoice::Skip)
    }

    async fn after_debug(&mut self, command: &str) -> DebugReturnChoice {
        self.asked
            .lock()
            .unwrap()
            .push(format!("after_debug:{}", command));
        self.after_debug
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(DebugReturnChoice::SkipAndContinue)
    }
}
