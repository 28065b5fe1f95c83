//! Mock Transport and Session for Testing
//!
//! Scripted sessions: each expected command line matches on a substring and
//! plays back a fixed sequence of output chunks, optionally never closing
//! (server commands). A shared recorder captures every command line sent,
//! every stdin write (credential delivery), session teardown order, and
//! connect attempts, so tests can assert on the whole conversation.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::mpsc;

use remoterun::error::{Error, Result};
use remoterun::models::ConnectionConfig;
use remoterun::transport::{ChannelEvent, ExecChannel, Session, SshTransport};

/// One scripted reaction to an exec'd command line
#[derive(Debug, Clone)]
pub struct CommandScript {
    /// Substring matched against the full remote command line
    pub matcher: String,
    pub events: Vec<ChannelEvent>,
    /// Leave the channel open after the events (server commands)
    pub stay_open: bool,
}

impl CommandScript {
    /// Command that prints `output` and exits with `code`
    pub fn exits(matcher: &str, output: &str, code: i32) -> Self {
        Self {
            matcher: matcher.to_string(),
            events: vec![
                ChannelEvent::Data(output.as_bytes().to_vec()),
                ChannelEvent::Close {
                    exit_code: Some(code),
                },
            ],
            stay_open: false,
        }
    }

    /// Command that succeeds silently
    pub fn ok(matcher: &str) -> Self {
        Self::exits(matcher, "", 0)
    }

    /// Server command: prints `output` and never closes
    pub fn server(matcher: &str, output: &str) -> Self {
        Self {
            matcher: matcher.to_string(),
            events: vec![ChannelEvent::Data(output.as_bytes().to_vec())],
            stay_open: true,
        }
    }

    /// Raw event sequence
    pub fn events(matcher: &str, events: Vec<ChannelEvent>, stay_open: bool) -> Self {
        Self {
            matcher: matcher.to_string(),
            events,
            stay_open,
        }
    }
}

/// What the mocks observed during a run
#[derive(Debug, Default)]
pub struct Recorder {
    inner: Mutex<RecorderInner>,
}

#[derive(Debug, Default)]
struct RecorderInner {
    executed: Vec<(String, String)>,
    stdin_writes: Vec<String>,
    ended: Vec<String>,
    connects: usize,
}

impl Recorder {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// `(session label, remote command line)` in exec order
    pub fn executed(&self) -> Vec<(String, String)> {
        self.inner.lock().unwrap().executed.clone()
    }

    /// Remote command lines only, in exec order
    pub fn command_lines(&self) -> Vec<String> {
        self.inner
            .lock()
            .unwrap()
            .executed
            .iter()
            .map(|(_, line)| line.clone())
            .collect()
    }

    /// Everything written to any command's stdin, lossily decoded
    pub fn stdin_writes(&self) -> Vec<String> {
        self.inner.lock().unwrap().stdin_writes.clone()
    }

    /// Labels of sessions that were ended, in teardown order
    pub fn ended_sessions(&self) -> Vec<String> {
        self.inner.lock().unwrap().ended.clone()
    }

    pub fn connect_count(&self) -> usize {
        self.inner.lock().unwrap().connects
    }

    fn record_exec(&self, label: &str, line: &str) {
        self.inner
            .lock()
            .unwrap()
            .executed
            .push((label.to_string(), line.to_string()));
    }

    fn record_stdin(&self, data: &[u8]) {
        self.inner
            .lock()
            .unwrap()
            .stdin_writes
            .push(String::from_utf8_lossy(data).to_string());
    }

    fn record_end(&self, label: &str) {
        self.inner.lock().unwrap().ended.push(label.to_string());
    }

    fn record_connect(&self) {
        self.inner.lock().unwrap().connects += 1;
    }
}

/// Session that answers execs from a script table
pub struct MockSession {
    label: String,
    scripts: Vec<CommandScript>,
    recorder: Arc<Recorder>,
    // Keeps server channels from seeing end-of-stream
    keepalive: Vec<mpsc::UnboundedSender<ChannelEvent>>,
}

impl MockSession {
    pub fn new(label: &str, scripts: Vec<CommandScript>, recorder: Arc<Recorder>) -> Self {
        Self {
            label: label.to_string(),
            scripts,
            recorder,
            keepalive: Vec::new(),
        }
    }
}

#[async_trait]
impl Session for MockSession {
    async fn exec(&mut self, command_line: &str) -> Result<ExecChannel> {
        self.recorder.record_exec(&self.label, command_line);

        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let (input_tx, mut input_rx) = mpsc::unbounded_channel::<Vec<u8>>();

        let recorder = Arc::clone(&self.recorder);
        tokio::spawn(async move {
            while let Some(data) = input_rx.recv().await {
                recorder.record_stdin(&data);
            }
        });

        let script = self
            .scripts
            .iter()
            .find(|s| command_line.contains(&s.matcher))
            .cloned()
            .unwrap_or_else(|| CommandScript::ok(command_line));

        for event in &script.events {
            let _ = events_tx.send(event.clone());
        }
        if script.stay_open {
            self.keepalive.push(events_tx);
        } else if !script
            .events
            .iter()
            .any(|e| matches!(e, ChannelEvent::Close { .. }))
        {
            let _ = events_tx.send(ChannelEvent::Close { exit_code: Some(0) });
        }

        Ok(ExecChannel::from_channels(events_rx, input_tx))
    }

    async fn end(&mut self) {
        self.recorder.record_end(&self.label);
    }

    fn label(&self) -> &str {
        &self.label
    }
}

/// Transport handing out pre-built sessions in order
pub struct MockTransport {
    sessions: Mutex<VecDeque<Result<MockSession>>>,
    recorder: Arc<Recorder>,
}

impl MockTransport {
    pub fn new(recorder: Arc<Recorder>) -> Self {
        Self {
            sessions: Mutex::new(VecDeque::new()),
            recorder,
        }
    }

    /// Queue a session for the next connect
    pub fn push_session(&self, session: MockSession) {
        self.sessions.lock().unwrap().push_back(Ok(session));
    }

    /// Queue a connect failure
    pub fn push_failure(&self, reason: &str) {
        self.sessions
            .lock()
            .unwrap()
            .push_back(Err(Error::ConnectionFailed {
                host: "mock".to_string(),
                reason: reason.to_string(),
            }));
    }
}

#[async_trait]
impl SshTransport for MockTransport {
    async fn connect(&self, config: &ConnectionConfig) -> Result<Box<dyn Session>> {
        self.recorder.record_connect();
        match self.sessions.lock().unwrap().pop_front() {
            Some(Ok(session)) => Ok(Box::new(session)),
            Some(Err(e)) => Err(e),
            None => Err(Error::ConnectionFailed {
                host: config.host.clone(),
                reason: "no more scripted sessions".to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_scripted_exec_and_recording() {
        let recorder = Recorder::new();
        let mut session = MockSession::new(
            "primary",
            vec![CommandScript::exits("ls", "a.txt\n", 0)],
            Arc::clone(&recorder),
        );

        let mut channel = session.exec("cd ~ && ls").await.unwrap();
        assert_eq!(
            channel.next_event().await,
            Some(ChannelEvent::Data(b"a.txt\n".to_vec()))
        );
        assert_eq!(
            channel.next_event().await,
            Some(ChannelEvent::Close { exit_code: Some(0) })
        );
        assert_eq!(
            recorder.executed(),
            vec![("primary".to_string(), "cd ~ && ls".to_string())]
        );
    }

    #[tokio::test]
    async fn test_unscripted_command_defaults_to_success() {
        let recorder = Recorder::new();
        let mut session = MockSession::new("primary", vec![], recorder);

        let mut channel = session.exec("whoami").await.unwrap();
        loop {
            match channel.next_event().await {
                Some(ChannelEvent::Close { exit_code }) => {
                    assert_eq!(exit_code, Some(0));
                    break;
                }
                Some(_) => continue,
                None => panic!("channel dropped without close"),
            }
        }
    }

    #[tokio::test]
    async fn test_server_script_keeps_channel_open() {
        let recorder = Recorder::new();
        let mut session = MockSession::new(
            "primary",
            vec![CommandScript::server("npm run dev", "listening on 3000\n")],
            recorder,
        );

        let mut channel = session.exec("cd ~ && npm run dev").await.unwrap();
        assert_eq!(
            channel.next_event().await,
            Some(ChannelEvent::Data(b"listening on 3000\n".to_vec()))
        );
        // No close follows; the next read must stay pending
        tokio::select! {
            _ = channel.next_event() => panic!("server channel closed unexpectedly"),
            _ = tokio::time::sleep(std::time::Duration::from_millis(50)) => {}
        }
    }

    #[tokio::test]
    async fn test_stdin_writes_are_recorded() {
        let recorder = Recorder::new();
        let mut session = MockSession::new("primary", vec![], Arc::clone(&recorder));

        let channel = session.exec("sudo apt update").await.unwrap();
        channel.writer().send(b"hunter2\n").unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;

        assert_eq!(recorder.stdin_writes(), vec!["hunter2\n".to_string()]);
    }

    #[tokio::test]
    async fn test_transport_hands_out_sessions_in_order() {
        let recorder = Recorder::new();
        let transport = MockTransport::new(Arc::clone(&recorder));
        transport.push_session(MockSession::new("primary", vec![], Arc::clone(&recorder)));
        transport.push_failure("network unreachable");

        let config = ConnectionConfig::new("h", 22, "u", "p", "h");
        let first = transport.connect(&config).await.unwrap();
        assert_eq!(first.label(), "primary");

        let second = transport.connect(&config).await;
        assert!(second.is_err());
        assert_eq!(recorder.connect_count(), 2);
    }
}
