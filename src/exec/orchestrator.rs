//! Remote Execution Orchestrator
//!
//! Walks the command queue one command at a time on the active session,
//! rewriting each through the directory cursor, answering auth prompts, and
//! deciding per-command outcomes. Long-running commands trigger the
//! parallel-handoff path: the server stays on the current session while the
//! rest of the queue continues on a fresh one. Handoff continuations live on
//! an explicit work stack rather than in recursion, so arbitrarily nested
//! server commands cannot grow the call stack.

use std::sync::Arc;

use tokio::time::{sleep, timeout, Duration};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::audit::{log_security_event, SecurityEvent};
use crate::auth::PasswordResponder;
use crate::classifier;
use crate::debug::{DebugOutcome, DebugSession, DebugTerminal};
use crate::error::{Error, Result};
use crate::models::{
    CommandQueue, CommandStatus, ConnectionConfig, ExecutionLogEntry, RunState,
};
use crate::state::{RunContext, RunSummary};
use crate::transport::{ExecChannel, Session, SshTransport};

use super::handoff::{HandoffFrame, HandoffManager};
use super::ready_wait::wait_until_ready;
use super::runner::{drive_command, CommandOutcome};
use super::{
    ChoicePrompt, DebugReturnChoice, FailureChoice, LongRunningChoice, AUTO_CHOICE_TIMEOUT,
};

/// What the failure flow decided to do next
enum StepOutcome {
    Advance,
    Retry,
    Restart,
    Terminate,
}

/// Outcome of the long-running launch flow
enum LongRunningStep {
    /// Server up, continuation session pushed; the current session parks
    HandedOff {
        channel: ExecChannel,
        next: HandoffFrame,
    },
    /// Server up but no second session; stay sequential here
    SequentialFallback { channel: ExecChannel },
    /// The flow resolved like an ordinary command
    Settled(StepOutcome),
}

/// Drives one full run of a command queue against a remote host
pub struct Orchestrator {
    transport: Box<dyn SshTransport>,
    config: ConnectionConfig,
    queue: CommandQueue,
    prompt: Box<dyn ChoicePrompt>,
    debug_terminal: Option<Box<dyn DebugTerminal>>,
    ctx: Arc<RunContext>,
}

impl Orchestrator {
    pub fn new(
        transport: Box<dyn SshTransport>,
        config: ConnectionConfig,
        queue: CommandQueue,
        prompt: Box<dyn ChoicePrompt>,
        debug_terminal: Option<Box<dyn DebugTerminal>>,
        ctx: Arc<RunContext>,
    ) -> Result<Self> {
        if queue.is_empty() {
            return Err(Error::EmptyQueue);
        }
        Ok(Self {
            transport,
            config,
            queue,
            prompt,
            debug_terminal,
            ctx,
        })
    }

    /// Shared run context, for status observers
    pub fn context(&self) -> Arc<RunContext> {
        Arc::clone(&self.ctx)
    }

    /// Run the queue to completion or termination.
    ///
    /// Every open session (nested parallel ones included) is closed and the
    /// log sink flushed before returning, on the error path too. Detached
    /// remote servers are left running; only our sessions are torn down.
    pub async fn run(mut self) -> Result<RunSummary> {
        log_security_event(
            SecurityEvent::ConnectionAttempt,
            Some(&format!("endpoint={}", self.config.endpoint())),
        );
        let session = match self.transport.connect(&self.config).await {
            Ok(session) => session,
            Err(e) => {
                self.ctx.finish(RunState::Terminated);
                return Err(e);
            }
        };
        log_security_event(SecurityEvent::SessionStart, Some(session.label()));

        let mut stack: Vec<HandoffFrame> = vec![HandoffFrame::initial(session)];
        // Sessions whose foreground channel hosts a live server. Kept open
        // so the servers survive until the run ends.
        let mut parked: Vec<Box<dyn Session>> = Vec::new();
        let mut parked_channels: Vec<ExecChannel> = Vec::new();

        let result = self
            .drive(&mut stack, &mut parked, &mut parked_channels)
            .await;

        for mut frame in stack.drain(..) {
            frame.session.end().await;
            log_security_event(SecurityEvent::SessionEnd, Some(frame.session.label()));
        }
        for mut session in parked.drain(..) {
            session.end().await;
            log_security_event(SecurityEvent::SessionEnd, Some(session.label()));
        }
        drop(parked_channels);

        match result {
            Ok(final_state) => {
                self.ctx.finish(final_state);
                Ok(self.ctx.summary())
            }
            Err(e) => {
                self.ctx.finish(RunState::Terminated);
                Err(e)
            }
        }
    }

    /// The work-stack loop. Returns the final run state; session teardown
    /// happens in [`run`].
    async fn drive(
        &mut self,
        stack: &mut Vec<HandoffFrame>,
        parked: &mut Vec<Box<dyn Session>>,
        parked_channels: &mut Vec<ExecChannel>,
    ) -> Result<RunState> {
        'frames: while let Some(mut frame) = stack.pop() {
            let mut index = frame.next_index;
            while index < self.queue.len() {
                let command = match self.queue.get(index) {
                    Some(c) => c.to_string(),
                    None => break,
                };
                self.ctx.set_status(index, CommandStatus::Running);

                let step = if classifier::is_long_running(&command) {
                    match self
                        .launch_long_running(&mut frame, index, &command)
                        .await?
                    {
                        LongRunningStep::HandedOff { channel, next } => {
                            parked_channels.push(channel);
                            stack.push(next);
                            parked.push(frame.session);
                            continue 'frames;
                        }
                        LongRunningStep::SequentialFallback { channel } => {
                            parked_channels.push(channel);
                            index += 1;
                            continue;
                        }
                        LongRunningStep::Settled(step) => step,
                    }
                } else {
                    self.run_one(&mut frame, index, &command).await?
                };

                match step {
                    StepOutcome::Advance => index += 1,
                    StepOutcome::Retry => {}
                    StepOutcome::Restart => {
                        stack.push(frame);
                        self.restart(stack, parked, parked_channels).await?;
                        continue 'frames;
                    }
                    StepOutcome::Terminate => {
                        stack.push(frame);
                        return Ok(RunState::Terminated);
                    }
                }
            }

            frame.session.end().await;
            log_security_event(SecurityEvent::SessionEnd, Some(frame.session.label()));
        }
        Ok(RunState::Completed)
    }

    /// Execute one ordinary command and resolve its outcome.
    async fn run_one(
        &mut self,
        frame: &mut HandoffFrame,
        index: usize,
        command: &str,
    ) -> Result<StepOutcome> {
        let qualified = frame.cursor.qualify(command);
        debug!("running [{}] {}", index, qualified.remote);

        let mut channel = frame.session.exec(&qualified.remote).await?;
        let responder = PasswordResponder::new(
            channel.writer(),
            self.config.password(),
            command,
            Arc::clone(&self.ctx),
        );
        let outcome = drive_command(&mut channel, command, responder, &self.ctx).await;

        if !outcome.failed {
            let status = if frame.parallel {
                CommandStatus::Parallel
            } else {
                CommandStatus::Success
            };
            self.ctx.set_status(index, status);
            self.log_settled(command, status, &outcome, &[]);
            return Ok(StepOutcome::Advance);
        }

        self.ctx.set_status(index, CommandStatus::Failed);
        let flags: &[&str] = if outcome.critical {
            &["criticalError"]
        } else {
            &[]
        };
        self.log_settled(command, CommandStatus::Failed, &outcome, flags);
        self.handle_failure(frame, index, command, &outcome).await
    }

    /// The failure recovery menu: debug, skip, or terminate; after a debug
    /// detour, the four-way resume menu.
    async fn handle_failure(
        &mut self,
        frame: &mut HandoffFrame,
        index: usize,
        command: &str,
        outcome: &CommandOutcome,
    ) -> Result<StepOutcome> {
        match self.prompt.on_failure(command, outcome).await {
            FailureChoice::Skip => {
                self.ctx.set_status(index, CommandStatus::Skipped);
                Ok(StepOutcome::Advance)
            }
            FailureChoice::Terminate => Ok(StepOutcome::Terminate),
            FailureChoice::Debug => {
                if let DebugOutcome::TerminateConnection = self.enter_debug(frame).await? {
                    return Ok(StepOutcome::Terminate);
                }
                match self.prompt.after_debug(command).await {
                    DebugReturnChoice::RestartFromBeginning => Ok(StepOutcome::Restart),
                    DebugReturnChoice::ContinueFromError => {
                        self.ctx.set_status(index, CommandStatus::Running);
                        Ok(StepOutcome::Retry)
                    }
                    DebugReturnChoice::SkipAndContinue => {
                        self.ctx.set_status(index, CommandStatus::Skipped);
                        Ok(StepOutcome::Advance)
                    }
                    DebugReturnChoice::Terminate => Ok(StepOutcome::Terminate),
                }
            }
        }
    }

    /// Launch flow for a detected server command.
    async fn launch_long_running(
        &mut self,
        frame: &mut HandoffFrame,
        index: usize,
        command: &str,
    ) -> Result<LongRunningStep> {
        let choice = match timeout(
            AUTO_CHOICE_TIMEOUT,
            self.prompt.on_long_running(command),
        )
        .await
        {
            Ok(choice) => choice,
            Err(_) => {
                info!(
                    "no choice for '{}' within {:?}; defaulting to parallel",
                    command, AUTO_CHOICE_TIMEOUT
                );
                LongRunningChoice::Parallel
            }
        };

        match choice {
            LongRunningChoice::Skip => {
                self.ctx.set_status(index, CommandStatus::Skipped);
                self.ctx
                    .log_entry(&ExecutionLogEntry::new(command, CommandStatus::Skipped));
                Ok(LongRunningStep::Settled(StepOutcome::Advance))
            }
            // User wants to block on it; treat it as ordinary
            LongRunningChoice::Wait => {
                let step = self.run_one(frame, index, command).await?;
                Ok(LongRunningStep::Settled(step))
            }
            LongRunningChoice::Debug => {
                self.ctx.set_status(index, CommandStatus::Debugged);
                match self.enter_debug(frame).await? {
                    DebugOutcome::TerminateConnection => {
                        Ok(LongRunningStep::Settled(StepOutcome::Terminate))
                    }
                    DebugOutcome::ContinueProcess => {
                        Ok(LongRunningStep::Settled(StepOutcome::Advance))
                    }
                }
            }
            LongRunningChoice::Background => {
                self.launch_background(frame, index, command).await?;
                Ok(LongRunningStep::Settled(StepOutcome::Advance))
            }
            LongRunningChoice::Parallel => self.launch_parallel(frame, index, command).await,
        }
    }

    /// Launch the server in the foreground, wait for readiness, then hand
    /// the rest of the queue to a continuation session. On handoff failure
    /// the server stays up and the same session carries on sequentially.
    async fn launch_parallel(
        &mut self,
        frame: &mut HandoffFrame,
        index: usize,
        command: &str,
    ) -> Result<LongRunningStep> {
        let qualified = frame.cursor.qualify(command);
        let mut channel = frame.session.exec(&qualified.remote).await?;
        let responder = PasswordResponder::new(
            channel.writer(),
            self.config.password(),
            command,
            Arc::clone(&self.ctx),
        );

        let ready = wait_until_ready(&mut channel, command, &responder, &self.ctx).await;
        if !ready.success {
            self.ctx.set_status(index, CommandStatus::Failed);
            let outcome = CommandOutcome {
                exit_code: ready.exit_code,
                critical: classifier::critical_error_match(&ready.output).is_some(),
                output: ready.output,
                failed: true,
            };
            self.log_settled(command, CommandStatus::Failed, &outcome, &["prematureExit"]);
            let step = self.handle_failure(frame, index, command, &outcome).await?;
            return Ok(LongRunningStep::Settled(step));
        }

        self.ctx.set_status(index, CommandStatus::Parallel);
        let flag = if ready.ready { "ready" } else { "optimisticTimeout" };
        self.ctx.log_entry(
            &ExecutionLogEntry::new(command, CommandStatus::Parallel)
                .with_output(ready.output)
                .with_flag(flag),
        );

        match HandoffManager::open_continuation(&*self.transport, &self.config).await {
            Ok(secondary) => Ok(LongRunningStep::HandedOff {
                channel,
                next: HandoffFrame {
                    session: secondary,
                    next_index: index + 1,
                    cursor: frame.cursor.fork(),
                    parallel: true,
                },
            }),
            Err(e) => {
                warn!(
                    "continuation session unavailable ({}); continuing sequentially",
                    e
                );
                Ok(LongRunningStep::SequentialFallback { channel })
            }
        }
    }

    /// Legacy background path: detach the server with nohup, then show a
    /// best-effort tail of its log file.
    async fn launch_background(
        &mut self,
        frame: &mut HandoffFrame,
        index: usize,
        command: &str,
    ) -> Result<()> {
        let log_path = format!("/tmp/remoterun-{}.log", Uuid::new_v4());
        let detached = format!("nohup {} > {} 2>&1 &", command, log_path);
        let qualified = frame.cursor.qualify(&detached);

        let mut channel = frame.session.exec(&qualified.remote).await?;
        let responder = PasswordResponder::new(
            channel.writer(),
            self.config.password(),
            command,
            Arc::clone(&self.ctx),
        );
        let outcome = drive_command(&mut channel, command, responder, &self.ctx).await;

        self.ctx.set_status(index, CommandStatus::Backgrounded);
        self.log_settled(command, CommandStatus::Backgrounded, &outcome, &["nohup"]);

        // Give the detached process a beat to write something, then peek
        sleep(Duration::from_secs(1)).await;
        let tail = frame.cursor.qualify(&format!("tail -n 20 {}", log_path));
        match frame.session.exec(&tail.remote).await {
            Ok(mut tail_channel) => {
                let responder = PasswordResponder::new(
                    tail_channel.writer(),
                    self.config.password(),
                    command,
                    Arc::clone(&self.ctx),
                );
                drive_command(&mut tail_channel, command, responder, &self.ctx).await;
            }
            Err(e) => debug!("background log tail unavailable: {}", e),
        }
        Ok(())
    }

    async fn enter_debug(&mut self, frame: &mut HandoffFrame) -> Result<DebugOutcome> {
        let terminal = match self.debug_terminal.as_mut() {
            Some(terminal) => terminal,
            None => {
                warn!("no debug terminal attached; resuming without debug");
                return Ok(DebugOutcome::ContinueProcess);
            }
        };
        DebugSession::new(
            frame.session.as_mut(),
            terminal.as_mut(),
            &mut frame.cursor,
            self.config.password(),
            Arc::clone(&self.ctx),
        )
        .run()
        .await
    }

    /// Tear everything down, reset statuses, and start over with a fresh
    /// session at index zero.
    async fn restart(
        &mut self,
        stack: &mut Vec<HandoffFrame>,
        parked: &mut Vec<Box<dyn Session>>,
        parked_channels: &mut Vec<ExecChannel>,
    ) -> Result<()> {
        info!("restarting queue from the beginning");
        for mut frame in stack.drain(..) {
            frame.session.end().await;
            log_security_event(SecurityEvent::SessionEnd, Some(frame.session.label()));
        }
        for mut session in parked.drain(..) {
            session.end().await;
            log_security_event(SecurityEvent::SessionEnd, Some(session.label()));
        }
        parked_channels.clear();
        self.ctx.reset_statuses();

        let session = self.transport.connect(&self.config).await?;
        log_security_event(SecurityEvent::SessionStart, Some(session.label()));
        stack.push(HandoffFrame::initial(session));
        Ok(())
    }

    fn log_settled(
        &self,
        command: &str,
        status: CommandStatus,
        outcome: &CommandOutcome,
        flags: &[&str],
    ) {
        let mut entry = ExecutionLogEntry::new(command, status)
            .with_output(outcome.output.clone())
            .with_exit_code(outcome.exit_code);
        for flag in flags {
            entry = entry.with_flag(*flag);
        }
        self.ctx.log_entry(&entry);
    }
}
