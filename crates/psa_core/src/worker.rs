//! Background run controller.
//!
//! The foreground owns selections and variants and never blocks. Each
//! accepted run gets a fresh worker thread that owns its validated
//! `RunPayload` and reports back through an event queue, which the
//! foreground drains on a fixed interval (`POLL_INTERVAL`).
//!
//! Only one run may be active; a submission while one is active is
//! ignored, not queued.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{unbounded, Receiver, Sender, TryRecvError};

use crate::config::ConfigManager;
use crate::logging::{LogCallback, LogConfig, RunLogger};
use crate::orchestrator::{
    execute_run, Context, RunError, RunOutcome, RunPayload, RunRequest, RunStatus,
};
use crate::stitch::{EncodeSettings, ToolLocator};

pub use crate::orchestrator::RunEvent;

/// How often the foreground should drain the event queue.
pub const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Notice sent when copy and stitch work finished.
pub const COMPLETE_MESSAGE: &str = "RS copy and MS stitch complete.";

/// Environment a run executes in.
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Folder for the per-run log file. `None` logs to the event queue only.
    pub logs_dir: Option<PathBuf>,
    pub log_config: LogConfig,
    pub tool: ToolLocator,
    pub encode: EncodeSettings,
}

impl RunOptions {
    pub fn new(tool: ToolLocator) -> Self {
        Self {
            logs_dir: None,
            log_config: LogConfig::default(),
            tool,
            encode: EncodeSettings::default(),
        }
    }

    /// Options taken from the loaded settings.
    pub fn from_config(config: &ConfigManager) -> Self {
        Self {
            logs_dir: Some(config.logs_folder()),
            log_config: config.log_config(),
            tool: config.tool_locator(),
            encode: EncodeSettings::default(),
        }
    }

    pub fn with_logs_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.logs_dir = Some(dir.into());
        self
    }
}

/// What happened to a submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Submission {
    /// A worker thread was started.
    Started,
    /// Another run is active; nothing was done.
    Ignored,
}

/// Starts runs on background threads and hands their events to the
/// foreground.
pub struct RunWorker {
    tx: Sender<RunEvent>,
    rx: Receiver<RunEvent>,
    active: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl RunWorker {
    pub fn new() -> Self {
        let (tx, rx) = unbounded();
        Self {
            tx,
            rx,
            active: Arc::new(AtomicBool::new(false)),
            handle: None,
        }
    }

    /// Whether a run is in progress.
    pub fn is_running(&self) -> bool {
        self.active.load(Ordering::Acquire)
            && self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Validate `request` and start it on a new thread.
    ///
    /// Validation happens here, on the caller's thread: an invalid request
    /// is returned as an error and no thread starts. A request made while
    /// another run is active is ignored.
    pub fn submit(
        &mut self,
        request: &RunRequest,
        run_name: &str,
        options: RunOptions,
    ) -> Result<Submission, RunError> {
        if self.is_running() {
            tracing::debug!("Run '{}' ignored: another run is active", run_name);
            return Ok(Submission::Ignored);
        }
        self.reap();

        let payload = request.validate()?;
        let run_name = run_name.to_string();
        self.spawn(move |tx| run_to_completion(payload, &run_name, options, tx));
        Ok(Submission::Started)
    }

    fn spawn<F>(&mut self, job: F)
    where
        F: FnOnce(&Sender<RunEvent>) -> RunStatus + Send + 'static,
    {
        self.active.store(true, Ordering::Release);
        let tx = self.tx.clone();
        let active = Arc::clone(&self.active);

        self.handle = Some(thread::spawn(move || {
            let status = job(&tx);
            active.store(false, Ordering::Release);
            let _ = tx.send(RunEvent::Done(status));
        }));
    }

    /// Whether no worker thread is alive. A finished thread has sent all
    /// of its events, `Done` included unless it panicked.
    pub fn has_exited(&self) -> bool {
        self.handle.as_ref().map_or(true, JoinHandle::is_finished)
    }

    /// Poll the queue every `POLL_INTERVAL` until the run reports `Done`.
    ///
    /// Every other event goes to `on_event`. Returns `None` if the worker
    /// thread is gone without reporting `Done`.
    pub fn wait(&self, mut on_event: impl FnMut(RunEvent)) -> Option<RunStatus> {
        loop {
            let exited = self.has_exited();
            for event in self.drain() {
                match event {
                    RunEvent::Done(status) => return Some(status),
                    other => on_event(other),
                }
            }
            if exited {
                return None;
            }
            thread::sleep(POLL_INTERVAL);
        }
    }

    /// Join a finished worker thread, if any.
    fn reap(&mut self) {
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                tracing::error!("Run worker thread panicked");
            }
        }
        self.active.store(false, Ordering::Release);
    }

    /// Next pending event without blocking.
    pub fn try_next(&self) -> Option<RunEvent> {
        match self.rx.try_recv() {
            Ok(event) => Some(event),
            Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => None,
        }
    }

    /// All pending events without blocking.
    pub fn drain(&self) -> Vec<RunEvent> {
        self.rx.try_iter().collect()
    }
}

impl Default for RunWorker {
    fn default() -> Self {
        Self::new()
    }
}

/// Forward run log lines to the event queue.
fn log_callback(tx: &Sender<RunEvent>) -> LogCallback {
    let tx = tx.clone();
    Box::new(move |line: &str| {
        let _ = tx.send(RunEvent::Log(line.to_string()));
    })
}

/// Body of the worker thread. Every event except `Done` is sent from here.
fn run_to_completion(
    payload: RunPayload,
    run_name: &str,
    options: RunOptions,
    tx: &Sender<RunEvent>,
) -> RunStatus {
    let logger = match options.logs_dir {
        Some(ref dir) => RunLogger::new(run_name, dir, options.log_config.clone(), Some(log_callback(tx)))
            .unwrap_or_else(|e| {
                tracing::warn!("Cannot create run log in {}: {}", dir.display(), e);
                RunLogger::detached(run_name, options.log_config.clone(), Some(log_callback(tx)))
            }),
        None => RunLogger::detached(run_name, options.log_config.clone(), Some(log_callback(tx))),
    };
    let logger = Arc::new(logger);

    let event_tx = tx.clone();
    let ctx = Context::new(payload, run_name, Arc::clone(&logger), options.tool)
        .with_encode(options.encode)
        .with_event_callback(Box::new(move |event| {
            let _ = event_tx.send(event);
        }));

    let status = match execute_run(&ctx) {
        Ok(RunOutcome::Completed(summary)) => {
            ctx.notify(COMPLETE_MESSAGE);
            RunStatus::Completed(summary)
        }
        Ok(RunOutcome::NoWork) => RunStatus::NoWork,
        Err(e) => {
            let kind = e.kind();
            let message = e.user_message();
            logger.error(&format!("Run failed ({}): {}", kind.as_str(), e));
            ctx.emit(RunEvent::Error { kind, message });
            RunStatus::Failed(kind)
        }
    };

    logger.close();
    status
}
