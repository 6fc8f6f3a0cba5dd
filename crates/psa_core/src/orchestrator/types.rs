//! Core types for the run pipeline.

use std::path::PathBuf;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::errors::RunErrorKind;
use super::request::RunPayload;
use crate::copy::CopyReport;
use crate::logging::RunLogger;
use crate::stitch::{EncodeSettings, ToolLocator};

/// Run state machine phases.
///
/// `Idle → Preparing → CopyingRs → Stitching → Done`, with `Error`
/// reachable from every non-idle phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum RunPhase {
    #[default]
    Idle,
    Preparing,
    CopyingRs,
    Stitching,
    Done,
    Error,
}

impl RunPhase {
    /// Get display string for UI.
    pub fn as_str(&self) -> &'static str {
        match self {
            RunPhase::Idle => "Idle",
            RunPhase::Preparing => "Preparing",
            RunPhase::CopyingRs => "Copying RS",
            RunPhase::Stitching => "Stitching",
            RunPhase::Done => "Done",
            RunPhase::Error => "Error",
        }
    }

    /// Whether the run has ended.
    pub fn is_terminal(&self) -> bool {
        matches!(self, RunPhase::Done | RunPhase::Error)
    }
}

impl std::fmt::Display for RunPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One stitched output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StitchedOutput {
    pub variant: String,
    pub path: PathBuf,
}

/// What a completed run produced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub copy: Option<CopyReport>,
    pub outputs: Vec<StitchedOutput>,
}

/// How a run ended without error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// Copy and/or stitch work ran.
    Completed(RunSummary),
    /// Nothing was selected. No files were written.
    NoWork,
}

/// Final status carried by [`RunEvent::Done`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunStatus {
    Completed(RunSummary),
    NoWork,
    Failed(RunErrorKind),
}

/// Messages from a running job to the foreground.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunEvent {
    /// A formatted run log line.
    Log(String),
    /// Overall progress percentage.
    Progress(u8),
    /// Short label for what the run is doing now.
    Activity(String),
    /// State machine transition.
    Phase(RunPhase),
    /// Non-fatal problem worth showing the user.
    Warning(String),
    /// Informational notice (no-op run, completion).
    Info(String),
    /// Fatal error. Always followed by `Done`.
    Error { kind: RunErrorKind, message: String },
    /// The run is over. Always the last event of a run.
    Done(RunStatus),
}

/// Callback receiving run events.
pub type EventCallback = Box<dyn Fn(RunEvent) + Send + Sync>;

/// Read-only context passed to pipeline steps.
///
/// Holds the immutable payload and shared resources. Mutable results go in
/// `RunState`.
pub struct Context {
    /// Immutable job description, taken at submission.
    pub payload: RunPayload,
    /// Run name (used in error context and the log file name).
    pub run_name: String,
    /// Per-run logger.
    pub logger: Arc<RunLogger>,
    /// External tool lookup.
    pub tool: ToolLocator,
    /// Re-encode parameters for stitching.
    pub encode: EncodeSettings,
    event_callback: Option<EventCallback>,
}

impl Context {
    pub fn new(
        payload: RunPayload,
        run_name: impl Into<String>,
        logger: Arc<RunLogger>,
        tool: ToolLocator,
    ) -> Self {
        Self {
            payload,
            run_name: run_name.into(),
            logger,
            tool,
            encode: EncodeSettings::default(),
            event_callback: None,
        }
    }

    /// Set the event callback.
    pub fn with_event_callback(mut self, callback: EventCallback) -> Self {
        self.event_callback = Some(callback);
        self
    }

    /// Override the re-encode parameters.
    pub fn with_encode(mut self, encode: EncodeSettings) -> Self {
        self.encode = encode;
        self
    }

    /// Send an event to the callback (if set).
    pub fn emit(&self, event: RunEvent) {
        if let Some(ref callback) = self.event_callback {
            callback(event);
        }
    }

    /// Report a progress milestone.
    pub fn report_progress(&self, percent: u8) {
        self.logger.progress(u32::from(percent));
        self.emit(RunEvent::Progress(percent));
    }

    /// Update the activity label.
    pub fn set_activity(&self, label: &str) {
        self.emit(RunEvent::Activity(label.to_string()));
    }

    /// Log and surface a non-fatal warning.
    pub fn warn(&self, message: &str) {
        self.logger.warn(message);
        self.emit(RunEvent::Warning(message.to_string()));
    }

    /// Log and surface an informational notice.
    pub fn notify(&self, message: &str) {
        self.logger.info(message);
        self.emit(RunEvent::Info(message.to_string()));
    }
}

/// Mutable run state accumulated by the steps.
#[derive(Debug, Clone, Default)]
pub struct RunState {
    /// Current phase.
    pub phase: RunPhase,
    /// Copy step results.
    pub copy: Option<CopyReport>,
    /// Tool resolved by the stitch step (once per run).
    pub tool_path: Option<PathBuf>,
    /// Stitched outputs in variant order.
    pub outputs: Vec<StitchedOutput>,
}

impl RunState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Move to `phase` and announce it.
    pub fn transition(&mut self, ctx: &Context, phase: RunPhase) {
        if self.phase != phase {
            ctx.logger.debug(&format!("Phase {} -> {}", self.phase, phase));
            self.phase = phase;
            ctx.emit(RunEvent::Phase(phase));
        }
    }

    pub fn summary(&self) -> RunSummary {
        RunSummary {
            copy: self.copy.clone(),
            outputs: self.outputs.clone(),
        }
    }
}

/// Result of executing a pipeline step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    /// Step completed successfully.
    Success,
    /// Step had nothing to do (not an error).
    Skipped(String),
}
