//! Run orchestrator for the copy and stitch pipeline.
//!
//! A run is validated synchronously (`RunRequest::validate`), then executed
//! as a fixed sequence of steps that drive the state machine:
//!
//! ```text
//! Idle ─► Preparing ─► CopyingRs ─► Stitching ─► Done
//!             │            │            │
//!             └────────────┴────────────┴──► Error
//! ```
//!
//! A payload without any work goes straight from `Preparing` to `Done`
//! without touching the filesystem.
//!
//! # Example
//!
//! ```ignore
//! use psa_core::orchestrator::{execute_run, Context, RunRequest};
//!
//! let payload = request.validate()?;
//! let ctx = Context::new(payload, "Fall_Week_3", logger, locator);
//! match execute_run(&ctx)? {
//!     RunOutcome::Completed(summary) => println!("{} output(s)", summary.outputs.len()),
//!     RunOutcome::NoWork => println!("Nothing selected"),
//! }
//! ```

mod errors;
mod pipeline;
mod request;
mod step;
pub mod steps;
mod types;

pub use errors::{RunError, RunErrorKind, RunResult, StepError, StepResult, ValidationError};
pub use pipeline::{Pipeline, PipelineRunResult};
pub use request::{RunPayload, RunRequest, StitchSpec};
pub use step::PipelineStep;
pub use steps::{CopyRsStep, PrepareStep, StitchStep};
pub use types::{
    Context, EventCallback, RunEvent, RunOutcome, RunPhase, RunState, RunStatus, RunSummary,
    StepOutcome, StitchedOutput,
};

/// Message shown when a run has nothing to do.
pub const NO_WORK_MESSAGE: &str = "No RS or MS selections to process.";

/// Create the standard pipeline with all steps in order.
///
/// 1. Prepare - create the destination skeleton
/// 2. Copy RS - copy selected RS clips and music
/// 3. Stitch MS - stitch each non-empty variant
pub fn create_standard_pipeline() -> Pipeline {
    Pipeline::new()
        .with_step(PrepareStep::new())
        .with_step(CopyRsStep::new())
        .with_step(StitchStep::new())
}

/// Execute a validated payload through the standard pipeline.
pub fn execute_run(ctx: &Context) -> RunResult<RunOutcome> {
    let mut state = RunState::new();

    if ctx.payload.is_empty() {
        state.transition(ctx, RunPhase::Preparing);
        ctx.notify(NO_WORK_MESSAGE);
        state.transition(ctx, RunPhase::Done);
        return Ok(RunOutcome::NoWork);
    }

    ctx.logger.info(&format!(
        "Run '{}': {} RS clip(s), {} MS version(s) -> {}",
        ctx.run_name,
        ctx.payload.copy.names.len(),
        ctx.payload.stitches.len(),
        ctx.payload.destination_dir.display()
    ));

    let pipeline = create_standard_pipeline();
    let result = pipeline.run(ctx, &mut state)?;
    ctx.logger.debug(&format!(
        "Steps completed: {:?}, skipped: {:?}",
        result.steps_completed, result.steps_skipped
    ));

    Ok(RunOutcome::Completed(state.summary()))
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::path::PathBuf;
    use std::sync::Arc;

    use parking_lot::Mutex;

    use super::{Context, RunEvent, RunPayload};
    use crate::copy::CopyJob;
    use crate::logging::{LogConfig, RunLogger};
    use crate::stitch::ToolLocator;

    /// Context with an empty payload that records every event.
    pub fn test_context() -> (Context, Arc<Mutex<Vec<RunEvent>>>) {
        let payload = RunPayload {
            source_dir: PathBuf::from("/src"),
            destination_dir: PathBuf::from("/dest"),
            copy: CopyJob::new("/dest", Vec::new(), "/src"),
            stitches: Vec::new(),
            base_filename: String::new(),
        };
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&events);
        let logger = Arc::new(RunLogger::detached("test", LogConfig::default(), None));
        let tool = ToolLocator::new(&PathBuf::from("/nonexistent"), "ffmpeg-bin", vec![], "")
            .with_search_dirs(Vec::new())
            .with_system_path(false);

        let ctx = Context::new(payload, "test", logger, tool)
            .with_event_callback(Box::new(move |e| sink.lock().push(e)));
        (ctx, events)
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::test_context;
    use super::*;

    #[test]
    fn standard_pipeline_order() {
        let pipeline = create_standard_pipeline();
        assert_eq!(pipeline.step_names(), vec!["Prepare", "Copy RS", "Stitch MS"]);
    }

    #[test]
    fn empty_payload_is_no_work() {
        let (ctx, events) = test_context();

        assert_eq!(execute_run(&ctx).unwrap(), RunOutcome::NoWork);
        assert_eq!(
            *events.lock(),
            vec![
                RunEvent::Phase(RunPhase::Preparing),
                RunEvent::Info(NO_WORK_MESSAGE.to_string()),
                RunEvent::Phase(RunPhase::Done),
            ]
        );
        assert!(!std::path::Path::new("/dest/PSAs").exists());
    }
}
