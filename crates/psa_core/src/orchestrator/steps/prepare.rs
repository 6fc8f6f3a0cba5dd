//! Prepare step - creates the destination folder skeleton.

use crate::destination::DestinationLayout;
use crate::orchestrator::errors::{StepError, StepResult};
use crate::orchestrator::step::PipelineStep;
use crate::orchestrator::types::{Context, RunPhase, RunState, StepOutcome};

/// Creates `PSAs`, `PSAs/RS`, `PSAs/RS/Music` and `PSAs/MS` under the run
/// destination. Existing folders are kept, so re-running is safe.
pub struct PrepareStep;

impl PrepareStep {
    pub fn new() -> Self {
        Self
    }
}

impl Default for PrepareStep {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineStep for PrepareStep {
    fn name(&self) -> &str {
        "Prepare"
    }

    fn phase(&self) -> RunPhase {
        RunPhase::Preparing
    }

    fn description(&self) -> &str {
        "Prepare destination folders"
    }

    fn validate_input(&self, ctx: &Context) -> StepResult<()> {
        if ctx.payload.destination_dir.as_os_str().is_empty() {
            return Err(StepError::invalid_input("Destination folder is empty"));
        }
        Ok(())
    }

    fn execute(&self, ctx: &Context, _state: &mut RunState) -> StepResult<StepOutcome> {
        ctx.report_progress(5);
        ctx.set_activity("Preparing destination");

        let layout = DestinationLayout::new(&ctx.payload.destination_dir);
        layout.build().map_err(StepError::Preparation)?;

        ctx.logger
            .info(&format!("Destination ready: {}", layout.root().display()));
        Ok(StepOutcome::Success)
    }

    fn validate_output(&self, ctx: &Context, _state: &RunState) -> StepResult<()> {
        let layout = DestinationLayout::new(&ctx.payload.destination_dir);
        for dir in [layout.rs_dir(), layout.music_dir(), layout.ms_dir()] {
            if !dir.is_dir() {
                return Err(StepError::invalid_output(format!(
                    "Folder was not created: {}",
                    dir.display()
                )));
            }
        }
        Ok(())
    }
}
