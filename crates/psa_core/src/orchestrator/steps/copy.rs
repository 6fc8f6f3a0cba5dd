//! Copy RS step - copies selected RS clips and their music.

use crate::orchestrator::errors::{StepError, StepResult};
use crate::orchestrator::step::PipelineStep;
use crate::orchestrator::types::{Context, RunPhase, RunState, StepOutcome};

/// Runs the payload's copy job. Skipped when no RS clips are selected;
/// the run still passes through the `CopyingRs` phase.
pub struct CopyRsStep;

impl CopyRsStep {
    pub fn new() -> Self {
        Self
    }
}

impl Default for CopyRsStep {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineStep for CopyRsStep {
    fn name(&self) -> &str {
        "Copy RS"
    }

    fn phase(&self) -> RunPhase {
        RunPhase::CopyingRs
    }

    fn description(&self) -> &str {
        "Copy RS clips and music"
    }

    fn validate_input(&self, ctx: &Context) -> StepResult<()> {
        if ctx.payload.copy.destination_dir != ctx.payload.destination_dir {
            return Err(StepError::invalid_input(
                "Copy job targets a different destination than the run",
            ));
        }
        Ok(())
    }

    fn execute(&self, ctx: &Context, state: &mut RunState) -> StepResult<StepOutcome> {
        let job = &ctx.payload.copy;
        if job.is_empty() {
            ctx.report_progress(40);
            return Ok(StepOutcome::Skipped("No RS clips selected".to_string()));
        }

        ctx.set_activity("Copying RS clips and music");
        ctx.logger.info("Copying RS clips and music...");

        let report = job.run().map_err(StepError::Copy)?;

        if !report.missing_primary.is_empty() {
            ctx.warn(&format!(
                "RS clips not found and skipped: {}",
                report.missing_primary.join(", ")
            ));
        }
        if !report.missing_companion.is_empty() {
            ctx.logger.info(&format!(
                "No music for: {}",
                report.missing_companion.join(", ")
            ));
        }
        ctx.logger.info(&format!(
            "RS copy complete: {} clip(s), {} music file(s)",
            report.copied_primary.len(),
            report.copied_companion.len()
        ));

        state.copy = Some(report);
        ctx.report_progress(40);
        Ok(StepOutcome::Success)
    }

    fn validate_output(&self, _ctx: &Context, state: &RunState) -> StepResult<()> {
        if state.copy.is_none() {
            return Err(StepError::invalid_output("Copy report not recorded"));
        }
        Ok(())
    }
}
