//! Stitch step - concatenates each variant into one MS output.

use crate::clips::SourceLayout;
use crate::orchestrator::errors::{StepError, StepResult};
use crate::orchestrator::step::PipelineStep;
use crate::orchestrator::types::{Context, RunPhase, RunState, StepOutcome, StitchedOutput};
use crate::stitch::StitchJob;

/// Resolves the external tool once, then runs one stitch job per variant in
/// creation order. The first failure aborts the remaining variants; outputs
/// already written are kept.
pub struct StitchStep;

impl StitchStep {
    pub fn new() -> Self {
        Self
    }
}

impl Default for StitchStep {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineStep for StitchStep {
    fn name(&self) -> &str {
        "Stitch MS"
    }

    fn phase(&self) -> RunPhase {
        RunPhase::Stitching
    }

    fn description(&self) -> &str {
        "Stitch MS clips"
    }

    fn validate_input(&self, ctx: &Context) -> StepResult<()> {
        if let Some(spec) = ctx.payload.stitches.iter().find(|s| s.order.is_empty()) {
            return Err(StepError::invalid_input(format!(
                "Version '{}' has no clips",
                spec.variant
            )));
        }
        Ok(())
    }

    fn execute(&self, ctx: &Context, state: &mut RunState) -> StepResult<StepOutcome> {
        if !ctx.payload.has_stitch_work() {
            ctx.report_progress(80);
            return Ok(StepOutcome::Skipped("No MS versions to stitch".to_string()));
        }

        ctx.set_activity("Stitching MS clips");
        ctx.report_progress(60);

        let tool_path = ctx.tool.ensure().map_err(StepError::Tool)?;
        ctx.logger.info(&format!("Using ffmpeg: {}", tool_path.display()));
        state.tool_path = Some(tool_path.clone());

        let source = SourceLayout::new(&ctx.payload.source_dir);
        for spec in &ctx.payload.stitches {
            ctx.logger
                .info(&format!("Stitching MS clips ({})...", spec.variant));
            ctx.logger.clear_tail();

            let job = StitchJob::from_clips(
                &source,
                &spec.order,
                &ctx.payload.destination_dir,
                &spec.output_filename,
                &tool_path,
            );
            let output = job
                .run(&ctx.logger, &ctx.encode)
                .map_err(|e| StepError::stitch(&spec.variant, e))?;

            ctx.logger
                .info(&format!("MS stitch complete: {}", output.display()));
            state.outputs.push(StitchedOutput {
                variant: spec.variant.clone(),
                path: output,
            });
        }

        ctx.report_progress(80);
        Ok(StepOutcome::Success)
    }

    fn validate_output(&self, ctx: &Context, state: &RunState) -> StepResult<()> {
        if state.outputs.len() != ctx.payload.stitches.len() {
            return Err(StepError::invalid_output(format!(
                "Expected {} stitched output(s), recorded {}",
                ctx.payload.stitches.len(),
                state.outputs.len()
            )));
        }
        Ok(())
    }
}
