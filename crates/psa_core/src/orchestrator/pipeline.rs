//! Pipeline runner that executes steps in sequence.

use super::errors::{RunError, RunResult, StepError};
use super::step::PipelineStep;
use super::types::{Context, RunPhase, RunState, StepOutcome};

/// Pipeline that runs a sequence of steps.
///
/// Steps run in order with validation before and after each one. The first
/// failure stops the pipeline; work already done is left in place.
pub struct Pipeline {
    steps: Vec<Box<dyn PipelineStep>>,
}

impl Pipeline {
    /// Create a new empty pipeline.
    pub fn new() -> Self {
        Self { steps: Vec::new() }
    }

    /// Add a step to the pipeline.
    pub fn add_step<S: PipelineStep + 'static>(&mut self, step: S) -> &mut Self {
        self.steps.push(Box::new(step));
        self
    }

    /// Add a step (builder pattern).
    pub fn with_step<S: PipelineStep + 'static>(mut self, step: S) -> Self {
        self.add_step(step);
        self
    }

    /// Run every step, then move `state` to `Done`.
    ///
    /// On failure `state` is moved to `Error` and the step context is
    /// attached to the returned error.
    pub fn run(&self, ctx: &Context, state: &mut RunState) -> RunResult<PipelineRunResult> {
        let mut result = PipelineRunResult::default();

        for step in &self.steps {
            let step_name = step.name();
            state.transition(ctx, step.phase());
            ctx.logger.phase(step.description());

            let fail = |state: &mut RunState, e: StepError| {
                ctx.logger.error(&format!("{} failed: {}", step_name, e));
                let phase = state.phase;
                state.transition(ctx, RunPhase::Error);
                RunError::step_failed(&ctx.run_name, step_name, phase, e)
            };

            ctx.logger.debug(&format!("Validating input for '{}'", step_name));
            if let Err(e) = step.validate_input(ctx) {
                return Err(fail(state, e));
            }

            ctx.logger.debug(&format!("Executing '{}'", step_name));
            let outcome = match step.execute(ctx, state) {
                Ok(outcome) => outcome,
                Err(e) => return Err(fail(state, e)),
            };

            match outcome {
                StepOutcome::Success => {
                    if let Err(e) = step.validate_output(ctx, state) {
                        return Err(fail(state, e));
                    }
                    ctx.logger.success(&format!("{} completed", step_name));
                    result.steps_completed.push(step_name.to_string());
                }
                StepOutcome::Skipped(reason) => {
                    ctx.logger.info(&format!("{} skipped: {}", step_name, reason));
                    result.steps_skipped.push(step_name.to_string());
                }
            }
        }

        ctx.report_progress(100);
        ctx.logger.success("All operations complete");
        state.transition(ctx, RunPhase::Done);

        Ok(result)
    }

    /// Get the number of steps in the pipeline.
    pub fn step_count(&self) -> usize {
        self.steps.len()
    }

    /// Get step names in order.
    pub fn step_names(&self) -> Vec<&str> {
        self.steps.iter().map(|s| s.name()).collect()
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new()
    }
}

/// Result of a pipeline run.
#[derive(Debug, Clone, Default)]
pub struct PipelineRunResult {
    /// Steps that completed successfully.
    pub steps_completed: Vec<String>,
    /// Steps that had nothing to do.
    pub steps_skipped: Vec<String>,
}

impl PipelineRunResult {
    /// Total number of steps that ran.
    pub fn total_steps(&self) -> usize {
        self.steps_completed.len() + self.steps_skipped.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orchestrator::errors::{StepError, StepResult};
    use crate::orchestrator::test_support::test_context;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct CountingStep {
        name: &'static str,
        phase: RunPhase,
        count: Arc<AtomicUsize>,
        fail: bool,
    }

    impl PipelineStep for CountingStep {
        fn name(&self) -> &str {
            self.name
        }

        fn phase(&self) -> RunPhase {
            self.phase
        }

        fn validate_input(&self, _ctx: &Context) -> StepResult<()> {
            Ok(())
        }

        fn execute(&self, _ctx: &Context, _state: &mut RunState) -> StepResult<StepOutcome> {
            self.count.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(StepError::invalid_input("boom"));
            }
            Ok(StepOutcome::Success)
        }

        fn validate_output(&self, _ctx: &Context, _state: &RunState) -> StepResult<()> {
            Ok(())
        }
    }

    fn step(name: &'static str, phase: RunPhase, count: &Arc<AtomicUsize>, fail: bool) -> CountingStep {
        CountingStep {
            name,
            phase,
            count: Arc::clone(count),
            fail,
        }
    }

    #[test]
    fn pipeline_builds_correctly() {
        let count = Arc::new(AtomicUsize::new(0));
        let pipeline = Pipeline::new()
            .with_step(step("Step1", RunPhase::Preparing, &count, false))
            .with_step(step("Step2", RunPhase::CopyingRs, &count, false));

        assert_eq!(pipeline.step_count(), 2);
        assert_eq!(pipeline.step_names(), vec!["Step1", "Step2"]);
    }

    #[test]
    fn runs_all_steps_and_ends_done() {
        let count = Arc::new(AtomicUsize::new(0));
        let pipeline = Pipeline::new()
            .with_step(step("A", RunPhase::Preparing, &count, false))
            .with_step(step("B", RunPhase::Stitching, &count, false));
        let (ctx, _events) = test_context();
        let mut state = RunState::new();

        let result = pipeline.run(&ctx, &mut state).unwrap();
        assert_eq!(result.total_steps(), 2);
        assert_eq!(count.load(Ordering::SeqCst), 2);
        assert_eq!(state.phase, RunPhase::Done);
    }

    #[test]
    fn failure_stops_remaining_steps() {
        let count = Arc::new(AtomicUsize::new(0));
        let pipeline = Pipeline::new()
            .with_step(step("A", RunPhase::CopyingRs, &count, true))
            .with_step(step("B", RunPhase::Stitching, &count, false));
        let (ctx, _events) = test_context();
        let mut state = RunState::new();

        let err = pipeline.run(&ctx, &mut state).unwrap_err();
        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert_eq!(state.phase, RunPhase::Error);
        match err {
            RunError::StepFailed { phase, step_name, .. } => {
                assert_eq!(phase, RunPhase::CopyingRs);
                assert_eq!(step_name, "A");
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
