//! Error types for the run pipeline.
//!
//! Errors carry context that chains through layers:
//! Run → Step → Operation → Detail

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::types::RunPhase;
use crate::copy::CopyError;
use crate::destination::DestinationError;
use crate::stitch::{StitchError, ToolError};

/// Coarse classification of a failed run, for the user-facing message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RunErrorKind {
    /// Bad or missing user input. The run never started.
    Validation,
    /// The destination tree could not be created.
    Preparation,
    /// A stitch input does not exist.
    MissingSourceFile,
    /// The external tool failed, or could not be located or downloaded.
    ToolInvocation,
    /// Copying an existing RS file failed.
    Copy,
}

impl RunErrorKind {
    /// Get display string for UI.
    pub fn as_str(&self) -> &'static str {
        match self {
            RunErrorKind::Validation => "validation",
            RunErrorKind::Preparation => "preparation",
            RunErrorKind::MissingSourceFile => "missing source file",
            RunErrorKind::ToolInvocation => "tool invocation",
            RunErrorKind::Copy => "copy",
        }
    }
}

/// Run request rejected before any work starts.
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error(transparent)]
    Destination(#[from] DestinationError),

    #[error("MS folder not found under source path: {}", .0.display())]
    MsFolderMissing(PathBuf),

    #[error("Enter both date and initials, or provide a custom output filename")]
    MissingFilename,
}

/// Top-level run error with step context.
#[derive(Error, Debug)]
pub enum RunError {
    /// The request failed validation; nothing was touched.
    #[error("{0}")]
    Validation(#[from] ValidationError),

    /// A step failed during execution.
    #[error("Run '{run_name}' failed at step '{step_name}': {source}")]
    StepFailed {
        run_name: String,
        step_name: String,
        phase: RunPhase,
        #[source]
        source: StepError,
    },
}

impl RunError {
    /// Create a step failed error.
    pub fn step_failed(
        run_name: impl Into<String>,
        step_name: impl Into<String>,
        phase: RunPhase,
        source: StepError,
    ) -> Self {
        Self::StepFailed {
            run_name: run_name.into(),
            step_name: step_name.into(),
            phase,
            source,
        }
    }

    /// Classify the failure.
    pub fn kind(&self) -> RunErrorKind {
        match self {
            RunError::Validation(_) => RunErrorKind::Validation,
            RunError::StepFailed { phase, source, .. } => match source {
                StepError::Preparation(_) => RunErrorKind::Preparation,
                StepError::Copy(_) => RunErrorKind::Copy,
                StepError::Stitch {
                    source: StitchError::MissingSourceFile { .. },
                    ..
                } => RunErrorKind::MissingSourceFile,
                StepError::Stitch { .. } | StepError::Tool(_) => RunErrorKind::ToolInvocation,
                StepError::InvalidInput(_) | StepError::InvalidOutput(_) => match phase {
                    RunPhase::Preparing => RunErrorKind::Preparation,
                    RunPhase::CopyingRs => RunErrorKind::Copy,
                    _ => RunErrorKind::ToolInvocation,
                },
            },
        }
    }

    /// One-line message for the user.
    pub fn user_message(&self) -> String {
        match self {
            RunError::Validation(e) => e.to_string(),
            RunError::StepFailed { source, .. } => source.to_string(),
        }
    }
}

/// Error from a pipeline step with operation context.
#[derive(Error, Debug)]
pub enum StepError {
    /// Input validation failed.
    #[error("Input validation failed: {0}")]
    InvalidInput(String),

    /// Output validation failed.
    #[error("Output validation failed: {0}")]
    InvalidOutput(String),

    /// Destination skeleton could not be created.
    #[error("Could not prepare destination: {0}")]
    Preparation(#[source] DestinationError),

    /// Copying an RS file failed.
    #[error("RS copy failed: {0}")]
    Copy(#[source] CopyError),

    /// The external tool could not be located or downloaded.
    #[error("Could not locate ffmpeg: {0}")]
    Tool(#[source] ToolError),

    /// One variant's stitch failed.
    #[error("MS stitch failed ({variant}): {source}")]
    Stitch {
        variant: String,
        #[source]
        source: StitchError,
    },
}

impl StepError {
    /// Create an invalid input error.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    /// Create an invalid output error.
    pub fn invalid_output(message: impl Into<String>) -> Self {
        Self::InvalidOutput(message.into())
    }

    /// Create a stitch error for a variant.
    pub fn stitch(variant: impl Into<String>, source: StitchError) -> Self {
        Self::Stitch {
            variant: variant.into(),
            source,
        }
    }
}

/// Result type for step operations.
pub type StepResult<T> = Result<T, StepError>;

/// Result type for run operations.
pub type RunResult<T> = Result<T, RunError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_clip_is_classified() {
        let err = RunError::step_failed(
            "Fall_Week_1",
            "Stitch",
            RunPhase::Stitching,
            StepError::stitch(
                "North",
                StitchError::MissingSourceFile {
                    path: PathBuf::from("/s/MS/a.mp4"),
                },
            ),
        );
        assert_eq!(err.kind(), RunErrorKind::MissingSourceFile);

        let msg = err.to_string();
        assert!(msg.contains("Fall_Week_1"));
        assert!(msg.contains("Stitch"));
        assert!(err.user_message().contains("/s/MS/a.mp4"));
    }

    #[test]
    fn tool_failure_is_classified() {
        let err = RunError::step_failed(
            "run",
            "Stitch",
            RunPhase::Stitching,
            StepError::stitch(
                "MS",
                StitchError::ToolFailed {
                    exit_code: Some(1),
                    message: "boom".into(),
                },
            ),
        );
        assert_eq!(err.kind(), RunErrorKind::ToolInvocation);
    }

    #[test]
    fn validation_is_classified() {
        let err = RunError::from(ValidationError::MissingFilename);
        assert_eq!(err.kind(), RunErrorKind::Validation);
        assert!(err.user_message().contains("date and initials"));
    }

    #[test]
    fn invalid_output_uses_phase() {
        let err = RunError::step_failed(
            "run",
            "Prepare",
            RunPhase::Preparing,
            StepError::invalid_output("PSAs/MS missing"),
        );
        assert_eq!(err.kind(), RunErrorKind::Preparation);
    }
}
