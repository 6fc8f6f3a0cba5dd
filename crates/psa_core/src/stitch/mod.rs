//! Ordered MS clip stitching.
//!
//! This module provides:
//! - `StitchJob`: resolves a variant's clip order, validates every input and
//!   runs the external tool
//! - `manifest`: concat list rendering with path escaping
//! - `command`: tool arguments and console-less process spawning
//! - `ToolLocator`: tool discovery with a one-time download fallback
//!
//! Unlike the RS copy, a missing input is fatal: an output with a silently
//! dropped segment is worse than no output.

mod command;
mod executor;
pub mod manifest;
mod tool;

pub use command::{concat_args, format_command, hidden_command, EncodeSettings};
pub use executor::StitchJob;
pub use tool::{download_tool, platform_bin, ToolError, ToolLocator};

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors from a stitch job.
#[derive(Error, Debug)]
pub enum StitchError {
    /// An input clip does not exist. Raised before the tool is invoked.
    #[error("Missing source clip: {}", .path.display())]
    MissingSourceFile { path: PathBuf },

    /// The variant has no clips.
    #[error("No clips to stitch")]
    NoInputs,

    /// The tool could not be started.
    #[error("Failed to start {}: {source}", .tool.display())]
    Spawn {
        tool: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The tool exited non-zero. `message` is its trimmed stderr.
    #[error("{message}")]
    ToolFailed {
        exit_code: Option<i32>,
        message: String,
    },

    /// File I/O error.
    #[error("I/O error in {operation}: {source}")]
    Io {
        operation: String,
        #[source]
        source: io::Error,
    },
}

impl StitchError {
    /// Create an I/O error with context.
    pub fn io(operation: impl Into<String>, source: io::Error) -> Self {
        Self::Io {
            operation: operation.into(),
            source,
        }
    }
}

/// Result type for stitch operations.
pub type StitchResult<T> = Result<T, StitchError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_source_names_the_path() {
        let err = StitchError::MissingSourceFile {
            path: PathBuf::from("/src/MS/intro.mp4"),
        };
        assert_eq!(err.to_string(), "Missing source clip: /src/MS/intro.mp4");
    }

    #[test]
    fn tool_failure_shows_stderr() {
        let err = StitchError::ToolFailed {
            exit_code: Some(1),
            message: "Invalid data found when processing input".to_string(),
        };
        assert!(err.to_string().contains("Invalid data"));
    }
}
