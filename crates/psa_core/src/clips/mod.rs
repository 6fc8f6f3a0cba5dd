//! Clip resolution, listing and selection state.
//!
//! This module provides:
//! - `ClipCategory`: RS (copy-only `.mov` + `.wav` companion) vs MS (stitchable `.mp4`)
//! - `SourceLayout`: maps a clip name to its expected files under the source root
//! - `list_clips`: sorted listing of a category folder that tolerates a missing folder
//! - `ClipSelection` / `OrderedSelection`: transient checkbox state for the listings

mod listing;
mod resolver;
mod selection;

pub use listing::{list_clips, ClipListing};
pub use resolver::{ClipCategory, ResolvedClip, SourceLayout};
pub use selection::{ClipSelection, OrderedSelection};

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors from reading clip folders.
#[derive(Error, Debug)]
pub enum ClipError {
    #[error("Failed to read clip folder {path}: {source}")]
    ReadDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Result type for clip operations.
pub type ClipResult<T> = Result<T, ClipError>;
