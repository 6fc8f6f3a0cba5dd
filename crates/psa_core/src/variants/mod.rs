//! Named stitch variants.
//!
//! This module provides:
//! - `Variant`: a display token plus an ordered list of MS clip names
//! - `VariantManager`: add/duplicate/delete/reorder/append operations and the
//!   append-target bookkeeping the UI needs
//!
//! Each non-empty variant becomes one stitched output per run.

mod manager;
mod types;

pub use manager::{AppendToggle, DeleteOutcome, VariantManager};
pub use types::{PrunedVariant, Variant};

use thiserror::Error;

/// Errors from variant operations. No mutation happens when one is returned.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VariantError {
    /// Creating a variant needs at least one selected clip.
    #[error("Select clips and order them before creating a version")]
    EmptySelection,

    /// Variant index does not exist.
    #[error("Version index {index} out of range ({len} versions)")]
    IndexOutOfRange { index: usize, len: usize },

    /// Entry position inside a variant does not exist.
    #[error("Position {position} out of range for version '{variant}' ({len} clips)")]
    PositionOutOfRange {
        variant: String,
        position: usize,
        len: usize,
    },
}

/// Result type for variant operations.
pub type VariantResult<T> = Result<T, VariantError>;
