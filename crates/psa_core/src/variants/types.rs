//! Variant data types.

use serde::{Deserialize, Serialize};

use crate::naming::DEFAULT_VARIANT_TOKEN;

/// One named stitch version.
///
/// Duplicate clip names are allowed in `order`; the clip simply plays twice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variant {
    /// Display token substituted into the output filename.
    pub name: String,
    /// Clip names in playback order.
    pub order: Vec<String>,
}

impl Variant {
    pub fn new(name: impl Into<String>, order: Vec<String>) -> Self {
        Self {
            name: name.into(),
            order,
        }
    }

    /// Trimmed name, falling back to `MS` when blank.
    pub fn effective_name(&self) -> &str {
        match self.name.trim() {
            "" => DEFAULT_VARIANT_TOKEN,
            name => name,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Order rendered as `a -> b -> c`, or `(none)`.
    pub fn summary(&self) -> String {
        if self.order.is_empty() {
            "(none)".to_string()
        } else {
            self.order.join(" -> ")
        }
    }
}

impl Default for Variant {
    fn default() -> Self {
        Self::new(DEFAULT_VARIANT_TOKEN, Vec::new())
    }
}

/// Clips dropped from one variant during a refresh.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrunedVariant {
    pub name: String,
    pub removed: Vec<String>,
}
