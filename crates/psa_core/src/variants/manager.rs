//! In-memory variant list with append-target tracking.

use std::collections::HashSet;

use super::types::{PrunedVariant, Variant};
use super::{VariantError, VariantResult};
use crate::clips::OrderedSelection;
use crate::naming::DEFAULT_VARIANT_TOKEN;

/// Result of deleting a variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteOutcome {
    /// The variant that was removed.
    pub removed: Variant,
    /// The deleted variant was the append target, so append mode ended.
    /// The caller should discard its pending selection.
    pub append_cancelled: bool,
}

/// Result of [`VariantManager::toggle_append`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppendToggle {
    /// Append mode started for this index.
    Started(usize),
    /// Append mode finished; this many clips were appended.
    Finished { index: usize, appended: usize },
}

/// Ordered list of variants plus the index currently targeted for append.
#[derive(Debug, Clone, Default)]
pub struct VariantManager {
    variants: Vec<Variant>,
    append_target: Option<usize>,
}

impl VariantManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn variants(&self) -> &[Variant] {
        &self.variants
    }

    pub fn get(&self, index: usize) -> Option<&Variant> {
        self.variants.get(index)
    }

    pub fn len(&self) -> usize {
        self.variants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variants.is_empty()
    }

    /// Index currently targeted for append, if any.
    pub fn append_target(&self) -> Option<usize> {
        self.append_target
    }

    fn check_index(&self, index: usize) -> VariantResult<()> {
        if index < self.variants.len() {
            Ok(())
        } else {
            Err(VariantError::IndexOutOfRange {
                index,
                len: self.variants.len(),
            })
        }
    }

    /// Create a variant named `MS` from the current selection order.
    ///
    /// Ends any append mode. Returns the new index.
    pub fn add(&mut self, selection_order: Vec<String>) -> VariantResult<usize> {
        if selection_order.is_empty() {
            return Err(VariantError::EmptySelection);
        }
        self.variants
            .push(Variant::new(DEFAULT_VARIANT_TOKEN, selection_order));
        self.append_target = None;
        Ok(self.variants.len() - 1)
    }

    /// Insert a copy of the variant right after it. Returns the copy's index.
    pub fn duplicate(&mut self, index: usize) -> VariantResult<usize> {
        self.check_index(index)?;
        let copy = self.variants[index].clone();
        self.variants.insert(index + 1, copy);
        if let Some(target) = self.append_target {
            if target > index {
                self.append_target = Some(target + 1);
            }
        }
        Ok(index + 1)
    }

    /// Remove a variant and re-index the append target.
    ///
    /// A target equal to `index` is cleared, a greater target shifts down by
    /// one, and a smaller target is untouched.
    pub fn delete(&mut self, index: usize) -> VariantResult<DeleteOutcome> {
        self.check_index(index)?;
        let removed = self.variants.remove(index);

        let mut append_cancelled = false;
        self.append_target = match self.append_target {
            Some(target) if target == index => {
                append_cancelled = true;
                None
            }
            Some(target) if target > index => Some(target - 1),
            other => other,
        };

        Ok(DeleteOutcome {
            removed,
            append_cancelled,
        })
    }

    /// Extend a variant's order with more clips.
    pub fn append_to_existing(&mut self, index: usize, additional: &[String]) -> VariantResult<()> {
        self.check_index(index)?;
        self.variants[index].order.extend_from_slice(additional);
        Ok(())
    }

    /// Replace a variant's order wholesale.
    pub fn reorder(&mut self, index: usize, new_order: Vec<String>) -> VariantResult<()> {
        self.check_index(index)?;
        self.variants[index].order = new_order;
        Ok(())
    }

    /// Set the display token of a variant.
    pub fn rename(&mut self, index: usize, name: impl Into<String>) -> VariantResult<()> {
        self.check_index(index)?;
        self.variants[index].name = name.into();
        Ok(())
    }

    fn check_position(&self, index: usize, position: usize) -> VariantResult<()> {
        let variant = &self.variants[index];
        if position < variant.order.len() {
            Ok(())
        } else {
            Err(VariantError::PositionOutOfRange {
                variant: variant.effective_name().to_string(),
                position,
                len: variant.order.len(),
            })
        }
    }

    /// Move one clip inside a variant's order.
    pub fn move_entry(&mut self, index: usize, from: usize, to: usize) -> VariantResult<()> {
        self.check_index(index)?;
        self.check_position(index, from)?;
        self.check_position(index, to)?;
        if from != to {
            let order = &mut self.variants[index].order;
            let clip = order.remove(from);
            order.insert(to, clip);
        }
        Ok(())
    }

    /// Remove one clip from a variant's order. Returns the removed name.
    pub fn remove_entry(&mut self, index: usize, position: usize) -> VariantResult<String> {
        self.check_index(index)?;
        self.check_position(index, position)?;
        Ok(self.variants[index].order.remove(position))
    }

    /// Start append mode for `index`, or finish it if already targeted.
    ///
    /// Starting clears `selection` so the user picks the clips to append.
    /// Finishing appends the selection order to the variant and clears it.
    pub fn toggle_append(
        &mut self,
        index: usize,
        selection: &mut OrderedSelection,
    ) -> VariantResult<AppendToggle> {
        self.check_index(index)?;

        if self.append_target == Some(index) {
            let additional = selection.take();
            self.variants[index].order.extend_from_slice(&additional);
            self.append_target = None;
            return Ok(AppendToggle::Finished {
                index,
                appended: additional.len(),
            });
        }

        selection.clear();
        self.append_target = Some(index);
        Ok(AppendToggle::Started(index))
    }

    /// Drop clip names that are no longer available from every variant.
    ///
    /// Returns one entry per variant that lost clips.
    pub fn prune_missing(&mut self, available: &[String]) -> Vec<PrunedVariant> {
        let keep: HashSet<&str> = available.iter().map(String::as_str).collect();
        let mut pruned = Vec::new();

        for variant in &mut self.variants {
            let removed: Vec<String> = variant
                .order
                .iter()
                .filter(|name| !keep.contains(name.as_str()))
                .cloned()
                .collect();
            if removed.is_empty() {
                continue;
            }
            variant.order.retain(|name| keep.contains(name.as_str()));
            pruned.push(PrunedVariant {
                name: variant.effective_name().to_string(),
                removed,
            });
        }
        pruned
    }

    /// Variants to stitch for a run, in creation order.
    ///
    /// With no variants defined, the pending selection order becomes one
    /// implicit `MS` variant. Names are normalized and empty variants dropped.
    pub fn run_targets(&self, pending_order: &[String]) -> Vec<Variant> {
        if self.variants.is_empty() {
            if pending_order.is_empty() {
                return Vec::new();
            }
            return vec![Variant::new(DEFAULT_VARIANT_TOKEN, pending_order.to_vec())];
        }

        self.variants
            .iter()
            .filter(|v| !v.is_empty())
            .map(|v| Variant::new(v.effective_name(), v.order.clone()))
            .collect()
    }
}
