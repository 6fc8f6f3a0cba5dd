//! Transient checkbox state for the clip listings.

use std::collections::{BTreeSet, HashSet};

/// Unordered selection (RS listing).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClipSelection {
    names: BTreeSet<String>,
}

impl ClipSelection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flip the checked state of `name`. Returns the new state.
    pub fn toggle(&mut self, name: &str) -> bool {
        if self.names.remove(name) {
            false
        } else {
            self.names.insert(name.to_string());
            true
        }
    }

    pub fn set(&mut self, name: &str, checked: bool) {
        if checked {
            self.names.insert(name.to_string());
        } else {
            self.names.remove(name);
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Selected names in sorted order.
    pub fn names(&self) -> Vec<String> {
        self.names.iter().cloned().collect()
    }

    pub fn clear(&mut self) {
        self.names.clear();
    }

    /// Drop names not present in `available`. Returns the dropped names.
    pub fn prune(&mut self, available: &[String]) -> Vec<String> {
        let keep: HashSet<&str> = available.iter().map(String::as_str).collect();
        let removed: Vec<String> = self
            .names
            .iter()
            .filter(|n| !keep.contains(n.as_str()))
            .cloned()
            .collect();
        for name in &removed {
            self.names.remove(name);
        }
        removed
    }
}

/// Selection that remembers the order in which names were checked (MS listing).
///
/// The order seeds a new variant or is appended to an existing one, after
/// which the selection is reset with [`OrderedSelection::take`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderedSelection {
    order: Vec<String>,
}

impl OrderedSelection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check `name` (appending it to the order) or uncheck it. Returns the new state.
    pub fn toggle(&mut self, name: &str) -> bool {
        if let Some(pos) = self.order.iter().position(|n| n == name) {
            self.order.remove(pos);
            false
        } else {
            self.order.push(name.to_string());
            true
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.order.iter().any(|n| n == name)
    }

    /// 1-based position of `name` in check order, for display.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.order.iter().position(|n| n == name).map(|i| i + 1)
    }

    pub fn order(&self) -> &[String] {
        &self.order
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn clear(&mut self) {
        self.order.clear();
    }

    /// Consume the current order, leaving the selection empty.
    pub fn take(&mut self) -> Vec<String> {
        std::mem::take(&mut self.order)
    }

    /// Drop names not present in `available`. Returns the dropped names.
    pub fn prune(&mut self, available: &[String]) -> Vec<String> {
        let keep: HashSet<&str> = available.iter().map(String::as_str).collect();
        let mut removed = Vec::new();
        self.order.retain(|n| {
            let present = keep.contains(n.as_str());
            if !present {
                removed.push(n.clone());
            }
            present
        });
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn clip_selection_toggle_and_sorted_names() {
        let mut sel = ClipSelection::new();
        assert!(sel.toggle("b"));
        assert!(sel.toggle("a"));
        assert!(!sel.toggle("b"));
        sel.set("c", true);

        assert_eq!(sel.names(), names(&["a", "c"]));
        assert_eq!(sel.len(), 2);
    }

    #[test]
    fn ordered_selection_keeps_check_order() {
        let mut sel = OrderedSelection::new();
        sel.toggle("z");
        sel.toggle("a");
        sel.toggle("m");
        sel.toggle("a");
        sel.toggle("a");

        assert_eq!(sel.order(), names(&["z", "m", "a"]).as_slice());
        assert_eq!(sel.position("a"), Some(3));
        assert_eq!(sel.position("q"), None);
    }

    #[test]
    fn take_resets_selection() {
        let mut sel = OrderedSelection::new();
        sel.toggle("one");
        sel.toggle("two");

        assert_eq!(sel.take(), names(&["one", "two"]));
        assert!(sel.is_empty());
    }

    #[test]
    fn prune_reports_removed_names() {
        let available = names(&["a", "c"]);

        let mut ordered = OrderedSelection::new();
        ordered.toggle("c");
        ordered.toggle("b");
        ordered.toggle("a");
        assert_eq!(ordered.prune(&available), names(&["b"]));
        assert_eq!(ordered.order(), names(&["c", "a"]).as_slice());

        let mut plain = ClipSelection::new();
        plain.set("a", true);
        plain.set("x", true);
        assert_eq!(plain.prune(&available), names(&["x"]));
        assert_eq!(plain.names(), names(&["a"]));
    }
}
