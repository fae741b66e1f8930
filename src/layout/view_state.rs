use std::collections::HashSet;

use crate::models::entry::{Entry, EntryId};

/// Per-view navigation state: the focused node plus the set of nodes the
/// user has explicitly expanded past the base depth. Kept outside the tree
/// and keyed by scan-session ids, so it can never outlive the scan it
/// belongs to.
pub struct ViewState {
    pub focus: EntryId,
    expanded: HashSet<EntryId>,
}

impl ViewState {
    pub fn new(focus: EntryId) -> Self {
        Self {
            focus,
            expanded: HashSet::new(),
        }
    }

    /// Changing focus resets the expansion set: expansion is scoped to one
    /// view of the tree.
    pub fn set_focus(&mut self, focus: EntryId) {
        if self.focus != focus {
            self.focus = focus;
            self.expanded.clear();
        }
    }

    pub fn expand(&mut self, id: EntryId) {
        self.expanded.insert(id);
    }

    pub fn is_expanded(&self, id: EntryId) -> bool {
        self.expanded.contains(&id)
    }

    pub fn expanded(&self) -> &HashSet<EntryId> {
        &self.expanded
    }

    /// Collapses a node: removes its expansion and, transitively, the
    /// expansion of everything beneath it, even nodes never individually
    /// toggled off.
    pub fn collapse(&mut self, node: &Entry) {
        remove_subtree(&mut self.expanded, node);
    }
}

fn remove_subtree(expanded: &mut HashSet<EntryId>, node: &Entry) {
    expanded.remove(&node.id);
    for child in &node.children {
        remove_subtree(expanded, child);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn file(id: u64, name: &str, size: u64) -> Entry {
        Entry::file(EntryId(id), PathBuf::from(name), name.to_string(), size)
    }

    fn dir(id: u64, name: &str, children: Vec<Entry>) -> Entry {
        Entry::directory(EntryId(id), PathBuf::from(name), name.to_string(), children)
    }

    #[test]
    fn expand_and_collapse_roundtrip() {
        let node = dir(1, "d", vec![file(2, "f", 1)]);
        let mut view = ViewState::new(EntryId(0));

        assert!(!view.is_expanded(EntryId(1)));
        view.expand(EntryId(1));
        assert!(view.is_expanded(EntryId(1)));

        view.collapse(&node);
        assert!(!view.is_expanded(EntryId(1)));
    }

    #[test]
    fn collapsing_a_parent_collapses_every_expanded_descendant() {
        let grandchild = dir(3, "gc", vec![file(4, "f", 1)]);
        let child = dir(2, "c", vec![grandchild]);
        let parent = dir(1, "p", vec![child]);
        let sibling = dir(9, "s", vec![file(10, "g", 1)]);
        let root = dir(0, "root", vec![parent, sibling]);

        let mut view = ViewState::new(root.id);
        view.expand(EntryId(1));
        view.expand(EntryId(2));
        view.expand(EntryId(3));
        view.expand(EntryId(9));

        let parent_node = root.find(EntryId(1)).unwrap();
        view.collapse(parent_node);

        assert!(!view.is_expanded(EntryId(1)));
        assert!(!view.is_expanded(EntryId(2)));
        assert!(!view.is_expanded(EntryId(3)));
        // Unrelated subtree is untouched.
        assert!(view.is_expanded(EntryId(9)));
    }

    #[test]
    fn refocusing_resets_the_expansion_set() {
        let mut view = ViewState::new(EntryId(0));
        view.expand(EntryId(5));
        view.expand(EntryId(6));

        view.set_focus(EntryId(5));
        assert!(!view.is_expanded(EntryId(5)));
        assert!(!view.is_expanded(EntryId(6)));

        // Setting the same focus again is not a reset.
        view.expand(EntryId(7));
        view.set_focus(EntryId(5));
        assert!(view.is_expanded(EntryId(7)));
    }
}
