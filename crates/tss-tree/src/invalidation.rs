//! Style invalidation.
//!
//! A selector-relevant mutation (class, id, pseudo-class, children, attached
//! sheets) can change what matches not only the element itself but its
//! ancestors (`:has()`), its descendants (descendant and child combinators,
//! inheritance) and its later siblings (`+`, `~`, `:nth-child`). The
//! propagator conservatively marks all of them; the orchestrator then
//! re-resolves the marked set once per tick.
//!
//! Marking is idempotent and monotonic: a dirty element stays dirty until
//! it is resolved.

use crate::tree::{ElementTree, NodeId};

/// Per-event visited set: one stamp per arena slot plus a generation.
///
/// Starting an event bumps the generation, which invalidates every stamp
/// at once.
#[derive(Debug, Default)]
pub struct VisitedSet {
    stamps: Vec<u32>,
    generation: u32,
}

impl VisitedSet {
    /// Starts a new event.
    pub fn begin(&mut self) {
        self.generation = self.generation.wrapping_add(1);
        if self.generation == 0 {
            // Wrapped: old stamps could collide with the new generation.
            self.stamps.fill(0);
            self.generation = 1;
        }
    }

    /// Records `index`; returns `false` if it was already visited in this
    /// event.
    pub fn insert(&mut self, index: usize) -> bool {
        if index >= self.stamps.len() {
            self.stamps.resize(index + 1, 0);
        }
        if self.stamps[index] == self.generation {
            return false;
        }
        self.stamps[index] = self.generation;
        true
    }

    pub fn contains(&self, index: usize) -> bool {
        self.generation != 0 && self.stamps.get(index) == Some(&self.generation)
    }
}

impl ElementTree {
    /// Marks `target`, and optionally its ancestors and descendants, for
    /// re-resolution.
    pub fn style_selectors_changed(
        &mut self,
        target: NodeId,
        include_ancestors: bool,
        include_descendants: bool,
    ) {
        if !self.contains(target) {
            return;
        }
        self.visited.begin();

        let mut marked = 0;
        let mut visit = |tree: &mut Self, node: NodeId| {
            if tree.visited.insert(node.index()) && tree.mark_dirty(node) {
                marked += 1;
            }
        };

        visit(self, target);
        if include_ancestors {
            let ancestors: Vec<NodeId> = self.ancestors(target).collect();
            for ancestor in ancestors {
                visit(self, ancestor);
            }
        }
        if include_descendants {
            for descendant in self.descendants(target) {
                visit(self, descendant);
            }
        }

        log::trace!(
            "invalidate {target:?} (ancestors={include_ancestors}, descendants={include_descendants}): {marked} newly dirty"
        );
    }

    /// Invalidation for a change to the element's own class, id or state.
    ///
    /// Later siblings are included because `+` and `~` selectors look at
    /// earlier siblings.
    pub(crate) fn element_state_changed(&mut self, target: NodeId) {
        self.style_selectors_changed(target, true, true);

        let Some(parent) = self.parent(target) else {
            return;
        };
        let later: Vec<NodeId> = self
            .children(parent)
            .iter()
            .skip_while(|sibling| **sibling != target)
            .skip(1)
            .copied()
            .collect();
        for sibling in later {
            self.style_selectors_changed(sibling, false, true);
        }
    }

    /// Flags `node` dirty and registers it in its root's pending set.
    ///
    /// Returns `false` if it was already dirty or does not exist.
    pub(crate) fn mark_dirty(&mut self, node: NodeId) -> bool {
        let Some(root) = self.root_of(node) else {
            return false;
        };
        let Some(entry) = self.node_mut(node) else {
            return false;
        };
        if entry.dirty {
            return false;
        }
        entry.dirty = true;
        self.pending.entry(root).or_default().push(node);
        true
    }

    /// Elements waiting for re-resolution under `root`.
    pub fn pending_for(&self, root: NodeId) -> &[NodeId] {
        self.pending.get(&root).map_or(&[], Vec::as_slice)
    }

    /// Total number of pending registrations across all roots.
    pub fn pending_count(&self) -> usize {
        self.pending.values().map(Vec::len).sum()
    }
}
