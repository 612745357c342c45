//! Per-tick style resolution.
//!
//! [`ElementTree::tick`] drains every pending set, parents before children,
//! and runs the cascade for each dirty element. An element whose inherited
//! properties changed pulls its children into the same tick, so a tick
//! always leaves the tree consistent.

use std::collections::BTreeSet;

use tss::cascade::{CascadeContext, build_final};
use tss::parser::Keyframes;

use crate::tree::{ElementTree, NodeId};

/// What one [`tick`](ElementTree::tick) did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Every element the cascade ran for, in resolution order.
    pub resolved: Vec<NodeId>,
    /// The subset whose computed style changed.
    pub changed: Vec<NodeId>,
}

impl TickReport {
    pub fn is_empty(&self) -> bool {
        self.resolved.is_empty()
    }
}

impl ElementTree {
    /// Resolves every dirty element.
    pub fn tick(&mut self) -> TickReport {
        let pending = std::mem::take(&mut self.pending);
        let mut queue: BTreeSet<(usize, NodeId)> = pending
            .into_values()
            .flatten()
            .filter(|node| self.is_dirty(*node))
            .map(|node| (self.depth(node), node))
            .collect();

        let mut report = TickReport::default();

        while let Some((_, node)) = queue.pop_first() {
            if !self.is_dirty(node) {
                continue;
            }
            let Some(resolved) = self.resolve_one(node) else {
                continue;
            };
            report.resolved.push(node);

            let Some(entry) = self.node_mut(node) else {
                continue;
            };
            let inherited_changed = entry.style.as_ref().is_none_or(|old| {
                old.inherited_fingerprint() != resolved.style.inherited_fingerprint()
            });
            let request_layout = resolved.changed && !entry.layout_requested;
            entry.style = Some(resolved.style);
            entry.fingerprint = Some(resolved.fingerprint);
            entry.dirty = false;
            entry.layout_requested |= request_layout;

            if resolved.changed {
                report.changed.push(node);
            }
            if request_layout {
                self.layout_requests.push(node);
            }

            if inherited_changed {
                let depth = self.depth(node) + 1;
                let children = self.children(node).to_vec();
                for child in children {
                    if let Some(child_entry) = self.node_mut(child) {
                        child_entry.dirty = true;
                        queue.insert((depth, child));
                    }
                }
            }
        }

        log::debug!(
            "style tick: {} resolved, {} changed",
            report.resolved.len(),
            report.changed.len()
        );
        report
    }

    fn resolve_one(&self, node: NodeId) -> Option<tss::Resolved> {
        let element = self.element(node)?;
        let entry = self.node(node)?;
        let sheets = self.visible_sheets(node);
        let parent_style = self.parent(node).and_then(|parent| self.computed_style(parent));

        let context = CascadeContext {
            sheets: &sheets,
            inline: entry.inline.as_ref(),
            parent: parent_style,
            previous_fingerprint: entry.fingerprint,
        };
        let resolved = build_final(element, &context);

        log::trace!(
            "CASCADE: element='{}' classes={:?} states={:?} -> color={} changed={}",
            entry.name,
            entry.classes,
            entry.pseudo,
            resolved.style.color,
            resolved.changed
        );
        Some(resolved)
    }

    /// Elements whose box-model inputs changed since the last call.
    pub fn take_layout_requests(&mut self) -> Vec<NodeId> {
        let requests = std::mem::take(&mut self.layout_requests);
        for node in &requests {
            if let Some(entry) = self.node_mut(*node) {
                entry.layout_requested = false;
            }
        }
        requests
    }

    /// Looks up `@keyframes name` for `node`.
    ///
    /// The element's own sheets are searched first, then each ancestor's;
    /// at one element, the most recently attached sheet wins.
    pub fn keyframes_for(&self, node: NodeId, name: &str) -> Option<&Keyframes> {
        std::iter::once(node)
            .chain(self.ancestors(node))
            .filter_map(|id| self.node(id))
            .flat_map(|entry| entry.sheets.iter().rev())
            .find_map(|sheet| sheet.keyframes(name))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use tss::parser::parse_stylesheet;
    use tss::types::RgbaColor;

    use super::*;

    #[test]
    fn test_new_elements_resolve_on_first_tick() {
        let mut tree = ElementTree::new();
        let root = tree.create_element("Root");
        let child = tree.create_element("Child");
        tree.append_child(root, child);

        let report = tree.tick();
        assert_eq!(report.resolved, vec![root, child]);
        assert!(tree.computed_style(child).is_some());
        assert!(!tree.is_dirty(child));

        assert!(tree.tick().is_empty());
    }

    #[test]
    fn test_inherited_change_reaches_clean_children() {
        let sheet = Arc::new(parse_stylesheet("Root.dark { color: white; }").unwrap());
        let mut tree = ElementTree::new();
        let root = tree.create_element("Root");
        let child = tree.create_element("Child");
        tree.append_child(root, child);
        tree.attach_sheet(root, sheet);
        tree.tick();

        // Only the root is marked for an inline change; the child follows
        // because `color` inherits.
        tree.set_inline_style(
            root,
            Some(tss::Styles {
                color: Some(RgbaColor::rgb(1, 2, 3)),
                ..Default::default()
            }),
        );
        let report = tree.tick();
        assert_eq!(report.resolved, vec![root, child]);
        assert_eq!(tree.computed_style(child).unwrap().color, RgbaColor::rgb(1, 2, 3));
    }

    #[test]
    fn test_layout_requests_are_taken_once() {
        let mut tree = ElementTree::new();
        let root = tree.create_element("Root");
        tree.tick();
        assert_eq!(tree.take_layout_requests(), vec![root]);
        assert!(tree.take_layout_requests().is_empty());
    }

    #[test]
    fn test_keyframes_prefer_nearest_sheet() {
        let outer = Arc::new(
            parse_stylesheet("@keyframes pulse { from { opacity: 0; } to { opacity: 1; } }").unwrap(),
        );
        let inner =
            Arc::new(parse_stylesheet("@keyframes pulse { 50% { opacity: 0.5; } }").unwrap());
        let mut tree = ElementTree::new();
        let root = tree.create_element("Root");
        let child = tree.create_element("Child");
        tree.append_child(root, child);
        tree.attach_sheet(root, outer);

        assert_eq!(tree.keyframes_for(child, "pulse").unwrap().frames.len(), 2);
        tree.attach_sheet(child, inner);
        assert_eq!(tree.keyframes_for(child, "pulse").unwrap().frames.len(), 1);
        assert_eq!(tree.keyframes_for(root, "pulse").unwrap().frames.len(), 2);
        assert!(tree.keyframes_for(child, "spin").is_none());
    }
}
