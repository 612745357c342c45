//! Arena-backed element tree.
//!
//! Elements live in a `Vec` and are addressed by [`NodeId`]. Every mutation
//! that can change which selectors match an element goes through
//! [`ElementTree::style_selectors_changed`], so the next
//! [`tick`](ElementTree::tick) re-resolves exactly the affected elements.
//!
//! Operations on ids that do not exist (or were removed) are no-ops and
//! report `false` / `None`.

use std::collections::BTreeMap;
use std::sync::Arc;

use smallvec::SmallVec;
use tss::parser::StyleSheet;
use tss::selector::{PseudoClasses, SelectorArena, StyleTarget, compile_selector, matches_any};
use tss::{ComputedStyle, ParseErrorKind, Styles};

use crate::invalidation::VisitedSet;

/// Index of an element in its [`ElementTree`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug)]
pub(crate) struct Node {
    pub(crate) name: String,
    pub(crate) id: Option<String>,
    pub(crate) classes: SmallVec<[String; 4]>,
    pub(crate) pseudo: PseudoClasses,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) sheets: Vec<Arc<StyleSheet>>,
    pub(crate) inline: Option<Styles>,
    /// `None` until the first resolution.
    pub(crate) style: Option<ComputedStyle>,
    pub(crate) fingerprint: Option<u64>,
    pub(crate) dirty: bool,
    pub(crate) layout_requested: bool,
}

impl Node {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            id: None,
            classes: SmallVec::new(),
            pseudo: PseudoClasses::empty(),
            parent: None,
            children: Vec::new(),
            sheets: Vec::new(),
            inline: None,
            style: None,
            fingerprint: None,
            dirty: false,
            layout_requested: false,
        }
    }
}

/// A mutable element tree that keeps computed styles up to date.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use tss::parser::parse_stylesheet;
/// use tss::types::RgbaColor;
/// use tss_tree::ElementTree;
///
/// let sheet = Arc::new(parse_stylesheet(".btn { color: red; }").unwrap());
/// let mut tree = ElementTree::new();
/// let root = tree.create_element("Screen");
/// let button = tree.create_element("Button");
/// tree.append_child(root, button);
/// tree.add_class(button, "btn");
/// tree.attach_sheet(root, sheet);
///
/// tree.tick();
/// let style = tree.computed_style(button).unwrap();
/// assert_eq!(style.color, RgbaColor::rgb(255, 0, 0));
/// ```
#[derive(Debug, Default)]
pub struct ElementTree {
    pub(crate) nodes: Vec<Option<Node>>,
    /// Pending re-resolution, keyed by the root that owned each element
    /// when it was marked.
    pub(crate) pending: BTreeMap<NodeId, Vec<NodeId>>,
    pub(crate) visited: VisitedSet,
    pub(crate) layout_requests: Vec<NodeId>,
}

impl ElementTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index()).and_then(Option::as_ref)
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.index()).and_then(Option::as_mut)
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.node(id).is_some()
    }

    /// Number of live elements.
    pub fn len(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Creates a detached element. It is dirty until its first resolution.
    pub fn create_element(&mut self, name: &str) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Some(Node::new(name)));
        self.mark_dirty(id);
        id
    }

    /// A read-only handle usable with the selector matcher.
    pub fn element(&self, id: NodeId) -> Option<NodeRef<'_>> {
        self.node(id).map(|_| NodeRef { tree: self, id })
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id)?.parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.node(id).map_or(&[], |node| node.children.as_slice())
    }

    /// Walks up to the element with no parent.
    pub fn root_of(&self, id: NodeId) -> Option<NodeId> {
        let mut current = id;
        self.node(id)?;
        while let Some(parent) = self.parent(current) {
            current = parent;
        }
        Some(current)
    }

    /// Number of ancestors; a root has depth 0.
    pub fn depth(&self, id: NodeId) -> usize {
        let mut depth = 0;
        let mut current = self.parent(id);
        while let Some(parent) = current {
            depth += 1;
            current = self.parent(parent);
        }
        depth
    }

    /// Ancestors from the parent up to the root.
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.parent(id), move |current| self.parent(*current))
    }

    /// Every element below `id`, depth first.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(id).iter().rev().copied().collect();
        while let Some(current) = stack.pop() {
            out.push(current);
            stack.extend(self.children(current).iter().rev().copied());
        }
        out
    }

    pub fn computed_style(&self, id: NodeId) -> Option<&ComputedStyle> {
        self.node(id)?.style.as_ref()
    }

    pub fn is_dirty(&self, id: NodeId) -> bool {
        self.node(id).is_some_and(|node| node.dirty)
    }

    pub fn classes(&self, id: NodeId) -> &[String] {
        self.node(id).map_or(&[], |node| node.classes.as_slice())
    }

    pub fn pseudo_classes(&self, id: NodeId) -> PseudoClasses {
        self.node(id).map_or(PseudoClasses::empty(), |node| node.pseudo)
    }

    // ========================================================================
    // Structure
    // ========================================================================

    /// Appends `child` as the last child of `parent`.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> bool {
        let index = self.children(parent).len();
        self.insert_child(parent, index, child)
    }

    /// Inserts `child` at `index` among `parent`'s children (clamped).
    ///
    /// A child that already has a parent is moved. Inserting an element
    /// under itself or one of its descendants is refused.
    pub fn insert_child(&mut self, parent: NodeId, index: usize, child: NodeId) -> bool {
        if !self.contains(parent) || !self.contains(child) || parent == child {
            return false;
        }
        if self.ancestors(parent).any(|ancestor| ancestor == child) {
            return false;
        }

        self.detach(child);
        let Some(node) = self.node_mut(parent) else {
            return false;
        };
        let index = index.min(node.children.len());
        node.children.insert(index, child);
        if let Some(node) = self.node_mut(child) {
            node.parent = Some(parent);
        }

        // Sibling positions, `:empty` and `:has()` all change.
        self.style_selectors_changed(parent, true, true);
        true
    }

    /// Detaches `id` from its parent; it becomes the root of its subtree.
    pub fn detach(&mut self, id: NodeId) -> bool {
        let Some(parent) = self.parent(id) else {
            return false;
        };
        if let Some(node) = self.node_mut(parent) {
            node.children.retain(|child| *child != id);
        }
        if let Some(node) = self.node_mut(id) {
            node.parent = None;
        }

        self.style_selectors_changed(parent, true, true);
        self.style_selectors_changed(id, false, true);
        true
    }

    /// Removes `id` and its whole subtree from the tree.
    pub fn remove(&mut self, id: NodeId) -> bool {
        if !self.contains(id) {
            return false;
        }
        self.detach(id);
        let mut doomed = self.descendants(id);
        doomed.push(id);
        for gone in doomed {
            self.nodes[gone.index()] = None;
        }
        let nodes = &self.nodes;
        self.layout_requests
            .retain(|request| nodes.get(request.index()).is_some_and(Option::is_some));
        true
    }

    // ========================================================================
    // Selector-relevant state
    // ========================================================================

    pub fn add_class(&mut self, id: NodeId, class: &str) -> bool {
        let Some(node) = self.node_mut(id) else {
            return false;
        };
        if node.classes.iter().any(|c| c == class) {
            return false;
        }
        node.classes.push(class.to_string());
        self.element_state_changed(id);
        true
    }

    pub fn remove_class(&mut self, id: NodeId, class: &str) -> bool {
        let Some(node) = self.node_mut(id) else {
            return false;
        };
        let before = node.classes.len();
        node.classes.retain(|c| c != class);
        if node.classes.len() == before {
            return false;
        }
        self.element_state_changed(id);
        true
    }

    /// Adds or removes `class`; returns whether it is now present.
    pub fn toggle_class(&mut self, id: NodeId, class: &str) -> bool {
        if self.classes(id).iter().any(|c| c == class) {
            self.remove_class(id, class);
            false
        } else {
            self.add_class(id, class)
        }
    }

    pub fn set_id(&mut self, id: NodeId, element_id: Option<&str>) -> bool {
        let Some(node) = self.node_mut(id) else {
            return false;
        };
        let element_id = element_id.map(str::to_string);
        if node.id == element_id {
            return false;
        }
        node.id = element_id;
        self.element_state_changed(id);
        true
    }

    /// Sets or clears state pseudo-class bits. Structural bits are derived
    /// from the tree and are ignored here.
    pub fn set_pseudo_class(&mut self, id: NodeId, flags: PseudoClasses, on: bool) -> bool {
        let flags = flags & PseudoClasses::STATE;
        let Some(node) = self.node_mut(id) else {
            return false;
        };
        let before = node.pseudo;
        node.pseudo.set(flags, on);
        if node.pseudo == before {
            return false;
        }
        self.element_state_changed(id);
        true
    }

    /// Attaches a shared stylesheet to `id`. It applies to `id` and every
    /// descendant.
    pub fn attach_sheet(&mut self, id: NodeId, sheet: Arc<StyleSheet>) -> bool {
        let Some(node) = self.node_mut(id) else {
            return false;
        };
        if node.sheets.iter().any(|s| Arc::ptr_eq(s, &sheet)) {
            return false;
        }
        node.sheets.push(sheet);
        self.style_selectors_changed(id, false, true);
        true
    }

    pub fn detach_sheet(&mut self, id: NodeId, sheet: &Arc<StyleSheet>) -> bool {
        let Some(node) = self.node_mut(id) else {
            return false;
        };
        let before = node.sheets.len();
        node.sheets.retain(|s| !Arc::ptr_eq(s, sheet));
        if node.sheets.len() == before {
            return false;
        }
        self.style_selectors_changed(id, false, true);
        true
    }

    /// Replaces the element's inline style.
    pub fn set_inline_style(&mut self, id: NodeId, styles: Option<Styles>) -> bool {
        let Some(node) = self.node_mut(id) else {
            return false;
        };
        node.inline = styles;
        self.style_selectors_changed(id, false, false);
        true
    }

    /// Sheets visible to `id`: its own, then each ancestor's.
    pub fn visible_sheets(&self, id: NodeId) -> Vec<Arc<StyleSheet>> {
        std::iter::once(id)
            .chain(self.ancestors(id))
            .filter_map(|node| self.node(node))
            .flat_map(|node| node.sheets.iter().cloned())
            .collect()
    }

    /// Finds every element in the subtree of `root` (inclusive) matching
    /// `selector`.
    pub fn query_all(&self, root: NodeId, selector: &str) -> Result<Vec<NodeId>, ParseErrorKind> {
        let mut arena = SelectorArena::new();
        let ids = compile_selector(&mut arena, selector)?;
        if !self.contains(root) {
            return Ok(Vec::new());
        }
        Ok(std::iter::once(root)
            .chain(self.descendants(root))
            .filter(|node| {
                self.element(*node)
                    .is_some_and(|element| matches_any(&arena, &ids, element))
            })
            .collect())
    }

    /// First match of [`query_all`](Self::query_all) in document order.
    pub fn query_one(&self, root: NodeId, selector: &str) -> Result<Option<NodeId>, ParseErrorKind> {
        Ok(self.query_all(root, selector)?.into_iter().next())
    }
}

/// A read-only handle to one element, implementing [`StyleTarget`].
#[derive(Clone, Copy, Debug)]
pub struct NodeRef<'a> {
    tree: &'a ElementTree,
    id: NodeId,
}

impl<'a> NodeRef<'a> {
    pub fn node_id(&self) -> NodeId {
        self.id
    }

    fn node(&self) -> Option<&'a Node> {
        self.tree.node(self.id)
    }
}

impl StyleTarget for NodeRef<'_> {
    fn element_name(&self) -> &str {
        self.node().map_or("", |node| node.name.as_str())
    }

    fn id(&self) -> Option<&str> {
        self.node()?.id.as_deref()
    }

    fn pseudo_classes(&self) -> PseudoClasses {
        self.tree.pseudo_classes(self.id)
    }

    fn has_classes(&self, classes: &[String]) -> bool {
        let own = self.tree.classes(self.id);
        classes.iter().all(|class| own.contains(class))
    }

    fn parent(&self) -> Option<Self> {
        let parent = self.tree.parent(self.id)?;
        self.tree.element(parent)
    }

    fn children(&self) -> impl Iterator<Item = Self> {
        let tree = self.tree;
        tree.children(self.id)
            .iter()
            .filter_map(move |child| tree.element(*child))
    }

    fn sibling_index(&self) -> usize {
        self.tree
            .parent(self.id)
            .and_then(|parent| self.tree.children(parent).iter().position(|c| *c == self.id))
            .unwrap_or(0)
    }

    fn child_count(&self) -> usize {
        self.tree.children(self.id).len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_structure_operations() {
        let mut tree = ElementTree::new();
        let root = tree.create_element("Screen");
        let a = tree.create_element("A");
        let b = tree.create_element("B");
        let c = tree.create_element("C");

        assert!(tree.append_child(root, a));
        assert!(tree.append_child(root, c));
        assert!(tree.insert_child(root, 1, b));
        assert_eq!(tree.children(root), &[a, b, c]);
        assert_eq!(tree.depth(b), 1);
        assert_eq!(tree.root_of(b), Some(root));

        assert!(tree.detach(b));
        assert_eq!(tree.children(root), &[a, c]);
        assert_eq!(tree.root_of(b), Some(b));
    }

    #[test]
    fn test_refuses_cycles() {
        let mut tree = ElementTree::new();
        let root = tree.create_element("Root");
        let child = tree.create_element("Child");
        tree.append_child(root, child);
        assert!(!tree.append_child(child, root));
        assert!(!tree.append_child(child, child));
    }

    #[test]
    fn test_unknown_ids_are_no_ops() {
        let mut tree = ElementTree::new();
        let root = tree.create_element("Root");
        tree.remove(root);

        assert!(!tree.add_class(root, "x"));
        assert!(!tree.set_id(root, Some("x")));
        assert!(!tree.set_pseudo_class(root, PseudoClasses::HOVER, true));
        assert!(!tree.append_child(root, root));
        assert!(tree.computed_style(root).is_none());
        assert!(tree.element(root).is_none());
        assert!(tree.is_empty());
    }

    #[test]
    fn test_sibling_index_and_child_count() {
        let mut tree = ElementTree::new();
        let root = tree.create_element("Root");
        let items: Vec<_> = (0..3).map(|_| tree.create_element("Item")).collect();
        for item in &items {
            tree.append_child(root, *item);
        }
        let last = tree.element(items[2]).unwrap();
        assert_eq!(last.sibling_index(), 2);
        assert_eq!(tree.element(root).unwrap().child_count(), 3);
    }

    #[test]
    fn test_query_all() {
        let mut tree = ElementTree::new();
        let root = tree.create_element("Screen");
        let a = tree.create_element("Button");
        let b = tree.create_element("Button");
        tree.append_child(root, a);
        tree.append_child(root, b);
        tree.add_class(b, "primary");

        assert_eq!(tree.query_all(root, "Button").unwrap(), vec![a, b]);
        assert_eq!(tree.query_one(root, ".primary").unwrap(), Some(b));
        assert!(tree.query_all(root, "Button:bogus").is_err());
    }
}
