//! Selector matching against a live element tree.
//!
//! Matching runs right to left: the rightmost compound is tested against the
//! target first, then its [`Link`] is followed toward the root. Within one
//! compound the cheap filters (element name, id, classes, state bits) run
//! before anything that walks the tree.

use super::{Combinator, Link, PseudoClasses, SelectorArena, SelectorId, SelectorNode, Specificity};

/// The read-only view of an element the matcher and cascade need.
///
/// Implementations are cheap handles (an index plus a reference to the
/// tree), hence the `Copy` bound.
pub trait StyleTarget: Copy {
    /// Element name, compared case-insensitively.
    fn element_name(&self) -> &str;

    fn id(&self) -> Option<&str>;

    /// State pseudo-classes currently set on the element. Structural bits
    /// returned here are ignored; the matcher derives them from the tree.
    fn pseudo_classes(&self) -> PseudoClasses;

    /// Returns `true` if the element carries every class in `classes`.
    fn has_classes(&self, classes: &[String]) -> bool;

    fn parent(&self) -> Option<Self>;

    /// Children in document order.
    fn children(&self) -> impl Iterator<Item = Self>;

    /// 0-based position among the parent's children. Roots report 0.
    fn sibling_index(&self) -> usize;

    fn child_count(&self) -> usize {
        self.children().count()
    }
}

/// Tests the chain ending at `id` against `target`.
pub fn matches<T: StyleTarget>(arena: &SelectorArena, id: SelectorId, target: T) -> bool {
    let node = &arena[id];
    if !matches_compound(arena, node, target) {
        return false;
    }
    match &node.link {
        None => true,
        Some(link) => matches_link(arena, link, target),
    }
}

/// Tests a comma-separated group list: any member may match.
pub fn matches_any<T: StyleTarget>(arena: &SelectorArena, ids: &[SelectorId], target: T) -> bool {
    ids.iter().any(|id| matches(arena, *id, target))
}

/// Specificity of the chain ending at `id` as matched by `target`, or
/// `None` if it does not match.
///
/// A link with several targets (a nested block under a group list) counts
/// only the targets the element actually satisfied, taking the best path.
pub fn matched_specificity<T: StyleTarget>(
    arena: &SelectorArena,
    id: SelectorId,
    target: T,
) -> Option<Specificity> {
    let node = &arena[id];
    if node.uniform {
        return matches(arena, id, target).then_some(node.specificity);
    }
    if !matches_compound(arena, node, target) {
        return None;
    }
    let Some(link) = &node.link else {
        return Some(node.compound_specificity);
    };
    let best = |candidate: T| {
        link.targets
            .iter()
            .filter_map(|t| matched_specificity(arena, *t, candidate))
            .max()
    };
    let linked = match link.combinator {
        Combinator::Enclosing => best(target),
        Combinator::Child => target.parent().and_then(best),
        Combinator::Descendant => {
            let mut found = None;
            let mut ancestor = target.parent();
            while let Some(current) = ancestor {
                found = found.max(best(current));
                ancestor = current.parent();
            }
            found
        }
        Combinator::AdjacentSibling => {
            let index = target.sibling_index();
            match (target.parent(), index.checked_sub(1)) {
                (Some(parent), Some(previous)) => parent.children().nth(previous).and_then(best),
                _ => None,
            }
        }
        Combinator::GeneralSibling => {
            let index = target.sibling_index();
            target
                .parent()
                .and_then(|parent| parent.children().take(index).filter_map(best).max())
        }
    };
    linked.map(|linked| node.compound_specificity + linked)
}

fn matches_compound<T: StyleTarget>(arena: &SelectorArena, node: &SelectorNode, target: T) -> bool {
    if let Some(element) = &node.element {
        if !target.element_name().eq_ignore_ascii_case(element) {
            return false;
        }
    }
    if let Some(id) = &node.id {
        if target.id() != Some(id.as_str()) {
            return false;
        }
    }
    if !node.classes.is_empty() && !target.has_classes(&node.classes) {
        return false;
    }

    let state = node.pseudo & PseudoClasses::STATE;
    if !target.pseudo_classes().contains(state) {
        return false;
    }

    // Everything below walks the tree.
    let structural = node.pseudo & PseudoClasses::STRUCTURAL;
    if !structural.is_empty() && !structural_flags(target).contains(structural) {
        return false;
    }
    if let Some(nth) = node.nth_child {
        if !nth.matches(target.sibling_index() + 1) {
            return false;
        }
    }
    for has in &node.has {
        let found = if has.child_only {
            target.children().any(|child| matches(arena, has.selector, child))
        } else {
            any_descendant(target, |descendant| matches(arena, has.selector, descendant))
        };
        if !found {
            return false;
        }
    }
    node.not.iter().all(|not| !matches(arena, *not, target))
}

fn matches_link<T: StyleTarget>(arena: &SelectorArena, link: &Link, target: T) -> bool {
    let any_target = |candidate: T| matches_any(arena, &link.targets, candidate);

    match link.combinator {
        Combinator::Enclosing => any_target(target),
        Combinator::Child => target.parent().is_some_and(any_target),
        Combinator::Descendant => {
            let mut ancestor = target.parent();
            while let Some(current) = ancestor {
                if any_target(current) {
                    return true;
                }
                ancestor = current.parent();
            }
            false
        }
        Combinator::AdjacentSibling => {
            let index = target.sibling_index();
            match (target.parent(), index.checked_sub(1)) {
                (Some(parent), Some(previous)) => {
                    parent.children().nth(previous).is_some_and(any_target)
                }
                _ => false,
            }
        }
        Combinator::GeneralSibling => {
            let index = target.sibling_index();
            target
                .parent()
                .is_some_and(|parent| parent.children().take(index).any(any_target))
        }
    }
}

/// Computes the structural pseudo-classes of `target`.
///
/// A root has no siblings, so it is first, last and only child at once.
pub fn structural_flags<T: StyleTarget>(target: T) -> PseudoClasses {
    let mut flags = PseudoClasses::empty();
    if target.child_count() == 0 {
        flags |= PseudoClasses::EMPTY;
    }

    let (index, count) = match target.parent() {
        Some(parent) => (target.sibling_index(), parent.child_count()),
        None => (0, 1),
    };
    if index == 0 {
        flags |= PseudoClasses::FIRST_CHILD;
    }
    if index + 1 == count {
        flags |= PseudoClasses::LAST_CHILD;
    }
    if count == 1 {
        flags |= PseudoClasses::ONLY_CHILD;
    }
    flags
}

fn any_descendant<T: StyleTarget>(root: T, mut predicate: impl FnMut(T) -> bool) -> bool {
    let mut stack: Vec<T> = root.children().collect();
    while let Some(node) = stack.pop() {
        if predicate(node) {
            return true;
        }
        stack.extend(node.children());
    }
    false
}
