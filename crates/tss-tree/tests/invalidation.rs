use std::sync::Arc;

use tss::PseudoClasses;
use tss::parser::parse_stylesheet;
use tss_tree::{ElementTree, NodeId};

/// root > (a > a1, b, c)
fn small_tree() -> (ElementTree, [NodeId; 5]) {
    let mut tree = ElementTree::new();
    let root = tree.create_element("Root");
    let a = tree.create_element("A");
    let a1 = tree.create_element("A1");
    let b = tree.create_element("B");
    let c = tree.create_element("C");
    tree.append_child(root, a);
    tree.append_child(a, a1);
    tree.append_child(root, b);
    tree.append_child(root, c);
    tree.tick();
    (tree, [root, a, a1, b, c])
}

#[test]
fn test_tick_clears_every_pending_registration() {
    let (tree, nodes) = small_tree();
    assert_eq!(tree.pending_count(), 0);
    assert!(nodes.iter().all(|node| !tree.is_dirty(*node)));
}

#[test]
fn test_selector_change_walks_requested_directions() {
    let (mut tree, [root, a, a1, b, c]) = small_tree();

    tree.style_selectors_changed(a, false, false);
    assert!(tree.is_dirty(a));
    assert!(!tree.is_dirty(root) && !tree.is_dirty(a1));
    tree.tick();

    tree.style_selectors_changed(a, true, false);
    assert!(tree.is_dirty(a) && tree.is_dirty(root));
    assert!(!tree.is_dirty(a1) && !tree.is_dirty(b));
    tree.tick();

    tree.style_selectors_changed(a, false, true);
    assert!(tree.is_dirty(a) && tree.is_dirty(a1));
    assert!(!tree.is_dirty(root) && !tree.is_dirty(c));
}

#[test]
fn test_repeated_invalidation_registers_once() {
    let (mut tree, [root, a, ..]) = small_tree();

    tree.add_class(a, "one");
    let after_first = tree.pending_count();
    tree.add_class(a, "two");
    tree.set_pseudo_class(a, PseudoClasses::FOCUS, true);
    tree.style_selectors_changed(a, true, true);

    assert_eq!(tree.pending_count(), after_first);
    let mut pending = tree.pending_for(root).to_vec();
    pending.sort();
    pending.dedup();
    assert_eq!(pending.len(), after_first);
}

#[test]
fn test_state_change_reaches_later_siblings_only() {
    let (mut tree, [root, a, a1, b, c]) = small_tree();

    tree.toggle_class(b, "active");
    assert!(tree.is_dirty(b) && tree.is_dirty(root));
    assert!(tree.is_dirty(c));
    assert!(!tree.is_dirty(a) && !tree.is_dirty(a1));
}

#[test]
fn test_structural_pseudo_bits_cannot_be_set() {
    let (mut tree, [_, a, ..]) = small_tree();
    assert!(!tree.set_pseudo_class(a, PseudoClasses::FIRST_CHILD, true));
    assert!(!tree.is_dirty(a));
    assert!(tree.set_pseudo_class(a, PseudoClasses::HOVER | PseudoClasses::FIRST_CHILD, true));
    assert_eq!(tree.pseudo_classes(a), PseudoClasses::HOVER);
}

#[test]
fn test_moving_a_subtree_dirties_both_parents() {
    let (mut tree, [root, a, a1, b, _]) = small_tree();

    assert!(tree.append_child(b, a1));
    assert!(tree.is_dirty(a));
    assert!(tree.is_dirty(b) && tree.is_dirty(a1) && tree.is_dirty(root));
    assert_eq!(tree.parent(a1), Some(b));
    assert!(tree.children(a).is_empty());
}

#[test]
fn test_cycles_are_refused() {
    let (mut tree, [root, a, a1, ..]) = small_tree();
    assert!(!tree.append_child(a1, root));
    assert!(!tree.append_child(a1, a));
    assert!(!tree.append_child(a, a));
    assert_eq!(tree.pending_count(), 0);
}

#[test]
fn test_detached_subtree_pends_under_new_root() {
    let (mut tree, [root, a, a1, ..]) = small_tree();
    tree.detach(a);
    assert_eq!(tree.root_of(a1), Some(a));
    assert!(tree.pending_for(a).contains(&a));
    assert!(tree.pending_for(a).contains(&a1));
    assert!(tree.pending_for(root).contains(&root));

    let report = tree.tick();
    assert!(report.resolved.contains(&a1));
    assert_eq!(tree.pending_count(), 0);
}

#[test]
fn test_removed_elements_are_skipped() {
    let (mut tree, [root, a, a1, ..]) = small_tree();
    tree.add_class(a1, "x");
    assert!(tree.remove(a));

    let report = tree.tick();
    assert!(!report.resolved.contains(&a));
    assert!(!report.resolved.contains(&a1));
    assert!(report.resolved.contains(&root));
    assert!(!tree.contains(a1));
    assert!(!tree.add_class(a1, "y"));
    assert_eq!(tree.len(), 3);
}

#[test]
fn test_sheet_attach_dirties_subtree() {
    let (mut tree, [root, a, a1, b, _]) = small_tree();
    let sheet = Arc::new(parse_stylesheet("A1 { color: red; }").unwrap());

    assert!(tree.attach_sheet(a, sheet.clone()));
    assert!(!tree.attach_sheet(a, sheet));
    assert!(tree.is_dirty(a) && tree.is_dirty(a1));
    assert!(!tree.is_dirty(root) && !tree.is_dirty(b));
}

#[test]
fn test_query_uses_live_state() {
    let (mut tree, [root, a, a1, b, c]) = small_tree();
    tree.add_class(b, "pick");
    tree.set_pseudo_class(c, PseudoClasses::HOVER, true);

    assert_eq!(tree.query_all(root, ".pick, :hover").unwrap(), vec![b, c]);
    assert_eq!(tree.query_one(root, "Root > A > A1").unwrap(), Some(a1));
    assert_eq!(tree.query_one(root, "A:empty").unwrap(), None);
    assert_eq!(tree.query_all(a, "*").unwrap(), vec![a, a1]);
    assert!(tree.query_all(root, "A:bogus").is_err());
}
