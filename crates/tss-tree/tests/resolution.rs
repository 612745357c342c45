use std::sync::Arc;

use tss::parser::parse_stylesheet;
use tss::types::RgbaColor;
use tss::{PseudoClasses, Styles};
use tss_tree::{ElementTree, NodeId};

const RED: RgbaColor = RgbaColor::rgb(255, 0, 0);
const GREEN: RgbaColor = RgbaColor::rgb(0, 128, 0);
const BLUE: RgbaColor = RgbaColor::rgb(0, 0, 255);
const BLACK: RgbaColor = RgbaColor::rgb(0, 0, 0);

fn sheet(source: &str) -> Arc<tss::parser::StyleSheet> {
    Arc::new(parse_stylesheet(source).expect("stylesheet should parse"))
}

fn color(tree: &ElementTree, node: NodeId) -> RgbaColor {
    tree.computed_style(node).expect("resolved").color
}

/// Screen > [Button ...] with `css` attached to the screen.
fn screen_with(css: &str, buttons: usize) -> (ElementTree, NodeId, Vec<NodeId>) {
    let mut tree = ElementTree::new();
    let screen = tree.create_element("Screen");
    let children = (0..buttons)
        .map(|_| {
            let button = tree.create_element("Button");
            tree.append_child(screen, button);
            button
        })
        .collect();
    tree.attach_sheet(screen, sheet(css));
    (tree, screen, children)
}

#[test]
fn test_compound_class_beats_single_class() {
    let (mut tree, _, buttons) = screen_with(".btn { color: red; } .btn.primary { color: blue; }", 1);
    tree.add_class(buttons[0], "btn");
    tree.add_class(buttons[0], "primary");
    tree.tick();
    assert_eq!(color(&tree, buttons[0]), BLUE);
}

#[test]
fn test_hover_applies_and_reverts() {
    let (mut tree, _, links) = screen_with("Button:hover { color: green; }", 1);
    let link = links[0];
    tree.tick();
    assert_eq!(color(&tree, link), BLACK);

    tree.set_pseudo_class(link, PseudoClasses::HOVER, true);
    let report = tree.tick();
    assert_eq!(report.changed, vec![link]);
    assert_eq!(color(&tree, link), GREEN);

    tree.set_pseudo_class(link, PseudoClasses::HOVER, false);
    tree.tick();
    assert_eq!(color(&tree, link), BLACK);
}

#[test]
fn test_hover_reverts_to_next_best_match() {
    let (mut tree, _, links) = screen_with("Button { color: red; } Button:hover { color: green; }", 1);
    let link = links[0];
    tree.set_pseudo_class(link, PseudoClasses::HOVER, true);
    tree.tick();
    assert_eq!(color(&tree, link), GREEN);

    tree.set_pseudo_class(link, PseudoClasses::HOVER, false);
    tree.tick();
    assert_eq!(color(&tree, link), RED);
}

#[test]
fn test_id_beats_any_number_of_classes() {
    let (mut tree, _, buttons) =
        screen_with("#ok { color: blue; } .a.b.c.d { color: red; }", 1);
    let button = buttons[0];
    for class in ["a", "b", "c", "d"] {
        tree.add_class(button, class);
    }
    tree.set_id(button, Some("ok"));
    tree.tick();
    assert_eq!(color(&tree, button), BLUE);
}

#[test]
fn test_later_block_wins_on_equal_specificity() {
    let (mut tree, _, buttons) = screen_with(".x { color: red; } .y { color: blue; }", 1);
    tree.add_class(buttons[0], "y");
    tree.add_class(buttons[0], "x");
    tree.tick();
    assert_eq!(color(&tree, buttons[0]), BLUE);
}

#[test]
fn test_inline_style_wins_over_id() {
    let (mut tree, _, buttons) = screen_with("#ok { color: red; }", 1);
    let button = buttons[0];
    tree.set_id(button, Some("ok"));
    tree.set_inline_style(
        button,
        Some(Styles {
            color: Some(GREEN),
            ..Default::default()
        }),
    );
    tree.tick();
    assert_eq!(color(&tree, button), GREEN);

    tree.set_inline_style(button, None);
    tree.tick();
    assert_eq!(color(&tree, button), RED);
}

#[test]
fn test_ancestor_sheets_order_by_load_order_not_proximity() {
    // Parsed first, attached closest to the element.
    let near = sheet(".x { color: red; }");
    // Parsed second, attached at the root.
    let far = sheet(".x { color: blue; }");

    let mut tree = ElementTree::new();
    let root = tree.create_element("Screen");
    let panel = tree.create_element("Panel");
    let item = tree.create_element("Item");
    tree.append_child(root, panel);
    tree.append_child(panel, item);
    tree.add_class(item, "x");
    tree.attach_sheet(panel, near);
    tree.attach_sheet(root, far);
    tree.tick();

    assert_eq!(color(&tree, item), BLUE);
}

#[test]
fn test_same_sheet_at_two_levels_counts_once() {
    let shared = sheet(".x { color: red; }");
    let mut tree = ElementTree::new();
    let root = tree.create_element("Screen");
    let item = tree.create_element("Item");
    tree.append_child(root, item);
    tree.add_class(item, "x");
    tree.attach_sheet(root, shared.clone());
    tree.attach_sheet(item, shared);

    tree.tick();
    assert_eq!(color(&tree, item), RED);
    assert_eq!(tree.visible_sheets(item).len(), 2);
}

#[test]
fn test_color_inherits_and_background_does_not() {
    let (mut tree, screen, buttons) =
        screen_with("Screen { color: red; background: blue; }", 1);
    tree.tick();
    let style = tree.computed_style(buttons[0]).unwrap();
    assert_eq!(style.color, RED);
    assert!(style.background.is_transparent());
    assert_eq!(tree.computed_style(screen).unwrap().background, BLUE);
}

#[test]
fn test_nth_child_parity_follows_insertions() {
    let (mut tree, screen, buttons) = screen_with(
        "Button:nth-child(odd) { color: red; } Button:nth-child(even) { color: blue; }",
        3,
    );
    tree.tick();
    assert_eq!(color(&tree, buttons[0]), RED);
    assert_eq!(color(&tree, buttons[1]), BLUE);
    assert_eq!(color(&tree, buttons[2]), RED);

    let first = tree.create_element("Button");
    tree.insert_child(screen, 0, first);
    tree.tick();
    assert_eq!(color(&tree, first), RED);
    assert_eq!(color(&tree, buttons[0]), BLUE);
    assert_eq!(color(&tree, buttons[1]), RED);
    assert_eq!(color(&tree, buttons[2]), BLUE);
}

#[test]
fn test_first_last_only_child() {
    let (mut tree, screen, buttons) = screen_with(
        "Button:first-child { color: red; } \
         Button:last-child { color: blue; } \
         Button:only-child { color: green; }",
        2,
    );
    tree.tick();
    assert_eq!(color(&tree, buttons[0]), RED);
    assert_eq!(color(&tree, buttons[1]), BLUE);

    tree.remove(buttons[1]);
    tree.tick();
    assert_eq!(color(&tree, buttons[0]), GREEN);
    assert_eq!(tree.children(screen), &[buttons[0]]);
}

#[test]
fn test_sibling_combinators_follow_class_changes() {
    let (mut tree, _, buttons) =
        screen_with(".lead + Button { color: red; } .lead ~ Button { background: blue; }", 3);
    tree.tick();

    tree.add_class(buttons[0], "lead");
    tree.tick();
    assert_eq!(color(&tree, buttons[1]), RED);
    assert_eq!(color(&tree, buttons[2]), BLACK);
    assert_eq!(tree.computed_style(buttons[2]).unwrap().background, BLUE);
}

#[test]
fn test_has_reacts_to_descendant_changes() {
    let (mut tree, screen, buttons) = screen_with("Screen:has(.on) { background: red; }", 2);
    tree.tick();
    assert!(tree.computed_style(screen).unwrap().background.is_transparent());

    tree.add_class(buttons[1], "on");
    assert!(tree.is_dirty(screen));
    let report = tree.tick();
    assert!(report.changed.contains(&screen));
    assert_eq!(tree.computed_style(screen).unwrap().background, RED);

    tree.remove_class(buttons[1], "on");
    tree.tick();
    assert!(tree.computed_style(screen).unwrap().background.is_transparent());
}

#[test]
fn test_nested_selectors_resolve_against_tree() {
    let (mut tree, _, buttons) = screen_with(
        "Screen { Button { color: red; &.primary { color: blue; } } }",
        2,
    );
    tree.add_class(buttons[1], "primary");
    tree.tick();
    assert_eq!(color(&tree, buttons[0]), RED);
    assert_eq!(color(&tree, buttons[1]), BLUE);
}

#[test]
fn test_nested_block_ranks_by_enclosing_member_matched() {
    let (mut tree, _, buttons) = screen_with(
        ".a, #b { &.c { color: red; } } .a.c.x { color: blue; }",
        1,
    );
    for class in ["a", "c", "x"] {
        tree.add_class(buttons[0], class);
    }
    tree.tick();
    assert_eq!(color(&tree, buttons[0]), BLUE);

    tree.set_id(buttons[0], Some("b"));
    tree.tick();
    assert_eq!(color(&tree, buttons[0]), RED);
}

#[test]
fn test_has_child_prefix_per_argument() {
    let mut tree = ElementTree::new();
    let screen = tree.create_element("Screen");
    let panel = tree.create_element("Panel");
    let row = tree.create_element("Row");
    let cell = tree.create_element("Cell");
    tree.append_child(screen, panel);
    tree.append_child(panel, row);
    tree.append_child(row, cell);
    tree.add_class(row, "a");
    tree.add_class(cell, "b");
    tree.attach_sheet(
        screen,
        sheet("Panel:has(> .a, > .b) { color: red; } Panel:has(> .a, .b) { background: blue; }"),
    );
    tree.tick();
    assert_eq!(color(&tree, panel), BLACK);
    assert_eq!(tree.computed_style(panel).unwrap().background, BLUE);

    tree.add_class(row, "b");
    tree.tick();
    assert_eq!(color(&tree, panel), RED);
}

#[test]
fn test_detach_sheet_restores_initial_style() {
    let css = sheet("Button { color: red; }");
    let mut tree = ElementTree::new();
    let button = tree.create_element("Button");
    tree.attach_sheet(button, css.clone());
    tree.tick();
    assert_eq!(color(&tree, button), RED);

    assert!(tree.detach_sheet(button, &css));
    tree.tick();
    assert_eq!(color(&tree, button), BLACK);
}

#[test]
fn test_resolution_is_deterministic() {
    let css = ".a { color: red; } .b { color: blue; } .a.b:hover { color: green; }";
    let build = || {
        let (mut tree, _, buttons) = screen_with(css, 3);
        tree.add_class(buttons[1], "a");
        tree.add_class(buttons[1], "b");
        tree.set_pseudo_class(buttons[2], PseudoClasses::HOVER, true);
        tree.tick();
        buttons
            .iter()
            .map(|button| tree.computed_style(*button).cloned())
            .collect::<Vec<_>>()
    };
    assert_eq!(build(), build());
}

#[test]
fn test_unchanged_recompute_reports_no_change() {
    let (mut tree, _, buttons) = screen_with(".x { color: red; }", 1);
    tree.tick();
    tree.take_layout_requests();

    // Matches nothing new.
    tree.add_class(buttons[0], "unused");
    let report = tree.tick();
    assert!(report.resolved.contains(&buttons[0]));
    assert!(report.changed.is_empty());
    assert!(tree.take_layout_requests().is_empty());
}
