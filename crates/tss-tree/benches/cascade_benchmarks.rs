use std::sync::Arc;

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use tss::PseudoClasses;
use tss::parser::parse_stylesheet;
use tss_tree::{ElementTree, NodeId};

const CSS: &str = r#"
    Screen { color: white; background: black; }
    Panel > Item { padding: 1; }
    Panel Item.selected { color: yellow; }
    Item:nth-child(even) { background: #202020; }
    Item:hover { background: #404040; }
    Panel:has(.selected) { border: solid red; }
    .lead + Item { margin: 1 0; }
    #footer Item:last-child { color: red; }
"#;

/// A chain of `depth` panels, each holding `width` items.
fn build_tree(depth: usize, width: usize) -> (ElementTree, Vec<NodeId>) {
    let mut tree = ElementTree::new();
    let root = tree.create_element("Screen");
    tree.attach_sheet(root, Arc::new(parse_stylesheet(CSS).unwrap()));

    let mut items = Vec::new();
    let mut parent = root;
    for level in 0..depth {
        let panel = tree.create_element("Panel");
        tree.append_child(parent, panel);
        for index in 0..width {
            let item = tree.create_element("Item");
            if index == 0 {
                tree.add_class(item, "lead");
            }
            tree.append_child(panel, item);
            items.push(item);
        }
        if level + 1 == depth {
            tree.set_id(panel, Some("footer"));
        }
        parent = panel;
    }
    tree.tick();
    (tree, items)
}

fn bench_full_resolution(c: &mut Criterion) {
    let mut group = c.benchmark_group("full_resolution");

    for depth in [4, 16, 64] {
        group.bench_with_input(BenchmarkId::new("depth", depth), &depth, |b, &depth| {
            b.iter(|| {
                let (tree, _) = build_tree(black_box(depth), 8);
                tree
            })
        });
    }

    group.finish();
}

fn bench_hover_toggle(c: &mut Criterion) {
    let mut group = c.benchmark_group("hover_toggle");

    for depth in [4, 16, 64] {
        let (mut tree, items) = build_tree(depth, 8);
        let target = items[items.len() / 2];
        let mut on = false;
        group.bench_with_input(BenchmarkId::new("depth", depth), &depth, |b, _| {
            b.iter(|| {
                on = !on;
                tree.set_pseudo_class(target, PseudoClasses::HOVER, on);
                black_box(tree.tick())
            })
        });
    }

    group.finish();
}

fn bench_class_toggle_with_has(c: &mut Criterion) {
    let mut group = c.benchmark_group("class_toggle_has");

    for depth in [4, 16, 64] {
        let (mut tree, items) = build_tree(depth, 8);
        let target = items[items.len() - 1];
        group.bench_with_input(BenchmarkId::new("depth", depth), &depth, |b, _| {
            b.iter(|| {
                tree.toggle_class(target, "selected");
                black_box(tree.tick())
            })
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_full_resolution,
    bench_hover_toggle,
    bench_class_toggle_with_has
);
criterion_main!(benches);
