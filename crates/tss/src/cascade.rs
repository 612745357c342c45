//! Cascade and style computation.
//!
//! ## Cascade Algorithm
//!
//! 1. Collect every block, from every sheet visible to the element, whose
//!    selector matches it
//! 2. Sort by specificity (ids > classes and pseudo-classes > element
//!    names), then by global load order
//! 3. Fold declarations in that order, later blocks overwriting earlier ones
//! 4. Apply the element's inline style, which always wins
//! 5. Resolve against the parent's computed style for inheritable
//!    properties, initial values for everything else
//!
//! Sheets attached to ancestors are not ranked by tree distance: a block
//! from a sheet on the root and one from a sheet on the element itself
//! compete on specificity and load order alone.

use std::sync::Arc;

use crate::parser::{StyleBlock, StyleSheet};
use crate::selector::{Specificity, StyleTarget, matched_specificity};
use crate::types::{ComputedStyle, Styles};

/// Everything the cascade needs besides the element itself.
#[derive(Debug, Clone, Copy, Default)]
pub struct CascadeContext<'a> {
    /// Sheets attached to the element and its ancestors, in any order.
    /// A sheet attached at several levels contributes once.
    pub sheets: &'a [Arc<StyleSheet>],
    /// The element's own inline style.
    pub inline: Option<&'a Styles>,
    /// The parent's computed style; `None` for a root.
    pub parent: Option<&'a ComputedStyle>,
    /// Fingerprint of the element's previous computed style, if any.
    pub previous_fingerprint: Option<u64>,
}

/// Output of [`build_final`].
#[derive(Debug, Clone, PartialEq)]
pub struct Resolved {
    pub style: ComputedStyle,
    pub fingerprint: u64,
    /// `true` if the style differs from the previous one, or there was none.
    pub changed: bool,
}

/// A block that matched an element, bundled with its priority information.
#[derive(Debug, Clone, Copy)]
pub struct MatchedBlock<'a> {
    pub specificity: Specificity,
    pub load_order: u64,
    pub block: &'a StyleBlock,
}

/// Finds the blocks of `sheets` matching `target`, lowest priority first.
///
/// A block with several selector groups ranks by the most specific group
/// that matched. A nested block ranks by the enclosing selector the element
/// actually satisfied, not the most specific one in the enclosing list.
pub fn matching_blocks<'a, T: StyleTarget>(
    target: T,
    sheets: &'a [Arc<StyleSheet>],
) -> Vec<MatchedBlock<'a>> {
    let mut matched = Vec::new();

    for (index, sheet) in sheets.iter().enumerate() {
        if sheets[..index].iter().any(|seen| Arc::ptr_eq(seen, sheet)) {
            continue;
        }
        let arena = &sheet.selectors;
        for block in sheet.blocks() {
            if block.declarations.is_empty() {
                continue;
            }
            let specificity = block
                .selectors
                .iter()
                .filter_map(|id| matched_specificity(arena, *id, target))
                .max();
            if let Some(specificity) = specificity {
                matched.push(MatchedBlock {
                    specificity,
                    load_order: block.load_order,
                    block,
                });
            }
        }
    }

    matched.sort_by_key(|m| (m.specificity, m.load_order));
    matched
}

/// Folds the matching blocks and the inline style into one author style.
pub fn cascaded_styles<T: StyleTarget>(target: T, context: &CascadeContext<'_>) -> Styles {
    let mut styles = Styles::default();
    for matched in matching_blocks(target, context.sheets) {
        styles.merge(&matched.block.styles);
    }
    if let Some(inline) = context.inline {
        styles.merge(inline);
    }
    styles
}

/// Computes the final style of `target`.
pub fn build_final<T: StyleTarget>(target: T, context: &CascadeContext<'_>) -> Resolved {
    let author = cascaded_styles(target, context);
    let style = ComputedStyle::resolve(&author, context.parent);
    let fingerprint = style.fingerprint();
    let changed = context.previous_fingerprint != Some(fingerprint);

    log::trace!(
        "cascade {}#{}: changed={changed}",
        target.element_name(),
        target.id().unwrap_or("-"),
    );

    Resolved {
        style,
        fingerprint,
        changed,
    }
}
