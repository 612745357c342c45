//! The parsed stylesheet model.
//!
//! A [`StyleSheet`] is immutable once parsed and is shared between elements
//! behind an `Arc`. Its blocks keep their nesting; [`StyleSheet::blocks`]
//! walks them depth first.

use std::borrow::Cow;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::parser::variables::Variables;
use crate::selector::{SelectorArena, SelectorId};
use crate::types::{
    AlignItems, BorderEdge, Display, Edge, FlexDirection, FontStyle, FontWeight, JustifyContent,
    Overflow, Position, RgbaColor, Scalar, Spacing, Styles, TextAlign, Visibility,
};

static LOAD_ORDER: AtomicU64 = AtomicU64::new(0);

/// Hands out the next process-wide load-order index.
///
/// Blocks from every sheet share one sequence so that blocks attached at
/// different levels of a tree can be compared directly.
pub fn next_load_order() -> u64 {
    LOAD_ORDER.fetch_add(1, Ordering::Relaxed)
}

/// A single typed property declaration.
#[derive(Clone, Debug, PartialEq)]
pub enum Declaration {
    Color(RgbaColor),
    Background(RgbaColor),
    Opacity(f32),
    Border(BorderEdge),
    BorderEdge(Edge, BorderEdge),
    BorderRadius(f32),

    Width(Scalar),
    Height(Scalar),
    MinWidth(Scalar),
    MinHeight(Scalar),
    MaxWidth(Scalar),
    MaxHeight(Scalar),
    Margin(Spacing),
    MarginEdge(Edge, Scalar),
    Padding(Spacing),
    PaddingEdge(Edge, Scalar),

    Display(Display),
    Position(Position),
    FlexDirection(FlexDirection),
    FlexGrow(f32),
    FlexShrink(f32),
    JustifyContent(JustifyContent),
    AlignItems(AlignItems),
    Gap(Scalar),
    Overflow(Overflow),
    OverflowX(Overflow),
    OverflowY(Overflow),

    FontFamily(String),
    FontSize(Scalar),
    FontWeight(FontWeight),
    FontStyle(FontStyle),
    TextAlign(TextAlign),
    Visibility(Visibility),

    AnimationName(String),
    AnimationDuration(f32),

    /// A property the engine does not understand. Kept for diagnostics.
    Unknown { name: String, value: String },
}

impl Declaration {
    /// The canonical property name this declaration writes.
    ///
    /// Aliases collapse onto one name (`background-color` is `background`),
    /// which is what last-write-wins deduplication within a block keys on.
    pub fn property_name(&self) -> Cow<'static, str> {
        let name = match self {
            Self::Color(_) => "color",
            Self::Background(_) => "background",
            Self::Opacity(_) => "opacity",
            Self::Border(_) => "border",
            Self::BorderEdge(edge, _) => return Cow::Owned(format!("border-{}", edge.name())),
            Self::BorderRadius(_) => "border-radius",
            Self::Width(_) => "width",
            Self::Height(_) => "height",
            Self::MinWidth(_) => "min-width",
            Self::MinHeight(_) => "min-height",
            Self::MaxWidth(_) => "max-width",
            Self::MaxHeight(_) => "max-height",
            Self::Margin(_) => "margin",
            Self::MarginEdge(edge, _) => return Cow::Owned(format!("margin-{}", edge.name())),
            Self::Padding(_) => "padding",
            Self::PaddingEdge(edge, _) => return Cow::Owned(format!("padding-{}", edge.name())),
            Self::Display(_) => "display",
            Self::Position(_) => "position",
            Self::FlexDirection(_) => "flex-direction",
            Self::FlexGrow(_) => "flex-grow",
            Self::FlexShrink(_) => "flex-shrink",
            Self::JustifyContent(_) => "justify-content",
            Self::AlignItems(_) => "align-items",
            Self::Gap(_) => "gap",
            Self::Overflow(_) => "overflow",
            Self::OverflowX(_) => "overflow-x",
            Self::OverflowY(_) => "overflow-y",
            Self::FontFamily(_) => "font-family",
            Self::FontSize(_) => "font-size",
            Self::FontWeight(_) => "font-weight",
            Self::FontStyle(_) => "font-style",
            Self::TextAlign(_) => "text-align",
            Self::Visibility(_) => "visibility",
            Self::AnimationName(_) => "animation-name",
            Self::AnimationDuration(_) => "animation-duration",
            Self::Unknown { name, .. } => return Cow::Owned(name.clone()),
        };
        Cow::Borrowed(name)
    }
}

/// One rule block: `selectors { declarations; nested { ... } }`.
#[derive(Clone, Debug)]
pub struct StyleBlock {
    /// One compiled selector per comma-separated group.
    pub selectors: Vec<SelectorId>,
    /// Canonical selector text, with `&` already substituted.
    pub selector_text: String,
    /// Declarations in source order, one per property name.
    pub declarations: Vec<Declaration>,
    /// The author form of `declarations`.
    pub styles: Styles,
    pub children: Vec<StyleBlock>,
    pub file: String,
    pub line: usize,
    /// Global load-order index; later blocks win specificity ties.
    pub load_order: u64,
}

impl StyleBlock {
    /// A block with nothing to contribute is dropped by the parser.
    pub fn is_empty(&self) -> bool {
        self.declarations.is_empty() && self.children.is_empty()
    }
}

/// One frame of a `@keyframes` rule.
#[derive(Clone, Debug, PartialEq)]
pub struct Keyframe {
    /// Position in the animation, from 0.0 (`from`) to 1.0 (`to`).
    pub offset: f32,
    pub styles: Styles,
}

/// A named `@keyframes` rule. Frames are sorted by offset.
#[derive(Clone, Debug, PartialEq)]
pub struct Keyframes {
    pub name: String,
    pub frames: Vec<Keyframe>,
}

impl Keyframes {
    /// Returns the frame declared at exactly `offset`, if any.
    pub fn frame_at(&self, offset: f32) -> Option<&Keyframe> {
        self.frames
            .iter()
            .find(|frame| (frame.offset - offset).abs() < f32::EPSILON)
    }
}

/// A parsed stylesheet.
#[derive(Clone, Debug, Default)]
pub struct StyleSheet {
    /// The file this sheet was parsed from.
    pub filename: String,
    /// Top-level blocks in load order; imported blocks are spliced in place.
    pub blocks: Vec<StyleBlock>,
    /// Variable table as it stood at the end of the parse.
    pub variables: Variables,
    pub keyframes: HashMap<String, Keyframes>,
    /// Storage for every compiled selector referenced by `blocks`.
    pub selectors: SelectorArena,
}

impl StyleSheet {
    /// Iterates every block, parents before their nested children.
    pub fn blocks(&self) -> impl Iterator<Item = &StyleBlock> {
        let mut stack: Vec<&StyleBlock> = self.blocks.iter().rev().collect();
        std::iter::from_fn(move || {
            let block = stack.pop()?;
            stack.extend(block.children.iter().rev());
            Some(block)
        })
    }

    /// Number of blocks including nested ones.
    pub fn block_count(&self) -> usize {
        self.blocks().count()
    }

    pub fn keyframes(&self, name: &str) -> Option<&Keyframes> {
        self.keyframes.get(name)
    }

    /// Finds the first block whose canonical selector text is `text`.
    pub fn find_block(&self, text: &str) -> Option<&StyleBlock> {
        self.blocks().find(|block| block.selector_text == text)
    }
}
