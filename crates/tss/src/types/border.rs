//! Border styling types read by the renderer (and, for widths, by layout).
//!
//! - [`BorderKind`]: the line style of an edge
//! - [`BorderEdge`]: a single edge with width, style and optional color
//! - [`Border`]: all four edges of an element's border
//!
//! ## Syntax
//!
//! ```css
//! Button {
//!     border: 1 solid blue;
//!     border-top: 2 double red;
//!     border-bottom: none;
//! }
//! ```
//!
//! Every component of an edge is optional; a kind without a width gets a
//! width of 1, `none` and `hidden` always have width 0.

use std::hash::{Hash, Hasher};

use crate::types::color::RgbaColor;

/// The visual style of a border edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BorderKind {
    /// No border (default).
    #[default]
    None,
    /// No visual, no space.
    Hidden,
    Solid,
    Dashed,
    Dotted,
    Double,
}

impl BorderKind {
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword.to_ascii_lowercase().as_str() {
            "none" => Some(Self::None),
            "hidden" => Some(Self::Hidden),
            "solid" => Some(Self::Solid),
            "dashed" => Some(Self::Dashed),
            "dotted" => Some(Self::Dotted),
            "double" => Some(Self::Double),
            _ => None,
        }
    }

    /// Whether this kind occupies space in the box model.
    pub fn is_visible(self) -> bool {
        !matches!(self, Self::None | Self::Hidden)
    }
}

/// A single border edge.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BorderEdge {
    pub kind: BorderKind,
    /// Edge thickness in points.
    pub width: f32,
    /// The color of this edge; the renderer falls back to the text color.
    pub color: Option<RgbaColor>,
}

impl Eq for BorderEdge {}

impl Hash for BorderEdge {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.kind.hash(state);
        self.width.to_bits().hash(state);
        self.color.hash(state);
    }
}

impl BorderEdge {
    pub const NONE: Self = Self {
        kind: BorderKind::None,
        width: 0.0,
        color: None,
    };

    pub fn new(kind: BorderKind, width: f32, color: Option<RgbaColor>) -> Self {
        let width = if kind.is_visible() { width } else { 0.0 };
        Self { kind, width, color }
    }
}

/// Complete border definition for all four sides.
///
/// # Examples
///
/// ```
/// use tss::types::{Border, BorderEdge, BorderKind};
///
/// let uniform = Border::all(BorderEdge::new(BorderKind::Solid, 1.0, None));
/// assert!(!uniform.is_none());
/// assert!(Border::default().is_none());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Border {
    pub top: BorderEdge,
    pub right: BorderEdge,
    pub bottom: BorderEdge,
    pub left: BorderEdge,
}

impl Border {
    /// Creates a border with the same edge on all four sides.
    pub fn all(edge: BorderEdge) -> Self {
        Self {
            top: edge,
            right: edge,
            bottom: edge,
            left: edge,
        }
    }

    /// Returns `true` if no border edge is visible.
    pub fn is_none(&self) -> bool {
        [self.top, self.right, self.bottom, self.left]
            .iter()
            .all(|edge| !edge.kind.is_visible())
    }
}
