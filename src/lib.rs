//! CSS-like style resolution for element trees.
//!
//! This crate bundles the two workspace members:
//!
//! - [`tss`]: stylesheet parsing, selector matching and the cascade
//! - [`tss_tree`]: an element tree with invalidation and per-tick resolution
//!
//! ```
//! use std::sync::Arc;
//! use tss_rs::prelude::*;
//!
//! let sheet = Arc::new(parse_stylesheet(".btn { color: red; } .btn.primary { color: blue; }").unwrap());
//! let mut tree = ElementTree::new();
//! let button = tree.create_element("Button");
//! tree.add_class(button, "btn");
//! tree.add_class(button, "primary");
//! tree.attach_sheet(button, sheet);
//! tree.tick();
//!
//! assert_eq!(tree.computed_style(button).unwrap().color, RgbaColor::rgb(0, 0, 255));
//! ```

pub use tss;
pub use tss_tree;

pub mod prelude {
    pub use tss::parser::{Parser, ParserConfig, StyleSheet, Variables, parse_stylesheet};
    pub use tss::types::RgbaColor;
    pub use tss::{ComputedStyle, ParseError, ParseErrorKind, PseudoClasses, StyleTarget, Styles};
    pub use tss_tree::{ElementTree, NodeId, TickReport};
}
