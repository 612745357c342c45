//! Element tree, invalidation and per-tick style resolution on top of the
//! [`tss`] engine.
//!
//! ```
//! use std::sync::Arc;
//! use tss::parser::parse_stylesheet;
//! use tss::types::RgbaColor;
//! use tss::PseudoClasses;
//! use tss_tree::ElementTree;
//!
//! let sheet = Arc::new(parse_stylesheet("a:hover { color: green; }").unwrap());
//! let mut tree = ElementTree::new();
//! let link = tree.create_element("a");
//! tree.attach_sheet(link, sheet);
//! tree.tick();
//!
//! tree.set_pseudo_class(link, PseudoClasses::HOVER, true);
//! let report = tree.tick();
//! assert_eq!(report.changed, vec![link]);
//! assert_eq!(tree.computed_style(link).unwrap().color, RgbaColor::rgb(0, 128, 0));
//! ```

pub mod invalidation;
pub mod log_init;
pub mod style_resolver;
pub mod tree;

pub use invalidation::VisitedSet;
pub use log_init::{LogInitError, init_logger};
pub use style_resolver::TickReport;
pub use tree::{ElementTree, NodeId, NodeRef};
