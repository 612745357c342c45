//! # TSS - a small CSS-like style engine
//!
//! Parses stylesheets, matches selectors against any tree that implements
//! [`StyleTarget`], and cascades matching rules into a [`ComputedStyle`]
//! per element.
//!
//! - **Parsing**: source text (with `$variables`, `@import` and
//!   `@keyframes`) into a [`StyleSheet`](parser::StyleSheet)
//! - **Matching**: compiled selector chains tested against a live tree
//! - **Cascade**: specificity and load order, inline overrides, inheritance
//!
//! ## Quick Start
//!
//! ```rust
//! use tss::parser::parse_stylesheet;
//!
//! let source = r#"
//!     $accent: #0080ff;
//!
//!     Button {
//!         color: red;
//!         width: 100%;
//!         margin: 1 2;
//!
//!         &.primary {
//!             background: $accent;
//!         }
//!     }
//! "#;
//!
//! let stylesheet = parse_stylesheet(source).expect("valid TSS");
//! assert_eq!(stylesheet.block_count(), 2);
//! assert!(stylesheet.find_block("button.primary").is_some());
//! ```
//!
//! ## Supported Features
//!
//! ### Selectors
//! - Type, class, id and universal selectors: `Button`, `.primary`, `#submit`, `*`
//! - Combinators: descendant (space), child `>`, adjacent `+`, general `~`
//! - Nesting with `&`
//! - State pseudo-classes: `:hover`, `:active`, `:focus`, `:disabled`,
//!   `:intro`, `:outro`, `:before`, `:after`
//! - Structural pseudo-classes: `:empty`, `:first-child`, `:last-child`,
//!   `:only-child`, `:nth-child(n|odd|even)`, `:has(...)`, `:not(...)`
//!
//! ### Units
//! - Points (default, also `px`): `10`, `10px`
//! - Percentage: `50%`
//! - Viewport: `50vw`, `100vh`
//! - Auto: `auto`
//!
//! ## Modules
//!
//! - [`parser`]: parsing and stylesheet data structures
//! - [`selector`]: compiled selectors and matching
//! - [`cascade`]: specificity ordering and final style computation
//! - [`types`]: colors, lengths, borders, layout keywords, style bags
//! - [`error`]: parse errors

pub mod cascade;
pub mod error;
pub mod parser;
pub mod selector;
pub mod types;

pub use cascade::{CascadeContext, Resolved, build_final};
pub use error::{ParseError, ParseErrorKind};
pub use selector::{PseudoClasses, StyleTarget};
pub use types::{ComputedStyle, Styles};
