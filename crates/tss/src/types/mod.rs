//! Value types shared by the parser, the cascade and downstream consumers.
//!
//! - [`Styles`]: the author form, holding only explicitly declared properties
//! - [`ComputedStyle`]: the fully resolved form handed to layout and paint

pub mod border;
pub mod color;
pub mod geometry;
pub mod layout;
pub mod style;
pub mod text;

pub use border::{Border, BorderEdge, BorderKind};
pub use color::{ColorParseError, RgbaColor};
pub use geometry::{Edge, Scalar, Spacing, Unit};
pub use layout::{AlignItems, Display, FlexDirection, JustifyContent, Overflow, Position, Visibility};
pub use style::{ComputedStyle, Styles};
pub use text::{FontStyle, FontWeight, TextAlign};
