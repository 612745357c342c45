//! Layout inputs handed to the external flexbox-style layout engine.
//!
//! - [`Display`]: whether an element takes part in layout at all
//! - [`Visibility`]: whether it is painted (still takes space)
//! - [`Overflow`]: how content exceeding its bounds is handled
//! - [`Position`], [`FlexDirection`], [`JustifyContent`], [`AlignItems`]
//!
//! ## Display vs Visibility
//!
//! - `display: none` removes the element from layout entirely
//! - `visibility: hidden` hides the element but preserves its space
//!
//! All keyword enums parse through `from_keyword`, which is ASCII
//! case-insensitive and returns `None` for anything it does not know.

macro_rules! keyword_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident {
            $(
                $(#[$vmeta:meta])*
                $variant:ident => $keyword:literal
            ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
        pub enum $name {
            $(
                $(#[$vmeta])*
                $variant,
            )+
        }

        impl $name {
            pub fn from_keyword(keyword: &str) -> Option<Self> {
                $(
                    if keyword.eq_ignore_ascii_case($keyword) {
                        return Some(Self::$variant);
                    }
                )+
                None
            }

            pub fn keyword(self) -> &'static str {
                match self {
                    $(Self::$variant => $keyword,)+
                }
            }
        }
    };
}

pub(crate) use keyword_enum;

keyword_enum! {
    /// Controls whether an element is laid out.
    pub enum Display {
        /// Element is a flex container (default).
        #[default]
        Flex => "flex",
        /// Element is not rendered and takes no space.
        None => "none",
    }
}

keyword_enum! {
    /// Controls whether an element is painted.
    pub enum Visibility {
        #[default]
        Visible => "visible",
        /// Invisible but still takes space.
        Hidden => "hidden",
    }
}

keyword_enum! {
    /// How content exceeding container bounds is handled.
    pub enum Overflow {
        #[default]
        Visible => "visible",
        Hidden => "hidden",
        /// Scrollbars only when content overflows.
        Auto => "auto",
        Scroll => "scroll",
    }
}

keyword_enum! {
    pub enum Position {
        #[default]
        Relative => "relative",
        Absolute => "absolute",
    }
}

keyword_enum! {
    pub enum FlexDirection {
        #[default]
        Column => "column",
        Row => "row",
        ColumnReverse => "column-reverse",
        RowReverse => "row-reverse",
    }
}

keyword_enum! {
    pub enum JustifyContent {
        #[default]
        FlexStart => "flex-start",
        FlexEnd => "flex-end",
        Center => "center",
        SpaceBetween => "space-between",
        SpaceAround => "space-around",
        SpaceEvenly => "space-evenly",
    }
}

keyword_enum! {
    pub enum AlignItems {
        #[default]
        Stretch => "stretch",
        FlexStart => "flex-start",
        FlexEnd => "flex-end",
        Center => "center",
        Baseline => "baseline",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keywords_are_case_insensitive() {
        assert_eq!(Display::from_keyword("NONE"), Some(Display::None));
        assert_eq!(
            JustifyContent::from_keyword("space-between"),
            Some(JustifyContent::SpaceBetween)
        );
        assert_eq!(FlexDirection::from_keyword("sideways"), None);
    }

    #[test]
    fn test_keyword_round_trip() {
        assert_eq!(AlignItems::Center.keyword(), "center");
        assert_eq!(Overflow::default(), Overflow::Visible);
    }
}
