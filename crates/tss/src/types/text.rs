use crate::types::layout::keyword_enum;

keyword_enum! {
    pub enum TextAlign {
        #[default]
        Start => "start",
        End => "end",
        Left => "left",
        Center => "center",
        Right => "right",
        Justify => "justify",
    }
}

keyword_enum! {
    pub enum FontStyle {
        #[default]
        Normal => "normal",
        Italic => "italic",
        Oblique => "oblique",
    }
}

/// Numeric font weight (100..=900).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FontWeight(pub u16);

impl Default for FontWeight {
    fn default() -> Self {
        Self::NORMAL
    }
}

impl FontWeight {
    pub const NORMAL: Self = Self(400);
    pub const BOLD: Self = Self(700);

    /// Parses `normal`, `bold` or a multiple of 100 between 100 and 900.
    pub fn parse(value: &str) -> Option<Self> {
        if value.eq_ignore_ascii_case("normal") {
            return Some(Self::NORMAL);
        }
        if value.eq_ignore_ascii_case("bold") {
            return Some(Self::BOLD);
        }
        value
            .parse::<u16>()
            .ok()
            .filter(|w| (100..=900).contains(w) && w % 100 == 0)
            .map(Self)
    }

    pub fn is_bold(self) -> bool {
        self.0 >= Self::BOLD.0
    }
}
