//! Value parsing for TSS properties.
//!
//! [`parse_declaration`] turns one `name: value` pair (variables already
//! substituted) into a typed [`Declaration`]:
//!
//! - Colors: `red`, `#ff0000`, `rgb(255,0,0)`, `hsl(0,100%,50%)`, `transparent`
//! - Lengths: `10`, `10px`, `50%`, `20vw`, `auto`
//! - Borders: `1 solid red`, `dashed`, `none`
//! - Keywords: `display: none`, `text-align: center`, ...
//!
//! A trailing `!important` is accepted and ignored.

use nom::{IResult, bytes::complete::take_while1};

use crate::error::ParseErrorKind;
use crate::parser::stylesheet::Declaration;
use crate::parser::units::{parse_duration, parse_number, parse_scalar, parse_spacing, parse_whole};
use crate::types::{
    AlignItems, BorderEdge, BorderKind, Display, Edge, FlexDirection, FontStyle, FontWeight,
    JustifyContent, Overflow, Position, RgbaColor, TextAlign, Unit, Visibility,
};

/// Parses a CSS identifier (alphanumeric characters, dashes, and underscores).
///
/// Identifiers are used for property names, type selectors, class names, etc.
pub fn parse_ident(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| c.is_alphanumeric() || c == '-' || c == '_')(input)
}

/// Removes a trailing `!important` flag.
pub fn strip_important(value: &str) -> &str {
    let trimmed = value.trim_end();
    match trimmed.len().checked_sub("!important".len()) {
        Some(at)
            if trimmed.is_char_boundary(at)
                && trimmed[at..].eq_ignore_ascii_case("!important") =>
        {
            trimmed[..at].trim_end()
        }
        _ => trimmed,
    }
}

/// Splits a value on whitespace, keeping parenthesized groups together.
fn split_tokens(value: &str) -> Vec<&str> {
    let mut tokens = Vec::new();
    let mut depth = 0usize;
    let mut start: Option<usize> = None;

    for (i, c) in value.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            c if c.is_whitespace() && depth == 0 => {
                if let Some(s) = start.take() {
                    tokens.push(&value[s..i]);
                }
                continue;
            }
            _ => {}
        }
        if start.is_none() {
            start = Some(i);
        }
    }
    if let Some(s) = start {
        tokens.push(&value[s..]);
    }
    tokens
}

fn unquote(value: &str) -> &str {
    let value = value.trim();
    for quote in ['"', '\''] {
        if let Some(inner) = value
            .strip_prefix(quote)
            .and_then(|rest| rest.strip_suffix(quote))
        {
            return inner;
        }
    }
    value
}

/// Parses `<width>? <kind>? <color>?` in any order, or `none`.
///
/// A visible kind without a width gets a width of 1; a width or color
/// without a kind implies `solid`.
pub fn parse_border_edge(value: &str) -> Option<BorderEdge> {
    let mut kind = None;
    let mut width = None;
    let mut color = None;

    for token in split_tokens(value) {
        if kind.is_none() {
            if let Some(k) = BorderKind::from_keyword(token) {
                kind = Some(k);
                continue;
            }
        }
        if width.is_none() {
            if let Some(w) = parse_whole(token, parse_number).or_else(|| {
                parse_whole(token, parse_scalar)
                    .filter(|s| !s.is_auto() && s.unit == Unit::Points)
                    .map(|s| s.value)
            }) {
                width = Some(w);
                continue;
            }
        }
        if color.is_none() {
            if let Ok(c) = RgbaColor::parse(token) {
                color = Some(c);
                continue;
            }
        }
        return None;
    }

    if kind.is_none() && width.is_none() && color.is_none() {
        return None;
    }
    let kind = kind.unwrap_or(BorderKind::Solid);
    Some(BorderEdge::new(kind, width.unwrap_or(1.0), color))
}

fn edge_of(suffix: &str) -> Option<Edge> {
    Edge::ALL.into_iter().find(|edge| edge.name() == suffix)
}

/// Parses one declaration.
///
/// Unknown property names yield [`Declaration::Unknown`]; a known property
/// with an unparseable value is an [`ParseErrorKind::InvalidValue`].
pub fn parse_declaration(name: &str, value: &str) -> Result<Declaration, ParseErrorKind> {
    let property = name.trim().to_ascii_lowercase();
    let value = strip_important(value.trim());

    let invalid = || ParseErrorKind::InvalidValue {
        property: property.clone(),
        value: value.to_string(),
    };

    let color = || RgbaColor::parse(value).map_err(|_| invalid());
    let scalar = || parse_whole(value, parse_scalar).ok_or_else(invalid);
    let number = || parse_whole(value, parse_number).ok_or_else(invalid);
    macro_rules! keyword {
        ($ty:ty) => {
            <$ty>::from_keyword(value).ok_or_else(invalid)
        };
    }

    let declaration = match property.as_str() {
        "color" => Declaration::Color(color()?),
        "background" | "background-color" => Declaration::Background(color()?),
        "opacity" => {
            let opacity = match parse_whole(value, parse_scalar) {
                Some(s) if s.unit == Unit::Percent => s.value / 100.0,
                _ => number()?,
            };
            Declaration::Opacity(opacity)
        }
        "border" => Declaration::Border(parse_border_edge(value).ok_or_else(invalid)?),
        "border-radius" => Declaration::BorderRadius(number()?),

        "width" => Declaration::Width(scalar()?),
        "height" => Declaration::Height(scalar()?),
        "min-width" => Declaration::MinWidth(scalar()?),
        "min-height" => Declaration::MinHeight(scalar()?),
        "max-width" => Declaration::MaxWidth(scalar()?),
        "max-height" => Declaration::MaxHeight(scalar()?),
        "margin" => Declaration::Margin(parse_whole(value, parse_spacing).ok_or_else(invalid)?),
        "padding" => Declaration::Padding(parse_whole(value, parse_spacing).ok_or_else(invalid)?),

        "display" => Declaration::Display(keyword!(Display)?),
        "position" => Declaration::Position(keyword!(Position)?),
        "flex-direction" => Declaration::FlexDirection(keyword!(FlexDirection)?),
        "flex-grow" => Declaration::FlexGrow(number()?),
        "flex-shrink" => Declaration::FlexShrink(number()?),
        "justify-content" => Declaration::JustifyContent(keyword!(JustifyContent)?),
        "align-items" => Declaration::AlignItems(keyword!(AlignItems)?),
        "gap" => Declaration::Gap(scalar()?),
        "overflow" => Declaration::Overflow(keyword!(Overflow)?),
        "overflow-x" => Declaration::OverflowX(keyword!(Overflow)?),
        "overflow-y" => Declaration::OverflowY(keyword!(Overflow)?),

        "font-family" => {
            let family = unquote(value);
            if family.is_empty() {
                return Err(invalid());
            }
            Declaration::FontFamily(family.to_string())
        }
        "font-size" => Declaration::FontSize(scalar()?),
        "font-weight" => Declaration::FontWeight(FontWeight::parse(value).ok_or_else(invalid)?),
        "font-style" => Declaration::FontStyle(keyword!(FontStyle)?),
        "text-align" => Declaration::TextAlign(keyword!(TextAlign)?),
        "visibility" => Declaration::Visibility(keyword!(Visibility)?),

        "animation-name" => match parse_ident(value) {
            Ok(("", ident)) => Declaration::AnimationName(ident.to_string()),
            _ => return Err(invalid()),
        },
        "animation-duration" => {
            Declaration::AnimationDuration(parse_whole(value, parse_duration).ok_or_else(invalid)?)
        }

        other => {
            if let Some(edge) = other.strip_prefix("border-").and_then(edge_of) {
                Declaration::BorderEdge(edge, parse_border_edge(value).ok_or_else(invalid)?)
            } else if let Some(edge) = other.strip_prefix("margin-").and_then(edge_of) {
                Declaration::MarginEdge(edge, scalar()?)
            } else if let Some(edge) = other.strip_prefix("padding-").and_then(edge_of) {
                Declaration::PaddingEdge(edge, scalar()?)
            } else {
                log::debug!("ignoring unknown property `{other}`");
                Declaration::Unknown {
                    name: other.to_string(),
                    value: value.to_string(),
                }
            }
        }
    };
    Ok(declaration)
}
