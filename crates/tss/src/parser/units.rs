use crate::types::geometry::{Scalar, Spacing, Unit};
use nom::{
    IResult,
    branch::alt,
    bytes::complete::{tag, tag_no_case},
    character::complete::{char, digit0, digit1, multispace0, multispace1},
    combinator::{all_consuming, map, map_res, opt, recognize},
    multi::separated_list1,
    sequence::{delimited, pair, preceded, terminated, tuple},
};

/// Parse a floating point or integer number (`10`, `-2.5`, `.5`).
pub fn parse_number(input: &str) -> IResult<&str, f32> {
    map_res(
        recognize(tuple((
            opt(char('-')),
            alt((
                recognize(pair(digit1, opt(pair(char('.'), digit0)))),
                recognize(pair(char('.'), digit1)),
            )),
        ))),
        |s: &str| s.parse::<f32>(),
    )(input)
}

/// Parse the unit suffix (e.g., %, vw, px).
fn parse_unit_suffix(input: &str) -> IResult<&str, Unit> {
    alt((
        map(tag("vw"), |_| Unit::ViewWidth),
        map(tag("vh"), |_| Unit::ViewHeight),
        map(tag("px"), |_| Unit::Points),
        map(char('%'), |_| Unit::Percent),
    ))(input)
}

/// Parse a single Scalar value (e.g., "10", "10px", "50%", "auto").
pub fn parse_scalar(input: &str) -> IResult<&str, Scalar> {
    let input = input.trim_start();

    if let Ok((remaining, _)) = tag_no_case::<&str, &str, nom::error::Error<&str>>("auto")(input) {
        return Ok((remaining, Scalar::AUTO));
    }

    let (input, value) = parse_number(input)?;
    let (input, unit) = opt(parse_unit_suffix)(input)?;

    Ok((
        input,
        Scalar {
            value,
            unit: unit.unwrap_or(Unit::Points),
        },
    ))
}

/// Parse CSS-style spacing (margin/padding).
///
/// Supports 1 value (all), 2 values (vertical, horizontal), 3 values
/// (top, horizontal, bottom) or 4 values (top, right, bottom, left).
pub fn parse_spacing(input: &str) -> IResult<&str, Spacing> {
    let (input, values) = delimited(
        multispace0,
        separated_list1(multispace1, parse_scalar),
        multispace0,
    )(input)?;

    let spacing = match values.as_slice() {
        [all] => Spacing::all(*all),
        [v, h] => Spacing::vertical_horizontal(*v, *h),
        [top, h, bottom] => Spacing {
            top: *top,
            right: *h,
            bottom: *bottom,
            left: *h,
        },
        [top, right, bottom, left] => Spacing {
            top: *top,
            right: *right,
            bottom: *bottom,
            left: *left,
        },
        _ => {
            return Err(nom::Err::Error(nom::error::Error::new(
                input,
                nom::error::ErrorKind::Count,
            )));
        }
    };
    Ok((input, spacing))
}

/// Parse a duration into seconds (`1.5s`, `300ms`).
pub fn parse_duration(input: &str) -> IResult<&str, f32> {
    let (input, value) = preceded(multispace0, parse_number)(input)?;
    alt((
        map(tag("ms"), move |_| value / 1000.0),
        map(char('s'), move |_| value),
    ))(input)
}

/// Parse a complete value with `parser`, rejecting trailing text.
pub fn parse_whole<'a, T>(
    input: &'a str,
    parser: impl FnMut(&'a str) -> IResult<&'a str, T>,
) -> Option<T> {
    all_consuming(terminated(parser, multispace0))(input.trim_start())
        .ok()
        .map(|(_, value)| value)
}
