//! Selector grammar.
//!
//! Produces the syntactic form of a selector list; the
//! [`SelectorArena`](crate::selector::SelectorArena) compiles it.

use std::fmt;

use nom::{
    IResult,
    branch::alt,
    character::complete::{char, multispace0},
    combinator::map,
    multi::{many0, separated_list1},
    sequence::{delimited, preceded, tuple},
};

use crate::parser::values::parse_ident;
use crate::selector::Combinator;

/// One simple selector inside a compound.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Selector {
    Type(String),
    Class(String),
    Id(String),
    Universal,
    /// `:name` or `:name(argument)`; the argument is kept as raw text.
    PseudoClass {
        name: String,
        argument: Option<String>,
    },
    /// `&`
    Parent,
}

/// Simple selectors written without whitespace (`Button.primary:hover`).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompoundSelector {
    pub selectors: Vec<Selector>,
}

/// A compound plus the combinator joining it to the next part.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SelectorPart {
    pub compound: CompoundSelector,
    /// `None` on the rightmost part.
    pub combinator: Option<Combinator>,
}

/// A chain of compounds, left to right.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ComplexSelector {
    pub parts: Vec<SelectorPart>,
}

/// Comma-separated groups.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SelectorList {
    pub selectors: Vec<ComplexSelector>,
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Type(name) => f.write_str(name),
            Self::Class(class) => write!(f, ".{class}"),
            Self::Id(id) => write!(f, "#{id}"),
            Self::Universal => f.write_str("*"),
            Self::PseudoClass { name, argument } => match argument {
                Some(argument) => write!(f, ":{name}({argument})"),
                None => write!(f, ":{name}"),
            },
            Self::Parent => f.write_str("&"),
        }
    }
}

impl fmt::Display for ComplexSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for part in &self.parts {
            for selector in &part.compound.selectors {
                write!(f, "{selector}")?;
            }
            match part.combinator {
                Some(Combinator::Child) => f.write_str(" > ")?,
                Some(Combinator::AdjacentSibling) => f.write_str(" + ")?,
                Some(Combinator::GeneralSibling) => f.write_str(" ~ ")?,
                Some(_) => f.write_str(" ")?,
                None => {}
            }
        }
        Ok(())
    }
}

/// Parses the inside of `( ... )`, allowing nested parentheses.
fn parse_parenthesized(input: &str) -> IResult<&str, &str> {
    let (body, _) = char('(')(input)?;
    let mut depth = 1usize;
    for (i, c) in body.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth == 0 {
                    return Ok((&body[i + 1..], &body[..i]));
                }
            }
            _ => {}
        }
    }
    Err(nom::Err::Error(nom::error::Error::new(
        input,
        nom::error::ErrorKind::Char,
    )))
}

fn parse_pseudo_class(input: &str) -> IResult<&str, Selector> {
    let (input, name) = preceded(char(':'), parse_ident)(input)?;
    let (input, argument) = match parse_parenthesized(input) {
        Ok((rest, argument)) => (rest, Some(argument.trim().to_string())),
        Err(_) => (input, None),
    };
    Ok((
        input,
        Selector::PseudoClass {
            name: name.to_string(),
            argument,
        },
    ))
}

/// Parses a simple selector: Type, .Class, #ID, :pseudo, `*` or `&`.
pub fn parse_simple_selector(input: &str) -> IResult<&str, Selector> {
    alt((
        map(preceded(char('#'), parse_ident), |s| Selector::Id(s.to_string())),
        map(preceded(char('.'), parse_ident), |s| Selector::Class(s.to_string())),
        parse_pseudo_class,
        map(char('&'), |_| Selector::Parent),
        map(char('*'), |_| Selector::Universal),
        map(parse_ident, |s| Selector::Type(s.to_string())),
    ))(input)
}

/// Parses a compound selector (e.g., "Button.primary#submit").
pub fn parse_compound_selector(input: &str) -> IResult<&str, CompoundSelector> {
    let (input, first) = parse_simple_selector(input)?;
    let (input, rest) = many0(parse_simple_selector)(input)?;

    let mut selectors = vec![first];
    selectors.extend(rest);
    Ok((input, CompoundSelector { selectors }))
}

fn parse_symbolic_combinator(input: &str) -> IResult<&str, Combinator> {
    delimited(
        multispace0,
        alt((
            map(char('>'), |_| Combinator::Child),
            map(char('+'), |_| Combinator::AdjacentSibling),
            map(char('~'), |_| Combinator::GeneralSibling),
        )),
        multispace0,
    )(input)
}

/// Parses a complex selector with combinators (e.g., "Container > Button").
pub fn parse_complex_selector(input: &str) -> IResult<&str, ComplexSelector> {
    let (mut input, mut current) = parse_compound_selector(input)?;
    let mut parts = Vec::new();

    loop {
        if let Ok((rest, (combinator, next))) =
            tuple((parse_symbolic_combinator, parse_compound_selector))(input)
        {
            parts.push(SelectorPart {
                compound: current,
                combinator: Some(combinator),
            });
            current = next;
            input = rest;
            continue;
        }

        // Whitespace alone is the descendant combinator.
        let (after_ws, ws) = multispace0(input)?;
        if !ws.is_empty() {
            if let Ok((rest, next)) = parse_compound_selector(after_ws) {
                parts.push(SelectorPart {
                    compound: current,
                    combinator: Some(Combinator::Descendant),
                });
                current = next;
                input = rest;
                continue;
            }
        }
        break;
    }

    parts.push(SelectorPart {
        compound: current,
        combinator: None,
    });
    Ok((input, ComplexSelector { parts }))
}

/// Parses comma-separated groups (e.g., "Button, .primary > Label").
pub fn parse_selector_list(input: &str) -> IResult<&str, SelectorList> {
    map(
        separated_list1(
            delimited(multispace0, char(','), multispace0),
            parse_complex_selector,
        ),
        |selectors| SelectorList { selectors },
    )(input)
}
