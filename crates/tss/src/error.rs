//! Error types for stylesheet parsing.
//!
//! Parsing is the only fallible stage of the engine: matching, cascade and
//! invalidation are total. Every [`ParseError`] carries the file and line it
//! was raised at, and a failed parse never yields a partial sheet.

use thiserror::Error;

/// What went wrong while parsing a stylesheet.
#[derive(Error, Debug)]
pub enum ParseErrorKind {
    /// A `/*` comment was never closed.
    #[error("unterminated comment")]
    UnterminatedComment,

    /// A `{` block was never closed.
    #[error("unterminated block")]
    UnterminatedBlock,

    /// The selector text could not be parsed or compiled.
    #[error("malformed selector `{selector}`: {reason}")]
    MalformedSelector { selector: String, reason: String },

    /// An `@`-rule other than `@import` or `@keyframes`.
    #[error("unknown at-rule `@{0}`")]
    UnknownAtRule(String),

    /// A `:pseudo` name the engine does not know.
    #[error("unknown pseudo-class `:{0}`")]
    UnknownPseudoClass(String),

    /// A `$variable` was referenced before it was defined.
    #[error("unknown variable `${0}`")]
    UnknownVariable(String),

    /// A known property was given a value it cannot hold.
    #[error("invalid value `{value}` for property `{property}`")]
    InvalidValue { property: String, value: String },

    /// Anything else that is not valid syntax.
    #[error("syntax error: {0}")]
    InvalidSyntax(String),

    /// No candidate file exists for an `@import`.
    #[error("cannot resolve import `{0}`")]
    ImportNotFound(String),

    /// The import chain is deeper than the configured limit.
    #[error("import depth exceeds {0}")]
    ImportDepthExceeded(usize),

    /// An I/O error occurred while reading a stylesheet file.
    #[error("I/O error reading stylesheet: {0}")]
    Io(#[from] std::io::Error),
}

/// A fatal stylesheet parse failure with its source location.
///
/// # Examples
///
/// ```rust
/// use tss::parser::parse_stylesheet;
/// use tss::ParseErrorKind;
///
/// let err = parse_stylesheet("Button {\n  color: red;\n").unwrap_err();
/// assert!(matches!(err.kind, ParseErrorKind::UnterminatedBlock));
/// assert_eq!(err.line, 1);
/// ```
#[derive(Error, Debug)]
#[error("{file}:{line}: {kind}")]
pub struct ParseError {
    pub file: String,
    /// 1-based line number.
    pub line: usize,
    pub kind: ParseErrorKind,
}

impl ParseError {
    pub fn new(file: impl Into<String>, line: usize, kind: ParseErrorKind) -> Self {
        Self {
            file: file.into(),
            line,
            kind,
        }
    }
}
