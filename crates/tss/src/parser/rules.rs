//! Statement-level parsing: rule blocks, variables, `@import` and
//! `@keyframes`.
//!
//! The comment-stripped source is cut into statements by [`Scanner`]: a
//! prelude ending in `{`, a simple statement ending in `;`, or a closing
//! `}`. Quotes and parentheses are respected, so `;` inside a string or a
//! `rgb(...)` never ends a statement.

use std::collections::HashMap;
use std::path::Path;

use crate::error::{ParseError, ParseErrorKind};
use crate::parser::comments::strip_comments;
use crate::parser::imports::{SourceLoader, resolve_import};
use crate::parser::selectors::parse_selector_list;
use crate::parser::stylesheet::{
    Declaration, Keyframe, Keyframes, StyleBlock, next_load_order,
};
use crate::parser::values::{parse_declaration, parse_ident};
use crate::parser::variables::Variables;
use crate::parser::Parser;
use crate::selector::{SelectorArena, SelectorId};
use crate::types::Styles;

/// Everything a parse accumulates across the main file and its imports.
pub(crate) struct ParseState {
    pub(crate) selectors: SelectorArena,
    pub(crate) variables: Variables,
    pub(crate) keyframes: HashMap<String, Keyframes>,
}

impl ParseState {
    pub(crate) fn new(variables: Variables) -> Self {
        Self {
            selectors: SelectorArena::new(),
            variables,
            keyframes: HashMap::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StatementKind<'a> {
    /// Text before a `{`.
    Open(&'a str),
    /// Text ending at `;` (or at a `}` / end of input without one).
    Simple(&'a str),
    /// `}`
    Close,
}

#[derive(Debug, Clone, Copy)]
struct Statement<'a> {
    kind: StatementKind<'a>,
    /// 1-based line of the statement's first character.
    line: usize,
}

struct Scanner<'a> {
    text: &'a str,
    pos: usize,
    line_starts: Vec<usize>,
}

impl<'a> Scanner<'a> {
    fn new(text: &'a str) -> Self {
        let line_starts = std::iter::once(0)
            .chain(text.match_indices('\n').map(|(i, _)| i + 1))
            .collect();
        Self {
            text,
            pos: 0,
            line_starts,
        }
    }

    fn line_at(&self, offset: usize) -> usize {
        self.line_starts.partition_point(|&start| start <= offset)
    }

    fn next_statement(&mut self) -> Option<Statement<'a>> {
        let rest = &self.text[self.pos..];
        let skipped = rest.len() - rest.trim_start().len();
        let start = self.pos + skipped;
        if start >= self.text.len() {
            self.pos = self.text.len();
            return None;
        }
        let line = self.line_at(start);

        let mut quote: Option<char> = None;
        let mut depth = 0usize;
        for (i, c) in self.text[start..].char_indices() {
            let at = start + i;
            if let Some(q) = quote {
                if c == q {
                    quote = None;
                }
                continue;
            }
            match c {
                '"' | '\'' => quote = Some(c),
                '(' => depth += 1,
                ')' => depth = depth.saturating_sub(1),
                '{' if depth == 0 => {
                    self.pos = at + 1;
                    let prelude = self.text[start..at].trim();
                    return Some(Statement {
                        kind: StatementKind::Open(prelude),
                        line,
                    });
                }
                ';' if depth == 0 => {
                    self.pos = at + 1;
                    let text = self.text[start..at].trim();
                    return Some(Statement {
                        kind: StatementKind::Simple(text),
                        line,
                    });
                }
                '}' if depth == 0 => {
                    let text = self.text[start..at].trim();
                    if text.is_empty() {
                        self.pos = at + 1;
                        return Some(Statement {
                            kind: StatementKind::Close,
                            line,
                        });
                    }
                    // A last declaration without `;`; the `}` comes next.
                    self.pos = at;
                    return Some(Statement {
                        kind: StatementKind::Simple(text),
                        line,
                    });
                }
                _ => {}
            }
        }

        self.pos = self.text.len();
        Some(Statement {
            kind: StatementKind::Simple(self.text[start..].trim()),
            line,
        })
    }
}

/// Splits an at-rule into its name and the rest.
fn split_at_rule(text: &str) -> (&str, &str) {
    let body = text.trim_start_matches('@');
    let end = body
        .find(|c: char| c.is_whitespace() || c == '"' || c == '\'')
        .unwrap_or(body.len());
    (&body[..end], body[end..].trim())
}

/// Parses the quoted, comma-separated targets of an `@import`.
fn parse_import_targets(body: &str) -> Result<Vec<String>, ParseErrorKind> {
    let invalid = || ParseErrorKind::InvalidSyntax(format!("expected quoted import path, found `{body}`"));
    let mut targets = Vec::new();
    let mut rest = body.trim();

    loop {
        let quote = rest.chars().next().filter(|c| *c == '"' || *c == '\'').ok_or_else(invalid)?;
        let inner = &rest[1..];
        let end = inner.find(quote).ok_or_else(invalid)?;
        targets.push(inner[..end].to_string());

        rest = inner[end + 1..].trim_start();
        if rest.is_empty() {
            return Ok(targets);
        }
        rest = rest.strip_prefix(',').ok_or_else(invalid)?.trim_start();
    }
}

/// Parses a keyframe selector list (`from`, `to`, `50%`, `0%, 100%`) into
/// offsets between 0 and 1.
fn parse_keyframe_offsets(prelude: &str) -> Result<Vec<f32>, ParseErrorKind> {
    prelude
        .split(',')
        .map(|part| {
            let part = part.trim();
            let invalid = || ParseErrorKind::InvalidValue {
                property: "@keyframes".to_string(),
                value: part.to_string(),
            };
            if part.eq_ignore_ascii_case("from") {
                return Ok(0.0);
            }
            if part.eq_ignore_ascii_case("to") {
                return Ok(1.0);
            }
            let percent: f32 = part
                .strip_suffix('%')
                .and_then(|n| n.trim().parse().ok())
                .ok_or_else(invalid)?;
            if !(0.0..=100.0).contains(&percent) {
                return Err(invalid());
            }
            Ok(percent / 100.0)
        })
        .collect()
}

/// Replaces any earlier declaration of the same property and appends.
fn push_declaration(declarations: &mut Vec<Declaration>, declaration: Declaration) {
    let name = declaration.property_name();
    declarations.retain(|existing| existing.property_name() != name);
    declarations.push(declaration);
}

impl<L: SourceLoader> Parser<L> {
    /// Parses one source file, appending its top-level blocks to `out`.
    ///
    /// `depth` is the number of imports between the root sheet and `file`.
    pub(crate) fn parse_source(
        &self,
        text: &str,
        file: &Path,
        depth: usize,
        state: &mut ParseState,
        out: &mut Vec<StyleBlock>,
    ) -> Result<(), ParseError> {
        let file_name = file.display().to_string();
        let stripped = strip_comments(text, &file_name)?;
        let mut scanner = Scanner::new(&stripped);
        let err = |line: usize, kind: ParseErrorKind| ParseError::new(file_name.clone(), line, kind);

        while let Some(statement) = scanner.next_statement() {
            let line = statement.line;
            match statement.kind {
                StatementKind::Simple("") => {}
                StatementKind::Simple(text) if text.starts_with('$') => {
                    parse_variable(text, &mut state.variables).map_err(|kind| err(line, kind))?;
                }
                StatementKind::Simple(text) if text.starts_with('@') => {
                    let (name, body) = split_at_rule(text);
                    match name {
                        "import" => {
                            let targets = parse_import_targets(body).map_err(|kind| err(line, kind))?;
                            for target in targets {
                                self.import(file, &target, line, depth, state, out)?;
                            }
                        }
                        "keyframes" => {
                            return Err(err(line, ParseErrorKind::InvalidSyntax(
                                "`@keyframes` needs a block".to_string(),
                            )));
                        }
                        other => return Err(err(line, ParseErrorKind::UnknownAtRule(other.to_string()))),
                    }
                }
                StatementKind::Simple(text) => {
                    return Err(err(
                        line,
                        ParseErrorKind::InvalidSyntax(format!("`{text}` outside a rule block")),
                    ));
                }
                StatementKind::Open(prelude) if prelude.starts_with('@') => {
                    let (name, body) = split_at_rule(prelude);
                    match name {
                        "keyframes" => {
                            self.parse_keyframes(&mut scanner, body, &file_name, line, state)?;
                        }
                        "import" => {
                            return Err(err(line, ParseErrorKind::InvalidSyntax(
                                "`@import` takes no block".to_string(),
                            )));
                        }
                        other => return Err(err(line, ParseErrorKind::UnknownAtRule(other.to_string()))),
                    }
                }
                StatementKind::Open(prelude) => {
                    let block = self.parse_block(&mut scanner, prelude, None, &file_name, line, state)?;
                    if !block.is_empty() {
                        out.push(block);
                    }
                }
                StatementKind::Close => {
                    return Err(err(
                        line,
                        ParseErrorKind::InvalidSyntax("unexpected `}`".to_string()),
                    ));
                }
            }
        }
        Ok(())
    }

    fn import(
        &self,
        current: &Path,
        target: &str,
        line: usize,
        depth: usize,
        state: &mut ParseState,
        out: &mut Vec<StyleBlock>,
    ) -> Result<(), ParseError> {
        let file_name = current.display().to_string();
        let max_depth = self.config.max_import_depth;
        if depth + 1 > max_depth {
            return Err(ParseError::new(
                file_name,
                line,
                ParseErrorKind::ImportDepthExceeded(max_depth),
            ));
        }

        let path = resolve_import(&self.loader, &self.config, current, target).ok_or_else(|| {
            ParseError::new(
                file_name.clone(),
                line,
                ParseErrorKind::ImportNotFound(target.to_string()),
            )
        })?;
        log::debug!("{file_name}:{line}: importing {}", path.display());

        let source = self
            .loader
            .read(&path)
            .map_err(|io| ParseError::new(file_name.clone(), line, ParseErrorKind::Io(io)))?;
        self.parse_source(&source, &path, depth + 1, state, out)
    }

    fn parse_block(
        &self,
        scanner: &mut Scanner<'_>,
        prelude: &str,
        enclosing: Option<&[SelectorId]>,
        file: &str,
        line: usize,
        state: &mut ParseState,
    ) -> Result<StyleBlock, ParseError> {
        let err = |line: usize, kind: ParseErrorKind| ParseError::new(file, line, kind);
        let load_order = next_load_order();

        let list = match parse_selector_list(prelude) {
            Ok((rest, list)) if rest.trim().is_empty() => list,
            Ok((rest, _)) => {
                return Err(err(line, ParseErrorKind::MalformedSelector {
                    selector: prelude.to_string(),
                    reason: format!("unexpected `{}`", rest.trim()),
                }));
            }
            Err(_) => {
                return Err(err(line, ParseErrorKind::MalformedSelector {
                    selector: prelude.to_string(),
                    reason: "expected a selector".to_string(),
                }));
            }
        };
        let selectors = state
            .selectors
            .compile(&list, enclosing)
            .map_err(|kind| err(line, kind))?;
        let selector_text = state.selectors.list_text(&selectors);

        let mut declarations = Vec::new();
        let mut children = Vec::new();

        loop {
            let Some(statement) = scanner.next_statement() else {
                return Err(err(line, ParseErrorKind::UnterminatedBlock));
            };
            let at = statement.line;
            match statement.kind {
                StatementKind::Close => break,
                StatementKind::Simple("") => {}
                StatementKind::Simple(text) if text.starts_with('$') => {
                    parse_variable(text, &mut state.variables).map_err(|kind| err(at, kind))?;
                }
                StatementKind::Simple(text) | StatementKind::Open(text) if text.starts_with('@') => {
                    let (name, _) = split_at_rule(text);
                    let kind = match name {
                        "import" | "keyframes" => ParseErrorKind::InvalidSyntax(format!(
                            "`@{name}` is only allowed at the top level"
                        )),
                        other => ParseErrorKind::UnknownAtRule(other.to_string()),
                    };
                    return Err(err(at, kind));
                }
                StatementKind::Simple(text) => {
                    let declaration = parse_property(text, &state.variables)
                        .map_err(|kind| err(at, kind))?;
                    push_declaration(&mut declarations, declaration);
                }
                StatementKind::Open(nested) => {
                    let child =
                        self.parse_block(scanner, nested, Some(&selectors), file, at, state)?;
                    if !child.is_empty() {
                        children.push(child);
                    }
                }
            }
        }

        Ok(StyleBlock {
            styles: Styles::from_declarations(&declarations),
            selectors,
            selector_text,
            declarations,
            children,
            file: file.to_string(),
            line,
            load_order,
        })
    }

    fn parse_keyframes(
        &self,
        scanner: &mut Scanner<'_>,
        name: &str,
        file: &str,
        line: usize,
        state: &mut ParseState,
    ) -> Result<(), ParseError> {
        let err = |line: usize, kind: ParseErrorKind| ParseError::new(file, line, kind);
        let name = match parse_ident(name) {
            Ok(("", ident)) => ident.to_string(),
            _ => {
                return Err(err(line, ParseErrorKind::InvalidSyntax(format!(
                    "invalid keyframes name `{name}`"
                ))));
            }
        };

        let mut frames: Vec<Keyframe> = Vec::new();
        loop {
            let Some(statement) = scanner.next_statement() else {
                return Err(err(line, ParseErrorKind::UnterminatedBlock));
            };
            let at = statement.line;
            match statement.kind {
                StatementKind::Close => break,
                StatementKind::Simple("") => {}
                StatementKind::Simple(text) => {
                    return Err(err(at, ParseErrorKind::InvalidSyntax(format!(
                        "`{text}` outside a keyframe"
                    ))));
                }
                StatementKind::Open(prelude) => {
                    let offsets = parse_keyframe_offsets(prelude).map_err(|kind| err(at, kind))?;
                    let styles = parse_frame_body(scanner, &state.variables)
                        .map_err(|(frame_line, kind)| err(frame_line.unwrap_or(line), kind))?;
                    for offset in offsets {
                        match frames.iter_mut().find(|f| f.offset == offset) {
                            Some(frame) => frame.styles.merge(&styles),
                            None => frames.push(Keyframe {
                                offset,
                                styles: styles.clone(),
                            }),
                        }
                    }
                }
            }
        }

        frames.sort_by(|a, b| a.offset.total_cmp(&b.offset));
        log::debug!("{file}:{line}: keyframes `{name}` with {} frames", frames.len());
        state
            .keyframes
            .insert(name.clone(), Keyframes { name, frames });
        Ok(())
    }
}

/// Parses the declarations of one keyframe up to its `}`.
///
/// Errors carry the line they occurred on, or `None` when the frame is
/// never closed.
fn parse_frame_body(
    scanner: &mut Scanner<'_>,
    variables: &Variables,
) -> Result<Styles, (Option<usize>, ParseErrorKind)> {
    let mut declarations = Vec::new();
    loop {
        let Some(statement) = scanner.next_statement() else {
            return Err((None, ParseErrorKind::UnterminatedBlock));
        };
        match statement.kind {
            StatementKind::Close => break,
            StatementKind::Simple("") => {}
            StatementKind::Simple(text) => {
                let declaration = parse_property(text, variables)
                    .map_err(|kind| (Some(statement.line), kind))?;
                push_declaration(&mut declarations, declaration);
            }
            StatementKind::Open(_) => {
                return Err((
                    Some(statement.line),
                    ParseErrorKind::InvalidSyntax("nested block inside a keyframe".to_string()),
                ));
            }
        }
    }
    Ok(Styles::from_declarations(&declarations))
}

/// Parses `name: value`, substituting variables in the value.
fn parse_property(text: &str, variables: &Variables) -> Result<Declaration, ParseErrorKind> {
    let (name, value) = text.split_once(':').ok_or_else(|| {
        ParseErrorKind::InvalidSyntax(format!("expected `property: value`, found `{text}`"))
    })?;
    let name = name.trim();
    if !matches!(parse_ident(name), Ok(("", _))) {
        return Err(ParseErrorKind::InvalidSyntax(format!(
            "invalid property name `{name}`"
        )));
    }
    let value = variables.substitute(value)?;
    parse_declaration(name, &value)
}

/// Applies a `$name: value` or `$name: value !default` statement.
fn parse_variable(text: &str, variables: &mut Variables) -> Result<(), ParseErrorKind> {
    let (name, value) = text[1..].split_once(':').ok_or_else(|| {
        ParseErrorKind::InvalidSyntax(format!("expected `$name: value`, found `{text}`"))
    })?;
    let name = name.trim();
    if !matches!(parse_ident(name), Ok(("", _))) {
        return Err(ParseErrorKind::InvalidSyntax(format!(
            "invalid variable name `${name}`"
        )));
    }

    let value = value.trim();
    let (value, is_default) = match value.strip_suffix("!default") {
        Some(rest) => (rest.trim_end(), true),
        None => (value, false),
    };
    if is_default && variables.get(name).is_some() {
        return Ok(());
    }

    let value = variables.substitute(value)?;
    variables.define(name, value);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn statements(text: &str) -> Vec<(StatementKind<'_>, usize)> {
        let mut scanner = Scanner::new(text);
        std::iter::from_fn(|| scanner.next_statement())
            .map(|s| (s.kind, s.line))
            .collect()
    }

    #[test]
    fn test_scanner_statement_kinds() {
        assert_eq!(
            statements("A {\n  color: red;\n  width: 1\n}\n$x: 1;"),
            vec![
                (StatementKind::Open("A"), 1),
                (StatementKind::Simple("color: red"), 2),
                (StatementKind::Simple("width: 1"), 3),
                (StatementKind::Close, 4),
                (StatementKind::Simple("$x: 1"), 5),
            ]
        );
    }

    #[test]
    fn test_scanner_respects_quotes_and_parens() {
        assert_eq!(
            statements("font-family: \"a;b\"; color: rgb(1;2)"),
            vec![
                (StatementKind::Simple("font-family: \"a;b\""), 1),
                (StatementKind::Simple("color: rgb(1;2)"), 1),
            ]
        );
    }

    #[test]
    fn test_import_targets() {
        assert_eq!(
            parse_import_targets("\"a\", 'b/c'").unwrap(),
            vec!["a".to_string(), "b/c".to_string()]
        );
        assert!(parse_import_targets("a").is_err());
        assert!(parse_import_targets("\"a\" \"b\"").is_err());
    }

    #[test]
    fn test_keyframe_offsets() {
        assert_eq!(parse_keyframe_offsets("from").unwrap(), vec![0.0]);
        assert_eq!(parse_keyframe_offsets("50%, to").unwrap(), vec![0.5, 1.0]);
        assert!(parse_keyframe_offsets("120%").is_err());
        assert!(parse_keyframe_offsets("middle").is_err());
    }

    #[test]
    fn test_variable_default_keeps_existing_value() {
        let mut vars = Variables::new();
        parse_variable("$a: 1", &mut vars).unwrap();
        parse_variable("$a: 2 !default", &mut vars).unwrap();
        parse_variable("$b: $a 3 !default", &mut vars).unwrap();
        assert_eq!(vars.get("a"), Some("1"));
        assert_eq!(vars.get("b"), Some("1 3"));
    }

    #[test]
    fn test_push_declaration_is_last_write_wins() {
        let mut declarations = Vec::new();
        push_declaration(&mut declarations, parse_declaration("color", "red").unwrap());
        push_declaration(&mut declarations, parse_declaration("width", "1").unwrap());
        push_declaration(&mut declarations, parse_declaration("color", "blue").unwrap());
        assert_eq!(declarations.len(), 2);
        assert_eq!(declarations[1].property_name(), "color");
    }
}
