//! Comment stripping.
//!
//! Comments are blanked out rather than removed: every byte of a comment
//! becomes a space and newlines are kept, so byte offsets and line numbers
//! in the stripped text still point at the original source.

use crate::error::{ParseError, ParseErrorKind};

/// Blanks `//` and `/* */` comments in `source`.
///
/// Text inside quotes is left alone, and a comment start directly after a
/// `:` is not a comment, so `http://host` style values survive.
///
/// # Errors
///
/// Returns [`ParseErrorKind::UnterminatedComment`] at the line where the
/// unclosed `/*` starts.
pub fn strip_comments(source: &str, file: &str) -> Result<String, ParseError> {
    let mut output = String::with_capacity(source.len());
    let mut chars = source.char_indices().peekable();
    let mut quote: Option<char> = None;
    let mut previous: Option<char> = None;
    let mut line = 1;

    while let Some((_, c)) = chars.next() {
        if let Some(q) = quote {
            if c == q {
                quote = None;
            }
            if c == '\n' {
                line += 1;
            }
            output.push(c);
            previous = Some(c);
            continue;
        }

        let next = chars.peek().map(|(_, n)| *n);
        match (c, next) {
            ('"' | '\'', _) => {
                quote = Some(c);
                output.push(c);
            }
            ('/', Some('/')) if previous != Some(':') => {
                output.push(' ');
                while let Some((_, n)) = chars.peek() {
                    if *n == '\n' {
                        break;
                    }
                    blank(&mut output, *n);
                    chars.next();
                }
            }
            ('/', Some('*')) if previous != Some(':') => {
                let start_line = line;
                chars.next();
                output.push_str("  ");
                let mut closed = false;
                while let Some((_, n)) = chars.next() {
                    if n == '*' && chars.peek().map(|(_, c)| *c) == Some('/') {
                        chars.next();
                        output.push_str("  ");
                        closed = true;
                        break;
                    }
                    if n == '\n' {
                        line += 1;
                    }
                    blank(&mut output, n);
                }
                if !closed {
                    return Err(ParseError::new(
                        file,
                        start_line,
                        ParseErrorKind::UnterminatedComment,
                    ));
                }
                previous = Some(' ');
                continue;
            }
            ('\n', _) => {
                line += 1;
                output.push(c);
            }
            _ => output.push(c),
        }
        previous = Some(c);
    }

    Ok(output)
}

fn blank(output: &mut String, c: char) {
    if c == '\n' {
        output.push('\n');
    } else {
        output.extend(std::iter::repeat_n(' ', c.len_utf8()));
    }
}
