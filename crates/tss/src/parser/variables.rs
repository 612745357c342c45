//! Stylesheet variables (SCSS-style `$variable` syntax).
//!
//! ```css
//! $accent: #ff0000;
//! $accent: blue !default;   /* ignored, $accent is already set */
//!
//! Button {
//!     color: $accent;
//! }
//! ```
//!
//! References are substituted while parsing, so a variable must be defined
//! (in this file or an earlier import) before it is used.

use std::collections::HashMap;

use crate::error::ParseErrorKind;

/// Storage for stylesheet-defined variables.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Variables {
    variables: HashMap<String, String>,
}

impl Variables {
    /// Creates an empty variable storage.
    pub fn new() -> Self {
        Self::default()
    }

    /// Defines a variable with the given name and value, replacing any
    /// previous value.
    pub fn define(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.variables.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.variables.get(name).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.variables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }

    /// Replaces every `$name` reference in `text` with its value.
    pub fn substitute(&self, text: &str) -> Result<String, ParseErrorKind> {
        let mut output = String::with_capacity(text.len());
        let mut rest = text;

        while let Some(at) = rest.find('$') {
            output.push_str(&rest[..at]);
            let after = &rest[at + 1..];
            let len = after
                .find(|c: char| !(c.is_alphanumeric() || c == '-' || c == '_'))
                .unwrap_or(after.len());
            let name = &after[..len];
            if name.is_empty() {
                return Err(ParseErrorKind::InvalidSyntax(format!(
                    "`$` without a variable name in `{}`",
                    text.trim()
                )));
            }
            let value = self
                .get(name)
                .ok_or_else(|| ParseErrorKind::UnknownVariable(name.to_string()))?;
            output.push_str(value);
            rest = &after[len..];
        }
        output.push_str(rest);
        Ok(output)
    }
}
