//! TSS parsing and stylesheet data structures.
//!
//! - [`Parser`]: parses source text (and its imports) into a [`StyleSheet`]
//! - [`parse_stylesheet`]: one-shot helper for a self-contained sheet
//! - [`ParserConfig`]: themes roots, file extension and import depth limit
//!
//! ## Submodules
//!
//! - [`comments`]: comment stripping that keeps line numbers intact
//! - [`rules`]: statement scanning, blocks, variables, imports, keyframes
//! - [`selectors`]: selector grammar (type, class, ID, pseudo, combinators)
//! - [`stylesheet`]: the parsed model
//! - [`units`]: numbers, lengths and durations
//! - [`values`]: per-property value parsing
//! - [`variables`]: `$variable` storage and substitution
//! - [`imports`]: `@import` resolution and source loaders
//!
//! ## Example
//!
//! ```rust
//! use tss::parser::parse_stylesheet;
//!
//! let sheet = parse_stylesheet("Button { color: red; &:hover { color: blue; } }").unwrap();
//! let texts: Vec<_> = sheet.blocks().map(|b| b.selector_text.as_str()).collect();
//! assert_eq!(texts, ["button", "button:hover"]);
//! ```

pub mod comments;
pub mod imports;
pub mod rules;
pub mod selectors;
pub mod stylesheet;
pub mod units;
pub mod values;
pub mod variables;

use std::path::{Path, PathBuf};

pub use imports::{FsLoader, MemoryLoader, SourceLoader};
pub use selectors::{ComplexSelector, CompoundSelector, Selector, SelectorList, SelectorPart};
pub use stylesheet::{Declaration, Keyframe, Keyframes, StyleBlock, StyleSheet};
pub use variables::Variables;

use crate::error::{ParseError, ParseErrorKind};

/// Default limit on nested `@import`s.
pub const MAX_IMPORT_DEPTH: usize = 10;

/// Stylesheet file extension used for extensionless imports.
pub const DEFAULT_EXTENSION: &str = "tss";

/// Parser settings.
#[derive(Debug, Clone)]
pub struct ParserConfig {
    /// Searched in order for imports starting with `/`.
    pub themes_roots: Vec<PathBuf>,
    /// Extension appended to extensionless import names.
    pub extension: String,
    pub max_import_depth: usize,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            themes_roots: Vec::new(),
            extension: DEFAULT_EXTENSION.to_string(),
            max_import_depth: MAX_IMPORT_DEPTH,
        }
    }
}

impl ParserConfig {
    pub fn with_themes_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.themes_roots.push(root.into());
        self
    }

    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }

    pub fn with_max_import_depth(mut self, depth: usize) -> Self {
        self.max_import_depth = depth;
        self
    }
}

/// Stylesheet parser.
///
/// Parsing is a pure function of the source text and whatever the loader
/// returns for imports; a parser can be shared and reused freely.
#[derive(Debug, Clone, Default)]
pub struct Parser<L: SourceLoader = FsLoader> {
    loader: L,
    config: ParserConfig,
}

impl Parser<FsLoader> {
    /// A parser reading imports from the filesystem.
    pub fn new() -> Self {
        Self::default()
    }
}

impl<L: SourceLoader> Parser<L> {
    pub fn with_loader(loader: L) -> Self {
        Self {
            loader,
            config: ParserConfig::default(),
        }
    }

    pub fn with_config(mut self, config: ParserConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    pub fn loader(&self) -> &L {
        &self.loader
    }

    /// Parses `text` as if it were the contents of `filename`.
    ///
    /// `variables` seeds the variable table; definitions in the sheet are
    /// applied on top of a copy.
    pub fn parse(
        &self,
        text: &str,
        filename: &str,
        variables: &Variables,
    ) -> Result<StyleSheet, ParseError> {
        let mut state = rules::ParseState::new(variables.clone());
        let mut blocks = Vec::new();
        self.parse_source(text, Path::new(filename), 0, &mut state, &mut blocks)?;

        log::debug!(
            "parsed {filename}: {} top-level blocks, {} selectors",
            blocks.len(),
            state.selectors.len()
        );

        Ok(StyleSheet {
            filename: filename.to_string(),
            blocks,
            variables: state.variables,
            keyframes: state.keyframes,
            selectors: state.selectors,
        })
    }

    /// Reads and parses a stylesheet through the loader.
    ///
    /// A file that cannot be read is reported at line 1 of `path`.
    pub fn parse_file(
        &self,
        path: impl AsRef<Path>,
        variables: &Variables,
    ) -> Result<StyleSheet, ParseError> {
        let path = path.as_ref();
        let filename = path.display().to_string();
        let text = self
            .loader
            .read(path)
            .map_err(|err| ParseError::new(filename.clone(), 1, ParseErrorKind::Io(err)))?;
        self.parse(&text, &filename, variables)
    }
}

/// Parses a self-contained stylesheet with default settings.
///
/// Imports resolve against the current directory.
pub fn parse_stylesheet(source: &str) -> Result<StyleSheet, ParseError> {
    Parser::new().parse(source, "<string>", &Variables::new())
}
