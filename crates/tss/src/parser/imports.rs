//! `@import` path resolution and source loading.
//!
//! ```css
//! @import "partial";          /* ./_partial.tss, then ./partial.tss */
//! @import "../shared/base";   /* relative to the importing file */
//! @import "/themes/dark";     /* searched in each themes root */
//! ```

use std::collections::HashMap;
use std::io;
use std::path::{Component, Path, PathBuf};

use crate::parser::ParserConfig;

/// Where stylesheet sources come from.
pub trait SourceLoader {
    fn exists(&self, path: &Path) -> bool;
    fn read(&self, path: &Path) -> io::Result<String>;
}

/// Loads sources from the real filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsLoader;

impl SourceLoader for FsLoader {
    fn exists(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn read(&self, path: &Path) -> io::Result<String> {
        std::fs::read_to_string(path)
    }
}

/// In-memory sources, keyed by normalized path.
///
/// # Examples
///
/// ```
/// use tss::parser::{MemoryLoader, Parser, Variables};
///
/// let loader = MemoryLoader::new().with_file("_colors.tss", "$accent: red;");
/// let parser = Parser::with_loader(loader);
/// let sheet = parser
///     .parse("@import \"colors\";\nLabel { color: $accent; }", "main.tss", &Variables::new())
///     .unwrap();
/// assert_eq!(sheet.variables.get("accent"), Some("red"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemoryLoader {
    files: HashMap<PathBuf, String>,
}

impl MemoryLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, path: impl AsRef<Path>, source: impl Into<String>) {
        self.files
            .insert(normalize(Path::new(""), path.as_ref()), source.into());
    }

    pub fn with_file(mut self, path: impl AsRef<Path>, source: impl Into<String>) -> Self {
        self.insert(path, source);
        self
    }
}

impl SourceLoader for MemoryLoader {
    fn exists(&self, path: &Path) -> bool {
        self.files.contains_key(path)
    }

    fn read(&self, path: &Path) -> io::Result<String> {
        self.files.get(path).cloned().ok_or_else(|| {
            io::Error::new(io::ErrorKind::NotFound, path.display().to_string())
        })
    }
}

/// Joins `relative` onto `base`, folding `.` and `..` components.
///
/// `..` pops a directory while there is one; beyond that it is kept so a
/// relative base can still climb.
pub fn normalize(base: &Path, relative: &Path) -> PathBuf {
    let mut parts: Vec<Component<'_>> = Vec::new();
    for component in base.components().chain(relative.components()) {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match parts.last() {
                Some(Component::Normal(_)) => {
                    parts.pop();
                }
                Some(Component::RootDir | Component::Prefix(_)) => {}
                _ => parts.push(component),
            },
            other => parts.push(other),
        }
    }
    parts.iter().collect()
}

/// Candidate files for one import target, in search order.
///
/// An extensionless name follows the partial convention: `_name.ext`
/// first, then `name.ext`.
fn candidates(path: PathBuf, extension: &str) -> Vec<PathBuf> {
    if path.extension().is_some() {
        return vec![path];
    }
    let Some(stem) = path.file_name().and_then(|name| name.to_str()) else {
        return Vec::new();
    };
    let dir = path.parent().unwrap_or(Path::new(""));
    vec![
        dir.join(format!("_{stem}.{extension}")),
        dir.join(format!("{stem}.{extension}")),
    ]
}

/// Resolves an `@import` target for a file at `current`.
///
/// Returns the first candidate `loader` reports as existing.
pub fn resolve_import(
    loader: &impl SourceLoader,
    config: &ParserConfig,
    current: &Path,
    target: &str,
) -> Option<PathBuf> {
    let mut search = Vec::new();

    match target.strip_prefix('/') {
        Some(rooted) => {
            for root in &config.themes_roots {
                search.extend(candidates(normalize(root, Path::new(rooted)), &config.extension));
            }
        }
        None => {
            let base = current.parent().unwrap_or(Path::new(""));
            search.extend(candidates(normalize(base, Path::new(target)), &config.extension));
        }
    }

    search.into_iter().find(|candidate| loader.exists(candidate))
}
