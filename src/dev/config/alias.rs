use serde::Serialize;
use std::path::{Path, PathBuf};

/// Import prefix for the frontend sources.
pub const SOURCE_ALIAS: &str = "@";

/// Source subdirectory the alias points at, relative to the project root.
pub const SOURCE_DIR: &str = "src";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Alias {
    pub prefix: String,
    pub dir: PathBuf,
}

/// Symbolic import prefixes mapped onto directories.
#[derive(Debug, Clone, Serialize)]
#[serde(transparent)]
pub struct AliasTable {
    entries: Vec<Alias>,
}

impl AliasTable {
    /// Builds the table with its single entry, `@` -> `<root>/src`.
    pub fn new(root: &Path) -> Self {
        Self {
            entries: vec![Alias {
                prefix: SOURCE_ALIAS.to_string(),
                dir: root.join(SOURCE_DIR),
            }],
        }
    }

    pub fn entries(&self) -> impl Iterator<Item = &Alias> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Resolve an import specifier such as `@/components/Inbox.vue`.
    ///
    /// Returns `None` when no alias owns the specifier. `@foo` is not owned by
    /// `@`; only the bare alias or the alias followed by `/` is.
    pub fn resolve(&self, specifier: &str) -> Option<PathBuf> {
        self.entries.iter().find_map(|alias| {
            let rest = specifier.strip_prefix(alias.prefix.as_str())?;
            if rest.is_empty() {
                return Some(alias.dir.clone());
            }
            let rest = rest.strip_prefix('/')?;
            Some(
                rest.split('/')
                    .filter(|segment| !segment.is_empty())
                    .fold(alias.dir.clone(), |path, segment| path.join(segment)),
            )
        })
    }
}
