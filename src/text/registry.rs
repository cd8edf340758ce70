use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// File extensions recognized as outline fonts (compared case-insensitively).
pub const FONT_EXTENSIONS: [&str; 2] = ["ttf", "otf"];

/// Directories searched when no explicit font paths are configured.
pub fn default_search_paths() -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from("/usr/share/fonts")];
    if let Some(home) = std::env::var_os("HOME") {
        paths.push(PathBuf::from(home).join(".fonts"));
    }
    paths
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
/// Mapping from bare font name (file stem) to font file path.
pub struct FontRegistry {
    paths: BTreeMap<String, PathBuf>,
}

impl FontRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Walk every directory in `search_paths` and register the fonts found.
    ///
    /// Later paths win when two files share a name. Unreadable or missing directories are skipped.
    pub fn discover<P: AsRef<Path>>(search_paths: &[P]) -> Self {
        let mut registry = Self::new();
        for dir in search_paths {
            registry.scan_dir(dir.as_ref());
        }
        tracing::debug!(fonts = registry.len(), "font discovery finished");
        registry
    }

    /// Register every font file below `dir`; returns how many were added or replaced.
    pub fn scan_dir(&mut self, dir: &Path) -> usize {
        let mut found = 0usize;
        for entry in walkdir::WalkDir::new(dir).follow_links(true) {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    if err.depth() == 0 {
                        tracing::debug!(dir = %dir.display(), "font search path unavailable: {err}");
                    } else {
                        tracing::warn!(dir = %dir.display(), "skipping unreadable font entry: {err}");
                    }
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }
            let path = entry.path();
            let Some(name) = font_name(path) else {
                continue;
            };
            self.paths.insert(name, path.to_path_buf());
            found += 1;
        }
        found
    }

    /// Register (or replace) a single font file under `name`.
    pub fn register(&mut self, name: impl Into<String>, path: impl Into<PathBuf>) {
        self.paths.insert(name.into(), path.into());
    }

    /// Path registered for `name`.
    pub fn resolve(&self, name: &str) -> Option<&Path> {
        self.paths.get(name).map(PathBuf::as_path)
    }

    /// `true` when `name` is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.paths.contains_key(name)
    }

    /// Registered names in sorted order.
    pub fn names(&self) -> Vec<String> {
        self.paths.keys().cloned().collect()
    }

    /// Number of registered fonts.
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    /// `true` when nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

/// Font name for `path` (its file stem) when the extension is a recognized outline format.
pub fn font_name(path: &Path) -> Option<String> {
    let ext = path.extension()?.to_str()?;
    if !FONT_EXTENSIONS
        .iter()
        .any(|known| known.eq_ignore_ascii_case(ext))
    {
        return None;
    }
    path.file_stem()?.to_str().map(str::to_owned)
}

#[cfg(test)]
#[path = "../../tests/unit/text/registry.rs"]
mod tests;
