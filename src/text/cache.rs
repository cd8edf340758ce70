use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use anyhow::Context as _;
use serde::{Deserialize, Serialize};

use crate::foundation::error::{GifcaptionError, GifcaptionResult};
use crate::text::font::FontParser;
use crate::text::registry::{FontRegistry, default_search_paths};

/// Default number of parsed fonts kept in memory.
pub const DEFAULT_FONT_CACHE_CAPACITY: usize = 8;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
/// Startup configuration for a [`FontCache`].
pub struct FontCacheConfig {
    /// Maximum number of parsed fonts held at once (>= 1).
    pub capacity: usize,
    /// Directories walked to build the name -> path registry.
    pub search_paths: Vec<PathBuf>,
    /// Font used when a lookup passes an empty name.
    pub default_font: Option<String>,
}

impl Default for FontCacheConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_FONT_CACHE_CAPACITY,
            search_paths: default_search_paths(),
            default_font: None,
        }
    }
}

#[derive(Clone, Debug)]
struct LoadedFont<F> {
    name: String,
    font: F,
}

#[derive(Debug)]
struct CacheState<F> {
    registry: FontRegistry,
    default_font: Option<String>,
    loaded: VecDeque<LoadedFont<F>>,
}

/// Bounded, thread-safe cache of parsed fonts keyed by name.
///
/// Eviction is strict FIFO by insertion order: hits do not refresh an entry. Lookup, file read,
/// parse and eviction run under one lock, so concurrent callers never parse the same font twice
/// or reorder the eviction queue.
pub struct FontCache<P: FontParser> {
    parser: P,
    capacity: usize,
    state: Mutex<CacheState<P::Font>>,
}

impl<P: FontParser> std::fmt::Debug for FontCache<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state();
        f.debug_struct("FontCache")
            .field("capacity", &self.capacity)
            .field("registered", &state.registry.len())
            .field("loaded", &state.loaded.len())
            .field("default_font", &state.default_font)
            .finish()
    }
}

impl<P: FontParser> FontCache<P> {
    /// Build a cache over an existing registry.
    pub fn new(parser: P, registry: FontRegistry, capacity: usize) -> GifcaptionResult<Self> {
        if capacity == 0 {
            return Err(GifcaptionError::validation(
                "font cache capacity must be >= 1",
            ));
        }
        Ok(Self {
            parser,
            capacity,
            state: Mutex::new(CacheState {
                registry,
                default_font: None,
                loaded: VecDeque::with_capacity(capacity),
            }),
        })
    }

    /// Discover fonts under `config.search_paths` and apply `config.default_font`.
    pub fn from_config(parser: P, config: &FontCacheConfig) -> GifcaptionResult<Self> {
        let registry = FontRegistry::discover(&config.search_paths);
        let cache = Self::new(parser, registry, config.capacity)?;
        if let Some(name) = &config.default_font {
            cache.set_default(name)?;
        }
        Ok(cache)
    }

    /// Discover fonts under the platform default directories plus `extra_paths`.
    pub fn with_default_paths(
        parser: P,
        extra_paths: &[PathBuf],
        capacity: usize,
    ) -> GifcaptionResult<Self> {
        let mut search_paths = default_search_paths();
        search_paths.extend(extra_paths.iter().cloned());
        Self::from_config(
            parser,
            &FontCacheConfig {
                capacity,
                search_paths,
                default_font: None,
            },
        )
    }

    fn state(&self) -> MutexGuard<'_, CacheState<P::Font>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Parser used on cache misses.
    pub fn parser(&self) -> &P {
        &self.parser
    }

    /// Configured capacity.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Return the parsed font for `name`, reading and parsing it on a miss.
    ///
    /// An empty `name` selects the default font.
    #[tracing::instrument(skip(self), fields(capacity = self.capacity))]
    pub fn load(&self, name: &str) -> GifcaptionResult<P::Font> {
        let mut state = self.state();

        let name = if name.is_empty() {
            state.default_font.clone().ok_or_else(|| {
                GifcaptionError::font("no font name given and no default font is set")
            })?
        } else {
            name.to_owned()
        };

        if let Some(hit) = state.loaded.iter().find(|f| f.name == name) {
            tracing::debug!(font = %name, "font cache hit");
            return Ok(hit.font.clone());
        }

        let path = state
            .registry
            .resolve(&name)
            .map(Path::to_path_buf)
            .ok_or_else(|| GifcaptionError::font(format!("font '{name}' not found")))?;

        let bytes = std::fs::read(&path)
            .with_context(|| format!("read font file '{}'", path.display()))
            .map_err(|e| GifcaptionError::font(format!("font '{name}': {e:#}")))?;
        let font = self
            .parser
            .parse(bytes)
            .map_err(|e| GifcaptionError::font(format!("error parsing font '{name}': {e:#}")))?;

        if state.loaded.len() >= self.capacity
            && let Some(evicted) = state.loaded.pop_front()
        {
            tracing::debug!(evicted = %evicted.name, "font cache full, evicting oldest entry");
        }
        tracing::debug!(font = %name, path = %path.display(), "font cache miss, parsed");
        state.loaded.push_back(LoadedFont {
            name,
            font: font.clone(),
        });
        Ok(font)
    }

    /// Make `name` the font used for empty-name lookups.
    pub fn set_default(&self, name: &str) -> GifcaptionResult<()> {
        let mut state = self.state();
        if !state.registry.contains(name) {
            return Err(GifcaptionError::font(format!("no font '{name}' found")));
        }
        state.default_font = Some(name.to_owned());
        Ok(())
    }

    /// Current default font name.
    pub fn default_font(&self) -> Option<String> {
        self.state().default_font.clone()
    }

    /// Register an extra font file under `name`.
    pub fn register(&self, name: impl Into<String>, path: impl Into<PathBuf>) {
        self.state().registry.register(name, path);
    }

    /// All registered font names, sorted.
    pub fn list_fonts(&self) -> Vec<String> {
        self.state().registry.names()
    }

    /// Names of the currently parsed fonts, oldest first.
    pub fn loaded_names(&self) -> Vec<String> {
        self.state().loaded.iter().map(|f| f.name.clone()).collect()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/text/cache.rs"]
mod tests;
