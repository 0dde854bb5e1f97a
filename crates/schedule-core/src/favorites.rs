//! Favorite sessions.
//!
//! The provider only needs to ask whether a session name is a favorite, so
//! it depends on the [`FavoriteLookup`] trait. [`FavoritesStore`] is the
//! JSON-file backed implementation used by the CLI.

use std::collections::{BTreeSet, HashSet};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, ScheduleError};

/// Answers whether a session (keyed by its display name) is a favorite.
pub trait FavoriteLookup: Send + Sync {
    fn has_favorite(&self, session_name: &str) -> bool;
}

impl FavoriteLookup for HashSet<String> {
    fn has_favorite(&self, session_name: &str) -> bool {
        self.contains(session_name)
    }
}

/// A lookup with no favorites at all.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoFavorites;

impl FavoriteLookup for NoFavorites {
    fn has_favorite(&self, _session_name: &str) -> bool {
        false
    }
}

/// Favorite session names persisted to `~/.conference-schedule/favorites.json`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FavoritesStore {
    #[serde(default)]
    names: BTreeSet<String>,
}

impl FavoritesStore {
    /// Default location of the favorites file.
    pub fn default_path() -> PathBuf {
        Self::path_in(&dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
    }

    /// Favorites path rooted at `base_dir` (used for testing).
    pub fn path_in(base_dir: &Path) -> PathBuf {
        base_dir.join(".conference-schedule").join("favorites.json")
    }

    /// Load favorites from `path`. A missing file yields an empty store; a
    /// corrupt one is an error so it is never silently overwritten.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(source) => {
                return Err(ScheduleError::FileRead {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };
        Ok(serde_json::from_str(&content)?)
    }

    /// Atomically write the store to `path`, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;

        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, json)?;
        std::fs::rename(&tmp, path)?;
        Ok(())
    }

    /// Mark a session as favorite. Returns `false` if it already was.
    pub fn add(&mut self, session_name: impl Into<String>) -> bool {
        self.names.insert(session_name.into())
    }

    /// Unmark a session. Returns `false` if it was not a favorite.
    pub fn remove(&mut self, session_name: &str) -> bool {
        self.names.remove(session_name)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl FavoriteLookup for FavoritesStore {
    fn has_favorite(&self, session_name: &str) -> bool {
        self.names.contains(session_name)
    }
}
