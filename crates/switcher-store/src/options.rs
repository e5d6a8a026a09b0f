//! Named option persistence
//!
//! All plugin state lives in named option values. The [`OptionStore`]
//! trait is the seam to the host's persistence; this crate ships a
//! TOML-file-per-option implementation and an in-memory one.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;

use crate::error::Result;

/// Well-known option names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionName {
    /// The ordered theme rule list
    ThemeRules,
    /// REST prefix mappings
    RestPrefixes,
    /// The cross-theme object registry
    ThemeObjects,
}

impl OptionName {
    /// Get the string name of the option.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ThemeRules => "theme-rules",
            Self::RestPrefixes => "rest-prefixes",
            Self::ThemeObjects => "theme-objects",
        }
    }
}

impl std::fmt::Display for OptionName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The option name holding a user's dashboard theme preference.
pub fn admin_theme_option(user: u64) -> String {
    format!("admin-theme-{user}")
}

/// Read/write access to named option values.
///
/// `write` reports whether anything changed; callers use that to skip
/// redundant persistence. A missing option reads as `None`.
pub trait OptionStore {
    fn read(&self, name: &str) -> Result<Option<String>>;
    fn write(&self, name: &str, value: &str) -> Result<bool>;
    fn delete(&self, name: &str) -> Result<bool>;
}

/// In-memory option store for tests and embedded hosts.
#[derive(Debug, Default)]
pub struct MemoryOptions {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryOptions {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        self.values
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

impl OptionStore for MemoryOptions {
    fn read(&self, name: &str) -> Result<Option<String>> {
        Ok(self.lock().get(name).cloned())
    }

    fn write(&self, name: &str, value: &str) -> Result<bool> {
        let mut values = self.lock();
        if values.get(name).is_some_and(|v| v == value) {
            return Ok(false);
        }
        values.insert(name.to_string(), value.to_string());
        Ok(true)
    }

    fn delete(&self, name: &str) -> Result<bool> {
        Ok(self.lock().remove(name).is_some())
    }
}

/// Option store persisting one TOML document per option under a directory.
#[derive(Debug, Clone)]
pub struct TomlOptions {
    dir: PathBuf,
}

impl TomlOptions {
    /// Create a store rooted at `dir`. The directory is created lazily on
    /// first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{name}.toml"))
    }

    /// The directory options are stored under.
    pub fn dir(&self) -> &PathBuf {
        &self.dir
    }
}

impl OptionStore for TomlOptions {
    fn read(&self, name: &str) -> Result<Option<String>> {
        let path = self.path_for(name);
        if !path.is_file() {
            return Ok(None);
        }
        Ok(Some(std::fs::read_to_string(path)?))
    }

    fn write(&self, name: &str, value: &str) -> Result<bool> {
        let path = self.path_for(name);
        if path.is_file() && std::fs::read_to_string(&path)? == value {
            tracing::debug!(option = name, "option unchanged; skipping write");
            return Ok(false);
        }
        if let Some(parent) = path.parent()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, value)?;
        Ok(true)
    }

    fn delete(&self, name: &str) -> Result<bool> {
        let path = self.path_for(name);
        if !path.is_file() {
            return Ok(false);
        }
        std::fs::remove_file(path)?;
        Ok(true)
    }
}
