//! Installed theme directory
//!
//! The engine validates every candidate override against the set of
//! installed themes; a rule naming a theme that no longer exists falls
//! through as a non-match.

use std::collections::BTreeSet;

/// Access to the host's installed themes.
pub trait ThemeProvider {
    /// Whether a theme with this slug is installed.
    fn exists(&self, slug: &str) -> bool;

    /// Slug of the currently loaded theme.
    fn current(&self) -> String;
}

/// Theme directory backed by an explicit slug set.
#[derive(Debug, Clone)]
pub struct ThemeSet {
    themes: BTreeSet<String>,
    current: String,
}

impl ThemeSet {
    /// Create a directory containing only the current theme.
    pub fn new(current: impl Into<String>) -> Self {
        let current = current.into();
        let mut themes = BTreeSet::new();
        themes.insert(current.clone());
        Self { themes, current }
    }

    /// Add an installed theme.
    pub fn with_theme(mut self, slug: impl Into<String>) -> Self {
        self.themes.insert(slug.into());
        self
    }
}

impl ThemeProvider for ThemeSet {
    fn exists(&self, slug: &str) -> bool {
        self.themes.contains(slug)
    }

    fn current(&self) -> String {
        self.current.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn current_theme_is_always_installed() {
        let themes = ThemeSet::new("main").with_theme("themeB");
        assert!(themes.exists("main"));
        assert!(themes.exists("themeB"));
        assert!(!themes.exists("gone"));
        assert_eq!(themes.current(), "main");
    }
}
