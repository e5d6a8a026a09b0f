//! REST prefix mappings
//!
//! A mapping assigns a theme its own REST URL prefix, letting two themes
//! expose conflicting REST routes side by side. Each theme has at most
//! one mapping; saving a prefix for an already-mapped theme updates the
//! existing entry in place.

use serde::{Deserialize, Serialize};

/// The default REST URL prefix.
pub const DEFAULT_REST_PREFIX: &str = "wp-json";

/// Association between a theme and a custom REST URL prefix.
///
/// An empty prefix means "use the default".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RestPrefixMapping {
    /// Theme slug
    pub theme: String,
    /// Sanitized URL prefix, without slashes
    pub prefix: String,
}

impl RestPrefixMapping {
    pub fn new(theme: impl Into<String>, prefix: impl Into<String>) -> Self {
        Self {
            theme: theme.into(),
            prefix: prefix.into(),
        }
    }
}

/// Sanitize a raw prefix: trim slashes, lowercase, and keep only
/// `[a-z0-9_-]`.
pub fn sanitize_prefix(raw: &str) -> String {
    raw.trim_matches('/')
        .chars()
        .flat_map(|c| c.to_lowercase())
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '-' || *c == '_')
        .collect()
}

/// Insert or update the mapping for `theme`, keeping one entry per theme.
///
/// Returns a reference to the affected mapping.
pub fn set_mapping<'a>(
    mappings: &'a mut Vec<RestPrefixMapping>,
    theme: &str,
    prefix: &str,
) -> &'a RestPrefixMapping {
    if let Some(index) = mappings.iter().position(|m| m.theme == theme) {
        mappings[index].prefix = prefix.to_string();
        &mappings[index]
    } else {
        mappings.push(RestPrefixMapping::new(theme, prefix));
        mappings.last().expect("mapping just pushed")
    }
}

/// Find the configured prefix for a theme, if it has a non-empty one.
pub fn prefix_for_theme<'a>(mappings: &'a [RestPrefixMapping], theme: &str) -> Option<&'a str> {
    mappings
        .iter()
        .find(|m| m.theme == theme && !m.prefix.is_empty())
        .map(|m| m.prefix.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_strips_slashes_and_invalid_chars() {
        assert_eq!(sanitize_prefix("/wp-json-2/"), "wp-json-2");
        assert_eq!(sanitize_prefix("My API!"), "myapi");
        assert_eq!(sanitize_prefix("api_v2"), "api_v2");
        assert_eq!(sanitize_prefix("///"), "");
    }

    #[test]
    fn set_mapping_updates_in_place() {
        let mut mappings = vec![
            RestPrefixMapping::new("themeA", "api-a"),
            RestPrefixMapping::new("themeB", "api-b"),
        ];

        set_mapping(&mut mappings, "themeA", "api-a2");
        assert_eq!(mappings.len(), 2);
        assert_eq!(mappings[0].prefix, "api-a2");
        assert_eq!(mappings[0].theme, "themeA");

        set_mapping(&mut mappings, "themeC", "api-c");
        assert_eq!(mappings.len(), 3);
        assert_eq!(mappings[2].theme, "themeC");
    }

    #[test]
    fn prefix_lookup_ignores_empty_prefixes() {
        let mappings = vec![
            RestPrefixMapping::new("themeA", ""),
            RestPrefixMapping::new("themeB", "wp-json-2"),
        ];
        assert_eq!(prefix_for_theme(&mappings, "themeA"), None);
        assert_eq!(prefix_for_theme(&mappings, "themeB"), Some("wp-json-2"));
        assert_eq!(prefix_for_theme(&mappings, "themeC"), None);
    }
}
