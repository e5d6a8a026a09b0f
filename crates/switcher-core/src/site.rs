//! Site-wide configuration consulted during matching
//!
//! These are host settings, not plugin state: the static front page, the
//! URL bases for built-in taxonomy archives, and the default REST prefix.

use serde::{Deserialize, Serialize};
use switcher_store::DEFAULT_REST_PREFIX;

use crate::Result;

fn default_category_base() -> String {
    "category".to_string()
}

fn default_tag_base() -> String {
    "tag".to_string()
}

fn default_rest_prefix() -> String {
    DEFAULT_REST_PREFIX.to_string()
}

/// Host site settings the matcher and classifier read.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    /// Content id of the static front page, if one is configured
    #[serde(default)]
    pub front_page: Option<u64>,

    /// URL base for category archives
    #[serde(default = "default_category_base")]
    pub category_base: String,

    /// URL base for tag archives
    #[serde(default = "default_tag_base")]
    pub tag_base: String,

    /// Default REST URL prefix
    #[serde(default = "default_rest_prefix")]
    pub rest_prefix: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            front_page: None,
            category_base: default_category_base(),
            tag_base: default_tag_base(),
            rest_prefix: default_rest_prefix(),
        }
    }
}

impl SiteConfig {
    /// Parse site settings from TOML content. Missing keys take the
    /// defaults.
    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Set the static front page id.
    pub fn with_front_page(mut self, id: u64) -> Self {
        self.front_page = Some(id);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let site = SiteConfig::default();
        assert_eq!(site.front_page, None);
        assert_eq!(site.category_base, "category");
        assert_eq!(site.tag_base, "tag");
        assert_eq!(site.rest_prefix, "wp-json");
    }

    #[test]
    fn parse_overrides_and_defaults_mix() {
        let site = SiteConfig::parse(
            r#"
front_page = 12
category_base = "topics"
"#,
        )
        .unwrap();
        assert_eq!(site.front_page, Some(12));
        assert_eq!(site.category_base, "topics");
        assert_eq!(site.tag_base, "tag");
    }
}
