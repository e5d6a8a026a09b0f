//! Post type and taxonomy registration descriptors
//!
//! A descriptor carries enough of a registration to repeat it verbatim:
//! the object registry persists descriptors per owning theme and replays
//! them when that theme is not the one currently loaded.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::record::{kind, taxonomy};

/// Registration descriptor for a custom post type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostTypeSpec {
    /// Display label
    pub label: String,
    /// Whether the type is publicly queryable
    #[serde(default)]
    pub public: bool,
    /// Rewrite slug used for singular URLs
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rewrite_slug: Option<String>,
    /// Archive slug, when the type has an archive
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub archive_slug: Option<String>,
    /// Supported editor features
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub supports: Vec<String>,
    /// Whether the type is exposed over REST
    #[serde(default)]
    pub show_in_rest: bool,
    /// Taxonomies attached to the type
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub taxonomies: Vec<String>,
}

impl PostTypeSpec {
    /// Create a public descriptor with the given label.
    pub fn public(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            public: true,
            rewrite_slug: None,
            archive_slug: None,
            supports: Vec::new(),
            show_in_rest: false,
            taxonomies: Vec::new(),
        }
    }

    pub fn with_rewrite(mut self, slug: impl Into<String>) -> Self {
        self.rewrite_slug = Some(slug.into());
        self
    }

    pub fn with_archive(mut self, slug: impl Into<String>) -> Self {
        self.archive_slug = Some(slug.into());
        self
    }
}

/// Registration descriptor for a custom taxonomy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxonomySpec {
    /// Display label
    pub label: String,
    /// Whether the taxonomy is publicly queryable
    #[serde(default)]
    pub public: bool,
    /// Rewrite slug used as the URL base for term archives
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rewrite_slug: Option<String>,
    /// Post types the taxonomy applies to
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub object_types: Vec<String>,
    /// Whether the taxonomy is exposed over REST
    #[serde(default)]
    pub show_in_rest: bool,
}

impl TaxonomySpec {
    /// Create a public descriptor with the given label.
    pub fn public(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            public: true,
            rewrite_slug: None,
            object_types: Vec::new(),
            show_in_rest: false,
        }
    }

    pub fn with_rewrite(mut self, slug: impl Into<String>) -> Self {
        self.rewrite_slug = Some(slug.into());
        self
    }
}

/// The post types and taxonomies registered for the current request.
///
/// This is per-request runtime state, not persistence: the host seeds it
/// with whatever the loaded theme registers, and the object registry may
/// add entries for types owned by inactive themes. Registering an
/// existing name replaces the previous descriptor.
#[derive(Debug, Clone, Default)]
pub struct RegisteredTypes {
    post_types: BTreeMap<String, PostTypeSpec>,
    taxonomies: BTreeMap<String, TaxonomySpec>,
}

/// Object type names are slug-like: lowercase alphanumerics, `-` and `_`.
fn valid_type_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '_')
}

impl RegisteredTypes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a post type, replacing any previous registration.
    pub fn register_post_type(&mut self, name: &str, spec: PostTypeSpec) -> Result<()> {
        if !valid_type_name(name) {
            return Err(Error::InvalidTypeName {
                name: name.to_string(),
            });
        }
        self.post_types.insert(name.to_string(), spec);
        Ok(())
    }

    /// Register a taxonomy, replacing any previous registration.
    pub fn register_taxonomy(&mut self, name: &str, spec: TaxonomySpec) -> Result<()> {
        if !valid_type_name(name) {
            return Err(Error::InvalidTypeName {
                name: name.to_string(),
            });
        }
        self.taxonomies.insert(name.to_string(), spec);
        Ok(())
    }

    pub fn post_type(&self, name: &str) -> Option<&PostTypeSpec> {
        self.post_types.get(name)
    }

    pub fn taxonomy(&self, name: &str) -> Option<&TaxonomySpec> {
        self.taxonomies.get(name)
    }

    pub fn has_post_type(&self, name: &str) -> bool {
        self.post_types.contains_key(name)
    }

    pub fn has_taxonomy(&self, name: &str) -> bool {
        self.taxonomies.contains_key(name)
    }

    /// Public custom post types, excluding the built-ins.
    pub fn public_custom_post_types(&self) -> impl Iterator<Item = (&String, &PostTypeSpec)> {
        self.post_types
            .iter()
            .filter(|(name, spec)| spec.public && !kind::is_builtin(name))
    }

    /// Public custom taxonomies, excluding the built-ins.
    pub fn public_custom_taxonomies(&self) -> impl Iterator<Item = (&String, &TaxonomySpec)> {
        self.taxonomies
            .iter()
            .filter(|(name, spec)| spec.public && !taxonomy::is_builtin(name))
    }
}
