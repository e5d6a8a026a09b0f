//! Content and term records
//!
//! A `ContentRecord` answers the structural questions rule matching asks
//! about a piece of content: its slug, its parent, its publication status,
//! and its kind (built-in `page`/`post` or a custom post type name).

use serde::{Deserialize, Serialize};

/// Built-in content kind names.
pub mod kind {
    /// Hierarchical pages
    pub const PAGE: &str = "page";
    /// Blog posts
    pub const POST: &str = "post";
    /// Media attachments (never rule targets)
    pub const ATTACHMENT: &str = "attachment";

    /// Whether a kind is one of the built-in post types.
    pub fn is_builtin(name: &str) -> bool {
        matches!(name, PAGE | POST | ATTACHMENT)
    }
}

/// Built-in taxonomy names.
pub mod taxonomy {
    /// Post categories
    pub const CATEGORY: &str = "category";
    /// Post tags
    pub const POST_TAG: &str = "post_tag";

    /// Whether a taxonomy is one of the built-ins.
    pub fn is_builtin(name: &str) -> bool {
        matches!(name, CATEGORY | POST_TAG)
    }
}

/// Publication status of a content item.
///
/// The well-known lifecycle states get dedicated variants; anything else
/// (e.g. `inherit`, plugin-defined statuses) round-trips through `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentStatus {
    Publish,
    Draft,
    Pending,
    Private,
    Future,
    Trash,
    #[serde(untagged)]
    Other(String),
}

impl ContentStatus {
    /// The wire name of the status.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Publish => "publish",
            Self::Draft => "draft",
            Self::Pending => "pending",
            Self::Private => "private",
            Self::Future => "future",
            Self::Trash => "trash",
            Self::Other(name) => name,
        }
    }

    /// Parse a status name. Never fails; unknown names become `Other`.
    pub fn parse(name: &str) -> Self {
        match name {
            "publish" => Self::Publish,
            "draft" => Self::Draft,
            "pending" => Self::Pending,
            "private" => Self::Private,
            "future" => Self::Future,
            "trash" => Self::Trash,
            other => Self::Other(other.to_string()),
        }
    }
}

impl std::fmt::Display for ContentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A content item as the rule matcher sees it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentRecord {
    /// Content id
    pub id: u64,
    /// URL slug of this item (no slashes)
    pub slug: String,
    /// Parent content id, for hierarchical kinds
    pub parent: Option<u64>,
    /// Publication status
    pub status: ContentStatus,
    /// Kind name: `page`, `post`, or a custom post type
    pub kind: String,
}

impl ContentRecord {
    /// Create a published record with no parent.
    pub fn new(id: u64, kind: impl Into<String>, slug: impl Into<String>) -> Self {
        Self {
            id,
            slug: slug.into(),
            parent: None,
            status: ContentStatus::Publish,
            kind: kind.into(),
        }
    }

    /// Set the publication status.
    pub fn with_status(mut self, status: ContentStatus) -> Self {
        self.status = status;
        self
    }

    /// Set the parent id.
    pub fn with_parent(mut self, parent: u64) -> Self {
        self.parent = Some(parent);
        self
    }
}

/// A taxonomy term as the rule matcher sees it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TermRecord {
    /// Term id
    pub id: u64,
    /// URL slug of the term
    pub slug: String,
    /// Taxonomy the term belongs to
    pub taxonomy: String,
}

impl TermRecord {
    pub fn new(id: u64, taxonomy: impl Into<String>, slug: impl Into<String>) -> Self {
        Self {
            id,
            slug: slug.into(),
            taxonomy: taxonomy.into(),
        }
    }
}
