//! Theme-switching rules
//!
//! A rule maps a match condition (a page, a post, a custom-type item, a
//! whole post type, a taxonomy term, or a URL path) to a target theme.
//! In storage a rule is a flat record whose `type` string doubles as a
//! composite status key (`page`, `draft_page`, `pending_cpt_item`, …);
//! in memory that encoding is lifted into the [`RuleTarget`] sum type so
//! every variant carries exactly the fields it needs.

use serde::{Deserialize, Serialize};
use switcher_content::{ContentStatus, kind};

/// Statuses that participate in composite rule tags.
const TRACKED_STATUSES: [ContentStatus; 5] = [
    ContentStatus::Publish,
    ContentStatus::Draft,
    ContentStatus::Pending,
    ContentStatus::Private,
    ContentStatus::Future,
];

/// What a rule matches against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleTarget {
    /// A specific page, qualified by lifecycle status
    Page { id: u64, status: ContentStatus },
    /// A specific blog post, qualified by lifecycle status
    Post { id: u64, status: ContentStatus },
    /// A specific custom-post-type item, qualified by lifecycle status
    CptItem {
        id: u64,
        post_type: String,
        status: ContentStatus,
    },
    /// An entire custom post type (archive and singular URLs).
    ///
    /// The slugs are cached at rule creation because the type may not be
    /// registered yet when early matching runs.
    PostType {
        name: String,
        archive_slug: Option<String>,
        rewrite_slug: Option<String>,
    },
    /// A custom taxonomy term, with the taxonomy's rewrite slug cached
    /// for the same early-registration reason
    Taxonomy {
        term: u64,
        taxonomy: String,
        rewrite_slug: Option<String>,
    },
    /// A built-in category term
    Category { term: u64 },
    /// A built-in tag term
    Tag { term: u64 },
    /// An arbitrary URL path or path prefix
    Url { path: String },
    /// A stored tag this version does not recognize.
    ///
    /// Round-trips losslessly and never matches, except where the dynamic
    /// `{status}_{kind}` composite form is explicitly consulted.
    Unknown { type_tag: String, value: String },
}

/// A stored theme-switching rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawRule", into = "RawRule")]
pub struct Rule {
    /// Match condition
    pub target: RuleTarget,
    /// Target theme slug
    pub theme: String,
}

impl Rule {
    pub fn new(target: RuleTarget, theme: impl Into<String>) -> Self {
        Self {
            target,
            theme: theme.into(),
        }
    }

    /// The wire `type` tag for this rule.
    pub fn type_tag(&self) -> String {
        match &self.target {
            RuleTarget::Page { status, .. } => status_tag(status, kind::PAGE),
            RuleTarget::Post { status, .. } => status_tag(status, kind::POST),
            RuleTarget::CptItem { status, .. } => status_tag(status, "cpt_item"),
            RuleTarget::PostType { .. } => "post_type".to_string(),
            RuleTarget::Taxonomy { .. } => "taxonomy".to_string(),
            RuleTarget::Category { .. } => "category".to_string(),
            RuleTarget::Tag { .. } => "tag".to_string(),
            RuleTarget::Url { .. } => "url".to_string(),
            RuleTarget::Unknown { type_tag, .. } => type_tag.clone(),
        }
    }

    /// Whether this rule tracks content `id` under the composite key for
    /// the given status and kind.
    ///
    /// Accepts the canonical form (the typed variants, including the bare
    /// publish tags) and the dynamic `{status}_{kind}` form carried by
    /// [`RuleTarget::Unknown`] entries written by older versions.
    pub fn matches_composite(&self, id: u64, status: &ContentStatus, kind_name: &str) -> bool {
        match &self.target {
            RuleTarget::Page {
                id: rule_id,
                status: rule_status,
            } => kind_name == kind::PAGE && *rule_id == id && rule_status == status,
            RuleTarget::Post {
                id: rule_id,
                status: rule_status,
            } => kind_name == kind::POST && *rule_id == id && rule_status == status,
            RuleTarget::CptItem {
                id: rule_id,
                post_type,
                status: rule_status,
            } => post_type == kind_name && *rule_id == id && rule_status == status,
            RuleTarget::Unknown { type_tag, value } => {
                *type_tag == dynamic_tag(status, kind_name)
                    && value.parse::<u64>() == Ok(id)
            }
            _ => false,
        }
    }
}

/// The dynamic composite form, `{status}_{kind}`.
pub fn dynamic_tag(status: &ContentStatus, kind_name: &str) -> String {
    format!("{}_{}", status.as_str(), kind_name)
}

/// The target a rule tracking (`status`, `kind`) should be rewritten to,
/// or `None` when the status has no composite mapping for the kind.
pub fn target_for_status(status: &ContentStatus, kind_name: &str, id: u64) -> Option<RuleTarget> {
    if !TRACKED_STATUSES.contains(status) {
        return None;
    }
    Some(match kind_name {
        kind::PAGE => RuleTarget::Page {
            id,
            status: status.clone(),
        },
        kind::POST => RuleTarget::Post {
            id,
            status: status.clone(),
        },
        custom => RuleTarget::CptItem {
            id,
            post_type: custom.to_string(),
            status: status.clone(),
        },
    })
}

fn status_tag(status: &ContentStatus, base: &str) -> String {
    match status {
        ContentStatus::Publish => base.to_string(),
        other => format!("{}_{}", other.as_str(), base),
    }
}

/// Split a composite tag into its status qualifier for a base name.
///
/// `"draft_page"` yields `Draft`; the bare `"page"` yields `Publish`.
fn split_status_tag(tag: &str, base: &str) -> Option<ContentStatus> {
    if tag == base {
        return Some(ContentStatus::Publish);
    }
    let prefix = tag.strip_suffix(base)?.strip_suffix('_')?;
    match prefix {
        "draft" | "pending" | "private" | "future" => Some(ContentStatus::parse(prefix)),
        _ => None,
    }
}

/// Flat wire form of a rule: the historical option format.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct RawRule {
    #[serde(rename = "type")]
    type_tag: String,
    value: RawValue,
    theme: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    post_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    taxonomy: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    archive_slug: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    rewrite_slug: Option<String>,
}

/// Stored rule values are ids (integers) or strings depending on type.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum RawValue {
    Int(i64),
    Str(String),
}

impl RawValue {
    fn as_id(&self) -> Option<u64> {
        match self {
            Self::Int(n) => u64::try_from(*n).ok(),
            Self::Str(s) => s.trim().parse().ok(),
        }
    }

    fn into_string(self) -> String {
        match self {
            Self::Int(n) => n.to_string(),
            Self::Str(s) => s,
        }
    }
}

impl From<RawRule> for Rule {
    fn from(raw: RawRule) -> Self {
        let theme = raw.theme.clone();
        let target = parse_target(&raw).unwrap_or_else(|| RuleTarget::Unknown {
            type_tag: raw.type_tag,
            value: raw.value.into_string(),
        });
        Self { target, theme }
    }
}

/// Interpret a raw record. `None` means the tag is unrecognized or a
/// required field is missing or malformed; the rule becomes `Unknown`
/// and silently never matches.
fn parse_target(raw: &RawRule) -> Option<RuleTarget> {
    if let Some(status) = split_status_tag(&raw.type_tag, kind::PAGE) {
        return Some(RuleTarget::Page {
            id: raw.value.as_id()?,
            status,
        });
    }
    if let Some(status) = split_status_tag(&raw.type_tag, kind::POST) {
        return Some(RuleTarget::Post {
            id: raw.value.as_id()?,
            status,
        });
    }
    if let Some(status) = split_status_tag(&raw.type_tag, "cpt_item") {
        return Some(RuleTarget::CptItem {
            id: raw.value.as_id()?,
            post_type: raw.post_type.clone()?,
            status,
        });
    }
    match raw.type_tag.as_str() {
        "post_type" => Some(RuleTarget::PostType {
            name: match &raw.value {
                RawValue::Str(s) if !s.is_empty() => s.clone(),
                _ => return None,
            },
            archive_slug: raw.archive_slug.clone(),
            rewrite_slug: raw.rewrite_slug.clone(),
        }),
        "taxonomy" => Some(RuleTarget::Taxonomy {
            term: raw.value.as_id()?,
            taxonomy: raw.taxonomy.clone()?,
            rewrite_slug: raw.rewrite_slug.clone(),
        }),
        "category" => Some(RuleTarget::Category {
            term: raw.value.as_id()?,
        }),
        "tag" => Some(RuleTarget::Tag {
            term: raw.value.as_id()?,
        }),
        "url" => Some(RuleTarget::Url {
            path: match &raw.value {
                RawValue::Str(s) => s.clone(),
                RawValue::Int(n) => n.to_string(),
            },
        }),
        _ => None,
    }
}

impl From<Rule> for RawRule {
    fn from(rule: Rule) -> Self {
        let type_tag = rule.type_tag();
        let mut raw = RawRule {
            type_tag,
            value: RawValue::Int(0),
            theme: rule.theme,
            post_type: None,
            taxonomy: None,
            archive_slug: None,
            rewrite_slug: None,
        };
        match rule.target {
            RuleTarget::Page { id, .. } | RuleTarget::Post { id, .. } => {
                raw.value = RawValue::Int(id as i64);
            }
            RuleTarget::CptItem { id, post_type, .. } => {
                raw.value = RawValue::Int(id as i64);
                raw.post_type = Some(post_type);
            }
            RuleTarget::PostType {
                name,
                archive_slug,
                rewrite_slug,
            } => {
                raw.value = RawValue::Str(name);
                raw.archive_slug = archive_slug;
                raw.rewrite_slug = rewrite_slug;
            }
            RuleTarget::Taxonomy {
                term,
                taxonomy,
                rewrite_slug,
            } => {
                raw.value = RawValue::Int(term as i64);
                raw.taxonomy = Some(taxonomy);
                raw.rewrite_slug = rewrite_slug;
            }
            RuleTarget::Category { term } | RuleTarget::Tag { term } => {
                raw.value = RawValue::Int(term as i64);
            }
            RuleTarget::Url { path } => {
                raw.value = RawValue::Str(path);
            }
            RuleTarget::Unknown { value, .. } => {
                raw.value = RawValue::Str(value);
            }
        }
        raw
    }
}
