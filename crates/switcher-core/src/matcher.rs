//! Rule matching
//!
//! A rule is tested against the current request in one of two phases.
//! Early matching runs before the host's routing layer has parsed the
//! request: only the raw URL and direct content lookups are available.
//! Late matching runs after the main query and uses the resolved-query
//! predicates directly. Unknown rule targets never match in either phase.

use std::collections::HashSet;

use switcher_content::{ContentRecord, ContentStatus, ContentStore, RegisteredTypes, kind, taxonomy};
use switcher_store::{Rule, RuleTarget};

use crate::request::RequestContext;
use crate::site::SiteConfig;

/// When a rule is being evaluated relative to the routing lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchPhase {
    /// Before the main query: raw URL and direct lookups only
    Early,
    /// After the main query: resolved-query predicates are authoritative
    Late,
}

/// Everything a single match consults.
pub struct MatchContext<'a> {
    pub request: &'a RequestContext,
    pub phase: MatchPhase,
    pub content: &'a dyn ContentStore,
    pub site: &'a SiteConfig,
    pub types: &'a RegisteredTypes,
}

impl<'a> MatchContext<'a> {
    /// Build a context for the requested phase.
    ///
    /// Late-mode predicates are undefined before the main query has run,
    /// so a `Late` request without a resolved query is downgraded to
    /// `Early` rather than trusted.
    pub fn new(
        request: &'a RequestContext,
        phase: MatchPhase,
        content: &'a dyn ContentStore,
        site: &'a SiteConfig,
        types: &'a RegisteredTypes,
    ) -> Self {
        let phase = if phase == MatchPhase::Late && request.resolved().is_none() {
            MatchPhase::Early
        } else {
            phase
        };
        Self {
            request,
            phase,
            content,
            site,
            types,
        }
    }
}

/// Test one rule against the current request.
pub fn matches(rule: &Rule, ctx: &MatchContext<'_>) -> bool {
    match ctx.phase {
        MatchPhase::Early => early_match(rule, ctx),
        MatchPhase::Late => late_match(rule, ctx),
    }
}

fn early_match(rule: &Rule, ctx: &MatchContext<'_>) -> bool {
    let path = ctx.request.trimmed_path();
    match &rule.target {
        RuleTarget::Url { path: rule_path } => url_matches(path, rule_path),

        RuleTarget::Page { id, status } => page_matches_early(ctx, *id, status),

        RuleTarget::Post { id, status } => {
            slug_with_status(ctx, *id, kind::POST, status)
                .is_some_and(|slug| segment_matches(ctx.request, &slug))
        }

        RuleTarget::CptItem {
            id,
            post_type,
            status,
        } => slug_with_status(ctx, *id, post_type, status)
            .is_some_and(|slug| segment_matches(ctx.request, &slug)),

        RuleTarget::Category { term } => {
            term_path(ctx, *term, taxonomy::CATEGORY, &ctx.site.category_base)
                .is_some_and(|expected| url_matches(path, &expected))
        }

        RuleTarget::Tag { term } => term_path(ctx, *term, taxonomy::POST_TAG, &ctx.site.tag_base)
            .is_some_and(|expected| url_matches(path, &expected)),

        RuleTarget::Taxonomy {
            term,
            taxonomy: tax_name,
            rewrite_slug,
        } => {
            // Prefer the live registration's rewrite slug; fall back to the
            // slug cached on the rule when the taxonomy is not registered,
            // then to the taxonomy name itself.
            let base = ctx
                .types
                .taxonomy(tax_name)
                .and_then(|spec| spec.rewrite_slug.clone())
                .or_else(|| rewrite_slug.clone())
                .unwrap_or_else(|| tax_name.clone());
            term_path(ctx, *term, tax_name, &base)
                .is_some_and(|expected| url_matches(path, &expected))
        }

        RuleTarget::PostType {
            name,
            archive_slug,
            rewrite_slug,
        } => {
            let (archive, rewrite) = match ctx.types.post_type(name) {
                Some(spec) => (
                    spec.archive_slug.clone().or_else(|| archive_slug.clone()),
                    spec.rewrite_slug.clone().or_else(|| rewrite_slug.clone()),
                ),
                None => (archive_slug.clone(), rewrite_slug.clone()),
            };
            [archive, rewrite]
                .into_iter()
                .flatten()
                .any(|slug| slug_prefix_matches(path, &slug))
        }

        RuleTarget::Unknown { .. } => false,
    }
}

fn late_match(rule: &Rule, ctx: &MatchContext<'_>) -> bool {
    let Some(query) = ctx.request.resolved() else {
        return false;
    };
    match &rule.target {
        RuleTarget::Page { id, status } => {
            status_visible(ctx, *id, status) && query.is_page(*id)
        }

        RuleTarget::Post { id, status } => {
            status_visible(ctx, *id, status) && query.is_single(*id)
        }

        RuleTarget::CptItem {
            id,
            post_type,
            status,
        } => status_visible(ctx, *id, status) && query.is_singular_item(*id, post_type),

        RuleTarget::PostType { name, .. } => {
            query.is_singular(name) || query.is_post_type_archive(name)
        }

        RuleTarget::Url { path: rule_path } => url_matches(ctx.request.trimmed_path(), rule_path),

        RuleTarget::Category { term } => {
            query.is_term_archive(*term, taxonomy::CATEGORY)
                || (query.is_any_single() && query.has_term(*term, taxonomy::CATEGORY))
        }

        RuleTarget::Tag { term } => {
            query.is_term_archive(*term, taxonomy::POST_TAG)
                || (query.is_any_single() && query.has_term(*term, taxonomy::POST_TAG))
        }

        RuleTarget::Taxonomy {
            term,
            taxonomy: tax_name,
            ..
        } => query.is_term_archive(*term, tax_name) || query.has_term(*term, tax_name),

        RuleTarget::Unknown { .. } => false,
    }
}

/// URL-rule comparison: trim slashes both sides, equality or prefix.
fn url_matches(current: &str, rule_path: &str) -> bool {
    let rule_path = rule_path.trim_matches('/');
    if rule_path.is_empty() {
        return false;
    }
    current == rule_path || current.starts_with(rule_path)
}

/// Prefix comparison aligned to a segment boundary, for archive and
/// rewrite slugs.
fn slug_prefix_matches(current: &str, slug: &str) -> bool {
    let slug = slug.trim_matches('/');
    if slug.is_empty() {
        return false;
    }
    current == slug || current.starts_with(&format!("{slug}/"))
}

/// Exact segment membership: prevents `test` matching `contest` or
/// `latest-news`.
fn segment_matches(request: &RequestContext, slug: &str) -> bool {
    request.segments().any(|segment| segment == slug)
}

/// Look up a content slug by id, filtered by the kind and status the rule
/// expects. Any mismatch is a non-match.
fn slug_with_status(
    ctx: &MatchContext<'_>,
    id: u64,
    kind_name: &str,
    status: &ContentStatus,
) -> Option<String> {
    let record = ctx.content.content(id)?;
    (record.kind == kind_name && record.status == *status).then_some(record.slug)
}

fn page_matches_early(ctx: &MatchContext<'_>, id: u64, status: &ContentStatus) -> bool {
    let path = ctx.request.trimmed_path();

    // The configured front page is served at the bare site root.
    if ctx.site.front_page == Some(id) && path.is_empty() {
        return true;
    }

    let Some(record) = ctx.content.content(id) else {
        return false;
    };
    if record.kind != kind::PAGE || record.status != *status {
        return false;
    }

    match page_path(ctx.content, &record) {
        Some(full_path) => path == full_path,
        None => false,
    }
}

/// Build the full hierarchical path for a page.
///
/// Every ancestor must be a published page; if any is not, the page is
/// unreachable at that path and `None` is returned.
pub(crate) fn page_path(content: &dyn ContentStore, record: &ContentRecord) -> Option<String> {
    let mut segments = vec![record.slug.clone()];
    let mut next = record.parent;
    let mut seen: HashSet<u64> = HashSet::from([record.id]);

    while let Some(parent_id) = next {
        // Guards against parent cycles in stored data.
        if !seen.insert(parent_id) {
            return None;
        }
        let parent = content.content(parent_id)?;
        if parent.kind != kind::PAGE || parent.status != ContentStatus::Publish {
            return None;
        }
        segments.push(parent.slug);
        next = parent.parent;
    }

    segments.reverse();
    Some(segments.join("/"))
}

/// Late-mode status handling: routing already encodes visibility for
/// published content, so publish-qualified rules trust the predicates;
/// status-qualified rules additionally require the record to still exist.
fn status_visible(ctx: &MatchContext<'_>, id: u64, status: &ContentStatus) -> bool {
    match status {
        ContentStatus::Publish => true,
        _ => ctx.content.content(id).is_some(),
    }
}

/// Resolve a term's archive path as `{base}/{slug}`, checking the term
/// belongs to the expected taxonomy.
fn term_path(ctx: &MatchContext<'_>, term: u64, tax_name: &str, base: &str) -> Option<String> {
    let record = ctx.content.term(term)?;
    (record.taxonomy == tax_name).then(|| format!("{}/{}", base.trim_matches('/'), record.slug))
}
