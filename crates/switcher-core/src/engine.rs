//! Request-theme resolution
//!
//! `ThemeResolver` makes the per-request decision: given the stored rules
//! and the request context, which theme (if any) overrides the main one.
//! Classification runs in strict precedence order (REST, dashboard
//! background call, dashboard page load, preview, frontend) and every
//! step short-circuits. Resolution never fails: storage errors are logged
//! and degrade to "no override".

use std::sync::LazyLock;

use regex::Regex;

use switcher_content::{ContentStatus, ContentStore, RegisteredTypes, kind};
use switcher_store::{RestPrefixMapping, Rule, RuleStore, RuleTarget, prefix_for_theme};

use crate::matcher::{self, MatchContext, MatchPhase};
use crate::request::RequestContext;
use crate::site::SiteConfig;
use crate::themes::ThemeProvider;

/// Block-editor referers carry the edited post id in the query string.
static REFERER_POST_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[?&]post=(\d+)").expect("valid referer pattern"));

/// A URL-rewrite contribution mapping a custom REST prefix to the
/// standard REST dispatch route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestRewrite {
    /// Anchored pattern matching `{prefix}/*`
    pub pattern: String,
    /// Internal dispatch route the pattern rewrites to
    pub route: String,
}

/// The per-request resolution engine.
pub struct ThemeResolver<'a> {
    store: &'a RuleStore,
    content: &'a dyn ContentStore,
    themes: &'a dyn ThemeProvider,
    site: &'a SiteConfig,
    types: &'a RegisteredTypes,
}

impl<'a> ThemeResolver<'a> {
    pub fn new(
        store: &'a RuleStore,
        content: &'a dyn ContentStore,
        themes: &'a dyn ThemeProvider,
        site: &'a SiteConfig,
        types: &'a RegisteredTypes,
    ) -> Self {
        Self {
            store,
            content,
            themes,
            site,
            types,
        }
    }

    /// Decide the effective theme override for this request, or `None`
    /// to keep the main theme.
    pub fn resolve(&self, request: &RequestContext) -> Option<String> {
        let prefixes = self.rest_prefixes();

        // REST requests resolve through prefix mappings alone; dashboard
        // and frontend rules never apply to them.
        if self.is_rest_request(request, &prefixes) {
            return self.rest_theme(request, &prefixes);
        }

        if request.is_background_call() {
            return self.background_theme(request);
        }

        if request.is_dashboard() {
            return self.admin_preference(request);
        }

        let rules = self.rules();

        if request.is_preview()
            && let Some(theme) = self.preview_theme(request, &rules)
        {
            return Some(theme);
        }

        self.frontend_theme(request, &rules)
    }

    /// Template extension point: the override, or the host's current
    /// value.
    pub fn template(&self, request: &RequestContext, current: &str) -> String {
        self.resolve(request)
            .unwrap_or_else(|| current.to_string())
    }

    /// Stylesheet extension point.
    pub fn stylesheet(&self, request: &RequestContext, current: &str) -> String {
        self.resolve(request)
            .unwrap_or_else(|| current.to_string())
    }

    /// REST-base extension point: the custom prefix configured for the
    /// effective theme, or the input unchanged.
    ///
    /// Guarded against re-entrant invocation (looking up the mapping can
    /// itself trigger the extension point in some hosts) and against
    /// storage failures, which are logged and swallowed.
    pub fn rest_prefix(&self, request: &RequestContext, prefix: &str) -> String {
        if request.rest_guard() {
            return prefix.to_string();
        }
        request.set_rest_guard(true);
        let result = self.rest_prefix_for(request);
        request.set_rest_guard(false);

        match result {
            Ok(Some(custom)) => custom,
            Ok(None) => prefix.to_string(),
            Err(error) => {
                tracing::error!(%error, "REST prefix lookup failed; keeping current prefix");
                prefix.to_string()
            }
        }
    }

    /// Rewrite contributions for every configured custom prefix.
    pub fn rest_rewrites(&self) -> Vec<RestRewrite> {
        self.rest_prefixes()
            .iter()
            .filter(|mapping| !mapping.prefix.is_empty())
            .map(|mapping| RestRewrite {
                pattern: format!("^{}/?(.*)$", mapping.prefix.trim_matches('/')),
                route: "index.php?rest_route=/$matches[1]".to_string(),
            })
            .collect()
    }

    fn rules(&self) -> Vec<Rule> {
        self.store.rules().unwrap_or_else(|error| {
            tracing::warn!(%error, "failed to load theme rules; treating as empty");
            Vec::new()
        })
    }

    fn rest_prefixes(&self) -> Vec<RestPrefixMapping> {
        self.store.rest_prefixes().unwrap_or_else(|error| {
            tracing::warn!(%error, "failed to load REST prefixes; treating as empty");
            Vec::new()
        })
    }

    /// A request is REST when the host flagged it, or when the default or
    /// any configured custom prefix appears as a path segment.
    fn is_rest_request(&self, request: &RequestContext, prefixes: &[RestPrefixMapping]) -> bool {
        if request.is_rest_flagged() {
            return true;
        }
        let has_segment = |prefix: &str| request.segments().any(|segment| segment == prefix);
        has_segment(&self.site.rest_prefix)
            || prefixes
                .iter()
                .any(|mapping| !mapping.prefix.is_empty() && has_segment(&mapping.prefix))
    }

    /// Theme for a REST request: the first custom-prefix mapping whose
    /// prefix appears in the path.
    fn rest_theme(
        &self,
        request: &RequestContext,
        prefixes: &[RestPrefixMapping],
    ) -> Option<String> {
        prefixes
            .iter()
            .filter(|mapping| {
                !mapping.prefix.is_empty()
                    && request.segments().any(|segment| segment == mapping.prefix)
            })
            .find_map(|mapping| self.validated(&mapping.theme))
    }

    /// Theme for a dashboard background call, correlated to the content
    /// being edited. Falls back to the user's dashboard preference.
    fn background_theme(&self, request: &RequestContext) -> Option<String> {
        if let Some(id) = correlate_content_id(request)
            && let Some(record) = self.content.content(id)
        {
            let rules = self.rules();
            for rule in &rules {
                let hit = match &rule.target {
                    RuleTarget::Page {
                        id: rule_id,
                        status,
                    }
                    | RuleTarget::Post {
                        id: rule_id,
                        status,
                    } => *rule_id == id && *status == ContentStatus::Publish,
                    RuleTarget::PostType { name, .. } => *name == record.kind,
                    _ => false,
                } || rule.matches_composite(id, &record.status, &record.kind);

                if hit && let Some(theme) = self.validated(&rule.theme) {
                    return Some(theme);
                }
            }
        }

        self.admin_preference(request)
    }

    /// The requesting user's dashboard theme preference, when set and
    /// installed.
    fn admin_preference(&self, request: &RequestContext) -> Option<String> {
        let user = request.user()?;
        let theme = self
            .store
            .admin_theme(user)
            .unwrap_or_else(|error| {
                tracing::warn!(%error, user, "failed to load admin theme preference");
                None
            })?;
        self.validated(&theme)
    }

    /// Theme for a preview request: rules tracking the exact composite
    /// status key of the previewed content.
    fn preview_theme(&self, request: &RequestContext, rules: &[Rule]) -> Option<String> {
        let id = request.preview_content_id()?;
        let record = self.content.content(id)?;
        rules
            .iter()
            .filter(|rule| rule.matches_composite(id, &record.status, &record.kind))
            .find_map(|rule| self.validated(&rule.theme))
    }

    /// Frontend resolution: raw content-id correlation first, then full
    /// ordered rule evaluation. First match wins.
    fn frontend_theme(&self, request: &RequestContext, rules: &[Rule]) -> Option<String> {
        if rules.is_empty() {
            return None;
        }

        if request.has_raw_content_id()
            && let Some(theme) = self.raw_param_theme(request, rules)
        {
            return Some(theme);
        }

        let phase = if request.resolved().is_some() {
            MatchPhase::Late
        } else {
            MatchPhase::Early
        };
        let ctx = MatchContext::new(request, phase, self.content, self.site, self.types);
        rules
            .iter()
            .filter(|rule| matcher::matches(rule, &ctx))
            .find_map(|rule| self.validated(&rule.theme))
    }

    /// Correlate a raw `page_id`/`p` parameter (scheduled and draft
    /// previews without the preview flag): first against composite
    /// status rules exactly like a flagged preview, then against URL
    /// rules by the content's path.
    ///
    /// For the URL-rule pass, pages match on their exact full
    /// hierarchical path only; posts also match on segment membership in
    /// multi-segment rule paths. Pages are hierarchical, posts are flat;
    /// the asymmetry is deliberate.
    fn raw_param_theme(&self, request: &RequestContext, rules: &[Rule]) -> Option<String> {
        let id = request.raw_content_id()?;
        let record = self.content.content(id)?;

        if let Some(theme) = rules
            .iter()
            .filter(|rule| rule.matches_composite(id, &record.status, &record.kind))
            .find_map(|rule| self.validated(&rule.theme))
        {
            return Some(theme);
        }

        match record.kind.as_str() {
            kind::PAGE => {
                // A partial ancestor path must not match anything.
                let full_path = matcher::page_path(self.content, &record)?;
                rules
                    .iter()
                    .filter(|rule| match &rule.target {
                        RuleTarget::Url { path } => path.trim_matches('/') == full_path,
                        _ => false,
                    })
                    .find_map(|rule| self.validated(&rule.theme))
            }
            kind::POST => {
                let slug = record.slug.trim_matches('/');
                rules
                    .iter()
                    .filter(|rule| match &rule.target {
                        RuleTarget::Url { path } => {
                            let rule_path = path.trim_matches('/');
                            rule_path == slug || rule_path.split('/').any(|seg| seg == slug)
                        }
                        _ => false,
                    })
                    .find_map(|rule| self.validated(&rule.theme))
            }
            _ => None,
        }
    }

    /// Internal lookup behind the REST-base extension point.
    fn rest_prefix_for(&self, request: &RequestContext) -> switcher_store::Result<Option<String>> {
        let dashboard_page = request.is_dashboard() && !request.is_background_call();
        let theme = match dashboard_page.then(|| request.user()).flatten() {
            Some(user) => self
                .store
                .admin_theme(user)?
                .unwrap_or_else(|| self.themes.current()),
            None => self.themes.current(),
        };

        let mappings = self.store.rest_prefixes()?;
        Ok(prefix_for_theme(&mappings, &theme).map(str::to_string))
    }

    /// Validate a candidate override against the installed themes; an
    /// unknown theme falls through as a non-match.
    fn validated(&self, theme: &str) -> Option<String> {
        if theme.is_empty() {
            return None;
        }
        if self.themes.exists(theme) {
            Some(theme.to_string())
        } else {
            tracing::debug!(theme, "rule theme is not installed; skipping");
            None
        }
    }
}

/// Pull a content id out of a dashboard background call: explicit field,
/// nested editor context, id field, query parameter, then the referer.
fn correlate_content_id(request: &RequestContext) -> Option<u64> {
    request
        .field_id("post_id")
        .or_else(|| request.nested_field_id("context", "postId"))
        .or_else(|| request.field_id("id"))
        .or_else(|| request.query_id("postId"))
        .or_else(|| request.referer().and_then(referer_post_id))
}

fn referer_post_id(referer: &str) -> Option<u64> {
    REFERER_POST_ID
        .captures(referer)?
        .get(1)?
        .as_str()
        .parse()
        .ok()
}
