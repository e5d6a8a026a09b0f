//! Per-request context
//!
//! Everything the engine knows about an inbound request lives here:
//! path, query parameters, body fields, classification flags supplied by
//! the host, and, once the routing layer has run, the resolved query.
//! Request-scoped mutable state (the REST-prefix recursion guard) is a
//! field on this object, never process-global.

use std::cell::Cell;
use std::collections::HashMap;

use serde_json::Value;

/// Context for a single inbound request.
#[derive(Debug, Default)]
pub struct RequestContext {
    path: String,
    query: HashMap<String, String>,
    fields: Value,
    referer: Option<String>,
    user: Option<u64>,
    dashboard: bool,
    background: bool,
    rest_flagged: bool,
    resolved: Option<ResolvedQuery>,
    rest_guard: Cell<bool>,
}

impl RequestContext {
    /// Create a context from a request URI. A query string, if present,
    /// is split off into the query map.
    pub fn new(uri: impl Into<String>) -> Self {
        let uri = uri.into();
        let (path, query_string) = match uri.split_once('?') {
            Some((path, qs)) => (path.to_string(), Some(qs)),
            None => (uri, None),
        };

        let mut query = HashMap::new();
        if let Some(qs) = query_string {
            for pair in qs.split('&').filter(|p| !p.is_empty()) {
                match pair.split_once('=') {
                    Some((key, value)) => query.insert(key.to_string(), value.to_string()),
                    None => query.insert(pair.to_string(), String::new()),
                };
            }
        }

        Self {
            path,
            query,
            fields: Value::Null,
            ..Self::default()
        }
    }

    /// Add a query parameter.
    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.insert(key.into(), value.into());
        self
    }

    /// Add a body field. Fields are opaque host data; nested objects are
    /// allowed (e.g. a block-editor `context` object).
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        if !self.fields.is_object() {
            self.fields = Value::Object(serde_json::Map::new());
        }
        if let Value::Object(map) = &mut self.fields {
            map.insert(key.into(), value.into());
        }
        self
    }

    /// Set the referer header value.
    pub fn with_referer(mut self, referer: impl Into<String>) -> Self {
        self.referer = Some(referer.into());
        self
    }

    /// Set the authenticated user id.
    pub fn with_user(mut self, user: u64) -> Self {
        self.user = Some(user);
        self
    }

    /// Mark the request as a dashboard page load.
    pub fn dashboard(mut self) -> Self {
        self.dashboard = true;
        self
    }

    /// Mark the request as a dashboard background call (the asynchronous
    /// channel). Implies the dashboard origin.
    pub fn background_call(mut self) -> Self {
        self.dashboard = true;
        self.background = true;
        self
    }

    /// Mark the request as already classified as REST dispatch by the
    /// host.
    pub fn rest_flagged(mut self) -> Self {
        self.rest_flagged = true;
        self
    }

    /// Attach the resolved query. Its presence is what allows late-mode
    /// matching.
    pub fn with_resolved(mut self, resolved: ResolvedQuery) -> Self {
        self.resolved = Some(resolved);
        self
    }

    /// Raw request path, without the query string.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Request path with surrounding slashes trimmed.
    pub fn trimmed_path(&self) -> &str {
        self.path.trim_matches('/')
    }

    /// Path split into non-empty `/`-delimited segments.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.trimmed_path().split('/').filter(|s| !s.is_empty())
    }

    /// A query parameter by name.
    pub fn query(&self, key: &str) -> Option<&str> {
        self.query.get(key).map(String::as_str)
    }

    /// A query parameter parsed as a content id.
    pub fn query_id(&self, key: &str) -> Option<u64> {
        self.query(key)?.parse().ok()
    }

    /// A top-level body field.
    pub fn field(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// A body field parsed as a content id; accepts numbers and numeric
    /// strings.
    pub fn field_id(&self, key: &str) -> Option<u64> {
        value_as_id(self.field(key)?)
    }

    /// An id nested one level inside an object field, e.g.
    /// `context.postId`.
    pub fn nested_field_id(&self, key: &str, nested: &str) -> Option<u64> {
        value_as_id(self.field(key)?.get(nested)?)
    }

    pub fn referer(&self) -> Option<&str> {
        self.referer.as_deref()
    }

    pub fn user(&self) -> Option<u64> {
        self.user
    }

    pub fn is_dashboard(&self) -> bool {
        self.dashboard
    }

    pub fn is_background_call(&self) -> bool {
        self.background
    }

    pub fn is_rest_flagged(&self) -> bool {
        self.rest_flagged
    }

    /// Whether this is a content preview request.
    pub fn is_preview(&self) -> bool {
        self.query("preview") == Some("true")
    }

    /// Content id carried by a preview request (`p` or `page_id`).
    pub fn preview_content_id(&self) -> Option<u64> {
        self.query_id("p").or_else(|| self.query_id("page_id"))
    }

    /// Whether the request carries a raw content-id parameter, used for
    /// scheduled/draft previews without the preview flag.
    pub fn has_raw_content_id(&self) -> bool {
        self.query.contains_key("page_id") || self.query.contains_key("p")
    }

    /// The raw content-id parameter (`page_id` first, then `p`).
    pub fn raw_content_id(&self) -> Option<u64> {
        self.query_id("page_id").or_else(|| self.query_id("p"))
    }

    /// The resolved query, when routing has completed.
    pub fn resolved(&self) -> Option<&ResolvedQuery> {
        self.resolved.as_ref()
    }

    /// REST-prefix recursion guard.
    pub fn rest_guard(&self) -> bool {
        self.rest_guard.get()
    }

    pub fn set_rest_guard(&self, on: bool) {
        self.rest_guard.set(on);
    }
}

/// Parse a JSON value as a content id.
fn value_as_id(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// What the host's routing layer resolved the request to.
///
/// Only meaningful after the main query has run; until then the engine
/// forces early-mode matching.
#[derive(Debug, Clone, Default)]
pub struct ResolvedQuery {
    /// The singular content item being viewed, if any
    pub content: Option<ResolvedContent>,
    /// The post type whose archive is being viewed, if any
    pub post_type_archive: Option<String>,
    /// The term archive being viewed, if any
    pub term_archive: Option<ResolvedTerm>,
    /// Terms attached to the singular content item
    pub terms: Vec<ResolvedTerm>,
}

/// The singular content item routing resolved to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedContent {
    pub id: u64,
    pub kind: String,
}

/// A term reference in the resolved query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTerm {
    pub id: u64,
    pub taxonomy: String,
}

impl ResolvedQuery {
    /// A request resolving to a singular content item.
    pub fn singular(id: u64, kind: impl Into<String>) -> Self {
        Self {
            content: Some(ResolvedContent {
                id,
                kind: kind.into(),
            }),
            ..Self::default()
        }
    }

    /// A request resolving to a post type archive.
    pub fn archive(post_type: impl Into<String>) -> Self {
        Self {
            post_type_archive: Some(post_type.into()),
            ..Self::default()
        }
    }

    /// A request resolving to a term archive.
    pub fn term_archive(term: u64, taxonomy: impl Into<String>) -> Self {
        Self {
            term_archive: Some(ResolvedTerm {
                id: term,
                taxonomy: taxonomy.into(),
            }),
            ..Self::default()
        }
    }

    /// Attach a term to the singular content item.
    pub fn with_term(mut self, term: u64, taxonomy: impl Into<String>) -> Self {
        self.terms.push(ResolvedTerm {
            id: term,
            taxonomy: taxonomy.into(),
        });
        self
    }

    /// Whether the current view is this specific page.
    pub fn is_page(&self, id: u64) -> bool {
        self.content
            .as_ref()
            .is_some_and(|c| c.kind == "page" && c.id == id)
    }

    /// Whether the current view is this specific post.
    pub fn is_single(&self, id: u64) -> bool {
        self.content
            .as_ref()
            .is_some_and(|c| c.kind == "post" && c.id == id)
    }

    /// Whether the current view is any single post (of kind `post`).
    pub fn is_any_single(&self) -> bool {
        self.content.as_ref().is_some_and(|c| c.kind == "post")
    }

    /// Whether the current view is a singular item of the given kind.
    pub fn is_singular(&self, kind: &str) -> bool {
        self.content.as_ref().is_some_and(|c| c.kind == kind)
    }

    /// Whether the current view is a singular item with the given id and
    /// kind.
    pub fn is_singular_item(&self, id: u64, kind: &str) -> bool {
        self.content
            .as_ref()
            .is_some_and(|c| c.kind == kind && c.id == id)
    }

    /// Whether the current view is the archive of the given post type.
    pub fn is_post_type_archive(&self, post_type: &str) -> bool {
        self.post_type_archive.as_deref() == Some(post_type)
    }

    /// Whether the current view is the archive of the given term.
    pub fn is_term_archive(&self, term: u64, taxonomy: &str) -> bool {
        self.term_archive
            .as_ref()
            .is_some_and(|t| t.id == term && t.taxonomy == taxonomy)
    }

    /// Whether the viewed content carries the given term.
    pub fn has_term(&self, term: u64, taxonomy: &str) -> bool {
        self.terms
            .iter()
            .any(|t| t.id == term && t.taxonomy == taxonomy)
    }
}
