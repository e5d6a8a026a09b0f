//! [`TestSite`] builder for theme-switcher test scenarios.
//!
//! Assembles an in-memory site (installed themes, content, registered
//! types, site settings, and an option-backed rule store) and hands out
//! resolvers over it.

use switcher_content::{
    ContentRecord, ContentStatus, ContentStore, MemoryContent, PostTypeSpec, RegisteredTypes,
    TaxonomySpec, TermRecord,
};
use switcher_core::{SiteConfig, StatusSync, ThemeResolver, ThemeSet};
use switcher_store::{MemoryOptions, Rule, RuleStore, RuleTarget};

/// An in-memory site with helper methods for test setup.
///
/// # Example
///
/// ```
/// use switcher_test_utils::TestSite;
///
/// let site = TestSite::new("main")
///     .with_theme("themeB")
///     .with_page(10, "team", None)
///     .with_url_rule("about-us", "themeB");
///
/// let request = switcher_core::RequestContext::new("/about-us/");
/// assert_eq!(site.resolve(&request), Some("themeB".to_string()));
/// ```
pub struct TestSite {
    pub store: RuleStore,
    pub content: MemoryContent,
    pub themes: ThemeSet,
    pub site: SiteConfig,
    pub types: RegisteredTypes,
}

impl TestSite {
    /// Create a site whose main theme is `current`.
    pub fn new(current: &str) -> Self {
        Self {
            store: RuleStore::new(Box::new(MemoryOptions::new())),
            content: MemoryContent::new(),
            themes: ThemeSet::new(current),
            site: SiteConfig::default(),
            types: RegisteredTypes::new(),
        }
    }

    /// Install an additional theme.
    pub fn with_theme(mut self, slug: &str) -> Self {
        self.themes = self.themes.with_theme(slug);
        self
    }

    /// Add a published page, optionally with a parent.
    pub fn with_page(mut self, id: u64, slug: &str, parent: Option<u64>) -> Self {
        let mut record = ContentRecord::new(id, "page", slug);
        if let Some(parent) = parent {
            record = record.with_parent(parent);
        }
        self.content.insert(record);
        self
    }

    /// Add a published post.
    pub fn with_post(mut self, id: u64, slug: &str) -> Self {
        self.content.insert(ContentRecord::new(id, "post", slug));
        self
    }

    /// Add an arbitrary content record.
    pub fn with_content(mut self, record: ContentRecord) -> Self {
        self.content.insert(record);
        self
    }

    /// Add a taxonomy term.
    pub fn with_term(mut self, id: u64, taxonomy: &str, slug: &str) -> Self {
        self.content.insert_term(TermRecord::new(id, taxonomy, slug));
        self
    }

    /// Set a content record's status in place.
    pub fn set_status(&mut self, id: u64, status: ContentStatus) {
        if let Some(record) = self.content.content(id) {
            self.content.insert(ContentRecord {
                status,
                ..record
            });
        }
    }

    /// Register a post type as the active theme would.
    pub fn register_post_type(mut self, name: &str, spec: PostTypeSpec) -> Self {
        self.types
            .register_post_type(name, spec)
            .expect("TestSite::register_post_type: invalid name");
        self
    }

    /// Register a taxonomy as the active theme would.
    pub fn register_taxonomy(mut self, name: &str, spec: TaxonomySpec) -> Self {
        self.types
            .register_taxonomy(name, spec)
            .expect("TestSite::register_taxonomy: invalid name");
        self
    }

    /// Append a URL rule.
    pub fn with_url_rule(self, path: &str, theme: &str) -> Self {
        self.with_rule(Rule::new(
            RuleTarget::Url {
                path: path.to_string(),
            },
            theme,
        ))
    }

    /// Append a published-page rule.
    pub fn with_page_rule(self, id: u64, theme: &str) -> Self {
        self.with_rule(Rule::new(
            RuleTarget::Page {
                id,
                status: ContentStatus::Publish,
            },
            theme,
        ))
    }

    /// Append any rule.
    pub fn with_rule(self, rule: Rule) -> Self {
        self.store
            .add_rule(rule)
            .expect("TestSite::with_rule: rule rejected");
        self
    }

    /// A resolver borrowing this site's state.
    pub fn resolver(&self) -> ThemeResolver<'_> {
        ThemeResolver::new(
            &self.store,
            &self.content,
            &self.themes,
            &self.site,
            &self.types,
        )
    }

    /// Resolve a request against this site.
    pub fn resolve(&self, request: &switcher_core::RequestContext) -> Option<String> {
        self.resolver().resolve(request)
    }

    /// A status sync borrowing this site's state.
    pub fn status_sync(&self) -> StatusSync<'_> {
        StatusSync::new(&self.store, &self.types)
    }
}
