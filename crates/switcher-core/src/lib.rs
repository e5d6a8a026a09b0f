//! Request-theme resolution engine for Theme Switcher
//!
//! This crate decides, once per request, which theme (if any) overrides
//! the site's main theme, implementing:
//!
//! - **Resolution engine**: strict-precedence classification (REST,
//!   dashboard background call, dashboard page load, preview, frontend)
//!   with first-match-wins rule evaluation
//! - **Rule matcher**: two-phase matching (raw-URL early mode before
//!   routing has run, resolved-query predicates afterwards)
//! - **Object registry**: cross-theme capture and re-registration of
//!   custom post types and taxonomies
//! - **Status sync**: rewrites or removes rules when tracked content
//!   changes publication status
//!
//! # Architecture
//!
//! `switcher-core` sits above the leaf crates and below the host glue:
//!
//! ```text
//!          host glue (hooks, admin UI)
//!                      |
//!               switcher-core
//!                      |
//!            +---------+---------+
//!            |                   |
//!    switcher-content     switcher-store
//! ```
//!
//! # Example
//!
//! ```
//! use switcher_core::{RequestContext, SiteConfig, ThemeResolver, ThemeSet};
//! use switcher_content::{MemoryContent, RegisteredTypes};
//! use switcher_store::{MemoryOptions, Rule, RuleStore, RuleTarget};
//!
//! let store = RuleStore::new(Box::new(MemoryOptions::new()));
//! store
//!     .add_rule(Rule::new(
//!         RuleTarget::Url { path: "about-us".into() },
//!         "themeB",
//!     ))
//!     .unwrap();
//!
//! let content = MemoryContent::new();
//! let themes = ThemeSet::new("main").with_theme("themeB");
//! let site = SiteConfig::default();
//! let types = RegisteredTypes::new();
//!
//! let resolver = ThemeResolver::new(&store, &content, &themes, &site, &types);
//! let request = RequestContext::new("/about-us/");
//! assert_eq!(resolver.resolve(&request), Some("themeB".to_string()));
//! ```

pub mod engine;
pub mod error;
pub mod matcher;
pub mod registry;
pub mod request;
pub mod site;
pub mod status_sync;
pub mod themes;

pub use engine::{RestRewrite, ThemeResolver};
pub use error::{Error, Result};
pub use matcher::{MatchContext, MatchPhase, matches};
pub use registry::{ObjectRegistry, ThemeObjects, referenced_post_types, referenced_taxonomies};
pub use request::{RequestContext, ResolvedContent, ResolvedQuery, ResolvedTerm};
pub use site::SiteConfig;
pub use status_sync::{StatusSync, TransitionEvent};
pub use themes::{ThemeProvider, ThemeSet};
