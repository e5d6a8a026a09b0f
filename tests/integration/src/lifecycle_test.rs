//! Lifecycle integration: status sync and the object registry
//!
//! Exercises the state that evolves across requests: rules following
//! content status transitions, and registration descriptors surviving a
//! theme switch, including persistence through the TOML option store.

use switcher_content::{ContentStatus, PostTypeSpec, RegisteredTypes, TaxonomySpec};
use switcher_core::{ObjectRegistry, RequestContext, StatusSync, ThemeResolver, TransitionEvent};
use switcher_core::{SiteConfig, ThemeSet};
use switcher_store::{Rule, RuleStore, RuleTarget, TomlOptions};
use switcher_test_utils::TestSite;
use tempfile::TempDir;

#[test]
fn status_sync_round_trip() {
    let site = TestSite::new("main").with_theme("themeB").with_rule(Rule::new(
        RuleTarget::Page {
            id: 42,
            status: ContentStatus::Draft,
        },
        "themeB",
    ));

    // draft -> publish rewrites the rule type.
    let sync = site.status_sync();
    assert!(
        sync.apply(&TransitionEvent::new(
            42,
            "page",
            ContentStatus::Draft,
            ContentStatus::Publish,
        ))
        .unwrap()
    );
    let rules = site.store.rules().unwrap();
    assert_eq!(rules.len(), 1);
    assert_eq!(rules[0].type_tag(), "page");

    // publish -> trash deletes it entirely.
    assert!(
        sync.apply(&TransitionEvent::new(
            42,
            "page",
            ContentStatus::Publish,
            ContentStatus::Trash,
        ))
        .unwrap()
    );
    assert!(site.store.rules().unwrap().is_empty());
}

#[test]
fn synced_rule_keeps_matching_after_publish() {
    let mut site = TestSite::new("main").with_theme("themeB").with_rule(Rule::new(
        RuleTarget::Page {
            id: 42,
            status: ContentStatus::Draft,
        },
        "themeB",
    ));
    site = site.with_content(
        switcher_content::ContentRecord::new(42, "page", "launch")
            .with_status(ContentStatus::Draft),
    );

    // Draft page: the status-qualified rule matches its path.
    assert_eq!(
        site.resolve(&RequestContext::new("/launch/")),
        Some("themeB".to_string())
    );

    // The page is published; sync rewrites the rule and resolution keeps
    // working through the new composite key.
    site.set_status(42, ContentStatus::Publish);
    site.status_sync()
        .apply(&TransitionEvent::new(
            42,
            "page",
            ContentStatus::Draft,
            ContentStatus::Publish,
        ))
        .unwrap();

    assert_eq!(
        site.resolve(&RequestContext::new("/launch/")),
        Some("themeB".to_string())
    );
}

/// Full vertical slice for the registry: theme A owns the `event` type,
/// a rule switches the site to theme B, and `event` URLs keep resolving
/// on the next request because re-registration replays the stored
/// descriptor.
#[test]
fn registry_survives_theme_switch_end_to_end() {
    let temp = TempDir::new().unwrap();
    let options = TomlOptions::new(temp.path().join("options"));
    let store = RuleStore::new(Box::new(options.clone()));

    let rule = Rule::new(
        RuleTarget::PostType {
            name: "event".to_string(),
            archive_slug: Some("events".to_string()),
            rewrite_slug: Some("event".to_string()),
        },
        "themeB",
    );
    store.add_rule(rule).unwrap();
    let rules = store.rules().unwrap();

    // Request 1: themeA active; it registers `event` and capture
    // records the descriptor under themeA.
    let mut live = RegisteredTypes::new();
    live.register_post_type(
        "event",
        PostTypeSpec::public("Events")
            .with_archive("events")
            .with_rewrite("event"),
    )
    .unwrap();
    live.register_taxonomy("genre", TaxonomySpec::public("Genres").with_rewrite("genres"))
        .unwrap();
    ObjectRegistry::refresh(&options, &rules, "themeA", &mut live).unwrap();

    // Request 2: the rule switched the site to themeB, which registers
    // nothing of its own. Re-registration replays `event` before the
    // matcher runs.
    let mut live = RegisteredTypes::new();
    let registry = ObjectRegistry::refresh(&options, &rules, "themeB", &mut live).unwrap();
    assert!(live.has_post_type("event"));

    let content = switcher_content::MemoryContent::new();
    let themes = ThemeSet::new("themeA").with_theme("themeB");
    let site = SiteConfig::default();
    let resolver = ThemeResolver::new(&store, &content, &themes, &site, &live);

    assert_eq!(
        resolver.resolve(&RequestContext::new("/events/")),
        Some("themeB".to_string())
    );
    assert_eq!(
        resolver.resolve(&RequestContext::new("/event/conference/")),
        Some("themeB".to_string())
    );

    // themeA's descriptors remain retrievable after the switch.
    let stored = registry.theme("themeA").unwrap();
    assert!(stored.post_types.contains_key("event"));
    assert!(stored.taxonomies.contains_key("genre"));
}

#[test]
fn registry_capture_persists_across_store_reloads() {
    let temp = TempDir::new().unwrap();
    let options = TomlOptions::new(temp.path().join("options"));

    let mut live = RegisteredTypes::new();
    live.register_post_type("event", PostTypeSpec::public("Events"))
        .unwrap();
    ObjectRegistry::refresh(&options, &[], "themeA", &mut live).unwrap();

    // A fresh handle over the same directory sees the captured entry.
    let reloaded = ObjectRegistry::load(&TomlOptions::new(temp.path().join("options"))).unwrap();
    assert!(reloaded.theme("themeA").is_some());
}

#[test]
fn status_sync_ignores_private_custom_types() {
    let mut types = RegisteredTypes::new();
    let mut spec = PostTypeSpec::public("Internal");
    spec.public = false;
    types.register_post_type("internal", spec).unwrap();

    let store = RuleStore::new(Box::new(switcher_store::MemoryOptions::new()));
    store
        .add_rule(Rule::new(
            RuleTarget::CptItem {
                id: 5,
                post_type: "internal".to_string(),
                status: ContentStatus::Draft,
            },
            "main",
        ))
        .unwrap();

    let sync = StatusSync::new(&store, &types);
    let changed = sync
        .apply(&TransitionEvent::new(
            5,
            "internal",
            ContentStatus::Draft,
            ContentStatus::Publish,
        ))
        .unwrap();

    assert!(!changed);
    assert_eq!(store.rules().unwrap()[0].type_tag(), "draft_cpt_item");
}
