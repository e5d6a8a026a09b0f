//! End-to-end resolution scenarios
//!
//! These tests exercise the complete flow: stored rules -> request
//! classification -> matcher -> theme override.

use switcher_content::{ContentRecord, ContentStatus};
use switcher_core::{RequestContext, ResolvedQuery};
use switcher_store::{Rule, RuleTarget};
use switcher_test_utils::TestSite;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .try_init();
}

#[test]
fn url_rule_scenario() {
    init_tracing();
    let site = TestSite::new("main")
        .with_theme("themeB")
        .with_url_rule("about-us", "themeB");

    assert_eq!(
        site.resolve(&RequestContext::new("/about-us/")),
        Some("themeB".to_string())
    );
    assert_eq!(site.resolve(&RequestContext::new("/pricing/")), None);
}

#[test]
fn hierarchical_page_scenario() {
    init_tracing();
    let site = TestSite::new("main")
        .with_theme("themeB")
        .with_page(9, "company", None)
        .with_page(10, "team", Some(9))
        .with_page_rule(10, "themeB");

    // The full hierarchical path matches.
    assert_eq!(
        site.resolve(&RequestContext::new("/company/team/")),
        Some("themeB".to_string())
    );
    // The bare child slug is missing the parent segment.
    assert_eq!(site.resolve(&RequestContext::new("/team/")), None);
}

#[test]
fn draft_parent_blocks_early_matching() {
    init_tracing();
    let mut site = TestSite::new("main")
        .with_theme("themeB")
        .with_page(9, "company", None)
        .with_page(10, "team", Some(9))
        .with_page_rule(10, "themeB");
    site.set_status(9, ContentStatus::Draft);

    assert_eq!(site.resolve(&RequestContext::new("/company/team/")), None);
    assert_eq!(site.resolve(&RequestContext::new("/team/")), None);
}

#[test]
fn rest_prefix_scenario_beats_frontend_rules() {
    init_tracing();
    let site = TestSite::new("main")
        .with_theme("themeB")
        .with_theme("themeC")
        .with_url_rule("wp-json-2", "themeB");
    site.store.set_rest_prefix("themeC", "wp-json-2").unwrap();

    // REST classification wins regardless of the overlapping URL rule.
    assert_eq!(
        site.resolve(&RequestContext::new("/wp-json-2/wp/v2/posts")),
        Some("themeC".to_string())
    );
}

#[test]
fn first_match_wins_across_rule_kinds() {
    init_tracing();
    let site = TestSite::new("main")
        .with_theme("themeB")
        .with_theme("themeC")
        .with_post(7, "announcement")
        .with_rule(Rule::new(
            RuleTarget::Post {
                id: 7,
                status: ContentStatus::Publish,
            },
            "themeB",
        ))
        .with_url_rule("blog", "themeC");

    // Both rules match the request; the earlier one provides the theme.
    assert_eq!(
        site.resolve(&RequestContext::new("/blog/announcement/")),
        Some("themeB".to_string())
    );
}

#[test]
fn resolve_is_idempotent_for_identical_state() {
    init_tracing();
    let site = TestSite::new("main")
        .with_theme("themeB")
        .with_url_rule("about-us", "themeB");

    let request = RequestContext::new("/about-us/?utm=x");
    let first = site.resolve(&request);
    let second = site.resolve(&request);
    assert_eq!(first, second);
}

#[test]
fn late_phase_resolution_uses_the_resolved_query() {
    init_tracing();
    let site = TestSite::new("main")
        .with_theme("themeB")
        .with_term(3, "category", "news")
        .with_rule(Rule::new(RuleTarget::Category { term: 3 }, "themeB"));

    // A single post carrying the category term, at a URL the early
    // matcher could never connect to the term.
    let request = RequestContext::new("/2026/08/some-headline/")
        .with_resolved(ResolvedQuery::singular(50, "post").with_term(3, "category"));
    assert_eq!(site.resolve(&request), Some("themeB".to_string()));
}

#[test]
fn preview_request_uses_composite_status_rules() {
    init_tracing();
    let site = TestSite::new("main")
        .with_theme("themeB")
        .with_content(
            ContentRecord::new(42, "page", "launch").with_status(ContentStatus::Draft),
        )
        .with_rule(Rule::new(
            RuleTarget::Page {
                id: 42,
                status: ContentStatus::Draft,
            },
            "themeB",
        ));

    assert_eq!(
        site.resolve(&RequestContext::new("/?page_id=42&preview=true")),
        Some("themeB".to_string())
    );
}

#[test]
fn dashboard_background_call_resolves_through_content_context() {
    init_tracing();
    let site = TestSite::new("main")
        .with_theme("themeB")
        .with_page(17, "team", None)
        .with_page_rule(17, "themeB");

    let request = RequestContext::new("/wp-admin/admin-ajax.php")
        .background_call()
        .with_field("post_id", serde_json::json!(17));
    assert_eq!(site.resolve(&request), Some("themeB".to_string()));
}

#[test]
fn template_and_stylesheet_echo_current_without_override() {
    init_tracing();
    let site = TestSite::new("main").with_theme("themeB");

    let request = RequestContext::new("/anywhere/");
    let resolver = site.resolver();
    assert_eq!(resolver.template(&request, "main"), "main");
    assert_eq!(resolver.stylesheet(&request, "main"), "main");
}
