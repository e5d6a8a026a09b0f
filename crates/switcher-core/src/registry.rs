//! Cross-theme object registry
//!
//! Custom post types and taxonomies are declared by themes, so when a
//! rule swaps the active theme mid-request the types the inactive theme
//! declares would silently vanish and URL parsing for them would break.
//! The registry persists every theme's registration descriptors and
//! replays the ones the active rules need. Two idempotent phases run on
//! every request:
//!
//! 1. **Re-registration**, before the active theme registers anything of
//!    its own: any type a rule references that is not currently
//!    registered is looked up across all stored theme entries and
//!    registered from its stored descriptor.
//! 2. **Capture**, after the active theme's registrations: the public
//!    custom types now registered are recorded under the active theme's
//!    slug. The write is skipped when nothing changed.
//!
//! Over time the registry accumulates the full map from theme to the
//! types it defines, which is what makes re-registration possible for
//! any theme, not just the previously active one.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use switcher_content::{PostTypeSpec, RegisteredTypes, TaxonomySpec};
use switcher_store::{OptionName, OptionStore, Rule, RuleTarget};

use crate::error::Result;

/// The types one theme declares.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThemeObjects {
    #[serde(default)]
    pub post_types: BTreeMap<String, PostTypeSpec>,
    #[serde(default)]
    pub taxonomies: BTreeMap<String, TaxonomySpec>,
    /// When this entry's content last changed
    pub captured: DateTime<Utc>,
}

impl ThemeObjects {
    /// Whether the descriptor content equals another entry's, ignoring
    /// the capture timestamp.
    fn same_content(&self, other: &ThemeObjects) -> bool {
        self.post_types == other.post_types && self.taxonomies == other.taxonomies
    }
}

/// Persisted map from owning theme slug to its registration descriptors.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ObjectRegistry {
    #[serde(default)]
    themes: BTreeMap<String, ThemeObjects>,
}

impl ObjectRegistry {
    /// Load the registry from the option store; missing reads as empty.
    pub fn load(options: &dyn OptionStore) -> Result<Self> {
        match options.read(OptionName::ThemeObjects.as_str())? {
            Some(content) => Ok(toml::from_str(&content)?),
            None => Ok(Self::default()),
        }
    }

    /// Persist the registry. Returns whether anything was written.
    pub fn save(&self, options: &dyn OptionStore) -> Result<bool> {
        let content = toml::to_string_pretty(self)?;
        Ok(options.write(OptionName::ThemeObjects.as_str(), &content)?)
    }

    /// The stored entry for a theme.
    pub fn theme(&self, slug: &str) -> Option<&ThemeObjects> {
        self.themes.get(slug)
    }

    /// Search every stored theme entry for a post type descriptor.
    pub fn find_post_type(&self, name: &str) -> Option<(&str, &PostTypeSpec)> {
        self.themes
            .iter()
            .find_map(|(theme, objects)| {
                objects.post_types.get(name).map(|spec| (theme.as_str(), spec))
            })
    }

    /// Search every stored theme entry for a taxonomy descriptor.
    pub fn find_taxonomy(&self, name: &str) -> Option<(&str, &TaxonomySpec)> {
        self.themes
            .iter()
            .find_map(|(theme, objects)| {
                objects.taxonomies.get(name).map(|spec| (theme.as_str(), spec))
            })
    }

    /// Phase 1: re-register types the rules reference but nothing has
    /// registered this request. Returns how many registrations were
    /// replayed.
    pub fn reregister(&self, rules: &[Rule], types: &mut RegisteredTypes) -> usize {
        let mut replayed = 0;

        for name in referenced_post_types(rules) {
            if types.has_post_type(&name) {
                continue;
            }
            if let Some((theme, spec)) = self.find_post_type(&name) {
                match types.register_post_type(&name, spec.clone()) {
                    Ok(()) => {
                        tracing::debug!(post_type = %name, owner = theme, "re-registered post type from registry");
                        replayed += 1;
                    }
                    Err(error) => {
                        tracing::warn!(post_type = %name, %error, "stored post type descriptor is unusable");
                    }
                }
            }
        }

        for name in referenced_taxonomies(rules) {
            if types.has_taxonomy(&name) {
                continue;
            }
            if let Some((theme, spec)) = self.find_taxonomy(&name) {
                match types.register_taxonomy(&name, spec.clone()) {
                    Ok(()) => {
                        tracing::debug!(taxonomy = %name, owner = theme, "re-registered taxonomy from registry");
                        replayed += 1;
                    }
                    Err(error) => {
                        tracing::warn!(taxonomy = %name, %error, "stored taxonomy descriptor is unusable");
                    }
                }
            }
        }

        replayed
    }

    /// Phase 2: record the public custom types registered for the
    /// active theme. The entry is rewritten (and the timestamp advanced)
    /// only when the descriptor content differs from what is stored.
    ///
    /// Returns whether the registry changed.
    pub fn capture(&mut self, active_theme: &str, types: &RegisteredTypes) -> bool {
        let entry = ThemeObjects {
            post_types: types
                .public_custom_post_types()
                .map(|(name, spec)| (name.clone(), spec.clone()))
                .collect(),
            taxonomies: types
                .public_custom_taxonomies()
                .map(|(name, spec)| (name.clone(), spec.clone()))
                .collect(),
            captured: Utc::now(),
        };

        if let Some(stored) = self.themes.get(active_theme)
            && stored.same_content(&entry)
        {
            tracing::debug!(theme = active_theme, "registry entry unchanged; skipping capture");
            return false;
        }

        self.themes.insert(active_theme.to_string(), entry);
        true
    }

    /// Run both phases against persisted state: load, re-register, then
    /// capture and save when the active theme's entry changed.
    pub fn refresh(
        options: &dyn OptionStore,
        rules: &[Rule],
        active_theme: &str,
        types: &mut RegisteredTypes,
    ) -> Result<Self> {
        let mut registry = Self::load(options)?;
        registry.reregister(rules, types);
        if registry.capture(active_theme, types) {
            registry.save(options)?;
        }
        Ok(registry)
    }
}

/// Custom post type slugs the rule list references.
pub fn referenced_post_types(rules: &[Rule]) -> BTreeSet<String> {
    rules
        .iter()
        .filter_map(|rule| match &rule.target {
            RuleTarget::PostType { name, .. } => Some(name.clone()),
            RuleTarget::CptItem { post_type, .. } => Some(post_type.clone()),
            _ => None,
        })
        .collect()
}

/// Custom taxonomy slugs the rule list references.
pub fn referenced_taxonomies(rules: &[Rule]) -> BTreeSet<String> {
    rules
        .iter()
        .filter_map(|rule| match &rule.target {
            RuleTarget::Taxonomy { taxonomy, .. } => Some(taxonomy.clone()),
            _ => None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use switcher_store::MemoryOptions;

    fn event_rule() -> Rule {
        Rule::new(
            RuleTarget::PostType {
                name: "event".to_string(),
                archive_slug: Some("events".to_string()),
                rewrite_slug: None,
            },
            "themeA",
        )
    }

    fn genre_rule() -> Rule {
        Rule::new(
            RuleTarget::Taxonomy {
                term: 8,
                taxonomy: "genre".to_string(),
                rewrite_slug: None,
            },
            "themeA",
        )
    }

    fn theme_a_types() -> RegisteredTypes {
        let mut types = RegisteredTypes::new();
        types
            .register_post_type(
                "event",
                PostTypeSpec::public("Events").with_archive("events"),
            )
            .unwrap();
        types
            .register_taxonomy("genre", TaxonomySpec::public("Genres").with_rewrite("genres"))
            .unwrap();
        types
    }

    #[test]
    fn referenced_types_come_from_all_rule_forms() {
        let rules = vec![
            event_rule(),
            genre_rule(),
            Rule::new(
                RuleTarget::CptItem {
                    id: 5,
                    post_type: "recipe".to_string(),
                    status: switcher_content::ContentStatus::Publish,
                },
                "themeA",
            ),
            Rule::new(
                RuleTarget::Url {
                    path: "about".to_string(),
                },
                "themeA",
            ),
        ];

        let post_types: Vec<String> = referenced_post_types(&rules).into_iter().collect();
        assert_eq!(post_types, vec!["event", "recipe"]);
        let taxonomies: Vec<String> = referenced_taxonomies(&rules).into_iter().collect();
        assert_eq!(taxonomies, vec!["genre"]);
    }

    #[test]
    fn capture_records_public_custom_types_under_the_active_theme() {
        let mut registry = ObjectRegistry::default();
        let types = theme_a_types();

        assert!(registry.capture("themeA", &types));
        let stored = registry.theme("themeA").unwrap();
        assert!(stored.post_types.contains_key("event"));
        assert!(stored.taxonomies.contains_key("genre"));
    }

    #[test]
    fn capture_skips_identical_content() {
        let mut registry = ObjectRegistry::default();
        let types = theme_a_types();

        assert!(registry.capture("themeA", &types));
        let first_stamp = registry.theme("themeA").unwrap().captured;

        assert!(!registry.capture("themeA", &types));
        assert_eq!(registry.theme("themeA").unwrap().captured, first_stamp);

        // A changed descriptor rewrites the entry.
        let mut changed = types.clone();
        changed
            .register_post_type(
                "event",
                PostTypeSpec::public("Events").with_archive("happenings"),
            )
            .unwrap();
        assert!(registry.capture("themeA", &changed));
    }

    #[test]
    fn reregister_replays_missing_types_from_any_stored_theme() {
        let mut registry = ObjectRegistry::default();
        registry.capture("themeA", &theme_a_types());

        // A request running under themeB: nothing registered yet.
        let mut live = RegisteredTypes::new();
        let rules = vec![event_rule(), genre_rule()];
        let replayed = registry.reregister(&rules, &mut live);

        assert_eq!(replayed, 2);
        assert_eq!(
            live.post_type("event").unwrap().archive_slug.as_deref(),
            Some("events")
        );
        assert_eq!(
            live.taxonomy("genre").unwrap().rewrite_slug.as_deref(),
            Some("genres")
        );
    }

    #[test]
    fn reregister_leaves_registered_types_alone() {
        let mut registry = ObjectRegistry::default();
        registry.capture("themeA", &theme_a_types());

        let mut live = RegisteredTypes::new();
        live.register_post_type("event", PostTypeSpec::public("Live Events"))
            .unwrap();

        registry.reregister(&[event_rule()], &mut live);
        assert_eq!(live.post_type("event").unwrap().label, "Live Events");
    }

    #[test]
    fn refresh_persists_only_on_change() {
        let options = MemoryOptions::new();
        let rules = vec![event_rule()];

        // First request under themeA: capture writes.
        let mut live = theme_a_types();
        ObjectRegistry::refresh(&options, &rules, "themeA", &mut live).unwrap();

        let stored = ObjectRegistry::load(&options).unwrap();
        assert!(stored.theme("themeA").is_some());

        // Second identical request: nothing to write; stamp unchanged.
        let stamp = stored.theme("themeA").unwrap().captured;
        let mut live = theme_a_types();
        ObjectRegistry::refresh(&options, &rules, "themeA", &mut live).unwrap();
        let reloaded = ObjectRegistry::load(&options).unwrap();
        assert_eq!(reloaded.theme("themeA").unwrap().captured, stamp);
    }

    #[test]
    fn registry_survives_a_theme_switch() {
        let options = MemoryOptions::new();
        let rules = vec![event_rule()];

        // Request 1: themeA is active and registers its types.
        let mut live = theme_a_types();
        ObjectRegistry::refresh(&options, &rules, "themeA", &mut live).unwrap();

        // Request 2: a rule switched the site to themeB, which registers
        // nothing. Re-registration replays the descriptor so `event`
        // URLs keep parsing; themeA's entry stays retrievable.
        let mut live = RegisteredTypes::new();
        let registry = ObjectRegistry::refresh(&options, &rules, "themeB", &mut live).unwrap();

        assert!(live.has_post_type("event"));
        assert!(registry.theme("themeA").is_some());
        assert!(
            registry
                .theme("themeA")
                .unwrap()
                .post_types
                .contains_key("event")
        );
    }
}
