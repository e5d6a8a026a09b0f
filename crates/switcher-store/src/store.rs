//! Typed rule store over named options
//!
//! `RuleStore` is the single owner of rule-list and prefix persistence:
//! admin CRUD, status sync, and the resolution engine all go through it.

use crate::error::{Error, Result};
use crate::options::{OptionName, OptionStore, admin_theme_option};
use crate::rest_prefix::{DEFAULT_REST_PREFIX, RestPrefixMapping, sanitize_prefix, set_mapping};
use crate::rule::{Rule, RuleTarget};

use serde::{Deserialize, Serialize};

/// Stored document wrapping the rule list.
#[derive(Debug, Default, Serialize, Deserialize)]
struct RuleDoc {
    #[serde(default)]
    rules: Vec<Rule>,
}

/// Stored document wrapping the prefix mappings.
#[derive(Debug, Default, Serialize, Deserialize)]
struct PrefixDoc {
    #[serde(default)]
    prefixes: Vec<RestPrefixMapping>,
}

/// Stored document wrapping a single admin theme preference.
#[derive(Debug, Serialize, Deserialize)]
struct AdminThemeDoc {
    theme: String,
}

/// Typed facade over the option store.
pub struct RuleStore {
    options: Box<dyn OptionStore>,
}

impl RuleStore {
    pub fn new(options: Box<dyn OptionStore>) -> Self {
        Self { options }
    }

    /// Direct access to the underlying option store, for state persisted
    /// by other components (the object registry).
    pub fn options(&self) -> &dyn OptionStore {
        self.options.as_ref()
    }

    /// All saved rules, in evaluation order. Missing option reads as an
    /// empty list.
    pub fn rules(&self) -> Result<Vec<Rule>> {
        match self.options.read(OptionName::ThemeRules.as_str())? {
            Some(content) => Ok(toml::from_str::<RuleDoc>(&content)?.rules),
            None => Ok(Vec::new()),
        }
    }

    /// Replace the full rule list.
    pub fn save_rules(&self, rules: &[Rule]) -> Result<bool> {
        let doc = RuleDoc {
            rules: rules.to_vec(),
        };
        let content = toml::to_string_pretty(&doc)?;
        self.options.write(OptionName::ThemeRules.as_str(), &content)
    }

    /// Append a rule, validating it first. Returns the new rule's index.
    pub fn add_rule(&self, rule: Rule) -> Result<usize> {
        validate_rule(&rule)?;
        let mut rules = self.rules()?;
        rules.push(rule);
        self.save_rules(&rules)?;
        Ok(rules.len() - 1)
    }

    /// Remove the rule at `index`. Returns the removed rule.
    pub fn remove_rule(&self, index: usize) -> Result<Rule> {
        let mut rules = self.rules()?;
        if index >= rules.len() {
            return Err(Error::RuleNotFound { index });
        }
        let removed = rules.remove(index);
        self.save_rules(&rules)?;
        Ok(removed)
    }

    /// All REST prefix mappings.
    pub fn rest_prefixes(&self) -> Result<Vec<RestPrefixMapping>> {
        match self.options.read(OptionName::RestPrefixes.as_str())? {
            Some(content) => Ok(toml::from_str::<PrefixDoc>(&content)?.prefixes),
            None => Ok(Vec::new()),
        }
    }

    /// Replace the full mapping list.
    pub fn save_rest_prefixes(&self, prefixes: &[RestPrefixMapping]) -> Result<bool> {
        let doc = PrefixDoc {
            prefixes: prefixes.to_vec(),
        };
        let content = toml::to_string_pretty(&doc)?;
        self.options.write(OptionName::RestPrefixes.as_str(), &content)
    }

    /// Set the prefix for a theme, sanitizing the input and updating any
    /// existing mapping in place. Returns the stored mapping.
    pub fn set_rest_prefix(&self, theme: &str, raw_prefix: &str) -> Result<RestPrefixMapping> {
        if theme.is_empty() {
            return Err(Error::MissingTheme);
        }
        let prefix = sanitize_prefix(raw_prefix);
        if prefix == DEFAULT_REST_PREFIX {
            return Err(Error::ReservedPrefix { prefix });
        }
        let mut mappings = self.rest_prefixes()?;
        let stored = set_mapping(&mut mappings, theme, &prefix).clone();
        self.save_rest_prefixes(&mappings)?;
        Ok(stored)
    }

    /// Remove the mapping at `index`. Returns the removed mapping.
    pub fn remove_rest_prefix(&self, index: usize) -> Result<RestPrefixMapping> {
        let mut mappings = self.rest_prefixes()?;
        if index >= mappings.len() {
            return Err(Error::PrefixNotFound { index });
        }
        let removed = mappings.remove(index);
        self.save_rest_prefixes(&mappings)?;
        Ok(removed)
    }

    /// A user's dashboard theme preference, if set.
    pub fn admin_theme(&self, user: u64) -> Result<Option<String>> {
        match self.options.read(&admin_theme_option(user))? {
            Some(content) => {
                let doc: AdminThemeDoc = toml::from_str(&content)?;
                Ok((!doc.theme.is_empty()).then_some(doc.theme))
            }
            None => Ok(None),
        }
    }

    /// Set or clear a user's dashboard theme preference.
    pub fn set_admin_theme(&self, user: u64, theme: Option<&str>) -> Result<()> {
        let name = admin_theme_option(user);
        match theme {
            Some(theme) if !theme.is_empty() => {
                let content = toml::to_string(&AdminThemeDoc {
                    theme: theme.to_string(),
                })?;
                self.options.write(&name, &content)?;
            }
            _ => {
                self.options.delete(&name)?;
            }
        }
        Ok(())
    }
}

/// Reject rules the engine could never interpret; storage never holds a
/// rule this version created that it cannot read back.
fn validate_rule(rule: &Rule) -> Result<()> {
    if rule.theme.is_empty() {
        return Err(Error::MissingTheme);
    }
    match &rule.target {
        RuleTarget::Url { path } if path.trim_matches('/').is_empty() => Err(Error::MissingValue),
        RuleTarget::PostType { name, .. } if name.is_empty() => Err(Error::MissingValue),
        RuleTarget::Taxonomy { taxonomy, .. } if taxonomy.is_empty() => Err(Error::MissingValue),
        RuleTarget::CptItem { post_type, .. } if post_type.is_empty() => Err(Error::MissingValue),
        RuleTarget::Unknown { .. } => Err(Error::MissingValue),
        _ => Ok(()),
    }
}
