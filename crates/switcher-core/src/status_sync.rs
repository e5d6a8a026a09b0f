//! Rule synchronization on content status transitions
//!
//! A rule tracking a specific content item carries that item's status in
//! its composite type key. When the item's status changes the rule has to
//! follow: `draft_page` becomes `page` on publish, and trashing the item
//! removes the rule outright. The sync runs off the host's status
//! transition events and persists only when something actually changed.

use switcher_content::{ContentStatus, RegisteredTypes, kind};
use switcher_store::{Rule, RuleStore, target_for_status};

use crate::error::Result;

/// A content status transition reported by the host.
#[derive(Debug, Clone)]
pub struct TransitionEvent {
    /// Content id
    pub id: u64,
    /// Content kind (`page`, `post`, or a custom post type)
    pub kind: String,
    /// Status before the transition
    pub old_status: ContentStatus,
    /// Status after the transition
    pub new_status: ContentStatus,
    /// Whether the event describes a revision
    pub is_revision: bool,
    /// Whether the event describes an autosave
    pub is_autosave: bool,
}

impl TransitionEvent {
    pub fn new(
        id: u64,
        kind: impl Into<String>,
        old_status: ContentStatus,
        new_status: ContentStatus,
    ) -> Self {
        Self {
            id,
            kind: kind.into(),
            old_status,
            new_status,
            is_revision: false,
            is_autosave: false,
        }
    }

    pub fn revision(mut self) -> Self {
        self.is_revision = true;
        self
    }

    pub fn autosave(mut self) -> Self {
        self.is_autosave = true;
        self
    }
}

/// Keeps stored rules consistent with content lifecycle changes.
pub struct StatusSync<'a> {
    store: &'a RuleStore,
    types: &'a RegisteredTypes,
}

impl<'a> StatusSync<'a> {
    pub fn new(store: &'a RuleStore, types: &'a RegisteredTypes) -> Self {
        Self { store, types }
    }

    /// Apply a status transition to the stored rules.
    ///
    /// Returns whether the rule list was modified. Revisions, autosaves,
    /// no-op transitions, and unsupported kinds are ignored.
    pub fn apply(&self, event: &TransitionEvent) -> Result<bool> {
        if event.is_revision || event.is_autosave || event.new_status == event.old_status {
            return Ok(false);
        }
        if !self.supported_kind(&event.kind) {
            return Ok(false);
        }

        let rules = self.store.rules()?;
        let mut updated = Vec::with_capacity(rules.len());
        let mut changed = false;

        for rule in rules {
            if !rule.matches_composite(event.id, &event.old_status, &event.kind) {
                updated.push(rule);
                continue;
            }

            if event.new_status == ContentStatus::Trash {
                tracing::debug!(id = event.id, kind = %event.kind, "content trashed; removing rule");
                changed = true;
                continue;
            }

            match target_for_status(&event.new_status, &event.kind, event.id) {
                Some(target) => {
                    let rewritten = Rule::new(target, rule.theme.clone());
                    tracing::debug!(
                        id = event.id,
                        from = %rule.type_tag(),
                        to = %rewritten.type_tag(),
                        "rewriting rule for status transition"
                    );
                    updated.push(rewritten);
                    changed = true;
                }
                None => {
                    // No composite mapping for the new status: the rule
                    // can no longer track this item.
                    tracing::debug!(
                        id = event.id,
                        status = %event.new_status,
                        "no rule mapping for new status; removing rule"
                    );
                    changed = true;
                }
            }
        }

        if changed {
            self.store.save_rules(&updated)?;
        }
        Ok(changed)
    }

    /// Pages and posts are always synchronized; custom kinds only when
    /// publicly registered.
    fn supported_kind(&self, kind_name: &str) -> bool {
        if kind_name == kind::PAGE || kind_name == kind::POST {
            return true;
        }
        self.types
            .post_type(kind_name)
            .is_some_and(|spec| spec.public)
    }
}
