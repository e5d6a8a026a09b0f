//! Content store trait and in-memory implementation
//!
//! The rule matcher asks one-directional questions: given an id, what are
//! the slug, parent, status, and kind? Lookups that find nothing return
//! `None`: a missing record is a non-match, never an error.

use std::collections::HashMap;

use crate::record::{ContentRecord, TermRecord};

/// Read-only access to content items and taxonomy terms.
pub trait ContentStore {
    /// Look up a content item by id.
    fn content(&self, id: u64) -> Option<ContentRecord>;

    /// Look up a taxonomy term by id.
    fn term(&self, id: u64) -> Option<TermRecord>;
}

/// In-memory content store.
///
/// The reference implementation: hosts with a real content backend
/// implement [`ContentStore`] over it; tests and embedded sites use this.
#[derive(Debug, Clone, Default)]
pub struct MemoryContent {
    contents: HashMap<u64, ContentRecord>,
    terms: HashMap<u64, TermRecord>,
}

impl MemoryContent {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a content record, replacing any previous record with the id.
    pub fn insert(&mut self, record: ContentRecord) {
        self.contents.insert(record.id, record);
    }

    /// Insert a term record, replacing any previous record with the id.
    pub fn insert_term(&mut self, term: TermRecord) {
        self.terms.insert(term.id, term);
    }

    /// Builder-style insert.
    pub fn with(mut self, record: ContentRecord) -> Self {
        self.insert(record);
        self
    }

    /// Builder-style term insert.
    pub fn with_term(mut self, term: TermRecord) -> Self {
        self.insert_term(term);
        self
    }
}

impl ContentStore for MemoryContent {
    fn content(&self, id: u64) -> Option<ContentRecord> {
        self.contents.get(&id).cloned()
    }

    fn term(&self, id: u64) -> Option<TermRecord> {
        self.terms.get(&id).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::ContentStatus;

    #[test]
    fn missing_content_returns_none() {
        let store = MemoryContent::new();
        assert!(store.content(42).is_none());
        assert!(store.term(42).is_none());
    }

    #[test]
    fn insert_and_look_up() {
        let store = MemoryContent::new()
            .with(ContentRecord::new(10, "page", "team").with_parent(9))
            .with_term(TermRecord::new(3, "category", "news"));

        let page = store.content(10).unwrap();
        assert_eq!(page.slug, "team");
        assert_eq!(page.parent, Some(9));
        assert_eq!(page.status, ContentStatus::Publish);

        let term = store.term(3).unwrap();
        assert_eq!(term.taxonomy, "category");
    }
}
