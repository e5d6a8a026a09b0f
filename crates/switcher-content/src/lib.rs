//! Content records and registration descriptors for Theme Switcher
//!
//! This crate is the content-side leaf of the workspace: it models the
//! structural facts the rule matcher needs (slugs, parent chains,
//! publication status) and the registration descriptors for custom post
//! types and taxonomies, without any knowledge of rules or themes.

pub mod error;
pub mod record;
pub mod store;
pub mod types;

pub use error::{Error, Result};
pub use record::{ContentRecord, ContentStatus, TermRecord, kind, taxonomy};
pub use store::{ContentStore, MemoryContent};
pub use types::{PostTypeSpec, RegisteredTypes, TaxonomySpec};
