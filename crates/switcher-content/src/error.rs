//! Error types for switcher-content

/// Result type for switcher-content operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in switcher-content operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A post type or taxonomy name that is not a valid object key
    #[error("Invalid object type name: {name:?}")]
    InvalidTypeName { name: String },
}
