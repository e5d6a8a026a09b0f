//! Error types for switcher-core

/// Result type for switcher-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in switcher-core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    // Transparent wrappers for underlying crate errors
    /// Persistence error from switcher-store
    #[error(transparent)]
    Store(#[from] switcher_store::Error),

    /// Content model error from switcher-content
    #[error(transparent)]
    Content(#[from] switcher_content::Error),

    /// TOML deserialization error
    #[error(transparent)]
    TomlDe(#[from] toml::de::Error),

    /// TOML serialization error
    #[error(transparent)]
    TomlSer(#[from] toml::ser::Error),
}
