//! Error types for switcher-store

/// Result type for switcher-store operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in switcher-store operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Rule index does not exist in the stored list
    #[error("Rule not found at index {index}")]
    RuleNotFound { index: usize },

    /// REST prefix mapping index does not exist
    #[error("REST prefix mapping not found at index {index}")]
    PrefixNotFound { index: usize },

    /// A rule or mapping was submitted without a target theme
    #[error("A target theme is required")]
    MissingTheme,

    /// A rule was submitted without a usable value
    #[error("A rule value is required")]
    MissingValue,

    /// The prefix collides with the default REST prefix
    #[error("Prefix {prefix:?} is reserved for default REST handling")]
    ReservedPrefix { prefix: String },

    /// Standard I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// TOML deserialization error
    #[error(transparent)]
    TomlDe(#[from] toml::de::Error),

    /// TOML serialization error
    #[error(transparent)]
    TomlSer(#[from] toml::ser::Error),
}
