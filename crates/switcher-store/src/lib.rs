//! Rule and option persistence for Theme Switcher
//!
//! This crate owns everything the plugin stores: the ordered rule list,
//! REST prefix mappings, per-user admin theme preferences, and the named
//! option values they serialize into. Other components never touch
//! persistence directly; they read and mutate through [`RuleStore`].

pub mod error;
pub mod options;
pub mod rest_prefix;
pub mod rule;
pub mod store;

pub use error::{Error, Result};
pub use options::{MemoryOptions, OptionName, OptionStore, TomlOptions, admin_theme_option};
pub use rest_prefix::{
    DEFAULT_REST_PREFIX, RestPrefixMapping, prefix_for_theme, sanitize_prefix, set_mapping,
};
pub use rule::{Rule, RuleTarget, dynamic_tag, target_for_status};
pub use store::RuleStore;
