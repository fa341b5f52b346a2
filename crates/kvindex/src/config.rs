//! Index configuration.
//!
//! The namespace is the leading component of every index table name. It is
//! passed explicitly to descriptors instead of being read from global state.

use serde::Deserialize;

/// Environment variable holding the table namespace.
pub const NAMESPACE_ENV: &str = "KVINDEX_NAMESPACE";

/// Configuration shared by all indexes of an application.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct IndexConfig {
    /// Namespace prepended to every index table name.
    #[serde(default = "IndexConfig::default_namespace")]
    pub namespace: String,
}

impl IndexConfig {
    fn default_namespace() -> String {
        "kvindex".to_string()
    }

    /// Create a configuration with the given namespace.
    #[must_use]
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
        }
    }

    /// Load configuration from the environment, falling back to defaults.
    #[must_use]
    pub fn from_env() -> Self {
        std::env::var(NAMESPACE_ENV)
            .ok()
            .filter(|ns| !ns.is_empty())
            .map_or_else(Self::default, Self::new)
    }
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            namespace: Self::default_namespace(),
        }
    }
}
