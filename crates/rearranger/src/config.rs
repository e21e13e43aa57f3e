//! Rearranger configuration
//!
//! Policies for the two decisions the engine cannot make on its own: which of
//! several matching constructors to use, and what to do with properties that
//! cannot be written during field injection.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};

/// Rearranger configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RearrangeConfig {
    /// Policy when several constructors cover every property
    pub constructor_selection: ConstructorSelection,
    /// Policy for computed properties during field injection
    pub unwritable_properties: UnwritablePolicy,
    /// Keep type metadata between copies
    pub cache_metadata: bool,
}

impl RearrangeConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse configuration from TOML; missing keys take their defaults
    ///
    /// ```toml
    /// constructor_selection = "unique"
    /// unwritable_properties = "fail"
    /// cache_metadata = true
    /// ```
    ///
    /// # Errors
    /// Returns [`ConfigError::Parse`] on malformed input or unknown values
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(source)?)
    }

    /// With constructor selection policy
    #[inline]
    #[must_use]
    pub fn with_constructor_selection(mut self, policy: ConstructorSelection) -> Self {
        self.constructor_selection = policy;
        self
    }

    /// With unwritable property policy
    #[inline]
    #[must_use]
    pub fn with_unwritable_properties(mut self, policy: UnwritablePolicy) -> Self {
        self.unwritable_properties = policy;
        self
    }

    /// With metadata caching
    #[inline]
    #[must_use]
    pub fn with_cache_metadata(mut self, enabled: bool) -> Self {
        self.cache_metadata = enabled;
        self
    }
}

impl Default for RearrangeConfig {
    fn default() -> Self {
        Self {
            constructor_selection: ConstructorSelection::FirstMatch,
            unwritable_properties: UnwritablePolicy::RejectOverrides,
            cache_metadata: false,
        }
    }
}

/// Which matching constructor to use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConstructorSelection {
    /// First matching constructor in declaration order
    #[default]
    FirstMatch,

    /// Exactly one constructor may match
    Unique,
}

/// What to do with a property that has neither setter nor storage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnwritablePolicy {
    /// Skip it silently
    Skip,

    /// Skip it unless the caller overrode it; an override that cannot be
    /// honoured fails the copy
    #[default]
    RejectOverrides,

    /// Always fail
    Fail,
}
