//! Rearranger - copy-with-overrides for test fixtures
//!
//! Produces a new instance of a type that equals an existing one except for
//! the properties the caller overrides. Types opt in with
//! `#[derive(Rearrange)]`, which generates the property table, constructor
//! descriptors and typed keys the engine works from.
//!
//! Two construction paths:
//! 1. **Constructor-based**: a declared constructor whose parameters cover
//!    every property is called with the resolved values, so the type's own
//!    validation runs on the copy
//! 2. **Allocation-based**: a blank instance is allocated and every property
//!    written through its setter or backing field
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use rearranger::prelude::*;
//!
//! #[derive(Debug, Clone, PartialEq, Rearrange)]
//! #[rearrange(constructor(new(name, number, other)))]
//! struct DataClass {
//!     name: String,
//!     number: i32,
//!     other: Option<String>,
//! }
//!
//! let copy = rearranger::copy(&original, |s| {
//!     s.set(DataClass::KEYS.name, "overridden".to_string())
//!         .clear(DataClass::KEYS.other);
//! })?;
//! ```

extern crate self as rearranger;

pub mod builder;
pub mod cache;
pub mod config;
pub mod error;
pub mod overrides;
pub mod property;
pub mod strategy;
pub mod table;

pub use builder::CopyBuilder;
pub use cache::MetadataCache;
pub use config::{ConstructorSelection, RearrangeConfig, UnwritablePolicy};
pub use error::{BoxedCause, ConfigError, InvokeError, RearrangeError};
pub use overrides::{CopyScope, OverrideEntry, OverrideSet, OverrideValue};
pub use property::{Access, Property, PropertyDescriptor, Value};
pub use strategy::{Arguments, ConstructionPlan, ConstructionSelector, ConstructorDescriptor};
pub use table::{describe, Rearrange, TypeDescriptor, TypeTable};

pub use rearranger_derive::Rearrange;

use once_cell::sync::Lazy;
use std::sync::Arc;

/// Copy engine holding a configuration and, optionally, cached type metadata
///
/// Shareable across threads; each copy call keeps its own override set and plan.
#[derive(Debug, Default)]
pub struct Rearranger {
    config: RearrangeConfig,
    cache: MetadataCache,
}

impl Rearranger {
    /// Create engine with default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create engine with configuration
    #[must_use]
    pub fn with_config(config: RearrangeConfig) -> Self {
        Self {
            config,
            cache: MetadataCache::new(),
        }
    }

    /// Get configuration
    #[inline]
    #[must_use]
    pub fn config(&self) -> &RearrangeConfig {
        &self.config
    }

    /// Get metadata cache; empty unless `cache_metadata` is enabled
    #[inline]
    #[must_use]
    pub fn cache(&self) -> &MetadataCache {
        &self.cache
    }

    /// Metadata for `T`, from the cache when caching is enabled
    ///
    /// # Errors
    /// Returns [`RearrangeError::Introspection`] if `T` cannot be described
    pub fn descriptor<T: Rearrange>(&self) -> Result<Arc<TypeDescriptor<T>>, RearrangeError> {
        if self.config.cache_metadata {
            self.cache.get_or_describe::<T>()
        } else {
            describe::<T>().map(Arc::new)
        }
    }

    /// Copy `original`, applying the overrides declared in `declare`
    ///
    /// # Errors
    /// Returns any [`RearrangeError`] raised while describing or rebuilding `T`
    pub fn copy<T, F>(&self, original: &T, declare: F) -> Result<T, RearrangeError>
    where
        T: Rearrange,
        F: FnOnce(&mut CopyScope<T>),
    {
        let mut scope = CopyScope::new();
        declare(&mut scope);
        self.copy_with(original, scope.into_overrides())
    }

    /// Copy `original` with a prepared override set
    ///
    /// # Errors
    /// Returns any [`RearrangeError`] raised while describing or rebuilding `T`
    pub fn copy_with<T: Rearrange>(
        &self,
        original: &T,
        overrides: OverrideSet,
    ) -> Result<T, RearrangeError> {
        let descriptor = self.descriptor::<T>()?;
        CopyBuilder::new(original, overrides, &descriptor, &self.config).build()
    }
}

static DEFAULT: Lazy<Rearranger> = Lazy::new(Rearranger::new);

/// Copy `original` with the default engine
///
/// ```rust,ignore
/// let copy = rearranger::copy(&original, |s| {
///     s.set(PojoClass::KEYS.name, "overridden".to_string());
/// })?;
/// ```
///
/// # Errors
/// See [`Rearranger::copy`]
pub fn copy<T, F>(original: &T, declare: F) -> Result<T, RearrangeError>
where
    T: Rearrange,
    F: FnOnce(&mut CopyScope<T>),
{
    DEFAULT.copy(original, declare)
}

/// Copy `original` with a prepared override set and the default engine
///
/// # Errors
/// See [`Rearranger::copy_with`]
pub fn copy_with<T: Rearrange>(original: &T, overrides: OverrideSet) -> Result<T, RearrangeError> {
    DEFAULT.copy_with(original, overrides)
}

/// Common imports
pub mod prelude {
    pub use crate::config::{ConstructorSelection, RearrangeConfig, UnwritablePolicy};
    pub use crate::error::{InvokeError, RearrangeError};
    pub use crate::overrides::{CopyScope, OverrideSet};
    pub use crate::property::Property;
    pub use crate::table::{Rearrange, TypeTable};
    pub use crate::Rearranger;
    pub use rearranger_derive::Rearrange;
}

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
