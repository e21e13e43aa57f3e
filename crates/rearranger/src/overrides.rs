//! Override declarations
//!
//! [`CopyScope`] is the declarative block handed to the caller; it records
//! into an [`OverrideSet`] private to one copy. An override that sets an
//! `Option` property to `None` is present, which is not the same as a property
//! that was never touched.

use crate::property::{Property, Value};
use indexmap::IndexMap;
use std::fmt;
use std::marker::PhantomData;

/// A recorded override value
pub enum OverrideValue {
    /// Value given up front
    Ready(Value),

    /// Supplier evaluated once, when the copy is built
    Deferred(Box<dyn FnOnce() -> Value>),
}

impl OverrideValue {
    /// Produce the value, running a deferred supplier
    #[must_use]
    pub fn resolve(self) -> Value {
        match self {
            Self::Ready(value) => value,
            Self::Deferred(supplier) => supplier(),
        }
    }
}

impl fmt::Debug for OverrideValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ready(value) => f.debug_tuple("Ready").field(value).finish(),
            Self::Deferred(_) => f.write_str("Deferred"),
        }
    }
}

/// State of one property in an [`OverrideSet`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverrideEntry {
    /// Never declared; the original's value is used
    Absent,

    /// Declared; the override is used, even when it is `None`
    Present,
}

/// Property name → override value, in declaration order
#[derive(Debug, Default)]
pub struct OverrideSet {
    entries: IndexMap<String, OverrideValue>,
}

impl OverrideSet {
    /// Create empty override set
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an override; a second declaration of the same name wins
    pub fn set<V: 'static>(&mut self, name: impl Into<String>, value: V) -> &mut Self {
        self.entries
            .insert(name.into(), OverrideValue::Ready(Value::new(value)));
        self
    }

    /// Record an override produced by `supplier` at build time
    ///
    /// The supplier runs once the copy has passed validation, so it is never
    /// called for a copy that is rejected.
    pub fn set_with<V, F>(&mut self, name: impl Into<String>, supplier: F) -> &mut Self
    where
        V: 'static,
        F: FnOnce() -> V + 'static,
    {
        self.entries.insert(
            name.into(),
            OverrideValue::Deferred(Box::new(move || Value::new(supplier()))),
        );
        self
    }

    /// State of the named property
    #[must_use]
    pub fn entry(&self, name: &str) -> OverrideEntry {
        if self.entries.contains_key(name) {
            OverrideEntry::Present
        } else {
            OverrideEntry::Absent
        }
    }

    /// Check if the named property was overridden
    #[inline]
    #[must_use]
    pub fn is_present(&self, name: &str) -> bool {
        self.entry(name) == OverrideEntry::Present
    }

    /// Remove and return the named override
    pub fn take(&mut self, name: &str) -> Option<OverrideValue> {
        self.entries.shift_remove(name)
    }

    /// Overridden names in declaration order
    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.entries.keys().map(String::as_str)
    }

    /// Number of overrides
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if nothing was overridden
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Declarative override block for copying a `T`
///
/// ```rust,ignore
/// let copy = rearranger::copy(&original, |s| {
///     s.set(DataClass::KEYS.name, "overridden".to_string())
///         .clear(DataClass::KEYS.other);
/// })?;
/// ```
pub struct CopyScope<T> {
    overrides: OverrideSet,
    _target: PhantomData<fn() -> T>,
}

impl<T> CopyScope<T> {
    /// Create empty scope
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            overrides: OverrideSet::new(),
            _target: PhantomData,
        }
    }

    /// Set property to value in the copy
    pub fn set<V: 'static>(&mut self, property: Property<V>, value: V) -> &mut Self {
        self.overrides.set(property.name(), value);
        self
    }

    /// Set property to a value supplied when the copy is built; the supplier
    /// is not called if the copy is rejected
    pub fn set_with<V, F>(&mut self, property: Property<V>, supplier: F) -> &mut Self
    where
        V: 'static,
        F: FnOnce() -> V + 'static,
    {
        self.overrides.set_with(property.name(), supplier);
        self
    }

    /// Set an optional property to `None` in the copy
    pub fn clear<V: 'static>(&mut self, property: Property<Option<V>>) -> &mut Self {
        self.set(property, None)
    }

    /// Set a property by name; the value type is checked when the copy is built
    pub fn set_named<V: 'static>(&mut self, name: &str, value: V) -> &mut Self {
        self.overrides.set(name, value);
        self
    }

    /// Overrides declared so far
    #[inline]
    #[must_use]
    pub fn overrides(&self) -> &OverrideSet {
        &self.overrides
    }

    /// Finish the scope
    #[inline]
    #[must_use]
    pub fn into_overrides(self) -> OverrideSet {
        self.overrides
    }
}

impl<T> Default for CopyScope<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for CopyScope<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CopyScope")
            .field("overrides", &self.overrides)
            .finish()
    }
}
