//! Type metadata cache using dashmap
//!
//! Keeps one [`TypeDescriptor`] per type. Population is compute-once per key:
//! the entry's shard stays locked while the type is described, so threads
//! racing on a new type wait for the first description instead of repeating it.

use crate::error::RearrangeError;
use crate::table::{describe, Rearrange, TypeDescriptor};
use dashmap::DashMap;
use std::any::{type_name, Any, TypeId};
use std::sync::Arc;

/// Concurrent `TypeId` → descriptor cache
#[derive(Debug, Default)]
pub struct MetadataCache {
    entries: DashMap<TypeId, Arc<dyn Any + Send + Sync>>,
}

impl MetadataCache {
    /// Create empty cache
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the descriptor for `T`, describing it on first use
    ///
    /// # Errors
    /// Returns the description error; failures are not cached
    pub fn get_or_describe<T: Rearrange>(&self) -> Result<Arc<TypeDescriptor<T>>, RearrangeError> {
        let key = TypeId::of::<T>();

        if let Some(entry) = self.entries.get(&key) {
            tracing::trace!(type_name = type_name::<T>(), "metadata cache hit");
            return downcast::<T>(Arc::clone(entry.value()));
        }

        let entry = self.entries.entry(key).or_try_insert_with(|| {
            tracing::trace!(type_name = type_name::<T>(), "metadata cache miss");
            describe::<T>().map(|descriptor| Arc::new(descriptor) as Arc<dyn Any + Send + Sync>)
        })?;
        downcast::<T>(Arc::clone(entry.value()))
    }

    /// Check if `T` has been described
    #[inline]
    #[must_use]
    pub fn contains<T: Rearrange>(&self) -> bool {
        self.entries.contains_key(&TypeId::of::<T>())
    }

    /// Number of cached types
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if cache is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop every cached descriptor
    #[inline]
    pub fn clear(&self) {
        self.entries.clear();
    }
}

fn downcast<T: Rearrange>(
    entry: Arc<dyn Any + Send + Sync>,
) -> Result<Arc<TypeDescriptor<T>>, RearrangeError> {
    entry.downcast::<TypeDescriptor<T>>().map_err(|_| {
        RearrangeError::introspection(type_name::<T>(), "cached metadata belongs to another type")
    })
}
