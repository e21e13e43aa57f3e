//! Copy builder
//!
//! Orchestrates one copy: validates the override set against the type's
//! properties, asks the [`ConstructionSelector`] for a plan, checks the plan
//! can honour every override, resolves every property's effective value and
//! materializes the new instance. Deferred overrides run only after all
//! checks have passed.

use crate::config::{RearrangeConfig, UnwritablePolicy};
use crate::error::{InvokeError, RearrangeError};
use crate::overrides::OverrideSet;
use crate::property::Value;
use crate::strategy::{Arguments, ConstructionPlan, ConstructionSelector, ConstructorDescriptor};
use crate::table::TypeDescriptor;
use indexmap::IndexMap;

/// Builds one copy of an original instance
///
/// # Example
/// ```rust,ignore
/// let descriptor = rearranger::describe::<DataClass>()?;
/// let mut overrides = OverrideSet::new();
/// overrides.set("name", "overridden".to_string());
///
/// let copy = CopyBuilder::new(&original, overrides, &descriptor, &config).build()?;
/// ```
pub struct CopyBuilder<'a, T> {
    original: &'a T,
    overrides: OverrideSet,
    descriptor: &'a TypeDescriptor<T>,
    config: &'a RearrangeConfig,
}

impl<'a, T: 'static> CopyBuilder<'a, T> {
    /// Create builder
    #[inline]
    #[must_use]
    pub fn new(
        original: &'a T,
        overrides: OverrideSet,
        descriptor: &'a TypeDescriptor<T>,
        config: &'a RearrangeConfig,
    ) -> Self {
        Self {
            original,
            overrides,
            descriptor,
            config,
        }
    }

    /// Produce the copy
    ///
    /// The original is only read; the returned value is always a new instance.
    ///
    /// # Errors
    /// - [`RearrangeError::UnknownProperty`] if an override names no property
    /// - [`RearrangeError::ConstructorInvocation`] if the constructor rejects the values
    /// - [`RearrangeError::NotAllocatable`] if no constructor matches and the type has no allocator
    /// - [`RearrangeError::FieldInjection`] per [`UnwritablePolicy`]
    /// - [`RearrangeError::TypeMismatch`] if a named override has the wrong type
    pub fn build(self) -> Result<T, RearrangeError> {
        let descriptor = self.descriptor;
        let config = self.config;
        let type_name = descriptor.type_name();
        self.validate_overrides()?;

        let plan = ConstructionSelector::new()
            .with_policy(config.constructor_selection)
            .select(descriptor)?;

        tracing::debug!(
            type_name,
            overrides = self.overrides.len(),
            plan = ?plan,
            "building copy"
        );

        if !plan.is_constructor_based() {
            self.check_writable(config.unwritable_properties)?;
        }

        let original = self.original;
        let resolved = self.resolve();
        match plan {
            ConstructionPlan::ConstructorBased(constructor) => {
                construct(type_name, constructor, resolved)
            }
            ConstructionPlan::AllocationBased => inject(descriptor, original, resolved),
        }
    }

    /// Apply the unwritable policy to the allocation path
    fn check_writable(&self, policy: UnwritablePolicy) -> Result<(), RearrangeError> {
        let type_name = self.descriptor.type_name();
        for property in self.descriptor.properties() {
            if property.is_writable() {
                continue;
            }
            let overridden = self.overrides.is_present(property.name());
            let fail = match policy {
                UnwritablePolicy::Skip => false,
                UnwritablePolicy::RejectOverrides => overridden,
                UnwritablePolicy::Fail => true,
            };
            if fail {
                return Err(RearrangeError::FieldInjection {
                    type_name,
                    property: property.name(),
                });
            }
            if overridden {
                tracing::warn!(
                    type_name,
                    property = property.name(),
                    "override of computed property ignored"
                );
            }
        }
        Ok(())
    }

    fn validate_overrides(&self) -> Result<(), RearrangeError> {
        match self
            .overrides
            .names()
            .find(|name| !self.descriptor.contains(name))
        {
            Some(unknown) => Err(RearrangeError::UnknownProperty {
                type_name: self.descriptor.type_name(),
                property: unknown.to_string(),
            }),
            None => Ok(()),
        }
    }

    /// Effective value of every property: the override if present, else a
    /// snapshot of the original
    fn resolve(mut self) -> IndexMap<&'static str, Value> {
        self.descriptor
            .properties()
            .iter()
            .map(|property| {
                let value = match self.overrides.take(property.name()) {
                    Some(value) => value.resolve(),
                    None => property.read(self.original),
                };
                (property.name(), value)
            })
            .collect()
    }
}

fn construct<T: 'static>(
    type_name: &'static str,
    constructor: &ConstructorDescriptor<T>,
    resolved: IndexMap<&'static str, Value>,
) -> Result<T, RearrangeError> {
    let mut arguments = Arguments::new(type_name, constructor.name());
    for (name, value) in resolved {
        if constructor.parameters().contains(&name) {
            arguments.insert(name, value);
        }
    }

    constructor
        .invoke(&mut arguments)
        .map_err(|err| match err {
            InvokeError::Argument(err) => err,
            InvokeError::Rejected(source) => {
                tracing::debug!(
                    type_name,
                    constructor = constructor.name(),
                    error = %source,
                    "constructor rejected copy"
                );
                RearrangeError::ConstructorInvocation {
                    type_name,
                    constructor: constructor.name(),
                    source,
                }
            }
        })
}

/// Carried fields go first so that a property setter sees them in the
/// state of the original
fn inject<T: 'static>(
    descriptor: &TypeDescriptor<T>,
    original: &T,
    mut resolved: IndexMap<&'static str, Value>,
) -> Result<T, RearrangeError> {
    let type_name = descriptor.type_name();
    let allocate = descriptor
        .allocator()
        .ok_or(RearrangeError::NotAllocatable { type_name })?;
    let mut instance = allocate();

    for field in descriptor.carried() {
        if let Some(Err(value)) = field.write(&mut instance, field.read(original)) {
            return Err(RearrangeError::TypeMismatch {
                type_name,
                property: field.name().to_string(),
                expected: field.value_type(),
                found: value.type_name(),
            });
        }
        tracing::trace!(type_name, field = field.name(), "carried field copied");
    }

    for property in descriptor.properties() {
        let Some(value) = resolved.shift_remove(property.name()) else {
            continue;
        };
        let value_type = value.type_name();

        match property.write(&mut instance, value) {
            Some(Ok(())) => {
                tracing::trace!(
                    type_name,
                    property = property.name(),
                    access = ?property.access(),
                    "property injected"
                );
            }
            Some(Err(_)) => {
                return Err(RearrangeError::TypeMismatch {
                    type_name,
                    property: property.name().to_string(),
                    expected: property.value_type(),
                    found: value_type,
                });
            }
            // unwritable properties were settled by the policy check
            None => {}
        }
    }

    Ok(instance)
}
