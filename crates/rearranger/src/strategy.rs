//! Construction strategy selection
//!
//! Decides, per copy, whether the target type is rebuilt through a matching
//! constructor or produced by allocation plus field injection.
//!
//! # Selection Logic
//! - A constructor matches iff every property name is one of its parameter names
//! - The first matching constructor in declaration order wins
//! - No matching constructor → [`ConstructionPlan::AllocationBased`]

use crate::config::ConstructorSelection;
use crate::error::{InvokeError, RearrangeError};
use crate::property::Value;
use crate::table::TypeDescriptor;
use indexmap::IndexMap;
use std::any::{type_name, Any};
use std::fmt;
use std::sync::Arc;

type InvokeFn<T> = Arc<dyn Fn(&mut Arguments) -> Result<T, InvokeError> + Send + Sync>;

/// Descriptor for one constructor of `T`
pub struct ConstructorDescriptor<T> {
    name: &'static str,
    parameters: &'static [&'static str],
    invoke: InvokeFn<T>,
}

impl<T: 'static> ConstructorDescriptor<T> {
    /// Create constructor descriptor
    ///
    /// `invoke` pulls each parameter out of the [`Arguments`] by name and calls
    /// the constructor. Errors the constructor itself raises are reported
    /// through [`InvokeError::rejected`].
    pub fn new<F>(name: &'static str, parameters: &'static [&'static str], invoke: F) -> Self
    where
        F: Fn(&mut Arguments) -> Result<T, InvokeError> + Send + Sync + 'static,
    {
        Self {
            name,
            parameters,
            invoke: Arc::new(invoke),
        }
    }

    /// Constructor name
    #[inline]
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Parameter names in declaration order
    #[inline]
    #[must_use]
    pub fn parameters(&self) -> &'static [&'static str] {
        self.parameters
    }

    /// Check if every given property name is a parameter of this constructor
    pub fn covers<'a>(&self, mut property_names: impl Iterator<Item = &'a str>) -> bool {
        property_names.all(|name| self.parameters.contains(&name))
    }

    /// Invoke with the given arguments
    ///
    /// # Errors
    /// Returns the constructor's rejection or an argument extraction failure
    pub fn invoke(&self, arguments: &mut Arguments) -> Result<T, InvokeError> {
        (self.invoke)(arguments)
    }
}

impl<T> fmt::Debug for ConstructorDescriptor<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConstructorDescriptor")
            .field("name", &self.name)
            .field("parameters", &self.parameters)
            .finish_non_exhaustive()
    }
}

/// Arguments for one constructor invocation, by parameter name
#[derive(Debug)]
pub struct Arguments {
    type_name: &'static str,
    constructor: &'static str,
    values: IndexMap<&'static str, Value>,
}

impl Arguments {
    /// Create empty arguments for the named constructor
    #[inline]
    #[must_use]
    pub fn new(type_name: &'static str, constructor: &'static str) -> Self {
        Self {
            type_name,
            constructor,
            values: IndexMap::new(),
        }
    }

    /// Add argument
    pub fn insert(&mut self, parameter: &'static str, value: Value) {
        self.values.insert(parameter, value);
    }

    /// Check if an argument is present
    #[inline]
    #[must_use]
    pub fn contains(&self, parameter: &str) -> bool {
        self.values.contains_key(parameter)
    }

    /// Number of arguments not yet taken
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if every argument was taken
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Take the named argument
    ///
    /// # Errors
    /// Returns [`RearrangeError::MissingArgument`] if absent and
    /// [`RearrangeError::TypeMismatch`] if the value is not a `V`
    pub fn take<V: Any>(&mut self, parameter: &str) -> Result<V, RearrangeError> {
        let Some(value) = self.values.shift_remove(parameter) else {
            return Err(RearrangeError::MissingArgument {
                type_name: self.type_name,
                constructor: self.constructor,
                parameter: parameter.to_string(),
            });
        };
        self.downcast(parameter, value)
    }

    /// Take the named argument, falling back to `default` when absent
    ///
    /// Used for constructor parameters that do not correspond to a property.
    ///
    /// # Errors
    /// Returns [`RearrangeError::TypeMismatch`] if the value is not a `V`
    pub fn take_or<V: Any>(
        &mut self,
        parameter: &str,
        default: impl FnOnce() -> V,
    ) -> Result<V, RearrangeError> {
        match self.values.shift_remove(parameter) {
            Some(value) => self.downcast(parameter, value),
            None => Ok(default()),
        }
    }

    fn downcast<V: Any>(&self, parameter: &str, value: Value) -> Result<V, RearrangeError> {
        value.downcast::<V>().map_err(|value| RearrangeError::TypeMismatch {
            type_name: self.type_name,
            property: parameter.to_string(),
            expected: type_name::<V>(),
            found: value.type_name(),
        })
    }
}

/// How a copy is materialized
pub enum ConstructionPlan<'a, T> {
    /// Rebuild through this constructor
    ConstructorBased(&'a ConstructorDescriptor<T>),

    /// Allocate a blank instance and inject every property
    AllocationBased,
}

impl<T> ConstructionPlan<'_, T> {
    /// Check if the plan invokes a constructor
    #[inline]
    #[must_use]
    pub fn is_constructor_based(&self) -> bool {
        matches!(self, Self::ConstructorBased(_))
    }
}

impl<T> fmt::Debug for ConstructionPlan<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConstructorBased(constructor) => {
                write!(f, "ConstructorBased({})", constructor.name)
            }
            Self::AllocationBased => f.write_str("AllocationBased"),
        }
    }
}

/// Chooses a [`ConstructionPlan`] for a type
#[derive(Debug, Clone, Copy, Default)]
pub struct ConstructionSelector {
    policy: ConstructorSelection,
}

impl ConstructionSelector {
    /// Create selector with first-match policy
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set selection policy
    #[inline]
    #[must_use]
    pub fn with_policy(mut self, policy: ConstructorSelection) -> Self {
        self.policy = policy;
        self
    }

    /// Select how to build a copy of the described type
    ///
    /// # Errors
    /// Returns [`RearrangeError::AmbiguousConstructor`] under the `Unique`
    /// policy when several constructors match
    pub fn select<'a, T: 'static>(
        &self,
        descriptor: &'a TypeDescriptor<T>,
    ) -> Result<ConstructionPlan<'a, T>, RearrangeError> {
        let mut matching = descriptor
            .constructors()
            .iter()
            .filter(|constructor| constructor.covers(descriptor.names()));

        let Some(first) = matching.next() else {
            return Ok(ConstructionPlan::AllocationBased);
        };

        if self.policy == ConstructorSelection::Unique {
            let rest: Vec<_> = matching.map(ConstructorDescriptor::name).collect();
            if !rest.is_empty() {
                let mut candidates = vec![first.name()];
                candidates.extend(rest);
                return Err(RearrangeError::AmbiguousConstructor {
                    type_name: descriptor.type_name(),
                    candidates,
                });
            }
        }

        Ok(ConstructionPlan::ConstructorBased(first))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::{describe, Rearrange, TypeTable};

    #[derive(Debug, Clone, PartialEq)]
    struct Order {
        id: u32,
        note: Option<String>,
    }

    #[derive(Clone, Copy)]
    struct NoKeys;

    impl Rearrange for Order {
        type Keys = NoKeys;
        const KEYS: NoKeys = NoKeys;

        fn describe(table: &mut TypeTable<Self>) -> Result<(), RearrangeError> {
            table
                .stored("id", |o: &Order| &o.id, |o: &mut Order| &mut o.id)
                .stored("note", |o: &Order| &o.note, |o: &mut Order| &mut o.note)
                .constructor(ConstructorDescriptor::new("with_id", &["id"], |args| {
                    Ok(Order {
                        id: args.take("id")?,
                        note: None,
                    })
                }))
                .constructor(ConstructorDescriptor::new(
                    "new",
                    &["id", "note", "priority"],
                    |args| {
                        let priority: u8 = args.take_or("priority", || 1)?;
                        Ok(Order {
                            id: args.take::<u32>("id")? + u32::from(priority) - 1,
                            note: args.take("note")?,
                        })
                    },
                ))
                .constructor(ConstructorDescriptor::new("full", &["note", "id"], |args| {
                    Ok(Order {
                        note: args.take("note")?,
                        id: args.take("id")?,
                    })
                }));
            Ok(())
        }
    }

    struct Bare;

    impl Rearrange for Bare {
        type Keys = NoKeys;
        const KEYS: NoKeys = NoKeys;

        fn describe(table: &mut TypeTable<Self>) -> Result<(), RearrangeError> {
            table.computed("kind", |_: &Bare| "bare");
            Ok(())
        }
    }

    #[test]
    fn covers_requires_every_property() {
        let descriptor = describe::<Order>().unwrap();
        let constructors = descriptor.constructors();
        assert!(!constructors[0].covers(descriptor.names()));
        assert!(constructors[1].covers(descriptor.names()));
        assert!(constructors[2].covers(descriptor.names()));
    }

    #[test]
    fn first_matching_constructor_wins() {
        let descriptor = describe::<Order>().unwrap();
        let plan = ConstructionSelector::new().select(&descriptor).unwrap();
        match plan {
            ConstructionPlan::ConstructorBased(constructor) => {
                assert_eq!(constructor.name(), "new");
            }
            ConstructionPlan::AllocationBased => panic!("expected constructor plan"),
        }
    }

    #[test]
    fn unique_policy_rejects_several_matches() {
        let descriptor = describe::<Order>().unwrap();
        let err = ConstructionSelector::new()
            .with_policy(ConstructorSelection::Unique)
            .select(&descriptor)
            .unwrap_err();
        match err {
            RearrangeError::AmbiguousConstructor { candidates, .. } => {
                assert_eq!(candidates, vec!["new", "full"]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn no_match_falls_back_to_allocation() {
        let descriptor = describe::<Bare>().unwrap();
        let plan = ConstructionSelector::new().select(&descriptor).unwrap();
        assert!(!plan.is_constructor_based());
        assert_eq!(format!("{plan:?}"), "AllocationBased");
    }

    #[test]
    fn arguments_take_and_default() {
        let mut args = Arguments::new("Order", "new");
        args.insert("id", Value::new(4_u32));
        args.insert("note", Value::new(Some("x".to_string())));

        let descriptor = describe::<Order>().unwrap();
        let order = descriptor.constructors()[1].invoke(&mut args).unwrap();
        assert_eq!(
            order,
            Order {
                id: 4,
                note: Some("x".to_string())
            }
        );
        assert!(args.is_empty());
    }

    #[test]
    fn arguments_missing_and_mismatched() {
        let mut args = Arguments::new("Order", "new");
        args.insert("id", Value::new("four".to_string()));

        let err = args.take::<u32>("id").unwrap_err();
        assert!(matches!(err, RearrangeError::TypeMismatch { .. }));

        let err = args.take::<u32>("id").unwrap_err();
        assert!(matches!(err, RearrangeError::MissingArgument { .. }));
    }
}
