//! Type tables and the property enumerator
//!
//! A [`TypeTable`] is filled by [`Rearrange::describe`] and validated into a
//! [`TypeDescriptor`]: the ordered, flattened property set of a type plus its
//! constructors and allocator.
//!
//! Fields that are not properties but still belong to the instance (a
//! supertype field shadowed by a subtype property, or a field excluded from
//! overriding) are kept as carried fields: field injection copies them from
//! the original, but they cannot be named by an override.

use crate::error::RearrangeError;
use crate::property::PropertyDescriptor;
use crate::strategy::ConstructorDescriptor;
use std::any::type_name;
use std::collections::HashSet;
use std::fmt;

/// Types that can be copied with overrides
///
/// Usually derived with `#[derive(Rearrange)]`. A hand-written implementation
/// registers its properties, constructors and allocator on the table.
///
/// # Example
/// ```rust
/// use rearranger::{Property, Rearrange, RearrangeError, TypeTable};
///
/// #[derive(Debug, Clone, PartialEq)]
/// struct Point { x: i32, y: i32 }
///
/// #[derive(Clone, Copy)]
/// struct PointKeys { x: Property<i32>, y: Property<i32> }
///
/// impl Rearrange for Point {
///     type Keys = PointKeys;
///     const KEYS: PointKeys = PointKeys { x: Property::new("x"), y: Property::new("y") };
///
///     fn describe(table: &mut TypeTable<Self>) -> Result<(), RearrangeError> {
///         table
///             .stored("x", |p: &Point| &p.x, |p: &mut Point| &mut p.x)
///             .stored("y", |p: &Point| &p.y, |p: &mut Point| &mut p.y)
///             .allocator(|| Point { x: 0, y: 0 });
///         Ok(())
///     }
/// }
///
/// let moved = rearranger::copy(&Point { x: 1, y: 2 }, |s| {
///     s.set(Point::KEYS.y, 5);
/// })
/// .unwrap();
/// assert_eq!(moved, Point { x: 1, y: 5 });
/// ```
pub trait Rearrange: Sized + 'static {
    /// Typed property keys
    type Keys: Copy + 'static;

    /// Keys for every property, reached as `T::KEYS.<property>`
    const KEYS: Self::Keys;

    /// Register properties, constructors and allocator
    ///
    /// # Errors
    /// Returns error if a supertype cannot be described
    fn describe(table: &mut TypeTable<Self>) -> Result<(), RearrangeError>;
}

enum Slot<T> {
    Own(PropertyDescriptor<T>),
    Inherited(&'static str, Vec<PropertyDescriptor<T>>),
}

/// Registration surface for one type's metadata
pub struct TypeTable<T> {
    slots: Vec<Slot<T>>,
    carried: Vec<PropertyDescriptor<T>>,
    constructors: Vec<ConstructorDescriptor<T>>,
    allocator: Option<fn() -> T>,
}

impl<T: 'static> TypeTable<T> {
    /// Create empty table
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            carried: Vec::new(),
            constructors: Vec::new(),
            allocator: None,
        }
    }

    /// Register a property descriptor
    pub fn property(&mut self, descriptor: PropertyDescriptor<T>) -> &mut Self {
        self.slots.push(Slot::Own(descriptor));
        self
    }

    /// Register a field written straight into storage
    pub fn stored<V, G, M>(&mut self, name: &'static str, get: G, get_mut: M) -> &mut Self
    where
        V: Clone + 'static,
        G: Fn(&T) -> &V + Send + Sync + 'static,
        M: Fn(&mut T) -> &mut V + Send + Sync + 'static,
    {
        self.property(PropertyDescriptor::stored(name, get, get_mut))
    }

    /// Register a field written through a setter
    pub fn with_setter<V, G, S>(&mut self, name: &'static str, get: G, set: S) -> &mut Self
    where
        V: Clone + 'static,
        G: Fn(&T) -> &V + Send + Sync + 'static,
        S: Fn(&mut T, V) + Send + Sync + 'static,
    {
        self.property(PropertyDescriptor::with_setter(name, get, set))
    }

    /// Register a read-only computed property
    pub fn computed<V, G>(&mut self, name: &'static str, get: G) -> &mut Self
    where
        V: 'static,
        G: Fn(&T) -> V + Send + Sync + 'static,
    {
        self.property(PropertyDescriptor::computed(name, get))
    }

    /// Register a field that is copied during field injection but is not a
    /// property: it cannot be overridden and takes no part in constructor
    /// matching
    pub fn carried<V, G, M>(&mut self, name: &'static str, get: G, get_mut: M) -> &mut Self
    where
        V: Clone + 'static,
        G: Fn(&T) -> &V + Send + Sync + 'static,
        M: Fn(&mut T) -> &mut V + Send + Sync + 'static,
    {
        self.carried.push(PropertyDescriptor::stored(name, get, get_mut));
        self
    }

    /// Inherit every property of the embedded supertype `P`
    ///
    /// Inherited properties are flattened at this position. A property
    /// registered on this table under the same name shadows the inherited one;
    /// the shadowed field is still carried. Carried fields of `P` are carried
    /// here too. Constructors and allocator of `P` are not inherited.
    ///
    /// # Errors
    /// Returns error if `P` cannot be described
    pub fn extends<P: Rearrange>(
        &mut self,
        project: fn(&T) -> &P,
        project_mut: fn(&mut T) -> &mut P,
    ) -> Result<&mut Self, RearrangeError> {
        let parent = describe::<P>().map_err(|err| {
            RearrangeError::introspection(
                type_name::<T>(),
                format!("supertype {} could not be described: {err}", type_name::<P>()),
            )
        })?;

        let lifted = parent
            .properties
            .into_iter()
            .map(|property| property.lift(project, project_mut))
            .collect();
        self.slots.push(Slot::Inherited(type_name::<P>(), lifted));
        self.carried.extend(
            parent
                .carried
                .into_iter()
                .map(|field| field.lift(project, project_mut)),
        );
        Ok(self)
    }

    /// Register a constructor; declaration order is selection order
    pub fn constructor(&mut self, constructor: ConstructorDescriptor<T>) -> &mut Self {
        self.constructors.push(constructor);
        self
    }

    /// Register the blank-instance allocator used for field injection
    pub fn allocator(&mut self, allocate: fn() -> T) -> &mut Self {
        self.allocator = Some(allocate);
        self
    }

    /// Validate and flatten into a descriptor
    ///
    /// # Errors
    /// Returns [`RearrangeError::Introspection`] if a name is declared twice
    /// on the same level or inherited from two supertypes.
    pub fn finish(self) -> Result<TypeDescriptor<T>, RearrangeError> {
        let type_name = type_name::<T>();

        let mut own = HashSet::new();
        for slot in &self.slots {
            if let Slot::Own(property) = slot {
                if !own.insert(property.name()) {
                    return Err(RearrangeError::introspection(
                        type_name,
                        format!("property `{}` is declared twice", property.name()),
                    ));
                }
            }
        }

        let mut seen = own.clone();
        let mut properties = Vec::new();
        let mut carried = self.carried;
        for slot in self.slots {
            match slot {
                Slot::Own(property) => properties.push(property),
                Slot::Inherited(parent, inherited) => {
                    for property in inherited {
                        if own.contains(property.name()) {
                            tracing::trace!(
                                type_name,
                                parent,
                                property = property.name(),
                                "inherited property shadowed"
                            );
                            carried.push(property);
                            continue;
                        }
                        if !seen.insert(property.name()) {
                            return Err(RearrangeError::introspection(
                                type_name,
                                format!(
                                    "property `{}` inherited from {parent} is already inherited from another supertype",
                                    property.name()
                                ),
                            ));
                        }
                        properties.push(property);
                    }
                }
            }
        }

        Ok(TypeDescriptor {
            type_name,
            properties,
            carried,
            constructors: self.constructors,
            allocator: self.allocator,
        })
    }
}

impl<T: 'static> Default for TypeTable<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Validated metadata for one type
pub struct TypeDescriptor<T> {
    type_name: &'static str,
    properties: Vec<PropertyDescriptor<T>>,
    carried: Vec<PropertyDescriptor<T>>,
    constructors: Vec<ConstructorDescriptor<T>>,
    allocator: Option<fn() -> T>,
}

impl<T: 'static> TypeDescriptor<T> {
    /// Type name
    #[inline]
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Properties in declaration order, supertypes flattened in place
    #[inline]
    #[must_use]
    pub fn properties(&self) -> &[PropertyDescriptor<T>] {
        &self.properties
    }

    /// Look up a property by name
    #[must_use]
    pub fn property(&self, name: &str) -> Option<&PropertyDescriptor<T>> {
        self.properties.iter().find(|property| property.name() == name)
    }

    /// Check if the type has the named property
    #[inline]
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.property(name).is_some()
    }

    /// Fields copied from the original during field injection that are not
    /// properties
    #[inline]
    #[must_use]
    pub fn carried(&self) -> &[PropertyDescriptor<T>] {
        &self.carried
    }

    /// Property names in order
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.properties.iter().map(PropertyDescriptor::name)
    }

    /// Constructors in declaration order
    #[inline]
    #[must_use]
    pub fn constructors(&self) -> &[ConstructorDescriptor<T>] {
        &self.constructors
    }

    /// Blank-instance allocator, if the type has one
    #[inline]
    #[must_use]
    pub fn allocator(&self) -> Option<fn() -> T> {
        self.allocator
    }
}

impl<T> fmt::Debug for TypeDescriptor<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeDescriptor")
            .field("type_name", &self.type_name)
            .field("properties", &self.properties)
            .field("carried", &self.carried)
            .field("constructors", &self.constructors)
            .field("allocatable", &self.allocator.is_some())
            .finish()
    }
}

/// Describe a type: the property enumerator
///
/// Deterministic per type; every call builds fresh metadata. Use
/// [`MetadataCache`](crate::MetadataCache) to share it across calls.
///
/// # Errors
/// Returns [`RearrangeError::Introspection`] if the metadata is inconsistent
pub fn describe<T: Rearrange>() -> Result<TypeDescriptor<T>, RearrangeError> {
    let mut table = TypeTable::new();
    T::describe(&mut table)?;
    table.finish()
}
