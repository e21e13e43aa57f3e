//! Property keys, values and descriptors
//!
//! - [`Property<V>`]: typed reference to a property by name, used to declare overrides
//! - [`Value`]: type-erased property value moving between original, overrides and copy
//! - [`PropertyDescriptor<T>`]: how to read and write one property of `T`

use std::any::{type_name, Any};
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

/// Typed reference to a property
///
/// Keys are generated by `#[derive(Rearrange)]` and reached through
/// `T::KEYS.<property>`. The value type is checked at compile time; the owning
/// type is checked by name when the copy is built.
pub struct Property<V> {
    name: &'static str,
    _value: PhantomData<fn() -> V>,
}

impl<V> Property<V> {
    /// Create key for the named property
    #[inline]
    #[must_use]
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            _value: PhantomData,
        }
    }

    /// Property name
    #[inline]
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }
}

impl<V> Clone for Property<V> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<V> Copy for Property<V> {}

impl<V> PartialEq for Property<V> {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl<V> Eq for Property<V> {}

impl<V> fmt::Debug for Property<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Property<{}>({})", type_name::<V>(), self.name)
    }
}

/// Type-erased property value
pub struct Value {
    inner: Box<dyn Any>,
    type_name: &'static str,
}

impl Value {
    /// Erase a value
    #[inline]
    #[must_use]
    pub fn new<V: Any>(value: V) -> Self {
        Self {
            inner: Box::new(value),
            type_name: type_name::<V>(),
        }
    }

    /// Name of the erased type
    #[inline]
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Check the erased type
    #[inline]
    #[must_use]
    pub fn is<V: Any>(&self) -> bool {
        self.inner.is::<V>()
    }

    /// Recover the concrete value, handing the value back on mismatch
    ///
    /// # Errors
    /// Returns `self` unchanged if the erased type is not `V`
    pub fn downcast<V: Any>(self) -> Result<V, Self> {
        let type_name = self.type_name;
        self.inner
            .downcast::<V>()
            .map(|boxed| *boxed)
            .map_err(|inner| Self { inner, type_name })
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Value<{}>", self.type_name)
    }
}

/// How a property's value reaches the instance in allocation-based construction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// Written through a setter method
    Setter,

    /// Written straight into the backing field
    Storage,

    /// Derived from other state; nothing to write
    Computed,
}

type ReadFn<T> = Arc<dyn Fn(&T) -> Value + Send + Sync>;
type WriteFn<T> = Arc<dyn Fn(&mut T, Value) -> Result<(), Value> + Send + Sync>;

/// Descriptor for one instance-level property of `T`
pub struct PropertyDescriptor<T> {
    name: &'static str,
    declared_by: &'static str,
    value_type: &'static str,
    access: Access,
    read: ReadFn<T>,
    write: Option<WriteFn<T>>,
}

impl<T: 'static> PropertyDescriptor<T> {
    /// Property backed by a field, written straight into storage
    pub fn stored<V, G, M>(name: &'static str, get: G, get_mut: M) -> Self
    where
        V: Clone + 'static,
        G: Fn(&T) -> &V + Send + Sync + 'static,
        M: Fn(&mut T) -> &mut V + Send + Sync + 'static,
    {
        Self {
            name,
            declared_by: type_name::<T>(),
            value_type: type_name::<V>(),
            access: Access::Storage,
            read: Arc::new(move |instance: &T| Value::new(get(instance).clone())),
            write: Some(Arc::new(move |instance: &mut T, value: Value| {
                *get_mut(instance) = value.downcast::<V>()?;
                Ok(())
            })),
        }
    }

    /// Property backed by a field, written through a setter
    pub fn with_setter<V, G, S>(name: &'static str, get: G, set: S) -> Self
    where
        V: Clone + 'static,
        G: Fn(&T) -> &V + Send + Sync + 'static,
        S: Fn(&mut T, V) + Send + Sync + 'static,
    {
        Self {
            name,
            declared_by: type_name::<T>(),
            value_type: type_name::<V>(),
            access: Access::Setter,
            read: Arc::new(move |instance: &T| Value::new(get(instance).clone())),
            write: Some(Arc::new(move |instance: &mut T, value: Value| {
                set(instance, value.downcast::<V>()?);
                Ok(())
            })),
        }
    }

    /// Read-only property computed from other state
    pub fn computed<V, G>(name: &'static str, get: G) -> Self
    where
        V: 'static,
        G: Fn(&T) -> V + Send + Sync + 'static,
    {
        Self {
            name,
            declared_by: type_name::<T>(),
            value_type: type_name::<V>(),
            access: Access::Computed,
            read: Arc::new(move |instance: &T| Value::new(get(instance))),
            write: None,
        }
    }

    /// Property name, unique within the flattened property set
    #[inline]
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Type that declared the property (a supertype for inherited properties)
    #[inline]
    #[must_use]
    pub fn declared_by(&self) -> &'static str {
        self.declared_by
    }

    /// Name of the property's value type
    #[inline]
    #[must_use]
    pub fn value_type(&self) -> &'static str {
        self.value_type
    }

    /// How the property is written
    #[inline]
    #[must_use]
    pub fn access(&self) -> Access {
        self.access
    }

    /// Whether the property exposes a setter
    #[inline]
    #[must_use]
    pub fn is_directly_mutable(&self) -> bool {
        self.access == Access::Setter
    }

    /// Whether the property can be written at all
    #[inline]
    #[must_use]
    pub fn is_writable(&self) -> bool {
        self.write.is_some()
    }

    /// Snapshot the property's current value
    #[must_use]
    pub fn read(&self, instance: &T) -> Value {
        (self.read)(instance)
    }

    /// Write a value into the instance
    ///
    /// Returns `None` when the property has no setter and no storage.
    ///
    /// # Errors
    /// The inner result hands the value back if its type does not match.
    pub fn write(&self, instance: &mut T, value: Value) -> Option<Result<(), Value>> {
        self.write.as_ref().map(|write| write(instance, value))
    }

    /// Re-home a supertype property onto a subtype embedding it
    pub(crate) fn lift<C: 'static>(
        self,
        project: fn(&C) -> &T,
        project_mut: fn(&mut C) -> &mut T,
    ) -> PropertyDescriptor<C> {
        let read = self.read;
        let write = self.write.map(|write| {
            Arc::new(move |instance: &mut C, value: Value| write(project_mut(instance), value))
                as WriteFn<C>
        });

        PropertyDescriptor {
            name: self.name,
            declared_by: self.declared_by,
            value_type: self.value_type,
            access: self.access,
            read: Arc::new(move |instance: &C| read(project(instance))),
            write,
        }
    }
}

impl<T> fmt::Debug for PropertyDescriptor<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyDescriptor")
            .field("name", &self.name)
            .field("declared_by", &self.declared_by)
            .field("value_type", &self.value_type)
            .field("access", &self.access)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Sku {
        code: String,
        quantity: u32,
    }

    impl Sku {
        fn set_quantity(&mut self, quantity: u32) {
            self.quantity = quantity.min(100);
        }

        fn label(&self) -> String {
            format!("{}x{}", self.code, self.quantity)
        }
    }

    fn sku() -> Sku {
        Sku {
            code: "A1".to_string(),
            quantity: 3,
        }
    }

    #[test]
    fn property_key_is_copy_and_named() {
        let key: Property<String> = Property::new("code");
        let copied = key;
        assert_eq!(key, copied);
        assert_eq!(copied.name(), "code");
        assert!(format!("{key:?}").contains("String"));
    }

    #[test]
    fn value_downcast_round() {
        let value = Value::new(7_u32);
        assert!(value.is::<u32>());
        assert_eq!(value.downcast::<u32>().unwrap(), 7);
    }

    #[test]
    fn value_downcast_mismatch_returns_value() {
        let value = Value::new("text".to_string());
        let back = value.downcast::<u32>().unwrap_err();
        assert!(back.type_name().contains("String"));
    }

    #[test]
    fn stored_property_reads_and_writes() {
        let desc = PropertyDescriptor::stored("code", |s: &Sku| &s.code, |s: &mut Sku| &mut s.code);
        let mut target = sku();

        let value = desc.read(&target).downcast::<String>().unwrap();
        assert_eq!(value, "A1");

        desc.write(&mut target, Value::new("B2".to_string()))
            .unwrap()
            .unwrap();
        assert_eq!(target.code, "B2");
        assert_eq!(desc.access(), Access::Storage);
        assert!(!desc.is_directly_mutable());
    }

    #[test]
    fn setter_property_goes_through_setter() {
        let desc = PropertyDescriptor::with_setter("quantity", |s: &Sku| &s.quantity, Sku::set_quantity);
        let mut target = sku();

        desc.write(&mut target, Value::new(500_u32)).unwrap().unwrap();
        assert_eq!(target.quantity, 100);
        assert!(desc.is_directly_mutable());
    }

    #[test]
    fn computed_property_is_not_writable() {
        let desc = PropertyDescriptor::computed("label", Sku::label);
        let mut target = sku();

        assert!(!desc.is_writable());
        assert!(desc.write(&mut target, Value::new(String::new())).is_none());
        assert_eq!(desc.read(&target).downcast::<String>().unwrap(), "A1x3");
    }

    #[test]
    fn write_with_wrong_type_hands_value_back() {
        let desc = PropertyDescriptor::stored("code", |s: &Sku| &s.code, |s: &mut Sku| &mut s.code);
        let mut target = sku();

        let rejected = desc.write(&mut target, Value::new(1_i64)).unwrap().unwrap_err();
        assert!(rejected.is::<i64>());
        assert_eq!(target.code, "A1");
    }

    #[test]
    fn lifted_property_targets_embedded_value() {
        struct Pallet {
            sku: Sku,
        }

        let desc = PropertyDescriptor::stored("code", |s: &Sku| &s.code, |s: &mut Sku| &mut s.code)
            .lift::<Pallet>(|p| &p.sku, |p| &mut p.sku);
        let mut pallet = Pallet { sku: sku() };

        desc.write(&mut pallet, Value::new("C3".to_string()))
            .unwrap()
            .unwrap();
        assert_eq!(pallet.sku.code, "C3");
        assert!(desc.declared_by().ends_with("Sku"));
    }
}
