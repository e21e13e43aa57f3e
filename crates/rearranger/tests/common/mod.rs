//! Fixture types shared by the integration tests

#![allow(dead_code)]

use rearranger::Rearrange;
use rearranger_test_utils::{Arrange, Rng};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Immutable value type rebuilt through its all-properties constructor
#[derive(Debug, Clone, PartialEq, Rearrange)]
#[rearrange(constructor(new(name, number, other)))]
pub struct DataClass {
    pub name: String,
    pub number: i32,
    pub other: Option<String>,
}

impl DataClass {
    pub fn new(name: String, number: i32, other: Option<String>) -> Self {
        Self { name, number, other }
    }
}

impl Arrange for DataClass {
    fn arrange<R: Rng>(rng: &mut R) -> Self {
        Self::new(String::arrange(rng), i32::arrange(rng), Option::arrange(rng))
    }
}

/// Supertype with private state and accessors
#[derive(Debug, Clone, PartialEq, Default, Rearrange)]
#[rearrange(constructor(new(name, number, other)))]
pub struct PojoClass {
    name: String,
    number: i32,
    other: Option<String>,
}

impl PojoClass {
    pub fn new(name: String, number: i32, other: Option<String>) -> Self {
        Self { name, number, other }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn number(&self) -> i32 {
        self.number
    }

    pub fn other(&self) -> Option<&str> {
        self.other.as_deref()
    }
}

impl Arrange for PojoClass {
    fn arrange<R: Rng>(rng: &mut R) -> Self {
        Self::new(String::arrange(rng), i32::arrange(rng), Option::arrange(rng))
    }
}

/// Subtype redeclaring `name` and inheriting `number` and `other`
#[derive(Debug, Clone, PartialEq, Rearrange)]
#[rearrange(constructor(new(name, number, other)))]
pub struct PojoClassChild {
    #[rearrange(extends)]
    parent: PojoClass,
    name: String,
}

impl PojoClassChild {
    pub fn new(name: String, number: i32, other: Option<String>) -> Self {
        Self {
            parent: PojoClass::new(name.clone(), number, other),
            name,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn number(&self) -> i32 {
        self.parent.number()
    }

    pub fn other(&self) -> Option<&str> {
        self.parent.other()
    }
}

impl Arrange for PojoClassChild {
    fn arrange<R: Rng>(rng: &mut R) -> Self {
        Self::new(String::arrange(rng), i32::arrange(rng), Option::arrange(rng))
    }
}

/// No constructor and no public mutation
#[derive(Debug, Clone, PartialEq, Rearrange)]
pub struct NoConstructorImmutable {
    name: Option<String>,
    number: Option<i32>,
    other: String,
}

impl NoConstructorImmutable {
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn number(&self) -> Option<i32> {
        self.number
    }

    pub fn other(&self) -> &str {
        &self.other
    }
}

impl Arrange for NoConstructorImmutable {
    fn arrange<R: Rng>(rng: &mut R) -> Self {
        Self {
            name: Option::arrange(rng),
            number: Option::arrange(rng),
            other: String::arrange(rng),
        }
    }
}

/// No constructor, every field public
#[derive(Debug, Clone, PartialEq, Rearrange)]
pub struct NoConstructorMutable {
    pub name: Option<String>,
    pub number: Option<i32>,
    pub other: String,
}

impl Arrange for NoConstructorMutable {
    fn arrange<R: Rng>(rng: &mut R) -> Self {
        Self {
            name: Option::arrange(rng),
            number: Option::arrange(rng),
            other: String::arrange(rng),
        }
    }
}

/// One field behind a setter, one written to storage
#[derive(Debug, Clone, PartialEq, Rearrange)]
pub struct ClassWithBackingField {
    pub regular_property: Option<String>,
    #[rearrange(setter = set_custom_property)]
    custom_property: String,
    #[rearrange(skip)]
    writes: u32,
}

impl ClassWithBackingField {
    pub fn custom_property(&self) -> &str {
        &self.custom_property
    }

    /// Number of `custom_property` setter calls over the value's history;
    /// copies carry it over from the original
    pub fn writes(&self) -> u32 {
        self.writes
    }

    fn set_custom_property(&mut self, value: String) {
        self.writes += 1;
        self.custom_property = value;
    }
}

impl Arrange for ClassWithBackingField {
    fn arrange<R: Rng>(rng: &mut R) -> Self {
        Self {
            regular_property: Option::arrange(rng),
            custom_property: String::arrange(rng),
            writes: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Rearrange)]
pub struct ClassWithCollections {
    pub list_property: Option<Vec<String>>,
    pub map_property: Option<HashMap<String, String>>,
}

impl Arrange for ClassWithCollections {
    fn arrange<R: Rng>(rng: &mut R) -> Self {
        Self {
            list_property: Option::arrange(rng),
            map_property: Option::arrange(rng),
        }
    }
}

/// Capability implemented by [`ConcreteClass`]
pub trait AbstractClass: fmt::Debug + Send + Sync {
    fn abstract_property(&self) -> &str;
}

#[derive(Debug, Clone, PartialEq, Default, Rearrange)]
pub struct ConcreteClass {
    pub abstract_property: String,
    pub concrete_property: Option<String>,
}

impl AbstractClass for ConcreteClass {
    fn abstract_property(&self) -> &str {
        &self.abstract_property
    }
}

impl Arrange for ConcreteClass {
    fn arrange<R: Rng>(rng: &mut R) -> Self {
        Self {
            abstract_property: String::arrange(rng),
            concrete_property: Option::arrange(rng),
        }
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("not_null_field must not be null")]
pub struct NotNullViolation;

/// Validating constructor that does not cover `other_field`, so copies go
/// through field injection and skip the check
#[derive(Debug, Clone, PartialEq, Rearrange)]
#[rearrange(allocate, constructor(try_new(not_null_field, nullable_field), fallible))]
pub struct ClassWithNotNullField {
    pub not_null_field: Option<String>,
    pub nullable_field: Option<String>,
    pub other_field: Option<String>,
}

impl ClassWithNotNullField {
    pub fn try_new(
        not_null_field: Option<String>,
        nullable_field: Option<String>,
    ) -> Result<Self, NotNullViolation> {
        if not_null_field.is_none() {
            return Err(NotNullViolation);
        }
        Ok(Self {
            not_null_field,
            nullable_field,
            other_field: None,
        })
    }
}

impl Arrange for ClassWithNotNullField {
    fn arrange<R: Rng>(rng: &mut R) -> Self {
        Self {
            not_null_field: Option::arrange(rng),
            nullable_field: Option::arrange(rng),
            other_field: Option::arrange(rng),
        }
    }
}

/// Validating constructor covering every property
#[derive(Debug, Clone, PartialEq, Rearrange)]
#[rearrange(constructor(try_new(not_null_field, nullable_field), fallible))]
pub struct ClassWithNotNullFieldAndAllArgsConstructor {
    pub not_null_field: Option<String>,
    pub nullable_field: Option<String>,
}

impl ClassWithNotNullFieldAndAllArgsConstructor {
    pub fn try_new(
        not_null_field: Option<String>,
        nullable_field: Option<String>,
    ) -> Result<Self, NotNullViolation> {
        if not_null_field.is_none() {
            return Err(NotNullViolation);
        }
        Ok(Self {
            not_null_field,
            nullable_field,
        })
    }
}

impl Arrange for ClassWithNotNullFieldAndAllArgsConstructor {
    fn arrange<R: Rng>(rng: &mut R) -> Self {
        Self {
            not_null_field: Option::arrange(rng),
            nullable_field: Option::arrange(rng),
        }
    }
}

/// Fields of trait-object type that have no `Default`
#[derive(Debug, Clone, Rearrange)]
#[rearrange(
    allocate = Self::blank,
    constructor(new(another_abstract_field, simple_field))
)]
pub struct ClassWithAbstractField {
    pub another_abstract_field: Option<Arc<dyn AbstractClass>>,
    pub simple_field: Option<String>,
    pub abstract_field: Arc<dyn AbstractClass>,
}

impl ClassWithAbstractField {
    pub fn new(
        another_abstract_field: Option<Arc<dyn AbstractClass>>,
        simple_field: Option<String>,
    ) -> Self {
        Self {
            another_abstract_field,
            simple_field,
            abstract_field: Arc::new(ConcreteClass::default()),
        }
    }

    fn blank() -> Self {
        Self::new(None, None)
    }
}

/// Stored dimensions plus a computed property
#[derive(Debug, Clone, PartialEq, Rearrange)]
#[rearrange(computed(area: u32 = Self::area))]
pub struct Shelf {
    pub width: u32,
    pub depth: u32,
}

impl Shelf {
    pub fn area(&self) -> u32 {
        self.width * self.depth
    }
}

/// Constructor with a parameter that is not a property
#[derive(Debug, Clone, PartialEq, Rearrange)]
#[rearrange(constructor(with_scale(code, quantity, scale = 1)))]
pub struct Sku {
    pub code: String,
    #[rearrange(rename = "quantity")]
    pub units: u32,
}

impl Sku {
    pub fn with_scale(code: String, quantity: u32, scale: u32) -> Self {
        Self {
            code,
            units: quantity * scale,
        }
    }
}

/// Two constructors covering every property
#[derive(Debug, Clone, PartialEq, Rearrange)]
#[rearrange(constructor(new(id, label)), constructor(reversed(label, id)))]
pub struct Tote {
    pub id: u64,
    pub label: String,
}

impl Tote {
    pub fn new(id: u64, label: String) -> Self {
        Self { id, label }
    }

    pub fn reversed(label: String, id: u64) -> Self {
        Self { id, label }
    }
}

/// Constructorless supertype
#[derive(Debug, Clone, PartialEq, Default, Rearrange)]
pub struct Carton {
    pub name: String,
    pub number: i32,
}

impl Arrange for Carton {
    fn arrange<R: Rng>(rng: &mut R) -> Self {
        Self {
            name: String::arrange(rng),
            number: i32::arrange(rng),
        }
    }
}

/// Constructorless subtype redeclaring `name`, copied by field injection
#[derive(Debug, Clone, PartialEq, Rearrange)]
pub struct LabelledCarton {
    #[rearrange(extends)]
    pub carton: Carton,
    pub name: String,
    pub active: bool,
}

impl Arrange for LabelledCarton {
    fn arrange<R: Rng>(rng: &mut R) -> Self {
        Self {
            carton: Carton::arrange(rng),
            name: String::arrange(rng),
            active: bool::arrange(rng),
        }
    }
}

/// Field excluded from overriding
#[derive(Debug, Clone, PartialEq, Rearrange)]
pub struct Counter {
    pub id: u64,
    #[rearrange(skip)]
    hits: u32,
}

impl Counter {
    pub fn new(id: u64, hits: u32) -> Self {
        Self { id, hits }
    }

    pub fn hits(&self) -> u32 {
        self.hits
    }
}
