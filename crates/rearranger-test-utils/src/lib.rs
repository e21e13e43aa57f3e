//! Testing utilities for the Rearranger workspace
//!
//! A small random fixture generator (the "Arranger") and tracing setup.
//! Fixtures are produced through [`Arrange`]; every field is populated, so
//! optional values are always `Some` and collections are never empty.

#![allow(missing_docs)]

use rand::distributions::Alphanumeric;
use rand::rngs::StdRng;
use rand::{thread_rng, SeedableRng};
use std::collections::{BTreeMap, HashMap};
use std::hash::Hash;
use tracing_subscriber::EnvFilter;

pub use rand::Rng;

const MAX_STRING_LEN: usize = 20;
const MAX_COLLECTION_LEN: usize = 5;

/// Types the Arranger can produce at random
pub trait Arrange: Sized {
    fn arrange<R: Rng>(rng: &mut R) -> Self;
}

macro_rules! arrange_standard {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Arrange for $ty {
                fn arrange<R: Rng>(rng: &mut R) -> Self {
                    rng.gen()
                }
            }
        )*
    };
}

arrange_standard!(bool, u8, u16, u32, u64, usize, i8, i16, i32, i64, f32, f64);

impl Arrange for char {
    fn arrange<R: Rng>(rng: &mut R) -> Self {
        char::from(rng.sample(Alphanumeric))
    }
}

impl Arrange for String {
    fn arrange<R: Rng>(rng: &mut R) -> Self {
        let len = rng.gen_range(1..=MAX_STRING_LEN);
        random_string(rng, len)
    }
}

impl<T: Arrange> Arrange for Option<T> {
    fn arrange<R: Rng>(rng: &mut R) -> Self {
        Some(T::arrange(rng))
    }
}

impl<T: Arrange> Arrange for Vec<T> {
    fn arrange<R: Rng>(rng: &mut R) -> Self {
        let len = rng.gen_range(1..=MAX_COLLECTION_LEN);
        (0..len).map(|_| T::arrange(rng)).collect()
    }
}

impl<K: Arrange + Eq + Hash, V: Arrange> Arrange for HashMap<K, V> {
    fn arrange<R: Rng>(rng: &mut R) -> Self {
        let len = rng.gen_range(1..=MAX_COLLECTION_LEN);
        (0..len).map(|_| (K::arrange(rng), V::arrange(rng))).collect()
    }
}

impl<K: Arrange + Ord, V: Arrange> Arrange for BTreeMap<K, V> {
    fn arrange<R: Rng>(rng: &mut R) -> Self {
        let len = rng.gen_range(1..=MAX_COLLECTION_LEN);
        (0..len).map(|_| (K::arrange(rng), V::arrange(rng))).collect()
    }
}

fn random_string<R: Rng>(rng: &mut R, len: usize) -> String {
    (0..len).map(|_| char::from(rng.sample(Alphanumeric))).collect()
}

/// Seedable random fixture generator
///
/// ```rust,ignore
/// let mut arranger = Arranger::seeded(42);
/// let order: Order = arranger.some();
/// ```
#[derive(Debug, Clone)]
pub struct Arranger {
    rng: StdRng,
}

impl Arranger {
    /// Create arranger seeded from entropy
    #[must_use]
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Create reproducible arranger
    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn some<T: Arrange>(&mut self) -> T {
        T::arrange(&mut self.rng)
    }

    pub fn some_objects<T: Arrange>(&mut self, count: usize) -> Vec<T> {
        (0..count).map(|_| self.some()).collect()
    }

    pub fn some_string(&mut self) -> String {
        self.some()
    }

    pub fn some_int(&mut self) -> i32 {
        self.some()
    }

    /// Integer in `1..=bound_inclusive`
    pub fn some_positive_int(&mut self, bound_inclusive: i32) -> i32 {
        self.rng.gen_range(1..=bound_inclusive.max(1))
    }

    pub fn some_bool(&mut self) -> bool {
        self.some()
    }
}

impl Default for Arranger {
    fn default() -> Self {
        Self::new()
    }
}

pub fn some<T: Arrange>() -> T {
    T::arrange(&mut thread_rng())
}

pub fn some_objects<T: Arrange>(count: usize) -> Vec<T> {
    let mut rng = thread_rng();
    (0..count).map(|_| T::arrange(&mut rng)).collect()
}

pub fn some_string() -> String {
    some()
}

pub fn some_int() -> i32 {
    some()
}

/// Integer in `1..=bound_inclusive`
pub fn some_positive_int(bound_inclusive: i32) -> i32 {
    thread_rng().gen_range(1..=bound_inclusive.max(1))
}

pub fn some_bool() -> bool {
    some()
}

/// Install a test subscriber honouring `RUST_LOG`; later calls are no-ops
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
