//! Procedural macros for the Rearranger.
//!
//! Provides `#[derive(Rearrange)]`, which turns a named-field struct into a
//! type the copy engine can rebuild: a property table, constructor
//! descriptors, an optional blank-instance allocator and typed property keys.

use proc_macro::TokenStream;
use syn::{parse_macro_input, DeriveInput};

/// Attribute parsing.
mod attrs;
/// Code generation.
mod expand;

/// Derives `rearranger::Rearrange`.
///
/// Generates `{Type}Keys`, a struct of `Property<V>` keys reached as
/// `Type::KEYS.<property>`, and the `describe` implementation.
///
/// Container attributes:
/// - `#[rearrange(constructor(new(a, b, c = expr)))]` - a constructor whose
///   parameters are the named properties; `c = expr` is the value for a
///   parameter that is not a property. Repeatable, tried in order.
/// - `#[rearrange(constructor(try_new(a, b), fallible))]` - the constructor
///   returns `Result`; its error surfaces as a constructor invocation failure
/// - `#[rearrange(allocate)]` / `#[rearrange(allocate = Self::blank)]` - blank
///   instance for field injection, built field-wise from `Default` or by the
///   given factory. Implied when no constructor is declared.
/// - `#[rearrange(computed(label: String = Self::label))]` - read-only property
///
/// Field attributes:
/// - `#[rearrange(skip)]` - not a property: it cannot be overridden and no
///   constructor names it, but field injection copies it from the original
///   (requires `Clone`)
/// - `#[rearrange(rename = "other")]` - property name differs from the field
/// - `#[rearrange(setter = set_name)]` - written through `Self::set_name`
/// - `#[rearrange(extends)]` - embedded supertype whose properties are inherited
///
/// ```ignore
/// #[derive(Debug, Clone, Rearrange)]
/// #[rearrange(constructor(new(name, number, other)))]
/// struct DataClass {
///     name: String,
///     number: i32,
///     other: Option<String>,
/// }
/// ```
#[proc_macro_derive(Rearrange, attributes(rearrange))]
pub fn derive_rearrange(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    expand::derive_rearrange(&input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}
