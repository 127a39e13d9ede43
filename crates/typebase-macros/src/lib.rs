//! Typebase Proc Macros
//!
//! `#[derive(Reflect)]` implements `typebase::Reflect` for a class type.
//! The generated code refers to the `typebase` crate, which re-exports the
//! derive.
//!
//! # Example
//!
//! ```ignore
//! use typebase::Reflect;
//!
//! #[derive(Clone, PartialEq, Default, Reflect)]
//! #[reflect(name = "Player", clone, eq, default)]
//! pub struct Player {
//!     #[reflect(get, set)]
//!     pub health: i32,
//!     #[reflect(get, name = "displayName")]
//!     pub name: String,
//! }
//! ```

use proc_macro::TokenStream;

mod attrs;
mod derive_reflect;

/// Derive the `Reflect` trait for a type.
///
/// # Attributes
///
/// - `#[reflect(name = "...")]` - Override the registered type name
/// - `#[reflect(clone)]` - Values can be copied (requires `Clone`)
/// - `#[reflect(eq)]` - Values can be compared (requires `PartialEq`)
/// - `#[reflect(default)]` - Constructible by name (requires `Default`)
/// - `#[reflect(debug)]` - Formatted with `Debug` in diagnostics
///
/// # Field Attributes
///
/// - `#[reflect(get)]` - Read-only property
/// - `#[reflect(get, set)]` - Read/write property
/// - `#[reflect(name = "...")]` - Override property name
///
/// Property fields must be `Clone` and implement `Reflect`. Generic types and
/// `set` without `get` are rejected.
#[proc_macro_derive(Reflect, attributes(reflect))]
pub fn derive_reflect(input: TokenStream) -> TokenStream {
    derive_reflect::derive_reflect_impl(input)
}
