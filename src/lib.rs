//! Typebase: dynamic typing over statically compiled Rust types.
//!
//! Types describe themselves through [`Reflect`] (usually derived) and get a
//! process-wide [`TypeDescriptor`]. Values travel as [`Variant`]s, are
//! inspected through [`DynamicObject`], and native functions are called with
//! type-erased argument lists through [`invoke`].
//!
//! # Example
//!
//! ```
//! use typebase::{DynamicObject, FunctionTable, NativeFunction, Reflect, Variant};
//!
//! #[derive(Debug, Clone, PartialEq, Reflect)]
//! #[reflect(clone, eq, debug)]
//! struct Player {
//!     #[reflect(get, set)]
//!     health: i32,
//!     #[reflect(get)]
//!     name: String,
//! }
//!
//! let mut player = DynamicObject::new(Player { health: 10, name: "ada".into() });
//! player.set_property("health", &Variant::new(25u8)).unwrap();
//! assert_eq!(player.get_as::<Player>().unwrap().health, 25);
//! assert!(player.set_property("name", &Variant::new(String::new())).is_err());
//!
//! let mut table = FunctionTable::new();
//! table.register(NativeFunction::new("heal", |p: Player, by: i32| p.health + by));
//! let healed = table.call("heal", vec![player.into_untyped(), Variant::new(5i64)]).unwrap();
//! assert_eq!(healed.get::<i32>().unwrap(), 30);
//! ```
//!
//! Generic types can't derive `Reflect`:
//!
//! ```compile_fail
//! use typebase::Reflect;
//!
//! #[derive(Clone, Reflect)]
//! struct Wrapper<T> {
//!     inner: T,
//! }
//! ```
//!
//! # Features
//!
//! - `profiling`: instrument conversion and invocation with the `profiling` crate
//! - `profile-with-puffin`: route `profiling` scopes to puffin

extern crate self as typebase;

mod error;
mod function_table;
mod invoke;
mod method;
mod native_fn;
mod signature;

pub use error::InvocationError;
pub use function_table::FunctionTable;
pub use invoke::{Invocation, InvocationState, invoke};
pub use method::{BoundMethod, IntoNativeMethod};
pub use native_fn::{Callable, FunctionHandle, IntoNativeFunction, NativeBody, NativeFunction};
pub use signature::FunctionSignature;

pub use typebase_core::*;
pub use typebase_macros::Reflect;
