//! Typebase core: runtime type descriptors and untyped values.
//!
//! - [`TypeDescriptor`] and the process-wide [`TypeRegistry`]
//! - [`Reflect`], implemented by every type that can be stored in a [`Variant`]
//! - handle types [`Ref`], [`ConstRef`] and [`Ptr`]
//! - the conversion table ([`conversion_rule`], [`convert_with`])
//! - [`DynamicObject`] with const-reference aliasing and class properties
//!
//! # Example
//!
//! ```
//! use typebase_core::{DynamicObject, Variant, descriptor_for};
//!
//! let value = Variant::new(5i32);
//! assert_eq!(value.descriptor(), Some(descriptor_for::<i32>()));
//!
//! let widened = value.convert_to(descriptor_for::<i64>()).unwrap();
//! assert_eq!(widened.get::<i64>().unwrap(), 5);
//!
//! // different descriptors never compare equal
//! assert_ne!(DynamicObject::new(5i32), DynamicObject::new(5.0f32));
//! ```

mod access;
mod config;
mod convert;
mod descriptor;
mod dynamic_object;
mod error;
mod handles;
mod property;
mod reflect;
mod registry;
mod type_hash;
mod variant;

pub use access::{Compatibility, resolve};
pub use config::{ConversionProperty, RegistryConfig};
pub use convert::{ConversionRule, conversion_rule, convert_with};
pub use descriptor::{ErasedValue, PrimitiveKind, TypeCategory, TypeDescriptor, TypeFlags};
pub use dynamic_object::DynamicObject;
pub use error::{ConversionError, ReflectError};
pub use handles::{ConstRef, Ptr, Ref};
pub use property::Property;
pub use reflect::{Reflect, TypeBuilder, descriptor_for};
pub use registry::{ConvertFn, TypeRegistry};
pub use type_hash::TypeHash;
pub use variant::{Comparison, Variant};
