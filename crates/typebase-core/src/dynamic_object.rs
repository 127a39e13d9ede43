//! Typed access to an untyped value.
//!
//! A [`DynamicObject`] wraps a [`Variant`] and serves typed requests through
//! the [`resolve`] rules: exact matches, plus const-reference aliasing in
//! both directions.
//!
//! # Aliasing
//!
//! Const views alias the live storage: [`DynamicObject::get_as_ref`] borrows
//! straight from it, and `get_as::<ConstRef<T>>()` on a stored `T` returns a
//! handle to the same allocation. A write through the object while such a
//! handle is alive copies the value first, so the handle keeps the value it
//! saw when the write happened and never observes a mutation.
//!
//! ```
//! use typebase_core::{ConstRef, DynamicObject};
//!
//! let mut obj = DynamicObject::new(42i32);
//! let alias = obj.get_as::<ConstRef<i32>>().unwrap();
//! assert_eq!(*alias, 42);
//!
//! *obj.get_as_mut::<i32>().unwrap() = 7;
//! assert_eq!(*alias, 42);
//! assert_eq!(obj.get_as::<i32>().unwrap(), 7);
//! ```

use std::sync::Arc;

use crate::access::{Compatibility, resolve};
use crate::convert::convert_with;
use crate::descriptor::TypeDescriptor;
use crate::error::ReflectError;
use crate::handles::ConstRef;
use crate::property::Property;
use crate::reflect::{Reflect, descriptor_for};
use crate::registry::TypeRegistry;
use crate::variant::Variant;

/// A variant with typed, compatibility-checked access.
#[derive(Clone, Default)]
pub struct DynamicObject {
    storage: Variant,
    descriptor: Option<&'static TypeDescriptor>,
}

impl DynamicObject {
    pub fn new<T: Reflect>(value: T) -> Self {
        Self::from_variant(Variant::new(value))
    }

    pub fn from_variant(storage: Variant) -> Self {
        let descriptor = storage.descriptor();
        Self {
            storage,
            descriptor,
        }
    }

    /// Replace the held value.
    pub fn set<T: Reflect>(&mut self, value: T) {
        self.storage.set(value);
        self.descriptor = self.storage.descriptor();
    }

    pub fn untyped(&self) -> &Variant {
        &self.storage
    }

    pub fn into_untyped(self) -> Variant {
        self.storage
    }

    pub fn descriptor(&self) -> Option<&'static TypeDescriptor> {
        self.descriptor
    }

    pub fn type_name(&self) -> &str {
        self.descriptor.map_or("void", |d| d.name())
    }

    pub fn is_empty(&self) -> bool {
        self.descriptor.is_none()
    }

    /// Get the value as a `T`.
    ///
    /// - stored `T`: a copy;
    /// - stored `const T&`: a copy of the referenced value;
    /// - `T` is `const U&` and a `U` is stored: a handle sharing the storage.
    pub fn get_as<T: Reflect + Clone>(&self) -> Result<T, ReflectError> {
        let Some(stored) = self.descriptor else {
            return self.storage.get::<T>();
        };
        let requested = T::descriptor();
        match resolve(requested, stored) {
            Compatibility::Exact => self.storage.get::<T>(),
            Compatibility::StoredIsConstRefOfRequested => {
                let handle = self.storage.get_ref::<ConstRef<T>>()?;
                Ok(T::clone(handle))
            }
            Compatibility::RequestedIsConstRefOfStored => {
                let storage = self
                    .storage
                    .storage()
                    .ok_or_else(|| ReflectError::mismatch(requested.name(), "void"))?;
                let bound = requested
                    .handle
                    .bind
                    .and_then(|bind| bind(Arc::clone(storage)))
                    .and_then(|bound| bound.downcast::<T>().ok())
                    .ok_or_else(|| ReflectError::mismatch(requested.name(), stored.name()))?;
                Ok(Arc::try_unwrap(bound).unwrap_or_else(|shared| (*shared).clone()))
            }
            Compatibility::Incompatible => Err(ReflectError::mismatch(requested.name(), stored.name())),
        }
    }

    /// Get a const reference to the value as a `T`, without copying.
    ///
    /// Served from a stored `T` or a stored `const T&`.
    pub fn get_as_ref<T: Reflect>(&self) -> Result<&T, ReflectError> {
        let requested = descriptor_for::<ConstRef<T>>();
        let Some(stored) = self.descriptor else {
            return Err(ReflectError::mismatch(requested.name(), "void"));
        };
        match resolve(requested, stored) {
            Compatibility::RequestedIsConstRefOfStored => self.storage.get_ref::<T>(),
            Compatibility::Exact => self.storage.get_ref::<ConstRef<T>>().map(|handle| &**handle),
            _ => Err(ReflectError::mismatch(requested.name(), stored.name())),
        }
    }

    /// Mutable access; the stored type must be exactly `T`.
    ///
    /// Copies first if the storage is aliased.
    pub fn get_as_mut<T: Reflect>(&mut self) -> Result<&mut T, ReflectError> {
        self.storage.get_mut::<T>()
    }

    /// Read a class property.
    pub fn property(&self, name: &str) -> Result<Variant, ReflectError> {
        let (desc, property) = self.lookup_property(name)?;
        let value = self
            .storage
            .erased()
            .ok_or_else(|| ReflectError::mismatch(desc.name(), "void"))?;
        (property.getter)(value).ok_or_else(|| ReflectError::mismatch(desc.name(), "foreign value"))
    }

    /// Write a class property, converting `value` to the property type.
    ///
    /// On any error the object is unchanged.
    pub fn set_property(&mut self, name: &str, value: &Variant) -> Result<(), ReflectError> {
        let (desc, property) = self.lookup_property(name)?;
        let setter = property.setter.clone().ok_or_else(|| ReflectError::ReadOnlyProperty {
            type_name: desc.name().to_string(),
            property: name.to_string(),
        })?;
        let converted = convert_with(value, property.descriptor(), TypeRegistry::global().config())?;
        setter(self.storage.erased_mut()?, converted)
    }

    fn lookup_property(
        &self,
        name: &str,
    ) -> Result<(&'static TypeDescriptor, &'static Property), ReflectError> {
        let desc = self
            .descriptor
            .ok_or_else(|| ReflectError::UnknownProperty {
                type_name: "void".to_string(),
                property: name.to_string(),
            })?;
        let property = desc.property(name).ok_or_else(|| ReflectError::UnknownProperty {
            type_name: desc.name().to_string(),
            property: name.to_string(),
        })?;
        Ok((desc, property))
    }
}

impl PartialEq for DynamicObject {
    /// Equal only with the same descriptor and equal values.
    fn eq(&self, other: &Self) -> bool {
        self.descriptor == other.descriptor && self.storage == other.storage
    }
}

impl std::fmt::Debug for DynamicObject {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("DynamicObject").field(&self.storage).finish()
    }
}
