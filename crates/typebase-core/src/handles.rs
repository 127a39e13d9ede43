//! Pointer and reference handles.
//!
//! - [`Ref<T>`] is a shared, mutable alias (`T&`). The value lives behind a
//!   `parking_lot::RwLock` and stays alive while any `Ref` exists. Erased
//!   reads never block: a target locked for writing reports
//!   [`ReflectError::Busy`].
//! - [`ConstRef<T>`] is a shared, immutable alias (`const T&`).
//! - [`Ptr<T>`] is a non-owning, nullable handle (`T*`) to a value owned by
//!   `Ref`s elsewhere. Reading through a dangling pointer fails with
//!   [`ReflectError::TargetUnavailable`].
//!
//! Handles compare by identity of the referenced object, never by value.

use std::fmt;
use std::ops::Deref;
use std::sync::{Arc, Weak};

use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::descriptor::{ErasedValue, HandleOps, TypeCategory};
use crate::error::ReflectError;
use crate::reflect::{Reflect, TypeBuilder, descriptor_for};

/// Shared, mutable reference to a `T`.
pub struct Ref<T>(Arc<RwLock<T>>);

impl<T> Ref<T> {
    /// Move a value into a new shared cell.
    pub fn new(value: T) -> Self {
        Ref(Arc::new(RwLock::new(value)))
    }

    /// Lock for reading.
    pub fn read(&self) -> RwLockReadGuard<'_, T> {
        self.0.read()
    }

    /// Lock for writing.
    pub fn write(&self) -> RwLockWriteGuard<'_, T> {
        self.0.write()
    }

    /// Lock for reading unless a writer holds the lock.
    pub fn try_read(&self) -> Option<RwLockReadGuard<'_, T>> {
        self.0.try_read()
    }

    /// Lock for writing unless any other guard is held.
    pub fn try_write(&self) -> Option<RwLockWriteGuard<'_, T>> {
        self.0.try_write()
    }

    /// Non-owning pointer to the same object.
    pub fn downgrade(&self) -> Ptr<T> {
        Ptr(Arc::downgrade(&self.0))
    }

    /// Check if both references alias the same object.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// Number of live `Ref`s to the object.
    pub fn strong_count(&self) -> usize {
        Arc::strong_count(&self.0)
    }
}

impl<T> Clone for Ref<T> {
    fn clone(&self) -> Self {
        Ref(Arc::clone(&self.0))
    }
}

impl<T> PartialEq for Ref<T> {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl<T: fmt::Debug> fmt::Debug for Ref<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.try_read() {
            Some(value) => f.debug_tuple("Ref").field(&*value).finish(),
            None => f.write_str("Ref(<locked>)"),
        }
    }
}

/// Shared, immutable reference to a `T`.
pub struct ConstRef<T>(Arc<T>);

impl<T> ConstRef<T> {
    /// Move a value into a new shared cell.
    pub fn new(value: T) -> Self {
        ConstRef(Arc::new(value))
    }

    /// Wrap an existing allocation.
    pub fn from_arc(value: Arc<T>) -> Self {
        ConstRef(value)
    }

    /// Check if both references alias the same object.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl<T> Deref for ConstRef<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.0
    }
}

impl<T> Clone for ConstRef<T> {
    fn clone(&self) -> Self {
        ConstRef(Arc::clone(&self.0))
    }
}

impl<T> PartialEq for ConstRef<T> {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl<T: fmt::Debug> fmt::Debug for ConstRef<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ConstRef").field(&*self.0).finish()
    }
}

/// Non-owning, nullable pointer to a `T` owned by [`Ref`]s.
pub struct Ptr<T>(Weak<RwLock<T>>);

impl<T> Ptr<T> {
    /// A pointer to nothing.
    pub fn null() -> Self {
        Ptr(Weak::new())
    }

    /// Get a strong reference if the target is still alive.
    pub fn upgrade(&self) -> Option<Ref<T>> {
        self.0.upgrade().map(Ref)
    }

    /// Check if the target is gone (or was never set).
    pub fn is_dangling(&self) -> bool {
        self.0.strong_count() == 0
    }

    /// Check if both pointers point to the same object.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Weak::ptr_eq(&self.0, &other.0)
    }
}

impl<T> Default for Ptr<T> {
    fn default() -> Self {
        Ptr::null()
    }
}

impl<T> Clone for Ptr<T> {
    fn clone(&self) -> Self {
        Ptr(Weak::clone(&self.0))
    }
}

impl<T> PartialEq for Ptr<T> {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl<T> From<&Ref<T>> for Ptr<T> {
    fn from(value: &Ref<T>) -> Self {
        value.downgrade()
    }
}

impl<T> fmt::Debug for Ptr<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_dangling() {
            f.write_str("Ptr(dangling)")
        } else {
            write!(f, "Ptr({:p})", self.0.as_ptr())
        }
    }
}

// === Reflect impls ===

impl<T: Reflect> Reflect for Ref<T> {
    fn describe() -> TypeBuilder<Self> {
        let ops = HandleOps {
            read: Some(read_ref::<T>),
            downgrade: Some(downgrade_ref::<T>),
            ..HandleOps::default()
        };
        TypeBuilder::handle(TypeCategory::Reference, T::descriptor(), false, ops)
            .cloneable()
            .comparable()
    }
}

impl<T: Reflect> Reflect for ConstRef<T> {
    fn describe() -> TypeBuilder<Self> {
        let ops = HandleOps {
            read: Some(read_const_ref::<T>),
            bind: Some(bind_const::<T>),
            ..HandleOps::default()
        };
        TypeBuilder::handle(TypeCategory::Reference, T::descriptor(), true, ops)
            .cloneable()
            .comparable()
    }
}

impl<T: Reflect> Reflect for Ptr<T> {
    fn describe() -> TypeBuilder<Self> {
        let ops = HandleOps {
            read: Some(read_ptr::<T>),
            upgrade: Some(upgrade_ptr::<T>),
            ..HandleOps::default()
        };
        TypeBuilder::handle(TypeCategory::Pointer, T::descriptor(), false, ops)
            .cloneable()
            .comparable()
            .defaultable()
    }
}

fn foreign<H: Reflect>() -> ReflectError {
    ReflectError::mismatch(descriptor_for::<H>().name(), "foreign value")
}

fn unavailable<T: Reflect>() -> ReflectError {
    ReflectError::TargetUnavailable {
        type_name: descriptor_for::<Ptr<T>>().name().to_string(),
    }
}

fn busy<T: Reflect>() -> ReflectError {
    ReflectError::Busy {
        type_name: descriptor_for::<Ref<T>>().name().to_string(),
    }
}

fn read_ref<T: Reflect>(value: &ErasedValue) -> Result<Arc<ErasedValue>, ReflectError> {
    let handle = value.downcast_ref::<Ref<T>>().ok_or_else(foreign::<Ref<T>>)?;
    let guard = handle.try_read().ok_or_else(busy::<T>)?;
    T::descriptor().clone_value(&*guard)
}

fn read_const_ref<T: Reflect>(value: &ErasedValue) -> Result<Arc<ErasedValue>, ReflectError> {
    let handle = value
        .downcast_ref::<ConstRef<T>>()
        .ok_or_else(foreign::<ConstRef<T>>)?;
    T::descriptor().clone_value(&**handle)
}

fn read_ptr<T: Reflect>(value: &ErasedValue) -> Result<Arc<ErasedValue>, ReflectError> {
    let handle = value.downcast_ref::<Ptr<T>>().ok_or_else(foreign::<Ptr<T>>)?;
    let target = handle.upgrade().ok_or_else(unavailable::<T>)?;
    let guard = target.try_read().ok_or_else(busy::<T>)?;
    T::descriptor().clone_value(&*guard)
}

fn upgrade_ptr<T: Reflect>(value: &ErasedValue) -> Result<Arc<ErasedValue>, ReflectError> {
    let handle = value.downcast_ref::<Ptr<T>>().ok_or_else(foreign::<Ptr<T>>)?;
    let target = handle.upgrade().ok_or_else(unavailable::<T>)?;
    Ok(Arc::new(target))
}

fn downgrade_ref<T: Reflect>(value: &ErasedValue) -> Result<Arc<ErasedValue>, ReflectError> {
    let handle = value.downcast_ref::<Ref<T>>().ok_or_else(foreign::<Ref<T>>)?;
    Ok(Arc::new(handle.downgrade()))
}

fn bind_const<T: Reflect>(storage: Arc<ErasedValue>) -> Option<Arc<ErasedValue>> {
    let value = storage.downcast::<T>().ok()?;
    Some(Arc::new(ConstRef::from_arc(value)))
}
