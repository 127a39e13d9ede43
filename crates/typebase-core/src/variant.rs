//! Untyped value container.
//!
//! A [`Variant`] owns one value of any [`Reflect`] type together with that
//! type's descriptor. The two are stored as a single slot, so a Variant can
//! never hold storage its descriptor doesn't describe.
//!
//! # Storage
//!
//! The value sits in a shared cell. Cloning a Variant shares the cell;
//! mutation through [`Variant::get_mut`] copies the value first when the cell
//! is shared, so every Variant behaves as if it owned its own copy. Values of
//! non-copyable types are shared on clone and refuse mutation while shared.
//!
//! # Example
//!
//! ```
//! use typebase_core::Variant;
//!
//! let mut v = Variant::new(42i32);
//! assert_eq!(v.type_name(), "int");
//! assert_eq!(v.get::<i32>().unwrap(), 42);
//! assert!(v.get::<f32>().is_err());
//!
//! v.set(String::from("hello"));
//! assert_eq!(v.get_ref::<String>().unwrap(), "hello");
//!
//! v.set(());
//! assert!(v.is_empty());
//! ```

use std::any::{Any, TypeId};
use std::fmt;
use std::sync::Arc;

use crate::descriptor::{ErasedValue, TypeDescriptor};
use crate::error::ReflectError;
use crate::reflect::Reflect;
use crate::registry::TypeRegistry;

static UNIT: () = ();

#[derive(Clone)]
struct Slot {
    descriptor: &'static TypeDescriptor,
    value: Arc<ErasedValue>,
}

/// A type-erased value and its descriptor.
#[derive(Clone, Default)]
pub struct Variant {
    slot: Option<Slot>,
}

/// Outcome of comparing two variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    Equal,
    NotEqual,
    /// Same type, but the type has no equality.
    Incomparable,
}

impl Variant {
    /// The empty variant (`void`).
    pub const fn empty() -> Self {
        Variant { slot: None }
    }

    /// Wrap a value. `()` gives the empty variant.
    pub fn new<T: Reflect>(value: T) -> Self {
        let mut variant = Variant::empty();
        variant.set(value);
        variant
    }

    pub(crate) fn from_parts(descriptor: &'static TypeDescriptor, value: Arc<ErasedValue>) -> Self {
        if descriptor.is_void() {
            return Variant::empty();
        }
        Variant {
            slot: Some(Slot { descriptor, value }),
        }
    }

    /// Replace the stored value and its descriptor together.
    pub fn set<T: Reflect>(&mut self, value: T) {
        let descriptor = T::descriptor();
        self.slot = if descriptor.is_void() {
            None
        } else {
            Some(Slot {
                descriptor,
                value: Arc::new(value),
            })
        };
    }

    /// Drop the stored value.
    pub fn clear(&mut self) {
        self.slot = None;
    }

    pub fn is_empty(&self) -> bool {
        self.slot.is_none()
    }

    /// Descriptor of the stored value, `None` when empty.
    pub fn descriptor(&self) -> Option<&'static TypeDescriptor> {
        self.slot.as_ref().map(|slot| slot.descriptor)
    }

    /// Name of the stored type, `"void"` when empty.
    pub fn type_name(&self) -> &str {
        self.slot.as_ref().map_or("void", |slot| slot.descriptor.name())
    }

    /// Check if the stored value is exactly a `T`.
    pub fn holds<T: Reflect>(&self) -> bool {
        match &self.slot {
            Some(slot) => slot.descriptor.type_id() == TypeId::of::<T>(),
            None => TypeId::of::<T>() == TypeId::of::<()>(),
        }
    }

    /// Copy the stored value out as a `T`.
    pub fn get<T: Reflect + Clone>(&self) -> Result<T, ReflectError> {
        self.get_ref::<T>().cloned()
    }

    /// Borrow the stored value as a `T`.
    pub fn get_ref<T: Reflect>(&self) -> Result<&T, ReflectError> {
        let found = match &self.slot {
            Some(slot) => slot.value.downcast_ref::<T>(),
            None => (&UNIT as &dyn Any).downcast_ref::<T>(),
        };
        found.ok_or_else(|| self.mismatch::<T>())
    }

    /// Mutably borrow the stored value as a `T`.
    ///
    /// Copies the value first if its storage is shared with another variant
    /// or a const alias. Fails with [`ReflectError::NotCopyable`] when the
    /// storage is shared and the type can't be copied.
    pub fn get_mut<T: Reflect>(&mut self) -> Result<&mut T, ReflectError> {
        if !self.holds::<T>() || self.is_empty() {
            return Err(self.mismatch::<T>());
        }
        let mismatch = self.mismatch::<T>();
        self.erased_mut()?.downcast_mut::<T>().ok_or(mismatch)
    }

    /// Move the stored value out as a `T`.
    pub fn take<T: Reflect + Clone>(self) -> Result<T, ReflectError> {
        let mismatch = self.mismatch::<T>();
        let Some(slot) = self.slot else {
            let unit: Box<dyn Any> = Box::new(());
            return unit.downcast::<T>().map(|unit| *unit).map_err(|_| mismatch);
        };
        let value = slot.value.downcast::<T>().map_err(|_| mismatch)?;
        Ok(Arc::try_unwrap(value).unwrap_or_else(|shared| (*shared).clone()))
    }

    /// Convert to another type using the global conversion table.
    pub fn convert_to(&self, target: &'static TypeDescriptor) -> Result<Variant, ReflectError> {
        crate::convert::convert_with(self, target, TypeRegistry::global().config())
    }

    /// Compare two variants.
    ///
    /// Values of different types are never equal. Values of a type without
    /// equality are [`Comparison::Incomparable`].
    pub fn compare(&self, other: &Variant) -> Comparison {
        match (&self.slot, &other.slot) {
            (None, None) => Comparison::Equal,
            (Some(a), Some(b)) => {
                if a.descriptor != b.descriptor {
                    return Comparison::NotEqual;
                }
                match a.descriptor.vtable.eq {
                    Some(eq) if eq(&*a.value, &*b.value) => Comparison::Equal,
                    Some(_) => Comparison::NotEqual,
                    None => Comparison::Incomparable,
                }
            }
            _ => Comparison::NotEqual,
        }
    }

    /// Like `==`, but incomparable values are an error instead of `false`.
    pub fn try_eq(&self, other: &Variant) -> Result<bool, ReflectError> {
        match self.compare(other) {
            Comparison::Equal => Ok(true),
            Comparison::NotEqual => Ok(false),
            Comparison::Incomparable => Err(ReflectError::Incomparable {
                type_name: self.type_name().to_string(),
            }),
        }
    }

    /// Check if both variants share one storage cell.
    pub fn shares_storage_with(&self, other: &Variant) -> bool {
        match (&self.slot, &other.slot) {
            (Some(a), Some(b)) => Arc::ptr_eq(&a.value, &b.value),
            _ => false,
        }
    }

    pub(crate) fn erased(&self) -> Option<&ErasedValue> {
        self.slot.as_ref().map(|slot| &*slot.value)
    }

    pub(crate) fn storage(&self) -> Option<&Arc<ErasedValue>> {
        self.slot.as_ref().map(|slot| &slot.value)
    }

    /// Unique access to the stored value, copying it if shared.
    pub(crate) fn erased_mut(&mut self) -> Result<&mut ErasedValue, ReflectError> {
        let slot = self
            .slot
            .as_mut()
            .ok_or_else(|| ReflectError::mismatch("value", "void"))?;
        if Arc::get_mut(&mut slot.value).is_none() {
            slot.value = slot.descriptor.clone_value(&*slot.value)?;
        }
        let type_name = slot.descriptor.name();
        Arc::get_mut(&mut slot.value).ok_or_else(|| ReflectError::NotCopyable {
            type_name: type_name.to_string(),
        })
    }

    fn mismatch<T: Reflect>(&self) -> ReflectError {
        ReflectError::mismatch(T::descriptor().name(), self.type_name())
    }
}

impl PartialEq for Variant {
    /// Incomparable values are unequal.
    fn eq(&self, other: &Self) -> bool {
        self.compare(other) == Comparison::Equal
    }
}

impl fmt::Debug for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Some(slot) = &self.slot else {
            return f.write_str("Variant(void)");
        };
        match slot.descriptor.vtable.debug {
            Some(debug) => {
                write!(f, "Variant({}: ", slot.descriptor.name())?;
                debug(&*slot.value, f)?;
                f.write_str(")")
            }
            None => write!(f, "Variant({})", slot.descriptor.name()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Ref, TypeBuilder, descriptor_for, reflect_class};

    #[derive(Clone, Debug, PartialEq)]
    struct Point {
        x: i32,
        y: i32,
    }

    reflect_class!(Point, "VariantTestPoint", cloneable, comparable, debuggable);

    #[derive(Clone)]
    struct Blob(Vec<u8>);

    reflect_class!(Blob, "VariantTestBlob", cloneable);

    #[derive(Debug)]
    struct Handle(u32);

    impl Reflect for Handle {
        fn describe() -> TypeBuilder<Self> {
            TypeBuilder::class("VariantTestHandle")
        }
    }

    #[test]
    fn empty_variant() {
        let v = Variant::empty();
        assert!(v.is_empty());
        assert_eq!(v.type_name(), "void");
        assert!(v.descriptor().is_none());
        assert!(v.holds::<()>());
        assert_eq!(v.get::<()>(), Ok(()));
        assert!(v.get::<i32>().is_err());
    }

    #[test]
    fn unit_is_empty() {
        assert!(Variant::new(()).is_empty());
        assert_eq!(Variant::new(()), Variant::empty());
    }

    #[test]
    fn set_replaces_value_and_descriptor() {
        let mut v = Variant::new(1u8);
        assert_eq!(v.descriptor(), Some(descriptor_for::<u8>()));

        v.set(Point { x: 1, y: 2 });
        assert_eq!(v.descriptor(), Some(descriptor_for::<Point>()));
        assert_eq!(v.get::<Point>().unwrap(), Point { x: 1, y: 2 });
        assert!(v.get::<u8>().is_err());

        v.clear();
        assert!(v.is_empty());
    }

    #[test]
    fn mismatch_reports_both_types() {
        let v = Variant::new(5i32);
        let err = v.get::<String>().unwrap_err();
        assert_eq!(err, ReflectError::mismatch("string", "int"));
    }

    #[test]
    fn clone_is_copy_on_write() {
        let a = Variant::new(Point { x: 1, y: 1 });
        let mut b = a.clone();
        assert!(a.shares_storage_with(&b));

        b.get_mut::<Point>().unwrap().x = 10;
        assert!(!a.shares_storage_with(&b));
        assert_eq!(a.get::<Point>().unwrap().x, 1);
        assert_eq!(b.get::<Point>().unwrap().x, 10);
    }

    #[test]
    fn unique_storage_is_mutated_in_place() {
        let mut v = Variant::new(3i64);
        let before = v.erased().map(|e| e as *const ErasedValue as *const u8);
        *v.get_mut::<i64>().unwrap() += 1;
        let after = v.erased().map(|e| e as *const ErasedValue as *const u8);
        assert_eq!(before, after);
        assert_eq!(v.get::<i64>().unwrap(), 4);
    }

    #[test]
    fn shared_non_copyable_refuses_mutation() {
        let mut a = Variant::new(Handle(1));
        assert_eq!(a.get_mut::<Handle>().unwrap().0, 1);

        let b = a.clone();
        let err = a.get_mut::<Handle>().unwrap_err();
        assert!(matches!(err, ReflectError::NotCopyable { .. }));
        assert!(a.shares_storage_with(&b));

        drop(b);
        a.get_mut::<Handle>().unwrap().0 = 2;
        assert_eq!(a.get_ref::<Handle>().unwrap().0, 2);
    }

    #[test]
    fn failed_get_mut_leaves_variant_alone() {
        let mut v = Variant::new(1.5f32);
        assert!(v.get_mut::<f64>().is_err());
        assert_eq!(v.get::<f32>().unwrap(), 1.5);
    }

    #[test]
    fn take_moves_or_copies() {
        let v = Variant::new(String::from("owned"));
        assert_eq!(v.take::<String>().unwrap(), "owned");

        let a = Variant::new(String::from("shared"));
        let b = a.clone();
        assert_eq!(b.take::<String>().unwrap(), "shared");
        assert_eq!(a.get_ref::<String>().unwrap(), "shared");

        assert!(Variant::new(1i32).take::<u32>().is_err());
        assert_eq!(Variant::empty().take::<()>(), Ok(()));
    }

    #[test]
    fn equality_requires_same_descriptor() {
        assert_eq!(Variant::new(5i32), Variant::new(5i32));
        assert_ne!(Variant::new(5i32), Variant::new(6i32));
        assert_ne!(Variant::new(5i32), Variant::new(5i64));
        assert_ne!(Variant::new(5i32), Variant::new(5.0f32));
        assert_ne!(Variant::new(5i32), Variant::empty());
    }

    #[test]
    fn incomparable_values_are_unequal() {
        let a = Variant::new(Blob(vec![1]));
        let b = a.clone();
        assert_eq!(a.compare(&b), Comparison::Incomparable);
        assert!(a != b);
        assert_eq!(
            a.try_eq(&b),
            Err(ReflectError::Incomparable {
                type_name: "VariantTestBlob".into()
            })
        );
        assert_eq!(a.try_eq(&Variant::new(1i32)), Ok(false));
    }

    #[test]
    fn handles_compare_by_identity() {
        let target = Ref::new(1i32);
        let a = Variant::new(target.clone());
        let b = Variant::new(target);
        let c = Variant::new(Ref::new(1i32));
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn debug_output() {
        assert_eq!(format!("{:?}", Variant::new(42i32)), "Variant(int: 42)");
        assert_eq!(format!("{:?}", Variant::empty()), "Variant(void)");
        assert_eq!(
            format!("{:?}", Variant::new(Point { x: 1, y: 2 })),
            "Variant(VariantTestPoint: Point { x: 1, y: 2 })"
        );
        assert_eq!(
            format!("{:?}", Variant::new(Blob(vec![]))),
            "Variant(VariantTestBlob)"
        );
    }
}
