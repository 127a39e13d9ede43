//! The `Reflect` trait and descriptor builder.
//!
//! Every Rust type that can be stored in a [`Variant`] implements
//! [`Reflect`]. The trait describes the type once, through a
//! [`TypeBuilder`]; the [`TypeRegistry`] turns that description into the
//! canonical [`TypeDescriptor`] the first time the type is used.
//!
//! Requesting a descriptor for a type that does not implement `Reflect` is a
//! compile error:
//!
//! ```compile_fail
//! struct NotReflected;
//!
//! let _ = typebase_core::descriptor_for::<NotReflected>();
//! ```
//!
//! # Example
//!
//! ```
//! use typebase_core::{Reflect, TypeBuilder, TypeCategory, descriptor_for};
//!
//! #[derive(Clone, PartialEq, Default)]
//! struct Vec3 {
//!     x: f32,
//!     y: f32,
//!     z: f32,
//! }
//!
//! impl Reflect for Vec3 {
//!     fn describe() -> TypeBuilder<Self> {
//!         TypeBuilder::class("Vec3")
//!             .cloneable()
//!             .comparable()
//!             .defaultable()
//!             .property("x", |v: &Vec3| v.x, |v: &mut Vec3, x| v.x = x)
//!     }
//! }
//!
//! let desc = descriptor_for::<Vec3>();
//! assert_eq!(desc.name(), "Vec3");
//! assert_eq!(desc.category(), TypeCategory::Class);
//! assert!(desc.property("x").is_some());
//! ```

use std::any::{Any, TypeId};
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use crate::descriptor::{
    ErasedValue, HandleOps, PrimitiveKind, TypeCategory, TypeDescriptor, TypeFlags, TypeVTable,
};
use crate::error::ReflectError;
use crate::property::Property;
use crate::registry::TypeRegistry;
use crate::variant::Variant;
use crate::TypeHash;

/// Trait for types that can be described to the reflection runtime.
///
/// Implement it by hand, with [`reflect_class!`](crate::reflect_class), or
/// with `#[derive(Reflect)]` from `typebase-macros`.
///
/// `describe` must not request `Self`'s own descriptor; properties are
/// resolved lazily, so a class may still expose handles to itself.
pub trait Reflect: Any + Send + Sync + Sized {
    /// Describe the type.
    fn describe() -> TypeBuilder<Self>;

    /// The canonical descriptor of this type.
    fn descriptor() -> &'static TypeDescriptor {
        TypeRegistry::global().descriptor_for::<Self>()
    }
}

/// Get the canonical descriptor for `T`.
///
/// Idempotent: repeated calls return the same `&'static` descriptor.
#[inline]
pub fn descriptor_for<T: Reflect>() -> &'static TypeDescriptor {
    T::descriptor()
}

/// Builder describing a type to the registry.
pub struct TypeBuilder<T> {
    name: String,
    category: TypeCategory,
    flags: TypeFlags,
    pointee: Option<&'static TypeDescriptor>,
    primitive: Option<PrimitiveKind>,
    vtable: TypeVTable,
    handle: HandleOps,
    properties: Vec<Property>,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Reflect> TypeBuilder<T> {
    fn with_category(name: impl Into<String>, category: TypeCategory) -> Self {
        Self {
            name: name.into(),
            category,
            flags: TypeFlags::empty(),
            pointee: None,
            primitive: None,
            vtable: TypeVTable::default(),
            handle: HandleOps::default(),
            properties: Vec::new(),
            _marker: PhantomData,
        }
    }

    /// Describe a user class.
    pub fn class(name: impl Into<String>) -> Self {
        Self::with_category(name, TypeCategory::Class)
    }

    pub(crate) fn value(kind: PrimitiveKind) -> Self {
        let mut builder = Self::with_category(kind.name(), TypeCategory::Value);
        builder.primitive = Some(kind);
        builder
    }

    pub(crate) fn void() -> Self {
        Self::with_category("void", TypeCategory::Void)
    }

    pub(crate) fn handle(
        category: TypeCategory,
        pointee: &'static TypeDescriptor,
        is_const: bool,
        ops: HandleOps,
    ) -> Self {
        let name = match (category, is_const) {
            (TypeCategory::Pointer, _) => format!("{}*", pointee.name()),
            (_, true) => format!("const {}&", pointee.name()),
            (_, false) => format!("{}&", pointee.name()),
        };
        let mut builder = Self::with_category(name, category);
        builder.pointee = Some(pointee);
        builder.handle = ops;
        if is_const {
            builder.flags |= TypeFlags::CONST;
        }
        builder
    }

    /// Values can be copied.
    pub fn cloneable(mut self) -> Self
    where
        T: Clone,
    {
        self.flags |= TypeFlags::COPYABLE;
        self.vtable.clone = Some(clone_erased::<T>);
        self
    }

    /// Values can be compared with `PartialEq`.
    pub fn comparable(mut self) -> Self
    where
        T: PartialEq,
    {
        self.flags |= TypeFlags::COMPARABLE;
        self.vtable.eq = Some(eq_erased::<T>);
        self
    }

    /// A default value can be constructed by name.
    pub fn defaultable(mut self) -> Self
    where
        T: Default,
    {
        self.flags |= TypeFlags::DEFAULTABLE;
        self.vtable.default = Some(default_erased::<T>);
        self
    }

    /// Values are formatted with `Debug` in diagnostics.
    pub fn debuggable(mut self) -> Self
    where
        T: fmt::Debug,
    {
        self.flags |= TypeFlags::DEBUGGABLE;
        self.vtable.debug = Some(debug_erased::<T>);
        self
    }

    /// Add a read/write property.
    pub fn property<F, G, S>(mut self, name: impl Into<String>, get: G, set: S) -> Self
    where
        F: Reflect + Clone,
        G: Fn(&T) -> F + Send + Sync + 'static,
        S: Fn(&mut T, F) + Send + Sync + 'static,
    {
        let mut property = readonly::<T, F, G>(name.into(), get);
        property.setter = Some(Arc::new(move |target: &mut ErasedValue, value: Variant| {
            let this = target
                .downcast_mut::<T>()
                .ok_or_else(|| ReflectError::mismatch(std::any::type_name::<T>(), "foreign value"))?;
            let value = value.take::<F>()?;
            set(this, value);
            Ok(())
        }));
        self.properties.push(property);
        self
    }

    /// Add a read-only property.
    pub fn readonly_property<F, G>(mut self, name: impl Into<String>, get: G) -> Self
    where
        F: Reflect + Clone,
        G: Fn(&T) -> F + Send + Sync + 'static,
    {
        self.properties.push(readonly::<T, F, G>(name.into(), get));
        self
    }

    pub(crate) fn build(self) -> TypeDescriptor {
        TypeDescriptor {
            hash: TypeHash::from_name(&self.name),
            name: self.name,
            category: self.category,
            flags: self.flags,
            type_id: TypeId::of::<T>(),
            rust_name: std::any::type_name::<T>(),
            pointee: self.pointee,
            primitive: self.primitive,
            vtable: self.vtable,
            handle: self.handle,
            properties: self.properties,
        }
    }
}

fn readonly<T, F, G>(name: String, get: G) -> Property
where
    T: Reflect,
    F: Reflect + Clone,
    G: Fn(&T) -> F + Send + Sync + 'static,
{
    Property {
        name,
        descriptor: F::descriptor,
        getter: Arc::new(move |target: &ErasedValue| {
            target.downcast_ref::<T>().map(|this| Variant::new(get(this)))
        }),
        setter: None,
    }
}

fn clone_erased<T: Clone + Any + Send + Sync>(value: &ErasedValue) -> Option<Arc<ErasedValue>> {
    let value = value.downcast_ref::<T>()?;
    Some(Arc::new(value.clone()))
}

fn eq_erased<T: PartialEq + Any>(a: &ErasedValue, b: &ErasedValue) -> bool {
    match (a.downcast_ref::<T>(), b.downcast_ref::<T>()) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}

fn default_erased<T: Default + Any + Send + Sync>() -> Arc<ErasedValue> {
    Arc::new(T::default())
}

fn debug_erased<T: fmt::Debug + Any>(value: &ErasedValue, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match value.downcast_ref::<T>() {
        Some(value) => fmt::Debug::fmt(value, f),
        None => f.write_str("<foreign>"),
    }
}

// === Built-in types ===

macro_rules! impl_reflect_primitive {
    ($($ty:ty => $kind:ident),* $(,)?) => {
        $(
            impl Reflect for $ty {
                fn describe() -> TypeBuilder<Self> {
                    TypeBuilder::value(PrimitiveKind::$kind)
                        .cloneable()
                        .comparable()
                        .defaultable()
                        .debuggable()
                }
            }
        )*
    };
}

impl_reflect_primitive!(
    bool => Bool,
    i8 => Int8,
    i16 => Int16,
    i32 => Int32,
    i64 => Int64,
    u8 => UInt8,
    u16 => UInt16,
    u32 => UInt32,
    u64 => UInt64,
    f32 => Float,
    f64 => Double,
    String => String,
);

impl Reflect for () {
    fn describe() -> TypeBuilder<Self> {
        TypeBuilder::void()
    }
}

/// Implement [`Reflect`] for a class type.
///
/// The trailing identifiers name [`TypeBuilder`] capabilities.
///
/// ```
/// use typebase_core::{reflect_class, descriptor_for};
///
/// #[derive(Clone, PartialEq, Default)]
/// struct Color(u8, u8, u8);
///
/// reflect_class!(Color, "Color", cloneable, comparable, defaultable);
///
/// assert!(descriptor_for::<Color>().is_copyable());
/// ```
#[macro_export]
macro_rules! reflect_class {
    ($ty:ty, $name:expr $(, $capability:ident)* $(,)?) => {
        impl $crate::Reflect for $ty {
            fn describe() -> $crate::TypeBuilder<Self> {
                $crate::TypeBuilder::class($name)$(.$capability())*
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor_for;

    #[derive(Clone, PartialEq, Default, Debug)]
    struct Health {
        current: i32,
        max: i32,
    }

    impl Reflect for Health {
        fn describe() -> TypeBuilder<Self> {
            TypeBuilder::class("ReflectTestHealth")
                .cloneable()
                .comparable()
                .defaultable()
                .debuggable()
                .property("current", |h: &Health| h.current, |h: &mut Health, v| h.current = v)
                .readonly_property("max", |h: &Health| h.max)
        }
    }

    struct Opaque;

    reflect_class!(Opaque, "ReflectTestOpaque");

    #[test]
    fn descriptor_is_idempotent() {
        let a = descriptor_for::<Health>();
        let b = descriptor_for::<Health>();
        assert!(std::ptr::eq(a, b));
        assert_eq!(a, b);
    }

    #[test]
    fn capabilities_become_flags() {
        let desc = descriptor_for::<Health>();
        assert!(desc.is_copyable());
        assert!(desc.is_comparable());
        assert!(desc.is_defaultable());
        assert!(desc.flags().contains(TypeFlags::DEBUGGABLE));
        assert_eq!(desc.rust_name(), std::any::type_name::<Health>());
    }

    #[test]
    fn class_without_capabilities() {
        let desc = descriptor_for::<Opaque>();
        assert_eq!(desc.name(), "ReflectTestOpaque");
        assert_eq!(desc.category(), TypeCategory::Class);
        assert!(!desc.is_copyable());
        assert!(!desc.is_comparable());
        assert!(desc.properties().is_empty());
    }

    #[test]
    fn properties_are_described() {
        let desc = descriptor_for::<Health>();
        let current = desc.property("current").unwrap();
        let max = desc.property("max").unwrap();

        assert_eq!(current.descriptor(), descriptor_for::<i32>());
        assert!(current.is_writable());
        assert!(!max.is_writable());
        assert!(desc.property("missing").is_none());
    }

    #[test]
    fn primitive_names() {
        assert_eq!(descriptor_for::<bool>().name(), "bool");
        assert_eq!(descriptor_for::<i8>().name(), "int8");
        assert_eq!(descriptor_for::<i64>().name(), "int64");
        assert_eq!(descriptor_for::<u32>().name(), "uint");
        assert_eq!(descriptor_for::<f32>().name(), "float");
        assert_eq!(descriptor_for::<f64>().name(), "double");
        assert_eq!(descriptor_for::<String>().name(), "string");
        assert_eq!(descriptor_for::<()>().name(), "void");
    }
}
