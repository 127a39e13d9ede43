//! Runtime type descriptors.
//!
//! A [`TypeDescriptor`] is the canonical runtime description of one Rust type
//! registered with the reflection layer: identity, category, const
//! qualification, name, capability flags, and a small vtable of erased
//! operations. Descriptors are created once by the
//! [`TypeRegistry`](crate::TypeRegistry) and live for the rest of the process,
//! so they are always handed out as `&'static TypeDescriptor`.
//!
//! # Example
//!
//! ```
//! use typebase_core::{descriptor_for, ConstRef, TypeCategory};
//!
//! let int = descriptor_for::<i32>();
//! let const_int_ref = descriptor_for::<ConstRef<i32>>();
//!
//! assert_eq!(int.name(), "int");
//! assert_eq!(const_int_ref.name(), "const int&");
//! assert_eq!(const_int_ref.category(), TypeCategory::Reference);
//! assert!(const_int_ref.is_const());
//! assert_eq!(const_int_ref.pointee(), Some(int));
//! ```

use std::any::{Any, TypeId};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use bitflags::bitflags;

use crate::TypeHash;
use crate::error::ReflectError;
use crate::property::Property;

/// A type-erased value as held by a [`Variant`](crate::Variant).
pub type ErasedValue = dyn Any + Send + Sync;

/// Category of a registered type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeCategory {
    /// The unit type; only meaningful as a return type.
    Void,
    /// Built-in value type (numbers, bool, string).
    Value,
    /// Non-owning, nullable handle to an object owned elsewhere.
    Pointer,
    /// Shared handle aliasing another value.
    Reference,
    /// User-registered class type.
    Class,
}

impl TypeCategory {
    /// Check if values of this category alias another value.
    pub fn is_handle(self) -> bool {
        matches!(self, TypeCategory::Pointer | TypeCategory::Reference)
    }
}

impl fmt::Display for TypeCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TypeCategory::Void => "void",
            TypeCategory::Value => "value",
            TypeCategory::Pointer => "pointer",
            TypeCategory::Reference => "reference",
            TypeCategory::Class => "class",
        };
        f.write_str(name)
    }
}

bitflags! {
    /// Capability and qualification flags of a descriptor.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct TypeFlags: u32 {
        /// Const-qualified (only handles can be const).
        const CONST = 1 << 0;
        /// Values can be copied.
        const COPYABLE = 1 << 1;
        /// Values can be compared for equality.
        const COMPARABLE = 1 << 2;
        /// A default value can be constructed.
        const DEFAULTABLE = 1 << 3;
        /// Values can be formatted for diagnostics.
        const DEBUGGABLE = 1 << 4;
    }
}

/// The built-in scalar types taking part in numeric and string conversions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    Bool,
    Int8,
    Int16,
    Int32,
    Int64,
    UInt8,
    UInt16,
    UInt32,
    UInt64,
    Float,
    Double,
    String,
}

impl PrimitiveKind {
    /// Canonical type name of this primitive.
    pub const fn name(self) -> &'static str {
        match self {
            PrimitiveKind::Bool => "bool",
            PrimitiveKind::Int8 => "int8",
            PrimitiveKind::Int16 => "int16",
            PrimitiveKind::Int32 => "int",
            PrimitiveKind::Int64 => "int64",
            PrimitiveKind::UInt8 => "uint8",
            PrimitiveKind::UInt16 => "uint16",
            PrimitiveKind::UInt32 => "uint",
            PrimitiveKind::UInt64 => "uint64",
            PrimitiveKind::Float => "float",
            PrimitiveKind::Double => "double",
            PrimitiveKind::String => "string",
        }
    }

    /// Check if this is a signed or unsigned integer.
    pub const fn is_integer(self) -> bool {
        matches!(
            self,
            PrimitiveKind::Int8
                | PrimitiveKind::Int16
                | PrimitiveKind::Int32
                | PrimitiveKind::Int64
                | PrimitiveKind::UInt8
                | PrimitiveKind::UInt16
                | PrimitiveKind::UInt32
                | PrimitiveKind::UInt64
        )
    }

    /// Check if this is `float` or `double`.
    pub const fn is_float(self) -> bool {
        matches!(self, PrimitiveKind::Float | PrimitiveKind::Double)
    }

    /// Check if this is any numeric type.
    pub const fn is_numeric(self) -> bool {
        self.is_integer() || self.is_float()
    }

    /// Check if this is an unsigned integer.
    pub const fn is_unsigned(self) -> bool {
        matches!(
            self,
            PrimitiveKind::UInt8 | PrimitiveKind::UInt16 | PrimitiveKind::UInt32 | PrimitiveKind::UInt64
        )
    }

    /// Width in bits for numeric kinds, 0 otherwise.
    pub const fn bits(self) -> u32 {
        match self {
            PrimitiveKind::Int8 | PrimitiveKind::UInt8 => 8,
            PrimitiveKind::Int16 | PrimitiveKind::UInt16 => 16,
            PrimitiveKind::Int32 | PrimitiveKind::UInt32 | PrimitiveKind::Float => 32,
            PrimitiveKind::Int64 | PrimitiveKind::UInt64 | PrimitiveKind::Double => 64,
            PrimitiveKind::Bool | PrimitiveKind::String => 0,
        }
    }

    /// Check if every value of `self` is representable in `target`.
    ///
    /// Integer to float is treated as widening when the float mantissa covers
    /// the integer width.
    pub const fn widens_to(self, target: PrimitiveKind) -> bool {
        if self.is_integer() && target.is_integer() {
            if self.is_unsigned() == target.is_unsigned() {
                return self.bits() <= target.bits();
            }
            // unsigned -> signed needs one more bit
            return self.is_unsigned() && self.bits() < target.bits();
        }
        if self.is_float() && target.is_float() {
            return self.bits() <= target.bits();
        }
        if self.is_integer() && target.is_float() {
            let mantissa = match target {
                PrimitiveKind::Float => 24,
                _ => 53,
            };
            return self.bits() <= mantissa;
        }
        false
    }
}

pub(crate) type CloneFn = fn(&ErasedValue) -> Option<Arc<ErasedValue>>;
pub(crate) type EqFn = fn(&ErasedValue, &ErasedValue) -> bool;
pub(crate) type DefaultFn = fn() -> Arc<ErasedValue>;
pub(crate) type DebugFn = fn(&ErasedValue, &mut fmt::Formatter<'_>) -> fmt::Result;
pub(crate) type HandleFn = fn(&ErasedValue) -> Result<Arc<ErasedValue>, ReflectError>;
pub(crate) type BindFn = fn(Arc<ErasedValue>) -> Option<Arc<ErasedValue>>;

/// Erased per-type operations.
///
/// Absent entries mean the capability is not available for the type.
#[derive(Clone, Copy, Default)]
pub(crate) struct TypeVTable {
    pub(crate) clone: Option<CloneFn>,
    pub(crate) eq: Option<EqFn>,
    pub(crate) default: Option<DefaultFn>,
    pub(crate) debug: Option<DebugFn>,
}

/// Erased operations of pointer and reference handles.
#[derive(Clone, Copy, Default)]
pub(crate) struct HandleOps {
    /// Copy the pointee out of the handle.
    pub(crate) read: Option<HandleFn>,
    /// `Ptr<T>` to `Ref<T>`.
    pub(crate) upgrade: Option<HandleFn>,
    /// `Ref<T>` to `Ptr<T>`.
    pub(crate) downgrade: Option<HandleFn>,
    /// Wrap the storage of a `T` into a `ConstRef<T>` sharing it.
    pub(crate) bind: Option<BindFn>,
}

/// Canonical runtime description of one registered type.
pub struct TypeDescriptor {
    pub(crate) hash: TypeHash,
    pub(crate) name: String,
    pub(crate) category: TypeCategory,
    pub(crate) flags: TypeFlags,
    pub(crate) type_id: TypeId,
    pub(crate) rust_name: &'static str,
    pub(crate) pointee: Option<&'static TypeDescriptor>,
    pub(crate) primitive: Option<PrimitiveKind>,
    pub(crate) vtable: TypeVTable,
    pub(crate) handle: HandleOps,
    pub(crate) properties: Vec<Property>,
}

impl TypeDescriptor {
    /// Hash of the canonical name.
    pub fn hash(&self) -> TypeHash {
        self.hash
    }

    /// Canonical, human-readable name (`int`, `const Vec3&`, `Player*`).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The Rust type name this descriptor was built from.
    pub fn rust_name(&self) -> &'static str {
        self.rust_name
    }

    /// Category of the type.
    pub fn category(&self) -> TypeCategory {
        self.category
    }

    /// Capability and qualification flags.
    pub fn flags(&self) -> TypeFlags {
        self.flags
    }

    /// Rust `TypeId` of the stored representation.
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// Check the const qualifier.
    pub fn is_const(&self) -> bool {
        self.flags.contains(TypeFlags::CONST)
    }

    /// Check if values can be copied.
    pub fn is_copyable(&self) -> bool {
        self.flags.contains(TypeFlags::COPYABLE)
    }

    /// Check if values can be compared.
    pub fn is_comparable(&self) -> bool {
        self.flags.contains(TypeFlags::COMPARABLE)
    }

    /// Check if a default value can be constructed.
    pub fn is_defaultable(&self) -> bool {
        self.flags.contains(TypeFlags::DEFAULTABLE)
    }

    /// Check if this is the void descriptor.
    pub fn is_void(&self) -> bool {
        self.category == TypeCategory::Void
    }

    /// Check if this is `const T&` for some `T`.
    pub fn is_const_reference(&self) -> bool {
        self.category == TypeCategory::Reference && self.is_const()
    }

    /// The referenced type for pointer and reference descriptors.
    pub fn pointee(&self) -> Option<&'static TypeDescriptor> {
        self.pointee
    }

    /// The scalar kind for built-in value types.
    pub fn primitive(&self) -> Option<PrimitiveKind> {
        self.primitive
    }

    /// Registered properties (classes only).
    pub fn properties(&self) -> &[Property] {
        &self.properties
    }

    /// Look up a property by name.
    pub fn property(&self, name: &str) -> Option<&Property> {
        self.properties.iter().find(|p| p.name() == name)
    }

    pub(crate) fn clone_value(&self, value: &ErasedValue) -> Result<Arc<ErasedValue>, ReflectError> {
        let clone = self.vtable.clone.ok_or_else(|| ReflectError::NotCopyable {
            type_name: self.name.clone(),
        })?;
        clone(value).ok_or_else(|| ReflectError::mismatch(self.name.clone(), "foreign value"))
    }
}

impl PartialEq for TypeDescriptor {
    fn eq(&self, other: &Self) -> bool {
        // pointer identity is the common case
        std::ptr::eq(self, other)
            || (self.type_id == other.type_id
                && self.category == other.category
                && self.is_const() == other.is_const())
    }
}

impl Eq for TypeDescriptor {}

impl Hash for TypeDescriptor {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.type_id.hash(state);
    }
}

impl fmt::Debug for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeDescriptor")
            .field("name", &self.name)
            .field("category", &self.category)
            .field("flags", &self.flags)
            .field("hash", &self.hash)
            .finish_non_exhaustive()
    }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}
