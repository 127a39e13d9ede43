//! Error types for the reflection core.
//!
//! ```text
//! ReflectError
//! ├── UnsupportedType    - no descriptor registered under a name
//! ├── TypeMismatch       - extraction/conversion outside the legal rules
//! ├── TargetUnavailable  - a pointer's target no longer exists
//! ├── Busy               - a reference's target is locked by an active call
//! ├── NotCopyable        - a copy was required but the type has no clone
//! ├── NotConstructible   - dynamic construction of a type without a default
//! ├── Incomparable       - equality requested on a type without comparison
//! ├── UnknownProperty / ReadOnlyProperty
//! ├── AlreadyInitialized - the global registry was configured twice
//! └── Conversion         - a legal conversion failed on the actual value
//! ```
//!
//! All of these are local, recoverable conditions. An operation that fails
//! leaves its receiver exactly as it was.

use thiserror::Error;

/// Errors raised while applying a conversion rule to a concrete value.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConversionError {
    /// An integer value does not fit in the target type.
    #[error("integer overflow: {value} doesn't fit in {target_type}")]
    IntegerOverflow {
        /// The offending value, formatted.
        value: String,
        /// The target type name.
        target_type: &'static str,
    },

    /// A float is not representable in the target type.
    #[error("float {value} cannot be represented as {target_type}")]
    FloatConversion {
        /// The offending value.
        value: f64,
        /// The target type name.
        target_type: &'static str,
    },

    /// A string could not be parsed into the target type.
    #[error("cannot parse {input:?} as {target_type}")]
    InvalidLiteral {
        /// The input string.
        input: String,
        /// The target type name.
        target_type: &'static str,
    },

    /// A registered custom conversion rejected the value.
    #[error("{0}")]
    Custom(String),
}

/// Errors produced by descriptors, variants, dynamic objects and the registry.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ReflectError {
    /// No descriptor exists for the requested type name.
    #[error("unsupported type: {name}")]
    UnsupportedType {
        /// The name that was looked up.
        name: String,
    },

    /// The stored type cannot be used as the requested type.
    #[error("type mismatch: expected {expected}, got {actual}")]
    TypeMismatch {
        /// The requested type.
        expected: String,
        /// The stored type.
        actual: String,
    },

    /// The object a pointer refers to has been dropped.
    #[error("target of {type_name} is no longer available")]
    TargetUnavailable {
        /// The pointer type name.
        type_name: String,
    },

    /// The object behind a reference is locked by a call in progress.
    #[error("target of {type_name} is locked by an active call")]
    Busy {
        /// The handle type name.
        type_name: String,
    },

    /// A copy was required but the type does not support cloning.
    #[error("type {type_name} is not copyable")]
    NotCopyable {
        /// The type name.
        type_name: String,
    },

    /// The type has no default constructor registered.
    #[error("type {type_name} cannot be constructed dynamically")]
    NotConstructible {
        /// The type name.
        type_name: String,
    },

    /// Values of this type cannot be compared.
    #[error("values of type {type_name} cannot be compared")]
    Incomparable {
        /// The type name.
        type_name: String,
    },

    /// The class has no property with this name.
    #[error("type {type_name} has no property '{property}'")]
    UnknownProperty {
        /// The class name.
        type_name: String,
        /// The property name.
        property: String,
    },

    /// The property has no setter.
    #[error("property '{property}' of {type_name} is read-only")]
    ReadOnlyProperty {
        /// The class name.
        type_name: String,
        /// The property name.
        property: String,
    },

    /// The global registry was already created when configuration was attempted.
    #[error("type registry is already initialized")]
    AlreadyInitialized,

    /// A legal conversion failed for the actual value.
    #[error("conversion from {from} to {to} failed: {source}")]
    Conversion {
        /// Source type name.
        from: String,
        /// Target type name.
        to: String,
        /// What went wrong.
        #[source]
        source: ConversionError,
    },
}

impl ReflectError {
    /// Build a type mismatch from two displayable type names.
    pub fn mismatch(expected: impl Into<String>, actual: impl Into<String>) -> Self {
        ReflectError::TypeMismatch {
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    /// Check if this is a type mismatch.
    pub fn is_type_mismatch(&self) -> bool {
        matches!(self, ReflectError::TypeMismatch { .. })
    }

    /// Check if this reports an unavailable target.
    pub fn is_target_unavailable(&self) -> bool {
        matches!(self, ReflectError::TargetUnavailable { .. })
    }
}
