//! Deterministic hash-based type identity.
//!
//! [`TypeHash`] is a 64-bit hash of a canonical type name, or of a function
//! name plus its parameter hashes. It depends only on the input, so two
//! processes agree on it and it can be computed before a type is registered.
//!
//! ```
//! use typebase_core::TypeHash;
//!
//! assert_eq!(TypeHash::from_name("int"), TypeHash::from_name("int"));
//!
//! let f1 = TypeHash::from_function("scale", &[TypeHash::from_name("int")]);
//! let f2 = TypeHash::from_function("scale", &[TypeHash::from_name("float")]);
//! assert_ne!(f1, f2);
//! ```

use std::fmt;
use xxhash_rust::xxh64::xxh64;

// Domain seeds: a type and a function with the same name hash differently.
const TYPE_SEED: u64 = 0x2fac10b63a6cc57c;
const FUNCTION_SEED: u64 = 0x5ea77ffbcdf5f302;
const PARAM_SEED: u64 = 0x4bc94d6bd06053ad;

/// A deterministic 64-bit hash identifying a type or a callable shape.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct TypeHash(pub u64);

impl TypeHash {
    /// Hash of a canonical type name.
    #[inline]
    pub fn from_name(name: &str) -> Self {
        TypeHash(xxh64(name.as_bytes(), TYPE_SEED))
    }

    /// Hash of a function name and its ordered parameter hashes.
    pub fn from_function(name: &str, params: &[TypeHash]) -> Self {
        let mut hash = xxh64(name.as_bytes(), FUNCTION_SEED);
        for (position, param) in params.iter().enumerate() {
            // position-dependent, so (int, float) != (float, int)
            let marker = xxh64(&(position as u64).to_le_bytes(), PARAM_SEED);
            hash = hash.rotate_left(17) ^ marker.wrapping_mul(param.0 | 1);
        }
        TypeHash(hash)
    }

    #[inline]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Debug for TypeHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeHash({:#018x})", self.0)
    }
}

impl fmt::Display for TypeHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#018x}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handle_names_hash_apart() {
        let int = TypeHash::from_name("int");
        assert_ne!(int, TypeHash::from_name("int&"));
        assert_ne!(TypeHash::from_name("int&"), TypeHash::from_name("const int&"));
        assert_ne!(int, TypeHash::from_name("int*"));
    }

    #[test]
    fn parameter_order_matters() {
        let int = TypeHash::from_name("int");
        let string = TypeHash::from_name("string");
        assert_ne!(
            TypeHash::from_function("f", &[int, string]),
            TypeHash::from_function("f", &[string, int])
        );
    }

    #[test]
    fn repeated_parameters_count() {
        let int = TypeHash::from_name("int");
        let params = vec![int; 12];
        assert_ne!(
            TypeHash::from_function("wide", &params),
            TypeHash::from_function("wide", &params[..11])
        );
    }

    #[test]
    fn function_and_type_domains_differ() {
        assert_ne!(TypeHash::from_function("Vec3", &[]), TypeHash::from_name("Vec3"));
    }

    #[test]
    fn formatting() {
        let hash = TypeHash(0x1234);
        assert_eq!(hash.to_string(), "0x0000000000001234");
        assert_eq!(format!("{hash:?}"), "TypeHash(0x0000000000001234)");
    }
}
