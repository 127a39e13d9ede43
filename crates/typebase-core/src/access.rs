//! Compatibility between a requested and a stored type.
//!
//! [`resolve`] decides how a [`DynamicObject`](crate::DynamicObject) serves a
//! typed request. Besides exact matches, two aliasing cases are legal:
//!
//! | requested    | stored       | result                        |
//! |--------------|--------------|-------------------------------|
//! | `T`          | `T`          | `Exact`                       |
//! | `const T&`   | `T`          | `RequestedIsConstRefOfStored` |
//! | `T`          | `const T&`   | `StoredIsConstRefOfRequested` |
//! | anything else|              | `Incompatible`                |

use crate::descriptor::TypeDescriptor;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compatibility {
    /// Requested and stored types are identical.
    Exact,
    /// The caller asks for `const T&` and a `T` is stored.
    RequestedIsConstRefOfStored,
    /// A `const T&` is stored and the caller asks for `T`.
    StoredIsConstRefOfRequested,
    Incompatible,
}

impl Compatibility {
    pub fn is_compatible(self) -> bool {
        self != Compatibility::Incompatible
    }

    /// Check if the request is served by aliasing rather than exact match.
    pub fn aliases(self) -> bool {
        matches!(
            self,
            Compatibility::RequestedIsConstRefOfStored | Compatibility::StoredIsConstRefOfRequested
        )
    }
}

/// Classify a request for `requested` against a stored `stored` value.
pub fn resolve(requested: &TypeDescriptor, stored: &TypeDescriptor) -> Compatibility {
    if requested == stored {
        Compatibility::Exact
    } else if requested.is_const_reference() && requested.pointee().is_some_and(|p| p == stored) {
        Compatibility::RequestedIsConstRefOfStored
    } else if stored.is_const_reference() && stored.pointee().is_some_and(|p| p == requested) {
        Compatibility::StoredIsConstRefOfRequested
    } else {
        Compatibility::Incompatible
    }
}
