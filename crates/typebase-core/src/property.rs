//! Named class properties.
//!
//! A [`Property`] gives generic read/write access to one field of a class
//! value. Properties are attached to a class descriptor through
//! [`TypeBuilder::property`](crate::TypeBuilder::property) and are used by
//! [`DynamicObject::property`](crate::DynamicObject::property) and
//! [`DynamicObject::set_property`](crate::DynamicObject::set_property).

use std::fmt;
use std::sync::Arc;

use crate::descriptor::{ErasedValue, TypeDescriptor};
use crate::error::ReflectError;
use crate::variant::Variant;

pub(crate) type Getter = Arc<dyn Fn(&ErasedValue) -> Option<Variant> + Send + Sync>;
pub(crate) type Setter = Arc<dyn Fn(&mut ErasedValue, Variant) -> Result<(), ReflectError> + Send + Sync>;

/// One named, typed field of a class.
#[derive(Clone)]
pub struct Property {
    pub(crate) name: String,
    // resolved lazily so a class may hold handles to itself
    pub(crate) descriptor: fn() -> &'static TypeDescriptor,
    pub(crate) getter: Getter,
    pub(crate) setter: Option<Setter>,
}

impl Property {
    /// Property name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Descriptor of the property value.
    pub fn descriptor(&self) -> &'static TypeDescriptor {
        (self.descriptor)()
    }

    /// Check if the property can be written.
    pub fn is_writable(&self) -> bool {
        self.setter.is_some()
    }
}

impl fmt::Debug for Property {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Property")
            .field("name", &self.name)
            .field("type", &self.descriptor().name())
            .field("writable", &self.is_writable())
            .finish()
    }
}
