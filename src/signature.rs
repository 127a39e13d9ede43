//! Callable shapes.

use std::fmt;

use typebase_core::{TypeDescriptor, TypeHash};

/// Name, ordered parameter types and return type of a callable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionSignature {
    name: String,
    parameters: Vec<&'static TypeDescriptor>,
    return_type: &'static TypeDescriptor,
}

impl FunctionSignature {
    pub fn new(
        name: impl Into<String>,
        parameters: Vec<&'static TypeDescriptor>,
        return_type: &'static TypeDescriptor,
    ) -> Self {
        Self {
            name: name.into(),
            parameters,
            return_type,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parameters(&self) -> &[&'static TypeDescriptor] {
        &self.parameters
    }

    pub fn parameter(&self, position: usize) -> Option<&'static TypeDescriptor> {
        self.parameters.get(position).copied()
    }

    pub fn parameter_count(&self) -> usize {
        self.parameters.len()
    }

    pub fn return_type(&self) -> &'static TypeDescriptor {
        self.return_type
    }

    /// Check if the callable returns nothing.
    pub fn is_void(&self) -> bool {
        self.return_type.is_void()
    }

    /// Identity of the name and parameter list. The return type is not part
    /// of it.
    pub fn hash(&self) -> TypeHash {
        let params: Vec<TypeHash> = self.parameters.iter().map(|p| p.hash()).collect();
        TypeHash::from_function(&self.name, &params)
    }
}

impl fmt::Display for FunctionSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}(", self.return_type, self.name)?;
        for (i, param) in self.parameters.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", param)?;
        }
        f.write_str(")")
    }
}
