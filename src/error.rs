//! Error types for type-erased invocation.
//!
//! ```text
//! InvocationError
//! ├── ArityMismatch     - wrong number of arguments
//! ├── TypeMismatch      - no conversion rule for an argument
//! ├── Conversion        - a conversion rule failed on an argument's value
//! ├── ReturnMismatch    - a native call produced the wrong return type
//! ├── TargetUnavailable - the callable or its bound object is gone
//! ├── ReceiverBusy      - the bound object is already locked by a call
//! ├── InvalidState      - an invocation step was run out of order
//! └── FunctionNotFound  - no callable registered under a name
//! ```
//!
//! Every error except `ReturnMismatch` is detected before the native call
//! and guarantees the call did not happen.

use thiserror::Error;
use typebase_core::ReflectError;

use crate::invoke::InvocationState;

/// Errors produced while invoking a callable.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InvocationError {
    /// The argument count doesn't match the signature.
    #[error("expected {expected} arguments, got {actual}")]
    ArityMismatch { expected: usize, actual: usize },

    /// No legal conversion exists for an argument.
    #[error("argument {position}: expected {expected}, got {actual}")]
    TypeMismatch {
        position: usize,
        expected: String,
        actual: String,
    },

    /// A legal conversion failed for an argument's value.
    #[error("argument {position}: {source}")]
    Conversion {
        position: usize,
        #[source]
        source: ReflectError,
    },

    /// The native call returned a value of the wrong type.
    #[error("return value: expected {expected}, got {actual}")]
    ReturnMismatch { expected: String, actual: String },

    /// The callable, or the object it is bound to, no longer exists.
    #[error("call target {target} is no longer available")]
    TargetUnavailable { target: String },

    /// The bound object is locked by a call in progress, or an argument
    /// aliases it.
    #[error("call target {target} is busy")]
    ReceiverBusy { target: String },

    /// A step was run in the wrong state.
    #[error("cannot {step} an invocation in state {state}")]
    InvalidState {
        step: &'static str,
        state: InvocationState,
    },

    /// No callable is registered under this name.
    #[error("function not found: {0}")]
    FunctionNotFound(String),
}

impl InvocationError {
    /// Attribute a conversion failure to an argument position.
    pub fn argument(position: usize, error: ReflectError) -> Self {
        match error {
            ReflectError::TypeMismatch { expected, actual } => InvocationError::TypeMismatch {
                position,
                expected,
                actual,
            },
            ReflectError::TargetUnavailable { type_name } => {
                InvocationError::TargetUnavailable { target: type_name }
            }
            ReflectError::Busy { type_name } => InvocationError::ReceiverBusy { target: type_name },
            source => InvocationError::Conversion { position, source },
        }
    }
}
