//! Type-erased invocation.
//!
//! An [`Invocation`] drives one call through its states:
//!
//! ```text
//! Idle ──bind──▶ ArgumentsBound ──convert──▶ Converting ──call──▶ Invoked ──box_result──▶ ResultBoxed
//!   │                  │                          │                  │
//!   └──────────────────┴────────── any error ─────┴──────────────────┴──▶ Failed
//! ```
//!
//! Arguments are converted with the registry's conversion table before the
//! native code runs. The first failing argument fails the invocation and the
//! native code is never reached. The native code runs at most once.

use std::fmt;
use std::mem;

use typebase_core::Variant;

use crate::error::InvocationError;
use crate::native_fn::Callable;

/// Where an [`Invocation`] currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvocationState {
    /// Nothing bound yet.
    Idle,
    /// Arguments accepted, arity checked.
    ArgumentsBound,
    /// Arguments converted to the parameter types.
    Converting,
    /// Native code ran.
    Invoked,
    /// Result handed to the caller.
    ResultBoxed,
    Failed,
}

impl InvocationState {
    /// Check if no further step can run.
    pub fn is_terminal(self) -> bool {
        matches!(self, InvocationState::ResultBoxed | InvocationState::Failed)
    }
}

impl fmt::Display for InvocationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            InvocationState::Idle => "idle",
            InvocationState::ArgumentsBound => "arguments-bound",
            InvocationState::Converting => "converting",
            InvocationState::Invoked => "invoked",
            InvocationState::ResultBoxed => "result-boxed",
            InvocationState::Failed => "failed",
        })
    }
}

/// One call of a [`Callable`], driven step by step.
pub struct Invocation<'a> {
    callable: &'a dyn Callable,
    state: InvocationState,
    arguments: Vec<Variant>,
    result: Variant,
}

impl<'a> Invocation<'a> {
    pub fn new(callable: &'a dyn Callable) -> Self {
        Self {
            callable,
            state: InvocationState::Idle,
            arguments: Vec::new(),
            result: Variant::empty(),
        }
    }

    pub fn state(&self) -> InvocationState {
        self.state
    }

    /// Accept the argument list.
    ///
    /// Fails with `ArityMismatch` when the count is wrong and with
    /// `TargetUnavailable` when the callable is gone.
    pub fn bind(&mut self, args: Vec<Variant>) -> Result<(), InvocationError> {
        self.require(InvocationState::Idle, "bind")?;
        let callable = self.callable;
        let signature = callable.signature();
        if args.len() != signature.parameter_count() {
            return Err(self.fail(InvocationError::ArityMismatch {
                expected: signature.parameter_count(),
                actual: args.len(),
            }));
        }
        if !callable.is_available() {
            return Err(self.fail(self.unavailable()));
        }
        self.arguments = args;
        self.transition(InvocationState::ArgumentsBound);
        Ok(())
    }

    /// Convert every argument to its parameter type.
    ///
    /// Stops at the first argument that can't be converted.
    pub fn convert(&mut self) -> Result<(), InvocationError> {
        self.require(InvocationState::ArgumentsBound, "convert")?;
        self.transition(InvocationState::Converting);

        let callable = self.callable;
        let parameters = callable.signature().parameters();
        let converted: Result<Vec<Variant>, InvocationError> = mem::take(&mut self.arguments)
            .into_iter()
            .zip(parameters)
            .enumerate()
            .map(|(position, (arg, &param))| {
                if arg.descriptor() == Some(param) {
                    return Ok(arg);
                }
                arg.convert_to(param)
                    .map_err(|err| InvocationError::argument(position, err))
            })
            .collect();

        match converted {
            Ok(arguments) => {
                self.arguments = arguments;
                Ok(())
            }
            Err(err) => Err(self.fail(err)),
        }
    }

    /// Run the native code with the converted arguments.
    pub fn call(&mut self) -> Result<(), InvocationError> {
        self.require(InvocationState::Converting, "call")?;
        if !self.callable.is_available() {
            return Err(self.fail(self.unavailable()));
        }
        let arguments = mem::take(&mut self.arguments);
        match self.callable.call_native(arguments) {
            Ok(result) => {
                self.result = result;
                self.transition(InvocationState::Invoked);
                Ok(())
            }
            Err(err) => Err(self.fail(err)),
        }
    }

    /// Hand out the result as the declared return type.
    ///
    /// A `void` callable always yields the empty variant.
    pub fn box_result(&mut self) -> Result<Variant, InvocationError> {
        self.require(InvocationState::Invoked, "box the result of")?;
        let return_type = self.callable.signature().return_type();
        let result = mem::take(&mut self.result);

        let boxed = if return_type.is_void() {
            Variant::empty()
        } else if result.descriptor() == Some(return_type) {
            result
        } else {
            match result.convert_to(return_type) {
                Ok(converted) => converted,
                Err(_) => {
                    return Err(self.fail(InvocationError::ReturnMismatch {
                        expected: return_type.name().to_string(),
                        actual: result.type_name().to_string(),
                    }));
                }
            }
        };

        self.transition(InvocationState::ResultBoxed);
        Ok(boxed)
    }

    fn require(&self, state: InvocationState, step: &'static str) -> Result<(), InvocationError> {
        if self.state == state {
            Ok(())
        } else {
            Err(InvocationError::InvalidState {
                step,
                state: self.state,
            })
        }
    }

    fn unavailable(&self) -> InvocationError {
        InvocationError::TargetUnavailable {
            target: self.callable.signature().name().to_string(),
        }
    }

    fn fail(&mut self, error: InvocationError) -> InvocationError {
        tracing::debug!(
            function = %self.callable.signature(),
            state = %self.state,
            error = %error,
            "invocation failed"
        );
        self.arguments.clear();
        self.state = InvocationState::Failed;
        error
    }

    fn transition(&mut self, next: InvocationState) {
        tracing::trace!(
            function = self.callable.signature().name(),
            from = %self.state,
            to = %next,
            "invocation state"
        );
        self.state = next;
    }
}

impl fmt::Debug for Invocation<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Invocation")
            .field("function", &self.callable.signature().to_string())
            .field("state", &self.state)
            .field("arguments", &self.arguments)
            .finish()
    }
}

/// Invoke `callable` with `args`, converting arguments and the result.
///
/// ```
/// use typebase::{NativeFunction, Variant, invoke};
///
/// let shout = NativeFunction::new("shout", |s: String, n: u32| s.to_uppercase().repeat(n as usize));
///
/// // "2" is parsed into the `uint` parameter
/// let out = invoke(&shout, vec![Variant::new(String::from("ab")), Variant::new(String::from("2"))]).unwrap();
/// assert_eq!(out.get::<String>().unwrap(), "ABAB");
/// ```
#[cfg_attr(feature = "profiling", profiling::function)]
pub fn invoke(callable: &dyn Callable, args: Vec<Variant>) -> Result<Variant, InvocationError> {
    let mut invocation = Invocation::new(callable);
    invocation.bind(args)?;
    invocation.convert()?;
    invocation.call()?;
    invocation.box_result()
}
