//! Native callables.
//!
//! [`Callable`] is the erased calling convention: an ordered `Vec<Variant>`
//! in, a [`Variant`] out. [`NativeFunction`] adapts strongly typed Rust
//! functions and closures of up to eight parameters to it, and
//! [`FunctionHandle`] is a weak handle to a callable owned elsewhere.
//!
//! Callables expect arguments that already have the parameter types; use
//! [`invoke`](crate::invoke) to convert arguments first.

use std::fmt;
use std::sync::{Arc, Weak};

use typebase_core::{Reflect, Variant};

use crate::error::InvocationError;
use crate::signature::FunctionSignature;

/// Erased native function body.
pub type NativeBody = dyn Fn(Vec<Variant>) -> Result<Variant, InvocationError> + Send + Sync;

/// Something that can be invoked with type-erased arguments.
pub trait Callable: Send + Sync {
    /// Shape of the callable.
    fn signature(&self) -> &FunctionSignature;

    /// Check if the callable (and anything it is bound to) still exists.
    fn is_available(&self) -> bool {
        true
    }

    /// Run the native code.
    ///
    /// `args` must match the signature exactly, in count and type.
    fn call_native(&self, args: Vec<Variant>) -> Result<Variant, InvocationError>;
}

/// A strongly typed Rust function behind the erased calling convention.
#[derive(Clone)]
pub struct NativeFunction {
    signature: FunctionSignature,
    inner: Arc<NativeBody>,
}

impl NativeFunction {
    /// Wrap a typed function or closure.
    ///
    /// ```
    /// use typebase::{NativeFunction, Variant, invoke};
    ///
    /// let add = NativeFunction::new("add", |a: i32, b: i32| a + b);
    /// assert_eq!(add.signature().to_string(), "int add(int, int)");
    ///
    /// let sum = invoke(&add, vec![Variant::new(2i32), Variant::new(3i32)]).unwrap();
    /// assert_eq!(sum.get::<i32>().unwrap(), 5);
    /// ```
    pub fn new<Args, F>(name: impl Into<String>, f: F) -> Self
    where
        F: IntoNativeFunction<Args>,
    {
        f.into_native(name.into())
    }

    /// Wrap an erased body with an explicit signature.
    ///
    /// The body receives arguments already converted to the signature.
    pub fn from_erased<F>(signature: FunctionSignature, body: F) -> Self
    where
        F: Fn(Vec<Variant>) -> Result<Variant, InvocationError> + Send + Sync + 'static,
    {
        Self {
            signature,
            inner: Arc::new(body),
        }
    }

    pub fn signature(&self) -> &FunctionSignature {
        &self.signature
    }
}

impl Callable for NativeFunction {
    fn signature(&self) -> &FunctionSignature {
        &self.signature
    }

    fn call_native(&self, args: Vec<Variant>) -> Result<Variant, InvocationError> {
        (self.inner)(args)
    }
}

impl fmt::Debug for NativeFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeFunction")
            .field("signature", &self.signature.to_string())
            .finish_non_exhaustive()
    }
}

/// Conversion of typed functions into [`NativeFunction`]s.
///
/// Implemented for `Fn(A, B, ..) -> R` with up to eight parameters, where
/// every parameter is `Reflect + Clone` and `R: Reflect`.
pub trait IntoNativeFunction<Args> {
    fn into_native(self, name: String) -> NativeFunction;
}

pub(crate) fn check_arity(expected: usize, args: &[Variant]) -> Result<(), InvocationError> {
    if args.len() == expected {
        Ok(())
    } else {
        Err(InvocationError::ArityMismatch {
            expected,
            actual: args.len(),
        })
    }
}

/// Sequential reader over exactly-typed arguments.
pub(crate) struct ArgReader {
    args: std::vec::IntoIter<Variant>,
    expected: usize,
    position: usize,
}

impl ArgReader {
    pub(crate) fn new(args: Vec<Variant>, expected: usize) -> Result<Self, InvocationError> {
        check_arity(expected, &args)?;
        Ok(Self {
            args: args.into_iter(),
            expected,
            position: 0,
        })
    }

    /// Take the next argument, which must already have type `T`.
    pub(crate) fn next<T: Reflect + Clone>(&mut self) -> Result<T, InvocationError> {
        let position = self.position;
        let value = self.args.next().ok_or(InvocationError::ArityMismatch {
            expected: self.expected,
            actual: position,
        })?;
        self.position += 1;
        value
            .take::<T>()
            .map_err(|err| InvocationError::argument(position, err))
    }
}

macro_rules! impl_into_native_function {
    ($($arg:ident),*) => {
        impl<Func, Ret, $($arg,)*> IntoNativeFunction<($($arg,)*)> for Func
        where
            Func: Fn($($arg),*) -> Ret + Send + Sync + 'static,
            Ret: Reflect,
            $($arg: Reflect + Clone,)*
        {
            #[allow(non_snake_case, unused_mut, unused_variables)]
            fn into_native(self, name: String) -> NativeFunction {
                let parameters = vec![$(<$arg as Reflect>::descriptor()),*];
                let arity = parameters.len();
                let signature = FunctionSignature::new(name, parameters, Ret::descriptor());
                NativeFunction::from_erased(signature, move |args: Vec<Variant>| {
                    let mut reader = ArgReader::new(args, arity)?;
                    $(let $arg: $arg = reader.next()?;)*
                    Ok(Variant::new((self)($($arg),*)))
                })
            }
        }
    };
}

impl_into_native_function!();
impl_into_native_function!(A1);
impl_into_native_function!(A1, A2);
impl_into_native_function!(A1, A2, A3);
impl_into_native_function!(A1, A2, A3, A4);
impl_into_native_function!(A1, A2, A3, A4, A5);
impl_into_native_function!(A1, A2, A3, A4, A5, A6);
impl_into_native_function!(A1, A2, A3, A4, A5, A6, A7);
impl_into_native_function!(A1, A2, A3, A4, A5, A6, A7, A8);

/// Weak handle to a callable owned elsewhere.
///
/// Calling through the handle after the callable was dropped fails with
/// [`InvocationError::TargetUnavailable`].
#[derive(Clone)]
pub struct FunctionHandle {
    signature: FunctionSignature,
    callable: Weak<dyn Callable>,
}

impl FunctionHandle {
    pub fn new(callable: &Arc<dyn Callable>) -> Self {
        Self {
            signature: callable.signature().clone(),
            callable: Arc::downgrade(callable),
        }
    }

    pub fn upgrade(&self) -> Option<Arc<dyn Callable>> {
        self.callable.upgrade()
    }
}

impl Callable for FunctionHandle {
    fn signature(&self) -> &FunctionSignature {
        &self.signature
    }

    fn is_available(&self) -> bool {
        self.upgrade().is_some_and(|callable| callable.is_available())
    }

    fn call_native(&self, args: Vec<Variant>) -> Result<Variant, InvocationError> {
        let callable = self.upgrade().ok_or_else(|| InvocationError::TargetUnavailable {
            target: self.signature.name().to_string(),
        })?;
        callable.call_native(args)
    }
}

impl fmt::Debug for FunctionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FunctionHandle")
            .field("signature", &self.signature.to_string())
            .field("alive", &(self.callable.strong_count() > 0))
            .finish()
    }
}
