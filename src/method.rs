//! Methods bound to a live object.
//!
//! A [`BoundMethod`] holds a weak [`Ptr`] to its receiver. The receiver is
//! locked for writing for the duration of each call; once every [`Ref`] to
//! it is gone the method reports itself unavailable and calls fail with
//! [`InvocationError::TargetUnavailable`].
//!
//! Taking the lock never blocks. A receiver that is already locked, for
//! example by a method of the same object further up the stack, fails the
//! call with [`InvocationError::ReceiverBusy`]. So does an argument that is
//! a `Ref` or `Ptr` to the receiver itself, since the method body could
//! only lock it again.

use std::fmt;
use std::sync::Arc;

use typebase_core::{Ptr, Ref, Reflect, Variant, descriptor_for};

use crate::error::InvocationError;
use crate::native_fn::{ArgReader, Callable};
use crate::signature::FunctionSignature;

type MethodBody<T> = dyn Fn(&mut T, Vec<Variant>) -> Result<Variant, InvocationError> + Send + Sync;

/// A native method and the object it is called on.
pub struct BoundMethod<T> {
    signature: FunctionSignature,
    target: Ptr<T>,
    inner: Arc<MethodBody<T>>,
}

impl<T: Reflect> BoundMethod<T> {
    /// Bind a typed method to `target`.
    ///
    /// The signature is named `Type::name` and lists the parameters after
    /// the receiver.
    pub fn new<Args, F>(target: &Ref<T>, name: &str, method: F) -> Self
    where
        F: IntoNativeMethod<T, Args>,
    {
        let name = format!("{}::{}", T::descriptor().name(), name);
        let (signature, inner) = method.into_method(name);
        Self {
            signature,
            target: target.downgrade(),
            inner,
        }
    }

    pub fn target(&self) -> &Ptr<T> {
        &self.target
    }

    /// Point the method at another object of the same type.
    pub fn rebind(&mut self, target: &Ref<T>) {
        self.target = target.downgrade();
    }

    fn aliases_target(&self, arg: &Variant) -> bool {
        if let Ok(handle) = arg.get_ref::<Ref<T>>() {
            return handle.downgrade().ptr_eq(&self.target);
        }
        arg.get_ref::<Ptr<T>>()
            .is_ok_and(|ptr| ptr.ptr_eq(&self.target))
    }
}

impl<T> Clone for BoundMethod<T> {
    fn clone(&self) -> Self {
        Self {
            signature: self.signature.clone(),
            target: self.target.clone(),
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: Reflect> Callable for BoundMethod<T> {
    fn signature(&self) -> &FunctionSignature {
        &self.signature
    }

    fn is_available(&self) -> bool {
        !self.target.is_dangling()
    }

    fn call_native(&self, args: Vec<Variant>) -> Result<Variant, InvocationError> {
        let target = self
            .target
            .upgrade()
            .ok_or_else(|| InvocationError::TargetUnavailable {
                target: descriptor_for::<Ptr<T>>().name().to_string(),
            })?;
        if args.iter().any(|arg| self.aliases_target(arg)) {
            return Err(busy::<T>());
        }
        let mut receiver = target.try_write().ok_or_else(busy::<T>)?;
        (self.inner)(&mut *receiver, args)
    }
}

fn busy<T: Reflect>() -> InvocationError {
    InvocationError::ReceiverBusy {
        target: descriptor_for::<Ref<T>>().name().to_string(),
    }
}

impl<T> fmt::Debug for BoundMethod<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoundMethod")
            .field("signature", &self.signature.to_string())
            .field("bound", &!self.target.is_dangling())
            .finish_non_exhaustive()
    }
}

/// Conversion of typed methods into erased method bodies.
///
/// Implemented for `Fn(&mut T, A, B, ..) -> R` with up to eight parameters
/// after the receiver.
pub trait IntoNativeMethod<T, Args> {
    #[doc(hidden)]
    fn into_method(self, name: String) -> (FunctionSignature, Arc<MethodBody<T>>);
}

macro_rules! impl_into_native_method {
    ($($arg:ident),*) => {
        impl<T, Func, Ret, $($arg,)*> IntoNativeMethod<T, ($($arg,)*)> for Func
        where
            T: 'static,
            Func: Fn(&mut T, $($arg),*) -> Ret + Send + Sync + 'static,
            Ret: Reflect,
            $($arg: Reflect + Clone,)*
        {
            #[allow(non_snake_case, unused_mut, unused_variables)]
            fn into_method(self, name: String) -> (FunctionSignature, Arc<MethodBody<T>>) {
                let parameters = vec![$(<$arg as Reflect>::descriptor()),*];
                let arity = parameters.len();
                let signature = FunctionSignature::new(name, parameters, Ret::descriptor());
                let body = move |receiver: &mut T, args: Vec<Variant>| -> Result<Variant, InvocationError> {
                    let mut reader = ArgReader::new(args, arity)?;
                    $(let $arg: $arg = reader.next()?;)*
                    Ok(Variant::new((self)(receiver, $($arg),*)))
                };
                (signature, Arc::new(body))
            }
        }
    };
}

impl_into_native_method!();
impl_into_native_method!(A1);
impl_into_native_method!(A1, A2);
impl_into_native_method!(A1, A2, A3);
impl_into_native_method!(A1, A2, A3, A4);
impl_into_native_method!(A1, A2, A3, A4, A5);
impl_into_native_method!(A1, A2, A3, A4, A5, A6);
impl_into_native_method!(A1, A2, A3, A4, A5, A6, A7);
impl_into_native_method!(A1, A2, A3, A4, A5, A6, A7, A8);

#[cfg(test)]
mod tests {
    use super::*;
    use typebase_core::TypeBuilder;

    #[derive(Debug, Clone, PartialEq)]
    struct Counter {
        value: i32,
    }

    impl Reflect for Counter {
        fn describe() -> TypeBuilder<Self> {
            TypeBuilder::class("MethodTestCounter").cloneable().comparable()
        }
    }

    #[test]
    fn call_mutates_receiver() {
        let counter = Ref::new(Counter { value: 1 });
        let add = BoundMethod::new(&counter, "add", |c: &mut Counter, by: i32| {
            c.value += by;
            c.value
        });
        assert_eq!(add.signature().to_string(), "int MethodTestCounter::add(int)");

        let out = add.call_native(vec![Variant::new(4i32)]).unwrap();
        assert_eq!(out.get::<i32>().unwrap(), 5);
        assert_eq!(counter.read().value, 5);
    }

    #[test]
    fn dropped_receiver_is_unavailable() {
        let counter = Ref::new(Counter { value: 0 });
        let reset = BoundMethod::new(&counter, "reset", |c: &mut Counter| c.value = 0);
        assert!(reset.is_available());

        drop(counter);
        assert!(!reset.is_available());
        assert_eq!(
            reset.call_native(vec![]).unwrap_err(),
            InvocationError::TargetUnavailable {
                target: "MethodTestCounter*".into()
            }
        );
    }

    #[test]
    fn locked_receiver_is_busy() {
        let counter = Ref::new(Counter { value: 1 });
        let get = BoundMethod::new(&counter, "get", |c: &mut Counter| c.value);

        let reader = counter.read();
        assert_eq!(
            get.call_native(vec![]).unwrap_err(),
            InvocationError::ReceiverBusy {
                target: "MethodTestCounter&".into()
            }
        );
        drop(reader);
        assert_eq!(get.call_native(vec![]).unwrap(), Variant::new(1i32));
    }

    #[test]
    fn argument_aliasing_receiver_is_busy() {
        let counter = Ref::new(Counter { value: 2 });
        let other = Ref::new(Counter { value: 3 });
        let add_ptr = BoundMethod::new(&counter, "add_ptr", |c: &mut Counter, p: Ptr<Counter>| {
            c.value += p.upgrade().map_or(0, |r| r.read().value);
            c.value
        });

        let err = add_ptr
            .call_native(vec![Variant::new(counter.downgrade())])
            .unwrap_err();
        assert!(matches!(err, InvocationError::ReceiverBusy { .. }));
        assert_eq!(counter.read().value, 2);

        let out = add_ptr.call_native(vec![Variant::new(other.downgrade())]).unwrap();
        assert_eq!(out, Variant::new(5i32));
    }

    #[test]
    fn rebind_moves_to_new_receiver() {
        let first = Ref::new(Counter { value: 1 });
        let second = Ref::new(Counter { value: 10 });
        let mut get = BoundMethod::new(&first, "get", |c: &mut Counter| c.value);
        assert_eq!(get.call_native(vec![]).unwrap(), Variant::new(1i32));

        get.rebind(&second);
        assert_eq!(get.call_native(vec![]).unwrap(), Variant::new(10i32));
    }
}
