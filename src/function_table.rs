//! Named callables for a scripting bridge.

use std::sync::Arc;

use rustc_hash::FxHashMap;
use typebase_core::Variant;

use crate::error::InvocationError;
use crate::invoke::invoke;
use crate::native_fn::{Callable, FunctionHandle};

/// Owns callables and looks them up by name.
///
/// The table holds the only strong reference to each callable it creates.
/// [`FunctionHandle`]s handed out by [`register`](Self::register) stop
/// working once the entry is unregistered or replaced.
#[derive(Default)]
pub struct FunctionTable {
    functions: FxHashMap<String, Arc<dyn Callable>>,
}

impl FunctionTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a callable under its signature name.
    ///
    /// An existing entry with the same name is replaced.
    pub fn register<C: Callable + 'static>(&mut self, callable: C) -> FunctionHandle {
        self.register_arc(Arc::new(callable))
    }

    /// Register a shared callable under its signature name.
    pub fn register_arc(&mut self, callable: Arc<dyn Callable>) -> FunctionHandle {
        let handle = FunctionHandle::new(&callable);
        let name = callable.signature().name().to_string();
        tracing::debug!(function = %callable.signature(), "registered function");
        if let Some(previous) = self.functions.insert(name, callable) {
            tracing::warn!(
                function = %previous.signature(),
                "function replaced; existing handles are now unavailable"
            );
        }
        handle
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn Callable>> {
        self.functions.get(name)
    }

    /// Weak handle to a registered callable.
    pub fn handle(&self, name: &str) -> Option<FunctionHandle> {
        self.functions.get(name).map(FunctionHandle::new)
    }

    /// Remove a callable. Handles to it become unavailable.
    pub fn unregister(&mut self, name: &str) -> Option<Arc<dyn Callable>> {
        self.functions.remove(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.functions.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Invoke a callable by name.
    pub fn call(&self, name: &str, args: Vec<Variant>) -> Result<Variant, InvocationError> {
        let callable = self
            .functions
            .get(name)
            .ok_or_else(|| InvocationError::FunctionNotFound(name.to_string()))?;
        invoke(callable.as_ref(), args)
    }
}

impl std::fmt::Debug for FunctionTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FunctionTable")
            .field("functions", &self.names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::native_fn::NativeFunction;

    #[test]
    fn call_by_name() {
        let mut table = FunctionTable::new();
        table.register(NativeFunction::new("max", |a: i32, b: i32| a.max(b)));
        table.register(NativeFunction::new("min", |a: i32, b: i32| a.min(b)));

        assert_eq!(table.names(), vec!["max", "min"]);
        let out = table
            .call("max", vec![Variant::new(3i32), Variant::new(9i16)])
            .unwrap();
        assert_eq!(out.get::<i32>().unwrap(), 9);
    }

    #[test]
    fn missing_function() {
        let table = FunctionTable::new();
        assert_eq!(
            table.call("nope", vec![]).unwrap_err(),
            InvocationError::FunctionNotFound("nope".into())
        );
    }

    #[test]
    fn replace_invalidates_old_handle() {
        let mut table = FunctionTable::new();
        let old = table.register(NativeFunction::new("answer", || 1i32));
        let new = table.register(NativeFunction::new("answer", || 42i32));

        assert_eq!(table.len(), 1);
        assert!(!old.is_available());
        assert_eq!(invoke(&new, vec![]).unwrap(), Variant::new(42i32));
    }

    #[test]
    fn unregister_invalidates_handle() {
        let mut table = FunctionTable::new();
        let handle = table.register(NativeFunction::new("ping", || true));
        assert!(table.contains("ping"));

        assert!(table.unregister("ping").is_some());
        assert!(table.is_empty());
        assert_eq!(
            invoke(&handle, vec![]).unwrap_err(),
            InvocationError::TargetUnavailable {
                target: "ping".into()
            }
        );
    }
}
