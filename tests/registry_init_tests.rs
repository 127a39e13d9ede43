//! Global registry lifecycle.
//!
//! Runs as its own test binary with a single test, so nothing touches the
//! global registry before `init_global`.

use typebase::{
    ConversionProperty, InvocationError, NativeFunction, ReflectError, RegistryConfig,
    TypeRegistry, Variant, descriptor_for, invoke,
};

#[test]
fn test_init_global_once() {
    let registry = TypeRegistry::init_global(RegistryConfig::strict()).unwrap();
    assert!(!registry.config().get(ConversionProperty::NumericNarrowing));
    assert!(registry.config().get(ConversionProperty::BindConstReference));

    // the registry is never reinitialized
    assert_eq!(
        TypeRegistry::init_global(RegistryConfig::default()).unwrap_err(),
        ReflectError::AlreadyInitialized
    );
    assert!(std::ptr::eq(registry, TypeRegistry::global()));
    assert!(!TypeRegistry::global().config().get(ConversionProperty::StringParsing));

    // the strict table applies to invocation
    let f = NativeFunction::new("half", |x: i32| x / 2);
    assert_eq!(invoke(&f, vec![Variant::new(8i16)]).unwrap(), Variant::new(4i32));
    assert!(matches!(
        invoke(&f, vec![Variant::new(8i64)]),
        Err(InvocationError::TypeMismatch { position: 0, .. })
    ));
    assert!(
        Variant::new(String::from("8"))
            .convert_to(descriptor_for::<i32>())
            .is_err()
    );
}
