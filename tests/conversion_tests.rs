//! Conversion table and registry behavior seen from outside the crate.

use typebase::{
    ConstRef, ConversionError, ConversionProperty, ConversionRule, FunctionTable, InvocationError,
    NativeFunction, Ref, Reflect, ReflectError, RegistryConfig, TypeRegistry, Variant,
    conversion_rule, convert_with, descriptor_for,
};

#[derive(Debug, Clone, Copy, PartialEq, Reflect)]
#[reflect(name = "Celsius", clone, eq, debug)]
struct Celsius(f64);

#[derive(Debug, Clone, Copy, PartialEq, Reflect)]
#[reflect(name = "Fahrenheit", clone, eq, debug)]
struct Fahrenheit(f64);

fn register_temperature_conversions() {
    let registry = TypeRegistry::global();
    registry.register_conversion(|c: &Celsius| Ok(Fahrenheit(c.0 * 9.0 / 5.0 + 32.0)));
    registry.register_conversion(|f: &Fahrenheit| {
        if f.0 < -459.67 {
            return Err(ConversionError::Custom(format!("{} is below absolute zero", f.0)));
        }
        Ok(Celsius((f.0 - 32.0) * 5.0 / 9.0))
    });
}

#[test]
fn test_descriptor_identity() {
    assert!(std::ptr::eq(descriptor_for::<i32>(), descriptor_for::<i32>()));
    assert!(std::ptr::eq(
        descriptor_for::<ConstRef<Celsius>>(),
        descriptor_for::<ConstRef<Celsius>>()
    ));
    assert_ne!(descriptor_for::<i32>(), descriptor_for::<u32>());
    assert_ne!(descriptor_for::<Ref<Celsius>>(), descriptor_for::<ConstRef<Celsius>>());
}

#[test]
fn test_registry_lookup() {
    let registry = TypeRegistry::global();
    let desc = registry.register::<Celsius>();
    assert_eq!(registry.find("Celsius").unwrap(), desc);
    assert_eq!(registry.find_by_hash(desc.hash()), Some(desc));
    assert!(registry.contains("string"));
    assert!(matches!(
        registry.find("Kelvin"),
        Err(ReflectError::UnsupportedType { .. })
    ));
    assert!(matches!(
        registry.create("Celsius"),
        Err(ReflectError::NotConstructible { .. })
    ));
}

#[test]
fn test_custom_conversion_in_invocation() {
    register_temperature_conversions();

    let mut table = FunctionTable::new();
    table.register(NativeFunction::new("is_boiling", |f: Fahrenheit| f.0 >= 212.0));

    let hot = table.call("is_boiling", vec![Variant::new(Celsius(100.0))]).unwrap();
    assert!(hot.get::<bool>().unwrap());

    let cold = table.call("is_boiling", vec![Variant::new(Celsius(20.0))]).unwrap();
    assert!(!cold.get::<bool>().unwrap());
}

#[test]
fn test_custom_conversion_failure_carries_source() {
    register_temperature_conversions();

    let f = NativeFunction::new("kelvin", |c: Celsius| c.0 + 273.15);
    let param = f.signature().parameter(0).unwrap();
    let err = Variant::new(Fahrenheit(-500.0)).convert_to(param).unwrap_err();
    assert_eq!(
        err.to_string(),
        "conversion from Fahrenheit to Celsius failed: -500 is below absolute zero"
    );

    let err = typebase::invoke(&f, vec![Variant::new(Fahrenheit(-500.0))]).unwrap_err();
    assert!(matches!(err, InvocationError::Conversion { position: 0, .. }));
}

#[test]
fn test_conversions_do_not_chain() {
    register_temperature_conversions();
    let config = RegistryConfig::default();

    // Celsius -> Fahrenheit is registered, Fahrenheit -> f64 is not
    assert_eq!(
        conversion_rule(descriptor_for::<Celsius>(), descriptor_for::<f64>(), &config),
        None
    );
    // int64 -> int and int -> const int& exist, but not in one step
    assert_eq!(
        conversion_rule(descriptor_for::<i64>(), descriptor_for::<ConstRef<i32>>(), &config),
        None
    );
    assert_eq!(
        conversion_rule(descriptor_for::<i32>(), descriptor_for::<ConstRef<i32>>(), &config),
        Some(ConversionRule::BindConst)
    );
}

#[test]
fn test_strict_config_rejects_lossy_rules() {
    let strict = RegistryConfig::strict();
    let narrow = Variant::new(5i64);

    assert!(
        convert_with(&narrow, descriptor_for::<i32>(), &strict)
            .unwrap_err()
            .is_type_mismatch()
    );
    let widened = convert_with(&Variant::new(5i32), descriptor_for::<i64>(), &strict).unwrap();
    assert_eq!(widened.get::<i64>().unwrap(), 5);

    let parse_only = RegistryConfig::default().with(ConversionProperty::StringFormatting, false);
    assert!(convert_with(&Variant::new(1.5f32), descriptor_for::<String>(), &parse_only).is_err());
    let parsed = convert_with(
        &Variant::new(String::from("true")),
        descriptor_for::<bool>(),
        &parse_only,
    )
    .unwrap();
    assert!(parsed.get::<bool>().unwrap());
}

#[test]
fn test_failed_conversion_leaves_source_untouched() {
    let source = Variant::new(-1i32);
    assert!(source.convert_to(descriptor_for::<u16>()).is_err());
    assert_eq!(source.get::<i32>().unwrap(), -1);
}

#[test]
fn test_custom_conversion_overrides_builtin_rule() {
    TypeRegistry::global().register_conversion::<bool, String, _>(|b| {
        Ok(String::from(if *b { "yes" } else { "no" }))
    });
    let text = descriptor_for::<String>();

    let out = Variant::new(true).convert_to(text).unwrap();
    assert_eq!(out.get::<String>().unwrap(), "yes");
    assert_eq!(
        conversion_rule(descriptor_for::<bool>(), text, &RegistryConfig::default()),
        Some(ConversionRule::Custom)
    );

    // the override still applies when the built-in rule is switched off
    let strict = RegistryConfig::strict();
    let out = convert_with(&Variant::new(false), text, &strict).unwrap();
    assert_eq!(out.get::<String>().unwrap(), "no");

    // other pairs keep their built-in rule
    let out = Variant::new(7u8).convert_to(text).unwrap();
    assert_eq!(out.get::<String>().unwrap(), "7");
}
