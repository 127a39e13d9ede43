//! Conversion table between registered types.
//!
//! Every legal conversion is a single [`ConversionRule`] looked up by the
//! (source, target) descriptor pair. Rules are never chained: `int64` to
//! `const int&` is not legal even though `int64 -> int` and
//! `int -> const int&` both are.
//!
//! A conversion registered with
//! [`TypeRegistry::register_conversion`] takes precedence over the built-in
//! rule for the same pair, and applies whatever the configuration says
//! about that built-in rule.
//!
//! Scalar rules go through a widened intermediate (`i128` for
//! integers, `f64` for floats), and are range checked on the way out.
//!
//! # Example
//!
//! ```
//! use typebase_core::{Variant, descriptor_for};
//!
//! let wide = Variant::new(300i64);
//! let ok = wide.convert_to(descriptor_for::<i32>()).unwrap();
//! assert_eq!(ok.get::<i32>().unwrap(), 300);
//!
//! // narrowing is checked
//! assert!(wide.convert_to(descriptor_for::<i8>()).is_err());
//!
//! let text = Variant::new(String::from("2.5"));
//! let parsed = text.convert_to(descriptor_for::<f64>()).unwrap();
//! assert_eq!(parsed.get::<f64>().unwrap(), 2.5);
//! ```

use std::sync::Arc;

use crate::config::{ConversionProperty, RegistryConfig};
use crate::descriptor::{ErasedValue, PrimitiveKind, TypeCategory, TypeDescriptor};
use crate::error::{ConversionError, ReflectError};
use crate::registry::TypeRegistry;
use crate::variant::Variant;

/// One step of the conversion table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConversionRule {
    /// Same type.
    Identity,
    /// Numeric to numeric (widening, or checked narrowing).
    Numeric,
    /// `bool` to and from numbers.
    BoolNumeric,
    /// Primitive to `string`.
    Stringify,
    /// `string` to primitive.
    Parse,
    /// Copy the pointee out of `T&`, `const T&` or `T*`.
    Deref,
    /// `T*` to `T&`.
    Upgrade,
    /// `T&` to `T*`.
    Downgrade,
    /// `T` to `const T&`, sharing the source value.
    BindConst,
    /// Registered user conversion.
    Custom,
}

impl ConversionRule {
    /// Check if the rule may lose information or fail on some values.
    pub fn is_checked(self) -> bool {
        matches!(
            self,
            ConversionRule::Numeric
                | ConversionRule::BoolNumeric
                | ConversionRule::Parse
                | ConversionRule::Custom
        )
    }
}

/// Find the rule converting `from` into `to`, if any.
pub fn conversion_rule(
    from: &TypeDescriptor,
    to: &TypeDescriptor,
    config: &RegistryConfig,
) -> Option<ConversionRule> {
    if from == to {
        return Some(ConversionRule::Identity);
    }
    // registered conversions replace the built-in rule for their pair
    if TypeRegistry::global().custom_conversion(from, to).is_some() {
        return Some(ConversionRule::Custom);
    }
    if let (Some(src), Some(dst)) = (from.primitive(), to.primitive()) {
        return scalar_rule(src, dst, config);
    }
    handle_rule(from, to, config)
}

fn scalar_rule(
    src: PrimitiveKind,
    dst: PrimitiveKind,
    config: &RegistryConfig,
) -> Option<ConversionRule> {
    let gate = |property: ConversionProperty, rule: ConversionRule| {
        config.get(property).then_some(rule)
    };

    if src.is_numeric() && dst.is_numeric() {
        if src.widens_to(dst) {
            return Some(ConversionRule::Numeric);
        }
        if src.is_float() && dst.is_integer() {
            return gate(ConversionProperty::FloatToInteger, ConversionRule::Numeric);
        }
        return gate(ConversionProperty::NumericNarrowing, ConversionRule::Numeric);
    }
    match (src, dst) {
        (PrimitiveKind::Bool, d) if d.is_numeric() => {
            gate(ConversionProperty::BoolNumeric, ConversionRule::BoolNumeric)
        }
        (s, PrimitiveKind::Bool) if s.is_numeric() => {
            gate(ConversionProperty::BoolNumeric, ConversionRule::BoolNumeric)
        }
        (_, PrimitiveKind::String) => {
            gate(ConversionProperty::StringFormatting, ConversionRule::Stringify)
        }
        (PrimitiveKind::String, _) => gate(ConversionProperty::StringParsing, ConversionRule::Parse),
        _ => None,
    }
}

fn handle_rule(
    from: &TypeDescriptor,
    to: &TypeDescriptor,
    config: &RegistryConfig,
) -> Option<ConversionRule> {
    let points_to = |handle: &TypeDescriptor, target: &TypeDescriptor| {
        handle.pointee().is_some_and(|p| p == target)
    };
    let same_pointee = match (from.pointee(), to.pointee()) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    };

    match (from.category(), to.category()) {
        (TypeCategory::Pointer | TypeCategory::Reference, _)
            if points_to(from, to) && to.is_copyable() =>
        {
            Some(ConversionRule::Deref)
        }
        (TypeCategory::Pointer, TypeCategory::Reference) if same_pointee && !to.is_const() => {
            Some(ConversionRule::Upgrade)
        }
        (TypeCategory::Reference, TypeCategory::Pointer) if same_pointee && !from.is_const() => {
            Some(ConversionRule::Downgrade)
        }
        (_, TypeCategory::Reference)
            if to.is_const()
                && points_to(to, from)
                && config.get(ConversionProperty::BindConstReference) =>
        {
            Some(ConversionRule::BindConst)
        }
        _ => None,
    }
}

/// Convert `value` to `target` with an explicit configuration.
///
/// The empty variant only converts to `void`. On failure `value` is left as
/// it was.
#[cfg_attr(feature = "profiling", profiling::function)]
pub fn convert_with(
    value: &Variant,
    target: &'static TypeDescriptor,
    config: &RegistryConfig,
) -> Result<Variant, ReflectError> {
    let (Some(from), Some(storage)) = (value.descriptor(), value.storage()) else {
        if target.is_void() {
            return Ok(Variant::empty());
        }
        return Err(ReflectError::mismatch(target.name(), "void"));
    };

    let rule = conversion_rule(from, target, config)
        .ok_or_else(|| ReflectError::mismatch(target.name(), from.name()))?;
    let failed = |source: ConversionError| ReflectError::Conversion {
        from: from.name().to_string(),
        to: target.name().to_string(),
        source,
    };

    let converted: Arc<ErasedValue> = match rule {
        ConversionRule::Identity => return Ok(value.clone()),
        ConversionRule::Numeric | ConversionRule::BoolNumeric | ConversionRule::Parse => {
            let (Some(src), Some(dst)) = (from.primitive(), target.primitive()) else {
                return Err(ReflectError::mismatch(target.name(), from.name()));
            };
            let scalar = Scalar::read(src, &**storage)
                .ok_or_else(|| ReflectError::mismatch(src.name(), "foreign value"))?;
            scalar.into_kind(dst).map_err(failed)?
        }
        ConversionRule::Stringify => {
            let text = from
                .primitive()
                .and_then(|src| format_primitive(src, &**storage))
                .ok_or_else(|| ReflectError::mismatch(from.name(), "foreign value"))?;
            Arc::new(text)
        }
        ConversionRule::Deref => handle_op(from.handle.read, from, target, storage)?,
        ConversionRule::Upgrade => handle_op(from.handle.upgrade, from, target, storage)?,
        ConversionRule::Downgrade => handle_op(from.handle.downgrade, from, target, storage)?,
        ConversionRule::BindConst => target
            .handle
            .bind
            .and_then(|bind| bind(Arc::clone(storage)))
            .ok_or_else(|| ReflectError::mismatch(target.name(), from.name()))?,
        ConversionRule::Custom => {
            let convert = TypeRegistry::global()
                .custom_conversion(from, target)
                .ok_or_else(|| ReflectError::mismatch(target.name(), from.name()))?;
            convert(&**storage).map_err(failed)?
        }
    };
    Ok(Variant::from_parts(target, converted))
}

fn handle_op(
    op: Option<crate::descriptor::HandleFn>,
    from: &TypeDescriptor,
    target: &TypeDescriptor,
    storage: &Arc<ErasedValue>,
) -> Result<Arc<ErasedValue>, ReflectError> {
    let op = op.ok_or_else(|| ReflectError::mismatch(target.name(), from.name()))?;
    op(&**storage)
}

/// Widened scalar value.
#[derive(Debug, Clone, PartialEq)]
enum Scalar {
    Bool(bool),
    Int(i128),
    Float(f64),
    Str(String),
}

macro_rules! read_as {
    ($value:expr, $ty:ty, $variant:ident) => {
        $value.downcast_ref::<$ty>().map(|v| Scalar::$variant((*v).into()))
    };
}

impl Scalar {
    fn read(kind: PrimitiveKind, value: &ErasedValue) -> Option<Scalar> {
        match kind {
            PrimitiveKind::Bool => read_as!(value, bool, Bool),
            PrimitiveKind::Int8 => read_as!(value, i8, Int),
            PrimitiveKind::Int16 => read_as!(value, i16, Int),
            PrimitiveKind::Int32 => read_as!(value, i32, Int),
            PrimitiveKind::Int64 => read_as!(value, i64, Int),
            PrimitiveKind::UInt8 => read_as!(value, u8, Int),
            PrimitiveKind::UInt16 => read_as!(value, u16, Int),
            PrimitiveKind::UInt32 => read_as!(value, u32, Int),
            PrimitiveKind::UInt64 => read_as!(value, u64, Int),
            PrimitiveKind::Float => read_as!(value, f32, Float),
            PrimitiveKind::Double => read_as!(value, f64, Float),
            PrimitiveKind::String => value.downcast_ref::<String>().map(|s| Scalar::Str(s.clone())),
        }
    }

    fn into_kind(self, kind: PrimitiveKind) -> Result<Arc<ErasedValue>, ConversionError> {
        let value: Arc<ErasedValue> = match kind {
            PrimitiveKind::Bool => Arc::new(self.into_bool()?),
            PrimitiveKind::Int8 => Arc::new(self.into_integer::<i8>(kind)?),
            PrimitiveKind::Int16 => Arc::new(self.into_integer::<i16>(kind)?),
            PrimitiveKind::Int32 => Arc::new(self.into_integer::<i32>(kind)?),
            PrimitiveKind::Int64 => Arc::new(self.into_integer::<i64>(kind)?),
            PrimitiveKind::UInt8 => Arc::new(self.into_integer::<u8>(kind)?),
            PrimitiveKind::UInt16 => Arc::new(self.into_integer::<u16>(kind)?),
            PrimitiveKind::UInt32 => Arc::new(self.into_integer::<u32>(kind)?),
            PrimitiveKind::UInt64 => Arc::new(self.into_integer::<u64>(kind)?),
            PrimitiveKind::Float => Arc::new(self.into_f32()?),
            PrimitiveKind::Double => Arc::new(self.into_f64()?),
            PrimitiveKind::String => return Err(ConversionError::Custom("not a scalar target".into())),
        };
        Ok(value)
    }

    fn into_bool(self) -> Result<bool, ConversionError> {
        match self {
            Scalar::Bool(b) => Ok(b),
            Scalar::Int(v) => Ok(v != 0),
            Scalar::Float(f) => Ok(f != 0.0),
            Scalar::Str(s) => match s.trim() {
                "true" | "1" => Ok(true),
                "false" | "0" => Ok(false),
                _ => Err(invalid(s.clone(), PrimitiveKind::Bool)),
            },
        }
    }

    fn into_integer<I>(self, kind: PrimitiveKind) -> Result<I, ConversionError>
    where
        I: TryFrom<i128>,
    {
        let overflow = |v: i128| ConversionError::IntegerOverflow {
            value: v.to_string(),
            target_type: kind.name(),
        };
        match self {
            Scalar::Bool(b) => I::try_from(i128::from(b)).map_err(|_| overflow(i128::from(b))),
            Scalar::Int(v) => I::try_from(v).map_err(|_| overflow(v)),
            Scalar::Float(f) => {
                let out_of_range = ConversionError::FloatConversion {
                    value: f,
                    target_type: kind.name(),
                };
                if !f.is_finite() {
                    return Err(out_of_range);
                }
                // `as` saturates; try_from rejects anything outside I
                I::try_from(f.trunc() as i128).map_err(|_| out_of_range)
            }
            Scalar::Str(s) => {
                let parsed = s
                    .trim()
                    .parse::<i128>()
                    .map_err(|_| invalid(s.clone(), kind))?;
                I::try_from(parsed).map_err(|_| overflow(parsed))
            }
        }
    }

    fn into_f32(self) -> Result<f32, ConversionError> {
        match self {
            Scalar::Float(f) if f.is_finite() && f.abs() > f64::from(f32::MAX) => {
                Err(ConversionError::FloatConversion {
                    value: f,
                    target_type: PrimitiveKind::Float.name(),
                })
            }
            Scalar::Float(f) => Ok(f as f32),
            Scalar::Str(s) => s
                .trim()
                .parse::<f32>()
                .map_err(|_| invalid(s.clone(), PrimitiveKind::Float)),
            Scalar::Int(v) if (v as f32) as i128 != v => Err(inexact(v, PrimitiveKind::Float)),
            other => other.into_f64().map(|f| f as f32),
        }
    }

    fn into_f64(self) -> Result<f64, ConversionError> {
        match self {
            Scalar::Bool(b) => Ok(if b { 1.0 } else { 0.0 }),
            // integers past the mantissa must land on a representable value
            Scalar::Int(v) if (v as f64) as i128 != v => Err(inexact(v, PrimitiveKind::Double)),
            Scalar::Int(v) => Ok(v as f64),
            Scalar::Float(f) => Ok(f),
            Scalar::Str(s) => s
                .trim()
                .parse::<f64>()
                .map_err(|_| invalid(s.clone(), PrimitiveKind::Double)),
        }
    }
}

fn inexact(value: i128, kind: PrimitiveKind) -> ConversionError {
    ConversionError::IntegerOverflow {
        value: value.to_string(),
        target_type: kind.name(),
    }
}

fn invalid(input: String, kind: PrimitiveKind) -> ConversionError {
    ConversionError::InvalidLiteral {
        input,
        target_type: kind.name(),
    }
}

macro_rules! format_as {
    ($value:expr, $ty:ty) => {
        $value.downcast_ref::<$ty>().map(|v| v.to_string())
    };
}

fn format_primitive(kind: PrimitiveKind, value: &ErasedValue) -> Option<String> {
    match kind {
        PrimitiveKind::Bool => format_as!(value, bool),
        PrimitiveKind::Int8 => format_as!(value, i8),
        PrimitiveKind::Int16 => format_as!(value, i16),
        PrimitiveKind::Int32 => format_as!(value, i32),
        PrimitiveKind::Int64 => format_as!(value, i64),
        PrimitiveKind::UInt8 => format_as!(value, u8),
        PrimitiveKind::UInt16 => format_as!(value, u16),
        PrimitiveKind::UInt32 => format_as!(value, u32),
        PrimitiveKind::UInt64 => format_as!(value, u64),
        PrimitiveKind::Float => format_as!(value, f32),
        PrimitiveKind::Double => format_as!(value, f64),
        PrimitiveKind::String => format_as!(value, String),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ConstRef, Ptr, Reflect, Ref, TypeBuilder, descriptor_for, reflect_class};

    #[derive(Clone, PartialEq, Debug)]
    struct Meters(f64);

    reflect_class!(Meters, "ConvertTestMeters", cloneable, comparable);

    struct Engine;

    impl Reflect for Engine {
        fn describe() -> TypeBuilder<Self> {
            TypeBuilder::class("ConvertTestEngine")
        }
    }

    fn convert<T: Reflect>(value: &Variant) -> Result<Variant, ReflectError> {
        convert_with(value, descriptor_for::<T>(), &RegistryConfig::default())
    }

    fn rule<A: Reflect, B: Reflect>(config: &RegistryConfig) -> Option<ConversionRule> {
        conversion_rule(descriptor_for::<A>(), descriptor_for::<B>(), config)
    }

    #[test]
    fn rule_lookup() {
        let config = RegistryConfig::default();
        assert_eq!(rule::<i32, i32>(&config), Some(ConversionRule::Identity));
        assert_eq!(rule::<i8, i64>(&config), Some(ConversionRule::Numeric));
        assert_eq!(rule::<f64, u8>(&config), Some(ConversionRule::Numeric));
        assert_eq!(rule::<bool, f32>(&config), Some(ConversionRule::BoolNumeric));
        assert_eq!(rule::<u16, String>(&config), Some(ConversionRule::Stringify));
        assert_eq!(rule::<String, bool>(&config), Some(ConversionRule::Parse));
        assert_eq!(rule::<Ref<i32>, i32>(&config), Some(ConversionRule::Deref));
        assert_eq!(rule::<ConstRef<i32>, i32>(&config), Some(ConversionRule::Deref));
        assert_eq!(rule::<Ptr<i32>, Ref<i32>>(&config), Some(ConversionRule::Upgrade));
        assert_eq!(rule::<Ref<i32>, Ptr<i32>>(&config), Some(ConversionRule::Downgrade));
        assert_eq!(rule::<i32, ConstRef<i32>>(&config), Some(ConversionRule::BindConst));

        assert_eq!(rule::<i32, Ref<i32>>(&config), None);
        assert_eq!(rule::<i64, ConstRef<i32>>(&config), None);
        assert_eq!(rule::<Engine, i32>(&config), None);
        assert_eq!(rule::<Ptr<Engine>, Engine>(&config), None);
    }

    #[test]
    fn strict_config_disables_lossy_rules() {
        let config = RegistryConfig::strict();
        assert_eq!(rule::<i8, i64>(&config), Some(ConversionRule::Numeric));
        assert_eq!(rule::<i64, i8>(&config), None);
        assert_eq!(rule::<f32, i32>(&config), None);
        assert_eq!(rule::<bool, i32>(&config), None);
        assert_eq!(rule::<String, i32>(&config), None);
        assert_eq!(rule::<i32, String>(&config), None);
        assert_eq!(rule::<i32, ConstRef<i32>>(&config), Some(ConversionRule::BindConst));
    }

    #[test]
    fn numeric_narrowing_is_checked() {
        let ok = convert::<u8>(&Variant::new(255i32)).unwrap();
        assert_eq!(ok.get::<u8>().unwrap(), 255);

        let err = convert::<u8>(&Variant::new(256i32)).unwrap_err();
        assert_eq!(
            err,
            ReflectError::Conversion {
                from: "int".into(),
                to: "uint8".into(),
                source: ConversionError::IntegerOverflow {
                    value: "256".into(),
                    target_type: "uint8",
                },
            }
        );

        assert!(convert::<u32>(&Variant::new(-1i64)).is_err());
        assert_eq!(
            convert::<i64>(&Variant::new(u32::MAX)).unwrap().get::<i64>().unwrap(),
            i64::from(u32::MAX)
        );
    }

    #[test]
    fn float_to_integer_truncates() {
        let v = convert::<i32>(&Variant::new(-7.9f64)).unwrap();
        assert_eq!(v.get::<i32>().unwrap(), -7);

        assert!(matches!(
            convert::<i8>(&Variant::new(1000.0f32)),
            Err(ReflectError::Conversion {
                source: ConversionError::FloatConversion { .. },
                ..
            })
        ));
        assert!(convert::<i32>(&Variant::new(f64::NAN)).is_err());
    }

    #[test]
    fn double_to_float_range() {
        let v = convert::<f32>(&Variant::new(0.5f64)).unwrap();
        assert_eq!(v.get::<f32>().unwrap(), 0.5);
        assert!(convert::<f32>(&Variant::new(1e300f64)).is_err());
    }

    #[test]
    fn integer_to_float_must_be_exact() {
        let exact = convert::<f64>(&Variant::new(9_007_199_254_740_992i64)).unwrap();
        assert_eq!(exact.get::<f64>().unwrap(), 9_007_199_254_740_992.0);

        let err = convert::<f64>(&Variant::new(9_007_199_254_740_993i64)).unwrap_err();
        assert_eq!(
            err,
            ReflectError::Conversion {
                from: "int64".into(),
                to: "double".into(),
                source: ConversionError::IntegerOverflow {
                    value: "9007199254740993".into(),
                    target_type: "double",
                },
            }
        );

        assert_eq!(convert::<f32>(&Variant::new(16_777_216i32)).unwrap(), Variant::new(16_777_216f32));
        assert!(convert::<f32>(&Variant::new(16_777_217i32)).is_err());
        assert_eq!(convert::<f32>(&Variant::new(u64::MAX / 2 + 1)).unwrap(), Variant::new((1u64 << 63) as f32));
    }

    #[test]
    fn bool_numeric() {
        assert_eq!(convert::<i32>(&Variant::new(true)).unwrap(), Variant::new(1i32));
        assert_eq!(convert::<bool>(&Variant::new(0.0f64)).unwrap(), Variant::new(false));
        assert_eq!(convert::<bool>(&Variant::new(-3i16)).unwrap(), Variant::new(true));
    }

    #[test]
    fn string_formatting_and_parsing() {
        let text = convert::<String>(&Variant::new(0.1f32)).unwrap();
        assert_eq!(text.get_ref::<String>().unwrap(), "0.1");
        let text = convert::<String>(&Variant::new(true)).unwrap();
        assert_eq!(text.get_ref::<String>().unwrap(), "true");

        let n = convert::<i16>(&Variant::new(String::from(" -12 "))).unwrap();
        assert_eq!(n.get::<i16>().unwrap(), -12);

        let err = convert::<i32>(&Variant::new(String::from("twelve"))).unwrap_err();
        assert!(matches!(
            err,
            ReflectError::Conversion {
                source: ConversionError::InvalidLiteral { .. },
                ..
            }
        ));
        assert!(convert::<u8>(&Variant::new(String::from("300"))).is_err());
    }

    #[test]
    fn deref_copies_the_pointee() {
        let target = Ref::new(Meters(2.0));
        let copy = convert::<Meters>(&Variant::new(target.clone())).unwrap();
        target.write().0 = 5.0;
        assert_eq!(copy.get::<Meters>().unwrap(), Meters(2.0));
    }

    #[test]
    fn dangling_pointer_is_unavailable() {
        let target = Ref::new(1i32);
        let ptr = Variant::new(target.downgrade());
        assert_eq!(convert::<i32>(&ptr).unwrap().get::<i32>().unwrap(), 1);

        drop(target);
        let err = convert::<i32>(&ptr).unwrap_err();
        assert!(err.is_target_unavailable());
        let err = convert::<Ref<i32>>(&ptr).unwrap_err();
        assert!(err.is_target_unavailable());
    }

    #[test]
    fn upgrade_and_downgrade() {
        let target = Ref::new(String::from("shared"));
        let ptr = convert::<Ptr<String>>(&Variant::new(target.clone())).unwrap();
        let back = convert::<Ref<String>>(&ptr).unwrap();
        assert!(back.get_ref::<Ref<String>>().unwrap().ptr_eq(&target));
    }

    #[test]
    fn bind_const_aliases_storage() {
        let source = Variant::new(41i32);
        let bound = convert::<ConstRef<i32>>(&source).unwrap();
        let alias = bound.get_ref::<ConstRef<i32>>().unwrap();
        assert_eq!(**alias, 41);
        let stored = source.get_ref::<i32>().unwrap();
        assert!(std::ptr::eq(&**alias, stored));
    }

    #[test]
    fn no_rule_is_type_mismatch() {
        let err = convert::<i32>(&Variant::new(Meters(1.0))).unwrap_err();
        assert_eq!(err, ReflectError::mismatch("int", "ConvertTestMeters"));
    }

    #[test]
    fn empty_converts_only_to_void() {
        assert!(convert::<()>(&Variant::empty()).unwrap().is_empty());
        assert!(convert::<i32>(&Variant::empty()).is_err());
    }

    #[test]
    fn identity_shares_storage() {
        let v = Variant::new(String::from("same"));
        let out = convert::<String>(&v).unwrap();
        assert!(out.shares_storage_with(&v));
    }

    #[test]
    fn custom_conversion_is_single_step() {
        TypeRegistry::global().register_conversion::<Meters, f64, _>(|m| Ok(m.0));
        let config = RegistryConfig::default();

        let out = convert::<f64>(&Variant::new(Meters(3.5))).unwrap();
        assert_eq!(out.get::<f64>().unwrap(), 3.5);

        // Meters -> f64 -> f32 would need two steps
        assert_eq!(rule::<Meters, f32>(&config), None);
    }

    #[test]
    fn failing_custom_conversion() {
        #[derive(Clone)]
        struct Percent(i32);
        reflect_class!(Percent, "ConvertTestPercent", cloneable);

        TypeRegistry::global().register_conversion::<Percent, u8, _>(|p| {
            u8::try_from(p.0).map_err(|_| ConversionError::Custom(format!("{}% out of range", p.0)))
        });

        assert_eq!(convert::<u8>(&Variant::new(Percent(40))).unwrap(), Variant::new(40u8));
        let err = convert::<u8>(&Variant::new(Percent(-5))).unwrap_err();
        assert_eq!(err.to_string(), "conversion from ConvertTestPercent to uint8 failed: -5% out of range");
    }
}
