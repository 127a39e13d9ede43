//! Conversion policy switches.
//!
//! Lossy and textual conversions can be disabled individually. The global
//! registry reads its [`RegistryConfig`] once, at creation; see
//! [`TypeRegistry::init_global`](crate::TypeRegistry::init_global).

use rustc_hash::FxHashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConversionProperty {
    /// Wider integer/float to narrower, range checked.
    NumericNarrowing,
    /// Float to integer, truncating, range checked.
    FloatToInteger,
    /// `bool` to and from numbers.
    BoolNumeric,
    /// `string` to primitives.
    StringParsing,
    /// Primitives to `string`.
    StringFormatting,
    /// `T` to `const T&` aliasing the source value.
    BindConstReference,
}

impl ConversionProperty {
    pub const ALL: [ConversionProperty; 6] = [
        ConversionProperty::NumericNarrowing,
        ConversionProperty::FloatToInteger,
        ConversionProperty::BoolNumeric,
        ConversionProperty::StringParsing,
        ConversionProperty::StringFormatting,
        ConversionProperty::BindConstReference,
    ];

    pub fn default_value(&self) -> bool {
        match self {
            ConversionProperty::NumericNarrowing => true,
            ConversionProperty::FloatToInteger => true,
            ConversionProperty::BoolNumeric => true,
            ConversionProperty::StringParsing => true,
            ConversionProperty::StringFormatting => true,
            ConversionProperty::BindConstReference => true,
        }
    }
}

/// Set of enabled conversion properties.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryConfig {
    values: FxHashMap<ConversionProperty, bool>,
}

impl RegistryConfig {
    /// Only lossless conversions: widening, handle conversions, const binding.
    pub fn strict() -> Self {
        Self::default()
            .with(ConversionProperty::NumericNarrowing, false)
            .with(ConversionProperty::FloatToInteger, false)
            .with(ConversionProperty::BoolNumeric, false)
            .with(ConversionProperty::StringParsing, false)
            .with(ConversionProperty::StringFormatting, false)
    }

    pub fn get(&self, property: ConversionProperty) -> bool {
        self.values
            .get(&property)
            .copied()
            .unwrap_or_else(|| property.default_value())
    }

    pub fn set(&mut self, property: ConversionProperty, enabled: bool) {
        self.values.insert(property, enabled);
    }

    /// Builder form of [`set`](Self::set).
    pub fn with(mut self, property: ConversionProperty, enabled: bool) -> Self {
        self.set(property, enabled);
        self
    }
}

impl Default for RegistryConfig {
    fn default() -> Self {
        let values = ConversionProperty::ALL
            .iter()
            .map(|p| (*p, p.default_value()))
            .collect();
        Self { values }
    }
}
