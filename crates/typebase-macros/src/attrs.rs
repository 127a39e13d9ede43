//! Attribute parsing for `#[derive(Reflect)]`.

use syn::{Attribute, LitStr};

/// Parsed `#[reflect(...)]` attributes on a type.
#[derive(Debug, Default)]
pub struct TypeAttrs {
    /// Registered name (default: Rust type name)
    pub name: Option<String>,
    /// Values can be copied (`T: Clone`)
    pub clone: bool,
    /// Values can be compared (`T: PartialEq`)
    pub eq: bool,
    /// Values can be default-constructed by name (`T: Default`)
    pub default: bool,
    /// Values are formatted with `Debug` (`T: Debug`)
    pub debug: bool,
}

/// Parsed `#[reflect(...)]` attributes on a field.
#[derive(Debug, Default)]
pub struct FieldAttrs {
    /// Expose a getter
    pub get: bool,
    /// Expose a setter
    pub set: bool,
    /// Override property name
    pub name: Option<String>,
}

fn unknown(meta: &syn::meta::ParseNestedMeta<'_>, what: &str) -> syn::Error {
    meta.error(format!(
        "unknown reflect {}attribute: {}",
        what,
        meta.path.get_ident().map(|i| i.to_string()).unwrap_or_default()
    ))
}

impl TypeAttrs {
    /// Parse attributes from a list of `#[reflect(...)]` attributes.
    pub fn from_attrs(attrs: &[Attribute]) -> syn::Result<Self> {
        let mut result = Self::default();

        for attr in attrs {
            if !attr.path().is_ident("reflect") {
                continue;
            }

            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("name") {
                    let value: LitStr = meta.value()?.parse()?;
                    result.name = Some(value.value());
                } else if meta.path.is_ident("clone") {
                    result.clone = true;
                } else if meta.path.is_ident("eq") {
                    result.eq = true;
                } else if meta.path.is_ident("default") {
                    result.default = true;
                } else if meta.path.is_ident("debug") {
                    result.debug = true;
                } else {
                    return Err(unknown(&meta, ""));
                }
                Ok(())
            })?;
        }

        Ok(result)
    }
}

impl FieldAttrs {
    /// Parse attributes from a list of `#[reflect(...)]` attributes.
    pub fn from_attrs(attrs: &[Attribute]) -> syn::Result<Self> {
        let mut result = Self::default();

        for attr in attrs {
            if !attr.path().is_ident("reflect") {
                continue;
            }

            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("get") {
                    result.get = true;
                } else if meta.path.is_ident("set") {
                    result.set = true;
                } else if meta.path.is_ident("name") {
                    let value: LitStr = meta.value()?.parse()?;
                    result.name = Some(value.value());
                } else {
                    return Err(unknown(&meta, "field "));
                }
                Ok(())
            })?;
        }

        Ok(result)
    }

    /// Check if the field is exposed at all.
    pub fn is_property(&self) -> bool {
        self.get || self.set || self.name.is_some()
    }
}
