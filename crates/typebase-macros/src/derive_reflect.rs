//! Implementation of the `#[derive(Reflect)]` macro.

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{Data, DeriveInput, parse_macro_input};

use crate::attrs::{FieldAttrs, TypeAttrs};

pub fn derive_reflect_impl(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    match derive_reflect_inner(&input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

fn derive_reflect_inner(input: &DeriveInput) -> syn::Result<TokenStream2> {
    let name = &input.ident;

    if !input.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &input.generics,
            "#[derive(Reflect)] does not support generic types; implement Reflect by hand",
        ));
    }
    if let Data::Union(data) = &input.data {
        return Err(syn::Error::new_spanned(
            data.union_token,
            "#[derive(Reflect)] does not support unions",
        ));
    }

    let attrs = TypeAttrs::from_attrs(&input.attrs)?;
    let type_name = attrs.name.clone().unwrap_or_else(|| name.to_string());

    let capabilities = capabilities(&attrs);
    let properties = collect_properties(input)?;

    Ok(quote! {
        impl ::typebase::Reflect for #name {
            fn describe() -> ::typebase::TypeBuilder<Self> {
                ::typebase::TypeBuilder::class(#type_name)
                    #(#capabilities)*
                    #(#properties)*
            }
        }
    })
}

fn capabilities(attrs: &TypeAttrs) -> Vec<TokenStream2> {
    let mut out = Vec::new();
    if attrs.clone {
        out.push(quote! { .cloneable() });
    }
    if attrs.eq {
        out.push(quote! { .comparable() });
    }
    if attrs.default {
        out.push(quote! { .defaultable() });
    }
    if attrs.debug {
        out.push(quote! { .debuggable() });
    }
    out
}

/// Generate property builder calls from named struct fields.
fn collect_properties(input: &DeriveInput) -> syn::Result<Vec<TokenStream2>> {
    let mut properties = Vec::new();

    let fields = match &input.data {
        Data::Struct(data) => &data.fields,
        _ => return Ok(properties),
    };

    for field in fields {
        let field_attrs = FieldAttrs::from_attrs(&field.attrs)?;
        if !field_attrs.is_property() {
            continue;
        }

        let Some(field_name) = field.ident.as_ref() else {
            return Err(syn::Error::new_spanned(
                field,
                "#[reflect] properties require named fields",
            ));
        };
        if field_attrs.set && !field_attrs.get {
            return Err(syn::Error::new_spanned(
                field_name,
                "#[reflect(set)] requires #[reflect(get)] as well",
            ));
        }

        let prop_name = field_attrs
            .name
            .clone()
            .unwrap_or_else(|| field_name.to_string());
        let field_ty = &field.ty;

        let getter = quote! {
            |this: &Self| -> #field_ty { ::core::clone::Clone::clone(&this.#field_name) }
        };

        if field_attrs.set {
            properties.push(quote! {
                .property(#prop_name, #getter, |this: &mut Self, value: #field_ty| {
                    this.#field_name = value;
                })
            });
        } else {
            properties.push(quote! {
                .readonly_property(#prop_name, #getter)
            });
        }
    }

    Ok(properties)
}
