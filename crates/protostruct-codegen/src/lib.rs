// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

extern crate proc_macro;

use proc_macro::TokenStream;
use quote::quote;
use syn::ext::IdentExt;
use syn::{
    parse_macro_input, parse_quote, Data, DeriveInput, Fields, GenericParam, LitStr, Visibility,
};

/// Per-field options from `#[shape(...)]`.
#[derive(Default)]
struct FieldAttrs {
    /// Raw tag text, passed through untouched.
    tag: Option<LitStr>,
    /// Field is embedded into its parent.
    flatten: bool,
}

/// `#[derive(Reflect)]` macro: generates a native type descriptor
///
/// Every field type must itself implement `Reflect`. `pub` fields are
/// exported, all others unexported. Field attributes:
/// - `#[shape(tag = "...")]`: raw tag text, e.g. `json:"v,omitempty"`
/// - `#[shape(flatten)]`: embedded field (encoding rejects it)
///
/// Type parameters get a `Reflect` bound.
///
/// Example:
/// ```ignore
/// use protostruct::Reflect;
///
/// #[derive(Reflect)]
/// pub struct Reading {
///     #[shape(tag = r#"json:"id""#)]
///     pub sensor_id: u32,
///     pub samples: Vec<f64>,
///     calibrated: bool,
/// }
/// ```
#[proc_macro_derive(Reflect, attributes(shape))]
pub fn derive_reflect(input: TokenStream) -> TokenStream {
    let mut input = parse_macro_input!(input as DeriveInput);

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(f) => f.named.iter().collect::<Vec<_>>(),
            Fields::Unit => Vec::new(),
            Fields::Unnamed(_) => {
                return syn::Error::new_spanned(&input, "Only named fields are supported")
                    .to_compile_error()
                    .into()
            }
        },
        _ => {
            return syn::Error::new_spanned(&input, "Only structs are supported")
                .to_compile_error()
                .into()
        }
    };

    let mut field_infos: Vec<proc_macro2::TokenStream> = Vec::with_capacity(fields.len());
    for field in fields {
        let Some(ident) = field.ident.as_ref() else {
            return syn::Error::new_spanned(field, "Field must have a name")
                .to_compile_error()
                .into();
        };

        let attrs = match parse_field_attrs(&field.attrs) {
            Ok(attrs) => attrs,
            Err(err) => return err.to_compile_error().into(),
        };

        let name = ident.unraw().to_string();
        let ty = &field.ty;
        let visibility = match field.vis {
            Visibility::Public(_) => quote! { ::protostruct::Visibility::Exported },
            _ => quote! { ::protostruct::Visibility::Unexported },
        };
        let tag = attrs
            .tag
            .map_or_else(|| quote! {}, |tag| quote! { .with_tag(#tag) });
        let embedded = if attrs.flatten {
            quote! { .embedded() }
        } else {
            quote! {}
        };

        field_infos.push(quote! {
            ::protostruct::FieldInfo::new(
                #name,
                <#ty as ::protostruct::Reflect>::type_info(),
            )
            .with_visibility(#visibility)
            #tag
            #embedded
        });
    }

    for param in &mut input.generics.params {
        if let GenericParam::Type(type_param) = param {
            type_param.bounds.push(parse_quote!(::protostruct::Reflect));
        }
    }

    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let expanded = quote! {
        impl #impl_generics ::protostruct::Reflect for #name #ty_generics #where_clause {
            fn type_info() -> ::protostruct::TypeInfo {
                ::protostruct::TypeInfo::new(
                    ::std::any::type_name::<Self>(),
                    ::protostruct::NativeKind::Struct(::std::vec![
                        #(#field_infos),*
                    ]),
                )
            }
        }
    };

    TokenStream::from(expanded)
}

/// Collect `#[shape(...)]` options of one field.
fn parse_field_attrs(attrs: &[syn::Attribute]) -> syn::Result<FieldAttrs> {
    let mut result = FieldAttrs::default();

    for attr in attrs.iter().filter(|a| a.path().is_ident("shape")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("tag") {
                result.tag = Some(meta.value()?.parse()?);
                Ok(())
            } else if meta.path.is_ident("flatten") {
                result.flatten = true;
                Ok(())
            } else {
                Err(meta.error("unsupported shape attribute, expected `tag` or `flatten`"))
            }
        })?;
    }

    Ok(result)
}
