// -----------------------------------------------------------------------------
// Modules

mod auto_register;
mod class_kind;
mod enum_kind;
mod leaf_kind;

// -----------------------------------------------------------------------------
// Internal API

use proc_macro2::TokenStream;
use quote::quote;
use syn::spanned::Spanned;
use syn::{Data, DeriveInput, Fields};

use crate::derive_data::{
    FieldAttributes, ReflectField, ReflectMeta, ReflectVariant, TypeAttributes, VariantAttributes,
};

use auto_register::get_auto_register_impl;

/// Picks the impls for `ast` from its shape and type attributes.
pub(crate) fn match_reflect_impls(ast: DeriveInput) -> syn::Result<TokenStream> {
    let attrs = TypeAttributes::parse_attrs(&ast.attrs)?;
    let is_leaf = attrs.leaf.is_some();
    let meta = ReflectMeta::new(ast.ident.clone(), ast.generics.clone(), attrs)?;

    let impls = if is_leaf {
        if meta.attrs().default.is_some() || !meta.attrs().constructors.is_empty() {
            return Err(syn::Error::new(
                ast.ident.span(),
                "leaf types have no constructors; drop `default` and `constructor`",
            ));
        }
        leaf_kind::impl_leaf(&meta)
    } else {
        match &ast.data {
            Data::Struct(data) => {
                let fields = match &data.fields {
                    Fields::Named(named) => parse_fields(named.named.iter())?,
                    Fields::Unit => Vec::new(),
                    Fields::Unnamed(unnamed) => {
                        return Err(syn::Error::new(
                            unnamed.span(),
                            "tuple structs need `#[reflect(leaf)]`; classes have named fields",
                        ));
                    }
                };
                class_kind::impl_class(&meta, &fields)?
            }
            Data::Enum(data) => {
                if meta.is_generic() {
                    return Err(syn::Error::new(ast.generics.span(), "reflected enums cannot be generic"));
                }
                let mut variants = Vec::with_capacity(data.variants.len());
                for variant in &data.variants {
                    if !matches!(variant.fields, Fields::Unit) {
                        return Err(syn::Error::new(
                            variant.fields.span(),
                            "only unit variants are reflected; use `#[reflect(leaf)]` for data enums",
                        ));
                    }
                    variants.push(ReflectVariant {
                        ident: variant.ident.clone(),
                        attrs: VariantAttributes::parse_attrs(&variant.attrs)?,
                    });
                }
                enum_kind::impl_enum(&meta, &variants)
            }
            Data::Union(data) => {
                return Err(syn::Error::new(
                    data.union_token.span(),
                    "unions cannot be reflected",
                ));
            }
        }
    };

    let auto_register = get_auto_register_impl(&meta);

    Ok(quote! {
        const _: () = {
            #impls
            #auto_register
        };
    })
}

fn parse_fields<'a>(fields: impl Iterator<Item = &'a syn::Field>) -> syn::Result<Vec<ReflectField>> {
    let mut out = Vec::new();
    for field in fields {
        let attrs = FieldAttributes::parse_attrs(&field.attrs)?;
        if attrs.ignore {
            continue;
        }
        let Some(member) = field.ident.clone() else {
            continue;
        };
        out.push(ReflectField {
            member,
            ty: field.ty.clone(),
            attrs,
        });
    }
    Ok(out)
}
