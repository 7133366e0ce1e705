//! Parsed derive input: type-level data plus the fields or variants the
//! generated code needs.

// -----------------------------------------------------------------------------
// Modules

mod attributes;

// -----------------------------------------------------------------------------
// Internal API

pub(crate) use attributes::{FieldAttributes, TypeAttributes, VariantAttributes};

use proc_macro2::{Span, TokenStream};
use quote::quote;
use syn::{Expr, GenericParam, Generics, Ident, LitStr, Path, Type, parse_quote};

// -----------------------------------------------------------------------------
// ReflectMeta

/// What every generated impl needs, whatever the type's shape.
pub(crate) struct ReflectMeta {
    prop_reflect_path: Path,
    ident: Ident,
    generics: Generics,
    attrs: TypeAttributes,
}

impl ReflectMeta {
    /// Adds a `Reflect` bound to every type parameter, plus `Default` when
    /// the type registers its `Default` constructor.
    pub fn new(ident: Ident, mut generics: Generics, attrs: TypeAttributes) -> syn::Result<Self> {
        let prop_reflect_path = crate::path::prop_reflect();

        if let Some(lifetime) = generics.lifetimes().next() {
            return Err(syn::Error::new(
                lifetime.lifetime.span(),
                "reflected types cannot have lifetime parameters",
            ));
        }

        let reflect_ = crate::path::reflect_(&prop_reflect_path);
        let bounded: Vec<Ident> = generics.type_params().map(|param| param.ident.clone()).collect();
        let where_clause = generics.make_where_clause();
        for ident in bounded {
            if attrs.default.is_some() {
                where_clause
                    .predicates
                    .push(parse_quote!(#ident: #reflect_ + ::core::default::Default));
            } else {
                where_clause.predicates.push(parse_quote!(#ident: #reflect_));
            }
        }

        Ok(Self {
            prop_reflect_path,
            ident,
            generics,
            attrs,
        })
    }

    #[inline]
    pub fn prop_reflect_path(&self) -> &Path {
        &self.prop_reflect_path
    }

    #[inline]
    pub fn ident(&self) -> &Ident {
        &self.ident
    }

    #[inline]
    pub fn generics(&self) -> &Generics {
        &self.generics
    }

    #[inline]
    pub fn attrs(&self) -> &TypeAttributes {
        &self.attrs
    }

    #[inline]
    pub fn is_generic(&self) -> bool {
        self.generics
            .params
            .iter()
            .any(|param| !matches!(param, GenericParam::Lifetime(_)))
    }

    /// Body of `Reflect::type_name`.
    ///
    /// `Cow::Borrowed("Name")`, or for generic types a formatted
    /// `Name<Arg, ..>` built from the arguments' own reflected names.
    pub fn type_name_expression(&self) -> TokenStream {
        let exports_ = crate::path::macro_exports_(&self.prop_reflect_path);
        let reflect_ = crate::path::reflect_(&self.prop_reflect_path);
        let base = match &self.attrs.name {
            Some(name) => name.value(),
            None => self.ident.to_string(),
        };

        if !self.is_generic() {
            let base = LitStr::new(&base, Span::call_site());
            return quote! { #exports_::Cow::Borrowed(#base) };
        }

        let mut placeholders = Vec::new();
        let mut args = Vec::new();
        for param in &self.generics.params {
            match param {
                GenericParam::Type(param) => {
                    let ident = &param.ident;
                    placeholders.push("{}");
                    args.push(quote! { <#ident as #reflect_>::type_name() });
                }
                GenericParam::Const(param) => {
                    let ident = &param.ident;
                    placeholders.push("{}");
                    args.push(quote! { #ident });
                }
                GenericParam::Lifetime(_) => {}
            }
        }
        let template = LitStr::new(&format!("{base}<{}>", placeholders.join(", ")), Span::call_site());
        quote! {
            #exports_::Cow::Owned(#exports_::format!(#template, #(#args),*))
        }
    }
}

// -----------------------------------------------------------------------------
// Shapes

/// One reflected struct field.
pub(crate) struct ReflectField {
    pub member: Ident,
    pub ty: Type,
    pub attrs: FieldAttributes,
}

impl ReflectField {
    /// The property name: `rename`, else the field name without a raw prefix.
    pub fn name(&self) -> LitStr {
        match &self.attrs.rename {
            Some(rename) => rename.clone(),
            None => LitStr::new(&self.member.to_string().trim_start_matches("r#").to_string(), self.member.span()),
        }
    }
}

/// One unit variant.
pub(crate) struct ReflectVariant {
    pub ident: Ident,
    pub attrs: VariantAttributes,
}

impl ReflectVariant {
    pub fn name(&self) -> LitStr {
        match &self.attrs.rename {
            Some(rename) => rename.clone(),
            None => LitStr::new(&self.ident.to_string(), self.ident.span()),
        }
    }
}

/// Constructor expressions registered through `Class::register_constructors`.
pub(crate) fn constructor_calls(meta: &ReflectMeta) -> Vec<TokenStream> {
    let mut calls = Vec::new();
    if meta.attrs.default.is_some() {
        calls.push(quote! { ctors.add_default(); });
    }
    calls.extend(meta.attrs.constructors.iter().map(|ctor: &Expr| {
        quote! { ctors.add(#ctor); }
    }));
    calls
}
