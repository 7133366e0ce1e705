//! Paths into `prop_reflect` used by generated code, kept in one place so
//! a module move in `prop_reflect` only touches this file.

use proc_macro2::TokenStream;
use quote::quote;

/// How the calling crate names `prop_reflect`.
///
/// `::prop_reflect` for direct dependents, `::prop_core::reflect` through
/// the facade. Reading the manifest is not free, so the result is passed
/// around rather than recomputed.
pub(crate) fn prop_reflect() -> syn::Path {
    prop_macro_utils::Manifest::shared(|manifest| manifest.get_crate_path("prop_reflect"))
}

#[inline(always)]
pub(crate) fn macro_exports_(prop_reflect_path: &syn::Path) -> TokenStream {
    quote! {
        #prop_reflect_path::__macro_exports
    }
}

#[cfg(feature = "auto_register")]
#[inline(always)]
pub(crate) fn auto_register_(prop_reflect_path: &syn::Path) -> TokenStream {
    quote! {
        #prop_reflect_path::__macro_exports::auto_register
    }
}

#[inline(always)]
pub(crate) fn reflect_(prop_reflect_path: &syn::Path) -> TokenStream {
    quote! {
        #prop_reflect_path::Reflect
    }
}

#[inline(always)]
pub(crate) fn class_(prop_reflect_path: &syn::Path) -> TokenStream {
    quote! {
        #prop_reflect_path::Class
    }
}

#[inline(always)]
pub(crate) fn class_mod_(prop_reflect_path: &syn::Path) -> TokenStream {
    quote! {
        #prop_reflect_path::class
    }
}

#[inline(always)]
pub(crate) fn registry_mod_(prop_reflect_path: &syn::Path) -> TokenStream {
    quote! {
        #prop_reflect_path::registry
    }
}

#[inline(always)]
pub(crate) fn option_() -> TokenStream {
    quote! {
        ::core::option::Option
    }
}
