use proc_macro2::TokenStream;
use quote::quote;

use crate::derive_data::{ReflectMeta, ReflectVariant};

/// `Reflect` + `ReflectEnum` for a unit-only enum.
///
/// Variant values are the discriminants, read through `as i64` so explicit
/// and implicit discriminants both come out right.
pub(crate) fn impl_enum(meta: &ReflectMeta, variants: &[ReflectVariant]) -> TokenStream {
    let prop_reflect_path = meta.prop_reflect_path();
    let reflect_ = crate::path::reflect_(prop_reflect_path);
    let registry_mod_ = crate::path::registry_mod_(prop_reflect_path);
    let exports_ = crate::path::macro_exports_(prop_reflect_path);
    let option_ = crate::path::option_();

    let ident = meta.ident();
    let type_name = meta.type_name_expression();

    let entries = variants.iter().map(|variant| {
        let name = variant.name();
        let variant = &variant.ident;
        quote! {
            #registry_mod_::EnumVariant { name: #name, value: Self::#variant as i64 }
        }
    });

    let to_value_arms = variants.iter().map(|variant| {
        let variant = &variant.ident;
        quote! { Self::#variant => Self::#variant as i64, }
    });

    let from_value_checks = variants.iter().map(|variant| {
        let variant = &variant.ident;
        quote! {
            if value == Self::#variant as i64 {
                return #option_::Some(Self::#variant);
            }
        }
    });

    quote! {
        impl #reflect_ for #ident {
            fn type_name() -> #exports_::Cow<'static, str> {
                #type_name
            }

            fn register_dependencies(registry: &mut #registry_mod_::ClassRegistry) {
                registry.register_enum::<Self>();
            }
        }

        impl #registry_mod_::ReflectEnum for #ident {
            const VARIANTS: &'static [#registry_mod_::EnumVariant] = &[#(#entries),*];

            #[allow(unreachable_code)]
            fn to_value(&self) -> i64 {
                match self {
                    #(#to_value_arms)*
                }
            }

            fn from_value(value: i64) -> #option_<Self> {
                #(#from_value_checks)*
                #option_::None
            }
        }
    }
}
