use proc_macro2::TokenStream;
use quote::quote;

use crate::derive_data::ReflectMeta;

/// `Reflect` for a `#[reflect(leaf)]` type: registering it installs a leaf
/// codec built from its own `serde` implementations.
pub(crate) fn impl_leaf(meta: &ReflectMeta) -> TokenStream {
    let prop_reflect_path = meta.prop_reflect_path();
    let reflect_ = crate::path::reflect_(prop_reflect_path);
    let registry_mod_ = crate::path::registry_mod_(prop_reflect_path);
    let exports_ = crate::path::macro_exports_(prop_reflect_path);

    let ident = meta.ident();
    let (impl_generics, ty_generics, where_clause) = meta.generics().split_for_impl();
    let type_name = meta.type_name_expression();

    quote! {
        impl #impl_generics #reflect_ for #ident #ty_generics #where_clause {
            fn type_name() -> #exports_::Cow<'static, str> {
                #type_name
            }

            fn register_dependencies(registry: &mut #registry_mod_::ClassRegistry) {
                registry.register_leaf::<Self>();
            }
        }
    }
}
