use crate::derive_data::ReflectMeta;

/// Generate `auto_register` implementation
#[cfg(feature = "auto_register")]
pub(crate) fn get_auto_register_impl(meta: &ReflectMeta) -> proc_macro2::TokenStream {
    use quote::quote_spanned;

    let Some(span) = meta.attrs().auto_register else {
        return proc_macro2::TokenStream::new();
    };
    // Invalid for generic types.
    if meta.is_generic() {
        return proc_macro2::TokenStream::new();
    }

    let prop_reflect_path = meta.prop_reflect_path();
    let auto_register_ = crate::path::auto_register_(prop_reflect_path);
    let reflect_ = crate::path::reflect_(prop_reflect_path);
    let ident = meta.ident();

    quote_spanned! { span =>
        #auto_register_::inventory::submit!{
            #auto_register_::AutoRegisterFn(
                <#ident as #reflect_>::register_dependencies
            )
        }
    }
}

/// Generate `auto_register` implementation
#[cfg(not(feature = "auto_register"))]
pub(crate) fn get_auto_register_impl(_: &ReflectMeta) -> proc_macro2::TokenStream {
    proc_macro2::TokenStream::new()
}
