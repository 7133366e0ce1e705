use proc_macro2::TokenStream;
use quote::quote;

use crate::derive_data::{ReflectField, ReflectMeta, constructor_calls};

/// `Reflect` + `Class` for a struct with named fields.
///
/// ```ignore
/// impl Reflect for Foo {
///     fn type_name() -> Cow<'static, str> { Cow::Borrowed("Foo") }
///     fn register_dependencies(registry: &mut ClassRegistry) { registry.register::<Self>(); }
/// }
///
/// impl Class for Foo {
///     fn parent() -> Option<ParentLink> { .. }
///     fn visit_fields(fields: &mut FieldVisitor<'_, Self>) {
///         fields.field_with::<f32, _>("speed", |this| &this.speed, |this| &mut this.speed, |meta| meta.range(0.0, 1.0));
///     }
///     fn register_constructors(ctors: &mut Constructors<Self>) { ctors.add_default(); }
/// }
/// ```
pub(crate) fn impl_class(meta: &ReflectMeta, fields: &[ReflectField]) -> syn::Result<TokenStream> {
    let prop_reflect_path = meta.prop_reflect_path();
    let reflect_ = crate::path::reflect_(prop_reflect_path);
    let class_ = crate::path::class_(prop_reflect_path);
    let class_mod_ = crate::path::class_mod_(prop_reflect_path);
    let registry_mod_ = crate::path::registry_mod_(prop_reflect_path);
    let exports_ = crate::path::macro_exports_(prop_reflect_path);
    let option_ = crate::path::option_();

    let ident = meta.ident();
    let (impl_generics, ty_generics, where_clause) = meta.generics().split_for_impl();
    let type_name = meta.type_name_expression();

    let mut parents = fields.iter().filter(|field| field.attrs.parent.is_some());
    let parent = parents.next();
    if let Some(extra) = parents.next() {
        return Err(syn::Error::new(
            extra.member.span(),
            "only one field can be the `parent`",
        ));
    }

    let parent_fn = parent.map(|field| {
        let member = &field.member;
        let ty = &field.ty;
        quote! {
            fn parent() -> #option_<#class_mod_::ParentLink> {
                #option_::Some(#class_mod_::ParentLink::new::<Self, #ty>(
                    |this| &this.#member,
                    |this| &mut this.#member,
                ))
            }
        }
    });

    let field_calls = fields
        .iter()
        .filter(|field| field.attrs.parent.is_none())
        .map(|field| {
            let member = &field.member;
            let ty = &field.ty;
            let name = field.name();
            let calls = &field.attrs.meta_calls;
            quote! {
                fields.field_with::<#ty, _>(
                    #name,
                    |this| &this.#member,
                    |this| &mut this.#member,
                    |meta| meta #(#calls)*,
                );
            }
        });

    let ctor_calls = constructor_calls(meta);
    let ctors_fn = (!ctor_calls.is_empty()).then(|| {
        quote! {
            fn register_constructors(ctors: &mut #class_mod_::Constructors<Self>) {
                #(#ctor_calls)*
            }
        }
    });

    Ok(quote! {
        impl #impl_generics #reflect_ for #ident #ty_generics #where_clause {
            fn type_name() -> #exports_::Cow<'static, str> {
                #type_name
            }

            fn register_dependencies(registry: &mut #registry_mod_::ClassRegistry) {
                registry.register::<Self>();
            }
        }

        impl #impl_generics #class_ for #ident #ty_generics #where_clause {
            #parent_fn

            #[allow(unused_variables)]
            fn visit_fields(fields: &mut #class_mod_::FieldVisitor<'_, Self>) {
                #(#field_calls)*
            }

            #ctors_fn
        }
    })
}
