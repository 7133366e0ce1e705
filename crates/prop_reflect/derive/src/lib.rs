//! See [`Reflect`].
#![cfg_attr(docsrs, feature(doc_cfg))]
#![allow(clippy::std_instead_of_core, reason = "proc-macro lib")]
#![allow(clippy::std_instead_of_alloc, reason = "proc-macro lib")]

use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

static REFLECT_ATTRIBUTE_NAME: &str = "reflect";

// -----------------------------------------------------------------------------
// Modules

mod derive_data;
mod impls;
mod path;

// -----------------------------------------------------------------------------
// Macros

/// # Reflection Derivation
///
/// `#[derive(Reflect)]` implements `Reflect` plus one of:
///
/// - `Class`, for structs with named fields (and unit structs);
/// - `ReflectEnum`, for enums whose variants carry no data;
/// - nothing else, for types marked `#[reflect(leaf)]`.
///
/// Generic type parameters get a `Reflect` bound. Lifetime parameters are
/// rejected: reflected types are `'static`.
///
/// ## Type Attributes
///
/// - `name = "Name"`: the reflected name (defaults to the Rust identifier).
/// - `default`: registers `Default::default` as the zero-argument constructor.
/// - `constructor = path`: registers a constructor function; repeatable.
///   Its signature is the function's parameter list.
/// - `auto_register`: submits the type for `ClassRegistry::auto_register`.
///   No effect on generic types or without the `auto_register` feature.
/// - `leaf`: treats the type as a single value serialized through its own
///   `serde` implementations. The type must implement `Serialize`,
///   `DeserializeOwned` and `Default`.
///
/// ```rust, ignore
/// #[derive(Reflect, Default)]
/// #[reflect(default, constructor = Sprite::new, auto_register)]
/// struct Sprite { /* ... */ }
/// ```
///
/// ## Field Attributes
///
/// - `ignore`: the field is not reflected.
/// - `parent`: the field embeds the parent class. It is not listed as a
///   property; the parent's properties are inherited instead. At most one.
/// - `rename = "name"`: the property name (defaults to the field name).
/// - `@expr`: adds `expr` as a custom attribute.
///
/// Anything else is a call on the field's `MetaBuilder`, which checks it
/// against the field type:
///
/// ```rust, ignore
/// #[derive(Reflect)]
/// struct Light {
///     #[reflect(slider(0.0, 10.0, 0.1), tooltip = "Lumens / 100")]
///     intensity: f32,
///     #[reflect(color)]
///     tint: [f32; 3],
///     #[reflect(not_serialized, read_only)]
///     cached_radius: f32,
///     #[reflect(@Unit("lm"))]
///     flux: f32,
/// }
/// ```
///
/// `ident` becomes `.ident()`, `ident = expr` becomes `.ident(expr)` and
/// `ident(a, b)` becomes `.ident(a, b)`.
///
/// ## Enums
///
/// Unit-only enums list their variants with integer values taken from the
/// discriminants. `#[reflect(rename = "..")]` on a variant changes its
/// reflected name.
#[proc_macro_derive(Reflect, attributes(reflect))]
pub fn derive_reflect(input: TokenStream) -> TokenStream {
    let ast = parse_macro_input!(input as DeriveInput);

    match impls::match_reflect_impls(ast) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.into_compile_error().into(),
    }
}
