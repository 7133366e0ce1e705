//! Runtime reflection over compile-time types.
//!
//! Types declare their fields once, next to their definition, and become
//! inspectable, traversable, serializable and editable through code that
//! never names the concrete type.
//!
//! - [`TypeIdent`]: process-wide handle for a compile-time type.
//! - [`property::Property`]: one named field with an erased accessor and [`meta`] data.
//! - [`container::ContainerAccessor`]: erased view over sequence, set and map fields.
//! - [`class::ClassDescriptor`]: properties, parent and constructors of one type.
//! - [`registry::ClassRegistry`]: the type table, filled in two phases
//!   (register, then [`drain_pending`](registry::ClassRegistry::drain_pending)).
//! - [`visit`]: the per-property walk shared by [`serde`] and [`inspect`].
//!
//! # Example
//!
//! ```
//! use prop_reflect::Reflect;
//! use prop_reflect::registry::ClassRegistry;
//! use prop_reflect::serde::ReflectSerializer;
//!
//! #[derive(Reflect, Default)]
//! #[reflect(default)]
//! struct Point {
//!     x: f32,
//!     y: f32,
//! }
//!
//! #[derive(Reflect, Default)]
//! #[reflect(default)]
//! struct Polyline {
//!     points: Vec<Point>,
//! }
//!
//! let mut registry = ClassRegistry::new();
//! registry.register::<Polyline>();
//! registry.drain_pending();
//!
//! let line = Polyline {
//!     points: vec![Point { x: 1.0, y: 2.0 }, Point { x: 3.0, y: 4.0 }],
//! };
//! let tree = ReflectSerializer::new(&registry).serialize_typed(&line).unwrap();
//! assert_eq!(
//!     tree,
//!     serde_json::json!({ "points": [{ "x": 1.0, "y": 2.0 }, { "x": 3.0, "y": 4.0 }] }),
//! );
//! ```
#![cfg_attr(docsrs, feature(doc_cfg))]

// -----------------------------------------------------------------------------
// Extern Self

// Generated code names this crate as `prop_reflect`, which also has to
// resolve inside the crate itself.
extern crate self as prop_reflect;

extern crate alloc;

// -----------------------------------------------------------------------------
// Modules

mod error;
mod ident;
mod impls;
mod reflect;

pub mod class;
pub mod container;
pub mod inspect;
pub mod meta;
pub mod property;
pub mod registry;
pub mod serde;
pub mod visit;

#[doc(hidden)]
pub mod __macro_exports;

// -----------------------------------------------------------------------------
// Top-Level exports

pub use error::ReflectError;
pub use ident::TypeIdent;
pub use reflect::{Class, Reflect};

pub use prop_reflect_derive as derive;
pub use prop_reflect_derive::Reflect;

/// The traits and types most users need.
pub mod prelude {
    pub use crate::class::{ClassDescriptor, Constructors, FieldVisitor, ParentLink};
    pub use crate::meta::{MetaBuilder, PropertyMeta};
    pub use crate::registry::{ClassRegistry, ReflectEnum};
    pub use crate::serde::{ReflectDeserializer, ReflectSerializer};
    pub use crate::{Class, Reflect, TypeIdent};
}
