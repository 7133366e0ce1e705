//! The type table and its deferred initializers.
//!
//! ## Menu
//!
//! - [`ClassRegistry`]: classes, enums, leaf codecs and container accessors by [`TypeIdent`].
//! - [`TypeKind`]: how the registry classifies a type.
//! - [`LeafCodec`]: serde-backed encoding of a leaf type.
//! - [`ReflectEnum`] / [`EnumDescriptor`]: unit enums known by variant name and value.
//! - [`global`] / [`init_global`]: the process-wide registry.
//!
//! ## auto_register
//!
//! With the `auto_register` feature (on by default), non-generic types
//! deriving `Reflect` with `#[reflect(auto_register)]` submit themselves
//! through the `inventory` crate, and [`ClassRegistry::auto_register`] schedules all
//! of them. Platforms without `inventory` support simply submit nothing.
//!
//! [`TypeIdent`]: crate::TypeIdent

// -----------------------------------------------------------------------------
// Modules

mod class_registry;
mod enum_info;
mod global;
mod leaf;

// -----------------------------------------------------------------------------
// Exports

pub use class_registry::{ClassRegistry, TypeKind};
pub use enum_info::{EnumDescriptor, EnumVariant, ReflectEnum};
pub use global::{global, init_global, is_global_initialized};
pub use leaf::{LeafCodec, LeafError, LeafKind};
