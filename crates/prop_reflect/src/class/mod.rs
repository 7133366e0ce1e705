//! Class descriptors and the pieces used to build them.
//!
//! - [`ClassDescriptor`]: the registered description of one type.
//! - [`ClassBuilder`]: raw construction, for registrations without the derive.
//! - [`FieldVisitor`]: what [`Class::visit_fields`](crate::Class::visit_fields) reports into.
//! - [`ParentLink`]: the embedded parent for single inheritance.
//! - [`Constructor`], [`Signature`], [`Instance`]: erased construction.

// -----------------------------------------------------------------------------
// Modules

mod builder;
mod constructor;
mod descriptor;

// -----------------------------------------------------------------------------
// Exports

pub use builder::{ClassBuilder, FieldVisitor, ParentLink};
pub use constructor::{Constructor, ConstructorArgs, Constructors, Instance, IntoConstructor};
pub use constructor::Signature;
pub use descriptor::ClassDescriptor;
