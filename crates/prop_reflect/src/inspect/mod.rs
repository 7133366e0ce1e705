//! The boundary between reflection and an editor UI.
//!
//! Nothing here draws. The UI supplies an [`InspectorUi`] for groups,
//! headers, combos and text, plus [`LeafRenderers`] for the leaf types it
//! has widgets for; the [`Inspector`] walks an instance and decides what to
//! ask for and in which order.
//!
//! [`ViewCache`] keeps one [`ClassView`] per class: the ordered property list
//! with display labels already computed (see [`pretty_name`]).

// -----------------------------------------------------------------------------
// Modules

mod inspector;
mod view;

// -----------------------------------------------------------------------------
// Exports

pub use inspector::{
    ContainerAction, DEPTH_LIMIT, ElementAction, Inspector, InspectorUi, LeafRenderers, UNSUPPORTED,
};
pub use view::{ClassView, PropertyView, ViewCache, pretty_name};
