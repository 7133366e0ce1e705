//! Type-erased access to container fields.
//!
//! A [`ContainerAccessor`] is attached to every property whose type has a
//! container shape. It never owns the container: every call receives the
//! container as `&dyn Any` / `&mut dyn Any`.
//!
//! Shapes are adapted through [`SequenceLike`], [`SetLike`] and [`MapLike`].
//! The standard collections, the `hashbrown` ones and fixed-size arrays are
//! adapted already; a custom collection implements one of the traits and
//! returns [`SequenceAccessor`], [`SetAccessor`] or [`MapAccessor`] from its
//! [`Reflect::container_accessor`](crate::Reflect::container_accessor).
//!
//! # Ordering requirement
//!
//! Entries handed out by [`ContainerAccessor::for_each`] and
//! [`for_each_mut`](ContainerAccessor::for_each_mut) are only valid until
//! the container is mutated. Callers that remove or add while walking must
//! collect indices or keys first and mutate after the walk.

use alloc::boxed::Box;
use alloc::string::String;
use alloc::sync::Arc;
use core::any::{Any, type_name};
use core::fmt;

use thiserror::Error;

use crate::TypeIdent;
use crate::registry::ClassRegistry;

// -----------------------------------------------------------------------------
// Modules

mod array;
mod map;
mod sequence;
mod set;

// -----------------------------------------------------------------------------
// Exports

pub use array::ArrayAccessor;
pub use map::{MapAccessor, MapLike};
pub use sequence::{SequenceAccessor, SequenceLike};
pub use set::{SetAccessor, SetLike};

// -----------------------------------------------------------------------------
// Types

/// The closed set of container shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContainerShape {
    /// Ordered, index-addressed.
    Sequence,
    /// Unique elements, no values.
    Set,
    /// Key to value.
    Map,
}

/// Where an entry sits in its container.
#[derive(Clone, Copy)]
pub enum EntryKey<'a> {
    Index(usize),
    Key(&'a dyn Any),
}

impl EntryKey<'_> {
    #[inline]
    pub fn index(&self) -> Option<usize> {
        match self {
            Self::Index(index) => Some(*index),
            Self::Key(_) => None,
        }
    }
}

impl fmt::Debug for EntryKey<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Index(index) => f.debug_tuple("Index").field(index).finish(),
            Self::Key(_) => f.write_str("Key(..)"),
        }
    }
}

/// One element (or map value) seen during [`ContainerAccessor::for_each`].
pub struct Entry<'a> {
    pub key: EntryKey<'a>,
    pub value: &'a dyn Any,
}

/// One element (or map value) seen during [`ContainerAccessor::for_each_mut`].
pub struct EntryMut<'a> {
    pub key: EntryKey<'a>,
    pub value: &'a mut dyn Any,
}

/// Why a container operation was refused.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ContainerError {
    #[error("expected a `{expected}` container")]
    ContainerMismatch { expected: &'static str },
    #[error("value is not a `{expected}`")]
    ValueMismatch { expected: &'static str },
    #[error("`{0}` cannot be default-constructed")]
    NotDefaultConstructible(String),
    #[error("`{0}` has a fixed size")]
    FixedSize(&'static str),
    #[error("operation requires a {expected:?} container")]
    WrongShape { expected: ContainerShape },
    #[error("{shape:?} elements cannot be edited in place")]
    Immutable { shape: ContainerShape },
    #[error("index {index} is out of bounds for length {len}")]
    OutOfBounds { index: usize, len: usize },
    #[error("an equal element is already in the set")]
    Duplicate,
}

// -----------------------------------------------------------------------------
// ContainerAccessor

/// Erased operations over one concrete container type.
///
/// For maps, "element" means the value half of an entry; keys are reached
/// through [`EntryKey::Key`] and the `*_by_key` methods.
///
/// # Examples
///
/// ```
/// use prop_reflect::Reflect;
/// use prop_reflect::container::{ContainerShape, EntryKey};
/// use prop_reflect::registry::ClassRegistry;
///
/// let registry = ClassRegistry::new();
/// let accessor = <Vec<u32> as Reflect>::container_accessor().unwrap();
/// assert_eq!(accessor.shape(), ContainerShape::Sequence);
///
/// let mut values = vec![10_u32, 20];
/// accessor.add_element(&mut values, None, &registry).unwrap();
/// accessor.add_element(&mut values, Some(Box::new(40_u32)), &registry).unwrap();
/// assert_eq!(values, [10, 20, 0, 40]);
///
/// let mut seen = Vec::new();
/// accessor
///     .for_each(&values, &mut |entry| {
///         if let EntryKey::Index(i) = entry.key {
///             seen.push((i, *entry.value.downcast_ref::<u32>().unwrap()));
///         }
///     })
///     .unwrap();
/// assert_eq!(seen[3], (3, 40));
/// ```
pub trait ContainerAccessor: Send + Sync + 'static {
    fn shape(&self) -> ContainerShape;

    /// The container type this accessor is bound to.
    fn container_type(&self) -> TypeIdent;

    /// Element type; the value type for maps.
    fn element_type(&self) -> TypeIdent;

    /// Key type, maps only.
    #[inline]
    fn key_type(&self) -> Option<TypeIdent> {
        None
    }

    /// Accessor of the element type when elements are containers themselves.
    #[inline]
    fn element_accessor(&self) -> Option<&Arc<dyn ContainerAccessor>> {
        None
    }

    #[inline]
    fn is_map_like(&self) -> bool {
        self.shape() == ContainerShape::Map
    }

    /// Fixed-size containers refuse add, remove and clear.
    #[inline]
    fn is_fixed_size(&self) -> bool {
        false
    }

    /// A new, empty container of this type (default elements for fixed sizes).
    ///
    /// Used to build container-typed elements of an enclosing container.
    fn new_empty(&self, registry: &ClassRegistry) -> Option<Box<dyn Any>>;

    /// `None` if `container` has the wrong type.
    fn len(&self, container: &dyn Any) -> Option<usize>;

    /// Visits entries in iteration order.
    fn for_each<'a>(
        &self,
        container: &'a dyn Any,
        f: &mut dyn FnMut(Entry<'a>),
    ) -> Result<(), ContainerError>;

    /// Visits entries mutably. Sets refuse with [`ContainerError::Immutable`].
    fn for_each_mut<'a>(
        &self,
        container: &'a mut dyn Any,
        f: &mut dyn FnMut(EntryMut<'a>),
    ) -> Result<(), ContainerError>;

    /// The element at iteration position `index`.
    fn element<'a>(&self, container: &'a dyn Any, index: usize) -> Option<&'a dyn Any>;

    fn element_mut<'a>(&self, container: &'a mut dyn Any, index: usize)
    -> Option<&'a mut dyn Any>;

    #[inline]
    fn value_by_key<'a>(&self, _container: &'a dyn Any, _key: &dyn Any) -> Option<&'a dyn Any> {
        None
    }

    #[inline]
    fn value_by_key_mut<'a>(
        &self,
        _container: &'a mut dyn Any,
        _key: &dyn Any,
    ) -> Option<&'a mut dyn Any> {
        None
    }

    /// Appends to a sequence or inserts into a set.
    ///
    /// `None` default-constructs the element through `registry`, which needs
    /// a leaf codec, an enum, or a registered default constructor. Sets leave
    /// an equal element in place and return [`ContainerError::Duplicate`].
    fn add_element(
        &self,
        container: &mut dyn Any,
        value: Option<Box<dyn Any>>,
        registry: &ClassRegistry,
    ) -> Result<(), ContainerError>;

    /// Inserts or replaces a map entry. `None` default-constructs the value.
    fn insert_entry(
        &self,
        _container: &mut dyn Any,
        _key: Box<dyn Any>,
        _value: Option<Box<dyn Any>>,
        _registry: &ClassRegistry,
    ) -> Result<(), ContainerError> {
        Err(ContainerError::WrongShape {
            expected: ContainerShape::Map,
        })
    }

    /// Removes the entry at iteration position `index`.
    fn remove_element(&self, container: &mut dyn Any, index: usize) -> Result<(), ContainerError>;

    /// Removes a set element or map entry. Returns whether it was present.
    fn remove_by_key(&self, _container: &mut dyn Any, _key: &dyn Any) -> Result<bool, ContainerError> {
        Err(ContainerError::WrongShape {
            expected: ContainerShape::Map,
        })
    }

    fn clear(&self, container: &mut dyn Any) -> Result<(), ContainerError>;
}

impl fmt::Debug for dyn ContainerAccessor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContainerAccessor")
            .field("shape", &self.shape())
            .field("container", &self.container_type())
            .field("key", &self.key_type())
            .field("element", &self.element_type())
            .finish()
    }
}

// -----------------------------------------------------------------------------
// Helpers

#[inline]
pub(crate) fn downcast<C: Any>(container: &dyn Any) -> Result<&C, ContainerError> {
    container
        .downcast_ref::<C>()
        .ok_or(ContainerError::ContainerMismatch {
            expected: type_name::<C>(),
        })
}

#[inline]
pub(crate) fn downcast_mut<C: Any>(container: &mut dyn Any) -> Result<&mut C, ContainerError> {
    container
        .downcast_mut::<C>()
        .ok_or(ContainerError::ContainerMismatch {
            expected: type_name::<C>(),
        })
}

/// Unboxes `value`, or builds a default `T` through `registry`.
pub(crate) fn take_or_default<T: Any>(
    value: Option<Box<dyn Any>>,
    registry: &ClassRegistry,
) -> Result<T, ContainerError> {
    let boxed = match value {
        Some(value) => value,
        None => registry
            .create_default(TypeIdent::of::<T>())
            .ok_or_else(|| ContainerError::NotDefaultConstructible(type_name::<T>().into()))?,
    };
    boxed
        .downcast::<T>()
        .map(|value| *value)
        .map_err(|_| ContainerError::ValueMismatch {
            expected: type_name::<T>(),
        })
}
