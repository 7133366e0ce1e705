use alloc::boxed::Box;
use alloc::collections::BTreeSet;
use alloc::sync::Arc;
use core::any::Any;
use core::hash::{BuildHasher, Hash};
use core::marker::PhantomData;

use super::{ContainerAccessor, ContainerError, ContainerShape, Entry, EntryKey, EntryMut};
use super::{downcast, downcast_mut, take_or_default};
use crate::registry::ClassRegistry;
use crate::{Reflect, TypeIdent};

/// A collection of unique elements.
pub trait SetLike: Default + Any {
    type Item: Reflect;

    fn len(&self) -> usize;

    fn contains(&self, item: &Self::Item) -> bool;

    /// Returns `false` if an equal element was already present.
    fn insert(&mut self, item: Self::Item) -> bool;

    fn remove(&mut self, item: &Self::Item) -> bool;

    /// Removes the element at iteration position `index`.
    fn remove_nth(&mut self, index: usize) -> bool;

    fn clear(&mut self);

    fn iter(&self) -> impl Iterator<Item = &Self::Item>;
}

macro_rules! impl_set_like {
    ($ty:ident<T $(, $s:ident)?> where T: $($bound:path),+) => {
        impl<T: Reflect $(+ $bound)+ $(, $s: BuildHasher + Default + 'static)?> SetLike for $ty<T $(, $s)?> {
            type Item = T;

            #[inline]
            fn len(&self) -> usize {
                $ty::len(self)
            }

            #[inline]
            fn contains(&self, item: &T) -> bool {
                $ty::contains(self, item)
            }

            #[inline]
            fn insert(&mut self, item: T) -> bool {
                $ty::insert(self, item)
            }

            #[inline]
            fn remove(&mut self, item: &T) -> bool {
                $ty::remove(self, item)
            }

            fn remove_nth(&mut self, index: usize) -> bool {
                let before = $ty::len(self);
                let mut position = 0;
                self.retain(|_| {
                    let keep = position != index;
                    position += 1;
                    keep
                });
                $ty::len(self) != before
            }

            #[inline]
            fn clear(&mut self) {
                $ty::clear(self);
            }

            #[inline]
            fn iter(&self) -> impl Iterator<Item = &T> {
                $ty::iter(self)
            }
        }
    };
}

impl_set_like!(BTreeSet<T> where T: Ord);

mod std_set {
    use super::*;
    use std::collections::HashSet;

    impl_set_like!(HashSet<T, S> where T: Eq, Hash);
}

mod hashbrown_set {
    use super::*;
    use prop_utils::hash::hashbrown::HashSet;

    impl_set_like!(HashSet<T, S> where T: Eq, Hash);
}

// -----------------------------------------------------------------------------
// SetAccessor

/// [`ContainerAccessor`] for any [`SetLike`] collection.
///
/// Set elements are keys: they can be added and removed, never edited in place.
pub struct SetAccessor<C: SetLike> {
    element: Option<Arc<dyn ContainerAccessor>>,
    _marker: PhantomData<fn() -> C>,
}

impl<C: SetLike> SetAccessor<C> {
    pub fn new() -> Self {
        Self {
            element: <C::Item as Reflect>::container_accessor(),
            _marker: PhantomData,
        }
    }

    #[inline]
    pub fn shared() -> Arc<dyn ContainerAccessor> {
        Arc::new(Self::new())
    }
}

impl<C: SetLike> ContainerAccessor for SetAccessor<C> {
    #[inline]
    fn shape(&self) -> ContainerShape {
        ContainerShape::Set
    }

    #[inline]
    fn container_type(&self) -> TypeIdent {
        TypeIdent::of::<C>()
    }

    #[inline]
    fn element_type(&self) -> TypeIdent {
        TypeIdent::of::<C::Item>()
    }

    #[inline]
    fn element_accessor(&self) -> Option<&Arc<dyn ContainerAccessor>> {
        self.element.as_ref()
    }

    fn new_empty(&self, _registry: &ClassRegistry) -> Option<Box<dyn Any>> {
        Some(Box::new(C::default()))
    }

    fn len(&self, container: &dyn Any) -> Option<usize> {
        downcast::<C>(container).ok().map(C::len)
    }

    fn for_each<'a>(
        &self,
        container: &'a dyn Any,
        f: &mut dyn FnMut(Entry<'a>),
    ) -> Result<(), ContainerError> {
        for (index, item) in downcast::<C>(container)?.iter().enumerate() {
            f(Entry {
                key: EntryKey::Index(index),
                value: item,
            });
        }
        Ok(())
    }

    fn for_each_mut<'a>(
        &self,
        _container: &'a mut dyn Any,
        _f: &mut dyn FnMut(EntryMut<'a>),
    ) -> Result<(), ContainerError> {
        Err(ContainerError::Immutable {
            shape: ContainerShape::Set,
        })
    }

    fn element<'a>(&self, container: &'a dyn Any, index: usize) -> Option<&'a dyn Any> {
        downcast::<C>(container)
            .ok()?
            .iter()
            .nth(index)
            .map(|item| item as &dyn Any)
    }

    #[inline]
    fn element_mut<'a>(&self, _container: &'a mut dyn Any, _index: usize) -> Option<&'a mut dyn Any> {
        None
    }

    fn add_element(
        &self,
        container: &mut dyn Any,
        value: Option<Box<dyn Any>>,
        registry: &ClassRegistry,
    ) -> Result<(), ContainerError> {
        let set = downcast_mut::<C>(container)?;
        let item = take_or_default::<C::Item>(value, registry)?;
        if set.contains(&item) {
            return Err(ContainerError::Duplicate);
        }
        set.insert(item);
        Ok(())
    }

    fn remove_element(&self, container: &mut dyn Any, index: usize) -> Result<(), ContainerError> {
        let set = downcast_mut::<C>(container)?;
        let len = set.len();
        if set.remove_nth(index) {
            Ok(())
        } else {
            Err(ContainerError::OutOfBounds { index, len })
        }
    }

    fn remove_by_key(&self, container: &mut dyn Any, key: &dyn Any) -> Result<bool, ContainerError> {
        let set = downcast_mut::<C>(container)?;
        let item = key
            .downcast_ref::<C::Item>()
            .ok_or(ContainerError::ValueMismatch {
                expected: core::any::type_name::<C::Item>(),
            })?;
        Ok(set.remove(item))
    }

    fn clear(&self, container: &mut dyn Any) -> Result<(), ContainerError> {
        downcast_mut::<C>(container)?.clear();
        Ok(())
    }
}

// -----------------------------------------------------------------------------
// Tests
