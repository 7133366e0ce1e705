use alloc::boxed::Box;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::any::{Any, type_name};
use core::marker::PhantomData;

use super::{ContainerAccessor, ContainerError, ContainerShape, Entry, EntryKey, EntryMut};
use super::{downcast, downcast_mut};
use crate::registry::ClassRegistry;
use crate::{Reflect, TypeIdent};

/// [`ContainerAccessor`] for `[T; N]`.
///
/// Elements can be read and edited in place; the length never changes.
pub struct ArrayAccessor<T, const N: usize> {
    element: Option<Arc<dyn ContainerAccessor>>,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Reflect, const N: usize> ArrayAccessor<T, N> {
    pub fn new() -> Self {
        Self {
            element: T::container_accessor(),
            _marker: PhantomData,
        }
    }

    #[inline]
    pub fn shared() -> Arc<dyn ContainerAccessor> {
        Arc::new(Self::new())
    }

    #[inline]
    fn fixed() -> ContainerError {
        ContainerError::FixedSize(type_name::<[T; N]>())
    }
}

impl<T: Reflect, const N: usize> ContainerAccessor for ArrayAccessor<T, N> {
    #[inline]
    fn shape(&self) -> ContainerShape {
        ContainerShape::Sequence
    }

    #[inline]
    fn container_type(&self) -> TypeIdent {
        TypeIdent::of::<[T; N]>()
    }

    #[inline]
    fn element_type(&self) -> TypeIdent {
        TypeIdent::of::<T>()
    }

    #[inline]
    fn element_accessor(&self) -> Option<&Arc<dyn ContainerAccessor>> {
        self.element.as_ref()
    }

    #[inline]
    fn is_fixed_size(&self) -> bool {
        true
    }

    /// Fills every slot with the registry's default for `T`.
    fn new_empty(&self, registry: &ClassRegistry) -> Option<Box<dyn Any>> {
        let mut items = Vec::with_capacity(N);
        for _ in 0..N {
            let item = registry.create_default(TypeIdent::of::<T>())?;
            items.push(*item.downcast::<T>().ok()?);
        }
        let array: [T; N] = items.try_into().ok()?;
        Some(Box::new(array))
    }

    fn len(&self, container: &dyn Any) -> Option<usize> {
        downcast::<[T; N]>(container).ok().map(|_| N)
    }

    fn for_each<'a>(
        &self,
        container: &'a dyn Any,
        f: &mut dyn FnMut(Entry<'a>),
    ) -> Result<(), ContainerError> {
        for (index, item) in downcast::<[T; N]>(container)?.iter().enumerate() {
            f(Entry {
                key: EntryKey::Index(index),
                value: item,
            });
        }
        Ok(())
    }

    fn for_each_mut<'a>(
        &self,
        container: &'a mut dyn Any,
        f: &mut dyn FnMut(EntryMut<'a>),
    ) -> Result<(), ContainerError> {
        for (index, item) in downcast_mut::<[T; N]>(container)?.iter_mut().enumerate() {
            f(EntryMut {
                key: EntryKey::Index(index),
                value: item,
            });
        }
        Ok(())
    }

    fn element<'a>(&self, container: &'a dyn Any, index: usize) -> Option<&'a dyn Any> {
        downcast::<[T; N]>(container)
            .ok()?
            .get(index)
            .map(|item| item as &dyn Any)
    }

    fn element_mut<'a>(
        &self,
        container: &'a mut dyn Any,
        index: usize,
    ) -> Option<&'a mut dyn Any> {
        downcast_mut::<[T; N]>(container)
            .ok()?
            .get_mut(index)
            .map(|item| item as &mut dyn Any)
    }

    fn add_element(
        &self,
        _container: &mut dyn Any,
        _value: Option<Box<dyn Any>>,
        _registry: &ClassRegistry,
    ) -> Result<(), ContainerError> {
        Err(Self::fixed())
    }

    fn remove_element(&self, _container: &mut dyn Any, _index: usize) -> Result<(), ContainerError> {
        Err(Self::fixed())
    }

    fn clear(&self, _container: &mut dyn Any) -> Result<(), ContainerError> {
        Err(Self::fixed())
    }
}

// -----------------------------------------------------------------------------
// Tests
