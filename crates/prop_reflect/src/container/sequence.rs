use alloc::boxed::Box;
use alloc::collections::VecDeque;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::any::Any;
use core::marker::PhantomData;

use super::{ContainerAccessor, ContainerError, ContainerShape, Entry, EntryKey, EntryMut};
use super::{downcast, downcast_mut, take_or_default};
use crate::registry::ClassRegistry;
use crate::{Reflect, TypeIdent};

/// An ordered, index-addressed collection.
pub trait SequenceLike: Default + Any {
    type Item: Reflect;

    fn len(&self) -> usize;

    fn get(&self, index: usize) -> Option<&Self::Item>;

    fn get_mut(&mut self, index: usize) -> Option<&mut Self::Item>;

    fn push(&mut self, item: Self::Item);

    fn remove(&mut self, index: usize) -> Option<Self::Item>;

    fn clear(&mut self);

    fn iter(&self) -> impl Iterator<Item = &Self::Item>;

    fn iter_mut(&mut self) -> impl Iterator<Item = &mut Self::Item>;
}

impl<T: Reflect> SequenceLike for Vec<T> {
    type Item = T;

    #[inline]
    fn len(&self) -> usize {
        <[T]>::len(self)
    }

    #[inline]
    fn get(&self, index: usize) -> Option<&T> {
        <[T]>::get(self, index)
    }

    #[inline]
    fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        <[T]>::get_mut(self, index)
    }

    #[inline]
    fn push(&mut self, item: T) {
        Vec::push(self, item);
    }

    fn remove(&mut self, index: usize) -> Option<T> {
        (index < Vec::len(self)).then(|| Vec::remove(self, index))
    }

    #[inline]
    fn clear(&mut self) {
        Vec::clear(self);
    }

    #[inline]
    fn iter(&self) -> impl Iterator<Item = &T> {
        <[T]>::iter(self)
    }

    #[inline]
    fn iter_mut(&mut self) -> impl Iterator<Item = &mut T> {
        <[T]>::iter_mut(self)
    }
}

impl<T: Reflect> SequenceLike for VecDeque<T> {
    type Item = T;

    #[inline]
    fn len(&self) -> usize {
        VecDeque::len(self)
    }

    #[inline]
    fn get(&self, index: usize) -> Option<&T> {
        VecDeque::get(self, index)
    }

    #[inline]
    fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        VecDeque::get_mut(self, index)
    }

    #[inline]
    fn push(&mut self, item: T) {
        self.push_back(item);
    }

    #[inline]
    fn remove(&mut self, index: usize) -> Option<T> {
        VecDeque::remove(self, index)
    }

    #[inline]
    fn clear(&mut self) {
        VecDeque::clear(self);
    }

    #[inline]
    fn iter(&self) -> impl Iterator<Item = &T> {
        VecDeque::iter(self)
    }

    #[inline]
    fn iter_mut(&mut self) -> impl Iterator<Item = &mut T> {
        VecDeque::iter_mut(self)
    }
}

// -----------------------------------------------------------------------------
// SequenceAccessor

/// [`ContainerAccessor`] for any [`SequenceLike`] collection.
pub struct SequenceAccessor<C: SequenceLike> {
    element: Option<Arc<dyn ContainerAccessor>>,
    _marker: PhantomData<fn() -> C>,
}

impl<C: SequenceLike> SequenceAccessor<C> {
    pub fn new() -> Self {
        Self {
            element: <C::Item as Reflect>::container_accessor(),
            _marker: PhantomData,
        }
    }

    /// Shared accessor, ready to return from `Reflect::container_accessor`.
    #[inline]
    pub fn shared() -> Arc<dyn ContainerAccessor> {
        Arc::new(Self::new())
    }
}

impl<C: SequenceLike> ContainerAccessor for SequenceAccessor<C> {
    #[inline]
    fn shape(&self) -> ContainerShape {
        ContainerShape::Sequence
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
        container: &'a mut dyn Any,
        f: &mut dyn FnMut(EntryMut<'a>),
    ) -> Result<(), ContainerError> {
        for (index, item) in downcast_mut::<C>(container)?.iter_mut().enumerate() {
            f(EntryMut {
                key: EntryKey::Index(index),
                value: item,
            });
        }
        Ok(())
    }

    fn element<'a>(&self, container: &'a dyn Any, index: usize) -> Option<&'a dyn Any> {
        downcast::<C>(container)
            .ok()?
            .get(index)
            .map(|item| item as &dyn Any)
    }

    fn element_mut<'a>(
        &self,
        container: &'a mut dyn Any,
        index: usize,
    ) -> Option<&'a mut dyn Any> {
        downcast_mut::<C>(container)
            .ok()?
            .get_mut(index)
            .map(|item| item as &mut dyn Any)
    }

    fn add_element(
        &self,
        container: &mut dyn Any,
        value: Option<Box<dyn Any>>,
        registry: &ClassRegistry,
    ) -> Result<(), ContainerError> {
        let sequence = downcast_mut::<C>(container)?;
        sequence.push(take_or_default::<C::Item>(value, registry)?);
        Ok(())
    }

    fn remove_element(&self, container: &mut dyn Any, index: usize) -> Result<(), ContainerError> {
        let sequence = downcast_mut::<C>(container)?;
        let len = sequence.len();
        match sequence.remove(index) {
            Some(_) => Ok(()),
            None => Err(ContainerError::OutOfBounds { index, len }),
        }
    }

    fn clear(&self, container: &mut dyn Any) -> Result<(), ContainerError> {
        downcast_mut::<C>(container)?.clear();
        Ok(())
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    #[test]
    fn deque_push_and_remove() {
        let registry = ClassRegistry::new();
        let accessor = SequenceAccessor::<VecDeque<String>>::new();
        let mut deque: VecDeque<String> = VecDeque::new();

        accessor
            .add_element(&mut deque, Some(Box::new(String::from("a"))), &registry)
            .unwrap();
        accessor.add_element(&mut deque, None, &registry).unwrap();
        assert_eq!(deque, ["a", ""]);

        accessor.remove_element(&mut deque, 0).unwrap();
        assert_eq!(accessor.len(&deque), Some(1));
        assert_eq!(
            accessor.remove_element(&mut deque, 5),
            Err(ContainerError::OutOfBounds { index: 5, len: 1 })
        );
    }

    #[test]
    fn wrong_value_type_is_refused() {
        let registry = ClassRegistry::new();
        let accessor = SequenceAccessor::<Vec<u8>>::new();
        let mut bytes: Vec<u8> = vec![1];
        let err = accessor
            .add_element(&mut bytes, Some(Box::new(1_u32)), &registry)
            .unwrap_err();
        assert!(matches!(err, ContainerError::ValueMismatch { .. }));
        assert_eq!(bytes, [1]);
    }

    #[test]
    fn wrong_container_type_is_refused() {
        let accessor = SequenceAccessor::<Vec<u8>>::new();
        let mut not_a_vec = 3_u8;
        assert!(accessor.len(&not_a_vec).is_none());
        assert!(matches!(
            accessor.clear(&mut not_a_vec),
            Err(ContainerError::ContainerMismatch { .. })
        ));
    }

    #[test]
    fn nested_sequences_expose_element_accessor() {
        let accessor = SequenceAccessor::<Vec<Vec<f32>>>::new();
        let inner = accessor.element_accessor().unwrap();
        assert_eq!(inner.container_type(), TypeIdent::of::<Vec<f32>>());
        assert_eq!(inner.element_type(), TypeIdent::of::<f32>());

        let mut grid: Vec<Vec<f32>> = vec![vec![1.0], vec![]];
        let row = accessor.element_mut(&mut grid, 1).unwrap();
        inner
            .add_element(row, Some(Box::new(2.5_f32)), &ClassRegistry::new())
            .unwrap();
        assert_eq!(grid[1], [2.5]);
    }
}
