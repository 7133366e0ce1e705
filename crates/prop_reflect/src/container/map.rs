use alloc::boxed::Box;
use alloc::collections::BTreeMap;
use alloc::sync::Arc;
use core::any::{Any, type_name};
use core::hash::{BuildHasher, Hash};
use core::marker::PhantomData;

use super::{ContainerAccessor, ContainerError, ContainerShape, Entry, EntryKey, EntryMut};
use super::{downcast, downcast_mut, take_or_default};
use crate::registry::ClassRegistry;
use crate::{Reflect, TypeIdent};

/// An associative collection.
pub trait MapLike: Default + Any {
    type Key: Reflect;
    type Value: Reflect;

    fn len(&self) -> usize;

    fn get(&self, key: &Self::Key) -> Option<&Self::Value>;

    fn get_mut(&mut self, key: &Self::Key) -> Option<&mut Self::Value>;

    fn insert(&mut self, key: Self::Key, value: Self::Value) -> Option<Self::Value>;

    fn remove(&mut self, key: &Self::Key) -> Option<Self::Value>;

    /// Removes the entry at iteration position `index`.
    fn remove_nth(&mut self, index: usize) -> bool;

    fn clear(&mut self);

    fn iter(&self) -> impl Iterator<Item = (&Self::Key, &Self::Value)>;

    fn iter_mut(&mut self) -> impl Iterator<Item = (&Self::Key, &mut Self::Value)>;
}

macro_rules! impl_map_like {
    ($ty:ident<K, V $(, $s:ident)?> where K: $($bound:path),+) => {
        impl<K: Reflect $(+ $bound)+, V: Reflect $(, $s: BuildHasher + Default + 'static)?> MapLike
            for $ty<K, V $(, $s)?>
        {
            type Key = K;
            type Value = V;

            #[inline]
            fn len(&self) -> usize {
                $ty::len(self)
            }

            #[inline]
            fn get(&self, key: &K) -> Option<&V> {
                $ty::get(self, key)
            }

            #[inline]
            fn get_mut(&mut self, key: &K) -> Option<&mut V> {
                $ty::get_mut(self, key)
            }

            #[inline]
            fn insert(&mut self, key: K, value: V) -> Option<V> {
                $ty::insert(self, key, value)
            }

            #[inline]
            fn remove(&mut self, key: &K) -> Option<V> {
                $ty::remove(self, key)
            }

            fn remove_nth(&mut self, index: usize) -> bool {
                let before = $ty::len(self);
                let mut position = 0;
                self.retain(|_, _| {
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
            fn iter(&self) -> impl Iterator<Item = (&K, &V)> {
                $ty::iter(self)
            }

            #[inline]
            fn iter_mut(&mut self) -> impl Iterator<Item = (&K, &mut V)> {
                $ty::iter_mut(self)
            }
        }
    };
}

impl_map_like!(BTreeMap<K, V> where K: Ord);

mod std_map {
    use super::*;
    use std::collections::HashMap;

    impl_map_like!(HashMap<K, V, S> where K: Eq, Hash);
}

mod hashbrown_map {
    use super::*;
    use prop_utils::hash::hashbrown::HashMap;

    impl_map_like!(HashMap<K, V, S> where K: Eq, Hash);
}

// -----------------------------------------------------------------------------
// MapAccessor

/// [`ContainerAccessor`] for any [`MapLike`] collection.
///
/// Iteration yields [`EntryKey::Key`] with the key and the value as element.
pub struct MapAccessor<C: MapLike> {
    value: Option<Arc<dyn ContainerAccessor>>,
    _marker: PhantomData<fn() -> C>,
}

impl<C: MapLike> MapAccessor<C> {
    pub fn new() -> Self {
        Self {
            value: <C::Value as Reflect>::container_accessor(),
            _marker: PhantomData,
        }
    }

    #[inline]
    pub fn shared() -> Arc<dyn ContainerAccessor> {
        Arc::new(Self::new())
    }

    fn key<'k>(key: &'k dyn Any) -> Result<&'k C::Key, ContainerError> {
        key.downcast_ref::<C::Key>()
            .ok_or(ContainerError::ValueMismatch {
                expected: type_name::<C::Key>(),
            })
    }
}

impl<C: MapLike> ContainerAccessor for MapAccessor<C> {
    #[inline]
    fn shape(&self) -> ContainerShape {
        ContainerShape::Map
    }

    #[inline]
    fn container_type(&self) -> TypeIdent {
        TypeIdent::of::<C>()
    }

    #[inline]
    fn element_type(&self) -> TypeIdent {
        TypeIdent::of::<C::Value>()
    }

    #[inline]
    fn key_type(&self) -> Option<TypeIdent> {
        Some(TypeIdent::of::<C::Key>())
    }

    #[inline]
    fn element_accessor(&self) -> Option<&Arc<dyn ContainerAccessor>> {
        self.value.as_ref()
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
        for (key, value) in downcast::<C>(container)?.iter() {
            f(Entry {
                key: EntryKey::Key(key),
                value,
            });
        }
        Ok(())
    }

    fn for_each_mut<'a>(
        &self,
        container: &'a mut dyn Any,
        f: &mut dyn FnMut(EntryMut<'a>),
    ) -> Result<(), ContainerError> {
        for (key, value) in downcast_mut::<C>(container)?.iter_mut() {
            f(EntryMut {
                key: EntryKey::Key(key),
                value,
            });
        }
        Ok(())
    }

    fn element<'a>(&self, container: &'a dyn Any, index: usize) -> Option<&'a dyn Any> {
        downcast::<C>(container)
            .ok()?
            .iter()
            .nth(index)
            .map(|(_, value)| value as &dyn Any)
    }

    fn element_mut<'a>(
        &self,
        container: &'a mut dyn Any,
        index: usize,
    ) -> Option<&'a mut dyn Any> {
        downcast_mut::<C>(container)
            .ok()?
            .iter_mut()
            .nth(index)
            .map(|(_, value)| value as &mut dyn Any)
    }

    fn value_by_key<'a>(&self, container: &'a dyn Any, key: &dyn Any) -> Option<&'a dyn Any> {
        let map = downcast::<C>(container).ok()?;
        map.get(Self::key(key).ok()?).map(|value| value as &dyn Any)
    }

    fn value_by_key_mut<'a>(
        &self,
        container: &'a mut dyn Any,
        key: &dyn Any,
    ) -> Option<&'a mut dyn Any> {
        let map = downcast_mut::<C>(container).ok()?;
        map.get_mut(Self::key(key).ok()?)
            .map(|value| value as &mut dyn Any)
    }

    fn add_element(
        &self,
        _container: &mut dyn Any,
        _value: Option<Box<dyn Any>>,
        _registry: &ClassRegistry,
    ) -> Result<(), ContainerError> {
        Err(ContainerError::WrongShape {
            expected: ContainerShape::Sequence,
        })
    }

    fn insert_entry(
        &self,
        container: &mut dyn Any,
        key: Box<dyn Any>,
        value: Option<Box<dyn Any>>,
        registry: &ClassRegistry,
    ) -> Result<(), ContainerError> {
        let map = downcast_mut::<C>(container)?;
        let key = key
            .downcast::<C::Key>()
            .map_err(|_| ContainerError::ValueMismatch {
                expected: type_name::<C::Key>(),
            })?;
        let value = take_or_default::<C::Value>(value, registry)?;
        map.insert(*key, value);
        Ok(())
    }

    fn remove_element(&self, container: &mut dyn Any, index: usize) -> Result<(), ContainerError> {
        let map = downcast_mut::<C>(container)?;
        let len = map.len();
        if map.remove_nth(index) {
            Ok(())
        } else {
            Err(ContainerError::OutOfBounds { index, len })
        }
    }

    fn remove_by_key(&self, container: &mut dyn Any, key: &dyn Any) -> Result<bool, ContainerError> {
        let map = downcast_mut::<C>(container)?;
        Ok(map.remove(Self::key(key)?).is_some())
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
    use alloc::string::String;

    #[test]
    fn insert_lookup_and_remove_by_key() {
        let registry = ClassRegistry::new();
        let accessor = MapAccessor::<BTreeMap<String, f64>>::new();
        assert!(accessor.is_map_like());
        assert_eq!(accessor.key_type(), Some(TypeIdent::of::<String>()));

        let mut map: BTreeMap<String, f64> = BTreeMap::new();
        accessor
            .insert_entry(&mut map, Box::new(String::from("b")), Some(Box::new(2.0_f64)), &registry)
            .unwrap();
        accessor
            .insert_entry(&mut map, Box::new(String::from("a")), None, &registry)
            .unwrap();
        assert_eq!(map["a"], 0.0);

        let key = String::from("b");
        let value = accessor.value_by_key(&map, &key).unwrap();
        assert_eq!(value.downcast_ref::<f64>(), Some(&2.0));

        assert_eq!(accessor.remove_by_key(&mut map, &key), Ok(true));
        assert_eq!(accessor.len(&map), Some(1));
    }

    #[test]
    fn keys_of_the_wrong_type_are_refused() {
        let registry = ClassRegistry::new();
        let accessor = MapAccessor::<std::collections::HashMap<u32, bool>>::new();
        let mut map = std::collections::HashMap::<u32, bool>::new();
        let err = accessor
            .insert_entry(&mut map, Box::new("one"), None, &registry)
            .unwrap_err();
        assert!(matches!(err, ContainerError::ValueMismatch { .. }));
        assert!(
            accessor
                .add_element(&mut map, None, &registry)
                .is_err()
        );
        assert!(map.is_empty());
    }

    #[test]
    fn for_each_yields_keys() {
        let accessor = MapAccessor::<BTreeMap<u8, u8>>::new();
        let map = BTreeMap::from([(1_u8, 10_u8), (2, 20)]);
        let mut pairs = Vec::new();
        accessor
            .for_each(&map, &mut |entry| {
                let EntryKey::Key(key) = entry.key else {
                    unreachable!()
                };
                pairs.push((
                    *key.downcast_ref::<u8>().unwrap(),
                    *entry.value.downcast_ref::<u8>().unwrap(),
                ));
            })
            .unwrap();
        assert_eq!(pairs, [(1, 10), (2, 20)]);
    }
}
