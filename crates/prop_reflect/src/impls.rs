//! `Reflect` for primitives and the standard containers.

use alloc::borrow::Cow;
use alloc::collections::{BTreeMap, BTreeSet, VecDeque};
use alloc::format;
use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::hash::{BuildHasher, Hash};

use crate::Reflect;
use crate::container::{ArrayAccessor, ContainerAccessor, MapAccessor, SequenceAccessor, SetAccessor};
use crate::registry::ClassRegistry;

// -----------------------------------------------------------------------------
// Leaves

macro_rules! impl_reflect_leaf {
    ($($ty:ty => $name:literal),* $(,)?) => {$(
        impl Reflect for $ty {
            #[inline]
            fn type_name() -> Cow<'static, str> {
                Cow::Borrowed($name)
            }

            #[inline]
            fn register_dependencies(registry: &mut ClassRegistry) {
                registry.register_leaf::<Self>();
            }
        }
    )*};
}

impl_reflect_leaf! {
    bool => "bool",
    char => "char",
    i8 => "i8",
    i16 => "i16",
    i32 => "i32",
    i64 => "i64",
    isize => "isize",
    u8 => "u8",
    u16 => "u16",
    u32 => "u32",
    u64 => "u64",
    usize => "usize",
    f32 => "f32",
    f64 => "f64",
    String => "String",
}

// -----------------------------------------------------------------------------
// Sequences

impl<T: Reflect> Reflect for Vec<T> {
    fn type_name() -> Cow<'static, str> {
        Cow::Owned(format!("Vec<{}>", T::type_name()))
    }

    #[inline]
    fn container_accessor() -> Option<Arc<dyn ContainerAccessor>> {
        Some(SequenceAccessor::<Self>::shared())
    }

    #[inline]
    fn register_dependencies(registry: &mut ClassRegistry) {
        T::register_dependencies(registry);
    }
}

impl<T: Reflect> Reflect for VecDeque<T> {
    fn type_name() -> Cow<'static, str> {
        Cow::Owned(format!("VecDeque<{}>", T::type_name()))
    }

    #[inline]
    fn container_accessor() -> Option<Arc<dyn ContainerAccessor>> {
        Some(SequenceAccessor::<Self>::shared())
    }

    #[inline]
    fn register_dependencies(registry: &mut ClassRegistry) {
        T::register_dependencies(registry);
    }
}

impl<T: Reflect, const N: usize> Reflect for [T; N] {
    fn type_name() -> Cow<'static, str> {
        Cow::Owned(format!("[{}; {N}]", T::type_name()))
    }

    #[inline]
    fn container_accessor() -> Option<Arc<dyn ContainerAccessor>> {
        Some(ArrayAccessor::<T, N>::shared())
    }

    #[inline]
    fn register_dependencies(registry: &mut ClassRegistry) {
        T::register_dependencies(registry);
    }
}

// -----------------------------------------------------------------------------
// Sets

impl<T: Reflect + Ord> Reflect for BTreeSet<T> {
    fn type_name() -> Cow<'static, str> {
        Cow::Owned(format!("BTreeSet<{}>", T::type_name()))
    }

    #[inline]
    fn container_accessor() -> Option<Arc<dyn ContainerAccessor>> {
        Some(SetAccessor::<Self>::shared())
    }

    #[inline]
    fn register_dependencies(registry: &mut ClassRegistry) {
        T::register_dependencies(registry);
    }
}

macro_rules! impl_reflect_hash_set {
    ($($set:ident)::+) => {
        impl<T, S> Reflect for $($set)::+<T, S>
        where
            T: Reflect + Eq + Hash,
            S: BuildHasher + Default + 'static,
        {
            fn type_name() -> Cow<'static, str> {
                Cow::Owned(format!("HashSet<{}>", T::type_name()))
            }

            #[inline]
            fn container_accessor() -> Option<Arc<dyn ContainerAccessor>> {
                Some(SetAccessor::<Self>::shared())
            }

            #[inline]
            fn register_dependencies(registry: &mut ClassRegistry) {
                T::register_dependencies(registry);
            }
        }
    };
}

impl_reflect_hash_set!(std::collections::HashSet);
impl_reflect_hash_set!(prop_utils::hash::hashbrown::HashSet);

// -----------------------------------------------------------------------------
// Maps

impl<K: Reflect + Ord, V: Reflect> Reflect for BTreeMap<K, V> {
    fn type_name() -> Cow<'static, str> {
        Cow::Owned(format!("BTreeMap<{}, {}>", K::type_name(), V::type_name()))
    }

    #[inline]
    fn container_accessor() -> Option<Arc<dyn ContainerAccessor>> {
        Some(MapAccessor::<Self>::shared())
    }

    fn register_dependencies(registry: &mut ClassRegistry) {
        K::register_dependencies(registry);
        V::register_dependencies(registry);
    }
}

macro_rules! impl_reflect_hash_map {
    ($($map:ident)::+) => {
        impl<K, V, S> Reflect for $($map)::+<K, V, S>
        where
            K: Reflect + Eq + Hash,
            V: Reflect,
            S: BuildHasher + Default + 'static,
        {
            fn type_name() -> Cow<'static, str> {
                Cow::Owned(format!("HashMap<{}, {}>", K::type_name(), V::type_name()))
            }

            #[inline]
            fn container_accessor() -> Option<Arc<dyn ContainerAccessor>> {
                Some(MapAccessor::<Self>::shared())
            }

            fn register_dependencies(registry: &mut ClassRegistry) {
                K::register_dependencies(registry);
                V::register_dependencies(registry);
            }
        }
    };
}

impl_reflect_hash_map!(std::collections::HashMap);
impl_reflect_hash_map!(prop_utils::hash::hashbrown::HashMap);

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use std::collections::{BTreeMap, HashMap, HashSet};

    use crate::container::ContainerShape;
    use crate::registry::{ClassRegistry, TypeKind};
    use crate::{Reflect, TypeIdent};

    #[test]
    fn type_names() {
        assert_eq!(<Vec<f32>>::type_name(), "Vec<f32>");
        assert_eq!(<[u8; 4]>::type_name(), "[u8; 4]");
        assert_eq!(<BTreeMap<String, Vec<i32>>>::type_name(), "BTreeMap<String, Vec<i32>>");
        assert_eq!(<HashSet<char>>::type_name(), "HashSet<char>");
    }

    #[test]
    fn shapes() {
        let shape = |accessor: Option<std::sync::Arc<dyn crate::container::ContainerAccessor>>| {
            accessor.map(|accessor| accessor.shape())
        };
        assert_eq!(shape(<Vec<u8>>::container_accessor()), Some(ContainerShape::Sequence));
        assert_eq!(shape(<[u8; 2]>::container_accessor()), Some(ContainerShape::Sequence));
        assert_eq!(shape(<HashSet<u8>>::container_accessor()), Some(ContainerShape::Set));
        assert_eq!(shape(<HashMap<u8, u8>>::container_accessor()), Some(ContainerShape::Map));
        assert_eq!(shape(<u8>::container_accessor()), None);
    }

    #[test]
    fn container_dependencies_reach_elements() {
        let mut registry = ClassRegistry::empty();
        <BTreeMap<u16, Vec<bool>>>::register_dependencies(&mut registry);
        assert_eq!(registry.classify(TypeIdent::of::<u16>()), TypeKind::Leaf);
        assert_eq!(registry.classify(TypeIdent::of::<bool>()), TypeKind::Leaf);
        assert_eq!(registry.classify(TypeIdent::of::<i8>()), TypeKind::Unregistered);
    }
}
