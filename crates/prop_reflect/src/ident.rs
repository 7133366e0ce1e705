use alloc::vec::Vec;
use core::any::TypeId;
use core::fmt;
use std::sync::{PoisonError, RwLock};

use prop_utils::TypeIdMap;

/// A stable, process-wide handle for one compile-time type.
///
/// Handles are assigned lazily, in first-request order, and never reused.
/// Two handles are equal exactly when they denote the same type, so every
/// reflection table is keyed by `TypeIdent`.
///
/// # Examples
///
/// ```
/// use prop_reflect::TypeIdent;
///
/// assert_eq!(TypeIdent::of::<f32>(), TypeIdent::of::<f32>());
/// assert_ne!(TypeIdent::of::<f32>(), TypeIdent::of::<f64>());
/// assert_eq!(TypeIdent::of::<u8>().type_name(), "u8");
/// ```
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TypeIdent(u32);

struct Interner {
    by_type: TypeIdMap<TypeIdent>,
    names: Vec<&'static str>,
}

static INTERNER: RwLock<Interner> = RwLock::new(Interner {
    by_type: TypeIdMap::new(),
    names: Vec::new(),
});

impl TypeIdent {
    /// Returns the handle of `T`, assigning one on first request.
    pub fn of<T: ?Sized + 'static>() -> Self {
        let type_id = TypeId::of::<T>();
        if let Some(ident) = Self::lookup(type_id) {
            return ident;
        }

        let mut interner = INTERNER.write().unwrap_or_else(PoisonError::into_inner);
        let Interner { by_type, names } = &mut *interner;
        *by_type.get_or_insert_with(type_id, || {
            let ident = TypeIdent(names.len() as u32);
            names.push(core::any::type_name::<T>());
            ident
        })
    }

    /// Returns the handle already assigned to `type_id`, without assigning.
    pub fn lookup(type_id: TypeId) -> Option<Self> {
        INTERNER
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .by_type
            .get(&type_id)
            .copied()
    }

    /// The dense index behind this handle.
    #[inline]
    pub const fn index(self) -> u32 {
        self.0
    }

    /// The Rust type name recorded when the handle was assigned.
    pub fn type_name(self) -> &'static str {
        INTERNER
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .names
            .get(self.0 as usize)
            .copied()
            .unwrap_or("<unknown>")
    }
}

impl fmt::Debug for TypeIdent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeIdent({}: {})", self.0, self.type_name())
    }
}

impl fmt::Display for TypeIdent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name())
    }
}

// -----------------------------------------------------------------------------
// Tests
