//! Properties: one reflected field each.
//!
//! A [`Property`] never owns the field. It holds a [`FieldAccess`] that
//! resolves the field inside an instance the caller owns, handed over as
//! `&dyn Any`. Inherited properties chain the child-to-parent access in
//! front of the parent's own access, so they resolve on subtype instances.

use alloc::sync::Arc;
use core::any::Any;
use core::fmt;

use crate::container::ContainerAccessor;
use crate::meta::{MetaBuilder, PropertyMeta};
use crate::{Reflect, TypeIdent};

// -----------------------------------------------------------------------------
// FieldAccess

/// Resolves a field inside an erased instance.
///
/// Both methods return `None` when `instance` is not of the declaring type.
pub trait FieldAccess: Send + Sync + 'static {
    fn get<'a>(&self, instance: &'a dyn Any) -> Option<&'a dyn Any>;

    fn get_mut<'a>(&self, instance: &'a mut dyn Any) -> Option<&'a mut dyn Any>;
}

/// [`FieldAccess`] built from a pair of typed projections.
pub struct FieldFns<C, F> {
    get: fn(&C) -> &F,
    get_mut: fn(&mut C) -> &mut F,
}

impl<C, F> FieldFns<C, F> {
    #[inline]
    pub const fn new(get: fn(&C) -> &F, get_mut: fn(&mut C) -> &mut F) -> Self {
        Self { get, get_mut }
    }
}

impl<C: Any, F: Any> FieldAccess for FieldFns<C, F> {
    #[inline]
    fn get<'a>(&self, instance: &'a dyn Any) -> Option<&'a dyn Any> {
        instance
            .downcast_ref::<C>()
            .map(|owner| (self.get)(owner) as &dyn Any)
    }

    #[inline]
    fn get_mut<'a>(&self, instance: &'a mut dyn Any) -> Option<&'a mut dyn Any> {
        instance
            .downcast_mut::<C>()
            .map(|owner| (self.get_mut)(owner) as &mut dyn Any)
    }
}

/// `outer` leads from a subtype to its parent, `inner` from the parent to the field.
struct Chained {
    outer: Arc<dyn FieldAccess>,
    inner: Arc<dyn FieldAccess>,
}

impl FieldAccess for Chained {
    fn get<'a>(&self, instance: &'a dyn Any) -> Option<&'a dyn Any> {
        self.inner.get(self.outer.get(instance)?)
    }

    fn get_mut<'a>(&self, instance: &'a mut dyn Any) -> Option<&'a mut dyn Any> {
        self.inner.get_mut(self.outer.get_mut(instance)?)
    }
}

// -----------------------------------------------------------------------------
// Property

/// A named, typed field of a reflected class.
///
/// Created once when its class is registered and immutable afterwards;
/// clones share the accessor and metadata.
///
/// # Examples
///
/// ```
/// use prop_reflect::meta::MetaBuilder;
/// use prop_reflect::property::Property;
///
/// struct Light {
///     intensity: f32,
/// }
///
/// let prop = Property::new::<Light, f32>(
///     "intensity",
///     |light| &light.intensity,
///     |light| &mut light.intensity,
///     MetaBuilder::new().range(0.0, 10.0),
/// );
///
/// let mut light = Light { intensity: 2.0 };
/// *prop.get_as_mut::<f32>(&mut light).unwrap() = 4.0;
/// assert_eq!(light.intensity, 4.0);
/// assert!(prop.get_as::<f64>(&light).is_none());
/// ```
#[derive(Clone)]
pub struct Property {
    name: &'static str,
    type_ident: TypeIdent,
    declaring_type: TypeIdent,
    access: Arc<dyn FieldAccess>,
    container: Option<Arc<dyn ContainerAccessor>>,
    meta: Arc<PropertyMeta>,
    inherited: bool,
}

impl Property {
    /// Binds field `F` of class `C`.
    ///
    /// If `F` has a container shape, its [`ContainerAccessor`] is attached here.
    pub fn new<C: Any, F: Reflect>(
        name: &'static str,
        get: fn(&C) -> &F,
        get_mut: fn(&mut C) -> &mut F,
        meta: MetaBuilder<F>,
    ) -> Self {
        Self::from_access(
            name,
            TypeIdent::of::<F>(),
            TypeIdent::of::<C>(),
            Arc::new(FieldFns::new(get, get_mut)),
            F::container_accessor(),
            meta.build(),
        )
    }

    /// Builds a property from an arbitrary accessor.
    pub fn from_access(
        name: &'static str,
        type_ident: TypeIdent,
        declaring_type: TypeIdent,
        access: Arc<dyn FieldAccess>,
        container: Option<Arc<dyn ContainerAccessor>>,
        meta: PropertyMeta,
    ) -> Self {
        Self {
            name,
            type_ident,
            declaring_type,
            access,
            container,
            meta: Arc::new(meta),
            inherited: false,
        }
    }

    #[inline]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// The field's type.
    #[inline]
    pub fn type_ident(&self) -> TypeIdent {
        self.type_ident
    }

    /// The class that declared the field.
    #[inline]
    pub fn declaring_type(&self) -> TypeIdent {
        self.declaring_type
    }

    #[inline]
    pub fn meta(&self) -> &PropertyMeta {
        &self.meta
    }

    #[inline]
    pub fn is_container(&self) -> bool {
        self.container.is_some()
    }

    #[inline]
    pub fn container_accessor(&self) -> Option<&Arc<dyn ContainerAccessor>> {
        self.container.as_ref()
    }

    /// `true` when this copy was inherited from a parent class.
    #[inline]
    pub fn is_inherited(&self) -> bool {
        self.inherited
    }

    /// The field inside `instance`, or `None` if `instance` has the wrong type.
    #[inline]
    pub fn get<'a>(&self, instance: &'a dyn Any) -> Option<&'a dyn Any> {
        self.access.get(instance)
    }

    #[inline]
    pub fn get_mut<'a>(&self, instance: &'a mut dyn Any) -> Option<&'a mut dyn Any> {
        self.access.get_mut(instance)
    }

    pub fn get_as<'a, T: Any>(&self, instance: &'a dyn Any) -> Option<&'a T> {
        self.get(instance)?.downcast_ref()
    }

    pub fn get_as_mut<'a, T: Any>(&self, instance: &'a mut dyn Any) -> Option<&'a mut T> {
        self.get_mut(instance)?.downcast_mut()
    }

    /// This property as seen from a subtype reaching its parent through `upcast`.
    pub(crate) fn inherited_through(&self, upcast: &Arc<dyn FieldAccess>) -> Self {
        Self {
            access: Arc::new(Chained {
                outer: Arc::clone(upcast),
                inner: Arc::clone(&self.access),
            }),
            inherited: true,
            ..self.clone()
        }
    }
}

impl fmt::Debug for Property {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Property")
            .field("name", &self.name)
            .field("type", &self.type_ident)
            .field("declaring_type", &self.declaring_type)
            .field("container", &self.container.is_some())
            .field("inherited", &self.inherited)
            .finish()
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::*;

    struct Base {
        id: u32,
    }

    struct Derived {
        base: Base,
        tags: Vec<String>,
    }

    fn id_property() -> Property {
        Property::new::<Base, u32>("id", |b| &b.id, |b| &mut b.id, MetaBuilder::new())
    }

    #[test]
    fn wrong_instance_type_is_none() {
        let prop = id_property();
        let not_base = 5_u32;
        assert!(prop.get(&not_base).is_none());
        assert_eq!(prop.get_as::<u32>(&Base { id: 9 }), Some(&9));
    }

    #[test]
    fn inherited_property_resolves_on_subtype() {
        let upcast: Arc<dyn FieldAccess> =
            Arc::new(FieldFns::<Derived, Base>::new(|d| &d.base, |d| &mut d.base));
        let inherited = id_property().inherited_through(&upcast);

        let mut derived = Derived {
            base: Base { id: 1 },
            tags: Vec::new(),
        };
        *inherited.get_as_mut::<u32>(&mut derived).unwrap() = 7;
        assert_eq!(derived.base.id, 7);
        assert!(inherited.is_inherited());
        assert_eq!(inherited.declaring_type(), TypeIdent::of::<Base>());

        // The chained accessor no longer accepts the parent type directly.
        assert!(inherited.get(&Base { id: 0 }).is_none());
    }

    #[test]
    fn container_fields_carry_an_accessor() {
        let tags = Property::new::<Derived, Vec<String>>(
            "tags",
            |d| &d.tags,
            |d| &mut d.tags,
            MetaBuilder::new(),
        );
        assert!(tags.is_container());
        assert!(!id_property().is_container());
    }
}
