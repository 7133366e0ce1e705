use alloc::borrow::Cow;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::any::Any;
use core::fmt;
use core::marker::PhantomData;

use prop_utils::hash::HashMap;

use super::{ClassDescriptor, Constructor};
use crate::meta::MetaBuilder;
use crate::property::{FieldAccess, FieldFns, Property};
use crate::registry::ClassRegistry;
use crate::{Class, Reflect, TypeIdent};

// -----------------------------------------------------------------------------
// ParentLink

/// How a class reaches its single parent.
///
/// Inheritance is modelled by embedding: the child holds its parent as a
/// field, and the link projects a child instance onto that field.
#[derive(Clone)]
pub struct ParentLink {
    type_ident: TypeIdent,
    upcast: Arc<dyn FieldAccess>,
    register: fn(&mut ClassRegistry),
}

impl ParentLink {
    /// Links `C` to its embedded parent `P`.
    pub fn new<C: Any, P: Class>(get: fn(&C) -> &P, get_mut: fn(&mut C) -> &mut P) -> Self {
        Self {
            type_ident: TypeIdent::of::<P>(),
            upcast: Arc::new(FieldFns::new(get, get_mut)),
            register: P::register_dependencies,
        }
    }

    /// Links to a parent registered through other means.
    pub fn from_access(type_ident: TypeIdent, upcast: Arc<dyn FieldAccess>) -> Self {
        fn nothing(_: &mut ClassRegistry) {}

        Self {
            type_ident,
            upcast,
            register: nothing,
        }
    }

    #[inline]
    pub fn type_ident(&self) -> TypeIdent {
        self.type_ident
    }

    #[inline]
    pub fn upcast(&self) -> &Arc<dyn FieldAccess> {
        &self.upcast
    }

    /// The parent part of `instance`.
    #[inline]
    pub fn parent_of<'a>(&self, instance: &'a dyn Any) -> Option<&'a dyn Any> {
        self.upcast.get(instance)
    }

    #[inline]
    pub fn parent_of_mut<'a>(&self, instance: &'a mut dyn Any) -> Option<&'a mut dyn Any> {
        self.upcast.get_mut(instance)
    }

    /// Schedules the parent type with `registry`.
    #[inline]
    pub(crate) fn register_parent(&self, registry: &mut ClassRegistry) {
        (self.register)(registry);
    }
}

impl fmt::Debug for ParentLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ParentLink").field(&self.type_ident).finish()
    }
}

// -----------------------------------------------------------------------------
// ClassBuilder

/// Assembles a [`ClassDescriptor`] by hand.
///
/// This is the raw registration entry point: a name, an optional parent,
/// the properties in declaration order and the constructors. It is meant
/// to run inside a deferred initializer.
///
/// ```
/// use prop_reflect::TypeIdent;
/// use prop_reflect::class::{ClassBuilder, Constructor};
/// use prop_reflect::meta::MetaBuilder;
/// use prop_reflect::property::Property;
/// use prop_reflect::registry::ClassRegistry;
///
/// #[derive(Default)]
/// struct Fog {
///     density: f32,
/// }
///
/// let mut registry = ClassRegistry::new();
/// registry.register_type(TypeIdent::of::<Fog>(), |registry| {
///     let class = ClassBuilder::new("Fog", TypeIdent::of::<Fog>())
///         .with_property(Property::new::<Fog, f32>(
///             "density",
///             |fog| &fog.density,
///             |fog| &mut fog.density,
///             MetaBuilder::new().range(0.0, 1.0),
///         ))
///         .with_constructor(Constructor::new(Fog::default));
///     registry.insert_class(class);
/// });
/// registry.drain_pending();
///
/// let fog = registry.get_class_by_name("Fog").unwrap();
/// assert_eq!(fog.own_properties().len(), 1);
/// assert!(fog.can_create_instance());
/// ```
pub struct ClassBuilder {
    descriptor: ClassDescriptor,
}

impl ClassBuilder {
    pub fn new(name: impl Into<Cow<'static, str>>, type_ident: TypeIdent) -> Self {
        Self {
            descriptor: ClassDescriptor {
                name: name.into(),
                type_ident,
                parent: None,
                own: Vec::new(),
                own_index: HashMap::default(),
                all: Vec::new(),
                constructors: Vec::new(),
            },
        }
    }

    /// A builder named after [`Reflect::type_name`].
    #[inline]
    pub fn of<T: Reflect>() -> Self {
        Self::new(T::type_name(), TypeIdent::of::<T>())
    }

    #[inline]
    pub fn type_ident(&self) -> TypeIdent {
        self.descriptor.type_ident
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.descriptor.name
    }

    pub fn set_parent(&mut self, parent: ParentLink) -> &mut Self {
        self.descriptor.parent = Some(parent);
        self
    }

    pub fn with_parent(mut self, parent: ParentLink) -> Self {
        self.set_parent(parent);
        self
    }

    /// Appends a property. A duplicate name is ignored with a warning.
    pub fn add_property(&mut self, property: Property) -> bool {
        let desc = &mut self.descriptor;
        if desc.own_index.contains_key(property.name()) {
            log::warn!(
                "`{}` declares property `{}` twice; keeping the first",
                desc.name,
                property.name(),
            );
            return false;
        }
        desc.own_index.insert(property.name(), desc.own.len());
        desc.own.push(property);
        true
    }

    pub fn with_property(mut self, property: Property) -> Self {
        self.add_property(property);
        self
    }

    /// Adds a constructor. A duplicate signature is ignored with a warning.
    pub fn add_constructor(&mut self, ctor: Constructor) -> bool {
        let desc = &mut self.descriptor;
        if desc
            .constructors
            .iter()
            .any(|known| known.signature() == ctor.signature())
        {
            log::warn!(
                "`{}` already has a constructor taking {}; keeping the first",
                desc.name,
                ctor.signature(),
            );
            return false;
        }
        desc.constructors.push(ctor);
        true
    }

    pub fn with_constructor(mut self, ctor: Constructor) -> Self {
        self.add_constructor(ctor);
        self
    }

    /// Finishes the descriptor. Inherited properties are added when the
    /// registry links parents.
    pub fn build(self) -> ClassDescriptor {
        let mut descriptor = self.descriptor;
        descriptor.all = descriptor.own.clone();
        descriptor
    }
}

// -----------------------------------------------------------------------------
// FieldVisitor

/// Receives the fields reported by [`Class::visit_fields`].
///
/// Every reported field type is scheduled with the registry as well, so
/// nested classes, enums and container elements get registered too.
pub struct FieldVisitor<'a, C> {
    registry: &'a mut ClassRegistry,
    builder: &'a mut ClassBuilder,
    _marker: PhantomData<fn(&C)>,
}

impl<'a, C: Reflect> FieldVisitor<'a, C> {
    pub(crate) fn new(registry: &'a mut ClassRegistry, builder: &'a mut ClassBuilder) -> Self {
        Self {
            registry,
            builder,
            _marker: PhantomData,
        }
    }

    /// Reports a field without metadata.
    pub fn field<F: Reflect>(
        &mut self,
        name: &'static str,
        get: fn(&C) -> &F,
        get_mut: fn(&mut C) -> &mut F,
    ) -> &mut Self {
        self.field_with(name, get, get_mut, |meta| meta)
    }

    /// Reports a field and shapes its metadata.
    ///
    /// ```ignore
    /// fields.field_with("speed", |c| &c.speed, |c| &mut c.speed, |meta| meta.range(0.0, 10.0));
    /// ```
    pub fn field_with<F, M>(
        &mut self,
        name: &'static str,
        get: fn(&C) -> &F,
        get_mut: fn(&mut C) -> &mut F,
        meta: M,
    ) -> &mut Self
    where
        F: Reflect,
        M: FnOnce(MetaBuilder<F>) -> MetaBuilder<F>,
    {
        F::register_dependencies(self.registry);
        let property = Property::new::<C, F>(name, get, get_mut, meta(MetaBuilder::new()));
        if let Some(accessor) = property.container_accessor() {
            self.registry.register_container(Arc::clone(accessor));
        }
        self.builder.add_property(property);
        self
    }
}
