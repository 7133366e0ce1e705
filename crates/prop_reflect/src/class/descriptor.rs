use alloc::borrow::Cow;
use alloc::boxed::Box;
use alloc::vec::Vec;
use core::any::Any;
use core::fmt;

use prop_utils::hash::HashMap;

use super::{Constructor, ConstructorArgs, Instance, ParentLink, Signature};
use crate::TypeIdent;
use crate::property::Property;

/// The reflected description of one class.
///
/// Exactly one descriptor exists per [`TypeIdent`] in a registry. It is
/// built by the type's deferred initializer and frozen once the registry
/// has been drained.
///
/// Properties come in two views:
///
/// - [`own_properties`](Self::own_properties): declared by this type, in declaration order.
/// - [`all_properties`](Self::all_properties): the parent chain flattened
///   root-first, followed by the own properties. Inherited entries resolve
///   directly on instances of this type.
pub struct ClassDescriptor {
    pub(crate) name: Cow<'static, str>,
    pub(crate) type_ident: TypeIdent,
    pub(crate) parent: Option<ParentLink>,
    pub(crate) own: Vec<Property>,
    pub(crate) own_index: HashMap<&'static str, usize>,
    pub(crate) all: Vec<Property>,
    pub(crate) constructors: Vec<Constructor>,
}

impl ClassDescriptor {
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn type_ident(&self) -> TypeIdent {
        self.type_ident
    }

    #[inline]
    pub fn parent(&self) -> Option<&ParentLink> {
        self.parent.as_ref()
    }

    #[inline]
    pub fn parent_ident(&self) -> Option<TypeIdent> {
        self.parent.as_ref().map(ParentLink::type_ident)
    }

    #[inline]
    pub fn own_properties(&self) -> &[Property] {
        &self.own
    }

    #[inline]
    pub fn all_properties(&self) -> &[Property] {
        &self.all
    }

    /// A property declared by this type itself.
    pub fn own_property(&self, name: &str) -> Option<&Property> {
        self.own_index.get(name).map(|&index| &self.own[index])
    }

    /// A property of this type or, failing that, the nearest ancestor declaring it.
    pub fn property(&self, name: &str) -> Option<&Property> {
        self.own_property(name)
            .or_else(|| self.all.iter().rev().find(|prop| prop.name() == name))
    }

    // -------------------------------------------------------------------------
    // Construction

    /// Signatures of every registered constructor.
    pub fn constructors(&self) -> impl Iterator<Item = &Signature> {
        self.constructors.iter().map(Constructor::signature)
    }

    pub fn has_constructor<A: ConstructorArgs>(&self) -> bool {
        self.find_constructor(&A::signature()).is_some()
    }

    /// `true` if a zero-argument constructor is registered.
    #[inline]
    pub fn can_create_instance(&self) -> bool {
        self.has_constructor::<()>()
    }

    /// Builds an instance from an argument tuple.
    ///
    /// Succeeds only if a constructor of exactly the tuple's signature was
    /// registered. No argument is ever converted, dropped or padded.
    ///
    /// ```
    /// use prop_reflect::Reflect;
    /// use prop_reflect::registry::ClassRegistry;
    ///
    /// #[derive(Reflect)]
    /// #[reflect(constructor = Sprite::new)]
    /// struct Sprite {
    ///     frame: i32,
    ///     alpha: f32,
    /// }
    ///
    /// impl Sprite {
    ///     fn new(frame: i32, alpha: f32) -> Self {
    ///         Self { frame, alpha }
    ///     }
    /// }
    ///
    /// let mut registry = ClassRegistry::new();
    /// registry.register::<Sprite>();
    /// registry.drain_pending();
    /// let class = registry.class_of::<Sprite>().unwrap();
    ///
    /// assert!(class.create_instance((1_i32, 2.0_f32)).is_some());
    /// assert!(class.create_instance((1_i32,)).is_none());
    /// assert!(class.create_instance((1_i64, 2.0_f32)).is_none());
    /// assert!(!class.can_create_instance());
    /// ```
    pub fn create_instance<A: ConstructorArgs>(&self, args: A) -> Option<Instance> {
        let signature = A::signature();
        let Some(ctor) = self.find_constructor(&signature) else {
            log::debug!("`{}` has no constructor taking {signature}", self.name);
            return None;
        };
        ctor.invoke(Box::new(args))
            .map(|value| Instance::new(self.type_ident, value))
    }

    /// Builds an instance with the zero-argument constructor.
    #[inline]
    pub fn create_default(&self) -> Option<Instance> {
        self.create_instance(())
    }

    /// Destroys an instance created for this class. `None` is a no-op.
    ///
    /// An instance of another type is handed back untouched.
    pub fn destroy_instance(&self, instance: Option<Instance>) -> Result<(), Instance> {
        let Some(instance) = instance else {
            return Ok(());
        };
        if instance.type_ident() != self.type_ident {
            log::warn!(
                "refusing to destroy a `{}` through the descriptor of `{}`",
                instance.type_ident(),
                self.name,
            );
            return Err(instance);
        }
        drop(instance);
        Ok(())
    }

    fn find_constructor(&self, signature: &Signature) -> Option<&Constructor> {
        self.constructors
            .iter()
            .find(|ctor| ctor.signature() == signature)
    }

    /// `true` if `instance` is of this class's type.
    #[inline]
    pub fn accepts(&self, instance: &dyn Any) -> bool {
        TypeIdent::lookup(instance.type_id()) == Some(self.type_ident)
    }
}

impl fmt::Debug for ClassDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassDescriptor")
            .field("name", &self.name)
            .field("type", &self.type_ident)
            .field("parent", &self.parent_ident())
            .field("own", &self.own.iter().map(Property::name).collect::<Vec<_>>())
            .field("constructors", &self.constructors)
            .finish()
    }
}
