use alloc::boxed::Box;
use alloc::collections::VecDeque;
use alloc::string::{String, ToString};
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::any::Any;
use core::fmt;

use prop_utils::hash::{HashMap, HashSet};
use serde_core::Serialize;
use serde_core::de::DeserializeOwned;

use super::{EnumDescriptor, LeafCodec, ReflectEnum};
use crate::class::{
    ClassBuilder, ClassDescriptor, Constructor, ConstructorArgs, Constructors, FieldVisitor,
    Instance, IntoConstructor,
};
use crate::container::ContainerAccessor;
use crate::property::Property;
use crate::{Class, Reflect, ReflectError, TypeIdent};

// -----------------------------------------------------------------------------
// TypeKind

/// What a [`TypeIdent`] is to the registry.
///
/// This is the classification consumers branch on: leaves are encoded
/// whole, enums by variant, classes field by field and containers entry by
/// entry. `Unregistered` means "not reflectable", never an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeKind {
    Leaf,
    Enum,
    Class,
    Container,
    Unregistered,
}

// -----------------------------------------------------------------------------
// ClassRegistry

type Initializer = Box<dyn FnOnce(&mut ClassRegistry) + Send + Sync>;

struct Pending {
    type_ident: TypeIdent,
    init: Initializer,
}

/// The table of reflected types.
///
/// Filling it is a two-phase protocol. Registration only *schedules* a
/// type's initializer; [`drain_pending`](Self::drain_pending) runs every
/// scheduled initializer exactly once, in scheduling order, and then links
/// parent classes. Initializers may schedule further types (their field
/// types, their parent); those run in the same drain. After the drain the
/// registry is meant to be shared read-only.
///
/// Because linking happens after all initializers ran, the order in which
/// a class and its parent are registered does not matter.
///
/// # Examples
///
/// ```
/// use prop_reflect::{Reflect, TypeIdent};
/// use prop_reflect::registry::{ClassRegistry, TypeKind};
///
/// #[derive(Reflect, Default)]
/// #[reflect(default)]
/// struct Shape {
///     sides: u32,
/// }
///
/// #[derive(Reflect, Default)]
/// #[reflect(default)]
/// struct Tile {
///     #[reflect(parent)]
///     shape: Shape,
///     label: String,
/// }
///
/// let mut registry = ClassRegistry::new();
/// registry.register::<Tile>();
/// assert!(registry.class_of::<Tile>().is_none());
///
/// registry.drain_pending();
/// let tile = registry.class_of::<Tile>().unwrap();
/// let names: Vec<_> = tile.all_properties().iter().map(|p| p.name()).collect();
/// assert_eq!(names, ["sides", "label"]);
/// assert_eq!(tile.own_properties().len(), 1);
///
/// assert_eq!(registry.classify(TypeIdent::of::<Shape>()), TypeKind::Class);
/// assert_eq!(registry.classify(TypeIdent::of::<u32>()), TypeKind::Leaf);
/// ```
pub struct ClassRegistry {
    classes: HashMap<TypeIdent, ClassDescriptor>,
    by_name: HashMap<String, TypeIdent>,
    leaves: HashMap<TypeIdent, LeafCodec>,
    enums: HashMap<TypeIdent, EnumDescriptor>,
    containers: HashMap<TypeIdent, Arc<dyn ContainerAccessor>>,
    pending: VecDeque<Pending>,
    scheduled: HashSet<TypeIdent>,
    deferred_ctors: HashMap<TypeIdent, Vec<Constructor>>,
    needs_link: bool,
}

impl Default for ClassRegistry {
    /// See [`ClassRegistry::new`].
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl ClassRegistry {
    /// A registry without any registration.
    pub fn empty() -> Self {
        Self {
            classes: HashMap::default(),
            by_name: HashMap::default(),
            leaves: HashMap::default(),
            enums: HashMap::default(),
            containers: HashMap::default(),
            pending: VecDeque::new(),
            scheduled: HashSet::default(),
            deferred_ctors: HashMap::default(),
            needs_link: false,
        }
    }

    /// A registry with leaf codecs for the primitive types.
    ///
    /// - `bool` `char`
    /// - `i8 - i64` `isize`
    /// - `u8 - u64` `usize`
    /// - `f32` `f64`
    /// - `String`
    pub fn new() -> Self {
        let mut registry = Self::empty();
        registry.register_leaf::<bool>();
        registry.register_leaf::<char>();
        registry.register_leaf::<i8>();
        registry.register_leaf::<i16>();
        registry.register_leaf::<i32>();
        registry.register_leaf::<i64>();
        registry.register_leaf::<isize>();
        registry.register_leaf::<u8>();
        registry.register_leaf::<u16>();
        registry.register_leaf::<u32>();
        registry.register_leaf::<u64>();
        registry.register_leaf::<usize>();
        registry.register_leaf::<f32>();
        registry.register_leaf::<f64>();
        registry.register_leaf::<String>();
        registry
    }

    // -------------------------------------------------------------------------
    // Registration

    /// Schedules `init` to run at the next [`drain_pending`](Self::drain_pending).
    ///
    /// Returns `false`, dropping `init`, if `type_ident` was scheduled before.
    pub fn register_type(
        &mut self,
        type_ident: TypeIdent,
        init: impl FnOnce(&mut ClassRegistry) + Send + Sync + 'static,
    ) -> bool {
        if !self.scheduled.insert(type_ident) {
            return false;
        }
        log::trace!("scheduled `{type_ident}`");
        self.pending.push_back(Pending {
            type_ident,
            init: Box::new(init),
        });
        true
    }

    /// Schedules class `T`, its parent and its field types.
    #[inline]
    pub fn register<T: Class>(&mut self) -> bool {
        self.register_type(TypeIdent::of::<T>(), Self::build_class::<T>)
    }

    /// Schedules enum `T`.
    pub fn register_enum<T: ReflectEnum>(&mut self) -> bool {
        self.register_type(TypeIdent::of::<T>(), |registry| {
            let info = EnumDescriptor::of::<T>();
            registry.enums.insert(info.type_ident(), info);
        })
    }

    /// Adds a leaf codec for `T` right away. Leaves have no dependencies,
    /// so nothing needs deferring. Repeated calls are no-ops.
    pub fn register_leaf<T>(&mut self) -> bool
    where
        T: Reflect + Serialize + DeserializeOwned + Default,
    {
        let type_ident = TypeIdent::of::<T>();
        if self.leaves.contains_key(&type_ident) {
            return false;
        }
        self.leaves.insert(type_ident, LeafCodec::of::<T>());
        true
    }

    /// Records the accessor of a container type, and of nested container
    /// element types.
    pub fn register_container(&mut self, accessor: Arc<dyn ContainerAccessor>) {
        let type_ident = accessor.container_type();
        if self.containers.contains_key(&type_ident) {
            return;
        }
        if let Some(inner) = accessor.element_accessor() {
            self.register_container(Arc::clone(inner));
        }
        self.containers.insert(type_ident, accessor);
    }

    /// Registers an extra constructor for class `T`.
    ///
    /// Must run before `T`'s initializer; afterwards the descriptor is frozen
    /// and this fails with [`ReflectError::ConstructorAfterInit`].
    ///
    /// ```
    /// use prop_reflect::{Reflect, ReflectError};
    /// use prop_reflect::registry::ClassRegistry;
    ///
    /// #[derive(Reflect)]
    /// struct Timer {
    ///     seconds: f32,
    /// }
    ///
    /// let mut registry = ClassRegistry::new();
    /// registry.register_constructor(|seconds: f32| Timer { seconds }).unwrap();
    /// registry.register::<Timer>();
    /// registry.drain_pending();
    ///
    /// let class = registry.class_of::<Timer>().unwrap();
    /// assert!(class.create_instance((1.5_f32,)).is_some());
    ///
    /// let late = registry.register_constructor(|| Timer { seconds: 0.0 });
    /// assert!(matches!(late, Err(ReflectError::ConstructorAfterInit { .. })));
    /// ```
    pub fn register_constructor<T, A, F>(&mut self, func: F) -> Result<(), ReflectError>
    where
        T: Any,
        A: ConstructorArgs,
        F: IntoConstructor<T, A>,
    {
        let type_ident = TypeIdent::of::<T>();
        if let Some(class) = self.classes.get(&type_ident) {
            log::warn!(
                "constructor {} for `{}` registered after its initializer ran",
                A::signature(),
                class.name(),
            );
            return Err(ReflectError::ConstructorAfterInit {
                class: class.name().to_string(),
            });
        }
        self.deferred_ctors
            .entry(type_ident)
            .or_default()
            .push(Constructor::new(func));
        Ok(())
    }

    /// Stores a finished class. Called from initializers.
    ///
    /// Constructors registered earlier through
    /// [`register_constructor`](Self::register_constructor) are merged in.
    /// A second class for the same type is dropped with a warning.
    pub fn insert_class(&mut self, mut builder: ClassBuilder) -> bool {
        let type_ident = builder.type_ident();
        if let Some(existing) = self.classes.get(&type_ident) {
            log::warn!("`{}` is already initialized; keeping the first", existing.name());
            return false;
        }
        for ctor in self.deferred_ctors.remove(&type_ident).unwrap_or_default() {
            builder.add_constructor(ctor);
        }

        let class = builder.build();
        if let Some(other) = self.by_name.get(class.name())
            && *other != type_ident
        {
            log::warn!("class name `{}` is shared by `{other}` and `{type_ident}`", class.name());
        }
        log::debug!(
            "initialized class `{}` with {} properties",
            class.name(),
            class.own_properties().len(),
        );

        self.by_name.insert(class.name().to_string(), type_ident);
        self.classes.insert(type_ident, class);
        self.needs_link = true;
        true
    }

    fn build_class<T: Class>(registry: &mut ClassRegistry) {
        let mut builder = ClassBuilder::of::<T>();
        if let Some(parent) = T::parent() {
            parent.register_parent(registry);
            builder.set_parent(parent);
        }

        T::visit_fields(&mut FieldVisitor::new(registry, &mut builder));

        let mut ctors = Constructors::<T>::new();
        T::register_constructors(&mut ctors);
        for ctor in ctors.into_vec() {
            builder.add_constructor(ctor);
        }

        registry.insert_class(builder);
    }

    /// Runs every scheduled initializer exactly once, then links parents.
    ///
    /// Returns the number of initializers run.
    pub fn drain_pending(&mut self) -> usize {
        let mut ran = 0;
        while let Some(Pending { type_ident, init }) = self.pending.pop_front() {
            log::trace!("initializing `{type_ident}`");
            init(self);
            ran += 1;
        }
        if self.needs_link {
            self.link_classes();
        }
        ran
    }

    /// Initializers scheduled but not yet run.
    #[inline]
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Runs the registrations submitted by `#[reflect(auto_register)]`.
    ///
    /// Only schedules; call [`drain_pending`](Self::drain_pending) afterwards.
    /// Returns the number of submitted registrations, which is always zero
    /// without the `auto_register` feature.
    ///
    /// ```
    /// use prop_reflect::Reflect;
    /// use prop_reflect::registry::ClassRegistry;
    ///
    /// #[derive(Reflect, Default)]
    /// #[reflect(default, auto_register)]
    /// struct Camera {
    ///     fov: f32,
    /// }
    ///
    /// let mut registry = ClassRegistry::new();
    /// registry.auto_register();
    /// registry.drain_pending();
    /// # #[cfg(feature = "auto_register")]
    /// assert!(registry.get_class_by_name("Camera").is_some());
    /// ```
    #[cfg_attr(not(feature = "auto_register"), inline(always))]
    pub fn auto_register(&mut self) -> usize {
        #[cfg(feature = "auto_register")]
        {
            use crate::__macro_exports::auto_register::AutoRegisterFn;

            let mut count = 0;
            for AutoRegisterFn(register) in inventory::iter::<AutoRegisterFn> {
                register(self);
                count += 1;
            }
            count
        }
        #[cfg(not(feature = "auto_register"))]
        {
            0
        }
    }

    // -------------------------------------------------------------------------
    // Linking

    fn link_classes(&mut self) {
        self.needs_link = false;

        let mut flattened = HashMap::default();
        let idents: Vec<TypeIdent> = self.classes.keys().copied().collect();
        for type_ident in idents {
            self.flatten(type_ident, &mut flattened, &mut Vec::new());
        }
        for (type_ident, all) in flattened {
            if let Some(class) = self.classes.get_mut(&type_ident) {
                class.all = all;
            }
        }
    }

    /// The flattened property list of `type_ident`, memoized in `done`.
    fn flatten(
        &self,
        type_ident: TypeIdent,
        done: &mut HashMap<TypeIdent, Vec<Property>>,
        stack: &mut Vec<TypeIdent>,
    ) -> Option<Vec<Property>> {
        if let Some(all) = done.get(&type_ident) {
            return Some(all.clone());
        }
        let class = self.classes.get(&type_ident)?;
        if stack.contains(&type_ident) {
            log::warn!("inheritance cycle through `{}`", class.name());
            return None;
        }

        let mut all = Vec::new();
        if let Some(parent) = class.parent() {
            stack.push(type_ident);
            match self.flatten(parent.type_ident(), done, stack) {
                Some(inherited) => all.extend(
                    inherited
                        .iter()
                        .map(|prop| prop.inherited_through(parent.upcast())),
                ),
                None if !self.classes.contains_key(&parent.type_ident()) => log::warn!(
                    "parent `{}` of `{}` is not registered; only own properties are visible",
                    parent.type_ident(),
                    class.name(),
                ),
                None => {}
            }
            stack.pop();
        }
        all.extend(class.own_properties().iter().cloned());

        done.insert(type_ident, all.clone());
        Some(all)
    }

    // -------------------------------------------------------------------------
    // Lookup

    /// `None` means the type is not reflectable as a class.
    #[inline]
    pub fn get_class(&self, type_ident: TypeIdent) -> Option<&ClassDescriptor> {
        self.classes.get(&type_ident)
    }

    #[inline]
    pub fn class_of<T: Any>(&self) -> Option<&ClassDescriptor> {
        self.get_class(TypeIdent::of::<T>())
    }

    pub fn get_class_by_name(&self, name: &str) -> Option<&ClassDescriptor> {
        self.by_name
            .get(name)
            .and_then(|type_ident| self.classes.get(type_ident))
    }

    /// The parent class of `type_ident`, if both are registered.
    pub fn parent_of(&self, type_ident: TypeIdent) -> Option<&ClassDescriptor> {
        self.get_class(type_ident)?
            .parent_ident()
            .and_then(|parent| self.get_class(parent))
    }

    #[inline]
    pub fn contains_class(&self, type_ident: TypeIdent) -> bool {
        self.classes.contains_key(&type_ident)
    }

    pub fn classes(&self) -> impl Iterator<Item = &ClassDescriptor> {
        self.classes.values()
    }

    #[inline]
    pub fn leaf(&self, type_ident: TypeIdent) -> Option<&LeafCodec> {
        self.leaves.get(&type_ident)
    }

    #[inline]
    pub fn enum_info(&self, type_ident: TypeIdent) -> Option<&EnumDescriptor> {
        self.enums.get(&type_ident)
    }

    #[inline]
    pub fn container(&self, type_ident: TypeIdent) -> Option<&Arc<dyn ContainerAccessor>> {
        self.containers.get(&type_ident)
    }

    pub fn classify(&self, type_ident: TypeIdent) -> TypeKind {
        if self.leaves.contains_key(&type_ident) {
            TypeKind::Leaf
        } else if self.enums.contains_key(&type_ident) {
            TypeKind::Enum
        } else if self.classes.contains_key(&type_ident) {
            TypeKind::Class
        } else if self.containers.contains_key(&type_ident) {
            TypeKind::Container
        } else {
            TypeKind::Unregistered
        }
    }

    // -------------------------------------------------------------------------
    // Instances

    /// A default value of any registered type.
    ///
    /// Leaves use their `Default`, enums their first variant, classes their
    /// zero-argument constructor and containers start empty.
    pub fn create_default(&self, type_ident: TypeIdent) -> Option<Box<dyn Any>> {
        match self.classify(type_ident) {
            TypeKind::Leaf => self.leaf(type_ident).map(LeafCodec::create_default),
            TypeKind::Enum => self.enum_info(type_ident)?.create_default(),
            TypeKind::Class => self
                .get_class(type_ident)?
                .create_default()
                .map(Instance::into_any),
            TypeKind::Container => self.container(type_ident)?.new_empty(self),
            TypeKind::Unregistered => None,
        }
    }

    /// Builds an instance of class `type_ident` from an argument tuple.
    pub fn create_instance<A: ConstructorArgs>(
        &self,
        type_ident: TypeIdent,
        args: A,
    ) -> Result<Instance, ReflectError> {
        let class = self
            .get_class(type_ident)
            .ok_or_else(|| ReflectError::UnregisteredType(type_ident.type_name().to_string()))?;
        class
            .create_instance(args)
            .ok_or_else(|| ReflectError::ConstructorMismatch {
                class: class.name().to_string(),
                signature: A::signature().to_string(),
            })
    }
}

impl fmt::Debug for ClassRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassRegistry")
            .field("classes", &self.classes.len())
            .field("leaves", &self.leaves.len())
            .field("enums", &self.enums.len())
            .field("containers", &self.containers.len())
            .field("pending", &self.pending.len())
            .finish()
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::{ClassRegistry, TypeKind};
    use crate::class::{ClassBuilder, ParentLink};
    use crate::property::FieldFns;
    use crate::{Reflect, ReflectError, TypeIdent};

    #[derive(Reflect, Default, Debug, PartialEq)]
    #[reflect(default)]
    struct Base {
        id: u32,
        tag: String,
    }

    #[derive(Reflect, Default, Debug, PartialEq)]
    #[reflect(default)]
    struct Child {
        #[reflect(parent)]
        base: Base,
        speed: f32,
    }

    #[derive(Reflect, Default, Debug, PartialEq)]
    #[reflect(default)]
    struct GrandChild {
        #[reflect(parent)]
        child: Child,
        weight: f64,
    }

    fn describe(registry: &ClassRegistry, type_ident: TypeIdent) -> Vec<(&'static str, TypeIdent)> {
        registry
            .get_class(type_ident)
            .unwrap()
            .all_properties()
            .iter()
            .map(|prop| (prop.name(), prop.declaring_type()))
            .collect()
    }

    #[test]
    fn registration_order_independence() {
        let mut child_first = ClassRegistry::new();
        child_first.register::<Child>();
        child_first.drain_pending();

        let mut base_first = ClassRegistry::new();
        base_first.register::<Base>();
        base_first.drain_pending();
        base_first.register::<Child>();
        base_first.drain_pending();

        let child = TypeIdent::of::<Child>();
        assert_eq!(describe(&child_first, child), describe(&base_first, child));
        assert_eq!(
            describe(&child_first, child),
            [
                ("id", TypeIdent::of::<Base>()),
                ("tag", TypeIdent::of::<Base>()),
                ("speed", TypeIdent::of::<Child>()),
            ]
        );
    }

    #[test]
    fn inherited_properties_resolve_on_subtypes() {
        let mut registry = ClassRegistry::new();
        registry.register::<GrandChild>();
        registry.drain_pending();

        let class = registry.class_of::<GrandChild>().unwrap();
        let names: Vec<_> = class.all_properties().iter().map(|p| p.name()).collect();
        assert_eq!(names, ["id", "tag", "speed", "weight"]);

        let mut value = GrandChild::default();
        let id = class.property("id").unwrap();
        assert!(id.is_inherited());
        *id.get_as_mut::<u32>(&mut value).unwrap() = 9;
        assert_eq!(value.child.base.id, 9);

        assert!(class.own_property("id").is_none());
        assert_eq!(
            registry.parent_of(TypeIdent::of::<GrandChild>()).unwrap().name(),
            "Child"
        );
    }

    #[test]
    fn unregistered_lookup_is_none() {
        struct Unknown;
        let registry = ClassRegistry::new();
        let ident = TypeIdent::of::<Unknown>();
        assert!(registry.get_class(ident).is_none());
        assert!(registry.get_class_by_name("Unknown").is_none());
        assert!(registry.create_default(ident).is_none());
        assert_eq!(registry.classify(ident), TypeKind::Unregistered);
        assert!(matches!(
            registry.create_instance(ident, ()),
            Err(ReflectError::UnregisteredType(_))
        ));
    }

    #[test]
    fn initializer_runs_once() {
        static RUNS: AtomicUsize = AtomicUsize::new(0);
        struct Marker;

        let mut registry = ClassRegistry::empty();
        let ident = TypeIdent::of::<Marker>();
        assert!(registry.register_type(ident, |_| {
            RUNS.fetch_add(1, Ordering::SeqCst);
        }));
        assert!(!registry.register_type(ident, |_| {
            RUNS.fetch_add(1, Ordering::SeqCst);
        }));
        assert_eq!(registry.pending_len(), 1);

        assert_eq!(registry.drain_pending(), 1);
        assert_eq!(registry.drain_pending(), 0);
        assert_eq!(RUNS.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn dependencies_run_in_the_same_drain() {
        let mut registry = ClassRegistry::new();
        registry.register::<Child>();
        assert_eq!(registry.pending_len(), 1);
        assert_eq!(registry.drain_pending(), 2);
        assert!(registry.class_of::<Base>().is_some());
    }

    #[test]
    fn missing_parent_keeps_own_properties() {
        struct Hidden {
            value: i32,
        }
        struct Orphan {
            hidden: Hidden,
            count: u8,
        }

        let upcast = Arc::new(FieldFns::<Orphan, Hidden>::new(
            |o| &o.hidden,
            |o| &mut o.hidden,
        ));
        let mut registry = ClassRegistry::new();
        registry.register_type(TypeIdent::of::<Orphan>(), move |registry| {
            let builder = ClassBuilder::new("Orphan", TypeIdent::of::<Orphan>())
                .with_parent(ParentLink::from_access(TypeIdent::of::<Hidden>(), upcast))
                .with_property(crate::property::Property::new::<Orphan, u8>(
                    "count",
                    |o| &o.count,
                    |o| &mut o.count,
                    crate::meta::MetaBuilder::new(),
                ));
            registry.insert_class(builder);
        });
        registry.drain_pending();

        let class = registry.class_of::<Orphan>().unwrap();
        assert_eq!(class.all_properties().len(), 1);
        assert!(registry.parent_of(class.type_ident()).is_none());

        let orphan = Orphan {
            hidden: Hidden { value: 1 },
            count: 2,
        };
        assert_eq!(orphan.hidden.value, 1);
        assert!(class.parent().unwrap().parent_of(&orphan).is_some());
    }

    #[test]
    fn constructors_are_exact() {
        #[derive(Reflect)]
        struct Pair {
            a: i32,
            b: f32,
        }

        let mut registry = ClassRegistry::new();
        registry
            .register_constructor(|a: i32, b: f32| Pair { a, b })
            .unwrap();
        registry.register::<Pair>();
        registry.drain_pending();

        let ident = TypeIdent::of::<Pair>();
        let pair = registry.create_instance(ident, (1_i32, 2.0_f32)).unwrap();
        let pair = pair.downcast::<Pair>().ok().unwrap();
        assert_eq!((pair.a, pair.b), (1, 2.0));

        assert!(matches!(
            registry.create_instance(ident, (1_i32,)),
            Err(ReflectError::ConstructorMismatch { .. })
        ));
        assert!(registry.create_instance(ident, (1_i32, 2.0_f64)).is_err());
        assert!(registry.create_default(ident).is_none());
    }

    #[test]
    fn late_constructor_is_rejected() {
        let mut registry = ClassRegistry::new();
        registry.register::<Base>();
        registry.drain_pending();

        let err = registry
            .register_constructor(|id: u32| Base { id, tag: String::new() })
            .unwrap_err();
        assert_eq!(
            err,
            ReflectError::ConstructorAfterInit {
                class: "Base".into()
            }
        );
        assert!(!registry.class_of::<Base>().unwrap().has_constructor::<(u32,)>());
    }

    #[test]
    fn containers_are_recorded() {
        #[derive(Reflect, Default)]
        #[reflect(default)]
        struct Grid {
            cells: Vec<Vec<u8>>,
        }

        let mut registry = ClassRegistry::new();
        registry.register::<Grid>();
        registry.drain_pending();

        assert_eq!(registry.classify(TypeIdent::of::<Vec<Vec<u8>>>()), TypeKind::Container);
        assert_eq!(registry.classify(TypeIdent::of::<Vec<u8>>()), TypeKind::Container);

        let empty = registry.create_default(TypeIdent::of::<Vec<u8>>()).unwrap();
        assert!(empty.downcast::<Vec<u8>>().unwrap().is_empty());
    }

    #[test]
    fn defaults_by_kind() {
        let mut registry = ClassRegistry::new();
        registry.register::<Base>();
        registry.drain_pending();

        let value = registry.create_default(TypeIdent::of::<i16>()).unwrap();
        assert_eq!(*value.downcast::<i16>().unwrap(), 0);

        let value = registry.create_default(TypeIdent::of::<Base>()).unwrap();
        assert_eq!(*value.downcast::<Base>().unwrap(), Base::default());
    }

    #[test]
    fn destroy_hands_back_foreign_instances() {
        let mut registry = ClassRegistry::new();
        registry.register::<Child>();
        registry.drain_pending();
        let base_class = registry.class_of::<Base>().unwrap();
        let child_class = registry.class_of::<Child>().unwrap();

        assert!(base_class.destroy_instance(None).is_ok());

        let child = child_class.create_default().unwrap();
        let child = base_class.destroy_instance(Some(child)).unwrap_err();
        assert_eq!(child.type_ident(), TypeIdent::of::<Child>());
        assert_eq!(child.downcast_ref::<Child>(), Some(&Child::default()));

        assert!(child_class.destroy_instance(Some(child)).is_ok());
    }
}
