use alloc::borrow::Cow;
use alloc::sync::Arc;
use core::any::Any;

use crate::class::{Constructors, FieldVisitor, ParentLink};
use crate::container::ContainerAccessor;
use crate::registry::ClassRegistry;

/// A type that may appear as a reflected field.
///
/// Implemented for primitives, `String`, the standard containers and,
/// through `#[derive(Reflect)]`, for user classes, unit enums and leaf types.
///
/// All methods are associated functions: the reflection tables are built
/// per type, never per value.
pub trait Reflect: Any + Sized {
    /// The reflected name of the type, as used for class lookup and in
    /// serialized `__base__` blocks.
    fn type_name() -> Cow<'static, str>;

    /// The container shape of this type, if any.
    ///
    /// Consulted when a field of this type is bound, so containers are
    /// recognized without any marker on the field.
    #[inline]
    fn container_accessor() -> Option<Arc<dyn ContainerAccessor>> {
        None
    }

    /// Schedules this type and everything it mentions with `registry`.
    ///
    /// Leaves register their codec, classes and enums enqueue their
    /// deferred initializer, containers forward to their element types.
    #[inline]
    fn register_dependencies(_registry: &mut ClassRegistry) {}
}

/// A reflected type with named fields.
///
/// Usually derived:
///
/// ```
/// use prop_reflect::Reflect;
///
/// #[derive(Reflect, Default)]
/// #[reflect(default)]
/// struct Transform {
///     #[reflect(range(0.01, 100.0), tooltip = "Uniform scale")]
///     scale: f32,
///     #[reflect(color)]
///     tint: [f32; 3],
///     #[reflect(transient)]
///     dirty: bool,
/// }
/// ```
///
/// A manual implementation states the same in code:
///
/// ```
/// use std::borrow::Cow;
/// use prop_reflect::{Class, Reflect};
/// use prop_reflect::class::{Constructors, FieldVisitor};
/// use prop_reflect::registry::ClassRegistry;
///
/// struct Counter {
///     value: i64,
/// }
///
/// impl Reflect for Counter {
///     fn type_name() -> Cow<'static, str> {
///         Cow::Borrowed("Counter")
///     }
///
///     fn register_dependencies(registry: &mut ClassRegistry) {
///         registry.register::<Self>();
///     }
/// }
///
/// impl Class for Counter {
///     fn visit_fields(fields: &mut FieldVisitor<'_, Self>) {
///         fields.field("value", |c| &c.value, |c| &mut c.value);
///     }
///
///     fn register_constructors(ctors: &mut Constructors<Self>) {
///         ctors.add(|value: i64| Counter { value });
///     }
/// }
///
/// let mut registry = ClassRegistry::new();
/// registry.register::<Counter>();
/// registry.drain_pending();
///
/// let class = registry.class_of::<Counter>().unwrap();
/// let counter = class.create_instance((3_i64,)).unwrap();
/// assert_eq!(counter.downcast_ref::<Counter>().unwrap().value, 3);
/// ```
pub trait Class: Reflect {
    /// The embedded parent, for single inheritance.
    #[inline]
    fn parent() -> Option<ParentLink> {
        None
    }

    /// Reports every reflected field, in declaration order.
    fn visit_fields(fields: &mut FieldVisitor<'_, Self>);

    /// Adds constructors beyond those registered on the registry directly.
    #[inline]
    fn register_constructors(_ctors: &mut Constructors<Self>) {}
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use ::serde::{Deserialize, Serialize};
    use serde_json::json;

    use crate::registry::{ClassRegistry, ReflectEnum, TypeKind};
    use crate::serde::ReflectSerializer;
    use crate::{Reflect, TypeIdent};

    #[derive(Debug, PartialEq)]
    struct Unit(&'static str);

    #[derive(Reflect, Default)]
    #[reflect(name = "Marker", default)]
    struct Waypoint {
        #[reflect(rename = "displayLabel")]
        label: String,
        #[reflect(ignore)]
        #[allow(dead_code)]
        scratch: Vec<u8>,
        #[reflect(@Unit("m"), read_only, tooltip = "Distance to target")]
        distance: f32,
    }

    #[derive(Reflect, Clone, Copy, Debug, PartialEq)]
    enum Mode {
        #[reflect(rename = "fast")]
        Quick,
        Slow = 5,
    }

    #[derive(Reflect, Serialize, Deserialize, Default, Debug, Clone, Copy, PartialEq)]
    #[reflect(leaf)]
    struct Guid(u64);

    #[derive(Reflect, Default)]
    #[reflect(default)]
    struct Tagged {
        id: Guid,
    }

    #[derive(Reflect, Default)]
    #[reflect(default)]
    struct Wrapper<T> {
        inner: T,
    }

    #[test]
    fn class_attributes() {
        let mut registry = ClassRegistry::new();
        registry.register::<Waypoint>();
        registry.drain_pending();

        let class = registry.get_class_by_name("Marker").unwrap();
        assert_eq!(class.type_ident(), TypeIdent::of::<Waypoint>());
        assert!(class.can_create_instance());

        let names: Vec<_> = class.all_properties().iter().map(|p| p.name()).collect();
        assert_eq!(names, ["displayLabel", "distance"]);

        let meta = class.property("distance").unwrap().meta();
        assert!(meta.is_read_only());
        assert_eq!(meta.tooltip(), Some("Distance to target"));
        assert_eq!(meta.get_attribute::<Unit>(), Some(&Unit("m")));
    }

    #[test]
    fn enum_variants() {
        let names: Vec<_> = Mode::VARIANTS.iter().map(|v| v.name).collect();
        assert_eq!(names, ["fast", "Slow"]);
        assert_eq!(Mode::Slow.to_value(), 5);
        assert_eq!(Mode::from_value(0), Some(Mode::Quick));
        assert_eq!(Mode::from_value(1), None);
    }

    #[test]
    fn leaf_types_use_their_serde() {
        let mut registry = ClassRegistry::new();
        registry.register::<Tagged>();
        registry.drain_pending();

        assert_eq!(registry.classify(TypeIdent::of::<Guid>()), TypeKind::Leaf);
        let tree = ReflectSerializer::new(&registry)
            .serialize_typed(&Tagged { id: Guid(7) })
            .unwrap();
        assert_eq!(tree, json!({ "id": 7 }));
    }

    #[test]
    fn generic_names() {
        assert_eq!(<Wrapper<f32>>::type_name(), "Wrapper<f32>");
        assert_eq!(<Wrapper<Vec<u8>>>::type_name(), "Wrapper<Vec<u8>>");

        let mut registry = ClassRegistry::new();
        registry.register::<Wrapper<u16>>();
        registry.drain_pending();
        let class = registry.get_class_by_name("Wrapper<u16>").unwrap();
        assert!(class.can_create_instance());
    }
}
