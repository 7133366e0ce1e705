use alloc::string::ToString;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::any::Any;

use serde_json::{Map, Value};

use super::field_path::FieldPath;
use super::{BASE_KEY, Issue, Report, SerializerConfig, encode_key};
use crate::TypeIdent;
use crate::class::ClassDescriptor;
use crate::container::{ContainerAccessor, ContainerError, ContainerShape, EntryKey};
use crate::registry::{ClassRegistry, TypeKind};
use crate::visit::{self, Depth};

/// Writes reflected instances as JSON trees.
///
/// Classes become objects keyed by property name, with the parent's fields
/// nested under `"__base__": { "<Parent>": { .. } }`. Sequences and sets
/// become arrays, maps become objects with stringified keys, enums their
/// variant name and leaves whatever their `serde` implementation writes.
///
/// Anything that cannot be written is left out of the tree and recorded in
/// the [`Report`].
///
/// # Examples
///
/// ```
/// use std::collections::BTreeMap;
/// use prop_reflect::Reflect;
/// use prop_reflect::registry::ClassRegistry;
/// use prop_reflect::serde::ReflectSerializer;
/// use serde_json::json;
///
/// #[derive(Reflect, Default)]
/// #[reflect(default)]
/// struct Palette {
///     weights: BTreeMap<u8, f32>,
///     #[reflect(not_serialized)]
///     cache: Vec<u32>,
/// }
///
/// let mut registry = ClassRegistry::new();
/// registry.register::<Palette>();
/// registry.drain_pending();
///
/// let palette = Palette {
///     weights: BTreeMap::from([(1, 0.5), (2, 0.25)]),
///     cache: vec![7],
/// };
/// let tree = ReflectSerializer::new(&registry).serialize_typed(&palette).unwrap();
/// assert_eq!(tree, json!({ "weights": { "1": 0.5, "2": 0.25 } }));
/// ```
#[derive(Clone, Copy)]
pub struct ReflectSerializer<'a> {
    registry: &'a ClassRegistry,
    config: SerializerConfig,
}

impl<'a> ReflectSerializer<'a> {
    #[inline]
    pub fn new(registry: &'a ClassRegistry) -> Self {
        Self {
            registry,
            config: SerializerConfig::default(),
        }
    }

    #[inline]
    pub fn with_config(mut self, config: SerializerConfig) -> Self {
        self.config = config;
        self
    }

    /// Writes `instance` as an object of `class`, dropping the report.
    #[inline]
    pub fn serialize(&self, instance: &dyn Any, class: &ClassDescriptor) -> Value {
        self.serialize_with_report(instance, class).0
    }

    pub fn serialize_with_report(
        &self,
        instance: &dyn Any,
        class: &ClassDescriptor,
    ) -> (Value, Report) {
        let mut writer = Writer::new(self.registry);
        let tree = writer.write_class(instance, class, self.config.root());
        (tree, writer.report)
    }

    /// Writes a value whose class is looked up from its type.
    ///
    /// `None` if `T` is not a registered class.
    pub fn serialize_typed<T: Any>(&self, value: &T) -> Option<Value> {
        let class = self.registry.class_of::<T>()?;
        Some(self.serialize(value, class))
    }

    /// Writes a value of any registered kind: leaf, enum, class or container.
    pub fn serialize_value(&self, value: &dyn Any, type_ident: TypeIdent) -> (Option<Value>, Report) {
        let mut writer = Writer::new(self.registry);
        let tree = writer.write_value(value, type_ident, None, self.config.root());
        (tree, writer.report)
    }
}

struct Writer<'a> {
    registry: &'a ClassRegistry,
    path: FieldPath,
    report: Report,
}

impl<'a> Writer<'a> {
    fn new(registry: &'a ClassRegistry) -> Self {
        Self {
            registry,
            path: FieldPath::new(),
            report: Report::new(),
        }
    }

    fn record(&mut self, issue: Issue) {
        self.report.record(&self.path, issue);
    }

    fn descend(&mut self, depth: Depth) -> Option<Depth> {
        match depth.descend() {
            Ok(depth) => Some(depth),
            Err(_) => {
                self.record(Issue::RecursionLimitExceeded { max: depth.max() });
                None
            }
        }
    }

    fn write_class(&mut self, instance: &dyn Any, class: &ClassDescriptor, depth: Depth) -> Value {
        let registry = self.registry;
        let mut object = Map::new();

        if let Some(parent) = class.parent() {
            match registry.get_class(parent.type_ident()) {
                Some(parent_class) => {
                    let base = parent.parent_of(instance);
                    if let (Some(base), Some(depth)) = (base, self.descend(depth)) {
                        self.path.push_base(parent_class.name());
                        let tree = self.write_class(base, parent_class, depth);
                        self.path.pop();

                        let mut wrapper = Map::new();
                        wrapper.insert(parent_class.name().to_string(), tree);
                        object.insert(BASE_KEY.to_string(), Value::Object(wrapper));
                    }
                }
                None => {
                    let name = parent.type_ident().type_name().to_string();
                    self.record(Issue::Unregistered(name));
                }
            }
        }

        visit::visit_own(instance, class, |property, field| {
            if !property.meta().is_serialized() {
                return;
            }
            self.path.push_field(property.name());
            let value = self.write_value(
                field,
                property.type_ident(),
                property.container_accessor(),
                depth,
            );
            self.path.pop();
            if let Some(value) = value {
                object.insert(property.name().to_string(), value);
            }
        });

        Value::Object(object)
    }

    fn write_value(
        &mut self,
        value: &dyn Any,
        type_ident: TypeIdent,
        accessor: Option<&Arc<dyn ContainerAccessor>>,
        depth: Depth,
    ) -> Option<Value> {
        let registry = self.registry;
        match registry.classify(type_ident) {
            TypeKind::Leaf => {
                let codec = registry.leaf(type_ident)?;
                codec
                    .encode(value)
                    .map_err(|err| self.record(err.into()))
                    .ok()
            }
            TypeKind::Enum => {
                let info = registry.enum_info(type_ident)?;
                let encoded = info.encode(value);
                if encoded.is_none() {
                    self.record(Issue::UnknownVariant {
                        enum_name: info.name().to_string(),
                        value: "<unknown>".to_string(),
                    });
                }
                encoded
            }
            TypeKind::Class => {
                let class = registry.get_class(type_ident)?;
                let depth = self.descend(depth)?;
                Some(self.write_class(value, class, depth))
            }
            TypeKind::Container => {
                let accessor = accessor.or_else(|| registry.container(type_ident))?;
                self.write_container(value, accessor, depth)
            }
            TypeKind::Unregistered => match accessor {
                Some(accessor) => self.write_container(value, accessor, depth),
                None => {
                    self.record(Issue::Unregistered(type_ident.type_name().to_string()));
                    None
                }
            },
        }
    }

    fn write_container(
        &mut self,
        container: &dyn Any,
        accessor: &Arc<dyn ContainerAccessor>,
        depth: Depth,
    ) -> Option<Value> {
        let depth = self.descend(depth)?;
        let element_type = accessor.element_type();
        let element_accessor = accessor.element_accessor();

        if accessor.shape() == ContainerShape::Map {
            let key_type = accessor.key_type()?;
            let mut object = Map::new();
            let result = accessor.for_each(container, &mut |entry| {
                let EntryKey::Key(key) = entry.key else {
                    return;
                };
                let key = match encode_key(self.registry, key, key_type) {
                    Ok(key) => key,
                    Err(issue) => return self.record(issue),
                };
                self.path.push_key(&key);
                let value = self.write_value(entry.value, element_type, element_accessor, depth);
                self.path.pop();
                if let Some(value) = value {
                    object.insert(key, value);
                }
            });
            return self.finish(result, Value::Object(object));
        }

        let mut array = Vec::new();
        let mut index = 0;
        let result = accessor.for_each(container, &mut |entry| {
            self.path.push_index(index);
            if let Some(value) = self.write_value(entry.value, element_type, element_accessor, depth) {
                array.push(value);
            }
            self.path.pop();
            index += 1;
        });
        self.finish(result, Value::Array(array))
    }

    fn finish(
        &mut self,
        result: Result<(), ContainerError>,
        tree: Value,
    ) -> Option<Value> {
        match result {
            Ok(()) => Some(tree),
            Err(err) => {
                self.record(err.into());
                None
            }
        }
    }
}
