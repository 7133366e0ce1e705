use alloc::boxed::Box;
use alloc::string::{String, ToString};
use alloc::sync::Arc;
use core::any::Any;

use serde_json::{Map, Value};

use super::field_path::FieldPath;
use super::{BASE_KEY, Issue, Report, SerializerConfig, decode_key, json_kind};
use crate::TypeIdent;
use crate::class::{ClassDescriptor, Instance};
use crate::container::{ContainerAccessor, ContainerShape};
use crate::registry::{ClassRegistry, TypeKind};
use crate::visit::{self, Depth};

/// Reads JSON trees back into reflected instances.
///
/// Reading overwrites: every container field is cleared before the tree's
/// entries are added, so loading the same tree twice leaves the same state
/// as loading it once. Fixed-size arrays are overwritten element by element.
/// Container elements of class type are built with the class's
/// zero-argument constructor and then filled field by field.
///
/// Nothing in the tree is fatal. Unknown fields (schema drift), values of
/// the wrong shape and unbuildable elements are skipped and recorded in the
/// returned [`Report`]; the rest of the tree is still applied.
///
/// # Examples
///
/// ```
/// use prop_reflect::Reflect;
/// use prop_reflect::registry::ClassRegistry;
/// use prop_reflect::serde::ReflectDeserializer;
/// use serde_json::json;
///
/// #[derive(Reflect, Default)]
/// #[reflect(default)]
/// struct Volume {
///     level: f32,
///     muted: bool,
/// }
///
/// let mut registry = ClassRegistry::new();
/// registry.register::<Volume>();
/// registry.drain_pending();
///
/// let mut volume = Volume::default();
/// let report = ReflectDeserializer::new(&registry)
///     .deserialize_typed(&json!({ "level": 0.5, "balance": 1.0 }), &mut volume)
///     .unwrap();
///
/// assert_eq!(volume.level, 0.5);
/// assert!(report.has_schema_drift());
/// assert_eq!(report.entries()[0].issue.to_string(), "`Volume` has no property `balance`");
/// ```
#[derive(Clone, Copy)]
pub struct ReflectDeserializer<'a> {
    registry: &'a ClassRegistry,
    config: SerializerConfig,
}

impl<'a> ReflectDeserializer<'a> {
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

    /// Applies `tree` to `instance`, an instance of `class`.
    pub fn deserialize(&self, tree: &Value, instance: &mut dyn Any, class: &ClassDescriptor) -> Report {
        let mut reader = Reader::new(self.registry);
        reader.read_class(tree, instance, class, self.config.root());
        reader.report
    }

    /// Applies `tree` to a value whose class is looked up from its type.
    ///
    /// `None` if `T` is not a registered class.
    pub fn deserialize_typed<T: Any>(&self, tree: &Value, value: &mut T) -> Option<Report> {
        let class = self.registry.class_of::<T>()?;
        Some(self.deserialize(tree, value, class))
    }

    /// Builds a new instance of `class` with its zero-argument constructor
    /// and applies `tree` to it.
    pub fn deserialize_new(&self, tree: &Value, class: &ClassDescriptor) -> (Option<Instance>, Report) {
        let Some(mut instance) = class.create_default() else {
            let mut report = Report::new();
            report.record(FieldPath::new(), Issue::ConstructorMismatch {
                class: class.name().to_string(),
            });
            return (None, report);
        };
        let report = self.deserialize(tree, instance.as_any_mut(), class);
        (Some(instance), report)
    }

    /// Applies `tree` to a value of any registered kind.
    pub fn deserialize_value(&self, tree: &Value, target: &mut dyn Any, type_ident: TypeIdent) -> Report {
        let mut reader = Reader::new(self.registry);
        reader.read_value(tree, target, type_ident, None, self.config.root());
        reader.report
    }
}

struct Reader<'a> {
    registry: &'a ClassRegistry,
    path: FieldPath,
    report: Report,
}

impl<'a> Reader<'a> {
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

    fn expect_object<'t>(&mut self, tree: &'t Value) -> Option<&'t Map<String, Value>> {
        match tree {
            Value::Object(object) => Some(object),
            other => {
                self.record(Issue::TypeMismatch {
                    expected: "object",
                    found: json_kind(other),
                });
                None
            }
        }
    }

    /// Returns `false` if nothing could be applied.
    fn read_class(
        &mut self,
        tree: &Value,
        instance: &mut dyn Any,
        class: &ClassDescriptor,
        depth: Depth,
    ) -> bool {
        let Some(object) = self.expect_object(tree) else {
            return false;
        };

        if let Some(base) = object.get(BASE_KEY) {
            self.read_base(base, instance, class, depth);
        }
        self.report_missing_base(object, class);

        visit::visit_own_mut(&mut *instance, class, |property, field| {
            if !property.meta().is_serialized() {
                return;
            }
            self.path.push_field(property.name());
            match object.get(property.name()) {
                Some(value) => {
                    self.read_value(
                        value,
                        field,
                        property.type_ident(),
                        property.container_accessor(),
                        depth,
                    );
                }
                None => self.record(Issue::MissingField {
                    field: property.name().to_string(),
                }),
            }
            self.path.pop();
        });

        // Keys left over are either inherited fields written flat or drift.
        for (name, value) in object {
            if name == BASE_KEY || class.own_property(name).is_some() {
                continue;
            }
            let Some(property) = class.property(name) else {
                self.path.push_field(name);
                self.record(Issue::SchemaDrift {
                    class: class.name().to_string(),
                    field: name.clone(),
                });
                self.path.pop();
                continue;
            };
            if !property.meta().is_serialized() {
                continue;
            }
            let Some(field) = property.get_mut(&mut *instance) else {
                continue;
            };
            self.path.push_field(name);
            self.read_value(
                value,
                field,
                property.type_ident(),
                property.container_accessor(),
                depth,
            );
            self.path.pop();
        }
        true
    }

    /// Parent fields count as missing when the tree has no `__base__` entry
    /// for the parent and does not carry them flat either.
    fn report_missing_base(&mut self, object: &Map<String, Value>, class: &ClassDescriptor) {
        let registry = self.registry;
        let Some(parent_class) = class.parent().and_then(|link| registry.get_class(link.type_ident())) else {
            return;
        };
        let has_base = object
            .get(BASE_KEY)
            .and_then(Value::as_object)
            .is_some_and(|bases| bases.contains_key(parent_class.name()));
        if has_base {
            return;
        }

        self.path.push_base(parent_class.name());
        for property in parent_class.all_properties() {
            if property.meta().is_serialized() && !object.contains_key(property.name()) {
                self.path.push_field(property.name());
                self.record(Issue::MissingField {
                    field: property.name().to_string(),
                });
                self.path.pop();
            }
        }
        self.path.pop();
    }

    fn read_base(&mut self, base: &Value, instance: &mut dyn Any, class: &ClassDescriptor, depth: Depth) {
        let registry = self.registry;
        let Some(bases) = self.expect_object(base) else {
            return;
        };
        let parent = class
            .parent()
            .and_then(|link| Some((link, registry.get_class(link.type_ident())?)));

        for (name, tree) in bases {
            let Some((link, parent_class)) = parent.filter(|(_, parent)| parent.name() == name.as_str()) else {
                self.path.push_base(name);
                self.record(Issue::SchemaDrift {
                    class: class.name().to_string(),
                    field: alloc::format!("{BASE_KEY}.{name}"),
                });
                self.path.pop();
                continue;
            };
            let (Some(depth), Some(base)) = (self.descend(depth), link.parent_of_mut(&mut *instance)) else {
                continue;
            };
            self.path.push_base(name);
            self.read_class(tree, base, parent_class, depth);
            self.path.pop();
        }
    }

    /// Returns `false` if nothing could be applied.
    fn read_value(
        &mut self,
        tree: &Value,
        target: &mut dyn Any,
        type_ident: TypeIdent,
        accessor: Option<&Arc<dyn ContainerAccessor>>,
        depth: Depth,
    ) -> bool {
        let registry = self.registry;
        match registry.classify(type_ident) {
            TypeKind::Leaf => {
                let Some(codec) = registry.leaf(type_ident) else {
                    return false;
                };
                match codec.decode_into(target, tree) {
                    Ok(()) => true,
                    Err(err) => {
                        self.record(err.into());
                        false
                    }
                }
            }
            TypeKind::Enum => {
                let Some(info) = registry.enum_info(type_ident) else {
                    return false;
                };
                let applied = info.decode_into(target, tree);
                if !applied {
                    self.record(Issue::UnknownVariant {
                        enum_name: info.name().to_string(),
                        value: tree.to_string(),
                    });
                }
                applied
            }
            TypeKind::Class => {
                let Some(class) = registry.get_class(type_ident) else {
                    return false;
                };
                match self.descend(depth) {
                    Some(depth) => self.read_class(tree, target, class, depth),
                    None => false,
                }
            }
            TypeKind::Container | TypeKind::Unregistered => {
                match accessor.or_else(|| registry.container(type_ident)) {
                    Some(accessor) => self.read_container(tree, target, accessor, depth),
                    None => {
                        self.record(Issue::Unregistered(type_ident.type_name().to_string()));
                        false
                    }
                }
            }
        }
    }

    fn read_container(
        &mut self,
        tree: &Value,
        container: &mut dyn Any,
        accessor: &Arc<dyn ContainerAccessor>,
        depth: Depth,
    ) -> bool {
        let Some(depth) = self.descend(depth) else {
            return false;
        };
        let registry = self.registry;
        let element_type = accessor.element_type();
        let element_accessor = accessor.element_accessor();

        if accessor.shape() == ContainerShape::Map {
            let Some(key_type) = accessor.key_type() else {
                return false;
            };
            let Some(object) = self.expect_object(tree) else {
                return false;
            };
            if let Err(err) = accessor.clear(&mut *container) {
                self.record(err.into());
                return false;
            }
            for (text, value) in object {
                self.path.push_key(text);
                let key = decode_key(registry, text, key_type).map_err(|issue| self.record(issue));
                let value = self.build_element(value, element_type, element_accessor, depth);
                if let (Ok(key), Some(value)) = (key, value)
                    && let Err(err) = accessor.insert_entry(&mut *container, key, Some(value), registry)
                {
                    self.record(err.into());
                }
                self.path.pop();
            }
            return true;
        }

        let Value::Array(items) = tree else {
            self.record(Issue::TypeMismatch {
                expected: "array",
                found: json_kind(tree),
            });
            return false;
        };

        if accessor.is_fixed_size() {
            let len = accessor.len(&*container).unwrap_or_default();
            if len != items.len() {
                self.record(Issue::LengthMismatch {
                    expected: len,
                    found: items.len(),
                });
            }
            for (index, item) in items.iter().enumerate().take(len) {
                let Some(element) = accessor.element_mut(&mut *container, index) else {
                    continue;
                };
                self.path.push_index(index);
                self.read_value(item, element, element_type, element_accessor, depth);
                self.path.pop();
            }
            return true;
        }

        if let Err(err) = accessor.clear(&mut *container) {
            self.record(err.into());
            return false;
        }
        for (index, item) in items.iter().enumerate() {
            self.path.push_index(index);
            if let Some(value) = self.build_element(item, element_type, element_accessor, depth)
                && let Err(err) = accessor.add_element(&mut *container, Some(value), registry)
            {
                self.record(err.into());
            }
            self.path.pop();
        }
        true
    }

    /// A new value of `type_ident` built from `tree`, for insertion into a container.
    fn build_element(
        &mut self,
        tree: &Value,
        type_ident: TypeIdent,
        accessor: Option<&Arc<dyn ContainerAccessor>>,
        depth: Depth,
    ) -> Option<Box<dyn Any>> {
        let registry = self.registry;
        let value = registry
            .create_default(type_ident)
            .or_else(|| accessor?.new_empty(registry));

        let Some(mut value) = value else {
            let issue = match registry.get_class(type_ident) {
                Some(class) => Issue::ConstructorMismatch {
                    class: class.name().to_string(),
                },
                None => Issue::Unregistered(type_ident.type_name().to_string()),
            };
            self.record(issue);
            return None;
        };

        if self.read_value(tree, value.as_mut(), type_ident, accessor, depth) {
            Some(value)
        } else {
            None
        }
    }
}
