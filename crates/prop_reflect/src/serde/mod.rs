//! Reading and writing reflected instances as JSON trees.
//!
//! # Overview
//!
//! - [`ReflectSerializer`]: instance to [`serde_json::Value`].
//! - [`ReflectDeserializer`]: [`serde_json::Value`] into an existing or new instance.
//! - [`Report`]: the items either direction skipped, with their tree paths.
//!
//! Both directions walk a class's own properties with
//! [`visit_own`](crate::visit::visit_own) and
//! [`visit_own_mut`](crate::visit::visit_own_mut), so fields are written and
//! read in declaration order. Parent parts recurse through `__base__`, and
//! leaves go to their [`LeafCodec`](crate::registry::LeafCodec). No reflected
//! type needs to implement `serde` traits itself.
//!
//! ## Tree layout
//!
//! | Kind | Tree |
//! |---|---|
//! | leaf | the leaf's own `serde` form |
//! | enum | variant name (integers accepted on read) |
//! | class | object keyed by property name |
//! | parent fields | `"__base__": { "<Parent>": { .. } }` inside the child's object |
//! | sequence, set, array | array, in iteration order |
//! | map | object; string keys verbatim, other keys as JSON text |
//!
//! ## Field Skipping
//!
//! Properties marked `not_serialized` (or `transient`) are neither written
//! nor read.

// -----------------------------------------------------------------------------
// Modules

mod de;
mod field_path;
mod report;
mod ser;

// -----------------------------------------------------------------------------
// Exports

pub use de::ReflectDeserializer;
pub use report::{Issue, Report, ReportEntry};
pub use ser::ReflectSerializer;

use alloc::boxed::Box;
use alloc::string::{String, ToString};
use core::any::Any;

use serde_json::Value;

use crate::TypeIdent;
use crate::registry::ClassRegistry;
use crate::visit::{DEFAULT_MAX_DEPTH, Depth};

/// Object key holding the parent part of a class.
pub const BASE_KEY: &str = "__base__";

/// Knobs shared by [`ReflectSerializer`] and [`ReflectDeserializer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SerializerConfig {
    /// Deepest nesting level written or read. Deeper values are skipped and reported.
    pub max_depth: usize,
}

impl Default for SerializerConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl SerializerConfig {
    #[inline]
    fn root(&self) -> Depth {
        Depth::new(self.max_depth)
    }
}

fn json_kind(tree: &Value) -> &'static str {
    match tree {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// The object-key form of a map key.
pub(crate) fn encode_key(registry: &ClassRegistry, key: &dyn Any, key_type: TypeIdent) -> Result<String, Issue> {
    if let Some(codec) = registry.leaf(key_type) {
        return codec.encode_key(key).map_err(Issue::from);
    }
    if let Some(info) = registry.enum_info(key_type) {
        return info
            .variant_of(key)
            .map(|variant| variant.name.to_string())
            .ok_or_else(|| Issue::UnknownVariant {
                enum_name: info.name().to_string(),
                value: "<unknown>".to_string(),
            });
    }
    Err(Issue::Unregistered(key_type.type_name().to_string()))
}

fn decode_key(registry: &ClassRegistry, text: &str, key_type: TypeIdent) -> Result<Box<dyn Any>, Issue> {
    if let Some(codec) = registry.leaf(key_type) {
        return codec.decode_key(text).map_err(Issue::from);
    }
    if let Some(info) = registry.enum_info(key_type) {
        return info
            .by_name(text)
            .and_then(|variant| info.create(variant.value))
            .ok_or_else(|| Issue::UnknownVariant {
                enum_name: info.name().to_string(),
                value: text.to_string(),
            });
    }
    Err(Issue::Unregistered(key_type.type_name().to_string()))
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use std::collections::{BTreeMap, BTreeSet, HashMap, VecDeque};

    use serde_json::{Value, json};

    use super::{Issue, ReflectDeserializer, ReflectSerializer, SerializerConfig};
    use crate::registry::ClassRegistry;
    use crate::{Reflect, TypeIdent};

    #[derive(Reflect, Default, Debug, Clone, PartialEq)]
    #[reflect(default)]
    struct Point {
        x: f32,
        y: f32,
    }

    #[derive(Reflect, Default, Debug, PartialEq)]
    #[reflect(default)]
    struct Container {
        points: Vec<Point>,
    }

    #[derive(Reflect, Default, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
    enum Quality {
        #[default]
        Low,
        Medium,
        High = 8,
    }

    #[derive(Reflect, Default, Debug, PartialEq)]
    #[reflect(default)]
    struct Settings {
        title: String,
        scale: f64,
        samples: u8,
        enabled: bool,
        initial: char,
        quality: Quality,
        origin: Point,
    }

    #[derive(Reflect, Default, Debug, PartialEq)]
    #[reflect(default)]
    struct Collections {
        numbers: Vec<i32>,
        queue: VecDeque<u16>,
        names: BTreeMap<String, u32>,
        lookup: HashMap<u32, String>,
        tags: BTreeSet<String>,
        grid: [[u8; 2]; 2],
        by_quality: BTreeMap<Quality, bool>,
    }

    #[derive(Reflect, Default, Debug, PartialEq)]
    #[reflect(default)]
    struct Shape {
        sides: u32,
    }

    #[derive(Reflect, Default, Debug, PartialEq)]
    #[reflect(default)]
    struct Polygon {
        #[reflect(parent)]
        shape: Shape,
        label: String,
    }

    #[derive(Reflect, Default, Debug, PartialEq)]
    #[reflect(default)]
    struct Cached {
        value: i32,
        #[reflect(not_serialized)]
        cache: Vec<i32>,
        #[reflect(transient)]
        scratch: bool,
    }

    #[derive(Reflect, Default)]
    #[reflect(default)]
    struct Node {
        value: u8,
        children: Vec<Node>,
    }

    fn registry() -> ClassRegistry {
        let mut registry = ClassRegistry::new();
        registry.register::<Container>();
        registry.register::<Settings>();
        registry.register::<Collections>();
        registry.register::<Polygon>();
        registry.register::<Cached>();
        registry.register::<Node>();
        registry.drain_pending();
        registry
    }

    fn round_trip<T: Reflect + Default>(registry: &ClassRegistry, value: &T) -> T {
        let tree = ReflectSerializer::new(registry).serialize_typed(value).unwrap();
        let mut fresh = T::default();
        let report = ReflectDeserializer::new(registry)
            .deserialize_typed(&tree, &mut fresh)
            .unwrap();
        assert!(report.is_empty(), "{report:?}");
        fresh
    }

    #[test]
    fn points_scenario() {
        let registry = registry();
        let container = Container {
            points: vec![Point { x: 1.0, y: 2.0 }, Point { x: 3.0, y: 4.0 }],
        };

        let tree = ReflectSerializer::new(&registry).serialize_typed(&container).unwrap();
        assert_eq!(
            tree,
            json!({ "points": [{ "x": 1.0, "y": 2.0 }, { "x": 3.0, "y": 4.0 }] })
        );

        let mut fresh = Container::default();
        ReflectDeserializer::new(&registry).deserialize_typed(&tree, &mut fresh);
        assert_eq!(fresh, container);
    }

    #[test]
    fn leaves_round_trip() {
        let registry = registry();
        let settings = Settings {
            title: "main".into(),
            scale: 1.25,
            samples: 4,
            enabled: true,
            initial: 'q',
            quality: Quality::High,
            origin: Point { x: -1.0, y: 0.5 },
        };
        assert_eq!(round_trip(&registry, &settings), settings);

        let tree = ReflectSerializer::new(&registry).serialize_typed(&settings).unwrap();
        assert_eq!(tree["quality"], json!("High"));
        assert_eq!(tree["initial"], json!("q"));
    }

    #[test]
    fn containers_round_trip_at_every_size() {
        let registry = registry();
        for size in [0_usize, 1, 5] {
            let collections = Collections {
                numbers: (0..size as i32).map(|n| n * 3 - 4).collect(),
                queue: (0..size as u16).collect(),
                names: (0..size).map(|n| (format!("name {n}"), n as u32)).collect(),
                lookup: (0..size as u32).map(|n| (n * 10, n.to_string())).collect(),
                tags: (0..size).map(|n| format!("tag{n}")).collect(),
                grid: [[size as u8, 1], [2, 3]],
                by_quality: [(Quality::Low, true), (Quality::High, false)]
                    .into_iter()
                    .take(size)
                    .collect(),
            };
            assert_eq!(round_trip(&registry, &collections), collections);
        }
    }

    #[test]
    fn map_keys_are_stringified() {
        let registry = registry();
        let collections = Collections {
            lookup: HashMap::from([(7, "seven".to_string())]),
            by_quality: BTreeMap::from([(Quality::Medium, true)]),
            names: BTreeMap::from([("12".to_string(), 1)]),
            ..Default::default()
        };
        let tree = ReflectSerializer::new(&registry).serialize_typed(&collections).unwrap();
        assert_eq!(tree["lookup"], json!({ "7": "seven" }));
        assert_eq!(tree["by_quality"], json!({ "Medium": true }));
        assert_eq!(tree["names"], json!({ "12": 1 }));
        assert_eq!(tree["grid"], json!([[0, 0], [0, 0]]));
    }

    #[test]
    fn deserialize_overwrites_containers() {
        let registry = registry();
        let tree = json!({
            "numbers": [1, 2],
            "names": { "a": 1 },
            "tags": ["x"],
        });

        let mut stale = Collections {
            numbers: vec![9, 9, 9],
            names: BTreeMap::from([("old".to_string(), 0)]),
            tags: BTreeSet::from(["y".to_string()]),
            ..Default::default()
        };
        let deserializer = ReflectDeserializer::new(&registry);
        deserializer.deserialize_typed(&tree, &mut stale);
        assert_eq!(stale.numbers, [1, 2]);
        assert_eq!(stale.names, BTreeMap::from([("a".to_string(), 1)]));
        assert_eq!(stale.tags, BTreeSet::from(["x".to_string()]));

        deserializer.deserialize_typed(&tree, &mut stale);
        assert_eq!(stale.numbers, [1, 2]);
        assert_eq!(stale.names.len(), 1);
        assert_eq!(stale.tags.len(), 1);
    }

    #[test]
    fn parent_fields_nest_under_base() {
        let registry = registry();
        let polygon = Polygon {
            shape: Shape { sides: 6 },
            label: "hex".into(),
        };

        let tree = ReflectSerializer::new(&registry).serialize_typed(&polygon).unwrap();
        assert_eq!(
            tree,
            json!({ "__base__": { "Shape": { "sides": 6 } }, "label": "hex" })
        );
        assert_eq!(round_trip(&registry, &polygon), polygon);
    }

    #[test]
    fn schema_drift_is_skipped_and_reported() {
        let registry = registry();
        let tree = json!({
            "__base__": { "Shape": { "sides": 3, "corners": 3 }, "Circle": {} },
            "label": "tri",
            "color": "red",
        });

        let mut polygon = Polygon::default();
        let report = ReflectDeserializer::new(&registry)
            .deserialize_typed(&tree, &mut polygon)
            .unwrap();

        assert_eq!(polygon.shape.sides, 3);
        assert_eq!(polygon.label, "tri");

        let drift: Vec<_> = report
            .filter(|issue| matches!(issue, Issue::SchemaDrift { .. }))
            .map(|entry| entry.path.as_str())
            .collect();
        assert_eq!(drift.len(), 3);
        assert!(drift.contains(&"__base__.Shape.corners"));
        assert!(drift.contains(&"color"));
    }

    #[test]
    fn missing_fields_keep_their_values() {
        let registry = registry();
        let mut point = Point { x: 5.0, y: 6.0 };
        let report = ReflectDeserializer::new(&registry)
            .deserialize_typed(&json!({ "x": 1.0 }), &mut point)
            .unwrap();
        assert_eq!(point, Point { x: 1.0, y: 6.0 });
        assert!(matches!(
            &report.entries()[0].issue,
            Issue::MissingField { field } if field == "y"
        ));
    }

    #[test]
    fn missing_parent_fields_are_reported_under_base() {
        let registry = registry();
        let mut polygon = Polygon {
            shape: Shape { sides: 4 },
            label: String::new(),
        };

        let report = ReflectDeserializer::new(&registry)
            .deserialize_typed(&json!({ "label": "quad" }), &mut polygon)
            .unwrap();
        assert_eq!(polygon.shape.sides, 4);
        assert_eq!(polygon.label, "quad");
        assert_eq!(report.len(), 1);
        assert_eq!(report.entries()[0].path, "__base__.Shape.sides");
        assert!(matches!(
            &report.entries()[0].issue,
            Issue::MissingField { field } if field == "sides"
        ));

        // An empty `__base__` is the same as none.
        let report = ReflectDeserializer::new(&registry)
            .deserialize_typed(&json!({ "__base__": {}, "label": "quad" }), &mut polygon)
            .unwrap();
        assert_eq!(report.len(), 1);
        assert_eq!(report.entries()[0].path, "__base__.Shape.sides");

        // Parent fields written flat still count.
        let report = ReflectDeserializer::new(&registry)
            .deserialize_typed(&json!({ "sides": 5, "label": "penta" }), &mut polygon)
            .unwrap();
        assert!(report.is_empty(), "{report:?}");
        assert_eq!(polygon.shape.sides, 5);
    }

    #[test]
    fn both_directions_walk_fields_in_visit_order() {
        #[derive(Reflect, Default)]
        #[reflect(default)]
        struct Layout {
            zeta: Point,
            #[reflect(not_serialized)]
            hidden: Vec<u8>,
            alpha: Vec<u8>,
            mid: Point,
        }

        let mut registry = registry();
        registry.register::<Layout>();
        registry.drain_pending();
        let class = registry.class_of::<Layout>().unwrap();

        let mut visited = Vec::new();
        crate::visit::visit_own(&Layout::default(), class, |property, _| {
            if property.meta().is_serialized() {
                visited.push(property.name().to_string());
            }
        });
        assert_eq!(visited, ["zeta", "alpha", "mid"]);

        // A zero depth ceiling stops at every nested field, in walk order.
        let (tree, report) = ReflectSerializer::new(&registry)
            .with_config(SerializerConfig { max_depth: 0 })
            .serialize_with_report(&Layout::default(), class);
        assert_eq!(tree, json!({}));
        let written: Vec<_> = report.iter().map(|entry| entry.path.clone()).collect();
        assert_eq!(written, visited);

        let report = ReflectDeserializer::new(&registry).deserialize(&json!({}), &mut Layout::default(), class);
        let read: Vec<_> = report.iter().map(|entry| entry.path.clone()).collect();
        assert_eq!(read, visited);
    }

    #[test]
    fn bad_values_do_not_abort_the_load() {
        let registry = registry();
        let tree = json!({
            "title": 42,
            "scale": 2.0,
            "quality": "Ultra",
            "origin": [1, 2],
        });
        let mut settings = Settings::default();
        let report = ReflectDeserializer::new(&registry)
            .deserialize_typed(&tree, &mut settings)
            .unwrap();

        assert_eq!(settings.scale, 2.0);
        assert_eq!(settings.title, "");
        assert_eq!(settings.quality, Quality::Low);
        assert!(report.iter().any(|entry| matches!(entry.issue, Issue::Leaf(_))));
        assert!(report.iter().any(|entry| matches!(entry.issue, Issue::UnknownVariant { .. })));
        assert!(report.iter().any(|entry| matches!(
            entry.issue,
            Issue::TypeMismatch { expected: "object", found: "array" }
        )));
    }

    #[test]
    fn enums_read_from_integers() {
        let registry = registry();
        let mut settings = Settings::default();
        ReflectDeserializer::new(&registry).deserialize_typed(&json!({ "quality": 8 }), &mut settings);
        assert_eq!(settings.quality, Quality::High);
    }

    #[test]
    fn unserialized_fields_are_skipped_both_ways() {
        let registry = registry();
        let cached = Cached {
            value: 3,
            cache: vec![1, 2],
            scratch: true,
        };
        let tree = ReflectSerializer::new(&registry).serialize_typed(&cached).unwrap();
        assert_eq!(tree, json!({ "value": 3 }));

        let mut target = Cached {
            value: 0,
            cache: vec![9],
            scratch: true,
        };
        let report = ReflectDeserializer::new(&registry)
            .deserialize_typed(&json!({ "value": 4, "cache": [] }), &mut target)
            .unwrap();
        assert!(report.is_empty());
        assert_eq!(target.cache, [9]);
        assert_eq!(target.value, 4);
    }

    #[test]
    fn fixed_arrays_are_written_in_place() {
        let registry = registry();
        let mut collections = Collections::default();
        let report = ReflectDeserializer::new(&registry)
            .deserialize_typed(&json!({ "grid": [[1, 2], [3, 4, 5]] }), &mut collections)
            .unwrap();
        assert_eq!(collections.grid, [[1, 2], [3, 4]]);
        assert!(report.iter().any(|entry| entry.path == "grid[1]"
            && matches!(entry.issue, Issue::LengthMismatch { expected: 2, found: 3 })));
    }

    #[test]
    fn recursion_limit_is_a_soft_stop() {
        let registry = registry();
        let mut root = Node::default();
        let mut cursor = &mut root;
        for value in 1..6 {
            cursor.children.push(Node { value, children: Vec::new() });
            cursor = &mut cursor.children[0];
        }

        let config = SerializerConfig { max_depth: 4 };
        let (tree, report) = ReflectSerializer::new(&registry)
            .with_config(config)
            .serialize_with_report(&root, registry.class_of::<Node>().unwrap());

        assert_eq!(tree["children"][0]["children"][0]["value"], json!(2));
        assert_eq!(tree["children"][0]["children"][0].get("children"), None);
        assert!(report.iter().any(|entry| matches!(entry.issue, Issue::RecursionLimitExceeded { max: 4 })));
    }

    #[test]
    fn deserialize_new_builds_instances() {
        let registry = registry();
        let class = registry.class_of::<Point>().unwrap();
        let (point, report) =
            ReflectDeserializer::new(&registry).deserialize_new(&json!({ "x": 2.0, "y": 1.0 }), class);
        assert!(report.is_empty());
        assert_eq!(point.unwrap().downcast_ref::<Point>(), Some(&Point { x: 2.0, y: 1.0 }));
    }

    #[test]
    fn elements_without_constructor_are_reported() {
        #[derive(Reflect)]
        struct Handle {
            id: u32,
        }
        #[derive(Reflect, Default)]
        #[reflect(default)]
        struct Owner {
            handles: Vec<Handle>,
        }

        let mut registry = ClassRegistry::new();
        registry.register::<Owner>();
        registry.drain_pending();

        let mut owner = Owner::default();
        let report = ReflectDeserializer::new(&registry)
            .deserialize_typed(&json!({ "handles": [{ "id": 1 }] }), &mut owner)
            .unwrap();
        assert!(owner.handles.is_empty());
        assert!(matches!(
            &report.entries()[0].issue,
            Issue::ConstructorMismatch { class } if class == "Handle"
        ));
    }

    #[test]
    fn values_of_any_kind() {
        let registry = registry();
        let serializer = ReflectSerializer::new(&registry);

        let (tree, _) = serializer.serialize_value(&vec![1_i32, 2], TypeIdent::of::<Vec<i32>>());
        assert_eq!(tree, Some(json!([1, 2])));

        let (tree, report) = serializer.serialize_value(&(), TypeIdent::of::<()>());
        assert_eq!(tree, None);
        assert!(matches!(report.entries()[0].issue, Issue::Unregistered(_)));

        let mut number = 0_u64;
        ReflectDeserializer::new(&registry).deserialize_value(&json!(99), &mut number, TypeIdent::of::<u64>());
        assert_eq!(number, 99);
    }

    #[test]
    fn leaf_codecs_also_speak_ron() {
        let registry = registry();
        let codec = registry.leaf(TypeIdent::of::<String>()).unwrap();
        let value = String::from("ron");
        let text = ron::to_string(codec.as_serialize(&value).unwrap()).unwrap();
        assert_eq!(text, "\"ron\"");
        assert_eq!(Value::String(value), codec.encode(&String::from("ron")).unwrap());
    }
}
