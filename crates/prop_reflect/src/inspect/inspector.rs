use alloc::boxed::Box;
use alloc::format;
use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::any::Any;

use prop_utils::hash::HashMap;

use super::ViewCache;
use crate::TypeIdent;
use crate::container::{ContainerAccessor, ContainerError, ContainerShape, EntryKey};
use crate::meta::PropertyMeta;
use crate::registry::{ClassRegistry, EnumVariant, TypeKind};
use crate::visit::{self, Depth, TraversalConfig};

/// Shown for values nothing knows how to draw.
pub const UNSUPPORTED: &str = "[unsupported type]";

/// Shown in place of values below the depth ceiling.
pub const DEPTH_LIMIT: &str = "[max recursion depth reached]";

// -----------------------------------------------------------------------------
// InspectorUi

/// What the user asked for in a container header.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum ContainerAction {
    #[default]
    None,
    /// Append a default element (default key and value for maps).
    Add,
    Clear,
}

/// What the user asked for next to one container element.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum ElementAction {
    #[default]
    Keep,
    Remove,
}

/// The drawing side of an [`Inspector`].
///
/// The inspector decides what to show and in which order; the UI only draws
/// and reports user input. Leaves are drawn through [`LeafRenderers`].
pub trait InspectorUi {
    /// Opens a collapsible group. `false` skips its contents and the
    /// matching [`end_group`](Self::end_group).
    fn begin_group(&mut self, label: &str) -> bool;

    fn end_group(&mut self);

    /// Draws a value as plain text.
    fn read_only(&mut self, label: &str, text: &str);

    /// Lets the user pick a variant. Returns the chosen position in `variants`.
    fn enum_combo(&mut self, label: &str, variants: &[EnumVariant], current: Option<usize>) -> Option<usize>;

    /// Drawn before a container's group. `editable` is `false` for fixed-size
    /// and read-only containers, whose actions are ignored.
    fn container_header(&mut self, _label: &str, _len: usize, _editable: bool) -> ContainerAction {
        ContainerAction::None
    }

    /// Drawn after each container element.
    fn element_controls(&mut self, _label: &str, _removable: bool) -> ElementAction {
        ElementAction::Keep
    }

    fn unsupported(&mut self, label: &str) {
        self.read_only(label, UNSUPPORTED);
    }

    fn depth_limit(&mut self, label: &str) {
        self.read_only(label, DEPTH_LIMIT);
    }
}

// -----------------------------------------------------------------------------
// LeafRenderers

type RenderFn<U> = Box<dyn Fn(&mut U, &str, &mut dyn Any, &PropertyMeta) -> Option<bool>>;

/// Leaf widgets supplied by the UI layer, keyed by the type they draw.
///
/// ```
/// use prop_reflect::TypeIdent;
/// use prop_reflect::inspect::LeafRenderers;
/// use prop_reflect::meta::PropertyMeta;
///
/// struct Log(Vec<String>);
///
/// let mut renderers = LeafRenderers::<Log>::new();
/// renderers.register::<bool>(|ui, label, value, _meta| {
///     ui.0.push(format!("{label}: {value}"));
///     false
/// });
///
/// let mut ui = Log(Vec::new());
/// let meta = PropertyMeta::default();
/// let drawn = renderers.render_leaf(&mut ui, TypeIdent::of::<bool>(), "Visible", &mut true, &meta);
/// assert_eq!(drawn, Some(false));
/// assert_eq!(ui.0, ["Visible: true"]);
///
/// assert!(renderers.render_leaf(&mut ui, TypeIdent::of::<u8>(), "Count", &mut 1_u8, &meta).is_none());
/// ```
pub struct LeafRenderers<U: ?Sized> {
    renderers: HashMap<TypeIdent, RenderFn<U>>,
}

impl<U: ?Sized> Default for LeafRenderers<U> {
    fn default() -> Self {
        Self {
            renderers: HashMap::default(),
        }
    }
}

impl<U: ?Sized> LeafRenderers<U> {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Draws `T` with `render`, which returns whether the value was modified.
    ///
    /// Replaces any earlier renderer of `T`.
    pub fn register<T: Any>(
        &mut self,
        render: impl Fn(&mut U, &str, &mut T, &PropertyMeta) -> bool + 'static,
    ) -> &mut Self {
        let render: RenderFn<U> = Box::new(move |ui: &mut U, label: &str, value: &mut dyn Any, meta: &PropertyMeta| {
            let value = value.downcast_mut::<T>()?;
            Some(render(ui, label, value, meta))
        });
        self.renderers.insert(TypeIdent::of::<T>(), render);
        self
    }

    #[inline]
    pub fn contains(&self, type_ident: TypeIdent) -> bool {
        self.renderers.contains_key(&type_ident)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.renderers.len()
    }

    /// Draws `value` of type `type_ident`. `None` if no renderer is registered
    /// for it (or `value` is not of that type), otherwise whether it changed.
    pub fn render_leaf(
        &self,
        ui: &mut U,
        type_ident: TypeIdent,
        label: &str,
        value: &mut dyn Any,
        meta: &PropertyMeta,
    ) -> Option<bool> {
        let render = self.renderers.get(&type_ident)?;
        render(ui, label, value, meta)
    }
}

// -----------------------------------------------------------------------------
// Inspector

/// Walks an instance property by property and hands each one to an
/// [`InspectorUi`].
///
/// Classes open a group per nested instance; containers get a header (add,
/// clear) and per-element controls (remove). Removals are collected while
/// the container is iterated and applied afterwards, last position first.
///
/// Read-only properties are never handed to a renderer. Leaves and enums are
/// drawn as text; everything reached through a read-only class or container
/// is read-only too.
pub struct Inspector<U: InspectorUi + ?Sized> {
    views: ViewCache,
    renderers: LeafRenderers<U>,
    config: TraversalConfig,
}

impl<U: InspectorUi + ?Sized> Inspector<U> {
    pub fn new(renderers: LeafRenderers<U>) -> Self {
        Self {
            views: ViewCache::new(),
            renderers,
            config: TraversalConfig::default(),
        }
    }

    #[inline]
    pub fn with_config(mut self, config: TraversalConfig) -> Self {
        self.config = config;
        self
    }

    #[inline]
    pub fn renderers_mut(&mut self) -> &mut LeafRenderers<U> {
        &mut self.renderers
    }

    #[inline]
    pub fn views_mut(&mut self) -> &mut ViewCache {
        &mut self.views
    }

    /// Draws `instance`, a value of type `type_ident`, and returns whether
    /// anything was modified.
    ///
    /// The properties of a root class are drawn without an enclosing group.
    pub fn inspect(
        &mut self,
        registry: &ClassRegistry,
        ui: &mut U,
        instance: &mut dyn Any,
        type_ident: TypeIdent,
    ) -> bool {
        let depth = self.config.root();
        let mut walk = Walk {
            registry,
            views: &mut self.views,
            renderers: &self.renderers,
            ui,
        };
        if registry.classify(type_ident) == TypeKind::Class {
            walk.class_body(instance, type_ident, false, depth)
        } else {
            let meta = PropertyMeta::default();
            walk.value(type_ident.type_name(), instance, type_ident, &meta, depth)
        }
    }
}

struct Walk<'a, U: ?Sized> {
    registry: &'a ClassRegistry,
    views: &'a mut ViewCache,
    renderers: &'a LeafRenderers<U>,
    ui: &'a mut U,
}

impl<U: InspectorUi + ?Sized> Walk<'_, U> {
    fn descend(&mut self, label: &str, depth: Depth) -> Option<Depth> {
        let next = depth.descend().ok();
        if next.is_none() {
            self.ui.depth_limit(label);
        }
        next
    }

    fn report(&mut self, label: &str, result: Result<(), ContainerError>) -> bool {
        match result {
            Ok(()) => true,
            Err(err) => {
                log::warn!("inspector could not edit `{label}`: {err}");
                false
            }
        }
    }

    fn class_body(&mut self, instance: &mut dyn Any, type_ident: TypeIdent, read_only: bool, depth: Depth) -> bool {
        let registry = self.registry;
        let Some(class) = registry.get_class(type_ident) else {
            return false;
        };
        let Some(view) = self.views.get_or_create_class_view(registry, type_ident) else {
            return false;
        };
        let locked = PropertyMeta::read_only_marker();

        // Rows follow `all_properties`, the same order the walk reports them in.
        let mut rows = view.properties().iter();
        let mut modified = false;
        visit::visit_mut(instance, class, |property, field| {
            let Some(row) = rows.find(|row| row.property().name() == property.name()) else {
                return;
            };
            let meta = if read_only { &locked } else { row.meta() };
            modified |= match row.container_accessor() {
                Some(accessor) => self.container(row.label(), field, accessor, meta, depth),
                None => self.value(row.label(), field, property.type_ident(), meta, depth),
            };
        });
        modified
    }

    fn value(
        &mut self,
        label: &str,
        target: &mut dyn Any,
        type_ident: TypeIdent,
        meta: &PropertyMeta,
        depth: Depth,
    ) -> bool {
        let registry = self.registry;
        let read_only = meta.is_read_only();
        if read_only && let Some(text) = describe(registry, target, type_ident) {
            self.ui.read_only(label, &text);
            return false;
        }
        if !read_only && let Some(modified) = self.renderers.render_leaf(self.ui, type_ident, label, target, meta) {
            return modified;
        }

        match registry.classify(type_ident) {
            TypeKind::Enum if read_only => {
                self.ui.unsupported(label);
                false
            }
            TypeKind::Enum => {
                let Some(info) = registry.enum_info(type_ident) else {
                    return false;
                };
                let variants = info.variants();
                let current = info
                    .variant_of(target)
                    .and_then(|variant| variants.iter().position(|v| v.value == variant.value));
                match self.ui.enum_combo(label, variants, current) {
                    Some(choice) if Some(choice) != current => variants
                        .get(choice)
                        .is_some_and(|variant| info.set(target, variant.value)),
                    _ => false,
                }
            }
            TypeKind::Class => {
                let Some(depth) = self.descend(label, depth) else {
                    return false;
                };
                if !self.ui.begin_group(label) {
                    return false;
                }
                let modified = self.class_body(target, type_ident, read_only, depth);
                self.ui.end_group();
                modified
            }
            TypeKind::Container => match registry.container(type_ident) {
                Some(accessor) => self.container(label, target, accessor, meta, depth),
                None => false,
            },
            TypeKind::Leaf | TypeKind::Unregistered => {
                self.ui.unsupported(label);
                false
            }
        }
    }

    fn container(
        &mut self,
        label: &str,
        target: &mut dyn Any,
        accessor: &Arc<dyn ContainerAccessor>,
        meta: &PropertyMeta,
        depth: Depth,
    ) -> bool {
        let Some(depth) = self.descend(label, depth) else {
            return false;
        };
        let Some(len) = accessor.len(target) else {
            self.ui.unsupported(label);
            return false;
        };
        let registry = self.registry;
        let editable = !accessor.is_fixed_size() && !meta.is_read_only();

        let mut modified = false;
        match self.ui.container_header(label, len, editable) {
            ContainerAction::Add if editable => {
                let result = add_default(registry, target, accessor);
                modified |= self.report(label, result);
            }
            ContainerAction::Clear if editable => {
                let result = accessor.clear(target);
                modified |= self.report(label, result);
            }
            _ => {}
        }

        if !self.ui.begin_group(label) {
            return modified;
        }

        let element_type = accessor.element_type();
        let element_accessor = accessor.element_accessor();
        let key_type = accessor.key_type();
        let element_meta = if meta.is_read_only() {
            PropertyMeta::read_only_marker()
        } else {
            PropertyMeta::default()
        };
        let mut removals = Vec::new();
        let mut position = 0;

        let result = if accessor.shape() == ContainerShape::Set {
            accessor.for_each(&*target, &mut |entry| {
                let label = format!("[{position}]");
                let text = describe(registry, entry.value, element_type);
                self.ui.read_only(&label, text.as_deref().unwrap_or(UNSUPPORTED));
                if self.ui.element_controls(&label, editable) == ElementAction::Remove {
                    removals.push(position);
                }
                position += 1;
            })
        } else {
            accessor.for_each_mut(&mut *target, &mut |entry| {
                let label = match (entry.key, key_type) {
                    (EntryKey::Key(key), Some(key_type)) => describe(registry, key, key_type)
                        .unwrap_or_else(|| format!("[{position}]")),
                    _ => format!("[{position}]"),
                };
                modified |= match element_accessor {
                    Some(inner) => self.container(&label, entry.value, inner, &element_meta, depth),
                    None => self.value(&label, entry.value, element_type, &element_meta, depth),
                };
                if self.ui.element_controls(&label, editable) == ElementAction::Remove {
                    removals.push(position);
                }
                position += 1;
            })
        };
        if let Err(err) = result {
            log::warn!("inspector could not iterate `{label}`: {err}");
        }

        if editable {
            for index in removals.into_iter().rev() {
                let result = accessor.remove_element(target, index);
                modified |= self.report(label, result);
            }
        }

        self.ui.end_group();
        modified
    }
}

/// Text form of a leaf or enum value.
fn describe(registry: &ClassRegistry, value: &dyn Any, type_ident: TypeIdent) -> Option<String> {
    crate::serde::encode_key(registry, value, type_ident).ok()
}

fn add_default(
    registry: &ClassRegistry,
    target: &mut dyn Any,
    accessor: &Arc<dyn ContainerAccessor>,
) -> Result<(), ContainerError> {
    let Some(key_type) = accessor.key_type() else {
        return accessor.add_element(target, None, registry);
    };
    let key = registry
        .create_default(key_type)
        .ok_or_else(|| ContainerError::NotDefaultConstructible(key_type.type_name().into()))?;
    accessor.insert_entry(target, key, None, registry)
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use alloc::string::{String, ToString};
    use alloc::vec::Vec;
    use std::collections::{BTreeMap, BTreeSet};

    use super::{ContainerAction, ElementAction, Inspector, InspectorUi, LeafRenderers};
    use crate::registry::{ClassRegistry, EnumVariant};
    use crate::visit::TraversalConfig;
    use crate::{Reflect, TypeIdent};

    #[derive(Default)]
    struct Recorder {
        events: Vec<String>,
        remove: Vec<&'static str>,
        add: Vec<&'static str>,
        pick: Option<usize>,
    }

    impl InspectorUi for Recorder {
        fn begin_group(&mut self, label: &str) -> bool {
            self.events.push(format!("begin {label}"));
            true
        }

        fn end_group(&mut self) {
            self.events.push("end".to_string());
        }

        fn read_only(&mut self, label: &str, text: &str) {
            self.events.push(format!("{label} = {text}"));
        }

        fn enum_combo(&mut self, label: &str, variants: &[EnumVariant], current: Option<usize>) -> Option<usize> {
            let names: Vec<_> = variants.iter().map(|v| v.name).collect();
            self.events.push(format!("combo {label} {names:?} {current:?}"));
            self.pick
        }

        fn container_header(&mut self, label: &str, len: usize, editable: bool) -> ContainerAction {
            self.events.push(format!("header {label} [{len}] {editable}"));
            if self.add.iter().any(|add| *add == label) {
                ContainerAction::Add
            } else {
                ContainerAction::None
            }
        }

        fn element_controls(&mut self, label: &str, _removable: bool) -> ElementAction {
            if self.remove.iter().any(|remove| *remove == label) {
                ElementAction::Remove
            } else {
                ElementAction::Keep
            }
        }
    }

    #[derive(Reflect, Default, Debug, Clone, Copy, PartialEq)]
    enum Blend {
        #[default]
        Opaque,
        Additive,
    }

    #[derive(Reflect, Default)]
    #[reflect(default)]
    struct Transform {
        scale: f32,
    }

    #[derive(Reflect, Default)]
    #[reflect(default)]
    struct Sprite {
        #[reflect(range(0.0, 1.0))]
        alpha: f32,
        #[reflect(read_only)]
        frame: u32,
        blend: Blend,
        transform: Transform,
        layers: Vec<i32>,
        tags: BTreeSet<String>,
        lookup: BTreeMap<String, f32>,
        seed: u64,
    }

    fn renderers() -> LeafRenderers<Recorder> {
        let mut renderers = LeafRenderers::new();
        renderers
            .register::<f32>(|ui: &mut Recorder, label, value, meta| {
                ui.events.push(format!("{label} = {value}"));
                let next = meta.range().map_or(1.0, |range| range.clamp(2.0) as f32);
                let changed = *value != next;
                *value = next;
                changed
            })
            .register::<i32>(|ui: &mut Recorder, label, value, _| {
                ui.events.push(format!("{label} = {value}"));
                false
            });
        renderers
    }

    fn registry() -> ClassRegistry {
        let mut registry = ClassRegistry::new();
        registry.register::<Sprite>();
        registry.drain_pending();
        registry
    }

    fn sprite() -> Sprite {
        Sprite {
            alpha: 0.5,
            frame: 3,
            layers: vec![4, 5],
            tags: BTreeSet::from(["hero".to_string()]),
            lookup: BTreeMap::from([("speed".to_string(), 2.0)]),
            ..Default::default()
        }
    }

    #[test]
    fn walk_order_and_labels() {
        let registry = registry();
        let mut inspector = Inspector::new(renderers());
        let mut ui = Recorder::default();
        let mut sprite = sprite();

        let modified = inspector.inspect(&registry, &mut ui, &mut sprite, TypeIdent::of::<Sprite>());
        assert!(modified);
        assert_eq!(sprite.alpha, 1.0);
        assert_eq!(sprite.transform.scale, 1.0);
        assert_eq!(sprite.lookup["speed"], 1.0);

        assert_eq!(
            ui.events,
            [
                "Alpha = 0.5",
                "Frame = 3",
                "combo Blend [\"Opaque\", \"Additive\"] Some(0)",
                "begin Transform",
                "Scale = 0",
                "end",
                "header Layers [2] true",
                "begin Layers",
                "[0] = 4",
                "[1] = 5",
                "end",
                "header Tags [1] true",
                "begin Tags",
                "[0] = hero",
                "end",
                "header Lookup [1] true",
                "begin Lookup",
                "speed = 2",
                "end",
                "Seed = [unsupported type]",
            ]
        );
    }

    #[test]
    fn removals_apply_after_iteration() {
        let registry = registry();
        let mut inspector = Inspector::new(renderers());
        let mut ui = Recorder {
            remove: vec!["[0]", "[1]"],
            ..Default::default()
        };
        let mut sprite = Sprite {
            layers: vec![1, 2, 3],
            tags: BTreeSet::from(["a".to_string(), "b".to_string(), "c".to_string()]),
            ..Default::default()
        };

        assert!(inspector.inspect(&registry, &mut ui, &mut sprite, TypeIdent::of::<Sprite>()));
        assert_eq!(sprite.layers, [3]);
        assert_eq!(sprite.tags, BTreeSet::from(["c".to_string()]));
    }

    #[test]
    fn header_adds_default_elements() {
        let registry = registry();
        let mut inspector = Inspector::new(renderers());
        let mut ui = Recorder {
            add: vec!["Layers", "Lookup"],
            ..Default::default()
        };
        let mut sprite = Sprite::default();

        assert!(inspector.inspect(&registry, &mut ui, &mut sprite, TypeIdent::of::<Sprite>()));
        assert_eq!(sprite.layers, [0]);
        assert_eq!(sprite.lookup.len(), 1);
        assert!(sprite.lookup.contains_key(""));
    }

    #[test]
    fn enum_combo_sets_variant() {
        let registry = registry();
        let mut inspector = Inspector::new(LeafRenderers::new());
        let mut ui = Recorder {
            pick: Some(1),
            ..Default::default()
        };
        let mut blend = Blend::Opaque;

        assert!(inspector.inspect(&registry, &mut ui, &mut blend, TypeIdent::of::<Blend>()));
        assert_eq!(blend, Blend::Additive);
        assert!(!inspector.inspect(&registry, &mut ui, &mut blend, TypeIdent::of::<Blend>()));
    }

    #[test]
    fn depth_ceiling_stops_descent() {
        let registry = registry();
        let mut inspector = Inspector::new(renderers()).with_config(TraversalConfig { max_depth: 0 });
        let mut ui = Recorder::default();
        let mut sprite = sprite();

        inspector.inspect(&registry, &mut ui, &mut sprite, TypeIdent::of::<Sprite>());
        assert!(ui.events.contains(&"Transform = [max recursion depth reached]".to_string()));
        assert!(ui.events.contains(&"Layers = [max recursion depth reached]".to_string()));
        assert_eq!(sprite.transform.scale, 0.0);
    }

    #[test]
    fn read_only_reaches_elements_and_nested_classes() {
        #[derive(Reflect, Default)]
        #[reflect(default)]
        struct Locked {
            #[reflect(read_only)]
            weights: Vec<f32>,
            #[reflect(read_only)]
            transform: Transform,
            #[reflect(read_only)]
            blends: Vec<Blend>,
        }

        let mut registry = ClassRegistry::new();
        registry.register::<Locked>();
        registry.drain_pending();

        let mut inspector = Inspector::new(renderers());
        let mut ui = Recorder {
            add: vec!["Weights", "Blends"],
            remove: vec!["[0]"],
            pick: Some(1),
            ..Default::default()
        };
        let mut locked = Locked {
            weights: vec![0.25],
            transform: Transform { scale: 0.5 },
            blends: vec![Blend::Opaque],
        };

        assert!(!inspector.inspect(&registry, &mut ui, &mut locked, TypeIdent::of::<Locked>()));
        assert_eq!(locked.weights, [0.25]);
        assert_eq!(locked.transform.scale, 0.5);
        assert_eq!(locked.blends, [Blend::Opaque]);

        assert!(ui.events.contains(&"header Weights [1] false".to_string()));
        assert!(ui.events.contains(&"header Blends [1] false".to_string()));
        assert!(ui.events.contains(&"begin Transform".to_string()));
        assert!(ui.events.contains(&"[0] = Opaque".to_string()));
        assert!(!ui.events.iter().any(|event| event.starts_with("combo")));
    }

    #[test]
    fn fixed_arrays_are_not_editable() {
        #[derive(Reflect, Default)]
        #[reflect(default)]
        struct Quad {
            corners: [i32; 4],
        }

        let mut registry = ClassRegistry::new();
        registry.register::<Quad>();
        registry.drain_pending();

        let mut inspector = Inspector::new(renderers());
        let mut ui = Recorder {
            add: vec!["Corners"],
            remove: vec!["[0]"],
            ..Default::default()
        };
        let mut quad = Quad::default();
        assert!(!inspector.inspect(&registry, &mut ui, &mut quad, TypeIdent::of::<Quad>()));
        assert_eq!(quad.corners.len(), 4);
        assert_eq!(ui.events[0], "header Corners [4] false");
    }
}
