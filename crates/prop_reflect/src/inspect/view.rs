use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec::Vec;

use prop_utils::hash::HashMap;

use crate::TypeIdent;
use crate::container::ContainerAccessor;
use crate::meta::PropertyMeta;
use crate::property::Property;
use crate::registry::ClassRegistry;

/// Turns a field name into a label: `baseColor` and `base_color` both
/// become `Base Color`.
///
/// Words split at underscores and at lower-to-upper case changes; a run of
/// capitals keeps together until the last one starts a new word.
///
/// ```
/// use prop_reflect::inspect::pretty_name;
///
/// assert_eq!(pretty_name("base_color"), "Base Color");
/// assert_eq!(pretty_name("baseColor"), "Base Color");
/// assert_eq!(pretty_name("HDRMode"), "HDR Mode");
/// assert_eq!(pretty_name("_scale2d"), "Scale2d");
/// ```
pub fn pretty_name(name: &str) -> String {
    let chars: Vec<char> = name.chars().collect();
    let mut out = String::with_capacity(name.len() + 4);
    let mut word_start = true;

    for (index, &ch) in chars.iter().enumerate() {
        if ch == '_' || ch == ' ' {
            word_start = true;
            continue;
        }
        if ch.is_uppercase() && index > 0 {
            let prev = chars[index - 1];
            let next_is_lower = chars.get(index + 1).is_some_and(|next| next.is_lowercase());
            if prev.is_lowercase() || prev.is_ascii_digit() || (prev.is_uppercase() && next_is_lower) {
                word_start = true;
            }
        }
        if word_start {
            if !out.is_empty() {
                out.push(' ');
            }
            out.extend(ch.to_uppercase());
            word_start = false;
        } else {
            out.push(ch);
        }
    }
    out
}

/// One row of a [`ClassView`].
#[derive(Clone)]
pub struct PropertyView {
    property: Property,
    label: String,
}

impl PropertyView {
    fn new(property: &Property) -> Self {
        let label = match property.meta().display_name() {
            Some(name) => name.into(),
            None => pretty_name(property.name()),
        };
        Self {
            property: property.clone(),
            label,
        }
    }

    #[inline]
    pub fn property(&self) -> &Property {
        &self.property
    }

    /// Display name if one was declared, otherwise [`pretty_name`] of the field.
    #[inline]
    pub fn label(&self) -> &str {
        &self.label
    }

    #[inline]
    pub fn meta(&self) -> &PropertyMeta {
        self.property.meta()
    }

    #[inline]
    pub fn is_container(&self) -> bool {
        self.property.is_container()
    }

    #[inline]
    pub fn container_accessor(&self) -> Option<&Arc<dyn ContainerAccessor>> {
        self.property.container_accessor()
    }
}

/// The rendering-side summary of a class: its name and its ordered properties,
/// inherited ones first.
pub struct ClassView {
    name: String,
    type_ident: TypeIdent,
    properties: Vec<PropertyView>,
}

impl ClassView {
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn type_ident(&self) -> TypeIdent {
        self.type_ident
    }

    #[inline]
    pub fn properties(&self) -> &[PropertyView] {
        &self.properties
    }
}

/// Lazily built [`ClassView`]s, one per class.
///
/// Views are immutable snapshots of the registry; rebuild the cache (or
/// [`clear`](Self::clear) it) if classes change.
#[derive(Default)]
pub struct ViewCache {
    views: HashMap<TypeIdent, Arc<ClassView>>,
}

impl ViewCache {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// The view of class `type_ident`; `None` if it is not a registered class.
    pub fn get_or_create_class_view(
        &mut self,
        registry: &ClassRegistry,
        type_ident: TypeIdent,
    ) -> Option<Arc<ClassView>> {
        if let Some(view) = self.views.get(&type_ident) {
            return Some(view.clone());
        }
        let class = registry.get_class(type_ident)?;
        let view = Arc::new(ClassView {
            name: class.name().into(),
            type_ident,
            properties: class.all_properties().iter().map(PropertyView::new).collect(),
        });
        log::trace!("built inspector view of `{}`", view.name);
        self.views.insert(type_ident, view.clone());
        Some(view)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.views.len()
    }

    #[inline]
    pub fn clear(&mut self) {
        self.views.clear();
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use alloc::sync::Arc;

    use super::{ViewCache, pretty_name};
    use crate::registry::ClassRegistry;
    use crate::{Reflect, TypeIdent};

    #[allow(non_snake_case)]
    #[derive(Reflect)]
    struct Material {
        base_color: [f32; 4],
        #[reflect(display_name = "Roughness (0-1)")]
        roughness: f32,
        textureSlots: Vec<String>,
    }

    #[test]
    fn names() {
        assert_eq!(pretty_name("x"), "X");
        assert_eq!(pretty_name("max_depth"), "Max Depth");
        assert_eq!(pretty_name("uvScale"), "Uv Scale");
        assert_eq!(pretty_name("IOR"), "IOR");
        assert_eq!(pretty_name("layer2Mask"), "Layer2 Mask");
        assert_eq!(pretty_name(""), "");
    }

    #[test]
    fn views_are_cached() {
        let mut registry = ClassRegistry::new();
        registry.register::<Material>();
        registry.drain_pending();

        let mut cache = ViewCache::new();
        let ident = TypeIdent::of::<Material>();
        let view = cache.get_or_create_class_view(&registry, ident).unwrap();

        assert_eq!(view.name(), "Material");
        let labels: Vec<_> = view.properties().iter().map(|row| row.label()).collect();
        assert_eq!(labels, ["Base Color", "Roughness (0-1)", "Texture Slots"]);
        assert!(view.properties()[2].is_container());

        let again = cache.get_or_create_class_view(&registry, ident).unwrap();
        assert!(Arc::ptr_eq(&view, &again));
        assert_eq!(cache.len(), 1);

        assert!(cache.get_or_create_class_view(&registry, TypeIdent::of::<u8>()).is_none());
    }
}
