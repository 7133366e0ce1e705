//! The per-property walk shared by serialization and inspection.
//!
//! [`visit`] reports each property of an instance once, together with the
//! field it resolves to. It never descends: nested classes and container
//! elements are reached by the caller re-invoking it, which keeps the walk
//! identical for deep consumers (the serializer) and shallow ones (a
//! property list). Callers that recurse track a [`Depth`].

use core::any::Any;

use crate::ReflectError;
use crate::class::ClassDescriptor;
use crate::property::Property;

/// Recursion ceiling used when nothing else is configured.
pub const DEFAULT_MAX_DEPTH: usize = 10;

/// Knobs for recursive consumers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TraversalConfig {
    /// Deepest nesting level a consumer descends to. The root instance is level 0.
    pub max_depth: usize,
}

impl Default for TraversalConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl TraversalConfig {
    #[inline]
    pub fn root(&self) -> Depth {
        Depth::new(self.max_depth)
    }
}

/// The current nesting level of a recursive walk.
///
/// ```
/// use prop_reflect::ReflectError;
/// use prop_reflect::visit::Depth;
///
/// let root = Depth::new(1);
/// let child = root.descend().unwrap();
/// assert_eq!(child.current(), 1);
/// assert_eq!(
///     child.descend(),
///     Err(ReflectError::RecursionLimitExceeded { max: 1 }),
/// );
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Depth {
    current: usize,
    max: usize,
}

impl Depth {
    #[inline]
    pub const fn new(max: usize) -> Self {
        Self { current: 0, max }
    }

    #[inline]
    pub const fn current(self) -> usize {
        self.current
    }

    #[inline]
    pub const fn max(self) -> usize {
        self.max
    }

    /// One level deeper, or an error once the ceiling is reached.
    pub fn descend(self) -> Result<Self, ReflectError> {
        if self.current >= self.max {
            return Err(ReflectError::RecursionLimitExceeded { max: self.max });
        }
        Ok(Self {
            current: self.current + 1,
            max: self.max,
        })
    }
}

/// Calls `f` once per property of `class`, inherited ones first, with the
/// field it resolves to inside `instance`.
///
/// Container fields are reported once, as the container. Returns the number
/// of properties reported; properties that do not resolve on `instance`
/// (wrong instance type) are skipped.
///
/// ```
/// use prop_reflect::Reflect;
/// use prop_reflect::registry::ClassRegistry;
/// use prop_reflect::visit;
///
/// #[derive(Reflect)]
/// struct Label {
///     text: String,
///     lines: Vec<String>,
/// }
///
/// let mut registry = ClassRegistry::new();
/// registry.register::<Label>();
/// registry.drain_pending();
/// let class = registry.class_of::<Label>().unwrap();
///
/// let label = Label { text: "hi".into(), lines: vec!["a".into(), "b".into()] };
/// let mut seen = Vec::new();
/// visit::visit(&label, class, |prop, _| seen.push((prop.name(), prop.is_container())));
/// assert_eq!(seen, [("text", false), ("lines", true)]);
/// ```
pub fn visit<F>(instance: &dyn Any, class: &ClassDescriptor, f: F) -> usize
where
    F: FnMut(&Property, &dyn Any),
{
    walk(instance, class.all_properties(), f)
}

/// Like [`visit`], limited to the properties `class` declares itself.
pub fn visit_own<F>(instance: &dyn Any, class: &ClassDescriptor, f: F) -> usize
where
    F: FnMut(&Property, &dyn Any),
{
    walk(instance, class.own_properties(), f)
}

/// Like [`visit`], with mutable access to each field.
pub fn visit_mut<F>(instance: &mut dyn Any, class: &ClassDescriptor, f: F) -> usize
where
    F: FnMut(&Property, &mut dyn Any),
{
    walk_mut(instance, class.all_properties(), f)
}

/// Like [`visit_own`], with mutable access to each field.
pub fn visit_own_mut<F>(instance: &mut dyn Any, class: &ClassDescriptor, f: F) -> usize
where
    F: FnMut(&Property, &mut dyn Any),
{
    walk_mut(instance, class.own_properties(), f)
}

fn walk<F>(instance: &dyn Any, properties: &[Property], mut f: F) -> usize
where
    F: FnMut(&Property, &dyn Any),
{
    let mut count = 0;
    for property in properties {
        if let Some(field) = property.get(instance) {
            f(property, field);
            count += 1;
        }
    }
    count
}

fn walk_mut<F>(instance: &mut dyn Any, properties: &[Property], mut f: F) -> usize
where
    F: FnMut(&Property, &mut dyn Any),
{
    let mut count = 0;
    for property in properties {
        if let Some(field) = property.get_mut(&mut *instance) {
            f(property, field);
            count += 1;
        }
    }
    count
}

// -----------------------------------------------------------------------------
// Tests
