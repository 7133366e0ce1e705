//! Editor and serializer hints attached to a property.
//!
//! [`MetaBuilder`] is typed by the field it describes, so numeric ranges
//! are only offered for [`Numeric`] fields and color pickers only for
//! [`ColorLike`] ones.
//!
//! ```
//! use prop_reflect::meta::{Manipulator, MetaBuilder};
//!
//! let meta = MetaBuilder::<f32>::new()
//!     .slider(0.0, 256.0, 1.0)
//!     .tooltip("Light intensity")
//!     .build();
//!
//! let range = meta.range().unwrap();
//! assert_eq!(range.manipulator, Manipulator::Slider);
//! assert_eq!(range.max, 256.0);
//! ```

use alloc::borrow::Cow;
use alloc::boxed::Box;
use core::any::Any;
use core::fmt;
use core::marker::PhantomData;

use bitflags::bitflags;
use prop_utils::TypeIdMap;

// -----------------------------------------------------------------------------
// FieldFlags

bitflags! {
    /// Behavioral flags of a property.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct FieldFlags: u8 {
        /// Skipped by the serializer in both directions.
        const NOT_SERIALIZED = 1;
        /// Runtime-only state. Never serialized.
        const TRANSIENT = 1 << 1;
        /// Shown by tooling but not editable.
        const READ_ONLY = 1 << 2;
    }
}

impl FieldFlags {
    /// Returns `true` unless the field is excluded from serialization.
    #[inline]
    pub const fn is_serialized(self) -> bool {
        !self.intersects(Self::NOT_SERIALIZED.union(Self::TRANSIENT))
    }
}

// -----------------------------------------------------------------------------
// NumericRange

/// The widget used to edit a numeric value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Manipulator {
    Slider,
    Drag,
    #[default]
    Input,
}

/// Editing bounds for a numeric property.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NumericRange {
    pub min: f64,
    pub max: f64,
    /// `None` means continuous.
    pub step: Option<f64>,
    pub manipulator: Manipulator,
}

impl NumericRange {
    /// Clamps `value` into `[min, max]`.
    #[inline]
    pub fn clamp(&self, value: f64) -> f64 {
        value.max(self.min).min(self.max)
    }

    #[inline]
    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

// -----------------------------------------------------------------------------
// CustomAttributes

/// Arbitrary typed tags, at most one value per type.
///
/// ```
/// use prop_reflect::meta::CustomAttributes;
///
/// struct Unit(&'static str);
///
/// let attrs = CustomAttributes::default().with_attribute(Unit("cd/m2"));
/// assert_eq!(attrs.get::<Unit>().unwrap().0, "cd/m2");
/// assert!(!attrs.contains::<u32>());
/// ```
#[derive(Default)]
pub struct CustomAttributes(TypeIdMap<Box<dyn Any + Send + Sync>>);

impl CustomAttributes {
    /// Adds `value`, replacing an earlier value of the same type.
    pub fn with_attribute<T: Any + Send + Sync>(mut self, value: T) -> Self {
        self.0.insert_type::<T>(Box::new(value));
        self
    }

    pub fn get<T: Any>(&self) -> Option<&T> {
        self.0.get_type::<T>()?.downcast_ref()
    }

    #[inline]
    pub fn contains<T: Any>(&self) -> bool {
        self.0.get_type::<T>().is_some()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for CustomAttributes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CustomAttributes")
            .field("len", &self.len())
            .finish()
    }
}

// -----------------------------------------------------------------------------
// PropertyMeta

/// Everything known about a property beyond its name and type.
#[derive(Debug, Default)]
pub struct PropertyMeta {
    flags: FieldFlags,
    color: bool,
    range: Option<NumericRange>,
    tooltip: Option<Cow<'static, str>>,
    category: Option<Cow<'static, str>>,
    display_name: Option<Cow<'static, str>>,
    attributes: CustomAttributes,
}

impl PropertyMeta {
    /// Meta of a value reached through a read-only property.
    pub(crate) fn read_only_marker() -> Self {
        Self {
            flags: FieldFlags::READ_ONLY,
            ..Self::default()
        }
    }

    #[inline]
    pub fn flags(&self) -> FieldFlags {
        self.flags
    }

    #[inline]
    pub fn is_serialized(&self) -> bool {
        self.flags.is_serialized()
    }

    #[inline]
    pub fn is_transient(&self) -> bool {
        self.flags.contains(FieldFlags::TRANSIENT)
    }

    #[inline]
    pub fn is_read_only(&self) -> bool {
        self.flags.contains(FieldFlags::READ_ONLY)
    }

    /// The field holds a color and wants a color picker.
    #[inline]
    pub fn is_color(&self) -> bool {
        self.color
    }

    #[inline]
    pub fn range(&self) -> Option<&NumericRange> {
        self.range.as_ref()
    }

    #[inline]
    pub fn tooltip(&self) -> Option<&str> {
        self.tooltip.as_deref()
    }

    #[inline]
    pub fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }

    /// Label override for tooling.
    #[inline]
    pub fn display_name(&self) -> Option<&str> {
        self.display_name.as_deref()
    }

    #[inline]
    pub fn attributes(&self) -> &CustomAttributes {
        &self.attributes
    }

    #[inline]
    pub fn get_attribute<T: Any>(&self) -> Option<&T> {
        self.attributes.get::<T>()
    }
}

// -----------------------------------------------------------------------------
// Field capabilities

/// Numbers that can carry a [`NumericRange`].
pub trait Numeric: Copy + 'static {
    fn to_f64(self) -> f64;
}

macro_rules! impl_numeric {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Numeric for $ty {
                #[inline]
                fn to_f64(self) -> f64 {
                    self as f64
                }
            }
        )*
    };
}

impl_numeric!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize, f32, f64);

/// Values edited with a color picker.
///
/// Implement it for your own color type to enable [`MetaBuilder::color`].
pub trait ColorLike: 'static {}

impl ColorLike for [f32; 3] {}
impl ColorLike for [f32; 4] {}
impl ColorLike for [u8; 3] {}
impl ColorLike for [u8; 4] {}

// -----------------------------------------------------------------------------
// MetaBuilder

/// Fluent builder for the [`PropertyMeta`] of a field of type `F`.
pub struct MetaBuilder<F: ?Sized> {
    meta: PropertyMeta,
    _field: PhantomData<fn() -> F>,
}

impl<F: ?Sized> Default for MetaBuilder<F> {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl<F: ?Sized> MetaBuilder<F> {
    #[inline]
    pub fn new() -> Self {
        Self {
            meta: PropertyMeta::default(),
            _field: PhantomData,
        }
    }

    #[inline]
    pub fn build(self) -> PropertyMeta {
        self.meta
    }

    pub fn tooltip(mut self, text: impl Into<Cow<'static, str>>) -> Self {
        self.meta.tooltip = Some(text.into());
        self
    }

    pub fn category(mut self, name: impl Into<Cow<'static, str>>) -> Self {
        self.meta.category = Some(name.into());
        self
    }

    pub fn display_name(mut self, name: impl Into<Cow<'static, str>>) -> Self {
        self.meta.display_name = Some(name.into());
        self
    }

    pub fn not_serialized(mut self) -> Self {
        self.meta.flags |= FieldFlags::NOT_SERIALIZED;
        self
    }

    /// Runtime-only state: not serialized either.
    pub fn transient(mut self) -> Self {
        self.meta.flags |= FieldFlags::TRANSIENT | FieldFlags::NOT_SERIALIZED;
        self
    }

    pub fn read_only(mut self) -> Self {
        self.meta.flags |= FieldFlags::READ_ONLY;
        self
    }

    /// Attaches a typed custom tag. See [`CustomAttributes`].
    pub fn with_attribute<T: Any + Send + Sync>(mut self, value: T) -> Self {
        self.meta.attributes = self.meta.attributes.with_attribute(value);
        self
    }
}

impl<F: Numeric> MetaBuilder<F> {
    /// Bounds the value and edits it with a continuous slider.
    pub fn range(self, min: F, max: F) -> Self {
        self.manipulate(min, max, None, Manipulator::Slider)
    }

    pub fn slider(self, min: F, max: F, step: F) -> Self {
        self.manipulate(min, max, Some(step), Manipulator::Slider)
    }

    pub fn drag(self, min: F, max: F, step: F) -> Self {
        self.manipulate(min, max, Some(step), Manipulator::Drag)
    }

    pub fn input(self, min: F, max: F, step: F) -> Self {
        self.manipulate(min, max, Some(step), Manipulator::Input)
    }

    fn manipulate(mut self, min: F, max: F, step: Option<F>, manipulator: Manipulator) -> Self {
        self.meta.range = Some(NumericRange {
            min: min.to_f64(),
            max: max.to_f64(),
            step: step.map(Numeric::to_f64),
            manipulator,
        });
        self
    }
}

impl<F: ColorLike> MetaBuilder<F> {
    pub fn color(mut self) -> Self {
        self.meta.color = true;
        self
    }
}

impl<F: ?Sized> From<MetaBuilder<F>> for PropertyMeta {
    #[inline]
    fn from(builder: MetaBuilder<F>) -> Self {
        builder.meta
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transient_is_not_serialized() {
        let meta = MetaBuilder::<u32>::new().transient().build();
        assert!(meta.is_transient());
        assert!(!meta.is_serialized());
        assert!(meta.flags().contains(FieldFlags::NOT_SERIALIZED));

        let plain = MetaBuilder::<u32>::new().read_only().build();
        assert!(plain.is_serialized());
        assert!(plain.is_read_only());
    }

    #[test]
    fn integer_range_widens_to_f64() {
        let meta = MetaBuilder::<u8>::new().drag(0, 200, 5).build();
        let range = meta.range().unwrap();
        assert_eq!(range.min, 0.0);
        assert_eq!(range.max, 200.0);
        assert_eq!(range.step, Some(5.0));
        assert_eq!(range.manipulator, Manipulator::Drag);
        assert_eq!(range.clamp(300.0), 200.0);
        assert!(!range.contains(-1.0));
    }

    #[test]
    fn color_and_labels() {
        let meta = MetaBuilder::<[f32; 3]>::new()
            .color()
            .category("Surface")
            .display_name("Albedo")
            .build();
        assert!(meta.is_color());
        assert_eq!(meta.category(), Some("Surface"));
        assert_eq!(meta.display_name(), Some("Albedo"));
        assert!(meta.tooltip().is_none());
    }

    #[test]
    fn custom_attributes_replace_by_type() {
        #[derive(Debug, PartialEq)]
        struct Hint(u32);

        let meta = MetaBuilder::<String>::new()
            .with_attribute(Hint(1))
            .with_attribute(Hint(2))
            .build();
        assert_eq!(meta.attributes().len(), 1);
        assert_eq!(meta.get_attribute::<Hint>(), Some(&Hint(2)));
    }
}
