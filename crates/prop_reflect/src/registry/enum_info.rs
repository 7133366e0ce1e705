use alloc::borrow::Cow;
use alloc::boxed::Box;
use core::any::Any;
use core::fmt;

use serde_json::Value;

use crate::{Reflect, TypeIdent};

/// One variant of a reflected unit enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnumVariant {
    pub name: &'static str,
    pub value: i64,
}

/// A fieldless enum whose variants are known by name and integer value.
///
/// Derived for unit-only enums:
///
/// ```
/// use prop_reflect::Reflect;
/// use prop_reflect::registry::ReflectEnum;
///
/// #[derive(Reflect, Clone, Copy, PartialEq, Debug)]
/// enum Blend {
///     Opaque,
///     Additive = 4,
///     Multiply,
/// }
///
/// assert_eq!(Blend::VARIANTS[1].name, "Additive");
/// assert_eq!(Blend::Multiply.to_value(), 5);
/// assert_eq!(Blend::from_value(4), Some(Blend::Additive));
/// assert_eq!(Blend::from_value(1), None);
/// ```
pub trait ReflectEnum: Reflect {
    /// Every variant, in declaration order.
    const VARIANTS: &'static [EnumVariant];

    fn to_value(&self) -> i64;

    fn from_value(value: i64) -> Option<Self>;
}

/// The registered description of a [`ReflectEnum`].
pub struct EnumDescriptor {
    type_ident: TypeIdent,
    name: Cow<'static, str>,
    variants: &'static [EnumVariant],
    to_value: fn(&dyn Any) -> Option<i64>,
    from_value: fn(i64) -> Option<Box<dyn Any>>,
    assign: fn(&mut dyn Any, i64) -> bool,
}

fn to_value_as<T: ReflectEnum>(value: &dyn Any) -> Option<i64> {
    value.downcast_ref::<T>().map(T::to_value)
}

fn from_value_as<T: ReflectEnum>(value: i64) -> Option<Box<dyn Any>> {
    T::from_value(value).map(|variant| Box::new(variant) as Box<dyn Any>)
}

fn assign_as<T: ReflectEnum>(target: &mut dyn Any, value: i64) -> bool {
    match (target.downcast_mut::<T>(), T::from_value(value)) {
        (Some(target), Some(variant)) => {
            *target = variant;
            true
        }
        _ => false,
    }
}

impl EnumDescriptor {
    pub fn of<T: ReflectEnum>() -> Self {
        Self {
            type_ident: TypeIdent::of::<T>(),
            name: T::type_name(),
            variants: T::VARIANTS,
            to_value: to_value_as::<T>,
            from_value: from_value_as::<T>,
            assign: assign_as::<T>,
        }
    }

    #[inline]
    pub fn type_ident(&self) -> TypeIdent {
        self.type_ident
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn variants(&self) -> &'static [EnumVariant] {
        self.variants
    }

    pub fn by_name(&self, name: &str) -> Option<&'static EnumVariant> {
        self.variants.iter().find(|variant| variant.name == name)
    }

    pub fn by_value(&self, value: i64) -> Option<&'static EnumVariant> {
        self.variants.iter().find(|variant| variant.value == value)
    }

    /// The variant currently held by `instance`.
    pub fn variant_of(&self, instance: &dyn Any) -> Option<&'static EnumVariant> {
        self.by_value((self.to_value)(instance)?)
    }

    /// A new boxed enum holding the variant with `value`.
    #[inline]
    pub fn create(&self, value: i64) -> Option<Box<dyn Any>> {
        (self.from_value)(value)
    }

    /// The first declared variant, standing in for a default.
    pub fn create_default(&self) -> Option<Box<dyn Any>> {
        self.create(self.variants.first()?.value)
    }

    /// Overwrites `target` with the variant of `value`.
    #[inline]
    pub fn set(&self, target: &mut dyn Any, value: i64) -> bool {
        (self.assign)(target, value)
    }

    /// The tree form: the variant name.
    pub fn encode(&self, instance: &dyn Any) -> Option<Value> {
        self.variant_of(instance)
            .map(|variant| Value::String(variant.name.into()))
    }

    /// Reads a variant from its name or its integer value.
    pub fn decode_value(&self, tree: &Value) -> Option<i64> {
        let variant = match tree {
            Value::String(name) => self.by_name(name),
            Value::Number(number) => self.by_value(number.as_i64()?),
            _ => None,
        };
        variant.map(|variant| variant.value)
    }

    /// Decodes `tree` into `target`, leaving it untouched on failure.
    pub fn decode_into(&self, target: &mut dyn Any, tree: &Value) -> bool {
        self.decode_value(tree)
            .is_some_and(|value| self.set(target, value))
    }
}

impl fmt::Debug for EnumDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EnumDescriptor")
            .field("name", &self.name)
            .field("variants", &self.variants)
            .finish()
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::{EnumDescriptor, ReflectEnum};
    use crate::Reflect;
    use serde_json::json;

    #[derive(Reflect, Clone, Copy, PartialEq, Debug)]
    enum Filter {
        Nearest,
        Linear,
        Cubic = 10,
    }

    #[test]
    fn variants_follow_discriminants() {
        let values: Vec<i64> = Filter::VARIANTS.iter().map(|v| v.value).collect();
        assert_eq!(values, [0, 1, 10]);
        assert_eq!(<Filter as Reflect>::type_name(), "Filter");
    }

    #[test]
    fn encode_by_name() {
        let info = EnumDescriptor::of::<Filter>();
        assert_eq!(info.encode(&Filter::Cubic), Some(json!("Cubic")));
        assert_eq!(info.encode(&3_i32), None);
    }

    #[test]
    fn decode_name_or_value() {
        let info = EnumDescriptor::of::<Filter>();
        let mut filter = Filter::Nearest;

        assert!(info.decode_into(&mut filter, &json!("Linear")));
        assert_eq!(filter, Filter::Linear);

        assert!(info.decode_into(&mut filter, &json!(10)));
        assert_eq!(filter, Filter::Cubic);

        assert!(!info.decode_into(&mut filter, &json!("Bicubic")));
        assert!(!info.decode_into(&mut filter, &json!(2)));
        assert_eq!(filter, Filter::Cubic);
    }

    #[test]
    fn default_is_first_variant() {
        let info = EnumDescriptor::of::<Filter>();
        let value = info.create_default().unwrap();
        assert_eq!(*value.downcast::<Filter>().unwrap(), Filter::Nearest);
    }
}
