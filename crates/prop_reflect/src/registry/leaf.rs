use alloc::borrow::Cow;
use alloc::boxed::Box;
use alloc::string::{String, ToString};
use core::any::{Any, TypeId};
use core::fmt;

use serde_core::Serialize;
use serde_core::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

use crate::{Reflect, TypeIdent};

// -----------------------------------------------------------------------------
// LeafKind

/// Coarse classification of a leaf, for consumers that draw or format
/// primitives without knowing their Rust type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LeafKind {
    Bool,
    Int,
    UInt,
    Float,
    Char,
    String,
    /// Any other serde-capable type registered as a leaf.
    Other,
}

impl LeafKind {
    fn of<T: Any>() -> Self {
        let id = TypeId::of::<T>();
        let any_of = |ids: &[TypeId]| ids.contains(&id);

        if id == TypeId::of::<bool>() {
            Self::Bool
        } else if any_of(&[
            TypeId::of::<i8>(),
            TypeId::of::<i16>(),
            TypeId::of::<i32>(),
            TypeId::of::<i64>(),
            TypeId::of::<isize>(),
        ]) {
            Self::Int
        } else if any_of(&[
            TypeId::of::<u8>(),
            TypeId::of::<u16>(),
            TypeId::of::<u32>(),
            TypeId::of::<u64>(),
            TypeId::of::<usize>(),
        ]) {
            Self::UInt
        } else if any_of(&[TypeId::of::<f32>(), TypeId::of::<f64>()]) {
            Self::Float
        } else if id == TypeId::of::<char>() {
            Self::Char
        } else if id == TypeId::of::<String>() {
            Self::String
        } else {
            Self::Other
        }
    }

    /// `true` for kinds whose text form is the bare string, not JSON.
    #[inline]
    pub fn is_textual(self) -> bool {
        matches!(self, Self::Char | Self::String)
    }
}

// -----------------------------------------------------------------------------
// LeafError

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LeafError {
    #[error("value is not a `{expected}`")]
    TypeMismatch { expected: String },
    #[error("cannot encode `{ty}`: {message}")]
    Encode { ty: String, message: String },
    #[error("cannot decode `{ty}`: {message}")]
    Decode { ty: String, message: String },
}

// -----------------------------------------------------------------------------
// LeafCodec

type SerializeFn = fn(&dyn Any) -> Option<&dyn erased_serde::Serialize>;
type DeserializeFn =
    fn(&mut dyn erased_serde::Deserializer<'_>) -> Result<Box<dyn Any>, erased_serde::Error>;

/// Encoding support for one leaf type.
///
/// Leaves terminate recursion: they are written and read whole, through
/// their own `serde` implementation, instead of field by field.
///
/// Internally stores monomorphized function pointers; the codec itself
/// is untyped, so any value handed in is checked against the leaf type
/// first.
///
/// # Examples
///
/// ```
/// use prop_reflect::registry::LeafCodec;
/// use serde_json::json;
///
/// let codec = LeafCodec::of::<u16>();
/// assert_eq!(codec.encode(&7_u16).unwrap(), json!(7));
/// assert!(codec.encode(&7_u32).is_err());
///
/// let mut value = 0_u16;
/// codec.decode_into(&mut value, &json!(12)).unwrap();
/// assert_eq!(value, 12);
///
/// assert_eq!(codec.encode_key(&7_u16).unwrap(), "7");
/// let key = codec.decode_key("7").unwrap();
/// assert_eq!(*key.downcast::<u16>().unwrap(), 7);
/// ```
pub struct LeafCodec {
    type_ident: TypeIdent,
    name: Cow<'static, str>,
    kind: LeafKind,
    serialize: SerializeFn,
    deserialize: DeserializeFn,
    assign: fn(&mut dyn Any, Box<dyn Any>) -> bool,
    default: fn() -> Box<dyn Any>,
}

fn serialize_as<T: Serialize + Any>(value: &dyn Any) -> Option<&dyn erased_serde::Serialize> {
    value
        .downcast_ref::<T>()
        .map(|value| value as &dyn erased_serde::Serialize)
}

fn deserialize_as<T: DeserializeOwned + Any>(
    deserializer: &mut dyn erased_serde::Deserializer<'_>,
) -> Result<Box<dyn Any>, erased_serde::Error> {
    Ok(Box::new(erased_serde::deserialize::<T>(deserializer)?))
}

fn assign_as<T: Any>(target: &mut dyn Any, value: Box<dyn Any>) -> bool {
    match (target.downcast_mut::<T>(), value.downcast::<T>()) {
        (Some(target), Ok(value)) => {
            *target = *value;
            true
        }
        _ => false,
    }
}

fn default_as<T: Default + Any>() -> Box<dyn Any> {
    Box::new(T::default())
}

impl LeafCodec {
    pub fn of<T>() -> Self
    where
        T: Reflect + Serialize + DeserializeOwned + Default,
    {
        Self {
            type_ident: TypeIdent::of::<T>(),
            name: T::type_name(),
            kind: LeafKind::of::<T>(),
            serialize: serialize_as::<T>,
            deserialize: deserialize_as::<T>,
            assign: assign_as::<T>,
            default: default_as::<T>,
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
    pub fn kind(&self) -> LeafKind {
        self.kind
    }

    fn mismatch(&self) -> LeafError {
        LeafError::TypeMismatch {
            expected: self.name.to_string(),
        }
    }

    /// `value` as an erased serde value, for formats other than JSON.
    #[inline]
    pub fn as_serialize<'a>(&self, value: &'a dyn Any) -> Option<&'a dyn erased_serde::Serialize> {
        (self.serialize)(value)
    }

    /// Reads a value from any erased deserializer.
    pub fn deserialize(
        &self,
        deserializer: &mut dyn erased_serde::Deserializer<'_>,
    ) -> Result<Box<dyn Any>, LeafError> {
        (self.deserialize)(deserializer).map_err(|err| LeafError::Decode {
            ty: self.name.to_string(),
            message: err.to_string(),
        })
    }

    pub fn encode(&self, value: &dyn Any) -> Result<Value, LeafError> {
        let serialize = (self.serialize)(value).ok_or_else(|| self.mismatch())?;
        serde_json::to_value(serialize).map_err(|err| LeafError::Encode {
            ty: self.name.to_string(),
            message: err.to_string(),
        })
    }

    pub fn decode(&self, tree: &Value) -> Result<Box<dyn Any>, LeafError> {
        let mut erased = <dyn erased_serde::Deserializer>::erase(tree);
        self.deserialize(&mut erased)
    }

    /// Decodes `tree` and overwrites `target` with the result.
    ///
    /// `target` is left untouched on failure.
    pub fn decode_into(&self, target: &mut dyn Any, tree: &Value) -> Result<(), LeafError> {
        let value = self.decode(tree)?;
        if (self.assign)(target, value) {
            Ok(())
        } else {
            Err(self.mismatch())
        }
    }

    /// The object-key form of `value`: strings verbatim, anything else as JSON text.
    pub fn encode_key(&self, value: &dyn Any) -> Result<String, LeafError> {
        match self.encode(value)? {
            Value::String(text) => Ok(text),
            other => Ok(other.to_string()),
        }
    }

    /// Inverse of [`encode_key`](Self::encode_key).
    ///
    /// Non-textual keys are parsed as JSON first; a key that does not parse
    /// is tried as a plain string.
    pub fn decode_key(&self, key: &str) -> Result<Box<dyn Any>, LeafError> {
        if !self.kind.is_textual()
            && let Ok(parsed) = serde_json::from_str::<Value>(key)
            && let Ok(value) = self.decode(&parsed)
        {
            return Ok(value);
        }
        self.decode(&Value::String(key.into()))
    }

    #[inline]
    pub fn create_default(&self) -> Box<dyn Any> {
        (self.default)()
    }
}

impl fmt::Debug for LeafCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LeafCodec")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .finish()
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::{LeafCodec, LeafError, LeafKind};
    use serde_json::json;

    #[test]
    fn kinds() {
        assert_eq!(LeafCodec::of::<bool>().kind(), LeafKind::Bool);
        assert_eq!(LeafCodec::of::<i16>().kind(), LeafKind::Int);
        assert_eq!(LeafCodec::of::<usize>().kind(), LeafKind::UInt);
        assert_eq!(LeafCodec::of::<f64>().kind(), LeafKind::Float);
        assert_eq!(LeafCodec::of::<char>().kind(), LeafKind::Char);
        assert_eq!(LeafCodec::of::<String>().kind(), LeafKind::String);
    }

    #[test]
    fn decode_rejects_wrong_json() {
        let codec = LeafCodec::of::<i32>();
        let err = codec.decode(&json!("seven")).unwrap_err();
        assert!(matches!(err, LeafError::Decode { .. }));

        let mut value = 3_i32;
        assert!(codec.decode_into(&mut value, &json!(true)).is_err());
        assert_eq!(value, 3);
    }

    #[test]
    fn decode_into_wrong_target() {
        let codec = LeafCodec::of::<i32>();
        let mut target = 0_u8;
        let err = codec.decode_into(&mut target, &json!(1)).unwrap_err();
        assert!(matches!(err, LeafError::TypeMismatch { .. }));
    }

    #[test]
    fn string_keys_stay_verbatim() {
        let codec = LeafCodec::of::<String>();
        assert_eq!(codec.encode_key(&String::from("12")).unwrap(), "12");

        let key = codec.decode_key("12").unwrap();
        assert_eq!(*key.downcast::<String>().unwrap(), "12");
    }

    #[test]
    fn bool_keys_round_trip() {
        let codec = LeafCodec::of::<bool>();
        assert_eq!(codec.encode_key(&true).unwrap(), "true");
        let key = codec.decode_key("true").unwrap();
        assert!(*key.downcast::<bool>().unwrap());
    }

    #[test]
    fn ron_through_erased_deserializer() {
        let codec = LeafCodec::of::<f32>();
        let mut ron = ron::Deserializer::from_str("2.5").unwrap();
        let mut erased = <dyn erased_serde::Deserializer>::erase(&mut ron);
        let value = codec.deserialize(&mut erased).unwrap();
        assert_eq!(*value.downcast::<f32>().unwrap(), 2.5);
    }

    #[test]
    fn create_default() {
        let value = LeafCodec::of::<String>().create_default();
        assert_eq!(*value.downcast::<String>().unwrap(), "");
    }
}
