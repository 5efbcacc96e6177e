//! The owned BTOON value tree.

use serde::Serialize;

use crate::integer::Integer;

/// An owned BTOON value.
///
/// `Map` keeps its entries in insertion order rather than a `BTreeMap`/`HashMap`: order must be
/// preserved on decode, and the tabular codec reconstructs rows with keys in column-header order.
/// Lookups are linear; callers that want faster lookup on a large map should build their own
/// index from `Value::Map`'s pairs.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    /// The absent value (`nil`).
    Nil,
    Bool(bool),
    Int(Integer),
    Uint(Integer),
    Float(f64),
    String(String),
    Binary(Vec<u8>),
    Array(Vec<Value>),
    /// Ordered key/value pairs. Keys are always strings in this core.
    Map(Vec<(String, Value)>),
    /// An extension type this core does not interpret, passed through as-is.
    Extension(i8, Vec<u8>),
    /// Milliseconds since the Unix epoch.
    Date(i64),
    /// Two's-complement big-endian arbitrary-precision integer.
    BigInt(Vec<u8>),
}

impl Value {
    pub fn is_nil(&self) -> bool {
        matches!(self, Value::Nil)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(v) | Value::Uint(v) => v.as_i64(),
            _ => None,
        }
    }

    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Value::Int(v) | Value::Uint(v) => v.as_u64(),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(v) => Some(*v),
            Value::Int(v) | Value::Uint(v) => Some(v.as_f64()),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(v) => Some(v.as_str()),
            _ => None,
        }
    }

    pub fn as_slice(&self) -> Option<&[u8]> {
        match self {
            Value::Binary(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&[(String, Value)]> {
        match self {
            Value::Map(v) => Some(v),
            _ => None,
        }
    }

    /// Look up a key in a `Map` value by linear scan. Returns the *last* matching entry, since
    /// the format does not require key uniqueness; last-wins is the chosen resolution.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.as_map()?
            .iter()
            .rev()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_owned())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Value::Binary(v)
    }
}

macro_rules! impl_from_unsigned {
    ($t:ty) => {
        impl From<$t> for Value {
            fn from(v: $t) -> Self {
                Value::Uint(Integer::from(v))
            }
        }
    };
}

macro_rules! impl_from_signed {
    ($t:ty) => {
        impl From<$t> for Value {
            fn from(v: $t) -> Self {
                if v < 0 {
                    Value::Int(Integer::from(v))
                } else {
                    Value::Uint(Integer::from(v))
                }
            }
        }
    };
}

impl_from_unsigned!(u8);
impl_from_unsigned!(u16);
impl_from_unsigned!(u32);
impl_from_unsigned!(u64);
impl_from_signed!(i8);
impl_from_signed!(i16);
impl_from_signed!(i32);
impl_from_signed!(i64);

impl serde::Serialize for Value {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::{SerializeMap, SerializeTuple};

        match self {
            Value::Nil => serializer.serialize_none(),
            Value::Bool(v) => serializer.serialize_bool(*v),
            Value::Int(n) | Value::Uint(n) => n.serialize(serializer),
            Value::Float(v) => serializer.serialize_f64(*v),
            Value::String(v) => serializer.serialize_str(v),
            Value::Binary(v) => serde_bytes::Bytes::new(v).serialize(serializer),
            Value::Array(items) => items.serialize(serializer),
            Value::Map(pairs) => {
                let mut map = serializer.serialize_map(Some(pairs.len()))?;
                for (k, v) in pairs {
                    map.serialize_entry(k, v)?;
                }
                map.end()
            }
            Value::Extension(ty, data) => {
                let mut tup = serializer.serialize_tuple(2)?;
                tup.serialize_element(ty)?;
                tup.serialize_element(&serde_bytes::Bytes::new(data))?;
                tup.end()
            }
            Value::Date(ms) => serializer.serialize_i64(*ms),
            Value::BigInt(data) => serde_bytes::Bytes::new(data).serialize(serializer),
        }
    }
}

impl<'de> serde::Deserialize<'de> for Value {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        struct ValueVisitor;

        impl<'de> serde::de::Visitor<'de> for ValueVisitor {
            type Value = Value;

            fn expecting(&self, fmt: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(fmt, "any BTOON value")
            }

            fn visit_unit<E>(self) -> Result<Value, E> {
                Ok(Value::Nil)
            }

            fn visit_bool<E>(self, v: bool) -> Result<Value, E> {
                Ok(Value::Bool(v))
            }

            fn visit_i64<E>(self, v: i64) -> Result<Value, E> {
                Ok(Value::from(v))
            }

            fn visit_u64<E>(self, v: u64) -> Result<Value, E> {
                Ok(Value::from(v))
            }

            fn visit_f64<E>(self, v: f64) -> Result<Value, E> {
                Ok(Value::Float(v))
            }

            fn visit_str<E>(self, v: &str) -> Result<Value, E> {
                Ok(Value::String(v.to_owned()))
            }

            fn visit_string<E>(self, v: String) -> Result<Value, E> {
                Ok(Value::String(v))
            }

            fn visit_bytes<E>(self, v: &[u8]) -> Result<Value, E> {
                Ok(Value::Binary(v.to_vec()))
            }

            fn visit_byte_buf<E>(self, v: Vec<u8>) -> Result<Value, E> {
                Ok(Value::Binary(v))
            }

            fn visit_seq<A>(self, mut seq: A) -> Result<Value, A::Error>
            where
                A: serde::de::SeqAccess<'de>,
            {
                let mut items = Vec::new();
                while let Some(item) = seq.next_element()? {
                    items.push(item);
                }
                Ok(Value::Array(items))
            }

            fn visit_map<A>(self, mut access: A) -> Result<Value, A::Error>
            where
                A: serde::de::MapAccess<'de>,
            {
                let mut pairs = Vec::new();
                while let Some((k, v)) = access.next_entry::<String, Value>()? {
                    pairs.push((k, v));
                }
                Ok(Value::Map(pairs))
            }
        }

        deserializer.deserialize_any(ValueVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn map_get_is_last_wins() {
        let v = Value::Map(vec![
            ("a".into(), Value::from(1u32)),
            ("a".into(), Value::from(2u32)),
        ]);
        assert_eq!(v.get("a").and_then(Value::as_u64), Some(2));
        assert_eq!(v.get("missing"), None);
    }

    #[test]
    fn signed_from_splits_on_sign() {
        assert!(matches!(Value::from(-1i32), Value::Int(_)));
        assert!(matches!(Value::from(1i32), Value::Uint(_)));
    }
}
