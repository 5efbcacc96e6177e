//! A zero-copy view over a decoded buffer, mirroring [`crate::Value`] but borrowing strings and
//! binary payloads from the input instead of owning them. Produced by [`crate::decode_ref`].

use crate::integer::Integer;
use crate::value::Value;

/// A borrowing BTOON value. See [`Value`] for field semantics; this is the zero-copy sibling
/// produced by [`crate::decode_ref`].
#[derive(Clone, Debug, PartialEq)]
pub enum ValueRef<'a> {
    Nil,
    Bool(bool),
    Int(Integer),
    Uint(Integer),
    Float(f64),
    String(&'a str),
    Binary(&'a [u8]),
    Array(Vec<ValueRef<'a>>),
    Map(Vec<(&'a str, ValueRef<'a>)>),
    Extension(i8, &'a [u8]),
    Date(i64),
    BigInt(&'a [u8]),
}

impl<'a> ValueRef<'a> {
    /// Clone into an owned [`Value`], copying borrowed strings and byte slices.
    pub fn to_owned(&self) -> Value {
        match self {
            ValueRef::Nil => Value::Nil,
            ValueRef::Bool(v) => Value::Bool(*v),
            ValueRef::Int(v) => Value::Int(*v),
            ValueRef::Uint(v) => Value::Uint(*v),
            ValueRef::Float(v) => Value::Float(*v),
            ValueRef::String(v) => Value::String((*v).to_owned()),
            ValueRef::Binary(v) => Value::Binary(v.to_vec()),
            ValueRef::Array(v) => Value::Array(v.iter().map(ValueRef::to_owned).collect()),
            ValueRef::Map(v) => Value::Map(
                v.iter()
                    .map(|(k, val)| ((*k).to_owned(), val.to_owned()))
                    .collect(),
            ),
            ValueRef::Extension(ty, data) => Value::Extension(*ty, data.to_vec()),
            ValueRef::Date(v) => Value::Date(*v),
            ValueRef::BigInt(v) => Value::BigInt(v.to_vec()),
        }
    }
}

impl Value {
    /// Borrow this owned value as a [`ValueRef`], without copying strings or binary payloads.
    pub fn as_ref(&self) -> ValueRef<'_> {
        match self {
            Value::Nil => ValueRef::Nil,
            Value::Bool(v) => ValueRef::Bool(*v),
            Value::Int(v) => ValueRef::Int(*v),
            Value::Uint(v) => ValueRef::Uint(*v),
            Value::Float(v) => ValueRef::Float(*v),
            Value::String(v) => ValueRef::String(v.as_str()),
            Value::Binary(v) => ValueRef::Binary(v.as_slice()),
            Value::Array(v) => ValueRef::Array(v.iter().map(Value::as_ref).collect()),
            Value::Map(v) => {
                ValueRef::Map(v.iter().map(|(k, val)| (k.as_str(), val.as_ref())).collect())
            }
            Value::Extension(ty, data) => ValueRef::Extension(*ty, data.as_slice()),
            Value::Date(v) => ValueRef::Date(*v),
            Value::BigInt(v) => ValueRef::BigInt(v.as_slice()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_owned() {
        let v = Value::Map(vec![
            ("a".into(), Value::from(1u32)),
            ("b".into(), Value::Array(vec![Value::Nil, Value::from(true)])),
        ]);
        let r = v.as_ref();
        assert_eq!(r.to_owned(), v);
    }
}
