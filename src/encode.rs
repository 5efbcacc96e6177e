//! The encoder: writes a [`Value`] as its shortest valid marker sequence, with an
//! optional auto-tabular rewrite pass.

use crate::error::{Error, Result};
use crate::integer::IntPriv;
use crate::marker::Marker;
use crate::value::Value;

/// Options controlling an [`encode`] call.
#[derive(Clone, Copy, Debug)]
pub struct EncodeOptions {
    /// Rewrite uniform arrays-of-maps into the columnar tabular extension. Default on.
    pub auto_tabular: bool,
}

impl Default for EncodeOptions {
    fn default() -> Self {
        Self { auto_tabular: true }
    }
}

/// Encode `value` to a fresh byte buffer.
pub fn encode(value: &Value, options: &EncodeOptions) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    encode_value(value, &mut buf, options)?;
    Ok(buf)
}

pub(crate) fn encode_value(value: &Value, buf: &mut Vec<u8>, options: &EncodeOptions) -> Result<()> {
    match value {
        Value::Nil => buf.push(Marker::Nil.into_u8()),
        Value::Bool(false) => buf.push(Marker::False.into_u8()),
        Value::Bool(true) => buf.push(Marker::True.into_u8()),
        Value::Int(n) | Value::Uint(n) => match n.priv_repr() {
            IntPriv::PosInt(v) => encode_uint_value(v, buf),
            IntPriv::NegInt(v) => encode_neg_int(v, buf),
        },
        Value::Float(v) => {
            buf.push(Marker::F64.into_u8());
            buf.extend_from_slice(&v.to_be_bytes());
        }
        Value::String(s) => encode_str_value(s.as_bytes(), buf)?,
        Value::Binary(bytes) => encode_bin_value(bytes, buf)?,
        Value::Array(items) => {
            if options.auto_tabular && crate::tabular::is_tabular(items) {
                let payload = crate::tabular::to_tabular(items, options)?;
                encode_ext_value(crate::marker::ExtType::Tabular.into_i8(), &payload, buf)?;
            } else {
                encode_array_header(items.len(), buf)?;
                for item in items {
                    encode_value(item, buf, options)?;
                }
            }
        }
        Value::Map(pairs) => {
            encode_map_header(pairs.len(), buf)?;
            for (key, val) in pairs {
                encode_str_value(key.as_bytes(), buf)?;
                encode_value(val, buf, options)?;
            }
        }
        Value::Extension(ty, data) => encode_ext_value(*ty, data, buf)?,
        Value::Date(ms) => {
            encode_ext_value(crate::marker::ExtType::Date.into_i8(), &ms.to_be_bytes(), buf)?
        }
        Value::BigInt(bytes) => {
            if bytes.is_empty() {
                return Err(Error::EncodeOverflow(
                    "bigint payload must not be empty".into(),
                ));
            }
            encode_ext_value(crate::marker::ExtType::BigInt.into_i8(), bytes, buf)?
        }
    }
    Ok(())
}

pub(crate) fn encode_uint_value(v: u64, buf: &mut Vec<u8>) {
    if v <= 0x7f {
        buf.push(v as u8);
    } else if v <= u8::MAX as u64 {
        buf.push(Marker::UInt8.into_u8());
        buf.push(v as u8);
    } else if v <= u16::MAX as u64 {
        buf.push(Marker::UInt16.into_u8());
        buf.extend_from_slice(&(v as u16).to_be_bytes());
    } else if v <= u32::MAX as u64 {
        buf.push(Marker::UInt32.into_u8());
        buf.extend_from_slice(&(v as u32).to_be_bytes());
    } else {
        buf.push(Marker::UInt64.into_u8());
        buf.extend_from_slice(&v.to_be_bytes());
    }
}

fn encode_neg_int(v: i64, buf: &mut Vec<u8>) {
    if v >= 0 {
        encode_uint_value(v as u64, buf);
    } else if v >= -32 {
        buf.push(v as i8 as u8);
    } else if v >= i8::MIN as i64 {
        buf.push(Marker::Int8.into_u8());
        buf.push(v as i8 as u8);
    } else if v >= i16::MIN as i64 {
        buf.push(Marker::Int16.into_u8());
        buf.extend_from_slice(&(v as i16).to_be_bytes());
    } else if v >= i32::MIN as i64 {
        buf.push(Marker::Int32.into_u8());
        buf.extend_from_slice(&(v as i32).to_be_bytes());
    } else {
        buf.push(Marker::Int64.into_u8());
        buf.extend_from_slice(&v.to_be_bytes());
    }
}

pub(crate) fn encode_str_value(bytes: &[u8], buf: &mut Vec<u8>) -> Result<()> {
    let len = bytes.len();
    if len <= 31 {
        buf.push(Marker::FixStr(len as u8).into_u8());
    } else if len <= u8::MAX as usize {
        buf.push(Marker::Str8.into_u8());
        buf.push(len as u8);
    } else if len <= u16::MAX as usize {
        buf.push(Marker::Str16.into_u8());
        buf.extend_from_slice(&(len as u16).to_be_bytes());
    } else if len <= u32::MAX as usize {
        buf.push(Marker::Str32.into_u8());
        buf.extend_from_slice(&(len as u32).to_be_bytes());
    } else {
        return Err(Error::EncodeOverflow(format!(
            "string of {} bytes exceeds the 2^32-1 byte limit",
            len
        )));
    }
    buf.extend_from_slice(bytes);
    Ok(())
}

fn encode_bin_value(bytes: &[u8], buf: &mut Vec<u8>) -> Result<()> {
    let len = bytes.len();
    if len <= u8::MAX as usize {
        buf.push(Marker::Bin8.into_u8());
        buf.push(len as u8);
    } else if len <= u16::MAX as usize {
        buf.push(Marker::Bin16.into_u8());
        buf.extend_from_slice(&(len as u16).to_be_bytes());
    } else if len <= u32::MAX as usize {
        buf.push(Marker::Bin32.into_u8());
        buf.extend_from_slice(&(len as u32).to_be_bytes());
    } else {
        return Err(Error::EncodeOverflow(format!(
            "binary payload of {} bytes exceeds the 2^32-1 byte limit",
            len
        )));
    }
    buf.extend_from_slice(bytes);
    Ok(())
}

pub(crate) fn encode_array_header(len: usize, buf: &mut Vec<u8>) -> Result<()> {
    if len <= 15 {
        buf.push(Marker::FixArray(len as u8).into_u8());
    } else if len <= u16::MAX as usize {
        buf.push(Marker::Array16.into_u8());
        buf.extend_from_slice(&(len as u16).to_be_bytes());
    } else if len <= u32::MAX as usize {
        buf.push(Marker::Array32.into_u8());
        buf.extend_from_slice(&(len as u32).to_be_bytes());
    } else {
        return Err(Error::EncodeOverflow(format!(
            "array of {} elements exceeds the 2^32-1 element limit",
            len
        )));
    }
    Ok(())
}

fn encode_map_header(len: usize, buf: &mut Vec<u8>) -> Result<()> {
    if len <= 15 {
        buf.push(Marker::FixMap(len as u8).into_u8());
    } else if len <= u16::MAX as usize {
        buf.push(Marker::Map16.into_u8());
        buf.extend_from_slice(&(len as u16).to_be_bytes());
    } else if len <= u32::MAX as usize {
        buf.push(Marker::Map32.into_u8());
        buf.extend_from_slice(&(len as u32).to_be_bytes());
    } else {
        return Err(Error::EncodeOverflow(format!(
            "map of {} entries exceeds the 2^32-1 entry limit",
            len
        )));
    }
    Ok(())
}

pub(crate) fn encode_ext_value(ty: i8, data: &[u8], buf: &mut Vec<u8>) -> Result<()> {
    let len = data.len();
    let fixext = match len {
        1 => Some(Marker::FixExt1),
        2 => Some(Marker::FixExt2),
        4 => Some(Marker::FixExt4),
        8 => Some(Marker::FixExt8),
        16 => Some(Marker::FixExt16),
        _ => None,
    };
    if let Some(marker) = fixext {
        buf.push(marker.into_u8());
    } else if len <= u8::MAX as usize {
        buf.push(Marker::Ext8.into_u8());
        buf.push(len as u8);
    } else if len <= u16::MAX as usize {
        buf.push(Marker::Ext16.into_u8());
        buf.extend_from_slice(&(len as u16).to_be_bytes());
    } else if len <= u32::MAX as usize {
        buf.push(Marker::Ext32.into_u8());
        buf.extend_from_slice(&(len as u32).to_be_bytes());
    } else {
        return Err(Error::EncodeOverflow(format!(
            "extension payload of {} bytes exceeds the 2^32-1 byte limit",
            len
        )));
    }
    buf.push(ty as u8);
    buf.extend_from_slice(data);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nil_encodes_to_single_byte() {
        let buf = encode(&Value::Nil, &EncodeOptions::default()).unwrap();
        assert_eq!(buf, vec![0xc0]);
    }

    #[test]
    fn small_ints_use_fixint_forms() {
        assert_eq!(
            encode(&Value::from(-1i32), &EncodeOptions::default()).unwrap(),
            vec![0xff]
        );
        assert_eq!(
            encode(&Value::from(127i32), &EncodeOptions::default()).unwrap(),
            vec![0x7f]
        );
        assert_eq!(
            encode(&Value::from(128i32), &EncodeOptions::default()).unwrap(),
            vec![0xcc, 0x80]
        );
    }

    #[test]
    fn map_matches_the_spec_example() {
        let v = Value::Map(vec![
            ("a".into(), Value::from(1u32)),
            ("b".into(), Value::Bool(true)),
        ]);
        let buf = encode(&v, &EncodeOptions::default()).unwrap();
        assert_eq!(buf, vec![0x82, 0xa1, b'a', 0x01, 0xa1, b'b', 0xc3]);
    }

    #[test]
    fn array_header_crosses_from_fixarray_to_array16() {
        let small = Value::Array(vec![Value::Nil; 15]);
        let buf = encode(&small, &EncodeOptions::default()).unwrap();
        assert_eq!(buf[0], 0x9f);

        let big = Value::Array(vec![Value::Nil; 16]);
        let buf = encode(&big, &EncodeOptions::default()).unwrap();
        assert_eq!(buf[0], Marker::Array16.into_u8());
    }
}
