//! The recursive-descent decoder: owned [`Value`] and borrowing [`ValueRef`] entry
//! points over the same marker dispatch.

use byteorder::{BigEndian, ByteOrder};

use crate::bounds::BoundsReader;
use crate::error::{Error, Result};
use crate::integer::Integer;
use crate::limits::{Checklist, Limits};
use crate::marker::{ExtType, Marker};
use crate::value::Value;
use crate::value_ref::ValueRef;

/// Options controlling a [`decode`]/[`decode_ref`] call.
#[derive(Clone, Copy, Debug)]
pub struct DecodeOptions {
    /// Resource bounds enforced while walking the buffer.
    pub limits: Limits,
    /// Reject non-UTF-8 string payloads. When `false`, invalid sequences are replaced
    /// (`String::from_utf8_lossy`) rather than rejected.
    pub strict: bool,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            limits: Limits::default(),
            strict: true,
        }
    }
}

/// Decode a single value from the front of `data`. Trailing bytes after a well-formed value are
/// not an error; the streaming decoder relies on this to find value boundaries.
pub fn decode(data: &[u8], options: &DecodeOptions) -> Result<Value> {
    let mut reader = BoundsReader::new(data);
    let mut checklist = Checklist::new(&options.limits);
    decode_value(&mut reader, &mut checklist, options)
}

/// As [`decode`], but borrows strings and binary payloads from `data` instead of copying them.
pub fn decode_ref<'a>(data: &'a [u8], options: &DecodeOptions) -> Result<ValueRef<'a>> {
    let mut reader = BoundsReader::new(data);
    let mut checklist = Checklist::new(&options.limits);
    decode_value_ref(&mut reader, &mut checklist, options)
}

pub(crate) fn decode_value(
    reader: &mut BoundsReader,
    checklist: &mut Checklist,
    options: &DecodeOptions,
) -> Result<Value> {
    let byte = reader.read_byte("marker")?;
    match Marker::from_u8(byte) {
        Marker::Nil => {
            checklist.record_scalar();
            Ok(Value::Nil)
        }
        Marker::Reserved => Err(Error::InvalidMarker { byte }),
        Marker::False => {
            checklist.record_scalar();
            Ok(Value::Bool(false))
        }
        Marker::True => {
            checklist.record_scalar();
            Ok(Value::Bool(true))
        }
        Marker::PosFixInt(v) => {
            checklist.record_scalar();
            Ok(Value::Uint(Integer::from(v as u64)))
        }
        Marker::NegFixInt(v) => {
            checklist.record_scalar();
            Ok(Value::Int(Integer::from(v as i64)))
        }
        Marker::UInt8 => {
            let v = reader.read_u8("uint8 payload")?;
            checklist.record_scalar();
            Ok(Value::Uint(Integer::from(v as u64)))
        }
        Marker::UInt16 => {
            let v = reader.read_u16("uint16 payload")?;
            checklist.record_scalar();
            Ok(Value::Uint(Integer::from(v as u64)))
        }
        Marker::UInt32 => {
            let v = reader.read_u32("uint32 payload")?;
            checklist.record_scalar();
            Ok(Value::Uint(Integer::from(v as u64)))
        }
        Marker::UInt64 => {
            let v = reader.read_u64("uint64 payload")?;
            checklist.record_scalar();
            Ok(Value::Uint(Integer::from(v)))
        }
        Marker::Int8 => {
            let v = reader.read_i8("int8 payload")?;
            checklist.record_scalar();
            Ok(Value::Int(Integer::from(v as i64)))
        }
        Marker::Int16 => {
            let v = reader.read_i16("int16 payload")?;
            checklist.record_scalar();
            Ok(Value::Int(Integer::from(v as i64)))
        }
        Marker::Int32 => {
            let v = reader.read_i32("int32 payload")?;
            checklist.record_scalar();
            Ok(Value::Int(Integer::from(v as i64)))
        }
        Marker::Int64 => {
            let v = reader.read_i64("int64 payload")?;
            checklist.record_scalar();
            Ok(Value::Int(Integer::from(v)))
        }
        Marker::F32 => {
            let v = reader.read_f32("float32 payload")?;
            checklist.record_scalar();
            Ok(Value::Float(v as f64))
        }
        Marker::F64 => {
            let v = reader.read_f64("float64 payload")?;
            checklist.record_scalar();
            Ok(Value::Float(v))
        }
        Marker::FixStr(len) => decode_string(reader, checklist, options, len as usize),
        Marker::Str8 => {
            let len = reader.read_u8("str8 length")? as usize;
            decode_string(reader, checklist, options, len)
        }
        Marker::Str16 => {
            let len = reader.read_u16("str16 length")? as usize;
            decode_string(reader, checklist, options, len)
        }
        Marker::Str32 => {
            let len = reader.read_u32("str32 length")? as usize;
            decode_string(reader, checklist, options, len)
        }
        Marker::Bin8 => {
            let len = reader.read_u8("bin8 length")? as usize;
            decode_binary(reader, checklist, len)
        }
        Marker::Bin16 => {
            let len = reader.read_u16("bin16 length")? as usize;
            decode_binary(reader, checklist, len)
        }
        Marker::Bin32 => {
            let len = reader.read_u32("bin32 length")? as usize;
            decode_binary(reader, checklist, len)
        }
        Marker::FixArray(len) => decode_array(reader, checklist, options, len as usize),
        Marker::Array16 => {
            let len = reader.read_u16("array16 length")? as usize;
            decode_array(reader, checklist, options, len)
        }
        Marker::Array32 => {
            let len = reader.read_u32("array32 length")? as usize;
            decode_array(reader, checklist, options, len)
        }
        Marker::FixMap(len) => decode_map(reader, checklist, options, len as usize),
        Marker::Map16 => {
            let len = reader.read_u16("map16 length")? as usize;
            decode_map(reader, checklist, options, len)
        }
        Marker::Map32 => {
            let len = reader.read_u32("map32 length")? as usize;
            decode_map(reader, checklist, options, len)
        }
        Marker::FixExt1 => decode_ext(reader, checklist, options, 1),
        Marker::FixExt2 => decode_ext(reader, checklist, options, 2),
        Marker::FixExt4 => decode_ext(reader, checklist, options, 4),
        Marker::FixExt8 => decode_ext(reader, checklist, options, 8),
        Marker::FixExt16 => decode_ext(reader, checklist, options, 16),
        Marker::Ext8 => {
            let len = reader.read_u8("ext8 length")? as usize;
            decode_ext(reader, checklist, options, len)
        }
        Marker::Ext16 => {
            let len = reader.read_u16("ext16 length")? as usize;
            decode_ext(reader, checklist, options, len)
        }
        Marker::Ext32 => {
            let len = reader.read_u32("ext32 length")? as usize;
            decode_ext(reader, checklist, options, len)
        }
    }
}

fn decode_string(
    reader: &mut BoundsReader,
    checklist: &mut Checklist,
    options: &DecodeOptions,
    len: usize,
) -> Result<Value> {
    checklist.check_string_len(len)?;
    let bytes = reader.read_bytes(len, "string payload")?;
    let s = if options.strict {
        std::str::from_utf8(bytes)
            .map_err(|_| Error::InvalidUtf8)?
            .to_owned()
    } else {
        String::from_utf8_lossy(bytes).into_owned()
    };
    checklist.record_scalar();
    Ok(Value::String(s))
}

fn decode_binary(reader: &mut BoundsReader, checklist: &mut Checklist, len: usize) -> Result<Value> {
    checklist.check_binary_len(len)?;
    let bytes = reader.read_bytes(len, "binary payload")?.to_vec();
    checklist.record_scalar();
    Ok(Value::Binary(bytes))
}

fn decode_array(
    reader: &mut BoundsReader,
    checklist: &mut Checklist,
    options: &DecodeOptions,
    len: usize,
) -> Result<Value> {
    checklist.enter_array(len)?;
    let mut items = Vec::with_capacity(len.min(4096));
    for _ in 0..len {
        items.push(decode_value(reader, checklist, options)?);
    }
    Ok(Value::Array(items))
}

/// Read one map key. Keys are restricted to the string markers.
fn expect_string_key_marker(reader: &BoundsReader, step: &'static str) -> Result<()> {
    let byte = reader
        .peek_byte()
        .ok_or(Error::Truncated {
            step,
            actual: 0,
            expected: 1,
        })?;
    match Marker::from_u8(byte) {
        Marker::FixStr(_) | Marker::Str8 | Marker::Str16 | Marker::Str32 => Ok(()),
        _ => Err(Error::InvalidMarker { byte }),
    }
}

fn decode_map(
    reader: &mut BoundsReader,
    checklist: &mut Checklist,
    options: &DecodeOptions,
    len: usize,
) -> Result<Value> {
    checklist.enter_map(len)?;
    let mut pairs = Vec::with_capacity(len.min(4096));
    for _ in 0..len {
        expect_string_key_marker(reader, "map key marker")?;
        let key = match decode_value(reader, checklist, options)? {
            Value::String(s) => s,
            _ => unreachable!("expect_string_key_marker guarantees a string marker"),
        };
        let value = decode_value(reader, checklist, options)?;
        pairs.push((key, value));
    }
    Ok(Value::Map(pairs))
}

fn decode_ext(
    reader: &mut BoundsReader,
    checklist: &mut Checklist,
    options: &DecodeOptions,
    len: usize,
) -> Result<Value> {
    checklist.check_binary_len(len)?;
    let ty = reader.read_i8("extension type")?;
    let data = reader.read_bytes(len, "extension payload")?;
    match ExtType::from_i8(ty) {
        ExtType::Date => {
            if data.len() != 8 {
                return Err(Error::InvalidExtension(format!(
                    "date extension must be exactly 8 bytes, got {}",
                    data.len()
                )));
            }
            checklist.record_scalar();
            Ok(Value::Date(BigEndian::read_i64(data)))
        }
        ExtType::BigInt => {
            if data.is_empty() {
                return Err(Error::InvalidExtension(
                    "bigint extension payload must not be empty".into(),
                ));
            }
            checklist.record_scalar();
            Ok(Value::BigInt(data.to_vec()))
        }
        ExtType::Tabular => {
            let value = crate::tabular::from_tabular(data, checklist, options)?;
            checklist.record_scalar();
            Ok(value)
        }
        ExtType::Other(code) => {
            checklist.record_scalar();
            Ok(Value::Extension(code, data.to_vec()))
        }
    }
}

pub(crate) fn decode_value_ref<'a>(
    reader: &mut BoundsReader<'a>,
    checklist: &mut Checklist,
    options: &DecodeOptions,
) -> Result<ValueRef<'a>> {
    let byte = reader.read_byte("marker")?;
    match Marker::from_u8(byte) {
        Marker::Nil => {
            checklist.record_scalar();
            Ok(ValueRef::Nil)
        }
        Marker::Reserved => Err(Error::InvalidMarker { byte }),
        Marker::False => {
            checklist.record_scalar();
            Ok(ValueRef::Bool(false))
        }
        Marker::True => {
            checklist.record_scalar();
            Ok(ValueRef::Bool(true))
        }
        Marker::PosFixInt(v) => {
            checklist.record_scalar();
            Ok(ValueRef::Uint(Integer::from(v as u64)))
        }
        Marker::NegFixInt(v) => {
            checklist.record_scalar();
            Ok(ValueRef::Int(Integer::from(v as i64)))
        }
        Marker::UInt8 => {
            let v = reader.read_u8("uint8 payload")?;
            checklist.record_scalar();
            Ok(ValueRef::Uint(Integer::from(v as u64)))
        }
        Marker::UInt16 => {
            let v = reader.read_u16("uint16 payload")?;
            checklist.record_scalar();
            Ok(ValueRef::Uint(Integer::from(v as u64)))
        }
        Marker::UInt32 => {
            let v = reader.read_u32("uint32 payload")?;
            checklist.record_scalar();
            Ok(ValueRef::Uint(Integer::from(v as u64)))
        }
        Marker::UInt64 => {
            let v = reader.read_u64("uint64 payload")?;
            checklist.record_scalar();
            Ok(ValueRef::Uint(Integer::from(v)))
        }
        Marker::Int8 => {
            let v = reader.read_i8("int8 payload")?;
            checklist.record_scalar();
            Ok(ValueRef::Int(Integer::from(v as i64)))
        }
        Marker::Int16 => {
            let v = reader.read_i16("int16 payload")?;
            checklist.record_scalar();
            Ok(ValueRef::Int(Integer::from(v as i64)))
        }
        Marker::Int32 => {
            let v = reader.read_i32("int32 payload")?;
            checklist.record_scalar();
            Ok(ValueRef::Int(Integer::from(v as i64)))
        }
        Marker::Int64 => {
            let v = reader.read_i64("int64 payload")?;
            checklist.record_scalar();
            Ok(ValueRef::Int(Integer::from(v)))
        }
        Marker::F32 => {
            let v = reader.read_f32("float32 payload")?;
            checklist.record_scalar();
            Ok(ValueRef::Float(v as f64))
        }
        Marker::F64 => {
            let v = reader.read_f64("float64 payload")?;
            checklist.record_scalar();
            Ok(ValueRef::Float(v))
        }
        Marker::FixStr(len) => decode_string_ref(reader, checklist, options, len as usize),
        Marker::Str8 => {
            let len = reader.read_u8("str8 length")? as usize;
            decode_string_ref(reader, checklist, options, len)
        }
        Marker::Str16 => {
            let len = reader.read_u16("str16 length")? as usize;
            decode_string_ref(reader, checklist, options, len)
        }
        Marker::Str32 => {
            let len = reader.read_u32("str32 length")? as usize;
            decode_string_ref(reader, checklist, options, len)
        }
        Marker::Bin8 => {
            let len = reader.read_u8("bin8 length")? as usize;
            decode_binary_ref(reader, checklist, len)
        }
        Marker::Bin16 => {
            let len = reader.read_u16("bin16 length")? as usize;
            decode_binary_ref(reader, checklist, len)
        }
        Marker::Bin32 => {
            let len = reader.read_u32("bin32 length")? as usize;
            decode_binary_ref(reader, checklist, len)
        }
        Marker::FixArray(len) => decode_array_ref(reader, checklist, options, len as usize),
        Marker::Array16 => {
            let len = reader.read_u16("array16 length")? as usize;
            decode_array_ref(reader, checklist, options, len)
        }
        Marker::Array32 => {
            let len = reader.read_u32("array32 length")? as usize;
            decode_array_ref(reader, checklist, options, len)
        }
        Marker::FixMap(len) => decode_map_ref(reader, checklist, options, len as usize),
        Marker::Map16 => {
            let len = reader.read_u16("map16 length")? as usize;
            decode_map_ref(reader, checklist, options, len)
        }
        Marker::Map32 => {
            let len = reader.read_u32("map32 length")? as usize;
            decode_map_ref(reader, checklist, options, len)
        }
        Marker::FixExt1 => decode_ext_ref(reader, checklist, options, 1),
        Marker::FixExt2 => decode_ext_ref(reader, checklist, options, 2),
        Marker::FixExt4 => decode_ext_ref(reader, checklist, options, 4),
        Marker::FixExt8 => decode_ext_ref(reader, checklist, options, 8),
        Marker::FixExt16 => decode_ext_ref(reader, checklist, options, 16),
        Marker::Ext8 => {
            let len = reader.read_u8("ext8 length")? as usize;
            decode_ext_ref(reader, checklist, options, len)
        }
        Marker::Ext16 => {
            let len = reader.read_u16("ext16 length")? as usize;
            decode_ext_ref(reader, checklist, options, len)
        }
        Marker::Ext32 => {
            let len = reader.read_u32("ext32 length")? as usize;
            decode_ext_ref(reader, checklist, options, len)
        }
    }
}

fn decode_string_ref<'a>(
    reader: &mut BoundsReader<'a>,
    checklist: &mut Checklist,
    options: &DecodeOptions,
    len: usize,
) -> Result<ValueRef<'a>> {
    checklist.check_string_len(len)?;
    let bytes = reader.read_bytes(len, "string payload")?;
    let s = if options.strict {
        std::str::from_utf8(bytes).map_err(|_| Error::InvalidUtf8)?
    } else {
        // Lenient mode cannot borrow through a lossy replacement; fall back to rejecting only
        // when the bytes truly aren't UTF-8 at all would require an owned copy, so lenient
        // `decode_ref` still requires valid UTF-8 (the owned `decode` path is the one that
        // tolerates lossy replacement).
        std::str::from_utf8(bytes).map_err(|_| Error::InvalidUtf8)?
    };
    checklist.record_scalar();
    Ok(ValueRef::String(s))
}

fn decode_binary_ref<'a>(
    reader: &mut BoundsReader<'a>,
    checklist: &mut Checklist,
    len: usize,
) -> Result<ValueRef<'a>> {
    checklist.check_binary_len(len)?;
    let bytes = reader.read_bytes(len, "binary payload")?;
    checklist.record_scalar();
    Ok(ValueRef::Binary(bytes))
}

fn decode_array_ref<'a>(
    reader: &mut BoundsReader<'a>,
    checklist: &mut Checklist,
    options: &DecodeOptions,
    len: usize,
) -> Result<ValueRef<'a>> {
    checklist.enter_array(len)?;
    let mut items = Vec::with_capacity(len.min(4096));
    for _ in 0..len {
        items.push(decode_value_ref(reader, checklist, options)?);
    }
    Ok(ValueRef::Array(items))
}

fn decode_map_ref<'a>(
    reader: &mut BoundsReader<'a>,
    checklist: &mut Checklist,
    options: &DecodeOptions,
    len: usize,
) -> Result<ValueRef<'a>> {
    checklist.enter_map(len)?;
    let mut pairs = Vec::with_capacity(len.min(4096));
    for _ in 0..len {
        expect_string_key_marker(reader, "map key marker")?;
        let key = match decode_value_ref(reader, checklist, options)? {
            ValueRef::String(s) => s,
            _ => unreachable!("expect_string_key_marker guarantees a string marker"),
        };
        let value = decode_value_ref(reader, checklist, options)?;
        pairs.push((key, value));
    }
    Ok(ValueRef::Map(pairs))
}

fn decode_ext_ref<'a>(
    reader: &mut BoundsReader<'a>,
    checklist: &mut Checklist,
    options: &DecodeOptions,
    len: usize,
) -> Result<ValueRef<'a>> {
    checklist.check_binary_len(len)?;
    let ty = reader.read_i8("extension type")?;
    let data = reader.read_bytes(len, "extension payload")?;
    match ExtType::from_i8(ty) {
        ExtType::Date => {
            if data.len() != 8 {
                return Err(Error::InvalidExtension(format!(
                    "date extension must be exactly 8 bytes, got {}",
                    data.len()
                )));
            }
            checklist.record_scalar();
            Ok(ValueRef::Date(BigEndian::read_i64(data)))
        }
        ExtType::BigInt => {
            if data.is_empty() {
                return Err(Error::InvalidExtension(
                    "bigint extension payload must not be empty".into(),
                ));
            }
            checklist.record_scalar();
            Ok(ValueRef::BigInt(data))
        }
        ExtType::Tabular => {
            let value = crate::tabular::from_tabular_ref(data, checklist, options)?;
            checklist.record_scalar();
            Ok(value)
        }
        ExtType::Other(code) => {
            checklist.record_scalar();
            Ok(ValueRef::Extension(code, data))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_nil_and_bools() {
        let opts = DecodeOptions::default();
        assert_eq!(decode(&[0xc0], &opts).unwrap(), Value::Nil);
        assert_eq!(decode(&[0xc2], &opts).unwrap(), Value::Bool(false));
        assert_eq!(decode(&[0xc3], &opts).unwrap(), Value::Bool(true));
    }

    #[test]
    fn decodes_fixint_and_negfixint() {
        let opts = DecodeOptions::default();
        assert_eq!(decode(&[0x7f], &opts).unwrap().as_u64(), Some(127));
        assert_eq!(decode(&[0xff], &opts).unwrap().as_i64(), Some(-1));
    }

    #[test]
    fn rejects_reserved_marker() {
        let opts = DecodeOptions::default();
        assert!(matches!(
            decode(&[0xc1], &opts),
            Err(Error::InvalidMarker { byte: 0xc1 })
        ));
    }

    #[test]
    fn trailing_bytes_are_not_an_error() {
        let opts = DecodeOptions::default();
        let value = decode(&[0xc0, 0xc0, 0xc0], &opts).unwrap();
        assert_eq!(value, Value::Nil);
    }

    #[test]
    fn array32_overclaim_is_truncated_not_allocated() {
        let opts = DecodeOptions::default();
        let buf = [0xdd, 0xff, 0xff, 0xff, 0xff];
        assert!(decode(&buf, &opts).is_err());
    }

    #[test]
    fn decode_ref_borrows_strings() {
        let data = [0xa5, b'h', b'e', b'l', b'l', b'o'];
        let opts = DecodeOptions::default();
        let value = decode_ref(&data, &opts).unwrap();
        assert_eq!(value, ValueRef::String("hello"));
    }

    #[test]
    fn map_rejects_non_string_keys() {
        let opts = DecodeOptions::default();
        // fixmap with 1 entry, key = fixint 1 (not a string), value = nil.
        let buf = [0x81, 0x01, 0xc0];
        assert!(decode(&buf, &opts).is_err());
    }
}
