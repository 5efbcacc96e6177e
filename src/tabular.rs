//! The column-oriented tabular block: detects uniform arrays-of-maps, rewrites them into
//! the private extension type `-1`, and expands them back on decode.

use crate::bounds::BoundsReader;
use crate::decode::{decode_value, decode_value_ref, DecodeOptions};
use crate::encode::{encode_array_header, encode_str_value, encode_uint_value, encode_value, EncodeOptions};
use crate::error::{Error, Result};
use crate::limits::Checklist;
use crate::marker::Marker;
use crate::value::Value;
use crate::value_ref::ValueRef;

/// True iff `items` meets the uniformity predicate: at least two elements, every element a
/// `Map`, every map sharing the same key set in the same order, and no column holding a `Map` or
/// another tabular-eligible array.
pub fn is_tabular(items: &[Value]) -> bool {
    if items.len() < 2 {
        return false;
    }
    let first_keys: Vec<&str> = match &items[0] {
        Value::Map(pairs) => pairs.iter().map(|(k, _)| k.as_str()).collect(),
        _ => return false,
    };
    for item in &items[1..] {
        let Value::Map(pairs) = item else { return false };
        if pairs.len() != first_keys.len() {
            return false;
        }
        if !pairs
            .iter()
            .zip(first_keys.iter())
            .all(|((k, _), fk)| k == fk)
        {
            return false;
        }
    }
    for key in &first_keys {
        for item in items {
            let Value::Map(pairs) = item else { unreachable!() };
            let Some((_, v)) = pairs.iter().find(|(k, _)| k == key) else {
                continue;
            };
            match v {
                Value::Map(_) => return false,
                Value::Array(inner) if is_tabular(inner) => return false,
                _ => {}
            }
        }
    }
    true
}

/// Encode a tabular-eligible slice of `Map` values into the extension's raw payload bytes.
/// Panics (via an internal assertion) if `items` is not tabular; callers
/// are expected to have checked [`is_tabular`] first, as [`encode_value`] does.
pub(crate) fn to_tabular(items: &[Value], options: &EncodeOptions) -> Result<Vec<u8>> {
    let keys: Vec<&str> = match &items[0] {
        Value::Map(pairs) => pairs.iter().map(|(k, _)| k.as_str()).collect(),
        _ => return Err(Error::EncodeOverflow("tabular rows must be maps".into())),
    };

    let mut buf = Vec::new();
    encode_uint_value(items.len() as u64, &mut buf);
    encode_uint_value(keys.len() as u64, &mut buf);
    for key in &keys {
        encode_str_value(key.as_bytes(), &mut buf)?;
    }
    for key in &keys {
        encode_array_header(items.len(), &mut buf)?;
        for row in items {
            let pairs = row
                .as_map()
                .ok_or_else(|| Error::EncodeOverflow("tabular row is not a map".into()))?;
            let value = pairs
                .iter()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v)
                .ok_or_else(|| Error::EncodeOverflow("tabular row missing column key".into()))?;
            encode_value(value, &mut buf, options)?;
        }
    }
    Ok(buf)
}

/// As [`read_header_uint`], exposed for the validator's value-less tabular walk.
pub(crate) fn validate_header_uint(reader: &mut BoundsReader, step: &'static str) -> Result<u64> {
    read_header_uint(reader, step)
}

/// As [`read_header_str`], exposed for the validator's value-less tabular walk.
pub(crate) fn validate_header_str(reader: &mut BoundsReader, step: &'static str) -> Result<String> {
    read_header_str(reader, step)
}

/// As [`read_array_header`], exposed for the validator's value-less tabular walk.
pub(crate) fn validate_array_header(reader: &mut BoundsReader, step: &'static str) -> Result<usize> {
    read_array_header(reader, step)
}

fn read_header_uint(reader: &mut BoundsReader, step: &'static str) -> Result<u64> {
    let byte = reader.read_byte(step)?;
    match Marker::from_u8(byte) {
        Marker::PosFixInt(v) => Ok(v as u64),
        Marker::UInt8 => Ok(reader.read_u8(step)? as u64),
        Marker::UInt16 => Ok(reader.read_u16(step)? as u64),
        Marker::UInt32 => Ok(reader.read_u32(step)? as u64),
        Marker::UInt64 => reader.read_u64(step),
        _ => Err(Error::InvalidExtension(format!(
            "malformed tabular header: expected an unsigned integer at [{}]",
            step
        ))),
    }
}

fn read_header_str(reader: &mut BoundsReader, step: &'static str) -> Result<String> {
    let byte = reader.read_byte(step)?;
    let len = match Marker::from_u8(byte) {
        Marker::FixStr(n) => n as usize,
        Marker::Str8 => reader.read_u8(step)? as usize,
        Marker::Str16 => reader.read_u16(step)? as usize,
        Marker::Str32 => reader.read_u32(step)? as usize,
        _ => {
            return Err(Error::InvalidExtension(format!(
                "malformed tabular header: expected a string at [{}]",
                step
            )))
        }
    };
    let bytes = reader.read_bytes(len, step)?;
    std::str::from_utf8(bytes)
        .map(str::to_owned)
        .map_err(|_| Error::InvalidExtension("tabular column header was not valid UTF-8".into()))
}

fn read_array_header(reader: &mut BoundsReader, step: &'static str) -> Result<usize> {
    let byte = reader.read_byte(step)?;
    match Marker::from_u8(byte) {
        Marker::FixArray(n) => Ok(n as usize),
        Marker::Array16 => Ok(reader.read_u16(step)? as usize),
        Marker::Array32 => Ok(reader.read_u32(step)? as usize),
        _ => Err(Error::InvalidExtension(format!(
            "malformed tabular column: expected an array at [{}]",
            step
        ))),
    }
}

/// Expand a tabular extension payload back into a `Value::Array` of `Value::Map`s, zipping
/// column headers with the i-th element of each column. Row order and column-header order are
/// both preserved.
pub(crate) fn from_tabular(
    data: &[u8],
    checklist: &mut Checklist,
    options: &DecodeOptions,
) -> Result<Value> {
    let mut reader = BoundsReader::new(data);
    let row_count = read_header_uint(&mut reader, "tabular row_count")? as usize;
    let column_count = read_header_uint(&mut reader, "tabular column_count")? as usize;

    let mut headers = Vec::with_capacity(column_count);
    for _ in 0..column_count {
        headers.push(read_header_str(&mut reader, "tabular column header")?);
    }

    let mut columns: Vec<Vec<Value>> = Vec::with_capacity(column_count);
    for _ in 0..column_count {
        let len = read_array_header(&mut reader, "tabular column array")?;
        if len != row_count {
            return Err(Error::InvalidExtension(format!(
                "tabular column declared {} rows, header declared {}",
                len, row_count
            )));
        }
        checklist.enter_array(len)?;
        let mut column = Vec::with_capacity(row_count);
        for _ in 0..row_count {
            column.push(decode_value(&mut reader, checklist, options)?);
        }
        columns.push(column);
    }

    let mut rows = Vec::with_capacity(row_count);
    for row_idx in 0..row_count {
        let mut pairs = Vec::with_capacity(column_count);
        for (col_idx, header) in headers.iter().enumerate() {
            pairs.push((header.clone(), columns[col_idx][row_idx].clone()));
        }
        rows.push(Value::Map(pairs));
    }
    Ok(Value::Array(rows))
}

/// As [`from_tabular`], but produces the borrowing [`ValueRef`] tree.
pub(crate) fn from_tabular_ref<'a>(
    data: &'a [u8],
    checklist: &mut Checklist,
    options: &DecodeOptions,
) -> Result<ValueRef<'a>> {
    let mut reader = BoundsReader::new(data);
    let row_count = read_header_uint(&mut reader, "tabular row_count")? as usize;
    let column_count = read_header_uint(&mut reader, "tabular column_count")? as usize;

    let mut headers = Vec::with_capacity(column_count);
    for _ in 0..column_count {
        let byte = reader.read_byte("tabular column header")?;
        let len = match Marker::from_u8(byte) {
            Marker::FixStr(n) => n as usize,
            Marker::Str8 => reader.read_u8("tabular column header")? as usize,
            Marker::Str16 => reader.read_u16("tabular column header")? as usize,
            Marker::Str32 => reader.read_u32("tabular column header")? as usize,
            _ => {
                return Err(Error::InvalidExtension(
                    "malformed tabular header: expected a string".into(),
                ))
            }
        };
        let bytes = reader.read_bytes(len, "tabular column header")?;
        let s = std::str::from_utf8(bytes)
            .map_err(|_| Error::InvalidExtension("tabular column header was not valid UTF-8".into()))?;
        headers.push(s);
    }

    let mut columns: Vec<Vec<ValueRef<'a>>> = Vec::with_capacity(column_count);
    for _ in 0..column_count {
        let len = read_array_header(&mut reader, "tabular column array")?;
        if len != row_count {
            return Err(Error::InvalidExtension(format!(
                "tabular column declared {} rows, header declared {}",
                len, row_count
            )));
        }
        checklist.enter_array(len)?;
        let mut column = Vec::with_capacity(row_count);
        for _ in 0..row_count {
            column.push(decode_value_ref(&mut reader, checklist, options)?);
        }
        columns.push(column);
    }

    let mut rows = Vec::with_capacity(row_count);
    for row_idx in 0..row_count {
        let mut pairs = Vec::with_capacity(column_count);
        for (col_idx, header) in headers.iter().enumerate() {
            pairs.push((*header, columns[col_idx][row_idx].clone()));
        }
        rows.push(ValueRef::Map(pairs));
    }
    Ok(ValueRef::Array(rows))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::decode;
    use crate::encode::encode;

    fn sample_rows() -> Vec<Value> {
        (0..3)
            .map(|i| {
                Value::Map(vec![
                    ("id".into(), Value::from(i as u32)),
                    ("name".into(), Value::from(format!("row-{i}").as_str())),
                    ("active".into(), Value::Bool(i % 2 == 0)),
                ])
            })
            .collect()
    }

    #[test]
    fn uniform_rows_are_tabular() {
        assert!(is_tabular(&sample_rows()));
    }

    #[test]
    fn single_row_is_never_tabular() {
        assert!(!is_tabular(&sample_rows()[..1]));
    }

    #[test]
    fn mismatched_keys_are_not_tabular() {
        let mut rows = sample_rows();
        rows[1] = Value::Map(vec![("different".into(), Value::Nil)]);
        assert!(!is_tabular(&rows));
    }

    #[test]
    fn nested_map_column_disqualifies_tabular() {
        let rows = vec![
            Value::Map(vec![("a".into(), Value::Map(vec![("b".into(), Value::Nil)]))]),
            Value::Map(vec![("a".into(), Value::Map(vec![("b".into(), Value::Nil)]))]),
        ];
        assert!(!is_tabular(&rows));
    }

    #[test]
    fn tabular_round_trip_preserves_rows_and_key_order() {
        let rows = Value::Array(sample_rows());
        let options = EncodeOptions {
            auto_tabular: true,
        };
        let encoded = encode(&rows, &options).unwrap();
        // First byte must be an ext marker, not a plain array marker.
        assert!(matches!(
            Marker::from_u8(encoded[0]),
            Marker::Ext8 | Marker::Ext16 | Marker::Ext32 | Marker::FixExt1
                | Marker::FixExt2
                | Marker::FixExt4
                | Marker::FixExt8
                | Marker::FixExt16
        ));
        let decoded = decode(&encoded, &DecodeOptions::default()).unwrap();
        assert_eq!(decoded, rows);
    }

    #[test]
    fn tabular_encoding_is_smaller_than_naive_array() {
        let rows = Value::Array(sample_rows());
        let tabular = encode(&rows, &EncodeOptions { auto_tabular: true }).unwrap();
        let naive = encode(&rows, &EncodeOptions { auto_tabular: false }).unwrap();
        assert!(tabular.len() < naive.len());
    }
}
