//! The pre-decode validator: walks an encoded buffer without materializing a [`Value`],
//! enforcing the same [`Limits`] the decoder does. The contract callers rely on: if `validate`
//! reports `valid`, a `decode` call under options implying the same bounds cannot fail with a
//! structural error.

use crate::bounds::BoundsReader;
use crate::error::{Error, Result, ValidationResult};
use crate::limits::{Checklist, Limits};
use crate::marker::{ExtType, Marker};

/// Options controlling a [`validate`] call.
#[derive(Clone, Copy, Debug)]
pub struct ValidateOptions {
    pub limits: Limits,
    /// Reject non-UTF-8 string payloads.
    pub strict_utf8: bool,
    /// Skip UTF-8 checking entirely; counts and depth are still enforced.
    pub fast_mode: bool,
}

impl Default for ValidateOptions {
    fn default() -> Self {
        Self {
            limits: Limits::default(),
            strict_utf8: true,
            fast_mode: false,
        }
    }
}

/// Walk one value at the front of `data`, reporting whether it structurally conforms to
/// `options` without allocating a [`crate::Value`] tree.
pub fn validate(data: &[u8], options: &ValidateOptions) -> ValidationResult {
    if data.len() > options.limits.max_total_size {
        return ValidationResult::fail(
            Error::SizeExceeded {
                max: options.limits.max_total_size,
                actual: data.len(),
            },
            0,
        );
    }
    let mut reader = BoundsReader::new(data);
    let mut checklist = Checklist::new(&options.limits);
    match walk_value(&mut reader, &mut checklist, options) {
        Ok(()) => ValidationResult::ok(),
        Err(err) => ValidationResult::fail(err, reader.position()),
    }
}

fn walk_value(
    reader: &mut BoundsReader,
    checklist: &mut Checklist,
    options: &ValidateOptions,
) -> Result<()> {
    let byte = reader.read_byte("marker")?;
    match Marker::from_u8(byte) {
        Marker::Reserved => return Err(Error::InvalidMarker { byte }),
        Marker::Nil | Marker::False | Marker::True | Marker::PosFixInt(_) | Marker::NegFixInt(_) => {
            checklist.record_scalar();
        }
        Marker::UInt8 | Marker::Int8 => {
            reader.skip(1, "int8 payload")?;
            checklist.record_scalar();
        }
        Marker::UInt16 | Marker::Int16 => {
            reader.skip(2, "int16 payload")?;
            checklist.record_scalar();
        }
        Marker::UInt32 | Marker::Int32 | Marker::F32 => {
            reader.skip(4, "32-bit payload")?;
            checklist.record_scalar();
        }
        Marker::UInt64 | Marker::Int64 | Marker::F64 => {
            reader.skip(8, "64-bit payload")?;
            checklist.record_scalar();
        }
        Marker::FixStr(len) => walk_string(reader, checklist, options, len as usize)?,
        Marker::Str8 => {
            let len = reader.read_u8("str8 length")? as usize;
            walk_string(reader, checklist, options, len)?;
        }
        Marker::Str16 => {
            let len = reader.read_u16("str16 length")? as usize;
            walk_string(reader, checklist, options, len)?;
        }
        Marker::Str32 => {
            let len = reader.read_u32("str32 length")? as usize;
            walk_string(reader, checklist, options, len)?;
        }
        Marker::Bin8 => {
            let len = reader.read_u8("bin8 length")? as usize;
            walk_binary(reader, checklist, len)?;
        }
        Marker::Bin16 => {
            let len = reader.read_u16("bin16 length")? as usize;
            walk_binary(reader, checklist, len)?;
        }
        Marker::Bin32 => {
            let len = reader.read_u32("bin32 length")? as usize;
            walk_binary(reader, checklist, len)?;
        }
        Marker::FixArray(len) => walk_array(reader, checklist, options, len as usize)?,
        Marker::Array16 => {
            let len = reader.read_u16("array16 length")? as usize;
            walk_array(reader, checklist, options, len)?;
        }
        Marker::Array32 => {
            let len = reader.read_u32("array32 length")? as usize;
            walk_array(reader, checklist, options, len)?;
        }
        Marker::FixMap(len) => walk_map(reader, checklist, options, len as usize)?,
        Marker::Map16 => {
            let len = reader.read_u16("map16 length")? as usize;
            walk_map(reader, checklist, options, len)?;
        }
        Marker::Map32 => {
            let len = reader.read_u32("map32 length")? as usize;
            walk_map(reader, checklist, options, len)?;
        }
        Marker::FixExt1 => walk_ext(reader, checklist, options, 1)?,
        Marker::FixExt2 => walk_ext(reader, checklist, options, 2)?,
        Marker::FixExt4 => walk_ext(reader, checklist, options, 4)?,
        Marker::FixExt8 => walk_ext(reader, checklist, options, 8)?,
        Marker::FixExt16 => walk_ext(reader, checklist, options, 16)?,
        Marker::Ext8 => {
            let len = reader.read_u8("ext8 length")? as usize;
            walk_ext(reader, checklist, options, len)?;
        }
        Marker::Ext16 => {
            let len = reader.read_u16("ext16 length")? as usize;
            walk_ext(reader, checklist, options, len)?;
        }
        Marker::Ext32 => {
            let len = reader.read_u32("ext32 length")? as usize;
            walk_ext(reader, checklist, options, len)?;
        }
    }
    Ok(())
}

/// Reject a declared length/count up front when it claims more than the remaining bytes could
/// possibly hold, even under the most optimistic (one-byte-per-unit) assumption. This turns an
/// eventual `Truncated` deep in the recursion into an immediate `InvalidLength` at the point the
/// bogus claim was made, before any further bytes are read or any child value is visited.
fn check_not_overclaiming(
    reader: &BoundsReader,
    declared: usize,
    min_bytes_per_unit: usize,
    step: &'static str,
) -> Result<()> {
    let remaining = reader.remaining();
    if declared.saturating_mul(min_bytes_per_unit) > remaining {
        return Err(Error::InvalidLength {
            step,
            declared,
            remaining,
        });
    }
    Ok(())
}

fn walk_string(
    reader: &mut BoundsReader,
    checklist: &mut Checklist,
    options: &ValidateOptions,
    len: usize,
) -> Result<()> {
    checklist.check_string_len(len)?;
    check_not_overclaiming(reader, len, 1, "string payload")?;
    let bytes = reader.read_bytes(len, "string payload")?;
    if options.strict_utf8 && !options.fast_mode && std::str::from_utf8(bytes).is_err() {
        return Err(Error::InvalidUtf8);
    }
    checklist.record_scalar();
    Ok(())
}

fn walk_binary(reader: &mut BoundsReader, checklist: &mut Checklist, len: usize) -> Result<()> {
    checklist.check_binary_len(len)?;
    check_not_overclaiming(reader, len, 1, "binary payload")?;
    reader.skip(len, "binary payload")?;
    checklist.record_scalar();
    Ok(())
}

fn walk_array(
    reader: &mut BoundsReader,
    checklist: &mut Checklist,
    options: &ValidateOptions,
    len: usize,
) -> Result<()> {
    check_not_overclaiming(reader, len, 1, "array elements")?;
    checklist.enter_array(len)?;
    for _ in 0..len {
        walk_value(reader, checklist, options)?;
    }
    Ok(())
}

fn walk_map(
    reader: &mut BoundsReader,
    checklist: &mut Checklist,
    options: &ValidateOptions,
    len: usize,
) -> Result<()> {
    check_not_overclaiming(reader, len, 2, "map entries")?;
    checklist.enter_map(len)?;
    for _ in 0..len {
        let byte = reader.peek_byte().ok_or(Error::Truncated {
            step: "map key marker",
            actual: 0,
            expected: 1,
        })?;
        match Marker::from_u8(byte) {
            Marker::FixStr(_) | Marker::Str8 | Marker::Str16 | Marker::Str32 => {}
            _ => return Err(Error::InvalidMarker { byte }),
        }
        walk_value(reader, checklist, options)?; // key
        walk_value(reader, checklist, options)?; // value
    }
    Ok(())
}

fn walk_ext(
    reader: &mut BoundsReader,
    checklist: &mut Checklist,
    options: &ValidateOptions,
    len: usize,
) -> Result<()> {
    checklist.check_binary_len(len)?;
    if len.saturating_add(1) > reader.remaining() {
        return Err(Error::InvalidLength {
            step: "extension payload",
            declared: len,
            remaining: reader.remaining(),
        });
    }
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
        }
        ExtType::BigInt => {
            if data.is_empty() {
                return Err(Error::InvalidExtension(
                    "bigint extension payload must not be empty".into(),
                ));
            }
        }
        ExtType::Tabular => walk_tabular(data, checklist, options)?,
        ExtType::Other(_) => {}
    }
    checklist.record_scalar();
    Ok(())
}

/// Walk a tabular block's own header/column layout so that a buffer `validate` accepts cannot
/// later fail `decode` with a malformed-tabular-header error. Mirrors `tabular::from_tabular`'s
/// structure but never materializes a `Value`.
fn walk_tabular(data: &[u8], checklist: &mut Checklist, options: &ValidateOptions) -> Result<()> {
    let mut reader = BoundsReader::new(data);
    let row_count = crate::tabular::validate_header_uint(&mut reader, "tabular row_count")? as usize;
    let column_count =
        crate::tabular::validate_header_uint(&mut reader, "tabular column_count")? as usize;

    for _ in 0..column_count {
        crate::tabular::validate_header_str(&mut reader, "tabular column header")?;
    }

    for _ in 0..column_count {
        let len = crate::tabular::validate_array_header(&mut reader, "tabular column array")?;
        if len != row_count {
            return Err(Error::InvalidExtension(format!(
                "tabular column declared {} rows, header declared {}",
                len, row_count
            )));
        }
        check_not_overclaiming(&reader, len, 1, "tabular column elements")?;
        checklist.enter_array(len)?;
        for _ in 0..row_count {
            walk_value(&mut reader, checklist, options)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_well_formed_nil() {
        let result = validate(&[0xc0], &ValidateOptions::default());
        assert!(result.valid);
    }

    #[test]
    fn rejects_reserved_marker() {
        let result = validate(&[0xc1], &ValidateOptions::default());
        assert!(!result.valid);
    }

    #[test]
    fn rejects_array32_overclaim_before_any_allocation() {
        let result = validate(&[0xdd, 0xff, 0xff, 0xff, 0xff], &ValidateOptions::default());
        assert!(!result.valid);
        assert!(matches!(result.error, Some(Error::InvalidLength { .. })));
    }

    #[test]
    fn valid_buffer_implies_decode_succeeds() {
        let buf = crate::encode::encode(
            &crate::Value::Map(vec![("a".into(), crate::Value::from(1u32))]),
            &crate::encode::EncodeOptions::default(),
        )
        .unwrap();
        assert!(validate(&buf, &ValidateOptions::default()).valid);
        assert!(crate::decode::decode(&buf, &crate::decode::DecodeOptions::default()).is_ok());
    }

    #[test]
    fn valid_tabular_buffer_implies_decode_succeeds() {
        let rows = crate::Value::Array(
            (0..3)
                .map(|i| {
                    crate::Value::Map(vec![
                        ("id".into(), crate::Value::from(i as u32)),
                        ("active".into(), crate::Value::Bool(i % 2 == 0)),
                    ])
                })
                .collect(),
        );
        let buf = crate::encode::encode(&rows, &crate::encode::EncodeOptions::default()).unwrap();
        assert!(validate(&buf, &ValidateOptions::default()).valid);
        let decoded =
            crate::decode::decode(&buf, &crate::decode::DecodeOptions::default()).unwrap();
        assert_eq!(decoded, rows);
    }

    #[test]
    fn rejects_tabular_column_row_count_mismatch() {
        // row_count=2, column_count=1, header "a" (fixstr len 1), column declared as a
        // 1-element fixarray instead of the promised 2.
        let mut payload = vec![0x02, 0x01, 0xa1, b'a', 0x91, 0xc0];
        let mut buf = vec![0xc7, payload.len() as u8, (-1i8) as u8];
        buf.append(&mut payload);
        let result = validate(&buf, &ValidateOptions::default());
        assert!(!result.valid);
        assert!(matches!(result.error, Some(Error::InvalidExtension(_))));
    }
}
