//! BTOON: a MessagePack-compatible binary codec with a private extension type that re-encodes
//! uniform arrays-of-maps as a column-oriented block.
//!
//! The wire format is bit-exact MessagePack (see [`marker`]) plus three reserved extension
//! types: `0` (millisecond [`Value::Date`]), `1` ([`Value::BigInt`], two's-complement
//! big-endian), and `-1` (the tabular block, entirely transparent to decoders that don't
//! know about it, it still parses as an opaque `Extension`).
//!
//! ```
//! use btoon::{decode, encode, DecodeOptions, EncodeOptions, Value};
//!
//! let value = Value::Map(vec![("hello".into(), Value::from("world"))]);
//! let bytes = encode(&value, &EncodeOptions::default()).unwrap();
//! let back = decode(&bytes, &DecodeOptions::default()).unwrap();
//! assert_eq!(value, back);
//! ```

mod bounds;
pub mod compress;
mod decode;
mod encode;
mod error;
mod integer;
mod limits;
mod marker;
mod stream;
mod tabular;
mod validator;
mod value;
mod value_ref;

pub use compress::{CompressionError, Compressor};
pub use decode::{decode, decode_ref, DecodeOptions};
pub use encode::{encode, EncodeOptions};
pub use error::{Error, NoValidate, Result, Validate, ValidationResult};
pub use integer::Integer;
pub use limits::Limits;
pub use marker::{ExtType, Marker};
pub use stream::{ReadOutcome, StreamDecoder, StreamEncoder};
pub use tabular::is_tabular;
pub use validator::{validate, ValidateOptions};
pub use value::Value;
pub use value_ref::ValueRef;

/// Encode `value`, then compress the result with `compressor`, framing it as
/// `<algo_tag: u8><original_len: u32 BE><compressed bytes>`.
pub fn encode_compressed(
    value: &Value,
    options: &EncodeOptions,
    compressor: &dyn Compressor,
) -> Result<Vec<u8>> {
    let raw = encode::encode(value, options)?;
    let compressed = compressor.compress(&raw)?;
    Ok(compress::frame(
        compressor.algorithm_tag(),
        raw.len() as u32,
        &compressed,
    ))
}

/// Reverse of [`encode_compressed`]: unframe, decompress with `compressor`, then decode.
///
/// Returns an error if the framed algorithm tag doesn't match `compressor.algorithm_tag()`.
pub fn decode_compressed(
    data: &[u8],
    options: &DecodeOptions,
    compressor: &dyn Compressor,
) -> Result<Value> {
    let (algo_tag, original_len, body) = compress::unframe(data)?;
    if algo_tag != compressor.algorithm_tag() {
        return Err(Error::Compression(CompressionError::UnknownAlgorithm(
            algo_tag,
        )));
    }
    let raw = compressor.decompress(body, original_len)?;
    decode::decode(&raw, options)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_a_nested_value() {
        let value = Value::Array(vec![
            Value::Nil,
            Value::Bool(true),
            Value::from(-42i32),
            Value::from("text"),
            Value::Map(vec![("k".into(), Value::from(1u32))]),
        ]);
        let bytes = encode(&value, &EncodeOptions::default()).unwrap();
        assert_eq!(decode(&bytes, &DecodeOptions::default()).unwrap(), value);
    }

    #[cfg(feature = "zstd")]
    #[test]
    fn round_trips_through_compression() {
        let value = Value::from("a fairly compressible string ".repeat(16).as_str());
        let compressor = compress::zstd::ZstdCompressor::default();
        let framed = encode_compressed(&value, &EncodeOptions::default(), &compressor).unwrap();
        let back = decode_compressed(&framed, &DecodeOptions::default(), &compressor).unwrap();
        assert_eq!(back, value);
    }
}
