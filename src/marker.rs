//! MessagePack format markers. For internal use only.

/// The single leading byte of an encoded value, decoded into its typed length/payload
/// descriptor. See the crate-level docs for the full byte layout.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Marker {
    PosFixInt(u8),
    FixMap(u8),
    FixArray(u8),
    FixStr(u8),
    Nil,
    Reserved,
    False,
    True,
    Bin8,
    Bin16,
    Bin32,
    Ext8,
    Ext16,
    Ext32,
    F32,
    F64,
    UInt8,
    UInt16,
    UInt32,
    UInt64,
    Int8,
    Int16,
    Int32,
    Int64,
    FixExt1,
    FixExt2,
    FixExt4,
    FixExt8,
    FixExt16,
    Str8,
    Str16,
    Str32,
    Array16,
    Array32,
    Map16,
    Map32,
    NegFixInt(i8),
}

impl Marker {
    /// Construct a marker from a single leading byte.
    pub fn from_u8(n: u8) -> Marker {
        match n {
            0x00..=0x7f => Marker::PosFixInt(n),
            0x80..=0x8f => Marker::FixMap(n & 0x0f),
            0x90..=0x9f => Marker::FixArray(n & 0x0f),
            0xa0..=0xbf => Marker::FixStr(n & 0x1f),
            0xc0 => Marker::Nil,
            0xc1 => Marker::Reserved,
            0xc2 => Marker::False,
            0xc3 => Marker::True,
            0xc4 => Marker::Bin8,
            0xc5 => Marker::Bin16,
            0xc6 => Marker::Bin32,
            0xc7 => Marker::Ext8,
            0xc8 => Marker::Ext16,
            0xc9 => Marker::Ext32,
            0xca => Marker::F32,
            0xcb => Marker::F64,
            0xcc => Marker::UInt8,
            0xcd => Marker::UInt16,
            0xce => Marker::UInt32,
            0xcf => Marker::UInt64,
            0xd0 => Marker::Int8,
            0xd1 => Marker::Int16,
            0xd2 => Marker::Int32,
            0xd3 => Marker::Int64,
            0xd4 => Marker::FixExt1,
            0xd5 => Marker::FixExt2,
            0xd6 => Marker::FixExt4,
            0xd7 => Marker::FixExt8,
            0xd8 => Marker::FixExt16,
            0xd9 => Marker::Str8,
            0xda => Marker::Str16,
            0xdb => Marker::Str32,
            0xdc => Marker::Array16,
            0xdd => Marker::Array32,
            0xde => Marker::Map16,
            0xdf => Marker::Map32,
            0xe0..=0xff => Marker::NegFixInt(n as i8),
        }
    }

    /// Convert a marker back into its single-byte wire representation. Assumes any embedded
    /// count/value is already masked to fit.
    pub fn into_u8(self) -> u8 {
        match self {
            Marker::PosFixInt(val) => val,
            Marker::FixMap(len) => 0x80 | len,
            Marker::FixArray(len) => 0x90 | len,
            Marker::FixStr(len) => 0xa0 | len,
            Marker::Nil => 0xc0,
            Marker::Reserved => 0xc1,
            Marker::False => 0xc2,
            Marker::True => 0xc3,
            Marker::Bin8 => 0xc4,
            Marker::Bin16 => 0xc5,
            Marker::Bin32 => 0xc6,
            Marker::Ext8 => 0xc7,
            Marker::Ext16 => 0xc8,
            Marker::Ext32 => 0xc9,
            Marker::F32 => 0xca,
            Marker::F64 => 0xcb,
            Marker::UInt8 => 0xcc,
            Marker::UInt16 => 0xcd,
            Marker::UInt32 => 0xce,
            Marker::UInt64 => 0xcf,
            Marker::Int8 => 0xd0,
            Marker::Int16 => 0xd1,
            Marker::Int32 => 0xd2,
            Marker::Int64 => 0xd3,
            Marker::FixExt1 => 0xd4,
            Marker::FixExt2 => 0xd5,
            Marker::FixExt4 => 0xd6,
            Marker::FixExt8 => 0xd7,
            Marker::FixExt16 => 0xd8,
            Marker::Str8 => 0xd9,
            Marker::Str16 => 0xda,
            Marker::Str32 => 0xdb,
            Marker::Array16 => 0xdc,
            Marker::Array32 => 0xdd,
            Marker::Map16 => 0xde,
            Marker::Map32 => 0xdf,
            Marker::NegFixInt(val) => val as u8,
        }
    }

    /// The byte length of a fixext payload, given the marker. Returns `None` for non-fixext
    /// markers.
    pub fn fixext_len(self) -> Option<usize> {
        match self {
            Marker::FixExt1 => Some(1),
            Marker::FixExt2 => Some(2),
            Marker::FixExt4 => Some(4),
            Marker::FixExt8 => Some(8),
            Marker::FixExt16 => Some(16),
            _ => None,
        }
    }
}

impl From<u8> for Marker {
    fn from(val: u8) -> Marker {
        Marker::from_u8(val)
    }
}

impl From<Marker> for u8 {
    fn from(val: Marker) -> u8 {
        val.into_u8()
    }
}

/// The reserved BTOON extension type tags. Any other `i8` value passes through the decoder as
/// an opaque [`crate::Value::Extension`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtType {
    /// Milliseconds-since-epoch date, always an 8-byte payload.
    Date,
    /// Two's-complement big-endian arbitrary-precision integer.
    BigInt,
    /// The column-oriented tabular block (see `crate::tabular`).
    Tabular,
    /// Any extension type this core does not interpret.
    Other(i8),
}

impl ExtType {
    pub fn from_i8(v: i8) -> ExtType {
        match v {
            0 => ExtType::Date,
            1 => ExtType::BigInt,
            -1 => ExtType::Tabular,
            other => ExtType::Other(other),
        }
    }

    pub fn into_i8(self) -> i8 {
        match self {
            ExtType::Date => 0,
            ExtType::BigInt => 1,
            ExtType::Tabular => -1,
            ExtType::Other(v) => v,
        }
    }
}

impl From<i8> for ExtType {
    fn from(val: i8) -> ExtType {
        ExtType::from_i8(val)
    }
}

impl From<ExtType> for i8 {
    fn from(val: ExtType) -> i8 {
        val.into_i8()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip_every_byte() {
        for n in 0..=255u8 {
            if n == 0xc1 {
                assert_eq!(Marker::from_u8(n), Marker::Reserved);
                continue;
            }
            let marker = Marker::from_u8(n);
            assert_eq!(marker.into_u8(), n, "marker for byte 0x{:02x} didn't round-trip", n);
        }
    }

    #[test]
    fn ext_type_round_trip() {
        for v in [0i8, 1, -1, 42, -42, i8::MIN, i8::MAX] {
            assert_eq!(ExtType::from_i8(v).into_i8(), v);
        }
        assert_eq!(ExtType::from_i8(0), ExtType::Date);
        assert_eq!(ExtType::from_i8(1), ExtType::BigInt);
        assert_eq!(ExtType::from_i8(-1), ExtType::Tabular);
    }
}
