//! For each of the 256 possible leading marker bytes, feed a minimal well-formed payload and
//! confirm the decoder accepts it, except for the one reserved byte.

use btoon::{decode, DecodeOptions, Marker};

fn minimal_trailing(marker: Marker) -> Vec<u8> {
    match marker {
        Marker::Nil
        | Marker::False
        | Marker::True
        | Marker::PosFixInt(_)
        | Marker::NegFixInt(_)
        | Marker::Reserved => vec![],
        Marker::FixStr(n) => vec![b'x'; n as usize],
        Marker::FixArray(n) => vec![0xc0; n as usize],
        Marker::FixMap(n) => std::iter::repeat([0xa0u8, 0xc0]).take(n as usize).flatten().collect(),
        Marker::Bin8 => vec![0x00],
        Marker::Bin16 => vec![0x00, 0x00],
        Marker::Bin32 => vec![0x00, 0x00, 0x00, 0x00],
        Marker::Ext8 => vec![0x00, 0x05],
        Marker::Ext16 => vec![0x00, 0x00, 0x05],
        Marker::Ext32 => vec![0x00, 0x00, 0x00, 0x00, 0x05],
        Marker::F32 => vec![0x00; 4],
        Marker::F64 => vec![0x00; 8],
        Marker::UInt8 => vec![0x00],
        Marker::UInt16 => vec![0x00, 0x00],
        Marker::UInt32 => vec![0x00; 4],
        Marker::UInt64 => vec![0x00; 8],
        Marker::Int8 => vec![0x00],
        Marker::Int16 => vec![0x00, 0x00],
        Marker::Int32 => vec![0x00; 4],
        Marker::Int64 => vec![0x00; 8],
        Marker::FixExt1 => vec![0x05, 0x00],
        Marker::FixExt2 => vec![0x05, 0x00, 0x00],
        Marker::FixExt4 => [&[0x05u8][..], &[0x00; 4]].concat(),
        Marker::FixExt8 => [&[0x05u8][..], &[0x00; 8]].concat(),
        Marker::FixExt16 => [&[0x05u8][..], &[0x00; 16]].concat(),
        Marker::Str8 => vec![0x00],
        Marker::Str16 => vec![0x00, 0x00],
        Marker::Str32 => vec![0x00; 4],
        Marker::Array16 => vec![0x00, 0x00],
        Marker::Array32 => vec![0x00; 4],
        Marker::Map16 => vec![0x00, 0x00],
        Marker::Map32 => vec![0x00; 4],
    }
}

#[test]
fn every_marker_byte_is_either_accepted_or_rejected_as_reserved() {
    for byte in 0u8..=255 {
        let marker = Marker::from_u8(byte);
        let mut buf = vec![byte];
        buf.extend(minimal_trailing(marker));

        let result = decode(&buf, &DecodeOptions::default());
        if byte == 0xc1 {
            assert!(result.is_err(), "0xc1 must be rejected");
        } else {
            assert!(
                result.is_ok(),
                "marker byte 0x{:02x} ({:?}) should decode with a minimal payload, got {:?}",
                byte,
                marker,
                result
            );
        }
    }
}
