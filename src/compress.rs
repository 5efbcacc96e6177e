//! Pluggable (de)compression for the `compress: bool` encode/decode option.
//!
//! The core only commits to a trait and the wire envelope
//! (`<algo_tag: u8><original_len: u32 BE><compressed bytes>`); callers may bring their own
//! [`Compressor`]. Three real backends ship behind feature flags so the option is usable out of
//! the box: `zstd` (via `zstd-safe`), `zlib` (via `flate2`), and `lz4` (via `lz4_flex`).

use std::fmt;

/// The compression algorithm identifier for no compression at all.
pub const ALGORITHM_NONE: u8 = 0;
/// The compression algorithm identifier for `zstandard`.
pub const ALGORITHM_ZSTD: u8 = 1;
/// The compression algorithm identifier for `zlib` (DEFLATE).
pub const ALGORITHM_ZLIB: u8 = 2;
/// The compression algorithm identifier for `lz4` (block format).
pub const ALGORITHM_LZ4: u8 = 3;

/// Failure from an underlying (de)compression codec.
#[derive(Debug, Clone)]
pub enum CompressionError {
    /// The decompressed size would exceed the caller's configured maximum.
    ExceededSize { max: usize, actual: usize },
    /// An unrecognized algorithm tag was found in the compression envelope.
    UnknownAlgorithm(u8),
    /// The envelope header itself was malformed or truncated.
    BadHeader(&'static str),
    /// The underlying codec reported a failure.
    Codec(String),
}

impl fmt::Display for CompressionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompressionError::ExceededSize { max, actual } => write!(
                f,
                "decompressed size {} exceeds configured maximum of {}",
                actual, max
            ),
            CompressionError::UnknownAlgorithm(tag) => {
                write!(f, "unrecognized compression algorithm tag {}", tag)
            }
            CompressionError::BadHeader(msg) => write!(f, "malformed compression header: {}", msg),
            CompressionError::Codec(msg) => write!(f, "codec failure: {}", msg),
        }
    }
}

impl std::error::Error for CompressionError {}

/// A (de)compression backend over byte spans. `compress`/`decompress` operate on whole buffers;
/// there is no streaming compression API, the envelope is framed per encoded value.
pub trait Compressor {
    /// The one-byte algorithm tag written into the compression envelope.
    fn algorithm_tag(&self) -> u8;

    /// Compress `src`, returning the compressed bytes (without the envelope header).
    fn compress(&self, src: &[u8]) -> Result<Vec<u8>, CompressionError>;

    /// Decompress `src` into exactly `expected_len` bytes, or fail.
    fn decompress(&self, src: &[u8], expected_len: u32) -> Result<Vec<u8>, CompressionError>;
}

/// Prefix `compressed` with the `<algo_tag: u8><original_len: u32 BE>` envelope.
pub fn frame(algo_tag: u8, original_len: u32, compressed: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(5 + compressed.len());
    out.push(algo_tag);
    out.extend_from_slice(&original_len.to_be_bytes());
    out.extend_from_slice(compressed);
    out
}

/// Split a framed buffer back into `(algo_tag, original_len, compressed_bytes)`.
pub fn unframe(buf: &[u8]) -> Result<(u8, u32, &[u8]), CompressionError> {
    if buf.len() < 5 {
        return Err(CompressionError::BadHeader(
            "buffer shorter than the 5-byte compression envelope",
        ));
    }
    let algo_tag = buf[0];
    let original_len = u32::from_be_bytes([buf[1], buf[2], buf[3], buf[4]]);
    Ok((algo_tag, original_len, &buf[5..]))
}

#[cfg(feature = "zstd")]
pub mod zstd {
    //! A [`Compressor`](super::Compressor) backed by `zstd-safe`, using a thread-local
    //! compression/decompression context so repeated calls don't re-allocate a fresh one.

    use std::cell::RefCell;

    use super::{CompressionError, Compressor, ALGORITHM_ZSTD};

    thread_local! {
        static CCTX: RefCell<zstd_safe::CCtx<'static>> = RefCell::new(zstd_safe::CCtx::create());
        static DCTX: RefCell<zstd_safe::DCtx<'static>> = RefCell::new(zstd_safe::DCtx::create());
    }

    /// Zstandard compression at a configurable level (1-22; higher is slower and smaller).
    #[derive(Clone, Copy, Debug)]
    pub struct ZstdCompressor {
        pub level: i32,
    }

    impl ZstdCompressor {
        pub fn new(level: i32) -> Self {
            Self { level }
        }
    }

    impl Default for ZstdCompressor {
        fn default() -> Self {
            Self { level: 3 }
        }
    }

    impl Compressor for ZstdCompressor {
        fn algorithm_tag(&self) -> u8 {
            ALGORITHM_ZSTD
        }

        fn compress(&self, src: &[u8]) -> Result<Vec<u8>, CompressionError> {
            CCTX.with_borrow_mut(|ctx| {
                let bound = zstd_safe::compress_bound(src.len());
                let mut out = vec![0u8; bound];
                let written = ctx
                    .compress(&mut out, src, self.level)
                    .map_err(|code| CompressionError::Codec(zstd_safe::get_error_name(code).to_string()))?;
                out.truncate(written);
                Ok(out)
            })
        }

        fn decompress(&self, src: &[u8], expected_len: u32) -> Result<Vec<u8>, CompressionError> {
            DCTX.with_borrow_mut(|ctx| {
                let mut out = vec![0u8; expected_len as usize];
                let written = ctx
                    .decompress(&mut out, src)
                    .map_err(|code| CompressionError::Codec(zstd_safe::get_error_name(code).to_string()))?;
                if written != expected_len as usize {
                    return Err(CompressionError::BadHeader(
                        "decompressed size didn't match the envelope's original_len",
                    ));
                }
                Ok(out)
            })
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn round_trip() {
            let codec = ZstdCompressor::default();
            let data = b"the quick brown fox jumps over the lazy dog".repeat(8);
            let compressed = codec.compress(&data).unwrap();
            let out = codec.decompress(&compressed, data.len() as u32).unwrap();
            assert_eq!(out, data);
        }
    }
}

#[cfg(feature = "zlib")]
pub mod zlib {
    //! A [`Compressor`](super::Compressor) backed by `flate2`'s zlib (DEFLATE) implementation.

    use std::io::{Read, Write};

    use flate2::read::ZlibDecoder;
    use flate2::write::ZlibEncoder;
    use flate2::Compression;

    use super::{CompressionError, Compressor, ALGORITHM_ZLIB};

    /// DEFLATE/zlib compression at a configurable level (0-9).
    #[derive(Clone, Copy, Debug)]
    pub struct ZlibCompressor {
        pub level: u32,
    }

    impl ZlibCompressor {
        pub fn new(level: u32) -> Self {
            Self { level }
        }
    }

    impl Default for ZlibCompressor {
        fn default() -> Self {
            Self { level: 6 }
        }
    }

    impl Compressor for ZlibCompressor {
        fn algorithm_tag(&self) -> u8 {
            ALGORITHM_ZLIB
        }

        fn compress(&self, src: &[u8]) -> Result<Vec<u8>, CompressionError> {
            let mut enc = ZlibEncoder::new(Vec::new(), Compression::new(self.level));
            enc.write_all(src)
                .map_err(|e| CompressionError::Codec(e.to_string()))?;
            enc.finish().map_err(|e| CompressionError::Codec(e.to_string()))
        }

        fn decompress(&self, src: &[u8], expected_len: u32) -> Result<Vec<u8>, CompressionError> {
            let mut dec = ZlibDecoder::new(src);
            let mut out = Vec::with_capacity(expected_len as usize);
            dec.read_to_end(&mut out)
                .map_err(|e| CompressionError::Codec(e.to_string()))?;
            if out.len() != expected_len as usize {
                return Err(CompressionError::BadHeader(
                    "decompressed size didn't match the envelope's original_len",
                ));
            }
            Ok(out)
        }
    }

}

#[cfg(feature = "lz4")]
pub mod lz4 {
    //! A [`Compressor`](super::Compressor) backed by `lz4_flex`'s pure-Rust block format.

    use super::{CompressionError, Compressor, ALGORITHM_LZ4};

    /// LZ4 block-format compression. There is no level knob in the block API; `lz4_flex` always
    /// compresses at its single supported speed/ratio tradeoff.
    #[derive(Clone, Copy, Debug, Default)]
    pub struct Lz4Compressor;

    impl Compressor for Lz4Compressor {
        fn algorithm_tag(&self) -> u8 {
            ALGORITHM_LZ4
        }

        fn compress(&self, src: &[u8]) -> Result<Vec<u8>, CompressionError> {
            Ok(lz4_flex::block::compress(src))
        }

        fn decompress(&self, src: &[u8], expected_len: u32) -> Result<Vec<u8>, CompressionError> {
            lz4_flex::block::decompress(src, expected_len as usize)
                .map_err(|e| CompressionError::Codec(e.to_string()))
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn round_trip() {
            let codec = Lz4Compressor;
            let data = b"the quick brown fox jumps over the lazy dog".repeat(8);
            let compressed = codec.compress(&data).unwrap();
            let out = codec.decompress(&compressed, data.len() as u32).unwrap();
            assert_eq!(out, data);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_round_trips() {
        let buf = frame(7, 42, &[1, 2, 3]);
        let (tag, len, body) = unframe(&buf).unwrap();
        assert_eq!(tag, 7);
        assert_eq!(len, 42);
        assert_eq!(body, &[1, 2, 3]);
    }

    #[test]
    fn unframe_rejects_short_buffers() {
        assert!(unframe(&[1, 2, 3]).is_err());
    }
}
