//! Library error types.

use std::fmt;

use crate::compress::CompressionError;

/// A BTOON `Result`, normally returning a BTOON [`Error`].
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// An error encountered while validating, encoding, or decoding a BTOON buffer.
#[derive(Clone, Debug, PartialEq)]
pub enum Error {
    /// The input ended in the middle of a value.
    Truncated {
        /// What the decoder was trying to read when it ran out of bytes.
        step: &'static str,
        /// Bytes actually remaining.
        actual: usize,
        /// Bytes required to continue.
        expected: usize,
    },
    /// The leading byte was `0xc1` (reserved) or otherwise not a recognized marker.
    InvalidMarker {
        /// The offending byte.
        byte: u8,
    },
    /// A declared length or count exceeds the bytes remaining in the buffer.
    InvalidLength {
        /// What was being read.
        step: &'static str,
        /// The declared length.
        declared: usize,
        /// Bytes actually remaining.
        remaining: usize,
    },
    /// A string payload was not valid UTF-8 (strict mode only).
    InvalidUtf8,
    /// Nesting depth exceeded the configured maximum.
    DepthExceeded {
        /// The configured limit.
        max: usize,
    },
    /// Buffer size, or a length prefix, exceeded the configured maximum.
    SizeExceeded {
        /// The configured limit.
        max: usize,
        /// The actual (or claimed) size.
        actual: usize,
    },
    /// An array or map count exceeded the configured maximum.
    CountExceeded {
        /// The configured limit.
        max: usize,
        /// The actual (or claimed) count.
        actual: usize,
    },
    /// A typed extension had a malformed payload: wrong length for Date, an empty BigInt, or a
    /// malformed tabular block header.
    InvalidExtension(String),
    /// A value to encode does not fit the wire format (too many elements, bytes, etc).
    EncodeOverflow(String),
    /// Underlying (de)compression codec failure.
    Compression(CompressionError),
    /// The stream encoder/decoder's underlying sink or source failed.
    Io(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Truncated {
                step,
                actual,
                expected,
            } => write!(
                f,
                "truncated input during [{}]: needed {} bytes, had {}",
                step, expected, actual
            ),
            Error::InvalidMarker { byte } => write!(f, "invalid marker byte 0x{:02x}", byte),
            Error::InvalidLength {
                step,
                declared,
                remaining,
            } => write!(
                f,
                "declared length {} during [{}] exceeds {} remaining bytes",
                declared, step, remaining
            ),
            Error::InvalidUtf8 => write!(f, "string payload was not valid UTF-8"),
            Error::DepthExceeded { max } => write!(f, "nesting depth exceeded limit of {}", max),
            Error::SizeExceeded { max, actual } => {
                write!(f, "size {} exceeded limit of {}", actual, max)
            }
            Error::CountExceeded { max, actual } => {
                write!(f, "count {} exceeded limit of {}", actual, max)
            }
            Error::InvalidExtension(msg) => write!(f, "invalid extension payload: {}", msg),
            Error::EncodeOverflow(msg) => write!(f, "value cannot be encoded: {}", msg),
            Error::Compression(err) => write!(f, "compression error: {}", err),
            Error::Io(msg) => write!(f, "I/O error: {}", msg),
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Io(e.to_string())
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Compression(err) => Some(err),
            _ => None,
        }
    }
}

impl From<CompressionError> for Error {
    fn from(e: CompressionError) -> Self {
        Error::Compression(e)
    }
}

/// The outcome of a pre-decode [`crate::validate`] pass.
#[derive(Clone, Debug, PartialEq)]
pub struct ValidationResult {
    pub valid: bool,
    pub error: Option<Error>,
    /// Byte offset into the buffer at which validation failed, if it did.
    pub position: Option<usize>,
}

impl ValidationResult {
    pub fn ok() -> Self {
        Self {
            valid: true,
            error: None,
            position: None,
        }
    }

    pub fn fail(error: Error, position: usize) -> Self {
        Self {
            valid: false,
            error: Some(error),
            position: Some(position),
        }
    }
}

/// A hook for post-decode structural validation. The core never implements a schema language
/// against this trait; it only calls it.
pub trait Validate {
    /// Validation-specific error type.
    type Error: fmt::Display;

    /// Check `value` against whatever rules this validator enforces.
    fn validate(&self, value: &crate::Value) -> std::result::Result<(), Self::Error>;
}

/// A [`Validate`] implementation that accepts every value. The default when no schema layer is
/// plugged in.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoValidate;

impl Validate for NoValidate {
    type Error = std::convert::Infallible;

    fn validate(&self, _value: &crate::Value) -> std::result::Result<(), Self::Error> {
        Ok(())
    }
}
