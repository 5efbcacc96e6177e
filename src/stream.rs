//! Stream framing: concatenating/splitting successive top-level values over a byte
//! sink/source. Synchronous and cooperative, no suspension points, no background work.

use std::io::Write;

use crate::bounds::BoundsReader;
use crate::decode::{decode_value, DecodeOptions};
use crate::encode::{encode_value, EncodeOptions};
use crate::error::{Error, Result};
use crate::limits::Checklist;
use crate::value::Value;

/// The outcome of one [`StreamDecoder::read`] call.
#[derive(Clone, Debug, PartialEq)]
pub enum ReadOutcome {
    /// A complete value was decoded.
    Value(Value),
    /// Not enough bytes have been fed yet to complete a value; call
    /// [`StreamDecoder::feed`] and retry.
    Pending,
    /// The source is exhausted and no partial value is pending.
    End,
}

/// Writes successive values to a byte sink with no delimiter beyond each value's own
/// self-describing length.
pub struct StreamEncoder<W> {
    writer: W,
    options: EncodeOptions,
}

impl<W: Write> StreamEncoder<W> {
    pub fn new(writer: W, options: EncodeOptions) -> Self {
        Self { writer, options }
    }

    /// Encode and write one value.
    pub fn write(&mut self, value: &Value) -> Result<()> {
        let mut buf = Vec::new();
        encode_value(value, &mut buf, &self.options)?;
        self.writer.write_all(&buf)?;
        Ok(())
    }

    /// Flush the underlying sink and release it back to the caller.
    pub fn close(mut self) -> Result<W> {
        self.writer.flush()?;
        Ok(self.writer)
    }
}

/// Reads values one at a time out of a byte source fed incrementally via [`StreamDecoder::feed`].
/// Retains the unread prefix across `Pending` returns so a caller can resume mid-value.
pub struct StreamDecoder {
    buf: Vec<u8>,
    options: DecodeOptions,
}

impl StreamDecoder {
    pub fn new(options: DecodeOptions) -> Self {
        Self {
            buf: Vec::new(),
            options,
        }
    }

    /// Append newly-available bytes from the source.
    pub fn feed(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    /// Bytes buffered but not yet consumed by a completed value.
    pub fn buffered(&self) -> usize {
        self.buf.len()
    }

    /// Attempt to decode the next value from whatever has been fed so far.
    ///
    /// A mid-value truncation is reported as [`ReadOutcome::Pending`], not an error: the
    /// unread prefix is left in the internal buffer for the next `feed`/`read` cycle. Any other
    /// decode failure (bad marker, depth exceeded, invalid UTF-8, ...) is a genuine error; it
    /// clears the decoder's buffered state rather than retaining a value that will never parse.
    pub fn read(&mut self) -> Result<ReadOutcome> {
        if self.buf.is_empty() {
            return Ok(ReadOutcome::End);
        }
        let mut reader = BoundsReader::new(&self.buf);
        let mut checklist = Checklist::new(&self.options.limits);
        match decode_value(&mut reader, &mut checklist, &self.options) {
            Ok(value) => {
                let consumed = reader.position();
                self.buf.drain(0..consumed);
                Ok(ReadOutcome::Value(value))
            }
            Err(Error::Truncated { .. }) => Ok(ReadOutcome::Pending),
            Err(e) => {
                self.buf.clear();
                Err(e)
            }
        }
    }
}
