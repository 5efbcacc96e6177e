//! A length-checked cursor over an immutable byte span. Never allocates; every read either
//! returns a borrow into the input or a [`crate::Error::Truncated`].

use byteorder::{BigEndian, ByteOrder};

use crate::error::{Error, Result};

/// A bounds-checked read cursor over `&[u8]`. All multi-byte reads are big-endian; the format
/// never relies on host endianness.
#[derive(Clone, Debug)]
pub struct BoundsReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> BoundsReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    pub fn peek_byte(&self) -> Option<u8> {
        self.data.get(self.pos).copied()
    }

    pub fn read_byte(&mut self, step: &'static str) -> Result<u8> {
        let b = *self
            .data
            .get(self.pos)
            .ok_or(Error::Truncated {
                step,
                actual: 0,
                expected: 1,
            })?;
        self.pos += 1;
        Ok(b)
    }

    pub fn read_bytes(&mut self, n: usize, step: &'static str) -> Result<&'a [u8]> {
        if n > self.remaining() {
            return Err(Error::Truncated {
                step,
                actual: self.remaining(),
                expected: n,
            });
        }
        let slice = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    pub fn skip(&mut self, n: usize, step: &'static str) -> Result<()> {
        self.read_bytes(n, step).map(|_| ())
    }

    pub fn read_u8(&mut self, step: &'static str) -> Result<u8> {
        self.read_byte(step)
    }

    pub fn read_i8(&mut self, step: &'static str) -> Result<i8> {
        self.read_byte(step).map(|b| b as i8)
    }

    pub fn read_u16(&mut self, step: &'static str) -> Result<u16> {
        Ok(BigEndian::read_u16(self.read_bytes(2, step)?))
    }

    pub fn read_u32(&mut self, step: &'static str) -> Result<u32> {
        Ok(BigEndian::read_u32(self.read_bytes(4, step)?))
    }

    pub fn read_u64(&mut self, step: &'static str) -> Result<u64> {
        Ok(BigEndian::read_u64(self.read_bytes(8, step)?))
    }

    pub fn read_i16(&mut self, step: &'static str) -> Result<i16> {
        Ok(BigEndian::read_i16(self.read_bytes(2, step)?))
    }

    pub fn read_i32(&mut self, step: &'static str) -> Result<i32> {
        Ok(BigEndian::read_i32(self.read_bytes(4, step)?))
    }

    pub fn read_i64(&mut self, step: &'static str) -> Result<i64> {
        Ok(BigEndian::read_i64(self.read_bytes(8, step)?))
    }

    pub fn read_f32(&mut self, step: &'static str) -> Result<f32> {
        Ok(BigEndian::read_f32(self.read_bytes(4, step)?))
    }

    pub fn read_f64(&mut self, step: &'static str) -> Result<f64> {
        Ok(BigEndian::read_f64(self.read_bytes(8, step)?))
    }
}
