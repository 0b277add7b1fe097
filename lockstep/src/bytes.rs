//! Utilities for decoding from and encoding into bytes.
//!
//! [`ByteWriter`] and [`ByteReader`] wrap a `&mut [u8]` or `&[u8]` and keep
//! track of the current position; [`ToBytes`] and [`FromBytes`] are
//! implemented by everything that crosses the air or the UART. The protocol
//! transmits multi-byte integers MSB first, so the integer helpers use
//! big-endian byte order.
//!
//! [`ToBytes`]: trait.ToBytes.html
//! [`FromBytes`]: trait.FromBytes.html
//! [`ByteWriter`]: struct.ByteWriter.html
//! [`ByteReader`]: struct.ByteReader.html

use crate::Error;
use core::mem;

/// Wrapper around a byte slice that can be used to encode data into bytes.
///
/// All `write_*` methods return `Error::Eof` when the underlying buffer is
/// full.
pub struct ByteWriter<'a>(&'a mut [u8]);

impl<'a> ByteWriter<'a> {
    /// Creates a writer that will write to `buf`.
    pub fn new(buf: &'a mut [u8]) -> Self {
        ByteWriter(buf)
    }

    /// Returns the number of bytes that can be written to `self` until it is
    /// full.
    pub fn space_left(&self) -> usize {
        self.0.len()
    }

    /// Writes a single byte to `self`.
    pub fn write_u8(&mut self, byte: u8) -> Result<(), Error> {
        let this = mem::replace(&mut self.0, &mut []);
        match this.split_first_mut() {
            Some((first, rest)) => {
                *first = byte;
                self.0 = rest;
                Ok(())
            }
            None => Err(Error::Eof),
        }
    }

    /// Writes all bytes from `other` to `self`.
    ///
    /// When `self` does not have enough space left, an error is returned and
    /// `self` is not modified.
    pub fn write_slice(&mut self, other: &[u8]) -> Result<(), Error> {
        if self.space_left() < other.len() {
            return Err(Error::Eof);
        }
        self.0[..other.len()].copy_from_slice(other);
        let this = mem::replace(&mut self.0, &mut []);
        self.0 = &mut this[other.len()..];
        Ok(())
    }

    /// Writes a `u32` to `self`, using big-endian byte order.
    pub fn write_u32_be(&mut self, value: u32) -> Result<(), Error> {
        self.write_slice(&value.to_be_bytes())
    }
}

/// Allows reading values from a borrowed byte slice.
pub struct ByteReader<'a>(&'a [u8]);

impl<'a> ByteReader<'a> {
    /// Creates a new `ByteReader` that will read from the given byte slice.
    pub fn new(bytes: &'a [u8]) -> Self {
        ByteReader(bytes)
    }

    /// Returns the number of bytes that can still be read from `self`.
    pub fn bytes_left(&self) -> usize {
        self.0.len()
    }

    /// Returns whether `self` is at the end of the underlying buffer.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Reads a byte slice of length `len` from `self`.
    ///
    /// If `self` contains less than `len` bytes, `Error::Eof` is returned and
    /// `self` is not modified.
    pub fn read_slice(&mut self, len: usize) -> Result<&'a [u8], Error> {
        if self.bytes_left() < len {
            return Err(Error::Eof);
        }
        let (slice, rest) = self.0.split_at(len);
        self.0 = rest;
        Ok(slice)
    }

    /// Reads a fixed-size byte array from `self`.
    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N], Error> {
        let mut buf = [0; N];
        buf.copy_from_slice(self.read_slice(N)?);
        Ok(buf)
    }

    /// Reads a single byte from `self`.
    pub fn read_u8(&mut self) -> Result<u8, Error> {
        Ok(self.read_array::<1>()?[0])
    }

    /// Reads a `u32` from `self`, using big-endian byte order.
    pub fn read_u32_be(&mut self) -> Result<u32, Error> {
        Ok(u32::from_be_bytes(self.read_array()?))
    }
}

/// Trait for encoding a value into a byte buffer.
pub trait ToBytes {
    /// Converts `self` to bytes and writes them into `writer`, advancing
    /// `writer` to point past the encoded value.
    fn to_bytes(&self, writer: &mut ByteWriter<'_>) -> Result<(), Error>;
}

/// Trait for decoding values from a byte slice.
pub trait FromBytes<'a>: Sized {
    /// Decodes a `Self` from a byte slice, advancing `bytes` to point past
    /// the data that was read.
    fn from_bytes(bytes: &mut ByteReader<'a>) -> Result<Self, Error>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writer_fills_exactly() {
        let mut buf = [0; 5];
        let mut writer = ByteWriter::new(&mut buf);
        writer.write_u32_be(0x6547_A1B0).unwrap();
        assert_eq!(writer.space_left(), 1);
        writer.write_u8(0x2A).unwrap();
        assert_eq!(writer.write_u8(0xFF), Err(Error::Eof));
        assert_eq!(buf, [0x65, 0x47, 0xA1, 0xB0, 0x2A]);
    }

    #[test]
    fn writer_rejects_oversized_slice() {
        let mut buf = [0xEE; 2];
        let mut writer = ByteWriter::new(&mut buf);
        assert_eq!(writer.write_slice(&[1, 2, 3]), Err(Error::Eof));
        // A failed write must not modify the buffer.
        assert_eq!(buf, [0xEE; 2]);
    }

    #[test]
    fn reader_roundtrip() {
        let mut reader = ByteReader::new(&[0x65, 0x47, 0xA1, 0xB0, 0x2A]);
        assert_eq!(reader.read_u32_be().unwrap(), 0x6547_A1B0);
        assert_eq!(reader.bytes_left(), 1);
        assert_eq!(reader.read_u8().unwrap(), 0x2A);
        assert!(reader.is_empty());
        assert_eq!(reader.read_u8(), Err(Error::Eof));
    }
}
