//! Timestamps exchanged with the attached sensor host.
//!
//! The host reports its real-time clock over UART as five raw bytes
//! `t3 t2 t1 t0 hh`: a big-endian UNIX second count followed by hundredths of
//! a second. The same five bytes travel in the data window of `START_TICK`
//! frames and are forwarded verbatim to every Logger's host.

use crate::bytes::{ByteReader, ByteWriter, FromBytes, ToBytes};
use crate::Error;
use core::fmt;

/// A point of global time: whole UNIX seconds plus hundredths of a second.
#[derive(Copy, Clone, PartialEq, Eq, Default)]
pub struct Timestamp {
    pub secs: u32,
    pub hundredths: u8,
}

impl Timestamp {
    /// Encoded size of a timestamp record.
    pub const LEN: usize = 5;

    /// The all-zero timestamp carried by the initial start-of-logging tick.
    pub const ZERO: Self = Timestamp {
        secs: 0,
        hundredths: 0,
    };

    /// The coordinator signature record, `00 00 00 00 FF`.
    ///
    /// Hundredths of `0xFF` cannot occur in real RTC data, which is how the
    /// attached host recognises that it is wired to the Coordinator rather
    /// than a Logger.
    pub const SIGNATURE: Self = Timestamp {
        secs: 0,
        hundredths: 0xFF,
    };

    pub const fn new(secs: u32, hundredths: u8) -> Self {
        Timestamp { secs, hundredths }
    }

    /// Whether this is the zero-time placeholder of an initial tick.
    pub fn is_zero(&self) -> bool {
        *self == Self::ZERO
    }

    /// Encodes the timestamp as the 5-byte wire record.
    pub fn to_bytes(&self) -> [u8; Self::LEN] {
        let mut buf = [0; Self::LEN];
        let mut writer = ByteWriter::new(&mut buf);
        // Infallible, the buffer is exactly one record long.
        ToBytes::to_bytes(self, &mut writer).unwrap();
        buf
    }

    /// Decodes a 5-byte wire record.
    pub fn from_bytes(bytes: [u8; Self::LEN]) -> Self {
        // Infallible for the same reason.
        FromBytes::from_bytes(&mut ByteReader::new(&bytes)).unwrap()
    }
}

impl ToBytes for Timestamp {
    fn to_bytes(&self, writer: &mut ByteWriter<'_>) -> Result<(), Error> {
        writer.write_u32_be(self.secs)?;
        writer.write_u8(self.hundredths)
    }
}

impl<'a> FromBytes<'a> for Timestamp {
    fn from_bytes(bytes: &mut ByteReader<'a>) -> Result<Self, Error> {
        Ok(Timestamp {
            secs: bytes.read_u32_be()?,
            hundredths: bytes.read_u8()?,
        })
    }
}

impl fmt::Debug for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}s", self.secs, self.hundredths)
    }
}

/// Assembles the RTC records arriving byte-wise over UART.
///
/// There is no framing; the receiver simply counts five bytes, exactly like
/// the host produces them. The assembler runs in the UART interrupt and
/// continuously overwrites, so the most recent complete record always wins
/// and no overflow condition exists.
pub struct RecordAssembler {
    buf: [u8; Timestamp::LEN],
    filled: usize,
}

impl RecordAssembler {
    pub const fn new() -> Self {
        RecordAssembler {
            buf: [0; Timestamp::LEN],
            filled: 0,
        }
    }

    /// Feeds one received byte.
    ///
    /// Returns the completed record on every fifth byte and restarts the
    /// assembly.
    pub fn push(&mut self, byte: u8) -> Option<Timestamp> {
        self.buf[self.filled] = byte;
        self.filled += 1;
        if self.filled == Timestamp::LEN {
            self.filled = 0;
            Some(Timestamp::from_bytes(self.buf))
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_order_is_big_endian() {
        let ts = Timestamp::new(0x6547_A1B0, 0x2A);
        assert_eq!(ts.to_bytes(), [0x65, 0x47, 0xA1, 0xB0, 0x2A]);
        assert_eq!(Timestamp::from_bytes([0x65, 0x47, 0xA1, 0xB0, 0x2A]), ts);
    }

    #[test]
    fn signature_record() {
        assert_eq!(Timestamp::SIGNATURE.to_bytes(), [0, 0, 0, 0, 0xFF]);
        assert!(!Timestamp::SIGNATURE.is_zero());
        assert!(Timestamp::ZERO.is_zero());
    }

    #[test]
    fn assembler_produces_every_fifth_byte() {
        let mut asm = RecordAssembler::new();
        for &b in &[0x65, 0x47, 0xA1, 0xB0] {
            assert_eq!(asm.push(b), None);
        }
        assert_eq!(asm.push(0x2A), Some(Timestamp::new(0x6547_A1B0, 0x2A)));

        // The next record overwrites, nothing is remembered.
        for &b in &[0, 0, 0, 1] {
            assert_eq!(asm.push(b), None);
        }
        assert_eq!(asm.push(0x63), Some(Timestamp::new(1, 0x63)));
    }
}
