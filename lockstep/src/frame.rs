//! The fixed 8-byte radio frame and its codec.
//!
//! Every packet on the air, whether broadcast tick, poll or ACK payload, is
//! exactly one frame:
//!
//! ```notrust
//! +-------+-------+------------------------+-------+
//! |  SOF  |  CMD  |  D0   D1   D2   D3  D4 |  CRC  |
//! | 0xAA  | (1 B) |    data window (5 B)   | (1 B) |
//! +-------+-------+------------------------+-------+
//! \------------------------------/
//!      CRC-8 is computed over
//!        the first 7 bytes
//! ```
//!
//! The data window carries the global time for `START_TICK` and zeros for
//! everything else. Frames are constructed per transmission and validated per
//! reception; nothing is ever stored.

use crate::bytes::ByteReader;
use crate::crc::crc8;
use crate::rtc::Timestamp;
use crate::utils::HexSlice;
use crate::Error;
use core::fmt;

/// Total length of every radio frame.
pub const FRAME_LEN: usize = 8;

/// Start-of-frame marker.
pub const SOF: u8 = 0xAA;

/// Size of the data window carried by each frame.
pub const DATA_LEN: usize = Timestamp::LEN;

enum_with_unknown! {
    /// Command byte of a frame.
    #[derive(Debug, Copy, Clone, PartialEq, Eq)]
    pub enum Command(u8) {
        /// Broadcast tick, Coordinator → all Loggers. Carries the global
        /// time (zeros on the very first tick).
        StartTick = 0x00,
        /// Global stop, Coordinator → all Loggers.
        Stop = 0x01,
        /// Stop request, Logger → Coordinator. Rides the ACK slot of the
        /// next poll.
        StopRequest = 0x02,
        /// Unicast poll opening an ACK slot for one Logger.
        Poll = 0x03,
    }
}

/// A validated radio frame.
#[derive(Copy, Clone, PartialEq, Eq)]
pub struct Frame {
    command: Command,
    data: [u8; DATA_LEN],
}

impl Frame {
    /// Creates a `START_TICK` frame carrying `time`.
    pub fn start_tick(time: Timestamp) -> Self {
        Frame {
            command: Command::StartTick,
            data: time.to_bytes(),
        }
    }

    /// Creates a global `STOP` frame.
    pub fn stop() -> Self {
        Frame::zero_data(Command::Stop)
    }

    /// Creates a `STOP_REQ` frame for the ACK slot.
    pub fn stop_request() -> Self {
        Frame::zero_data(Command::StopRequest)
    }

    /// Creates a `POLL` frame.
    pub fn poll() -> Self {
        Frame::zero_data(Command::Poll)
    }

    fn zero_data(command: Command) -> Self {
        Frame {
            command,
            data: [0; DATA_LEN],
        }
    }

    pub fn command(&self) -> Command {
        self.command
    }

    /// The data window, decoded as a timestamp.
    pub fn timestamp(&self) -> Timestamp {
        Timestamp::from_bytes(self.data)
    }

    /// Encodes the frame, filling in the trailing CRC.
    pub fn encode(&self) -> [u8; FRAME_LEN] {
        let mut buf = [0; FRAME_LEN];
        buf[0] = SOF;
        buf[1] = self.command.into();
        buf[2..FRAME_LEN - 1].copy_from_slice(&self.data);
        buf[FRAME_LEN - 1] = crc8(&buf[..FRAME_LEN - 1]);
        buf
    }

    /// Decodes and validates a received frame.
    ///
    /// Rejects wrong lengths, a wrong start-of-frame marker, and checksum
    /// mismatches. Callers drop rejected frames silently; a corrupted frame
    /// never answers.
    pub fn decode(bytes: &[u8]) -> Result<Self, Error> {
        if bytes.len() != FRAME_LEN {
            return Err(Error::InvalidLength);
        }
        if crc8(&bytes[..FRAME_LEN - 1]) != bytes[FRAME_LEN - 1] {
            return Err(Error::Crc);
        }

        let mut reader = ByteReader::new(bytes);
        if reader.read_u8()? != SOF {
            return Err(Error::InvalidValue);
        }
        let command = Command::from(reader.read_u8()?);
        let data = reader.read_array()?;
        Ok(Frame { command, data })
    }
}

impl fmt::Debug for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Frame")
            .field("command", &self.command)
            .field("data", &HexSlice(self.data))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initial_tick_on_the_wire() {
        let frame = Frame::start_tick(Timestamp::ZERO);
        assert_eq!(frame.encode(), [0xAA, 0x00, 0, 0, 0, 0, 0, 0x78]);
    }

    #[test]
    fn tick_carries_time() {
        let frame = Frame::start_tick(Timestamp::new(0x6547_A1B0, 0x2A));
        let bytes = frame.encode();
        assert_eq!(bytes, [0xAA, 0x00, 0x65, 0x47, 0xA1, 0xB0, 0x2A, 0x7A]);

        let decoded = Frame::decode(&bytes).unwrap();
        assert_eq!(decoded.command(), Command::StartTick);
        assert_eq!(decoded.timestamp(), Timestamp::new(0x6547_A1B0, 0x2A));
    }

    #[test]
    fn roundtrip_all_commands() {
        for frame in &[
            Frame::start_tick(Timestamp::new(1, 99)),
            Frame::stop(),
            Frame::stop_request(),
            Frame::poll(),
        ] {
            assert_eq!(Frame::decode(&frame.encode()).unwrap(), *frame);
        }
    }

    #[test]
    fn unknown_commands_survive_decoding() {
        let mut bytes = Frame::poll().encode();
        bytes[1] = 0x17;
        bytes[FRAME_LEN - 1] = super::crc8(&bytes[..FRAME_LEN - 1]);
        let frame = Frame::decode(&bytes).unwrap();
        assert_eq!(frame.command(), Command::Unknown(0x17));
    }

    #[test]
    fn corrupted_frames_are_rejected() {
        let good = Frame::start_tick(Timestamp::new(0x6547_A1B0, 0x2A)).encode();

        let mut bad_crc = good;
        bad_crc[FRAME_LEN - 1] ^= 1;
        assert_eq!(Frame::decode(&bad_crc), Err(Error::Crc));

        let mut bad_sof = good;
        bad_sof[0] = 0x55;
        bad_sof[FRAME_LEN - 1] = super::crc8(&bad_sof[..FRAME_LEN - 1]);
        assert_eq!(Frame::decode(&bad_sof), Err(Error::InvalidValue));

        assert_eq!(Frame::decode(&good[..7]), Err(Error::InvalidLength));
        assert_eq!(Frame::decode(&[]), Err(Error::InvalidLength));
    }
}
