use core::fmt;

/// Errors returned by the sync fabric.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum Error {
    /// Received frame is not exactly one frame long.
    InvalidLength,

    /// A field contained an invalid value (eg. a wrong start-of-frame
    /// marker).
    InvalidValue,

    /// The frame checksum did not match; the frame was corrupted in flight.
    Crc,

    /// Unexpectedly reached the end of a buffer while reading or writing.
    Eof,

    /// The radio is in the wrong mode for the requested transfer.
    ///
    /// Transmitting requires PTX, queueing an ACK payload requires PRX. The
    /// caller is expected to fall back instead of wedging the transceiver.
    NotPermitted,

    /// The radio driver failed to apply a configuration.
    Radio,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Error::InvalidLength => "invalid frame length",
            Error::InvalidValue => "invalid value for field",
            Error::Crc => "checksum mismatch",
            Error::Eof => "end of buffer",
            Error::NotPermitted => "transfer not permitted in current radio mode",
            Error::Radio => "radio configuration failed",
        })
    }
}
