use core::fmt;

use crate::PacketId;

/// COBS framing errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CobsError {
    /// The destination buffer cannot hold the result.
    BufferTooSmall,
    /// A zero byte was found before the end of the frame.
    UnexpectedZero,
    /// A block code points past the end of the frame.
    Truncated,
}

/// Packet serialization errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PacketError {
    /// Input is shorter than a header and checksum, or its length fields disagree with it.
    LengthMismatch,
    /// The received checksum does not match the contents.
    ChecksumMismatch,
    /// The payload does not fit in a packet.
    PayloadTooLong,
    /// The output buffer cannot hold the packet.
    BufferTooSmall,
    /// A frame exceeded the receive buffer before its delimiter arrived.
    FrameOverflow,
    /// The payload does not have the layout required by the identifier.
    InvalidPayload(PacketId),
    /// Framing error.
    Cobs(CobsError),
}

impl From<CobsError> for PacketError {
    fn from(value: CobsError) -> Self {
        Self::Cobs(value)
    }
}

/// Transport session errors.
#[derive(Debug)]
pub enum SessionError<E> {
    /// Error from the byte sink.
    Io(E),
    /// Error building an outbound packet.
    Packet(PacketError),
}

impl<E> From<PacketError> for SessionError<E> {
    fn from(value: PacketError) -> Self {
        Self::Packet(value)
    }
}

impl fmt::Display for CobsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BufferTooSmall => f.write_str("buffer too small"),
            Self::UnexpectedZero => f.write_str("zero byte inside frame"),
            Self::Truncated => f.write_str("truncated frame"),
        }
    }
}

impl fmt::Display for PacketError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LengthMismatch => f.write_str("packet length mismatch"),
            Self::ChecksumMismatch => f.write_str("packet checksum mismatch"),
            Self::PayloadTooLong => f.write_str("payload too long"),
            Self::BufferTooSmall => f.write_str("buffer too small"),
            Self::FrameOverflow => f.write_str("frame overflow"),
            Self::InvalidPayload(id) => write!(f, "invalid payload for {id:?}"),
            Self::Cobs(e) => write!(f, "framing error: {e}"),
        }
    }
}

impl<E: fmt::Debug> fmt::Display for SessionError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "serial error: {e:?}"),
            Self::Packet(e) => write!(f, "{e}"),
        }
    }
}
