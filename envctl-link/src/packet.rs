use heapless::Vec;

use crate::{PacketError, PacketId, checksum, cobs};

/// Identifier, total length and payload length.
pub const HEADER_LEN: usize = 3;
/// Trailing checksum.
pub const CRC_LEN: usize = 2;
/// Length of a packet without payload.
pub const MIN_PACKET_LEN: usize = HEADER_LEN + CRC_LEN;
/// Largest serialized packet; the total length travels in one byte.
pub const MAX_PACKET_LEN: usize = u8::MAX as usize;
/// Largest payload.
pub const MAX_PAYLOAD_LEN: usize = MAX_PACKET_LEN - MIN_PACKET_LEN;
/// Largest COBS frame, delimiter included.
pub const MAX_FRAME_LEN: usize = cobs::max_encoded_len(MAX_PACKET_LEN);

/// A protocol packet.
///
/// `PacketId::Unknown` values that name a known identifier are stored as that identifier,
/// so a packet decodes back to the id it holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Packet {
    id: PacketId,
    payload: Vec<u8, MAX_PAYLOAD_LEN>,
}

fn canonical(id: PacketId) -> PacketId {
    PacketId::from(u8::from(id))
}

impl Packet {
    /// Creates a packet, failing if the payload exceeds [`MAX_PAYLOAD_LEN`].
    pub fn new(id: PacketId, payload: &[u8]) -> Result<Self, PacketError> {
        Ok(Self {
            id: canonical(id),
            payload: Vec::from_slice(payload).map_err(|_| PacketError::PayloadTooLong)?,
        })
    }

    /// Creates a packet without payload.
    pub fn empty(id: PacketId) -> Self {
        Self {
            id: canonical(id),
            payload: Vec::new(),
        }
    }

    /// Packet identifier.
    pub fn id(&self) -> PacketId {
        self.id
    }

    /// Payload bytes.
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Serialized length.
    pub fn total_len(&self) -> usize {
        MIN_PACKET_LEN + self.payload.len()
    }

    /// Writes the packet into `buf`, returning the number of bytes written.
    pub fn serialize(&self, buf: &mut [u8]) -> Result<usize, PacketError> {
        let total = self.total_len();
        let buf = buf.get_mut(..total).ok_or(PacketError::BufferTooSmall)?;
        buf[0] = self.id.into();
        buf[1] = total as u8;
        buf[2] = self.payload.len() as u8;
        buf[HEADER_LEN..total - CRC_LEN].copy_from_slice(&self.payload);
        let crc = checksum(&buf[..total - CRC_LEN]);
        buf[total - CRC_LEN..].copy_from_slice(&crc.to_le_bytes());
        Ok(total)
    }

    /// Serialized packet.
    pub fn to_bytes(&self) -> Vec<u8, MAX_PACKET_LEN> {
        let mut buf = [0u8; MAX_PACKET_LEN];
        let mut out = Vec::new();
        // payload length is bounded at construction, so neither step can fail
        if let Ok(n) = self.serialize(&mut buf) {
            let _ = out.extend_from_slice(&buf[..n]);
        }
        out
    }

    /// Parses a serialized packet.
    ///
    /// Input shorter than [`MIN_PACKET_LEN`], or whose length fields disagree with the
    /// input length, is rejected with [`PacketError::LengthMismatch`]; a wrong checksum
    /// with [`PacketError::ChecksumMismatch`].
    pub fn deserialize(bytes: &[u8]) -> Result<Self, PacketError> {
        let len = bytes.len();
        if len < MIN_PACKET_LEN || len > MAX_PACKET_LEN {
            return Err(PacketError::LengthMismatch);
        }
        if bytes[1] as usize != len || MIN_PACKET_LEN + bytes[2] as usize != len {
            return Err(PacketError::LengthMismatch);
        }
        let crc = u16::from_le_bytes([bytes[len - 2], bytes[len - 1]]);
        if checksum(&bytes[..len - CRC_LEN]) != crc {
            return Err(PacketError::ChecksumMismatch);
        }
        Self::new(PacketId::from(bytes[0]), &bytes[HEADER_LEN..len - CRC_LEN])
    }

    /// Serializes and COBS-encodes the packet into `frame`, delimiter included.
    pub fn encode_frame(&self, frame: &mut [u8]) -> Result<usize, PacketError> {
        let mut buf = [0u8; MAX_PACKET_LEN];
        let n = self.serialize(&mut buf)?;
        Ok(cobs::encode(&buf[..n], frame)?)
    }

    /// Decodes a COBS frame (with or without delimiter) and parses the packet in it.
    pub fn decode_frame(frame: &[u8]) -> Result<Self, PacketError> {
        let mut buf = [0u8; MAX_FRAME_LEN];
        let n = cobs::decode(frame, &mut buf)?;
        Self::deserialize(&buf[..n])
    }
}
