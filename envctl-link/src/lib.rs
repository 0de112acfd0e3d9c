#![no_std]
#![deny(missing_docs)]
//! # envctl-link
//! The serial protocol between the environment controller and its host.
//!
//! A [Packet] is serialized as `[id][total length][payload length][payload][crc16 le]`,
//! checksummed with CRC-16/XMODEM ([checksum]) and framed with COBS ([cobs]) so that a
//! single zero byte delimits frames on the wire.
//!
//! [Message] gives the typed view of a packet, [Deframer] reassembles packets from a
//! byte stream and [Session] runs the device side of the ready/command/response cycle.

pub mod cobs;
mod checksum;
mod deframer;
mod error;
mod id;
mod message;
mod packet;
mod session;

pub use checksum::checksum;
pub use deframer::Deframer;
pub use error::{CobsError, PacketError, SessionError};
pub use id::PacketId;
pub use message::{CalibrationPoint, LightChannel, Message, Sensor};
pub use packet::{
    CRC_LEN, HEADER_LEN, MAX_FRAME_LEN, MAX_PACKET_LEN, MAX_PAYLOAD_LEN, MIN_PACKET_LEN, Packet,
};
pub use session::{Handler, Replies, Session};

/// Serial line speed used by the controller.
pub const BAUD_RATE: u32 = 250_000;
