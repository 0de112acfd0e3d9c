use heapless::Vec;

use crate::{Packet, PacketError, cobs::DELIMITER};

/// Accumulates received bytes and yields one packet per delimiter.
///
/// A frame longer than `N` is discarded up to its delimiter and reported as
/// [`PacketError::FrameOverflow`].
#[derive(Debug, Default)]
pub struct Deframer<const N: usize> {
    buf: Vec<u8, N>,
    overflow: bool,
}

impl<const N: usize> Deframer<N> {
    /// Creates an empty deframer.
    pub const fn new() -> Self {
        Self {
            buf: Vec::new(),
            overflow: false,
        }
    }

    /// Feeds one byte. Returns the outcome of a completed frame, if any.
    pub fn push(&mut self, byte: u8) -> Option<Result<Packet, PacketError>> {
        if byte != DELIMITER {
            if self.buf.push(byte).is_err() {
                self.overflow = true;
            }
            return None;
        }
        if core::mem::take(&mut self.overflow) {
            self.buf.clear();
            return Some(Err(PacketError::FrameOverflow));
        }
        if self.buf.is_empty() {
            return None;
        }
        let result = Packet::decode_frame(&self.buf);
        self.buf.clear();
        Some(result)
    }

    /// Discards any partial frame.
    pub fn reset(&mut self) {
        self.buf.clear();
        self.overflow = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{MAX_FRAME_LEN, PacketId};

    fn frame(packet: &Packet) -> ([u8; MAX_FRAME_LEN], usize) {
        let mut buf = [0u8; MAX_FRAME_LEN];
        let n = packet.encode_frame(&mut buf).unwrap();
        (buf, n)
    }

    #[test]
    fn splits_on_delimiters() {
        let a = Packet::empty(PacketId::ReadyRequest);
        let b = Packet::new(PacketId::CmdLightSet, &[1]).unwrap();
        let mut deframer = Deframer::<MAX_FRAME_LEN>::new();
        let mut out = heapless::Vec::<_, 4>::new();
        for packet in [&a, &b] {
            let (buf, n) = frame(packet);
            for &byte in &buf[..n] {
                if let Some(result) = deframer.push(byte) {
                    out.push(result).unwrap();
                }
            }
        }
        assert_eq!(out.as_slice(), &[Ok(a), Ok(b)]);
    }

    #[test]
    fn empty_frames_are_ignored() {
        let mut deframer = Deframer::<16>::new();
        assert_eq!(deframer.push(0), None);
        assert_eq!(deframer.push(0), None);
    }

    #[test]
    fn overflow_recovers_at_delimiter() {
        let mut deframer = Deframer::<8>::new();
        for _ in 0..20 {
            assert_eq!(deframer.push(0x11), None);
        }
        assert_eq!(deframer.push(0), Some(Err(PacketError::FrameOverflow)));
        let packet = Packet::empty(PacketId::Ack);
        let (buf, n) = frame(&packet);
        let results: heapless::Vec<_, 2> =
            buf[..n].iter().filter_map(|&b| deframer.push(b)).collect();
        assert_eq!(results.as_slice(), &[Ok(packet)]);
    }

    #[test]
    fn corrupted_frame_is_reported() {
        let mut deframer = Deframer::<MAX_FRAME_LEN>::new();
        for byte in [0x03, 0x2f, 0x05, 0x00] {
            if let Some(result) = deframer.push(byte) {
                assert!(result.is_err());
                return;
            }
        }
        panic!("frame not completed");
    }
}
