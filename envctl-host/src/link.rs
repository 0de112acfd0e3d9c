use std::collections::VecDeque;
use std::io::{ErrorKind, Read, Write};

use anyhow::{Context, Result};
use envctl_link::{Deframer, MAX_FRAME_LEN, Message, Packet};

/// Host end of the serial link.
pub struct Link<P> {
    port: P,
    deframer: Deframer<MAX_FRAME_LEN>,
    pending: VecDeque<Packet>,
}

impl<P: Read + Write> Link<P> {
    pub fn new(port: P) -> Self {
        Self {
            port,
            deframer: Deframer::new(),
            pending: VecDeque::new(),
        }
    }

    pub fn send(&mut self, message: &Message<'_>) -> Result<()> {
        let packet = message
            .to_packet()
            .map_err(|e| anyhow::anyhow!("cannot encode {message:?}: {e}"))?;
        let mut frame = [0u8; MAX_FRAME_LEN];
        let n = packet
            .encode_frame(&mut frame)
            .map_err(|e| anyhow::anyhow!("cannot frame {:?}: {e}", packet.id()))?;
        log::debug!("sending {:?}", packet.id());
        self.port
            .write_all(&frame[..n])
            .and_then(|_| self.port.flush())
            .context("serial write failed")
    }

    /// Next valid packet, or `None` if the port timed out first.
    pub fn receive(&mut self) -> Result<Option<Packet>> {
        let mut buf = [0u8; 256];
        while self.pending.is_empty() {
            let n = match self.port.read(&mut buf) {
                Ok(0) => return Ok(None),
                Ok(n) => n,
                Err(e) if e.kind() == ErrorKind::TimedOut => return Ok(None),
                Err(e) => return Err(e).context("serial read failed"),
            };
            for &byte in &buf[..n] {
                match self.deframer.push(byte) {
                    Some(Ok(packet)) => self.pending.push_back(packet),
                    Some(Err(e)) => log::warn!("dropping frame: {e}"),
                    None => {}
                }
            }
        }
        Ok(self.pending.pop_front())
    }
}

#[cfg(test)]
mod tests {
    use std::io::{self, Cursor};

    use envctl_link::{PacketId, Sensor};

    use super::*;

    /// Reads from a script, records writes.
    struct FakePort {
        rx: Cursor<Vec<u8>>,
        tx: Vec<u8>,
    }

    impl Read for FakePort {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            match self.rx.read(buf)? {
                0 => Err(io::Error::new(ErrorKind::TimedOut, "timed out")),
                n => Ok(n),
            }
        }
    }

    impl Write for FakePort {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.tx.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn frame(message: Message<'_>) -> Vec<u8> {
        let mut buf = [0u8; MAX_FRAME_LEN];
        let n = message.to_packet().unwrap().encode_frame(&mut buf).unwrap();
        buf[..n].to_vec()
    }

    #[test]
    fn receives_every_frame_of_one_read() {
        let mut rx = vec![0x07, 0x01, 0x00];
        rx.extend(frame(Message::Ready));
        rx.extend(frame(Message::Reading(Sensor::Ph, 6875)));
        let mut link = Link::new(FakePort {
            rx: Cursor::new(rx),
            tx: Vec::new(),
        });
        assert_eq!(
            link.receive().unwrap().map(|p| p.id()),
            Some(PacketId::ResponseReadyRequest)
        );
        let packet = link.receive().unwrap().unwrap();
        assert_eq!(
            Message::from_packet(&packet),
            Ok(Message::Reading(Sensor::Ph, 6875))
        );
        assert!(link.receive().unwrap().is_none());
    }

    #[test]
    fn sends_framed_packets() {
        let mut link = Link::new(FakePort {
            rx: Cursor::new(Vec::new()),
            tx: Vec::new(),
        });
        link.send(&Message::MeasureTemperature).unwrap();
        assert_eq!(link.port.tx, frame(Message::MeasureTemperature));
    }
}
