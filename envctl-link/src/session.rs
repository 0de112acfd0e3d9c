use core::fmt::Debug;

use embedded_io::Write;
use heapless::spsc::Consumer;

use crate::{Deframer, MAX_FRAME_LEN, MAX_PAYLOAD_LEN, Message, Packet, PacketId, SessionError};

/// Handles one inbound command.
pub trait Handler<W: Write> {
    /// Error returned by [`Handler::handle`]. Logged by [`Session::run`].
    type Error: From<SessionError<W::Error>> + Debug;

    /// Handles `request`, sending any number of packets through `replies`.
    fn handle(
        &mut self,
        request: Message<'_>,
        replies: &mut Replies<'_, W>,
    ) -> Result<(), Self::Error>;
}

fn write_packet<W: Write>(tx: &mut W, packet: &Packet) -> Result<(), SessionError<W::Error>> {
    let mut frame = [0u8; MAX_FRAME_LEN];
    let n = packet.encode_frame(&mut frame)?;
    tx.write_all(&frame[..n]).map_err(SessionError::Io)?;
    tx.flush().map_err(SessionError::Io)
}

fn log_packet(text: &str) -> Packet {
    let mut end = text.len().min(MAX_PAYLOAD_LEN);
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    Packet::new(PacketId::Logging, &text.as_bytes()[..end])
        .unwrap_or_else(|_| Packet::empty(PacketId::Logging))
}

/// Outbound sink handed to a [`Handler`].
pub struct Replies<'s, W> {
    tx: &'s mut W,
}

impl<W: Write> Replies<'_, W> {
    /// Sends a packet.
    pub fn send(&mut self, packet: &Packet) -> Result<(), SessionError<W::Error>> {
        write_packet(self.tx, packet)
    }

    /// Encodes and sends a message.
    pub fn send_message(&mut self, message: &Message<'_>) -> Result<(), SessionError<W::Error>> {
        self.send(&message.to_packet()?)
    }

    /// Sends a logging packet, truncated to one payload.
    pub fn log(&mut self, text: &str) -> Result<(), SessionError<W::Error>> {
        self.send(&log_packet(text))
    }
}

/// Device side of the ready/command/response cycle.
///
/// Bytes are received through the consumer half of a `heapless::spsc::Queue`
/// whose producer half is fed by the receive interrupt.
pub struct Session<'q, W, const N: usize> {
    tx: W,
    rx: Consumer<'q, u8, N>,
    deframer: Deframer<MAX_FRAME_LEN>,
}

impl<'q, W: Write, const N: usize> Session<'q, W, N> {
    /// Creates a session over a byte sink and a receive queue.
    pub fn new(tx: W, rx: Consumer<'q, u8, N>) -> Self {
        Self {
            tx,
            rx,
            deframer: Deframer::new(),
        }
    }

    /// Releases the byte sink and the receive queue.
    pub fn free(self) -> (W, Consumer<'q, u8, N>) {
        (self.tx, self.rx)
    }

    /// Sends a packet.
    pub fn send(&mut self, packet: &Packet) -> Result<(), SessionError<W::Error>> {
        write_packet(&mut self.tx, packet)
    }

    /// Encodes and sends a message.
    pub fn send_message(&mut self, message: &Message<'_>) -> Result<(), SessionError<W::Error>> {
        self.send(&message.to_packet()?)
    }

    /// Sends a logging packet, truncated to one payload.
    pub fn log(&mut self, text: &str) -> Result<(), SessionError<W::Error>> {
        self.send(&log_packet(text))
    }

    /// Consumes queued bytes until a valid packet completes or the queue runs dry.
    ///
    /// Invalid frames are dropped.
    pub fn poll_packet(&mut self) -> Option<Packet> {
        while let Some(byte) = self.rx.dequeue() {
            match self.deframer.push(byte) {
                Some(Ok(packet)) => return Some(packet),
                Some(Err(e)) => log::warn!("dropping frame: {e}"),
                None => {}
            }
        }
        None
    }

    /// Blocks until a valid packet is received.
    pub fn receive(&mut self) -> Packet {
        loop {
            if let Some(packet) = self.poll_packet() {
                return packet;
            }
            core::hint::spin_loop();
        }
    }

    /// Announces readiness, receives one command and hands it to `handler`.
    pub fn serve_once<H: Handler<W>>(&mut self, handler: &mut H) -> Result<(), H::Error> {
        self.send(&Packet::empty(PacketId::ResponseReadyRequest))?;
        loop {
            let packet = self.receive();
            log::debug!("handling packet {:?}", packet.id());
            match Message::from_packet(&packet) {
                Ok(request) => return handler.handle(request, &mut Replies { tx: &mut self.tx }),
                Err(e) => log::warn!("dropping packet: {e}"),
            }
        }
    }

    /// Serves commands forever. Handler errors are logged and the cycle restarts.
    pub fn run<H: Handler<W>>(&mut self, handler: &mut H) -> ! {
        loop {
            if let Err(e) = self.serve_once(handler) {
                log::warn!("command failed: {e:?}");
            }
        }
    }
}
