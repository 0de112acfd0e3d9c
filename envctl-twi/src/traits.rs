/// Data direction of the R/W bit following the 7-bit address.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Master transmits.
    Write = 0,
    /// Master receives.
    Read = 1,
}

/// Byte-level access to a two-wire bus as a master.
pub trait TwoWireBus {
    /// Error type of bus operations.
    type Error;

    /// Generates a (repeated) start condition and addresses `address` for writing.
    ///
    /// On error the implementation has already issued a stop condition.
    fn start_write(&mut self, address: u8) -> Result<(), Self::Error>;

    /// Generates a (repeated) start condition and addresses `address` for reading.
    ///
    /// On error the implementation has already issued a stop condition.
    fn start_read(&mut self, address: u8) -> Result<(), Self::Error>;

    /// Transmits one byte and expects an acknowledge.
    fn write_byte(&mut self, byte: u8) -> Result<(), Self::Error>;

    /// Receives one byte, answering with an acknowledge if `ack` is set.
    fn read_byte(&mut self, ack: bool) -> Result<u8, Self::Error>;

    /// Generates a stop condition and releases the bus.
    fn stop(&mut self);

    /// Transmits every byte of `bytes`.
    fn write(&mut self, bytes: &[u8]) -> Result<(), Self::Error> {
        for &b in bytes {
            self.write_byte(b)?;
        }
        Ok(())
    }

    /// Fills `buf`, acknowledging every byte but the last one.
    fn read(&mut self, buf: &mut [u8]) -> Result<(), Self::Error> {
        let len = buf.len();
        for (i, b) in buf.iter_mut().enumerate() {
            *b = self.read_byte(i + 1 < len)?;
        }
        Ok(())
    }
}

/// An open bus transaction.
///
/// The stop condition is generated exactly once, when the guard is dropped, unless a
/// failed repeated start already released the bus.
pub struct Transaction<'a, B: TwoWireBus> {
    bus: &'a mut B,
    released: bool,
}

impl<'a, B: TwoWireBus> Transaction<'a, B> {
    /// Opens a transaction writing to `address`.
    pub fn begin_write(bus: &'a mut B, address: u8) -> Result<Self, B::Error> {
        bus.start_write(address)?;
        Ok(Self {
            bus,
            released: false,
        })
    }

    /// Opens a transaction reading from `address`.
    pub fn begin_read(bus: &'a mut B, address: u8) -> Result<Self, B::Error> {
        bus.start_read(address)?;
        Ok(Self {
            bus,
            released: false,
        })
    }

    /// Issues a repeated start and addresses `address` in the given direction.
    pub fn restart(&mut self, address: u8, direction: Direction) -> Result<(), B::Error> {
        let res = match direction {
            Direction::Write => self.bus.start_write(address),
            Direction::Read => self.bus.start_read(address),
        };
        if res.is_err() {
            self.released = true;
        }
        res
    }

    /// Transmits one byte.
    pub fn write_byte(&mut self, byte: u8) -> Result<(), B::Error> {
        self.bus.write_byte(byte)
    }

    /// Transmits every byte of `bytes`.
    pub fn write(&mut self, bytes: &[u8]) -> Result<(), B::Error> {
        self.bus.write(bytes)
    }

    /// Receives one byte.
    pub fn read_byte(&mut self, ack: bool) -> Result<u8, B::Error> {
        self.bus.read_byte(ack)
    }

    /// Fills `buf`, not acknowledging the last byte.
    pub fn read(&mut self, buf: &mut [u8]) -> Result<(), B::Error> {
        self.bus.read(buf)
    }

    /// Ends the transaction with a stop condition.
    pub fn end(self) {}
}

impl<B: TwoWireBus> Drop for Transaction<'_, B> {
    fn drop(&mut self) {
        if !self.released {
            self.bus.stop();
        }
    }
}
