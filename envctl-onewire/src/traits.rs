use crate::{
    ONEWIRE_MATCH_ROM_CMD, ONEWIRE_READ_ROM_CMD, ONEWIRE_SKIP_ROM_CMD, OneWireResult, RomAddress,
};

/// A 1-Wire bus master.
///
/// Implementors provide the reset pulse and single bit time slots; byte transfers, ROM
/// addressing and ROM reads are built on top of them.
pub trait OneWire {
    /// Error of the underlying pin or bridge.
    type BusError;

    /// Resets the 1-Wire bus and waits for a presence pulse.
    ///
    /// # Errors
    /// Returns [`OneWireError::NoDevicePresent`](crate::OneWireError::NoDevicePresent) if no device
    /// pulled the line low during the presence window.
    fn reset(&mut self) -> OneWireResult<(), Self::BusError>;

    /// Writes a single bit to the 1-Wire bus.
    fn write_bit(&mut self, bit: bool) -> OneWireResult<(), Self::BusError>;

    /// Reads a single bit from the 1-Wire bus.
    fn read_bit(&mut self) -> OneWireResult<bool, Self::BusError>;

    /// Writes a byte to the 1-Wire bus, least significant bit first.
    fn write_byte(&mut self, byte: u8) -> OneWireResult<(), Self::BusError> {
        for i in 0..8 {
            self.write_bit((byte >> i) & 0x1 == 0x1)?;
        }
        Ok(())
    }

    /// Reads a byte from the 1-Wire bus, least significant bit first.
    fn read_byte(&mut self) -> OneWireResult<u8, Self::BusError> {
        let mut byte = 0;
        for i in 0..8 {
            if self.read_bit()? {
                byte |= 1 << i;
            }
        }
        Ok(byte)
    }

    /// Writes every byte of `bytes` in order.
    fn write_bytes(&mut self, bytes: &[u8]) -> OneWireResult<(), Self::BusError> {
        for &b in bytes {
            self.write_byte(b)?;
        }
        Ok(())
    }

    /// Fills `buf` with bytes read from the bus.
    fn read_bytes(&mut self, buf: &mut [u8]) -> OneWireResult<(), Self::BusError> {
        for b in buf.iter_mut() {
            *b = self.read_byte()?;
        }
        Ok(())
    }

    /// Resets the bus and selects the device with ROM `rom` (match ROM), or every device
    /// when `rom` is `None` (skip ROM).
    ///
    /// Reads after a skip ROM are only meaningful with a single device on the bus.
    fn address(&mut self, rom: Option<&RomAddress>) -> OneWireResult<(), Self::BusError> {
        self.reset()?;
        match rom {
            Some(rom) => {
                self.write_byte(ONEWIRE_MATCH_ROM_CMD)?;
                self.write_bytes(rom.as_bytes())
            }
            None => self.write_byte(ONEWIRE_SKIP_ROM_CMD),
        }
    }

    /// Reads the ROM address of the only device on the bus.
    ///
    /// The result is meaningless on a bus with more than one device, where the CRC check
    /// will almost always fail.
    fn read_rom(&mut self) -> OneWireResult<RomAddress, Self::BusError> {
        self.reset()?;
        self.write_byte(ONEWIRE_READ_ROM_CMD)?;
        let mut rom = [0; 8];
        self.read_bytes(&mut rom)?;
        RomAddress::validate(rom)
    }
}

impl<T: OneWire + ?Sized> OneWire for &mut T {
    type BusError = T::BusError;

    fn reset(&mut self) -> OneWireResult<(), Self::BusError> {
        (**self).reset()
    }

    fn write_bit(&mut self, bit: bool) -> OneWireResult<(), Self::BusError> {
        (**self).write_bit(bit)
    }

    fn read_bit(&mut self) -> OneWireResult<bool, Self::BusError> {
        (**self).read_bit()
    }

    fn write_byte(&mut self, byte: u8) -> OneWireResult<(), Self::BusError> {
        (**self).write_byte(byte)
    }

    fn read_byte(&mut self) -> OneWireResult<u8, Self::BusError> {
        (**self).read_byte()
    }
}
