use core::fmt;

use crate::{OneWireCrc, OneWireError, OneWireResult};

/// 64-bit registration number of a 1-Wire device.
///
/// | Byte | Description |
/// |------|-------------|
/// | 0 | Family code (e.g., 0x28 for DS18B20) |
/// | 1-6 | Serial number |
/// | 7 | CRC-8 (`0b1_0011_0001` poly) of bytes 0-6 |
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RomAddress([u8; 8]);

impl RomAddress {
    /// Wraps the given bytes without checking them.
    pub const fn from_bytes_unchecked(bytes: [u8; 8]) -> Self {
        Self(bytes)
    }

    /// Builds an address from the family code and serial number, computing the CRC byte.
    pub fn with_serial(family: u8, serial: [u8; 6]) -> Self {
        let mut bytes = [0; 8];
        bytes[0] = family;
        bytes[1..7].copy_from_slice(&serial);
        bytes[7] = OneWireCrc::compute(&bytes[..7]);
        Self(bytes)
    }

    /// Validates the CRC byte and the family code of `bytes`.
    pub fn validate<E>(bytes: [u8; 8]) -> OneWireResult<Self, E> {
        if !OneWireCrc::validate(&bytes) {
            Err(OneWireError::InvalidCrc)
        } else if bytes[0] == 0 {
            Err(OneWireError::InvalidFamilyCode)
        } else {
            Ok(Self(bytes))
        }
    }

    /// Returns `true` if the CRC byte matches and the family code is non-zero.
    pub fn is_valid(&self) -> bool {
        Self::validate::<()>(self.0).is_ok()
    }

    /// Family code of the device.
    pub fn family(&self) -> u8 {
        self.0[0]
    }

    /// Serial number of the device.
    pub fn serial(&self) -> [u8; 6] {
        let mut serial = [0; 6];
        serial.copy_from_slice(&self.0[1..7]);
        serial
    }

    /// CRC byte of the address.
    pub fn crc(&self) -> u8 {
        self.0[7]
    }

    /// Raw bytes in bus order.
    pub fn as_bytes(&self) -> &[u8; 8] {
        &self.0
    }

    /// Address as a `u64`, family code in the least significant byte.
    pub fn to_u64(&self) -> u64 {
        u64::from_le_bytes(self.0)
    }
}

impl From<u64> for RomAddress {
    fn from(value: u64) -> Self {
        Self(value.to_le_bytes())
    }
}

impl From<RomAddress> for [u8; 8] {
    fn from(value: RomAddress) -> Self {
        value.0
    }
}

impl fmt::Display for RomAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for b in self.0.iter() {
            write!(f, "{b:02X}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serial_constructor_yields_valid_address() {
        let rom = RomAddress::with_serial(0x28, [0xff, 0x4c, 0x12, 0x90, 0x16, 0x04]);
        assert!(rom.is_valid());
        assert_eq!(rom.family(), 0x28);
        assert_eq!(rom.serial(), [0xff, 0x4c, 0x12, 0x90, 0x16, 0x04]);
        assert_eq!(RomAddress::from(rom.to_u64()), rom);
    }

    #[test]
    fn zero_family_is_rejected() {
        let rom = RomAddress::with_serial(0x00, [1, 2, 3, 4, 5, 6]);
        assert_eq!(
            RomAddress::validate::<()>(*rom.as_bytes()),
            Err(OneWireError::InvalidFamilyCode)
        );
    }

    #[test]
    fn corrupted_crc_is_rejected() {
        let mut bytes = *RomAddress::with_serial(0x28, [1, 2, 3, 4, 5, 6]).as_bytes();
        bytes[7] ^= 0x01;
        assert_eq!(
            RomAddress::validate::<()>(bytes),
            Err(OneWireError::InvalidCrc)
        );
    }
}
