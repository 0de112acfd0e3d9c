use crc::{CRC_16_XMODEM, Crc};

/// CRC-16/XMODEM: poly 0x1021, init 0, no reflection, no final XOR.
const XMODEM: Crc<u16> = Crc::<u16>::new(&CRC_16_XMODEM);

/// Calculates the CRC-16/XMODEM checksum of `data`.
pub fn checksum(data: &[u8]) -> u16 {
    XMODEM.checksum(data)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn check_value() {
        assert_eq!(checksum(b"123456789"), 0x31c3);
    }

    #[test]
    fn empty_input() {
        assert_eq!(checksum(&[]), 0);
    }
}
