/// Reflected form of the Maxim polynomial x^8 + x^5 + x^4 + 1.
const POLY: u8 = 0x8c;

#[cfg(feature = "crc-table")]
const CRC_TABLE: [u8; 256] = {
    let mut table = [0u8; 256];
    let mut i = 0;
    while i < 256 {
        table[i] = update_bitwise(0, i as u8);
        i += 1;
    }
    table
};

const fn update_bitwise(crc: u8, byte: u8) -> u8 {
    let mut crc = crc ^ byte;
    let mut i = 0;
    while i < 8 {
        crc = if crc & 0x1 == 0x1 {
            (crc >> 1) ^ POLY
        } else {
            crc >> 1
        };
        i += 1;
    }
    crc
}

#[derive(Debug, Default, Clone, Copy)]
/// Running Maxim CRC-8 over ROM addresses and scratchpads.
pub struct OneWireCrc(u8);

impl OneWireCrc {
    /// Current value.
    pub fn value(&self) -> u8 {
        self.0
    }

    /// Feeds one byte through the lookup table.
    #[cfg(feature = "crc-table")]
    pub fn update(&mut self, byte: u8) {
        self.0 = CRC_TABLE[(self.0 ^ byte) as usize];
    }

    /// Feeds one byte, bit by bit.
    #[cfg(not(feature = "crc-table"))]
    pub fn update(&mut self, byte: u8) {
        self.0 = update_bitwise(self.0, byte);
    }

    /// CRC-8 of `sequence`.
    pub fn compute(sequence: &[u8]) -> u8 {
        sequence
            .iter()
            .fold(OneWireCrc::default(), |mut crc, &byte| {
                crc.update(byte);
                crc
            })
            .0
    }

    /// `true` when the last byte of `sequence` is the CRC-8 of the bytes before it.
    pub fn validate(sequence: &[u8]) -> bool {
        Self::compute(sequence) == 0x0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_matches_bitwise() {
        for byte in 0..=255u8 {
            let mut crc = OneWireCrc::default();
            crc.update(byte);
            assert_eq!(crc.value(), update_bitwise(0, byte));
        }
    }

    #[test]
    fn maxim_reference_rom() {
        // Application note 27 example ROM.
        let rom = [0x02, 0x1c, 0xb8, 0x01, 0x00, 0x00, 0x00, 0xa2];
        assert_eq!(OneWireCrc::compute(&rom[..7]), 0xa2);
        assert!(OneWireCrc::validate(&rom));
        let mut bad = rom;
        bad[3] ^= 0x10;
        assert!(!OneWireCrc::validate(&bad));
    }
}
