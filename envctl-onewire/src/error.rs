use core::fmt;

/// Errors of 1-Wire bus operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OneWireError<E> {
    /// Error of the pin or bridge driving the bus.
    Other(E),
    /// Indicates that no device answered the reset pulse, or that no device
    /// responded to a search time slot.
    NoDevicePresent,
    /// Computed CRC-8 of a ROM address or scratchpad is invalid.
    InvalidCrc,
    /// A discovered ROM address carries the reserved family code `0x00`.
    InvalidFamilyCode,
}

impl<E> From<E> for OneWireError<E> {
    fn from(other: E) -> Self {
        Self::Other(other)
    }
}

impl<E: fmt::Debug> fmt::Display for OneWireError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Other(e) => write!(f, "1-Wire hardware error: {e:?}"),
            Self::NoDevicePresent => f.write_str("no device present on the 1-Wire bus"),
            Self::InvalidCrc => f.write_str("invalid 1-Wire CRC-8"),
            Self::InvalidFamilyCode => f.write_str("invalid 1-Wire family code"),
        }
    }
}

#[cfg(test)]
mod tests {
    extern crate std;
    use std::string::ToString;

    use super::*;

    #[test]
    fn every_failure_has_a_message() {
        let cases: [(OneWireError<u8>, &str); 4] = [
            (OneWireError::Other(7), "1-Wire hardware error: 7"),
            (OneWireError::NoDevicePresent, "no device present on the 1-Wire bus"),
            (OneWireError::InvalidCrc, "invalid 1-Wire CRC-8"),
            (OneWireError::InvalidFamilyCode, "invalid 1-Wire family code"),
        ];
        for (error, message) in cases {
            assert_eq!(error.to_string(), message);
        }
    }
}
