/// Conversion resolution of a DS18B20.
///
/// The discriminant is the index used on the wire (`0` = 12 bit ... `3` = 9 bit).
#[repr(u8)]
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Resolution {
    /// 0.0625 °C steps.
    #[default]
    Bits12 = 0,
    /// 0.125 °C steps.
    Bits11 = 1,
    /// 0.25 °C steps.
    Bits10 = 2,
    /// 0.5 °C steps.
    Bits9 = 3,
}

impl Resolution {
    /// Configuration register value.
    pub const fn config(self) -> u8 {
        match self {
            Resolution::Bits9 => 0x1f,
            Resolution::Bits10 => 0x3f,
            Resolution::Bits11 => 0x5f,
            Resolution::Bits12 => 0x7f,
        }
    }

    /// Parses a configuration register value.
    pub const fn from_config(config: u8) -> Option<Self> {
        match config {
            0x1f => Some(Resolution::Bits9),
            0x3f => Some(Resolution::Bits10),
            0x5f => Some(Resolution::Bits11),
            0x7f => Some(Resolution::Bits12),
            _ => None,
        }
    }

    /// Time to wait after starting a conversion.
    pub const fn conversion_ms(self) -> u32 {
        match self {
            Resolution::Bits9 => 100,
            Resolution::Bits10 => 200,
            Resolution::Bits11 => 400,
            Resolution::Bits12 => 800,
        }
    }

    /// Mask clearing the temperature bits left undefined at this resolution.
    pub const fn mask(self) -> u16 {
        match self {
            Resolution::Bits9 => 0xfff8,
            Resolution::Bits10 => 0xfffc,
            Resolution::Bits11 => 0xfffe,
            Resolution::Bits12 => 0xffff,
        }
    }
}

impl TryFrom<u8> for Resolution {
    type Error = u8;

    /// Parses a wire index, returning it back if out of range.
    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Resolution::Bits12),
            1 => Ok(Resolution::Bits11),
            2 => Ok(Resolution::Bits10),
            3 => Ok(Resolution::Bits9),
            other => Err(other),
        }
    }
}

impl From<Resolution> for u8 {
    fn from(value: Resolution) -> Self {
        value as u8
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_index_and_config() {
        for index in 0..4u8 {
            let res = Resolution::try_from(index).unwrap();
            assert_eq!(u8::from(res), index);
            assert_eq!(Resolution::from_config(res.config()), Some(res));
        }
        assert_eq!(Resolution::try_from(4), Err(4));
        assert_eq!(Resolution::from_config(0x00), None);
        assert_eq!(Resolution::Bits12.config(), 0x7f);
        assert_eq!(Resolution::Bits9.conversion_ms(), 100);
        assert_eq!(Resolution::Bits12.conversion_ms(), 800);
    }
}
