use core::fmt;

use envctl_onewire::OneWireError;

/// DS18B20 error type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ds18b20Error<E> {
    /// 1-Wire bus or protocol error.
    OneWire(OneWireError<E>),
    /// Resolution index or configuration byte outside the known set.
    InvalidResolution(u8),
}

impl<E> From<OneWireError<E>> for Ds18b20Error<E> {
    fn from(value: OneWireError<E>) -> Self {
        Self::OneWire(value)
    }
}

impl<E: fmt::Debug> fmt::Display for Ds18b20Error<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OneWire(e) => write!(f, "{e}"),
            Self::InvalidResolution(v) => write!(f, "invalid resolution {v:#04x}"),
        }
    }
}
