use core::fmt;

use embedded_hal::i2c::{ErrorKind, NoAcknowledgeSource};

use crate::BusStatus;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// TWI bus errors
pub enum TwiError {
    /// The controller did not report a (repeated) start condition.
    StartFailed(BusStatus),
    /// The addressed device did not acknowledge its address or a data byte.
    NoAcknowledge(NoAcknowledgeSource),
    /// Another master won arbitration.
    ArbitrationLost,
    /// Busy wait retries exceeded.
    Timeout,
}

impl fmt::Display for TwiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::StartFailed(status) => write!(f, "start condition failed ({status:?})"),
            Self::NoAcknowledge(source) => write!(f, "no acknowledge: {source}"),
            Self::ArbitrationLost => f.write_str("arbitration lost"),
            Self::Timeout => f.write_str("bus operation timed out"),
        }
    }
}

impl embedded_hal::i2c::Error for TwiError {
    fn kind(&self) -> ErrorKind {
        match self {
            Self::StartFailed(_) => ErrorKind::Bus,
            Self::NoAcknowledge(source) => ErrorKind::NoAcknowledge(*source),
            Self::ArbitrationLost => ErrorKind::ArbitrationLoss,
            Self::Timeout => ErrorKind::Other,
        }
    }
}
