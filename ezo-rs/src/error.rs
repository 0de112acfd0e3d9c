use core::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// EZO protocol errors
pub enum EzoError<E> {
    /// Two-wire bus error.
    Bus(E),
    /// The circuit rejected the command (status 2).
    SyntaxError,
    /// The circuit has no data to send (status 255).
    NoData,
    /// The circuit was still processing after the configured number of polls.
    StillProcessing,
    /// Status code outside the protocol.
    UnexpectedCode(u8),
    /// The response did not fit the receive buffer.
    ResponseOverflow,
    /// The response could not be parsed.
    InvalidResponse,
    /// The formatted command did not fit the command buffer.
    CommandTooLong,
}

impl<E> From<E> for EzoError<E> {
    fn from(value: E) -> Self {
        Self::Bus(value)
    }
}

impl<E: fmt::Debug> fmt::Display for EzoError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bus(e) => write!(f, "bus error: {e:?}"),
            Self::SyntaxError => f.write_str("syntax error"),
            Self::NoData => f.write_str("no data"),
            Self::StillProcessing => f.write_str("still processing"),
            Self::UnexpectedCode(code) => write!(f, "unexpected response code {code}"),
            Self::ResponseOverflow => f.write_str("response too long"),
            Self::InvalidResponse => f.write_str("invalid response"),
            Self::CommandTooLong => f.write_str("command too long"),
        }
    }
}
