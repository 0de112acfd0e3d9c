#![no_std]
#![deny(missing_docs)]
//! # ezo
//! The ASCII command protocol of Atlas Scientific EZO circuits over an
//! [`envctl_twi::TwoWireBus`].
//!
//! A command is written in one bus transaction. After a fixed wait the circuit is read
//! back: the first byte of the NUL terminated response is a status code, followed by the
//! ASCII result. [Ezo] implements the exchange and the commands shared by every circuit;
//! [Conductivity] and [Ph] add the readings and calibration points of each sensor.
//!
//! "Still processing" responses are polled until a final status arrives. The number of
//! polls is unbounded unless [`EzoConfig::with_max_pending_polls`] sets a limit.

mod config;
mod device;
mod error;
mod sensors;

pub use config::EzoConfig;
pub use device::{Ezo, Response, ResponseCode};
pub use error::EzoError;
pub use sensors::{Conductivity, Ph};

/// Results of EZO protocol calls.
pub type EzoResult<T, E> = Result<T, EzoError<E>>;

/// Largest response, status code included.
pub const MAX_RESPONSE_LEN: usize = 64;
/// Largest formatted command.
pub const MAX_COMMAND_LEN: usize = 64;
/// Largest exported calibration, terminating NUL included. Matches the packet payload limit.
pub const MAX_CALIBRATION_LEN: usize = 250;
