#![no_std]
#![deny(missing_docs)]

/*! # envctl-twi
 *
 * Master side of the two-wire interface (TWI, I2C compatible) as found on AVR
 * microcontrollers. The peripheral is reached through the [`TwiRegisters`] trait,
 * so the same driver runs on the real register file and on a simulated one.
 *
 * Bus users talk to the [`TwoWireBus`] trait. A [`Transaction`] guard issues the
 * stop condition when it goes out of scope, so the bus is released on every exit path.
 * [`TwiMaster`] also implements [`embedded_hal::i2c::I2c`].
 */

mod error;
mod master;
mod registers;
mod traits;

pub use error::TwiError;
pub use registers::{BusStatus, ControlRegister, StatusRegister, TwiRegisters};
pub use traits::{Direction, Transaction, TwoWireBus};

/// Results of TWI function calls.
pub type TwiResult<T> = Result<T, TwiError>;

/// Default bit rate register value: 100 kHz SCL from a 16 MHz CPU clock.
pub const DEFAULT_BIT_RATE: u8 = bit_rate_register(16_000_000, 100_000);

/// Computes the bit rate register value for the given CPU and SCL frequencies
/// (prescaler 1).
pub const fn bit_rate_register(f_cpu: u32, scl: u32) -> u8 {
    let div = f_cpu / scl;
    if div <= 16 {
        0
    } else if (div - 16) / 2 > u8::MAX as u32 {
        u8::MAX
    } else {
        ((div - 16) / 2) as u8
    }
}

/// A TWI bus master.
///
/// Takes ownership of the peripheral registers (implementing [`TwiRegisters`]).
pub struct TwiMaster<R> {
    pub(crate) regs: R,
    pub(crate) bit_rate: u8,
    pub(crate) retries: Option<u32>,
}

impl<R> TwiMaster<R> {
    /// Creates a new instance of `TwiMaster` with the given registers.
    pub fn new(regs: R) -> Self {
        TwiMaster {
            regs,
            bit_rate: DEFAULT_BIT_RATE,
            retries: None,
        }
    }

    /// Set the retry count.
    ///
    /// The retry count bounds how many times the master polls the hardware for the
    /// end of a bus operation before giving up with [`TwiError::Timeout`].
    /// `None` polls forever.
    pub fn with_retries(mut self, retries: Option<u32>) -> Self {
        self.retries = retries;
        self
    }

    /// Set the bit rate register value, see [`bit_rate_register`].
    pub fn with_bit_rate(mut self, bit_rate: u8) -> Self {
        self.bit_rate = bit_rate;
        self
    }

    /// Releases the registers.
    pub fn release(self) -> R {
        self.regs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bit_rate_for_standard_mode() {
        assert_eq!(bit_rate_register(16_000_000, 100_000), 72);
        assert_eq!(bit_rate_register(16_000_000, 400_000), 12);
        assert_eq!(bit_rate_register(1_000_000, 400_000), 0);
    }
}
