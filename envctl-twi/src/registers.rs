use bitfield_struct::bitfield;

/// Access to the TWI peripheral registers.
///
/// On hardware these are volatile reads and writes of `TWCR`, `TWSR`, `TWDR` and `TWBR`.
pub trait TwiRegisters {
    /// Read the control register.
    fn control(&mut self) -> ControlRegister;
    /// Write the control register.
    fn set_control(&mut self, value: ControlRegister);
    /// Read the status register.
    fn status(&mut self) -> StatusRegister;
    /// Read the data register.
    fn data(&mut self) -> u8;
    /// Write the data register.
    fn set_data(&mut self, value: u8);
    /// Write the bit rate register.
    fn set_bit_rate(&mut self, value: u8);
}

/// # TWI control register (TWCR)
///
/// Every bus action is started by writing this register with the
/// interrupt flag set, which clears the flag. The hardware sets the
/// flag again once the action has completed.
#[bitfield(u8)]
#[derive(PartialEq, Eq)]
pub struct ControlRegister {
    /// TWIE: enables the TWI interrupt.
    pub interrupt_enable: bool,
    #[bits(1)]
    __: u8,
    /// TWEN: enables the TWI peripheral.
    pub enable: bool,
    /// TWWC: set when the data register was written while the flag was low.
    pub write_collision: bool,
    /// TWSTO: generate a stop condition.
    pub stop: bool,
    /// TWSTA: generate a start condition.
    pub start: bool,
    /// TWEA: acknowledge received bytes.
    pub enable_ack: bool,
    /// TWINT: set by hardware when the current action has finished.
    pub interrupt_flag: bool,
}

impl ControlRegister {
    /// Start condition.
    pub(crate) const fn start_condition() -> Self {
        Self::new()
            .with_interrupt_flag(true)
            .with_start(true)
            .with_enable(true)
    }

    /// Stop condition.
    pub(crate) const fn stop_condition() -> Self {
        Self::new()
            .with_interrupt_flag(true)
            .with_stop(true)
            .with_enable(true)
    }

    /// Shift out or in one byte, acknowledging a received byte if `ack`.
    pub(crate) const fn transfer(ack: bool) -> Self {
        Self::new()
            .with_interrupt_flag(true)
            .with_enable_ack(ack)
            .with_enable(true)
    }
}

/// # TWI status register (TWSR)
#[bitfield(u8)]
pub struct StatusRegister {
    /// TWPS: bit rate prescaler.
    #[bits(2)]
    pub prescaler: u8,
    #[bits(1)]
    __: u8,
    /// TWS: status code, shifted down by three bits.
    #[bits(5)]
    pub code: u8,
}

impl StatusRegister {
    /// Decoded bus status.
    pub fn bus_status(&self) -> BusStatus {
        BusStatus::from(self.code() << 3)
    }
}

/// Outcome of the last bus action as reported by the status register.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusStatus {
    /// A start condition has been transmitted.
    Started,
    /// A repeated start condition has been transmitted.
    RepeatedStarted,
    /// Address with write or read bit transmitted, acknowledge received.
    AddressAcked,
    /// Address transmitted, no acknowledge received.
    AddressNacked,
    /// Data byte transmitted, acknowledge received.
    DataAcked,
    /// Data byte transmitted, no acknowledge received.
    DataNacked,
    /// Data byte received, acknowledge returned.
    DataReceived,
    /// Data byte received, no acknowledge returned.
    DataReceivedNack,
    /// Arbitration lost.
    ArbitrationLost,
    /// No relevant state information available.
    NoInfo,
    /// Illegal start or stop condition on the bus.
    BusError,
    /// Status code not used by master modes.
    Unknown(u8),
}

impl From<u8> for BusStatus {
    fn from(code: u8) -> Self {
        match code & 0xf8 {
            0x08 => Self::Started,
            0x10 => Self::RepeatedStarted,
            0x18 | 0x40 => Self::AddressAcked,
            0x20 | 0x48 => Self::AddressNacked,
            0x28 => Self::DataAcked,
            0x30 => Self::DataNacked,
            0x38 => Self::ArbitrationLost,
            0x50 => Self::DataReceived,
            0x58 => Self::DataReceivedNack,
            0xf8 => Self::NoInfo,
            0x00 => Self::BusError,
            other => Self::Unknown(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn control_bits_match_twcr_layout() {
        assert_eq!(ControlRegister::start_condition().into_bits(), 0b1010_0100);
        assert_eq!(ControlRegister::stop_condition().into_bits(), 0b1001_0100);
        assert_eq!(ControlRegister::transfer(true).into_bits(), 0b1100_0100);
        assert_eq!(ControlRegister::transfer(false).into_bits(), 0b1000_0100);
    }

    #[test]
    fn status_ignores_prescaler() {
        let status = StatusRegister::from_bits(0x40 | 0b11);
        assert_eq!(status.prescaler(), 3);
        assert_eq!(status.bus_status(), BusStatus::AddressAcked);
        assert_eq!(BusStatus::from(0x68), BusStatus::Unknown(0x68));
    }
}
