use embedded_hal::{
    delay::DelayNs,
    digital::{InputPin, OutputPin},
};

use crate::{OneWire, OneWireError, OneWireResult};

const RESET_LOW_US: u32 = 500;
const PRESENCE_SAMPLE_US: u32 = 70;
/// Rest of the 800 µs slot after the line is released.
const RESET_RECOVERY_US: u32 = 800 - PRESENCE_SAMPLE_US;
const WRITE_ONE_LOW_US: u32 = 8;
const WRITE_ONE_RECOVERY_US: u32 = 80;
const WRITE_ZERO_LOW_US: u32 = 80;
const WRITE_ZERO_RECOVERY_US: u32 = 2;
const READ_LOW_US: u32 = 2;
const READ_SAMPLE_US: u32 = 5;
const READ_RECOVERY_US: u32 = 60;

/// A 1-Wire master driving a single open-drain GPIO line.
///
/// `set_low` must pull the line down and `set_high` must release it to the external
/// pull-up, so that devices on the bus can pull it low while it is released.
/// All slot timing goes through the [`DelayNs`] implementation.
pub struct BitBangOneWire<P, D> {
    pin: P,
    delay: D,
}

impl<P, D> BitBangOneWire<P, D> {
    /// Creates a new master on `pin`, using `delay` for slot timing.
    pub fn new(pin: P, delay: D) -> Self {
        Self { pin, delay }
    }

    /// Releases the pin and the delay.
    pub fn free(self) -> (P, D) {
        (self.pin, self.delay)
    }
}

impl<P: InputPin + OutputPin, D: DelayNs> OneWire for BitBangOneWire<P, D> {
    type BusError = P::Error;

    fn reset(&mut self) -> OneWireResult<(), Self::BusError> {
        self.pin.set_low()?;
        self.delay.delay_us(RESET_LOW_US);
        self.pin.set_high()?;
        self.delay.delay_us(PRESENCE_SAMPLE_US);
        let present = self.pin.is_low()?;
        self.delay.delay_us(RESET_RECOVERY_US);
        if present {
            Ok(())
        } else {
            Err(OneWireError::NoDevicePresent)
        }
    }

    fn write_bit(&mut self, bit: bool) -> OneWireResult<(), Self::BusError> {
        let (low, recovery) = if bit {
            (WRITE_ONE_LOW_US, WRITE_ONE_RECOVERY_US)
        } else {
            (WRITE_ZERO_LOW_US, WRITE_ZERO_RECOVERY_US)
        };
        self.pin.set_low()?;
        self.delay.delay_us(low);
        self.pin.set_high()?;
        self.delay.delay_us(recovery);
        Ok(())
    }

    fn read_bit(&mut self) -> OneWireResult<bool, Self::BusError> {
        self.pin.set_low()?;
        self.delay.delay_us(READ_LOW_US);
        self.pin.set_high()?;
        self.delay.delay_us(READ_SAMPLE_US);
        let bit = self.pin.is_high()?;
        self.delay.delay_us(READ_RECOVERY_US);
        Ok(bit)
    }
}

#[cfg(test)]
mod tests {
    extern crate std;
    use std::vec::Vec;

    use super::*;
    use embedded_hal_mock::eh1::{
        delay::NoopDelay,
        digital::{Mock as PinMock, State, Transaction},
    };

    /// Records every wait, in microseconds.
    #[derive(Default)]
    struct RecordingDelay {
        waits_us: Vec<u32>,
    }

    impl DelayNs for RecordingDelay {
        fn delay_ns(&mut self, ns: u32) {
            self.waits_us.push(ns / 1000);
        }

        fn delay_us(&mut self, us: u32) {
            self.waits_us.push(us);
        }
    }

    fn write_slot() -> [Transaction; 2] {
        [Transaction::set(State::Low), Transaction::set(State::High)]
    }

    fn read_slot(level: State) -> [Transaction; 3] {
        [
            Transaction::set(State::Low),
            Transaction::set(State::High),
            Transaction::get(level),
        ]
    }

    #[test]
    fn reset_detects_presence() {
        let expectations = [
            Transaction::set(State::Low),
            Transaction::set(State::High),
            Transaction::get(State::Low),
        ];
        let mut bus = BitBangOneWire::new(PinMock::new(&expectations), NoopDelay::new());
        assert!(bus.reset().is_ok());
        let (mut pin, _) = bus.free();
        pin.done();
    }

    #[test]
    fn reset_without_presence_fails() {
        let expectations = [
            Transaction::set(State::Low),
            Transaction::set(State::High),
            Transaction::get(State::High),
        ];
        let mut bus = BitBangOneWire::new(PinMock::new(&expectations), NoopDelay::new());
        assert!(matches!(bus.reset(), Err(OneWireError::NoDevicePresent)));
        let (mut pin, _) = bus.free();
        pin.done();
    }

    #[test]
    fn byte_write_is_lsb_first_slots() {
        let expectations: Vec<Transaction> = (0..8)
            .flat_map(|_| write_slot())
            .collect();
        let mut bus = BitBangOneWire::new(PinMock::new(&expectations), NoopDelay::new());
        bus.write_byte(0xa5).unwrap();
        let (mut pin, _) = bus.free();
        pin.done();
    }

    #[test]
    fn byte_read_assembles_lsb_first() {
        // 0b0100_1101
        let levels = [
            State::High,
            State::Low,
            State::High,
            State::High,
            State::Low,
            State::Low,
            State::High,
            State::Low,
        ];
        let expectations: Vec<Transaction> =
            levels.into_iter().flat_map(read_slot).collect();
        let mut bus = BitBangOneWire::new(PinMock::new(&expectations), NoopDelay::new());
        assert_eq!(bus.read_byte().unwrap(), 0x4d);
        let (mut pin, _) = bus.free();
        pin.done();
    }

    #[test]
    fn reset_slot_timing() {
        let expectations = [
            Transaction::set(State::Low),
            Transaction::set(State::High),
            Transaction::get(State::Low),
        ];
        let mut bus =
            BitBangOneWire::new(PinMock::new(&expectations), RecordingDelay::default());
        bus.reset().unwrap();
        let (mut pin, delay) = bus.free();
        pin.done();
        // 500 µs low, presence sampled 70 µs after release, 800 µs slot after release
        assert_eq!(delay.waits_us, [500, 70, 730]);
        assert_eq!(delay.waits_us[1..].iter().sum::<u32>(), 800);
    }

    #[test]
    fn write_slot_timing() {
        let expectations: Vec<Transaction> = (0..2).flat_map(|_| write_slot()).collect();
        let mut bus =
            BitBangOneWire::new(PinMock::new(&expectations), RecordingDelay::default());
        bus.write_bit(true).unwrap();
        bus.write_bit(false).unwrap();
        let (mut pin, delay) = bus.free();
        pin.done();
        assert_eq!(delay.waits_us, [8, 80, 80, 2]);
    }

    #[test]
    fn read_slot_timing() {
        let expectations = read_slot(State::High);
        let mut bus =
            BitBangOneWire::new(PinMock::new(&expectations), RecordingDelay::default());
        assert!(bus.read_bit().unwrap());
        let (mut pin, delay) = bus.free();
        pin.done();
        assert_eq!(delay.waits_us, [2, 5, 60]);
    }
}
