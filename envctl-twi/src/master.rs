use embedded_hal::i2c::{self, NoAcknowledgeSource, Operation, SevenBitAddress};

use crate::{
    BusStatus, ControlRegister, Direction, TwiError, TwiMaster, TwiRegisters, TwiResult,
    TwoWireBus,
};

/// Highest 7-bit address tried by [`TwiMaster::scan`].
const SCAN_LIMIT: u8 = 120;

impl<R: TwiRegisters> TwiMaster<R> {
    /// Programs the bit rate register.
    pub fn init(&mut self) {
        self.regs.set_bit_rate(self.bit_rate);
    }

    /// Returns `true` if a device acknowledges `address`.
    pub fn is_present(&mut self, address: u8) -> TwiResult<bool> {
        match self.try_start(address, Direction::Write) {
            Ok(()) => {
                self.stop();
                Ok(true)
            }
            Err(TwiError::NoAcknowledge(_)) => {
                self.stop();
                Ok(false)
            }
            Err(e) => {
                self.stop();
                Err(e)
            }
        }
    }

    /// Iterates over every address that acknowledges, stopping at the first bus error.
    pub fn scan(&mut self) -> impl Iterator<Item = u8> + '_ {
        (0..SCAN_LIMIT).map_while(move |addr| match self.is_present(addr) {
            Ok(found) => Some((addr, found)),
            Err(e) => {
                log::warn!("TWI scan aborted at {addr:#04x}: {e}");
                None
            }
        })
        .filter_map(|(addr, found)| found.then_some(addr))
    }

    fn wait(&mut self) -> TwiResult<()> {
        let mut tries = 0;
        while !self.regs.control().interrupt_flag() {
            if let Some(retries) = self.retries {
                if tries >= retries {
                    return Err(TwiError::Timeout);
                }
                tries += 1;
            }
            core::hint::spin_loop();
        }
        Ok(())
    }

    fn execute(&mut self, control: ControlRegister) -> TwiResult<BusStatus> {
        self.regs.set_control(control);
        self.wait()?;
        Ok(self.regs.status().bus_status())
    }

    fn transmit(&mut self, byte: u8) -> TwiResult<BusStatus> {
        self.regs.set_data(byte);
        self.execute(ControlRegister::transfer(false))
    }

    /// Start condition and address byte, without releasing the bus on failure.
    fn try_start(&mut self, address: u8, direction: Direction) -> TwiResult<()> {
        match self.execute(ControlRegister::start_condition())? {
            BusStatus::Started | BusStatus::RepeatedStarted => {}
            BusStatus::ArbitrationLost => return Err(TwiError::ArbitrationLost),
            status => return Err(TwiError::StartFailed(status)),
        }
        match self.transmit((address << 1) | direction as u8)? {
            BusStatus::AddressAcked => Ok(()),
            BusStatus::ArbitrationLost => Err(TwiError::ArbitrationLost),
            _ => Err(TwiError::NoAcknowledge(NoAcknowledgeSource::Address)),
        }
    }

    fn start(&mut self, address: u8, direction: Direction) -> TwiResult<()> {
        let res = self.try_start(address, direction);
        if let Err(e) = res {
            log::debug!("could not address {address:#04x} for {direction:?}: {e}");
            self.stop();
        }
        res
    }

    fn run_operations(
        &mut self,
        address: u8,
        operations: &mut [Operation<'_>],
    ) -> TwiResult<()> {
        let mut current = None;
        for i in 0..operations.len() {
            let next_is_read = matches!(operations.get(i + 1), Some(Operation::Read(_)));
            match &mut operations[i] {
                Operation::Write(bytes) => {
                    if current != Some(Direction::Write) {
                        self.try_start(address, Direction::Write)?;
                        current = Some(Direction::Write);
                    }
                    TwoWireBus::write(self, *bytes)?;
                }
                Operation::Read(buf) => {
                    if current != Some(Direction::Read) {
                        self.try_start(address, Direction::Read)?;
                        current = Some(Direction::Read);
                    }
                    let len = buf.len();
                    for (j, b) in buf.iter_mut().enumerate() {
                        *b = self.read_byte(next_is_read || j + 1 < len)?;
                    }
                }
            }
        }
        Ok(())
    }
}

impl<R: TwiRegisters> TwoWireBus for TwiMaster<R> {
    type Error = TwiError;

    fn start_write(&mut self, address: u8) -> TwiResult<()> {
        self.start(address, Direction::Write)
    }

    fn start_read(&mut self, address: u8) -> TwiResult<()> {
        self.start(address, Direction::Read)
    }

    fn write_byte(&mut self, byte: u8) -> TwiResult<()> {
        match self.transmit(byte)? {
            BusStatus::DataAcked | BusStatus::AddressAcked => Ok(()),
            BusStatus::ArbitrationLost => Err(TwiError::ArbitrationLost),
            _ => Err(TwiError::NoAcknowledge(NoAcknowledgeSource::Data)),
        }
    }

    fn read_byte(&mut self, ack: bool) -> TwiResult<u8> {
        self.execute(ControlRegister::transfer(ack))?;
        Ok(self.regs.data())
    }

    fn stop(&mut self) {
        self.regs.set_control(ControlRegister::stop_condition());
    }
}

impl<R> i2c::ErrorType for TwiMaster<R> {
    type Error = TwiError;
}

impl<R: TwiRegisters> i2c::I2c<SevenBitAddress> for TwiMaster<R> {
    fn transaction(
        &mut self,
        address: SevenBitAddress,
        operations: &mut [Operation<'_>],
    ) -> Result<(), Self::Error> {
        if operations.is_empty() {
            return Ok(());
        }
        let res = self.run_operations(address, operations);
        self.stop();
        res
    }
}

#[cfg(test)]
mod tests {
    extern crate std;
    use std::vec::Vec;

    use embedded_hal::i2c::I2c;

    use super::*;
    use crate::{StatusRegister, Transaction};

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Event {
        Start,
        Address(u8),
        Write(u8),
        Read { ack: bool },
        Stop,
    }

    /// Register-level model of the TWI peripheral with simple slave devices attached.
    #[derive(Default)]
    struct FakeTwi {
        devices: Vec<u8>,
        rx: Vec<u8>,
        events: Vec<Event>,
        status: u8,
        data: u8,
        active: bool,
        expect_address: bool,
        reading: bool,
        start_status: Option<u8>,
        nack_data_after: Option<usize>,
        stuck: bool,
        bit_rate: u8,
    }

    impl FakeTwi {
        fn with_devices(devices: &[u8]) -> Self {
            Self {
                devices: devices.to_vec(),
                ..Default::default()
            }
        }

        fn stops(&self) -> usize {
            self.events.iter().filter(|e| **e == Event::Stop).count()
        }
    }

    impl TwiRegisters for FakeTwi {
        fn control(&mut self) -> ControlRegister {
            ControlRegister::new()
                .with_enable(true)
                .with_interrupt_flag(!self.stuck)
        }

        fn set_control(&mut self, value: ControlRegister) {
            if value.stop() {
                self.events.push(Event::Stop);
                self.active = false;
                self.status = 0xf8;
            } else if value.start() {
                self.events.push(Event::Start);
                self.status = self
                    .start_status
                    .unwrap_or(if self.active { 0x10 } else { 0x08 });
                self.active = true;
                self.expect_address = true;
            } else if self.expect_address {
                self.expect_address = false;
                let addr = self.data >> 1;
                self.reading = self.data & 1 == 1;
                self.events.push(Event::Address(self.data));
                let present = self.devices.contains(&addr);
                self.status = match (present, self.reading) {
                    (true, false) => 0x18,
                    (false, false) => 0x20,
                    (true, true) => 0x40,
                    (false, true) => 0x48,
                };
            } else if self.reading {
                let ack = value.enable_ack();
                self.events.push(Event::Read { ack });
                self.data = if self.rx.is_empty() {
                    0xff
                } else {
                    self.rx.remove(0)
                };
                self.status = if ack { 0x50 } else { 0x58 };
            } else {
                self.events.push(Event::Write(self.data));
                let written = self
                    .events
                    .iter()
                    .filter(|e| matches!(e, Event::Write(_)))
                    .count();
                self.status = match self.nack_data_after {
                    Some(n) if written > n => 0x30,
                    _ => 0x28,
                };
            }
        }

        fn status(&mut self) -> StatusRegister {
            StatusRegister::from_bits(self.status)
        }

        fn data(&mut self) -> u8 {
            self.data
        }

        fn set_data(&mut self, value: u8) {
            self.data = value;
        }

        fn set_bit_rate(&mut self, value: u8) {
            self.bit_rate = value;
        }
    }

    #[test]
    fn write_sends_address_and_data_then_one_stop() {
        let mut twi = TwiMaster::new(FakeTwi::with_devices(&[0x65]));
        twi.init();
        {
            let mut txn = Transaction::begin_write(&mut twi, 0x65).unwrap();
            txn.write(b"R").unwrap();
        }
        let regs = twi.release();
        assert_eq!(regs.bit_rate, 72);
        assert_eq!(
            regs.events,
            [
                Event::Start,
                Event::Address(0xca),
                Event::Write(b'R'),
                Event::Stop
            ]
        );
    }

    #[test]
    fn missing_device_is_released() {
        let mut twi = TwiMaster::new(FakeTwi::with_devices(&[]));
        assert_eq!(
            twi.start_write(0x64),
            Err(TwiError::NoAcknowledge(NoAcknowledgeSource::Address))
        );
        assert!(Transaction::begin_read(&mut twi, 0x64).is_err());
        assert_eq!(twi.release().stops(), 2);
    }

    #[test]
    fn failed_start_is_released() {
        let mut regs = FakeTwi::with_devices(&[0x65]);
        regs.start_status = Some(0x00);
        let mut twi = TwiMaster::new(regs);
        assert_eq!(
            twi.start_read(0x65),
            Err(TwiError::StartFailed(BusStatus::BusError))
        );
        let regs = twi.release();
        assert_eq!(regs.stops(), 1);
        assert!(!regs.events.iter().any(|e| matches!(e, Event::Address(_))));
    }

    #[test]
    fn data_nack_inside_transaction_stops_once() {
        let mut regs = FakeTwi::with_devices(&[0x40]);
        regs.nack_data_after = Some(1);
        let mut twi = TwiMaster::new(regs);
        let res = Transaction::begin_write(&mut twi, 0x40).and_then(|mut txn| txn.write(&[1, 2, 3]));
        assert_eq!(res, Err(TwiError::NoAcknowledge(NoAcknowledgeSource::Data)));
        let regs = twi.release();
        assert_eq!(regs.stops(), 1);
        assert_eq!(regs.events.last(), Some(&Event::Stop));
    }

    #[test]
    fn read_nacks_last_byte() {
        let mut regs = FakeTwi::with_devices(&[0x64]);
        regs.rx = b"\x017.00\0".to_vec();
        let mut twi = TwiMaster::new(regs);
        let mut buf = [0; 3];
        {
            let mut txn = Transaction::begin_read(&mut twi, 0x64).unwrap();
            txn.read(&mut buf).unwrap();
        }
        assert_eq!(&buf, b"\x017.");
        let regs = twi.release();
        let acks: Vec<bool> = regs
            .events
            .iter()
            .filter_map(|e| match e {
                Event::Read { ack } => Some(*ack),
                _ => None,
            })
            .collect();
        assert_eq!(acks, [true, true, false]);
        assert_eq!(regs.stops(), 1);
    }

    #[test]
    fn timeout_when_hardware_never_finishes() {
        let mut regs = FakeTwi::with_devices(&[0x65]);
        regs.stuck = true;
        let mut twi = TwiMaster::new(regs).with_retries(Some(10));
        assert_eq!(twi.start_write(0x65), Err(TwiError::Timeout));
        assert_eq!(twi.release().stops(), 1);
    }

    #[test]
    fn embedded_hal_write_read_uses_repeated_start() {
        let mut regs = FakeTwi::with_devices(&[0x18]);
        regs.rx = [0xaa, 0x55].to_vec();
        let mut twi = TwiMaster::new(regs);
        let mut buf = [0; 2];
        twi.write_read(0x18, &[0xe1], &mut buf).unwrap();
        assert_eq!(buf, [0xaa, 0x55]);
        let regs = twi.release();
        assert_eq!(
            regs.events,
            [
                Event::Start,
                Event::Address(0x30),
                Event::Write(0xe1),
                Event::Start,
                Event::Address(0x31),
                Event::Read { ack: true },
                Event::Read { ack: false },
                Event::Stop,
            ]
        );
    }

    #[test]
    fn restart_switches_direction_without_stop() {
        let mut regs = FakeTwi::with_devices(&[0x64]);
        regs.rx = [0x01].to_vec();
        let mut twi = TwiMaster::new(regs);
        {
            let mut txn = Transaction::begin_write(&mut twi, 0x64).unwrap();
            txn.write_byte(b'R').unwrap();
            txn.restart(0x64, Direction::Read).unwrap();
            assert_eq!(txn.read_byte(false), Ok(0x01));
        }
        let regs = twi.release();
        assert_eq!(
            regs.events,
            [
                Event::Start,
                Event::Address(0xc8),
                Event::Write(b'R'),
                Event::Start,
                Event::Address(0xc9),
                Event::Read { ack: false },
                Event::Stop,
            ]
        );
    }

    #[test]
    fn failed_restart_stops_once() {
        let mut twi = TwiMaster::new(FakeTwi::with_devices(&[0x64]));
        {
            let mut txn = Transaction::begin_write(&mut twi, 0x64).unwrap();
            assert_eq!(
                txn.restart(0x65, Direction::Read),
                Err(TwiError::NoAcknowledge(NoAcknowledgeSource::Address))
            );
        }
        assert_eq!(twi.release().stops(), 1);
    }

    #[test]
    fn scan_lists_responding_devices() {
        let mut twi = TwiMaster::new(FakeTwi::with_devices(&[0x40, 0x64, 0x65]));
        let found: Vec<u8> = twi.scan().collect();
        assert_eq!(found, [0x40, 0x64, 0x65]);
    }
}
