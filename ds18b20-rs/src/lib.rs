#![no_std]
#![deny(missing_docs)]
//! # ds18b20
//! DS18B20 digital thermometers on an [`envctl_onewire::OneWire`] bus.
//!
//! [Ds18b20] holds the record of one sensor (ROM address, last reading, configuration), and
//! [Ds18b20Group] discovers and measures every sensor on a bus at a shared resolution.
use embedded_hal::delay::DelayNs;
use envctl_onewire::{
    OneWire, OneWireCrc, OneWireError, OneWireResult, OneWireSearch, OneWireSearchKind,
    RomAddress,
};
use fixed::types::I12F4;

mod error;
mod resolution;
pub use error::Ds18b20Error;
pub use resolution::Resolution;

/// Temperature in °C with 1/16 °C steps.
pub type Temperature = I12F4;

/// Family code of the DS18B20.
pub const DS18B20_FAMILY: u8 = 0x28;

const DS18B20_WRITE_SCRATCH: u8 = 0x4e;
const DS18B20_READ_SCRATCH: u8 = 0xbe;
const DS18B20_COPY_SCRATCH: u8 = 0x48;
const DS18B20_START_CONV: u8 = 0x44;
const DS18B20_COPY_MS: u32 = 10;

/// Result type for DS18B20 operations.
pub type Ds18b20Result<T, E> = Result<T, Ds18b20Error<E>>;

/// One DS18B20 sensor.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Ds18b20 {
    rom: RomAddress,
    online: bool,
    temperature: Temperature,
    resolution: Resolution,
    alarm_high: i8,
    alarm_low: i8,
}

impl Ds18b20 {
    /// Creates the record of a discovered sensor.
    pub fn new(rom: RomAddress) -> Self {
        Self {
            rom,
            online: true,
            ..Default::default()
        }
    }

    /// Sets the alarm thresholds written by [`Ds18b20::set_resolution`].
    pub fn with_alarms(mut self, low: i8, high: i8) -> Self {
        self.alarm_low = low;
        self.alarm_high = high;
        self
    }

    /// ROM address.
    pub fn rom(&self) -> &RomAddress {
        &self.rom
    }

    /// `false` once a read from this sensor failed.
    pub fn is_online(&self) -> bool {
        self.online
    }

    /// Last temperature read.
    pub fn temperature(&self) -> Temperature {
        self.temperature
    }

    /// Last temperature read, as the raw two's complement register value.
    pub fn raw_temperature(&self) -> u16 {
        self.temperature.to_bits() as u16
    }

    /// Resolution of the sensor.
    pub fn resolution(&self) -> Resolution {
        self.resolution
    }

    /// Alarm thresholds `(low, high)`.
    pub fn alarms(&self) -> (i8, i8) {
        (self.alarm_low, self.alarm_high)
    }

    /// Reads the 9 byte scratchpad and checks its CRC.
    ///
    /// The alarm thresholds and resolution of the record are refreshed from it.
    pub fn read_scratchpad<O: OneWire>(
        &mut self,
        bus: &mut O,
    ) -> Ds18b20Result<[u8; 9], O::BusError> {
        let result = self.fetch_scratchpad(bus);
        self.online = result.is_ok();
        result
    }

    fn fetch_scratchpad<O: OneWire>(
        &mut self,
        bus: &mut O,
    ) -> Ds18b20Result<[u8; 9], O::BusError> {
        let mut buf = [0; 9];
        bus.address(Some(&self.rom))?;
        bus.write_byte(DS18B20_READ_SCRATCH)?;
        bus.read_bytes(&mut buf)?;
        if !OneWireCrc::validate(&buf) {
            return Err(OneWireError::InvalidCrc.into());
        }
        self.resolution =
            Resolution::from_config(buf[4]).ok_or(Ds18b20Error::InvalidResolution(buf[4]))?;
        self.alarm_high = buf[2] as i8;
        self.alarm_low = buf[3] as i8;
        Ok(buf)
    }

    /// Reads the result of the last conversion.
    ///
    /// Bits undefined at the configured resolution are cleared.
    pub fn read_temperature<O: OneWire>(
        &mut self,
        bus: &mut O,
    ) -> Ds18b20Result<Temperature, O::BusError> {
        let buf = self.read_scratchpad(bus)?;
        let raw = u16::from_le_bytes([buf[0], buf[1]]) & self.resolution.mask();
        self.temperature = Temperature::from_bits(raw as i16);
        Ok(self.temperature)
    }

    /// Writes the resolution and alarm thresholds and copies them to EEPROM.
    pub fn set_resolution<O: OneWire, D: DelayNs>(
        &mut self,
        bus: &mut O,
        delay: &mut D,
        resolution: Resolution,
    ) -> OneWireResult<(), O::BusError> {
        bus.address(Some(&self.rom))?;
        bus.write_byte(DS18B20_WRITE_SCRATCH)?;
        bus.write_bytes(&[self.alarm_high as u8, self.alarm_low as u8, resolution.config()])?;
        bus.address(Some(&self.rom))?;
        bus.write_byte(DS18B20_COPY_SCRATCH)?;
        delay.delay_ms(DS18B20_COPY_MS);
        self.resolution = resolution;
        Ok(())
    }
}

/// Up to `N` DS18B20 sensors sharing a bus and a resolution.
#[derive(Debug)]
pub struct Ds18b20Group<const N: usize> {
    devices: usize,
    sensors: [Ds18b20; N],
    resolution: Resolution,
    family: Option<u8>,
}

impl<const N: usize> Default for Ds18b20Group<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> Ds18b20Group<N> {
    /// Creates an empty group at 12 bit resolution that only enumerates DS18B20 devices.
    pub fn new() -> Self {
        Self {
            devices: 0,
            sensors: [Ds18b20::default(); N],
            resolution: Resolution::default(),
            family: Some(DS18B20_FAMILY),
        }
    }

    /// Sets the resolution assumed before [`Ds18b20Group::set_resolution`] is called.
    pub fn with_resolution(mut self, resolution: Resolution) -> Self {
        self.resolution = resolution;
        self
    }

    /// Restricts enumeration to a family code, or accepts every device with `None`.
    pub fn with_family_filter(mut self, family: Option<u8>) -> Self {
        self.family = family;
        self
    }

    /// Discovers the sensors on the bus, replacing the current list.
    ///
    /// Stops after `N` devices. A bus without presence pulse holds no sensor. Returns the
    /// number of devices found.
    pub fn enumerate<O: OneWire>(&mut self, bus: &mut O) -> OneWireResult<usize, O::BusError> {
        self.devices = 0;
        let mut search = match self.family {
            Some(family) => OneWireSearch::with_family(bus, OneWireSearchKind::Normal, family),
            None => OneWireSearch::new(bus, OneWireSearchKind::Normal),
        };
        while self.devices < N {
            let rom = match search.next() {
                Ok(Some(rom)) => rom,
                Ok(None) => break,
                Err(OneWireError::NoDevicePresent) if self.devices == 0 => break,
                Err(e) => return Err(e),
            };
            let mut sensor = Ds18b20::new(rom);
            sensor.resolution = self.resolution;
            self.sensors[self.devices] = sensor;
            self.devices += 1;
        }
        log::debug!("found {} DS18B20 sensors", self.devices);
        Ok(self.devices)
    }

    /// Sensors found by the last enumeration.
    pub fn devices(&self) -> &[Ds18b20] {
        &self.sensors[..self.devices]
    }

    /// Mutable access to the sensors found by the last enumeration.
    pub fn devices_mut(&mut self) -> &mut [Ds18b20] {
        &mut self.sensors[..self.devices]
    }

    /// Resolution last written to the bus.
    pub fn resolution(&self) -> Resolution {
        self.resolution
    }

    /// Writes `resolution` to the scratchpad of every device on the bus, with zeroed alarms.
    ///
    /// The setting is not copied to EEPROM.
    pub fn set_resolution<O: OneWire>(
        &mut self,
        bus: &mut O,
        resolution: Resolution,
    ) -> OneWireResult<(), O::BusError> {
        bus.address(None)?;
        bus.write_byte(DS18B20_WRITE_SCRATCH)?;
        bus.write_bytes(&[0, 0, resolution.config()])?;
        self.resolution = resolution;
        for sensor in self.devices_mut() {
            sensor.resolution = resolution;
            sensor.alarm_high = 0;
            sensor.alarm_low = 0;
        }
        Ok(())
    }

    /// Starts a conversion on every device.
    pub fn start_conversion<O: OneWire>(&self, bus: &mut O) -> OneWireResult<(), O::BusError> {
        bus.address(None)?;
        bus.write_byte(DS18B20_START_CONV)
    }

    /// Waits for a conversion at the group resolution.
    pub fn wait_conversion<D: DelayNs>(&self, delay: &mut D) {
        delay.delay_ms(self.resolution.conversion_ms());
    }

    /// Starts a conversion and waits for it to complete.
    pub fn trigger_temperature_conversion<O: OneWire, D: DelayNs>(
        &self,
        bus: &mut O,
        delay: &mut D,
    ) -> OneWireResult<(), O::BusError> {
        self.start_conversion(bus)?;
        self.wait_conversion(delay);
        Ok(())
    }

    /// Reads every sensor.
    ///
    /// A sensor failing its CRC or presence check is marked offline and skipped; bus errors
    /// abort the read.
    pub fn read_temperatures<O: OneWire>(
        &mut self,
        bus: &mut O,
    ) -> Ds18b20Result<&[Ds18b20], O::BusError> {
        for sensor in self.sensors[..self.devices].iter_mut() {
            match sensor.read_temperature(bus) {
                Ok(_) => {}
                Err(Ds18b20Error::OneWire(OneWireError::Other(e))) => {
                    return Err(OneWireError::Other(e).into());
                }
                Err(_) => log::warn!("sensor {} offline", sensor.rom()),
            }
        }
        Ok(self.devices())
    }

    /// Converts and reads every sensor.
    pub fn measure<O: OneWire, D: DelayNs>(
        &mut self,
        bus: &mut O,
        delay: &mut D,
    ) -> Ds18b20Result<&[Ds18b20], O::BusError> {
        self.trigger_temperature_conversion(bus, delay)?;
        self.read_temperatures(bus)
    }
}
