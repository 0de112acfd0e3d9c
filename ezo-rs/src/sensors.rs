use core::ops::Deref;

use embedded_hal::delay::DelayNs;
use envctl_twi::TwoWireBus;

use crate::{Ezo, EzoConfig, EzoResult};

/// Scales a reading to an unsigned integer. Negative readings are reported as zero.
fn unsigned(address: u8, reading: f32, scale: f32) -> u32 {
    if reading < 0.0 {
        log::warn!("{address:#04x}: negative reading {reading} reported as 0");
        return 0;
    }
    (reading * scale + 0.5) as u32
}

/// Conductivity circuit.
///
/// Dereferences to [`Ezo`] for the calibration transfer and compensation commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Conductivity(Ezo);

impl Default for Conductivity {
    fn default() -> Self {
        Self::new()
    }
}

impl Conductivity {
    /// Default bus address.
    pub const ADDRESS: u8 = 0x65;

    /// Circuit at the default address.
    pub const fn new() -> Self {
        Self(Ezo::new(EzoConfig::new(Self::ADDRESS)))
    }

    /// Circuit with a custom configuration.
    pub const fn with_config(config: EzoConfig) -> Self {
        Self(Ezo::new(config))
    }

    /// Conductivity in µS/cm.
    pub fn read<B: TwoWireBus, D: DelayNs>(
        &self,
        bus: &mut B,
        delay: &mut D,
    ) -> EzoResult<u32, B::Error> {
        let reading = self.0.read(bus, delay)?;
        Ok(unsigned(self.0.config().address(), reading, 1.0))
    }

    /// Dry calibration with the sensor in air.
    pub fn calibrate_dry<B: TwoWireBus, D: DelayNs>(
        &self,
        bus: &mut B,
        delay: &mut D,
    ) -> EzoResult<(), B::Error> {
        self.0.calibrate(bus, delay, "Cal,dry")
    }

    /// Low point calibration in 12 880 µS/cm solution.
    pub fn calibrate_low<B: TwoWireBus, D: DelayNs>(
        &self,
        bus: &mut B,
        delay: &mut D,
    ) -> EzoResult<(), B::Error> {
        self.0.calibrate(bus, delay, "Cal,low,12880")
    }

    /// High point calibration in 80 000 µS/cm solution.
    pub fn calibrate_high<B: TwoWireBus, D: DelayNs>(
        &self,
        bus: &mut B,
        delay: &mut D,
    ) -> EzoResult<(), B::Error> {
        self.0.calibrate(bus, delay, "Cal,high,80000")
    }
}

impl Deref for Conductivity {
    type Target = Ezo;

    fn deref(&self) -> &Ezo {
        &self.0
    }
}

/// pH circuit.
///
/// Dereferences to [`Ezo`] for the calibration transfer and compensation commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ph(Ezo);

impl Default for Ph {
    fn default() -> Self {
        Self::new()
    }
}

impl Ph {
    /// Default bus address.
    pub const ADDRESS: u8 = 0x64;

    /// Circuit at the default address. Clearing the calibration waits 300 ms.
    pub const fn new() -> Self {
        let mut config = EzoConfig::new(Self::ADDRESS);
        config.clear_wait_ms = 300;
        Self(Ezo::new(config))
    }

    /// Circuit with a custom configuration.
    pub const fn with_config(config: EzoConfig) -> Self {
        Self(Ezo::new(config))
    }

    /// pH in thousandths.
    pub fn read<B: TwoWireBus, D: DelayNs>(
        &self,
        bus: &mut B,
        delay: &mut D,
    ) -> EzoResult<u32, B::Error> {
        let reading = self.0.read(bus, delay)?;
        Ok(unsigned(self.0.config().address(), reading, 1000.0))
    }

    /// Low point calibration at pH 4.
    pub fn calibrate_low<B: TwoWireBus, D: DelayNs>(
        &self,
        bus: &mut B,
        delay: &mut D,
    ) -> EzoResult<(), B::Error> {
        self.0.calibrate(bus, delay, "Cal,low,4.00")
    }

    /// Mid point calibration at pH 7.
    pub fn calibrate_mid<B: TwoWireBus, D: DelayNs>(
        &self,
        bus: &mut B,
        delay: &mut D,
    ) -> EzoResult<(), B::Error> {
        self.0.calibrate(bus, delay, "Cal,mid,7.00")
    }

    /// High point calibration at pH 10.
    pub fn calibrate_high<B: TwoWireBus, D: DelayNs>(
        &self,
        bus: &mut B,
        delay: &mut D,
    ) -> EzoResult<(), B::Error> {
        self.0.calibrate(bus, delay, "Cal,high,10.00")
    }
}

impl Deref for Ph {
    type Target = Ezo;

    fn deref(&self) -> &Ezo {
        &self.0
    }
}
