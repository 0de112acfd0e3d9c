use clap::{Subcommand, ValueEnum};
use envctl_link::{CalibrationPoint, LightChannel, Message, Sensor};

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum SensorArg {
    Ec,
    Ph,
}

impl From<SensorArg> for Sensor {
    fn from(value: SensorArg) -> Self {
        match value {
            SensorArg::Ec => Sensor::Conductivity,
            SensorArg::Ph => Sensor::Ph,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum PointArg {
    Dry,
    Low,
    Mid,
    High,
}

impl From<PointArg> for CalibrationPoint {
    fn from(value: PointArg) -> Self {
        match value {
            PointArg::Dry => CalibrationPoint::Dry,
            PointArg::Low => CalibrationPoint::Low,
            PointArg::Mid => CalibrationPoint::Mid,
            PointArg::High => CalibrationPoint::High,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ChannelArg {
    Main,
    Blue,
    Red,
    White,
}

impl From<ChannelArg> for LightChannel {
    fn from(value: ChannelArg) -> Self {
        match value {
            ChannelArg::Main => LightChannel::Main,
            ChannelArg::Blue => LightChannel::Blue,
            ChannelArg::Red => LightChannel::Red,
            ChannelArg::White => LightChannel::White,
        }
    }
}

/// One command for the controller.
#[derive(Debug, Clone, Subcommand)]
pub enum Request {
    /// Set the temperature sensor resolution in bits (9 to 12).
    SetResolution {
        #[arg(value_parser = clap::value_parser!(u8).range(9..=12))]
        bits: u8,
    },
    /// Query the temperature sensor resolution.
    GetResolution,
    /// Measure every temperature sensor.
    Temperature,
    /// Measure conductivity or pH.
    Measure { sensor: SensorArg },
    /// Calibrate at a reference point (ec: dry/low/high, ph: low/mid/high).
    Calibrate { sensor: SensorArg, point: PointArg },
    /// Clear the calibration.
    ClearCalibration { sensor: SensorArg },
    /// Query the calibration export format.
    CalibrationFormat { sensor: SensorArg },
    /// Export the calibration.
    Export { sensor: SensorArg },
    /// Import one calibration chunk.
    Import { sensor: SensorArg, chunk: String },
    /// Set the compensation temperature in °C.
    Compensation {
        sensor: SensorArg,
        #[arg(allow_negative_numbers = true)]
        celsius: f32,
    },
    /// Switch a light channel on (1) or off (0).
    Light { channel: ChannelArg, state: u8 },
    /// Query a light channel.
    GetLight { channel: ChannelArg },
    /// Set a fan speed.
    Fan { index: u8, speed: u16 },
    /// Query a fan speed.
    GetFan { index: u8 },
}

impl Request {
    pub fn to_message(&self) -> Message<'_> {
        match self {
            Request::SetResolution { bits } => Message::SetResolution(12 - bits),
            Request::GetResolution => Message::GetResolution,
            Request::Temperature => Message::MeasureTemperature,
            Request::Measure { sensor } => Message::Measure((*sensor).into()),
            Request::Calibrate { sensor, point } => {
                Message::Calibrate((*sensor).into(), (*point).into())
            }
            Request::ClearCalibration { sensor } => Message::ClearCalibration((*sensor).into()),
            Request::CalibrationFormat { sensor } => {
                Message::GetCalibrationFormat((*sensor).into())
            }
            Request::Export { sensor } => Message::ExportCalibration((*sensor).into()),
            Request::Import { sensor, chunk } => {
                Message::ImportCalibration((*sensor).into(), chunk.as_bytes())
            }
            Request::Compensation { sensor, celsius } => {
                Message::Compensation((*sensor).into(), hundredths(*celsius))
            }
            Request::Light { channel, state } => Message::SetLight((*channel).into(), *state),
            Request::GetLight { channel } => Message::GetLight((*channel).into()),
            Request::Fan { index, speed } => Message::SetFanSpeed {
                index: *index,
                speed: *speed,
            },
            Request::GetFan { index } => Message::GetFanSpeed(*index),
        }
    }
}

/// Compensation temperature on the wire. Negative temperatures saturate at zero.
fn hundredths(celsius: f32) -> u32 {
    (celsius * 100.0).round() as u32
}

fn sensor_name(sensor: Sensor) -> &'static str {
    match sensor {
        Sensor::Conductivity => "ec",
        Sensor::Ph => "ph",
    }
}

/// Human readable form of a device message.
pub fn describe(message: &Message<'_>) -> String {
    match message {
        Message::Logging(text) => format!("device: {text}"),
        Message::Temperature { rom, raw } => {
            let rom: String = rom.iter().map(|b| format!("{b:02X}")).collect();
            format!("{rom}: {:.4} °C", *raw as i16 as f32 / 16.0)
        }
        Message::Resolution(index) => format!("resolution: {} bits", 12u8.saturating_sub(*index)),
        Message::Reading(Sensor::Conductivity, us) => format!("ec: {us} µS/cm"),
        Message::Reading(Sensor::Ph, milli) => format!("ph: {:.3}", *milli as f32 / 1000.0),
        Message::CalibrationFormat {
            sensor,
            strings,
            bytes,
        } => format!(
            "{}: calibration is {bytes} bytes in {strings} strings",
            sensor_name(*sensor)
        ),
        Message::CalibrationData(sensor, data) => format!(
            "{} calibration: {}",
            sensor_name(*sensor),
            String::from_utf8_lossy(data.strip_suffix(&[0]).unwrap_or(*data))
        ),
        Message::LightState(channel, state) => format!("light {channel:?}: {state}"),
        Message::FanSpeed { index, speed } => format!("fan {index}: {speed}"),
        Message::Ack(id) => format!("ack {id:?}"),
        other => format!("{other:?}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolution_bits_to_index() {
        let msg = Request::SetResolution { bits: 9 }.to_message();
        assert_eq!(msg, Message::SetResolution(3));
        assert_eq!(describe(&Message::Resolution(0)), "resolution: 12 bits");
    }

    #[test]
    fn compensation_in_hundredths() {
        assert_eq!(hundredths(21.456), 2146);
        assert_eq!(hundredths(-4.0), 0);
    }

    #[test]
    fn describes_readings() {
        let rom = [0x28, 0xff, 0x4c, 0x1d, 0x23, 0x17, 0x04, 0x5a];
        assert_eq!(
            describe(&Message::Temperature { rom, raw: 0xff5e }),
            "28FF4C1D2317045A: -10.1250 °C"
        );
        assert_eq!(describe(&Message::Reading(Sensor::Ph, 6875)), "ph: 6.875");
        assert_eq!(
            describe(&Message::CalibrationData(Sensor::Conductivity, b"ABCDE\0")),
            "ec calibration: ABCDE"
        );
    }
}
