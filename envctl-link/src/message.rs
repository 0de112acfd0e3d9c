use crate::{Packet, PacketError, PacketId};

/// Sensor addressed by a calibration or measurement packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sensor {
    /// Electrical conductivity circuit.
    Conductivity,
    /// pH circuit.
    Ph,
}

/// Calibration point. Conductivity supports dry/low/high, pH low/mid/high.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CalibrationPoint {
    /// Sensor dry in air.
    Dry,
    /// Low reference solution.
    Low,
    /// Mid reference solution.
    Mid,
    /// High reference solution.
    High,
}

/// Switchable light channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LightChannel {
    /// Main light.
    Main,
    /// Blue channel.
    Blue,
    /// Red channel.
    Red,
    /// White channel.
    White,
}

/// Typed view of a [`Packet`], one variant per identifier.
///
/// Multi-byte integers are little-endian on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Message<'a> {
    /// Log text.
    Logging(&'a str),
    /// Set the resolution index of every temperature sensor (0 = 12 bit ... 3 = 9 bit).
    SetResolution(u8),
    /// Query the temperature resolution.
    GetResolution,
    /// Measure every temperature sensor.
    MeasureTemperature,
    /// One temperature reading: sensor ROM and raw 1/16 °C value.
    Temperature {
        /// Sensor ROM address.
        rom: [u8; 8],
        /// Two's complement temperature in 1/16 °C.
        raw: u16,
    },
    /// Current temperature resolution index.
    Resolution(u8),
    /// Measure a sensor.
    Measure(Sensor),
    /// Query the calibration export format of a sensor.
    GetCalibrationFormat(Sensor),
    /// Import one calibration chunk into a sensor.
    ImportCalibration(Sensor, &'a [u8]),
    /// Export the calibration of a sensor.
    ExportCalibration(Sensor),
    /// Clear the calibration of a sensor.
    ClearCalibration(Sensor),
    /// Calibrate a sensor at a reference point.
    Calibrate(Sensor, CalibrationPoint),
    /// Temperature compensation in hundredths of a degree Celsius.
    Compensation(Sensor, u32),
    /// Reading: µS/cm for conductivity, thousandths of pH for pH.
    Reading(Sensor, u32),
    /// Calibration export format.
    CalibrationFormat {
        /// Sensor.
        sensor: Sensor,
        /// Number of export strings.
        strings: u8,
        /// Total number of export bytes.
        bytes: u8,
    },
    /// Exported calibration.
    CalibrationData(Sensor, &'a [u8]),
    /// Switch a light channel.
    SetLight(LightChannel, u8),
    /// Query a light channel.
    GetLight(LightChannel),
    /// Light channel state.
    LightState(LightChannel, u8),
    /// Set a fan speed.
    SetFanSpeed {
        /// Fan index.
        index: u8,
        /// Speed.
        speed: u16,
    },
    /// Query a fan speed.
    GetFanSpeed(u8),
    /// Fan speed.
    FanSpeed {
        /// Fan index.
        index: u8,
        /// Speed.
        speed: u16,
    },
    /// Ask whether the device is ready.
    ReadyRequest,
    /// The device is ready for one command.
    Ready,
    /// Acknowledges a command.
    Ack(PacketId),
    /// Identifier without a typed view.
    Unknown {
        /// Raw identifier.
        id: u8,
        /// Payload.
        payload: &'a [u8],
    },
}

fn fixed<const N: usize>(id: PacketId, payload: &[u8]) -> Result<[u8; N], PacketError> {
    payload
        .try_into()
        .map_err(|_| PacketError::InvalidPayload(id))
}

fn empty(id: PacketId, payload: &[u8]) -> Result<(), PacketError> {
    fixed::<0>(id, payload).map(|_| ())
}

fn sensor_id(sensor: Sensor, ec: PacketId, ph: PacketId) -> PacketId {
    match sensor {
        Sensor::Conductivity => ec,
        Sensor::Ph => ph,
    }
}

fn light_id(channel: LightChannel, ids: [PacketId; 4]) -> PacketId {
    match channel {
        LightChannel::Main => ids[0],
        LightChannel::Blue => ids[1],
        LightChannel::Red => ids[2],
        LightChannel::White => ids[3],
    }
}

impl<'a> Message<'a> {
    /// Decodes the payload of `packet`.
    pub fn from_packet(packet: &'a Packet) -> Result<Self, PacketError> {
        use CalibrationPoint::*;
        use LightChannel::*;
        use PacketId::*;
        use Sensor::*;

        let id = packet.id();
        let p = packet.payload();
        let msg = match id {
            Logging => Message::Logging(
                core::str::from_utf8(p).map_err(|_| PacketError::InvalidPayload(id))?,
            ),
            CmdOwiSetResolution => Message::SetResolution(fixed::<1>(id, p)?[0]),
            CmdOwiGetResolution => empty(id, p).map(|_| Message::GetResolution)?,
            CmdOwiMeasure => empty(id, p).map(|_| Message::MeasureTemperature)?,
            DataOwi => {
                let b = fixed::<10>(id, p)?;
                let mut rom = [0; 8];
                rom.copy_from_slice(&b[..8]);
                Message::Temperature {
                    rom,
                    raw: u16::from_le_bytes([b[8], b[9]]),
                }
            }
            ResponseOwiGetResolution => Message::Resolution(fixed::<1>(id, p)?[0]),

            CmdEcMeasure | CmdPhMeasure => {
                let sensor = if id == CmdEcMeasure { Conductivity } else { Ph };
                empty(id, p).map(|_| Message::Measure(sensor))?
            }
            CmdEcGetCalibrationFormat | CmdPhGetCalibrationFormat => {
                let sensor = if id == CmdEcGetCalibrationFormat { Conductivity } else { Ph };
                empty(id, p).map(|_| Message::GetCalibrationFormat(sensor))?
            }
            CmdEcImportCalibration => Message::ImportCalibration(Conductivity, p),
            CmdPhImportCalibration => Message::ImportCalibration(Ph, p),
            CmdEcExportCalibration | CmdPhExportCalibration => {
                let sensor = if id == CmdEcExportCalibration { Conductivity } else { Ph };
                empty(id, p).map(|_| Message::ExportCalibration(sensor))?
            }
            CmdEcClearCalibration | CmdPhClearCalibration => {
                let sensor = if id == CmdEcClearCalibration { Conductivity } else { Ph };
                empty(id, p).map(|_| Message::ClearCalibration(sensor))?
            }
            CmdEcCalibrateDry => empty(id, p).map(|_| Message::Calibrate(Conductivity, Dry))?,
            CmdEcCalibrateLow => empty(id, p).map(|_| Message::Calibrate(Conductivity, Low))?,
            CmdEcCalibrateHigh => empty(id, p).map(|_| Message::Calibrate(Conductivity, High))?,
            CmdPhCalibrateLow => empty(id, p).map(|_| Message::Calibrate(Ph, Low))?,
            CmdPhCalibrateMid => empty(id, p).map(|_| Message::Calibrate(Ph, Mid))?,
            CmdPhCalibrateHigh => empty(id, p).map(|_| Message::Calibrate(Ph, High))?,
            CmdEcCompensation => {
                Message::Compensation(Conductivity, u32::from_le_bytes(fixed(id, p)?))
            }
            CmdPhCompensation => Message::Compensation(Ph, u32::from_le_bytes(fixed(id, p)?)),
            DataEc => Message::Reading(Conductivity, u32::from_le_bytes(fixed(id, p)?)),
            DataPh => Message::Reading(Ph, u32::from_le_bytes(fixed(id, p)?)),
            ResponseEcGetCalibrationFormat | ResponsePhGetCalibrationFormat => {
                let [strings, bytes] = fixed::<2>(id, p)?;
                Message::CalibrationFormat {
                    sensor: if id == ResponseEcGetCalibrationFormat { Conductivity } else { Ph },
                    strings,
                    bytes,
                }
            }
            ResponseEcExportCalibration => Message::CalibrationData(Conductivity, p),
            ResponsePhExportCalibration => Message::CalibrationData(Ph, p),

            CmdLightSet => Message::SetLight(Main, fixed::<1>(id, p)?[0]),
            CmdLightBlueSet => Message::SetLight(Blue, fixed::<1>(id, p)?[0]),
            CmdLightRedSet => Message::SetLight(Red, fixed::<1>(id, p)?[0]),
            CmdLightWhiteSet => Message::SetLight(White, fixed::<1>(id, p)?[0]),
            CmdLightGet => empty(id, p).map(|_| Message::GetLight(Main))?,
            CmdLightBlueGet => empty(id, p).map(|_| Message::GetLight(Blue))?,
            CmdLightRedGet => empty(id, p).map(|_| Message::GetLight(Red))?,
            CmdLightWhiteGet => empty(id, p).map(|_| Message::GetLight(White))?,
            ResponseLightGet => Message::LightState(Main, fixed::<1>(id, p)?[0]),
            ResponseLightBlueGet => Message::LightState(Blue, fixed::<1>(id, p)?[0]),
            ResponseLightRedGet => Message::LightState(Red, fixed::<1>(id, p)?[0]),
            ResponseLightWhiteGet => Message::LightState(White, fixed::<1>(id, p)?[0]),

            CmdFanSetSpeed | ResponseFanGetSpeed => {
                let [index, lo, hi] = fixed::<3>(id, p)?;
                let speed = u16::from_le_bytes([lo, hi]);
                if id == CmdFanSetSpeed {
                    Message::SetFanSpeed { index, speed }
                } else {
                    Message::FanSpeed { index, speed }
                }
            }
            CmdFanGetSpeed => Message::GetFanSpeed(fixed::<1>(id, p)?[0]),

            ReadyRequest => empty(id, p).map(|_| Message::ReadyRequest)?,
            ResponseReadyRequest => empty(id, p).map(|_| Message::Ready)?,
            Ack => Message::Ack(PacketId::from(fixed::<1>(id, p)?[0])),
            Unknown(raw) => Message::Unknown { id: raw, payload: p },
        };
        Ok(msg)
    }

    /// Identifier of the packet carrying this message.
    ///
    /// Fails for calibration points the sensor does not support.
    pub fn id(&self) -> Result<PacketId, PacketError> {
        use CalibrationPoint::*;
        use PacketId::*;
        use Sensor::*;

        Ok(match *self {
            Message::Logging(_) => Logging,
            Message::SetResolution(_) => CmdOwiSetResolution,
            Message::GetResolution => CmdOwiGetResolution,
            Message::MeasureTemperature => CmdOwiMeasure,
            Message::Temperature { .. } => DataOwi,
            Message::Resolution(_) => ResponseOwiGetResolution,
            Message::Measure(s) => sensor_id(s, CmdEcMeasure, CmdPhMeasure),
            Message::GetCalibrationFormat(s) => {
                sensor_id(s, CmdEcGetCalibrationFormat, CmdPhGetCalibrationFormat)
            }
            Message::ImportCalibration(s, _) => {
                sensor_id(s, CmdEcImportCalibration, CmdPhImportCalibration)
            }
            Message::ExportCalibration(s) => {
                sensor_id(s, CmdEcExportCalibration, CmdPhExportCalibration)
            }
            Message::ClearCalibration(s) => {
                sensor_id(s, CmdEcClearCalibration, CmdPhClearCalibration)
            }
            Message::Calibrate(s, point) => match (s, point) {
                (Conductivity, Dry) => CmdEcCalibrateDry,
                (Conductivity, Low) => CmdEcCalibrateLow,
                (Conductivity, High) => CmdEcCalibrateHigh,
                (Ph, Low) => CmdPhCalibrateLow,
                (Ph, Mid) => CmdPhCalibrateMid,
                (Ph, High) => CmdPhCalibrateHigh,
                (Conductivity, Mid) => return Err(PacketError::InvalidPayload(CmdEcCalibrateLow)),
                (Ph, Dry) => return Err(PacketError::InvalidPayload(CmdPhCalibrateLow)),
            },
            Message::Compensation(s, _) => sensor_id(s, CmdEcCompensation, CmdPhCompensation),
            Message::Reading(s, _) => sensor_id(s, DataEc, DataPh),
            Message::CalibrationFormat { sensor, .. } => sensor_id(
                sensor,
                ResponseEcGetCalibrationFormat,
                ResponsePhGetCalibrationFormat,
            ),
            Message::CalibrationData(s, _) => {
                sensor_id(s, ResponseEcExportCalibration, ResponsePhExportCalibration)
            }
            Message::SetLight(ch, _) => light_id(
                ch,
                [CmdLightSet, CmdLightBlueSet, CmdLightRedSet, CmdLightWhiteSet],
            ),
            Message::GetLight(ch) => light_id(
                ch,
                [CmdLightGet, CmdLightBlueGet, CmdLightRedGet, CmdLightWhiteGet],
            ),
            Message::LightState(ch, _) => light_id(
                ch,
                [
                    ResponseLightGet,
                    ResponseLightBlueGet,
                    ResponseLightRedGet,
                    ResponseLightWhiteGet,
                ],
            ),
            Message::SetFanSpeed { .. } => CmdFanSetSpeed,
            Message::GetFanSpeed(_) => CmdFanGetSpeed,
            Message::FanSpeed { .. } => ResponseFanGetSpeed,
            Message::ReadyRequest => ReadyRequest,
            Message::Ready => ResponseReadyRequest,
            Message::Ack(_) => Ack,
            Message::Unknown { id, .. } => PacketId::from(id),
        })
    }

    /// Encodes the message into a packet.
    pub fn to_packet(&self) -> Result<Packet, PacketError> {
        let id = self.id()?;
        match *self {
            Message::Logging(text) => Packet::new(id, text.as_bytes()),
            Message::SetResolution(v)
            | Message::Resolution(v)
            | Message::SetLight(_, v)
            | Message::LightState(_, v)
            | Message::GetFanSpeed(v) => Packet::new(id, &[v]),
            Message::Temperature { rom, raw } => {
                let mut buf = [0; 10];
                buf[..8].copy_from_slice(&rom);
                buf[8..].copy_from_slice(&raw.to_le_bytes());
                Packet::new(id, &buf)
            }
            Message::ImportCalibration(_, data)
            | Message::CalibrationData(_, data)
            | Message::Unknown { payload: data, .. } => Packet::new(id, data),
            Message::Compensation(_, v) | Message::Reading(_, v) => {
                Packet::new(id, &v.to_le_bytes())
            }
            Message::CalibrationFormat { strings, bytes, .. } => Packet::new(id, &[strings, bytes]),
            Message::SetFanSpeed { index, speed } | Message::FanSpeed { index, speed } => {
                let [lo, hi] = speed.to_le_bytes();
                Packet::new(id, &[index, lo, hi])
            }
            Message::Ack(acked) => Packet::new(id, &[acked.into()]),
            Message::GetResolution
            | Message::MeasureTemperature
            | Message::Measure(_)
            | Message::GetCalibrationFormat(_)
            | Message::ExportCalibration(_)
            | Message::ClearCalibration(_)
            | Message::Calibrate(..)
            | Message::GetLight(_)
            | Message::ReadyRequest
            | Message::Ready => Ok(Packet::empty(id)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reencode(msg: Message<'_>) {
        let packet = msg.to_packet().unwrap();
        assert_eq!(Message::from_packet(&packet), Ok(msg));
    }

    #[test]
    fn typed_views_survive_encoding() {
        reencode(Message::Logging("owi: 3 devices"));
        reencode(Message::SetResolution(2));
        reencode(Message::Temperature {
            rom: [0x28, 1, 2, 3, 4, 5, 6, 0x7c],
            raw: 0xfe6f,
        });
        reencode(Message::Calibrate(Sensor::Ph, CalibrationPoint::Mid));
        reencode(Message::Compensation(Sensor::Conductivity, 2150));
        reencode(Message::CalibrationFormat {
            sensor: Sensor::Ph,
            strings: 10,
            bytes: 120,
        });
        reencode(Message::CalibrationData(Sensor::Conductivity, b"ABCDE\0"));
        reencode(Message::LightState(LightChannel::Red, 1));
        reencode(Message::SetFanSpeed {
            index: 1,
            speed: 2048,
        });
        reencode(Message::Ack(PacketId::CmdOwiMeasure));
        reencode(Message::Unknown {
            id: 200,
            payload: &[1, 2, 3],
        });
    }

    #[test]
    fn wire_layouts() {
        let p = Message::FanSpeed {
            index: 2,
            speed: 0x1234,
        }
        .to_packet()
        .unwrap();
        assert_eq!(p.id(), PacketId::ResponseFanGetSpeed);
        assert_eq!(p.payload(), &[2, 0x34, 0x12]);

        let p = Message::Reading(Sensor::Ph, 7012).to_packet().unwrap();
        assert_eq!(p.id(), PacketId::DataPh);
        assert_eq!(p.payload(), &7012u32.to_le_bytes());

        let p = Message::GetLight(LightChannel::White).to_packet().unwrap();
        assert_eq!(p.id(), PacketId::CmdLightWhiteGet);
        assert!(p.payload().is_empty());
    }

    #[test]
    fn unsupported_calibration_point() {
        assert!(
            Message::Calibrate(Sensor::Conductivity, CalibrationPoint::Mid)
                .to_packet()
                .is_err()
        );
    }

    #[test]
    fn wrong_payload_size_is_rejected() {
        let packet = Packet::new(PacketId::DataEc, &[1, 2, 3]).unwrap();
        assert_eq!(
            Message::from_packet(&packet),
            Err(PacketError::InvalidPayload(PacketId::DataEc))
        );
        let packet = Packet::new(PacketId::CmdEcMeasure, &[0]).unwrap();
        assert!(Message::from_packet(&packet).is_err());
    }
}
