macro_rules! packet_ids {
    ($($(#[$doc:meta])* $name:ident = $value:literal,)*) => {
        /// Identifier carried in the first byte of every packet.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum PacketId {
            $($(#[$doc])* $name,)*
            /// Identifier not known to this protocol version.
            Unknown(u8),
        }

        impl From<u8> for PacketId {
            fn from(value: u8) -> Self {
                match value {
                    $($value => Self::$name,)*
                    other => Self::Unknown(other),
                }
            }
        }

        impl From<PacketId> for u8 {
            fn from(id: PacketId) -> u8 {
                match id {
                    $(PacketId::$name => $value,)*
                    PacketId::Unknown(value) => value,
                }
            }
        }
    };
}

packet_ids! {
    /// Free-form log text from the device.
    Logging = 0,
    /// Set the resolution of every temperature sensor.
    CmdOwiSetResolution = 1,
    /// Query the temperature sensor resolution.
    CmdOwiGetResolution = 2,
    /// Measure every temperature sensor.
    CmdOwiMeasure = 3,
    /// One temperature reading.
    DataOwi = 4,
    /// Current temperature sensor resolution.
    ResponseOwiGetResolution = 5,
    /// Measure conductivity.
    CmdEcMeasure = 6,
    /// Query the conductivity calibration export format.
    CmdEcGetCalibrationFormat = 7,
    /// Import a conductivity calibration chunk.
    CmdEcImportCalibration = 8,
    /// Export the conductivity calibration.
    CmdEcExportCalibration = 9,
    /// Clear the conductivity calibration.
    CmdEcClearCalibration = 10,
    /// Dry conductivity calibration.
    CmdEcCalibrateDry = 11,
    /// Low point conductivity calibration.
    CmdEcCalibrateLow = 12,
    /// High point conductivity calibration.
    CmdEcCalibrateHigh = 13,
    /// Conductivity temperature compensation.
    CmdEcCompensation = 14,
    /// Conductivity reading.
    DataEc = 15,
    /// Conductivity calibration export format.
    ResponseEcGetCalibrationFormat = 16,
    /// Exported conductivity calibration.
    ResponseEcExportCalibration = 17,
    /// Measure pH.
    CmdPhMeasure = 18,
    /// Query the pH calibration export format.
    CmdPhGetCalibrationFormat = 19,
    /// Import a pH calibration chunk.
    CmdPhImportCalibration = 20,
    /// Export the pH calibration.
    CmdPhExportCalibration = 21,
    /// Clear the pH calibration.
    CmdPhClearCalibration = 22,
    /// Low point pH calibration.
    CmdPhCalibrateLow = 23,
    /// Mid point pH calibration.
    CmdPhCalibrateMid = 24,
    /// High point pH calibration.
    CmdPhCalibrateHigh = 25,
    /// pH temperature compensation.
    CmdPhCompensation = 26,
    /// pH reading.
    DataPh = 27,
    /// pH calibration export format.
    ResponsePhGetCalibrationFormat = 28,
    /// Exported pH calibration.
    ResponsePhExportCalibration = 29,
    /// Switch the main light.
    CmdLightSet = 30,
    /// Query the main light.
    CmdLightGet = 31,
    /// Main light state.
    ResponseLightGet = 32,
    /// Switch the blue light.
    CmdLightBlueSet = 33,
    /// Query the blue light.
    CmdLightBlueGet = 34,
    /// Blue light state.
    ResponseLightBlueGet = 35,
    /// Switch the red light.
    CmdLightRedSet = 36,
    /// Query the red light.
    CmdLightRedGet = 37,
    /// Red light state.
    ResponseLightRedGet = 38,
    /// Switch the white light.
    CmdLightWhiteSet = 39,
    /// Query the white light.
    CmdLightWhiteGet = 40,
    /// White light state.
    ResponseLightWhiteGet = 41,
    /// Set a fan speed.
    CmdFanSetSpeed = 42,
    /// Query a fan speed.
    CmdFanGetSpeed = 43,
    /// Fan speed.
    ResponseFanGetSpeed = 44,
    /// Ask whether the device is ready for a command.
    ReadyRequest = 45,
    /// The device is ready for a command.
    ResponseReadyRequest = 46,
    /// Acknowledges a command.
    Ack = 47,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_byte_roundtrips() {
        for value in 0..=255u8 {
            assert_eq!(u8::from(PacketId::from(value)), value);
        }
        assert_eq!(PacketId::from(47), PacketId::Ack);
        assert_eq!(PacketId::from(48), PacketId::Unknown(48));
    }
}
