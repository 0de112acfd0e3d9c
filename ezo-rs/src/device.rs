use core::fmt::Write as _;

use embedded_hal::delay::DelayNs;
use envctl_twi::{Transaction, TwoWireBus};
use heapless::{String, Vec};

use crate::{
    EzoConfig, EzoError, EzoResult, MAX_CALIBRATION_LEN, MAX_COMMAND_LEN, MAX_RESPONSE_LEN,
};

const EXPORT_DONE: &[u8] = b"*DONE";

/// Status byte leading every response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseCode {
    /// The command succeeded.
    Success,
    /// The command was not understood.
    SyntaxError,
    /// The command has not finished yet.
    StillProcessing,
    /// Nothing to report.
    NoData,
    /// Code outside the protocol.
    Unknown(u8),
}

impl From<u8> for ResponseCode {
    fn from(value: u8) -> Self {
        match value {
            1 => Self::Success,
            2 => Self::SyntaxError,
            254 => Self::StillProcessing,
            255 => Self::NoData,
            other => Self::Unknown(other),
        }
    }
}

/// One response: the status code and the ASCII data that follows it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    code: ResponseCode,
    data: Vec<u8, MAX_RESPONSE_LEN>,
}

impl Response {
    /// Status code.
    pub fn code(&self) -> ResponseCode {
        self.code
    }

    /// Data following the status code, without the terminating NUL.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Data as text, if it is valid UTF-8.
    pub fn as_str(&self) -> Option<&str> {
        core::str::from_utf8(&self.data).ok()
    }
}

/// Generic EZO circuit speaking the ASCII command protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ezo {
    config: EzoConfig,
}

impl Ezo {
    /// Creates a circuit handle.
    pub const fn new(config: EzoConfig) -> Self {
        Self { config }
    }

    /// Configuration in use.
    pub fn config(&self) -> &EzoConfig {
        &self.config
    }

    /// Writes `command` in one transaction.
    pub fn send_command<B: TwoWireBus>(
        &self,
        bus: &mut B,
        command: &str,
    ) -> EzoResult<(), B::Error> {
        log::debug!("{:#04x} <- {command}", self.config.address);
        let mut t = Transaction::begin_write(bus, self.config.address)?;
        t.write(command.as_bytes())?;
        t.end();
        Ok(())
    }

    /// Reads one response.
    ///
    /// Bytes are acknowledged up to and including the terminating NUL, then one more byte
    /// is read without acknowledge before the stop condition.
    pub fn read_response<B: TwoWireBus>(&self, bus: &mut B) -> EzoResult<Response, B::Error> {
        let mut raw: Vec<u8, MAX_RESPONSE_LEN> = Vec::new();
        let mut t = Transaction::begin_read(bus, self.config.address)?;
        loop {
            let byte = t.read_byte(true)?;
            if byte == 0 {
                break;
            }
            raw.push(byte).map_err(|_| EzoError::ResponseOverflow)?;
        }
        t.read_byte(false)?;
        t.end();

        let (&code, data) = raw.split_first().ok_or(EzoError::InvalidResponse)?;
        let response = Response {
            code: ResponseCode::from(code),
            data: Vec::from_slice(data).map_err(|_| EzoError::ResponseOverflow)?,
        };
        log::debug!("{:#04x} -> {:?}", self.config.address, response.code);
        Ok(response)
    }

    /// Sends `command`, waits `wait_ms` and polls until the circuit reports a final status.
    ///
    /// Returns the successful response.
    pub fn exchange<B: TwoWireBus, D: DelayNs>(
        &self,
        bus: &mut B,
        delay: &mut D,
        command: &str,
        wait_ms: u32,
    ) -> EzoResult<Response, B::Error> {
        self.send_command(bus, command)?;
        delay.delay_ms(wait_ms);
        let mut pending = 0u32;
        loop {
            let response = self.read_response(bus)?;
            match response.code {
                ResponseCode::Success => return Ok(response),
                ResponseCode::SyntaxError => return Err(EzoError::SyntaxError),
                ResponseCode::NoData => return Err(EzoError::NoData),
                ResponseCode::Unknown(code) => return Err(EzoError::UnexpectedCode(code)),
                ResponseCode::StillProcessing => {
                    pending += 1;
                    if self.config.max_pending_polls.is_some_and(|max| pending > max) {
                        return Err(EzoError::StillProcessing);
                    }
                    log::warn!("{command}: still processing ({pending})");
                    delay.delay_ms(self.config.pending_poll_interval_ms);
                }
            }
        }
    }

    /// Takes a reading and parses it as a decimal number.
    ///
    /// Text that is not a finite number is an [`EzoError::InvalidResponse`].
    pub fn read<B: TwoWireBus, D: DelayNs>(
        &self,
        bus: &mut B,
        delay: &mut D,
    ) -> EzoResult<f32, B::Error> {
        let response = self.exchange(bus, delay, "R", self.config.read_wait_ms)?;
        let value: f32 = response
            .as_str()
            .ok_or(EzoError::InvalidResponse)?
            .trim()
            .parse()
            .map_err(|_| EzoError::InvalidResponse)?;
        if !value.is_finite() {
            return Err(EzoError::InvalidResponse);
        }
        Ok(value)
    }

    /// Runs a calibration command such as `Cal,mid,7.00`.
    pub fn calibrate<B: TwoWireBus, D: DelayNs>(
        &self,
        bus: &mut B,
        delay: &mut D,
        command: &str,
    ) -> EzoResult<(), B::Error> {
        self.exchange(bus, delay, command, self.config.read_wait_ms)?;
        log::info!("{:#04x}: {command} done", self.config.address);
        Ok(())
    }

    /// Deletes the calibration data.
    pub fn clear_calibration<B: TwoWireBus, D: DelayNs>(
        &self,
        bus: &mut B,
        delay: &mut D,
    ) -> EzoResult<(), B::Error> {
        self.exchange(bus, delay, "Cal,clear", self.config.clear_wait_ms)?;
        log::info!("{:#04x}: calibration cleared", self.config.address);
        Ok(())
    }

    /// Queries how the calibration export is split: `(strings, bytes)`.
    pub fn calibration_format<B: TwoWireBus, D: DelayNs>(
        &self,
        bus: &mut B,
        delay: &mut D,
    ) -> EzoResult<(u8, u8), B::Error> {
        let response = self.exchange(bus, delay, "Export,?", self.config.general_wait_ms)?;
        let text = response.as_str().ok_or(EzoError::InvalidResponse)?;
        let mut fields = text.split(',').map(|f| f.trim().parse::<u8>());
        match (fields.next(), fields.next()) {
            (Some(Ok(strings)), Some(Ok(bytes))) => {
                log::info!(
                    "{:#04x}: calibration is {bytes} bytes in {strings} strings",
                    self.config.address
                );
                Ok((strings, bytes))
            }
            _ => Err(EzoError::InvalidResponse),
        }
    }

    /// Exports the calibration: chunks are requested until the circuit answers `*DONE`.
    ///
    /// The result is the concatenation of every chunk followed by a NUL byte.
    pub fn export_calibration<B: TwoWireBus, D: DelayNs>(
        &self,
        bus: &mut B,
        delay: &mut D,
    ) -> EzoResult<Vec<u8, MAX_CALIBRATION_LEN>, B::Error> {
        let mut blob = Vec::new();
        loop {
            let chunk = self.exchange(bus, delay, "Export", self.config.export_wait_ms)?;
            if chunk.data() == EXPORT_DONE {
                blob.push(0).map_err(|_| EzoError::ResponseOverflow)?;
                log::info!(
                    "{:#04x}: exported {} calibration bytes",
                    self.config.address,
                    blob.len()
                );
                return Ok(blob);
            }
            blob.extend_from_slice(chunk.data())
                .map_err(|_| EzoError::ResponseOverflow)?;
        }
    }

    /// Imports one calibration chunk previously obtained with [`Ezo::export_calibration`].
    pub fn import_calibration<B: TwoWireBus, D: DelayNs>(
        &self,
        bus: &mut B,
        delay: &mut D,
        chunk: &str,
    ) -> EzoResult<(), B::Error> {
        let mut command: String<MAX_COMMAND_LEN> = String::new();
        write!(command, "Import,{chunk}").map_err(|_| EzoError::CommandTooLong)?;
        self.exchange(bus, delay, &command, self.config.read_wait_ms)?;
        Ok(())
    }

    /// Sets the temperature used for compensation, in °C with two decimals.
    pub fn set_temperature_compensation<B: TwoWireBus, D: DelayNs>(
        &self,
        bus: &mut B,
        delay: &mut D,
        celsius: f32,
    ) -> EzoResult<(), B::Error> {
        let mut command: String<MAX_COMMAND_LEN> = String::new();
        write!(command, "T,{celsius:.2}").map_err(|_| EzoError::CommandTooLong)?;
        self.exchange(bus, delay, &command, self.config.read_wait_ms)?;
        log::info!("{:#04x}: compensating for {celsius:.2} °C", self.config.address);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn response_codes() {
        assert_eq!(ResponseCode::from(1), ResponseCode::Success);
        assert_eq!(ResponseCode::from(2), ResponseCode::SyntaxError);
        assert_eq!(ResponseCode::from(254), ResponseCode::StillProcessing);
        assert_eq!(ResponseCode::from(255), ResponseCode::NoData);
        assert_eq!(ResponseCode::from(3), ResponseCode::Unknown(3));
    }
}
