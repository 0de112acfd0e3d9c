/// Timing and addressing of one EZO circuit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EzoConfig {
    pub(crate) address: u8,
    pub(crate) read_wait_ms: u32,
    pub(crate) general_wait_ms: u32,
    pub(crate) clear_wait_ms: u32,
    pub(crate) export_wait_ms: u32,
    pub(crate) max_pending_polls: Option<u32>,
    pub(crate) pending_poll_interval_ms: u32,
}

impl EzoConfig {
    /// Configuration for the circuit at `address` with the datasheet wait times.
    ///
    /// "Still processing" responses are polled forever, without pause.
    pub const fn new(address: u8) -> Self {
        Self {
            address,
            read_wait_ms: 900,
            general_wait_ms: 300,
            clear_wait_ms: 900,
            export_wait_ms: 0,
            max_pending_polls: None,
            pending_poll_interval_ms: 0,
        }
    }

    /// Wait after reads, calibrations and temperature compensation.
    pub fn with_read_wait_ms(mut self, ms: u32) -> Self {
        self.read_wait_ms = ms;
        self
    }

    /// Wait after format queries.
    pub fn with_general_wait_ms(mut self, ms: u32) -> Self {
        self.general_wait_ms = ms;
        self
    }

    /// Wait after clearing the calibration.
    pub fn with_clear_wait_ms(mut self, ms: u32) -> Self {
        self.clear_wait_ms = ms;
        self
    }

    /// Wait after each export chunk request. Chunks are read back immediately by default.
    pub fn with_export_wait_ms(mut self, ms: u32) -> Self {
        self.export_wait_ms = ms;
        self
    }

    /// Bounds how many "still processing" responses are tolerated per command.
    /// `None` polls forever.
    pub fn with_max_pending_polls(mut self, polls: Option<u32>) -> Self {
        self.max_pending_polls = polls;
        self
    }

    /// Pause between two polls of a circuit that is still processing.
    pub fn with_pending_poll_interval_ms(mut self, ms: u32) -> Self {
        self.pending_poll_interval_ms = ms;
        self
    }

    /// Bus address.
    pub fn address(&self) -> u8 {
        self.address
    }
}
