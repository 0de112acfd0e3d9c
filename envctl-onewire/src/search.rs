use crate::{
    ONEWIRE_CONDITIONAL_SEARCH_CMD, ONEWIRE_SEARCH_CMD, OneWire, OneWireError, OneWireResult,
    RomAddress, utils::OneWireCrc,
};

#[repr(u8)]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
/// Type of search performed using [`SearchState`] or [`OneWireSearch`].
pub enum OneWireSearchKind {
    /// Every device answers.
    #[default]
    Normal = ONEWIRE_SEARCH_CMD,
    /// Only devices with an alarm flag set answer.
    Alarmed = ONEWIRE_CONDITIONAL_SEARCH_CMD,
}

/// State of one device discovery session on a 1-Wire bus.
///
/// The state is owned by the caller and passed to every search call, so that
/// several independent sessions (or buses) never share discovery state.
/// It implements the [1-Wire search algorithm](https://www.analog.com/en/resources/app-notes/1wire-search-algorithm.html).
#[derive(Debug, Default, Clone, Copy)]
pub struct SearchState {
    kind: OneWireSearchKind,
    last_device: bool,
    last_discrepancy: u8,
    last_family_discrepancy: u8,
    found: bool,
    rom: [u8; 8],
}

impl SearchState {
    /// Creates a new search session for the given kind of search.
    pub const fn new(kind: OneWireSearchKind) -> Self {
        Self {
            kind,
            last_device: false,
            last_discrepancy: 0,
            last_family_discrepancy: 0,
            found: false,
            rom: [0; 8],
        }
    }

    /// Resets the search state to the start of a discovery session.
    pub fn reset(&mut self) {
        *self = Self::new(self.kind);
    }

    /// The most recently discovered ROM address, if the last search step succeeded.
    pub fn rom(&self) -> Option<RomAddress> {
        self.found
            .then_some(RomAddress::from_bytes_unchecked(self.rom))
    }

    /// Returns `true` once the last device of the session has been discovered.
    pub fn is_exhausted(&self) -> bool {
        self.last_device
    }

    /// Sets up the next search step to find the first device of the `family` family.
    ///
    /// If no such device is present, the next step returns the first device of a
    /// higher family, so callers must check [`RomAddress::family`].
    pub fn target_family(&mut self, family: u8) {
        self.rom = [family, 0, 0, 0, 0, 0, 0, 0];
        self.last_discrepancy = 64;
        self.last_family_discrepancy = 0;
        self.last_device = false;
        self.found = false;
    }

    /// Sets up the next search step to skip every remaining device of the
    /// family of the most recently discovered device.
    pub fn skip_family(&mut self) {
        self.last_discrepancy = self.last_family_discrepancy;
        self.last_family_discrepancy = 0;
        if self.last_discrepancy == 0 {
            self.last_device = true;
        }
    }

    /// Resets the session and finds the first device on the bus.
    pub fn search_first<T: OneWire>(
        &mut self,
        bus: &mut T,
    ) -> OneWireResult<Option<RomAddress>, T::BusError> {
        self.reset();
        self.search(bus)
    }

    /// Finds the next device on the bus, continuing the session.
    pub fn search_next<T: OneWire>(
        &mut self,
        bus: &mut T,
    ) -> OneWireResult<Option<RomAddress>, T::BusError> {
        self.search(bus)
    }

    /// Performs one search step.
    ///
    /// Returns `Ok(None)` when called after the last device has been found, and
    /// resets the session so that the following call starts over.
    /// Any error also resets the session.
    pub fn search<T: OneWire>(
        &mut self,
        bus: &mut T,
    ) -> OneWireResult<Option<RomAddress>, T::BusError> {
        if self.last_device {
            self.reset();
            return Ok(None);
        }
        match self.step(bus) {
            Ok(rom) => Ok(Some(rom)),
            Err(e) => {
                log::debug!("1-Wire search aborted");
                self.reset();
                Err(e)
            }
        }
    }

    fn step<T: OneWire>(&mut self, bus: &mut T) -> OneWireResult<RomAddress, T::BusError> {
        self.found = false;
        bus.reset()?;
        bus.write_byte(self.kind as u8)?;

        let mut id_bit_num: u8 = 1;
        let mut last_zero: u8 = 0;
        let mut idx: usize = 0;
        let mut rom_mask: u8 = 1;
        let mut crc = OneWireCrc::default();

        while id_bit_num <= 64 {
            let id_bit = bus.read_bit()?;
            let complement_bit = bus.read_bit()?;
            if id_bit && complement_bit {
                // nobody answered this slot
                return Err(OneWireError::NoDevicePresent);
            }
            let dir = if id_bit != complement_bit {
                id_bit
            } else {
                let dir = if id_bit_num < self.last_discrepancy {
                    self.rom[idx] & rom_mask > 0
                } else {
                    id_bit_num == self.last_discrepancy
                };
                if !dir {
                    last_zero = id_bit_num;
                    if last_zero < 9 {
                        self.last_family_discrepancy = last_zero;
                    }
                }
                dir
            };
            if dir {
                self.rom[idx] |= rom_mask;
            } else {
                self.rom[idx] &= !rom_mask;
            }
            bus.write_bit(dir)?;

            id_bit_num += 1;
            rom_mask <<= 1;
            if rom_mask == 0 {
                crc.update(self.rom[idx]);
                idx += 1;
                rom_mask = 1;
            }
        }

        if crc.value() != 0 {
            return Err(OneWireError::InvalidCrc);
        }
        if self.rom[0] == 0 {
            return Err(OneWireError::InvalidFamilyCode);
        }
        self.last_discrepancy = last_zero;
        self.last_device = last_zero == 0;
        self.found = true;
        Ok(RomAddress::from_bytes_unchecked(self.rom))
    }

    /// `true` if the device with ROM `rom` answers a targeted search.
    ///
    /// The session state is restored afterwards, so an ongoing enumeration can
    /// continue where it left off.
    pub fn verify<T: OneWire>(
        &mut self,
        bus: &mut T,
        rom: &RomAddress,
    ) -> OneWireResult<bool, T::BusError> {
        let saved = *self;
        self.rom = *rom.as_bytes();
        self.last_discrepancy = 64;
        self.last_family_discrepancy = 0;
        self.last_device = false;
        let res = self.search(bus);
        *self = saved;
        match res {
            Ok(found) => Ok(found.as_ref() == Some(rom)),
            Err(OneWireError::Other(e)) => Err(OneWireError::Other(e)),
            Err(_) => Ok(false),
        }
    }
}

/// Device discovery on one bus.
///
/// Binds a bus to a [`SearchState`] for the common case of enumerating every
/// device in one go.
pub struct OneWireSearch<'a, T> {
    onewire: &'a mut T,
    state: SearchState,
    family: Option<u8>,
}

impl<'a, T> OneWireSearch<'a, T> {
    /// Searches every device on `onewire`, or only those with an alarm flag set.
    pub fn new(onewire: &'a mut T, kind: OneWireSearchKind) -> Self {
        Self {
            onewire,
            state: SearchState::new(kind),
            family: None,
        }
    }

    /// Searches only the devices of `family`.
    pub fn with_family(onewire: &'a mut T, kind: OneWireSearchKind, family: u8) -> Self {
        let mut state = SearchState::new(kind);
        state.target_family(family);
        Self {
            onewire,
            state,
            family: Some(family),
        }
    }

    /// The underlying search session.
    pub fn state(&self) -> &SearchState {
        &self.state
    }
}

impl<T: OneWire> OneWireSearch<'_, T> {
    /// Finds the next device.
    ///
    /// Returns `None` once every device (of the targeted family, if any) has been found.
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> OneWireResult<Option<RomAddress>, T::BusError> {
        if self.state.is_exhausted() {
            return Ok(None);
        }
        let rom = self.state.search(&mut *self.onewire)?;
        match (rom, self.family) {
            (Some(rom), Some(family)) if rom.family() != family => {
                self.state.last_device = true;
                Ok(None)
            }
            (rom, _) => Ok(rom),
        }
    }

    /// See [`SearchState::verify`].
    pub fn verify(&mut self, rom: &RomAddress) -> OneWireResult<bool, T::BusError> {
        self.state.verify(&mut *self.onewire, rom)
    }
}
