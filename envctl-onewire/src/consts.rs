//! ROM command bytes.

/// Read ROM, single-drop buses only.
pub const ONEWIRE_READ_ROM_CMD: u8 = 0x33;

/// Match ROM: select one device by address.
pub const ONEWIRE_MATCH_ROM_CMD: u8 = 0x55;

/// Skip ROM: select every device.
pub const ONEWIRE_SKIP_ROM_CMD: u8 = 0xCC;

/// Search ROM.
pub const ONEWIRE_SEARCH_CMD: u8 = 0xF0;

/// Alarm search: only devices with an alarm flag set answer.
pub const ONEWIRE_CONDITIONAL_SEARCH_CMD: u8 = 0xEC;
