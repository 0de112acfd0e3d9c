#![no_std]
#![deny(missing_docs)]
//! # envctl-onewire
//! A no-std implementation of the 1-Wire protocol for the environment controller.
//!
//! The [OneWire] trait defines the bus primitives (reset, bit and byte transfers, ROM addressing).
//! [BitBangOneWire] implements it on a single open-drain GPIO line with microsecond timing provided
//! by an [`embedded_hal::delay::DelayNs`] implementation.
//!
//! Device discovery is implemented by [SearchState], a caller-owned search session, and by the
//! [OneWireSearch] convenience wrapper that binds a bus to such a session.

mod bitbang;
mod consts;
mod error;
mod rom;
mod search;
mod traits;
mod utils;
pub use bitbang::BitBangOneWire;
pub use consts::*;
pub use error::OneWireError;
pub use rom::RomAddress;
pub use search::{OneWireSearch, OneWireSearchKind, SearchState};
pub use traits::OneWire;
pub use utils::OneWireCrc;

/// Result type for 1-Wire operations.
pub type OneWireResult<T, E> = Result<T, OneWireError<E>>;
