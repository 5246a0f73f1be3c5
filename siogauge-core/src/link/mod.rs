//! Serial link
//!
//! Receives one byte per externally clocked transfer and keeps the most
//! recent one. The controller is driven from two contexts: the main line
//! calls `begin()` and the first `arm_next_read()`, the completion interrupt
//! does everything after that.

pub mod controller;
pub mod state;

pub use controller::SerialLink;
pub use state::{LinkEvent, LinkState};

/// Link errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LinkError {
    /// `arm_next_read()` before `begin()`
    NotStarted,
    /// `begin()` called twice
    AlreadyStarted,
    /// Completion interrupt without a finished transfer
    Desync,
    /// Link faulted earlier and is stopped
    Halted,
}

impl core::fmt::Display for LinkError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let msg = match self {
            LinkError::NotStarted => "read armed before link was started",
            LinkError::AlreadyStarted => "link already started",
            LinkError::Desync => "interrupt with start bit == 1 or no transfer armed",
            LinkError::Halted => "link halted after desync",
        };
        f.write_str(msg)
    }
}

/// Read access to the latest received byte
///
/// Implemented by the link and handed to the display side, which never
/// writes.
pub trait ValueSource {
    /// Most recent byte (0 before the first transfer)
    fn current(&self) -> u8;
}

impl<T: ValueSource + ?Sized> ValueSource for &T {
    fn current(&self) -> u8 {
        (**self).current()
    }
}

/// Point-in-time view of the link
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LinkStats {
    /// Latest received byte
    pub value: u8,
    /// Completed transfers (wraps)
    pub transfers: u32,
    /// Link state
    pub state: LinkState,
}

impl LinkStats {
    /// Check if at least one byte has arrived
    pub fn has_data(&self) -> bool {
        self.transfers > 0
    }
}
