//! Memory-mapped SIO registers
//!
//! Normal mode uses three registers: SIOCNT for control, SIODATA8 for the
//! shifted byte and RCNT for the link port pin mode. All are 16 bits wide
//! and must be accessed with volatile halfword loads and stores.

use core::ptr;

use siogauge_hal::{PinMode, SioControl, SioRegisters};

/// Register addresses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SioAddresses {
    /// SIOCNT
    pub control: usize,
    /// SIODATA8
    pub data: usize,
    /// RCNT
    pub pin_mode: usize,
}

impl SioAddresses {
    /// GBA I/O map
    pub const GBA: Self = Self {
        control: 0x0400_0128,
        data: 0x0400_012A,
        pin_mode: 0x0400_0134,
    };
}

/// SIO registers accessed through volatile MMIO
#[derive(Debug)]
pub struct MmioSio {
    addrs: SioAddresses,
}

impl MmioSio {
    /// Create an accessor for the registers at `addrs`
    ///
    /// # Safety
    ///
    /// Every address must be valid for volatile `u16` reads and writes, and
    /// 2-byte aligned, for as long as the accessor is used.
    pub const unsafe fn new(addrs: SioAddresses) -> Self {
        Self { addrs }
    }

    /// Create an accessor for the real GBA registers
    ///
    /// # Safety
    ///
    /// Only sound when running on GBA hardware (or an emulator).
    pub const unsafe fn gba() -> Self {
        Self::new(SioAddresses::GBA)
    }

    /// Register addresses in use
    pub fn addresses(&self) -> SioAddresses {
        self.addrs
    }

    fn read(addr: usize) -> u16 {
        // SAFETY: validity guaranteed by the constructor contract
        unsafe { ptr::read_volatile(addr as *const u16) }
    }

    fn write(addr: usize, value: u16) {
        // SAFETY: validity guaranteed by the constructor contract
        unsafe { ptr::write_volatile(addr as *mut u16, value) }
    }
}

impl SioRegisters for MmioSio {
    fn control(&self) -> SioControl {
        SioControl::from_bits(Self::read(self.addrs.control))
    }

    fn set_control(&self, value: SioControl) {
        Self::write(self.addrs.control, value.bits());
    }

    fn data(&self) -> u16 {
        Self::read(self.addrs.data)
    }

    fn set_data(&self, value: u16) {
        Self::write(self.addrs.data, value);
    }

    fn set_pin_mode(&self, mode: PinMode) {
        Self::write(self.addrs.pin_mode, mode.bits());
    }
}
