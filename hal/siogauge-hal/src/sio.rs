//! Serial I/O controller abstractions
//!
//! Register-level access to a synchronous serial controller (the GBA link
//! port in "normal" mode, which is close to SPI). The link logic only ever
//! talks to the controller through [`SioRegisters`], so a fake backend can
//! stand in for the hardware in tests.

use core::ops::{BitAnd, BitOr, Not};

/// Serial controller register access
///
/// All methods take `&self`: the registers are shared between the main line
/// and the completion interrupt, and implementations are expected to use
/// volatile (or atomic) accesses.
pub trait SioRegisters {
    /// Read the control register (SIOCNT)
    fn control(&self) -> SioControl;

    /// Write the control register (SIOCNT)
    fn set_control(&self, value: SioControl);

    /// Read the data register (SIODATA8)
    ///
    /// The last transferred byte lives in the low 8 bits.
    fn data(&self) -> u16;

    /// Write the data register (SIODATA8)
    fn set_data(&self, value: u16);

    /// Write the auxiliary pin mode register (RCNT)
    fn set_pin_mode(&self, mode: PinMode);

    /// Read-modify-write helper for the control register
    fn modify_control(&self, f: impl FnOnce(SioControl) -> SioControl) {
        let current = self.control();
        self.set_control(f(current));
    }
}

/// SIOCNT register image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SioControl(u16);

impl SioControl {
    /// Shift clock generated locally (master). Cleared = external clock.
    pub const CLK_INTERNAL: Self = Self(1 << 0);
    /// Internal clock at 2MHz instead of 256KHz
    pub const CLK_2MHZ: Self = Self(1 << 1);
    /// SI state / receive enable
    pub const RECV_ENABLE: Self = Self(1 << 2);
    /// SO state during inactivity / send enable
    pub const SEND_ENABLE: Self = Self(1 << 3);
    /// Start transfer; reads back as busy until the transfer completes
    pub const START: Self = Self(1 << 7);
    /// 32-bit transfer length. Cleared = 8-bit.
    pub const XFER_32BIT: Self = Self(1 << 12);
    /// Raise the serial interrupt when the transfer completes
    pub const IRQ_ENABLE: Self = Self(1 << 14);

    /// Create a register image from raw bits
    pub const fn from_bits(bits: u16) -> Self {
        Self(bits)
    }

    /// Empty register image (external clock, 8-bit, idle)
    pub const fn empty() -> Self {
        Self(0)
    }

    /// Raw register bits
    pub const fn bits(self) -> u16 {
        self.0
    }

    /// Check whether all bits of `other` are set
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Const-friendly union
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    /// Const-friendly difference
    pub const fn difference(self, other: Self) -> Self {
        Self(self.0 & !other.0)
    }

    /// Check if a transfer is still in flight
    pub const fn is_busy(self) -> bool {
        self.contains(Self::START)
    }
}

impl BitOr for SioControl {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        self.union(rhs)
    }
}

impl BitAnd for SioControl {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self {
        Self(self.0 & rhs.0)
    }
}

impl Not for SioControl {
    type Output = Self;

    fn not(self) -> Self {
        Self(!self.0)
    }
}

/// SIOCNT fields that only apply in 16-bit multiplayer mode
///
/// Kept alongside the normal-mode bits since they alias the same register.
pub mod multiplayer {
    use super::SioControl;

    pub const BAUD_38400: SioControl = SioControl::from_bits(1);
    pub const BAUD_57600: SioControl = SioControl::from_bits(2);
    pub const BAUD_115200: SioControl = SioControl::from_bits(3);
    pub const SI_STATUS: SioControl = SioControl::from_bits(1 << 2);
    pub const SD_STATUS: SioControl = SioControl::from_bits(1 << 3);
    pub const SLAVE1: SioControl = SioControl::from_bits(1 << 4);
    pub const SLAVE2: SioControl = SioControl::from_bits(2 << 4);
    pub const SLAVE3: SioControl = SioControl::from_bits(3 << 4);
    pub const ERROR: SioControl = SioControl::from_bits(1 << 6);
}

/// Function of the link port pins (RCNT)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PinMode {
    /// Pins driven by the serial controller
    Serial,
    /// General-purpose I/O
    Gpio {
        /// Output levels (SC, SD, SI, SO), low nibble
        data: u8,
        /// Per-pin direction (1 = output), low nibble
        direction: u8,
        /// Interrupt on SI falling edge
        irq: bool,
    },
    /// JOY bus mode
    JoyBus,
}

impl PinMode {
    /// GPIO data bits
    pub const GPIO_DATA_MASK: u16 = 0x000f;
    /// GPIO direction bits
    pub const GPIO_DIR_MASK: u16 = 0x00f0;
    /// GPIO interrupt enable
    pub const GPIO_IRQ_ENABLE: u16 = 1 << 8;
    /// Mode select: general-purpose
    pub const MODE_GPIO: u16 = 0x8000;
    /// Mode select: JOY bus
    pub const MODE_JOYBUS: u16 = 0xc000;

    /// Encode as an RCNT value
    pub const fn bits(self) -> u16 {
        match self {
            PinMode::Serial => 0,
            PinMode::Gpio {
                data,
                direction,
                irq,
            } => {
                let mut bits = Self::MODE_GPIO
                    | (data as u16 & Self::GPIO_DATA_MASK)
                    | ((direction as u16) << 4 & Self::GPIO_DIR_MASK);
                if irq {
                    bits |= Self::GPIO_IRQ_ENABLE;
                }
                bits
            }
            PinMode::JoyBus => Self::MODE_JOYBUS,
        }
    }
}
