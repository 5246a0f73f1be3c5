//! Link configuration
//!
//! The receiver supports exactly one serial mode: normal mode, 8-bit
//! transfers, shift clock supplied by the peer, interrupt on completion.
//! `LinkConfig` carries that mode plus the pin and interrupt wiring, and
//! rejects anything else.

use siogauge_hal::{Interrupt, PinMode, SioControl};

/// Configuration errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Control word selects the internal clock
    InternalClock,
    /// Control word selects 32-bit transfers
    WideTransfer,
    /// Control word does not raise an interrupt on completion
    NoCompletionIrq,
    /// Control word carries bits that belong to the per-transfer sequence
    /// (start, send/receive enable) or to internal clocking
    StrayControlBits,
    /// Pins are not assigned to the serial controller
    PinsNotSerial,
    /// Completion handler would be installed on a non-serial interrupt
    NotSerialIrq,
}

/// Serial link configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LinkConfig {
    /// RCNT value written by `begin()`
    pub pin_mode: PinMode,
    /// Interrupt line of the serial controller
    pub irq: Interrupt,
    /// Base SIOCNT word for each transfer (start bit excluded)
    pub control: SioControl,
}

impl LinkConfig {
    /// External clock, 8-bit, interrupt on completion
    pub const DEFAULT: Self = Self {
        pin_mode: PinMode::Serial,
        irq: Interrupt::Serial,
        control: SioControl::IRQ_ENABLE,
    };

    /// Check that this describes the supported mode
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.control.contains(SioControl::CLK_INTERNAL) {
            return Err(ConfigError::InternalClock);
        }
        if self.control.contains(SioControl::XFER_32BIT) {
            return Err(ConfigError::WideTransfer);
        }
        if !self.control.contains(SioControl::IRQ_ENABLE) {
            return Err(ConfigError::NoCompletionIrq);
        }
        if self.control != SioControl::IRQ_ENABLE {
            return Err(ConfigError::StrayControlBits);
        }
        if self.pin_mode != PinMode::Serial {
            return Err(ConfigError::PinsNotSerial);
        }
        if self.irq != Interrupt::Serial {
            return Err(ConfigError::NotSerialIrq);
        }
        Ok(())
    }
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert_eq!(LinkConfig::default().validate(), Ok(()));
        assert_eq!(LinkConfig::default().control.bits(), 0x4000);
    }

    #[test]
    fn test_rejects_internal_clock() {
        let config = LinkConfig {
            control: SioControl::IRQ_ENABLE | SioControl::CLK_INTERNAL | SioControl::CLK_2MHZ,
            ..LinkConfig::DEFAULT
        };
        assert_eq!(config.validate(), Err(ConfigError::InternalClock));
    }

    #[test]
    fn test_rejects_32bit_transfers() {
        let config = LinkConfig {
            control: SioControl::IRQ_ENABLE | SioControl::XFER_32BIT,
            ..LinkConfig::DEFAULT
        };
        assert_eq!(config.validate(), Err(ConfigError::WideTransfer));
    }

    #[test]
    fn test_rejects_polling_mode() {
        let config = LinkConfig {
            control: SioControl::empty(),
            ..LinkConfig::DEFAULT
        };
        assert_eq!(config.validate(), Err(ConfigError::NoCompletionIrq));
    }

    #[test]
    fn test_rejects_gpio_pins() {
        let config = LinkConfig {
            pin_mode: PinMode::JoyBus,
            ..LinkConfig::DEFAULT
        };
        assert_eq!(config.validate(), Err(ConfigError::PinsNotSerial));
    }

    #[test]
    fn test_rejects_start_bit_in_base_word() {
        let config = LinkConfig {
            control: SioControl::IRQ_ENABLE | SioControl::START,
            ..LinkConfig::DEFAULT
        };
        assert_eq!(config.validate(), Err(ConfigError::StrayControlBits));
    }

    #[test]
    fn test_rejects_transfer_enables_and_clock_speed() {
        for extra in [
            SioControl::SEND_ENABLE,
            SioControl::RECV_ENABLE,
            SioControl::CLK_2MHZ,
            SioControl::from_bits(1 << 5),
        ] {
            let config = LinkConfig {
                control: SioControl::IRQ_ENABLE | extra,
                ..LinkConfig::DEFAULT
            };
            assert_eq!(
                config.validate(),
                Err(ConfigError::StrayControlBits),
                "bits {:#06x}",
                extra.bits()
            );
        }
    }

    #[test]
    fn test_rejects_non_serial_irq_line() {
        let config = LinkConfig {
            irq: Interrupt::Timer0,
            ..LinkConfig::DEFAULT
        };
        assert_eq!(config.validate(), Err(ConfigError::NotSerialIrq));
    }
}
