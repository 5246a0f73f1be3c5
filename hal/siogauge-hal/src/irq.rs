//! Interrupt controller abstractions
//!
//! The platform IRQ entry reads the pending sources and hands them to a
//! [`HandlerTable`], which calls the registered [`IrqHandler`]s. Handlers
//! report faults instead of halting so the halt policy stays with the
//! platform.

/// Interrupt sources, numbered by their IE/IF bit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Interrupt {
    VBlank = 0,
    HBlank = 1,
    VCount = 2,
    Timer0 = 3,
    Timer1 = 4,
    Timer2 = 5,
    Timer3 = 6,
    /// Serial communication complete
    Serial = 7,
    Dma0 = 8,
    Dma1 = 9,
    Dma2 = 10,
    Dma3 = 11,
    Keypad = 12,
    GamePak = 13,
}

/// Number of interrupt sources
pub const INTERRUPT_COUNT: usize = 14;

impl Interrupt {
    /// All sources in bit order
    pub const ALL: [Interrupt; INTERRUPT_COUNT] = [
        Interrupt::VBlank,
        Interrupt::HBlank,
        Interrupt::VCount,
        Interrupt::Timer0,
        Interrupt::Timer1,
        Interrupt::Timer2,
        Interrupt::Timer3,
        Interrupt::Serial,
        Interrupt::Dma0,
        Interrupt::Dma1,
        Interrupt::Dma2,
        Interrupt::Dma3,
        Interrupt::Keypad,
        Interrupt::GamePak,
    ];

    /// Bit index in IE/IF
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Single-bit mask for this source
    pub const fn mask(self) -> IrqMask {
        IrqMask(1 << self as u16)
    }
}

/// Set of interrupt sources (IE/IF layout)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct IrqMask(u16);

impl IrqMask {
    /// No sources
    pub const fn empty() -> Self {
        Self(0)
    }

    /// Create from raw IE/IF bits
    pub const fn from_bits(bits: u16) -> Self {
        Self(bits)
    }

    /// Raw bits
    pub const fn bits(self) -> u16 {
        self.0
    }

    /// Check if a source is in the set
    pub const fn contains(self, irq: Interrupt) -> bool {
        self.0 & irq.mask().0 != 0
    }

    /// Add a source
    pub const fn with(self, irq: Interrupt) -> Self {
        Self(self.0 | irq.mask().0)
    }

    /// Remove a source
    pub const fn without(self, irq: Interrupt) -> Self {
        Self(self.0 & !irq.mask().0)
    }

    /// Iterate the sources in the set, lowest bit first
    pub fn iter(self) -> impl Iterator<Item = Interrupt> {
        Interrupt::ALL.into_iter().filter(move |irq| self.contains(*irq))
    }
}

/// Why a handler could not service its interrupt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FaultKind {
    /// Interrupt fired while the peripheral had no completed transfer
    Desync,
    /// Handler had already faulted and refuses further work
    Halted,
}

/// Fault reported by a handler during dispatch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct IrqFault {
    /// Source whose handler failed
    pub source: Interrupt,
    /// Failure reported by the handler
    pub kind: FaultKind,
}

impl core::fmt::Display for IrqFault {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self.kind {
            FaultKind::Desync => write!(
                f,
                "{:?} interrupt without a completed transfer (start bit still set or link not armed)",
                self.source
            ),
            FaultKind::Halted => write!(f, "{:?} interrupt after link halted", self.source),
        }
    }
}

/// Completion sink invoked from interrupt context
///
/// Implementations must do a bounded amount of work and must not block.
pub trait IrqHandler: Sync {
    /// Service the interrupt
    fn on_interrupt(&self) -> Result<(), FaultKind>;
}

/// Interrupt controller
pub trait InterruptController {
    /// Stop `irq` from reaching the CPU
    fn mask(&mut self, irq: Interrupt);

    /// Let `irq` reach the CPU
    fn unmask(&mut self, irq: Interrupt);

    /// Install the handler called when `irq` fires
    fn register(&mut self, irq: Interrupt, handler: &'static dyn IrqHandler);

    /// Master enable (IME = 1)
    fn enable_global(&mut self);

    /// Master disable (IME = 0)
    fn disable_global(&mut self);
}

/// Registered handlers, one slot per source
pub struct HandlerTable {
    slots: [Option<&'static dyn IrqHandler>; INTERRUPT_COUNT],
}

impl Default for HandlerTable {
    fn default() -> Self {
        Self::new()
    }
}

impl HandlerTable {
    /// Create an empty table
    pub const fn new() -> Self {
        Self {
            slots: [None; INTERRUPT_COUNT],
        }
    }

    /// Install (or replace) the handler for `irq`
    pub fn set(&mut self, irq: Interrupt, handler: &'static dyn IrqHandler) {
        self.slots[irq.index()] = Some(handler);
    }

    /// Remove the handler for `irq`
    pub fn clear(&mut self, irq: Interrupt) {
        self.slots[irq.index()] = None;
    }

    /// Check if a handler is installed
    pub fn is_registered(&self, irq: Interrupt) -> bool {
        self.slots[irq.index()].is_some()
    }

    /// Call the handlers of every pending source
    ///
    /// Sources without a handler are ignored. Dispatch stops at the first
    /// fault.
    pub fn dispatch(&self, pending: IrqMask) -> Result<(), IrqFault> {
        for source in pending.iter() {
            if let Some(handler) = self.slots[source.index()] {
                handler
                    .on_interrupt()
                    .map_err(|kind| IrqFault { source, kind })?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use portable_atomic::{AtomicU32, Ordering};

    struct Counter {
        calls: AtomicU32,
        fail: bool,
    }

    impl IrqHandler for Counter {
        fn on_interrupt(&self) -> Result<(), FaultKind> {
            self.calls.fetch_add(1, Ordering::Relaxed);
            if self.fail {
                Err(FaultKind::Desync)
            } else {
                Ok(())
            }
        }
    }

    #[test]
    fn test_serial_is_bit_seven() {
        assert_eq!(Interrupt::Serial.mask().bits(), 0x0080);
        assert_eq!(Interrupt::GamePak.mask().bits(), 0x2000);
    }

    #[test]
    fn test_mask_iteration_order() {
        let mask = IrqMask::empty()
            .with(Interrupt::Keypad)
            .with(Interrupt::VBlank)
            .with(Interrupt::Serial);
        let mut iter = mask.iter();
        assert_eq!(iter.next(), Some(Interrupt::VBlank));
        assert_eq!(iter.next(), Some(Interrupt::Serial));
        assert_eq!(iter.next(), Some(Interrupt::Keypad));
        assert_eq!(iter.next(), None);

        assert!(!mask.without(Interrupt::Serial).contains(Interrupt::Serial));
    }

    #[test]
    fn test_dispatch_calls_pending_handlers_only() {
        static SERIAL: Counter = Counter {
            calls: AtomicU32::new(0),
            fail: false,
        };
        static VBLANK: Counter = Counter {
            calls: AtomicU32::new(0),
            fail: false,
        };

        let mut table = HandlerTable::new();
        table.set(Interrupt::Serial, &SERIAL);
        table.set(Interrupt::VBlank, &VBLANK);

        // Timer0 has no handler and must be ignored
        let pending = IrqMask::empty()
            .with(Interrupt::Serial)
            .with(Interrupt::Timer0);
        assert_eq!(table.dispatch(pending), Ok(()));

        assert_eq!(SERIAL.calls.load(Ordering::Relaxed), 1);
        assert_eq!(VBLANK.calls.load(Ordering::Relaxed), 0);
    }

    #[test]
    fn test_dispatch_reports_fault_with_source() {
        static BROKEN: Counter = Counter {
            calls: AtomicU32::new(0),
            fail: true,
        };

        let mut table = HandlerTable::new();
        table.set(Interrupt::Serial, &BROKEN);

        let result = table.dispatch(Interrupt::Serial.mask());
        assert_eq!(
            result,
            Err(IrqFault {
                source: Interrupt::Serial,
                kind: FaultKind::Desync,
            })
        );
    }

    #[test]
    fn test_clear_unregisters() {
        static HANDLER: Counter = Counter {
            calls: AtomicU32::new(0),
            fail: false,
        };

        let mut table = HandlerTable::new();
        table.set(Interrupt::Serial, &HANDLER);
        assert!(table.is_registered(Interrupt::Serial));

        table.clear(Interrupt::Serial);
        assert!(!table.is_registered(Interrupt::Serial));
        assert_eq!(table.dispatch(Interrupt::Serial.mask()), Ok(()));
        assert_eq!(HANDLER.calls.load(Ordering::Relaxed), 0);
    }
}
