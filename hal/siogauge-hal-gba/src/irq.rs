//! GBA interrupt controller
//!
//! IE selects which sources reach the CPU and IME is the master switch.
//! The runtime's IRQ entry acknowledges IF itself and passes the pending
//! bits on; [`HandlerCell::dispatch`] takes it from there.

use core::cell::UnsafeCell;
use core::ptr;

use siogauge_hal::{HandlerTable, Interrupt, InterruptController, IrqFault, IrqHandler, IrqMask};

/// Interrupt register addresses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct IrqRegisters {
    /// IE
    pub enable: usize,
    /// IME
    pub master: usize,
}

impl IrqRegisters {
    /// GBA I/O map
    pub const GBA: Self = Self {
        enable: 0x0400_0200,
        master: 0x0400_0208,
    };

    fn read(addr: usize) -> u16 {
        // SAFETY: validity guaranteed by `GbaInterrupts::new`
        unsafe { ptr::read_volatile(addr as *const u16) }
    }

    fn write(addr: usize, value: u16) {
        // SAFETY: validity guaranteed by `GbaInterrupts::new`
        unsafe { ptr::write_volatile(addr as *mut u16, value) }
    }
}

/// Handler table shared between the main loop and the IRQ entry
pub struct HandlerCell(UnsafeCell<HandlerTable>);

// SAFETY: single core; the table is only written with IME cleared, so a
// dispatch can never observe a half-written slot.
unsafe impl Sync for HandlerCell {}

impl Default for HandlerCell {
    fn default() -> Self {
        Self::new()
    }
}

impl HandlerCell {
    /// Create an empty table
    pub const fn new() -> Self {
        Self(UnsafeCell::new(HandlerTable::new()))
    }

    /// Install the handler for `irq`
    ///
    /// # Safety
    ///
    /// No [`dispatch`](Self::dispatch) may run until this returns, i.e.
    /// interrupts must be masked at the master switch.
    pub unsafe fn set(&self, irq: Interrupt, handler: &'static dyn IrqHandler) {
        (*self.0.get()).set(irq, handler);
    }

    /// Check if a handler is installed
    pub fn is_registered(&self, irq: Interrupt) -> bool {
        // SAFETY: writes only happen under `set`'s contract
        unsafe { (*self.0.get()).is_registered(irq) }
    }

    /// Run the handlers for `pending`
    pub fn dispatch(&self, pending: IrqMask) -> Result<(), IrqFault> {
        // SAFETY: writes only happen under `set`'s contract
        unsafe { (*self.0.get()).dispatch(pending) }
    }
}

/// Handler table used by the firmware's IRQ entry
pub static HANDLERS: HandlerCell = HandlerCell::new();

/// IE/IME interrupt controller
pub struct GbaInterrupts {
    regs: IrqRegisters,
    table: &'static HandlerCell,
}

impl GbaInterrupts {
    /// Create a controller for the registers at `regs`, registering into
    /// `table`
    ///
    /// # Safety
    ///
    /// Both addresses must be valid for volatile `u16` access for as long as
    /// the controller is used, and only one controller may exist per
    /// register set.
    pub const unsafe fn new(regs: IrqRegisters, table: &'static HandlerCell) -> Self {
        Self { regs, table }
    }

    /// Controller for the real GBA registers and [`HANDLERS`]
    ///
    /// # Safety
    ///
    /// Only sound on GBA hardware, and only once.
    pub const unsafe fn gba() -> Self {
        Self::new(IrqRegisters::GBA, &HANDLERS)
    }

    /// Sources currently enabled in IE
    pub fn enabled(&self) -> IrqMask {
        IrqMask::from_bits(IrqRegisters::read(self.regs.enable))
    }

    /// Master enable state
    pub fn is_globally_enabled(&self) -> bool {
        IrqRegisters::read(self.regs.master) & 1 != 0
    }

    /// Handler table this controller registers into
    pub fn table(&self) -> &'static HandlerCell {
        self.table
    }
}

impl InterruptController for GbaInterrupts {
    fn mask(&mut self, irq: Interrupt) {
        let ie = self.enabled().without(irq);
        IrqRegisters::write(self.regs.enable, ie.bits());
    }

    fn unmask(&mut self, irq: Interrupt) {
        let ie = self.enabled().with(irq);
        IrqRegisters::write(self.regs.enable, ie.bits());
    }

    fn register(&mut self, irq: Interrupt, handler: &'static dyn IrqHandler) {
        let ime = IrqRegisters::read(self.regs.master);
        IrqRegisters::write(self.regs.master, 0);
        // SAFETY: IME is clear, no dispatch can run
        unsafe { self.table.set(irq, handler) };
        IrqRegisters::write(self.regs.master, ime);
    }

    fn enable_global(&mut self) {
        IrqRegisters::write(self.regs.master, 1);
    }

    fn disable_global(&mut self) {
        IrqRegisters::write(self.regs.master, 0);
    }
}
