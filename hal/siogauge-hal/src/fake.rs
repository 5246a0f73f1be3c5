//! In-memory register and interrupt backends
//!
//! [`FakeSio`] behaves like the SIO block for the purposes of the link
//! logic: it stores what is written, keeps a short history of control
//! writes, and [`FakeSio::finish_transfer`] plays the part of the peer
//! clocking a byte in. [`FakeInterrupts`] records controller operations and
//! delivers interrupts through a real [`HandlerTable`].

use portable_atomic::{AtomicU16, AtomicUsize, Ordering};

use crate::irq::{HandlerTable, Interrupt, InterruptController, IrqFault, IrqHandler, IrqMask};
use crate::sio::{PinMode, SioControl, SioRegisters};

/// Number of control writes kept in the history ring
pub const CONTROL_HISTORY: usize = 16;

/// Fake SIO register block
pub struct FakeSio {
    control: AtomicU16,
    data: AtomicU16,
    pin_mode: AtomicU16,
    pin_mode_writes: AtomicUsize,
    data_writes: AtomicUsize,
    history: [AtomicU16; CONTROL_HISTORY],
    control_writes: AtomicUsize,
}

impl Default for FakeSio {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeSio {
    /// Registers at their reset values, except RCNT which powers up in
    /// general-purpose mode so that `begin()` has something to change
    pub const fn new() -> Self {
        const ZERO: AtomicU16 = AtomicU16::new(0);
        Self {
            control: AtomicU16::new(0),
            data: AtomicU16::new(0),
            pin_mode: AtomicU16::new(PinMode::MODE_GPIO),
            pin_mode_writes: AtomicUsize::new(0),
            data_writes: AtomicUsize::new(0),
            history: [ZERO; CONTROL_HISTORY],
            control_writes: AtomicUsize::new(0),
        }
    }

    /// Peer finishes clocking in `byte`
    ///
    /// Latches the byte into the data register and clears the start bit the
    /// way the hardware does. Returns whether the controller would raise the
    /// completion interrupt.
    pub fn finish_transfer(&self, byte: u8) -> bool {
        self.data.store(byte as u16, Ordering::SeqCst);
        let control = SioControl::from_bits(self.control.load(Ordering::SeqCst));
        self.control
            .store(control.difference(SioControl::START).bits(), Ordering::SeqCst);
        control.contains(SioControl::IRQ_ENABLE)
    }

    /// Overwrite the data register without going through the trait
    /// (a byte left over from a previous transfer)
    pub fn poke_data(&self, value: u16) {
        self.data.store(value, Ordering::SeqCst);
    }

    /// Current RCNT value
    pub fn pin_mode_bits(&self) -> u16 {
        self.pin_mode.load(Ordering::SeqCst)
    }

    /// Number of RCNT writes
    pub fn pin_mode_writes(&self) -> usize {
        self.pin_mode_writes.load(Ordering::SeqCst)
    }

    /// Number of SIODATA8 writes
    pub fn data_writes(&self) -> usize {
        self.data_writes.load(Ordering::SeqCst)
    }

    /// Total number of SIOCNT writes
    pub fn control_writes(&self) -> usize {
        self.control_writes.load(Ordering::SeqCst)
    }

    /// The `n`th SIOCNT write (0-based), if still in the history ring
    pub fn control_write(&self, n: usize) -> Option<SioControl> {
        let total = self.control_writes();
        if n >= total || total - n > CONTROL_HISTORY {
            return None;
        }
        let bits = self.history[n % CONTROL_HISTORY].load(Ordering::SeqCst);
        Some(SioControl::from_bits(bits))
    }

    /// The last `N` SIOCNT writes, oldest first
    pub fn last_control_writes<const N: usize>(&self) -> Option<[SioControl; N]> {
        let total = self.control_writes();
        if N > total || N > CONTROL_HISTORY {
            return None;
        }
        let mut out = [SioControl::empty(); N];
        for (i, slot) in out.iter_mut().enumerate() {
            *slot = self.control_write(total - N + i)?;
        }
        Some(out)
    }
}

impl SioRegisters for FakeSio {
    fn control(&self) -> SioControl {
        SioControl::from_bits(self.control.load(Ordering::SeqCst))
    }

    fn set_control(&self, value: SioControl) {
        let n = self.control_writes.fetch_add(1, Ordering::SeqCst);
        self.history[n % CONTROL_HISTORY].store(value.bits(), Ordering::SeqCst);
        self.control.store(value.bits(), Ordering::SeqCst);
    }

    fn data(&self) -> u16 {
        self.data.load(Ordering::SeqCst)
    }

    fn set_data(&self, value: u16) {
        self.data_writes.fetch_add(1, Ordering::SeqCst);
        self.data.store(value, Ordering::SeqCst);
    }

    fn set_pin_mode(&self, mode: PinMode) {
        self.pin_mode_writes.fetch_add(1, Ordering::SeqCst);
        self.pin_mode.store(mode.bits(), Ordering::SeqCst);
    }
}

/// Operation recorded by [`FakeInterrupts`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IrqOp {
    Mask(Interrupt),
    Unmask(Interrupt),
    Register(Interrupt),
    EnableGlobal,
    DisableGlobal,
}

/// Number of operations [`FakeInterrupts`] remembers
pub const OP_HISTORY: usize = 16;

/// Fake interrupt controller
pub struct FakeInterrupts {
    enabled: IrqMask,
    master: bool,
    table: HandlerTable,
    ops: [Option<IrqOp>; OP_HISTORY],
    op_count: usize,
}

impl Default for FakeInterrupts {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeInterrupts {
    /// Everything masked, IME off, no handlers
    pub const fn new() -> Self {
        Self {
            enabled: IrqMask::empty(),
            master: false,
            table: HandlerTable::new(),
            ops: [None; OP_HISTORY],
            op_count: 0,
        }
    }

    fn record(&mut self, op: IrqOp) {
        if self.op_count < OP_HISTORY {
            self.ops[self.op_count] = Some(op);
        }
        self.op_count += 1;
    }

    /// Recorded operations, oldest first (first [`OP_HISTORY`] only)
    pub fn ops(&self) -> impl Iterator<Item = IrqOp> + '_ {
        self.ops.iter().map_while(|op| *op)
    }

    /// Total number of operations, including ones past the history
    pub fn op_count(&self) -> usize {
        self.op_count
    }

    /// Sources currently unmasked (IE)
    pub fn enabled(&self) -> IrqMask {
        self.enabled
    }

    /// Master enable state (IME)
    pub fn is_globally_enabled(&self) -> bool {
        self.master
    }

    /// Check if a handler is installed for `irq`
    pub fn is_registered(&self, irq: Interrupt) -> bool {
        self.table.is_registered(irq)
    }

    /// Hardware raises `irq`
    ///
    /// Returns `Ok(false)` when the interrupt is masked or IME is off and
    /// therefore never reaches a handler.
    pub fn raise(&self, irq: Interrupt) -> Result<bool, IrqFault> {
        if !self.master || !self.enabled.contains(irq) {
            return Ok(false);
        }
        self.table.dispatch(irq.mask())?;
        Ok(true)
    }
}

impl InterruptController for FakeInterrupts {
    fn mask(&mut self, irq: Interrupt) {
        self.enabled = self.enabled.without(irq);
        self.record(IrqOp::Mask(irq));
    }

    fn unmask(&mut self, irq: Interrupt) {
        self.enabled = self.enabled.with(irq);
        self.record(IrqOp::Unmask(irq));
    }

    fn register(&mut self, irq: Interrupt, handler: &'static dyn IrqHandler) {
        self.table.set(irq, handler);
        self.record(IrqOp::Register(irq));
    }

    fn enable_global(&mut self) {
        self.master = true;
        self.record(IrqOp::EnableGlobal);
    }

    fn disable_global(&mut self) {
        self.master = false;
        self.record(IrqOp::DisableGlobal);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_finish_transfer_clears_start_and_latches_byte() {
        let sio = FakeSio::new();
        sio.set_control(SioControl::IRQ_ENABLE | SioControl::START);
        assert!(sio.control().is_busy());

        assert!(sio.finish_transfer(0xa5));
        assert!(!sio.control().is_busy());
        assert_eq!(sio.data(), 0x00a5);
    }

    #[test]
    fn test_finish_transfer_without_irq_enable() {
        let sio = FakeSio::new();
        sio.set_control(SioControl::START);
        assert!(!sio.finish_transfer(1));
    }

    #[test]
    fn test_control_history_ring() {
        let sio = FakeSio::new();
        for i in 0..20u16 {
            sio.set_control(SioControl::from_bits(i));
        }
        assert_eq!(sio.control_writes(), 20);
        // Oldest entries were overwritten
        assert_eq!(sio.control_write(3), None);
        assert_eq!(sio.control_write(4), Some(SioControl::from_bits(4)));
        assert_eq!(sio.control_write(19), Some(SioControl::from_bits(19)));
        assert_eq!(sio.control_write(20), None);

        let last = sio.last_control_writes::<2>().unwrap();
        assert_eq!(last, [SioControl::from_bits(18), SioControl::from_bits(19)]);
    }

    #[test]
    fn test_masked_interrupt_not_delivered() {
        let mut irq = FakeInterrupts::new();
        irq.unmask(Interrupt::Serial);
        // IME still off
        assert_eq!(irq.raise(Interrupt::Serial), Ok(false));

        irq.enable_global();
        irq.mask(Interrupt::Serial);
        assert_eq!(irq.raise(Interrupt::Serial), Ok(false));

        let ops: [IrqOp; 3] = [
            IrqOp::Unmask(Interrupt::Serial),
            IrqOp::EnableGlobal,
            IrqOp::Mask(Interrupt::Serial),
        ];
        assert!(irq.ops().eq(ops));
    }
}
