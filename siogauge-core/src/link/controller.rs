//! Serial link controller
//!
//! Owns the SIO registers and the received value. Lives in a `static` on
//! target so the interrupt dispatch and the renderer can both hold a
//! `&'static` to it.

use portable_atomic::{AtomicBool, AtomicU32, AtomicU8, Ordering};
use siogauge_hal::{FaultKind, InterruptController, IrqHandler, SioControl, SioRegisters};

use super::state::{LinkEvent, LinkState};
use super::{LinkError, LinkStats, ValueSource};
use crate::config::{ConfigError, LinkConfig};

/// Byte-at-a-time SIO receiver
///
/// Only load/store atomics are used: the interrupt handler is the single
/// writer of `value`, `transfers` and (after `begin`) `state`, and the
/// target has no compare-and-swap.
pub struct SerialLink<R> {
    regs: R,
    config: LinkConfig,
    started: AtomicBool,
    state: AtomicU8,
    value: AtomicU8,
    transfers: AtomicU32,
}

impl<R: SioRegisters> SerialLink<R> {
    /// Create a link with the default configuration
    pub const fn new(regs: R) -> Self {
        Self {
            regs,
            config: LinkConfig::DEFAULT,
            started: AtomicBool::new(false),
            state: AtomicU8::new(LinkState::Idle.as_u8()),
            value: AtomicU8::new(0),
            transfers: AtomicU32::new(0),
        }
    }

    /// Create a link with an explicit configuration
    pub fn with_config(regs: R, config: LinkConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            ..Self::new(regs)
        })
    }

    /// Put the pins in serial mode and hook up the completion interrupt
    ///
    /// The line is masked while the handler is installed, then unmasked, and
    /// interrupts are enabled globally. Must run once, before the first
    /// [`arm_next_read`](Self::arm_next_read).
    pub fn begin<C>(&'static self, irq: &mut C) -> Result<(), LinkError>
    where
        C: InterruptController + ?Sized,
        R: Sync + 'static,
    {
        if self.started.load(Ordering::Acquire) {
            return Err(LinkError::AlreadyStarted);
        }

        self.regs.set_pin_mode(self.config.pin_mode);

        irq.mask(self.config.irq);
        irq.register(self.config.irq, self);
        irq.unmask(self.config.irq);
        irq.enable_global();

        self.started.store(true, Ordering::Release);
        Ok(())
    }

    /// Start receiving the next byte
    ///
    /// Clears the data register, then writes the control sequence. The
    /// send-enable bit is set and immediately cleared before the start bit;
    /// the hardware expects this and it must stay as is.
    pub fn arm_next_read(&self) -> Result<(), LinkError> {
        let state = self.state();
        if state.is_halted() {
            return Err(LinkError::Halted);
        }
        if !self.started.load(Ordering::Acquire) {
            return Err(LinkError::NotStarted);
        }

        self.regs.set_data(0);

        self.regs
            .set_control(self.config.control | SioControl::SEND_ENABLE);
        self.regs
            .modify_control(|c| c.difference(SioControl::SEND_ENABLE));

        self.set_state(state.transition(LinkEvent::Arm));
        self.regs.modify_control(|c| c | SioControl::START);

        Ok(())
    }

    /// Completion interrupt body
    ///
    /// Reads the received byte, publishes it, and re-arms. If the hardware
    /// still reports a transfer in flight, or no transfer was armed, the
    /// link halts and nothing is re-armed.
    pub fn complete(&self) -> Result<u8, LinkError> {
        let state = self.state();
        if state.is_halted() {
            return Err(LinkError::Halted);
        }
        if !state.is_armed() || self.regs.control().is_busy() {
            self.set_state(state.transition(LinkEvent::Desync));
            return Err(LinkError::Desync);
        }

        let byte = (self.regs.data() & 0xff) as u8;
        self.value.store(byte, Ordering::Release);
        let count = self.transfers.load(Ordering::Relaxed).wrapping_add(1);
        self.transfers.store(count, Ordering::Release);
        self.set_state(state.transition(LinkEvent::Complete));

        self.arm_next_read()?;
        Ok(byte)
    }

    /// Check if the hardware is still shifting a transfer
    pub fn is_busy(&self) -> bool {
        self.regs.control().is_busy()
    }

    /// Current link state
    pub fn state(&self) -> LinkState {
        LinkState::from_u8(self.state.load(Ordering::Acquire))
    }

    /// Check if `begin()` has run
    pub fn is_started(&self) -> bool {
        self.started.load(Ordering::Acquire)
    }

    /// Number of completed transfers (wraps)
    pub fn transfers(&self) -> u32 {
        self.transfers.load(Ordering::Acquire)
    }

    /// Snapshot of value, transfer count and state
    pub fn stats(&self) -> LinkStats {
        LinkStats {
            value: self.current(),
            transfers: self.transfers(),
            state: self.state(),
        }
    }

    /// Active configuration
    pub fn config(&self) -> &LinkConfig {
        &self.config
    }

    /// Underlying register backend
    pub fn registers(&self) -> &R {
        &self.regs
    }

    fn set_state(&self, state: LinkState) {
        self.state.store(state.as_u8(), Ordering::Release);
    }
}

impl<R> ValueSource for SerialLink<R> {
    fn current(&self) -> u8 {
        self.value.load(Ordering::Acquire)
    }
}

impl<R: SioRegisters + Sync> IrqHandler for SerialLink<R> {
    fn on_interrupt(&self) -> Result<(), FaultKind> {
        match self.complete() {
            Ok(_) => Ok(()),
            Err(LinkError::Halted) => Err(FaultKind::Halted),
            Err(_) => Err(FaultKind::Desync),
        }
    }
}
