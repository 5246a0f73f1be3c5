//! siogauge Hardware Abstraction Layer
//!
//! This crate defines the hardware abstraction traits the link logic is
//! written against. Chip crates provide the real implementations, and the
//! `fake` feature provides in-memory ones so the same state machine can be
//! exercised on the host.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  siogauge-core / siogauge-firmware      │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  siogauge-hal (this crate - traits)     │
//! └─────────────────────────────────────────┘
//!                     │
//!         ┌───────────┴───────────┐
//!         ▼                       ▼
//! ┌───────────────┐       ┌───────────────┐
//! │ siogauge-hal- │       │  fake (host   │
//! │      gba      │       │    tests)     │
//! └───────────────┘       └───────────────┘
//! ```
//!
//! # Traits
//!
//! - [`sio::SioRegisters`] - Serial controller register access
//! - [`irq::InterruptController`] - Mask/unmask, handler registration, IME
//! - [`irq::IrqHandler`] - Completion sink invoked on interrupt dispatch

#![no_std]
#![deny(unsafe_code)]

pub mod irq;
pub mod sio;

#[cfg(any(test, feature = "fake"))]
pub mod fake;

// Re-export key traits at crate root for convenience
pub use irq::{
    FaultKind, HandlerTable, Interrupt, InterruptController, IrqFault, IrqHandler, IrqMask,
};
pub use sio::{PinMode, SioControl, SioRegisters};
