//! Game Boy Advance HAL for siogauge
//!
//! This crate provides GBA implementations of the `siogauge-hal` and
//! `siogauge-display` traits:
//! - Memory-mapped SIO registers (SIOCNT, SIODATA8, RCNT)
//! - IE/IME interrupt controller and the handler table the IRQ entry
//!   dispatches through
//! - Mode 3 video with an off-screen back buffer, and a direct VRAM target
//!   for the fault screen
//!
//! Register addresses are plain values so the same code can be pointed at
//! ordinary memory in host tests.

#![cfg_attr(not(test), no_std)]

pub mod irq;
pub mod mmio;
pub mod video;

pub use irq::{GbaInterrupts, HandlerCell, IrqRegisters, HANDLERS};
pub use mmio::{MmioSio, SioAddresses};
pub use video::{GbaVideo, VideoAddresses, VramTarget};
