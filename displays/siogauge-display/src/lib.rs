//! Display side of siogauge
//!
//! This crate provides:
//! - `FrameBuffer`, an off-screen 240x160 BGR555 buffer that implements
//!   `embedded_graphics::DrawTarget`
//! - `DisplayPlatform`, the video collaborator (mode set, back buffer, flip)
//! - `GaugeLayout`, the fixed screen geometry and colours
//! - `Presenter`, which draws the latest byte as text and a bar
//! - `render_fault`, the diagnostic screen shown when the link halts
//!
//! # Architecture
//!
//! The presenter only reads the link through `siogauge_core::ValueSource`
//! and only draws through `DisplayPlatform`, so the same code renders to
//! GBA VRAM on target and to a plain `FrameBuffer` in tests.

#![cfg_attr(not(test), no_std)]

pub mod backend;
pub mod fault;
pub mod framebuffer;
pub mod layout;
pub mod presenter;

// Re-export key types
pub use backend::{DisplayError, DisplayPlatform, VideoMode};
pub use fault::render_fault;
pub use framebuffer::{rgb, FrameBuffer, HEIGHT, WIDTH};
pub use layout::GaugeLayout;
pub use presenter::Presenter;
