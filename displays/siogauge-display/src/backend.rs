//! Display platform trait
//!
//! The video collaborator the presenter renders through: set a mode, hand
//! out the back buffer, flip.

use core::convert::Infallible;

use embedded_graphics::pixelcolor::Bgr555;
use embedded_graphics::prelude::*;

/// Display errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DisplayError {
    /// Mode not supported by this platform
    InvalidMode,
    /// Back buffer requested or flipped before `init`
    NotInitialized,
}

/// Video modes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum VideoMode {
    /// 240x160 linear framebuffer, 16 bits per pixel, double-buffered
    Bitmap240x160,
    /// 160x128 linear framebuffer, 16 bits per pixel, two hardware pages
    Bitmap160x128,
}

impl VideoMode {
    /// Resolution in pixels
    pub const fn size(self) -> Size {
        match self {
            VideoMode::Bitmap240x160 => Size::new(240, 160),
            VideoMode::Bitmap160x128 => Size::new(160, 128),
        }
    }
}

/// Double-buffered display
///
/// Implementations own the back buffer; callers draw into it through
/// `embedded-graphics` and call [`present`](DisplayPlatform::present) once
/// per frame.
pub trait DisplayPlatform {
    /// Off-screen draw target
    type Buffer: DrawTarget<Color = Bgr555, Error = Infallible>;

    /// Set the video mode
    fn init(&mut self, mode: VideoMode) -> Result<(), DisplayError>;

    /// Buffer the next frame is drawn into
    fn back_buffer(&mut self) -> Result<&mut Self::Buffer, DisplayError>;

    /// Show the back buffer
    fn present(&mut self) -> Result<(), DisplayError>;

    /// Fill the back buffer with one colour
    fn clear_buffer(&mut self, color: Bgr555) -> Result<(), DisplayError> {
        // Infallible target
        let _ = self.back_buffer()?.clear(color);
        Ok(())
    }
}
