//! Off-screen framebuffer
//!
//! 240x160, one BGR555 `u16` per pixel, same layout as GBA mode 3 VRAM so a
//! flip is a straight copy.

use core::convert::Infallible;

use embedded_graphics::pixelcolor::raw::{RawData, RawU16};
use embedded_graphics::pixelcolor::Bgr555;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::Rectangle;

/// Screen width in pixels
pub const WIDTH: usize = 240;

/// Screen height in pixels
pub const HEIGHT: usize = 160;

/// Colour from 8-bit channels (low 3 bits dropped)
pub fn rgb(r: u8, g: u8, b: u8) -> Bgr555 {
    Bgr555::new(r >> 3, g >> 3, b >> 3)
}

/// Raw BGR555 value as stored in VRAM
pub fn to_raw(color: Bgr555) -> u16 {
    RawU16::from(color).into_inner()
}

/// Off-screen pixel buffer
pub struct FrameBuffer {
    pixels: [u16; WIDTH * HEIGHT],
}

impl Default for FrameBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameBuffer {
    /// Create a black framebuffer
    pub const fn new() -> Self {
        Self {
            pixels: [0; WIDTH * HEIGHT],
        }
    }

    /// Pixel at (x, y), or `None` outside the screen
    pub fn pixel(&self, x: usize, y: usize) -> Option<Bgr555> {
        if x < WIDTH && y < HEIGHT {
            Some(Bgr555::from(RawU16::new(self.pixels[y * WIDTH + x])))
        } else {
            None
        }
    }

    /// Set pixel at (x, y); writes outside the screen are dropped
    pub fn set_pixel(&mut self, x: usize, y: usize, color: Bgr555) {
        if x < WIDTH && y < HEIGHT {
            self.pixels[y * WIDTH + x] = to_raw(color);
        }
    }

    /// One row of raw pixels, or `None` below the screen
    pub fn row(&self, y: usize) -> Option<&[u16]> {
        if y < HEIGHT {
            Some(&self.pixels[y * WIDTH..(y + 1) * WIDTH])
        } else {
            None
        }
    }

    /// All raw pixels, row-major
    pub fn as_raw(&self) -> &[u16] {
        &self.pixels
    }
}

impl DrawTarget for FrameBuffer {
    type Color = Bgr555;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(Point { x, y }, color) in pixels {
            if x < 0 || y < 0 {
                continue;
            }
            self.set_pixel(x as usize, y as usize, color);
        }
        Ok(())
    }

    fn fill_solid(&mut self, area: &Rectangle, color: Self::Color) -> Result<(), Self::Error> {
        let area = area.intersection(&self.bounding_box());
        let raw = to_raw(color);

        if let Some(bottom_right) = area.bottom_right() {
            let x0 = area.top_left.x as usize;
            let x1 = bottom_right.x as usize;
            for y in area.top_left.y as usize..=bottom_right.y as usize {
                self.pixels[y * WIDTH + x0..=y * WIDTH + x1].fill(raw);
            }
        }
        Ok(())
    }

    fn clear(&mut self, color: Self::Color) -> Result<(), Self::Error> {
        self.pixels.fill(to_raw(color));
        Ok(())
    }
}

impl OriginDimensions for FrameBuffer {
    fn size(&self) -> Size {
        Size::new(WIDTH as u32, HEIGHT as u32)
    }
}
