//! Mode 3 video
//!
//! The gauge draws into an off-screen [`FrameBuffer`] and `present` copies
//! it to VRAM a word at a time, starting once the scanline counter enters
//! vertical blank. The fault screen skips the back buffer and
//! draws through [`VramTarget`] straight onto the visible page.

use core::convert::Infallible;
use core::ptr;

use embedded_graphics::pixelcolor::Bgr555;
use embedded_graphics::prelude::*;
use siogauge_display::framebuffer::to_raw;
use siogauge_display::{DisplayError, DisplayPlatform, FrameBuffer, VideoMode, HEIGHT, WIDTH};

/// DISPCNT BG mode 3: 240x160 direct colour bitmap
pub const MODE_3: u16 = 3;

/// DISPCNT BG2 enable; the mode 3 bitmap is drawn as BG2
pub const BG2_ON: u16 = 1 << 10;

/// First VCOUNT value of vertical blank; lines 160..=227 are not drawn
pub const VBLANK_START: u16 = HEIGHT as u16;

/// Video register and memory addresses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct VideoAddresses {
    /// DISPCNT
    pub dispcnt: usize,
    /// VCOUNT, the current scanline
    pub vcount: usize,
    /// Start of the mode 3 bitmap
    pub vram: usize,
}

impl VideoAddresses {
    /// GBA memory map
    pub const GBA: Self = Self {
        dispcnt: 0x0400_0000,
        vcount: 0x0400_0006,
        vram: 0x0600_0000,
    };

    /// Switch to mode 3 with BG2 shown
    ///
    /// # Safety
    ///
    /// `dispcnt` must be valid for a volatile `u16` write.
    unsafe fn enable_bitmap(&self) {
        ptr::write_volatile(self.dispcnt as *mut u16, MODE_3 | BG2_ON);
    }
}

/// Double-buffered mode 3 display
pub struct GbaVideo {
    back: &'static mut FrameBuffer,
    addrs: VideoAddresses,
    ready: bool,
}

impl GbaVideo {
    /// Create a display that draws into `back` and flips to `addrs.vram`
    ///
    /// # Safety
    ///
    /// `addrs.dispcnt` must be valid for volatile `u16` writes,
    /// `addrs.vcount` for volatile `u16` reads, and
    /// `addrs.vram` for `WIDTH * HEIGHT * 2` bytes of 4-byte aligned
    /// volatile `u32` writes, for as long as the display is used.
    pub unsafe fn new(back: &'static mut FrameBuffer, addrs: VideoAddresses) -> Self {
        Self {
            back,
            addrs,
            ready: false,
        }
    }

    /// Display on the real GBA video hardware
    ///
    /// # Safety
    ///
    /// Only sound on GBA hardware.
    pub unsafe fn gba(back: &'static mut FrameBuffer) -> Self {
        Self::new(back, VideoAddresses::GBA)
    }

    /// Check if a mode has been set
    pub fn is_ready(&self) -> bool {
        self.ready
    }

    /// Check if the display is between frames
    pub fn in_vblank(&self) -> bool {
        // SAFETY: constructor contract
        let line = unsafe { ptr::read_volatile(self.addrs.vcount as *const u16) };
        line >= VBLANK_START
    }

    /// Spin until the scanline counter is in vertical blank
    ///
    /// Returns at once if it already is. The copy that follows outlasts the
    /// blank period, so the lower part of the screen may still tear.
    fn wait_for_vblank(&self) {
        while !self.in_vblank() {
            core::hint::spin_loop();
        }
    }
}

impl DisplayPlatform for GbaVideo {
    type Buffer = FrameBuffer;

    fn init(&mut self, mode: VideoMode) -> Result<(), DisplayError> {
        match mode {
            VideoMode::Bitmap240x160 => {
                // SAFETY: constructor contract
                unsafe { self.addrs.enable_bitmap() };
                self.ready = true;
                Ok(())
            }
            // Mode 5 pages are not wired up
            VideoMode::Bitmap160x128 => Err(DisplayError::InvalidMode),
        }
    }

    fn back_buffer(&mut self) -> Result<&mut FrameBuffer, DisplayError> {
        if !self.ready {
            return Err(DisplayError::NotInitialized);
        }
        Ok(&mut *self.back)
    }

    fn present(&mut self) -> Result<(), DisplayError> {
        if !self.ready {
            return Err(DisplayError::NotInitialized);
        }

        self.wait_for_vblank();
        let vram = self.addrs.vram as *mut u32;
        for (i, pair) in self.back.as_raw().chunks_exact(2).enumerate() {
            let word = u32::from(pair[0]) | (u32::from(pair[1]) << 16);
            // SAFETY: constructor contract, i < WIDTH * HEIGHT / 2
            unsafe { ptr::write_volatile(vram.add(i), word) };
        }
        Ok(())
    }
}

/// Draw target writing straight to the visible mode 3 page
pub struct VramTarget {
    vram: usize,
}

impl VramTarget {
    /// Take over the screen: switch to mode 3 and draw into `addrs.vram`
    ///
    /// # Safety
    ///
    /// Same address requirements as [`GbaVideo::new`], with halfword
    /// alignment for VRAM. Nothing else may draw to the screen afterwards.
    pub unsafe fn new(addrs: VideoAddresses) -> Self {
        addrs.enable_bitmap();
        Self { vram: addrs.vram }
    }

    fn write(&mut self, index: usize, raw: u16) {
        // SAFETY: constructor contract, index < WIDTH * HEIGHT
        unsafe { ptr::write_volatile((self.vram as *mut u16).add(index), raw) };
    }
}

impl DrawTarget for VramTarget {
    type Color = Bgr555;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(Point { x, y }, color) in pixels {
            if x < 0 || y < 0 || x as usize >= WIDTH || y as usize >= HEIGHT {
                continue;
            }
            self.write(y as usize * WIDTH + x as usize, to_raw(color));
        }
        Ok(())
    }

    fn clear(&mut self, color: Self::Color) -> Result<(), Self::Error> {
        let raw = to_raw(color);
        for i in 0..WIDTH * HEIGHT {
            self.write(i, raw);
        }
        Ok(())
    }
}

impl OriginDimensions for VramTarget {
    fn size(&self) -> Size {
        Size::new(WIDTH as u32, HEIGHT as u32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_graphics::primitives::{PrimitiveStyle, Rectangle};
    use siogauge_display::{render_fault, rgb};

    const WORDS: usize = WIDTH * HEIGHT / 2;

    struct Memory {
        dispcnt: Box<u16>,
        vcount: Box<u16>,
        vram: Box<[u32; WORDS]>,
    }

    impl Memory {
        fn new() -> Self {
            Self {
                dispcnt: Box::new(0),
                // Parked in vertical blank so flips never spin
                vcount: Box::new(VBLANK_START),
                vram: vec![0u32; WORDS].into_boxed_slice().try_into().unwrap(),
            }
        }

        fn addresses(&mut self) -> VideoAddresses {
            VideoAddresses {
                dispcnt: &mut *self.dispcnt as *mut u16 as usize,
                vcount: &mut *self.vcount as *mut u16 as usize,
                vram: self.vram.as_mut_ptr() as usize,
            }
        }

        fn pixel(&self, x: usize, y: usize) -> u16 {
            let i = y * WIDTH + x;
            let word = self.vram[i / 2];
            if i % 2 == 0 {
                word as u16
            } else {
                (word >> 16) as u16
            }
        }
    }

    fn video(mem: &mut Memory) -> GbaVideo {
        let back: &'static mut FrameBuffer = Box::leak(Box::new(FrameBuffer::new()));
        unsafe { GbaVideo::new(back, mem.addresses()) }
    }

    #[test]
    fn test_gba_addresses() {
        assert_eq!(VideoAddresses::GBA.dispcnt, 0x0400_0000);
        assert_eq!(VideoAddresses::GBA.vcount, 0x0400_0006);
        assert_eq!(VideoAddresses::GBA.vram, 0x0600_0000);
        assert_eq!(MODE_3 | BG2_ON, 0x0403);
    }

    #[test]
    fn test_init_selects_mode_3() {
        let mut mem = Memory::new();
        let mut video = video(&mut mem);
        video.init(VideoMode::Bitmap240x160).unwrap();
        assert!(video.is_ready());
        assert_eq!(*mem.dispcnt, 0x0403);
    }

    #[test]
    fn test_unsupported_mode_is_rejected() {
        let mut mem = Memory::new();
        let mut video = video(&mut mem);
        assert_eq!(
            video.init(VideoMode::Bitmap160x128),
            Err(DisplayError::InvalidMode)
        );
        assert!(!video.is_ready());
        assert_eq!(*mem.dispcnt, 0);
    }

    #[test]
    fn test_buffer_unavailable_before_init() {
        let mut mem = Memory::new();
        let mut video = video(&mut mem);
        assert!(matches!(
            video.back_buffer(),
            Err(DisplayError::NotInitialized)
        ));
        assert_eq!(video.present(), Err(DisplayError::NotInitialized));
    }

    #[test]
    fn test_present_copies_back_buffer() {
        let mut mem = Memory::new();
        let mut video = video(&mut mem);
        video.init(VideoMode::Bitmap240x160).unwrap();
        video.clear_buffer(rgb(24, 24, 24)).unwrap();

        let buffer = video.back_buffer().unwrap();
        buffer.set_pixel(0, 0, Bgr555::RED);
        buffer.set_pixel(1, 0, Bgr555::BLUE);
        buffer.set_pixel(239, 159, Bgr555::WHITE);

        // Nothing visible until the flip
        assert_eq!(mem.pixel(0, 0), 0);

        video.present().unwrap();
        assert_eq!(mem.pixel(0, 0), 0x001f);
        assert_eq!(mem.pixel(1, 0), 0x7c00);
        assert_eq!(mem.pixel(2, 0), 0x0c63);
        assert_eq!(mem.pixel(239, 159), 0x7fff);
    }

    #[test]
    fn test_vblank_follows_scanline_counter() {
        let mut mem = Memory::new();
        let video = video(&mut mem);

        for (line, blank) in [(0, false), (159, false), (160, true), (227, true)] {
            *mem.vcount = line;
            assert_eq!(video.in_vblank(), blank, "line {}", line);
        }
    }

    #[test]
    fn test_present_during_vblank_copies_immediately() {
        let mut mem = Memory::new();
        *mem.vcount = 227;
        let mut video = video(&mut mem);
        video.init(VideoMode::Bitmap240x160).unwrap();
        video.back_buffer().unwrap().set_pixel(10, 10, Bgr555::WHITE);

        video.present().unwrap();
        assert_eq!(mem.pixel(10, 10), 0x7fff);
    }

    #[test]
    fn test_vram_target_draws_in_place() {
        let mut mem = Memory::new();
        let mut target = unsafe { VramTarget::new(mem.addresses()) };
        assert_eq!(*mem.dispcnt, 0x0403);

        Rectangle::new(Point::new(238, 158), Size::new(10, 10))
            .into_styled(PrimitiveStyle::with_fill(Bgr555::WHITE))
            .draw(&mut target)
            .unwrap();
        assert_eq!(mem.pixel(238, 158), 0x7fff);
        assert_eq!(mem.pixel(239, 159), 0x7fff);
        assert_eq!(mem.pixel(237, 159), 0);
    }

    #[test]
    fn test_fault_screen_on_vram() {
        let mut mem = Memory::new();
        let mut target = unsafe { VramTarget::new(mem.addresses()) };
        render_fault(&mut target, "Serial interrupt after link halted").unwrap();

        let background = to_raw(rgb(96, 0, 0));
        assert_eq!(mem.pixel(0, 159), background);
        assert_eq!(mem.pixel(239, 0), background);
    }
}
