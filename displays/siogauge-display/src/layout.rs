//! Gauge screen layout
//!
//! Positions and colours of the readout and the bar. The defaults are the
//! fixed values the gauge has always used; bar maths is integer-only.

use embedded_graphics::pixelcolor::Bgr555;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::Rectangle;

use crate::framebuffer::rgb;

/// Screen layout and palette
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GaugeLayout {
    /// Top-left of the "value: N" readout
    pub text_origin: Point,
    /// Readout foreground
    pub text_color: Bgr555,
    /// Readout background, also the screen clear colour
    pub background: Bgr555,
    /// Outer bar frame
    pub frame: Rectangle,
    pub frame_color: Bgr555,
    /// Empty bar track; the fill starts at its origin
    pub track: Rectangle,
    pub track_color: Bgr555,
    pub fill_color: Bgr555,
}

impl Default for GaugeLayout {
    fn default() -> Self {
        Self {
            text_origin: Point::zero(),
            text_color: rgb(160, 255, 160),
            background: rgb(24, 24, 24),
            frame: Rectangle::new(Point::new(18, 78), Size::new(204, 24)),
            frame_color: Bgr555::WHITE,
            track: Rectangle::new(Point::new(20, 80), Size::new(200, 20)),
            track_color: Bgr555::BLACK,
            fill_color: rgb(255, 0, 0),
        }
    }
}

impl GaugeLayout {
    /// Filled width for `value`: `track_width * value / 256`
    pub fn fill_width(&self, value: u8) -> u32 {
        // Result is at most the track width, so it fits back into u32
        (u64::from(self.track.size.width) * u64::from(value) / 256) as u32
    }

    /// Filled part of the track for `value`
    pub fn fill(&self, value: u8) -> Rectangle {
        Rectangle::new(
            self.track.top_left,
            Size::new(self.fill_width(value), self.track.size.height),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_geometry() {
        let layout = GaugeLayout::default();
        assert_eq!(layout.frame.top_left, Point::new(18, 78));
        assert_eq!(layout.frame.size, Size::new(204, 24));
        assert_eq!(layout.track.top_left, Point::new(20, 80));
        assert_eq!(layout.track.size, Size::new(200, 20));
    }

    #[test]
    fn test_fill_width_endpoints() {
        let layout = GaugeLayout::default();
        assert_eq!(layout.fill_width(0), 0);
        assert_eq!(layout.fill_width(1), 0);
        assert_eq!(layout.fill_width(2), 1);
        assert_eq!(layout.fill_width(128), 100);
        assert_eq!(layout.fill_width(255), 199);
    }

    #[test]
    fn test_fill_width_all_values() {
        let layout = GaugeLayout::default();
        for v in 0..=255u8 {
            assert_eq!(layout.fill_width(v), 200 * v as u32 / 256);
        }
    }

    #[test]
    fn test_fill_width_on_oversized_track() {
        let layout = GaugeLayout {
            track: Rectangle::new(Point::zero(), Size::new(u32::MAX, 20)),
            ..GaugeLayout::default()
        };
        assert_eq!(layout.fill_width(0), 0);
        assert_eq!(layout.fill_width(128), u32::MAX / 2);
        assert_eq!(layout.fill_width(255), (u64::from(u32::MAX) * 255 / 256) as u32);
    }

    #[test]
    fn test_fill_shares_track_origin_and_height() {
        let layout = GaugeLayout::default();
        let fill = layout.fill(64);
        assert_eq!(fill.top_left, layout.track.top_left);
        assert_eq!(fill.size, Size::new(50, 20));
    }
}
