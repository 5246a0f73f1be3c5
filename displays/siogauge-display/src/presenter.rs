//! Gauge presenter
//!
//! Draws the latest received byte as a "value: N" readout and a
//! proportional bar, then flips. The value is read once per frame, so a
//! byte arriving mid-frame shows up on the next one.

use core::fmt::Write;

use embedded_graphics::mono_font::ascii::FONT_8X13;
use embedded_graphics::mono_font::MonoTextStyleBuilder;
use embedded_graphics::pixelcolor::Bgr555;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::PrimitiveStyle;
use embedded_graphics::text::{Baseline, Text};
use heapless::String;
use siogauge_core::ValueSource;

use crate::backend::{DisplayError, DisplayPlatform, VideoMode};
use crate::layout::GaugeLayout;

/// Readout buffer size
pub const TEXT_CAPACITY: usize = 32;

/// Renders a [`ValueSource`] as a gauge
pub struct Presenter<S> {
    source: S,
    layout: GaugeLayout,
    text: String<TEXT_CAPACITY>,
}

impl<S: ValueSource> Presenter<S> {
    /// Create a presenter with the default layout
    pub fn new(source: S) -> Self {
        Self::with_layout(source, GaugeLayout::default())
    }

    /// Create a presenter with a custom layout
    pub fn with_layout(source: S, layout: GaugeLayout) -> Self {
        Self {
            source,
            layout,
            text: String::new(),
        }
    }

    /// Set the video mode and clear to the background colour
    pub fn init<P: DisplayPlatform>(&mut self, platform: &mut P) -> Result<(), DisplayError> {
        platform.init(VideoMode::Bitmap240x160)?;
        platform.clear_buffer(self.layout.background)
    }

    /// Draw one frame and present it
    ///
    /// Returns the value that was drawn.
    pub fn render_frame<P: DisplayPlatform>(&mut self, platform: &mut P) -> Result<u8, DisplayError> {
        let value = self.source.current();
        // Infallible target
        let _ = self.draw(platform.back_buffer()?, value);
        platform.present()?;
        Ok(value)
    }

    /// Draw the readout and bar for `value` into `target`
    pub fn draw<D>(&mut self, target: &mut D, value: u8) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = Bgr555>,
    {
        self.text.clear();
        // Trailing spaces wipe digits left over from a longer number
        let _ = write!(self.text, "value: {}   ", value);

        let style = MonoTextStyleBuilder::new()
            .font(&FONT_8X13)
            .text_color(self.layout.text_color)
            .background_color(self.layout.background)
            .build();
        Text::with_baseline(&self.text, self.layout.text_origin, style, Baseline::Top)
            .draw(target)?;

        self.layout
            .frame
            .into_styled(PrimitiveStyle::with_fill(self.layout.frame_color))
            .draw(target)?;
        self.layout
            .track
            .into_styled(PrimitiveStyle::with_fill(self.layout.track_color))
            .draw(target)?;
        self.layout
            .fill(value)
            .into_styled(PrimitiveStyle::with_fill(self.layout.fill_color))
            .draw(target)?;

        Ok(())
    }

    /// Readout text of the last drawn frame
    pub fn text(&self) -> &str {
        self.text.as_str()
    }

    /// Active layout
    pub fn layout(&self) -> &GaugeLayout {
        &self.layout
    }

    /// Value source
    pub fn source(&self) -> &S {
        &self.source
    }
}
