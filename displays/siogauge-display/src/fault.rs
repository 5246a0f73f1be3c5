//! Fault screen
//!
//! Shown by the panic path once the link has halted. Draws straight to
//! whatever target it is given, usually the visible screen, since the
//! normal render loop will not run again.

use embedded_graphics::mono_font::ascii::{FONT_6X10, FONT_8X13_BOLD};
use embedded_graphics::mono_font::{MonoTextStyle, MonoTextStyleBuilder};
use embedded_graphics::pixelcolor::Bgr555;
use embedded_graphics::prelude::*;
use embedded_graphics::text::{Baseline, Text};

use crate::framebuffer::{rgb, HEIGHT, WIDTH};

const MARGIN: i32 = 8;
const BODY_TOP: i32 = 32;
const LINE_HEIGHT: i32 = 11;
const CHAR_WIDTH: usize = 6;

/// Paint the fault banner and `message`, wrapped to the screen width
pub fn render_fault<D>(target: &mut D, message: &str) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Bgr555>,
{
    let background = rgb(96, 0, 0);
    target.clear(background)?;

    let title = MonoTextStyleBuilder::new()
        .font(&FONT_8X13_BOLD)
        .text_color(Bgr555::WHITE)
        .background_color(background)
        .build();
    Text::with_baseline("LINK FAULT", Point::new(MARGIN, MARGIN), title, Baseline::Top)
        .draw(target)?;

    let body = MonoTextStyle::new(&FONT_6X10, rgb(255, 200, 200));
    let cols = (WIDTH - 2 * MARGIN as usize) / CHAR_WIDTH;
    let mut y = BODY_TOP;
    for line in Wrap::new(message, cols) {
        if y + LINE_HEIGHT > HEIGHT as i32 {
            break;
        }
        Text::with_baseline(line, Point::new(MARGIN, y), body, Baseline::Top).draw(target)?;
        y += LINE_HEIGHT;
    }

    Ok(())
}

/// Splits text at newlines and every `cols` characters
struct Wrap<'a> {
    rest: &'a str,
    cols: usize,
}

impl<'a> Wrap<'a> {
    fn new(text: &'a str, cols: usize) -> Self {
        Self {
            rest: text,
            cols: cols.max(1),
        }
    }
}

impl<'a> Iterator for Wrap<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<&'a str> {
        if self.rest.is_empty() {
            return None;
        }

        let mut end = self.rest.len();
        for (count, (idx, ch)) in self.rest.char_indices().enumerate() {
            if ch == '\n' {
                let line = &self.rest[..idx];
                self.rest = &self.rest[idx + 1..];
                return Some(line);
            }
            if count == self.cols {
                end = idx;
                break;
            }
        }

        let line = &self.rest[..end];
        self.rest = &self.rest[end..];
        Some(line)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::framebuffer::{to_raw, FrameBuffer};

    #[test]
    fn test_wrap_splits_on_width_and_newline() {
        let lines: Vec<&str> = Wrap::new("abcdefgh\nxy", 3).collect();
        assert_eq!(lines, ["abc", "def", "gh", "xy"]);
    }

    #[test]
    fn test_wrap_keeps_multibyte_chars_whole() {
        let lines: Vec<&str> = Wrap::new("°C°C°", 2).collect();
        assert_eq!(lines, ["°C", "°C", "°"]);
    }

    #[test]
    fn test_wrap_empty() {
        assert_eq!(Wrap::new("", 10).next(), None);
    }

    #[test]
    fn test_fault_screen_paints_background_and_text() {
        let mut fb = Box::new(FrameBuffer::new());
        render_fault(&mut *fb, "interrupt with start bit == 1").unwrap();

        let background = to_raw(rgb(96, 0, 0));
        assert_eq!(fb.row(159).unwrap()[0], background);
        assert!(fb.as_raw().iter().any(|&p| p == to_raw(Bgr555::WHITE)));
        assert!(fb
            .as_raw()
            .iter()
            .any(|&p| p == to_raw(rgb(255, 200, 200))));
    }

    #[test]
    fn test_long_message_is_clipped_to_screen() {
        let mut fb = Box::new(FrameBuffer::new());
        let long = "x".repeat(2000);
        render_fault(&mut *fb, &long).unwrap();

        // Last line must end above the bottom edge
        let last_row = fb.row(HEIGHT - 1).unwrap();
        assert!(last_row.iter().all(|&p| p == to_raw(rgb(96, 0, 0))));
    }
}
