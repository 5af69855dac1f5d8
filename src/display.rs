// AccelLog — Text Layer & Frame Buffer
//
// A single full-screen text layer rendered with embedded-graphics into a
// 1-bpp frame buffer laid out in SSD1306 page order (8 vertical pixels per
// byte).  Every text change re-renders the buffer and pushes it to the panel.

use core::convert::Infallible;

use embedded_graphics::mono_font::ascii::FONT_6X10;
use embedded_graphics::mono_font::{MonoFont, MonoTextStyle};
use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;
use embedded_graphics::text::{Alignment, Baseline, Text, TextStyleBuilder};

use crate::config::*;
use crate::services::TextDisplay;

/// Default font: six lines of status text fit the 64-pixel height.
pub const DEFAULT_FONT: &MonoFont<'static> = &FONT_6X10;

// Room for the line breaks wrapping adds to a full text buffer.
const WRAPPED_TEXT_SIZE: usize = 2 * TEXT_BUFFER_SIZE;

// ---------------------------------------------------------------------------
// Frame buffer
// ---------------------------------------------------------------------------

pub struct FrameBuffer {
    buf: [u8; DISPLAY_BUFFER_SIZE],
}

impl FrameBuffer {
    pub const fn new() -> Self {
        Self { buf: [0; DISPLAY_BUFFER_SIZE] }
    }

    pub fn as_bytes(&self) -> &[u8; DISPLAY_BUFFER_SIZE] {
        &self.buf
    }

    pub fn clear_all(&mut self) {
        self.buf.fill(0);
    }

    pub fn pixel(&self, x: u32, y: u32) -> bool {
        if x >= SCREEN_WIDTH || y >= SCREEN_HEIGHT {
            return false;
        }
        let idx = x as usize + (y as usize / 8) * SCREEN_WIDTH as usize;
        self.buf[idx] & (1 << (y % 8)) != 0
    }

    pub fn lit_pixels(&self) -> u32 {
        self.buf.iter().map(|b| b.count_ones()).sum()
    }
}

impl Default for FrameBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl OriginDimensions for FrameBuffer {
    fn size(&self) -> Size {
        Size::new(SCREEN_WIDTH, SCREEN_HEIGHT)
    }
}

impl DrawTarget for FrameBuffer {
    type Color = BinaryColor;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            let (Ok(x), Ok(y)) = (u32::try_from(point.x), u32::try_from(point.y)) else {
                continue;
            };
            if x >= SCREEN_WIDTH || y >= SCREEN_HEIGHT {
                continue;
            }
            let idx = x as usize + (y as usize / 8) * SCREEN_WIDTH as usize;
            let mask = 1u8 << (y % 8);
            match color {
                BinaryColor::On => self.buf[idx] |= mask,
                BinaryColor::Off => self.buf[idx] &= !mask,
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Panel
// ---------------------------------------------------------------------------

/// Physical display the frame buffer is pushed to.
pub trait Panel {
    fn flush(&mut self, frame: &[u8; DISPLAY_BUFFER_SIZE]) -> anyhow::Result<()>;
    fn turn_off(&mut self) -> anyhow::Result<()>;
}

// ---------------------------------------------------------------------------
// Text layer
// ---------------------------------------------------------------------------

pub struct TextLayer<P> {
    panel: P,
    frame: FrameBuffer,
    text: heapless::String<TEXT_BUFFER_SIZE>,
    font: &'static MonoFont<'static>,
    alignment: Alignment,
}

impl<P: Panel> TextLayer<P> {
    pub fn new(panel: P) -> Self {
        Self {
            panel,
            frame: FrameBuffer::new(),
            text: heapless::String::new(),
            font: DEFAULT_FONT,
            alignment: Alignment::Left,
        }
    }

    pub fn set_font(&mut self, font: &'static MonoFont<'static>) {
        self.font = font;
        self.refresh();
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn frame(&self) -> &FrameBuffer {
        &self.frame
    }

    pub fn panel(&self) -> &P {
        &self.panel
    }

    /// Characters of the current font that fit one screen line.
    fn columns(&self) -> usize {
        let advance = self.font.character_size.width + self.font.character_spacing;
        (SCREEN_WIDTH / advance.max(1)) as usize
    }

    fn render(&mut self) {
        self.frame.clear_all();
        let text = wrap(&self.text, self.columns());

        let anchor_x = match self.alignment {
            Alignment::Left => 0,
            Alignment::Center => SCREEN_WIDTH as i32 / 2,
            Alignment::Right => SCREEN_WIDTH as i32 - 1,
        };
        let character_style = MonoTextStyle::new(self.font, BinaryColor::On);
        let text_style = TextStyleBuilder::new()
            .alignment(self.alignment)
            .baseline(Baseline::Top)
            .build();

        let _ = Text::with_text_style(text.as_str(), Point::new(anchor_x, 0), character_style, text_style)
            .draw(&mut self.frame);
    }

    fn refresh(&mut self) {
        self.render();
        if let Err(e) = self.panel.flush(self.frame.as_bytes()) {
            log::error!("Display error: {}", e);
        }
    }
}

impl<P: Panel> TextDisplay for TextLayer<P> {
    fn set_text(&mut self, text: &str) {
        self.text.clear();
        for c in text.chars() {
            if self.text.push(c).is_err() {
                log::warn!("Display text truncated to {} bytes", TEXT_BUFFER_SIZE);
                break;
            }
        }
        self.refresh();
    }

    fn set_alignment(&mut self, alignment: Alignment) {
        self.alignment = alignment;
        self.refresh();
    }

    fn clear(&mut self) {
        self.text.clear();
        self.frame.clear_all();
        if let Err(e) = self.panel.turn_off() {
            log::error!("Display error: {}", e);
        }
    }
}

/// Break `text` into lines of at most `max_cols` characters, at spaces where
/// possible.  Explicit newlines are kept; words longer than a line are split.
fn wrap(text: &str, max_cols: usize) -> heapless::String<WRAPPED_TEXT_SIZE> {
    let max_cols = max_cols.max(1);
    let mut out = heapless::String::new();

    for (i, line) in text.split('\n').enumerate() {
        if i > 0 {
            let _ = out.push('\n');
        }
        let mut col = 0;
        for (j, word) in line.split(' ').enumerate() {
            if j > 0 {
                if col + 1 + word.chars().count() <= max_cols {
                    let _ = out.push(' ');
                    col += 1;
                } else {
                    let _ = out.push('\n');
                    col = 0;
                }
            }
            for c in word.chars() {
                if col == max_cols {
                    let _ = out.push('\n');
                    col = 0;
                }
                let _ = out.push(c);
                col += 1;
            }
        }
    }
    out
}
