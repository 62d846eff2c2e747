//! Bitmap fonts in the Adafruit GFX layout and the text drawing built on them.
//!
//! Glyph bitmaps are packed 1 bit per pixel, row-major, MSB first, with no
//! padding between rows. A glyph's pixel (col, row) lives at bit
//! `bitmap_offset * 8 + row * width + col` of the shared bitmap.

use embedded_graphics::geometry::Size;
use embedded_graphics::pixelcolor::Rgb565;
use embedded_hal::digital::OutputPin;

use crate::buffer::wire;
use crate::driver::{DriverError, St7789};
use crate::raster::color_bytes;
use crate::transport::Transport;
use crate::window::Window;

/// Clipped glyphs up to this many pixels are staged on the stack and sent in
/// one write; larger ones go out pixel by pixel.
pub const CHAR_STAGE_PIXELS: usize = 1600;

/// Metrics of one character.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct GfxGlyph {
    /// Byte offset into [`GfxFont::bitmap`].
    pub bitmap_offset: u16,
    pub width: u8,
    pub height: u8,
    /// Cursor advance after this glyph.
    pub x_advance: u8,
    /// Upper-left corner relative to the cursor (baseline).
    pub x_offset: i8,
    pub y_offset: i8,
}

/// A font covering the contiguous character range `first..=last`.
#[derive(Copy, Clone, Debug)]
pub struct GfxFont<'a> {
    pub bitmap: &'a [u8],
    /// One entry per character, starting at `first`.
    pub glyphs: &'a [GfxGlyph],
    pub first: u16,
    pub last: u16,
    /// Line height.
    pub y_advance: u8,
}

impl<'a> GfxFont<'a> {
    /// Glyph for `ch`, or `None` if the font doesn't cover it.
    pub fn glyph(&self, ch: char) -> Option<&'a GfxGlyph> {
        let code = ch as u32;
        if code < self.first as u32 || code > self.last as u32 {
            return None;
        }
        self.glyphs.get((code - self.first as u32) as usize)
    }

    /// Bit at (`col`, `row`) of `glyph`. Bits past the end of the bitmap read
    /// as background.
    pub fn pixel(&self, glyph: &GfxGlyph, col: usize, row: usize) -> bool {
        let bit = glyph.bitmap_offset as usize * 8 + row * glyph.width as usize + col;
        self.bitmap
            .get(bit / 8)
            .is_some_and(|byte| (byte >> (7 - bit % 8)) & 1 == 1)
    }
}

/// Size of the box enclosing `text` set on one line from a cursor at the
/// origin. Characters the font doesn't cover are ignored.
pub fn text_bounds(text: &str, font: &GfxFont<'_>) -> Size {
    let mut cursor = 0i64;
    let mut bounds: Option<(i64, i64, i64, i64)> = None;

    for glyph in text.chars().filter_map(|ch| font.glyph(ch)) {
        let x0 = cursor + glyph.x_offset as i64;
        let y0 = glyph.y_offset as i64;
        let x1 = x0 + glyph.width as i64;
        let y1 = y0 + glyph.height as i64;
        bounds = Some(match bounds {
            None => (x0, y0, x1, y1),
            Some((a, b, c, d)) => (a.min(x0), b.min(y0), c.max(x1), d.max(y1)),
        });
        cursor += glyph.x_advance as i64;
    }

    match bounds {
        Some((x0, y0, x1, y1)) => Size::new(
            u32::try_from(x1 - x0).unwrap_or(u32::MAX),
            u32::try_from(y1 - y0).unwrap_or(u32::MAX),
        ),
        None => Size::zero(),
    }
}

impl<T, RST> St7789<T, RST>
where
    T: Transport,
    RST: OutputPin,
{
    /// Draws `ch` with its baseline cursor at (x, y), set pixels in `fg` and
    /// the rest of the glyph box in `bg`. Clipped to the screen.
    pub fn draw_char(
        &mut self,
        x: i32,
        y: i32,
        ch: char,
        font: &GfxFont<'_>,
        fg: Rgb565,
        bg: Rgb565,
    ) -> Result<(), DriverError<T, RST>> {
        self.char_inner(x.into(), y.into(), ch, font, fg, bg)
    }

    fn char_inner(
        &mut self,
        x: i64,
        y: i64,
        ch: char,
        font: &GfxFont<'_>,
        fg: Rgb565,
        bg: Rgb565,
    ) -> Result<(), DriverError<T, RST>> {
        let Some(glyph) = font.glyph(ch) else {
            return Ok(());
        };
        let (w, h) = (glyph.width as i64, glyph.height as i64);
        let (sw, sh) = (self.width() as i64, self.height() as i64);
        let gx = x + glyph.x_offset as i64;
        let gy = y + glyph.y_offset as i64;
        if w == 0 || h == 0 || gx >= sw || gy >= sh || gx + w <= 0 || gy + h <= 0 {
            return Ok(());
        }

        let (x0, y0) = (gx.max(0), gy.max(0));
        let (x1, y1) = ((gx + w).min(sw) - 1, (gy + h).min(sh) - 1);
        let window = Window::new(x0 as u16, y0 as u16, x1 as u16, y1 as u16);
        let colors = (y0..=y1).flat_map(move |py| {
            (x0..=x1).map(move |px| {
                if font.pixel(glyph, (px - gx) as usize, (py - gy) as usize) { fg } else { bg }
            })
        });

        if window.pixel_count() <= CHAR_STAGE_PIXELS {
            let mut stage: heapless::Vec<u16, CHAR_STAGE_PIXELS> = heapless::Vec::new();
            // Fits: the clipped window was checked against the capacity.
            stage.extend(colors.map(wire));
            self.bracket(|this| {
                this.bus.open_window(window, &this.config)?;
                this.bus.data(bytemuck::cast_slice(stage.as_slice()))?;
                Ok(())
            })
        } else {
            log::trace!("glyph {:?}: {} pixels, unstaged", ch, window.pixel_count());
            self.bracket(|this| {
                this.bus.open_window(window, &this.config)?;
                for color in colors {
                    this.bus.data(&color_bytes(color))?;
                }
                Ok(())
            })
        }
    }

    /// Draws `text` starting with the baseline cursor at (x, y).
    ///
    /// A glyph that would reach the right edge starts a new line at x = 0,
    /// `y_advance` lower; a space that lands first on a new line is dropped.
    /// Text below the bottom edge is discarded.
    pub fn draw_string(
        &mut self,
        x: i32,
        y: i32,
        text: &str,
        font: &GfxFont<'_>,
        fg: Rgb565,
        bg: Rgb565,
    ) -> Result<(), DriverError<T, RST>> {
        let (mut cx, mut cy) = (i64::from(x), i64::from(y));

        for ch in text.chars() {
            let Some(glyph) = font.glyph(ch) else {
                continue;
            };
            if cx + glyph.x_offset as i64 + glyph.width as i64 >= self.width() as i64 {
                cx = 0;
                cy += font.y_advance as i64;
                if cy >= self.height() as i64 {
                    break;
                }
                if ch == ' ' {
                    continue;
                }
            }
            self.char_inner(cx, cy, ch, font, fg, bg)?;
            cx += glyph.x_advance as i64;
        }
        Ok(())
    }
}
