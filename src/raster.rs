//! Pixel, line, rectangle, circle, triangle and image primitives.
//!
//! Everything here clips silently: shapes may hang off any edge, and the
//! visible part is drawn. Only a missing transfer buffer or a transport
//! failure is reported.
//!
//! Signed coordinates may take any `i32` value. Intermediate math runs in
//! `i64`, and walks are cut down to the part that can reach the screen.

use embedded_graphics::pixelcolor::Rgb565;
use embedded_hal::digital::OutputPin;

use crate::buffer::wire;
use crate::driver::{DriverError, St7789};
use crate::transport::Transport;
use crate::window::Window;

impl<T, RST> St7789<T, RST>
where
    T: Transport,
    RST: OutputPin,
{
    /// Whole screen in one color.
    pub fn fill_screen(&mut self, color: Rgb565) -> Result<(), DriverError<T, RST>> {
        self.fill_rect(0, 0, self.width(), self.height(), color)
    }

    /// Single pixel. Coordinates past the right or bottom edge are ignored.
    pub fn draw_pixel(&mut self, x: u16, y: u16, color: Rgb565) -> Result<(), DriverError<T, RST>> {
        if !self.config.contains(x as i32, y as i32) {
            return Ok(());
        }
        self.bracket(|this| this.pixel_inner(x as i32, y as i32, color))
    }

    /// 3x3 block centered on (x, y). Needs a one-pixel margin on every side.
    pub fn draw_pixel_4px(&mut self, x: u16, y: u16, color: Rgb565) -> Result<(), DriverError<T, RST>> {
        if x < 1 || y < 1 || x >= self.width() - 1 || y >= self.height() - 1 {
            return Ok(());
        }
        self.fill_rect(x - 1, y - 1, 3, 3, color)
    }

    pub fn draw_line(
        &mut self,
        x0: i32,
        y0: i32,
        x1: i32,
        y1: i32,
        color: Rgb565,
    ) -> Result<(), DriverError<T, RST>> {
        let [x0, y0, x1, y1] = [x0, y0, x1, y1].map(i64::from);
        self.bracket(|this| this.line_inner(x0, y0, x1, y1, color))
    }

    /// Horizontal run of `w` pixels starting at (x, y), clipped at the right
    /// edge.
    pub fn draw_fast_hline(&mut self, x: u16, y: u16, w: u16, color: Rgb565) -> Result<(), DriverError<T, RST>> {
        if x >= self.width() || y >= self.height() {
            return Ok(());
        }
        let w = w.min(self.width() - x);
        if w == 0 {
            return Ok(());
        }
        self.fill_window(Window::new(x, y, x + w - 1, y), color)
    }

    /// Vertical run of `h` pixels starting at (x, y), clipped at the bottom
    /// edge.
    pub fn draw_fast_vline(&mut self, x: u16, y: u16, h: u16, color: Rgb565) -> Result<(), DriverError<T, RST>> {
        if x >= self.width() || y >= self.height() {
            return Ok(());
        }
        let h = h.min(self.height() - y);
        if h == 0 {
            return Ok(());
        }
        self.fill_window(Window::new(x, y, x, y + h - 1), color)
    }

    /// Outline. Zero width or height draws nothing.
    pub fn draw_rect(&mut self, x: u16, y: u16, w: u16, h: u16, color: Rgb565) -> Result<(), DriverError<T, RST>> {
        if w == 0 || h == 0 {
            return Ok(());
        }
        let (x0, y0) = (x as i64, y as i64);
        let (x1, y1) = (x0 + w as i64 - 1, y0 + h as i64 - 1);
        self.bracket(|this| {
            this.line_inner(x0, y0, x1, y0, color)?; // top
            this.line_inner(x0, y0, x0, y1, color)?; // left
            this.line_inner(x0, y1, x1, y1, color)?; // bottom
            this.line_inner(x1, y0, x1, y1, color) // right
        })
    }

    /// Filled rectangle, clipped to the screen.
    pub fn fill_rect(&mut self, x: u16, y: u16, w: u16, h: u16, color: Rgb565) -> Result<(), DriverError<T, RST>> {
        if x >= self.width() || y >= self.height() {
            return Ok(());
        }
        let w = w.min(self.width() - x);
        let h = h.min(self.height() - y);
        if w == 0 || h == 0 {
            return Ok(());
        }
        self.fill_window(Window::new(x, y, x + w - 1, y + h - 1), color)
    }

    pub fn draw_circle(&mut self, x0: i32, y0: i32, r: i32, color: Rgb565) -> Result<(), DriverError<T, RST>> {
        if r < 0 {
            return Ok(());
        }
        let [x0, y0, r] = [x0, y0, r].map(i64::from);
        let Some(reach) = self.circle_reach(x0, y0, r, true) else {
            return Ok(());
        };
        self.bracket(|this| {
            this.pixel_at(x0, y0 + r, color)?;
            this.pixel_at(x0, y0 - r, color)?;
            this.pixel_at(x0 + r, y0, color)?;
            this.pixel_at(x0 - r, y0, color)?;

            for (x, y) in Octant::new(r).take_while(|&(x, _)| x <= reach) {
                this.pixel_at(x0 + x, y0 + y, color)?;
                this.pixel_at(x0 - x, y0 + y, color)?;
                this.pixel_at(x0 + x, y0 - y, color)?;
                this.pixel_at(x0 - x, y0 - y, color)?;

                this.pixel_at(x0 + y, y0 + x, color)?;
                this.pixel_at(x0 - y, y0 + x, color)?;
                this.pixel_at(x0 + y, y0 - x, color)?;
                this.pixel_at(x0 - y, y0 - x, color)?;
            }
            Ok(())
        })
    }

    pub fn fill_circle(&mut self, x0: i32, y0: i32, r: i32, color: Rgb565) -> Result<(), DriverError<T, RST>> {
        if r < 0 {
            return Ok(());
        }
        self.require_buffer()?;
        let [x0, y0, r] = [x0, y0, r].map(i64::from);
        let Some(reach) = self.circle_reach(x0, y0, r, false) else {
            return Ok(());
        };
        self.bracket(|this| {
            this.pixel_at(x0, y0 + r, color)?;
            this.pixel_at(x0, y0 - r, color)?;
            this.hspan_inner(x0 - r, x0 + r, y0, color)?;

            for (x, y) in Octant::new(r).take_while(|&(x, _)| x <= reach) {
                this.hspan_inner(x0 - x, x0 + x, y0 + y, color)?;
                this.hspan_inner(x0 - x, x0 + x, y0 - y, color)?;
                this.hspan_inner(x0 - y, x0 + y, y0 + x, color)?;
                this.hspan_inner(x0 - y, x0 + y, y0 - x, color)?;
            }
            Ok(())
        })
    }

    #[allow(clippy::too_many_arguments)]
    pub fn draw_triangle(
        &mut self,
        x1: i32,
        y1: i32,
        x2: i32,
        y2: i32,
        x3: i32,
        y3: i32,
        color: Rgb565,
    ) -> Result<(), DriverError<T, RST>> {
        let [x1, y1, x2, y2, x3, y3] = [x1, y1, x2, y2, x3, y3].map(i64::from);
        self.bracket(|this| {
            this.line_inner(x1, y1, x2, y2, color)?;
            this.line_inner(x2, y2, x3, y3, color)?;
            this.line_inner(x3, y3, x1, y1, color)
        })
    }

    /// Filled triangle: walks the edge v1 -> v2 and draws a line from every
    /// step to v3.
    #[allow(clippy::too_many_arguments)]
    pub fn fill_triangle(
        &mut self,
        x1: i32,
        y1: i32,
        x2: i32,
        y2: i32,
        x3: i32,
        y3: i32,
        color: Rgb565,
    ) -> Result<(), DriverError<T, RST>> {
        let [x1, y1, x2, y2, x3, y3] = [x1, y1, x2, y2, x3, y3].map(i64::from);
        let (w, h) = (self.width() as i64, self.height() as i64);
        let misses_x = x1.max(x2).max(x3) < 0 || x1.min(x2).min(x3) >= w;
        let misses_y = y1.max(y2).max(y3) < 0 || y1.min(y2).min(y3) >= h;
        if misses_x || misses_y {
            return Ok(());
        }

        let dx = (x2 - x1).abs();
        let dy = (y2 - y1).abs();
        let sx = if x2 >= x1 { 1 } else { -1 };
        let sy = if y2 >= y1 { 1 } else { -1 };

        // (xinc1, yinc1) applies on accumulator overflow, (xinc2, yinc2) every step.
        let (xinc1, yinc1, xinc2, yinc2, den, numadd, steps) = if dx >= dy {
            (0, sy, sx, 0, dx, dy, dx)
        } else {
            (sx, 0, 0, sy, dy, dx, dy)
        };

        self.bracket(|this| {
            let (mut x, mut y) = (x1, y1);
            let mut num = den / 2;
            for _ in 0..=steps {
                this.line_inner(x, y, x3, y3, color)?;
                num += numadd;
                if num >= den {
                    num -= den;
                    x += xinc1;
                    y += yinc1;
                }
                x += xinc2;
                y += yinc2;
            }
            Ok(())
        })
    }

    /// Blits a `w` x `h` row-major image with its top-left corner at (x, y).
    ///
    /// The image has to fit on screen entirely and `data` must hold at least
    /// `w * h` pixels; otherwise nothing is drawn.
    pub fn draw_image(
        &mut self,
        x: u16,
        y: u16,
        w: u16,
        h: u16,
        data: &[Rgb565],
    ) -> Result<(), DriverError<T, RST>> {
        if w == 0 || h == 0 {
            return Ok(());
        }
        let count = w as usize * h as usize;
        if x as u32 + w as u32 > self.width() as u32
            || y as u32 + h as u32 > self.height() as u32
            || data.len() < count
        {
            log::trace!("draw_image {}x{} at ({}, {}) skipped", w, h, x, y);
            return Ok(());
        }
        self.require_buffer()?;

        let window = Window::new(x, y, x + w - 1, y + h - 1);
        self.bracket(|this| {
            this.bus.open_window(window, &this.config)?;
            this.stream_pixels(data[..count].iter().copied())
        })
    }

    // ---- Helpers; callers hold the bus selected unless noted ----

    pub(crate) fn pixel_inner(&mut self, x: i32, y: i32, color: Rgb565) -> Result<(), DriverError<T, RST>> {
        if !self.config.contains(x, y) {
            return Ok(());
        }
        let (x, y) = (x as u16, y as u16);
        self.bus.open_window(Window::new(x, y, x, y), &self.config)?;
        self.bus.data(&color_bytes(color))?;
        Ok(())
    }

    /// Same as [`Self::pixel_inner`] for wide coordinates.
    fn pixel_at(&mut self, x: i64, y: i64, color: Rgb565) -> Result<(), DriverError<T, RST>> {
        match (i32::try_from(x), i32::try_from(y)) {
            (Ok(x), Ok(y)) => self.pixel_inner(x, y, color),
            _ => Ok(()),
        }
    }

    /// Bresenham. Endpoints are ordered first, so (a, b) and (b, a) give the
    /// same pixels. Only the on-screen stretch of the major axis is walked.
    pub(crate) fn line_inner(
        &mut self,
        mut x0: i64,
        mut y0: i64,
        mut x1: i64,
        mut y1: i64,
        color: Rgb565,
    ) -> Result<(), DriverError<T, RST>> {
        let steep = (y1 - y0).abs() > (x1 - x0).abs();
        if steep {
            core::mem::swap(&mut x0, &mut y0);
            core::mem::swap(&mut x1, &mut y1);
        }
        if x0 > x1 {
            core::mem::swap(&mut x0, &mut x1);
            core::mem::swap(&mut y0, &mut y1);
        }

        let (major, minor) = if steep {
            (self.height() as i64, self.width() as i64)
        } else {
            (self.width() as i64, self.height() as i64)
        };
        if x1 < 0 || x0 >= major || y0.max(y1) < 0 || y0.min(y1) >= minor {
            return Ok(());
        }

        let dx = x1 - x0;
        let dy = (y1 - y0).abs();
        let ystep = if y0 < y1 { 1 } else { -1 };
        let start = x0.max(0);
        let (taken, mut err) = bresenham_skip(start - x0, dx, dy);
        let mut y = y0 + taken * ystep;

        for x in start..=x1.min(major - 1) {
            if steep {
                self.pixel_at(y, x, color)?;
            } else {
                self.pixel_at(x, y, color)?;
            }
            err -= dy;
            if err < 0 {
                y += ystep;
                err += dx;
            }
        }
        Ok(())
    }

    /// Horizontal span from `xa` to `xb` inclusive (either order), clipped.
    /// Needs the transfer buffer.
    pub(crate) fn hspan_inner(&mut self, xa: i64, xb: i64, y: i64, color: Rgb565) -> Result<(), DriverError<T, RST>> {
        let (lo, hi) = if xa <= xb { (xa, xb) } else { (xb, xa) };
        let w = self.width() as i64;
        if y < 0 || y >= self.height() as i64 || hi < 0 || lo >= w {
            return Ok(());
        }
        let (lo, hi) = (lo.max(0) as u16, hi.min(w - 1) as u16);
        let window = Window::new(lo, y as u16, hi, y as u16);
        self.bus.open_window(window, &self.config)?;
        self.stream_color(window.pixel_count(), color)
    }

    /// How far along the octant walk a circle centered at (x0, y0) can still
    /// put a point on screen, or `None` when it misses the screen entirely.
    /// A `hollow` circle also misses when the whole screen sits inside it.
    fn circle_reach(&self, x0: i64, y0: i64, r: i64, hollow: bool) -> Option<i64> {
        let (w, h) = (self.width() as i64, self.height() as i64);
        // Offsets from the center to the nearest and farthest screen pixel, per axis.
        let near = |c: i64, len: i64| if c < 0 { -c } else if c >= len { c - len + 1 } else { 0 };
        let far = |c: i64, len: i64| c.abs().max((len - 1 - c).abs());
        let dist2 = |a: i64, b: i64| a as i128 * a as i128 + b as i128 * b as i128;

        // Midpoint points sit within one pixel of the radius.
        let r = r as i128;
        if dist2(near(x0, w), near(y0, h)) > (r + 1) * (r + 1) {
            return None;
        }
        let (far_x, far_y) = (far(x0, w), far(y0, h));
        if hollow && dist2(far_x, far_y) < (r - 1) * (r - 1) {
            return None;
        }
        // Every visible outline point has both octant offsets within reach on
        // some axis; filled spans only need their row on screen.
        Some(if hollow { far_x.min(far_y) } else { far_y })
    }

    /// Opens `window` and floods it with `color` in its own bracket.
    pub(crate) fn fill_window(&mut self, window: Window, color: Rgb565) -> Result<(), DriverError<T, RST>> {
        self.require_buffer()?;
        self.bracket(|this| {
            this.bus.open_window(window, &this.config)?;
            this.stream_color(window.pixel_count(), color)
        })
    }

    /// Streams arbitrary pixels into the open window, staged through the
    /// transfer buffer one buffer-full at a time.
    pub(crate) fn stream_pixels(
        &mut self,
        pixels: impl IntoIterator<Item = Rgb565>,
    ) -> Result<(), DriverError<T, RST>> {
        self.require_buffer()?;
        let capacity = self.buffer.len_pixels();
        let mut pixels = pixels.into_iter();
        loop {
            let mut staged = 0;
            for (slot, color) in self.buffer.stage().iter_mut().zip(&mut pixels) {
                *slot = wire(color);
                staged += 1;
            }
            if staged == 0 {
                return Ok(());
            }
            self.bus.data(self.buffer.bytes(staged))?;
            if staged < capacity {
                return Ok(());
            }
        }
    }
}

/// Wire bytes of a single pixel.
#[inline]
pub(crate) fn color_bytes(color: Rgb565) -> [u8; 2] {
    wire(color).to_ne_bytes()
}

/// Bresenham state after `k` steps along a line with major extent `dx` and
/// minor extent `dy <= dx`: minor-axis steps taken and the error term.
fn bresenham_skip(k: i64, dx: i64, dy: i64) -> (i64, i64) {
    let half = dx / 2;
    if k == 0 {
        return (0, half);
    }
    let (k, dx, dy) = (k as i128, dx as i128, dy as i128);
    // Fewest steps that bring `half - k * dy` back to zero or above.
    let owed = k * dy - half as i128;
    let steps = if owed <= 0 { 0 } else { (owed + dx - 1) / dx };
    (steps as i64, (steps * dx - owed) as i64)
}

/// Midpoint circle walk over one octant: yields (x, y) with x < y after each
/// step, starting from (0, r).
struct Octant {
    f: i64,
    ddf_x: i64,
    ddf_y: i64,
    x: i64,
    y: i64,
}

impl Octant {
    fn new(r: i64) -> Self {
        Self { f: 1 - r, ddf_x: 1, ddf_y: -2 * r, x: 0, y: r }
    }
}

impl Iterator for Octant {
    type Item = (i64, i64);

    fn next(&mut self) -> Option<(i64, i64)> {
        if self.x >= self.y {
            return None;
        }
        if self.f >= 0 {
            self.y -= 1;
            self.ddf_y += 2;
            self.f += self.ddf_y;
        }
        self.x += 1;
        self.ddf_x += 2;
        self.f += self.ddf_x;
        Some((self.x, self.y))
    }
}
