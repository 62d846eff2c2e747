// -------------------- embedded-graphics integration --------------------

use embedded_graphics::draw_target::DrawTarget;
use embedded_graphics::geometry::{OriginDimensions, Point, Size};
use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::primitives::Rectangle;
use embedded_graphics::Pixel;
use embedded_hal::digital::OutputPin;

use crate::driver::{DriverError, St7789};
use crate::transport::Transport;
use crate::window::Window;

impl<T, RST> OriginDimensions for St7789<T, RST>
where
    T: Transport,
    RST: OutputPin,
{
    fn size(&self) -> Size {
        Size::new(self.width() as u32, self.height() as u32)
    }
}

impl<T, RST> DrawTarget for St7789<T, RST>
where
    T: Transport,
    RST: OutputPin,
{
    type Color = Rgb565;
    type Error = DriverError<T, RST>;

    /// One 1x1 window per pixel, all inside a single bracket. Off-screen
    /// pixels are dropped.
    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Rgb565>>,
    {
        self.bracket(|this| {
            for Pixel(p, c) in pixels {
                this.pixel_inner(p.x, p.y, c)?;
            }
            Ok(())
        })
    }

    // Row-major colors for `area`; only the on-screen part is sent, in one window.
    fn fill_contiguous<I>(&mut self, area: &Rectangle, colors: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Rgb565>,
    {
        let Some(window) = self.visible(area) else {
            return Ok(());
        };

        let area_w = area.size.width as usize;
        let total = area_w.saturating_mul(area.size.height as usize);
        let left_skip = (window.x0 as i32 - area.top_left.x) as usize;
        let top_skip = (window.y0 as i32 - area.top_left.y) as usize;
        let (take, rows) = (window.width(), window.height());

        let visible = colors
            .into_iter()
            .take(total)
            .enumerate()
            .filter(move |(i, _)| {
                let (col, row) = (i % area_w, i / area_w);
                (left_skip..left_skip + take).contains(&col) && (top_skip..top_skip + rows).contains(&row)
            })
            .map(|(_, c)| c);

        self.require_buffer()?;
        self.bracket(|this| {
            this.bus.open_window(window, &this.config)?;
            this.stream_pixels(visible)
        })
    }

    fn fill_solid(&mut self, area: &Rectangle, color: Rgb565) -> Result<(), Self::Error> {
        match self.visible(area) {
            Some(window) => self.fill_window(window, color),
            None => Ok(()),
        }
    }

    fn clear(&mut self, color: Rgb565) -> Result<(), Self::Error> {
        self.fill_screen(color)
    }
}

impl<T, RST> St7789<T, RST>
where
    T: Transport,
    RST: OutputPin,
{
    /// On-screen part of `area` as a window, if any.
    fn visible(&self, area: &Rectangle) -> Option<Window> {
        let screen = Rectangle::new(Point::zero(), self.size());
        let inter = area.intersection(&screen);
        let bottom_right = inter.bottom_right()?;
        Some(Window::new(
            inter.top_left.x as u16,
            inter.top_left.y as u16,
            bottom_right.x as u16,
            bottom_right.y as u16,
        ))
    }
}
